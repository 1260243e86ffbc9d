use scraper::ElementRef;
use tracing::{debug, warn};

use crate::parse::{Document, Node};

/// A character as listed on the index page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLink {
    pub display_name: String,
    /// Site-relative link to the character's page, e.g. `/Special_Week`.
    pub detail_href: String,
}

/// Lists the characters of the section opened by the anchor with id `category`, in page order.
///
/// The section looks like
/// `<h2><span id="{category}">…</span></h2><div><div class="icon-box"><div class="capt-box"><a …>`.
/// Only boxes directly inside the container count. A missing anchor or container yields nothing.
pub fn enumerate_entities(doc: &Document, category: &str) -> Vec<EntityLink> {
    let Some(container) = section_container(doc, category) else {
        warn!(category, "character section not found on index page");
        return Vec::new();
    };

    let links: Vec<_> = container
        .children_matching("div", Some("icon-box"))
        .into_iter()
        .filter_map(box_link)
        .filter_map(|a| {
            let display_name = a.clean_text();
            match a.attribute("href") {
                Some(href) => Some(EntityLink {
                    display_name,
                    detail_href: href.to_string(),
                }),
                None => {
                    debug!(name = %display_name, "icon box link without href");
                    None
                }
            }
        })
        .collect();

    debug!(category, count = links.len(), "enumerated characters");
    links
}

fn section_container<'a>(doc: &'a Document, category: &str) -> Option<ElementRef<'a>> {
    doc.find_by_id(category)?
        .ancestor("h2")?
        .next_sibling_where(|el| el.is("div", None))
}

/// The `<a>` inside an `icon-box`'s direct `capt-box` child.
pub(crate) fn box_link(icon_box: ElementRef<'_>) -> Option<ElementRef<'_>> {
    icon_box.child("div", Some("capt-box"))?.find("a", None)
}
