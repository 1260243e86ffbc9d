//! Markup parsing and the small set of tree queries the extractors need.
//!
//! Extraction code talks to the [`Node`] trait rather than to `scraper` directly,
//! so every query the scraper relies on is listed in one place.

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// A parsed page. Parsing never fails: html5ever repairs broken markup into some tree.
#[derive(Debug)]
pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// Parses a markup snippet, e.g. the inner HTML of a table cell.
    pub fn parse_fragment(markup: &str) -> Self {
        Self {
            html: Html::parse_fragment(markup),
        }
    }

    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn find(&self, tag: &str, class: Option<&str>) -> Option<ElementRef<'_>> {
        self.root().find(tag, class)
    }

    pub fn find_all(&self, tag: &str, class: Option<&str>) -> Vec<ElementRef<'_>> {
        self.root().find_all(tag, class)
    }

    pub fn find_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        self.root().find_where(|el| el.attribute("id") == Some(id))
    }

    /// First `<a>` whose text is exactly `text`.
    pub fn find_link(&self, text: &str) -> Option<ElementRef<'_>> {
        self.root().find_where(|el| el.is("a", None) && el.clean_text() == text)
    }
}

/// Read-only navigation over an element of a parsed tree.
pub trait Node<'a>: Copy + Sized {
    /// Tag name matches, and when `class` is given the element carries that class.
    fn is(&self, tag: &str, class: Option<&str>) -> bool;
    /// First descendant (not self) satisfying `pred`, in document order.
    fn find_where(&self, pred: impl Fn(&Self) -> bool) -> Option<Self>;
    /// First descendant matching tag and class.
    fn find(&self, tag: &str, class: Option<&str>) -> Option<Self>;
    /// All descendants matching tag and class, in document order.
    fn find_all(&self, tag: &str, class: Option<&str>) -> Vec<Self>;
    /// Direct element children matching tag and class. Does not recurse.
    fn children_matching(&self, tag: &str, class: Option<&str>) -> Vec<Self>;
    fn next_sibling_where(&self, pred: impl Fn(&Self) -> bool) -> Option<Self>;
    /// Closest enclosing element with the given tag.
    fn ancestor(&self, tag: &str) -> Option<Self>;
    fn attribute(&self, name: &str) -> Option<&'a str>;
    /// Concatenated text content with whitespace runs collapsed and trimmed.
    fn clean_text(&self) -> String;
    fn inner_markup(&self) -> String;

    fn child(&self, tag: &str, class: Option<&str>) -> Option<Self> {
        self.children_matching(tag, class).into_iter().next()
    }
}

impl<'a> Node<'a> for ElementRef<'a> {
    fn is(&self, tag: &str, class: Option<&str>) -> bool {
        let el = self.value();
        el.name().eq_ignore_ascii_case(tag)
            && class.map_or(true, |class| el.classes().any(|c| c == class))
    }

    fn find_where(&self, pred: impl Fn(&Self) -> bool) -> Option<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|el| pred(el))
    }

    fn find(&self, tag: &str, class: Option<&str>) -> Option<Self> {
        self.select(&create_selector(tag, class)?).next()
    }

    fn find_all(&self, tag: &str, class: Option<&str>) -> Vec<Self> {
        match create_selector(tag, class) {
            Some(selector) => self.select(&selector).collect(),
            None => Vec::new(),
        }
    }

    fn children_matching(&self, tag: &str, class: Option<&str>) -> Vec<Self> {
        self.children()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.is(tag, class))
            .collect()
    }

    fn next_sibling_where(&self, pred: impl Fn(&Self) -> bool) -> Option<Self> {
        self.next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| pred(el))
    }

    fn ancestor(&self, tag: &str) -> Option<Self> {
        self.ancestors()
            .filter_map(ElementRef::wrap)
            .find(|el| el.is(tag, None))
    }

    fn attribute(&self, name: &str) -> Option<&'a str> {
        self.value().attr(name)
    }

    fn clean_text(&self) -> String {
        collapse_ws(&self.text().collect::<String>())
    }

    fn inner_markup(&self) -> String {
        self.inner_html()
    }
}

/// `tag`, or `tag[class~="class"]` when a class is given. An unparsable selector matches nothing.
fn create_selector(tag: &str, class: Option<&str>) -> Option<Selector> {
    let css = match class {
        Some(class) => format!(r#"{tag}[class~="{}"]"#, class.replace('\\', "\\\\").replace('"', "\\\"")),
        None => tag.to_string(),
    };
    let selector = match Selector::parse(&css) {
        Ok(selector) => Some(selector),
        Err(err) => {
            warn!(css = %css, ?err, "invalid selector");
            None
        }
    };
    selector
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text content of a markup snippet, tags dropped.
pub fn strip_markup(markup: &str) -> String {
    Document::parse_fragment(markup).root().clean_text()
}
