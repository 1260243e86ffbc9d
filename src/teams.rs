use std::collections::HashMap;

use tracing::debug;

use crate::{
    links::box_link,
    parse::{Document, Node},
};

const TEAM_PREFIX: &str = "Team ";

/// Character name -> the teams they belong to, in page order.
pub type TeamRoster = HashMap<String, Vec<String>>;

/// Reads every `Team …` section of the teams page.
///
/// Members are the `title` of each icon box link in the first `div` after the team heading.
pub fn team_roster(doc: &Document) -> TeamRoster {
    let mut roster = TeamRoster::new();

    for h2 in doc.find_all("h2", None) {
        let Some(headline) = h2.find("span", Some("mw-headline")) else {
            continue;
        };
        let headline = headline.clean_text();
        let Some(team) = headline.strip_prefix(TEAM_PREFIX).map(str::trim) else {
            continue;
        };
        let Some(members) = h2.next_sibling_where(|el| el.is("div", None)) else {
            debug!(team, "team heading without member list");
            continue;
        };

        for icon_box in members.children_matching("div", Some("icon-box")) {
            let Some(name) = box_link(icon_box).and_then(|a| a.attribute("title")) else {
                continue;
            };
            roster
                .entry(name.to_string())
                .or_default()
                .push(team.to_string());
        }
    }

    debug!(members = roster.len(), "read team roster");
    roster
}
