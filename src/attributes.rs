use scraper::ElementRef;
use tracing::debug;

use crate::{
    parse::{Document, Node},
    record::{AttributeRecord, Field},
};

/// Reads a character page into a record: the infobox table first, then the subheader
/// title on top of it. Anything missing or unrecognized is left out.
pub fn extract(doc: &Document) -> AttributeRecord {
    let mut record = extract_table(doc);
    record.merge(extract_header(doc));
    record
}

/// Fields from the infobox key/value rows: `<tr><td><i>Key</i></td><td>value</td></tr>`.
pub fn extract_table(doc: &Document) -> AttributeRecord {
    let mut record = AttributeRecord::new();

    let Some(table) = doc.find("table", Some("infobox")) else {
        debug!("no infobox table");
        return record;
    };
    let Some(tbody) = table.child("tbody", None) else {
        debug!("infobox without tbody");
        return record;
    };

    for row in tbody.children_matching("tr", None) {
        let Some((key, raw)) = row_pair(row) else {
            continue;
        };
        match Field::from_table_key(&key) {
            Some(field) => {
                if !record.set_raw(field, &raw) {
                    debug!(%field, value = raw.trim(), "value outside allowed set, dropped");
                }
            }
            None => debug!(key = %key, "unrecognized infobox key"),
        }
    }
    record
}

/// Key text and raw value markup of a two-cell row whose first cell has an `<i>` label.
fn row_pair(row: ElementRef<'_>) -> Option<(String, String)> {
    let cells = row.children_matching("td", None);
    let [key_cell, value_cell] = cells.as_slice() else {
        return None;
    };
    let key = key_cell.find("i", None)?.clean_text();
    Some((key, value_cell.inner_markup()))
}

/// The quoted epithet shown under the character name: `<th class="infobox-subheader"><i>"…"</i></th>`.
pub fn extract_header(doc: &Document) -> AttributeRecord {
    let mut record = AttributeRecord::new();
    let title = doc
        .find("th", Some("infobox-subheader"))
        .and_then(|th| th.find("i", None));
    match title {
        Some(i) => {
            record.set_raw(Field::Title, &i.inner_markup());
        }
        None => debug!("no subheader title"),
    }
    record
}
