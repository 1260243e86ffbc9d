//! The attribute schema: which fields exist, where they are read from, and how each is normalized.

use std::{collections::BTreeMap, fmt, sync::OnceLock};

use regex::Regex;
use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::parse::strip_markup;

/// Dorms a character can belong to.
pub const DORMS: &[&str] = &["Miho", "Ritto"];

/// Every attribute a record may carry. Declaration order is the order fields are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Japanese,
    Nicknames,
    Title,
    Birthday,
    Height,
    Teams,
    Dorm,
    Roommate,
    VoiceActor,
    GameId,
}

/// How a raw value is turned into the stored string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    Trim,
    /// Split on `<br>` variants and join the non-empty parts with `", "`.
    LineBreakList,
    PlainText,
    /// Plain text with double quotes removed.
    Unquoted,
    /// Trimmed value kept only if it is one of the listed values.
    AllowList(&'static [&'static str]),
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Japanese,
        Field::Nicknames,
        Field::Title,
        Field::Birthday,
        Field::Height,
        Field::Teams,
        Field::Dorm,
        Field::Roommate,
        Field::VoiceActor,
        Field::GameId,
    ];

    /// Key used in the infobox and in the written attribute file.
    pub fn label(self) -> &'static str {
        match self {
            Field::Japanese => "Japanese",
            Field::Nicknames => "Nicknames",
            Field::Title => "Title",
            Field::Birthday => "Birthday",
            Field::Height => "Height",
            Field::Teams => "Teams",
            Field::Dorm => "Dorm",
            Field::Roommate => "Roommate",
            Field::VoiceActor => "Voice Actor",
            Field::GameId => "Game ID",
        }
    }

    pub fn normalizer(self) -> Normalize {
        match self {
            Field::Japanese | Field::Birthday | Field::Height | Field::Teams | Field::GameId => {
                Normalize::Trim
            }
            Field::Nicknames => Normalize::LineBreakList,
            Field::Title => Normalize::Unquoted,
            Field::Dorm => Normalize::AllowList(DORMS),
            Field::Roommate | Field::VoiceActor => Normalize::PlainText,
        }
    }

    /// Whether the field is read from the infobox key/value table.
    pub fn in_infobox_table(self) -> bool {
        match self {
            Field::Japanese
            | Field::Nicknames
            | Field::Birthday
            | Field::Height
            | Field::Dorm
            | Field::Roommate
            | Field::VoiceActor => true,
            Field::Title | Field::Teams | Field::GameId => false,
        }
    }

    /// The table field labelled `key`, if it is one the schema recognizes.
    pub fn from_table_key(key: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.in_infobox_table() && f.label() == key)
    }

    /// Normalizes `raw`, or `None` if the value must be dropped.
    pub fn normalize(self, raw: &str) -> Option<String> {
        let value = match self.normalizer() {
            Normalize::Trim => raw.trim().to_string(),
            Normalize::LineBreakList => line_break_re()
                .split(raw)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            Normalize::PlainText => strip_markup(raw),
            Normalize::Unquoted => strip_markup(raw).replace('"', ""),
            Normalize::AllowList(allowed) => {
                let value = raw.trim();
                if !allowed.contains(&value) {
                    return None;
                }
                value.to_string()
            }
        };
        Some(value)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break pattern"))
}

/// Normalized attributes of one character. Absent fields are simply not present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRecord {
    fields: BTreeMap<Field, String>,
}

impl AttributeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizes and stores `raw`. Returns whether the field was kept.
    pub fn set_raw(&mut self, field: Field, raw: &str) -> bool {
        match field.normalize(raw) {
            Some(value) => {
                self.fields.insert(field, value);
                true
            }
            None => {
                self.fields.remove(&field);
                false
            }
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Takes every field of `other`, overwriting fields already present.
    pub fn merge(&mut self, other: AttributeRecord) {
        self.fields.extend(other.fields);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for AttributeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (field, value) in &self.fields {
            map.serialize_entry(field.label(), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_keys_only_map_to_table_fields() {
        assert_eq!(Field::from_table_key("Voice Actor"), Some(Field::VoiceActor));
        assert_eq!(Field::from_table_key("Dorm"), Some(Field::Dorm));
        assert_eq!(Field::from_table_key("Title"), None);
        assert_eq!(Field::from_table_key("Game ID"), None);
        assert_eq!(Field::from_table_key("Weight"), None);
    }

    #[test]
    fn nicknames_become_a_comma_list() {
        let raw = "Spe-chan<br>  Special<br/> <BR />Nihon Ichi<br>";
        assert_eq!(
            Field::Nicknames.normalize(raw).as_deref(),
            Some("Spe-chan, Special, Nihon Ichi")
        );
    }

    #[test]
    fn plain_text_fields_lose_their_links() {
        let raw = r#"<a href="/Silence_Suzuka" title="Silence Suzuka">Silence Suzuka</a>"#;
        assert_eq!(Field::Roommate.normalize(raw).as_deref(), Some("Silence Suzuka"));
    }

    #[test]
    fn dorm_outside_the_allow_list_is_dropped() {
        assert_eq!(Field::Dorm.normalize(" Miho\n").as_deref(), Some("Miho"));
        assert_eq!(Field::Dorm.normalize("Ritto").as_deref(), Some("Ritto"));
        assert_eq!(Field::Dorm.normalize("Unknown"), None);

        let mut record = AttributeRecord::new();
        assert!(!record.set_raw(Field::Dorm, "Tracen Annex"));
        assert!(!record.contains(Field::Dorm));
    }

    #[test]
    fn title_drops_quotes() {
        assert_eq!(
            Field::Title.normalize(r#""The Dreaming Girl""#).as_deref(),
            Some("The Dreaming Girl")
        );
    }

    #[test]
    fn serializes_in_field_order_with_labels() {
        let mut record = AttributeRecord::new();
        record.set_raw(Field::VoiceActor, "Azumi Waki");
        record.set_raw(Field::Japanese, "スペシャルウィーク");
        record.set_raw(Field::GameId, "1001");

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Japanese":"スペシャルウィーク","Voice Actor":"Azumi Waki","Game ID":"1001"}"#
        );
    }

    #[test]
    fn merge_prefers_the_incoming_record() {
        let mut base = AttributeRecord::new();
        base.set_raw(Field::Height, "158 cm");
        base.set_raw(Field::Title, "Old");
        let mut header = AttributeRecord::new();
        header.set_raw(Field::Title, "New");

        base.merge(header);
        assert_eq!(base.get(Field::Title), Some("New"));
        assert_eq!(base.get(Field::Height), Some("158 cm"));
        assert_eq!(base.len(), 2);
    }
}
