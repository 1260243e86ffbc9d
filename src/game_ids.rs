use std::{collections::HashMap, path::Path};

use serde_json::Value;
use tracing::{info, warn};

use crate::Result;

/// Loads the `{ "Character Name": id, … }` lookup file.
/// A missing or malformed file is logged and treated as empty. Blank ids (`null`, `""`, `0`,
/// `false`, empty arrays and objects) are left out.
pub async fn load_game_ids(path: &Path) -> HashMap<String, String> {
    match read_game_ids(path).await {
        Ok(ids) => {
            info!(path = %path.display(), count = ids.len(), "loaded game ids");
            ids
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "couldn't load game ids, continuing without");
            HashMap::new()
        }
    }
}

async fn read_game_ids(path: &Path) -> Result<HashMap<String, String>> {
    let text = tokio::fs::read_to_string(path).await?;
    let raw: HashMap<String, Value> = serde_json::from_str(&text)?;
    let ids = raw
        .into_iter()
        .filter_map(|(name, id)| {
            let id = match id {
                Value::String(s) => s,
                Value::Null | Value::Bool(false) => return None,
                Value::Number(n) if n.as_f64() == Some(0.0) => return None,
                Value::Array(items) if items.is_empty() => return None,
                Value::Object(fields) if fields.is_empty() => return None,
                other => other.to_string(),
            };
            (!id.is_empty()).then_some((name, id))
        })
        .collect();
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn strings_and_numbers_are_both_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.json");
        std::fs::write(
            &path,
            r#"{"Special Week": "1001", "Silence Suzuka": 1002, "Nobody": null, "Blank": ""}"#,
        )
        .unwrap();

        let ids = load_game_ids(&path).await;
        assert_eq!(ids.len(), 2);
        assert_eq!(ids["Special Week"], "1001");
        assert_eq!(ids["Silence Suzuka"], "1002");
    }

    #[tokio::test]
    async fn blank_ids_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ids.json");
        std::fs::write(
            &path,
            r#"{"Zero": 0, "Zero Float": 0.0, "No": false, "Yes": true, "None": [], "Empty": {}, "Kept": 1003}"#,
        )
        .unwrap();

        let ids = load_game_ids(&path).await;
        assert_eq!(ids.len(), 2);
        assert_eq!(ids["Yes"], "true");
        assert_eq!(ids["Kept"], "1003");
    }

    #[tokio::test]
    async fn missing_or_invalid_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_game_ids(&dir.path().join("none.json")).await.is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "[1, 2, 3]").unwrap();
        assert!(load_game_ids(&bad).await.is_empty());
    }
}
