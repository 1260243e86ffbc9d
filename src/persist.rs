use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use crate::{record::AttributeRecord, Result, ATTRIBUTES_FILE};

/// Output folder of one character: `<out_dir>/+<name>+`, with `/` in the name replaced by `-`.
pub fn entity_folder(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("+{}+", name.replace('/', "-")))
}

/// Writes `record` as `attributes.json` inside `folder`, replacing any previous file.
pub async fn write_record(folder: &Path, record: &AttributeRecord) -> Result<PathBuf> {
    let path = folder.join(ATTRIBUTES_FILE);
    tokio::fs::write(&path, to_json(record)?).await?;
    debug!(path = %path.display(), fields = record.len(), "wrote attributes");
    Ok(path)
}

/// Pretty JSON with four-space indentation, fields in schema order.
pub fn to_json(record: &AttributeRecord) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    record.serialize(&mut ser)?;
    Ok(buf)
}
