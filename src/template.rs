//! Static wheel template (quarters and months) loaded from JSON.

use crate::schema::{TemplateDocument, WheelNode};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load the `data` array of a template file.
///
/// Read from disk on every call so each render starts from an untouched copy.
pub fn load_template(path: &Path) -> Result<Vec<WheelNode>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read template: {:?}", path))?;

    let document: TemplateDocument = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse template: {:?}", path))?;

    debug!("Loaded template {:?} ({} nodes)", path, document.data.len());
    Ok(document.data)
}
