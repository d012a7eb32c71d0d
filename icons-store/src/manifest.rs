//! On-disk manifest formats driving catalog updates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of `descriptions.json`: a named font bundle with paths
/// relative to the manifest file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontEntry {
    pub name: String,
    pub family: String,
    /// Relative path of the per-font metadata JSON file.
    pub metadata: String,
    /// Relative path of the TTF file.
    pub font: String,
}

/// Per-font metadata file: the family name and the icon → codepoint map.
///
/// A `BTreeMap` keeps iteration order stable, which the bundle content
/// hash depends on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontMetadata {
    pub family: String,
    pub names: BTreeMap<String, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_round_trips() {
        let json = r#"[{
            "name": "material",
            "family": "Material Design Icons",
            "metadata": "fonts/material.json",
            "font": "fonts/material.ttf"
        }]"#;
        let entries: Vec<FontEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries[0].name, "material");
        assert_eq!(entries[0].font, "fonts/material.ttf");
    }

    #[test]
    fn metadata_codepoints_are_integers() {
        let json = r#"{"family": "Test", "names": {"cat": 62345, "dog": 62346}}"#;
        let metadata: FontMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.names["cat"], 62345);
        assert_eq!(metadata.names.keys().next().map(String::as_str), Some("cat"));
    }
}
