//! Conversion settings
//!
//! Plain serde struct; every field has a default so a partial JSON document
//! (or none at all) is valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use esf_core::{EsfError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertSettings {
    /// Directory that receives every generated WGSL source, one file per
    /// pass. Disabled when `None`.
    pub dump_generated_source: Option<PathBuf>,
    /// Leave the destination alone when it already holds the exact bytes
    /// that would be written.
    pub skip_unchanged: bool,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            dump_generated_source: None,
            skip_unchanged: true,
        }
    }
}

impl ConvertSettings {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| EsfError::Parse(format!("invalid settings: {e}")))
    }

    /// Reads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EsfError::io_at(path, e))?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        assert_eq!(ConvertSettings::from_json("{}").unwrap(), ConvertSettings::default());
        assert!(ConvertSettings::default().skip_unchanged);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let settings = ConvertSettings::from_json(r#"{ "dump_generated_source": "out/wgsl" }"#).unwrap();
        assert_eq!(settings.dump_generated_source, Some(PathBuf::from("out/wgsl")));
        assert!(settings.skip_unchanged);
    }

    #[test]
    fn malformed_document_is_parse_error() {
        assert!(matches!(
            ConvertSettings::from_json("{ skip_unchanged: }"),
            Err(EsfError::Parse(_))
        ));
    }
}
