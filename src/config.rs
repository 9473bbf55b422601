use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Options a host passes when it opens a compiler context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextOptions {
    /// Name recorded on the program root
    pub file_name: String,
    /// Parse sources with TypeScript syntax enabled
    pub typescript: bool,
    /// Reject identifier names that are not valid ECMAScript identifiers
    pub strict_identifiers: bool,
    /// Initial node storage capacity
    pub capacity_hint: usize,
}

impl Default for ContextOptions {
    fn default() -> Self {
        ContextOptions {
            file_name: "main.ets".to_string(),
            typescript: true,
            strict_identifiers: true,
            capacity_hint: 256,
        }
    }
}

impl ContextOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let options = ContextOptions::from_json(r#"{ "fileName": "entry.ets" }"#).unwrap();
        assert_eq!(options.file_name, "entry.ets");
        assert!(options.typescript);
        assert!(options.strict_identifiers);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(ContextOptions::from_json("{ fileName: 1 }").is_err());
    }
}
