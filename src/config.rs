//! Matcher configuration
//!
//! Loads the small set of tunables the resolver depends on from YAML:
//! root markers (country-level phrases that are skipped in queries), the
//! renamed-entity alias table, and the delimiter used to split scraped
//! location text.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KatoError, Result};
use crate::kato::normalize::{normalize_name, AliasTable};

fn default_root_markers() -> Vec<String> {
    vec!["республика казахстан".to_string()]
}

fn default_aliases() -> Vec<AliasEntry> {
    AliasTable::default()
        .iter()
        .map(|(from, to)| AliasEntry {
            from: from.to_string(),
            to: to.to_string(),
        })
        .collect()
}

fn default_delimiter() -> String {
    ",".to_string()
}

/// One renamed entity: `from` is the historical name, `to` the current one
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AliasEntry {
    pub from: String,
    pub to: String,
}

/// Root configuration for the matcher
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatcherConfig {
    /// Normalized phrases marking the implicit country level
    #[serde(default = "default_root_markers")]
    pub root_markers: Vec<String>,
    /// Renamed entities, applied in order
    #[serde(default = "default_aliases")]
    pub aliases: Vec<AliasEntry>,
    /// Separator between levels in scraped location text
    #[serde(default = "default_delimiter")]
    pub location_delimiter: String,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            root_markers: default_root_markers(),
            aliases: default_aliases(),
            location_delimiter: default_delimiter(),
        }
    }
}

impl MatcherConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| KatoError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: MatcherConfig = serde_yaml::from_str(content)?;
        config.normalized()
    }

    /// Validate and bring every name into normalized form
    fn normalized(mut self) -> Result<Self> {
        self.root_markers = self
            .root_markers
            .iter()
            .map(|m| normalize_name(m))
            .filter(|m| !m.is_empty())
            .collect();
        if self.root_markers.is_empty() {
            return Err(KatoError::InvalidConfig(
                "root_markers must contain at least one non-blank name".to_string(),
            ));
        }

        for entry in &mut self.aliases {
            entry.from = normalize_name(&entry.from);
            entry.to = normalize_name(&entry.to);
            if entry.from.is_empty() {
                return Err(KatoError::InvalidConfig(format!(
                    "alias for '{}' has a blank source name",
                    entry.to
                )));
            }
        }

        if self.location_delimiter.is_empty() {
            return Err(KatoError::InvalidConfig(
                "location_delimiter must not be empty".to_string(),
            ));
        }

        Ok(self)
    }

    /// Alias table built from the configured entries
    pub fn alias_table(&self) -> AliasTable {
        AliasTable::from_pairs(self.aliases.iter().map(|a| (a.from.as_str(), a.to.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatcherConfig::default();
        assert_eq!(config.root_markers, vec!["республика казахстан"]);
        assert_eq!(config.aliases.len(), 2);
        assert_eq!(config.location_delimiter, ",");
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
root_markers:
  - "Республика   Казахстан"
  - "Қазақстан Республикасы"
aliases:
  - from: "Ленинск"
    to: "Байконур"
location_delimiter: ";"
"#;

        let config = MatcherConfig::from_yaml(yaml).unwrap();
        assert_eq!(
            config.root_markers,
            vec!["республика казахстан", "қазақстан республикасы"]
        );
        assert_eq!(config.aliases[0].from, "ленинск");
        assert_eq!(config.alias_table().apply("город ленинск"), "город байконур");
        assert_eq!(config.location_delimiter, ";");
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = MatcherConfig::from_yaml(include_str!("../config/kato_matcher.yaml")).unwrap();
        assert_eq!(config.root_markers.len(), 2);
        assert_eq!(config.alias_table(), AliasTable::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = MatcherConfig::from_yaml("location_delimiter: \"/\"\n").unwrap();
        assert_eq!(config.root_markers, vec!["республика казахстан"]);
        assert_eq!(config.aliases.len(), 2);
    }

    #[test]
    fn test_rejects_blank_root_markers() {
        let result = MatcherConfig::from_yaml("root_markers: [\"  \"]\n");
        assert!(matches!(result, Err(KatoError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_blank_alias_source() {
        let yaml = "aliases:\n  - from: \"\"\n    to: \"астана\"\n";
        assert!(matches!(
            MatcherConfig::from_yaml(yaml),
            Err(KatoError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_empty_delimiter() {
        let result = MatcherConfig::from_yaml("location_delimiter: \"\"\n");
        assert!(matches!(result, Err(KatoError::InvalidConfig(_))));
    }
}
