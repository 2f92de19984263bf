//! Reference records and snapshots
//!
//! A `ReferenceSnapshot` is the flat KATO table the hierarchy is built
//! from. Snapshots are plain JSON or YAML: either a bare array of records or
//! an object with a `records` array.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KatoError, Result};

/// One administrative unit from the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Stable external identifier
    pub code: String,

    /// Display name as stored in the reference table
    #[serde(alias = "name_ru")]
    pub name: String,

    /// Parent code; `None` or empty for root-level units
    #[serde(default)]
    pub parent_code: Option<String>,

    /// Depth in the hierarchy, 0 = country
    #[serde(default)]
    pub level: i32,
}

impl ReferenceRecord {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        parent_code: Option<&str>,
        level: i32,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            parent_code: parent_code.map(str::to_string),
            level,
        }
    }

    /// Parent code, treating an empty or blank string as absent
    pub fn parent(&self) -> Option<&str> {
        self.parent_code
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    Bare(Vec<ReferenceRecord>),
    Wrapped { records: Vec<ReferenceRecord> },
}

impl SnapshotDocument {
    fn into_records(self) -> Vec<ReferenceRecord> {
        match self {
            Self::Bare(records) | Self::Wrapped { records } => records,
        }
    }
}

/// Snapshot serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// Pick the format from the file extension (`.yaml`/`.yml` → YAML, else JSON)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// Full snapshot of the reference table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSnapshot {
    pub records: Vec<ReferenceRecord>,
}

impl ReferenceSnapshot {
    pub fn new(records: Vec<ReferenceRecord>) -> Self {
        Self { records }
    }

    /// Parse a snapshot from text in the given format
    pub fn parse(content: &str, format: SnapshotFormat) -> Result<Self> {
        let doc: SnapshotDocument = match format {
            SnapshotFormat::Json => serde_json::from_str(content)?,
            SnapshotFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(Self::new(doc.into_records()))
    }

    /// Load a snapshot from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| KatoError::io(path, e))?;
        Self::parse(&content, SnapshotFormat::from_path(path))
    }

    /// Records ordered by level, then code (the source table's extraction order)
    pub fn sorted(mut self) -> Self {
        self.records
            .sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.code.cmp(&b.code)));
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<ReferenceRecord> {
        self.records
    }
}
