//! Reference-data providers
//!
//! The hierarchy only needs a complete snapshot of `(code, name,
//! parent_code, level)` records. Where that snapshot comes from is up to the
//! caller; this trait is the seam.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{KatoError, Result};
use crate::kato::record::{ReferenceRecord, ReferenceSnapshot, SnapshotFormat};

/// Supplies a full snapshot of the reference table
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait ReferenceSource: Send + Sync {
    /// Fetch every reference record
    async fn fetch_records(&self) -> Result<Vec<ReferenceRecord>>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Records already held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    records: Vec<ReferenceRecord>,
}

impl StaticSource {
    pub fn new(records: Vec<ReferenceRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl ReferenceSource for StaticSource {
    async fn fetch_records(&self) -> Result<Vec<ReferenceRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} records)", self.records.len())
    }
}

/// JSON or YAML snapshot file on disk
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    sort: bool,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sort: false,
        }
    }

    /// Order records by level, then code, before handing them out
    pub fn sorted(mut self) -> Self {
        self.sort = true;
        self
    }
}

#[async_trait]
impl ReferenceSource for FileSource {
    async fn fetch_records(&self) -> Result<Vec<ReferenceRecord>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| KatoError::io(&self.path, e))?;

        let format = SnapshotFormat::from_path(&self.path);
        let mut snapshot = ReferenceSnapshot::parse(&content, format)?;
        if self.sort {
            snapshot = snapshot.sorted();
        }

        tracing::debug!(
            path = %self.path.display(),
            records = snapshot.len(),
            "Read reference snapshot"
        );
        Ok(snapshot.into_records())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
