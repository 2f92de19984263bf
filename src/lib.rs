//! KATO Matcher - hierarchical administrative code resolution
//!
//! Turns free-text location strings from project pages, such as
//! `"Республика Казахстан, Кызылординская область, Шиелийский р-н"`, into the
//! most specific KATO code from a reference table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Callers: batch sync jobs, review tools, kato-resolve CLI       │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │  names (general → specific)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    CodeHierarchy::resolve                        │
//! │        normalize → skip root → aliases → walk → fallback        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │          CodeHierarchy (built once, shared read-only)           │
//! │          tree by normalized name  +  flat index by code         │
//! └─────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │  ReferenceRecord snapshot
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      ReferenceSource                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use kato_matcher::{CodeHierarchy, ReferenceRecord};
//!
//! let hierarchy = CodeHierarchy::from_records(vec![
//!     ReferenceRecord::new("100000000", "Казахстан", None, 0),
//!     ReferenceRecord::new("430000000", "Кызылординская область", Some("100000000"), 1),
//!     ReferenceRecord::new("434000000", "Шиелі район", Some("430000000"), 2),
//! ]);
//!
//! let code = hierarchy.resolve(&["Республика Казахстан", "Кызылординская обл.", "Шиелі р-н"]);
//! assert_eq!(code, Some("434000000"));
//! ```

pub mod config;
pub mod error;
pub mod kato;

// Re-export main types
pub use config::{AliasEntry, MatcherConfig};
pub use error::{KatoError, Result};
pub use kato::{
    normalize_name, split_location, AliasTable, BuildReport, BuildWarning, CodeHierarchy,
    FileSource, HierarchyNode, HierarchyStats, MatchStep, MatchStrategy, ReferenceRecord,
    ReferenceSnapshot, ReferenceSource, Resolution, SnapshotFormat, StaticSource,
};
