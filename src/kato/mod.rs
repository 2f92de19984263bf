//! KATO code matching
//!
//! Resolves scraped, general-to-specific location names to a single code
//! from the KATO reference hierarchy.
//!
//! - `normalize` - name canonicalization and the alias table
//! - `record` - reference records and snapshot files
//! - `source` - reference-data providers
//! - `hierarchy` - tree + flat index built once from a snapshot
//! - `resolve` - hierarchical walk with token-overlap and global fallbacks
//! - `location` - splitting scraped location text into names

pub mod hierarchy;
pub mod location;
pub mod normalize;
pub mod record;
pub mod resolve;
pub mod source;

pub use hierarchy::{BuildReport, BuildWarning, CodeHierarchy, HierarchyNode, HierarchyStats};
pub use location::split_location;
pub use normalize::{expand_abbreviation, normalize_name, token_set, AliasTable};
pub use record::{ReferenceRecord, ReferenceSnapshot, SnapshotFormat};
pub use resolve::{MatchStep, MatchStrategy, Resolution};
pub use source::{FileSource, ReferenceSource, StaticSource};
