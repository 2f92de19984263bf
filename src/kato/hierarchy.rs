//! In-memory KATO hierarchy
//!
//! `CodeHierarchy` holds every reference unit in one arena and exposes two
//! views over it:
//! - the tree: root units keyed by normalized name, each node owning an
//!   insertion-ordered map of its children
//! - the flat index: code → node, used for direct lookup and the global
//!   fallback scan
//!
//! The hierarchy is built once from a full snapshot and never mutated
//! afterwards, so a single instance can be shared across threads freely.

use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::MatcherConfig;
use crate::error::Result;
use crate::kato::normalize::{normalize_name, AliasTable};
use crate::kato::record::ReferenceRecord;
use crate::kato::source::ReferenceSource;

/// Index of a node in the hierarchy arena
pub type NodeId = usize;

/// Insertion-ordered map from normalized name to node
pub type NameMap = IndexMap<String, NodeId>;

/// One administrative unit inside the hierarchy
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub code: String,
    pub raw_name: String,
    pub normalized_name: String,
    pub parent_code: Option<String>,
    pub level: i32,
    pub(crate) children: NameMap,
}

impl HierarchyNode {
    fn from_record(record: ReferenceRecord) -> Self {
        let parent_code = record.parent().map(str::to_string);
        Self {
            normalized_name: normalize_name(&record.name),
            code: record.code,
            raw_name: record.name,
            parent_code,
            level: record.level,
            children: NameMap::new(),
        }
    }
}

/// Soft inconsistency found while building the hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// The parent code is not in the snapshot (or is the node itself); placed at root
    OrphanedParent { code: String, parent_code: String },
    /// Two siblings normalize to the same name; the later one shadows the earlier
    SiblingCollision {
        parent_code: Option<String>,
        normalized_name: String,
        replaced_code: String,
        kept_code: String,
    },
    /// The same code appears more than once; the later record wins
    DuplicateCode { code: String },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrphanedParent { code, parent_code } => {
                write!(f, "{code}: unknown parent {parent_code}, placed at root")
            }
            Self::SiblingCollision {
                parent_code,
                normalized_name,
                replaced_code,
                kept_code,
            } => write!(
                f,
                "{kept_code} shadows {replaced_code} as '{normalized_name}' under {}",
                parent_code.as_deref().unwrap_or("<root>")
            ),
            Self::DuplicateCode { code } => write!(f, "{code}: duplicate code, last record kept"),
        }
    }
}

/// Result of building a hierarchy: never a failure, possibly with warnings
#[derive(Debug)]
pub struct BuildReport {
    pub hierarchy: CodeHierarchy,
    pub warnings: Vec<BuildWarning>,
}

impl BuildReport {
    /// Codes that were re-attached to the root because their parent was missing
    pub fn orphaned_codes(&self) -> Vec<&str> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                BuildWarning::OrphanedParent { code, .. } => Some(code.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn into_hierarchy(self) -> CodeHierarchy {
        self.hierarchy
    }
}

/// Reference hierarchy with a tree view and a flat code index
#[derive(Debug)]
pub struct CodeHierarchy {
    pub(crate) nodes: Vec<HierarchyNode>,
    pub(crate) roots: NameMap,
    pub(crate) by_code: IndexMap<String, NodeId>,
    pub(crate) root_markers: Vec<String>,
    pub(crate) aliases: AliasTable,
}

impl CodeHierarchy {
    /// Build with the default configuration
    pub fn build<I>(records: I) -> BuildReport
    where
        I: IntoIterator<Item = ReferenceRecord>,
    {
        Self::build_with(records, &MatcherConfig::default())
    }

    /// Build from a full snapshot of reference records
    ///
    /// Never fails: records whose parent cannot be found are placed at the
    /// root and reported as [`BuildWarning::OrphanedParent`].
    pub fn build_with<I>(records: I, config: &MatcherConfig) -> BuildReport
    where
        I: IntoIterator<Item = ReferenceRecord>,
    {
        let mut warnings = Vec::new();
        let mut nodes: Vec<HierarchyNode> = Vec::new();
        let mut by_code: IndexMap<String, NodeId> = IndexMap::new();

        // Pass 1: flat index
        for record in records {
            let node = HierarchyNode::from_record(record);
            let id = nodes.len();
            if by_code.insert(node.code.clone(), id).is_some() {
                warnings.push(BuildWarning::DuplicateCode {
                    code: node.code.clone(),
                });
            }
            nodes.push(node);
        }

        // Pass 2: attach every indexed node to its parent or the root
        let mut roots = NameMap::new();
        for (code, &id) in &by_code {
            let parent_id = match nodes[id].parent_code.as_deref() {
                None => None,
                Some(parent) => match by_code.get(parent) {
                    Some(&pid) if pid != id => Some(pid),
                    _ => {
                        warnings.push(BuildWarning::OrphanedParent {
                            code: code.clone(),
                            parent_code: parent.to_string(),
                        });
                        None
                    }
                },
            };

            let name = nodes[id].normalized_name.clone();
            let siblings = match parent_id {
                Some(pid) => &mut nodes[pid].children,
                None => &mut roots,
            };
            if let Some(previous) = siblings.insert(name.clone(), id) {
                let replaced_code = nodes[previous].code.clone();
                warnings.push(BuildWarning::SiblingCollision {
                    parent_code: parent_id.map(|pid| nodes[pid].code.clone()),
                    normalized_name: name,
                    replaced_code,
                    kept_code: code.clone(),
                });
            }
        }

        let hierarchy = Self {
            nodes,
            roots,
            by_code,
            root_markers: normalized_markers(&config.root_markers),
            aliases: config.alias_table(),
        };

        info!(
            nodes = hierarchy.len(),
            roots = hierarchy.roots.len(),
            warnings = warnings.len(),
            "Built KATO hierarchy"
        );
        log_warnings(&warnings);

        BuildReport {
            hierarchy,
            warnings,
        }
    }

    /// Build and keep only the hierarchy; warnings are logged
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = ReferenceRecord>,
    {
        Self::build(records).into_hierarchy()
    }

    /// Fetch a snapshot from `source` and build from it
    pub async fn load_from(
        source: &dyn ReferenceSource,
        config: &MatcherConfig,
    ) -> Result<BuildReport> {
        info!(source = %source.describe(), "Loading KATO reference records");
        let records = source.fetch_records().await?;
        Ok(Self::build_with(records, config))
    }

    /// Number of indexed codes
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Look up a node by code
    pub fn get(&self, code: &str) -> Option<&HierarchyNode> {
        self.by_code.get(code).map(|&id| &self.nodes[id])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.by_code.contains_key(code)
    }

    /// Root-level nodes in insertion order
    pub fn roots(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.roots.values().map(|&id| &self.nodes[id])
    }

    /// Direct children of `code` in insertion order (empty for unknown codes)
    pub fn children_of(&self, code: &str) -> Vec<&HierarchyNode> {
        self.get(code)
            .map(|node| self.iter_map(&node.children).collect())
            .unwrap_or_default()
    }

    /// Chain of nodes from the root down to `code`, inclusive
    pub fn path_to(&self, code: &str) -> Vec<&HierarchyNode> {
        let mut path = Vec::new();
        let mut current = self.get(code);

        // Bounded by the node count so a parent cycle cannot loop forever
        while let Some(node) = current {
            if path.len() > self.by_code.len() {
                break;
            }
            path.push(node);
            current = node
                .parent_code
                .as_deref()
                .filter(|parent| *parent != node.code)
                .and_then(|parent| self.get(parent));
        }

        path.reverse();
        path
    }

    /// Every indexed node in index order
    pub fn iter(&self) -> impl Iterator<Item = &HierarchyNode> {
        self.iter_map(&self.by_code)
    }

    pub fn root_markers(&self) -> &[String] {
        &self.root_markers
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub(crate) fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id]
    }

    pub(crate) fn iter_map<'a>(
        &'a self,
        map: &'a IndexMap<String, NodeId>,
    ) -> impl Iterator<Item = &'a HierarchyNode> + 'a {
        map.values().map(move |&id| &self.nodes[id])
    }

    /// Statistics for debugging
    pub fn stats(&self) -> HierarchyStats {
        let mut nodes_per_level = BTreeMap::new();
        for node in self.iter() {
            *nodes_per_level.entry(node.level).or_insert(0) += 1;
        }

        HierarchyStats {
            node_count: self.len(),
            root_count: self.roots.len(),
            max_level: nodes_per_level.keys().next_back().copied(),
            nodes_per_level,
            alias_count: self.aliases.len(),
        }
    }
}

/// Root markers in normalized form, blanks dropped
fn normalized_markers(markers: &[String]) -> Vec<String> {
    markers
        .iter()
        .map(|marker| normalize_name(marker))
        .filter(|marker| !marker.is_empty())
        .collect()
}

fn log_warnings(warnings: &[BuildWarning]) {
    let mut orphaned = 0usize;
    let mut collisions = 0usize;
    let mut duplicates = 0usize;

    for warning in warnings {
        debug!(%warning, "Hierarchy build warning");
        match warning {
            BuildWarning::OrphanedParent { .. } => orphaned += 1,
            BuildWarning::SiblingCollision { .. } => collisions += 1,
            BuildWarning::DuplicateCode { .. } => duplicates += 1,
        }
    }

    if orphaned > 0 {
        warn!(count = orphaned, "Records with unknown parent placed at root");
    }
    if collisions > 0 {
        warn!(count = collisions, "Sibling names collided; later records shadow earlier ones");
    }
    if duplicates > 0 {
        warn!(count = duplicates, "Duplicate codes in reference snapshot");
    }
}

/// Hierarchy statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyStats {
    pub node_count: usize,
    pub root_count: usize,
    pub max_level: Option<i32>,
    pub nodes_per_level: BTreeMap<i32, usize>,
    pub alias_count: usize,
}

impl std::fmt::Display for HierarchyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "KATO Hierarchy Statistics:")?;
        writeln!(f, "  Codes: {}", self.node_count)?;
        writeln!(f, "  Root units: {}", self.root_count)?;
        for (level, count) in &self.nodes_per_level {
            writeln!(f, "  Level {level}: {count}")?;
        }
        writeln!(f, "  Aliases: {}", self.alias_count)?;
        Ok(())
    }
}
