//! Hierarchical resolution of location names to KATO codes
//!
//! Walks the hierarchy from the root, one query name per level, general to
//! specific. At each level the first sibling (in reference-table order) whose
//! normalized name contains the query, or is contained by it, is selected.
//! Failing that, the first sibling sharing any whitespace token is selected.
//!
//! ```text
//! names ──normalize──▶ drop root markers ──aliases──▶ queries
//!                                                       │
//!   frontier = roots ◀──────────────────────────────────┘
//!     │  substring match? ── yes ─▶ best = node, frontier = node.children
//!     │  token overlap?   ── yes ─▶ best = node, frontier = node.children
//!     │  last query?      ── yes ─▶ global substring scan over every code
//!     │  best so far?     ── yes ─▶ stop, return best
//!     └─ otherwise skip this level, frontier unchanged
//! ```
//!
//! The walk prefers any increasingly specific match over failing outright.
//! Results are expected to be reviewed downstream.

use tracing::debug;

use crate::kato::hierarchy::{CodeHierarchy, NameMap, NodeId};
use crate::kato::normalize::{is_substring_match, normalize_name, token_set};

/// How a level was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Query and sibling name contain one another
    Substring,
    /// Query and sibling name share at least one token
    TokenOverlap,
    /// Last query matched somewhere in the flat index, ignoring the path
    GlobalFallback,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::TokenOverlap => "token_overlap",
            Self::GlobalFallback => "global_fallback",
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matched level of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchStep {
    /// Normalized, alias-substituted query name
    pub query: String,
    pub code: String,
    pub strategy: MatchStrategy,
}

/// Full account of a resolution, for logging and review
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Names that took part in the walk, normalized and alias-substituted
    pub queries: Vec<String>,
    /// Raw names dropped before the walk as root markers
    pub skipped: Vec<String>,
    /// Matched levels in order
    pub steps: Vec<MatchStep>,
    /// Queries no sibling matched
    pub unmatched: Vec<String>,
    /// The walk stopped at a partial path before using every query
    pub stopped_early: bool,
    node: Option<NodeId>,
}

impl Resolution {
    /// Resolved code, `None` for no match
    pub fn code(&self) -> Option<&str> {
        self.final_step().map(|step| step.code.as_str())
    }

    pub fn is_match(&self) -> bool {
        self.node.is_some()
    }

    /// Strategy that produced the final code
    pub fn strategy(&self) -> Option<MatchStrategy> {
        self.final_step().map(|step| step.strategy)
    }

    /// The step that selected `node`; absent when nothing matched
    fn final_step(&self) -> Option<&MatchStep> {
        self.node.and(self.steps.last())
    }
}

impl CodeHierarchy {
    /// Resolve general-to-specific location names to the most specific code
    ///
    /// Returns `None` when nothing matches. Never fails.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Option<&str> {
        self.resolve_detailed(names)
            .node
            .map(|id| self.node(id).code.as_str())
    }

    /// Resolve and report how each level was matched
    pub fn resolve_detailed<S: AsRef<str>>(&self, names: &[S]) -> Resolution {
        let mut resolution = self.prepare_queries(names);
        if resolution.queries.is_empty() {
            debug!(names = names.len(), "No usable location names");
            return resolution;
        }

        let queries = std::mem::take(&mut resolution.queries);
        let last = queries.len() - 1;
        let mut frontier: &NameMap = &self.roots;
        let mut best: Option<NodeId> = None;

        for (position, query) in queries.iter().enumerate() {
            if let Some((id, strategy)) = self.match_frontier(frontier, query) {
                let node = self.node(id);
                debug!(query = %query, code = %node.code, ?strategy, "Matched level");
                resolution.steps.push(MatchStep {
                    query: query.clone(),
                    code: node.code.clone(),
                    strategy,
                });
                best = Some(id);
                frontier = &node.children;
                continue;
            }

            resolution.unmatched.push(query.clone());

            if position == last {
                if let Some(id) = self.match_global(query) {
                    let node = self.node(id);
                    debug!(query = %query, code = %node.code, "Matched by global fallback");
                    resolution.steps.push(MatchStep {
                        query: query.clone(),
                        code: node.code.clone(),
                        strategy: MatchStrategy::GlobalFallback,
                    });
                    resolution.queries = queries;
                    resolution.node = Some(id);
                    return resolution;
                }
            } else if best.is_some() {
                debug!(query = %query, "No match below partial path, stopping");
                resolution.stopped_early = true;
                break;
            } else {
                debug!(query = %query, "No match at level, skipping");
            }
        }

        resolution.queries = queries;
        resolution.node = best;
        resolution
    }

    /// Find a direct child of `parent_code` whose name matches `name` by substring
    ///
    /// Narrower than [`resolve`](Self::resolve): no aliases, no token overlap,
    /// no fallback. Returns `None` for an unknown parent or no match. A blank
    /// name is a substring of every child, so it selects the first one.
    pub fn find_by_parent(&self, parent_code: &str, name: &str) -> Option<&str> {
        let parent = self.get(parent_code)?;
        let normalized = normalize_name(name);

        self.iter_map(&parent.children)
            .find(|child| is_substring_match(&normalized, &child.normalized_name))
            .map(|child| child.code.as_str())
    }

    /// Normalize names, drop root markers, apply aliases
    fn prepare_queries<S: AsRef<str>>(&self, names: &[S]) -> Resolution {
        let mut resolution = Resolution::default();

        for raw in names {
            let raw = raw.as_ref();
            let normalized = normalize_name(raw);
            let is_root = self
                .root_markers
                .iter()
                .any(|marker| normalized.contains(marker.as_str()));

            if is_root {
                resolution.skipped.push(raw.to_string());
            } else {
                resolution.queries.push(self.aliases.apply(&normalized));
            }
        }

        resolution
    }

    /// First sibling matching by substring, else by token overlap
    fn match_frontier(&self, frontier: &NameMap, query: &str) -> Option<(NodeId, MatchStrategy)> {
        if let Some(&id) = frontier
            .iter()
            .find(|(name, _)| is_substring_match(query, name))
            .map(|(_, id)| id)
        {
            return Some((id, MatchStrategy::Substring));
        }

        let query_tokens = token_set(query);
        frontier
            .iter()
            .find(|(name, _)| !query_tokens.is_disjoint(&token_set(name)))
            .map(|(_, &id)| (id, MatchStrategy::TokenOverlap))
    }

    /// First code anywhere in the index whose name matches by substring
    fn match_global(&self, query: &str) -> Option<NodeId> {
        self.by_code
            .values()
            .copied()
            .find(|&id| is_substring_match(query, &self.node(id).normalized_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatcherConfig;
    use crate::kato::record::ReferenceRecord;

    fn hierarchy() -> CodeHierarchy {
        CodeHierarchy::from_records(vec![
            ReferenceRecord::new("R", "Казахстан", None, 0),
            ReferenceRecord::new("A", "Кызылординская область", Some("R"), 1),
            ReferenceRecord::new("B", "Шиелі район", Some("A"), 2),
            ReferenceRecord::new("C", "Жалагаш район", Some("A"), 2),
            ReferenceRecord::new("S", "село Жосалы", Some("C"), 3),
            ReferenceRecord::new("T", "Астана", Some("R"), 1),
        ])
    }

    #[test]
    fn test_detailed_exact_path() {
        let h = hierarchy();
        let resolution =
            h.resolve_detailed(&["Казахстан", "Кызылординская обл.", "Жалагаш р-н", "с. Жосалы"]);

        assert_eq!(resolution.code(), Some("S"));
        assert!(resolution.is_match());
        let codes: Vec<&str> = resolution.steps.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["R", "A", "C", "S"]);
        assert!(resolution
            .steps
            .iter()
            .all(|s| s.strategy == MatchStrategy::Substring));
    }

    #[test]
    fn test_root_marker_is_skipped() {
        let h = hierarchy();
        let resolution = h.resolve_detailed(&["Республика Казахстан", "Казахстан"]);
        assert_eq!(resolution.skipped, vec!["Республика Казахстан"]);
        assert_eq!(resolution.queries, vec!["казахстан"]);
        assert_eq!(resolution.code(), Some("R"));
    }

    #[test]
    fn test_blank_name_matches_first_sibling() {
        let h = hierarchy();
        // An empty query is a substring of every name
        let resolution = h.resolve_detailed(&["Кызылординская область", " "]);
        assert!(resolution.skipped.is_empty());
        assert_eq!(resolution.queries, vec!["кызылординская область", ""]);
        assert_eq!(resolution.code(), Some("R"));
        assert_eq!(resolution.strategy(), Some(MatchStrategy::Substring));

        assert_eq!(h.resolve(&["  ", ""]), Some("A"));
        assert_eq!(h.resolve(&["Казахстан", "Кызылординская область", ""]), Some("B"));
    }

    #[test]
    fn test_find_by_parent_blank_name_takes_first_child() {
        let h = hierarchy();
        assert_eq!(h.find_by_parent("A", ""), Some("B"));
        assert_eq!(h.find_by_parent("S", ""), None);
    }

    #[test]
    fn test_substring_beats_token_overlap() {
        let h = hierarchy();
        // "район" also overlaps with "шиелі район", which comes first, but
        // every sibling is tried by substring before any token overlap
        let resolution = h.resolve_detailed(&["Казахстан", "Кызылординская", "Жалагаш р-н"]);
        assert_eq!(resolution.code(), Some("C"));
        assert_eq!(resolution.strategy(), Some(MatchStrategy::Substring));
    }

    #[test]
    fn test_token_overlap_match() {
        let h = hierarchy();
        let resolution = h.resolve_detailed(&["Казахстан", "область Кызылординская"]);
        assert_eq!(resolution.code(), Some("A"));
        assert_eq!(resolution.strategy(), Some(MatchStrategy::TokenOverlap));
    }

    #[test]
    fn test_partial_path_stops_early() {
        let h = hierarchy();
        let resolution = h.resolve_detailed(&["Казахстан", "Кызылординская область", "Тайга", "Жосалы"]);
        assert_eq!(resolution.code(), Some("A"));
        assert!(resolution.stopped_early);
        assert_eq!(resolution.unmatched, vec!["тайга"]);
    }

    #[test]
    fn test_skip_level_without_best_match() {
        let h = hierarchy();
        // First name matches nothing and there is no best match yet, so the
        // walk continues at the same frontier
        let resolution = h.resolve_detailed(&["Евразия", "Казахстан", "Кызылординская область"]);
        assert_eq!(resolution.code(), Some("A"));
        assert_eq!(resolution.unmatched, vec!["евразия"]);
        assert!(!resolution.stopped_early);
    }

    #[test]
    fn test_global_fallback_ignores_path() {
        let h = hierarchy();
        let resolution = h.resolve_detailed(&["Казахстан", "Кызылординская область", "Астана"]);
        // "астана" is not under the region, but the last name falls back to
        // a global scan
        assert_eq!(resolution.code(), Some("T"));
        assert_eq!(resolution.strategy(), Some(MatchStrategy::GlobalFallback));
    }

    #[test]
    fn test_last_name_unmatched_keeps_best() {
        let h = hierarchy();
        assert_eq!(h.resolve(&["Казахстан", "Кызылординская область", "Тайга"]), Some("A"));
    }

    #[test]
    fn test_no_match_has_no_code_or_strategy() {
        let h = hierarchy();
        let resolution = h.resolve_detailed(&["Тайга"]);
        assert!(!resolution.is_match());
        assert_eq!(resolution.code(), None);
        assert_eq!(resolution.strategy(), None);
        assert_eq!(resolution.unmatched, vec!["тайга"]);
    }

    #[test]
    fn test_fallback_only_at_last_position() {
        let h = hierarchy();
        // The second name repeats the last one but is not last itself, so it
        // stops the walk below the partial path instead of scanning globally
        let resolution =
            h.resolve_detailed(&["Казахстан", "Жосалы", "Кызылординская область", "Жосалы"]);
        assert_eq!(resolution.code(), Some("R"));
        assert!(resolution.stopped_early);
        assert_eq!(resolution.unmatched, vec!["жосалы"]);
        assert_eq!(h.resolve(&["Казахстан", "Кызылординская область", "Жосалы"]), Some("S"));
    }

    #[test]
    fn test_root_markers_from_struct_config_are_normalized() {
        let records = || {
            vec![
                ReferenceRecord::new("R", "Казахстан", None, 0),
                ReferenceRecord::new("A", "Кызылординская область", Some("R"), 1),
                ReferenceRecord::new("B", "Шиелі район", Some("A"), 2),
            ]
        };

        let config = MatcherConfig {
            root_markers: vec!["Республика  Казахстан".to_string(), " ".to_string()],
            ..MatcherConfig::default()
        };
        let h = CodeHierarchy::build_with(records(), &config).into_hierarchy();
        assert_eq!(h.root_markers(), ["республика казахстан"]);
        assert_eq!(h.resolve(&["Республика Казахстан"]), None);

        // A blank marker would be contained in every name
        let config = MatcherConfig {
            root_markers: vec![String::new()],
            ..MatcherConfig::default()
        };
        let h = CodeHierarchy::build_with(records(), &config).into_hierarchy();
        assert!(h.root_markers().is_empty());
        assert_eq!(
            h.resolve(&["Казахстан", "Кызылординская область", "Шиелі район"]),
            Some("B")
        );
    }

    #[test]
    fn test_alias_applied_to_queries() {
        let h = hierarchy();
        let resolution = h.resolve_detailed(&["Казахстан", "г. Нур-Султан"]);
        assert_eq!(resolution.queries, vec!["казахстан", "город астана"]);
        assert_eq!(resolution.code(), Some("T"));
    }

    #[test]
    fn test_custom_config() {
        let config = MatcherConfig::from_yaml(
            "root_markers: [\"қазақстан республикасы\"]\naliases:\n  - {from: \"Целиноград\", to: \"Астана\"}\n",
        )
        .unwrap();
        let records = vec![
            ReferenceRecord::new("R", "Қазақстан", None, 0),
            ReferenceRecord::new("T", "Астана", Some("R"), 1),
        ];
        let h = CodeHierarchy::build_with(records, &config).into_hierarchy();

        assert_eq!(h.resolve(&["Қазақстан Республикасы", "Целиноград"]), Some("T"));
        // Default aliases are replaced by the configured list
        assert_eq!(h.resolve(&["Нур-Султан"]), None);
    }

    #[test]
    fn test_find_by_parent() {
        let h = hierarchy();
        assert_eq!(h.find_by_parent("A", "Шиелі р-н"), Some("B"));
        assert_eq!(h.find_by_parent("A", "жалагаш"), Some("C"));
        assert_eq!(h.find_by_parent("A", "Астана"), None);
        assert_eq!(h.find_by_parent("UNKNOWN", "Шиелі"), None);
    }

    #[test]
    fn test_find_by_parent_has_no_token_overlap() {
        let h = hierarchy();
        // Shares only "район" with both children
        assert_eq!(h.find_by_parent("A", "Сырдарьинский район"), None);
    }
}
