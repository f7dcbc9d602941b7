//! Language table registry
//!
//! Maps language names to ordered rule tables, records which language
//! extends which, and maps file extensions to languages. Inheritance is
//! resolved at lookup time, so a parent may be registered after its child.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use super::builtin;
use super::rules::{Rule, RuleDef};
use crate::error::HighlightError;

/// Outcome of one `register` call
#[derive(Debug, Default)]
pub struct Registration {
    /// Rules that were compiled and stored
    pub accepted: usize,
    /// Entries that were dropped, as `MalformedRule` errors
    pub dropped: Vec<HighlightError>,
    /// The call was a no-op because a table already existed
    pub skipped: bool,
}

/// Registry of language tables
pub struct Registry {
    /// Own rules per language, in priority order
    tables: HashMap<String, Vec<Arc<Rule>>>,
    /// Child language -> parent language
    parents: HashMap<String, String>,
    /// Extension to language name mapping
    extension_map: HashMap<String, String>,
}

impl Registry {
    /// Create a registry with the built-in languages
    pub fn new() -> Self {
        let mut registry = Self::empty();

        for lang in builtin::all_languages() {
            registry.register(lang.name, lang.rules, true);
            for ext in lang.extensions {
                registry.add_extension(ext, lang.name);
            }
        }

        registry
    }

    /// Create a registry with no languages at all
    pub fn empty() -> Self {
        Self {
            tables: HashMap::new(),
            parents: HashMap::new(),
            extension_map: HashMap::new(),
        }
    }

    /// Store `rules` as the table for `language`.
    ///
    /// With `keep_existing` set, an existing table is left alone. Malformed
    /// entries are logged and dropped; the rest still register.
    pub fn register<I>(&mut self, language: &str, rules: I, keep_existing: bool) -> Registration
    where
        I: IntoIterator<Item = RuleDef>,
    {
        self.register_entries(language, rules.into_iter().map(Ok::<_, String>), keep_existing)
    }

    /// Like `register`, for entries that may have failed to parse.
    ///
    /// An `Err(reason)` entry is dropped as a malformed rule at its own
    /// position, so indices in the report match the source table.
    pub fn register_entries<I>(&mut self, language: &str, entries: I, keep_existing: bool) -> Registration
    where
        I: IntoIterator<Item = std::result::Result<RuleDef, String>>,
    {
        if keep_existing && self.tables.contains_key(language) {
            debug!(language, "table exists, keeping it");
            return Registration {
                skipped: true,
                ..Default::default()
            };
        }

        let mut registration = Registration::default();
        let mut table = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            let compiled = entry
                .map_err(|reason| HighlightError::MalformedRule {
                    language: language.to_string(),
                    index,
                    reason,
                })
                .and_then(|def| def.compile(language, index));
            match compiled {
                Ok(rule) => table.push(Arc::new(rule)),
                Err(err) => {
                    warn!(%err, "dropping rule");
                    registration.dropped.push(err);
                }
            }
        }

        registration.accepted = table.len();
        if self.tables.insert(language.to_string(), table).is_some() {
            debug!(language, rules = registration.accepted, "replaced table");
        } else {
            debug!(language, rules = registration.accepted, "registered table");
        }
        registration
    }

    /// Make `language` resolve to its own rules followed by `parent`'s.
    ///
    /// A second call for the same language replaces its parent.
    pub fn extend(&mut self, language: &str, parent: &str) {
        if let Some(old) = self.parents.insert(language.to_string(), parent.to_string()) {
            if old != parent {
                debug!(language, old = %old, parent, "replaced parent");
            }
        }
    }

    /// Parent of `language`, if it extends one
    pub fn parent(&self, language: &str) -> Option<&str> {
        self.parents.get(language).map(|s| s.as_str())
    }

    /// Own rules of `language`, without inherited ones
    pub fn rules(&self, language: &str) -> &[Arc<Rule>] {
        self.tables.get(language).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Full ordered rule list of `language`: own rules, then the parent's
    /// resolved rules. Empty for unknown languages. An inheritance cycle is
    /// cut where it closes.
    pub fn resolve(&self, language: &str) -> Vec<Arc<Rule>> {
        let mut resolved = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(language);

        while let Some(name) = current {
            if !visited.insert(name) {
                let err = HighlightError::CyclicExtension {
                    language: language.to_string(),
                    via: name.to_string(),
                };
                warn!(%err, "truncating inheritance chain");
                break;
            }
            resolved.extend(self.rules(name).iter().cloned());
            current = self.parent(name);
        }

        resolved
    }

    /// Check if `language` has a table or extends another language
    pub fn contains(&self, language: &str) -> bool {
        self.tables.contains_key(language) || self.parents.contains_key(language)
    }

    /// Map a file extension (without the dot) to a language
    pub fn add_extension(&mut self, ext: &str, language: &str) {
        self.extension_map.insert(ext.to_lowercase(), language.to_string());
    }

    /// Detect language from filename
    pub fn detect_language(&self, filename: &Path) -> Option<&str> {
        let ext = filename.extension()?.to_str()?.to_lowercase();
        self.extension_map.get(&ext).map(|s| s.as_str())
    }

    /// List known languages, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<_> = self
            .tables
            .keys()
            .chain(self.parents.keys())
            .map(|s| s.as_str())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        names.sort();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[Arc<Rule>]) -> Vec<&str> {
        rules.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_builtins_registered() {
        let registry = Registry::new();
        assert_eq!(registry.languages(), vec!["c", "lispy"]);
        assert!(!registry.resolve("c").is_empty());
        assert!(!registry.resolve("lispy").is_empty());
    }

    #[test]
    fn test_detect_language() {
        let registry = Registry::new();
        assert_eq!(registry.detect_language(Path::new("main.c")), Some("c"));
        assert_eq!(registry.detect_language(Path::new("mpc.H")), Some("c"));
        assert_eq!(registry.detect_language(Path::new("prelude.lspy")), Some("lispy"));
        assert_eq!(registry.detect_language(Path::new("no_extension")), None);
    }

    #[test]
    fn test_register_replaces_unless_kept() {
        let mut registry = Registry::empty();
        registry.register("x", vec![RuleDef::new("a", "a")], false);

        let kept = registry.register("x", vec![RuleDef::new("b", "b")], true);
        assert!(kept.skipped);
        assert_eq!(names(&registry.resolve("x")), vec!["a"]);

        let replaced = registry.register("x", vec![RuleDef::new("b", "b")], false);
        assert!(!replaced.skipped);
        assert_eq!(names(&registry.resolve("x")), vec!["b"]);
    }

    #[test]
    fn test_unparsed_entries_keep_their_index() {
        let mut registry = Registry::empty();
        let registration = registry.register_entries(
            "x",
            vec![
                Ok(RuleDef::new("a", "a")),
                Err("unknown field `patern`".to_string()),
                Ok(RuleDef::new("b", "b")),
            ],
            false,
        );

        assert_eq!(registration.accepted, 2);
        assert!(matches!(
            &registration.dropped[..],
            [HighlightError::MalformedRule { index: 1, reason, .. }] if reason.contains("patern")
        ));
        assert_eq!(names(&registry.resolve("x")), vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_rules_dropped() {
        let mut registry = Registry::empty();
        let missing_pattern = RuleDef {
            name: Some("comment".to_string()),
            ..Default::default()
        };
        let registration = registry.register(
            "x",
            vec![RuleDef::new("a", "a"), missing_pattern, RuleDef::new("b", "(")],
            false,
        );
        assert_eq!(registration.accepted, 1);
        assert_eq!(registration.dropped.len(), 2);
        assert!(matches!(
            registration.dropped[0],
            HighlightError::MalformedRule { index: 1, .. }
        ));
        assert_eq!(names(&registry.resolve("x")), vec!["a"]);
    }

    #[test]
    fn test_extend_chain() {
        let mut registry = Registry::empty();
        registry.extend("c99", "c");
        registry.extend("c", "base");
        registry.register("c99", vec![RuleDef::new("restrict", "restrict")], false);
        registry.register("base", vec![RuleDef::new("ident", r"\w+")], false);
        // parent registered after the child still resolves
        registry.register("c", vec![RuleDef::new("int", "int")], false);

        assert_eq!(names(&registry.resolve("c99")), vec!["restrict", "int", "ident"]);
        assert_eq!(registry.parent("c99"), Some("c"));
        assert!(registry.contains("c99"));
    }

    #[test]
    fn test_extend_without_own_table() {
        let mut registry = Registry::empty();
        registry.register("c", vec![RuleDef::new("int", "int")], false);
        registry.extend("alias", "c");
        assert!(registry.contains("alias"));
        assert!(registry.rules("alias").is_empty());
        assert_eq!(names(&registry.resolve("alias")), vec!["int"]);
    }

    #[test]
    fn test_cycles_are_cut() {
        let mut registry = Registry::empty();
        registry.register("a", vec![RuleDef::new("a", "a")], false);
        registry.register("b", vec![RuleDef::new("b", "b")], false);
        registry.extend("a", "b");
        registry.extend("b", "a");
        assert_eq!(names(&registry.resolve("a")), vec!["a", "b"]);
        assert_eq!(names(&registry.resolve("b")), vec!["b", "a"]);

        registry.extend("self", "self");
        registry.register("self", vec![RuleDef::new("s", "s")], false);
        assert_eq!(names(&registry.resolve("self")), vec!["s"]);
    }

    #[test]
    fn test_unknown_language() {
        let registry = Registry::new();
        assert!(registry.resolve("cobol").is_empty());
        assert!(!registry.contains("cobol"));
    }
}
