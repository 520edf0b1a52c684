//! # Include Resolution
//!
//! Recursive substitution of `!include` directives.
//!
//! ## Algorithm
//!
//! For each node, depth-first:
//!
//! 1. `Undefined` is returned untouched.
//! 2. An include-tagged node must be a scalar. Its text is joined with the
//!    current base directory (absolute paths replace it) and canonicalized.
//!    The target must not be in the [`VisitedSet`] and must exist. It is then
//!    recorded, loaded, resolved against **its own parent directory**, and
//!    returned in place of the directive.
//! 3. Mapping values and sequence elements are resolved in order, with the
//!    same base directory. Mapping keys are never resolved.
//! 4. Everything else is returned untouched, tags included. Under
//!    [`IncludeTagPolicy::Exact`] a namespaced include tag such as
//!    `tag:yaml.org,2002:include` is left in place and logged at `warn!`.
//!
//! ## Invariants
//!
//! - A canonical path enters the visited set at most once per load. A second
//!   encounter is an [`ResolveError::IncludeCycle`], whether it arrives
//!   through a true cycle or through a sibling branch.
//! - A successful result contains no node whose tag matches the policy.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use yconf_core::{canonicalize_best_effort, Mapping, Node, NodeKind, ResolveError};

use crate::source::TreeSource;

/// The include marker tag.
pub const INCLUDE_TAG: &str = "!include";

/// Which tags count as include directives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IncludeTagPolicy {
    /// Only the exact `!include` tag.
    #[default]
    Exact,
    /// `!include`, or any tag containing `:include` (for example
    /// `tag:example.com,2024:include`). Matches legacy configuration files
    /// that spell the marker as a URI tag.
    Permissive,
}

impl IncludeTagPolicy {
    /// Returns true if `tag` marks an include directive under this policy.
    pub fn matches(self, tag: &str) -> bool {
        match self {
            IncludeTagPolicy::Exact => tag == INCLUDE_TAG,
            IncludeTagPolicy::Permissive => tag == INCLUDE_TAG || tag.contains(":include"),
        }
    }
}

// ---------------------------------------------------------------------------
// VisitedSet
// ---------------------------------------------------------------------------

/// Canonical paths already loaded during one top-level load.
///
/// Used only to detect cycles; it never caches parsed content. Create one
/// per load: sharing a set between unrelated loads produces spurious cycle
/// errors.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    paths: HashSet<PathBuf>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set that already contains the root file of a load.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let mut set = Self::new();
        set.insert(root.into());
        set
    }

    /// Record `path`. Returns false if it was already present.
    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.paths.insert(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Visited paths in sorted order.
    pub fn sorted(&self) -> Vec<&Path> {
        let mut paths: Vec<&Path> = self.paths.iter().map(PathBuf::as_path).collect();
        paths.sort();
        paths
    }
}

// ---------------------------------------------------------------------------
// IncludeResolver
// ---------------------------------------------------------------------------

/// Resolves include directives in document trees loaded from `S`.
#[derive(Debug)]
pub struct IncludeResolver<'s, S: ?Sized> {
    source: &'s S,
    policy: IncludeTagPolicy,
}

impl<'s, S: TreeSource + ?Sized> IncludeResolver<'s, S> {
    pub fn new(source: &'s S, policy: IncludeTagPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> IncludeTagPolicy {
        self.policy
    }

    /// Resolve every include directive in `node`.
    ///
    /// `base_dir` is the directory of the file `node` came from. `visited`
    /// is shared with every nested and sibling resolution of the same load.
    ///
    /// # Errors
    ///
    /// Returns the first [`ResolveError`] encountered; the partially
    /// resolved tree is discarded.
    pub fn resolve(
        &self,
        node: Node,
        base_dir: &Path,
        visited: &mut VisitedSet,
    ) -> Result<Node, ResolveError> {
        if !node.is_defined() {
            return Ok(node);
        }
        match node.tag() {
            Some(tag) if self.policy.matches(tag) => {
                return self.splice(node, base_dir, visited);
            }
            Some(tag) if IncludeTagPolicy::Permissive.matches(tag) => {
                warn!(
                    tag,
                    base_dir = %base_dir.display(),
                    "namespaced include tag left unresolved"
                );
            }
            _ => {}
        }

        let (tag, kind) = node.into_parts();
        let kind = match kind {
            NodeKind::Mapping(map) => {
                let mut resolved = Mapping::new();
                for (key, value) in map {
                    resolved.insert(key, self.resolve(value, base_dir, visited)?);
                }
                NodeKind::Mapping(resolved)
            }
            NodeKind::Sequence(items) => NodeKind::Sequence(
                items
                    .into_iter()
                    .map(|item| self.resolve(item, base_dir, visited))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            other => other,
        };
        Ok(Node::from_parts(tag, kind))
    }

    /// Replace an include directive with the resolved contents of its target.
    fn splice(
        &self,
        node: Node,
        base_dir: &Path,
        visited: &mut VisitedSet,
    ) -> Result<Node, ResolveError> {
        let NodeKind::Scalar(reference) = node.kind() else {
            return Err(ResolveError::MalformedInclude {
                found: node.kind_name(),
                base_dir: base_dir.display().to_string(),
            });
        };
        if reference.trim().is_empty() {
            return Err(ResolveError::EmptyIncludePath {
                base_dir: base_dir.display().to_string(),
            });
        }

        // `join` keeps absolute references as they are.
        let target = canonicalize_best_effort(&base_dir.join(reference));
        if target.as_os_str().is_empty() {
            return Err(ResolveError::EmptyIncludePath {
                base_dir: base_dir.display().to_string(),
            });
        }
        if visited.contains(&target) {
            return Err(ResolveError::IncludeCycle {
                path: target.display().to_string(),
            });
        }
        if !target.exists() {
            return Err(ResolveError::IncludeNotFound {
                path: target.display().to_string(),
            });
        }
        visited.insert(target.clone());

        debug!(
            path = %target.display(),
            base_dir = %base_dir.display(),
            "resolving include"
        );

        let included = self.source.load_one(&target)?;
        let nested_base = target.parent().unwrap_or(base_dir);
        self.resolve(included, nested_base, visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::YamlFileSource;

    struct Fixture {
        dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn write(&self, rel: &str, text: &str) -> PathBuf {
            let path = self.dir.path().join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&path, text).unwrap();
            path
        }

        fn root(&self) -> PathBuf {
            std::fs::canonicalize(self.dir.path()).unwrap()
        }
    }

    fn resolve_in(dir: &Path, node: Node) -> Result<Node, ResolveError> {
        let resolver = IncludeResolver::new(&YamlFileSource, IncludeTagPolicy::Exact);
        resolver.resolve(node, dir, &mut VisitedSet::new())
    }

    fn include(path: &str) -> Node {
        Node::scalar(path).with_tag(INCLUDE_TAG)
    }

    #[test]
    fn exact_policy_matches_only_include() {
        assert!(IncludeTagPolicy::Exact.matches("!include"));
        assert!(!IncludeTagPolicy::Exact.matches("tag:yaml.org,2002:include"));
        assert!(!IncludeTagPolicy::Exact.matches("!includes"));
    }

    #[test]
    fn permissive_policy_matches_uri_suffix() {
        assert!(IncludeTagPolicy::Permissive.matches("!include"));
        assert!(IncludeTagPolicy::Permissive.matches("tag:example.com,2024:include"));
        assert!(!IncludeTagPolicy::Permissive.matches("!env"));
    }

    #[test]
    fn undefined_is_returned_unchanged() {
        let fx = Fixture::new();
        let out = resolve_in(&fx.root(), Node::undefined()).unwrap();
        assert!(!out.is_defined());
    }

    #[test]
    fn include_free_tree_is_identity() {
        let fx = Fixture::new();
        let tree = Node::mapping([
            ("name", Node::scalar("svc")),
            ("secret", Node::scalar("TOKEN").with_tag("!env")),
            ("list", Node::sequence(vec![Node::null(), Node::scalar("1")])),
        ]);
        assert_eq!(resolve_in(&fx.root(), tree.clone()).unwrap(), tree);
    }

    #[test]
    fn scalar_include_is_replaced_by_target() {
        let fx = Fixture::new();
        fx.write("b.yaml", "k: 1\n");

        let out = resolve_in(&fx.root(), include("b.yaml")).unwrap();
        assert_eq!(out, Node::mapping([("k", Node::scalar("1"))]));
        assert_eq!(out.tag(), None);
    }

    #[test]
    fn include_may_yield_any_node_kind() {
        let fx = Fixture::new();
        fx.write("list.yaml", "- a\n- b\n");
        fx.write("word.yaml", "hello\n");

        let tree = Node::mapping([("l", include("list.yaml")), ("w", include("word.yaml"))]);
        let out = resolve_in(&fx.root(), tree).unwrap();
        assert!(out.get("l").is_some_and(Node::is_sequence));
        assert_eq!(out.get("w"), Some(&Node::scalar("hello")));
    }

    #[test]
    fn nested_includes_resolve_against_their_own_directory() {
        let fx = Fixture::new();
        fx.write("conf/db.yaml", "host: !include parts/host.yaml\n");
        fx.write("conf/parts/host.yaml", "db.internal\n");
        // A decoy at the root-relative spelling must not be picked up.
        fx.write("parts/host.yaml", "wrong\n");

        let out = resolve_in(&fx.root(), Node::mapping([("db", include("conf/db.yaml"))])).unwrap();
        let db = out.get("db").unwrap();
        assert_eq!(db.get("host"), Some(&Node::scalar("db.internal")));
    }

    #[test]
    fn absolute_include_ignores_base_dir() {
        let fx = Fixture::new();
        let target = fx.write("abs/target.yaml", "v: 2\n");
        let elsewhere = fx.root().join("unrelated");

        let out = resolve_in(&elsewhere, include(&target.display().to_string())).unwrap();
        assert_eq!(out.get("v"), Some(&Node::scalar("2")));
    }

    #[test]
    fn sequence_elements_are_resolved_in_place() {
        let fx = Fixture::new();
        fx.write("one.yaml", "1\n");
        fx.write("two.yaml", "2\n");

        let tree = Node::sequence(vec![include("one.yaml"), Node::scalar("mid"), include("two.yaml")]);
        let out = resolve_in(&fx.root(), tree).unwrap();
        assert_eq!(
            out,
            Node::sequence(vec![Node::scalar("1"), Node::scalar("mid"), Node::scalar("2")])
        );
    }

    #[test]
    fn include_on_mapping_is_malformed() {
        let fx = Fixture::new();
        let bad = Node::mapping([("path", Node::scalar("x.yaml"))]).with_tag(INCLUDE_TAG);
        let err = resolve_in(&fx.root(), bad).unwrap_err();
        assert!(
            matches!(err, ResolveError::MalformedInclude { found: "mapping", .. }),
            "got {err}"
        );
    }

    #[test]
    fn include_on_null_is_malformed() {
        let fx = Fixture::new();
        let err = resolve_in(&fx.root(), Node::null().with_tag(INCLUDE_TAG)).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedInclude { .. }), "got {err}");
    }

    #[test]
    fn blank_include_is_empty_path() {
        let fx = Fixture::new();
        let err = resolve_in(&fx.root(), include("  ")).unwrap_err();
        assert!(matches!(err, ResolveError::EmptyIncludePath { .. }), "got {err}");
    }

    #[test]
    fn missing_target_names_absolute_path() {
        let fx = Fixture::new();
        let err = resolve_in(&fx.root(), include("nope/missing.yaml")).unwrap_err();
        let expected = fx.root().join("nope").join("missing.yaml");
        match err {
            ResolveError::IncludeNotFound { path } => {
                assert_eq!(path, expected.display().to_string())
            }
            other => panic!("expected IncludeNotFound, got {other}"),
        }
    }

    #[test]
    fn self_include_is_a_cycle() {
        let fx = Fixture::new();
        let a = fx.write("a.yaml", "me: !include a.yaml\n");

        let resolver = IncludeResolver::new(&YamlFileSource, IncludeTagPolicy::Exact);
        let mut visited = VisitedSet::new();
        let err = resolver
            .resolve(include("a.yaml"), &fx.root(), &mut visited)
            .unwrap_err();
        match err {
            ResolveError::IncludeCycle { path } => {
                assert_eq!(path, std::fs::canonicalize(a).unwrap().display().to_string())
            }
            other => panic!("expected IncludeCycle, got {other}"),
        }
    }

    #[test]
    fn transitive_cycle_is_detected() {
        let fx = Fixture::new();
        fx.write("a.yaml", "next: !include b.yaml\n");
        fx.write("b.yaml", "next: !include c.yaml\n");
        fx.write("c.yaml", "next: !include a.yaml\n");

        let err = resolve_in(&fx.root(), include("a.yaml")).unwrap_err();
        assert!(matches!(err, ResolveError::IncludeCycle { .. }), "got {err}");
    }

    #[test]
    fn differently_spelled_reinclude_is_a_cycle() {
        let fx = Fixture::new();
        fx.write("sub/x.yaml", "again: !include ../sub/./x.yaml\n");

        let err = resolve_in(&fx.root(), include("sub/x.yaml")).unwrap_err();
        assert!(matches!(err, ResolveError::IncludeCycle { .. }), "got {err}");
    }

    #[test]
    fn sibling_reinclude_is_rejected() {
        let fx = Fixture::new();
        fx.write("shared.yaml", "v: 1\n");

        let tree = Node::mapping([("a", include("shared.yaml")), ("b", include("shared.yaml"))]);
        let err = resolve_in(&fx.root(), tree).unwrap_err();
        assert!(matches!(err, ResolveError::IncludeCycle { .. }), "got {err}");
    }

    #[test]
    fn visited_set_records_every_target() {
        let fx = Fixture::new();
        fx.write("a.yaml", "b: !include b.yaml\n");
        fx.write("b.yaml", "leaf\n");

        let resolver = IncludeResolver::new(&YamlFileSource, IncludeTagPolicy::Exact);
        let mut visited = VisitedSet::new();
        resolver
            .resolve(include("a.yaml"), &fx.root(), &mut visited)
            .unwrap();
        assert_eq!(visited.len(), 2);
        assert!(visited.contains(&fx.root().join("b.yaml")));
    }

    #[test]
    fn target_with_bad_yaml_is_load_failure() {
        let fx = Fixture::new();
        fx.write("bad.yaml", "a: [1, 2\n");

        let err = resolve_in(&fx.root(), include("bad.yaml")).unwrap_err();
        assert!(matches!(err, ResolveError::LoadFailure(_)), "got {err}");
    }

    #[test]
    fn uri_tag_is_ignored_under_exact_policy() {
        let fx = Fixture::new();
        let node = Node::scalar("b.yaml").with_tag("tag:example.com,2024:include");
        assert_eq!(resolve_in(&fx.root(), node.clone()).unwrap(), node);
    }

    #[test]
    fn uri_tag_is_resolved_under_permissive_policy() {
        let fx = Fixture::new();
        fx.write("b.yaml", "k: v\n");

        let resolver = IncludeResolver::new(&YamlFileSource, IncludeTagPolicy::Permissive);
        let node = Node::scalar("b.yaml").with_tag("tag:example.com,2024:include");
        let out = resolver
            .resolve(node, &fx.root(), &mut VisitedSet::new())
            .unwrap();
        assert_eq!(out.get("k"), Some(&Node::scalar("v")));
    }

    #[test]
    fn visited_set_with_root_and_sorted() {
        let mut set = VisitedSet::with_root("/b.yaml");
        assert!(set.insert(PathBuf::from("/a.yaml")));
        assert!(!set.insert(PathBuf::from("/b.yaml")));
        assert_eq!(set.sorted(), vec![Path::new("/a.yaml"), Path::new("/b.yaml")]);
        assert!(!set.is_empty());
    }
}
