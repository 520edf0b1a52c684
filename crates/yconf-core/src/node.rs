//! # Document Tree
//!
//! [`Node`] is the in-memory form of one configuration document, before or
//! after include resolution. Each node pairs a [`NodeKind`] with an optional
//! tag (`!include`, `!env`, ...). Tags are metadata: two nodes with equal
//! content but different tags are different nodes.
//!
//! ## Scalars
//!
//! Booleans and numbers are carried as their scalar text (`true`, `42`).
//! Nothing downstream distinguishes numeric-looking scalars from strings.
//!
//! ## Null vs Undefined
//!
//! `Null` is an explicit YAML null (`~`, `null`, or an empty value). It is a
//! *defined* value that is not a scalar. `Undefined` means "no document at
//! all" and only appears when a file holds zero documents or a caller builds
//! one explicitly.

use std::fmt;

/// A document tree node: a kind plus an optional tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    tag: Option<String>,
    kind: NodeKind,
}

/// The content of a [`Node`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    /// No value at all.
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    /// Scalar text.
    Scalar(String),
    /// Ordered list of nodes.
    Sequence(Vec<Node>),
    /// Ordered map with unique string keys.
    Mapping(Mapping),
}

impl Node {
    /// An undefined node.
    pub fn undefined() -> Self {
        Self::default()
    }

    /// An explicit null.
    pub fn null() -> Self {
        Self::from(NodeKind::Null)
    }

    /// A scalar holding `text`.
    pub fn scalar(text: impl Into<String>) -> Self {
        Self::from(NodeKind::Scalar(text.into()))
    }

    /// A sequence of `items`.
    pub fn sequence(items: Vec<Node>) -> Self {
        Self::from(NodeKind::Sequence(items))
    }

    /// A mapping built from `(key, value)` pairs. Later duplicates overwrite
    /// earlier ones.
    pub fn mapping<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Node)>) -> Self {
        Self::from(NodeKind::Mapping(
            pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Attach `tag` to this node, replacing any previous tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Remove and return the tag.
    pub fn take_tag(&mut self) -> Option<String> {
        self.tag.take()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Consume the node, dropping its tag.
    pub fn into_kind(self) -> NodeKind {
        self.kind
    }

    /// Consume the node into its tag and kind.
    pub fn into_parts(self) -> (Option<String>, NodeKind) {
        (self.tag, self.kind)
    }

    /// Rebuild a node from a tag and kind.
    pub fn from_parts(tag: Option<String>, kind: NodeKind) -> Self {
        Self { tag, kind }
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self.kind, NodeKind::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self.kind, NodeKind::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, NodeKind::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.kind, NodeKind::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.kind, NodeKind::Mapping(_))
    }

    /// Scalar text, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Sequence items, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Node]> {
        match &self.kind {
            NodeKind::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Mapping entries, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match &self.kind {
            NodeKind::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Short lowercase name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Returns true if this node or any descendant carries a tag for which
    /// `pred` holds.
    pub fn any_tag(&self, pred: &dyn Fn(&str) -> bool) -> bool {
        if self.tag().is_some_and(pred) {
            return true;
        }
        match &self.kind {
            NodeKind::Sequence(items) => items.iter().any(|item| item.any_tag(pred)),
            NodeKind::Mapping(map) => map.values().any(|value| value.any_tag(pred)),
            _ => false,
        }
    }
}

impl NodeKind {
    /// Short lowercase name of the kind, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Undefined => "undefined",
            NodeKind::Null => "null",
            NodeKind::Scalar(_) => "scalar",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Mapping(_) => "mapping",
        }
    }
}

impl From<NodeKind> for Node {
    fn from(kind: NodeKind) -> Self {
        Self { tag: None, kind }
    }
}

impl From<Mapping> for Node {
    fn from(map: Mapping) -> Self {
        Self::from(NodeKind::Mapping(map))
    }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// Insertion-ordered map with unique string keys.
///
/// Inserting an existing key replaces its value in place, so the key keeps
/// the position of its first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Node) -> Option<Node> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Node> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl FromIterator<(String, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        let mut map = Mapping::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl IntoIterator for Mapping {
    type Item = (String, Node);
    type IntoIter = std::vec::IntoIter<(String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_node_is_undefined() {
        let node = Node::default();
        assert!(!node.is_defined());
        assert_eq!(node.kind_name(), "undefined");
        assert_eq!(node.tag(), None);
    }

    #[test]
    fn null_is_defined_but_not_scalar() {
        let node = Node::null();
        assert!(node.is_defined());
        assert!(node.is_null());
        assert!(!node.is_scalar());
    }

    #[test]
    fn mapping_insert_overwrites_in_place() {
        let mut map = Mapping::new();
        map.insert("a", Node::scalar("1"));
        map.insert("b", Node::scalar("2"));
        let old = map.insert("a", Node::scalar("3"));

        assert_eq!(old, Some(Node::scalar("1")));
        assert_eq!(map.len(), 2);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Node::scalar("3")));
    }

    #[test]
    fn mapping_from_iter_keeps_last_duplicate() {
        let node = Node::mapping([("k", Node::scalar("x")), ("k", Node::scalar("y"))]);
        assert_eq!(node.as_mapping().map(Mapping::len), Some(1));
        assert_eq!(node.get("k"), Some(&Node::scalar("y")));
    }

    #[test]
    fn get_on_non_mapping_is_none() {
        assert!(Node::scalar("x").get("x").is_none());
        assert!(Node::sequence(vec![]).get("0").is_none());
    }

    #[test]
    fn tags_are_part_of_identity() {
        let plain = Node::scalar("b.yaml");
        let tagged = Node::scalar("b.yaml").with_tag("!include");
        assert_ne!(plain, tagged);
        assert_eq!(tagged.tag(), Some("!include"));
    }

    #[test]
    fn take_tag_strips_metadata() {
        let mut node = Node::scalar("x").with_tag("!env");
        assert_eq!(node.take_tag().as_deref(), Some("!env"));
        assert_eq!(node, Node::scalar("x"));
    }

    #[test]
    fn any_tag_finds_nested_tags() {
        let tree = Node::mapping([(
            "outer",
            Node::sequence(vec![Node::scalar("a"), Node::scalar("b").with_tag("!include")]),
        )]);
        assert!(tree.any_tag(&|t| t == "!include"));
        assert!(!tree.any_tag(&|t| t == "!env"));
    }

    #[test]
    fn into_parts_round_trips() {
        let node = Node::sequence(vec![Node::null()]).with_tag("!list");
        let (tag, kind) = node.clone().into_parts();
        assert_eq!(Node::from_parts(tag, kind), node);
    }

    #[test]
    fn kind_names() {
        assert_eq!(Node::null().kind_name(), "null");
        assert_eq!(Node::scalar("").kind_name(), "scalar");
        assert_eq!(Node::sequence(vec![]).kind_name(), "sequence");
        assert_eq!(Node::from(Mapping::new()).kind_name(), "mapping");
        assert_eq!(NodeKind::Null.to_string(), "null");
    }
}
