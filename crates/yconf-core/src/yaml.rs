//! # YAML Boundary
//!
//! Conversion between YAML text and [`Node`] trees.
//!
//! ## Inbound
//!
//! [`parse_documents`] drives a `yaml-rust2` event parser and builds one
//! tree per top-level document:
//!
//! - Scalars keep the text as written (`1.10` stays `1.10`, `0x1F` stays
//!   `0x1F`). Only an untagged plain `""`, `~`, `null`, `Null` or `NULL`,
//!   or a scalar tagged `!!null`, becomes [`NodeKind::Null`].
//! - Tags are kept in full: the resolved handle followed by the suffix. So
//!   `!include` is `"!include"`, `!!include` is
//!   `"tag:yaml.org,2002:include"`, and `!<tag:x,2024:include>` is
//!   `"tag:x,2024:include"`. The non-specific `!` tag only forces a string.
//! - Aliases are expanded into copies of the anchored node.
//! - Mapping keys are the raw text of a scalar key. A sequence or mapping
//!   key is rejected with [`LoadError::UnsupportedKey`].
//! - A stream with no documents (empty, or only comments) yields none.
//!
//! ## Outbound
//!
//! [`emit`] renders a tree for human inspection through `serde_yaml`.
//! Scalars whose text reads back as the same boolean or number are emitted
//! plain; everything else is emitted as a string so that re-reading the
//! output yields the same tree. Core-schema type tags (`!!str`, `!!int`, …)
//! are not written back. Other tags that do not start with `!` are written
//! in local form (`!tag:x,2024:include`), which is the only spelling the
//! emitter supports.

use std::collections::HashMap;

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::Value;
use yaml_rust2::parser::{Event, Parser, Tag as EventTag};
use yaml_rust2::scanner::TScalarStyle;

use crate::error::LoadError;
use crate::node::{Mapping, Node, NodeKind};

/// Prefix that `!!` expands to.
pub const CORE_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// Core-schema type names that describe a value rather than mark it.
const CORE_TYPES: [&str; 7] = ["str", "int", "float", "bool", "null", "map", "seq"];

/// Parse every top-level document in `text`. `origin` names the source in
/// error messages.
pub fn parse_documents(text: &str, origin: &str) -> Result<Vec<Node>, LoadError> {
    let mut parser = Parser::new_from_str(text);
    let mut builder = TreeBuilder::default();
    loop {
        let (event, _) = parser.next_token().map_err(|e| LoadError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        })?;
        if matches!(event, Event::StreamEnd) {
            break;
        }
        builder.accept(event).map_err(|key| LoadError::UnsupportedKey {
            path: origin.to_string(),
            key,
        })?;
    }
    Ok(builder.documents)
}

// ---------------------------------------------------------------------------
// Event-to-tree builder
// ---------------------------------------------------------------------------

/// A collection whose end event has not arrived yet.
enum Frame {
    Sequence {
        anchor: usize,
        tag: Option<String>,
        items: Vec<Node>,
    },
    Mapping {
        anchor: usize,
        tag: Option<String>,
        map: Mapping,
        key: Option<String>,
    },
}

impl Frame {
    fn awaits_key(&self) -> bool {
        matches!(self, Frame::Mapping { key: None, .. })
    }
}

#[derive(Default)]
struct TreeBuilder {
    documents: Vec<Node>,
    stack: Vec<Frame>,
    root: Option<Node>,
    anchors: HashMap<usize, Node>,
}

impl TreeBuilder {
    /// Feed one event. Fails with a rendering of the offending key when a
    /// mapping key is not a scalar.
    fn accept(&mut self, event: Event) -> Result<(), String> {
        match event {
            Event::Nothing | Event::StreamStart | Event::StreamEnd | Event::DocumentStart => {}
            Event::DocumentEnd => {
                self.stack.clear();
                if let Some(root) = self.root.take() {
                    self.documents.push(root);
                }
            }
            Event::Alias(id) => {
                let node = self.anchors.get(&id).cloned().unwrap_or_else(Node::null);
                self.complete(node, 0)?;
            }
            Event::Scalar(text, style, anchor, tag) => {
                if self.stack.last().is_some_and(Frame::awaits_key) {
                    if let Some(Frame::Mapping { key, .. }) = self.stack.last_mut() {
                        *key = Some(text.clone());
                    }
                    if anchor != 0 {
                        self.anchors.insert(anchor, Node::scalar(text));
                    }
                } else {
                    self.complete(scalar_node(text, style, tag), anchor)?;
                }
            }
            Event::SequenceStart(anchor, tag) => self.stack.push(Frame::Sequence {
                anchor,
                tag: tag.and_then(full_tag),
                items: Vec::new(),
            }),
            Event::MappingStart(anchor, tag) => self.stack.push(Frame::Mapping {
                anchor,
                tag: tag.and_then(full_tag),
                map: Mapping::new(),
                key: None,
            }),
            Event::SequenceEnd | Event::MappingEnd => {
                let (anchor, node) = match self.stack.pop() {
                    Some(Frame::Sequence { anchor, tag, items }) => {
                        (anchor, tagged(Node::sequence(items), tag))
                    }
                    Some(Frame::Mapping { anchor, tag, map, .. }) => {
                        (anchor, tagged(Node::from(map), tag))
                    }
                    None => return Ok(()),
                };
                self.complete(node, anchor)?;
            }
        }
        Ok(())
    }

    /// Place a finished node into its parent, or make it the document root.
    fn complete(&mut self, node: Node, anchor: usize) -> Result<(), String> {
        if anchor != 0 {
            self.anchors.insert(anchor, node.clone());
        }
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping { map, key, .. }) => match key.take() {
                Some(name) => {
                    map.insert(name, node);
                }
                None => *key = Some(key_text(node)?),
            },
        }
        Ok(())
    }
}

fn scalar_node(text: String, style: TScalarStyle, tag: Option<EventTag>) -> Node {
    let untagged_plain = tag.is_none() && style == TScalarStyle::Plain;
    let tag = tag.and_then(full_tag);
    let is_null = if untagged_plain {
        matches!(text.as_str(), "" | "~" | "null" | "Null" | "NULL")
    } else {
        tag.as_deref().and_then(|t| t.strip_prefix(CORE_TAG_PREFIX)) == Some("null")
    };
    if is_null {
        tagged(Node::null(), tag.filter(|t| !t.starts_with(CORE_TAG_PREFIX)))
    } else {
        tagged(Node::scalar(text), tag)
    }
}

/// The tag as written after handle expansion. The non-specific `!` carries
/// no name and is dropped, which still keeps a plain `! null` from reading
/// as null.
fn full_tag(tag: EventTag) -> Option<String> {
    let full = format!("{}{}", tag.handle, tag.suffix);
    (full != "!").then_some(full)
}

fn tagged(node: Node, tag: Option<String>) -> Node {
    match tag {
        Some(tag) => node.with_tag(tag),
        None => node,
    }
}

/// Keys arriving here come from aliases or collections.
fn key_text(node: Node) -> Result<String, String> {
    match node.kind() {
        NodeKind::Scalar(text) => Ok(text.clone()),
        NodeKind::Null | NodeKind::Undefined => Ok(String::new()),
        _ => Err(format!("{node:?}")),
    }
}

// ---------------------------------------------------------------------------
// Emission
// ---------------------------------------------------------------------------

/// Convert a [`Node`] into a `serde_yaml` value for emission.
///
/// `Undefined` has no YAML spelling and is rendered as null.
pub fn to_yaml(node: &Node) -> Value {
    let value = match node.kind() {
        NodeKind::Undefined | NodeKind::Null => Value::Null,
        NodeKind::Scalar(text) => plain_scalar(text),
        NodeKind::Sequence(items) => Value::Sequence(items.iter().map(to_yaml).collect()),
        NodeKind::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (Value::String(k.to_string()), to_yaml(v)))
                .collect(),
        ),
    };
    match node.tag() {
        None | Some("") => value,
        Some(tag) => match tag.strip_prefix(CORE_TAG_PREFIX) {
            Some("str") => match node.as_scalar() {
                Some(text) => Value::String(text.to_string()),
                None => value,
            },
            Some(name) if CORE_TYPES.contains(&name) => value,
            _ => Value::Tagged(Box::new(TaggedValue {
                tag: Tag::new(tag),
                value,
            })),
        },
    }
}

/// Render `node` as a YAML document.
pub fn emit(node: &Node) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&to_yaml(node))
}

fn plain_scalar(text: &str) -> Value {
    match serde_yaml::from_str::<Value>(text) {
        Ok(Value::Bool(b)) if b.to_string() == text => Value::Bool(b),
        Ok(Value::Number(n)) if n.to_string() == text => Value::Number(n),
        _ => Value::String(text.to_string()),
    }
}
