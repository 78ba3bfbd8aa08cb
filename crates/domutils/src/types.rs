//! Core type definitions for the markup tree
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Links between nodes are indices, never owning pointers
//! 3. Use SmallVec for child lists (most nodes have few children)
//! 4. Attribute order is part of the output, so the map is insertion-ordered

use ahash::AHashSet;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::sync::LazyLock;

/// Node identifier (index into arena)
/// u32 allows 4 billion nodes, enough for any document
pub type NodeId = u32;

/// Node kind, named after the conventional element-type strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Tag,
    Script,
    Style,
    Text,
    Comment,
    Cdata,
    Directive,
}

impl NodeKind {
    /// Script and style are tags too; they only differ in how their text
    /// content is treated.
    pub fn is_tag(self) -> bool {
        matches!(self, NodeKind::Tag | NodeKind::Script | NodeKind::Style)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Root => "root",
            NodeKind::Tag => "tag",
            NodeKind::Script => "script",
            NodeKind::Style => "style",
            NodeKind::Text => "text",
            NodeKind::Comment => "comment",
            NodeKind::Cdata => "cdata",
            NodeKind::Directive => "directive",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "root" => Some(NodeKind::Root),
            "tag" => Some(NodeKind::Tag),
            "script" => Some(NodeKind::Script),
            "style" => Some(NodeKind::Style),
            "text" => Some(NodeKind::Text),
            "comment" => Some(NodeKind::Comment),
            "cdata" => Some(NodeKind::Cdata),
            "directive" => Some(NodeKind::Directive),
            _ => None,
        }
    }

    /// Kind for an element with the given tag name
    pub fn for_tag_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("script") {
            NodeKind::Script
        } else if name.eq_ignore_ascii_case("style") {
            NodeKind::Style
        } else {
            NodeKind::Tag
        }
    }
}

/// Insertion-ordered attribute map with unique names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    entries: IndexMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Set an attribute. Overwriting an existing name keeps its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Remove an attribute, keeping the order of the others
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.set(k, v);
        }
        attrs
    }
}

/// The tree node
///
/// Design philosophy:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
/// - `children_ids` is the owning direction; `parent_id`, `prev_id` and
///   `next_id` are back-references that must agree with it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub kind: NodeKind,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub prev_id: Option<NodeId>,
    pub next_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>,

    /// Tag or directive name
    pub name: Option<String>,
    /// Text, comment or directive payload
    pub data: Option<String>,
    pub attributes: Attributes,
}

impl DomNode {
    /// Create a detached node with no name, data or attributes
    pub fn new(node_id: NodeId, kind: NodeKind) -> Self {
        Self {
            node_id,
            kind,
            parent_id: None,
            prev_id: None,
            next_id: None,
            children_ids: SmallVec::new(),
            name: None,
            data: None,
            attributes: Attributes::new(),
        }
    }

    /// Tag name for tag-kind nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.kind.is_tag() {
            self.name.as_deref()
        } else {
            None
        }
    }

    pub fn is_tag(&self) -> bool {
        self.kind.is_tag()
    }

    pub fn is_text(&self) -> bool {
        self.kind == NodeKind::Text
    }

    pub fn has_children(&self) -> bool {
        !self.children_ids.is_empty()
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }
}

/// Attributes written without a value when their value is empty
pub const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "hidden",
    "ismap",
    "loop",
    "multiple",
    "muted",
    "open",
    "readonly",
    "required",
    "reversed",
    "scoped",
    "seamless",
    "selected",
    "typemustmatch",
];

/// Elements that never get a closing tag outside XML mode
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "command", "embed", "frame", "hr", "img", "input",
    "isindex", "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text content is emitted without entity encoding
pub const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style",
    "script",
    "xmp",
    "iframe",
    "noembed",
    "noframes",
    "plaintext",
    "noscript",
];

static BOOLEAN_ATTRIBUTE_SET: LazyLock<AHashSet<&'static str>> =
    LazyLock::new(|| BOOLEAN_ATTRIBUTES.iter().copied().collect());

static VOID_ELEMENT_SET: LazyLock<AHashSet<&'static str>> =
    LazyLock::new(|| VOID_ELEMENTS.iter().copied().collect());

static RAW_TEXT_ELEMENT_SET: LazyLock<AHashSet<&'static str>> =
    LazyLock::new(|| RAW_TEXT_ELEMENTS.iter().copied().collect());

pub fn is_boolean_attribute(name: &str) -> bool {
    BOOLEAN_ATTRIBUTE_SET.contains(name)
}

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENT_SET.contains(name)
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENT_SET.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_order_is_insertion_order() {
        let mut attrs = Attributes::new();
        attrs.set("b", "1");
        attrs.set("a", "2");
        attrs.set("c", "3");
        attrs.set("b", "4");

        let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(attrs.get("b"), Some("4"));

        attrs.remove("a");
        let names: Vec<_> = attrs.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_lookup_tables() {
        assert!(is_void_element("br"));
        assert!(!is_void_element("div"));
        assert!(is_boolean_attribute("disabled"));
        assert!(!is_boolean_attribute("class"));
        assert!(is_raw_text_element("script"));
        assert!(!is_raw_text_element("p"));
    }

    #[test]
    fn test_kind_serde_names() {
        let kind: NodeKind = serde_json::from_str("\"cdata\"").unwrap();
        assert_eq!(kind, NodeKind::Cdata);
        assert_eq!(serde_json::to_string(&NodeKind::Directive).unwrap(), "\"directive\"");
        assert!(NodeKind::Style.is_tag());
        assert!(!NodeKind::Root.is_tag());
        assert_eq!(NodeKind::for_tag_name("SCRIPT"), NodeKind::Script);
    }
}
