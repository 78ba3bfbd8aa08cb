//! DOM Service - main entry point for working with a loaded tree
//!
//! This handles:
//! - Loading an already-parsed tree from its JSON form
//! - Keeping the arena and the default render options together
//! - Rendering and text extraction with those defaults
//!
//! The JSON form is the one markup parsers commonly hand out:
//!
//! ```json
//! {
//!   "type": "root",
//!   "children": [
//!     { "type": "tag", "name": "p", "attribs": { "class": "lead" },
//!       "children": [ { "type": "text", "data": "Hello" } ] }
//!   ]
//! }
//! ```

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::serializer::{DomSerializer, RenderOptions};
use crate::types::*;
use crate::utils;
use serde::Deserialize;
use serde_json::Value;

/// Configuration for DOM service
#[derive(Debug, Clone, Default)]
pub struct DomServiceConfig {
    /// Options used by the service's render helpers
    pub render: RenderOptions,
}

/// One node in the JSON form
#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    attribs: Attributes,
    #[serde(default)]
    children: Vec<RawNode>,
}

/// Main DOM service
pub struct DomService {
    config: DomServiceConfig,
    arena: DomArena,
}

impl DomService {
    /// Create new DOM service with default config
    pub fn new() -> Self {
        Self::with_config(DomServiceConfig::default())
    }

    /// Create DOM service with custom config
    pub fn with_config(config: DomServiceConfig) -> Self {
        Self {
            config,
            arena: DomArena::new(),
        }
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// Get mutable reference to internal arena
    pub fn arena_mut(&mut self) -> &mut DomArena {
        &mut self.arena
    }

    pub fn config(&self) -> &DomServiceConfig {
        &self.config
    }

    /// Load a tree from JSON text, replacing the current arena contents.
    ///
    /// A top-level array is treated as the children of a new root.
    pub fn load_str(&mut self, json: &str) -> Result<NodeId> {
        let value: Value = serde_json::from_str(json)?;
        self.load_json(&value)
    }

    /// Load a tree from a parsed JSON value, replacing the current arena
    /// contents. Returns the root id.
    pub fn load_json(&mut self, value: &Value) -> Result<NodeId> {
        self.arena.clear();

        let root_id = match value {
            Value::Array(_) => {
                let raw_children = Vec::<RawNode>::deserialize(value)?;
                let root_id = self.arena.create_root();
                for raw in &raw_children {
                    let child_id = self.build_node(raw)?;
                    self.arena.append_child(root_id, child_id)?;
                }
                root_id
            }
            _ => {
                let raw = RawNode::deserialize(value)?;
                self.build_node(&raw)?
            }
        };

        self.arena.set_root(root_id)?;
        tracing::debug!("Loaded tree: {} nodes, root {}", self.arena.len(), root_id);
        Ok(root_id)
    }

    /// Recursively build a node and attach its children through the mutator
    fn build_node(&mut self, raw: &RawNode) -> Result<NodeId> {
        let kind = NodeKind::from_name(&raw.kind).ok_or_else(|| DomError::InvalidNodeType {
            expected: "root, tag, script, style, text, comment, cdata or directive".to_string(),
            actual: raw.kind.clone(),
        })?;

        let node_id = match kind {
            NodeKind::Root => self.arena.create_root(),
            NodeKind::Tag | NodeKind::Script | NodeKind::Style => {
                let name = raw.name.as_deref().ok_or_else(|| DomError::InvalidNodeType {
                    expected: "named element".to_string(),
                    actual: format!("{} without a name", raw.kind),
                })?;
                self.arena.create_element(kind, name, raw.attribs.clone())
            }
            NodeKind::Text => self.arena.create_text(raw_data(raw)),
            NodeKind::Comment => self.arena.create_comment(raw_data(raw)),
            NodeKind::Directive => {
                let id = self.arena.create_directive(raw_data(raw));
                if let Some(name) = &raw.name {
                    self.arena.get_mut(id)?.name = Some(name.clone());
                }
                id
            }
            NodeKind::Cdata => {
                // The payload is the first child's data; a bare `data` also works
                let payload = raw
                    .children
                    .first()
                    .and_then(|child| child.data.as_deref())
                    .or(raw.data.as_deref())
                    .unwrap_or_default();
                return Ok(self.arena.create_cdata(payload));
            }
        };

        if matches!(kind, NodeKind::Root) || kind.is_tag() {
            for child in &raw.children {
                let child_id = self.build_node(child)?;
                self.arena.append_child(node_id, child_id)?;
            }
        }

        Ok(node_id)
    }

    fn serializer(&self) -> DomSerializer {
        DomSerializer::with_config(self.config.render)
    }

    /// Render the whole loaded tree
    pub fn render_document(&self) -> Result<String> {
        match self.arena.root_id() {
            Some(root_id) => self.serializer().render(&self.arena, &[root_id]),
            None => Ok(String::new()),
        }
    }

    pub fn outer_html(&self, node_id: NodeId) -> Result<String> {
        self.serializer().outer_html(&self.arena, node_id)
    }

    pub fn inner_html(&self, node_id: NodeId) -> Result<String> {
        self.serializer().inner_html(&self.arena, node_id)
    }

    /// Text content of a node and its descendants
    pub fn text(&self, node_id: NodeId) -> String {
        utils::get_text(&self.arena, &[node_id])
    }
}

impl Default for DomService {
    fn default() -> Self {
        Self::new()
    }
}

fn raw_data(raw: &RawNode) -> &str {
    raw.data.as_deref().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_simple_tree() {
        let json = serde_json::json!({
            "type": "root",
            "children": [{
                "type": "tag",
                "name": "p",
                "attribs": { "class": "lead", "id": "first" },
                "children": [{ "type": "text", "data": "Hello" }]
            }]
        });

        let mut service = DomService::new();
        let root_id = service.load_json(&json).unwrap();

        assert_eq!(root_id, 0);
        assert_eq!(service.arena().len(), 3);
        service.arena().verify_links(root_id).unwrap();
        assert_eq!(
            service.render_document().unwrap(),
            r#"<p class="lead" id="first">Hello</p>"#
        );
    }

    #[test]
    fn test_load_array_wraps_in_root() {
        let mut service = DomService::new();
        let root_id = service
            .load_str(r#"[{"type": "text", "data": "a"}, {"type": "comment", "data": "b"}]"#)
            .unwrap();

        assert_eq!(service.arena().get(root_id).unwrap().kind, NodeKind::Root);
        assert_eq!(service.arena().children(root_id).len(), 2);
        assert_eq!(service.render_document().unwrap(), "a<!--b-->");
    }

    #[test]
    fn test_load_script_and_cdata() {
        let mut service = DomService::with_config(DomServiceConfig {
            render: RenderOptions {
                decode_entities: true,
                xml_mode: false,
            },
        });
        let root_id = service
            .load_str(
                r#"{"type": "root", "children": [
                    {"type": "script", "name": "script", "children": [{"type": "text", "data": "1 < 2"}]},
                    {"type": "cdata", "children": [{"type": "text", "data": "x & y"}]}
                ]}"#,
            )
            .unwrap();

        let script = service.arena().children(root_id)[0];
        assert_eq!(service.arena().get(script).unwrap().kind, NodeKind::Script);
        assert_eq!(service.outer_html(script).unwrap(), "<script>1 < 2</script>");
        assert_eq!(service.inner_html(root_id).unwrap(), "<script>1 < 2</script><![CDATA[x & y]]>");
        assert_eq!(service.text(root_id), "");
        assert_eq!(service.text(script), "1 < 2");
    }

    #[test]
    fn test_load_rejects_unknown_kind() {
        let mut service = DomService::new();
        let err = service.load_str(r#"{"type": "widget"}"#).unwrap_err();
        assert!(matches!(err, DomError::InvalidNodeType { .. }));

        let err = service.load_str(r#"{"type": "tag"}"#).unwrap_err();
        assert!(matches!(err, DomError::InvalidNodeType { .. }));

        let err = service.load_str("{").unwrap_err();
        assert!(matches!(err, DomError::ParseError(_)));
    }
}
