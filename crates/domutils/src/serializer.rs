//! Markup serializer - render a tree back to HTML/XML text
//!
//! This module handles:
//! - Dispatch by node kind (root, tags, text, comment, CDATA, directive)
//! - Attribute formatting, including valueless boolean attributes
//! - Void elements and XML-style self-closing tags
//! - Context-sensitive text escaping (raw-text elements are never escaped)
//!
//! The serializer only reads the arena.

use crate::arena::DomArena;
use crate::entities::{EntityEncoder, XmlEntities};
use crate::error::Result;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Options record accepted by every render entry point.
///
/// Absent keys default to `false`; unknown keys are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Escape text and attribute values through the entity encoder
    pub decode_entities: bool,
    /// Self-close empty elements and always emit closing tags
    pub xml_mode: bool,
}

impl RenderOptions {
    /// Parse an options record such as `{"xmlMode": true}`
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Options for an `<svg>` subtree: always XML-style, escaping inherited
    fn for_svg(self) -> Self {
        Self {
            decode_entities: self.decode_entities,
            xml_mode: true,
        }
    }
}

/// Tree serializer
pub struct DomSerializer<E = XmlEntities> {
    options: RenderOptions,
    encoder: E,
}

impl DomSerializer {
    pub fn new() -> Self {
        Self::with_config(RenderOptions::default())
    }

    pub fn with_config(options: RenderOptions) -> Self {
        Self::with_encoder(options, XmlEntities)
    }
}

impl<E: EntityEncoder> DomSerializer<E> {
    pub fn with_encoder(options: RenderOptions, encoder: E) -> Self {
        Self { options, encoder }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render a sequence of nodes and concatenate the output
    pub fn render(&self, arena: &DomArena, nodes: &[NodeId]) -> Result<String> {
        let mut output = String::with_capacity(256);
        self.render_nodes(arena, nodes, &mut output)?;
        Ok(output)
    }

    /// Markup of a node including its own tag
    pub fn outer_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        self.render(arena, &[node_id])
    }

    /// Markup of a node's children, each rendered on its own
    pub fn inner_html(&self, arena: &DomArena, node_id: NodeId) -> Result<String> {
        let parts = arena
            .get(node_id)?
            .children_ids
            .iter()
            .map(|&child_id| self.render(arena, &[child_id]))
            .collect::<Result<Vec<_>>>()?;
        Ok(parts.concat())
    }

    /// Depth-first render loop (iterative, no recursion)
    fn render_nodes(&self, arena: &DomArena, nodes: &[NodeId], output: &mut String) -> Result<()> {
        let mut stack: Vec<Frame<'_>> = nodes
            .iter()
            .rev()
            .map(|&node_id| Frame::Open(node_id, self.options))
            .collect();

        while let Some(frame) = stack.pop() {
            let (node_id, opts) = match frame {
                Frame::Open(node_id, opts) => (node_id, opts),
                Frame::Close(name, opts) => {
                    close_tag(name, opts, output);
                    continue;
                }
            };
            let node = arena.get(node_id)?;

            match node.kind {
                NodeKind::Root => push_children(&mut stack, node, opts),
                NodeKind::Tag | NodeKind::Script | NodeKind::Style => {
                    let name = node.name.as_deref().unwrap_or_default();
                    if let Some(opts) = self.open_tag(node, name, opts, output) {
                        stack.push(Frame::Close(name, opts));
                        push_children(&mut stack, node, opts);
                    }
                }
                NodeKind::Directive => render_directive(node, output),
                NodeKind::Comment => render_comment(node, output),
                NodeKind::Cdata => render_cdata(arena, node, output),
                NodeKind::Text => self.render_text(arena, node, opts, output),
            }
        }

        Ok(())
    }

    /// Write the start tag. Returns the options for the element's content,
    /// or `None` when the tag was self-closed.
    fn open_tag(
        &self,
        node: &DomNode,
        name: &str,
        opts: RenderOptions,
        output: &mut String,
    ) -> Option<RenderOptions> {
        let opts = if name == "svg" { opts.for_svg() } else { opts };

        output.push('<');
        output.push_str(name);

        if !node.attributes.is_empty() {
            output.push(' ');
            self.format_attributes(&node.attributes, opts, output);
        }

        if opts.xml_mode && !node.has_children() {
            output.push_str("/>");
            return None;
        }

        output.push('>');
        Some(opts)
    }

    fn format_attributes(&self, attributes: &Attributes, opts: RenderOptions, output: &mut String) {
        for (i, (key, value)) in attributes.iter().enumerate() {
            if i > 0 {
                output.push(' ');
            }
            output.push_str(key);

            if value.is_empty() && is_boolean_attribute(key) {
                continue;
            }

            output.push_str("=\"");
            if opts.decode_entities {
                output.push_str(&self.encoder.encode(value));
            } else {
                output.push_str(value);
            }
            output.push('"');
        }
    }

    fn render_text(&self, arena: &DomArena, node: &DomNode, opts: RenderOptions, output: &mut String) {
        let data = node.data.as_deref().unwrap_or_default();

        // Content of raw-text elements is not markup to its consumers
        let in_raw_text = node
            .parent_id
            .and_then(|parent_id| arena.name(parent_id))
            .is_some_and(is_raw_text_element);

        if opts.decode_entities && !in_raw_text {
            output.push_str(&self.encoder.encode(data));
        } else {
            output.push_str(data);
        }
    }
}

/// Pending work in the render loop
enum Frame<'a> {
    /// Render a node with the options in effect at its position
    Open(NodeId, RenderOptions),
    /// Emit the end tag of an element whose content is done
    Close(&'a str, RenderOptions),
}

fn push_children(stack: &mut Vec<Frame<'_>>, node: &DomNode, opts: RenderOptions) {
    // Reverse order, so they're rendered left-to-right
    stack.extend(node.children_ids.iter().rev().map(|&child_id| Frame::Open(child_id, opts)));
}

fn close_tag(name: &str, opts: RenderOptions, output: &mut String) {
    if opts.xml_mode || !is_void_element(name) {
        output.push_str("</");
        output.push_str(name);
        output.push('>');
    }
}

impl Default for DomSerializer {
    fn default() -> Self {
        Self::new()
    }
}

fn render_directive(node: &DomNode, output: &mut String) {
    output.push('<');
    output.push_str(node.data.as_deref().unwrap_or_default());
    output.push('>');
}

fn render_comment(node: &DomNode, output: &mut String) {
    output.push_str("<!--");
    output.push_str(node.data.as_deref().unwrap_or_default());
    output.push_str("-->");
}

/// The payload lives in the first child; an empty section renders as
/// `<![CDATA[]]>`.
fn render_cdata(arena: &DomArena, node: &DomNode, output: &mut String) {
    let data = node
        .children_ids
        .first()
        .and_then(|&child_id| arena.get(child_id).ok())
        .and_then(|child| child.data.as_deref())
        .unwrap_or_default();

    output.push_str("<![CDATA[");
    output.push_str(data);
    output.push_str("]]>");
}

/// Render nodes with the default XML entity encoder
pub fn render(arena: &DomArena, nodes: &[NodeId], options: &RenderOptions) -> Result<String> {
    DomSerializer::with_config(*options).render(arena, nodes)
}
