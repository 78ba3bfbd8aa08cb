//! Utility functions for tree processing

use crate::arena::DomArena;
use crate::types::{NodeId, NodeKind};

/// Concatenate the text payload of `nodes` and everything below them.
///
/// Descends through tags (including script and style). Text and comment
/// nodes contribute their data, a CDATA section its payload. Roots and
/// directives contribute nothing.
pub fn get_text(arena: &DomArena, nodes: &[NodeId]) -> String {
    let mut text = String::new();
    let mut stack: Vec<NodeId> = nodes.iter().rev().copied().collect();

    while let Some(node_id) = stack.pop() {
        let Ok(node) = arena.get(node_id) else {
            continue;
        };

        match node.kind {
            NodeKind::Tag | NodeKind::Script | NodeKind::Style => {
                stack.extend(node.children_ids.iter().rev())
            }
            NodeKind::Text | NodeKind::Comment => {
                text.push_str(node.data.as_deref().unwrap_or_default())
            }
            NodeKind::Cdata => match &node.data {
                Some(data) => text.push_str(data),
                None => stack.extend(node.children_ids.iter().rev()),
            },
            NodeKind::Root | NodeKind::Directive => {}
        }
    }

    text
}
