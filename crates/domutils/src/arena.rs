//! Arena-based tree storage
//!
//! Every node lives in one `Vec<DomNode>` and is addressed by its index.
//! The child list is the owning direction; parent and sibling links are
//! plain indices, so the cyclic parent/child/sibling graph needs no
//! `Rc`/`Weak` bookkeeping.
//!
//! ## Memory Layout
//!
//! ```text
//! Arena: Vec<DomNode>
//!        [Node0][Node1][Node2]...
//!         ↑ 4-byte index, not 8-byte pointer
//! ```
//!
//! Nodes are never freed. A detached subtree stays in the arena until the
//! arena is cleared; what happens to it is up to the caller.

use crate::error::{DomError, Result};
use crate::types::{Attributes, DomNode, NodeId, NodeKind};

/// Arena allocator for tree nodes
#[derive(Debug, Clone)]
pub struct DomArena {
    /// All nodes stored sequentially (cache-friendly)
    nodes: Vec<DomNode>,

    /// Document root (if set)
    root_id: Option<NodeId>,
}

impl DomArena {
    /// Create a new empty arena
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Create arena with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            root_id: None,
        }
    }

    /// Add a node to the arena, returns its ID.
    ///
    /// The node's `node_id` is overwritten with its slot index.
    pub fn add_node(&mut self, mut node: DomNode) -> NodeId {
        let node_id = self.nodes.len() as NodeId;
        node.node_id = node_id;
        self.nodes.push(node);
        node_id
    }

    /// Create a root node and make it the arena root if none is set yet
    pub fn create_root(&mut self) -> NodeId {
        let id = self.add_node(DomNode::new(0, NodeKind::Root));
        if self.root_id.is_none() {
            self.root_id = Some(id);
        }
        id
    }

    /// Create a detached element. `script` and `style` get their own kinds.
    pub fn create_tag(&mut self, name: &str, attributes: Attributes) -> NodeId {
        self.create_element(NodeKind::for_tag_name(name), name, attributes)
    }

    /// Create a detached element of an explicit tag kind
    pub fn create_element(&mut self, kind: NodeKind, name: &str, attributes: Attributes) -> NodeId {
        let mut node = DomNode::new(0, kind);
        node.name = Some(name.to_string());
        node.attributes = attributes;
        self.add_node(node)
    }

    pub fn create_text(&mut self, data: &str) -> NodeId {
        self.create_data_node(NodeKind::Text, data)
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.create_data_node(NodeKind::Comment, data)
    }

    /// Create a directive such as `!DOCTYPE html`.
    ///
    /// The name is the first word of the payload, lowercased.
    pub fn create_directive(&mut self, data: &str) -> NodeId {
        let name = data
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        let mut node = DomNode::new(0, NodeKind::Directive);
        node.name = Some(name);
        node.data = Some(data.to_string());
        self.add_node(node)
    }

    /// Create a CDATA section holding `data` in a single text child
    pub fn create_cdata(&mut self, data: &str) -> NodeId {
        let cdata = self.add_node(DomNode::new(0, NodeKind::Cdata));
        let text = self.create_text(data);
        let text_node = &mut self.nodes[text as usize];
        text_node.parent_id = Some(cdata);
        self.nodes[cdata as usize].children_ids.push(text);
        cdata
    }

    fn create_data_node(&mut self, kind: NodeKind, data: &str) -> NodeId {
        let mut node = DomNode::new(0, kind);
        node.data = Some(data.to_string());
        self.add_node(node)
    }

    /// Get node by ID (immutable)
    pub fn get(&self, node_id: NodeId) -> Result<&DomNode> {
        self.nodes
            .get(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Get node by ID (mutable)
    ///
    /// Editing the link fields directly bypasses the mutator; run
    /// [`DomArena::verify_links`] afterwards if the tree must stay sound.
    pub fn get_mut(&mut self, node_id: NodeId) -> Result<&mut DomNode> {
        self.nodes
            .get_mut(node_id as usize)
            .ok_or(DomError::NodeNotFound(node_id))
    }

    /// Set root node
    pub fn set_root(&mut self, node_id: NodeId) -> Result<()> {
        self.get(node_id)?;
        self.root_id = Some(node_id);
        Ok(())
    }

    /// Get root node ID
    pub fn root_id(&self) -> Option<NodeId> {
        self.root_id
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if arena is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterator over all nodes
    pub fn iter(&self) -> impl Iterator<Item = &DomNode> {
        self.nodes.iter()
    }

    /// Iterator over all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| i as NodeId)
    }

    /// Traverse a subtree depth-first, pre-order (iterative, no recursion)
    pub fn traverse_df<F>(&self, start_id: NodeId, mut visit: F) -> Result<()>
    where
        F: FnMut(&DomNode) -> Result<()>,
    {
        let mut stack = vec![start_id];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            visit(node)?;

            // Push children in reverse order (so they're visited left-to-right)
            for &child_id in node.children_ids.iter().rev() {
                stack.push(child_id);
            }
        }

        Ok(())
    }

    // ---- accessors ----

    /// Child list of a node, empty for unknown ids
    pub fn children(&self, node_id: NodeId) -> &[NodeId] {
        self.get(node_id)
            .map(|n| n.children_ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, node_id: NodeId) -> Option<NodeId> {
        self.get(node_id).ok().and_then(|n| n.parent_id)
    }

    pub fn next_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        self.get(node_id).ok().and_then(|n| n.next_id)
    }

    pub fn prev_sibling(&self, node_id: NodeId) -> Option<NodeId> {
        self.get(node_id).ok().and_then(|n| n.prev_id)
    }

    /// The parent's children (including the node itself), or just the node
    /// when it is detached
    pub fn siblings(&self, node_id: NodeId) -> Vec<NodeId> {
        match self.parent(node_id) {
            Some(parent_id) => self.children(parent_id).to_vec(),
            None => vec![node_id],
        }
    }

    pub fn attribute_value(&self, node_id: NodeId, name: &str) -> Option<&str> {
        self.get(node_id).ok().and_then(|n| n.attr(name))
    }

    pub fn has_attribute(&self, node_id: NodeId, name: &str) -> bool {
        self.get(node_id)
            .map(|n| n.attributes.contains(name))
            .unwrap_or(false)
    }

    pub fn name(&self, node_id: NodeId) -> Option<&str> {
        self.get(node_id).ok().and_then(|n| n.name.as_deref())
    }

    /// Name with any namespace prefix (`svg:rect` → `rect`) removed
    pub fn name_without_ns(&self, node_id: NodeId) -> Option<&str> {
        self.name(node_id)
            .map(|name| name.split_once(':').map_or(name, |(_, local)| local))
    }

    pub fn is_tag(&self, node_id: NodeId) -> bool {
        self.get(node_id).map(|n| n.is_tag()).unwrap_or(false)
    }

    /// True if `ancestor` is `node_id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node_id: NodeId) -> Result<bool> {
        let mut current = Some(node_id);
        let mut steps = 0usize;
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            // A parent chain longer than the arena can only be a cycle
            steps += 1;
            if steps > self.nodes.len() {
                return Err(DomError::InvariantViolation {
                    node: node_id,
                    reason: "parent chain contains a cycle",
                });
            }
            current = self.get(id)?.parent_id;
        }
        Ok(false)
    }

    /// Check that the child lists, parent links and sibling links of a
    /// subtree agree with each other.
    ///
    /// Returns the first disagreement found as an `InvariantViolation`.
    pub fn verify_links(&self, root: NodeId) -> Result<()> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![root];

        while let Some(node_id) = stack.pop() {
            let node = self.get(node_id)?;
            if std::mem::replace(&mut seen[node_id as usize], true) {
                return Err(DomError::InvariantViolation {
                    node: node_id,
                    reason: "node reachable through more than one child list",
                });
            }

            let children = &node.children_ids;
            for (i, &child_id) in children.iter().enumerate() {
                let child = self.get(child_id)?;
                let expected_prev = i.checked_sub(1).map(|p| children[p]);
                let expected_next = children.get(i + 1).copied();

                let reason = if child.parent_id != Some(node_id) {
                    Some("parent link does not match child list")
                } else if child.prev_id != expected_prev {
                    Some("prev link does not match child list")
                } else if child.next_id != expected_next {
                    Some("next link does not match child list")
                } else {
                    None
                };

                if let Some(reason) = reason {
                    return Err(DomError::InvariantViolation {
                        node: child_id,
                        reason,
                    });
                }
                stack.push(child_id);
            }
        }

        Ok(())
    }

    /// Clear arena (reuse allocation)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root_id = None;
    }
}

impl Default for DomArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_basic() {
        let mut arena = DomArena::new();

        let id = arena.create_tag("div", Attributes::new());
        assert_eq!(id, 0);

        let retrieved = arena.get(id).unwrap();
        assert_eq!(retrieved.name.as_deref(), Some("div"));
        assert_eq!(retrieved.kind, NodeKind::Tag);
        assert!(matches!(arena.get(7), Err(DomError::NodeNotFound(7))));
    }

    #[test]
    fn test_create_kinds() {
        let mut arena = DomArena::new();
        let script = arena.create_tag("script", Attributes::new());
        let style = arena.create_tag("style", Attributes::new());
        let doctype = arena.create_directive("!DOCTYPE html");
        let cdata = arena.create_cdata("x < y");

        assert_eq!(arena.get(script).unwrap().kind, NodeKind::Script);
        assert_eq!(arena.get(style).unwrap().kind, NodeKind::Style);
        assert_eq!(arena.name(doctype), Some("!doctype"));

        let payload = arena.children(cdata);
        assert_eq!(payload.len(), 1);
        assert_eq!(arena.parent(payload[0]), Some(cdata));
        assert_eq!(arena.get(payload[0]).unwrap().data.as_deref(), Some("x < y"));
        arena.verify_links(cdata).unwrap();
    }

    #[test]
    fn test_traverse_df() {
        let mut arena = DomArena::new();
        let root = arena.create_tag("div", Attributes::new());
        let child1 = arena.create_tag("span", Attributes::new());
        let child2 = arena.create_tag("p", Attributes::new());
        arena.append_child(root, child1).unwrap();
        arena.append_child(root, child2).unwrap();

        let mut visited = Vec::new();
        arena
            .traverse_df(root, |node| {
                visited.push(node.name.clone().unwrap_or_default());
                Ok(())
            })
            .unwrap();

        assert_eq!(visited, vec!["div", "span", "p"]);
    }

    #[test]
    fn test_accessors() {
        let mut arena = DomArena::new();
        let root = arena.create_root();
        let rect = arena.create_tag(
            "svg:rect",
            [("width", "10"), ("fill", "")].into_iter().collect(),
        );
        let text = arena.create_text("hi");
        arena.append_child(root, rect).unwrap();
        arena.append_child(root, text).unwrap();

        assert_eq!(arena.root_id(), Some(root));
        assert_eq!(arena.name_without_ns(rect), Some("rect"));
        assert_eq!(arena.attribute_value(rect, "width"), Some("10"));
        assert!(arena.has_attribute(rect, "fill"));
        assert!(!arena.has_attribute(rect, "height"));
        assert_eq!(arena.siblings(rect), vec![rect, text]);
        assert_eq!(arena.next_sibling(rect), Some(text));
        assert_eq!(arena.prev_sibling(text), Some(rect));
        assert!(arena.is_tag(rect));
        assert!(!arena.is_tag(text));
        assert_eq!(arena.siblings(root), vec![root]);
        assert!(arena.children(999).is_empty());
    }

    #[test]
    fn test_verify_links_detects_corruption() {
        let mut arena = DomArena::new();
        let root = arena.create_root();
        let a = arena.create_text("a");
        let b = arena.create_text("b");
        arena.append_child(root, a).unwrap();
        arena.append_child(root, b).unwrap();
        arena.verify_links(root).unwrap();

        arena.get_mut(b).unwrap().prev_id = None;
        let err = arena.verify_links(root).unwrap_err();
        assert!(matches!(err, DomError::InvariantViolation { node, .. } if node == b));
    }
}
