//! Tree search
//!
//! All searches walk pre-order (a node before its descendants) over a
//! caller-supplied slice of starting nodes. Ids that are not in the arena
//! are skipped; searches never fail.

use crate::arena::DomArena;
use crate::types::{DomNode, NodeId};

impl DomArena {
    /// Collect matching nodes, optionally descending into children.
    ///
    /// `limit = None` means unbounded. Any kind of node is tested, not only
    /// tags.
    pub fn filter<F>(
        &self,
        mut test: F,
        nodes: &[NodeId],
        recurse: bool,
        limit: Option<usize>,
    ) -> Vec<NodeId>
    where
        F: FnMut(&DomNode) -> bool,
    {
        self.find(&mut test, nodes, recurse, limit.unwrap_or(usize::MAX))
    }

    /// Bounded depth-first collect.
    ///
    /// Stops as soon as `limit` matches have been collected. The walk keeps
    /// one child iterator per open level instead of recursing.
    pub fn find<F>(
        &self,
        test: &mut F,
        nodes: &[NodeId],
        recurse: bool,
        limit: usize,
    ) -> Vec<NodeId>
    where
        F: FnMut(&DomNode) -> bool,
    {
        let mut result = Vec::new();
        let mut remaining = limit;
        let mut levels = vec![nodes.iter()];

        while let Some(level) = levels.last_mut() {
            let Some(&node_id) = level.next() else {
                levels.pop();
                // Leaving a subtree rechecks the budget, so a zero limit
                // ends the walk there even without a match
                if remaining == 0 {
                    break;
                }
                continue;
            };
            let Ok(node) = self.get(node_id) else {
                continue;
            };

            if test(node) {
                result.push(node_id);
                remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    break;
                }
            }

            if recurse && node.has_children() {
                levels.push(node.children_ids.iter());
            }
        }

        result
    }

    /// First direct match among `nodes`, without descending
    pub fn find_one_child<F>(&self, mut test: F, nodes: &[NodeId]) -> Option<NodeId>
    where
        F: FnMut(&DomNode) -> bool,
    {
        nodes
            .iter()
            .filter_map(|&id| self.get(id).ok())
            .find(|node| test(*node))
            .map(|node| node.node_id)
    }

    /// First matching tag in pre-order.
    ///
    /// Non-tag nodes and everything below them are skipped. Nothing after
    /// the first hit is visited.
    pub fn find_one<F>(&self, mut test: F, nodes: &[NodeId]) -> Option<NodeId>
    where
        F: FnMut(&DomNode) -> bool,
    {
        self.collect_tags(&mut test, nodes, true).first().copied()
    }

    /// Whether any tag matches; same walk and short-circuit as `find_one`
    pub fn exists_one<F>(&self, test: F, nodes: &[NodeId]) -> bool
    where
        F: FnMut(&DomNode) -> bool,
    {
        self.find_one(test, nodes).is_some()
    }

    /// Every matching tag in pre-order, skipping non-tag subtrees
    pub fn find_all<F>(&self, mut test: F, nodes: &[NodeId]) -> Vec<NodeId>
    where
        F: FnMut(&DomNode) -> bool,
    {
        self.collect_tags(&mut test, nodes, false)
    }

    /// Pre-order walk over tags (iterative, no recursion)
    fn collect_tags<F>(&self, test: &mut F, nodes: &[NodeId], first_only: bool) -> Vec<NodeId>
    where
        F: FnMut(&DomNode) -> bool,
    {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = nodes.iter().rev().copied().collect();

        while let Some(node_id) = stack.pop() {
            let Ok(node) = self.get(node_id) else {
                continue;
            };
            if !node.is_tag() {
                continue;
            }

            if test(node) {
                result.push(node_id);
                if first_only {
                    break;
                }
            }

            // Push children in reverse order (so they're visited left-to-right)
            stack.extend(node.children_ids.iter().rev());
        }

        result
    }

    /// Find all elements by tag name
    pub fn find_by_tag(&self, nodes: &[NodeId], tag: &str) -> Vec<NodeId> {
        self.find_all(|node| node.tag_name() == Some(tag), nodes)
    }

    /// Find element by ID attribute
    pub fn find_by_id(&self, nodes: &[NodeId], id: &str) -> Option<NodeId> {
        self.find_one(|node| node.attr("id") == Some(id), nodes)
    }
}
