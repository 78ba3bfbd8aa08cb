//! Structural mutation
//!
//! Every operation keeps three views of the tree in agreement: the parent's
//! ordered child list, the `prev_id` chain and the `next_id` chain.
//!
//! Positions inside a child list are resolved by identity and always to
//! the *last* matching entry. A well-formed list never holds an id twice,
//! so this only matters for trees that were corrupted by hand; it is kept
//! because callers rely on the legacy behaviour.
//!
//! Every position lookup an operation depends on is checked before its
//! first write, including the detach of the node being moved, so an
//! `InvariantViolation` leaves the tree as it was.

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::types::NodeId;

impl DomArena {
    /// Index of `child` in `parent`'s child list, last occurrence wins
    fn position_in_parent(&self, parent: NodeId, child: NodeId) -> Result<usize> {
        let pos = self
            .get(parent)?
            .children_ids
            .iter()
            .rposition(|&id| id == child);

        pos.ok_or_else(|| {
            tracing::error!(
                "Node {} claims parent {} but is missing from its child list",
                child,
                parent
            );
            DomError::InvariantViolation {
                node: child,
                reason: "node missing from its parent's child list",
            }
        })
    }

    /// Refuse to move `node` under `target` when that would create a cycle
    fn ensure_not_ancestor(&self, node: NodeId, target: Option<NodeId>) -> Result<()> {
        match target {
            Some(target) if self.is_inclusive_ancestor(node, target)? => {
                Err(DomError::HierarchyRequest { node, target })
            }
            _ => Ok(()),
        }
    }

    /// Unlink a node from its siblings and remove it from its parent.
    ///
    /// Detaching a node that has no parent is a no-op. The subtree below
    /// the node is left intact.
    pub fn detach(&mut self, node_id: NodeId) -> Result<()> {
        let node = self.get(node_id)?;
        let (prev, next, parent) = (node.prev_id, node.next_id, node.parent_id);

        let pos = match parent {
            Some(parent) => Some(self.position_in_parent(parent, node_id)?),
            None => None,
        };

        if let Some(prev) = prev {
            self.get_mut(prev)?.next_id = next;
        }
        if let Some(next) = next {
            self.get_mut(next)?.prev_id = prev;
        }
        if let (Some(parent), Some(pos)) = (parent, pos) {
            self.get_mut(parent)?.children_ids.remove(pos);
        }

        let node = self.get_mut(node_id)?;
        node.parent_id = None;
        node.prev_id = None;
        node.next_id = None;

        tracing::trace!("detach node={} parent={:?}", node_id, parent);
        Ok(())
    }

    /// Put `new` exactly where `old` is.
    ///
    /// `new` is detached from its current position first. `old` keeps its
    /// stale parent and sibling links and must not be reused afterwards.
    pub fn replace(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        if old == new {
            return Ok(());
        }
        self.get(new)?;
        let parent = self.get(old)?.parent_id;
        self.ensure_not_ancestor(new, parent)?;
        if let Some(parent) = parent {
            self.position_in_parent(parent, old)?;
        }

        self.detach(new)?;

        // Detaching a neighbour of `old` moves its links and position
        let old_node = self.get(old)?;
        let (prev, next) = (old_node.prev_id, old_node.next_id);
        let pos = match parent {
            Some(parent) => Some(self.position_in_parent(parent, old)?),
            None => None,
        };

        if let Some(prev) = prev {
            self.get_mut(prev)?.next_id = Some(new);
        }
        if let Some(next) = next {
            self.get_mut(next)?.prev_id = Some(new);
        }

        let new_node = self.get_mut(new)?;
        new_node.prev_id = prev;
        new_node.next_id = next;
        new_node.parent_id = parent;

        if let (Some(parent), Some(pos)) = (parent, pos) {
            self.get_mut(parent)?.children_ids[pos] = new;
        }

        tracing::trace!("replace old={} new={} parent={:?}", old, new, parent);
        Ok(())
    }

    /// Append `child` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.get(parent)?;
        self.ensure_not_ancestor(child, Some(parent))?;

        self.detach(child)?;

        let parent_node = self.get_mut(parent)?;
        let prev_last = parent_node.children_ids.last().copied();
        parent_node.children_ids.push(child);

        if let Some(sibling) = prev_last {
            self.get_mut(sibling)?.next_id = Some(child);
        }

        let child_node = self.get_mut(child)?;
        child_node.parent_id = Some(parent);
        child_node.prev_id = prev_last;
        child_node.next_id = None;

        tracing::trace!("append_child parent={} child={}", parent, child);
        Ok(())
    }

    /// Insert `node` directly after `anchor`.
    ///
    /// `node` takes `anchor`'s parent. When `anchor` has no parent the two
    /// are only linked as siblings, so `node` ends up parentless with
    /// `prev_id` (and possibly `next_id`) set. Such a chain lives outside
    /// any child list and `verify_links` does not look at it.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        if anchor == node {
            return Ok(());
        }
        self.get(node)?;
        let anchor_node = self.get(anchor)?;
        let (parent, curr_next) = (anchor_node.parent_id, anchor_node.next_id);
        self.ensure_not_ancestor(node, parent)?;

        // The sibling `node` gets spliced before once it is detached
        let splice_before = match curr_next {
            Some(next) if next == node => self.get(node)?.next_id,
            next => next,
        };
        if let (Some(parent), Some(next)) = (parent, splice_before) {
            self.position_in_parent(parent, next)?;
        }

        self.detach(node)?;

        let curr_next = self.get(anchor)?.next_id;
        let pos = match (parent, curr_next) {
            (Some(parent), Some(curr_next)) => Some(self.position_in_parent(parent, curr_next)?),
            _ => None,
        };

        let new_node = self.get_mut(node)?;
        new_node.next_id = curr_next;
        new_node.prev_id = Some(anchor);
        new_node.parent_id = parent;
        self.get_mut(anchor)?.next_id = Some(node);

        match curr_next {
            Some(curr_next) => {
                self.get_mut(curr_next)?.prev_id = Some(node);
                if let (Some(parent), Some(pos)) = (parent, pos) {
                    self.get_mut(parent)?.children_ids.insert(pos, node);
                }
            }
            None => {
                if let Some(parent) = parent {
                    self.get_mut(parent)?.children_ids.push(node);
                }
            }
        }

        tracing::trace!("insert_after anchor={} node={}", anchor, node);
        Ok(())
    }

    /// Insert `node` directly before `anchor`.
    ///
    /// Same parentless-anchor behaviour as `insert_after`.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) -> Result<()> {
        if anchor == node {
            return Ok(());
        }
        self.get(node)?;
        let parent = self.get(anchor)?.parent_id;
        self.ensure_not_ancestor(node, parent)?;
        if let Some(parent) = parent {
            self.position_in_parent(parent, anchor)?;
        }

        self.detach(node)?;

        if let Some(parent) = parent {
            let pos = self.position_in_parent(parent, anchor)?;
            self.get_mut(parent)?.children_ids.insert(pos, node);
        }

        let anchor_prev = self.get(anchor)?.prev_id;
        if let Some(prev) = anchor_prev {
            self.get_mut(prev)?.next_id = Some(node);
        }

        let new_node = self.get_mut(node)?;
        new_node.parent_id = parent;
        new_node.prev_id = anchor_prev;
        new_node.next_id = Some(anchor);
        self.get_mut(anchor)?.prev_id = Some(node);

        tracing::trace!("insert_before anchor={} node={}", anchor, node);
        Ok(())
    }
}
