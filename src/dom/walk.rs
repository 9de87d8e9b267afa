//! Pre-order traversal that tolerates tree surgery by the visitor.
//!
//! Children are addressed by index and the child list is re-read after every
//! visit, so a visitor may splice its parent's list (and its ancestors' lists
//! after the parent) without invalidating the walk.

use super::arena::{Dom, NodeId};

/// What the walker should do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Descend into the node now occupying the visited position.
    Continue,
    /// Do not descend; move on to the next sibling.
    Skip,
}

/// A node being visited, with its position in the parent's child list.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: NodeId,
    pub index: usize,
    /// Path from the walk root down to the parent; the parent is last.
    pub ancestors: &'a [NodeId],
}

impl Visit<'_> {
    /// The node whose child list contains the visited node.
    pub fn parent(&self) -> NodeId {
        // The root is never visited itself, so the path is never empty.
        self.ancestors[self.ancestors.len() - 1]
    }
}

/// Walk the descendants of `root` in pre-order.
///
/// Errors returned by the visitor abort the walk immediately; changes made
/// before the error are left in place.
pub fn walk<F, E>(dom: &mut Dom, root: NodeId, mut visitor: F) -> Result<(), E>
where
    F: FnMut(&mut Dom, Visit<'_>) -> Result<Walk, E>,
{
    let mut ancestors = Vec::new();
    walk_children(dom, root, &mut ancestors, &mut visitor)
}

fn walk_children<F, E>(
    dom: &mut Dom,
    parent: NodeId,
    ancestors: &mut Vec<NodeId>,
    visitor: &mut F,
) -> Result<(), E>
where
    F: FnMut(&mut Dom, Visit<'_>) -> Result<Walk, E>,
{
    ancestors.push(parent);
    let mut index = 0;
    while let Some(&child) = dom.children(parent).get(index) {
        let signal = visitor(
            dom,
            Visit {
                node: child,
                index,
                ancestors,
            },
        )?;
        if signal == Walk::Continue
            && let Some(&current) = dom.children(parent).get(index)
        {
            walk_children(dom, current, ancestors, visitor)?;
        }
        index += 1;
    }
    ancestors.pop();
    Ok(())
}
