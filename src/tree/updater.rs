//! Tree updater: apply one toggle and re-aggregate the ancestor chain.

use std::sync::Arc;

use crate::error::Error;
use crate::types::{PermissionAction, PermissionNode, TargetPath};

use super::Forest;

/// The result of a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    /// The forest after the toggle.
    pub forest: Forest,
    /// `externalId.action` for every node whose flag went from false to
    /// true. Nodes without an external id are not listed.
    pub granted: Vec<String>,
    /// `externalId.action` for every node whose flag went from true to
    /// false.
    pub revoked: Vec<String>,
}

/// Sets the flag named by `target` (`<nodePath>.<action>`) to `value` and
/// returns the resulting forest.
///
/// - A leaf target has its flag set directly.
/// - A group target passes the value down to every node beneath it.
/// - Every rebuilt group, up to the root, recomputes the flag as the
///   conjunction of its children's flags and `value`.
///
/// Only the root-to-target chain (plus the subtree of a group target) is
/// rebuilt; every other subtree is shared with `forest`.
///
/// # Errors
///
/// - [`Error::InvalidAction`] if the last segment is not an action.
/// - [`Error::PathNotFound`] if the node path matches no node.
/// - [`Error::AmbiguousPath`] if siblings share a path.
///
/// On error nothing is returned but the error; `forest` is never modified.
pub fn update(forest: &Forest, target: &str, value: bool) -> Result<Update, Error> {
    let target = TargetPath::parse(target)?;
    apply(forest, &target, value)
}

/// Like [`update`] with an already parsed target.
pub fn apply(forest: &Forest, target: &TargetPath, value: bool) -> Result<Update, Error> {
    let mut changes = Changes::new(target.action());
    let roots = descend(forest.roots(), target, value, &mut changes)?;

    tracing::debug!(
        toggle = %target,
        value,
        granted = changes.granted.len(),
        revoked = changes.revoked.len(),
        "applied permission toggle"
    );

    Ok(Update {
        forest: Forest::from_roots(roots),
        granted: changes.granted,
        revoked: changes.revoked,
    })
}

struct Changes {
    action: PermissionAction,
    granted: Vec<String>,
    revoked: Vec<String>,
}

impl Changes {
    fn new(action: PermissionAction) -> Self {
        Self {
            action,
            granted: Vec::new(),
            revoked: Vec::new(),
        }
    }

    fn record(&mut self, before: &PermissionNode, after: &PermissionNode) {
        let Some(id) = after.external_id() else {
            return;
        };
        let now = after.permissions().get(self.action);
        if before.permissions().get(self.action) == now {
            return;
        }
        let identifier = format!("{id}.{}", self.action);
        if now {
            self.granted.push(identifier);
        } else {
            self.revoked.push(identifier);
        }
    }
}

/// Rebuilds `level` with the single sibling on the target's path replaced.
fn descend(
    level: &[Arc<PermissionNode>],
    target: &TargetPath,
    value: bool,
    changes: &mut Changes,
) -> Result<Vec<Arc<PermissionNode>>, Error> {
    let mut found: Option<usize> = None;
    let mut matches = 0;
    for (i, node) in level.iter().enumerate() {
        if target.prefix(node.depth()) == Some(node.path()) {
            matches += 1;
            found.get_or_insert(i);
        }
    }

    let index = match found {
        None => return Err(Error::PathNotFound(target.node_path().to_string())),
        Some(index) if matches > 1 => {
            let path = level[index].path().to_string();
            tracing::warn!(path = %path, matches, "sibling nodes share a path");
            return Err(Error::AmbiguousPath { path, matches });
        }
        Some(index) => index,
    };

    let node = &level[index];
    let rebuilt = if node.depth() == target.depth() {
        cascade(node, target.action(), value, changes)
    } else {
        match node.children() {
            Some(children) => {
                let children = descend(children, target, value, changes)?;
                regroup(node, children, target.action(), value)
            }
            None => return Err(Error::PathNotFound(target.node_path().to_string())),
        }
    };
    changes.record(node, &rebuilt);

    let mut next = level.to_vec();
    next[index] = Arc::new(rebuilt);
    Ok(next)
}

/// Sets `action` on `node` and, for a group, on everything beneath it.
fn cascade(
    node: &PermissionNode,
    action: PermissionAction,
    value: bool,
    changes: &mut Changes,
) -> PermissionNode {
    match node.children() {
        None => node.with_permissions(node.permissions().with(action, value)),
        Some(children) => {
            let children = children
                .iter()
                .map(|child| {
                    let rebuilt = cascade(child, action, value, changes);
                    changes.record(child, &rebuilt);
                    Arc::new(rebuilt)
                })
                .collect();
            regroup(node, children, action, value)
        }
    }
}

/// Copy of group `node` with new children and `action` re-aggregated.
fn regroup(
    node: &PermissionNode,
    children: Vec<Arc<PermissionNode>>,
    action: PermissionAction,
    value: bool,
) -> PermissionNode {
    let all = children.iter().all(|c| c.permissions().get(action));
    let permissions = node.permissions().with(action, all && value);
    node.with_children(children, permissions)
}
