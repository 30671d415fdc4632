//! Permission forests: construction, traversal, and toggling.

mod builder;
mod updater;

use std::sync::Arc;

pub use builder::{build, InitialPermissions, TreeBuilder};
pub use updater::{apply, update, Update};

use crate::error::Error;
use crate::types::{PermissionNode, TargetPath};

/// An ordered sequence of root [`PermissionNode`]s.
///
/// A `Forest` is an immutable value. [`Forest::update`] returns a new forest
/// and leaves `self` untouched; subtrees the update did not visit are shared
/// between the two values. Cloning is cheap.
///
/// # Examples
///
/// ```
/// use permtree::{build, RawValue};
///
/// let raw = RawValue::map([(
///     "users",
///     RawValue::map([(
///         "view",
///         RawValue::map([
///             ("id", RawValue::from("p1")),
///             ("permission", RawValue::map(Vec::<(String, RawValue)>::new())),
///         ]),
///     )]),
/// )]);
///
/// let forest = build(&raw).unwrap();
/// let update = forest.update("users.view.view", true).unwrap();
///
/// assert!(update.forest.find("users").unwrap().permissions().view);
/// assert_eq!(update.granted, vec!["p1.view".to_string()]);
/// // The input forest is unchanged.
/// assert!(!forest.find("users.view").unwrap().permissions().view);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Forest {
    roots: Vec<Arc<PermissionNode>>,
}

impl Forest {
    pub(crate) fn from_roots(roots: Vec<Arc<PermissionNode>>) -> Self {
        Self { roots }
    }

    /// Root nodes in payload order.
    pub fn roots(&self) -> &[Arc<PermissionNode>] {
        &self.roots
    }

    /// Number of root nodes.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns `true` if the forest has no roots.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes, groups and leaves alike.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Depth-first, pre-order traversal in payload order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            stack: self.roots.iter().rev().map(|node| &**node).collect(),
        }
    }

    /// Looks up the node at a dotted `path`.
    pub fn find(&self, path: &str) -> Option<&PermissionNode> {
        let mut level: &[Arc<PermissionNode>] = &self.roots;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let node = level.iter().find(|n| n.key() == segment)?;
            if segments.peek().is_none() {
                return Some(&**node);
            }
            level = node.children()?;
        }
        None
    }

    /// Sets one flag, given as `<nodePath>.<action>`, and returns the
    /// resulting forest. See [`update`].
    pub fn update(&self, target: &str, value: bool) -> Result<Update, Error> {
        update(self, target, value)
    }

    /// Like [`Forest::update`] with an already parsed target.
    pub fn apply(&self, target: &TargetPath, value: bool) -> Result<Update, Error> {
        apply(self, target, value)
    }

    /// Every `externalId.action` whose flag is currently true, in traversal
    /// order and canonical action order within a node.
    ///
    /// Suitable for a full resync with an external authorization store.
    pub fn granted_ids(&self) -> Vec<String> {
        self.iter()
            .filter_map(|node| node.external_id().map(|id| (id, node.permissions())))
            .flat_map(|(id, permissions)| {
                permissions
                    .iter()
                    .filter(|(_, granted)| *granted)
                    .map(move |(action, _)| format!("{id}.{action}"))
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a Forest {
    type Item = &'a PermissionNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Pre-order iterator over a [`Forest`].
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    stack: Vec<&'a PermissionNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a PermissionNode;

    fn next(&mut self) -> Option<&'a PermissionNode> {
        let node = self.stack.pop()?;
        if let Some(children) = node.children() {
            self.stack.extend(children.iter().rev().map(|child| &**child));
        }
        Some(node)
    }
}
