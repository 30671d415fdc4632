//! Permission tree nodes.

use std::sync::Arc;

use crate::types::PermissionSet;

/// One node of a permission forest: either a leaf with directly settable
/// flags, or a group whose flags aggregate its children.
///
/// Nodes are immutable once built. Children are held behind [`Arc`] so that
/// an update can rebuild one root-to-target chain and share every other
/// subtree with the previous forest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PermissionNode {
    path: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    external_id: Option<String>,
    depth: usize,
    label: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    children: Option<Vec<Arc<PermissionNode>>>,
    permissions: PermissionSet,
}

impl PermissionNode {
    pub(crate) fn leaf(
        path: String,
        external_id: Option<String>,
        label: String,
        permissions: PermissionSet,
    ) -> Self {
        let depth = segment_count(&path);
        Self {
            path,
            external_id,
            depth,
            label,
            children: None,
            permissions,
        }
    }

    /// Creates a group whose flags are the aggregate of `children`.
    pub(crate) fn group(
        path: String,
        external_id: Option<String>,
        label: String,
        children: Vec<Arc<PermissionNode>>,
    ) -> Self {
        let depth = segment_count(&path);
        let permissions = PermissionSet::aggregate(children.iter().map(|c| &c.permissions));
        Self {
            path,
            external_id,
            depth,
            label,
            children: Some(children),
            permissions,
        }
    }

    /// Copy of this leaf with new flags. Shares nothing mutable with `self`.
    pub(crate) fn with_permissions(&self, permissions: PermissionSet) -> Self {
        Self {
            permissions,
            ..self.clone()
        }
    }

    /// Copy of this group with replaced children and flags.
    pub(crate) fn with_children(
        &self,
        children: Vec<Arc<PermissionNode>>,
        permissions: PermissionSet,
    ) -> Self {
        Self {
            path: self.path.clone(),
            external_id: self.external_id.clone(),
            depth: self.depth,
            label: self.label.clone(),
            children: Some(children),
            permissions,
        }
    }

    /// Dotted key chain from the root down to this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last segment of [`path`](Self::path): this node's payload key.
    pub fn key(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }

    /// Identifier correlating this node with an external permission record.
    pub fn external_id(&self) -> Option<&str> {
        self.external_id.as_deref()
    }

    /// Number of path segments; 1 for roots.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Human-readable display name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Child nodes in payload order, or `None` for a leaf.
    pub fn children(&self) -> Option<&[Arc<PermissionNode>]> {
        self.children.as_deref()
    }

    /// The node's flags. Aggregated for groups.
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// Returns `true` if this node has children.
    pub fn is_group(&self) -> bool {
        self.children.is_some()
    }

    /// Returns `true` if this node's flags are directly settable.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

fn segment_count(path: &str) -> usize {
    path.split('.').count()
}

/// Derives a display label from a payload key by inserting a space at every
/// ASCII lowercase-to-uppercase boundary. Letter case is left unchanged.
///
/// # Examples
///
/// ```
/// use permtree::humanize_key;
///
/// assert_eq!(humanize_key("editOwnRecord"), "edit Own Record");
/// assert_eq!(humanize_key("API"), "API");
/// ```
pub fn humanize_key(key: &str) -> String {
    let mut label = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if let Some(p) = prev {
            if p.is_ascii_lowercase() && c.is_ascii_uppercase() {
                label.push(' ');
            }
        }
        label.push(c);
        prev = Some(c);
    }
    label
}
