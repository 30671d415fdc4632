//! Toggle targets: `<nodePath>.<action>`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::types::PermissionAction;

/// Identifies one permission flag on one node, as carried by a checkbox.
///
/// The textual form is the node path followed by the action as its last
/// dot-separated segment, e.g. `"users.view.edit_own"`.
///
/// # Examples
///
/// ```
/// use permtree::{PermissionAction, TargetPath};
///
/// let target = TargetPath::parse("users.view.edit_own").unwrap();
/// assert_eq!(target.node_path(), "users.view");
/// assert_eq!(target.action(), PermissionAction::EditOwn);
/// assert_eq!(target.to_string(), "users.view.edit_own");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetPath {
    node_path: String,
    action: PermissionAction,
}

impl TargetPath {
    /// Creates a target for `action` on the node at `node_path`.
    pub fn new(node_path: impl Into<String>, action: PermissionAction) -> Self {
        Self {
            node_path: node_path.into(),
            action,
        }
    }

    /// Parses `<nodePath>.<action>`.
    ///
    /// The action is validated first: an unknown trailing segment is
    /// [`Error::InvalidAction`]. A target with no node path in front of the
    /// action is [`Error::PathNotFound`].
    pub fn parse(target: &str) -> Result<Self, Error> {
        let (node_path, action) = match target.rsplit_once('.') {
            Some((node_path, action)) => (node_path, action),
            None => ("", target),
        };
        let action: PermissionAction = action.parse()?;
        if node_path.is_empty() {
            return Err(Error::PathNotFound(node_path.to_string()));
        }
        Ok(Self::new(node_path, action))
    }

    /// Path of the node the flag belongs to.
    pub fn node_path(&self) -> &str {
        &self.node_path
    }

    /// The flag being toggled.
    pub fn action(&self) -> PermissionAction {
        self.action
    }

    /// Segments of the node path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.node_path.split('.')
    }

    /// Node path truncated to its first `depth` segments, or `None` if the
    /// node path is shorter than that.
    pub(crate) fn prefix(&self, depth: usize) -> Option<&str> {
        if depth == 0 {
            return Some("");
        }
        let mut seen = 0;
        for (i, b) in self.node_path.bytes().enumerate() {
            if b == b'.' {
                seen += 1;
                if seen == depth {
                    return Some(&self.node_path[..i]);
                }
            }
        }
        if seen + 1 == depth {
            Some(&self.node_path)
        } else {
            None
        }
    }

    /// Number of segments in the node path.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_path, self.action)
    }
}

impl FromStr for TargetPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        TargetPath::parse(s)
    }
}
