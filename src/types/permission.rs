//! Permission actions and per-node permission sets.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One of the six fixed permission kinds a node carries a flag for.
///
/// Parsed from and rendered as the snake_case strings used in target paths
/// (`"edit_own"`, `"delete"`, ...).
///
/// # Examples
///
/// ```
/// use permtree::PermissionAction;
///
/// let action: PermissionAction = "edit_own".parse().unwrap();
/// assert_eq!(action, PermissionAction::EditOwn);
/// assert_eq!(action.to_string(), "edit_own");
/// assert_eq!(action.label(), "Edit Own");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PermissionAction {
    /// Create new records.
    Add,
    /// Read records.
    View,
    /// Modify any record.
    Edit,
    /// Modify records owned by the subject.
    EditOwn,
    /// Remove any record.
    Delete,
    /// Remove records owned by the subject.
    DeleteOwn,
}

impl PermissionAction {
    /// All actions in canonical column order.
    pub const ALL: [PermissionAction; 6] = [
        PermissionAction::Add,
        PermissionAction::View,
        PermissionAction::Edit,
        PermissionAction::EditOwn,
        PermissionAction::Delete,
        PermissionAction::DeleteOwn,
    ];

    /// Returns the identifier used in target paths and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionAction::Add => "add",
            PermissionAction::View => "view",
            PermissionAction::Edit => "edit",
            PermissionAction::EditOwn => "edit_own",
            PermissionAction::Delete => "delete",
            PermissionAction::DeleteOwn => "delete_own",
        }
    }

    /// Returns the column heading a renderer shows for this action.
    pub fn label(&self) -> &'static str {
        match self {
            PermissionAction::Add => "Add",
            PermissionAction::View => "View",
            PermissionAction::Edit => "Edit",
            PermissionAction::EditOwn => "Edit Own",
            PermissionAction::Delete => "Delete",
            PermissionAction::DeleteOwn => "Delete Own",
        }
    }
}

impl fmt::Display for PermissionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "add" => Ok(PermissionAction::Add),
            "view" => Ok(PermissionAction::View),
            "edit" => Ok(PermissionAction::Edit),
            "edit_own" => Ok(PermissionAction::EditOwn),
            "delete" => Ok(PermissionAction::Delete),
            "delete_own" => Ok(PermissionAction::DeleteOwn),
            other => Err(Error::InvalidAction(other.to_string())),
        }
    }
}

/// A flag for every [`PermissionAction`]. Never partial.
///
/// For a leaf node the flags are set directly; for a group node they are the
/// per-action conjunction of its children (see [`PermissionSet::aggregate`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionSet {
    /// `add` flag.
    pub add: bool,
    /// `view` flag.
    pub view: bool,
    /// `edit` flag.
    pub edit: bool,
    /// `edit_own` flag.
    pub edit_own: bool,
    /// `delete` flag.
    pub delete: bool,
    /// `delete_own` flag.
    pub delete_own: bool,
}

impl PermissionSet {
    /// Every action false.
    pub const fn denied() -> Self {
        Self::uniform(false)
    }

    /// Every action true.
    pub const fn granted() -> Self {
        Self::uniform(true)
    }

    /// Every action set to `value`.
    pub const fn uniform(value: bool) -> Self {
        Self {
            add: value,
            view: value,
            edit: value,
            edit_own: value,
            delete: value,
            delete_own: value,
        }
    }

    /// Returns the flag for `action`.
    pub fn get(&self, action: PermissionAction) -> bool {
        match action {
            PermissionAction::Add => self.add,
            PermissionAction::View => self.view,
            PermissionAction::Edit => self.edit,
            PermissionAction::EditOwn => self.edit_own,
            PermissionAction::Delete => self.delete,
            PermissionAction::DeleteOwn => self.delete_own,
        }
    }

    /// Sets the flag for `action`.
    pub fn set(&mut self, action: PermissionAction, value: bool) {
        let slot = match action {
            PermissionAction::Add => &mut self.add,
            PermissionAction::View => &mut self.view,
            PermissionAction::Edit => &mut self.edit,
            PermissionAction::EditOwn => &mut self.edit_own,
            PermissionAction::Delete => &mut self.delete,
            PermissionAction::DeleteOwn => &mut self.delete_own,
        };
        *slot = value;
    }

    /// Returns a copy with the flag for `action` replaced.
    pub fn with(mut self, action: PermissionAction, value: bool) -> Self {
        self.set(action, value);
        self
    }

    /// Iterates `(action, flag)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (PermissionAction, bool)> + '_ {
        PermissionAction::ALL
            .into_iter()
            .map(move |action| (action, self.get(action)))
    }

    /// Per-action logical AND over `sets`.
    ///
    /// An empty input yields [`PermissionSet::granted`] (the vacuous
    /// conjunction); the builder never aggregates an empty group.
    pub fn aggregate<'a>(sets: impl IntoIterator<Item = &'a PermissionSet>) -> Self {
        sets.into_iter()
            .fold(PermissionSet::granted(), |acc, set| PermissionSet {
                add: acc.add && set.add,
                view: acc.view && set.view,
                edit: acc.edit && set.edit,
                edit_own: acc.edit_own && set.edit_own,
                delete: acc.delete && set.delete,
                delete_own: acc.delete_own && set.delete_own,
            })
    }
}
