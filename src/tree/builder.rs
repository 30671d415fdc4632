//! Tree builder: raw payload to [`Forest`].

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::Error;
use crate::types::{humanize_key, PermissionAction, PermissionNode, PermissionSet, RawValue};

use super::Forest;

const PERMISSION_FIELD: &str = "permission";
const ID_FIELD: &str = "id";
const NAME_FIELD: &str = "name";

/// Where leaf nodes take their starting flags from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InitialPermissions {
    /// Read the flags from each leaf's `permission` object. Actions the
    /// object does not mention start as `false`.
    #[default]
    FromPayload,
    /// Start every leaf with the same flags, ignoring payload values.
    Uniform(PermissionSet),
}

/// A builder for configuring how a payload becomes a [`Forest`].
///
/// # Examples
///
/// ```
/// use permtree::{InitialPermissions, PermissionSet, RawValue, TreeBuilder};
///
/// let raw = RawValue::map([(
///     "report",
///     RawValue::map([(
///         "permission",
///         RawValue::map([("view", RawValue::Bool(true))]),
///     )]),
/// )]);
///
/// let forest = TreeBuilder::new()
///     .initial_permissions(InitialPermissions::Uniform(PermissionSet::denied()))
///     .max_depth(8)
///     .build(&raw)
///     .unwrap();
/// assert!(!forest.find("report").unwrap().permissions().view);
/// ```
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    initial: InitialPermissions,
    max_depth: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    /// Nesting limit applied unless [`TreeBuilder::max_depth`] overrides it.
    pub const DEFAULT_MAX_DEPTH: usize = 64;

    /// Creates a builder that reads leaf flags from the payload.
    pub fn new() -> Self {
        Self {
            initial: InitialPermissions::FromPayload,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }

    /// Selects where leaves take their starting flags from.
    pub fn initial_permissions(mut self, initial: InitialPermissions) -> Self {
        self.initial = initial;
        self
    }

    /// Sets the deepest nesting level accepted. Deeper payloads are rejected
    /// as [`Error::InvalidPayload`].
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Converts `raw` into a forest.
    ///
    /// Fails with [`Error::InvalidPayload`] on the first malformed entry; no
    /// partial forest is returned.
    pub fn build(&self, raw: &RawValue) -> Result<Forest, Error> {
        let entries = raw.entries().ok_or_else(|| {
            Error::invalid_payload("", format!("expected a map, found {}", raw.kind()))
        })?;
        let entries: Vec<(&str, &RawValue)> =
            entries.iter().map(|(k, v)| (k.as_str(), v)).collect();

        let forest = Forest::from_roots(self.build_level(&entries, None, 1)?);
        tracing::debug!(
            roots = forest.len(),
            nodes = forest.node_count(),
            "built permission forest"
        );
        Ok(forest)
    }

    fn build_level(
        &self,
        entries: &[(&str, &RawValue)],
        parent: Option<&str>,
        depth: usize,
    ) -> Result<Vec<Arc<PermissionNode>>, Error> {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut nodes = Vec::with_capacity(entries.len());
        for &(key, value) in entries {
            let path = match parent {
                Some(parent) => format!("{parent}.{key}"),
                None => key.to_string(),
            };
            if key.is_empty() {
                return Err(Error::invalid_payload(path, "keys must not be empty"));
            }
            if key.contains('.') {
                return Err(Error::invalid_payload(path, "keys must not contain `.`"));
            }
            if !seen.insert(key) {
                return Err(Error::invalid_payload(path, "duplicate sibling key"));
            }
            if depth > self.max_depth {
                return Err(Error::invalid_payload(
                    path,
                    format!("nesting exceeds the maximum depth of {}", self.max_depth),
                ));
            }
            nodes.push(Arc::new(self.build_node(key, path, value, depth)?));
        }
        Ok(nodes)
    }

    fn build_node(
        &self,
        key: &str,
        path: String,
        value: &RawValue,
        depth: usize,
    ) -> Result<PermissionNode, Error> {
        let fields = value.entries().ok_or_else(|| {
            Error::invalid_payload(&path, format!("expected a map, found {}", value.kind()))
        })?;

        match value.get(PERMISSION_FIELD) {
            Some(permission) => {
                let id = descriptor_id(value.get(ID_FIELD), &path)?;
                let name = descriptor_name(value.get(NAME_FIELD), &path)?;
                let permissions = match self.initial {
                    InitialPermissions::FromPayload => read_permissions(permission, &path)?,
                    InitialPermissions::Uniform(set) => {
                        read_permissions(permission, &path)?;
                        set
                    }
                };
                let label = label_for(key, name);
                Ok(PermissionNode::leaf(path, id, label, permissions))
            }
            None => {
                let mut id = None;
                let mut name = None;
                let mut children = Vec::with_capacity(fields.len());
                for (k, v) in fields {
                    match (k.as_str(), v) {
                        (_, RawValue::Map(_)) => children.push((k.as_str(), v)),
                        (ID_FIELD, _) => id = descriptor_id(Some(v), &path)?,
                        (NAME_FIELD, _) => name = descriptor_name(Some(v), &path)?,
                        (_, other) => {
                            return Err(Error::invalid_payload(
                                format!("{path}.{k}"),
                                format!("expected a map, found {}", other.kind()),
                            ))
                        }
                    }
                }
                if children.is_empty() {
                    return Err(Error::invalid_payload(
                        path,
                        "group has no children and no `permission` object",
                    ));
                }
                let children = self.build_level(&children, Some(&path), depth + 1)?;
                let label = label_for(key, name);
                Ok(PermissionNode::group(path, id, label, children))
            }
        }
    }
}

/// Converts `raw` into a forest with the default [`TreeBuilder`].
pub fn build(raw: &RawValue) -> Result<Forest, Error> {
    TreeBuilder::new().build(raw)
}

fn label_for(key: &str, name: Option<String>) -> String {
    match name {
        Some(name) if !name.is_empty() => name,
        _ => humanize_key(key),
    }
}

fn descriptor_id(value: Option<&RawValue>, path: &str) -> Result<Option<String>, Error> {
    match value {
        None | Some(RawValue::Null) => Ok(None),
        Some(RawValue::String(id)) if id.is_empty() => Ok(None),
        Some(v) => v.as_identifier().map(Some).ok_or_else(|| {
            Error::invalid_payload(
                path,
                format!(
                    "`id` must be a string or an exactly representable number, found {v}"
                ),
            )
        }),
    }
}

fn descriptor_name(value: Option<&RawValue>, path: &str) -> Result<Option<String>, Error> {
    match value {
        None | Some(RawValue::Null) => Ok(None),
        Some(RawValue::String(name)) => Ok(Some(name.clone())),
        Some(v) => Err(Error::invalid_payload(
            path,
            format!("`name` must be a string, found {}", v.kind()),
        )),
    }
}

fn read_permissions(raw: &RawValue, path: &str) -> Result<PermissionSet, Error> {
    let entries = raw.entries().ok_or_else(|| {
        Error::invalid_payload(
            path,
            format!("`permission` must be a map, found {}", raw.kind()),
        )
    })?;

    let mut set = PermissionSet::denied();
    for (key, value) in entries {
        let Ok(action) = key.parse::<PermissionAction>() else {
            tracing::debug!(path, key = %key, "ignoring unknown permission key");
            continue;
        };
        match value {
            RawValue::Bool(flag) => set.set(action, *flag),
            RawValue::Null => set.set(action, false),
            other => {
                return Err(Error::invalid_payload(
                    path,
                    format!("`permission.{key}` must be a boolean, found {}", other.kind()),
                ))
            }
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(pairs: &[(&str, bool)]) -> RawValue {
        RawValue::map(pairs.iter().map(|&(k, v)| (k, RawValue::Bool(v))))
    }

    fn leaf(id: &str, permission: RawValue) -> RawValue {
        RawValue::map([("id", RawValue::from(id)), ("permission", permission)])
    }

    fn all_false() -> RawValue {
        flags(&[
            ("add", false),
            ("view", false),
            ("edit", false),
            ("edit_own", false),
            ("delete", false),
            ("delete_own", false),
        ])
    }

    #[test]
    fn single_leaf_under_group() {
        let raw = RawValue::map([("users", RawValue::map([("view", leaf("p1", all_false()))]))]);
        let forest = build(&raw).unwrap();

        assert_eq!(forest.len(), 1);
        let users = &forest.roots()[0];
        assert_eq!(users.path(), "users");
        assert_eq!(users.depth(), 1);
        assert_eq!(users.external_id(), None);
        assert_eq!(users.children().unwrap().len(), 1);

        let view = &users.children().unwrap()[0];
        assert_eq!(view.path(), "users.view");
        assert_eq!(view.depth(), 2);
        assert_eq!(view.external_id(), Some("p1"));
        assert!(view.is_leaf());
        assert_eq!(*view.permissions(), PermissionSet::denied());
    }

    #[test]
    fn explicit_flags_pass_through_and_aggregate() {
        let raw = RawValue::map([(
            "docs",
            RawValue::map([
                ("read", leaf("d1", flags(&[("view", true), ("edit", true)]))),
                ("write", leaf("d2", flags(&[("view", true)]))),
            ]),
        )]);
        let forest = build(&raw).unwrap();

        let read = forest.find("docs.read").unwrap();
        assert!(read.permissions().view);
        assert!(read.permissions().edit);
        assert!(!read.permissions().add);

        let docs = forest.find("docs").unwrap();
        assert!(docs.permissions().view);
        assert!(!docs.permissions().edit);
    }

    #[test]
    fn uniform_initial_permissions_override_payload() {
        let raw = RawValue::map([("x", leaf("1", flags(&[("view", true)])))]);
        let forest = TreeBuilder::new()
            .initial_permissions(InitialPermissions::Uniform(PermissionSet::denied()))
            .build(&raw)
            .unwrap();
        assert_eq!(*forest.find("x").unwrap().permissions(), PermissionSet::denied());

        let forest = TreeBuilder::new()
            .initial_permissions(InitialPermissions::Uniform(PermissionSet::granted()))
            .build(&raw)
            .unwrap();
        assert_eq!(*forest.find("x").unwrap().permissions(), PermissionSet::granted());
    }

    #[test]
    fn labels_from_name_or_key() {
        let raw = RawValue::map([(
            "userRoles",
            RawValue::map([
                ("name", RawValue::from("Roles")),
                ("id", RawValue::Number(7.0)),
                (
                    "editOwnRecord",
                    RawValue::map([("permission", all_false())]),
                ),
                (
                    "export",
                    RawValue::map([
                        ("name", RawValue::from("Export CSV")),
                        ("permission", all_false()),
                    ]),
                ),
            ]),
        )]);
        let forest = build(&raw).unwrap();

        let group = forest.find("userRoles").unwrap();
        assert_eq!(group.label(), "Roles");
        assert_eq!(group.external_id(), Some("7"));
        assert_eq!(group.children().unwrap().len(), 2);
        assert_eq!(forest.find("userRoles.editOwnRecord").unwrap().label(), "edit Own Record");
        assert_eq!(forest.find("userRoles.export").unwrap().label(), "Export CSV");
    }

    #[test]
    fn empty_name_falls_back_to_key() {
        let raw = RawValue::map([(
            "auditLog",
            RawValue::map([("name", RawValue::from("")), ("permission", all_false())]),
        )]);
        let forest = build(&raw).unwrap();
        assert_eq!(forest.find("auditLog").unwrap().label(), "audit Log");
    }

    #[test]
    fn children_keep_payload_order() {
        let raw = RawValue::map([(
            "g",
            RawValue::map([
                ("zeta", leaf("z", all_false())),
                ("alpha", leaf("a", all_false())),
                ("mid", leaf("m", all_false())),
            ]),
        )]);
        let forest = build(&raw).unwrap();
        let keys: Vec<&str> = forest.roots()[0]
            .children()
            .unwrap()
            .iter()
            .map(|c| c.key())
            .collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn missing_actions_default_to_false_and_unknown_keys_are_ignored() {
        let raw = RawValue::map([(
            "x",
            leaf("1", flags(&[("view", true), ("approve", true)])),
        )]);
        let forest = build(&raw).unwrap();
        let x = forest.find("x").unwrap();
        assert_eq!(*x.permissions(), PermissionSet::denied().with(PermissionAction::View, true));
    }

    #[test]
    fn empty_payload_is_empty_forest() {
        let forest = build(&RawValue::map(Vec::<(String, RawValue)>::new())).unwrap();
        assert!(forest.is_empty());
    }

    #[test]
    fn top_level_must_be_a_map() {
        let err = build(&RawValue::List(vec![])).unwrap_err();
        assert_eq!(err.path(), Some(""));
        assert!(matches!(err, Error::InvalidPayload { .. }));
    }

    #[test]
    fn scalar_group_entry_is_rejected() {
        let raw = RawValue::map([(
            "users",
            RawValue::map([("view", leaf("p1", all_false())), ("count", RawValue::Number(3.0))]),
        )]);
        let err = build(&raw).unwrap_err();
        assert_eq!(err.path(), Some("users.count"));
    }

    #[test]
    fn scalar_root_is_rejected() {
        let raw = RawValue::map([("users", RawValue::from("nope"))]);
        let err = build(&raw).unwrap_err();
        assert_eq!(err.path(), Some("users"));
    }

    #[test]
    fn empty_group_is_rejected() {
        let raw = RawValue::map([("users", RawValue::map([("name", RawValue::from("Users"))]))]);
        let err = build(&raw).unwrap_err();
        assert!(matches!(err, Error::InvalidPayload { ref path, .. } if path == "users"));
    }

    #[test]
    fn non_map_permission_is_rejected() {
        let raw = RawValue::map([("x", leaf("1", RawValue::Bool(true)))]);
        assert!(matches!(build(&raw), Err(Error::InvalidPayload { .. })));
    }

    #[test]
    fn non_boolean_flag_is_rejected() {
        let raw = RawValue::map([("x", leaf("1", RawValue::map([("view", RawValue::from("yes"))])))]);
        let err = build(&raw).unwrap_err();
        assert!(err.to_string().contains("permission.view"));
    }

    #[test]
    fn uniform_mode_still_validates_shape() {
        let raw = RawValue::map([("x", leaf("1", RawValue::Number(1.0)))]);
        let result = TreeBuilder::new()
            .initial_permissions(InitialPermissions::Uniform(PermissionSet::denied()))
            .build(&raw);
        assert!(matches!(result, Err(Error::InvalidPayload { .. })));
    }

    #[test]
    fn bad_descriptor_types_are_rejected() {
        let raw = RawValue::map([(
            "x",
            RawValue::map([("id", RawValue::Bool(true)), ("permission", all_false())]),
        )]);
        assert!(build(&raw).unwrap_err().to_string().contains("`id`"));

        let raw = RawValue::map([(
            "x",
            RawValue::map([("name", RawValue::Number(1.0)), ("permission", all_false())]),
        )]);
        assert!(build(&raw).unwrap_err().to_string().contains("`name`"));
    }

    #[test]
    fn dotted_and_empty_keys_are_rejected() {
        let raw = RawValue::map([("a.b", leaf("1", all_false()))]);
        assert_eq!(build(&raw).unwrap_err().path(), Some("a.b"));

        let raw = RawValue::map([("", leaf("1", all_false()))]);
        assert!(matches!(build(&raw), Err(Error::InvalidPayload { .. })));
    }

    #[test]
    fn duplicate_sibling_keys_are_rejected() {
        let raw = RawValue::map([("a", leaf("1", all_false())), ("a", leaf("2", all_false()))]);
        let err = build(&raw).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn max_depth_is_enforced() {
        let raw = RawValue::map([(
            "a",
            RawValue::map([("b", RawValue::map([("c", leaf("1", all_false()))]))]),
        )]);
        assert!(TreeBuilder::new().max_depth(3).build(&raw).is_ok());
        let err = TreeBuilder::new().max_depth(2).build(&raw).unwrap_err();
        assert_eq!(err.path(), Some("a.b.c"));
    }

    #[test]
    fn empty_id_is_absent() {
        let raw = RawValue::map([(
            "g",
            RawValue::map([("id", RawValue::from("")), ("x", leaf("", all_false()))]),
        )]);
        let forest = build(&raw).unwrap();
        assert_eq!(forest.find("g").unwrap().external_id(), None);
        assert_eq!(forest.find("g.x").unwrap().external_id(), None);

        let outcome = forest.update("g.x.view", true).unwrap();
        assert!(outcome.granted.is_empty());
        assert!(outcome.forest.granted_ids().is_empty());
    }

    #[test]
    fn integer_ids_are_exact() {
        let raw = RawValue::map([
            (
                "big",
                RawValue::map([
                    ("id", RawValue::from(12_345_678_901_234_567_891_u64)),
                    ("permission", all_false()),
                ]),
            ),
            (
                "neg",
                RawValue::map([("id", RawValue::from(-42_i64)), ("permission", all_false())]),
            ),
        ]);
        let forest = build(&raw).unwrap();
        assert_eq!(
            forest.find("big").unwrap().external_id(),
            Some("12345678901234567891")
        );
        assert_eq!(forest.find("neg").unwrap().external_id(), Some("-42"));
    }

    #[test]
    fn inexact_float_id_is_rejected() {
        let raw = RawValue::map([(
            "x",
            RawValue::map([("id", RawValue::Number(1e20)), ("permission", all_false())]),
        )]);
        let err = build(&raw).unwrap_err();
        assert_eq!(err.path(), Some("x"));
        assert!(err.to_string().contains("exactly representable"));
    }

    #[test]
    fn map_valued_name_in_group_is_a_child() {
        let raw = RawValue::map([(
            "g",
            RawValue::map([("name", leaf("n", all_false()))]),
        )]);
        let forest = build(&raw).unwrap();
        let g = forest.find("g").unwrap();
        assert_eq!(g.label(), "g");
        assert_eq!(forest.find("g.name").unwrap().external_id(), Some("n"));
    }
}
