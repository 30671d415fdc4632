//! Domain types for permission trees.
//!
//! These are the values collaborators exchange with the builder and updater:
//! actions and flag sets, tree nodes, raw payloads, and toggle targets.

mod node;
mod payload;
mod permission;
mod target;

pub use node::{humanize_key, PermissionNode};
pub use payload::RawValue;
pub use permission::{PermissionAction, PermissionSet};
pub use target::TargetPath;
