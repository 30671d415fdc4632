//! # permtree
//!
//! Hierarchical permission trees with checkbox-style propagation.
//!
//! A raw nested payload (roles, resource categories, ...) is turned into a
//! [`Forest`] of [`PermissionNode`]s. Leaves carry six directly settable
//! flags; groups carry the per-action conjunction of their children. Toggling
//! one flag returns a new forest in which every ancestor has been
//! re-aggregated, and toggling a group's flag pushes the value down to every
//! node beneath it.
//!
//! The crate maintains a view-model of intended assignments only. It fetches
//! nothing, persists nothing, and enforces nothing.
//!
//! ## Quick Start
//!
//! ```rust
//! use permtree::{build, Error, RawValue};
//!
//! # fn example() -> Result<(), Error> {
//! let denied = || {
//!     RawValue::map(
//!         ["add", "view", "edit", "edit_own", "delete", "delete_own"]
//!             .map(|action| (action, RawValue::Bool(false))),
//!     )
//! };
//! let raw = RawValue::map([(
//!     "users",
//!     RawValue::map([(
//!         "view",
//!         RawValue::map([("id", RawValue::from("p1")), ("permission", denied())]),
//!     )]),
//! )]);
//!
//! let forest = build(&raw)?;
//! let update = forest.update("users.view.view", true)?;
//!
//! let users = update.forest.find("users").expect("root exists");
//! assert!(users.permissions().view);
//! assert_eq!(update.granted, vec!["p1.view".to_string()]);
//!
//! match forest.update("users.view.bogus_action", true) {
//!     Err(Error::InvalidAction(action)) => assert_eq!(action, "bogus_action"),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `serde` | No | Serialize forests and nodes; parse payloads from JSON text |

pub mod debounce;
pub mod editor;
pub mod error;
pub mod tree;
pub mod types;

pub use editor::{Editor, Toggle};
pub use error::Error;
pub use tree::{build, update, Forest, InitialPermissions, TreeBuilder, Update};
pub use types::*;
