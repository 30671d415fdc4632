//! Single-owner state container that serializes toggles against the latest
//! forest.

use futures_core::Stream;
use tokio_stream::StreamExt;

use crate::error::Error;
use crate::tree::{Forest, TreeBuilder, Update};
use crate::types::RawValue;

/// A user-initiated change of one checkbox.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Toggle {
    /// `<nodePath>.<action>`, e.g. `"users.view.edit"`.
    pub target: String,
    /// The checkbox's new state.
    pub value: bool,
}

impl Toggle {
    /// Creates a toggle of `target` to `value`.
    pub fn new(target: impl Into<String>, value: bool) -> Self {
        Self {
            target: target.into(),
            value,
        }
    }
}

/// Holds the current forest and applies toggles to it one at a time.
///
/// Each successful toggle replaces the held forest wholesale; a failed toggle
/// leaves it exactly as it was. Because [`Editor::apply`] takes `&mut self`,
/// two toggles can never be computed against the same stale snapshot.
///
/// # Examples
///
/// ```
/// use permtree::{Editor, RawValue, Toggle};
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
/// let mut editor = Editor::from_payload(&raw).unwrap();
/// let update = editor.apply(&Toggle::new("users.view.view", true)).unwrap();
/// assert_eq!(update.granted, vec!["p1.view".to_string()]);
/// assert!(editor.forest().find("users").unwrap().permissions().view);
/// assert_eq!(editor.revision(), 1);
///
/// assert!(editor.apply(&Toggle::new("users.view.bogus", true)).is_err());
/// assert_eq!(editor.revision(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Editor {
    forest: Forest,
    revision: u64,
}

impl Editor {
    /// Starts editing `forest`.
    pub fn new(forest: Forest) -> Self {
        Self { forest, revision: 0 }
    }

    /// Builds a forest from `raw` with the default builder and starts
    /// editing it.
    pub fn from_payload(raw: &RawValue) -> Result<Self, Error> {
        Self::with_builder(&TreeBuilder::new(), raw)
    }

    /// Builds a forest from `raw` with `builder` and starts editing it.
    pub fn with_builder(builder: &TreeBuilder, raw: &RawValue) -> Result<Self, Error> {
        Ok(Self::new(builder.build(raw)?))
    }

    /// The latest forest.
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    /// Number of toggles applied successfully so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Applies `toggle` to the latest forest and makes the result current.
    pub fn apply(&mut self, toggle: &Toggle) -> Result<Update, Error> {
        let update = self.forest.update(&toggle.target, toggle.value)?;
        self.forest = update.forest.clone();
        self.revision += 1;
        Ok(update)
    }

    /// Replaces the held forest, e.g. after a fresh payload was fetched.
    pub fn reset(&mut self, forest: Forest) {
        self.forest = forest;
        self.revision = 0;
    }

    /// Consumes the editor, returning the latest forest.
    pub fn into_forest(self) -> Forest {
        self.forest
    }

    /// Applies every toggle from `toggles` in arrival order, yielding one
    /// result per toggle.
    ///
    /// A failed toggle yields its error and processing continues with the
    /// next one against the unchanged forest.
    pub fn run<S>(mut self, toggles: S) -> impl Stream<Item = Result<Update, Error>>
    where
        S: Stream<Item = Toggle>,
    {
        async_stream::stream! {
            tokio::pin!(toggles);
            while let Some(toggle) = toggles.next().await {
                let result = self.apply(&toggle);
                if let Err(err) = &result {
                    tracing::debug!(target_path = %toggle.target, error = %err, "toggle rejected");
                }
                yield result;
            }
        }
    }
}
