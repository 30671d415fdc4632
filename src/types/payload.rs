//! Raw, order-preserving payload values fed to the tree builder.

use std::fmt;

/// Largest magnitude up to which every integer is an exact `f64` (2^53).
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

/// An owned JSON-like value describing a permission hierarchy.
///
/// Maps keep their entries in insertion order; the builder relies on this to
/// lay out children the way the payload lists them.
///
/// # Examples
///
/// ```
/// use permtree::RawValue;
///
/// let payload = RawValue::map([(
///     "users",
///     RawValue::map([(
///         "view",
///         RawValue::map([
///             ("id", RawValue::from("p1")),
///             ("permission", RawValue::map([("view", RawValue::Bool(false))])),
///         ]),
///     )]),
/// )]);
/// assert!(payload.get("users").is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// JSON null.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer too large for [`RawValue::Int`].
    UInt(u64),
    /// Any other numeric value.
    Number(f64),
    /// A string value.
    String(String),
    /// A list of values.
    List(Vec<RawValue>),
    /// An ordered key-value structure.
    Map(Vec<(String, RawValue)>),
}

impl RawValue {
    /// Builds a map from `(key, value)` pairs, keeping their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        RawValue::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Looks up `key` if this is a map.
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entries()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Returns the entries if this is a map.
    pub fn entries(&self) -> Option<&[(String, RawValue)]> {
        match self {
            RawValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns `true` for [`RawValue::Map`].
    pub fn is_map(&self) -> bool {
        matches!(self, RawValue::Map(_))
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "boolean",
            RawValue::Int(_) | RawValue::UInt(_) | RawValue::Number(_) => "number",
            RawValue::String(_) => "string",
            RawValue::List(_) => "list",
            RawValue::Map(_) => "map",
        }
    }

    /// Renders a scalar as identifier text: strings verbatim, integers
    /// exactly, and floats without a trailing `.0` when integral.
    ///
    /// Yields `None` for non-scalars and for integral floats beyond the range
    /// an `f64` holds exactly, whose digits would not match the payload.
    pub(crate) fn as_identifier(&self) -> Option<String> {
        match self {
            RawValue::String(s) => Some(s.clone()),
            RawValue::Int(n) => Some(n.to_string()),
            RawValue::UInt(n) => Some(n.to_string()),
            RawValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_F64 => {
                Some(format!("{}", *n as i64))
            }
            RawValue::Number(n) if n.is_finite() && n.fract() != 0.0 => Some(n.to_string()),
            _ => None,
        }
    }

    /// Parses a JSON document, preserving object key order.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| crate::Error::invalid_payload("", format!("malformed JSON: {e}")))?;
        Ok(value.into())
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

impl From<i64> for RawValue {
    fn from(n: i64) -> Self {
        RawValue::Int(n)
    }
}

impl From<u64> for RawValue {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => RawValue::Int(n),
            Err(_) => RawValue::UInt(n),
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::String(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::String(s)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("null"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::Int(n) => write!(f, "{n}"),
            RawValue::UInt(n) => write!(f, "{n}"),
            RawValue::Number(n) => write!(f, "{n}"),
            RawValue::String(s) => write!(f, "{s:?}"),
            RawValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            RawValue::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Value> for RawValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RawValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    RawValue::UInt(u)
                } else {
                    RawValue::Number(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => RawValue::String(s),
            serde_json::Value::Array(items) => {
                RawValue::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(fields) => {
                RawValue::Map(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RawValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Into::into)
    }
}
