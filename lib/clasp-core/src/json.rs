//! Strict JSON encoding and decoding.
//!
//! [`JsonCodec`] wraps `serde_json` so that every failure surfaces as one of
//! [`Error::Decode`], [`Error::Encode`] or [`Error::TypeMismatch`], and adds
//! type guards for callers that need a known shape from a dynamic [`Value`].
//!
//! # Example
//!
//! ```
//! use clasp_core::JsonCodec;
//!
//! let codec = JsonCodec::default();
//! let list = codec.decode_list("[1, 2, 3]").expect("list");
//! assert_eq!(list.len(), 3);
//! assert!(codec.decode_dict("[1, 2, 3]").is_err());
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use crate::scan;
use crate::{Error, Result};

/// A decoded JSON container: either a list or a dict.
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    /// Ordered list.
    List(Vec<Value>),
    /// String-keyed map, in document order.
    Dict(Map<String, Value>),
}

impl Container {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::List(list) => list.len(),
            Self::Dict(dict) => dict.len(),
        }
    }

    /// `true` if the container has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Container> for Value {
    fn from(container: Container) -> Self {
        match container {
            Container::List(list) => Self::Array(list),
            Container::Dict(dict) => Self::Object(dict),
        }
    }
}

/// A non-null JSON scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `true` or `false`.
    Bool(bool),
    /// Any JSON number.
    Number(Number),
    /// A string.
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(b) => Self::Bool(b),
            Scalar::Number(n) => Self::Number(n),
            Scalar::String(s) => Self::String(s),
        }
    }
}

/// Name of the runtime type of a JSON value, as used in error messages.
#[must_use]
pub const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Strict JSON codec with a configurable maximum nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonCodec {
    max_depth: usize,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

impl JsonCodec {
    /// Default maximum nesting depth.
    pub const DEFAULT_MAX_DEPTH: usize = 512;

    /// Largest maximum depth a codec accepts.
    ///
    /// Decoding recurses once per nesting level, so the bound keeps deep
    /// input from exhausting a thread's stack.
    pub const MAX_DEPTH_LIMIT: usize = 2048;

    /// Create a codec with a custom maximum nesting depth, capped at
    /// [`JsonCodec::MAX_DEPTH_LIMIT`].
    #[must_use]
    pub const fn with_max_depth(max_depth: usize) -> Self {
        let max_depth = if max_depth > Self::MAX_DEPTH_LIMIT {
            Self::MAX_DEPTH_LIMIT
        } else {
            max_depth
        };
        Self { max_depth }
    }

    /// Maximum nesting depth accepted by this codec.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    // ========================================================================
    // Encoding
    // ========================================================================

    /// Serialize a value to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if the value cannot be serialized or nests
    /// deeper than the configured maximum.
    pub fn encode<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let value = self.to_checked_value(value)?;
        serde_json::to_string(&value).map_err(|e| Error::encode(e.to_string()))
    }

    /// Serialize a value to indented JSON.
    ///
    /// # Errors
    ///
    /// Same conditions as [`JsonCodec::encode`].
    pub fn encode_pretty<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let value = self.to_checked_value(value)?;
        serde_json::to_string_pretty(&value).map_err(|e| Error::encode(e.to_string()))
    }

    fn to_checked_value<T: serde::Serialize + ?Sized>(&self, value: &T) -> Result<Value> {
        let value = serde_json::to_value(value).map_err(|e| Error::encode(e.to_string()))?;
        let depth = value_depth(&value);
        if depth > self.max_depth {
            return Err(Error::encode(format!(
                "maximum nesting depth of {} exceeded ({depth})",
                self.max_depth
            )));
        }
        Ok(value)
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    /// Decode JSON text to a dynamic value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] on malformed JSON, trailing data, or nesting
    /// deeper than the configured maximum.
    pub fn decode(&self, text: &str) -> Result<Value> {
        self.decode_slice(text.as_bytes())
    }

    /// Decode JSON bytes to a dynamic value.
    ///
    /// # Errors
    ///
    /// Same conditions as [`JsonCodec::decode`].
    pub fn decode_slice(&self, bytes: &[u8]) -> Result<Value> {
        let depth = scan::max_depth(bytes);
        if depth > self.max_depth {
            return Err(Error::decode(
                bytes,
                format!("maximum nesting depth of {} exceeded", self.max_depth),
            ));
        }

        // Depth is bounded above, so serde_json's own limit can be lifted.
        let mut deserializer = serde_json::Deserializer::from_slice(bytes);
        deserializer.disable_recursion_limit();
        let value = Value::deserialize(&mut deserializer)
            .and_then(|value| deserializer.end().map(|()| value))
            .map_err(|e| Error::decode(bytes, e.to_string()))?;
        Ok(value)
    }

    /// Decode JSON text that must be a list or a dict.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] on invalid JSON, [`Error::TypeMismatch`] on scalars
    /// and null.
    pub fn decode_array(&self, text: &str) -> Result<Container> {
        Self::expect_array(self.decode(text)?)
    }

    /// Decode JSON text that must be a dict.
    ///
    /// The text must start with `{`; anything else is rejected without
    /// running the parser.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] if the text is not an object,
    /// [`Error::Decode`] if it is not valid JSON.
    pub fn decode_dict(&self, text: &str) -> Result<Map<String, Value>> {
        if !text.starts_with('{') {
            return Err(Error::type_mismatch("dict", "non-object text"));
        }
        match self.decode_array(text)? {
            Container::Dict(dict) => Ok(dict),
            Container::List(_) => Err(Error::type_mismatch("dict", "list")),
        }
    }

    /// Decode JSON text that must be a list.
    ///
    /// See [`JsonCodec::expect_list`] for how dicts with numeric keys are
    /// handled.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] unless the value is a list,
    /// [`Error::Decode`] if the text is not valid JSON.
    pub fn decode_list(&self, text: &str) -> Result<Vec<Value>> {
        Self::expect_list(self.decode(text)?)
    }

    /// Decode JSON text that must be a non-null scalar.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] on null, lists and dicts.
    pub fn decode_scalar(&self, text: &str) -> Result<Scalar> {
        Self::expect_scalar(self.decode(text)?)
    }

    /// Decode JSON text that must be a scalar or null.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] on lists and dicts.
    pub fn decode_stringable(&self, text: &str) -> Result<Option<Scalar>> {
        Self::expect_stringable(self.decode(text)?)
    }

    /// Decode JSON text that must be a dict of strings.
    ///
    /// Only the first entry is checked: a dict whose first value is a string
    /// is accepted even if later values are not. Callers that need every
    /// value verified must check them themselves.
    ///
    /// # Errors
    ///
    /// As [`JsonCodec::decode_dict`], plus [`Error::TypeMismatch`] if the first
    /// value is not a string.
    pub fn decode_string_map(&self, text: &str) -> Result<Map<String, Value>> {
        let dict = self.decode_dict(text)?;
        match dict.values().next() {
            Some(Value::String(_)) | None => Ok(dict),
            Some(_) => Err(Error::type_mismatch("string map", "dict")),
        }
    }

    // ========================================================================
    // Type guards
    // ========================================================================

    /// Require a list or a dict.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] naming the actual type otherwise.
    pub fn expect_array(value: Value) -> Result<Container> {
        match value {
            Value::Array(list) => Ok(Container::List(list)),
            Value::Object(dict) => Ok(Container::Dict(dict)),
            other => Err(Error::type_mismatch("list or dict", type_name(&other))),
        }
    }

    /// Require a dict.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] naming the actual type otherwise.
    pub fn expect_dict(value: Value) -> Result<Map<String, Value>> {
        match value {
            Value::Object(dict) => Ok(dict),
            other => Err(Error::type_mismatch("dict", type_name(&other))),
        }
    }

    /// Require a list.
    ///
    /// A dict whose keys are exactly `"0"`, `"1"`, ... in order is the same
    /// data keyed by position, so it is accepted and converted to a list. The
    /// empty dict therefore converts to the empty list.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] naming the actual type otherwise.
    pub fn expect_list(value: Value) -> Result<Vec<Value>> {
        match value {
            Value::Array(list) => Ok(list),
            Value::Object(dict) if has_positional_keys(&dict) => {
                Ok(dict.into_iter().map(|(_, v)| v).collect())
            }
            other => Err(Error::type_mismatch("list", type_name(&other))),
        }
    }

    /// Require a non-null scalar.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] naming the actual type otherwise.
    pub fn expect_scalar(value: Value) -> Result<Scalar> {
        match value {
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Number(n) => Ok(Scalar::Number(n)),
            Value::String(s) => Ok(Scalar::String(s)),
            other => Err(Error::type_mismatch("scalar", type_name(&other))),
        }
    }

    /// Require a scalar or null.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] naming the actual type otherwise.
    pub fn expect_stringable(value: Value) -> Result<Option<Scalar>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(_) | Value::Object(_) => {
                Err(Error::type_mismatch("scalar or null", type_name(&value)))
            }
            scalar => Self::expect_scalar(scalar).map(Some),
        }
    }

    // ========================================================================
    // Rendering and files
    // ========================================================================

    /// Best-effort printable rendering of a value, for logs.
    ///
    /// Containers render as compact JSON, strings without quotes.
    #[must_use]
    pub fn safe_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            // Display on Value is compact JSON and cannot fail.
            other => other.to_string(),
        }
    }

    /// Read a JSON list or dict from a file.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the file cannot be read or does not hold a JSON
    /// container.
    pub fn from_file(&self, path: impl AsRef<Path>) -> Result<Container> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|_| {
            Error::decode(path.display().to_string().as_bytes(), "failed to read file")
        })?;
        Self::expect_array(self.decode_slice(&bytes)?).map_err(|e| {
            Error::decode(path.display().to_string().as_bytes(), e.to_string())
        })
    }

    /// Write a value as JSON to a file.
    ///
    /// # Errors
    ///
    /// [`Error::Encode`] if the value cannot be encoded or the file cannot be
    /// written.
    pub fn to_file<T: serde::Serialize + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        value: &T,
    ) -> Result<()> {
        let path = path.as_ref();
        let text = self.encode(value)?;
        std::fs::write(path, text)
            .map_err(|_| Error::encode(format!("failed to write file: {}", path.display())))
    }
}

fn has_positional_keys(dict: &Map<String, Value>) -> bool {
    dict.keys()
        .enumerate()
        .all(|(index, key)| *key == index.to_string())
}

fn value_depth(value: &Value) -> usize {
    match value {
        Value::Array(list) => 1 + list.iter().map(value_depth).max().unwrap_or(0),
        Value::Object(dict) => 1 + dict.values().map(value_depth).max().unwrap_or(0),
        _ => 0,
    }
}

// ============================================================================
// Typed deserialization
// ============================================================================

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the exact field that failed
/// (e.g. `user.address.city`).
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] if deserialization fails.
///
/// # Example
///
/// ```
/// use clasp_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = from_json(br#"{"name":"Alice"}"#).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}

/// Deserialize an already-decoded [`Value`] into a typed value.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] naming the failing path.
pub fn from_value<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T> {
    serde_path_to_error::deserialize(value)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}
