//! Strategy configuration: compulsory/optional key resolution and `{KEY}` substitution.
//!
//! `resolve` validates the keys a strategy declares compulsory, fills in defaults for the
//! optional ones, then runs exactly one `substitute` pass over every top-level value. The
//! result is a [`StrategyConfig`] that stays immutable for the rest of the handshake.

pub mod resolve;
pub mod substitute;

pub use resolve::*;
pub use substitute::*;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::ConfigError};

/// Declares which keys a strategy requires and which ones it defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigSchema {
	/// Keys that must be present and non-empty.
	pub expects: Vec<String>,
	/// Optional keys with the value inserted when the caller omits them.
	pub defaults: Map<String, Value>,
	/// Value a compulsory key must not hold (catches unreplaced placeholder text).
	pub forbidden: Option<Value>,
}
impl ConfigSchema {
	/// Creates an empty schema.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a compulsory key.
	pub fn expect(mut self, key: impl Into<String>) -> Self {
		self.expects.push(key.into());

		self
	}

	/// Declares several compulsory keys.
	pub fn expects<I, K>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = K>,
		K: Into<String>,
	{
		self.expects.extend(keys.into_iter().map(Into::into));

		self
	}

	/// Declares an optional key and its default.
	pub fn default_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.defaults.insert(key.into(), value.into());

		self
	}

	/// Declares several optional keys at once; later entries win.
	pub fn defaults(mut self, defaults: Map<String, Value>) -> Self {
		self.defaults.extend(defaults);

		self
	}

	/// Rejects compulsory keys that still hold `value`.
	pub fn forbid(mut self, value: impl Into<Value>) -> Self {
		self.forbidden = Some(value.into());

		self
	}
}

/// Resolved, substituted configuration owned by a single handshake.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyConfig(Map<String, Value>);
impl StrategyConfig {
	pub(crate) fn from_map(map: Map<String, Value>) -> Self {
		Self(map)
	}

	/// Returns the raw value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns the value under `key` when it is a string.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(Value::as_str)
	}

	/// Reads `key` as an unsigned integer, accepting numeric strings.
	pub fn get_u64(&self, key: &str) -> Result<Option<u64>, ConfigError> {
		let invalid = || ConfigError::InvalidType { key: key.to_owned(), expected: "a number" };

		match self.0.get(key) {
			None | Some(Value::Null) => Ok(None),
			Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(invalid),
			Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
			Some(_) => Err(invalid()),
		}
	}

	/// Whether `key` is present with a non-empty value.
	pub fn is_set(&self, key: &str) -> bool {
		self.0.get(key).is_some_and(|v| !is_blank(v))
	}

	/// Borrows the underlying map.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}

	/// Consumes the config and returns the underlying map.
	pub fn into_map(self) -> Map<String, Value> {
		self.0
	}

	/// Deserializes the configuration into a typed view, reporting the failing key path.
	pub fn deserialize<T>(&self) -> Result<T, ConfigError>
	where
		T: DeserializeOwned,
	{
		let value = Value::Object(self.0.clone());

		serde_path_to_error::deserialize(value)
			.map_err(|source| ConfigError::Deserialize { source })
	}
}

/// `null`, `""`, `[]`, and `{}` count as unset.
pub(crate) fn is_blank(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::String(s) => s.is_empty(),
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
		Value::Bool(_) | Value::Number(_) => false,
	}
}
