//! Terminal response shaping shared by every strategy.
//!
//! Payloads are normalized into plain JSON trees with booleans rewritten to `1`/`0` (some
//! callback transports cannot round-trip native booleans), stamped with the provider name,
//! and wrapped as either `{"auth": ...}` or `{"error": ...}`.

pub mod signature;

pub use signature::*;

// self
use crate::{_prelude::*, error::ResponseError, id::ProviderName};

/// One of the two mutually exclusive terminal shapes of a handshake.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
	/// Successful authentication payload.
	Auth(Map<String, Value>),
	/// Failure payload with at least `provider`, `code`, `message`, and `raw`.
	Error(Map<String, Value>),
}
impl Envelope {
	/// Wrapper key used on the wire.
	pub const fn kind(&self) -> &'static str {
		match self {
			Envelope::Auth(_) => "auth",
			Envelope::Error(_) => "error",
		}
	}

	/// Whether this is a success envelope.
	pub fn is_auth(&self) -> bool {
		matches!(self, Envelope::Auth(_))
	}

	/// Inner payload.
	pub fn body(&self) -> &Map<String, Value> {
		match self {
			Envelope::Auth(body) | Envelope::Error(body) => body,
		}
	}

	/// Provider name stamped into the payload.
	pub fn provider(&self) -> Option<&str> {
		self.body().get("provider").and_then(Value::as_str)
	}

	/// Renders the envelope as a JSON value.
	pub fn to_value(&self) -> Value {
		let mut outer = Map::new();

		outer.insert(self.kind().to_owned(), Value::Object(self.body().clone()));

		Value::Object(outer)
	}
}

/// Failure reported by an identity provider or detected while driving its handshake.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ThisError)]
#[error("Provider reported {code}: {}.", .message.trim_end_matches('.'))]
pub struct ProviderError {
	/// Machine-readable error code.
	pub code: String,
	/// Human-readable description.
	pub message: String,
	/// Raw provider payload, `null` when there is none.
	pub raw: Value,
}
impl ProviderError {
	/// Creates an error with no raw payload.
	pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { code: code.into(), message: message.into(), raw: Value::Null }
	}

	/// Attaches the provider's raw response.
	pub fn with_raw(mut self, raw: impl Into<Value>) -> Self {
		self.raw = raw.into();

		self
	}
}

/// Serializes `value` and rewrites every boolean to `1`/`0`.
pub fn normalize<T>(value: &T) -> Result<Value, ResponseError>
where
	T: ?Sized + Serialize,
{
	Ok(normalize_value(serde_json::to_value(value)?))
}

/// Rewrites every boolean in `value` to `1`/`0`, at any depth.
pub fn normalize_value(value: Value) -> Value {
	match value {
		Value::Bool(flag) => Value::from(u8::from(flag)),
		Value::Array(items) => Value::Array(items.into_iter().map(normalize_value).collect()),
		Value::Object(map) =>
			Value::Object(map.into_iter().map(|(k, v)| (k, normalize_value(v))).collect()),
		scalar => scalar,
	}
}

/// Normalizes `auth`, stamps `provider`, and wraps it as `{"auth": ...}`.
pub fn pack_success<T>(auth: &T, provider: &ProviderName) -> Result<Envelope, ResponseError>
where
	T: ?Sized + Serialize,
{
	stamp(auth, provider, "auth").map(Envelope::Auth)
}

/// Normalizes `error`, stamps `provider`, and wraps it as `{"error": ...}`.
pub fn pack_error<T>(error: &T, provider: &ProviderName) -> Result<Envelope, ResponseError>
where
	T: ?Sized + Serialize,
{
	stamp(error, provider, "error").map(Envelope::Error)
}

fn stamp<T>(
	payload: &T,
	provider: &ProviderName,
	kind: &'static str,
) -> Result<Map<String, Value>, ResponseError>
where
	T: ?Sized + Serialize,
{
	let Value::Object(mut body) = normalize(payload)? else {
		return Err(ResponseError::NotAnObject { kind });
	};

	body.insert("provider".into(), Value::String(provider.to_string()));

	Ok(body)
}
