//! Crate-level error types shared across config resolution, sessions, and response packing.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Strategy configuration is incomplete or malformed.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Session backend failure.
	#[error(transparent)]
	Session(#[from] SessionError),
	/// Terminal payload could not be packed.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Callback signature could not be produced or verified.
	#[error(transparent)]
	Signature(#[from] SignatureError),
	/// Handshake was driven past its terminal state.
	#[error(transparent)]
	Lifecycle(#[from] LifecycleError),
	/// Request context is unusable for URL derivation.
	#[error(transparent)]
	Context(#[from] ContextError),
	/// Identifier validation failed.
	#[error(transparent)]
	Identifier(#[from] crate::id::IdentifierError),
	/// Identity provider reported a failure that has not been packed yet.
	#[error(transparent)]
	Provider(#[from] crate::response::ProviderError),
}

/// Why a compulsory configuration key was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingReason {
	/// Key is not present in the raw configuration.
	Absent,
	/// Key is present but holds `null`, `""`, `[]`, or `{}`.
	Empty,
	/// Key still holds the forbidden placeholder value.
	Forbidden,
}
impl MissingReason {
	/// Returns a stable label suitable for messages and log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			MissingReason::Absent => "absent",
			MissingReason::Empty => "empty",
			MissingReason::Forbidden => "still a placeholder",
		}
	}
}
impl Display for MissingReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Configuration failures raised while constructing a handshake.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A compulsory key is absent, empty, or still holds the forbidden value.
	#[error("Compulsory config key `{key}` is {reason}.")]
	Missing {
		/// Offending configuration key.
		key: String,
		/// Why the key was rejected.
		reason: MissingReason,
	},
	/// A key holds a value of an unexpected type.
	#[error("Config key `{key}` must be {expected}.")]
	InvalidType {
		/// Offending configuration key.
		key: String,
		/// Human-readable description of the expected type.
		expected: &'static str,
	},
	/// Typed extraction of the resolved configuration failed.
	#[error("Resolved config does not match the requested shape.")]
	Deserialize {
		/// Path-aware deserialization failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl ConfigError {
	/// Shorthand for [`ConfigError::Missing`].
	pub fn missing(key: impl Into<String>, reason: MissingReason) -> Self {
		Self::Missing { key: key.into(), reason }
	}
}

/// Failures surfaced by session backends.
#[derive(Debug, ThisError)]
pub enum SessionError {
	/// Backend could not be started.
	#[error("Session backend could not be started.")]
	Start {
		/// Backend-specific failure.
		#[source]
		source: BoxError,
	},
	/// Backend-level read or write failure.
	#[error("Session backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
	/// Slot contents could not be (de)serialized.
	#[error("Session serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
}
impl SessionError {
	/// Wraps a backend's start-up failure inside [`SessionError`].
	pub fn start(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Start { source: Box::new(src) }
	}
}

/// Failures raised while normalizing or packing terminal payloads.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Payload could not be serialized into a JSON tree.
	#[error("Payload could not be normalized.")]
	Normalize(#[from] serde_json::Error),
	/// Encoded callback response could not be decoded.
	#[error("Callback response could not be decoded: {message}.")]
	Decode {
		/// Human-readable error payload.
		message: String,
	},
	/// Normalized payload is not a mapping and cannot carry the provider field.
	#[error("Normalized {kind} payload must be a mapping.")]
	NotAnObject {
		/// Which envelope was being packed.
		kind: &'static str,
	},
}

/// Failures raised while signing or verifying callback responses.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum SignatureError {
	/// Iteration count must be positive.
	#[error("Signature iteration count must be positive.")]
	InvalidIteration,
	/// Response carries no signature.
	#[error("Callback response is not signed.")]
	Unsigned,
	/// Signature does not match the payload.
	#[error("Callback response signature does not match.")]
	Mismatch,
	/// Response is older than the configured timeout.
	#[error("Callback response expired {age_secs}s after issue.")]
	Expired {
		/// Age of the response in whole seconds.
		age_secs: i64,
	},
}

/// Lifecycle violations for a single handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
pub enum LifecycleError {
	/// A terminal envelope was already emitted.
	#[error("Handshake already terminated.")]
	AlreadyTerminated,
}

/// Request context problems detected while deriving URLs.
#[derive(Debug, ThisError)]
pub enum ContextError {
	/// Host URL cannot carry a path.
	#[error("Host `{host}` cannot be used as a base URL.")]
	CannotBeABase {
		/// Offending host URL.
		host: String,
	},
	/// Joined URL could not be parsed.
	#[error("Derived URL is invalid.")]
	InvalidUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
