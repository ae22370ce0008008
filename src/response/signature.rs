//! Timestamped, salted signatures over success envelopes.
//!
//! The signature lets the dispatcher's consumer check that an `auth` payload was produced by a
//! strategy sharing its `security_salt`, and that it is fresh. Error envelopes are never signed.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	config::StrategyConfig,
	error::{ConfigError, ResponseError, SignatureError},
	response::Envelope,
};

/// Terminal output handed to the dispatcher.
///
/// On the wire the envelope is flattened:
/// `{"auth": ..., "timestamp": ..., "signature": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallbackResponse {
	/// Success or failure payload.
	#[serde(flatten)]
	pub envelope: Envelope,
	/// Issue time, RFC 3339 on the wire.
	#[serde(with = "time::serde::rfc3339")]
	pub timestamp: OffsetDateTime,
	/// Present on success envelopes when a salt is configured.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub signature: Option<String>,
}
impl CallbackResponse {
	/// Wraps an envelope without signing it.
	pub fn unsigned(envelope: Envelope, timestamp: OffsetDateTime) -> Self {
		Self { envelope, timestamp, signature: None }
	}

	/// URL-safe encoding used by query-string transports.
	pub fn to_base64(&self) -> Result<String, ResponseError> {
		Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?))
	}

	/// Decodes a value produced by [`CallbackResponse::to_base64`].
	pub fn from_base64(encoded: &str) -> Result<Self, ResponseError> {
		let bytes = URL_SAFE_NO_PAD
			.decode(encoded)
			.map_err(|e| ResponseError::Decode { message: e.to_string() })?;

		Ok(serde_json::from_slice(&bytes)?)
	}
}

/// Signs and verifies success envelopes with a shared salt.
#[derive(Clone)]
pub struct ResponseSigner {
	salt: String,
	iterations: u32,
	timeout: Duration,
}
impl ResponseSigner {
	/// Config key holding the shared salt.
	pub const SALT_KEY: &'static str = "security_salt";
	/// Config key holding the hash round count.
	pub const ITERATION_KEY: &'static str = "security_iteration";
	/// Config key holding the validity window in seconds.
	pub const TIMEOUT_KEY: &'static str = "security_timeout";
	/// Round count used when the config does not set one.
	pub const DEFAULT_ITERATIONS: u32 = 300;
	/// Validity window used when the config does not set one.
	pub const DEFAULT_TIMEOUT: Duration = Duration::seconds(120);

	/// Creates a signer.
	pub fn new(
		salt: impl Into<String>,
		iterations: u32,
		timeout: Duration,
	) -> Result<Self, SignatureError> {
		if iterations == 0 {
			return Err(SignatureError::InvalidIteration);
		}

		Ok(Self { salt: salt.into(), iterations, timeout })
	}

	/// Builds a signer from the `security_*` keys; `None` when no salt is configured.
	pub fn from_config(config: &StrategyConfig) -> Result<Option<Self>> {
		let Some(salt) = config.get_str(Self::SALT_KEY).filter(|s| !s.is_empty()) else {
			return Ok(None);
		};
		let iterations = match config.get_u64(Self::ITERATION_KEY)? {
			Some(n) => u32::try_from(n).map_err(|_| ConfigError::InvalidType {
				key: Self::ITERATION_KEY.into(),
				expected: "a 32-bit round count",
			})?,
			None => Self::DEFAULT_ITERATIONS,
		};
		let timeout = match config.get_u64(Self::TIMEOUT_KEY)? {
			Some(secs) => Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)),
			None => Self::DEFAULT_TIMEOUT,
		};

		Ok(Some(Self::new(salt, iterations, timeout)?))
	}

	/// Wraps `envelope`, signing it when it is a success envelope.
	pub fn seal(&self, envelope: Envelope, timestamp: OffsetDateTime) -> CallbackResponse {
		let signature = match &envelope {
			Envelope::Auth(body) => Some(self.signature(body, timestamp)),
			Envelope::Error(_) => None,
		};

		CallbackResponse { envelope, timestamp, signature }
	}

	/// Checks the signature and freshness of `response` as of `now`.
	pub fn verify(
		&self,
		response: &CallbackResponse,
		now: OffsetDateTime,
	) -> Result<(), SignatureError> {
		let Some(signature) = response.signature.as_deref() else {
			return Err(SignatureError::Unsigned);
		};
		let Envelope::Auth(body) = &response.envelope else {
			return Err(SignatureError::Unsigned);
		};

		if self.signature(body, response.timestamp) != signature {
			return Err(SignatureError::Mismatch);
		}

		let age = now - response.timestamp;

		if age > self.timeout {
			return Err(SignatureError::Expired { age_secs: age.whole_seconds() });
		}

		Ok(())
	}

	fn signature(&self, body: &Map<String, Value>, timestamp: OffsetDateTime) -> String {
		let canonical = Value::Object(body.clone()).to_string();
		let stamp = timestamp.unix_timestamp().to_string();
		let mut digest = URL_SAFE_NO_PAD.encode(Sha256::digest(canonical.as_bytes()));

		for _ in 0..self.iterations {
			let mut hasher = Sha256::new();

			hasher.update(digest.as_bytes());
			hasher.update(self.salt.as_bytes());
			hasher.update(stamp.as_bytes());
			digest = URL_SAFE_NO_PAD.encode(hasher.finalize());
		}

		digest
	}
}
impl Debug for ResponseSigner {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ResponseSigner")
			.field("salt", &"<redacted>")
			.field("iterations", &self.iterations)
			.field("timeout", &self.timeout)
			.finish()
	}
}
