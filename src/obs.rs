//! Optional observability helpers for strategy handshakes.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `auth_strategy.handshake`
//!   with the `provider` and `stage` fields, plus warn/debug events for rejected config, state
//!   mismatches, and session slot traffic.
//! - Enable `metrics` to increment the `auth_strategy_handshake_total` counter for every
//!   attempt/success/failure, labeled by `provider` + `outcome`, and the
//!   `auth_strategy_construct_rejected_total` counter labeled by `provider` + `cause` whenever a
//!   handshake cannot be built.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{
	_prelude::*,
	error::{ConfigError, MissingReason},
};

/// Points in a handshake that get their own span.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Config resolution while building the handshake.
	Construct,
	/// Outbound leg that sends the user to the provider.
	Request,
	/// Return leg handling the provider's redirect.
	Callback,
	/// Packing a success envelope.
	Success,
	/// Packing an error envelope.
	Error,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Construct => "construct",
			Stage::Request => "request",
			Stage::Callback => "callback",
			Stage::Success => "success",
			Stage::Error => "error",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded per handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// A handshake was constructed.
	Attempt,
	/// A success envelope was emitted.
	Success,
	/// An error envelope was emitted or construction failed.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Low-cardinality label for why a handshake could not be constructed.
pub fn construct_failure_cause(error: &Error) -> &'static str {
	match error {
		Error::Config(ConfigError::Missing { reason, .. }) => match reason {
			MissingReason::Absent => "config_absent",
			MissingReason::Empty => "config_empty",
			MissingReason::Forbidden => "config_placeholder",
		},
		Error::Config(_) => "config_invalid",
		Error::Context(_) => "request_context",
		_ => "other",
	}
}

/// Config key named by a construction failure, when there is one.
pub fn construct_failure_key(error: &Error) -> Option<&str> {
	match error {
		Error::Config(ConfigError::Missing { key, .. } | ConfigError::InvalidType { key, .. }) =>
			Some(key.as_str()),
		_ => None,
	}
}
