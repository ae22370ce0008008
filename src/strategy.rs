//! Provider strategy contract and the per-request handshake runtime.
//!
//! A [`Strategy`] is a capability implemented by each identity-provider module: it declares its
//! configuration schema and drives the two legs of the handshake. The shared behavior lives in
//! [`Handshake`], which the strategy receives on every call instead of inheriting it.
//!
//! ```rust,ignore
//! let mut handshake = Handshake::new(&strategy, request, raw_config, session)?;
//!
//! match handshake.drive_request(&strategy)? {
//! 	Step::Redirect(url) => redirect_to(url),
//! 	Step::Complete(response) => deliver(response),
//! }
//! ```

pub mod context;
pub mod handshake;

mod state;

pub use context::*;
pub use handshake::*;

// self
use crate::{_prelude::*, id::ProviderName, response::CallbackResponse};

/// Capability every identity-provider integration implements.
///
/// Only `name`, `request`, and `callback` are required. The schema hooks are consulted once,
/// while the [`Handshake`] is being constructed.
pub trait Strategy: Send + Sync {
	/// Name stamped into every terminal envelope.
	fn name(&self) -> &ProviderName;

	/// Compulsory configuration keys.
	fn expects(&self) -> &[&str] {
		&[]
	}

	/// Optional configuration keys and their defaults.
	///
	/// Defaults may reference other keys with `{KEY}`, including the derived `strategy_url` and
	/// `callback_url`.
	fn defaults(&self) -> Map<String, Value> {
		Map::new()
	}

	/// Placeholder value a compulsory key must not keep.
	fn forbidden(&self) -> Option<Value> {
		None
	}

	/// Path segment appended to the strategy URL for the provider's redirect back.
	fn callback_segment(&self) -> &str {
		"callback"
	}

	/// Outbound leg: usually stores state in the session and redirects to the provider.
	fn request(&self, handshake: &mut Handshake) -> Result<Step>;

	/// Return leg: validates the provider's answer and ends with a terminal envelope.
	fn callback(&self, handshake: &mut Handshake, params: &CallbackParams) -> Result<Step>;
}

/// What the dispatcher should do after a strategy call.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
	/// Send the user agent to this URL.
	Redirect(Url),
	/// The handshake terminated; deliver this response.
	Complete(CallbackResponse),
}
impl Step {
	/// Terminal response, if the handshake completed.
	pub fn into_response(self) -> Option<CallbackResponse> {
		match self {
			Step::Complete(response) => Some(response),
			Step::Redirect(_) => None,
		}
	}
}

/// Query or form parameters the provider sent back on the callback leg.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams(BTreeMap<String, String>);
impl CallbackParams {
	/// Collects the query pairs of `url`; later duplicates win.
	pub fn from_url(url: &Url) -> Self {
		url.query_pairs().into_owned().collect()
	}

	/// Returns the value for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Adds a parameter.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}
}
impl<K, V> FromIterator<(K, V)> for CallbackParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}
}
