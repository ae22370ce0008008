//! Anti-forgery `state` carried through the provider redirect in the session slot.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{_prelude::*, response::ProviderError, strategy::Handshake};

const STATE_LEN: usize = 32;
const STATE_FIELD: &str = "state";

impl Handshake {
	/// Generates an anti-forgery `state`, stores it with `extra` in the session slot, and
	/// returns it for the outbound redirect.
	pub fn issue_state(&mut self, mut extra: Map<String, Value>) -> Result<String> {
		let state = random_string(STATE_LEN);

		extra.insert(STATE_FIELD.into(), Value::String(state.clone()));
		self.store_session(Value::Object(extra))?;

		Ok(state)
	}

	/// Consumes the session slot and checks it against the `state` returned by the provider.
	///
	/// Returns the data stored by [`Handshake::issue_state`], minus the state itself. The slot
	/// is cleared whether or not the check passes.
	pub fn verify_state(&mut self, returned: Option<&str>) -> Result<Map<String, Value>> {
		let Some(Value::Object(mut stored)) = self.retrieve_session()? else {
			return Err(state_error("No handshake state is stored for this session.").into());
		};
		let expected = stored.remove(STATE_FIELD);

		match (expected.as_ref().and_then(Value::as_str), returned) {
			(Some(expected), Some(returned)) if expected == returned => Ok(stored),
			_ => {
				#[cfg(feature = "tracing")]
				tracing::warn!(provider = %self.provider(), "handshake state mismatch");

				Err(state_error("Returned state does not match the stored state.").into())
			},
		}
	}
}

fn state_error(message: &str) -> ProviderError {
	ProviderError::new("state_mismatch", message)
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
