//! Validated names for providers and session slots.
//!
//! A provider name doubles as the default URL segment of its strategy, so it is restricted to
//! characters that survive a URL path unescaped. Session slot names share the session backend's
//! key space with the host application and additionally allow `.` and `:` for namespacing.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const PROVIDER_MAX_LEN: usize = 64;
const SESSION_KEY_MAX_LEN: usize = 128;

/// Error returned when a provider or slot name is rejected.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The name was empty.
	#[error("{kind} cannot be empty.")]
	Empty {
		/// Which name was rejected.
		kind: &'static str,
	},
	/// The name contains a character outside its allowed set.
	#[error("{kind} contains disallowed character {found:?}.")]
	InvalidCharacter {
		/// Which name was rejected.
		kind: &'static str,
		/// First offending character.
		found: char,
	},
	/// The name is longer than allowed.
	#[error("{kind} exceeds {max} characters.")]
	TooLong {
		/// Which name was rejected.
		kind: &'static str,
		/// Maximum permitted length.
		max: usize,
	},
}

/// Name a strategy reports in every terminal envelope.
///
/// ASCII letters, digits, `_`, and `-` only; case is preserved for envelopes and folded for
/// URLs.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProviderName(String);
impl ProviderName {
	/// Validates `value` as a provider name.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		validate("Provider name", &value, PROVIDER_MAX_LEN, |c| matches!(c, '_' | '-'))?;

		Ok(Self(value))
	}

	/// Lowercased form used as the default URL segment for the strategy.
	pub fn url_segment(&self) -> String {
		self.0.to_ascii_lowercase()
	}
}
impl Deref for ProviderName {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ProviderName {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for ProviderName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ProviderName({})", self.0)
	}
}
impl Display for ProviderName {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Name of the session slot that carries handshake state.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionKey(String);
impl SessionKey {
	/// Slot name used when the caller does not pick one.
	pub const DEFAULT: &'static str = "auth_strategy";

	/// Validates `value` as a slot name.
	pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
		let value = value.into();

		validate("Session key", &value, SESSION_KEY_MAX_LEN, |c| {
			matches!(c, '_' | '-' | '.' | ':')
		})?;

		Ok(Self(value))
	}
}
impl Default for SessionKey {
	fn default() -> Self {
		Self(Self::DEFAULT.to_owned())
	}
}
impl AsRef<str> for SessionKey {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Debug for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "SessionKey({})", self.0)
	}
}
impl Display for SessionKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate(
	kind: &'static str,
	value: &str,
	max: usize,
	extra: impl Fn(char) -> bool,
) -> Result<(), IdentifierError> {
	if value.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if let Some(found) = value.chars().find(|&c| !c.is_ascii_alphanumeric() && !extra(c)) {
		return Err(IdentifierError::InvalidCharacter { kind, found });
	}
	// Only ASCII is left, so bytes and characters coincide.
	if value.len() > max {
		return Err(IdentifierError::TooLong { kind, max });
	}

	Ok(())
}
