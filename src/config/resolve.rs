//! Compulsory/optional key resolution.

// self
use crate::{
	_prelude::*,
	config::{ConfigSchema, StrategyConfig, is_blank, substitute_all},
	error::{ConfigError, MissingReason},
};

/// Resolves `raw` against `schema` and applies one substitution pass.
///
/// Compulsory keys are checked against the caller's input before defaults are merged, so a
/// default never satisfies a compulsory key.
pub fn resolve(
	raw: Map<String, Value>,
	schema: &ConfigSchema,
) -> Result<StrategyConfig, ConfigError> {
	for key in &schema.expects {
		check_compulsory(&raw, key, schema.forbidden.as_ref())?;
	}

	let mut resolved = raw;

	for (key, default) in &schema.defaults {
		if !resolved.contains_key(key) {
			resolved.insert(key.clone(), default.clone());
		}
	}

	Ok(StrategyConfig::from_map(substitute_all(resolved)))
}

fn check_compulsory(
	raw: &Map<String, Value>,
	key: &str,
	forbidden: Option<&Value>,
) -> Result<(), ConfigError> {
	let reason = match raw.get(key) {
		None => MissingReason::Absent,
		Some(value) if is_blank(value) => MissingReason::Empty,
		Some(value) if forbidden.is_some_and(|f| f == value) => MissingReason::Forbidden,
		Some(_) => return Ok(()),
	};

	#[cfg(feature = "tracing")]
	tracing::warn!(key, reason = reason.as_str(), "compulsory config key rejected");

	Err(ConfigError::missing(key, reason))
}
