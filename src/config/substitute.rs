//! `{KEY}` placeholder substitution inside configuration strings.

// std
use std::sync::LazyLock;
// crates.io
use regex::{Captures, Regex};
// self
use crate::_prelude::*;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\{([A-Za-z0-9_-]+)\}").expect("Placeholder pattern should compile.")
});

/// Replaces every `{KEY}` in `input` with the dictionary's value for `KEY`.
///
/// Strings are inserted verbatim, numbers and booleans as their JSON text. Placeholders whose
/// key is unknown, or maps to `null`, an array, or an object, are left untouched. The output is
/// never rescanned.
pub fn substitute_str(input: &str, dict: &Map<String, Value>) -> String {
	PLACEHOLDER
		.replace_all(input, |caps: &Captures| match dict.get(&caps[1]) {
			Some(Value::String(s)) => s.clone(),
			Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string(),
			_ => caps[0].to_owned(),
		})
		.into_owned()
}

/// Substitutes placeholders in string values; every other value passes through unchanged.
pub fn substitute(value: &Value, dict: &Map<String, Value>) -> Value {
	match value {
		Value::String(s) => Value::String(substitute_str(s, dict)),
		other => other.clone(),
	}
}

/// Runs one substitution pass over every top-level value of `config`.
///
/// Lookups go against a snapshot taken before the pass, so a value produced by one
/// substitution is never visible to another.
pub fn substitute_all(config: Map<String, Value>) -> Map<String, Value> {
	let snapshot = config.clone();

	config.into_iter().map(|(key, value)| (key, substitute(&value, &snapshot))).collect()
}
