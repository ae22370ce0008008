// crates.io
use serde::Serialize;
use serde_json::{Value, json};
// self
use auth_strategy::{
	id::ProviderName,
	response::{self, Envelope, ProviderError},
};

fn provider() -> ProviderName {
	ProviderName::new("test").expect("Provider fixture should be valid.")
}

fn contains_bool(value: &Value) -> bool {
	match value {
		Value::Bool(_) => true,
		Value::Array(items) => items.iter().any(contains_bool),
		Value::Object(map) => map.values().any(contains_bool),
		_ => false,
	}
}

#[test]
fn success_envelope_matches_documented_shape() {
	let envelope =
		response::pack_success(&json!({ "name": "a" }), &provider()).expect("Auth should pack.");

	assert_eq!(
		serde_json::to_value(&envelope).expect("Envelope should serialize."),
		json!({ "auth": { "name": "a", "provider": "test" } })
	);
}

#[test]
fn error_envelope_matches_documented_shape() {
	let envelope =
		response::pack_error(&json!({ "code": 403, "message": "denied", "raw": null }), &provider())
			.expect("Error should pack.");

	assert_eq!(
		serde_json::to_value(&envelope).expect("Envelope should serialize."),
		json!({ "error": { "code": 403, "message": "denied", "raw": null, "provider": "test" } })
	);

	let parsed: Envelope = serde_json::from_value(json!({ "error": { "provider": "test" } }))
		.expect("Wire envelope should deserialize.");

	assert!(!parsed.is_auth());
}

#[test]
fn provider_field_always_reflects_the_strategy() {
	let envelope = response::pack_success(&json!({ "provider": "spoofed", "uid": 1 }), &provider())
		.expect("Auth should pack.");

	assert_eq!(envelope.provider(), Some("test"));
}

#[test]
fn normalize_strips_booleans_from_deeply_nested_structs() {
	#[derive(Serialize)]
	struct Credentials {
		token: String,
		secret: Option<String>,
		flags: Vec<bool>,
	}
	#[derive(Serialize)]
	struct Auth {
		uid: u64,
		verified: bool,
		credentials: Credentials,
	}

	let auth = Auth {
		uid: 9,
		verified: true,
		credentials: Credentials { token: "t".into(), secret: None, flags: vec![true, false] },
	};
	let normalized = response::normalize(&auth).expect("Struct should normalize.");

	assert!(!contains_bool(&normalized));
	assert_eq!(
		normalized,
		json!({
			"uid": 9,
			"verified": 1,
			"credentials": { "token": "t", "secret": null, "flags": [1, 0] },
		})
	);
}

#[test]
fn normalize_is_identity_without_booleans() {
	let inputs = [
		json!({ "a": 1, "b": [1.5, "x", null], "c": { "d": { "e": -2 } } }),
		json!([]),
		json!("scalar"),
		json!(0),
	];

	for input in inputs {
		assert_eq!(response::normalize(&input).expect("Value should normalize."), input);
	}
}

#[test]
fn provider_error_round_trips_through_error_envelope() {
	let err = ProviderError::new("invalid_grant", "Code expired.")
		.with_raw(json!({ "status": 400, "retry": false }));
	let envelope = response::pack_error(&err, &provider()).expect("Provider error should pack.");
	let body = envelope.body();

	assert_eq!(body.get("code"), Some(&json!("invalid_grant")));
	assert_eq!(body.get("raw"), Some(&json!({ "status": 400, "retry": 0 })));
	assert_eq!(err.to_string(), "Provider reported invalid_grant: Code expired.");
}
