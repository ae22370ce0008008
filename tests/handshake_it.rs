mod common;

// std
use std::collections::HashMap;
// crates.io
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
// self
use auth_strategy::{
	error::{ConfigError, Error, LifecycleError, MissingReason, SignatureError},
	response::{CallbackResponse, ResponseSigner},
	strategy::{CallbackParams, Handshake, Phase, Step},
};
use common::*;

fn begin(backend: &auth_strategy::session::MemorySessionBackend) -> Handshake {
	Handshake::new(
		&MockOAuth2::new(),
		test_request_context(),
		MockOAuth2::raw_config(),
		store_over(backend),
	)
	.expect("Mock handshake should build.")
}

fn redirect_state(step: Step) -> String {
	let Step::Redirect(url) = step else { panic!("Request leg should redirect.") };
	let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

	assert_eq!(url.path(), "/oauth/authorize");
	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("client_id"), Some(&"prod-client".into()));
	assert_eq!(
		pairs.get("redirect_uri"),
		Some(&"https://gateway.example.com/auth/mock/oauth2callback".into())
	);
	assert_eq!(pairs.get("scope"), Some(&"read:user".into()));
	assert!(!pairs.contains_key("client_secret"));

	pairs.get("state").cloned().expect("Redirect should carry a state parameter.")
}

#[test]
fn two_request_round_trip_produces_normalized_auth() {
	let strategy = MockOAuth2::new();
	let (_, backend) = test_session();
	let mut outbound = begin(&backend);
	let state = redirect_state(
		outbound.drive_request(&strategy).expect("Request leg should succeed."),
	);

	assert_eq!(outbound.phase(), Phase::InProgress);
	assert_eq!(backend.len(), 1);

	let mut inbound = begin(&backend);
	let params = CallbackParams::default().with("code", "abc").with("state", state);
	let response = inbound
		.drive_callback(&strategy, &params)
		.expect("Callback leg should succeed.")
		.into_response()
		.expect("Callback leg should terminate.");

	assert!(backend.is_empty(), "Callback must consume the session slot.");
	assert_eq!(inbound.phase(), Phase::Terminated);
	assert_eq!(response.signature, None, "No salt configured, nothing to sign.");
	assert_eq!(
		response.envelope.to_value(),
		json!({ "auth": {
			"uid": 1234,
			"info": {
				"name": "Mona Lisa",
				"nickname": "octocat",
				"email": "mona@example.com",
				"image": "https://img.example.com/mona.png",
			},
			"raw": { "site_admin": 0 },
			"credentials": { "token": "token-for-mock", "expires": 1 },
			"provider": "Mock",
		} })
	);
}

#[test]
fn replayed_callback_is_packed_as_error() {
	let strategy = MockOAuth2::new();
	let (_, backend) = test_session();
	let state = redirect_state(
		begin(&backend).drive_request(&strategy).expect("Request leg should succeed."),
	);
	let params = CallbackParams::default().with("code", "abc").with("state", state);

	begin(&backend).drive_callback(&strategy, &params).expect("First callback should succeed.");

	let replay = begin(&backend)
		.drive_callback(&strategy, &params)
		.expect("Replay should be packed, not raised.")
		.into_response()
		.expect("Replay should terminate.");

	assert_eq!(replay.envelope.kind(), "error");
	assert_eq!(replay.envelope.body().get("code"), Some(&json!("state_mismatch")));
	assert_eq!(replay.envelope.provider(), Some("Mock"));
}

#[test]
fn provider_denial_becomes_error_envelope() {
	let strategy = MockOAuth2::new();
	let (_, backend) = test_session();
	let state = redirect_state(
		begin(&backend).drive_request(&strategy).expect("Request leg should succeed."),
	);
	let params = CallbackParams::default()
		.with("state", state)
		.with("error", "access_denied")
		.with("error_description", "The user denied the request.");
	let mut handshake = begin(&backend);
	let response = handshake
		.drive_callback(&strategy, &params)
		.expect("Denial should be packed, not raised.")
		.into_response()
		.expect("Denial should terminate.");

	assert_eq!(
		response.envelope.to_value(),
		json!({ "error": {
			"code": "access_denied",
			"message": "The user denied the request.",
			"raw": null,
			"provider": "Mock",
		} })
	);
	assert!(matches!(
		handshake.success(),
		Err(Error::Lifecycle(LifecycleError::AlreadyTerminated))
	));
}

#[test]
fn salted_success_is_signed_and_verifiable() {
	let strategy = MockOAuth2::new();
	let (_, backend) = test_session();
	let mut raw = MockOAuth2::raw_config();

	raw.insert("security_salt".into(), json!("LDFmiilYf8Fyw5W10rx4W1"));
	raw.insert("security_iteration".into(), json!("12"));

	let build = |raw| {
		Handshake::new(&strategy, test_request_context(), raw, store_over(&backend))
			.expect("Salted handshake should build.")
	};
	let state = redirect_state(
		build(raw.clone()).drive_request(&strategy).expect("Request leg should succeed."),
	);
	let response = build(raw.clone())
		.drive_callback(
			&strategy,
			&CallbackParams::default().with("code", "c").with("state", state),
		)
		.expect("Callback leg should succeed.")
		.into_response()
		.expect("Callback leg should terminate.");
	let handshake = build(raw);
	let signer = ResponseSigner::from_config(handshake.config())
		.expect("Signer config should be valid.")
		.expect("Salt is configured.");
	let now = OffsetDateTime::now_utc();

	assert!(response.signature.is_some());
	assert_eq!(signer.verify(&response, now), Ok(()));
	assert_eq!(
		signer.verify(&response, response.timestamp + Duration::minutes(10)),
		Err(SignatureError::Expired { age_secs: 600 })
	);

	let decoded = CallbackResponse::from_base64(
		&response.to_base64().expect("Signed response should encode."),
	)
	.expect("Signed response should decode.");

	assert_eq!(signer.verify(&decoded, now), Ok(()));
}

#[test]
fn unusable_compulsory_config_prevents_construction() {
	let cases = [
		(json!({ "client_secret": "s" }), "client_id", MissingReason::Absent),
		(json!({ "client_id": "id", "client_secret": "" }), "client_secret", MissingReason::Empty),
		(
			json!({ "client_id": "YOUR CLIENT ID", "client_secret": "s" }),
			"client_id",
			MissingReason::Forbidden,
		),
	];

	for (raw, expected_key, expected_reason) in cases {
		let (session, _) = test_session();
		let err = Handshake::new(&MockOAuth2::new(), test_request_context(), object(raw), session)
			.expect_err("Construction should fail.");

		match err {
			Error::Config(ConfigError::Missing { key, reason }) => {
				assert_eq!(key, expected_key);
				assert_eq!(reason, expected_reason);
			},
			other => panic!("Unexpected error: {other:?}."),
		}
	}
}

#[test]
fn caller_overrides_win_over_defaults() {
	let (session, _) = test_session();
	let mut raw = MockOAuth2::raw_config();

	raw.insert("scope".into(), json!("repo {ENV}"));
	raw.insert("redirect_uri".into(), Value::String("https://other.example.com/cb".into()));

	let handshake = Handshake::new(&MockOAuth2::new(), test_request_context(), raw, session)
		.expect("Handshake should build.");

	assert_eq!(handshake.config().get_str("scope"), Some("repo prod"));
	assert_eq!(handshake.config().get_str("redirect_uri"), Some("https://other.example.com/cb"));
	assert_eq!(handshake.phase(), Phase::Constructed);
}
