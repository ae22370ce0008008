//! Shared fixtures for integration tests: a request context, an in-memory browser session, and
//! a mock OAuth 2.0 strategy that never leaves the process.

#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use serde_json::{Map, Value, json};
// self
use auth_strategy::{
	error::Result,
	id::ProviderName,
	response::ProviderError,
	session::{MemorySessionBackend, SessionBackend, SessionStore},
	strategy::{CallbackParams, Handshake, RequestContext, Step, Strategy},
	url::Url,
};

/// Gateway host used by test request contexts.
pub const TEST_HOST: &str = "https://gateway.example.com";
/// Mount path used by test request contexts.
pub const TEST_PATH: &str = "/auth/";

pub fn test_request_context() -> RequestContext {
	RequestContext::parse(TEST_HOST, TEST_PATH).expect("Failed to build request context for tests.")
}

/// Builds a session store over a fresh in-memory backend and hands back the backend so a second
/// request can reuse the same browser session.
pub fn test_session() -> (SessionStore, MemorySessionBackend) {
	let backend = MemorySessionBackend::default();

	(store_over(&backend), backend)
}

pub fn store_over(backend: &MemorySessionBackend) -> SessionStore {
	let shared: Arc<dyn SessionBackend> = Arc::new(backend.clone());

	SessionStore::new(shared)
}

pub fn object(value: Value) -> Map<String, Value> {
	match value {
		Value::Object(map) => map,
		other => panic!("Expected a JSON object fixture, got {other}."),
	}
}

/// OAuth 2.0-shaped strategy whose "provider" is an in-memory profile.
pub struct MockOAuth2 {
	pub name: ProviderName,
	pub authorize_endpoint: Url,
	pub profile: Value,
}
impl MockOAuth2 {
	pub fn new() -> Self {
		Self {
			name: ProviderName::new("Mock").expect("Mock provider name should be valid."),
			authorize_endpoint: Url::parse("https://provider.example.com/oauth/authorize")
				.expect("Mock authorize endpoint should parse."),
			profile: json!({
				"id": 1234,
				"login": "octocat",
				"name": "Mona Lisa",
				"email": "mona@example.com",
				"site_admin": false,
				"avatar": { "url": "https://img.example.com/mona.png" },
			}),
		}
	}

	pub fn raw_config() -> Map<String, Value> {
		object(json!({ "client_id": "{ENV}-client", "client_secret": "s3cr3t", "ENV": "prod" }))
	}
}
impl Strategy for MockOAuth2 {
	fn name(&self) -> &ProviderName {
		&self.name
	}

	fn expects(&self) -> &[&str] {
		&["client_id", "client_secret"]
	}

	fn defaults(&self) -> Map<String, Value> {
		object(json!({ "redirect_uri": "{callback_url}", "scope": "read:user" }))
	}

	fn forbidden(&self) -> Option<Value> {
		Some(json!("YOUR CLIENT ID"))
	}

	fn callback_segment(&self) -> &str {
		"oauth2callback"
	}

	fn request(&self, handshake: &mut Handshake) -> Result<Step> {
		let mut params = Map::new();

		handshake.add_params(
			&[("client_id", "client_id"), ("redirect_uri", "redirect_uri"), ("scope", "scope")],
			&mut params,
		);

		let state = handshake.issue_state(Map::new())?;
		let mut url = self.authorize_endpoint.clone();

		{
			let mut pairs = url.query_pairs_mut();

			pairs.append_pair("response_type", "code");

			for (key, value) in &params {
				pairs.append_pair(key, value.as_str().unwrap_or_default());
			}

			pairs.append_pair("state", &state);
		}

		Ok(Step::Redirect(url))
	}

	fn callback(&self, handshake: &mut Handshake, params: &CallbackParams) -> Result<Step> {
		handshake.verify_state(params.get("state"))?;

		if let Some(code) = params.get("error") {
			let message = params.get("error_description").unwrap_or("Provider denied access.");
			let raw = serde_json::to_value(params.get("error_uri")).unwrap_or(Value::Null);

			return Err(ProviderError::new(code, message).with_raw(raw).into());
		}
		if params.get("code").is_none() {
			return Err(ProviderError::new("missing_code", "Callback carried no code.").into());
		}

		handshake.set_auth("uid", self.profile["id"].clone())?;
		handshake.map_profile(&self.profile, "name", "info.name")?;
		handshake.map_profile(&self.profile, "login", "info.nickname")?;
		handshake.map_profile(&self.profile, "email", "info.email")?;
		handshake.map_profile(&self.profile, "avatar.url", "info.image")?;
		handshake.map_profile(&self.profile, "location", "info.location")?;
		handshake.map_profile(&self.profile, "site_admin", "raw.site_admin")?;
		handshake.set_auth("credentials", json!({ "token": "token-for-mock", "expires": true }))?;

		handshake.success().map(Step::Complete)
	}
}
