//! Walks a provider strategy through both legs of a handshake without leaving the process.
//!
//! 1. Implement [`Strategy`] for the provider: declare its compulsory keys and defaults, build
//!    the authorize redirect in `request`, and fill the auth payload in `callback`.
//! 2. Build a [`Handshake`] per HTTP request over a session backend both requests share.
//! 3. Follow the [`Step`]s: redirect the user, then deliver the signed [`CallbackResponse`].

// std
use std::sync::Arc;
// crates.io
use color_eyre::{Result, eyre::eyre};
use serde_json::{Map, Value, json};
use time::OffsetDateTime;
// self
use auth_strategy::{
	id::ProviderName,
	response::{CallbackResponse, ProviderError, ResponseSigner},
	session::{MemorySessionBackend, SessionBackend, SessionStore},
	strategy::{CallbackParams, Handshake, RequestContext, Step, Strategy},
	url::Url,
};

/// OAuth 2.0 provider whose user-info endpoint is stubbed with a fixed profile.
struct SampleProvider {
	name: ProviderName,
	profile: Value,
}
impl Strategy for SampleProvider {
	fn name(&self) -> &ProviderName {
		&self.name
	}

	fn expects(&self) -> &[&str] {
		&["client_id", "client_secret"]
	}

	fn defaults(&self) -> Map<String, Value> {
		Map::from_iter([
			("redirect_uri".to_owned(), json!("{callback_url}")),
			("scope".to_owned(), json!("openid profile email")),
			("authorize_url".to_owned(), json!("https://accounts.example.com/o/oauth2/auth")),
		])
	}

	fn forbidden(&self) -> Option<Value> {
		Some(json!("YOUR CLIENT ID"))
	}

	fn callback_segment(&self) -> &str {
		"oauth2callback"
	}

	fn request(&self, handshake: &mut Handshake) -> auth_strategy::error::Result<Step> {
		let mut params = Map::new();

		handshake.add_params(
			&[
				("client_id", "client_id"),
				("redirect_uri", "redirect_uri"),
				("scope", "scope"),
				("access_type", "access_type"),
			],
			&mut params,
		);

		let state = handshake.issue_state(Map::new())?;
		let endpoint = handshake.config().get_str("authorize_url").unwrap_or_default();
		let mut url = Url::parse(endpoint).map_err(|e| {
			ProviderError::new("invalid_endpoint", e.to_string()).with_raw(endpoint)
		})?;

		url.query_pairs_mut()
			.append_pair("response_type", "code")
			.extend_pairs(params.iter().filter_map(|(k, v)| v.as_str().map(|v| (k, v))))
			.append_pair("state", &state);

		Ok(Step::Redirect(url))
	}

	fn callback(
		&self,
		handshake: &mut Handshake,
		params: &CallbackParams,
	) -> auth_strategy::error::Result<Step> {
		handshake.verify_state(params.get("state"))?;

		let Some(code) = params.get("code") else {
			return Err(ProviderError::new("access_denied", "User declined the request.").into());
		};

		handshake.set_auth("uid", self.profile["sub"].clone())?;
		handshake.set_auth("credentials", json!({ "token": format!("token-for-{code}") }))?;

		for (from, to) in [
			("name", "info.name"),
			("email", "info.email"),
			("email_verified", "info.verified"),
			("picture", "info.image"),
		] {
			handshake.map_profile(&self.profile, from, to)?;
		}

		handshake.success().map(Step::Complete)
	}
}

fn main() -> Result<()> {
	color_eyre::install()?;

	let strategy = SampleProvider {
		name: ProviderName::new("Sample")?,
		profile: json!({
			"sub": "108204268033311374519",
			"name": "Ada Lovelace",
			"email": "ada@example.com",
			"email_verified": true,
		}),
	};
	let raw = Map::from_iter([
		("client_id".to_owned(), json!("{APP}-client")),
		("client_secret".to_owned(), json!("change-me")),
		("APP".to_owned(), json!("demo")),
		("security_salt".to_owned(), json!("pepper")),
	]);
	let request = RequestContext::parse("http://localhost:8080", "/auth")?;
	let browser: Arc<dyn SessionBackend> = Arc::new(MemorySessionBackend::default());
	let mut outbound = Handshake::new(
		&strategy,
		request.clone(),
		raw.clone(),
		SessionStore::new(browser.clone()),
	)?;
	let Step::Redirect(authorize) = outbound.drive_request(&strategy)? else {
		return Err(eyre!("Request leg should redirect."));
	};

	println!("redirect: {authorize}");

	let state = authorize
		.query_pairs()
		.find(|(k, _)| k == "state")
		.map(|(_, v)| v.into_owned())
		.ok_or_else(|| eyre!("Redirect carries no state."))?;
	let params = CallbackParams::default().with("code", "4/0Ab").with("state", state);
	let mut inbound = Handshake::new(&strategy, request, raw, SessionStore::new(browser))?;
	let response: CallbackResponse = inbound
		.drive_callback(&strategy, &params)?
		.into_response()
		.ok_or_else(|| eyre!("Callback leg should terminate."))?;

	println!("callback: {}", serde_json::to_string_pretty(&response)?);

	if let Some(signer) = ResponseSigner::from_config(inbound.config())? {
		signer.verify(&response, OffsetDateTime::now_utc())?;

		println!("signature verified");
	}

	Ok(())
}
