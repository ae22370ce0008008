//! Per-request runtime shared by every strategy.

// self
use crate::{
	_prelude::*,
	config::{self, ConfigSchema, StrategyConfig},
	error::{ContextError, LifecycleError},
	id::ProviderName,
	obs::{self, Outcome, Stage, StageSpan},
	profile::{self, ProfileMapping},
	response::{self, CallbackResponse, Envelope, ProviderError, ResponseSigner},
	session::SessionStore,
	strategy::{CallbackParams, RequestContext, Step, Strategy},
};

/// Lifecycle of a single handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// Configuration resolved; nothing else happened yet.
	Constructed,
	/// Provider interaction under way.
	InProgress,
	/// A terminal envelope was emitted.
	Terminated,
}

/// One strategy handshake, scoped to a single HTTP request.
///
/// Owns the resolved configuration and the auth payload being built. The only state that
/// outlives the request is the session slot.
pub struct Handshake {
	provider: ProviderName,
	request: RequestContext,
	config: StrategyConfig,
	session: SessionStore,
	signer: Option<ResponseSigner>,
	auth: Map<String, Value>,
	phase: Phase,
}
impl Handshake {
	/// Config key overriding the URL segment the strategy is mounted under.
	pub const URL_NAME_KEY: &'static str = "strategy_url_name";
	/// Derived config key holding the provider base URL.
	pub const STRATEGY_URL_KEY: &'static str = "strategy_url";
	/// Derived config key holding the callback URL.
	pub const CALLBACK_URL_KEY: &'static str = "callback_url";

	/// Resolves `raw` against the strategy's schema and prepares a handshake.
	///
	/// Fails with [`crate::error::ConfigError::Missing`] when a compulsory key is unusable; no
	/// handshake exists in that case.
	pub fn new<S>(
		strategy: &S,
		request: RequestContext,
		raw: Map<String, Value>,
		session: SessionStore,
	) -> Result<Self>
	where
		S: ?Sized + Strategy,
	{
		let provider = strategy.name().clone();
		let span = StageSpan::new(&provider, Stage::Construct);
		let _guard = span.clone().entered();

		obs::record_outcome(&provider, Outcome::Attempt);

		let resolved = Self::resolve_config(strategy, &request, raw)
			.and_then(|config| Ok((ResponseSigner::from_config(&config)?, config)));
		let (signer, config) = match resolved {
			Ok(parts) => parts,
			Err(e) => {
				let cause = obs::construct_failure_cause(&e);

				span.record_failure(cause, obs::construct_failure_key(&e));
				obs::record_outcome(&provider, Outcome::Failure);
				obs::record_construct_rejection(&provider, cause);

				return Err(e);
			},
		};

		Ok(Self {
			provider,
			request,
			config,
			session,
			signer,
			auth: Map::new(),
			phase: Phase::Constructed,
		})
	}

	fn resolve_config<S>(
		strategy: &S,
		request: &RequestContext,
		mut raw: Map<String, Value>,
	) -> Result<StrategyConfig>
	where
		S: ?Sized + Strategy,
	{
		// The URL name is substituted up front so the derived URLs see its final value.
		let url_name = raw
			.get(Self::URL_NAME_KEY)
			.and_then(Value::as_str)
			.map(|name| config::substitute_str(name, &raw))
			.filter(|name| !name.is_empty())
			.unwrap_or_else(|| strategy.name().url_segment());
		let strategy_url = request.strategy_url(&url_name)?;
		let callback_url = request.callback_url(&url_name, strategy.callback_segment())?;

		raw.insert(Self::URL_NAME_KEY.into(), Value::String(url_name));
		raw.entry(Self::STRATEGY_URL_KEY).or_insert_with(|| Value::String(strategy_url.into()));
		raw.entry(Self::CALLBACK_URL_KEY).or_insert_with(|| Value::String(callback_url.into()));

		let mut schema = ConfigSchema::new()
			.expects(strategy.expects().iter().copied())
			.default_value(ResponseSigner::ITERATION_KEY, ResponseSigner::DEFAULT_ITERATIONS)
			.default_value(
				ResponseSigner::TIMEOUT_KEY,
				ResponseSigner::DEFAULT_TIMEOUT.whole_seconds(),
			)
			.defaults(strategy.defaults());

		if let Some(forbidden) = strategy.forbidden() {
			schema = schema.forbid(forbidden);
		}

		Ok(config::resolve(raw, &schema)?)
	}

	/// Provider name stamped into terminal envelopes.
	pub fn provider(&self) -> &ProviderName {
		&self.provider
	}

	/// Resolved configuration.
	pub fn config(&self) -> &StrategyConfig {
		&self.config
	}

	/// Request this handshake belongs to.
	pub fn request(&self) -> &RequestContext {
		&self.request
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Auth payload built so far.
	pub fn auth(&self) -> &Map<String, Value> {
		&self.auth
	}

	/// Provider base URL, as resolved under [`Self::STRATEGY_URL_KEY`].
	pub fn strategy_url(&self) -> Result<Url> {
		self.resolved_url(Self::STRATEGY_URL_KEY)
	}

	/// URL the provider should redirect back to, as resolved under [`Self::CALLBACK_URL_KEY`].
	///
	/// A caller-supplied `callback_url` wins over the derived one, here and in `{callback_url}`
	/// placeholders alike.
	pub fn callback_url(&self) -> Result<Url> {
		self.resolved_url(Self::CALLBACK_URL_KEY)
	}

	fn resolved_url(&self, key: &str) -> Result<Url> {
		let raw = self.config.get_str(key).unwrap_or_default();

		Ok(Url::parse(raw).map_err(|source| ContextError::InvalidUrl { source })?)
	}

	/// Copies configured values into outbound `params` under the paired parameter name.
	///
	/// Keys that are unset or empty are skipped.
	pub fn add_params(&self, pairs: &[(&str, &str)], params: &mut Map<String, Value>) {
		for (config_key, param) in pairs {
			if !self.config.is_set(config_key) {
				continue;
			}
			if let Some(value) = self.config.get(config_key) {
				params.insert((*param).to_owned(), value.clone());
			}
		}
	}

	/// Mutable access to the auth payload.
	pub fn auth_mut(&mut self) -> Result<&mut Map<String, Value>, LifecycleError> {
		self.begin()?;

		Ok(&mut self.auth)
	}

	/// Sets one top-level auth field.
	pub fn set_auth(
		&mut self,
		key: impl Into<String>,
		value: impl Into<Value>,
	) -> Result<(), LifecycleError> {
		self.auth_mut()?.insert(key.into(), value.into());

		Ok(())
	}

	/// Copies `profile_path` from `profile` into the auth payload at `auth_path`.
	pub fn map_profile(
		&mut self,
		profile: &Value,
		profile_path: &str,
		auth_path: &str,
	) -> Result<ProfileMapping, LifecycleError> {
		let auth = self.auth_mut()?;
		let outcome = profile::map_profile(profile, profile_path, auth, auth_path);

		#[cfg(feature = "tracing")]
		if !outcome.is_mapped() {
			tracing::debug!(profile_path, auth_path, ?outcome, "profile field not mapped");
		}

		Ok(outcome)
	}

	/// Session slot shared with the other leg of the handshake.
	pub fn session(&self) -> &SessionStore {
		&self.session
	}

	/// Writes handshake state into the session slot.
	pub fn store_session(&mut self, data: Value) -> Result<Value> {
		self.begin()?;

		Ok(self.session.store(data)?)
	}

	/// Consumes handshake state from the session slot.
	pub fn retrieve_session(&mut self) -> Result<Option<Value>> {
		self.begin()?;

		Ok(self.session.retrieve()?)
	}

	/// Packs the auth payload into a success response and terminates the handshake.
	pub fn success(&mut self) -> Result<CallbackResponse> {
		self.ensure_open()?;

		let _guard = StageSpan::new(&self.provider, Stage::Success).entered();
		let envelope = response::pack_success(&self.auth, &self.provider)?;

		obs::record_outcome(&self.provider, Outcome::Success);

		Ok(self.terminate(envelope))
	}

	/// Packs `error` into an error response and terminates the handshake.
	pub fn error(&mut self, error: ProviderError) -> Result<CallbackResponse> {
		self.ensure_open()?;

		let _guard = StageSpan::new(&self.provider, Stage::Error).entered();

		#[cfg(feature = "tracing")]
		tracing::warn!(code = %error.code, message = %error.message, "handshake failed");

		let envelope = response::pack_error(&error, &self.provider)?;

		obs::record_outcome(&self.provider, Outcome::Failure);

		Ok(self.terminate(envelope))
	}

	/// Runs the strategy's outbound leg.
	///
	/// A [`ProviderError`] propagated by the strategy is packed into an error response.
	pub fn drive_request<S>(&mut self, strategy: &S) -> Result<Step>
	where
		S: ?Sized + Strategy,
	{
		let span = StageSpan::new(&self.provider, Stage::Request);
		let outcome = span.in_scope(|| strategy.request(self));

		self.settle(outcome)
	}

	/// Runs the strategy's return leg with the provider's callback parameters.
	///
	/// A [`ProviderError`] propagated by the strategy is packed into an error response.
	pub fn drive_callback<S>(&mut self, strategy: &S, params: &CallbackParams) -> Result<Step>
	where
		S: ?Sized + Strategy,
	{
		let span = StageSpan::new(&self.provider, Stage::Callback);
		let outcome = span.in_scope(|| strategy.callback(self, params));

		self.settle(outcome)
	}

	fn settle(&mut self, outcome: Result<Step>) -> Result<Step> {
		match outcome {
			Err(Error::Provider(error)) if self.phase != Phase::Terminated =>
				self.error(error).map(Step::Complete),
			other => other,
		}
	}

	fn terminate(&mut self, envelope: Envelope) -> CallbackResponse {
		let now = OffsetDateTime::now_utc();

		self.phase = Phase::Terminated;

		match &self.signer {
			Some(signer) => signer.seal(envelope, now),
			None => CallbackResponse::unsigned(envelope, now),
		}
	}

	fn begin(&mut self) -> Result<(), LifecycleError> {
		self.ensure_open()?;
		self.phase = Phase::InProgress;

		Ok(())
	}

	fn ensure_open(&self) -> Result<(), LifecycleError> {
		match self.phase {
			Phase::Terminated => Err(LifecycleError::AlreadyTerminated),
			Phase::Constructed | Phase::InProgress => Ok(()),
		}
	}
}
impl Debug for Handshake {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Handshake")
			.field("provider", &self.provider)
			.field("request", &self.request)
			.field("phase", &self.phase)
			.field("session", &self.session)
			.field("signed", &self.signer.is_some())
			.finish()
	}
}
