//! Request context used to derive strategy and callback URLs.

// self
use crate::{_prelude::*, error::ContextError};

/// Host and mount path of the gateway for the current request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestContext {
	host: Url,
	path: String,
}
impl RequestContext {
	/// Creates a context; `path` is normalized to start and end with `/`.
	pub fn new(host: Url, path: impl AsRef<str>) -> Result<Self, ContextError> {
		if host.cannot_be_a_base() {
			return Err(ContextError::CannotBeABase { host: host.to_string() });
		}

		let trimmed = path.as_ref().trim_matches('/');
		let path = if trimmed.is_empty() { "/".to_owned() } else { format!("/{trimmed}/") };

		Ok(Self { host, path })
	}

	/// Parses `host` and builds a context.
	pub fn parse(host: &str, path: impl AsRef<str>) -> Result<Self, ContextError> {
		let host = Url::parse(host).map_err(|source| ContextError::InvalidUrl { source })?;

		Self::new(host, path)
	}

	/// Scheme + authority of the gateway.
	pub fn host(&self) -> &Url {
		&self.host
	}

	/// Mount path, always `/`-delimited.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Provider base URL: `<host><path><url_name>`.
	pub fn strategy_url(&self, url_name: &str) -> Result<Url, ContextError> {
		self.join(&format!("{}{url_name}", self.path))
	}

	/// Callback URL: `<provider base URL>/<segment>`.
	pub fn callback_url(&self, url_name: &str, segment: &str) -> Result<Url, ContextError> {
		self.join(&format!("{}{url_name}/{segment}", self.path))
	}

	fn join(&self, absolute_path: &str) -> Result<Url, ContextError> {
		self.host.join(absolute_path).map_err(|source| ContextError::InvalidUrl { source })
	}
}
