//! Strategy base contract for multi-provider auth gateways.
//!
//! Every provider integration resolves its config the same way, carries handshake state across
//! the redirect in one session slot, and ends in a uniform (optionally signed) callback envelope.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod config;
pub mod error;
pub mod id;
pub mod obs;
pub mod profile;
pub mod response;
pub mod session;
pub mod strategy;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use serde_json;
pub use url;
#[cfg(test)] use color_eyre as _;
