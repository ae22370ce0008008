//! Session slot contracts and built-in backends.
//!
//! A handshake spans two HTTP requests: the one that redirects the user to the identity
//! provider and the provider's callback. [`SessionStore`] carries state across that gap in a
//! single named slot. Writes overwrite (last write wins) and reads consume, so stale
//! handshake state can never be replayed.

pub mod file;
pub mod memory;

pub use file::FileSessionBackend;
pub use memory::MemorySessionBackend;

// self
use crate::{_prelude::*, error::SessionError, id::SessionKey};

/// Session mechanism injected by the host for the duration of one request.
pub trait SessionBackend
where
	Self: Send + Sync,
{
	/// Whether the backend has been started for this request.
	fn is_active(&self) -> bool;

	/// Starts the backend; called lazily before the first slot access.
	fn start(&self) -> Result<(), SessionError>;

	/// Reads the slot without clearing it.
	fn get(&self, key: &SessionKey) -> Result<Option<Value>, SessionError>;

	/// Writes the slot, replacing any prior value.
	fn set(&self, key: &SessionKey, value: Value) -> Result<(), SessionError>;

	/// Atomically reads and clears the slot.
	fn take(&self, key: &SessionKey) -> Result<Option<Value>, SessionError>;
}

/// One-shot get/set facade over a single named slot.
#[derive(Clone)]
pub struct SessionStore {
	backend: Arc<dyn SessionBackend>,
	key: SessionKey,
}
impl SessionStore {
	/// Creates a store over the default slot.
	pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
		Self::with_key(backend, SessionKey::default())
	}

	/// Creates a store over a caller-chosen slot.
	pub fn with_key(backend: Arc<dyn SessionBackend>, key: SessionKey) -> Self {
		Self { backend, key }
	}

	/// Slot this store reads and writes.
	pub fn key(&self) -> &SessionKey {
		&self.key
	}

	/// Persists `data` into the slot, overwriting any prior value, and returns it.
	pub fn store(&self, data: Value) -> Result<Value, SessionError> {
		self.ensure_active()?;
		self.backend.set(&self.key, data.clone())?;

		#[cfg(feature = "tracing")]
		tracing::debug!(slot = %self.key, "session slot written");

		Ok(data)
	}

	/// Returns the slot's value and clears it; `None` when nothing was stored.
	pub fn retrieve(&self) -> Result<Option<Value>, SessionError> {
		self.ensure_active()?;

		let value = self.backend.take(&self.key)?;

		#[cfg(feature = "tracing")]
		tracing::debug!(slot = %self.key, present = value.is_some(), "session slot consumed");

		Ok(value)
	}

	/// Reads the slot without consuming it.
	pub fn peek(&self) -> Result<Option<Value>, SessionError> {
		self.ensure_active()?;
		self.backend.get(&self.key)
	}

	fn ensure_active(&self) -> Result<(), SessionError> {
		if self.backend.is_active() {
			return Ok(());
		}

		self.backend.start()
	}
}
impl Debug for SessionStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionStore")
			.field("key", &self.key)
			.field("active", &self.backend.is_active())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn store() -> (SessionStore, MemorySessionBackend) {
		let backend = MemorySessionBackend::default();

		(SessionStore::new(Arc::new(backend.clone())), backend)
	}

	#[test]
	fn retrieve_consumes_the_slot() {
		let (store, _) = store();
		let data = json!({ "state": "abc", "nested": { "n": 1 } });
		let echoed = store.store(data.clone()).expect("Store should succeed.");

		assert_eq!(echoed, data);
		assert_eq!(store.retrieve().expect("First read should succeed."), Some(data));
		assert_eq!(store.retrieve().expect("Second read should succeed."), None);
	}

	#[test]
	fn store_overwrites_prior_value() {
		let (store, _) = store();

		store.store(json!("first")).expect("First write should succeed.");
		store.store(json!("second")).expect("Second write should succeed.");

		assert_eq!(store.retrieve().expect("Read should succeed."), Some(json!("second")));
	}

	#[test]
	fn backend_starts_lazily() {
		let (store, backend) = store();

		assert!(!backend.is_active());
		assert_eq!(store.retrieve().expect("Empty read should succeed."), None);
		assert!(backend.is_active());
	}

	#[test]
	fn peek_does_not_consume() {
		let (store, _) = store();

		store.store(json!(1)).expect("Write should succeed.");

		assert_eq!(store.peek().expect("Peek should succeed."), Some(json!(1)));
		assert_eq!(store.retrieve().expect("Read should succeed."), Some(json!(1)));
	}

	#[test]
	fn slots_are_isolated_by_key() {
		let backend: Arc<dyn SessionBackend> = Arc::new(MemorySessionBackend::default());
		let a = SessionStore::with_key(
			backend.clone(),
			SessionKey::new("a").expect("Slot fixture should be valid."),
		);
		let b = SessionStore::with_key(
			backend,
			SessionKey::new("b").expect("Slot fixture should be valid."),
		);

		a.store(json!("for-a")).expect("Write should succeed.");

		assert_eq!(b.retrieve().expect("Read should succeed."), None);
		assert_eq!(a.retrieve().expect("Read should succeed."), Some(json!("for-a")));
	}
}
