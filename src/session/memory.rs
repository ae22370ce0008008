//! Thread-safe in-memory [`SessionBackend`] for local development and tests.

// self
use crate::{_prelude::*, error::SessionError, id::SessionKey, session::SessionBackend};

#[derive(Debug, Default)]
struct MemoryState {
	active: bool,
	slots: HashMap<SessionKey, Value>,
}

/// In-process session; clones share the same slots, standing in for one browser session.
#[derive(Clone, Debug, Default)]
pub struct MemorySessionBackend(Arc<RwLock<MemoryState>>);
impl MemorySessionBackend {
	/// Number of occupied slots.
	pub fn len(&self) -> usize {
		self.0.read().slots.len()
	}

	/// Whether every slot is empty.
	pub fn is_empty(&self) -> bool {
		self.0.read().slots.is_empty()
	}
}
impl SessionBackend for MemorySessionBackend {
	fn is_active(&self) -> bool {
		self.0.read().active
	}

	fn start(&self) -> Result<(), SessionError> {
		self.0.write().active = true;

		Ok(())
	}

	fn get(&self, key: &SessionKey) -> Result<Option<Value>, SessionError> {
		Ok(self.0.read().slots.get(key).cloned())
	}

	fn set(&self, key: &SessionKey, value: Value) -> Result<(), SessionError> {
		self.0.write().slots.insert(key.clone(), value);

		Ok(())
	}

	fn take(&self, key: &SessionKey) -> Result<Option<Value>, SessionError> {
		Ok(self.0.write().slots.remove(key))
	}
}
