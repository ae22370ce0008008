//! File-backed [`SessionBackend`] that survives process restarts between the redirect and the
//! provider callback.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{_prelude::*, error::SessionError, id::SessionKey, session::SessionBackend};

type Slots = Map<String, Value>;

/// Persists session slots to a JSON file after each mutation.
///
/// Nothing touches the disk until [`SessionBackend::start`] loads the snapshot. A mutation only
/// becomes visible in memory once its snapshot is on disk.
#[derive(Clone, Debug)]
pub struct FileSessionBackend {
	path: PathBuf,
	inner: Arc<RwLock<Option<Slots>>>,
}
impl FileSessionBackend {
	/// Points a backend at `path` without reading it.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into(), inner: Default::default() }
	}

	/// Location of the session file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Slots, SessionError> {
		if !path.exists() {
			return Ok(Slots::new());
		}

		let metadata = path.metadata().map_err(|e| SessionError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(Slots::new());
		}

		let bytes = fs::read(path).map_err(|e| SessionError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		serde_json::from_slice(&bytes).map_err(|e| SessionError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), SessionError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| SessionError::Backend {
				message: format!("Failed to create session directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, slots: &Slots) -> Result<(), SessionError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized = serde_json::to_vec(slots).map_err(|e| SessionError::Serialization {
			message: format!("Failed to serialize session snapshot: {e}"),
		})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| SessionError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| SessionError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| SessionError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| SessionError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn not_started() -> SessionError {
		SessionError::Backend { message: "Session has not been started".into() }
	}
}
impl SessionBackend for FileSessionBackend {
	fn is_active(&self) -> bool {
		self.inner.read().is_some()
	}

	fn start(&self) -> Result<(), SessionError> {
		let mut guard = self.inner.write();

		if guard.is_none() {
			Self::ensure_parent_exists(&self.path)?;
			*guard = Some(Self::load_snapshot(&self.path)?);
		}

		Ok(())
	}

	fn get(&self, key: &SessionKey) -> Result<Option<Value>, SessionError> {
		let guard = self.inner.read();
		let slots = guard.as_ref().ok_or_else(Self::not_started)?;

		Ok(slots.get(key.as_ref()).cloned())
	}

	fn set(&self, key: &SessionKey, value: Value) -> Result<(), SessionError> {
		let mut guard = self.inner.write();
		let slots = guard.as_mut().ok_or_else(Self::not_started)?;
		let mut next = slots.clone();

		next.insert(key.to_string(), value);
		self.persist_locked(&next)?;
		*slots = next;

		Ok(())
	}

	fn take(&self, key: &SessionKey) -> Result<Option<Value>, SessionError> {
		let mut guard = self.inner.write();
		let slots = guard.as_mut().ok_or_else(Self::not_started)?;

		if !slots.contains_key(key.as_ref()) {
			return Ok(None);
		}

		let mut next = slots.clone();
		let taken = next.remove(key.as_ref());

		self.persist_locked(&next)?;
		*slots = next;

		Ok(taken)
	}
}
