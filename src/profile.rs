//! Dot-path mapping from raw provider profiles into the auth structure.
//!
//! Paths are plain `.`-separated segments with no escaping, so keys containing a literal dot
//! cannot be addressed. On the profile side a numeric segment also indexes into arrays.

// self
use crate::_prelude::*;

/// Result of a single [`map_profile`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileMapping {
	/// The leaf was copied into the auth structure.
	Mapped,
	/// The profile path could not be resolved; `segment` is the first unresolved one.
	Missed {
		/// Segment at which traversal stopped.
		segment: String,
	},
	/// The auth path runs through an existing non-mapping value.
	Conflict {
		/// Auth segment holding the blocking value.
		segment: String,
	},
}
impl ProfileMapping {
	/// `true` only for [`ProfileMapping::Mapped`].
	pub fn is_mapped(&self) -> bool {
		matches!(self, ProfileMapping::Mapped)
	}
}

/// Resolves `path` inside `profile`, returning the first unresolved segment on failure.
pub fn lookup<'a>(profile: &'a Value, path: &str) -> Result<&'a Value, String> {
	let mut node = profile;

	for segment in path.split('.') {
		let next = match node {
			_ if segment.is_empty() => None,
			Value::Object(map) => map.get(segment),
			Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
			_ => None,
		};

		node = next.ok_or_else(|| segment.to_owned())?;
	}

	Ok(node)
}

/// Copies the value at `profile_path` into `auth` at `auth_path`.
///
/// Missing profile fields are common and provider-dependent, so failure is reported through
/// the returned [`ProfileMapping`] rather than an error. `auth` is only modified on success;
/// intermediate mappings along `auth_path` are created as needed.
pub fn map_profile(
	profile: &Value,
	profile_path: &str,
	auth: &mut Map<String, Value>,
	auth_path: &str,
) -> ProfileMapping {
	let value = match lookup(profile, profile_path) {
		Ok(value) => value.clone(),
		Err(segment) => return ProfileMapping::Missed { segment },
	};
	let segments = auth_path.split('.').collect::<Vec<_>>();

	if let Some(segment) = segments.iter().find(|s| s.is_empty()) {
		return ProfileMapping::Conflict { segment: (*segment).to_owned() };
	}
	if let Some(segment) = blocking_segment(auth, &segments) {
		return ProfileMapping::Conflict { segment };
	}

	insert_at(auth, &segments, value);

	ProfileMapping::Mapped
}

fn blocking_segment(mut node: &Map<String, Value>, segments: &[&str]) -> Option<String> {
	let (_, parents) = segments.split_last()?;

	for segment in parents {
		match node.get(*segment) {
			None => return None,
			Some(Value::Object(child)) => node = child,
			Some(_) => return Some((*segment).to_owned()),
		}
	}

	None
}

fn insert_at(node: &mut Map<String, Value>, segments: &[&str], value: Value) {
	match segments {
		[] => {},
		[last] => {
			node.insert((*last).to_owned(), value);
		},
		[head, rest @ ..] => {
			let child = node.entry(*head).or_insert_with(|| Value::Object(Map::new()));

			if let Value::Object(child) = child {
				insert_at(child, rest, value);
			}
		},
	}
}
