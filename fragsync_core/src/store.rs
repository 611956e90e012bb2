use indexmap::IndexMap;
use serde::Serialize;

/// Insertion-ordered map from fragment key to fragment content.
///
/// Re-inserting an existing key replaces its content but keeps its original
/// position, so iteration order reflects when a key was first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FragmentStore {
	fragments: IndexMap<String, String>,
}

impl FragmentStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store `content` under `key`, returning the content it replaced.
	pub fn insert(&mut self, key: impl Into<String>, content: impl Into<String>) -> Option<String> {
		self.fragments.insert(key.into(), content.into())
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.fragments.get(key).map(String::as_str)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.fragments.contains_key(key)
	}

	/// Remove a fragment while keeping the order of the remaining ones.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.fragments.shift_remove(key)
	}

	pub fn clear(&mut self) {
		self.fragments.clear();
	}

	pub fn len(&self) -> usize {
		self.fragments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.fragments.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.fragments
			.iter()
			.map(|(key, content)| (key.as_str(), content.as_str()))
	}
}

impl<K, V> FromIterator<(K, V)> for FragmentStore
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
		Self {
			fragments: iter
				.into_iter()
				.map(|(key, content)| (key.into(), content.into()))
				.collect(),
		}
	}
}
