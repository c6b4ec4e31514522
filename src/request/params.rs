// crates.io
use url::form_urlencoded;
// self
use crate::_prelude::*;

/// Flat key/value query parameters with canonical ordering.
///
/// Keys iterate in lexicographic order; values of one key keep insertion order. The same
/// ordering is used for signing and for transmission.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamSet(BTreeMap<String, Vec<String>>);
impl ParamSet {
	/// Creates an empty set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces every value of `key` with `value`.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
		self.0.insert(key.into(), vec![value.into()]);

		self
	}

	/// Appends `value` to the values of `key`.
	pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
		self.0.entry(key.into()).or_default().push(value.into());

		self
	}

	/// Sets `key` only when `value` is present.
	pub fn set_opt<V>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self
	where
		V: Into<String>,
	{
		if let Some(value) = value {
			self.set(key, value);
		}

		self
	}

	/// Builder-style variant of [`ParamSet::set`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(key, value);

		self
	}

	/// Removes `key`, returning its values.
	pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
		self.0.remove(key)
	}

	/// Returns the first value of `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).and_then(|values| values.first()).map(String::as_str)
	}

	/// Returns `true` when `key` is present.
	pub fn contains(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Returns `true` when no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates `(key, value)` pairs in canonical order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0
			.iter()
			.flat_map(|(key, values)| values.iter().map(move |value| (key.as_str(), value.as_str())))
	}

	/// Encodes the set as `application/x-www-form-urlencoded` text in canonical order.
	pub fn encode(&self) -> String {
		let mut serializer = form_urlencoded::Serializer::new(String::new());

		for (key, value) in self.iter() {
			serializer.append_pair(key, value);
		}

		serializer.finish()
	}
}
impl<K, V> FromIterator<(K, V)> for ParamSet
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Self::new();

		for (key, value) in iter {
			params.add(key, value);
		}

		params
	}
}
