use rustc_hash::FxHashMap as HashMap;

use crate::options::{ComputedDef, OptionBag};

/// How a forwarded property is read.
#[derive(Debug, Clone)]
pub enum Accessor {
	/// Reads and writes the instance's props storage.
	Prop,
	/// Reads through the reactivity engine's computed cache.
	Computed(ComputedDef),
}

/// Per-constructor property forwarding, built once per derivation instead of
/// once per instance.
#[derive(Debug, Clone, Default)]
pub struct AccessorTable {
	entries: HashMap<Box<str>, Accessor>,
}

impl AccessorTable {
	/// Forwards every declared prop and computed property. A computed property
	/// never shadows a prop of the same name.
	pub fn from_options(options: &OptionBag) -> Self {
		let mut entries = HashMap::default();
		if let Some(computed) = options.computed() {
			for (key, def) in computed.iter() {
				entries.insert(key.clone(), Accessor::Computed(def.clone()));
			}
		}
		if let Some(props) = options.props() {
			for key in props.keys() {
				entries.insert(key.clone(), Accessor::Prop);
			}
		}
		Self { entries }
	}

	pub fn get(&self, key: &str) -> Option<&Accessor> {
		self.entries.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn insert(&mut self, key: impl Into<Box<str>>, accessor: Accessor) {
		self.entries.insert(key.into(), accessor);
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(AsRef::as_ref)
	}
}
