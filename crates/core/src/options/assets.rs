//! Chained asset registries (`components`, `directives`, `filters`).
//!
//! A scope owns its own entries and falls back to its parent on a miss. Merging
//! never copies parent entries into the child, so registering an asset on an
//! ancestor later stays visible to every scope chained below it.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap as HashMap;

use crate::ctor::{ComponentDef, Ctor, Descriptor};
use crate::options::{DirectiveDef, DirectiveHook, FilterFn};

/// A registered component.
#[derive(Clone)]
pub enum ComponentAsset {
	/// A derived constructor.
	Ctor(Ctor),
	/// A definition not yet turned into a constructor.
	Definition(ComponentDef),
	/// A constructor's registration of itself, held weakly so the descriptor
	/// and its own options never keep each other alive.
	SelfRef(Weak<Descriptor>),
}

impl ComponentAsset {
	/// The constructor, when this entry holds (or still points to) one.
	pub fn ctor(&self) -> Option<Ctor> {
		match self {
			ComponentAsset::Ctor(ctor) => Some(ctor.clone()),
			ComponentAsset::SelfRef(weak) => weak.upgrade().map(Ctor::from_rc),
			ComponentAsset::Definition(_) => None,
		}
	}
}

impl From<Ctor> for ComponentAsset {
	fn from(ctor: Ctor) -> Self {
		ComponentAsset::Ctor(ctor)
	}
}

impl From<ComponentDef> for ComponentAsset {
	fn from(def: ComponentDef) -> Self {
		ComponentAsset::Definition(def)
	}
}

/// One entry of an asset scope.
#[derive(Clone)]
pub enum Asset {
	Component(ComponentAsset),
	Directive(Rc<DirectiveDef>),
	Filter(FilterFn),
}

impl Asset {
	pub fn as_ctor(&self) -> Option<Ctor> {
		match self {
			Asset::Component(component) => component.ctor(),
			_ => None,
		}
	}

	pub fn as_directive(&self) -> Option<&Rc<DirectiveDef>> {
		match self {
			Asset::Directive(def) => Some(def),
			_ => None,
		}
	}

	pub fn as_filter(&self) -> Option<&FilterFn> {
		match self {
			Asset::Filter(f) => Some(f),
			_ => None,
		}
	}

	/// Identity comparison.
	pub fn same(&self, other: &Asset) -> bool {
		match (self, other) {
			(Asset::Component(a), Asset::Component(b)) => match (a, b) {
				(ComponentAsset::Ctor(a), ComponentAsset::Ctor(b)) => a.ptr_eq(b),
				(ComponentAsset::Definition(a), ComponentAsset::Definition(b)) => a.ptr_eq(b),
				(ComponentAsset::SelfRef(a), ComponentAsset::SelfRef(b)) => a.ptr_eq(b),
				_ => false,
			},
			(Asset::Directive(a), Asset::Directive(b)) => Rc::ptr_eq(a, b),
			(Asset::Filter(a), Asset::Filter(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl fmt::Debug for Asset {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Asset::Component(ComponentAsset::Ctor(ctor)) => write!(f, "Component({})", ctor.cid()),
			Asset::Component(ComponentAsset::Definition(_)) => f.write_str("Component(definition)"),
			Asset::Component(ComponentAsset::SelfRef(_)) => f.write_str("Component(self)"),
			Asset::Directive(def) => f.debug_tuple("Directive").field(def).finish(),
			Asset::Filter(filter) => f.debug_tuple("Filter").field(filter).finish(),
		}
	}
}

/// Input accepted by asset registration, before normalization.
#[derive(Clone)]
pub enum Definition {
	/// Plain component definition; derived from the root constructor on registration.
	Component(ComponentDef),
	/// Already-derived constructor.
	Ctor(Ctor),
	Directive(DirectiveDef),
	/// Bare function directive, normalized to `bind` + `update`.
	DirectiveFn(DirectiveHook),
	Filter(FilterFn),
}

impl From<ComponentDef> for Definition {
	fn from(def: ComponentDef) -> Self {
		Definition::Component(def)
	}
}

impl From<Ctor> for Definition {
	fn from(ctor: Ctor) -> Self {
		Definition::Ctor(ctor)
	}
}

impl From<DirectiveDef> for Definition {
	fn from(def: DirectiveDef) -> Self {
		Definition::Directive(def)
	}
}

impl From<DirectiveHook> for Definition {
	fn from(hook: DirectiveHook) -> Self {
		Definition::DirectiveFn(hook)
	}
}

impl From<FilterFn> for Definition {
	fn from(f: FilterFn) -> Self {
		Definition::Filter(f)
	}
}

#[derive(Default)]
struct ScopeInner {
	own: RefCell<HashMap<Box<str>, Asset>>,
	parent: Option<AssetScope>,
}

/// Shared handle to a chained asset registry.
#[derive(Clone, Default)]
pub struct AssetScope(Rc<ScopeInner>);

impl AssetScope {
	pub fn new() -> Self {
		Self::default()
	}

	/// New scope falling back to `parent`, seeded with `entries`.
	pub fn chained(parent: Option<&AssetScope>, entries: impl IntoIterator<Item = (Box<str>, Asset)>) -> Self {
		Self(Rc::new(ScopeInner {
			own: RefCell::new(entries.into_iter().collect()),
			parent: parent.cloned(),
		}))
	}

	/// Looks `id` up in this scope, then along the parent chain.
	pub fn get(&self, id: &str) -> Option<Asset> {
		if let Some(asset) = self.0.own.borrow().get(id) {
			return Some(asset.clone());
		}
		self.0.parent.as_ref()?.get(id)
	}

	pub fn get_own(&self, id: &str) -> Option<Asset> {
		self.0.own.borrow().get(id).cloned()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.get(id).is_some()
	}

	/// Registers into this scope only; parents are never written.
	pub fn insert(&self, id: impl Into<Box<str>>, asset: Asset) {
		self.0.own.borrow_mut().insert(id.into(), asset);
	}

	pub fn own_keys(&self) -> Vec<Box<str>> {
		self.0.own.borrow().keys().cloned().collect()
	}

	/// Every reachable entry, nearest scope winning.
	pub fn flattened(&self) -> Vec<(Box<str>, Asset)> {
		let mut seen: HashMap<Box<str>, Asset> = HashMap::default();
		let mut scope = Some(self);
		while let Some(current) = scope {
			for (id, asset) in current.0.own.borrow().iter() {
				seen.entry(id.clone()).or_insert_with(|| asset.clone());
			}
			scope = current.0.parent.as_ref();
		}
		seen.into_iter().collect()
	}

	pub fn parent(&self) -> Option<&AssetScope> {
		self.0.parent.as_ref()
	}

	pub fn ptr_eq(&self, other: &AssetScope) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for AssetScope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AssetScope")
			.field("own", &self.own_keys())
			.field("chained", &self.0.parent.is_some())
			.finish()
	}
}
