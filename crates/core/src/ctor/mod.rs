//! Constructor descriptors.
//!
//! A [`Ctor`] is a cheap handle to one [`Descriptor`]: the root built by
//! [`RootBuilder`], or a constructor derived from it with [`Ctor::extend`].
//! Descriptors hold their merged options plus the snapshots needed to notice
//! when an ancestor's options were replaced after derivation; see
//! [`Ctor::resolve_options`].

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap as HashMap;
use tessera_primitives::{AssetType, Cid};

use crate::collab::{DetachedRenderer, InertReactivity, Reactivity, Renderer};
use crate::config::Config;
use crate::global::PluginRef;
use crate::options::{AssetScope, OptionBag, OptionValue};

mod accessors;
mod extend;
mod resolve;

pub use accessors::{Accessor, AccessorTable};
pub use resolve::resolve_modified_options;

#[cfg(test)]
mod tests;

/// State shared by a root constructor and everything derived from it.
/// Identifiers are not part of it: cids and uids come from process-wide
/// counters, see [`Cid::next`].
pub(crate) struct Runtime {
	config: RefCell<Config>,
	pub(crate) reactivity: Rc<dyn Reactivity>,
	pub(crate) renderer: Rc<dyn Renderer>,
}

impl Runtime {
	pub(crate) fn with_config<R>(&self, f: impl FnOnce(&Config) -> R) -> R {
		f(&self.config.borrow())
	}

	/// Snapshot of the config; handlers and strategies are shared, not copied.
	pub(crate) fn config(&self) -> Config {
		self.config.borrow().clone()
	}

	pub(crate) fn update_config(&self, f: impl FnOnce(&mut Config)) {
		f(&mut self.config.borrow_mut());
	}

}

/// Snapshots taken when a constructor was derived.
struct Derivation {
	/// The parent's options at the last merge.
	super_options: Rc<OptionBag>,
	/// The extension input, shared with the [`ComponentDef`] it came from.
	extend_options: Rc<RefCell<OptionBag>>,
	/// Shallow copy of `options` right after the last merge.
	sealed_options: OptionBag,
}

struct DescriptorState {
	options: Rc<OptionBag>,
	derivation: Option<Derivation>,
	accessors: Rc<AccessorTable>,
}

/// One constructor: identity, merged options and ancestry.
pub struct Descriptor {
	cid: Cid,
	parent: Option<Ctor>,
	runtime: Rc<Runtime>,
	state: RefCell<DescriptorState>,
	installed_plugins: RefCell<Vec<PluginRef>>,
}

/// Handle to a constructor descriptor. Clones share the descriptor.
#[derive(Clone)]
pub struct Ctor(Rc<Descriptor>);

impl Ctor {
	/// A root constructor with the default config and collaborators.
	pub fn root() -> Self {
		RootBuilder::new().build()
	}

	pub fn builder() -> RootBuilder {
		RootBuilder::new()
	}

	pub(crate) fn from_rc(descriptor: Rc<Descriptor>) -> Self {
		Self(descriptor)
	}

	pub(crate) fn downgrade(&self) -> Weak<Descriptor> {
		Rc::downgrade(&self.0)
	}

	pub fn ptr_eq(&self, other: &Ctor) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub fn cid(&self) -> Cid {
		self.0.cid
	}

	pub fn is_root(&self) -> bool {
		self.0.parent.is_none()
	}

	/// The `name` option, if any.
	pub fn name(&self) -> Option<String> {
		self.options().name().map(str::to_owned)
	}

	/// Current options, without checking ancestors for changes.
	pub fn options(&self) -> Rc<OptionBag> {
		self.0.state.borrow().options.clone()
	}

	/// The constructor this one was derived from.
	pub fn parent(&self) -> Option<&Ctor> {
		self.0.parent.as_ref()
	}

	/// The root constructor at the top of the chain.
	pub fn base(&self) -> Ctor {
		let mut ctor = self;
		while let Some(parent) = ctor.parent() {
			ctor = parent;
		}
		ctor.clone()
	}

	pub fn super_options(&self) -> Option<Rc<OptionBag>> {
		let state = self.0.state.borrow();
		state.derivation.as_ref().map(|d| d.super_options.clone())
	}

	pub fn sealed_options(&self) -> Option<OptionBag> {
		let state = self.0.state.borrow();
		state.derivation.as_ref().map(|d| d.sealed_options.clone())
	}

	/// Current extension input, including fields re-applied by re-resolution.
	pub fn extend_options(&self) -> Option<OptionBag> {
		let state = self.0.state.borrow();
		state.derivation.as_ref().map(|d| d.extend_options.borrow().clone())
	}

	/// Property forwarding for `props` and `computed`.
	pub fn accessors(&self) -> Rc<AccessorTable> {
		self.0.state.borrow().accessors.clone()
	}

	/// Replaces one field of this constructor's options.
	///
	/// The options get a new identity, so derived constructors re-resolve and
	/// this constructor's own re-resolution keeps the change.
	pub fn set_option(&self, key: &str, value: OptionValue) -> &Self {
		let mut options = (*self.options()).clone();
		options.insert(key, value);
		self.replace_options(options);
		self
	}

	pub(crate) fn replace_options(&self, options: OptionBag) {
		let accessors = Rc::new(AccessorTable::from_options(&options));
		let mut state = self.0.state.borrow_mut();
		state.options = Rc::new(options);
		state.accessors = accessors;
	}

	pub(crate) fn runtime(&self) -> &Runtime {
		&self.0.runtime
	}

	pub(crate) fn installed_plugins(&self) -> &RefCell<Vec<PluginRef>> {
		&self.0.installed_plugins
	}
}

impl fmt::Debug for Ctor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Ctor")
			.field("cid", &self.cid())
			.field("name", &self.name())
			.field("parent", &self.parent().map(Ctor::cid))
			.finish()
	}
}

/// A component definition: an option bag plus the constructors derived from it.
///
/// Clones share both. Extending the same parent with the same definition
/// returns the cached constructor.
#[derive(Clone, Default)]
pub struct ComponentDef {
	bag: Rc<RefCell<OptionBag>>,
	ctors: Rc<RefCell<HashMap<Cid, Ctor>>>,
}

impl ComponentDef {
	/// The empty definition.
	pub fn new() -> Self {
		Self::default()
	}

	pub fn options(&self) -> OptionBag {
		self.bag.borrow().clone()
	}

	pub fn name(&self) -> Option<String> {
		self.bag.borrow().name().map(str::to_owned)
	}

	/// Edits the definition in place. Constructors already derived from it
	/// keep their merged options until they re-resolve.
	pub fn update(&self, f: impl FnOnce(&mut OptionBag)) {
		f(&mut self.bag.borrow_mut());
	}

	pub fn ptr_eq(&self, other: &ComponentDef) -> bool {
		Rc::ptr_eq(&self.bag, &other.bag)
	}

	/// The constructor previously derived from the parent with `cid`.
	pub fn cached(&self, parent: Cid) -> Option<Ctor> {
		self.ctors.borrow().get(&parent).cloned()
	}

	fn cache(&self, parent: Cid, ctor: Ctor) {
		self.ctors.borrow_mut().insert(parent, ctor);
	}

	fn bag(&self) -> Rc<RefCell<OptionBag>> {
		self.bag.clone()
	}
}

impl From<OptionBag> for ComponentDef {
	fn from(bag: OptionBag) -> Self {
		Self {
			bag: Rc::new(RefCell::new(bag)),
			ctors: Rc::default(),
		}
	}
}

impl fmt::Debug for ComponentDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComponentDef")
			.field("options", &*self.bag.borrow())
			.field("derived", &self.ctors.borrow().len())
			.finish()
	}
}

/// Builds a root constructor.
pub struct RootBuilder {
	config: Config,
	reactivity: Rc<dyn Reactivity>,
	renderer: Rc<dyn Renderer>,
	options: OptionBag,
}

impl Default for RootBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl RootBuilder {
	pub fn new() -> Self {
		Self {
			config: Config::default(),
			reactivity: Rc::new(InertReactivity),
			renderer: Rc::new(DetachedRenderer),
			options: OptionBag::new(),
		}
	}

	pub fn config(mut self, config: Config) -> Self {
		self.config = config;
		self
	}

	pub fn reactivity(mut self, reactivity: impl Reactivity + 'static) -> Self {
		self.reactivity = Rc::new(reactivity);
		self
	}

	pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
		self.renderer = Rc::new(renderer);
		self
	}

	/// Initial root options, before any global mixin.
	pub fn options(mut self, options: OptionBag) -> Self {
		self.options = options;
		self
	}

	pub fn build(self) -> Ctor {
		let mut options = self.options;
		options.set_resolved(true);
		for ty in AssetType::ALL {
			if options.assets(ty).is_none() {
				options.insert(ty.option_key(), OptionValue::Assets(AssetScope::new()));
			}
		}
		let accessors = Rc::new(AccessorTable::from_options(&options));
		let runtime = Rc::new(Runtime {
			config: RefCell::new(self.config),
			reactivity: self.reactivity,
			renderer: self.renderer,
		});
		Ctor(Rc::new(Descriptor {
			cid: Cid::next(),
			parent: None,
			runtime,
			state: RefCell::new(DescriptorState {
				options: Rc::new(options),
				derivation: None,
				accessors,
			}),
			installed_plugins: RefCell::default(),
		}))
	}
}
