//! Component instances.
//!
//! An [`Instance`] is only ever produced by [`Ctor::create`], which runs the
//! init sequence exactly once. State lives in plain maps: props, data,
//! injections and ad-hoc fields. Declared props and computed properties are
//! reached through the constructor's [`AccessorTable`].

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap as HashMap;
use tessera_primitives::{AssetType, LifecycleHook, Uid};

use crate::collab::VNode;
use crate::ctor::{Accessor, AccessorTable, Ctor};
use crate::diag::{self, InstanceInfo};
use crate::error::{Error, Result};
use crate::global::{resolve_in_scope, warn_unresolved};
use crate::options::{Asset, DataMap, Method, OptionBag, Table, Value};

mod events;
mod init;
mod provide;
mod state;

pub use events::{EventNames, Handler};
pub use init::{InitOptions, InitPhase, InternalComponentOptions};
pub use provide::ProvideScope;

#[cfg(test)]
mod tests;

/// What a child instance knows about its parent.
#[derive(Clone)]
pub struct ParentLink {
	uid: Uid,
	root_uid: Uid,
	provided: Rc<ProvideScope>,
}

impl ParentLink {
	pub fn uid(&self) -> Uid {
		self.uid
	}

	pub fn root_uid(&self) -> Uid {
		self.root_uid
	}

	pub fn same(&self, other: &ParentLink) -> bool {
		self.uid == other.uid && Rc::ptr_eq(&self.provided, &other.provided)
	}
}

impl fmt::Debug for ParentLink {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ParentLink")
			.field("uid", &self.uid)
			.field("root_uid", &self.root_uid)
			.finish()
	}
}

#[derive(Debug, Default, Clone, Copy)]
struct Lifecycle {
	mounted: bool,
	being_destroyed: bool,
	destroyed: bool,
}

pub struct Instance {
	uid: Uid,
	ctor: Ctor,
	options: Rc<OptionBag>,
	phase: InitPhase,
	lifecycle: Lifecycle,
	parent: Option<ParentLink>,
	root_uid: Uid,
	events: events::Events,
	slots: HashMap<Box<str>, Vec<VNode>>,
	props: DataMap,
	data: DataMap,
	injected: DataMap,
	methods: Rc<Table<Method>>,
	own_accessors: AccessorTable,
	fields: DataMap,
	provided: Rc<ProvideScope>,
}

impl Instance {
	pub fn uid(&self) -> Uid {
		self.uid
	}

	pub fn ctor(&self) -> &Ctor {
		&self.ctor
	}

	/// Resolved options.
	pub fn options(&self) -> &Rc<OptionBag> {
		&self.options
	}

	pub fn phase(&self) -> InitPhase {
		self.phase
	}

	pub fn parent(&self) -> Option<&ParentLink> {
		self.parent.as_ref()
	}

	pub fn root_uid(&self) -> Uid {
		self.root_uid
	}

	pub fn is_root(&self) -> bool {
		self.parent.is_none()
	}

	pub fn is_mounted(&self) -> bool {
		self.lifecycle.mounted
	}

	pub fn is_being_destroyed(&self) -> bool {
		self.lifecycle.being_destroyed
	}

	pub fn is_destroyed(&self) -> bool {
		self.lifecycle.destroyed
	}

	/// `name` option, or the tag this instance was created for.
	pub fn name(&self) -> Option<&str> {
		self.options.name().or_else(|| self.options.component_tag())
	}

	pub fn info(&self) -> InstanceInfo {
		InstanceInfo {
			uid: self.uid,
			name: self.name().map(Into::into),
			is_root: self.is_root(),
		}
	}

	/// Link handed to children created under this instance.
	pub fn link(&self) -> ParentLink {
		ParentLink {
			uid: self.uid,
			root_uid: self.root_uid,
			provided: self.provided.clone(),
		}
	}

	pub fn props(&self) -> &DataMap {
		&self.props
	}

	pub fn data(&self) -> &DataMap {
		&self.data
	}

	pub fn injected(&self) -> &DataMap {
		&self.injected
	}

	pub fn provided(&self) -> &Rc<ProvideScope> {
		&self.provided
	}

	/// Slot contents by name; unnamed children land in `default`.
	pub fn slot(&self, name: &str) -> &[VNode] {
		self.slots.get(name).map(Vec::as_slice).unwrap_or_default()
	}

	pub fn has_method(&self, name: &str) -> bool {
		self.methods.contains_key(name)
	}

	fn accessor(&self, key: &str) -> Option<Accessor> {
		self.own_accessors
			.get(key)
			.cloned()
			.or_else(|| self.ctor.accessors().get(key).cloned())
	}

	/// Reads a public property: props and computed properties first, then
	/// data, injections and ad-hoc fields.
	pub fn get(&self, key: &str) -> Option<Value> {
		match self.accessor(key) {
			Some(Accessor::Prop) => return self.props.get(key).cloned(),
			Some(Accessor::Computed(def)) => {
				let reactivity = self.ctor.runtime().reactivity.clone();
				return match reactivity.computed_value(self, key, &def) {
					Ok(value) => Some(value),
					Err(err) => {
						diag::handle_error(self, &err, &format!("getter for computed property \"{key}\""));
						None
					}
				};
			}
			None => {}
		}
		if !is_reserved_key(key)
			&& let Some(value) = self.data.get(key)
		{
			return Some(value.clone());
		}
		self.injected.get(key).or_else(|| self.fields.get(key)).cloned()
	}

	/// Writes a public property, routed the same way [`Instance::get`] reads.
	pub fn set(&mut self, key: &str, value: Value) -> &mut Self {
		match self.accessor(key) {
			Some(Accessor::Prop) => {
				if !self.is_root() {
					self.warn(&format!(
						"Avoid mutating a prop directly since the value will be overwritten whenever the parent component re-renders. Prop being mutated: \"{key}\""
					));
				}
				self.props.insert(key.to_owned(), value);
			}
			Some(Accessor::Computed(def)) => {
				let info = format!("setter for computed property \"{key}\"");
				match diag::invoke_with_error_handling(self, &info, |vm| {
					def.assign(vm, value).transpose()
				}) {
					Some(None) => self.warn(&format!(
						"Computed property \"{key}\" was assigned to but it has no setter."
					)),
					Some(Some(())) | None => {}
				}
			}
			None if !is_reserved_key(key) && self.data.contains_key(key) => {
				self.data.insert(key.to_owned(), value);
			}
			None if self.injected.contains_key(key) => {
				self.warn(&format!(
					"Avoid mutating an injected value directly since the changes will be overwritten whenever the provided component re-renders. injection being mutated: \"{key}\""
				));
				self.injected.insert(key.to_owned(), value);
			}
			None => {
				self.fields.insert(key.to_owned(), value);
			}
		}
		self
	}

	/// Ad-hoc field, outside props and data.
	pub fn field(&self, key: &str) -> Option<&Value> {
		self.fields.get(key)
	}

	pub fn set_field(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
		self.fields.insert(key.to_owned(), value.into());
		self
	}

	/// Invokes a method from the `methods` option.
	pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Value> {
		let method = self
			.methods
			.get(name)
			.cloned()
			.ok_or_else(|| Error::UnknownMethod(name.to_owned()))?;
		Ok(method.call(self, args)?)
	}

	/// Runs every handler for `hook` in order, then emits `hook:<name>` when
	/// anything listens for hook events. A failing handler is reported and the
	/// rest still run.
	pub fn call_hook(&mut self, hook: LifecycleHook) -> &mut Self {
		let handlers = self.options.hooks(hook);
		let info = format!("{} hook", hook.name());
		for handler in handlers.iter() {
			diag::invoke_with_error_handling(self, &info, |vm| handler.call(vm));
		}
		if self.events.has_hook_event() {
			self.emit(&hook.event_name(), &[]);
		}
		self
	}

	/// Looks an asset up in this instance's options: as given, camelized,
	/// then PascalCased.
	pub fn resolve_asset(&self, ty: AssetType, id: &str, warn_missing: bool) -> Option<Asset> {
		let found = self.options.assets(ty).and_then(|scope| resolve_in_scope(scope, id));
		if found.is_none() && warn_missing {
			warn_unresolved(&self.ctor, ty, id, &self.info());
		}
		found
	}

	/// Produces a virtual node from the `render` option.
	pub fn render(&self) -> Option<VNode> {
		self.options.render().map(|render| render.call(self))
	}

	/// Mounts through the renderer, bracketed by `beforeMount` and `mounted`.
	pub fn mount(&mut self, target: Option<&str>) -> &mut Self {
		if self.lifecycle.destroyed {
			return self;
		}
		if self.options.render().is_none() {
			self.warn("Failed to mount component: template or render function not defined.");
		}
		self.call_hook(LifecycleHook::BeforeMount);
		let renderer = self.ctor.runtime().renderer.clone();
		diag::invoke_with_error_handling(self, "mount", |vm| renderer.mount(vm, target));
		self.lifecycle.mounted = true;
		self.call_hook(LifecycleHook::Mounted);
		self
	}

	/// Tears the instance down. Later calls do nothing.
	pub fn destroy(&mut self) -> &mut Self {
		if self.lifecycle.being_destroyed {
			return self;
		}
		self.call_hook(LifecycleHook::BeforeDestroy);
		self.lifecycle.being_destroyed = true;
		let runtime = self.ctor.runtime();
		runtime.reactivity.teardown(self.uid);
		let renderer = runtime.renderer.clone();
		self.lifecycle.destroyed = true;
		renderer.teardown(self);
		self.call_hook(LifecycleHook::Destroyed);
		self.off_all();
		self
	}

	pub(crate) fn warn(&self, msg: &str) {
		diag::warn(self.ctor.runtime(), msg, Some(&self.info()));
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instance")
			.field("uid", &self.uid)
			.field("name", &self.name())
			.field("ctor", &self.ctor.cid())
			.field("phase", &self.phase)
			.field("mounted", &self.lifecycle.mounted)
			.field("destroyed", &self.lifecycle.destroyed)
			.finish_non_exhaustive()
	}
}

/// Keys starting with `_` or `$` are kept out of the public surface.
fn is_reserved_key(key: &str) -> bool {
	key.starts_with('_') || key.starts_with('$')
}
