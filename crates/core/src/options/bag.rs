use std::rc::Rc;

use rustc_hash::FxHashMap as HashMap;
use tessera_primitives::{AssetType, LifecycleHook};

use crate::collab::SlotChild;
use crate::error::HandlerResult;
use crate::instance::{Handler, Instance, ParentLink};
use crate::options::{
	Asset, AssetScope, ComponentAsset, ComputedDef, DataFn, DataMap, DirectiveDef, FilterFn, Hook,
	InjectDef, Method, Mixin, OptionValue, PropDef, RenderFn, Table, Value, WatchDef, keys,
};

/// Mapping from option name to value.
///
/// A bag may sit on top of a prototype bag: lookups that miss the bag's own
/// fields continue into the prototype. Instances created internally use this
/// to avoid re-merging their constructor's options.
#[derive(Clone, Default)]
pub struct OptionBag {
	fields: HashMap<Box<str>, OptionValue>,
	proto: Option<Rc<OptionBag>>,
	/// Set on bags descending from a root constructor's options; their
	/// `mixins` and `extends` are already folded in.
	resolved: bool,
}

impl OptionBag {
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty bag reading through to `proto`.
	pub(crate) fn with_proto(proto: Rc<OptionBag>) -> Self {
		Self {
			resolved: proto.resolved,
			fields: HashMap::default(),
			proto: Some(proto),
		}
	}

	pub fn is_resolved(&self) -> bool {
		self.resolved
	}

	pub(crate) fn set_resolved(&mut self, resolved: bool) {
		self.resolved = resolved;
	}

	pub fn proto(&self) -> Option<&Rc<OptionBag>> {
		self.proto.as_ref()
	}

	/// Own field, then the prototype chain.
	pub fn get(&self, key: &str) -> Option<&OptionValue> {
		match self.fields.get(key) {
			Some(value) => Some(value),
			None => self.proto.as_deref()?.get(key),
		}
	}

	pub fn get_own(&self, key: &str) -> Option<&OptionValue> {
		self.fields.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	pub fn insert(&mut self, key: impl Into<Box<str>>, value: OptionValue) -> Option<OptionValue> {
		self.fields.insert(key.into(), value)
	}

	pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
		self.fields.remove(key)
	}

	/// Every visible key: own fields first, then prototype keys not shadowed.
	pub fn keys(&self) -> Vec<Box<str>> {
		let mut keys: Vec<Box<str>> = self.fields.keys().cloned().collect();
		if let Some(proto) = &self.proto {
			keys.extend(proto.keys().into_iter().filter(|k| !self.fields.contains_key(k)));
		}
		keys
	}

	pub fn own_keys(&self) -> impl Iterator<Item = &str> {
		self.fields.keys().map(AsRef::as_ref)
	}

	pub fn len(&self) -> usize {
		self.fields.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.proto.is_none()
	}

	pub fn name(&self) -> Option<&str> {
		self.get(keys::NAME)?.as_value()?.as_str()
	}

	pub fn value(&self, key: &str) -> Option<&Value> {
		self.get(key)?.as_value()
	}

	/// Handlers for `hook`, empty when none are declared.
	pub fn hooks(&self, hook: LifecycleHook) -> Rc<[Hook]> {
		match self.get(hook.name()) {
			Some(OptionValue::Hooks(hooks)) => hooks.clone(),
			_ => Rc::from(Vec::new()),
		}
	}

	pub fn assets(&self, ty: AssetType) -> Option<&AssetScope> {
		match self.get(ty.option_key())? {
			OptionValue::Assets(scope) => Some(scope),
			_ => None,
		}
	}

	pub fn data(&self) -> Option<&OptionValue> {
		self.get(keys::DATA)
	}

	pub fn provide(&self) -> Option<&OptionValue> {
		self.get(keys::PROVIDE)
	}

	pub fn props(&self) -> Option<&Rc<Table<PropDef>>> {
		match self.get(keys::PROPS)? {
			OptionValue::Props(t) => Some(t),
			_ => None,
		}
	}

	pub fn methods(&self) -> Option<&Rc<Table<Method>>> {
		match self.get(keys::METHODS)? {
			OptionValue::Methods(t) => Some(t),
			_ => None,
		}
	}

	pub fn computed(&self) -> Option<&Rc<Table<ComputedDef>>> {
		match self.get(keys::COMPUTED)? {
			OptionValue::Computed(t) => Some(t),
			_ => None,
		}
	}

	pub fn inject(&self) -> Option<&Rc<Table<InjectDef>>> {
		match self.get(keys::INJECT)? {
			OptionValue::Inject(t) => Some(t),
			_ => None,
		}
	}

	pub fn watch(&self) -> Option<&Rc<Table<Rc<[WatchDef]>>>> {
		match self.get(keys::WATCH)? {
			OptionValue::Watch(t) => Some(t),
			_ => None,
		}
	}

	pub fn mixins(&self) -> Rc<[Mixin]> {
		match self.get(keys::MIXINS) {
			Some(OptionValue::Mixins(m)) => m.clone(),
			_ => Rc::from(Vec::new()),
		}
	}

	pub fn extends(&self) -> Option<&Mixin> {
		match self.get(keys::EXTENDS)? {
			OptionValue::Extends(m) => Some(m),
			_ => None,
		}
	}

	/// Mount target.
	pub fn el(&self) -> Option<&str> {
		self.value(keys::EL)?.as_str()
	}

	pub fn props_data(&self) -> Option<&DataMap> {
		self.value(keys::PROPS_DATA)?.as_object()
	}

	pub fn render(&self) -> Option<&RenderFn> {
		match self.get(keys::RENDER)? {
			OptionValue::Render(f) => Some(f),
			_ => None,
		}
	}

	pub fn parent(&self) -> Option<&ParentLink> {
		match self.get(keys::PARENT)? {
			OptionValue::Parent(link) => Some(link),
			_ => None,
		}
	}

	pub fn parent_listeners(&self) -> Option<&Rc<[(Box<str>, Handler)]>> {
		match self.get(keys::PARENT_LISTENERS)? {
			OptionValue::Listeners(l) => Some(l),
			_ => None,
		}
	}

	pub fn render_children(&self) -> Option<&Rc<[SlotChild]>> {
		match self.get(keys::RENDER_CHILDREN)? {
			OptionValue::Children(c) => Some(c),
			_ => None,
		}
	}

	pub fn component_tag(&self) -> Option<&str> {
		self.value(keys::COMPONENT_TAG)?.as_str()
	}

	pub fn with_option(mut self, key: impl Into<Box<str>>, value: OptionValue) -> Self {
		self.insert(key, value);
		self
	}

	pub fn with_value(self, key: impl Into<Box<str>>, value: Value) -> Self {
		self.with_option(key, OptionValue::value(value))
	}

	pub fn with_name(self, name: &str) -> Self {
		self.with_value(keys::NAME, Value::from(name))
	}

	pub fn with_data(self, f: impl Fn(&Instance) -> HandlerResult<DataMap> + 'static) -> Self {
		self.with_option(keys::DATA, OptionValue::Data(DataFn::new(f)))
	}

	pub fn with_provide(self, f: impl Fn(&Instance) -> HandlerResult<DataMap> + 'static) -> Self {
		self.with_option(keys::PROVIDE, OptionValue::Data(DataFn::new(f)))
	}

	/// Appends a handler for `hook`.
	pub fn with_hook(self, hook: LifecycleHook, f: impl Fn(&mut Instance) -> HandlerResult + 'static) -> Self {
		self.with_hook_fn(hook, Hook::new(f))
	}

	/// Appends an existing handler for `hook`, keeping its identity.
	pub fn with_hook_fn(mut self, hook: LifecycleHook, f: Hook) -> Self {
		let mut hooks: Vec<Hook> = match self.fields.get(hook.name()) {
			Some(OptionValue::Hooks(existing)) => existing.to_vec(),
			_ => Vec::new(),
		};
		hooks.push(f);
		self.insert(hook.name(), OptionValue::Hooks(hooks.into()));
		self
	}

	pub fn with_method(
		self,
		name: &str,
		f: impl Fn(&mut Instance, &[Value]) -> HandlerResult<Value> + 'static,
	) -> Self {
		self.with_method_fn(name, Method::new(f))
	}

	pub fn with_method_fn(mut self, name: &str, f: Method) -> Self {
		let mut table = self.own_table(keys::METHODS, |v| match v {
			OptionValue::Methods(t) => Some(t),
			_ => None,
		});
		table.insert(name.into(), f);
		self.insert(keys::METHODS, OptionValue::Methods(Rc::new(table)));
		self
	}

	pub fn with_prop(mut self, name: &str, def: PropDef) -> Self {
		let mut table = self.own_table(keys::PROPS, |v| match v {
			OptionValue::Props(t) => Some(t),
			_ => None,
		});
		table.insert(name.into(), def);
		self.insert(keys::PROPS, OptionValue::Props(Rc::new(table)));
		self
	}

	pub fn with_computed(mut self, name: &str, def: ComputedDef) -> Self {
		let mut table = self.own_table(keys::COMPUTED, |v| match v {
			OptionValue::Computed(t) => Some(t),
			_ => None,
		});
		table.insert(name.into(), def);
		self.insert(keys::COMPUTED, OptionValue::Computed(Rc::new(table)));
		self
	}

	pub fn with_inject(mut self, name: &str, def: InjectDef) -> Self {
		let mut table = self.own_table(keys::INJECT, |v| match v {
			OptionValue::Inject(t) => Some(t),
			_ => None,
		});
		table.insert(name.into(), def);
		self.insert(keys::INJECT, OptionValue::Inject(Rc::new(table)));
		self
	}

	/// Appends a watcher on `key`.
	pub fn with_watch(mut self, key: &str, def: WatchDef) -> Self {
		let mut table = self.own_table(keys::WATCH, |v| match v {
			OptionValue::Watch(t) => Some(t),
			_ => None,
		});
		let mut watchers = table.get(key).map(|w| w.to_vec()).unwrap_or_default();
		watchers.push(def);
		table.insert(key.into(), watchers.into());
		self.insert(keys::WATCH, OptionValue::Watch(Rc::new(table)));
		self
	}

	pub fn with_component(self, name: &str, component: impl Into<ComponentAsset>) -> Self {
		self.with_asset(AssetType::Component, name, Asset::Component(component.into()))
	}

	pub fn with_directive(self, name: &str, def: DirectiveDef) -> Self {
		self.with_asset(AssetType::Directive, name, Asset::Directive(Rc::new(def)))
	}

	pub fn with_filter(self, name: &str, f: impl Fn(&Value, &[Value]) -> Value + 'static) -> Self {
		self.with_asset(AssetType::Filter, name, Asset::Filter(FilterFn::new(f)))
	}

	fn with_asset(mut self, ty: AssetType, name: &str, asset: Asset) -> Self {
		let scope = match self.fields.get(ty.option_key()) {
			Some(OptionValue::Assets(scope)) => scope.clone(),
			_ => {
				let scope = AssetScope::new();
				self.insert(ty.option_key(), OptionValue::Assets(scope.clone()));
				scope
			}
		};
		scope.insert(name, asset);
		self
	}

	pub fn with_mixin(mut self, mixin: impl Into<Mixin>) -> Self {
		let mut mixins = match self.fields.get(keys::MIXINS) {
			Some(OptionValue::Mixins(m)) => m.to_vec(),
			_ => Vec::new(),
		};
		mixins.push(mixin.into());
		self.insert(keys::MIXINS, OptionValue::Mixins(mixins.into()));
		self
	}

	pub fn with_extends(self, base: impl Into<Mixin>) -> Self {
		self.with_option(keys::EXTENDS, OptionValue::Extends(base.into()))
	}

	pub fn with_el(self, target: &str) -> Self {
		self.with_value(keys::EL, Value::from(target))
	}

	pub fn with_props_data(self, data: DataMap) -> Self {
		self.with_value(keys::PROPS_DATA, Value::Object(data))
	}

	pub fn with_render(self, f: impl Fn(&Instance) -> crate::collab::VNode + 'static) -> Self {
		self.with_option(keys::RENDER, OptionValue::Render(RenderFn::new(f)))
	}

	/// Makes the instance created from this bag a child of `parent`.
	pub fn with_parent(self, parent: &Instance) -> Self {
		self.with_option(keys::PARENT, OptionValue::Parent(parent.link()))
	}

	fn own_table<T: Clone>(&self, key: &str, pick: impl Fn(&OptionValue) -> Option<&Rc<Table<T>>>) -> Table<T> {
		self.fields
			.get(key)
			.and_then(pick)
			.map(|t| (**t).clone())
			.unwrap_or_default()
	}
}

impl std::fmt::Debug for OptionBag {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut keys: Vec<&str> = self.own_keys().collect();
		keys.sort_unstable();
		f.debug_struct("OptionBag")
			.field("keys", &keys)
			.field("proto", &self.proto.is_some())
			.field("resolved", &self.resolved)
			.finish()
	}
}
