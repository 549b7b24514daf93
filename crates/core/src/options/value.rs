use std::any::Any;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap as HashMap;

use crate::collab::SlotChild;
use crate::ctor::Ctor;
use crate::instance::{Handler, ParentLink};
use crate::options::{
	AssetScope, ComputedDef, DataFn, Hook, InjectDef, Method, OptionBag, PropDef, RenderFn, Value,
	WatchDef,
};

/// Name-keyed table used by the map-shaped options.
pub type Table<T> = HashMap<Box<str>, T>;

/// Value of one option field.
///
/// Every variant is a cheap handle; [`OptionValue::same`] compares identity,
/// which is what late-modification detection relies on.
#[derive(Clone)]
pub enum OptionValue {
	/// Plain data: `name`, `el`, `propsData`, user-defined fields.
	Value(Rc<Value>),
	/// `data` and `provide` factories.
	Data(DataFn),
	Props(Rc<Table<PropDef>>),
	Methods(Rc<Table<Method>>),
	Computed(Rc<Table<ComputedDef>>),
	Inject(Rc<Table<InjectDef>>),
	/// Watchers per key, always normalized to a sequence.
	Watch(Rc<Table<Rc<[WatchDef]>>>),
	Hooks(Rc<[Hook]>),
	Assets(AssetScope),
	Mixins(Rc<[Mixin]>),
	Extends(Mixin),
	Render(RenderFn),
	/// Listeners attached by the parent (internal creation).
	Listeners(Rc<[(Box<str>, Handler)]>),
	/// Children passed to the component (internal creation).
	Children(Rc<[SlotChild]>),
	Parent(ParentLink),
	/// Anything else; pair it with a custom merge strategy when it needs one.
	Custom(Rc<dyn Any>),
}

impl OptionValue {
	pub fn value(value: Value) -> Self {
		OptionValue::Value(Rc::new(value))
	}

	/// Identity comparison: true when both hold the same underlying handle.
	pub fn same(&self, other: &OptionValue) -> bool {
		use OptionValue as V;
		match (self, other) {
			(V::Value(a), V::Value(b)) => Rc::ptr_eq(a, b),
			(V::Data(a), V::Data(b)) => a.ptr_eq(b),
			(V::Props(a), V::Props(b)) => Rc::ptr_eq(a, b),
			(V::Methods(a), V::Methods(b)) => Rc::ptr_eq(a, b),
			(V::Computed(a), V::Computed(b)) => Rc::ptr_eq(a, b),
			(V::Inject(a), V::Inject(b)) => Rc::ptr_eq(a, b),
			(V::Watch(a), V::Watch(b)) => Rc::ptr_eq(a, b),
			(V::Hooks(a), V::Hooks(b)) => Rc::ptr_eq(a, b),
			(V::Assets(a), V::Assets(b)) => a.ptr_eq(b),
			(V::Mixins(a), V::Mixins(b)) => Rc::ptr_eq(a, b),
			(V::Extends(a), V::Extends(b)) => a.ptr_eq(b),
			(V::Render(a), V::Render(b)) => a.ptr_eq(b),
			(V::Listeners(a), V::Listeners(b)) => Rc::ptr_eq(a, b),
			(V::Children(a), V::Children(b)) => Rc::ptr_eq(a, b),
			(V::Parent(a), V::Parent(b)) => a.same(b),
			(V::Custom(a), V::Custom(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}

	pub fn kind(&self) -> &'static str {
		match self {
			OptionValue::Value(_) => "value",
			OptionValue::Data(_) => "data factory",
			OptionValue::Props(_) => "props",
			OptionValue::Methods(_) => "methods",
			OptionValue::Computed(_) => "computed",
			OptionValue::Inject(_) => "inject",
			OptionValue::Watch(_) => "watch",
			OptionValue::Hooks(_) => "hooks",
			OptionValue::Assets(_) => "assets",
			OptionValue::Mixins(_) => "mixins",
			OptionValue::Extends(_) => "extends",
			OptionValue::Render(_) => "render",
			OptionValue::Listeners(_) => "listeners",
			OptionValue::Children(_) => "children",
			OptionValue::Parent(_) => "parent",
			OptionValue::Custom(_) => "custom",
		}
	}

	pub fn as_value(&self) -> Option<&Value> {
		match self {
			OptionValue::Value(v) => Some(v),
			_ => None,
		}
	}
}

impl From<Value> for OptionValue {
	fn from(value: Value) -> Self {
		OptionValue::value(value)
	}
}

impl fmt::Debug for OptionValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OptionValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
			OptionValue::Props(t) => f.debug_tuple("Props").field(&sorted_keys(t)).finish(),
			OptionValue::Methods(t) => f.debug_tuple("Methods").field(&sorted_keys(t)).finish(),
			OptionValue::Computed(t) => f.debug_tuple("Computed").field(&sorted_keys(t)).finish(),
			OptionValue::Inject(t) => f.debug_tuple("Inject").field(&sorted_keys(t)).finish(),
			OptionValue::Watch(t) => f.debug_tuple("Watch").field(&sorted_keys(t)).finish(),
			OptionValue::Hooks(h) => write!(f, "Hooks[{}]", h.len()),
			OptionValue::Assets(scope) => fmt::Debug::fmt(scope, f),
			OptionValue::Mixins(m) => write!(f, "Mixins[{}]", m.len()),
			other => write!(f, "{}(..)", other.kind()),
		}
	}
}

fn sorted_keys<T>(table: &Table<T>) -> Vec<&str> {
	let mut keys: Vec<&str> = table.keys().map(AsRef::as_ref).collect();
	keys.sort_unstable();
	keys
}

/// A bag folded in through `mixins` or `extends`.
#[derive(Clone)]
pub enum Mixin {
	Options(Rc<OptionBag>),
	/// A constructor contributes its current options.
	Ctor(Ctor),
}

impl Mixin {
	pub fn options(&self) -> Rc<OptionBag> {
		match self {
			Mixin::Options(bag) => bag.clone(),
			Mixin::Ctor(ctor) => ctor.options(),
		}
	}

	pub fn ptr_eq(&self, other: &Mixin) -> bool {
		match (self, other) {
			(Mixin::Options(a), Mixin::Options(b)) => Rc::ptr_eq(a, b),
			(Mixin::Ctor(a), Mixin::Ctor(b)) => a.ptr_eq(b),
			_ => false,
		}
	}
}

impl From<OptionBag> for Mixin {
	fn from(bag: OptionBag) -> Self {
		Mixin::Options(Rc::new(bag))
	}
}

impl From<Ctor> for Mixin {
	fn from(ctor: Ctor) -> Self {
		Mixin::Ctor(ctor)
	}
}
