//! Callback and definition types carried by option bags.
//!
//! Every callback is reference counted: cloning keeps identity, which is what
//! hook de-duplication and listener removal compare.

use std::fmt;
use std::rc::Rc;

use crate::collab::VNode;
use crate::error::HandlerResult;
use crate::instance::Instance;
use crate::options::{DataMap, Value};

macro_rules! callback {
	($(#[$meta:meta])* $name:ident($($sig:tt)*)) => {
		$(#[$meta])*
		#[derive(Clone)]
		pub struct $name(Rc<$($sig)*>);

		impl $name {
			/// Returns true if both handles wrap the same callback.
			pub fn ptr_eq(&self, other: &Self) -> bool {
				Rc::ptr_eq(&self.0, &other.0)
			}
		}

		impl fmt::Debug for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, concat!(stringify!($name), "({:p})"), Rc::as_ptr(&self.0) as *const ())
			}
		}
	};
}

callback! {
	/// Lifecycle hook callback.
	Hook(dyn Fn(&mut Instance) -> HandlerResult)
}

impl Hook {
	pub fn new(f: impl Fn(&mut Instance) -> HandlerResult + 'static) -> Self {
		Self(Rc::new(f))
	}

	pub(crate) fn call(&self, vm: &mut Instance) -> HandlerResult {
		(self.0)(vm)
	}
}

callback! {
	/// Factory producing a per-instance map (`data`, `provide`).
	DataFn(dyn Fn(&Instance) -> HandlerResult<DataMap>)
}

impl DataFn {
	pub fn new(f: impl Fn(&Instance) -> HandlerResult<DataMap> + 'static) -> Self {
		Self(Rc::new(f))
	}

	/// Factory returning a fresh copy of `map` on every call.
	pub fn constant(map: DataMap) -> Self {
		Self::new(move |_| Ok(map.clone()))
	}

	pub(crate) fn call(&self, vm: &Instance) -> HandlerResult<DataMap> {
		(self.0)(vm)
	}
}

callback! {
	/// Instance method.
	Method(dyn Fn(&mut Instance, &[Value]) -> HandlerResult<Value>)
}

impl Method {
	pub fn new(f: impl Fn(&mut Instance, &[Value]) -> HandlerResult<Value> + 'static) -> Self {
		Self(Rc::new(f))
	}

	pub(crate) fn call(&self, vm: &mut Instance, args: &[Value]) -> HandlerResult<Value> {
		(self.0)(vm, args)
	}
}

callback! {
	/// Watcher callback: `(vm, new_value, old_value)`.
	WatchHandler(dyn Fn(&mut Instance, &Value, &Value) -> HandlerResult)
}

impl WatchHandler {
	pub fn new(f: impl Fn(&mut Instance, &Value, &Value) -> HandlerResult + 'static) -> Self {
		Self(Rc::new(f))
	}

	pub fn call(&self, vm: &mut Instance, new: &Value, old: &Value) -> HandlerResult {
		(self.0)(vm, new, old)
	}
}

callback! {
	/// Render function handed to the renderer.
	RenderFn(dyn Fn(&Instance) -> VNode)
}

impl RenderFn {
	pub fn new(f: impl Fn(&Instance) -> VNode + 'static) -> Self {
		Self(Rc::new(f))
	}

	pub fn call(&self, vm: &Instance) -> VNode {
		(self.0)(vm)
	}
}

callback! {
	/// Template filter: `(value, args) -> value`.
	FilterFn(dyn Fn(&Value, &[Value]) -> Value)
}

impl FilterFn {
	pub fn new(f: impl Fn(&Value, &[Value]) -> Value + 'static) -> Self {
		Self(Rc::new(f))
	}

	pub fn call(&self, value: &Value, args: &[Value]) -> Value {
		(self.0)(value, args)
	}
}

callback! {
	/// Directive hook, invoked by the renderer.
	DirectiveHook(dyn Fn(&DirectiveBinding))
}

impl DirectiveHook {
	pub fn new(f: impl Fn(&DirectiveBinding) + 'static) -> Self {
		Self(Rc::new(f))
	}

	pub fn call(&self, binding: &DirectiveBinding) {
		(self.0)(binding)
	}
}

/// What a directive hook sees of its usage site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveBinding {
	pub name: String,
	pub value: Value,
	pub old_value: Value,
	pub arg: Option<String>,
	pub modifiers: Vec<String>,
}

/// Normalized directive: every hook is optional.
#[derive(Debug, Clone, Default)]
pub struct DirectiveDef {
	pub bind: Option<DirectiveHook>,
	pub inserted: Option<DirectiveHook>,
	pub update: Option<DirectiveHook>,
	pub component_updated: Option<DirectiveHook>,
	pub unbind: Option<DirectiveHook>,
}

impl DirectiveDef {
	/// A bare function directive: runs on `bind` and on every `update`.
	pub fn from_fn(hook: DirectiveHook) -> Self {
		Self {
			bind: Some(hook.clone()),
			update: Some(hook),
			..Self::default()
		}
	}
}

/// Runtime type a prop value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropType {
	String,
	Number,
	Boolean,
	Array,
	Object,
}

impl PropType {
	pub fn matches(self, value: &Value) -> bool {
		match self {
			PropType::String => value.is_string(),
			PropType::Number => value.is_number(),
			PropType::Boolean => value.is_boolean(),
			PropType::Array => value.is_array(),
			PropType::Object => value.is_object(),
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			PropType::String => "String",
			PropType::Number => "Number",
			PropType::Boolean => "Boolean",
			PropType::Array => "Array",
			PropType::Object => "Object",
		}
	}

	pub(crate) fn of(value: &Value) -> &'static str {
		match value {
			Value::Null => "Null",
			Value::Bool(_) => "Boolean",
			Value::Number(_) => "Number",
			Value::String(_) => "String",
			Value::Array(_) => "Array",
			Value::Object(_) => "Object",
		}
	}
}

#[derive(Clone)]
pub enum PropDefault {
	Value(Value),
	/// Evaluated per instance, for values that must not be shared.
	Factory(Rc<dyn Fn() -> Value>),
}

impl PropDefault {
	pub fn resolve(&self) -> Value {
		match self {
			PropDefault::Value(v) => v.clone(),
			PropDefault::Factory(f) => f(),
		}
	}
}

impl fmt::Debug for PropDefault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PropDefault::Value(v) => f.debug_tuple("Value").field(v).finish(),
			PropDefault::Factory(_) => f.write_str("Factory(..)"),
		}
	}
}

/// Declared prop. An empty `types` list accepts any value.
#[derive(Clone, Default)]
pub struct PropDef {
	pub types: Vec<PropType>,
	pub required: bool,
	pub default: Option<PropDefault>,
	pub validator: Option<Rc<dyn Fn(&Value) -> bool>>,
}

impl PropDef {
	pub fn of(ty: PropType) -> Self {
		Self {
			types: vec![ty],
			..Self::default()
		}
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_default(mut self, value: Value) -> Self {
		self.default = Some(PropDefault::Value(value));
		self
	}

	pub fn with_default_factory(mut self, f: impl Fn() -> Value + 'static) -> Self {
		self.default = Some(PropDefault::Factory(Rc::new(f)));
		self
	}

	pub fn with_validator(mut self, f: impl Fn(&Value) -> bool + 'static) -> Self {
		self.validator = Some(Rc::new(f));
		self
	}

	pub(crate) fn accepts(&self, ty: PropType) -> bool {
		self.types.contains(&ty)
	}
}

impl fmt::Debug for PropDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PropDef")
			.field("types", &self.types)
			.field("required", &self.required)
			.field("default", &self.default)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

type ComputedGetter = Rc<dyn Fn(&Instance) -> HandlerResult<Value>>;
type ComputedSetter = Rc<dyn Fn(&mut Instance, Value) -> HandlerResult>;

/// Computed property: a getter plus an optional setter.
#[derive(Clone)]
pub struct ComputedDef {
	get: ComputedGetter,
	set: Option<ComputedSetter>,
	/// Whether the reactivity engine may cache the value between reads.
	pub cache: bool,
}

impl ComputedDef {
	pub fn new(get: impl Fn(&Instance) -> HandlerResult<Value> + 'static) -> Self {
		Self {
			get: Rc::new(get),
			set: None,
			cache: true,
		}
	}

	pub fn with_setter(mut self, set: impl Fn(&mut Instance, Value) -> HandlerResult + 'static) -> Self {
		self.set = Some(Rc::new(set));
		self
	}

	pub fn uncached(mut self) -> Self {
		self.cache = false;
		self
	}

	/// Runs the getter, bypassing any cache.
	pub fn evaluate(&self, vm: &Instance) -> HandlerResult<Value> {
		(self.get)(vm)
	}

	pub fn has_setter(&self) -> bool {
		self.set.is_some()
	}

	pub(crate) fn assign(&self, vm: &mut Instance, value: Value) -> Option<HandlerResult> {
		self.set.as_ref().map(|set| set(vm, value))
	}
}

impl fmt::Debug for ComputedDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ComputedDef")
			.field("setter", &self.set.is_some())
			.field("cache", &self.cache)
			.finish()
	}
}

/// Injection: the provided key to read and an optional fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectDef {
	pub from: Box<str>,
	pub default: Option<Value>,
}

impl InjectDef {
	pub fn from_key(from: impl Into<Box<str>>) -> Self {
		Self {
			from: from.into(),
			default: None,
		}
	}

	pub fn with_default(mut self, value: Value) -> Self {
		self.default = Some(value);
		self
	}
}

/// One watcher on a key.
#[derive(Debug, Clone)]
pub struct WatchDef {
	pub handler: WatchHandler,
	pub deep: bool,
	pub immediate: bool,
}

impl WatchDef {
	pub fn new(handler: impl Fn(&mut Instance, &Value, &Value) -> HandlerResult + 'static) -> Self {
		Self {
			handler: WatchHandler::new(handler),
			deep: false,
			immediate: false,
		}
	}

	pub fn deep(mut self) -> Self {
		self.deep = true;
		self
	}

	pub fn immediate(mut self) -> Self {
		self.immediate = true;
		self
	}
}
