//! Capabilities the core consumes but does not implement.
//!
//! A root constructor is built with one [`Reactivity`] and one [`Renderer`];
//! every instance derived from it talks to those. The defaults keep the core
//! usable on its own: computed values are evaluated on each access and
//! mounting only advances lifecycle state.

use std::any::Any;
use std::rc::Rc;

use tessera_primitives::Uid;

use crate::error::HandlerResult;
use crate::instance::Instance;
use crate::options::{ComputedDef, DataMap, Value, WatchDef};

/// Opaque virtual node produced by render functions and owned by the renderer.
pub type VNode = Rc<dyn Any>;

/// Reactivity engine hooks used during state initialization.
pub trait Reactivity {
	/// Makes a freshly produced data map reactive.
	fn observe(&self, _data: &mut DataMap) {}

	/// Declares a reactive property on an instance (props, injections).
	fn define_reactive(&self, _vm: Uid, _key: &str, _value: &Value) {}

	/// Reads a computed property, typically through a per-instance cache.
	fn computed_value(&self, vm: &Instance, _key: &str, def: &ComputedDef) -> HandlerResult<Value> {
		def.evaluate(vm)
	}

	/// Registers a watcher for `key`.
	fn watch(&self, _vm: Uid, _key: &str, _def: &WatchDef) {}

	/// Drops every dependency owned by the instance.
	fn teardown(&self, _vm: Uid) {}
}

/// Renderer entry points.
pub trait Renderer {
	/// Mounts `vm` onto `target` (or renders it detached when `None`).
	fn mount(&self, vm: &mut Instance, target: Option<&str>) -> HandlerResult;

	/// Removes the rendered tree of a destroyed instance.
	fn teardown(&self, _vm: &mut Instance) {}
}

/// Reactivity that tracks nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct InertReactivity;

impl Reactivity for InertReactivity {}

/// Renderer that produces no output.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedRenderer;

impl Renderer for DetachedRenderer {
	fn mount(&self, _vm: &mut Instance, _target: Option<&str>) -> HandlerResult {
		Ok(())
	}
}

/// One child passed into a component, tagged with the slot it targets.
#[derive(Clone)]
pub struct SlotChild {
	/// `None` targets the default slot.
	pub slot: Option<Box<str>>,
	pub node: VNode,
}

impl std::fmt::Debug for SlotChild {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SlotChild").field("slot", &self.slot).finish_non_exhaustive()
	}
}
