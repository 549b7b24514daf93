//! Per-instance synchronous events.
//!
//! Handlers run in registration order before [`Instance::emit`] returns. A
//! failing handler is reported through the error handler and does not stop
//! the others.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap as HashMap;
use tessera_primitives::{HOOK_EVENT_PREFIX, hyphenate};

use super::Instance;
use crate::diag;
use crate::error::HandlerResult;
use crate::options::Value;

#[cfg(test)]
mod tests;

type HandlerFn = dyn Fn(&mut Instance, &[Value]) -> HandlerResult;

/// Event handler. Clones share identity, which is what [`Instance::off`]
/// matches on.
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
	pub fn new(f: impl Fn(&mut Instance, &[Value]) -> HandlerResult + 'static) -> Self {
		Self(Rc::new(f))
	}

	pub fn ptr_eq(&self, other: &Handler) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	pub fn call(&self, vm: &mut Instance, args: &[Value]) -> HandlerResult {
		(self.0)(vm, args)
	}
}

impl fmt::Debug for Handler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Handler({:p})", Rc::as_ptr(&self.0) as *const ())
	}
}

/// One event name or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNames(Vec<Box<str>>);

impl EventNames {
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(AsRef::as_ref)
	}
}

impl From<&str> for EventNames {
	fn from(name: &str) -> Self {
		Self(vec![name.into()])
	}
}

impl From<String> for EventNames {
	fn from(name: String) -> Self {
		Self(vec![name.into()])
	}
}

impl From<&[&str]> for EventNames {
	fn from(names: &[&str]) -> Self {
		Self(names.iter().map(|&n| n.into()).collect())
	}
}

impl<const N: usize> From<[&str; N]> for EventNames {
	fn from(names: [&str; N]) -> Self {
		Self(names.into_iter().map(Into::into).collect())
	}
}

impl From<Vec<&str>> for EventNames {
	fn from(names: Vec<&str>) -> Self {
		Self(names.into_iter().map(Into::into).collect())
	}
}

/// A registered handler. Once-entries are dropped before their first call;
/// they still match the handler they were registered with.
struct Listener {
	handler: Handler,
	once: bool,
}

#[derive(Default)]
pub(crate) struct Events {
	map: HashMap<Box<str>, Vec<Rc<Listener>>>,
	/// Set once any `hook:` listener is added, so hook dispatch can skip the
	/// lookup otherwise.
	has_hook_event: bool,
}

impl Events {
	pub(crate) fn has_hook_event(&self) -> bool {
		self.has_hook_event
	}

	fn add(&mut self, name: &str, handler: &Handler, once: bool) {
		self.map.entry(name.into()).or_default().push(Rc::new(Listener {
			handler: handler.clone(),
			once,
		}));
		if name.starts_with(HOOK_EVENT_PREFIX) {
			self.has_hook_event = true;
		}
	}

	/// Removes the last entry registered with `handler`.
	fn remove_handler(&mut self, name: &str, handler: &Handler) {
		let Some(listeners) = self.map.get_mut(name) else {
			return;
		};
		if let Some(pos) = listeners.iter().rposition(|l| l.handler.ptr_eq(handler)) {
			listeners.remove(pos);
		}
	}

	fn remove_entry(&mut self, name: &str, entry: &Rc<Listener>) {
		let Some(listeners) = self.map.get_mut(name) else {
			return;
		};
		if let Some(pos) = listeners.iter().rposition(|l| Rc::ptr_eq(l, entry)) {
			listeners.remove(pos);
		}
	}

	pub(crate) fn len(&self, name: &str) -> usize {
		self.map.get(name).map_or(0, Vec::len)
	}
}

impl Instance {
	/// Registers `handler` for each name.
	pub fn on(&mut self, names: impl Into<EventNames>, handler: &Handler) -> &mut Self {
		for name in names.into().iter() {
			self.events.add(name, handler, false);
		}
		self
	}

	/// Registers `handler` for a single call. `off(name, handler)` with the
	/// same handler removes it before that call happens.
	pub fn once(&mut self, name: &str, handler: &Handler) -> &mut Self {
		self.events.add(name, handler, true);
		self
	}

	/// Removes handlers: with a handler, its most recent registration under
	/// each name; without one, every handler under each name.
	pub fn off(&mut self, names: impl Into<EventNames>, handler: Option<&Handler>) -> &mut Self {
		for name in names.into().iter() {
			match handler {
				Some(handler) => self.events.remove_handler(name, handler),
				None => {
					self.events.map.remove(name);
				}
			}
		}
		self
	}

	/// Removes every handler for every event.
	pub fn off_all(&mut self) -> &mut Self {
		self.events.map.clear();
		self
	}

	/// Number of handlers registered for `name`.
	pub fn listener_count(&self, name: &str) -> usize {
		self.events.len(name)
	}

	/// Calls every handler registered for `name`, in registration order.
	///
	/// Handlers added or removed while the event is being delivered take
	/// effect from the next emit.
	pub fn emit(&mut self, name: &str, args: &[Value]) -> &mut Self {
		let lower = name.to_lowercase();
		if lower != name && self.events.map.contains_key(lower.as_str()) {
			diag::tip(
				self.ctor.runtime(),
				&format!(
					"Event \"{lower}\" is emitted in component {} but the handler is registered for \"{name}\". \
					 Note that HTML attributes are case-insensitive and you cannot use v-on to listen to camelCase events when using in-DOM templates. \
					 You should probably use \"{}\" instead of \"{name}\".",
					self.info().display_name(),
					hyphenate(name),
				),
				Some(&self.info()),
			);
		}

		let Some(listeners) = self.events.map.get(name) else {
			return self;
		};
		let snapshot: Vec<Rc<Listener>> = listeners.clone();
		let info = format!("event handler for \"{name}\"");
		for listener in snapshot {
			if listener.once {
				self.events.remove_entry(name, &listener);
			}
			diag::invoke_with_error_handling(self, &info, |vm| listener.handler.call(vm, args));
		}
		self
	}
}
