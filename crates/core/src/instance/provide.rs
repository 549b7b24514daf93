use std::cell::RefCell;
use std::rc::Rc;

use crate::options::{DataMap, Value};

/// Values an instance provides to its descendants, chained to what its own
/// ancestors provide.
#[derive(Debug, Default)]
pub struct ProvideScope {
	own: RefCell<DataMap>,
	parent: Option<Rc<ProvideScope>>,
}

impl ProvideScope {
	pub(crate) fn child_of(parent: Option<Rc<ProvideScope>>) -> Rc<Self> {
		Rc::new(Self {
			own: RefCell::default(),
			parent,
		})
	}

	/// Nearest provider of `key`.
	pub fn lookup(&self, key: &str) -> Option<Value> {
		if let Some(value) = self.own.borrow().get(key) {
			return Some(value.clone());
		}
		self.parent.as_deref()?.lookup(key)
	}

	pub fn own(&self) -> DataMap {
		self.own.borrow().clone()
	}

	pub(crate) fn replace(&self, provided: DataMap) {
		*self.own.borrow_mut() = provided;
	}
}
