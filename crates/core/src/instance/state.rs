//! Injections, props, methods, data, computed, watchers and provide.

use tessera_primitives::hyphenate;

use super::{Instance, is_reserved_key};
use crate::ctor::Accessor;
use crate::diag;
use crate::options::merge::resolve_data;
use crate::options::{DataMap, PropDef, PropDefault, PropType, Value};

/// Attribute names the renderer keeps for itself.
const RESERVED_ATTRS: &[&str] = &["key", "ref", "slot", "slot-scope", "is"];

impl Instance {
	pub(super) fn init_injections(&mut self) {
		let Some(inject) = self.options.inject().cloned() else {
			return;
		};
		let reactivity = self.ctor.runtime().reactivity.clone();
		let mut keys: Vec<&Box<str>> = inject.keys().collect();
		keys.sort_unstable();
		for key in keys {
			let def = &inject[key];
			let value = match self.provided.lookup(&def.from) {
				Some(value) => value,
				None => match &def.default {
					Some(default) => default.clone(),
					None => {
						self.warn(&format!("Injection \"{key}\" not found"));
						continue;
					}
				},
			};
			reactivity.define_reactive(self.uid, key, &value);
			self.injected.insert(key.to_string(), value);
		}
	}

	pub(super) fn init_props(&mut self) {
		let Some(props) = self.options.props().cloned() else {
			return;
		};
		let props_data = self.options.props_data().cloned().unwrap_or_default();
		let reactivity = self.ctor.runtime().reactivity.clone();
		let ctor_accessors = self.ctor.accessors();
		let dev = self.ctor.runtime().with_config(|c| c.is_dev());

		for (key, def) in props.iter() {
			let value = self.validate_prop(key, def, &props_data, dev);
			if dev {
				let hyphenated = hyphenate(key);
				if RESERVED_ATTRS.contains(&hyphenated.as_str()) {
					self.warn(&format!(
						"\"{hyphenated}\" is a reserved attribute and cannot be used as component prop."
					));
				}
			}
			reactivity.define_reactive(self.uid, key, &value);
			self.props.insert(key.to_string(), value);
			if !ctor_accessors.contains(key) {
				self.own_accessors.insert(key.clone(), Accessor::Prop);
			}
		}
	}

	/// Value for one prop: the passed value, boolean casting, or the default.
	fn validate_prop(&self, key: &str, def: &PropDef, props_data: &DataMap, dev: bool) -> Value {
		let absent = !props_data.contains_key(key);
		let mut value = props_data.get(key).cloned();

		if let Some(boolean) = def.types.iter().position(|&t| t == PropType::Boolean) {
			if absent && def.default.is_none() {
				value = Some(Value::Bool(false));
			} else if let Some(Value::String(s)) = &value
				&& (s.is_empty() || *s == hyphenate(key))
			{
				let string = def.types.iter().position(|&t| t == PropType::String);
				if string.is_none_or(|string| boolean < string) {
					value = Some(Value::Bool(true));
				}
			}
		}

		let value = match value {
			Some(value) => value,
			None => self.prop_default(key, def, dev),
		};
		if dev {
			self.assert_prop(key, def, &value, absent);
		}
		value
	}

	fn prop_default(&self, key: &str, def: &PropDef, dev: bool) -> Value {
		match &def.default {
			None => Value::Null,
			Some(PropDefault::Value(value)) => {
				if dev && (value.is_object() || value.is_array()) {
					self.warn(&format!(
						"Invalid default value for prop \"{key}\": Props with type Object/Array must use a factory function to return the default value."
					));
				}
				value.clone()
			}
			Some(factory) => factory.resolve(),
		}
	}

	fn assert_prop(&self, key: &str, def: &PropDef, value: &Value, absent: bool) {
		if def.required && absent {
			self.warn(&format!("Missing required prop: \"{key}\""));
			return;
		}
		if value.is_null() && !def.required {
			return;
		}
		if !def.types.is_empty() && !def.types.iter().any(|t| t.matches(value)) {
			let expected: Vec<&str> = def.types.iter().map(|t| t.name()).collect();
			self.warn(&format!(
				"Invalid prop: type check failed for prop \"{key}\". Expected {}, got {}",
				expected.join(", "),
				PropType::of(value)
			));
			return;
		}
		if let Some(validator) = &def.validator
			&& !validator(value)
		{
			self.warn(&format!("Invalid prop: custom validator check failed for prop \"{key}\"."));
		}
	}

	pub(super) fn init_methods(&mut self) {
		let Some(methods) = self.options.methods().cloned() else {
			return;
		};
		for key in methods.keys() {
			if self.props.contains_key(&**key) {
				self.warn(&format!("Method \"{key}\" has already been defined as a prop."));
			}
			if is_reserved_key(key) {
				self.warn(&format!(
					"Method \"{key}\" conflicts with an existing instance method. Avoid defining component methods that start with _ or $."
				));
			}
		}
		self.methods = methods;
	}

	pub(super) fn init_data(&mut self) {
		let Some(source) = self.options.data().cloned() else {
			return;
		};
		let mut data = diag::invoke_with_error_handling(self, "data()", |vm| resolve_data(&source, vm))
			.unwrap_or_default();
		for key in data.keys() {
			if self.methods.contains_key(key.as_str()) {
				self.warn(&format!("Method \"{key}\" has already been defined as a data property."));
			}
			if self.props.contains_key(key) {
				self.warn(&format!(
					"The data property \"{key}\" is already declared as a prop. Use prop default value instead."
				));
			}
		}
		self.ctor.runtime().reactivity.observe(&mut data);
		self.data = data;
	}

	pub(super) fn init_computed(&mut self) {
		let Some(computed) = self.options.computed().cloned() else {
			return;
		};
		let ctor_accessors = self.ctor.accessors();
		for (key, def) in computed.iter() {
			if ctor_accessors.contains(key) {
				continue;
			}
			if self.data.contains_key(&**key) {
				self.warn(&format!("The computed property \"{key}\" is already defined in data."));
			} else if self.props.contains_key(&**key) {
				self.warn(&format!("The computed property \"{key}\" is already defined as a prop."));
			} else if self.methods.contains_key(key) {
				self.warn(&format!("The computed property \"{key}\" is already defined as a method."));
			} else {
				self.own_accessors.insert(key.clone(), Accessor::Computed(def.clone()));
			}
		}
	}

	pub(super) fn init_watch(&mut self) {
		let Some(watch) = self.options.watch().cloned() else {
			return;
		};
		let reactivity = self.ctor.runtime().reactivity.clone();
		let mut keys: Vec<&Box<str>> = watch.keys().collect();
		keys.sort_unstable();
		for key in keys {
			for def in watch[key].iter() {
				reactivity.watch(self.uid, key, def);
				if def.immediate {
					let value = self.get(key).unwrap_or(Value::Null);
					let info = format!("callback for immediate watcher \"{key}\"");
					diag::invoke_with_error_handling(self, &info, |vm| {
						def.handler.call(vm, &value, &Value::Null)
					});
				}
			}
		}
	}

	pub(super) fn init_provide(&mut self) {
		let Some(source) = self.options.provide().cloned() else {
			return;
		};
		if let Some(provided) = diag::invoke_with_error_handling(self, "provide()", |vm| resolve_data(&source, vm)) {
			self.provided.replace(provided);
		}
	}
}
