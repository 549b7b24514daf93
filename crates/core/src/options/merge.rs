//! Per-field merge strategies for option bags.
//!
//! `merge_options` never mutates either input. Structural fields get their own
//! strategy, anything else is taken from the child when present.

use std::borrow::Cow;
use std::rc::Rc;

use tessera_primitives::{AssetType, LifecycleHook, validate_component_name};
use tracing::trace;

use crate::config::Config;
use crate::diag::{self, InstanceInfo};
use crate::error::{HandlerError, HandlerResult};
use crate::instance::Instance;
use crate::options::{AssetScope, DataFn, DataMap, Hook, OptionBag, OptionValue, Table, Value, keys};


/// Where a merge happens: while deriving a constructor, or while creating an
/// instance.
#[derive(Clone, Copy)]
pub struct MergeContext<'a> {
	config: &'a Config,
	vm: Option<&'a InstanceInfo>,
}

impl<'a> MergeContext<'a> {
	/// Merging two definitions (`extend`, `mixin`).
	pub fn definition(config: &'a Config) -> Self {
		Self { config, vm: None }
	}

	/// Merging an instance's raw options over its constructor's options.
	pub fn instance(config: &'a Config, vm: &'a InstanceInfo) -> Self {
		Self { config, vm: Some(vm) }
	}

	pub fn is_instance(&self) -> bool {
		self.vm.is_some()
	}

	fn warn(&self, msg: &str) {
		diag::warn_with(self.config, msg, self.vm);
	}
}

/// Merges `child` over `parent`.
///
/// `child`'s `extends` and `mixins` are folded into `parent` first, unless
/// `child` is itself the product of an earlier merge.
pub fn merge_options(parent: &OptionBag, child: &OptionBag, ctx: &MergeContext<'_>) -> OptionBag {
	if ctx.config.is_dev() {
		check_components(child, ctx);
	}

	let mut base = Cow::Borrowed(parent);
	if !child.is_resolved() {
		if let Some(extends) = child.extends() {
			let options = extends.options();
			base = Cow::Owned(merge_options(&base, &options, ctx));
		}
		for mixin in child.mixins().iter() {
			let options = mixin.options();
			base = Cow::Owned(merge_options(&base, &options, ctx));
		}
	}
	let parent = base.as_ref();

	let mut merged = OptionBag::new();
	merged.set_resolved(parent.is_resolved() || child.is_resolved());
	let mut fields = parent.keys();
	fields.extend(child.keys().into_iter().filter(|k| !parent.contains(k)));
	for key in fields {
		if let Some(value) = merge_field(&key, parent.get(&key), child.get(&key), ctx) {
			merged.insert(key, value);
		}
	}
	trace!(fields = merged.len(), instance = ctx.is_instance(), "merged options");
	merged
}

fn check_components(child: &OptionBag, ctx: &MergeContext<'_>) {
	let Some(scope) = child.get_own(AssetType::Component.option_key()) else {
		return;
	};
	let OptionValue::Assets(scope) = scope else {
		return;
	};
	for (name, _) in scope.flattened() {
		if let Err(err) = validate_component_name(&name, |tag| ctx.config.is_reserved_tag(tag)) {
			ctx.warn(&err.to_string());
		}
	}
}

/// Merges one field. `None` drops the key from the result.
pub fn merge_field(
	key: &str,
	parent: Option<&OptionValue>,
	child: Option<&OptionValue>,
	ctx: &MergeContext<'_>,
) -> Option<OptionValue> {
	if let Some(strategy) = ctx.config.option_merge_strategies.get(key) {
		return strategy(parent, child, key);
	}
	if LifecycleHook::from_name(key).is_some() {
		return merge_hooks(key, parent, child, ctx);
	}
	if AssetType::from_option_key(key).is_some() {
		return merge_assets(key, parent, child, ctx);
	}
	match key {
		keys::DATA | keys::PROVIDE => merge_data(key, parent, child, ctx),
		keys::PROPS | keys::METHODS | keys::INJECT | keys::COMPUTED => merge_tables(key, parent, child, ctx),
		keys::WATCH => merge_watch(key, parent, child, ctx),
		keys::EL | keys::PROPS_DATA => {
			if !ctx.is_instance() {
				ctx.warn(&format!(
					"option \"{key}\" can only be used during instance creation."
				));
			}
			default_strategy(parent, child)
		}
		_ => default_strategy(parent, child),
	}
}

fn default_strategy(parent: Option<&OptionValue>, child: Option<&OptionValue>) -> Option<OptionValue> {
	child.or(parent).cloned()
}

/// Warns about a value of the wrong shape and lets it win as-is.
fn mismatch(key: &str, expected: &str, got: &OptionValue, ctx: &MergeContext<'_>) -> Option<OptionValue> {
	ctx.warn(&format!(
		"Invalid value for option \"{key}\": expected {expected}, got {}.",
		got.kind()
	));
	Some(got.clone())
}

fn merge_data(
	key: &str,
	parent: Option<&OptionValue>,
	child: Option<&OptionValue>,
	ctx: &MergeContext<'_>,
) -> Option<OptionValue> {
	let Some(child) = child else {
		return parent.cloned();
	};
	if !ctx.is_instance() && !matches!(child, OptionValue::Data(_)) {
		ctx.warn(&format!(
			"The \"{key}\" option should be a function that returns a per-instance value in component definitions."
		));
		return parent.cloned();
	}
	if !matches!(child, OptionValue::Data(_) | OptionValue::Value(_)) {
		return mismatch(key, "data factory", child, ctx);
	}
	let Some(parent) = parent else {
		return Some(child.clone());
	};
	let (parent, child) = (parent.clone(), child.clone());
	Some(OptionValue::Data(DataFn::new(move |vm| {
		let own = resolve_data(&child, vm)?;
		let mut merged = resolve_data(&parent, vm)?;
		merged.extend(own);
		Ok(merged)
	})))
}

/// Produces the map behind a `data`/`provide` field.
pub(crate) fn resolve_data(value: &OptionValue, vm: &Instance) -> HandlerResult<DataMap> {
	match value {
		OptionValue::Data(f) => f.call(vm),
		OptionValue::Value(v) => match &**v {
			Value::Object(map) => Ok(map.clone()),
			Value::Null => Ok(DataMap::new()),
			other => Err(HandlerError::msg(format!(
				"data should be an object, got {}",
				crate::options::PropType::of(other)
			))),
		},
		other => Err(HandlerError::msg(format!("data cannot be produced from {}", other.kind()))),
	}
}

fn merge_tables(
	key: &str,
	parent: Option<&OptionValue>,
	child: Option<&OptionValue>,
	ctx: &MergeContext<'_>,
) -> Option<OptionValue> {
	use OptionValue as V;
	match (parent, child) {
		(parent, None) => parent.cloned(),
		(None, Some(child)) => Some(child.clone()),
		(Some(V::Props(p)), Some(V::Props(c))) => Some(V::Props(extend_table(p, c))),
		(Some(V::Methods(p)), Some(V::Methods(c))) => Some(V::Methods(extend_table(p, c))),
		(Some(V::Inject(p)), Some(V::Inject(c))) => Some(V::Inject(extend_table(p, c))),
		(Some(V::Computed(p)), Some(V::Computed(c))) => Some(V::Computed(extend_table(p, c))),
		(Some(parent), Some(child)) => mismatch(key, parent.kind(), child, ctx),
	}
}

fn extend_table<T: Clone>(parent: &Rc<Table<T>>, child: &Rc<Table<T>>) -> Rc<Table<T>> {
	let mut table = (**parent).clone();
	table.extend(child.iter().map(|(k, v)| (k.clone(), v.clone())));
	Rc::new(table)
}

fn merge_watch(
	key: &str,
	parent: Option<&OptionValue>,
	child: Option<&OptionValue>,
	ctx: &MergeContext<'_>,
) -> Option<OptionValue> {
	match (parent, child) {
		(parent, None) => parent.cloned(),
		(None, Some(child)) => Some(child.clone()),
		(Some(OptionValue::Watch(p)), Some(OptionValue::Watch(c))) => {
			let mut table = (**p).clone();
			for (name, watchers) in c.iter() {
				let combined: Rc<[_]> = match table.get(name) {
					Some(existing) => existing.iter().chain(watchers.iter()).cloned().collect(),
					None => watchers.clone(),
				};
				table.insert(name.clone(), combined);
			}
			Some(OptionValue::Watch(Rc::new(table)))
		}
		(Some(parent), Some(child)) => mismatch(key, parent.kind(), child, ctx),
	}
}

fn merge_hooks(
	key: &str,
	parent: Option<&OptionValue>,
	child: Option<&OptionValue>,
	ctx: &MergeContext<'_>,
) -> Option<OptionValue> {
	let hooks = match (parent, child) {
		(None, None) => return None,
		(Some(OptionValue::Hooks(p)), None) => p.clone(),
		(None, Some(OptionValue::Hooks(c))) => c.clone(),
		(Some(OptionValue::Hooks(p)), Some(OptionValue::Hooks(c))) => {
			p.iter().chain(c.iter()).cloned().collect()
		}
		(_, Some(other)) | (Some(other), None) => return mismatch(key, "hooks", other, ctx),
	};
	Some(OptionValue::Hooks(dedupe_hooks(hooks)))
}

/// Drops repeated handlers, keeping the first occurrence of each.
pub(crate) fn dedupe_hooks(hooks: Rc<[Hook]>) -> Rc<[Hook]> {
	let mut unique: Vec<Hook> = Vec::with_capacity(hooks.len());
	for hook in hooks.iter() {
		if !unique.iter().any(|seen| seen.ptr_eq(hook)) {
			unique.push(hook.clone());
		}
	}
	if unique.len() == hooks.len() {
		hooks
	} else {
		unique.into()
	}
}

/// Chains a fresh scope onto the parent's. The child's entries are copied in,
/// the parent's stay where they are.
fn merge_assets(
	key: &str,
	parent: Option<&OptionValue>,
	child: Option<&OptionValue>,
	ctx: &MergeContext<'_>,
) -> Option<OptionValue> {
	let parent_scope = match parent {
		Some(OptionValue::Assets(scope)) => Some(scope),
		None => None,
		Some(other) => return mismatch(key, "assets", child.unwrap_or(other), ctx),
	};
	let entries = match child {
		Some(OptionValue::Assets(scope)) => scope.flattened(),
		None => Vec::new(),
		Some(other) => return mismatch(key, "assets", other, ctx),
	};
	Some(OptionValue::Assets(AssetScope::chained(parent_scope, entries)))
}
