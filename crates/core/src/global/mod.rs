//! Registration surface shared by every constructor: assets, global mixins,
//! plugins and config access.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tessera_primitives::{AssetType, camelize, capitalize, validate_component_name};
use tracing::{debug, info};

use crate::config::Config;
use crate::ctor::Ctor;
use crate::diag::{self, InstanceInfo};
use crate::error::{Error, HandlerError, HandlerResult, Result};
use crate::options::{
	Asset, AssetScope, ComponentAsset, Definition, DirectiveDef, MergeContext, OptionBag, OptionValue,
	Value, keys, merge_options,
};


/// A plugin object: installs itself onto a constructor.
pub trait Plugin {
	fn install(&self, ctor: &Ctor, args: &[Value]) -> HandlerResult;
}

type PluginFn = dyn Fn(&Ctor, &[Value]) -> HandlerResult;

/// Handle to a plugin. Installation is tracked by the identity of the shared
/// value, so keep and reuse the handle.
#[derive(Clone)]
pub enum PluginRef {
	Object(Rc<dyn Plugin>),
	Function(Rc<PluginFn>),
}

impl PluginRef {
	pub fn object(plugin: impl Plugin + 'static) -> Self {
		PluginRef::Object(Rc::new(plugin))
	}

	pub fn function(f: impl Fn(&Ctor, &[Value]) -> HandlerResult + 'static) -> Self {
		PluginRef::Function(Rc::new(f))
	}

	fn addr(&self) -> *const () {
		match self {
			PluginRef::Object(p) => Rc::as_ptr(p) as *const (),
			PluginRef::Function(f) => Rc::as_ptr(f) as *const (),
		}
	}

	pub fn same(&self, other: &PluginRef) -> bool {
		self.addr() == other.addr()
	}

	fn install(&self, ctor: &Ctor, args: &[Value]) -> HandlerResult {
		match self {
			PluginRef::Object(plugin) => plugin.install(ctor, args),
			PluginRef::Function(f) => f(ctor, args),
		}
	}
}

impl fmt::Debug for PluginRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PluginRef::Object(_) => write!(f, "PluginRef::Object({:p})", self.addr()),
			PluginRef::Function(_) => write!(f, "PluginRef::Function({:p})", self.addr()),
		}
	}
}

impl Ctor {
	/// Registers `def` as an asset named `id`, or looks `id` up when `def` is
	/// `None`.
	///
	/// Plain component definitions are derived from the root constructor,
	/// with `id` as their name unless they carry one. Bare directive
	/// functions become a directive running on `bind` and `update`.
	pub fn register(&self, ty: AssetType, id: &str, def: Option<Definition>) -> Option<Asset> {
		let Some(def) = def else {
			return self.options().assets(ty)?.get(id);
		};

		let config = self.runtime().config();
		if ty == AssetType::Component
			&& config.is_dev()
			&& let Err(err) = validate_component_name(id, |tag| config.is_reserved_tag(tag))
		{
			diag::warn_with(&config, &err.to_string(), None);
		}

		let asset = match (ty, def) {
			(AssetType::Component, Definition::Component(def)) => {
				if def.name().is_none() {
					def.update(|bag| {
						bag.insert(keys::NAME, OptionValue::value(Value::from(id)));
					});
				}
				Asset::Component(ComponentAsset::Ctor(self.base().extend(&def)))
			}
			(AssetType::Component, Definition::Ctor(ctor)) => Asset::Component(ComponentAsset::Ctor(ctor)),
			(AssetType::Directive, Definition::Directive(def)) => Asset::Directive(Rc::new(def)),
			(AssetType::Directive, Definition::DirectiveFn(hook)) => {
				Asset::Directive(Rc::new(DirectiveDef::from_fn(hook)))
			}
			(AssetType::Filter, Definition::Filter(f)) => Asset::Filter(f),
			(ty, _) => {
				diag::warn_with(
					&config,
					&format!("Invalid definition for {} \"{id}\".", ty.name()),
					None,
				);
				return None;
			}
		};
		self.own_scope(ty).insert(id, asset.clone());
		debug!(cid = %self.cid(), asset = ty.name(), id, "registered asset");
		Some(asset)
	}

	pub fn component(&self, id: &str, def: impl Into<Definition>) -> Option<Asset> {
		self.register(AssetType::Component, id, Some(def.into()))
	}

	pub fn directive(&self, id: &str, def: impl Into<Definition>) -> Option<Asset> {
		self.register(AssetType::Directive, id, Some(def.into()))
	}

	pub fn filter(&self, id: &str, def: impl Into<Definition>) -> Option<Asset> {
		self.register(AssetType::Filter, id, Some(def.into()))
	}

	/// Registration of `id`, including entries inherited from ancestors.
	pub fn lookup(&self, ty: AssetType, id: &str) -> Option<Asset> {
		self.register(ty, id, None)
	}

	/// Looks `id` up as given, camelized, then PascalCased.
	pub fn resolve_asset(&self, ty: AssetType, id: &str, warn_missing: bool) -> Option<Asset> {
		let options = self.resolve_options();
		let found = options.assets(ty).and_then(|scope| resolve_in_scope(scope, id));
		if found.is_none() && warn_missing {
			diag::warn(self.runtime(), &format!("Failed to resolve {}: {id}", ty.name()), None);
		}
		found
	}

	/// Merges `mixin` into this constructor's options.
	///
	/// The options get a new identity, which is what makes constructors
	/// derived earlier pick the mixin up on their next instantiation.
	pub fn mixin(&self, mixin: OptionBag) -> &Self {
		let config = self.runtime().config();
		let merged = merge_options(&self.options(), &mixin, &MergeContext::definition(&config));
		self.replace_options(merged);
		debug!(cid = %self.cid(), "applied mixin");
		self
	}

	/// Installs `plugin` once per constructor.
	///
	/// A failing install is reported and not recorded, so it can be retried.
	pub fn use_plugin(&self, plugin: &PluginRef, args: &[Value]) -> Result<&Self> {
		if self.installed_plugins().borrow().iter().any(|p| p.same(plugin)) {
			return Ok(self);
		}
		panic::catch_unwind(AssertUnwindSafe(|| plugin.install(self, args)))
			.unwrap_or_else(|payload| Err(HandlerError::from_panic(payload)))
			.map_err(Error::PluginInstall)?;
		self.installed_plugins().borrow_mut().push(plugin.clone());
		info!(cid = %self.cid(), plugin = ?plugin, "installed plugin");
		Ok(self)
	}

	pub fn is_installed(&self, plugin: &PluginRef) -> bool {
		self.installed_plugins().borrow().iter().any(|p| p.same(plugin))
	}

	/// Snapshot of the shared config.
	pub fn config(&self) -> Config {
		self.runtime().config()
	}

	/// Edits individual config fields.
	pub fn update_config(&self, f: impl FnOnce(&mut Config)) -> &Self {
		self.runtime().update_config(f);
		self
	}

	/// Replacing the config wholesale is not supported; the call is ignored.
	pub fn replace_config(&self, _config: Config) -> &Self {
		diag::warn(
			self.runtime(),
			"Do not replace the config object, set individual fields instead.",
			None,
		);
		self
	}

	/// This constructor's own asset scope for `ty`.
	fn own_scope(&self, ty: AssetType) -> AssetScope {
		if let Some(scope) = self.options().assets(ty) {
			return scope.clone();
		}
		let scope = AssetScope::new();
		self.set_option(ty.option_key(), OptionValue::Assets(scope.clone()));
		scope
	}
}

/// Own entries first, then the chain; each tried as given, camelized and
/// PascalCased.
pub(crate) fn resolve_in_scope(scope: &AssetScope, id: &str) -> Option<Asset> {
	let camel = camelize(id);
	let pascal = capitalize(&camel);
	let candidates = [id, camel.as_str(), pascal.as_str()];
	candidates
		.iter()
		.find_map(|c| scope.get_own(c))
		.or_else(|| candidates.iter().find_map(|c| scope.get(c)))
}

/// Warning sink for lookups made on behalf of an instance.
pub(crate) fn warn_unresolved(ctor: &Ctor, ty: AssetType, id: &str, vm: &InstanceInfo) {
	diag::warn(ctor.runtime(), &format!("Failed to resolve {}: {id}", ty.name()), Some(vm));
}
