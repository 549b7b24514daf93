use std::cell::RefCell;
use std::rc::Rc;

use tessera_primitives::{AssetType, Cid, validate_component_name};
use tracing::debug;

use super::{ComponentDef, Ctor, Derivation, Descriptor, DescriptorState};
use crate::ctor::AccessorTable;
use crate::diag;
use crate::options::{Asset, AssetScope, ComponentAsset, MergeContext, OptionBag, OptionValue, merge_options};

impl Ctor {
	/// Derives a constructor from this one.
	///
	/// Extending the same parent with the same definition again returns the
	/// constructor from the first call. The derived constructor registers
	/// itself under its name, so its templates can refer to it recursively.
	pub fn extend(&self, def: &ComponentDef) -> Ctor {
		if let Some(cached) = def.cached(self.cid()) {
			return cached;
		}

		let extension = def.options();
		let config = self.runtime().config();
		let name = extension.name().map(str::to_owned).or_else(|| self.name());
		if config.is_dev()
			&& let Some(name) = &name
			&& let Err(err) = validate_component_name(name, |tag| config.is_reserved_tag(tag))
		{
			diag::warn_with(&config, &err.to_string(), None);
		}

		let super_options = self.options();
		let mut options = merge_options(&super_options, &extension, &MergeContext::definition(&config));
		let cid = Cid::next();
		let descriptor = Rc::new_cyclic(|weak| {
			if let Some(name) = &name {
				register_self(&mut options, name, weak.clone());
			}
			let sealed_options = options.clone();
			Descriptor {
				cid,
				parent: Some(self.clone()),
				runtime: self.0.runtime.clone(),
				state: RefCell::new(DescriptorState {
					accessors: Rc::new(AccessorTable::from_options(&options)),
					options: Rc::new(options),
					derivation: Some(Derivation {
						super_options,
						extend_options: def.bag(),
						sealed_options,
					}),
				}),
				installed_plugins: RefCell::default(),
			}
		});
		let ctor = Ctor(descriptor);
		debug!(%cid, parent = %self.cid(), name = name.as_deref().unwrap_or("<anonymous>"), "derived constructor");
		def.cache(self.cid(), ctor.clone());
		ctor
	}
}

/// Registers the constructor behind `weak` under `name` in its own component
/// scope, creating the scope if the options have none.
pub(super) fn register_self(options: &mut OptionBag, name: &str, weak: std::rc::Weak<Descriptor>) {
	let key = AssetType::Component.option_key();
	let scope = match options.get_own(key) {
		Some(OptionValue::Assets(scope)) => scope.clone(),
		_ => {
			let scope = AssetScope::new();
			options.insert(key, OptionValue::Assets(scope.clone()));
			scope
		}
	};
	scope.insert(name, Asset::Component(ComponentAsset::SelfRef(weak)));
}
