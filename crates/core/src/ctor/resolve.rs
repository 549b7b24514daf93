//! Late-modification detection and re-resolution.

use std::rc::Rc;

use tessera_primitives::AssetType;
use tracing::debug;

use super::Ctor;
use super::extend::register_self;
use crate::ctor::AccessorTable;
use crate::options::{MergeContext, OptionBag, OptionValue, merge_options};

impl Ctor {
	/// Options in effect for a new instance of this constructor.
	///
	/// Walks up to the root. When an ancestor's options were replaced since
	/// this constructor was derived (a later global `mixin`, say), the fields
	/// changed on this constructor after derivation are folded back into its
	/// extension input and the options are merged again from the ancestor's
	/// current ones.
	pub fn resolve_options(&self) -> Rc<OptionBag> {
		let Some(parent) = self.parent() else {
			return self.options();
		};
		let super_options = parent.resolve_options();

		let (latest, sealed, extend_options) = {
			let state = self.0.state.borrow();
			let Some(derivation) = &state.derivation else {
				return state.options.clone();
			};
			if Rc::ptr_eq(&derivation.super_options, &super_options) {
				return state.options.clone();
			}
			(
				state.options.clone(),
				derivation.sealed_options.clone(),
				derivation.extend_options.clone(),
			)
		};

		let modified = resolve_modified_options(&latest, &sealed);
		debug!(cid = %self.cid(), modified = modified.len(), "ancestor options changed, re-resolving");
		let extension = {
			let mut extension = extend_options.borrow_mut();
			for (key, value) in modified {
				extension.insert(key, value);
			}
			extension.clone()
		};

		let config = self.runtime().config();
		let mut options = merge_options(&super_options, &extension, &MergeContext::definition(&config));
		carry_registered_assets(&latest, &options);
		if let Some(name) = options.name().map(str::to_owned) {
			register_self(&mut options, &name, self.downgrade());
		}

		let options = Rc::new(options);
		let mut state = self.0.state.borrow_mut();
		state.accessors = Rc::new(AccessorTable::from_options(&options));
		state.options = options.clone();
		if let Some(derivation) = &mut state.derivation {
			derivation.super_options = super_options;
			derivation.sealed_options = (*options).clone();
		}
		options
	}
}

/// Fields of `latest` whose value is not the same handle as in `sealed`.
///
/// The comparison is shallow: a field counts as modified when it was
/// replaced, not when something inside it changed.
pub fn resolve_modified_options(latest: &OptionBag, sealed: &OptionBag) -> Vec<(Box<str>, OptionValue)> {
	let mut modified: Vec<(Box<str>, OptionValue)> = latest
		.keys()
		.into_iter()
		.filter_map(|key| {
			let value = latest.get(&key)?;
			match sealed.get(&key) {
				Some(old) if old.same(value) => None,
				_ => Some((key, value.clone())),
			}
		})
		.collect();
	modified.sort_by(|a, b| a.0.cmp(&b.0));
	modified
}

/// Copies entries registered directly on the previous option scopes into the
/// re-merged ones, where the new scope does not define them itself.
fn carry_registered_assets(previous: &OptionBag, merged: &OptionBag) {
	for ty in AssetType::ALL {
		let (Some(old), Some(new)) = (previous.assets(ty), merged.assets(ty)) else {
			continue;
		};
		for id in old.own_keys() {
			if new.get_own(&id).is_none()
				&& let Some(asset) = old.get_own(&id)
			{
				new.insert(id, asset);
			}
		}
	}
}
