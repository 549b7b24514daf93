//! Option bags, the values they hold, and the strategies that merge them.

mod assets;
mod bag;
mod defs;
pub mod merge;
mod value;

pub use assets::{Asset, AssetScope, ComponentAsset, Definition};
pub use bag::OptionBag;
pub use defs::{
	ComputedDef, DataFn, DirectiveBinding, DirectiveDef, DirectiveHook, FilterFn, Hook, InjectDef,
	Method, PropDef, PropDefault, PropType, RenderFn, WatchDef, WatchHandler,
};
pub use merge::{MergeContext, merge_options};
pub use value::{Mixin, OptionValue, Table};

/// Untyped values: data, props, event payloads.
pub type Value = serde_json::Value;

/// Object-shaped [`Value`], as produced by `data` and `provide`.
pub type DataMap = serde_json::Map<String, Value>;

/// Option keys with a dedicated strategy or reader.
pub mod keys {
	pub const NAME: &str = "name";
	pub const DATA: &str = "data";
	pub const PROPS: &str = "props";
	pub const PROPS_DATA: &str = "propsData";
	pub const METHODS: &str = "methods";
	pub const COMPUTED: &str = "computed";
	pub const WATCH: &str = "watch";
	pub const INJECT: &str = "inject";
	pub const PROVIDE: &str = "provide";
	pub const MIXINS: &str = "mixins";
	pub const EXTENDS: &str = "extends";
	pub const EL: &str = "el";
	pub const RENDER: &str = "render";
	pub const PARENT: &str = "parent";
	pub const PARENT_LISTENERS: &str = "_parentListeners";
	pub const RENDER_CHILDREN: &str = "_renderChildren";
	pub const COMPONENT_TAG: &str = "_componentTag";
}
