//! Component constructors, option merging, instance lifecycle and events.
//!
//! # Overview
//!
//! - [`Ctor`] - constructor handles: the root built with [`RootBuilder`], and
//!   everything derived with [`Ctor::extend`]. Global registration (`mixin`,
//!   `use_plugin`, `component`, `directive`, `filter`) lives on every `Ctor`.
//! - [`options`] - option bags and the strategies [`merge_options`] applies
//!   per field.
//! - [`Instance`] - what [`Ctor::create`] returns: resolved options, state,
//!   lifecycle flags and the per-instance event registry.
//! - [`Config`] - runtime settings shared by a root and its descendants.
//!
//! Reactivity and rendering are not implemented here; plug them in through
//! [`Reactivity`] and [`Renderer`].
//!
//! ```ignore
//! let root = Ctor::root();
//! root.mixin(OptionBag::new().with_hook(LifecycleHook::Created, |vm| {
//!     vm.set_field("_flag", true);
//!     Ok(())
//! }));
//! let sub = root.extend(&OptionBag::new().with_name("sub").into());
//! let vm = sub.create(OptionBag::new());
//! assert_eq!(vm.field("_flag"), Some(&true.into()));
//! ```

pub mod collab;
pub mod config;
pub mod ctor;
pub mod diag;
pub mod error;
pub mod global;
pub mod instance;
pub mod options;

pub use collab::{DetachedRenderer, InertReactivity, Reactivity, Renderer, SlotChild, VNode};
pub use config::{Config, ConfigFile, Mode};
pub use ctor::{ComponentDef, Ctor, RootBuilder, resolve_modified_options};
pub use diag::InstanceInfo;
pub use error::{Error, HandlerError, HandlerResult, Result};
pub use global::{Plugin, PluginRef};
pub use instance::{
	EventNames, Handler, InitOptions, InitPhase, Instance, InternalComponentOptions, ParentLink,
};
pub use options::{
	Asset, ComputedDef, Definition, DirectiveDef, InjectDef, OptionBag, OptionValue, PropDef,
	PropType, Value, WatchDef, merge_options,
};
pub use tessera_primitives::{AssetType, Cid, LifecycleHook, Uid};
