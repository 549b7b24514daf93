//! Shared primitives for the tessera component core.
//!
//! Nothing in here knows about option bags or instances; these are the plain
//! building blocks (identifiers, asset kinds, hook names, string helpers and
//! component-name validation) the core crate is written against.

/// Asset registry kinds.
pub mod asset;
/// Lifecycle hook names.
pub mod hook;
/// Identifier newtypes.
pub mod ids;
/// Component name validation and reserved tag tables.
pub mod name;
/// Case conversion helpers used in diagnostics and asset lookup.
pub mod strings;

pub use asset::AssetType;
pub use hook::{HOOK_EVENT_PREFIX, LifecycleHook};
pub use ids::{Cid, Uid};
pub use name::{NameError, is_builtin_tag, is_reserved_html_tag, validate_component_name};
pub use strings::{camelize, capitalize, classify, format_component_name, hyphenate};
