use pretty_assertions::assert_eq;
use serde_json::json;
use tessera_primitives::LifecycleHook;

use super::*;
use crate::options::{ComputedDef, PropDef, PropType, Value};

fn def(bag: OptionBag) -> ComponentDef {
	ComponentDef::from(bag)
}

#[test]
fn test_extend_is_cached_per_parent() {
	let root = Ctor::root();
	let options = def(OptionBag::new().with_name("widget"));

	let first = root.extend(&options);
	let second = root.extend(&options);
	assert!(first.ptr_eq(&second));
	assert!(options.cached(root.cid()).unwrap().ptr_eq(&first));

	let other_parent = root.extend(&ComponentDef::new());
	let third = other_parent.extend(&options);
	assert!(!third.ptr_eq(&first));
}

#[test]
fn test_cids_increase_along_the_chain() {
	let root = Ctor::root();
	let a = root.extend(&ComponentDef::new());
	let b = a.extend(&ComponentDef::new());
	assert!(root.is_root());
	assert!(root.cid() < a.cid());
	assert!(a.cid() < b.cid());
	assert!(b.base().ptr_eq(&root));
	assert!(b.parent().unwrap().ptr_eq(&a));
}

#[test]
fn test_same_definition_extended_from_two_roots() {
	let a = Ctor::root();
	let b = Ctor::root();
	assert_ne!(a.cid(), b.cid());

	let shared = def(OptionBag::new().with_name("widget"));
	let from_a = a.extend(&shared);
	let from_b = b.extend(&shared);
	assert!(!from_a.ptr_eq(&from_b));
	assert!(from_a.parent().unwrap().ptr_eq(&a));
	assert!(from_b.parent().unwrap().ptr_eq(&b));
	assert!(from_b.base().ptr_eq(&b));
	assert!(b.extend(&shared).ptr_eq(&from_b));
}

#[test]
fn test_name_falls_back_to_parent() {
	let root = Ctor::root();
	let named = root.extend(&def(OptionBag::new().with_name("card")));
	let unnamed = named.extend(&ComponentDef::new());
	assert_eq!(unnamed.name().as_deref(), Some("card"));
}

#[test]
fn test_derived_ctor_registers_itself() {
	let root = Ctor::root();
	let tree = root.extend(&def(OptionBag::new().with_name("tree-node")));

	let own = tree.lookup(AssetType::Component, "tree-node").and_then(|a| a.as_ctor());
	assert!(own.unwrap().ptr_eq(&tree));
	assert!(root.lookup(AssetType::Component, "tree-node").is_none());
}

#[test]
fn test_accessor_table_built_at_derivation() {
	let root = Ctor::root();
	let sub = root.extend(&def(
		OptionBag::new()
			.with_prop("size", PropDef::of(PropType::Number))
			.with_computed("double", ComputedDef::new(|_| Ok(Value::Null))),
	));
	let accessors = sub.accessors();
	assert_eq!(accessors.len(), 2);
	assert!(matches!(accessors.get("size"), Some(Accessor::Prop)));
	assert!(matches!(accessors.get("double"), Some(Accessor::Computed(_))));
	assert!(root.accessors().is_empty());
}

#[test]
fn test_snapshots_taken_at_derivation() {
	let root = Ctor::root();
	let options = def(OptionBag::new().with_name("snap"));
	let sub = root.extend(&options);

	assert!(Rc::ptr_eq(&sub.super_options().unwrap(), &root.options()));
	let sealed = sub.sealed_options().unwrap();
	assert!(resolve_modified_options(&sub.options(), &sealed).is_empty());
	assert_eq!(sub.extend_options().unwrap().name(), Some("snap"));
	assert!(root.sealed_options().is_none());
}

#[test]
fn test_resolve_is_noop_without_ancestor_change() {
	let root = Ctor::root();
	let sub = root.extend(&ComponentDef::new());
	let before = sub.options();
	assert!(Rc::ptr_eq(&sub.resolve_options(), &before));
}

#[test]
fn test_late_root_mixin_reaches_derived_ctor() {
	let root = Ctor::root();
	let sub = root.extend(&def(OptionBag::new().with_name("late")));
	root.mixin(OptionBag::new().with_method("shout", |_, _| Ok(json!("hey"))));

	let resolved = sub.resolve_options();
	assert!(resolved.methods().unwrap().contains_key("shout"));
	assert!(Rc::ptr_eq(&sub.super_options().unwrap(), &root.options()));
	let self_ref = sub.lookup(AssetType::Component, "late").and_then(|a| a.as_ctor());
	assert!(self_ref.unwrap().ptr_eq(&sub));
}

#[test]
fn test_modification_after_derivation_survives_re_resolution() {
	let root = Ctor::root();
	let sub = root.extend(&ComponentDef::new());
	sub.set_option("delimiters", OptionValue::value(json!(["[[", "]]"])));
	root.mixin(OptionBag::new().with_hook(LifecycleHook::Created, |_| Ok(())));

	let resolved = sub.resolve_options();
	assert_eq!(resolved.value("delimiters"), Some(&json!(["[[", "]]"])));
	assert_eq!(resolved.hooks(LifecycleHook::Created).len(), 1);
	assert_eq!(
		sub.extend_options().unwrap().value("delimiters"),
		Some(&json!(["[[", "]]"]))
	);
}

#[test]
fn test_direct_registrations_survive_re_resolution() {
	let root = Ctor::root();
	let sub = root.extend(&ComponentDef::new());
	sub.filter("upper", crate::options::FilterFn::new(|v, _| v.clone()));
	root.mixin(OptionBag::new());

	sub.resolve_options();
	assert!(sub.lookup(AssetType::Filter, "upper").is_some());
}

#[test]
fn test_repeated_re_resolution_does_not_duplicate_hooks() {
	let root = Ctor::root();
	let sub = root.extend(&def(
		OptionBag::new().with_hook(LifecycleHook::Created, |_| Ok(())),
	));
	root.mixin(OptionBag::new().with_hook(LifecycleHook::Created, |_| Ok(())));
	sub.resolve_options();
	root.mixin(OptionBag::new());
	let resolved = sub.resolve_options();
	assert_eq!(resolved.hooks(LifecycleHook::Created).len(), 2);
}

#[test]
fn test_modified_options_diff_is_shallow() {
	let shared = OptionValue::value(json!({"nested": 1}));
	let sealed = OptionBag::new()
		.with_option("kept", shared.clone())
		.with_value("replaced", json!(1));
	let latest = OptionBag::new()
		.with_option("kept", shared)
		.with_value("replaced", json!(1))
		.with_value("added", json!(true));

	let modified: Vec<String> = resolve_modified_options(&latest, &sealed)
		.into_iter()
		.map(|(k, _)| k.into())
		.collect();
	assert_eq!(modified, vec!["added".to_string(), "replaced".to_string()]);
}

#[test]
fn test_grandchild_follows_root_changes() {
	let root = Ctor::root();
	let child = root.extend(&ComponentDef::new());
	let grandchild = child.extend(&ComponentDef::new());
	root.mixin(OptionBag::new().with_method("late", |_, _| Ok(Value::Null)));

	let resolved = grandchild.resolve_options();
	assert!(resolved.methods().unwrap().contains_key("late"));
}
