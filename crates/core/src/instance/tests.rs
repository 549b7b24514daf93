use std::cell::RefCell;

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use super::*;
use crate::collab::SlotChild;
use crate::config::{Config, Mode};
use crate::ctor::ComponentDef;
use crate::error::HandlerError;
use crate::options::{ComputedDef, InjectDef, PropDef, PropType, WatchDef};

type Log = Rc<RefCell<Vec<String>>>;

fn log() -> Log {
	Rc::new(RefCell::new(Vec::new()))
}

fn map(value: Value) -> DataMap {
	value.as_object().cloned().unwrap_or_default()
}

/// Root whose warnings and routed errors are collected.
fn observed_root() -> (Ctor, Log, Log) {
	let warnings = log();
	let errors = log();
	let (w, e) = (warnings.clone(), errors.clone());
	let config = Config {
		mode: Mode::Development,
		..Config::default()
	}
	.with_warn_handler(move |msg, _| w.borrow_mut().push(msg.to_owned()))
	.with_error_handler(move |err, _, info| {
		e.borrow_mut().push(format!("{info}: {err}"));
		Ok(())
	});
	(Ctor::builder().config(config).build(), warnings, errors)
}

fn record(log: &Log, entry: &'static str) -> impl Fn(&mut Instance) -> crate::error::HandlerResult + 'static {
	let log = log.clone();
	move |_| {
		log.borrow_mut().push(entry.to_owned());
		Ok(())
	}
}

#[test]
fn test_uids_are_unique_and_increasing() {
	let root = Ctor::root();
	let a = root.create(OptionBag::new());
	let b = root.create(OptionBag::new());
	assert!(a.uid() < b.uid());
	assert_eq!(b.phase(), InitPhase::Created);
}

#[test]
fn test_uids_are_unique_across_roots() {
	let first = Ctor::root().create(OptionBag::new());
	let second = Ctor::root().create(OptionBag::new());
	assert_ne!(first.uid(), second.uid());
	assert_eq!(first.root_uid(), first.uid());
	assert_eq!(second.root_uid(), second.uid());
}

#[test]
fn test_hooks_observe_the_phase_they_run_in() {
	let phases = Rc::new(RefCell::new(Vec::new()));
	let (before, after) = (phases.clone(), phases.clone());
	let vm = Ctor::root().create(
		OptionBag::new()
			.with_hook(LifecycleHook::BeforeCreate, move |vm: &mut Instance| {
				before.borrow_mut().push(vm.phase());
				Ok(())
			})
			.with_hook(LifecycleHook::Created, move |vm: &mut Instance| {
				after.borrow_mut().push(vm.phase());
				Ok(())
			}),
	);
	assert_eq!(*phases.borrow(), vec![InitPhase::BeforeCreate, InitPhase::Created]);
	assert_eq!(vm.phase(), InitPhase::Created);
}

#[test]
fn test_before_create_runs_before_state_and_created_after() {
	let seen = log();
	let (before, after) = (seen.clone(), seen.clone());
	let root = Ctor::root();
	root.create(
		OptionBag::new()
			.with_data(|_| Ok(map(json!({"msg": "hi"}))))
			.with_hook(LifecycleHook::BeforeCreate, move |vm| {
				before.borrow_mut().push(format!("beforeCreate:{:?}", vm.get("msg")));
				Ok(())
			})
			.with_hook(LifecycleHook::Created, move |vm| {
				after.borrow_mut().push(format!("created:{:?}", vm.get("msg")));
				Ok(())
			}),
	);
	assert_eq!(
		*seen.borrow(),
		vec!["beforeCreate:None".to_string(), "created:Some(String(\"hi\"))".to_string()]
	);
}

#[test]
fn test_ancestor_hook_runs_before_own() {
	let calls = log();
	let root = Ctor::root();
	let base = root.extend(&ComponentDef::from(
		OptionBag::new().with_hook(LifecycleHook::Created, record(&calls, "base")),
	));
	let leaf = base.extend(&ComponentDef::from(
		OptionBag::new().with_hook(LifecycleHook::Created, record(&calls, "leaf")),
	));
	leaf.create(OptionBag::new().with_hook(LifecycleHook::Created, record(&calls, "instance")));
	assert_eq!(*calls.borrow(), vec!["base", "leaf", "instance"]);
}

#[test]
fn test_failing_hook_is_routed_and_rest_still_run() {
	let (root, _, errors) = observed_root();
	let calls = log();
	let after = calls.clone();
	let vm = root.create(
		OptionBag::new()
			.with_hook(LifecycleHook::Created, |_| Err(HandlerError::msg("first failed")))
			.with_hook(LifecycleHook::Created, |_| panic!("second panicked"))
			.with_hook(LifecycleHook::Created, move |_| {
				after.borrow_mut().push("third".to_owned());
				Ok(())
			}),
	);
	assert_eq!(*calls.borrow(), vec!["third"]);
	assert_eq!(
		*errors.borrow(),
		vec![
			"created hook: first failed".to_string(),
			"created hook: panicked: second panicked".to_string(),
		]
	);
	assert_eq!(vm.phase(), InitPhase::Created);
}

#[test]
fn test_props_defaults_and_boolean_casting() {
	let (root, warnings, _) = observed_root();
	let vm = root.create(
		OptionBag::new()
			.with_prop("size", PropDef::of(PropType::Number).with_default(json!(3)))
			.with_prop("disabled", PropDef::of(PropType::Boolean))
			.with_prop("checked", PropDef::of(PropType::Boolean))
			.with_prop("items", PropDef::of(PropType::Array).with_default_factory(|| json!([])))
			.with_props_data(map(json!({"checked": ""}))),
	);
	assert_eq!(vm.get("size"), Some(json!(3)));
	assert_eq!(vm.get("disabled"), Some(json!(false)));
	assert_eq!(vm.get("checked"), Some(json!(true)));
	assert_eq!(vm.get("items"), Some(json!([])));
	assert!(warnings.borrow().is_empty());
}

#[rstest]
#[case(PropDef::of(PropType::String).required(), json!({}), "Missing required prop: \"title\"")]
#[case(PropDef::of(PropType::String), json!({"title": 1}), "Invalid prop: type check failed for prop \"title\". Expected String, got Number")]
#[case(PropDef::default().with_validator(|v| v.is_string()), json!({"title": false}), "Invalid prop: custom validator check failed for prop \"title\".")]
fn test_prop_validation_warnings(#[case] def: PropDef, #[case] data: Value, #[case] expected: &str) {
	let (root, warnings, _) = observed_root();
	root.create(OptionBag::new().with_prop("title", def).with_props_data(map(data)));
	assert_eq!(*warnings.borrow(), vec![expected.to_string()]);
}

#[test]
fn test_data_shadowing_prop_warns() {
	let (root, warnings, _) = observed_root();
	root.create(
		OptionBag::new()
			.with_prop("value", PropDef::default())
			.with_data(|_| Ok(map(json!({"value": 1})))),
	);
	assert_eq!(
		*warnings.borrow(),
		vec!["The data property \"value\" is already declared as a prop. Use prop default value instead.".to_string()]
	);
}

#[test]
fn test_data_factory_failure_is_routed() {
	let (root, _, errors) = observed_root();
	let vm = root.create(OptionBag::new().with_data(|_| Err(HandlerError::msg("no data"))));
	assert!(vm.data().is_empty());
	assert_eq!(*errors.borrow(), vec!["data(): no data".to_string()]);
}

#[test]
fn test_methods_are_callable() {
	let root = Ctor::root();
	let mut vm = root.create(
		OptionBag::new()
			.with_data(|_| Ok(map(json!({"count": 1}))))
			.with_method("bump", |vm, args| {
				let by = args.first().and_then(Value::as_i64).unwrap_or(1);
				let next = vm.get("count").and_then(|v| v.as_i64()).unwrap_or(0) + by;
				vm.set("count", json!(next));
				Ok(json!(next))
			}),
	);
	assert_eq!(vm.call("bump", &[json!(4)]).unwrap(), json!(5));
	assert_eq!(vm.get("count"), Some(json!(5)));
	assert!(matches!(vm.call("missing", &[]), Err(Error::UnknownMethod(_))));
}

#[test]
fn test_computed_reads_and_setter() {
	let (root, warnings, _) = observed_root();
	let mut vm = root.create(
		OptionBag::new()
			.with_data(|_| Ok(map(json!({"n": 2}))))
			.with_computed(
				"double",
				ComputedDef::new(|vm| Ok(json!(vm.get("n").and_then(|v| v.as_i64()).unwrap_or(0) * 2)))
					.with_setter(|vm, value| {
						let half = value.as_i64().unwrap_or(0) / 2;
						vm.set("n", json!(half));
						Ok(())
					}),
			)
			.with_computed("frozen", ComputedDef::new(|_| Ok(json!("ice")))),
	);
	assert_eq!(vm.get("double"), Some(json!(4)));
	vm.set("double", json!(10));
	assert_eq!(vm.get("n"), Some(json!(5)));
	vm.set("frozen", json!("water"));
	assert_eq!(vm.get("frozen"), Some(json!("ice")));
	assert_eq!(
		*warnings.borrow(),
		vec!["Computed property \"frozen\" was assigned to but it has no setter.".to_string()]
	);
}

#[test]
fn test_immediate_watcher_runs_during_init() {
	let calls = log();
	let seen = calls.clone();
	let root = Ctor::root();
	root.create(
		OptionBag::new()
			.with_data(|_| Ok(map(json!({"q": "x"}))))
			.with_watch("q", WatchDef::new(|_, _, _| Ok(())))
			.with_watch(
				"q",
				WatchDef::new(move |_, new, old| {
					seen.borrow_mut().push(format!("{new} <- {old}"));
					Ok(())
				})
				.immediate(),
			),
	);
	assert_eq!(*calls.borrow(), vec!["\"x\" <- null"]);
}

#[test]
fn test_inject_reads_nearest_provider() {
	let (root, warnings, _) = observed_root();
	let parent = root.create(OptionBag::new().with_provide(|_| Ok(map(json!({"theme": "dark", "size": 1})))));
	let middle = root.create(
		OptionBag::new()
			.with_parent(&parent)
			.with_provide(|_| Ok(map(json!({"size": 2})))),
	);
	let child = root.create(
		OptionBag::new()
			.with_parent(&middle)
			.with_inject("theme", InjectDef::from_key("theme"))
			.with_inject("size", InjectDef::from_key("size"))
			.with_inject("lang", InjectDef::from_key("lang").with_default(json!("en")))
			.with_inject("missing", InjectDef::from_key("missing")),
	);
	assert_eq!(child.get("theme"), Some(json!("dark")));
	assert_eq!(child.get("size"), Some(json!(2)));
	assert_eq!(child.get("lang"), Some(json!("en")));
	assert_eq!(child.get("missing"), None);
	assert_eq!(*warnings.borrow(), vec!["Injection \"missing\" not found".to_string()]);
	assert_eq!(child.root_uid(), parent.uid());
}

#[test]
fn test_internal_creation_layers_over_ctor_options() {
	let root = Ctor::root();
	let item = root.extend(&ComponentDef::from(
		OptionBag::new()
			.with_name("list-item")
			.with_prop("label", PropDef::of(PropType::String)),
	));
	let mut parent = root.create(OptionBag::new());
	let clicks = log();
	let sink = clicks.clone();
	let handler = Handler::new(move |_, args| {
		sink.borrow_mut().push(args[0].to_string());
		Ok(())
	});
	let node: crate::collab::VNode = Rc::new("child node");
	let mut vm = item.create(
		InternalComponentOptions::new(&parent)
			.with_props_data(map(json!({"label": "first"})))
			.with_listener("select", handler)
			.with_child(SlotChild { slot: None, node: node.clone() })
			.with_tag("list-item"),
	);

	assert!(vm.options().proto().is_some_and(|p| Rc::ptr_eq(p, &item.resolve_options())));
	assert_eq!(vm.get("label"), Some(json!("first")));
	assert_eq!(vm.parent().map(ParentLink::uid), Some(parent.uid()));
	assert_eq!(vm.slot("default").len(), 1);
	assert!(vm.slot("header").is_empty());
	vm.emit("select", &[json!(7)]);
	assert_eq!(*clicks.borrow(), vec!["7"]);
	assert!(!vm.is_root());
	parent.destroy();
}

#[test]
fn test_hook_events_are_emitted() {
	let calls = log();
	let sink = calls.clone();
	let root = Ctor::root();
	let mut vm = root.create(OptionBag::new());
	vm.on(
		"hook:beforeDestroy",
		&Handler::new(move |_, _| {
			sink.borrow_mut().push("hook event".to_owned());
			Ok(())
		}),
	);
	vm.destroy();
	assert_eq!(*calls.borrow(), vec!["hook event"]);
}

#[test]
fn test_el_mounts_after_created() {
	let calls = log();
	let root = Ctor::root();
	let vm = root.create(
		OptionBag::new()
			.with_el("#app")
			.with_render(|_| Rc::new(()))
			.with_hook(LifecycleHook::Created, record(&calls, "created"))
			.with_hook(LifecycleHook::BeforeMount, record(&calls, "beforeMount"))
			.with_hook(LifecycleHook::Mounted, record(&calls, "mounted")),
	);
	assert!(vm.is_mounted());
	assert_eq!(vm.phase(), InitPhase::Mount);
	assert_eq!(*calls.borrow(), vec!["created", "beforeMount", "mounted"]);
}

#[test]
fn test_destroy_is_idempotent_and_clears_listeners() {
	let calls = log();
	let root = Ctor::root();
	let mut vm = root.create(
		OptionBag::new()
			.with_hook(LifecycleHook::BeforeDestroy, record(&calls, "beforeDestroy"))
			.with_hook(LifecycleHook::Destroyed, record(&calls, "destroyed")),
	);
	vm.on("ping", &Handler::new(|_, _| Ok(())));
	vm.destroy();
	vm.destroy();
	assert!(vm.is_destroyed());
	assert_eq!(vm.listener_count("ping"), 0);
	assert_eq!(*calls.borrow(), vec!["beforeDestroy", "destroyed"]);
}

#[test]
fn test_fields_and_asset_resolution_on_instance() {
	let root = Ctor::root();
	root.component("my-widget", ComponentDef::new());
	let mut vm = root.create(OptionBag::new());
	vm.set_field("_flag", true);
	assert_eq!(vm.field("_flag"), Some(&json!(true)));
	assert!(vm.resolve_asset(AssetType::Component, "MyWidget", false).is_none());
	assert!(vm.resolve_asset(AssetType::Component, "my-widget", false).is_some());
}
