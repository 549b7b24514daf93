//! End-to-end behavior of constructors, global registration and instances.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;
use tessera_core::{
	AssetType, ComponentDef, Config, Ctor, Handler, HandlerResult, Instance, LifecycleHook, Mode,
	OptionBag, PluginRef, Value,
};

fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn dev_root() -> Ctor {
	Ctor::builder()
		.config(Config {
			mode: Mode::Development,
			..Config::default()
		})
		.build()
}

fn push(order: &Rc<RefCell<Vec<&'static str>>>, entry: &'static str) -> impl Fn(&mut Instance) -> HandlerResult + 'static {
	let order = order.clone();
	move |_| {
		order.borrow_mut().push(entry);
		Ok(())
	}
}

#[test]
fn root_mixin_and_extend_created_order() {
	init_tracing();
	let root = dev_root();
	let order = Rc::new(RefCell::new(Vec::new()));
	let root_created = push(&order, "root-created");
	let sub_created = push(&order, "sub-created");

	root.mixin(OptionBag::new().with_hook(LifecycleHook::Created, move |vm| {
		root_created(vm)?;
		vm.set_field("_flag", true);
		Ok(())
	}));
	let sub = root.extend(&ComponentDef::from(OptionBag::new().with_hook(
		LifecycleHook::Created,
		move |vm| {
			sub_created(vm)?;
			vm.set_field("_flag2", true);
			Ok(())
		},
	)));

	let vm = sub.create(OptionBag::new());
	assert_eq!(vm.field("_flag"), Some(&json!(true)));
	assert_eq!(vm.field("_flag2"), Some(&json!(true)));
	assert_eq!(*order.borrow(), vec!["root-created", "sub-created"]);
}

#[test]
fn extend_twice_with_same_definition_is_identical() {
	let root = dev_root();
	let def = ComponentDef::from(OptionBag::new().with_name("same"));
	assert!(root.extend(&def).ptr_eq(&root.extend(&def)));
}

#[test]
fn late_mixin_method_reaches_existing_subclass() {
	init_tracing();
	let root = dev_root();
	let sup = root.extend(&ComponentDef::from(OptionBag::new().with_name("super-widget")));
	let sub = sup.extend(&ComponentDef::from(OptionBag::new().with_name("sub-widget")));

	sup.mixin(OptionBag::new().with_method("late", |_, _| Ok(json!("late!"))));
	let mut vm = sub.create(OptionBag::new());
	assert!(vm.has_method("late"));
	assert_eq!(vm.call("late", &[]).unwrap(), json!("late!"));
}

#[test]
fn global_mixin_after_extend_still_runs_hooks_once() {
	let root = dev_root();
	let order = Rc::new(RefCell::new(Vec::new()));
	let sub = root.extend(&ComponentDef::from(
		OptionBag::new().with_hook(LifecycleHook::Created, push(&order, "sub")),
	));
	sub.create(OptionBag::new());
	root.mixin(OptionBag::new().with_hook(LifecycleHook::Created, push(&order, "global")));
	order.borrow_mut().clear();

	sub.create(OptionBag::new());
	sub.create(OptionBag::new());
	assert_eq!(*order.borrow(), vec!["global", "sub", "global", "sub"]);
}

#[test]
fn events_on_once_off() {
	let root = dev_root();
	let mut vm = root.create(OptionBag::new());
	let (f_calls, g_calls) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
	let (fc, gc) = (f_calls.clone(), g_calls.clone());
	let f = Handler::new(move |_, _| {
		fc.set(fc.get() + 1);
		Ok(())
	});
	let g = Handler::new(move |_, _| {
		gc.set(gc.get() + 1);
		Ok(())
	});

	vm.on("a", &f).once("a", &g).emit("a", &[]);
	assert_eq!((f_calls.get(), g_calls.get()), (1, 1));
	vm.emit("a", &[]);
	assert_eq!((f_calls.get(), g_calls.get()), (2, 1));
	vm.off("a", Some(&f)).emit("a", &[]);
	assert_eq!((f_calls.get(), g_calls.get()), (2, 1));

	vm.on(["a", "b"], &f).off_all().emit("a", &[]).emit("b", &[]);
	assert_eq!(f_calls.get(), 2);
}

#[test]
fn plugin_installs_once() {
	let root = dev_root();
	let installs = Rc::new(Cell::new(0));
	let counter = installs.clone();
	let plugin = PluginRef::function(move |ctor, args| {
		counter.set(counter.get() + 1);
		ctor.update_config(|c| c.silent = args.first() == Some(&Value::Bool(true)));
		Ok(())
	});

	root.use_plugin(&plugin, &[json!(true)])
		.unwrap()
		.use_plugin(&plugin, &[json!(false)])
		.unwrap();
	assert_eq!(installs.get(), 1);
	assert!(root.config().silent);
}

#[test]
fn asset_lookup_falls_back_and_child_shadows() {
	let root = dev_root();
	let parent = root.extend(&ComponentDef::new());
	let shared = parent.component("shared-card", ComponentDef::new()).unwrap();
	let child = parent.extend(&ComponentDef::new());

	assert!(child.lookup(AssetType::Component, "shared-card").unwrap().same(&shared));
	let own = child.component("shared-card", ComponentDef::new()).unwrap();
	assert!(child.lookup(AssetType::Component, "shared-card").unwrap().same(&own));
	assert!(parent.lookup(AssetType::Component, "shared-card").unwrap().same(&shared));

	let vm = child.create(OptionBag::new());
	assert!(vm.resolve_asset(AssetType::Component, "SharedCard", false).is_none());
	assert!(vm.resolve_asset(AssetType::Component, "shared-card", false).unwrap().same(&own));
}

#[test]
fn config_loaded_from_toml_drives_root() {
	let config = Config::from_toml_str("mode = \"production\"\nperformance = true\n").unwrap();
	let root = Ctor::builder().config(config).build();
	let warned = Rc::new(Cell::new(false));
	let flag = warned.clone();
	root.update_config(move |c| {
		*c = c.clone().with_warn_handler(move |_, _| flag.set(true));
	});

	root.component("div", ComponentDef::new());
	root.create(OptionBag::new().with_el("#app"));
	assert!(!warned.get());
}
