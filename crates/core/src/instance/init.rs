//! The init sequence run by [`Ctor::create`].

use std::rc::Rc;
use std::time::Instant;

use rustc_hash::FxHashMap as HashMap;
use tessera_primitives::{LifecycleHook, Uid};
use tracing::{debug, info, trace};

use super::events::Events;
use super::{Handler, Instance, Lifecycle, ParentLink, ProvideScope};
use crate::collab::SlotChild;
use crate::ctor::{AccessorTable, Ctor};
use crate::diag::InstanceInfo;
use crate::options::{DataMap, MergeContext, OptionBag, OptionValue, RenderFn, Value, keys, merge_options};

/// Init phases, in the order they run. An instance exists only once its
/// uid is assigned, so the first phase it can be in is `OptionsResolve`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InitPhase {
	OptionsResolve,
	LifecycleInit,
	EventsInit,
	RenderInit,
	BeforeCreate,
	InjectionsResolve,
	StateInit,
	ProvideResolve,
	Created,
	Mount,
}

/// Per-instantiation fields for a child created by the framework itself.
#[derive(Clone)]
pub struct InternalComponentOptions {
	pub parent: ParentLink,
	pub props_data: Option<DataMap>,
	pub listeners: Vec<(Box<str>, Handler)>,
	pub children: Vec<SlotChild>,
	pub tag: Option<Box<str>>,
	pub render: Option<RenderFn>,
}

impl InternalComponentOptions {
	pub fn new(parent: &Instance) -> Self {
		Self {
			parent: parent.link(),
			props_data: None,
			listeners: Vec::new(),
			children: Vec::new(),
			tag: None,
			render: None,
		}
	}

	pub fn with_props_data(mut self, data: DataMap) -> Self {
		self.props_data = Some(data);
		self
	}

	pub fn with_listener(mut self, name: &str, handler: Handler) -> Self {
		self.listeners.push((name.into(), handler));
		self
	}

	pub fn with_child(mut self, child: SlotChild) -> Self {
		self.children.push(child);
		self
	}

	pub fn with_tag(mut self, tag: &str) -> Self {
		self.tag = Some(tag.into());
		self
	}

	pub fn with_render(mut self, render: RenderFn) -> Self {
		self.render = Some(render);
		self
	}
}

/// Input to [`Ctor::create`].
#[derive(Clone)]
pub enum InitOptions {
	/// Options merged over the constructor's resolved options.
	Raw(OptionBag),
	/// Internal creation: layered over the constructor's options without a merge.
	Component(InternalComponentOptions),
}

impl Default for InitOptions {
	fn default() -> Self {
		InitOptions::Raw(OptionBag::new())
	}
}

impl From<OptionBag> for InitOptions {
	fn from(bag: OptionBag) -> Self {
		InitOptions::Raw(bag)
	}
}

impl From<InternalComponentOptions> for InitOptions {
	fn from(opts: InternalComponentOptions) -> Self {
		InitOptions::Component(opts)
	}
}

impl Ctor {
	/// Creates an instance and runs its init sequence.
	///
	/// Hooks run in a fixed order: `beforeCreate` sees no injections, props
	/// or data; `created` sees all of them. When the resolved options name a
	/// mount target the instance is mounted last.
	pub fn create(&self, options: impl Into<InitOptions>) -> Instance {
		let runtime = self.runtime();
		let uid = Uid::next();
		let started = runtime.with_config(|c| c.performance && c.is_dev()).then(Instant::now);
		trace!(%uid, cid = %self.cid(), "init");

		let options = match options.into() {
			InitOptions::Component(internal) => Rc::new(internal_options(self.resolve_options(), internal)),
			InitOptions::Raw(raw) => {
				let config = runtime.config();
				let parent = raw.parent().cloned();
				let info = InstanceInfo {
					uid,
					name: raw.name().map(str::to_owned).or_else(|| self.name()).map(Into::into),
					is_root: parent.is_none(),
				};
				let ctx = MergeContext::instance(&config, &info);
				Rc::new(merge_options(&self.resolve_options(), &raw, &ctx))
			}
		};

		let parent = options.parent().cloned();
		let root_uid = parent.as_ref().map_or(uid, ParentLink::root_uid);
		let provided = ProvideScope::child_of(parent.as_ref().map(|p| p.provided.clone()));
		let mut vm = Instance {
			uid,
			ctor: self.clone(),
			options,
			phase: InitPhase::OptionsResolve,
			lifecycle: Lifecycle::default(),
			parent,
			root_uid,
			events: Events::default(),
			slots: HashMap::default(),
			props: DataMap::new(),
			data: DataMap::new(),
			injected: DataMap::new(),
			methods: Rc::default(),
			own_accessors: AccessorTable::default(),
			fields: DataMap::new(),
			provided,
		};
		vm.init();

		if let Some(started) = started {
			info!(
				target: "tessera::perf",
				component = %vm.info().display_name(),
				elapsed_us = started.elapsed().as_micros() as u64,
				"init"
			);
		}

		if let Some(el) = vm.options.el().map(str::to_owned) {
			vm.enter(InitPhase::Mount);
			vm.mount(Some(&el));
		}
		vm
	}
}

/// A bag reading through to `resolved`, carrying only what differs for this
/// instantiation.
fn internal_options(resolved: Rc<OptionBag>, internal: InternalComponentOptions) -> OptionBag {
	let mut options = OptionBag::with_proto(resolved);
	options.insert(keys::PARENT, OptionValue::Parent(internal.parent));
	if let Some(data) = internal.props_data {
		options.insert(keys::PROPS_DATA, OptionValue::value(data.into()));
	}
	options.insert(keys::PARENT_LISTENERS, OptionValue::Listeners(internal.listeners.into()));
	options.insert(keys::RENDER_CHILDREN, OptionValue::Children(internal.children.into()));
	if let Some(tag) = internal.tag {
		options.insert(keys::COMPONENT_TAG, OptionValue::value(Value::from(&*tag)));
	}
	if let Some(render) = internal.render {
		options.insert(keys::RENDER, OptionValue::Render(render));
	}
	options
}

impl Instance {
	fn enter(&mut self, phase: InitPhase) {
		debug_assert!(phase > self.phase, "init phases run once, in order");
		trace!(uid = %self.uid, ?phase, "init phase");
		self.phase = phase;
	}

	fn init(&mut self) {
		self.enter(InitPhase::LifecycleInit);
		// Parent link, root and provide scope are wired at construction.

		self.enter(InitPhase::EventsInit);
		if let Some(listeners) = self.options.parent_listeners().cloned() {
			for (name, handler) in listeners.iter() {
				self.on(&**name, handler);
			}
		}

		self.enter(InitPhase::RenderInit);
		self.init_render();

		self.enter(InitPhase::BeforeCreate);
		self.call_hook(LifecycleHook::BeforeCreate);

		self.enter(InitPhase::InjectionsResolve);
		self.init_injections();

		self.enter(InitPhase::StateInit);
		self.init_props();
		self.init_methods();
		self.init_data();
		self.init_computed();
		self.init_watch();

		self.enter(InitPhase::ProvideResolve);
		self.init_provide();

		self.enter(InitPhase::Created);
		self.call_hook(LifecycleHook::Created);
		debug!(uid = %self.uid, component = %self.info().display_name(), "created");
	}

	fn init_render(&mut self) {
		let Some(children) = self.options.render_children().cloned() else {
			return;
		};
		for child in children.iter() {
			let slot = child.slot.as_deref().unwrap_or("default");
			self.slots.entry(slot.into()).or_default().push(child.node.clone());
		}
	}
}
