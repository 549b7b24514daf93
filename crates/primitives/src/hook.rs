use std::fmt;

/// Prefix of the events an instance emits alongside each lifecycle hook.
pub const HOOK_EVENT_PREFIX: &str = "hook:";

/// Lifecycle hook names recognised by the merge engine.
///
/// Every hook option is merged by concatenation (parent first) and dispatched
/// in sequence by the instance initializer and lifecycle methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
	BeforeCreate,
	Created,
	BeforeMount,
	Mounted,
	BeforeUpdate,
	Updated,
	BeforeDestroy,
	Destroyed,
	Activated,
	Deactivated,
	ErrorCaptured,
	ServerPrefetch,
	RenderTracked,
	RenderTriggered,
}

impl LifecycleHook {
	pub const ALL: [LifecycleHook; 14] = [
		LifecycleHook::BeforeCreate,
		LifecycleHook::Created,
		LifecycleHook::BeforeMount,
		LifecycleHook::Mounted,
		LifecycleHook::BeforeUpdate,
		LifecycleHook::Updated,
		LifecycleHook::BeforeDestroy,
		LifecycleHook::Destroyed,
		LifecycleHook::Activated,
		LifecycleHook::Deactivated,
		LifecycleHook::ErrorCaptured,
		LifecycleHook::ServerPrefetch,
		LifecycleHook::RenderTracked,
		LifecycleHook::RenderTriggered,
	];

	/// Option key of this hook.
	pub const fn name(self) -> &'static str {
		match self {
			LifecycleHook::BeforeCreate => "beforeCreate",
			LifecycleHook::Created => "created",
			LifecycleHook::BeforeMount => "beforeMount",
			LifecycleHook::Mounted => "mounted",
			LifecycleHook::BeforeUpdate => "beforeUpdate",
			LifecycleHook::Updated => "updated",
			LifecycleHook::BeforeDestroy => "beforeDestroy",
			LifecycleHook::Destroyed => "destroyed",
			LifecycleHook::Activated => "activated",
			LifecycleHook::Deactivated => "deactivated",
			LifecycleHook::ErrorCaptured => "errorCaptured",
			LifecycleHook::ServerPrefetch => "serverPrefetch",
			LifecycleHook::RenderTracked => "renderTracked",
			LifecycleHook::RenderTriggered => "renderTriggered",
		}
	}

	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|hook| hook.name() == name)
	}

	/// Name of the event emitted for this hook (`hook:created`, ...).
	pub fn event_name(self) -> String {
		format!("{HOOK_EVENT_PREFIX}{}", self.name())
	}
}

impl fmt::Display for LifecycleHook {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
