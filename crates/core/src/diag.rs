//! Development warnings and error routing.
//!
//! Warnings are development-only: in production mode every helper here except
//! error routing is a no-op. Failures raised by user callbacks are always
//! routed, either to [`Config::error_handler`] or to the log.
//!
//! [`Config::error_handler`]: crate::Config::error_handler

use std::panic::{self, AssertUnwindSafe};

use tessera_primitives::{Uid, format_component_name};
use tracing::{error, warn as log_warn};

use crate::config::Config;
use crate::ctor::Runtime;
use crate::error::{HandlerError, HandlerResult};
use crate::instance::Instance;

/// Identifies an instance in diagnostics and error-handler calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
	pub uid: Uid,
	pub name: Option<Box<str>>,
	pub is_root: bool,
}

impl InstanceInfo {
	/// `<Root>`, `<MyWidget>` or `<Anonymous>`.
	pub fn display_name(&self) -> String {
		format_component_name(self.name.as_deref(), self.is_root)
	}
}

/// Emits a development warning through the warn handler or the log.
pub(crate) fn warn(runtime: &Runtime, msg: &str, vm: Option<&InstanceInfo>) {
	let config = runtime.config();
	warn_with(&config, msg, vm);
}

/// [`warn`] against an already borrowed config.
pub(crate) fn warn_with(config: &Config, msg: &str, vm: Option<&InstanceInfo>) {
	if !config.is_dev() {
		return;
	}
	if let Some(handler) = &config.warn_handler {
		handler(msg, vm);
	} else if !config.silent {
		match vm {
			Some(vm) => log_warn!(component = %vm.display_name(), "{msg}"),
			None => log_warn!("{msg}"),
		}
	}
}

/// Advisory warning. Logged with `kind = "tip"` and never passed to the
/// warn handler.
pub(crate) fn tip(runtime: &Runtime, msg: &str, vm: Option<&InstanceInfo>) {
	let (dev, silent) = runtime.with_config(|c| (c.is_dev(), c.silent));
	if !dev || silent {
		return;
	}
	match vm {
		Some(vm) => log_warn!(component = %vm.display_name(), kind = "tip", "{msg}"),
		None => log_warn!(kind = "tip", "{msg}"),
	}
}

/// Routes a failure from `vm` to the configured error handler.
///
/// Without a handler, or when the handler itself fails, the error is logged.
pub(crate) fn handle_error(vm: &Instance, err: &HandlerError, info: &str) {
	let runtime = vm.ctor().runtime();
	let handler = runtime.with_config(|c| c.error_handler.clone());
	let vm_info = vm.info();
	if let Some(handler) = handler {
		match handler(err, &vm_info, info) {
			Ok(()) => return,
			Err(handler_err) => {
				if handler_err != *err {
					log_error(runtime, &handler_err, None, "config.error_handler");
				}
			}
		}
	}
	log_error(runtime, err, Some(&vm_info), info);
}

fn log_error(runtime: &Runtime, err: &HandlerError, vm: Option<&InstanceInfo>, info: &str) {
	warn(runtime, &format!("Error in {info}: \"{err}\""), vm);
	match vm {
		Some(vm) => error!(component = %vm.display_name(), info, error = %err, "unhandled error"),
		None => error!(info, error = %err, "unhandled error"),
	}
}

/// Runs one user callback against `vm`, converting both returned errors and
/// panics into a routed failure.
///
/// Returns `None` when the callback failed; callers dispatching a sequence
/// simply move on to the next entry.
pub(crate) fn invoke_with_error_handling<T>(
	vm: &mut Instance,
	info: &str,
	f: impl FnOnce(&mut Instance) -> HandlerResult<T>,
) -> Option<T> {
	let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(vm)))
		.unwrap_or_else(|payload| Err(HandlerError::from_panic(payload)));
	match outcome {
		Ok(value) => Some(value),
		Err(err) => {
			handle_error(vm, &err, info);
			None
		}
	}
}
