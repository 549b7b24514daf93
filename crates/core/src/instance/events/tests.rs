use std::cell::RefCell;
use std::io;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::config::{Config, Mode};
use crate::ctor::Ctor;
use crate::error::HandlerError;
use crate::options::OptionBag;

type Calls = Rc<RefCell<Vec<String>>>;

fn recorder(calls: &Calls, tag: &'static str) -> Handler {
	let calls = calls.clone();
	Handler::new(move |_, args| {
		let suffix: Vec<String> = args.iter().map(Value::to_string).collect();
		calls.borrow_mut().push(format!("{tag}{}", suffix.join(",")));
		Ok(())
	})
}

fn instance() -> Instance {
	Ctor::root().create(OptionBag::new())
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/// Runs `f` under a subscriber writing plain text into the returned string.
fn logged(f: impl FnOnce()) -> String {
	let buffer = LogBuffer::default();
	let writer = buffer.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_writer(move || writer.clone())
		.with_ansi(false)
		.with_max_level(tracing::Level::TRACE)
		.finish();
	tracing::subscriber::with_default(subscriber, f);
	let bytes = buffer.0.lock().unwrap().clone();
	String::from_utf8(bytes).unwrap()
}

fn mixed_case_emit(mode: Mode) -> String {
	let config = Config { mode, ..Config::default() };
	let mut vm = Ctor::builder().config(config).build().create(OptionBag::new());
	vm.on("myevent", &Handler::new(|_, _| Ok(())));
	logged(|| {
		vm.emit("myEvent", &[]);
	})
}

#[test]
fn test_on_and_once() {
	let calls = Calls::default();
	let mut vm = instance();
	let f = recorder(&calls, "f");
	let g = recorder(&calls, "g");
	vm.on("a", &f).once("a", &g);

	vm.emit("a", &[]);
	vm.emit("a", &[]);
	assert_eq!(*calls.borrow(), vec!["f", "g", "f"]);
}

#[test]
fn test_off_with_handler_then_emit_calls_nothing() {
	let calls = Calls::default();
	let mut vm = instance();
	let f = recorder(&calls, "f");
	let g = recorder(&calls, "g");
	vm.on("a", &f).once("a", &g);

	vm.off("a", Some(&f)).off("a", Some(&g));
	vm.emit("a", &[]);
	assert!(calls.borrow().is_empty());
}

#[test]
fn test_off_removes_last_registration_only() {
	let calls = Calls::default();
	let mut vm = instance();
	let f = recorder(&calls, "f");
	vm.on("a", &f).on("a", &f);

	vm.off("a", Some(&f));
	vm.emit("a", &[]);
	assert_eq!(*calls.borrow(), vec!["f"]);
}

#[test]
fn test_off_name_clears_that_event_only() {
	let calls = Calls::default();
	let mut vm = instance();
	vm.on(["a", "b"], &recorder(&calls, "x"));

	vm.off("a", None);
	vm.emit("a", &[]).emit("b", &[]);
	assert_eq!(*calls.borrow(), vec!["x"]);
}

#[test]
fn test_off_all_clears_every_event() {
	let calls = Calls::default();
	let mut vm = instance();
	vm.on("a", &recorder(&calls, "a")).on("b", &recorder(&calls, "b"));

	vm.off_all();
	vm.emit("a", &[]).emit("b", &[]);
	assert!(calls.borrow().is_empty());
	assert_eq!(vm.listener_count("a"), 0);
}

#[test]
fn test_emit_passes_args_in_order() {
	let calls = Calls::default();
	let mut vm = instance();
	vm.on(vec!["pick"], &recorder(&calls, "pick:"));
	vm.emit("pick", &[json!(1), json!("two")]);
	assert_eq!(*calls.borrow(), vec!["pick:1,\"two\""]);
}

#[test]
fn test_handlers_added_during_emit_wait_for_next_emit() {
	let calls = Calls::default();
	let mut vm = instance();
	let late = recorder(&calls, "late");
	vm.on(
		"a",
		&Handler::new(move |vm, _| {
			vm.on("a", &late);
			Ok(())
		}),
	);

	vm.emit("a", &[]);
	assert!(calls.borrow().is_empty());
	vm.emit("a", &[]);
	assert_eq!(*calls.borrow(), vec!["late"]);
}

#[test]
fn test_failing_handler_does_not_stop_others() {
	let errors = Calls::default();
	let sink = errors.clone();
	let config = Config {
		mode: Mode::Development,
		..Config::default()
	}
	.with_error_handler(move |err, _, info| {
		sink.borrow_mut().push(format!("{info}: {err}"));
		Ok(())
	});
	let mut vm = Ctor::builder().config(config).build().create(OptionBag::new());
	let calls = Calls::default();
	vm.on("save", &Handler::new(|_, _| Err(HandlerError::msg("disk full"))))
		.on("save", &recorder(&calls, "after"));

	vm.emit("save", &[]);
	assert_eq!(*calls.borrow(), vec!["after"]);
	assert_eq!(*errors.borrow(), vec!["event handler for \"save\": disk full"]);
}

#[test]
fn test_hook_event_flag_set_by_prefix() {
	let mut vm = instance();
	assert!(!vm.events.has_hook_event());
	vm.on("ready", &Handler::new(|_, _| Ok(())));
	assert!(!vm.events.has_hook_event());
	vm.on("hook:mounted", &Handler::new(|_, _| Ok(())));
	assert!(vm.events.has_hook_event());
}

#[test]
fn test_off_with_names_and_handler_removes_it_from_each() {
	let calls = Calls::default();
	let mut vm = instance();
	let f = recorder(&calls, "f");
	let other = recorder(&calls, "other");
	vm.on(["a", "b"], &f).on("a", &other);

	vm.off(["a", "b"], Some(&f));
	assert_eq!(vm.listener_count("a"), 1);
	assert_eq!(vm.listener_count("b"), 0);

	vm.emit("a", &[]).emit("b", &[]);
	assert_eq!(*calls.borrow(), vec!["other"]);
}

#[test]
fn test_mixed_case_emit_tips_in_development() {
	let output = mixed_case_emit(Mode::Development);
	let tips: Vec<&str> = output.lines().filter(|l| l.contains("kind=\"tip\"")).collect();
	assert_eq!(tips.len(), 1, "{output}");
	assert!(tips[0].contains("WARN"));
	assert!(tips[0].contains("\"myevent\""));
	assert!(tips[0].contains("\"my-event\""));
}

#[test]
fn test_mixed_case_emit_is_silent_in_production() {
	let output = mixed_case_emit(Mode::Production);
	assert!(!output.contains("kind=\"tip\""), "{output}");
}
