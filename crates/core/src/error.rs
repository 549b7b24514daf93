//! Error types for the component core.

use thiserror::Error;

/// Failure raised by user code: hooks, event handlers, methods, watchers,
/// data factories and plugin installers.
///
/// Panics caught at an invocation boundary are converted into
/// [`HandlerError::Panicked`] so they travel the same route as returned errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
	/// The handler returned an error.
	#[error("{0}")]
	Failed(String),
	/// The handler panicked; carries the panic message when it was a string.
	#[error("panicked: {0}")]
	Panicked(String),
}

impl HandlerError {
	pub fn msg(msg: impl Into<String>) -> Self {
		Self::Failed(msg.into())
	}

	pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
		let msg = match payload.downcast::<String>() {
			Ok(s) => *s,
			Err(payload) => match payload.downcast::<&'static str>() {
				Ok(s) => (*s).to_string(),
				Err(_) => "non-string panic payload".to_string(),
			},
		};
		Self::Panicked(msg)
	}
}

impl From<String> for HandlerError {
	fn from(msg: String) -> Self {
		Self::Failed(msg)
	}
}

impl From<&str> for HandlerError {
	fn from(msg: &str) -> Self {
		Self::Failed(msg.to_string())
	}
}

/// Result type returned by user-supplied callbacks.
pub type HandlerResult<T = ()> = std::result::Result<T, HandlerError>;

/// Errors surfaced by core operations.
#[derive(Debug, Error)]
pub enum Error {
	/// A plugin's install path failed; the plugin is not recorded as installed.
	#[error("plugin installation failed: {0}")]
	PluginInstall(#[source] HandlerError),
	/// `Instance::call` named a method the instance does not have.
	#[error("unknown method: {0}")]
	UnknownMethod(String),
	/// A method invoked through `Instance::call` failed.
	#[error(transparent)]
	Handler(#[from] HandlerError),
	/// Configuration text could not be parsed.
	#[error("invalid config: {0}")]
	Config(#[from] toml::de::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
