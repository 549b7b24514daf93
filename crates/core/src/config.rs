//! Runtime configuration shared by a root constructor and everything derived
//! from it.
//!
//! The plain fields can be loaded from TOML through [`ConfigFile`]; handlers and
//! custom merge strategies are installed programmatically.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap as HashMap;
use serde::Deserialize;
use tessera_primitives::is_reserved_html_tag;

use crate::diag::InstanceInfo;
use crate::error::{HandlerError, HandlerResult, Result};
use crate::options::OptionValue;


/// Development mode enables validation and warnings; production skips both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	Development,
	Production,
}

impl Default for Mode {
	fn default() -> Self {
		if cfg!(debug_assertions) {
			Mode::Development
		} else {
			Mode::Production
		}
	}
}

/// Receives every failure routed out of a hook or handler: the error, the
/// instance it came from and a short description of the call site.
pub type ErrorHandler = Rc<dyn Fn(&HandlerError, &InstanceInfo, &str) -> HandlerResult>;

/// Replaces the default `tracing` sink for development warnings.
pub type WarnHandler = Rc<dyn Fn(&str, Option<&InstanceInfo>)>;

/// Custom merge strategy for one option key: `(parent, child, key) -> merged`.
pub type MergeStrategy =
	Rc<dyn Fn(Option<&OptionValue>, Option<&OptionValue>, &str) -> Option<OptionValue>>;

#[derive(Clone, Default)]
pub struct Config {
	pub mode: Mode,
	/// Suppresses warnings that would go to the log.
	pub silent: bool,
	/// Reports instance init timings (development only).
	pub performance: bool,
	/// Tags treated as reserved in addition to the HTML and SVG element names.
	pub reserved_tags: Vec<String>,
	pub error_handler: Option<ErrorHandler>,
	pub warn_handler: Option<WarnHandler>,
	pub option_merge_strategies: HashMap<Box<str>, MergeStrategy>,
}

impl Config {
	pub fn is_dev(&self) -> bool {
		self.mode == Mode::Development
	}

	pub fn is_reserved_tag(&self, tag: &str) -> bool {
		is_reserved_html_tag(tag) || self.reserved_tags.iter().any(|t| t == tag)
	}

	/// Parses a [`ConfigFile`] and applies it over the defaults.
	pub fn from_toml_str(text: &str) -> Result<Self> {
		let file: ConfigFile = toml::from_str(text)?;
		let mut config = Self::default();
		config.apply_file(file);
		Ok(config)
	}

	/// Overwrites the fields a config file sets, leaving the rest untouched.
	pub fn apply_file(&mut self, file: ConfigFile) {
		if let Some(mode) = file.mode {
			self.mode = mode;
		}
		if let Some(silent) = file.silent {
			self.silent = silent;
		}
		if let Some(performance) = file.performance {
			self.performance = performance;
		}
		self.reserved_tags.extend(file.reserved_tags);
	}

	pub fn with_error_handler(
		mut self,
		handler: impl Fn(&HandlerError, &InstanceInfo, &str) -> HandlerResult + 'static,
	) -> Self {
		self.error_handler = Some(Rc::new(handler));
		self
	}

	pub fn with_warn_handler(mut self, handler: impl Fn(&str, Option<&InstanceInfo>) + 'static) -> Self {
		self.warn_handler = Some(Rc::new(handler));
		self
	}

	pub fn with_merge_strategy(
		mut self,
		key: impl Into<Box<str>>,
		strategy: impl Fn(Option<&OptionValue>, Option<&OptionValue>, &str) -> Option<OptionValue> + 'static,
	) -> Self {
		self.option_merge_strategies.insert(key.into(), Rc::new(strategy));
		self
	}
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Config")
			.field("mode", &self.mode)
			.field("silent", &self.silent)
			.field("performance", &self.performance)
			.field("reserved_tags", &self.reserved_tags)
			.field("error_handler", &self.error_handler.is_some())
			.field("warn_handler", &self.warn_handler.is_some())
			.field(
				"option_merge_strategies",
				&self.option_merge_strategies.keys().collect::<Vec<_>>(),
			)
			.finish()
	}
}

/// File-backed subset of [`Config`].
///
/// ```toml
/// mode = "production"
/// silent = true
/// reserved-tags = ["app-shell"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
	pub mode: Option<Mode>,
	pub silent: Option<bool>,
	pub performance: Option<bool>,
	pub reserved_tags: Vec<String>,
}
