use std::fmt;

/// The pluggable registries every constructor carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
	Component,
	Directive,
	Filter,
}

impl AssetType {
	/// All asset types, in registration order.
	pub const ALL: [AssetType; 3] = [AssetType::Component, AssetType::Directive, AssetType::Filter];

	/// Singular name, as used in diagnostics.
	pub const fn name(self) -> &'static str {
		match self {
			AssetType::Component => "component",
			AssetType::Directive => "directive",
			AssetType::Filter => "filter",
		}
	}

	/// Option key holding this asset type's registry (`components`, ...).
	pub const fn option_key(self) -> &'static str {
		match self {
			AssetType::Component => "components",
			AssetType::Directive => "directives",
			AssetType::Filter => "filters",
		}
	}

	/// Maps an option key back to its asset type.
	pub fn from_option_key(key: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|ty| ty.option_key() == key)
	}
}

impl fmt::Display for AssetType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}
