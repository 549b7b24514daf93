use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[cfg(test)]
mod tests;

/// Reasons a component name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
	#[error(
		"Invalid component name: \"{0}\". Component names should conform to valid custom element name in html5 specification."
	)]
	InvalidPattern(String),
	#[error("Do not use built-in or reserved HTML elements as component id: {0}")]
	Reserved(String),
}

/// Letters accepted after the leading ASCII letter of a component name.
static COMPONENT_NAME: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(concat!(
		r"^[a-zA-Z][\-\.0-9_a-zA-Z",
		r"\x{00B7}\x{00C0}-\x{00D6}\x{00D8}-\x{00F6}\x{00F8}-\x{037D}\x{037F}-\x{1FFF}",
		r"\x{200C}-\x{200D}\x{203F}-\x{2040}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}",
		r"\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}]*$",
	))
	.expect("component name pattern is valid")
});

const BUILTIN_TAGS: &[&str] = &["slot", "component"];

const HTML_TAGS: &[&str] = &[
	"html", "body", "base", "head", "link", "meta", "style", "title", "address", "article",
	"aside", "footer", "header", "h1", "h2", "h3", "h4", "h5", "h6", "hgroup", "nav", "section",
	"div", "dd", "dl", "dt", "figcaption", "figure", "picture", "hr", "img", "li", "main", "ol",
	"p", "pre", "ul", "a", "b", "abbr", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em",
	"i", "kbd", "mark", "q", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "span", "strong",
	"sub", "sup", "time", "u", "var", "wbr", "area", "audio", "map", "track", "video", "embed",
	"object", "param", "source", "canvas", "script", "noscript", "del", "ins", "caption", "col",
	"colgroup", "table", "thead", "tbody", "td", "th", "tr", "button", "datalist", "fieldset",
	"form", "input", "label", "legend", "meter", "optgroup", "option", "output", "progress",
	"select", "textarea", "details", "dialog", "menu", "menuitem", "summary", "content",
	"element", "shadow", "template", "blockquote", "iframe", "tfoot",
];

const SVG_TAGS: &[&str] = &[
	"svg", "animate", "circle", "clippath", "cursor", "defs", "desc", "ellipse", "filter",
	"font-face", "foreignobject", "g", "glyph", "image", "line", "marker", "mask",
	"missing-glyph", "path", "pattern", "polygon", "polyline", "rect", "switch", "symbol", "text",
	"textpath", "tspan", "use", "view",
];

/// `slot` and `component`, compared case-insensitively.
pub fn is_builtin_tag(tag: &str) -> bool {
	BUILTIN_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Standard HTML and SVG element names.
pub fn is_reserved_html_tag(tag: &str) -> bool {
	HTML_TAGS.contains(&tag) || SVG_TAGS.contains(&tag)
}

/// Checks `name` against the custom element naming rules.
///
/// `is_reserved` lets the caller extend the reserved set beyond the built-in
/// `slot`/`component` tags (platform element tables, user configuration).
pub fn validate_component_name(
	name: &str,
	is_reserved: impl Fn(&str) -> bool,
) -> Result<(), NameError> {
	if !COMPONENT_NAME.is_match(name) {
		return Err(NameError::InvalidPattern(name.to_string()));
	}
	if is_builtin_tag(name) || is_reserved(name) {
		return Err(NameError::Reserved(name.to_string()));
	}
	Ok(())
}
