
/// `fooBarBaz` → `foo-bar-baz`.
///
/// Only uppercase letters that follow a word character get a dash, so a
/// leading capital is lowered without one.
pub fn hyphenate(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 4);
	let mut prev_word = false;
	for c in s.chars() {
		if c.is_ascii_uppercase() {
			if prev_word {
				out.push('-');
			}
			out.push(c.to_ascii_lowercase());
		} else {
			out.push(c);
		}
		prev_word = c.is_alphanumeric() || c == '_';
	}
	out
}

/// `foo-bar` → `fooBar`.
pub fn camelize(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let mut chars = s.chars().peekable();
	while let Some(c) = chars.next() {
		if c == '-'
			&& let Some(&next) = chars.peek()
			&& (next.is_alphanumeric() || next == '_')
		{
			chars.next();
			out.extend(next.to_uppercase());
			continue;
		}
		out.push(c);
	}
	out
}

/// Uppercases the first character.
pub fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// `my-widget_item` → `MyWidgetItem`, used for component display names.
pub fn classify(s: &str) -> String {
	let mut out = String::with_capacity(s.len());
	let mut upper_next = true;
	for c in s.chars() {
		if c == '-' || c == '_' {
			upper_next = true;
			continue;
		}
		if upper_next && c.is_alphanumeric() {
			out.extend(c.to_uppercase());
		} else {
			out.push(c);
		}
		upper_next = false;
	}
	out
}

/// Display name used in diagnostics: `<Root>`, `<MyWidget>` or `<Anonymous>`.
pub fn format_component_name(name: Option<&str>, is_root: bool) -> String {
	if is_root {
		return "<Root>".to_string();
	}
	match name {
		Some(name) if !name.is_empty() => format!("<{}>", classify(name)),
		_ => "<Anonymous>".to_string(),
	}
}
