use rstest::rstest;

use super::*;

#[rstest]
#[case("my-component")]
#[case("MyComponent")]
#[case("x.y_z-1")]
#[case("héllo")]
fn test_valid_names(#[case] name: &str) {
	assert_eq!(validate_component_name(name, is_reserved_html_tag), Ok(()));
}

#[rstest]
#[case("1abc")]
#[case("-abc")]
#[case("has space")]
#[case("")]
fn test_invalid_pattern(#[case] name: &str) {
	assert_eq!(
		validate_component_name(name, is_reserved_html_tag),
		Err(NameError::InvalidPattern(name.to_string()))
	);
}

#[rstest]
#[case("slot")]
#[case("Component")]
#[case("div")]
#[case("svg")]
fn test_reserved_names(#[case] name: &str) {
	assert_eq!(
		validate_component_name(name, is_reserved_html_tag),
		Err(NameError::Reserved(name.to_string()))
	);
}

#[test]
fn test_reserved_predicate_is_caller_supplied() {
	assert!(validate_component_name("div", |_| false).is_ok());
	assert!(validate_component_name("widget", |t| t == "widget").is_err());
}
