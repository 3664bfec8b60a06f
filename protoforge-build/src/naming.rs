//! Case conversion and identifier escaping.
//!
//! Every function here is a pure mapping from a protobuf name to the text of
//! a Rust identifier.

use proc_macro2::{Ident, Span};

/// Convert a string to snake_case.
///
/// Handles consecutive uppercase letters correctly:
/// - "HTTPServer" -> "http_server"
/// - "myField" -> "my_field"
/// - "XMLParser" -> "xml_parser"
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
                let prev_boundary = prev.is_lowercase() || prev.is_ascii_digit();
                if prev_boundary || (prev.is_uppercase() && next_lower) {
                    result.push('_');
                }
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert a string to PascalCase.
///
/// Underscores separate words. Words written entirely in capitals are
/// normalized (`PHONE_TYPE` -> `PhoneType`); mixed-case words keep their
/// spelling (`HTTPServer` stays as is).
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for word in s.split('_').filter(|word| !word.is_empty()) {
        let shouting = !word.chars().any(|c| c.is_lowercase());
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            if shouting {
                result.extend(chars.flat_map(char::to_lowercase));
            } else {
                result.extend(chars);
            }
        }
    }
    if result.is_empty() {
        // e.g. a name made only of underscores
        result.push('_');
    }
    result
}

/// Strips the SCREAMING_SNAKE form of `enum_name` from the front of
/// `value_name` when what remains still starts like an identifier.
///
/// `("PhoneType", "PHONE_TYPE_MOBILE")` -> `"MOBILE"`.
pub fn strip_enum_prefix<'a>(enum_name: &str, value_name: &'a str) -> &'a str {
    let prefix = to_snake_case(enum_name).to_ascii_uppercase();
    value_name
        .strip_prefix(prefix.as_str())
        .and_then(|rest| rest.strip_prefix('_'))
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic()))
        .unwrap_or(value_name)
}

/// Names that can never be used as identifiers, not even in raw form.
fn is_path_keyword(s: &str) -> bool {
    matches!(s, "self" | "Self" | "super" | "crate")
}

/// Check if a string is a Rust keyword.
fn is_rust_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "break"
            | "const"
            | "continue"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
            | "async"
            | "await"
            | "dyn"
            | "abstract"
            | "become"
            | "box"
            | "do"
            | "final"
            | "gen"
            | "macro"
            | "override"
            | "priv"
            | "typeof"
            | "unsized"
            | "virtual"
            | "yield"
            | "try"
    )
}

/// Escapes `name` so it can be used as an identifier: keywords get the raw
/// `r#` prefix, path keywords an `_` suffix.
pub fn escape(name: &str) -> String {
    if is_path_keyword(name) {
        format!("{name}_")
    } else if is_rust_keyword(name) {
        format!("r#{name}")
    } else {
        name.to_string()
    }
}

/// Builds an identifier from already escaped text.
pub fn ident(escaped: &str) -> Ident {
    match escaped.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(escaped, Span::call_site()),
    }
}

/// Field and oneof storage names.
pub fn field_name(name: &str) -> String {
    escape(&to_snake_case(name))
}

/// Module names for packages and for the nested scope of a message.
pub fn module_name(name: &str) -> String {
    escape(&to_snake_case(name))
}

/// Struct, enum and variant names.
pub fn type_name(name: &str) -> String {
    escape(&to_pascal_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("myField"), "my_field");
        assert_eq!(to_snake_case("firstName"), "first_name");

        // Consecutive uppercase (acronyms)
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("XMLParser"), "xml_parser");
        assert_eq!(to_snake_case("getHTTPResponse"), "get_http_response");

        assert_eq!(to_snake_case("my_field"), "my_field");
        assert_eq!(to_snake_case("HTTP"), "http");
        assert_eq!(to_snake_case("ID"), "id");
        assert_eq!(to_snake_case("A"), "a");
        assert_eq!(to_snake_case("MyMessage"), "my_message");
        assert_eq!(to_snake_case("Vec3D"), "vec3_d");
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("my_message"), "MyMessage");
        assert_eq!(to_pascal_case("MyMessage"), "MyMessage");
        assert_eq!(to_pascal_case("MOBILE"), "Mobile");
        assert_eq!(to_pascal_case("PHONE_TYPE_HOME"), "PhoneTypeHome");
        assert_eq!(to_pascal_case("Outer_Inner"), "OuterInner");
        assert_eq!(to_pascal_case("HTTPServer"), "HTTPServer");
        assert_eq!(to_pascal_case("V2"), "V2");
    }

    #[test]
    fn test_strip_enum_prefix() {
        assert_eq!(strip_enum_prefix("PhoneType", "PHONE_TYPE_MOBILE"), "MOBILE");
        assert_eq!(strip_enum_prefix("PhoneType", "MOBILE"), "MOBILE");
        // Remainder would start with a digit.
        assert_eq!(strip_enum_prefix("Level", "LEVEL_1"), "LEVEL_1");
        // The whole name is the prefix.
        assert_eq!(strip_enum_prefix("Color", "COLOR"), "COLOR");
    }

    #[test]
    fn test_keywords_are_escaped() {
        assert_eq!(field_name("type"), "r#type");
        assert_eq!(field_name("match"), "r#match");
        assert_eq!(field_name("async"), "r#async");
        assert_eq!(field_name("self"), "self_");
        assert_eq!(type_name("Self"), "Self_");
        assert_eq!(module_name("crate"), "crate_");
        assert_eq!(field_name("name"), "name");

        assert_eq!(ident("r#type").to_string(), "r#type");
        assert_eq!(ident("self_").to_string(), "self_");
    }
}
