//! Identifier derivation from wire-format names
//!
//! Service models name things the way the wire does (`BucketName`,
//! `x-amz-request-id`, `IPv6Addresses`). Generated code wants
//! lower-camel fields and upper-camel types, with reserved words and
//! digit-leading names escaped. These are pure string functions with no
//! shape-graph dependency.

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use std::collections::HashSet;
use std::sync::LazyLock;

/// Words that cannot be used as identifiers in the generated sources.
static RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "abstract", "as", "assert", "async", "await", "break", "case", "catch", "class", "const",
        "continue", "default", "do", "dynamic", "else", "enum", "export", "extends", "external",
        "false", "final", "finally", "for", "function", "get", "if", "implements", "import", "in",
        "interface", "is", "new", "null", "operator", "part", "return", "set", "static", "super",
        "switch", "this", "throw", "true", "try", "typedef", "var", "void", "while", "with",
        "yield",
    ]
    .into_iter()
    .collect()
});

/// Derive a field identifier from a wire name.
///
/// Lower-camel casing with separator stripping; reserved words get a
/// trailing underscore, names starting with a digit get a leading one.
pub fn field_name(wire: &str) -> String {
    escape(wire.to_lower_camel_case())
}

/// Derive a type identifier from a wire name.
pub fn type_name(wire: &str) -> String {
    escape(wire.to_upper_camel_case())
}

/// Derive an enum-variant identifier from an enumerated wire literal.
///
/// Literals such as `"us-west-2"` or `"m5.xlarge"` carry characters no
/// identifier may, so everything outside `[A-Za-z0-9]` acts as a word
/// boundary before camel-casing.
pub fn variant_name(literal: &str) -> String {
    let words: String = literal
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    escape(words.to_lower_camel_case())
}

fn escape(name: String) -> String {
    if name.is_empty() {
        return name;
    }
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return format!("_{name}");
    }
    if RESERVED_WORDS.contains(name.as_str()) {
        return format!("{name}_");
    }
    name
}
