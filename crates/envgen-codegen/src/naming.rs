//! Identifier conventions for generated code.

use heck::{ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use proc_macro2::{Ident, Span};

/// Words that cannot be written as raw identifiers.
const RESERVED: &[&str] = &["crate", "self", "Self", "super", "_"];

/// Case-normalize one name segment.
///
/// Underscores are removed; the character after each underscore is
/// upper-cased and every other character lower-cased. The first character
/// is upper-cased when `first_upper` is set.
///
/// ```
/// use envgen_codegen::naming::normalize;
///
/// assert_eq!(normalize("MAX_SIZE", true), "MaxSize");
/// assert_eq!(normalize("MAX_SIZE", false), "maxSize");
/// ```
pub fn normalize(segment: &str, first_upper: bool) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = first_upper;
    for c in segment.chars() {
        if c == '_' {
            upper = true;
            continue;
        }
        if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Field name for a segment, validated as a Rust identifier.
pub fn field_name(segment: &str) -> Result<String, String> {
    let name = segment.to_snake_case();
    validate(&name)?;
    Ok(name)
}

/// Struct name for the section reached through `segments`.
pub fn type_name<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref().to_upper_camel_case())
        .collect()
}

/// Constant holding the environment name of the field at `path`.
pub fn const_name<S: AsRef<str>>(path: &[S]) -> String {
    let joined: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
    format!("{}_ENV_NAME", joined.join("_").to_shouty_snake_case())
}

fn validate(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("segment has no identifier characters".to_string()),
        Some(c) if c.is_ascii_digit() => return Err(format!("`{name}` starts with a digit")),
        Some(c) if !(c == '_' || c.is_alphabetic()) => {
            return Err(format!("`{name}` is not a valid identifier"));
        }
        Some(_) => {}
    }
    if !chars.all(|c| c == '_' || c.is_alphanumeric()) {
        return Err(format!("`{name}` is not a valid identifier"));
    }
    if RESERVED.contains(&name) {
        return Err(format!("`{name}` is a reserved word"));
    }
    Ok(())
}

/// Build an identifier, escaping keywords as raw identifiers.
pub fn ident(name: &str) -> Ident {
    if syn::parse_str::<Ident>(name).is_ok() {
        Ident::new(name, Span::call_site())
    } else {
        Ident::new_raw(name, Span::call_site())
    }
}
