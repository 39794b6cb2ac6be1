//! Canonical, collision-free naming for models and operations.
//!
//! Everything here is pure except [`ensure_unique_name`], which records the
//! chosen name in the caller-owned set. Each namespace (models, operations) is a
//! separate set owned by one build.

use std::collections::BTreeSet;

/// Split a raw identifier into words on every non-alphanumeric character.
fn split_words(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Lower-case the first letter of a string.
pub fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

fn guard_leading_digit(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// `pet_store` → `PetStore`, `foo` → `Foo`, `HTTPError` → `HTTPError`.
pub fn pascal_case_model_name(raw: &str) -> String {
    let joined: String = split_words(raw).map(capitalize_first).collect();
    if joined.is_empty() {
        return "Model".to_string();
    }
    guard_leading_digit(joined)
}

/// `list_pets` → `listPets`, `Get-Pet-By-Id` → `getPetById`.
pub fn camel_case_operation_name(raw: &str) -> String {
    let pascal: String = split_words(raw).map(capitalize_first).collect();
    if pascal.is_empty() {
        return "operation".to_string();
    }
    guard_leading_digit(lowercase_first(&pascal))
}

/// Fallback operation id built from the method and the path segments, with
/// template braces stripped: `get /pets/{id}` → `get_pets_id`.
pub fn derive_operation_id(method: &str, path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(|segment| segment.replace(['{', '}'], ""))
        .filter(|segment| !segment.is_empty())
        .collect();
    if segments.is_empty() {
        return method.to_lowercase();
    }
    format!("{}_{}", method.to_lowercase(), segments.join("_"))
}

/// Return `candidate` if unused, otherwise the first free `candidate2`,
/// `candidate3`, …; the returned name is inserted into `used`.
pub fn ensure_unique_name(candidate: &str, used: &mut BTreeSet<String>) -> String {
    if used.insert(candidate.to_string()) {
        return candidate.to_string();
    }
    let mut suffix = 2usize;
    loop {
        let name = format!("{candidate}{suffix}");
        if used.insert(name.clone()) {
            return name;
        }
        suffix += 1;
    }
}

/// The two independent uniqueness namespaces of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    /// Names claimed by `components.schemas` models.
    pub models: BTreeSet<String>,
    /// Names claimed by operations.
    pub operations: BTreeSet<String>,
}
