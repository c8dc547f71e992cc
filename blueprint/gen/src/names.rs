//! Identifier helpers.
//!
//! Design names are free-form strings; everything emitted goes through
//! these helpers so an unusable name becomes an error instead of a panic
//! in `format_ident!`.

use std::collections::BTreeSet;

use convert_case::{Case, Casing};
use proc_macro2::Ident;

use crate::errors::GeneratorError;

// Strict and reserved keywords that cannot be plain identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Parses `name` as an identifier.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` when `name` is not a valid Rust
/// identifier.
pub fn ident(name: &str) -> Result<Ident, GeneratorError> {
    syn::parse_str::<Ident>(name)
        .map_err(|_| GeneratorError::CodeGenError(format!("'{name}' is not a valid identifier")))
}

/// Snake case form of `name`, suffixed with `_` when it is a keyword.
///
/// ## Examples
///
/// ```
/// use blueprint_gen::names::snake_name;
///
/// assert_eq!(snake_name("accountID"), "account_id");
/// assert_eq!(snake_name("X-Account"), "x_account");
/// assert_eq!(snake_name("type"), "type_");
/// ```
pub fn snake_name(name: &str) -> String {
    let snake = name.to_case(Case::Snake);
    if KEYWORDS.contains(&snake.as_str()) {
        format!("{snake}_")
    } else {
        snake
    }
}

/// Pascal case form of `name`.
///
/// ## Examples
///
/// ```
/// use blueprint_gen::names::pascal_name;
///
/// assert_eq!(pascal_name("bottle"), "Bottle");
/// assert_eq!(pascal_name("BottlePayload"), "BottlePayload");
/// assert_eq!(pascal_name("created_at"), "CreatedAt");
/// ```
pub fn pascal_name(name: &str) -> String {
    let pascal = name.to_case(Case::Pascal);
    if KEYWORDS.contains(&pascal.as_str()) {
        format!("{pascal}_")
    } else {
        pascal
    }
}

pub fn snake_ident(name: &str) -> Result<Ident, GeneratorError> {
    ident(&snake_name(name))
}

pub fn pascal_ident(name: &str) -> Result<Ident, GeneratorError> {
    ident(&pascal_name(name))
}

/// Hands out identifiers for generated temporaries.
///
/// Every call returns a name not handed out before, so nested closures
/// and blocks never shadow an outer temporary.
#[derive(Debug, Clone, Default)]
pub struct NameAllocator {
    used: BTreeSet<String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `name` as taken without returning it.
    pub fn reserve(&mut self, name: &str) {
        self.used.insert(name.to_string());
    }

    /// `base` if unused, else `base_1`, `base_2`, ...
    pub fn fresh(&mut self, base: &str) -> Ident {
        let mut candidate = base.to_string();
        let mut n = 0;
        while self.used.contains(&candidate) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        self.used.insert(candidate.clone());
        Ident::new(&candidate, proc_macro2::Span::call_site())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === NameAllocator tests ===

    #[test]
    fn allocator_suffixes_reused_names() {
        let mut names = NameAllocator::new();
        assert_eq!(names.fresh("item").to_string(), "item");
        assert_eq!(names.fresh("item").to_string(), "item_1");
        assert_eq!(names.fresh("item").to_string(), "item_2");
        assert_eq!(names.fresh("raw").to_string(), "raw");
    }

    #[test]
    fn allocator_respects_reservations() {
        let mut names = NameAllocator::new();
        names.reserve("value");
        assert_eq!(names.fresh("value").to_string(), "value_1");
    }

    // === ident tests ===

    #[test]
    fn ident_rejects_invalid_names() {
        assert!(ident("bottle").is_ok());
        assert!(ident("2bottles").is_err());
        assert!(ident("fn").is_err());
        assert!(ident("a-b").is_err());
    }

    #[test]
    fn keywords_get_a_suffix() {
        assert_eq!(snake_ident("match").unwrap().to_string(), "match_");
        assert_eq!(pascal_ident("self").unwrap().to_string(), "Self_");
    }
}
