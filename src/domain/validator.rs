//! Accumulating field validator.
//!
//! Rules are checked one after another and every failure is recorded under the
//! field it concerns, so a single response can report all problems at once.
//! Only the first failure per field is kept.

use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no rule has failed so far.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records `message` for `field` unless the field already has an error.
    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Records `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

/// Membership test used by safelist rules.
pub fn in_list<T: PartialEq + ?Sized>(value: &T, candidates: &[&T]) -> bool {
    candidates.iter().any(|c| *c == value)
}
