//! Filter resolver
//!
//! Turns an untrusted `field -> value` query map into a [`Predicate`] using the
//! field builders registered per resource at startup.

mod catalog;
mod predicate;
mod registry;

pub use catalog::{default_registry, resources, scopes};
pub use predicate::{FilterValue, Predicate};
pub use registry::{EmptyPolicy, FieldFilter, FilterRegistry, FilterSpec};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error("The {field} filter must be {expected}, got \"{value}\".")]
    MalformedValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl FilterError {
    pub fn malformed(field: &'static str, value: &str, expected: &'static str) -> Self {
        Self::MalformedValue {
            field,
            value: value.to_string(),
            expected,
        }
    }
}
