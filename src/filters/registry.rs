use std::collections::HashMap;

use chrono::NaiveDate;

use super::predicate::{FilterValue, Predicate};
use super::FilterError;

/// How a present-but-empty request value is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Blank values are ignored as if the key were absent.
    SkipEmpty,
    /// Any present value reaches the builder, blank included.
    ApplyWhenPresent,
}

type Builder = Box<dyn Fn(&str) -> Result<Predicate, FilterError> + Send + Sync>;

/// One registered filterable field.
pub struct FieldFilter {
    pub field: &'static str,
    pub policy: EmptyPolicy,
    build: Builder,
}

impl FieldFilter {
    pub fn new<F>(field: &'static str, policy: EmptyPolicy, build: F) -> Self
    where
        F: Fn(&str) -> Result<Predicate, FilterError> + Send + Sync + 'static,
    {
        Self {
            field,
            policy,
            build: Box::new(build),
        }
    }

    pub fn contains(field: &'static str, column: &'static str) -> Self {
        Self::new(field, EmptyPolicy::SkipEmpty, move |raw| {
            Ok(Predicate::Contains {
                column,
                needle: raw.to_string(),
            })
        })
    }

    pub fn exact_text(field: &'static str, column: &'static str) -> Self {
        Self::new(field, EmptyPolicy::SkipEmpty, move |raw| {
            Ok(Predicate::Equals {
                column,
                value: FilterValue::Text(raw.to_string()),
            })
        })
    }

    pub fn exact_integer(field: &'static str, column: &'static str) -> Self {
        Self::new(field, EmptyPolicy::ApplyWhenPresent, move |raw| {
            Ok(Predicate::Equals {
                column,
                value: FilterValue::Integer(parse_integer(field, raw)?),
            })
        })
    }

    pub fn exact_number(field: &'static str, column: &'static str) -> Self {
        Self::new(field, EmptyPolicy::ApplyWhenPresent, move |raw| {
            let value = raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| FilterError::malformed(field, raw, "a number"))?;
            Ok(Predicate::Equals {
                column,
                value: FilterValue::Real(value),
            })
        })
    }

    pub fn same_day(field: &'static str, column: &'static str) -> Self {
        Self::new(field, EmptyPolicy::SkipEmpty, move |raw| {
            let day = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| FilterError::malformed(field, raw, "a date (YYYY-MM-DD)"))?;
            Ok(Predicate::SameDay {
                column,
                day: day.format("%Y-%m-%d").to_string(),
            })
        })
    }

    /// Matches rows whose `column` points at a `parent_table` row owned by the given id.
    pub fn owned_through(
        field: &'static str,
        column: &'static str,
        parent_table: &'static str,
        parent_column: &'static str,
    ) -> Self {
        Self::new(field, EmptyPolicy::ApplyWhenPresent, move |raw| {
            Ok(Predicate::Related {
                column,
                parent_table,
                parent_column,
                value: parse_integer(field, raw)?,
            })
        })
    }

    fn apply(&self, raw: &str) -> Option<Result<Predicate, FilterError>> {
        if self.policy == EmptyPolicy::SkipEmpty && raw.trim().is_empty() {
            return None;
        }
        Some((self.build)(raw))
    }
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64, FilterError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| FilterError::malformed(field, raw, "an integer"))
}

/// Ordered field filters for one resource.
#[derive(Default)]
pub struct FilterSpec {
    fields: Vec<FieldFilter>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, filter: FieldFilter) -> Self {
        self.fields.push(filter);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.field)
    }

    /// Composes the predicate in registration order; request order is irrelevant.
    pub fn resolve(&self, params: &HashMap<String, String>) -> Result<Predicate, FilterError> {
        let mut predicate = Predicate::identity();
        for filter in &self.fields {
            let Some(raw) = params.get(filter.field) else {
                continue;
            };
            if let Some(built) = filter.apply(raw) {
                predicate = predicate.and(built?);
            }
        }
        Ok(predicate)
    }
}

/// Resource name -> filter spec. Built once at startup, read-only afterwards.
#[derive(Default)]
pub struct FilterRegistry {
    specs: HashMap<&'static str, FilterSpec>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, resource: &'static str, spec: FilterSpec) -> Self {
        self.specs.insert(resource, spec);
        self
    }

    pub fn spec(&self, resource: &str) -> Option<&FilterSpec> {
        self.specs.get(resource)
    }

    /// Unregistered resources resolve to the identity predicate.
    pub fn resolve(
        &self,
        resource: &str,
        params: &HashMap<String, String>,
    ) -> Result<Predicate, FilterError> {
        let predicate = match self.specs.get(resource) {
            Some(spec) => spec.resolve(params)?,
            None => Predicate::identity(),
        };
        tracing::debug!(resource, ?predicate, "filters resolved");
        Ok(predicate)
    }
}
