//! Backend-neutral where predicates.
//!
//! A [`Where`] compares one column against a literal. Builders collect them in
//! a [`Filter`], which keeps at most one predicate per column: adding a second
//! predicate for the same column replaces the first.

use crate::errors::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// How a [`Where`] compares its column with its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Equals,
    NotEquals,
    /// Case-insensitive string equality
    EqualsIgnoreCase,
}

/// A single column comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    field: String,
    value: Value,
    comparison: Comparison,
}

impl Where {
    /// Equality predicate. A `null` value matches missing/null columns, as the backend defines it.
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            comparison: Comparison::Equals,
        }
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            comparison: Comparison::NotEquals,
        }
    }

    /// Case-insensitive equality.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `value` is `null`.
    pub fn equals_ignore_case(field: impl Into<String>, value: impl Into<Value>) -> Result<Self> {
        let field = field.into();
        let value = value.into();
        if value.is_null() {
            return Err(Error::invalid_argument(format!(
                "cannot compare `{field}` ignoring case with a null value"
            )));
        }
        Ok(Self {
            field,
            value,
            comparison: Comparison::EqualsIgnoreCase,
        })
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub const fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// The value a row must hold to satisfy this predicate, if that value is unique.
    ///
    /// Only equality predicates have one; this is what an upsert uses to fill
    /// in the key columns of a freshly inserted row.
    #[must_use]
    pub const fn literal(&self) -> Option<&Value> {
        match self.comparison {
            Comparison::Equals | Comparison::EqualsIgnoreCase => Some(&self.value),
            Comparison::NotEquals => None,
        }
    }

    /// The value as text, used for case-insensitive comparisons.
    #[must_use]
    pub fn text_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// The predicates of one action, keyed by column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    wheres: BTreeMap<String, Where>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `predicate`, replacing any earlier predicate on the same column.
    pub fn insert(&mut self, predicate: Where) {
        self.wheres.insert(predicate.field.clone(), predicate);
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Where> {
        self.wheres.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Where> {
        self.wheres.values()
    }

    /// `(column, literal)` pairs of all equality predicates.
    pub fn literals(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter()
            .filter_map(|predicate| predicate.literal().map(|value| (predicate.field(), value)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wheres.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wheres.is_empty()
    }
}
