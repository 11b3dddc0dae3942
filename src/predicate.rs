use serde_json::Value;
use thiserror::Error;

use crate::geo::{haversine_miles, GeoPoint};
use crate::model::{compare_values, field, number_field, type_name, values_equal, Record};

// ---------------------------------------------------------------------------
// EvalError – the recoverable (per-record) failure tier
// ---------------------------------------------------------------------------

/// Why a predicate could not be evaluated against a record.
///
/// These faults are semantic mismatches on well-formed records (a missing
/// key, a string where a number was expected). The loader isolates them
/// per line; they never abort a scan. Structural problems — a line that is
/// not valid JSON — are a different tier entirely and never reach here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("field '{0}' not present in record")]
    MissingField(String),
    #[error("field '{field}' is a {found}, expected a {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("cannot order a {0} against a {1}")]
    Incomparable(&'static str, &'static str),
}

// ---------------------------------------------------------------------------
// Predicate – a closed set of record tests
// ---------------------------------------------------------------------------

/// A boolean test over one [`Record`].
///
/// Leaf variants test a single field; `Any` / `All` compose other
/// predicates. Evaluation is stateless and returns
/// `Result<bool, EvalError>`: matched, not matched, or could-not-evaluate.
/// Adding a kind means adding a variant, a constructor, and an arm in
/// [`Predicate::eval`].
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// record[field] == target. Numbers compare numerically; a value of a
    /// different type is simply not equal.
    Equals { field: String, target: Value },
    /// record[field] < target (numbers or strings).
    LessThan { field: String, target: Value },
    /// record[field] > target (numbers or strings).
    GreaterThan { field: String, target: Value },
    /// Case-insensitive substring match on a string field.
    Substring { field: String, needle: String },
    /// record[field] equals some element of the collection.
    MemberOf { field: String, collection: Vec<Value> },
    /// Haversine distance from `center` to the record's
    /// (`latitude`, `longitude`) is strictly below `radius_miles`.
    WithinRadius { center: GeoPoint, radius_miles: f64 },
    /// Matches nothing.
    Never,
    /// Matches everything; the default for unfiltered loads.
    Always,
    /// At least one sub-predicate matches. Short-circuits on first true.
    Any(Vec<Predicate>),
    /// Every sub-predicate matches. Short-circuits on first false.
    All(Vec<Predicate>),
}

impl Default for Predicate {
    fn default() -> Self {
        Predicate::Always
    }
}

impl Predicate {
    pub fn equals(field: impl Into<String>, target: impl Into<Value>) -> Self {
        Predicate::Equals {
            field: field.into(),
            target: target.into(),
        }
    }

    pub fn less_than(field: impl Into<String>, target: impl Into<Value>) -> Self {
        Predicate::LessThan {
            field: field.into(),
            target: target.into(),
        }
    }

    pub fn greater_than(field: impl Into<String>, target: impl Into<Value>) -> Self {
        Predicate::GreaterThan {
            field: field.into(),
            target: target.into(),
        }
    }

    pub fn substring(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::Substring {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn member_of(field: impl Into<String>, collection: Vec<Value>) -> Self {
        Predicate::MemberOf {
            field: field.into(),
            collection,
        }
    }

    pub fn within_radius(center: GeoPoint, radius_miles: f64) -> Self {
        Predicate::WithinRadius {
            center,
            radius_miles,
        }
    }

    /// Evaluate against one record.
    ///
    /// Errors from sub-predicates inside `Any` / `All` propagate; the only
    /// place a fault is swallowed is the loader's per-line boundary.
    pub fn eval(&self, record: &Record) -> Result<bool, EvalError> {
        match self {
            Predicate::Equals { field: name, target } => {
                Ok(values_equal(field(record, name)?, target))
            }
            Predicate::LessThan { field: name, target } => {
                Ok(compare_values(field(record, name)?, target)?.is_lt())
            }
            Predicate::GreaterThan { field: name, target } => {
                Ok(compare_values(field(record, name)?, target)?.is_gt())
            }
            Predicate::Substring { field: name, needle } => {
                let value = field(record, name)?;
                let haystack = value.as_str().ok_or_else(|| EvalError::TypeMismatch {
                    field: name.clone(),
                    expected: "string",
                    found: type_name(value),
                })?;
                Ok(haystack.to_lowercase().contains(&needle.to_lowercase()))
            }
            Predicate::MemberOf { field: name, collection } => {
                let value = field(record, name)?;
                Ok(collection.iter().any(|candidate| values_equal(value, candidate)))
            }
            Predicate::WithinRadius { center, radius_miles } => {
                let point = GeoPoint::new(
                    number_field(record, "latitude")?,
                    number_field(record, "longitude")?,
                );
                Ok(haversine_miles(*center, point) < *radius_miles)
            }
            Predicate::Never => Ok(false),
            Predicate::Always => Ok(true),
            Predicate::Any(subs) => {
                for sub in subs {
                    if sub.eval(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Predicate::All(subs) => {
                for sub in subs {
                    if !sub.eval(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}
