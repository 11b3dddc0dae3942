use serde_json::{Map, Value};

use crate::predicate::EvalError;

// ---------------------------------------------------------------------------
// Record – one decoded line of a JSONL file
// ---------------------------------------------------------------------------

/// One record: a dynamically-typed JSON object decoded from a single line.
///
/// No schema is imposed here; individual predicates assume the keys they
/// need (e.g. `"latitude"`, `"stars"`) and fault per-record when a key is
/// absent or the wrong shape.
pub type Record = Map<String, Value>;

/// Human-readable name of a JSON value's type, used in error reasons.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Look up a field, faulting with [`EvalError::MissingField`] if absent.
pub fn field<'a>(record: &'a Record, name: &str) -> Result<&'a Value, EvalError> {
    record
        .get(name)
        .ok_or_else(|| EvalError::MissingField(name.to_string()))
}

/// Look up a field and require it to be numeric.
pub fn number_field(record: &Record, name: &str) -> Result<f64, EvalError> {
    match field(record, name)? {
        Value::Number(n) => Ok(n.as_f64().unwrap_or(f64::NAN)),
        other => Err(EvalError::TypeMismatch {
            field: name.to_string(),
            expected: "number",
            found: type_name(other),
        }),
    }
}

// ---------------------------------------------------------------------------
// Value comparison semantics
// ---------------------------------------------------------------------------

/// Equality across JSON values. Numbers compare numerically, so an integer
/// `1` equals a float `1.0`. Values of different types are unequal, never
/// an error.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            x.as_f64().unwrap_or(f64::NAN) == y.as_f64().unwrap_or(f64::NAN)
        }
        _ => a == b,
    }
}

/// Ordering across JSON values: numbers numerically, strings
/// lexicographically. Anything else (including a number against a string)
/// is [`EvalError::Incomparable`].
pub fn compare_values(a: &Value, b: &Value) -> Result<std::cmp::Ordering, EvalError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => Ok(x
            .as_f64()
            .unwrap_or(f64::NAN)
            .total_cmp(&y.as_f64().unwrap_or(f64::NAN))),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => Err(EvalError::Incomparable(type_name(a), type_name(b))),
    }
}
