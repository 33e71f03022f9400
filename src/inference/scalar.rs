use crate::ir::Scalar;
use crate::value::Value;

/// Integral vs fractional, judged from the shortest round-trip decimal form.
///
/// Rust's `Display` for `f64` never switches to exponent notation, so the only
/// way a `.` shows up is a non-zero fractional part. A float written with an
/// all-zero fraction (`123.000`) therefore classifies as `Int`.
pub fn classify_number(n: f64) -> Scalar {
    if n.to_string().contains('.') {
        Scalar::Float
    } else {
        Scalar::Int
    }
}

/// `None` for null, arrays and objects.
pub fn classify_scalar(v: &Value) -> Option<Scalar> {
    match v {
        Value::Bool(_) => Some(Scalar::Bool),
        Value::String(_) => Some(Scalar::String),
        Value::Number(n) => Some(classify_number(*n)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
