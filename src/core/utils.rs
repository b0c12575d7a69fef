use std::cmp::Ordering;
use rand::Rng;
use sha1::{Digest, Sha1};
use uuid::Uuid;
use crate::core::error::{Error, Result};
use crate::core::types::Value;

/// Generate a primary key for rows inserted without one.
///
/// Two random fractions are hashed with SHA-1 and the first 16 bytes of the
/// digest are laid out as a hyphenated UUID (8-4-4-4-12 hex digits).
/// Uniqueness is not guaranteed, callers must check for collisions.
pub fn generate_uuid() -> String {
    let mut rng = rand::thread_rng();
    let seed = format!("{}{}", rng.r#gen::<f64>(), rng.r#gen::<f64>());
    let digest = Sha1::digest(seed.as_bytes());

    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Uuid::from_bytes(bytes).hyphenated().to_string()
}

/// Total order over comparable values.
///
/// Arrays compare element-wise then by length, `false < true`, numbers and
/// strings naturally, `null == null`. Values of different kinds order by
/// kind rank: array < boolean < null < number < object < string.
/// Objects (and error values) are not comparable.
///
/// `None` means the operands are unordered: a NaN takes part in the
/// comparison, so no relation but inequality holds.
pub fn compare(a: &Value, b: &Value) -> Result<Option<Ordering>> {
    match (a, b) {
        (Value::Object(_) | Value::Error(_), _) | (_, Value::Object(_) | Value::Error(_)) => {
            Err(Error::type_mismatch(format!(
                "Cannot compare {} with {}: objects are not comparable",
                a.type_name(),
                b.type_name()
            )))
        }
        (Value::Array(left), Value::Array(right)) => {
            for (l, r) in left.iter().zip(right.iter()) {
                match compare(l, r)? {
                    Some(Ordering::Equal) => continue,
                    other => return Ok(other),
                }
            }
            Ok(Some(left.len().cmp(&right.len())))
        }
        (Value::Bool(l), Value::Bool(r)) => Ok(Some(l.cmp(r))),
        (Value::Number(l), Value::Number(r)) => Ok(l.partial_cmp(r)),
        (Value::String(l), Value::String(r)) => Ok(Some(l.cmp(r))),
        (Value::Null, Value::Null) => Ok(Some(Ordering::Equal)),
        _ => Ok(Some(a.kind().cmp(&b.kind()))),
    }
}
