use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use crate::core::error::{Error, Result};
use crate::core::types::Value;

/// Primary key value as indexed inside a table.
///
/// Numbers and strings live in disjoint key spaces so `1` and `"1"` never
/// collide. Numbers are finite with `-0` folded into `0`, and order by value;
/// every number sorts before every string.
#[derive(Debug, Clone)]
pub enum InternalKey {
    Number(f64),
    String(String),
}

impl InternalKey {
    /// Build the key for a primary key value. Only finite numbers and
    /// strings are valid primary keys.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            // -0 and 0 are the same key
            Value::Number(n) if n.is_finite() => {
                Ok(InternalKey::Number(if *n == 0.0 { 0.0 } else { *n }))
            }
            Value::String(s) => Ok(InternalKey::String(s.clone())),
            other => Err(Error::type_mismatch(format!(
                "Primary key must be a finite number or a string, got {} {}",
                other.type_name(),
                other
            ))),
        }
    }
}

impl PartialEq for InternalKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for InternalKey {}

impl PartialOrd for InternalKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternalKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (InternalKey::Number(a), InternalKey::Number(b)) => a.total_cmp(b),
            (InternalKey::String(a), InternalKey::String(b)) => a.cmp(b),
            (InternalKey::Number(_), InternalKey::String(_)) => Ordering::Less,
            (InternalKey::String(_), InternalKey::Number(_)) => Ordering::Greater,
        }
    }
}

impl Hash for InternalKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            InternalKey::Number(n) => {
                0u8.hash(state);
                n.to_bits().hash(state);
            }
            InternalKey::String(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for InternalKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InternalKey::Number(n) => write!(f, "N{}", n),
            InternalKey::String(text) => write!(f, "S{}", text),
        }
    }
}
