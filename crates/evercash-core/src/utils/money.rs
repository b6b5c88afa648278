//! Conversion between wire amounts (integer minor units, e.g. cents) and
//! in-memory amounts (decimal major units).
//!
//! Encoding multiplies and rounds, decoding divides. For every integer `x`
//! in the representable range, `to_minor(from_minor(x)) == x`.

/// Minor units per major unit.
const MINOR_PER_MAJOR: f64 = 100.0;

/// Convert a major-unit amount (123.45) to minor units (12345).
pub fn to_minor(major: f64) -> i64 {
    (major * MINOR_PER_MAJOR).round() as i64
}

/// Convert minor units (12345) to a major-unit amount (123.45).
pub fn from_minor(minor: i64) -> f64 {
    minor as f64 / MINOR_PER_MAJOR
}

/// Serde adapter for `f64` major-unit fields carried as minor units on the wire.
///
/// Deserialization accepts integers and floats (some endpoints send `1234.0`).
pub mod minor_units {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(super::to_minor(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Ok(raw / super::MINOR_PER_MAJOR)
    }
}

/// Same as [`minor_units`] for optional fields (absent stays absent).
pub mod minor_units_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&super::to_minor(*v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(raw.map(|v| v / super::MINOR_PER_MAJOR))
    }
}
