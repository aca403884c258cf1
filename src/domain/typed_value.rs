// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed configuration values and type-safe conversions.
//!
//! Configuration records arrive from the store as raw strings paired with a
//! declared type tag. This module converts them once, at load time, into a
//! [`TypedValue`], and converts cached values back into whatever type a
//! caller requests through the [`FromTypedValue`] trait.

use crate::domain::errors::{ConfigError, Result};
use std::fmt;

/// A configuration value converted into its declared native type.
///
/// A `TypedValue` is produced once per record per refresh by
/// [`TypedValue::convert`] and then shared immutably through a snapshot.
/// The variant records which type tag the value was declared with, so read
/// diagnostics can name the stored type.
///
/// # Examples
///
/// ```
/// use dynconfig::domain::TypedValue;
///
/// let value = TypedValue::convert("50", "int").unwrap();
/// assert_eq!(value, TypedValue::Int(50));
///
/// // Unrecognized tags pass the raw string through unchanged.
/// let value = TypedValue::convert("a1b2", "uuid-ish").unwrap();
/// assert_eq!(value, TypedValue::Str("a1b2".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum TypedValue {
    /// A plain string value (tag `string` or any unrecognized tag).
    Str(String),
    /// A 32-bit signed integer (tag `int` or `integer`).
    Int(i32),
    /// A 64-bit signed integer (tag `long`).
    Long(i64),
    /// A 32-bit float (tag `float`).
    Float(f32),
    /// A 64-bit float (tag `double`).
    Double(f64),
    /// A decimal value (tag `decimal`), parsed with standard `f64` parsing.
    Decimal(f64),
    /// A boolean (tag `bool` or `boolean`), accepting `true`/`false`
    /// case-insensitively.
    Bool(bool),
}

impl TypedValue {
    /// Converts a raw string value into the type named by `type_tag`.
    ///
    /// Tag matching is case-insensitive. Recognized tags are `string`,
    /// `int`/`integer`, `bool`/`boolean`, `double`, `float`, `decimal` and
    /// `long`; anything else is treated as an opaque string. Numeric parsing
    /// uses Rust's standard, locale-invariant parsers.
    ///
    /// Fails only with [`ConfigError::ConversionFailure`] for this one value;
    /// callers loading a batch are expected to skip the record and continue.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynconfig::domain::TypedValue;
    ///
    /// assert_eq!(
    ///     TypedValue::convert("0.15", "double").unwrap(),
    ///     TypedValue::Double(0.15),
    /// );
    /// assert!(TypedValue::convert("not-a-number", "int").is_err());
    /// ```
    pub fn convert(value: &str, type_tag: &str) -> Result<TypedValue> {
        let converted = match type_tag.to_ascii_lowercase().as_str() {
            "int" | "integer" => TypedValue::Int(
                value
                    .parse()
                    .map_err(|e| Self::parse_error(type_tag, value, e))?,
            ),
            "bool" | "boolean" => match value.to_ascii_lowercase().as_str() {
                "true" => TypedValue::Bool(true),
                "false" => TypedValue::Bool(false),
                _ => {
                    return Err(ConfigError::conversion_failure(
                        type_tag,
                        value,
                        "expected 'true' or 'false'",
                    ))
                }
            },
            "double" => TypedValue::Double(
                value
                    .parse()
                    .map_err(|e| Self::parse_error(type_tag, value, e))?,
            ),
            "float" => TypedValue::Float(
                value
                    .parse()
                    .map_err(|e| Self::parse_error(type_tag, value, e))?,
            ),
            "decimal" => TypedValue::Decimal(
                value
                    .parse()
                    .map_err(|e| Self::parse_error(type_tag, value, e))?,
            ),
            "long" => TypedValue::Long(
                value
                    .parse()
                    .map_err(|e| Self::parse_error(type_tag, value, e))?,
            ),
            _ => TypedValue::Str(value.to_string()),
        };
        Ok(converted)
    }

    /// Returns the canonical tag name of the stored variant, for diagnostics.
    pub fn tag(&self) -> &'static str {
        match self {
            TypedValue::Str(_) => "string",
            TypedValue::Int(_) => "int",
            TypedValue::Long(_) => "long",
            TypedValue::Float(_) => "float",
            TypedValue::Double(_) => "double",
            TypedValue::Decimal(_) => "decimal",
            TypedValue::Bool(_) => "bool",
        }
    }

    fn parse_error(type_tag: &str, value: &str, err: impl std::error::Error) -> ConfigError {
        ConfigError::conversion_failure(type_tag, value, err.to_string())
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Str(v) => write!(f, "{}", v),
            TypedValue::Int(v) => write!(f, "{}", v),
            TypedValue::Long(v) => write!(f, "{}", v),
            TypedValue::Float(v) => write!(f, "{}", v),
            TypedValue::Double(v) => write!(f, "{}", v),
            TypedValue::Decimal(v) => write!(f, "{}", v),
            TypedValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

/// Conversion from a cached [`TypedValue`] to a caller-requested type.
///
/// This is the read-side half of the converter: an exact variant match is
/// returned directly, anything else goes through a generic numeric or string
/// conversion, and `None` signals that the stored value cannot represent the
/// requested type. Read paths turn `None` into the type's default value and
/// a logged diagnostic; they never raise.
///
/// The `Default` bound is what makes the "never throw on read" contract
/// possible: every requestable type has a zero value to fall back on.
pub trait FromTypedValue: Sized + Default {
    /// Attempts to represent `value` as `Self`.
    fn from_typed(value: &TypedValue) -> Option<Self>;
}

impl FromTypedValue for String {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        Some(value.to_string())
    }
}

impl FromTypedValue for bool {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Bool(v) => Some(*v),
            TypedValue::Int(v) => Some(*v != 0),
            TypedValue::Long(v) => Some(*v != 0),
            TypedValue::Str(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Widens any stored numeric variant to `f64`, parsing strings as a last
/// resort. Shared by the float and integer impls below.
fn as_f64(value: &TypedValue) -> Option<f64> {
    match value {
        TypedValue::Int(v) => Some(f64::from(*v)),
        TypedValue::Long(v) => Some(*v as f64),
        TypedValue::Float(v) => Some(f64::from(*v)),
        TypedValue::Double(v) | TypedValue::Decimal(v) => Some(*v),
        TypedValue::Str(s) => s.parse().ok(),
        TypedValue::Bool(_) => None,
    }
}

macro_rules! integer_from_typed {
    ($($ty:ty),*) => {$(
        impl FromTypedValue for $ty {
            fn from_typed(value: &TypedValue) -> Option<Self> {
                match value {
                    TypedValue::Int(v) => <$ty>::try_from(*v).ok(),
                    TypedValue::Long(v) => <$ty>::try_from(*v).ok(),
                    TypedValue::Str(s) => s.parse().ok(),
                    other => {
                        // Fractional values do not silently truncate.
                        let f = as_f64(other)?;
                        if f.fract() == 0.0 && f >= <$ty>::MIN as f64 && f <= <$ty>::MAX as f64 {
                            Some(f as $ty)
                        } else {
                            None
                        }
                    }
                }
            }
        }
    )*};
}

integer_from_typed!(i32, i64, u32, u64);

impl FromTypedValue for f64 {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        as_f64(value)
    }
}

impl FromTypedValue for f32 {
    fn from_typed(value: &TypedValue) -> Option<Self> {
        match value {
            TypedValue::Float(v) => Some(*v),
            other => as_f64(other).map(|f| f as f32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_string_tag() {
        let value = TypedValue::convert("Hello World", "string").unwrap();
        assert_eq!(value, TypedValue::Str("Hello World".to_string()));
    }

    #[test]
    fn test_convert_int_tags() {
        assert_eq!(TypedValue::convert("42", "int").unwrap(), TypedValue::Int(42));
        assert_eq!(
            TypedValue::convert("-7", "integer").unwrap(),
            TypedValue::Int(-7)
        );
        assert_eq!(TypedValue::convert("42", "INT").unwrap(), TypedValue::Int(42));
    }

    #[test]
    fn test_convert_long_tag() {
        assert_eq!(
            TypedValue::convert("9223372036854775807", "long").unwrap(),
            TypedValue::Long(i64::MAX)
        );
    }

    #[test]
    fn test_convert_bool_tags_case_insensitive() {
        for raw in ["true", "True", "TRUE"] {
            assert_eq!(
                TypedValue::convert(raw, "bool").unwrap(),
                TypedValue::Bool(true),
                "failed for {raw}"
            );
        }
        for raw in ["false", "False", "FALSE"] {
            assert_eq!(
                TypedValue::convert(raw, "boolean").unwrap(),
                TypedValue::Bool(false),
                "failed for {raw}"
            );
        }
    }

    #[test]
    fn test_convert_bool_rejects_non_literals() {
        assert!(TypedValue::convert("yes", "bool").is_err());
        assert!(TypedValue::convert("1", "bool").is_err());
    }

    #[test]
    fn test_convert_float_family() {
        assert_eq!(
            TypedValue::convert("0.15", "double").unwrap(),
            TypedValue::Double(0.15)
        );
        assert_eq!(
            TypedValue::convert("2.5", "float").unwrap(),
            TypedValue::Float(2.5)
        );
        assert_eq!(
            TypedValue::convert("19.99", "decimal").unwrap(),
            TypedValue::Decimal(19.99)
        );
    }

    #[test]
    fn test_convert_unrecognized_tag_passes_through() {
        let value = TypedValue::convert("12,5", "money").unwrap();
        assert_eq!(value, TypedValue::Str("12,5".to_string()));
    }

    #[test]
    fn test_convert_invalid_number() {
        let result = TypedValue::convert("not-a-number", "int");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ConversionFailure { .. }
        ));
    }

    #[test]
    fn test_tag_names() {
        assert_eq!(TypedValue::Int(1).tag(), "int");
        assert_eq!(TypedValue::Decimal(1.0).tag(), "decimal");
        assert_eq!(TypedValue::Str("x".into()).tag(), "string");
    }

    #[test]
    fn test_from_typed_exact_match() {
        assert_eq!(i32::from_typed(&TypedValue::Int(50)), Some(50));
        assert_eq!(f64::from_typed(&TypedValue::Double(0.15)), Some(0.15));
        assert_eq!(bool::from_typed(&TypedValue::Bool(true)), Some(true));
    }

    #[test]
    fn test_from_typed_numeric_widening() {
        assert_eq!(f64::from_typed(&TypedValue::Int(42)), Some(42.0));
        assert_eq!(i64::from_typed(&TypedValue::Int(42)), Some(42));
        assert_eq!(i32::from_typed(&TypedValue::Long(42)), Some(42));
        assert_eq!(f32::from_typed(&TypedValue::Double(1.5)), Some(1.5));
    }

    #[test]
    fn test_from_typed_narrowing_limits() {
        assert_eq!(i32::from_typed(&TypedValue::Long(i64::MAX)), None);
        assert_eq!(u32::from_typed(&TypedValue::Int(-1)), None);
        // A whole-valued double converts, a fractional one does not.
        assert_eq!(i32::from_typed(&TypedValue::Double(4.0)), Some(4));
        assert_eq!(i32::from_typed(&TypedValue::Double(4.5)), None);
    }

    #[test]
    fn test_from_typed_string_parsing() {
        assert_eq!(i32::from_typed(&TypedValue::Str("42".into())), Some(42));
        assert_eq!(bool::from_typed(&TypedValue::Str("TRUE".into())), Some(true));
        assert_eq!(i32::from_typed(&TypedValue::Str("nope".into())), None);
    }

    #[test]
    fn test_from_typed_to_string_always_succeeds() {
        assert_eq!(
            String::from_typed(&TypedValue::Double(0.15)),
            Some("0.15".to_string())
        );
        assert_eq!(
            String::from_typed(&TypedValue::Bool(false)),
            Some("false".to_string())
        );
    }

    #[test]
    fn test_from_typed_bool_from_integers() {
        assert_eq!(bool::from_typed(&TypedValue::Int(0)), Some(false));
        assert_eq!(bool::from_typed(&TypedValue::Long(3)), Some(true));
        assert_eq!(bool::from_typed(&TypedValue::Double(1.0)), None);
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(TypedValue::Int(50).to_string(), "50");
        assert_eq!(TypedValue::Double(0.15).to_string(), "0.15");
        assert_eq!(TypedValue::Str("plain".into()).to_string(), "plain");
    }
}
