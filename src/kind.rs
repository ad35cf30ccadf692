//! Element kinds and their boxed representation.
//!
//! A [`Kind`] describes one primitive element type: its name, the value
//! used for new or vacated slots, its natural order, exact equality, and the
//! conversion pair to and from the boxed [`Value`]. Stores and the facade are
//! generic over `Kind`, so each primitive gets its own monomorphized code.

use std::cmp::Ordering;
use std::fmt;

/// A boxed element: one variant per primitive kind, plus `Null` and an
/// arbitrary non-primitive object (`Text`).
///
/// Boxed call sites may hand a sequence anything; a value of the wrong
/// variant is "incompatible", never coerced.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(String),
}

impl Value {
    /// Name of the variant, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        return match self {
            Value::Null => "null",
            Value::Bool(_) => bool::NAME,
            Value::Byte(_) => i8::NAME,
            Value::Short(_) => i16::NAME,
            Value::Char(_) => char::NAME,
            Value::Int(_) => i32::NAME,
            Value::Long(_) => i64::NAME,
            Value::Float(_) => f32::NAME,
            Value::Double(_) => f64::NAME,
            Value::Text(_) => "text",
        };
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        };
    }
}

/// Descriptor of a primitive element kind.
pub trait Kind: Copy + fmt::Debug + fmt::Display + 'static {
    /// Human-readable kind name.
    const NAME: &'static str;

    /// Fill value for newly created or vacated slots.
    const DEFAULT: Self;

    /// The kind's intrinsic total order.
    fn natural_cmp(&self, other: &Self) -> Ordering;

    /// Exact equality. Floats compare by bit pattern, so `NaN` equals
    /// itself and `0.0` differs from `-0.0`.
    fn same(self, other: Self) -> bool;

    /// Bit pattern used for hashing; injective per kind.
    fn hash_bits(self) -> u64;

    /// Boxes the element.
    fn into_value(self) -> Value;

    /// Unboxes `value` if it is exactly this kind.
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! integral_kind {
    ($ty:ty, $name:literal, $variant:ident, $default:expr) => {
        impl Kind for $ty {
            const NAME: &'static str = $name;
            const DEFAULT: Self = $default;

            #[inline]
            fn natural_cmp(&self, other: &Self) -> Ordering {
                return self.cmp(other);
            }

            #[inline]
            fn same(self, other: Self) -> bool {
                return self == other;
            }

            #[inline]
            fn hash_bits(self) -> u64 {
                return self as u64;
            }

            #[inline]
            fn into_value(self) -> Value {
                return Value::$variant(self);
            }

            #[inline]
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => return Some(*v),
                    _ => return None,
                }
            }
        }
    };
}

macro_rules! float_kind {
    ($ty:ty, $name:literal, $variant:ident) => {
        impl Kind for $ty {
            const NAME: &'static str = $name;
            const DEFAULT: Self = 0.0;

            #[inline]
            fn natural_cmp(&self, other: &Self) -> Ordering {
                return self.total_cmp(other);
            }

            #[inline]
            fn same(self, other: Self) -> bool {
                return self.to_bits() == other.to_bits();
            }

            #[inline]
            fn hash_bits(self) -> u64 {
                return self.to_bits() as u64;
            }

            #[inline]
            fn into_value(self) -> Value {
                return Value::$variant(self);
            }

            #[inline]
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => return Some(*v),
                    _ => return None,
                }
            }
        }
    };
}

integral_kind!(bool, "bool", Bool, false);
integral_kind!(i8, "byte", Byte, 0);
integral_kind!(i16, "short", Short, 0);
integral_kind!(char, "char", Char, '\0');
integral_kind!(i32, "int", Int, 0);
integral_kind!(i64, "long", Long, 0);
float_kind!(f32, "float", Float);
float_kind!(f64, "double", Double);

/// Unboxes a whole slice, failing on the first incompatible value.
pub fn unbox_all<K: Kind>(values: &[Value]) -> Option<Vec<K>> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        out.push(K::from_value(value)?);
    }
    return Some(out);
}

/// Unboxes the compatible values of a slice, skipping the rest.
pub fn unbox_compatible<K: Kind>(values: &[Value]) -> Vec<K> {
    return values.iter().filter_map(K::from_value).collect();
}

/// Boxes a whole slice into one freshly allocated vector.
pub fn box_all<K: Kind>(values: &[K]) -> Vec<Value> {
    return values.iter().map(|v| v.into_value()).collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        assert_eq!(i32::DEFAULT, 0);
        assert_eq!(char::DEFAULT, '\0');
        assert!(!bool::DEFAULT);
        assert_eq!(f64::DEFAULT.to_bits(), 0);
    }

    #[test]
    fn exact_kind_unboxing() {
        assert_eq!(i32::from_value(&Value::Int(7)), Some(7));
        assert_eq!(i32::from_value(&Value::Long(7)), None);
        assert_eq!(i32::from_value(&Value::Null), None);
        assert_eq!(i64::from_value(&Value::Long(-1)), Some(-1));
        assert_eq!(char::from_value(&Value::Text("a".to_string())), None);
    }

    #[test]
    fn float_identity_is_bitwise() {
        assert!(f64::NAN.same(f64::NAN));
        assert!(!0.0f64.same(-0.0));
        assert_eq!(f32::NAN.natural_cmp(&f32::NAN), Ordering::Equal);
        assert_eq!((-1.0f32).natural_cmp(&2.5), Ordering::Less);
    }

    #[test]
    fn natural_order() {
        assert_eq!(false.natural_cmp(&true), Ordering::Less);
        assert_eq!('b'.natural_cmp(&'a'), Ordering::Greater);
        assert_eq!((-5i8).natural_cmp(&3), Ordering::Less);
    }

    #[test]
    fn bulk_conversion() {
        let boxed = box_all(&[1i16, 2, 3]);
        assert_eq!(boxed, vec![Value::Short(1), Value::Short(2), Value::Short(3)]);
        assert_eq!(unbox_all::<i16>(&boxed), Some(vec![1, 2, 3]));

        let mixed = vec![Value::Int(1), Value::Null, Value::Long(2), Value::Int(3)];
        assert_eq!(unbox_all::<i32>(&mixed), None);
        assert_eq!(unbox_compatible::<i32>(&mixed), vec![1, 3]);
    }

    #[test]
    fn value_names() {
        assert_eq!(Value::Int(1).kind_name(), "int");
        assert_eq!(Value::Null.kind_name(), "null");
        assert_eq!(Value::Char('x').to_string(), "x");
    }
}
