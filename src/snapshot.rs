use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// A single property value captured from a snapshot.
///
/// `List` is the only variant compared element-wise; everything else,
/// including a `Json` snapshot of a nested value, compares by its own
/// equality.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    List(Vec<PropertyValue>),
    Json(serde_json::Value),
}

impl PropertyValue {
    /// Snapshot an arbitrary serializable value for whole-value comparison.
    pub fn json<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "\"{v}\""),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for PropertyValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Text(v.to_rfc3339())
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PropertyValue> + Clone> From<&[T]> for PropertyValue {
    fn from(v: &[T]) -> Self {
        Self::List(v.iter().cloned().map(Into::into).collect())
    }
}

/// Mapping from property name to captured value, built fresh per comparison
pub type PropertyMap = BTreeMap<&'static str, PropertyValue>;

/// Capability to expose a snapshot of a type's read-only properties.
///
/// Usually implemented with [`impl_properties!`](crate::impl_properties),
/// which lists the fields to expose. The snapshot must depend only on the
/// value; two equivalent values yield mappings with identical key sets.
pub trait Properties: Any {
    /// Snapshot of every exposed property, keyed by name
    fn properties(&self) -> PropertyMap;

    /// Concrete type name, used in failure messages
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Implements [`Properties`] for a struct from a list of its fields.
///
/// Each listed field must be `Clone` and convertible into a
/// [`PropertyValue`].
#[macro_export]
macro_rules! impl_properties {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::snapshot::Properties for $ty {
            fn properties(&self) -> $crate::snapshot::PropertyMap {
                let mut props = $crate::snapshot::PropertyMap::new();
                $(
                    props.insert(
                        stringify!($field),
                        $crate::snapshot::PropertyValue::from(self.$field.clone()),
                    );
                )+
                props
            }
        }
    };
}

/// A difference found between two property snapshots
#[derive(Debug, Error, PartialEq)]
pub enum ContentsError {
    #[error("actual value is missing, expected a `{expected_type}`")]
    MissingActual { expected_type: &'static str },

    #[error("type mismatch: expected `{expected}`, got `{actual}`")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("property count differs: expected {expected} properties, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("value for `{property}` is NULL but expected {expected}")]
    NullValue {
        property: &'static str,
        expected: PropertyValue,
    },

    #[error("`{property}` does not match: expected {expected} elements, got {actual}")]
    LengthMismatch {
        property: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("`{property}` does not match at index {index}: expected {expected}, got {actual}")]
    ElementMismatch {
        property: &'static str,
        index: usize,
        expected: PropertyValue,
        actual: PropertyValue,
    },

    #[error("`{property}` does not match: expected {expected}, got {actual}")]
    ValueMismatch {
        property: &'static str,
        expected: PropertyValue,
        actual: PropertyValue,
    },
}

/// Snapshot an object's properties, dropping every name in `skip`
pub fn extract_properties(object: &dyn Properties, skip: &HashSet<&str>) -> PropertyMap {
    let mut props = object.properties();
    props.retain(|name, _| !skip.contains(*name));
    props
}

/// Compare every non-skipped property of `expected` and `actual`.
///
/// The two values must have the identical runtime type and expose the same
/// number of properties after the skip set is applied. `List` values are
/// compared element-wise; everything else by value equality, with NULL on
/// both sides counting as equal. Returns the first difference found.
pub fn same_contents(
    expected: &dyn Properties,
    actual: Option<&dyn Properties>,
    skip: &[&str],
) -> Result<(), ContentsError> {
    let actual = actual.ok_or(ContentsError::MissingActual {
        expected_type: expected.type_name(),
    })?;

    if runtime_type(expected) != runtime_type(actual) {
        return Err(ContentsError::TypeMismatch {
            expected: expected.type_name(),
            actual: actual.type_name(),
        });
    }

    let skip: HashSet<&str> = skip.iter().copied().collect();
    let expected_props = extract_properties(expected, &skip);
    let actual_props = extract_properties(actual, &skip);

    if expected_props.len() != actual_props.len() {
        return Err(ContentsError::CountMismatch {
            expected: expected_props.len(),
            actual: actual_props.len(),
        });
    }

    for (&name, expected_value) in &expected_props {
        if skip.contains(name) {
            continue;
        }
        // a key missing from the actual snapshot counts as NULL
        let actual_value = actual_props.get(name).unwrap_or(&PropertyValue::Null);
        compare_property(name, expected_value, actual_value)?;
    }

    Ok(())
}

/// Assert that `expected` and `actual` expose the same property contents.
///
/// Panics with a message naming the first differing property. See
/// [`same_contents`] for the comparison rules and the non-panicking form.
#[track_caller]
pub fn assert_same_contents(
    expected: &dyn Properties,
    actual: Option<&dyn Properties>,
    skip: &[&str],
) {
    if let Err(err) = same_contents(expected, actual, skip) {
        panic!("contents differ: {err}");
    }
}

fn runtime_type(value: &dyn Properties) -> TypeId {
    let value: &dyn Any = value;
    value.type_id()
}

fn compare_property(
    property: &'static str,
    expected: &PropertyValue,
    actual: &PropertyValue,
) -> Result<(), ContentsError> {
    match (expected, actual) {
        (PropertyValue::Null, PropertyValue::Null) => Ok(()),
        (expected, PropertyValue::Null) => Err(ContentsError::NullValue {
            property,
            expected: expected.clone(),
        }),
        (PropertyValue::List(expected), PropertyValue::List(actual)) => {
            if expected.len() != actual.len() {
                return Err(ContentsError::LengthMismatch {
                    property,
                    expected: expected.len(),
                    actual: actual.len(),
                });
            }
            for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
                if e != a {
                    return Err(ContentsError::ElementMismatch {
                        property,
                        index,
                        expected: e.clone(),
                        actual: a.clone(),
                    });
                }
            }
            Ok(())
        }
        (expected, actual) => {
            if expected == actual {
                Ok(())
            } else {
                Err(ContentsError::ValueMismatch {
                    property,
                    expected: expected.clone(),
                    actual: actual.clone(),
                })
            }
        }
    }
}
