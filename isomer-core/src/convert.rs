use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use crate::error::PropertyError;
use crate::ty::{CollectionKind, Primitive, Ty};
use crate::value::Value;

/// Types with a static declared type.
pub trait Typed {
    fn ty() -> Ty;
}

/// Types that can be read out of a bean as a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Types that can be written into a bean from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, PropertyError>;
}

macro_rules! impl_primitive {
    ($t:ty, $variant:ident) => {
        impl Typed for $t {
            fn ty() -> Ty {
                Ty::Primitive(Primitive::$variant)
            }
        }

        impl ToValue for $t {
            fn to_value(&self) -> Value {
                Value::$variant(self.clone())
            }
        }

        impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self, PropertyError> {
                match value {
                    Value::$variant(v) => Ok(v),
                    other => Err(PropertyError::mismatch(&<$t as Typed>::ty(), &other)),
                }
            }
        }
    };
}

impl_primitive!(bool, Bool);
impl_primitive!(i8, I8);
impl_primitive!(i16, I16);
impl_primitive!(i32, I32);
impl_primitive!(i64, I64);
impl_primitive!(u8, U8);
impl_primitive!(u16, U16);
impl_primitive!(u32, U32);
impl_primitive!(u64, U64);
impl_primitive!(f32, F32);
impl_primitive!(f64, F64);
impl_primitive!(char, Char);
impl_primitive!(String, Str);

impl Typed for Value {
    fn ty() -> Ty {
        Ty::Any
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self, PropertyError> {
        Ok(value)
    }
}

// Option carries the mapping's null; its declared type is the inner type.

impl<T: Typed> Typed for Option<T> {
    fn ty() -> Ty {
        T::ty()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, PropertyError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Flattens any collection value into its elements.
///
/// Mapped collections mirror the source's kind, so a destination field of one
/// collection type must accept values of the others.
fn elements(value: Value, expected: Ty) -> Result<Vec<Value>, PropertyError> {
    match value {
        Value::Seq(items) => Ok(items),
        Value::Set(items) => Ok(items.into_iter().collect()),
        Value::Queue(items) => Ok(items.into()),
        other => Err(PropertyError::mismatch(&expected, &other)),
    }
}

fn entries(value: Value, expected: Ty) -> Result<IndexMap<Value, Value>, PropertyError> {
    match value {
        Value::Map(entries) => Ok(entries),
        other => Err(PropertyError::mismatch(&expected, &other)),
    }
}

macro_rules! impl_collection {
    ($kind:ident, $variant:ident, [$($bound:tt)*], $container:ident) => {
        impl<T: Typed> Typed for $container<T> {
            fn ty() -> Ty {
                Ty::Collection(CollectionKind::$kind, Some(Box::new(T::ty())))
            }
        }

        impl<T: ToValue> ToValue for $container<T> {
            fn to_value(&self) -> Value {
                Value::$variant(self.iter().map(ToValue::to_value).collect())
            }
        }

        impl<T: FromValue + Typed $($bound)*> FromValue for $container<T> {
            fn from_value(value: Value) -> Result<Self, PropertyError> {
                elements(value, Self::ty())?
                    .into_iter()
                    .map(T::from_value)
                    .collect()
            }
        }
    };
}

impl_collection!(Seq, Seq, [], Vec);
impl_collection!(Queue, Queue, [], VecDeque);
impl_collection!(Set, Set, [+ Eq + Hash], HashSet);
impl_collection!(Set, Set, [+ Ord], BTreeSet);
impl_collection!(Set, Set, [+ Eq + Hash], IndexSet);

macro_rules! impl_map {
    ([$($bound:tt)*], $container:ident) => {
        impl<K: Typed, V: Typed> Typed for $container<K, V> {
            fn ty() -> Ty {
                Ty::map(K::ty(), V::ty())
            }
        }

        impl<K: ToValue, V: ToValue> ToValue for $container<K, V> {
            fn to_value(&self) -> Value {
                Value::Map(
                    self.iter()
                        .map(|(k, v)| (k.to_value(), v.to_value()))
                        .collect(),
                )
            }
        }

        impl<K: FromValue + Typed $($bound)*, V: FromValue + Typed> FromValue for $container<K, V> {
            fn from_value(value: Value) -> Result<Self, PropertyError> {
                entries(value, Self::ty())?
                    .into_iter()
                    .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
                    .collect()
            }
        }
    };
}

impl_map!([+ Eq + Hash], HashMap);
impl_map!([+ Ord], BTreeMap);
impl_map!([+ Eq + Hash], IndexMap);
