use std::any::Any;
use std::cell::{Ref, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::bean::Bean;
use crate::convert::{FromValue, ToValue, Typed};
use crate::error::PropertyError;
use crate::ty::Ty;
use crate::value::{ObjectRef, Value};

/// A typed reference to a shared bean whose runtime type is `T` or one of its
/// descendants.
///
/// This is the field type for nested objects: cloning a handle shares the
/// object, which is what lets mapped graphs keep cycles and shared
/// sub-objects.
pub struct Handle<T: Bean> {
    object: ObjectRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Bean> Handle<T> {
    pub fn new(value: T) -> Self {
        Handle {
            object: ObjectRef::new(value),
            _marker: PhantomData,
        }
    }

    /// Wraps an untyped object if its runtime type is `T` or descends from it.
    pub fn from_object(object: ObjectRef) -> Option<Self> {
        object
            .bean_type()
            .is_subtype_of(T::bean_type())
            .then_some(Handle {
                object,
                _marker: PhantomData,
            })
    }

    /// Borrows the object as a `T`.
    ///
    /// Panics if the object is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        Ref::map(self.object.borrow(), |bean| {
            bean.upcast(T::bean_type())
                .and_then(<dyn Any>::downcast_ref::<T>)
                .expect("handle target is a T or a descendant of T")
        })
    }

    /// Mutably borrows the object as a `T`.
    ///
    /// Panics if the object is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        RefMut::map(self.object.borrow_mut(), |bean| {
            bean.upcast_mut(T::bean_type())
                .and_then(<dyn Any>::downcast_mut::<T>)
                .expect("handle target is a T or a descendant of T")
        })
    }

    /// Re-types the handle; works in both directions of the hierarchy.
    pub fn cast<U: Bean>(&self) -> Option<Handle<U>> {
        Handle::from_object(self.object.clone())
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn into_object(self) -> ObjectRef {
        self.object
    }

    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.object.ptr_eq(&other.object)
    }
}

impl<T: Bean> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Handle {
            object: self.object.clone(),
            _marker: PhantomData,
        }
    }
}

// Handles compare by identity, like the objects behind them.
impl<T: Bean> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.object.ptr_eq(&other.object)
    }
}

impl<T: Bean> Eq for Handle<T> {}

impl<T: Bean> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object.identity().hash(state);
    }
}

impl<T: Bean> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:?})", self.object)
    }
}

impl<T: Bean> Typed for Handle<T> {
    fn ty() -> Ty {
        Ty::Bean(T::bean_type())
    }
}

impl<T: Bean> ToValue for Handle<T> {
    fn to_value(&self) -> Value {
        Value::Object(self.object.clone())
    }
}

impl<T: Bean> FromValue for Handle<T> {
    fn from_value(value: Value) -> Result<Self, PropertyError> {
        match value {
            Value::Object(object) => {
                let found = Value::Object(object.clone());
                Handle::from_object(object)
                    .ok_or_else(|| PropertyError::mismatch(&Self::ty(), &found))
            }
            other => Err(PropertyError::mismatch(&Self::ty(), &other)),
        }
    }
}
