use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::PropertyError;
use crate::ty::Ty;
use crate::value::{EnumValue, ObjectRef, Value};

/// A zero-parameter read method of a bean.
#[derive(Debug)]
pub struct Accessor {
    pub name: &'static str,
}

/// A single-parameter write method of a bean.
pub struct Mutator {
    pub name: &'static str,
    /// Declared parameter type, including generic arguments.
    pub ty: fn() -> Ty,
}

impl fmt::Debug for Mutator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("name", &self.name)
            .field("ty", &(self.ty)())
            .finish()
    }
}

/// Static description of a composite type.
///
/// Only the methods declared on the type itself are listed here; inherited
/// ones are reached through `parent`. Descriptors are compared by address, so
/// each type must own exactly one `static` instance (the derive takes care of
/// that).
pub struct BeanType {
    pub name: &'static str,
    pub parent: Option<fn() -> &'static BeanType>,
    /// Zero-argument constructor. Types without one can be read but never
    /// produced by a mapping.
    pub constructor: Option<fn() -> ObjectRef>,
    pub accessors: &'static [Accessor],
    pub mutators: &'static [Mutator],
}

impl BeanType {
    /// Iterates over this type and its ancestors, nearest first.
    pub fn ancestry(&'static self) -> impl Iterator<Item = &'static BeanType> {
        std::iter::successors(Some(self), |ty| ty.parent.map(|parent| parent()))
    }

    /// Returns true if `self` is `other` or descends from it.
    pub fn is_subtype_of(&'static self, other: &BeanType) -> bool {
        self.ancestry().any(|ty| ty == other)
    }

    /// Returns every mutator of this type, inherited ones included, paired
    /// with the type that declares it.
    ///
    /// A mutator redeclared by a descendant shadows the ancestor's.
    pub fn all_mutators(&'static self) -> Vec<(&'static BeanType, &'static Mutator)> {
        let mut out: Vec<(&'static BeanType, &'static Mutator)> = Vec::new();
        for owner in self.ancestry() {
            for mutator in owner.mutators {
                if !out.iter().any(|(_, seen)| seen.name == mutator.name) {
                    out.push((owner, mutator));
                }
            }
        }
        out
    }

    /// Creates a fresh instance through the zero-argument constructor.
    pub fn instantiate(&'static self) -> Option<ObjectRef> {
        self.constructor.map(|construct| construct())
    }
}

impl PartialEq for BeanType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for BeanType {}

impl Hash for BeanType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self, state);
    }
}

impl fmt::Debug for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BeanType({})", self.name)
    }
}

impl fmt::Display for BeanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Static description of an enumeration: its name and constant names.
pub struct EnumType {
    pub name: &'static str,
    pub constants: &'static [&'static str],
}

impl EnumType {
    /// Looks up a constant by exact name.
    pub fn constant(&'static self, name: &str) -> Option<EnumValue> {
        self.constants
            .iter()
            .find(|constant| **constant == name)
            .map(|constant| EnumValue::new(self, *constant))
    }
}

impl PartialEq for EnumType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for EnumType {}

impl Hash for EnumType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self, state);
    }
}

impl fmt::Debug for EnumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnumType({})", self.name)
    }
}

/// A composite value that can be read and written by property method name.
///
/// Usually derived with `#[derive(Mappable)]`. Hand-written implementations
/// must keep `get`/`set` consistent with the accessors and mutators listed in
/// the descriptor, and `upcast` must succeed for every type in the ancestry.
pub trait Bean: Any {
    /// Returns the descriptor of the implementing type.
    fn bean_type() -> &'static BeanType
    where
        Self: Sized;

    /// Returns the descriptor of the concrete type behind a trait object.
    fn runtime_type(&self) -> &'static BeanType;

    /// Invokes the named accessor. `None` if no such accessor exists.
    fn get(&self, accessor: &str) -> Option<Result<Value, PropertyError>>;

    /// Invokes the named mutator. `None` if no such mutator exists.
    fn set(&mut self, mutator: &str, value: Value) -> Option<Result<(), PropertyError>>;

    /// Views this bean as `target`, which must be its own type or an ancestor.
    fn upcast(&self, target: &BeanType) -> Option<&dyn Any>;

    /// Mutable counterpart of [`Bean::upcast`].
    fn upcast_mut(&mut self, target: &BeanType) -> Option<&mut dyn Any>;
}

/// Constructor used by derived descriptors.
pub fn construct_default<T: Bean + Default>() -> ObjectRef {
    ObjectRef::new(T::default())
}

/// Typed side of an enumeration; constants are matched by name.
pub trait Enumeration: Sized + 'static {
    fn enum_type() -> &'static EnumType;

    fn constant_name(&self) -> &'static str;

    fn from_constant_name(name: &str) -> Option<Self>;
}

/// Converts an enum constant value back into `E`, checking the enum type.
pub fn enum_from_value<E: Enumeration>(value: Value) -> Result<E, PropertyError> {
    let expected = Ty::Enum(E::enum_type());
    match value {
        Value::Enum(constant) if constant.enum_type() == E::enum_type() => {
            E::from_constant_name(constant.name())
                .ok_or_else(|| PropertyError::mismatch(&expected, &Value::Enum(constant)))
        }
        other => Err(PropertyError::mismatch(&expected, &other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn any() -> Ty {
        Ty::Any
    }

    static BASE: BeanType = BeanType {
        name: "Base",
        parent: None,
        constructor: None,
        accessors: &[],
        mutators: &[
            Mutator { name: "set_id", ty: any },
            Mutator { name: "set_label", ty: any },
        ],
    };

    fn base() -> &'static BeanType {
        &BASE
    }

    static DERIVED: BeanType = BeanType {
        name: "Derived",
        parent: Some(base),
        constructor: None,
        accessors: &[],
        mutators: &[Mutator { name: "set_label", ty: any }],
    };

    static COLORS: EnumType = EnumType {
        name: "Color",
        constants: &["Red", "Green"],
    };

    #[test]
    fn ancestry_walks_up() {
        let names: Vec<_> = DERIVED.ancestry().map(|ty| ty.name).collect();
        assert_eq!(names, vec!["Derived", "Base"]);
        assert!(DERIVED.is_subtype_of(&BASE));
        assert!(!BASE.is_subtype_of(&DERIVED));
    }

    #[test]
    fn redeclared_mutator_shadows_ancestor() {
        let mutators = DERIVED.all_mutators();
        let names: Vec<_> = mutators
            .iter()
            .map(|(owner, m)| format!("{}.{}", owner.name, m.name))
            .collect();
        assert_eq!(names, vec!["Derived.set_label", "Base.set_id"]);
    }

    #[test]
    fn missing_constructor() {
        assert!(BASE.instantiate().is_none());
    }

    #[test]
    fn enum_constant_lookup() {
        assert_eq!(COLORS.constant("Red").map(|c| c.name()), Some("Red"));
        assert!(COLORS.constant("RED").is_none());
    }
}
