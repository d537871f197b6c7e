use std::fmt;

use crate::bean::{BeanType, EnumType};

/// Native value kinds that are passed through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    Str,
}

impl Primitive {
    /// Returns the Rust spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Char => "char",
            Primitive::Str => "String",
        }
    }
}

/// The three collection shapes a mapping can mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Ordered sequence.
    Seq,
    /// Unordered set.
    Set,
    /// FIFO queue.
    Queue,
}

impl CollectionKind {
    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::Seq => "sequence",
            CollectionKind::Set => "set",
            CollectionKind::Queue => "queue",
        }
    }
}

/// A declared type, as seen on a mutator parameter or requested by a caller.
///
/// Container types carry their generic arguments. `None` arguments describe a
/// raw container, which the engine refuses to fill because it cannot know
/// what to map the elements into.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    /// The universal root type; accepts any value.
    Any,
    Primitive(Primitive),
    Enum(&'static EnumType),
    Bean(&'static BeanType),
    Collection(CollectionKind, Option<Box<Ty>>),
    Map(Option<Box<(Ty, Ty)>>),
}

impl Ty {
    /// Creates a parameterized sequence type.
    pub fn seq(element: Ty) -> Self {
        Ty::Collection(CollectionKind::Seq, Some(Box::new(element)))
    }

    /// Creates a parameterized set type.
    pub fn set(element: Ty) -> Self {
        Ty::Collection(CollectionKind::Set, Some(Box::new(element)))
    }

    /// Creates a parameterized queue type.
    pub fn queue(element: Ty) -> Self {
        Ty::Collection(CollectionKind::Queue, Some(Box::new(element)))
    }

    /// Creates a parameterized map type.
    pub fn map(key: Ty, value: Ty) -> Self {
        Ty::Map(Some(Box::new((key, value))))
    }

    /// Returns the generic arguments of this type, in declaration order.
    ///
    /// Collections yield their element type, maps their key and value types.
    /// Every other type, and raw containers, yield nothing.
    pub fn type_arguments(&self) -> Vec<&Ty> {
        match self {
            Ty::Collection(_, Some(element)) => vec![element.as_ref()],
            Ty::Map(Some(entry)) => vec![&entry.0, &entry.1],
            _ => Vec::new(),
        }
    }

    /// Returns this type with its generic arguments dropped.
    pub fn erasure(&self) -> Ty {
        match self {
            Ty::Collection(kind, _) => Ty::Collection(*kind, None),
            Ty::Map(_) => Ty::Map(None),
            other => other.clone(),
        }
    }

    /// Returns true if a value of type `other` can be stored where `self` is declared.
    ///
    /// Beans are assignable to any of their ancestors. Containers are compared
    /// by kind only; their arguments are erased at runtime.
    pub fn is_assignable_from(&self, other: &Ty) -> bool {
        match (self, other) {
            (Ty::Any, _) => true,
            (Ty::Primitive(a), Ty::Primitive(b)) => a == b,
            (Ty::Enum(a), Ty::Enum(b)) => a == b,
            (Ty::Bean(a), Ty::Bean(b)) => b.is_subtype_of(a),
            (Ty::Collection(a, _), Ty::Collection(b, _)) => a == b,
            (Ty::Map(_), Ty::Map(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Any => f.write_str("Value"),
            Ty::Primitive(p) => f.write_str(p.name()),
            Ty::Enum(e) => f.write_str(e.name),
            Ty::Bean(b) => f.write_str(b.name),
            Ty::Collection(kind, Some(element)) => write!(f, "{}<{}>", kind.name(), element),
            Ty::Collection(kind, None) => f.write_str(kind.name()),
            Ty::Map(Some(entry)) => write!(f, "map<{}, {}>", entry.0, entry.1),
            Ty::Map(None) => f.write_str("map"),
        }
    }
}

impl fmt::Debug for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ty({})", self)
    }
}
