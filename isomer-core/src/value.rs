use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::bean::{Bean, BeanType, EnumType};
use crate::ty::{CollectionKind, Primitive, Ty};

/// A shared, interior-mutable, type-erased bean.
///
/// Identity is the allocation: clones point at the same object. The runtime
/// type is recorded next to the cell so it can be inspected while the object
/// is mutably borrowed (a destination field that points back at its owner).
#[derive(Clone)]
pub struct ObjectRef {
    ty: &'static BeanType,
    cell: Rc<RefCell<dyn Bean>>,
}

impl ObjectRef {
    pub fn new<T: Bean>(value: T) -> Self {
        let ty = value.runtime_type();
        let cell: Rc<RefCell<dyn Bean>> = Rc::new(RefCell::new(value));
        ObjectRef { ty, cell }
    }

    /// Returns the runtime type of the referenced bean.
    pub fn bean_type(&self) -> &'static BeanType {
        self.ty
    }

    /// Stable identity token, valid for as long as any clone is alive.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.cell) as *const () as usize
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.identity() == other.identity()
    }

    pub fn borrow(&self) -> Ref<'_, dyn Bean> {
        self.cell.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, dyn Bean> {
        self.cell.borrow_mut()
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:#x}", self.ty.name, self.identity())
    }
}

/// A constant of some enumeration.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    ty: &'static EnumType,
    name: &'static str,
}

impl EnumValue {
    pub fn new(ty: &'static EnumType, name: &'static str) -> Self {
        EnumValue { ty, name }
    }

    pub fn enum_type(&self) -> &'static EnumType {
        self.ty
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.ty.name, self.name)
    }
}

/// Classification of a value into the closed set of shapes the engine handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Primitive(Primitive),
    Enum,
    Collection(CollectionKind),
    Map,
    Object,
}

/// Any value the mapping engine can read from a source or hand to a
/// destination.
///
/// Equality and hashing follow identity for objects and bit patterns for
/// floats, so values can be used as set elements and map keys.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    Str(String),
    Enum(EnumValue),
    Seq(Vec<Value>),
    Set(IndexSet<Value>),
    Queue(VecDeque<Value>),
    Map(IndexMap<Value, Value>),
    Object(ObjectRef),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Enum(_) => ValueKind::Enum,
            Value::Seq(_) => ValueKind::Collection(CollectionKind::Seq),
            Value::Set(_) => ValueKind::Collection(CollectionKind::Set),
            Value::Queue(_) => ValueKind::Collection(CollectionKind::Queue),
            Value::Map(_) => ValueKind::Map,
            Value::Object(_) => ValueKind::Object,
            other => match other.primitive() {
                Some(primitive) => ValueKind::Primitive(primitive),
                None => ValueKind::Null,
            },
        }
    }

    /// Returns the primitive kind of a native value.
    pub fn primitive(&self) -> Option<Primitive> {
        let primitive = match self {
            Value::Bool(_) => Primitive::Bool,
            Value::I8(_) => Primitive::I8,
            Value::I16(_) => Primitive::I16,
            Value::I32(_) => Primitive::I32,
            Value::I64(_) => Primitive::I64,
            Value::U8(_) => Primitive::U8,
            Value::U16(_) => Primitive::U16,
            Value::U32(_) => Primitive::U32,
            Value::U64(_) => Primitive::U64,
            Value::F32(_) => Primitive::F32,
            Value::F64(_) => Primitive::F64,
            Value::Char(_) => Primitive::Char,
            Value::Str(_) => Primitive::Str,
            _ => return None,
        };
        Some(primitive)
    }

    /// Returns the runtime type of the value, `None` for null.
    ///
    /// Containers report their kind only; element types are not tracked at
    /// runtime.
    pub fn runtime_ty(&self) -> Option<Ty> {
        match self {
            Value::Null => None,
            Value::Enum(constant) => Some(Ty::Enum(constant.enum_type())),
            Value::Seq(_) => Some(Ty::Collection(CollectionKind::Seq, None)),
            Value::Set(_) => Some(Ty::Collection(CollectionKind::Set, None)),
            Value::Queue(_) => Some(Ty::Collection(CollectionKind::Queue, None)),
            Value::Map(_) => Some(Ty::Map(None)),
            Value::Object(object) => Some(Ty::Bean(object.bean_type())),
            other => other.primitive().map(Ty::Primitive),
        }
    }

    /// Human-readable type name for diagnostics.
    pub fn type_name(&self) -> String {
        match self.runtime_ty() {
            Some(ty) => ty.to_string(),
            None => "null".to_string(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a == b,
            (Value::Queue(a), Value::Queue(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(v) => v.hash(state),
            Value::I8(v) => v.hash(state),
            Value::I16(v) => v.hash(state),
            Value::I32(v) => v.hash(state),
            Value::I64(v) => v.hash(state),
            Value::U8(v) => v.hash(state),
            Value::U16(v) => v.hash(state),
            Value::U32(v) => v.hash(state),
            Value::U64(v) => v.hash(state),
            Value::F32(v) => v.to_bits().hash(state),
            Value::F64(v) => v.to_bits().hash(state),
            Value::Char(v) => v.hash(state),
            Value::Str(v) => v.hash(state),
            Value::Enum(v) => v.hash(state),
            Value::Seq(v) => v.hash(state),
            Value::Queue(v) => v.hash(state),
            // Set and map equality ignores order, so only the size is hashed.
            Value::Set(v) => v.len().hash(state),
            Value::Map(v) => v.len().hash(state),
            Value::Object(v) => v.identity().hash(state),
        }
    }
}
