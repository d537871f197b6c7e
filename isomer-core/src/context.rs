use std::collections::HashMap;

use indexmap::IndexMap;

use crate::bean::{Bean, BeanType};
use crate::error::MapError;
use crate::ty::Ty;
use crate::value::{ObjectRef, Value};

/// Explicit destination types, keyed by source type.
pub type OverrideTable = IndexMap<&'static BeanType, &'static BeanType>;

/// Per-invocation mapping state.
///
/// Holds the identity cache (source object -> destination already produced
/// for it) and caller-supplied type overrides. A fresh context is created for
/// each top-level `map` call unless the caller passes one in, in which case
/// identities and overrides are shared across those calls.
///
/// Overrides registered here are consulted before those of whichever mapper
/// is running the call, so one context can be shared between mappers with
/// different configurations.
///
/// The cache is keyed on source identity alone: a source object mapped twice
/// within one context yields the first destination, whatever destination
/// type the second request asked for.
#[derive(Default)]
pub struct MappingContext {
    mapped: HashMap<usize, (ObjectRef, Value)>,
    overrides: OverrideTable,
}

impl MappingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a context-specific override, consulted before the mapper's own.
    pub fn with_override<S: Bean, D: Bean>(mut self) -> Self {
        self.overrides.insert(S::bean_type(), D::bean_type());
        self
    }

    /// Creates a destination instance through the type's zero-argument
    /// constructor.
    pub fn instantiate(&self, ty: &'static BeanType) -> Result<ObjectRef, MapError> {
        ty.instantiate()
            .ok_or_else(|| MapError::instantiation(ty.name, "no zero-argument constructor"))
    }

    /// Returns the destination already produced for `source`, if any.
    pub fn already_mapped(&self, source: &ObjectRef) -> Option<Value> {
        self.mapped
            .get(&source.identity())
            .map(|(_, destination)| destination.clone())
    }

    /// Records the destination produced for `source`.
    ///
    /// The source is kept alive so its identity cannot be reused while the
    /// context exists.
    pub fn put_mapped(&mut self, source: &ObjectRef, destination: Value) {
        self.mapped
            .insert(source.identity(), (source.clone(), destination));
    }

    /// Drops the destination recorded for `source`, used when filling it
    /// failed.
    pub(crate) fn forget_mapped(&mut self, source: &ObjectRef) {
        self.mapped.remove(&source.identity());
    }

    /// Picks the destination type for a source of type `source` declared as
    /// `declared`, looking in this context's overrides first and then in
    /// `fallback`.
    ///
    /// An override wins unless it is already assignable from the declared
    /// type, in which case the declared type is at least as specific.
    pub fn resolve_override(
        &self,
        fallback: &OverrideTable,
        source: &'static BeanType,
        declared: &Ty,
    ) -> Ty {
        let explicit = self
            .overrides
            .get(source)
            .or_else(|| fallback.get(source));
        match explicit {
            Some(&target) if !Ty::Bean(target).is_assignable_from(declared) => Ty::Bean(target),
            _ => declared.clone(),
        }
    }

    /// Number of source objects mapped so far.
    pub fn len(&self) -> usize {
        self.mapped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::Accessor;
    use crate::error::PropertyError;
    use std::any::Any;

    #[derive(Default)]
    struct Blank;

    static BLANK: BeanType = BeanType {
        name: "Blank",
        parent: None,
        constructor: Some(crate::bean::construct_default::<Blank>),
        accessors: &[],
        mutators: &[],
    };

    impl Bean for Blank {
        fn bean_type() -> &'static BeanType {
            &BLANK
        }

        fn runtime_type(&self) -> &'static BeanType {
            &BLANK
        }

        fn get(&self, _accessor: &str) -> Option<Result<Value, PropertyError>> {
            None
        }

        fn set(&mut self, _mutator: &str, _value: Value) -> Option<Result<(), PropertyError>> {
            None
        }

        fn upcast(&self, target: &BeanType) -> Option<&dyn Any> {
            (target == &BLANK).then_some(self as &dyn Any)
        }

        fn upcast_mut(&mut self, target: &BeanType) -> Option<&mut dyn Any> {
            (target == &BLANK).then_some(self as &mut dyn Any)
        }
    }

    static SOURCE: BeanType = BeanType {
        name: "Source",
        parent: None,
        constructor: None,
        accessors: &[Accessor { name: "get_id" }],
        mutators: &[],
    };

    static BASE: BeanType = BeanType {
        name: "Base",
        parent: None,
        constructor: None,
        accessors: &[],
        mutators: &[],
    };

    fn base() -> &'static BeanType {
        &BASE
    }

    static SPECIFIC: BeanType = BeanType {
        name: "Specific",
        parent: Some(base),
        constructor: None,
        accessors: &[],
        mutators: &[],
    };

    fn table(entries: &[(&'static BeanType, &'static BeanType)]) -> OverrideTable {
        entries.iter().copied().collect()
    }

    #[test]
    fn identity_cache() {
        let mut ctx = MappingContext::new();
        let source = ObjectRef::new(Blank);
        let other = ObjectRef::new(Blank);
        let destination = Value::Object(ObjectRef::new(Blank));

        assert!(ctx.already_mapped(&source).is_none());
        ctx.put_mapped(&source, destination.clone());
        assert_eq!(ctx.already_mapped(&source.clone()), Some(destination));
        assert!(ctx.already_mapped(&other).is_none());
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn instantiate_requires_constructor() {
        let ctx = MappingContext::new();
        let object = ctx.instantiate(&BLANK).unwrap();
        assert_eq!(object.bean_type(), &BLANK);
        assert!(matches!(
            ctx.instantiate(&BASE),
            Err(MapError::Instantiation { .. })
        ));
    }

    #[test]
    fn forget_mapped_clears_the_entry() {
        let mut ctx = MappingContext::new();
        let source = ObjectRef::new(Blank);
        ctx.put_mapped(&source, Value::Object(ObjectRef::new(Blank)));
        ctx.forget_mapped(&source);
        assert!(ctx.already_mapped(&source).is_none());
        assert!(ctx.is_empty());
    }

    #[test]
    fn more_specific_override_wins() {
        let ctx = MappingContext::new();
        let table = table(&[(&SOURCE, &SPECIFIC)]);
        assert_eq!(
            ctx.resolve_override(&table, &SOURCE, &Ty::Bean(&BASE)),
            Ty::Bean(&SPECIFIC)
        );
    }

    #[test]
    fn less_specific_override_is_ignored() {
        let ctx = MappingContext::new();
        let table = table(&[(&SOURCE, &BASE)]);
        assert_eq!(
            ctx.resolve_override(&table, &SOURCE, &Ty::Bean(&SPECIFIC)),
            Ty::Bean(&SPECIFIC)
        );
        assert_eq!(
            ctx.resolve_override(&table, &SOURCE, &Ty::Bean(&BASE)),
            Ty::Bean(&BASE)
        );
    }

    #[test]
    fn no_override() {
        let ctx = MappingContext::new();
        assert_eq!(
            ctx.resolve_override(&OverrideTable::new(), &SOURCE, &Ty::Any),
            Ty::Any
        );
    }

    #[test]
    fn own_overrides_take_precedence() {
        let ctx = MappingContext::new().with_override::<Blank, Blank>();
        let first = table(&[(&BLANK, &SPECIFIC)]);
        let second = table(&[(&SOURCE, &SPECIFIC)]);
        assert_eq!(
            ctx.resolve_override(&first, &BLANK, &Ty::Any),
            Ty::Bean(&BLANK)
        );
        // The fallback is whatever the caller passes, call by call.
        assert_eq!(ctx.resolve_override(&first, &SOURCE, &Ty::Any), Ty::Any);
        assert_eq!(
            ctx.resolve_override(&second, &SOURCE, &Ty::Any),
            Ty::Bean(&SPECIFIC)
        );
    }
}
