use crate::context::MappingContext;
use crate::convert::{FromValue, ToValue, Typed};
use crate::error::{BoxError, MapError};
use crate::ty::Ty;
use crate::value::Value;

type CustomMapperFn =
    dyn Fn(Value, &mut MappingContext) -> Result<Value, BoxError> + Send + Sync;

type HookFn = dyn Fn(Value, Value) -> Result<(), BoxError> + Send + Sync;

struct CustomMapperEntry {
    source: Ty,
    destination: Ty,
    apply: Box<CustomMapperFn>,
}

/// User-supplied transformers, consulted in registration order before the
/// default structural mapping.
#[derive(Default)]
pub struct CustomMappers {
    entries: Vec<CustomMapperEntry>,
}

impl CustomMappers {
    /// Registers a transformer from `S` to `D`.
    pub fn register<S, D, F>(&mut self, f: F)
    where
        S: FromValue + Typed,
        D: ToValue + Typed,
        F: Fn(S, &mut MappingContext) -> Result<D, BoxError> + Send + Sync + 'static,
    {
        self.entries.push(CustomMapperEntry {
            source: S::ty(),
            destination: D::ty(),
            apply: Box::new(move |value: Value, ctx: &mut MappingContext| -> Result<Value, BoxError> {
                let source = S::from_value(value)?;
                f(source, ctx).map(|destination| destination.to_value())
            }),
        });
    }

    /// Applies the first entry whose source type accepts the value's runtime
    /// type and whose destination type fits `destination`.
    ///
    /// `Ok(None)` means no entry matched. Failures inside the transformer are
    /// fatal.
    pub fn try_apply(
        &self,
        value: &Value,
        destination: &Ty,
        ctx: &mut MappingContext,
    ) -> Result<Option<Value>, MapError> {
        let Some(runtime) = value.runtime_ty() else {
            return Ok(None);
        };
        let Some(entry) = self.entries.iter().find(|entry| {
            entry.source.is_assignable_from(&runtime)
                && destination.is_assignable_from(&entry.destination)
        }) else {
            return Ok(None);
        };

        log::trace!("custom mapper {} -> {}", entry.source, entry.destination);
        (entry.apply)(value.clone(), ctx)
            .map(Some)
            .map_err(|cause| MapError::CustomMapper {
                source_type: entry.source.to_string(),
                destination_type: entry.destination.to_string(),
                cause,
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct HookEntry {
    source: Ty,
    destination: Ty,
    call: Box<HookFn>,
}

/// Post-mapping callbacks, invoked in registration order.
#[derive(Default)]
pub struct Hooks {
    entries: Vec<HookEntry>,
}

impl Hooks {
    /// Registers a callback for mappings from exactly `S` to exactly `D`.
    pub fn register<S, D, F>(&mut self, f: F)
    where
        S: FromValue + Typed,
        D: FromValue + Typed,
        F: Fn(S, D) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.entries.push(HookEntry {
            source: S::ty(),
            destination: D::ty(),
            call: Box::new(move |source: Value, destination: Value| -> Result<(), BoxError> {
                f(S::from_value(source)?, D::from_value(destination)?)
            }),
        });
    }

    /// Calls every hook registered for the runtime types of the pair.
    pub fn apply(&self, source: &Value, destination: &Value) -> Result<(), MapError> {
        let (Some(source_ty), Some(destination_ty)) =
            (source.runtime_ty(), destination.runtime_ty())
        else {
            return Ok(());
        };

        for entry in self
            .entries
            .iter()
            .filter(|entry| entry.source == source_ty && entry.destination == destination_ty)
        {
            (entry.call)(source.clone(), destination.clone()).map_err(|cause| MapError::Hook {
                source_type: entry.source.to_string(),
                destination_type: entry.destination.to_string(),
                cause,
            })?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn first_matching_custom_mapper_wins() {
        let mut mappers = CustomMappers::default();
        mappers.register(|n: i32, _: &mut MappingContext| Ok(format!("first {n}")));
        mappers.register(|n: i32, _: &mut MappingContext| Ok(format!("second {n}")));
        mappers.register(|n: i32, _: &mut MappingContext| Ok(i64::from(n)));

        let mut ctx = MappingContext::new();
        let string = Ty::Primitive(crate::ty::Primitive::Str);
        let long = Ty::Primitive(crate::ty::Primitive::I64);

        let out = mappers.try_apply(&Value::I32(4), &string, &mut ctx).unwrap();
        assert_eq!(out, Some(Value::Str("first 4".into())));
        let out = mappers.try_apply(&Value::I32(4), &long, &mut ctx).unwrap();
        assert_eq!(out, Some(Value::I64(4)));
        let out = mappers.try_apply(&Value::U8(4), &string, &mut ctx).unwrap();
        assert_eq!(out, None);
        let out = mappers.try_apply(&Value::Null, &string, &mut ctx).unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn custom_mapper_failure_is_reported() {
        let mut mappers = CustomMappers::default();
        mappers.register(|_: String, _: &mut MappingContext| -> Result<i32, BoxError> {
            Err("not a number".into())
        });
        let mut ctx = MappingContext::new();
        let err = mappers
            .try_apply(&Value::Str("x".into()), &Ty::Any, &mut ctx)
            .unwrap_err();
        assert!(matches!(err, MapError::CustomMapper { .. }));
        assert!(!err.is_strict_mode());
    }

    #[test]
    fn hooks_match_exact_runtime_types() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut hooks = Hooks::default();
        let counter = Arc::clone(&calls);
        hooks.register(move |a: i32, b: i32| {
            assert_eq!(a, b);
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        hooks.apply(&Value::I32(1), &Value::I32(1)).unwrap();
        hooks.apply(&Value::I64(1), &Value::I64(1)).unwrap();
        hooks.apply(&Value::Null, &Value::I32(1)).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn hook_failure_is_reported() {
        let mut hooks = Hooks::default();
        hooks.register(|_: bool, _: bool| Err("boom".into()));
        let err = hooks
            .apply(&Value::Bool(true), &Value::Bool(true))
            .unwrap_err();
        assert!(matches!(err, MapError::Hook { .. }));
    }
}
