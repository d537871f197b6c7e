use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};

use crate::bean::{Bean, BeanType, Mutator};
use crate::config::MapperConfig;
use crate::context::{MappingContext, OverrideTable};
use crate::convert::{FromValue, ToValue, Typed};
use crate::error::{BoxError, MapError, PropertyError};
use crate::registry::{CustomMappers, Hooks};
use crate::resolver::AccessorResolver;
use crate::ty::Ty;
use crate::value::{EnumValue, ObjectRef, Value};

/// Maps object graphs onto unrelated destination types.
///
/// Properties are paired by name: every destination mutator `set_<name>` is
/// fed by the source accessor `get_<name>` or `is_<name>`. Nested beans,
/// collections and maps are mapped recursively; cycles and shared
/// sub-objects in the source stay cycles and shared sub-objects in the
/// destination.
///
/// A configured mapper is immutable and can be shared between threads. Each
/// top-level call gets its own [`MappingContext`] unless one is passed in.
///
/// ```
/// use isomer_core::{Handle, Mappable, Mapper};
///
/// #[derive(Default, Mappable)]
/// struct UserRecord {
///     name: String,
///     admin: bool,
/// }
///
/// #[derive(Default, Mappable)]
/// struct UserView {
///     name: String,
///     admin: bool,
/// }
///
/// let source = Handle::new(UserRecord { name: "ada".into(), admin: true });
/// let view: Handle<UserView> = Mapper::new().map(&source).unwrap();
/// assert_eq!(view.borrow().name, "ada");
/// assert!(view.borrow().admin);
/// ```
pub struct Mapper {
    strict: bool,
    resolver: AccessorResolver,
    overrides: OverrideTable,
    custom_mappers: CustomMappers,
    hooks: Hooks,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper {
    /// Creates a lenient mapper with the default suffixes.
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Mapper {
            strict: config.strict,
            resolver: AccessorResolver::new(config.suffixes),
            overrides: OverrideTable::new(),
            custom_mappers: CustomMappers::default(),
            hooks: Hooks::default(),
        }
    }

    /// Sets the failure policy. A strict mapper fails on the first field it
    /// cannot map; a lenient one (the default) logs and skips it.
    pub fn strict_mode(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Shorthand for `strict_mode(true)`.
    pub fn strict(self) -> Self {
        self.strict_mode(true)
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Replaces the name suffixes ignored when pairing accessors and mutators.
    pub fn suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolver = AccessorResolver::new(suffixes.into_iter().map(Into::into).collect());
        self
    }

    /// Maps sources of type `S` to `D` wherever the declared destination type
    /// is less specific than `D`. Only needed with inheritance.
    pub fn mapping<S: Bean, D: Bean>(mut self) -> Self {
        self.overrides.insert(S::bean_type(), D::bean_type());
        self
    }

    /// Same as [`Mapper::mapping`], in both directions.
    pub fn bi_mapping<S: Bean, D: Bean>(self) -> Self {
        self.mapping::<S, D>().mapping::<D, S>()
    }

    /// Registers a transformer used instead of structural mapping whenever a
    /// value of type `S` has to become a `D`.
    pub fn custom_mapper<S, D, F>(mut self, f: F) -> Self
    where
        S: FromValue + Typed,
        D: ToValue + Typed,
        F: Fn(S, &mut MappingContext) -> Result<D, BoxError> + Send + Sync + 'static,
    {
        self.custom_mappers.register(f);
        self
    }

    /// Registers a pair of transformers, one per direction.
    pub fn custom_bi_mapper<S, D, F, G>(mut self, forward: F, backward: G) -> Self
    where
        S: FromValue + ToValue + Typed,
        D: FromValue + ToValue + Typed,
        F: Fn(S, &mut MappingContext) -> Result<D, BoxError> + Send + Sync + 'static,
        G: Fn(D, &mut MappingContext) -> Result<S, BoxError> + Send + Sync + 'static,
    {
        self.custom_mappers.register(forward);
        self.custom_mappers.register(backward);
        self
    }

    /// Registers a callback run after a value of type `S` has been fully
    /// mapped to a `D`.
    pub fn hook<S, D, F>(mut self, f: F) -> Self
    where
        S: FromValue + Typed,
        D: FromValue + Typed,
        F: Fn(S, D) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.hooks.register(f);
        self
    }

    /// Maps `source` to a `D` in a fresh context.
    ///
    /// `D` may be a bean handle, a primitive, an enumeration, a collection or
    /// a map of those; use `Option<D>` when the mapping may produce nothing.
    pub fn map<D: FromValue + Typed>(&self, source: &impl ToValue) -> Result<D, MapError> {
        self.map_in(source, &mut MappingContext::new())
    }

    /// Maps `source` to a `D` within an existing context.
    ///
    /// Objects mapped by earlier calls on `ctx` are reused. If the call
    /// fails, objects it left half-filled are dropped from `ctx` again.
    pub fn map_in<D: FromValue + Typed>(
        &self,
        source: &impl ToValue,
        ctx: &mut MappingContext,
    ) -> Result<D, MapError> {
        let mapped = self.map_value(source.to_value(), &D::ty(), ctx)?;
        D::from_value(mapped).map_err(MapError::Conversion)
    }

    /// Untyped entry point.
    ///
    /// A collection mapped to a non-container type, `Ty::Any` included, is
    /// mapped element-wise with `destination` as the element type.
    pub fn map_value(
        &self,
        source: Value,
        destination: &Ty,
        ctx: &mut MappingContext,
    ) -> Result<Value, MapError> {
        let element_wise = matches!(source, Value::Seq(_) | Value::Set(_) | Value::Queue(_))
            && matches!(destination, Ty::Any | Ty::Bean(_) | Ty::Primitive(_) | Ty::Enum(_));
        if element_wise {
            return self.map_collection_in(source, destination, ctx);
        }
        self.nominal_map(source, destination, ctx)
    }

    /// Maps every element of a collection to `element`. The result has the
    /// same collection kind as the source; null elements are dropped.
    pub fn map_collection(&self, source: Value, element: &Ty) -> Result<Value, MapError> {
        self.map_collection_in(source, element, &mut MappingContext::new())
    }

    pub fn map_collection_in(
        &self,
        source: Value,
        element: &Ty,
        ctx: &mut MappingContext,
    ) -> Result<Value, MapError> {
        match source {
            Value::Null => Ok(Value::Null),
            Value::Seq(items) => Ok(Value::Seq(self.map_elements(items, element, ctx)?)),
            Value::Set(items) => Ok(Value::Set(
                self.map_elements(items, element, ctx)?
                    .into_iter()
                    .collect::<IndexSet<_>>(),
            )),
            Value::Queue(items) => Ok(Value::Queue(VecDeque::from(
                self.map_elements(items, element, ctx)?,
            ))),
            other => self.report(format!(
                "unhandled collection type {}",
                other.type_name()
            )),
        }
    }

    /// Maps every key and value of a map. The result is always an unordered
    /// map.
    pub fn map_map(&self, source: Value, key: &Ty, value: &Ty) -> Result<Value, MapError> {
        self.map_map_in(source, key, value, &mut MappingContext::new())
    }

    pub fn map_map_in(
        &self,
        source: Value,
        key: &Ty,
        value: &Ty,
        ctx: &mut MappingContext,
    ) -> Result<Value, MapError> {
        match source {
            Value::Null => Ok(Value::Null),
            Value::Map(entries) => {
                let mut out = IndexMap::with_capacity(entries.len());
                for (k, v) in entries {
                    let k = self.nominal_map(k, key, ctx)?;
                    let v = self.nominal_map(v, value, ctx)?;
                    out.insert(k, v);
                }
                Ok(Value::Map(out))
            }
            other => self.report(format!("unhandled map type {}", other.type_name())),
        }
    }

    fn map_elements(
        &self,
        items: impl IntoIterator<Item = Value>,
        element: &Ty,
        ctx: &mut MappingContext,
    ) -> Result<Vec<Value>, MapError> {
        let mut out = Vec::new();
        for item in items {
            match self.nominal_map(item, element, ctx)? {
                Value::Null => {}
                mapped => out.push(mapped),
            }
        }
        Ok(out)
    }

    /// The recursive step: maps one value to the `declared` type.
    ///
    /// `declared` carries generic arguments, which is where container
    /// element types come from.
    fn nominal_map(
        &self,
        source: Value,
        declared: &Ty,
        ctx: &mut MappingContext,
    ) -> Result<Value, MapError> {
        match source {
            Value::Null => Ok(Value::Null),
            Value::Seq(_) | Value::Set(_) | Value::Queue(_) => match declared {
                Ty::Collection(_, Some(element)) => self.map_collection_in(source, element, ctx),
                Ty::Collection(_, None) | Ty::Any => Err(unparameterized(&source, declared)),
                _ => self.report(format!("unable to map {} -> {}", source.type_name(), declared)),
            },
            Value::Map(_) => match declared {
                Ty::Map(Some(entry)) => self.map_map_in(source, &entry.0, &entry.1, ctx),
                Ty::Map(None) | Ty::Any => Err(unparameterized(&source, declared)),
                _ => self.report(format!("unable to map {} -> {}", source.type_name(), declared)),
            },
            Value::Enum(constant) => self.map_enum(constant, declared),
            other => {
                if let Value::Object(object) = &other {
                    if let Some(mapped) = ctx.already_mapped(object) {
                        return Ok(mapped);
                    }
                }
                if let Some(mapped) = self.custom_mappers.try_apply(&other, declared, ctx)? {
                    return Ok(mapped);
                }
                match other {
                    Value::Object(object) => self.map_object(object, declared, ctx),
                    native => self.map_native(native, declared),
                }
            }
        }
    }

    fn map_enum(&self, constant: EnumValue, declared: &Ty) -> Result<Value, MapError> {
        let mapped = match declared {
            Ty::Enum(target) => target.constant(constant.name()),
            _ => None,
        };
        match mapped {
            Some(mapped) => Ok(Value::Enum(mapped)),
            None => self.report(format!("unable to map {:?} -> {}", constant, declared)),
        }
    }

    fn map_native(&self, source: Value, declared: &Ty) -> Result<Value, MapError> {
        let Some(runtime) = source.runtime_ty() else {
            return Ok(Value::Null);
        };
        if !declared.is_assignable_from(&runtime) {
            return self.report(format!("unable to map {} -> {}", runtime, declared));
        }
        self.hooks.apply(&source, &source)?;
        Ok(source)
    }

    fn map_object(
        &self,
        source: ObjectRef,
        declared: &Ty,
        ctx: &mut MappingContext,
    ) -> Result<Value, MapError> {
        let source_type = source.bean_type();
        let target = match ctx.resolve_override(&self.overrides, source_type, declared) {
            Ty::Bean(target) => target,
            Ty::Any => {
                return Err(MapError::instantiation(
                    declared.to_string(),
                    format!("no concrete destination type for {}", source_type),
                ));
            }
            other => {
                return self.report(format!("unable to map {} -> {}", source_type, other));
            }
        };

        let destination = ctx.instantiate(target)?;
        let mapped = Value::Object(destination.clone());
        // Registered before the fields are filled so back-references resolve
        // to this instance.
        ctx.put_mapped(&source, mapped.clone());

        let filled = self
            .fill_object(&source, &destination, target, ctx)
            .and_then(|()| self.hooks.apply(&Value::Object(source.clone()), &mapped));
        if let Err(err) = filled {
            ctx.forget_mapped(&source);
            return Err(err);
        }
        Ok(mapped)
    }

    /// Transfers every mutator of `target` from `source` into `destination`.
    fn fill_object(
        &self,
        source: &ObjectRef,
        destination: &ObjectRef,
        target: &'static BeanType,
        ctx: &mut MappingContext,
    ) -> Result<(), MapError> {
        let source_type = source.bean_type();
        for (owner, mutator) in target.all_mutators() {
            let Some((holder, accessor)) = self.resolver.resolve(source_type, mutator.name) else {
                if self.strict {
                    return Err(MapError::strict(format!(
                        "no suitable accessor for {}.{}() in {}",
                        owner, mutator.name, source_type
                    )));
                }
                debug!(
                    "No accessor found for {}.{}() in {}, ignore...",
                    owner, mutator.name, source_type
                );
                continue;
            };

            trace!(
                "{}.{}() -> {}.{}()",
                holder, accessor.name, owner, mutator.name
            );

            let read = source
                .borrow()
                .get(accessor.name)
                .unwrap_or_else(|| Err(PropertyError::UnknownProperty(accessor.name.to_string())));
            let value = match read {
                Ok(Value::Null) => continue,
                Ok(value) => value,
                Err(err) => {
                    self.skip_field(owner, mutator, source_type, err)?;
                    continue;
                }
            };

            let value = match self.nominal_map(value, &(mutator.ty)(), ctx)? {
                // Reported and skipped; the destination keeps its default.
                Value::Null => continue,
                value => value,
            };

            let written = destination
                .borrow_mut()
                .set(mutator.name, value)
                .unwrap_or_else(|| Err(PropertyError::UnknownProperty(mutator.name.to_string())));
            if let Err(err) = written {
                self.skip_field(owner, mutator, source_type, err)?;
            }
        }
        Ok(())
    }

    /// Strict: fails with the field's error. Lenient: logs and lets the
    /// caller move on to the next field.
    fn skip_field(
        &self,
        owner: &BeanType,
        mutator: &Mutator,
        source_type: &BeanType,
        err: PropertyError,
    ) -> Result<(), MapError> {
        let message = format!(
            "unable to map {}.{}() from {}",
            owner, mutator.name, source_type
        );
        if self.strict {
            return Err(MapError::strict_with_cause(message, err));
        }
        debug!("{}: {}, ignore...", message, err);
        Ok(())
    }

    /// Strict: fails. Lenient: logs and maps to null.
    fn report(&self, message: String) -> Result<Value, MapError> {
        if self.strict {
            return Err(MapError::strict(message));
        }
        debug!("{}, ignore...", message);
        Ok(Value::Null)
    }
}

fn unparameterized(source: &Value, declared: &Ty) -> MapError {
    MapError::UnparameterizedContainer {
        value_type: source.type_name(),
        declared: declared.to_string(),
    }
}
