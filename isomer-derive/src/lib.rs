use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod bean;
mod enumeration;

/// Derive macro for mappable types.
///
/// On a struct with named fields, implements `isomer_core::Bean`: every field
/// `x` gets an accessor `get_x` (`is_x` for `bool` fields) and a mutator
/// `set_x`, recorded in a static `BeanType` together with a constructor built
/// from `Default`.
///
/// On a fieldless enum, implements `Enumeration`, `Typed`, `ToValue` and
/// `FromValue`; constants are matched by variant name.
///
/// # Example
///
/// ```ignore
/// use isomer_core::{Handle, Mappable};
///
/// #[derive(Default, Mappable)]
/// struct Animal {
///     name: String,
/// }
///
/// #[derive(Default, Mappable)]
/// struct Dog {
///     #[mapper(parent)]
///     animal: Animal,
///     good: bool,
///     owner: Option<Handle<Person>>,
/// }
///
/// #[derive(Mappable)]
/// enum Color {
///     Red,
///     Green,
/// }
/// ```
///
/// # Attributes
///
/// - `#[mapper(skip)]` - No accessor or mutator for this field
/// - `#[mapper(rename = "name")]` - Use `name` instead of the field name in method names
/// - `#[mapper(read_only)]` - Accessor only
/// - `#[mapper(write_only)]` - Mutator only
/// - `#[mapper(parent)]` - The field holds the ancestor part; its methods are inherited
/// - `#[mapper(no_default)]` on the struct - Record no constructor; the type can be a source but never a destination
#[proc_macro_derive(Mappable, attributes(mapper))]
pub fn derive_mappable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_mappable_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_mappable_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Mappable cannot be derived for generic types",
        ));
    }

    match &input.data {
        syn::Data::Struct(data) => bean::generate_bean(input, data),
        syn::Data::Enum(data) => enumeration::generate_enumeration(input, data),
        syn::Data::Union(_) => Err(syn::Error::new_spanned(
            input,
            "Mappable cannot be derived for unions",
        )),
    }
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub skip: bool,
    pub rename: Option<String>,
    pub read_only: bool,
    pub write_only: bool,
    pub parent: bool,
}

pub(crate) fn parse_field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("mapper") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                result.rename = Some(value.value());
            } else if meta.path.is_ident("read_only") {
                result.read_only = true;
            } else if meta.path.is_ident("write_only") {
                result.write_only = true;
            } else if meta.path.is_ident("parent") {
                result.parent = true;
            } else {
                return Err(meta.error("unsupported mapper attribute"));
            }
            Ok(())
        })?;
    }

    Ok(result)
}

#[derive(Default)]
pub(crate) struct ContainerAttrs {
    pub no_default: bool,
}

pub(crate) fn parse_container_attrs(attrs: &[syn::Attribute]) -> syn::Result<ContainerAttrs> {
    let mut result = ContainerAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("mapper") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("no_default") {
                result.no_default = true;
                Ok(())
            } else {
                Err(meta.error("unsupported mapper attribute"))
            }
        })?;
    }

    Ok(result)
}
