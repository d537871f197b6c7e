use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Type};

use crate::{FieldAttrs, parse_container_attrs, parse_field_attrs};

struct Property<'a> {
    ident: &'a syn::Ident,
    ty: &'a Type,
    accessor: Option<String>,
    mutator: Option<String>,
}

/// Generates the `Bean` implementation for a struct with named fields.
pub fn generate_bean(input: &DeriveInput, data: &syn::DataStruct) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.unraw().to_string();
    let container = parse_container_attrs(&input.attrs)?;

    let fields = match &data.fields {
        syn::Fields::Named(fields) => &fields.named,
        syn::Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Mappable cannot be derived for tuple structs",
            ));
        }
        syn::Fields::Unit => {
            return Err(syn::Error::new_spanned(
                input,
                "Mappable cannot be derived for unit structs",
            ));
        }
    };

    let mut parent: Option<(&syn::Ident, &Type)> = None;
    let mut properties = Vec::new();

    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        if attrs.parent {
            if attrs.skip || attrs.read_only || attrs.write_only || attrs.rename.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    "`parent` cannot be combined with other mapper attributes",
                ));
            }
            if parent.is_some() {
                return Err(syn::Error::new_spanned(field, "only one field can be `parent`"));
            }
            parent = Some((ident, &field.ty));
            continue;
        }
        if attrs.skip {
            continue;
        }
        if attrs.read_only && attrs.write_only {
            return Err(syn::Error::new_spanned(
                field,
                "a field cannot be both `read_only` and `write_only`",
            ));
        }

        properties.push(property(ident, &field.ty, &attrs));
    }

    let parent_fn = match parent {
        Some((_, ty)) => quote! { ::std::option::Option::Some(<#ty as ::isomer_core::Bean>::bean_type) },
        None => quote! { ::std::option::Option::None },
    };

    let constructor = if container.no_default {
        quote! { ::std::option::Option::None }
    } else {
        quote! { ::std::option::Option::Some(::isomer_core::construct_default::<#name>) }
    };

    let accessors = properties.iter().filter_map(|p| {
        let accessor = p.accessor.as_ref()?;
        Some(quote! { ::isomer_core::Accessor { name: #accessor } })
    });

    let mutators = properties.iter().filter_map(|p| {
        let mutator = p.mutator.as_ref()?;
        let ty = p.ty;
        Some(quote! {
            ::isomer_core::Mutator {
                name: #mutator,
                ty: <#ty as ::isomer_core::Typed>::ty,
            }
        })
    });

    let get_arms = properties.iter().filter_map(|p| {
        let accessor = p.accessor.as_ref()?;
        let ident = p.ident;
        Some(quote! {
            #accessor => ::std::option::Option::Some(::std::result::Result::Ok(
                ::isomer_core::ToValue::to_value(&self.#ident),
            )),
        })
    });

    let set_arms = properties.iter().filter_map(|p| {
        let mutator = p.mutator.as_ref()?;
        let ident = p.ident;
        let ty = p.ty;
        Some(quote! {
            #mutator => ::std::option::Option::Some(
                <#ty as ::isomer_core::FromValue>::from_value(value).map(|v| self.#ident = v),
            ),
        })
    });

    let (get_fallback, set_fallback, upcast_fallback, upcast_mut_fallback) = match parent {
        Some((ident, _)) => (
            quote! { ::isomer_core::Bean::get(&self.#ident, accessor) },
            quote! { ::isomer_core::Bean::set(&mut self.#ident, mutator, value) },
            quote! { ::isomer_core::Bean::upcast(&self.#ident, target) },
            quote! { ::isomer_core::Bean::upcast_mut(&mut self.#ident, target) },
        ),
        None => (
            quote! { ::std::option::Option::None },
            quote! { ::std::option::Option::None },
            quote! { ::std::option::Option::None },
            quote! { ::std::option::Option::None },
        ),
    };

    Ok(quote! {
        impl ::isomer_core::Bean for #name {
            fn bean_type() -> &'static ::isomer_core::BeanType {
                static BEAN_TYPE: ::isomer_core::BeanType = ::isomer_core::BeanType {
                    name: #type_name,
                    parent: #parent_fn,
                    constructor: #constructor,
                    accessors: &[#(#accessors),*],
                    mutators: &[#(#mutators),*],
                };
                &BEAN_TYPE
            }

            fn runtime_type(&self) -> &'static ::isomer_core::BeanType {
                <#name as ::isomer_core::Bean>::bean_type()
            }

            #[allow(unused_variables)]
            fn get(
                &self,
                accessor: &str,
            ) -> ::std::option::Option<
                ::std::result::Result<::isomer_core::Value, ::isomer_core::PropertyError>,
            > {
                match accessor {
                    #(#get_arms)*
                    _ => #get_fallback,
                }
            }

            #[allow(unused_variables)]
            fn set(
                &mut self,
                mutator: &str,
                value: ::isomer_core::Value,
            ) -> ::std::option::Option<::std::result::Result<(), ::isomer_core::PropertyError>> {
                match mutator {
                    #(#set_arms)*
                    _ => #set_fallback,
                }
            }

            fn upcast(
                &self,
                target: &::isomer_core::BeanType,
            ) -> ::std::option::Option<&dyn ::std::any::Any> {
                if ::std::ptr::eq(target, <#name as ::isomer_core::Bean>::bean_type()) {
                    return ::std::option::Option::Some(self as &dyn ::std::any::Any);
                }
                #upcast_fallback
            }

            fn upcast_mut(
                &mut self,
                target: &::isomer_core::BeanType,
            ) -> ::std::option::Option<&mut dyn ::std::any::Any> {
                if ::std::ptr::eq(target, <#name as ::isomer_core::Bean>::bean_type()) {
                    return ::std::option::Option::Some(self as &mut dyn ::std::any::Any);
                }
                #upcast_mut_fallback
            }
        }
    })
}

fn property<'a>(ident: &'a syn::Ident, ty: &'a Type, attrs: &FieldAttrs) -> Property<'a> {
    let property = attrs
        .rename
        .clone()
        .unwrap_or_else(|| ident.unraw().to_string());
    let read_prefix = if is_bool(ty) { "is_" } else { "get_" };

    Property {
        ident,
        ty,
        accessor: (!attrs.write_only).then(|| format!("{read_prefix}{property}")),
        mutator: (!attrs.read_only).then(|| format!("set_{property}")),
    }
}

/// Only a plain `bool` gets the `is_` accessor; `Option<bool>` keeps `get_`.
fn is_bool(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path.path.is_ident("bool"),
        _ => false,
    }
}
