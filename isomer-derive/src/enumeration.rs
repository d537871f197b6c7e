use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;
use syn::ext::IdentExt;

use crate::parse_field_attrs;

/// Generates `Enumeration` and the conversion traits for a fieldless enum.
pub fn generate_enumeration(input: &DeriveInput, data: &syn::DataEnum) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let type_name = name.unraw().to_string();

    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            input,
            "Mappable enums need at least one variant",
        ));
    }

    let mut variants = Vec::with_capacity(data.variants.len());
    let mut constants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, syn::Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "Mappable can only be derived for enums without payloads",
            ));
        }
        let attrs = parse_field_attrs(&variant.attrs)?;
        if attrs.skip || attrs.read_only || attrs.write_only || attrs.parent {
            return Err(syn::Error::new_spanned(
                variant,
                "only `rename` is supported on enum variants",
            ));
        }
        variants.push(&variant.ident);
        constants.push(
            attrs
                .rename
                .unwrap_or_else(|| variant.ident.unraw().to_string()),
        );
    }

    Ok(quote! {
        impl ::isomer_core::Enumeration for #name {
            fn enum_type() -> &'static ::isomer_core::EnumType {
                static ENUM_TYPE: ::isomer_core::EnumType = ::isomer_core::EnumType {
                    name: #type_name,
                    constants: &[#(#constants),*],
                };
                &ENUM_TYPE
            }

            fn constant_name(&self) -> &'static str {
                match self {
                    #(Self::#variants => #constants,)*
                }
            }

            fn from_constant_name(name: &str) -> ::std::option::Option<Self> {
                match name {
                    #(#constants => ::std::option::Option::Some(Self::#variants),)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::isomer_core::Typed for #name {
            fn ty() -> ::isomer_core::Ty {
                ::isomer_core::Ty::Enum(<#name as ::isomer_core::Enumeration>::enum_type())
            }
        }

        impl ::isomer_core::ToValue for #name {
            fn to_value(&self) -> ::isomer_core::Value {
                ::isomer_core::Value::Enum(::isomer_core::EnumValue::new(
                    <#name as ::isomer_core::Enumeration>::enum_type(),
                    ::isomer_core::Enumeration::constant_name(self),
                ))
            }
        }

        impl ::isomer_core::FromValue for #name {
            fn from_value(
                value: ::isomer_core::Value,
            ) -> ::std::result::Result<Self, ::isomer_core::PropertyError> {
                ::isomer_core::enum_from_value(value)
            }
        }
    })
}
