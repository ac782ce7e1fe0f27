//! Derive macro for the `elemap::Properties` trait.
//!
//! `#[derive(Properties)]` turns a named-field struct into a mappable
//! object by generating its property accessor table: a match over every
//! field of type `Property`, keyed by the field name (or a
//! `#[mapped(rename = "...")]` override), plus the `Any` plumbing the
//! mapper needs to hand objects back to callers as concrete types.
//!
//! Fields of any other type are ignored by the table, which leaves them
//! free for hook bookkeeping (counters, flags) on the same struct.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Type, parse_macro_input};

#[proc_macro_derive(Properties, attributes(mapped))]
pub fn derive_properties(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Properties can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Properties can only be derived for structs",
            ));
        }
    };

    let mut ref_arms = Vec::new();
    let mut mut_arms = Vec::new();
    for field in fields {
        if !is_property_type(&field.ty) {
            continue;
        }
        let ident = field.ident.as_ref().expect("named field");
        let name = property_name(field)?.unwrap_or_else(|| ident.to_string());
        ref_arms.push(quote! { #name => ::std::option::Option::Some(&self.#ident), });
        mut_arms.push(quote! { #name => ::std::option::Option::Some(&mut self.#ident), });
    }

    let ident = &input.ident;
    let ident_str = ident.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::elemap::Properties for #ident #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #ident_str
            }

            fn property(&self, name: &str) -> ::std::option::Option<&::elemap::Property> {
                match name {
                    #(#ref_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn property_mut(&mut self, name: &str) -> ::std::option::Option<&mut ::elemap::Property> {
                match name {
                    #(#mut_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }

            fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
                self
            }
        }
    })
}

/// A field participates in the accessor table iff its type is `Property`
/// (matched on the last path segment, so `elemap::Property` works too).
fn is_property_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Property"),
        _ => false,
    }
}

/// Reads `#[mapped(rename = "...")]` if present.
fn property_name(field: &syn::Field) -> syn::Result<Option<String>> {
    let mut renamed = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("mapped") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                renamed = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported attribute; expected `rename`"))
            }
        })?;
    }
    Ok(renamed)
}
