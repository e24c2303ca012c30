//! Derive macros for the Taskdeck state engines
//!
//! # Available Macros
//!
//! - `#[derive(Persist)]` - Implements `taskdeck_core::persist::Persist` for a
//!   state struct, persisting only the fields marked `#[persist]`
//!
//! # Example
//!
//! ```ignore
//! use taskdeck_macros::Persist;
//!
//! #[derive(Persist, Clone, Debug, Default)]
//! #[persist(key = "todo")]
//! struct TodoState {
//!     #[persist]
//!     todos: Vec<Todo>,
//!     filter: Filter,
//!     search_term: String,
//! }
//!
//! // Only `todos` is written to storage; `filter` and `search_term`
//! // always start from their defaults.
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr};

/// Derive macro for persisted state slices
///
/// Generates an implementation of `taskdeck_core::persist::Persist`:
/// - `KEY` is the namespace given in `#[persist(key = "...")]`
/// - `snapshot()` serializes the `#[persist]` fields into a JSON object keyed
///   by field name
/// - `restore()` deserializes every whitelisted field present in the record
///   before assigning any, so a malformed record leaves the state untouched
///
/// # Attributes
///
/// - `#[persist(key = "name")]` on the struct - storage namespace (required)
/// - `#[persist]` on a field - include the field in the whitelist
///
/// # Panics
///
/// This macro will produce a compile error (not a runtime panic) if:
/// - Applied to anything other than a struct with named fields
/// - The struct-level `key` is missing or empty
/// - No field is marked `#[persist]`
///
/// # Example
///
/// ```ignore
/// #[derive(Persist, Default)]
/// #[persist(key = "counter")]
/// struct CounterState {
///     #[persist]
///     value: i64,
/// }
///
/// let snapshot = CounterState { value: 3 }.snapshot()?;
/// assert_eq!(snapshot, serde_json::json!({ "value": 3 }));
/// ```
#[proc_macro_derive(Persist, attributes(persist))]
pub fn derive_persist(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_persist(&input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand_persist(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Persist)] can only be used on structs",
        ));
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(
            &data_struct.fields,
            "#[derive(Persist)] requires named fields",
        ));
    };

    let key = namespace(&input.attrs)?.ok_or_else(|| {
        syn::Error::new_spanned(
            name,
            "#[derive(Persist)] requires #[persist(key = \"...\")] on the struct",
        )
    })?;

    let persisted: Vec<_> = fields
        .named
        .iter()
        .filter(|field| has_attribute(&field.attrs, "persist"))
        .collect();

    if persisted.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "#[derive(Persist)] requires at least one field marked #[persist]",
        ));
    }

    let mut snapshot_inserts = Vec::with_capacity(persisted.len());
    let mut restore_reads = Vec::with_capacity(persisted.len());
    let mut restore_writes = Vec::with_capacity(persisted.len());

    for field in persisted {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let field_name = ident.to_string();
        let local = format_ident!("__persisted_{}", ident);

        snapshot_inserts.push(quote! {
            map.insert(
                ::std::string::String::from(#field_name),
                ::taskdeck_core::serde_json::to_value(&self.#ident)?,
            );
        });

        restore_reads.push(quote! {
            let #local = match map.remove(#field_name) {
                ::std::option::Option::Some(value) => ::std::option::Option::Some(
                    ::taskdeck_core::serde_json::from_value::<#ty>(value)?,
                ),
                ::std::option::Option::None => ::std::option::Option::None,
            };
        });

        restore_writes.push(quote! {
            if let ::std::option::Option::Some(value) = #local {
                self.#ident = value;
            }
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::taskdeck_core::persist::Persist for #name #ty_generics #where_clause {
            const KEY: &'static str = #key;

            fn snapshot(
                &self,
            ) -> ::taskdeck_core::persist::Result<::taskdeck_core::serde_json::Value> {
                let mut map = ::taskdeck_core::serde_json::Map::new();
                #(#snapshot_inserts)*
                ::std::result::Result::Ok(::taskdeck_core::serde_json::Value::Object(map))
            }

            fn restore(
                &mut self,
                value: ::taskdeck_core::serde_json::Value,
            ) -> ::taskdeck_core::persist::Result<()> {
                let mut map = ::taskdeck_core::persist::into_object(Self::KEY, value)?;
                #(#restore_reads)*
                #(#restore_writes)*
                ::std::result::Result::Ok(())
            }
        }
    })
}

/// Read `key = "..."` from a struct-level `#[persist(...)]` attribute
fn namespace(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut key = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("persist")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().trim().is_empty() {
                    return Err(meta.error("persist key must not be empty"));
                }
                key = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported persist attribute, expected `key`"))
            }
        })?;
    }

    Ok(key)
}

/// Helper function to check if an attribute list contains a specific attribute
fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
