//! Procedural macros for board rows
//!
//! This crate provides `#[derive(BoardRow)]`, which turns `#[monday(...)]`
//! field attributes into a static column registry for
//! `swissarmyhammer_monday::BoardRow`.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use std::collections::HashSet;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Type};

/// Derive a column registry for a row struct
///
/// # Usage
///
/// ```ignore
/// #[derive(Default, BoardRow)]
/// pub struct TestRow {
///     #[monday(id)]
///     pub id: Option<String>,
///     #[monday(name)]
///     pub name: String,
///     #[monday(column = "text0")]
///     pub text: Option<ColumnText>,
///     #[monday(column = "status")]
///     pub status: Option<ColumnStatus>,
///     #[monday(group)]
///     pub group: Option<Group>,
/// }
/// ```
///
/// Column fields must be `Option<T>` where `T` implements `Column`; the column
/// kind is taken from `T`. Fields without a `#[monday]` attribute are ignored.
#[proc_macro_derive(BoardRow, attributes(monday))]
pub fn derive_board_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// What a tagged field stands for
enum FieldRole {
    Column(LitStr),
    Id,
    Name,
    Group,
    Assets,
    Updates,
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "BoardRow cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            Fields::Unit => {
                return Err(syn::Error::new_spanned(
                    name,
                    "BoardRow requires named fields",
                ))
            }
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    name,
                    "BoardRow does not support tuple structs",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "BoardRow can only be derived for structs",
            ))
        }
    };

    let mut bindings = Vec::new();
    let mut assignments = Vec::new();
    let mut seen = HashSet::new();
    let (mut group, mut assets, mut updates) = (false, false, false);

    for field in fields {
        let Some(role) = field_role(&field.attrs)? else {
            continue;
        };
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;

        match role {
            FieldRole::Column(id) => {
                if !seen.insert(id.value()) {
                    return Err(syn::Error::new_spanned(
                        &id,
                        format!("duplicate column id '{}'", id.value()),
                    ));
                }
                bindings.push(generate_binding(name, field, ident, &id)?);
            }
            FieldRole::Id => assignments.push(assign(ident, &format_ident!("id"))),
            FieldRole::Name => assignments.push(assign(ident, &format_ident!("name"))),
            FieldRole::Group => {
                group = true;
                assignments.push(assign(ident, &format_ident!("group")));
            }
            FieldRole::Assets => {
                assets = true;
                assignments.push(assign(ident, &format_ident!("assets")));
            }
            FieldRole::Updates => {
                updates = true;
                assignments.push(assign(ident, &format_ident!("updates")));
            }
        }
    }

    let num_columns = bindings.len();

    Ok(quote! {
        impl ::swissarmyhammer_monday::BoardRow for #name {
            fn columns() -> &'static [::swissarmyhammer_monday::ColumnBinding<Self>] {
                static COLUMNS: [::swissarmyhammer_monday::ColumnBinding<#name>; #num_columns] = [
                    #(#bindings),*
                ];
                &COLUMNS
            }

            fn item_fields() -> ::swissarmyhammer_monday::ItemFields {
                ::swissarmyhammer_monday::ItemFields {
                    group: #group,
                    assets: #assets,
                    updates: #updates,
                }
            }

            #[allow(unused_variables)]
            fn assign_item(&mut self, meta: ::swissarmyhammer_monday::ItemMeta) {
                #(#assignments)*
            }
        }
    })
}

/// Read the `#[monday(...)]` attribute of a field, if any
fn field_role(attrs: &[Attribute]) -> syn::Result<Option<FieldRole>> {
    let mut role = None;

    for attr in attrs {
        if !attr.path().is_ident("monday") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            let parsed = if meta.path.is_ident("column") {
                let id: LitStr = meta.value()?.parse()?;
                if id.value().is_empty() {
                    return Err(meta.error("column id cannot be empty"));
                }
                FieldRole::Column(id)
            } else if meta.path.is_ident("id") {
                FieldRole::Id
            } else if meta.path.is_ident("name") {
                FieldRole::Name
            } else if meta.path.is_ident("group") {
                FieldRole::Group
            } else if meta.path.is_ident("assets") {
                FieldRole::Assets
            } else if meta.path.is_ident("updates") {
                FieldRole::Updates
            } else {
                return Err(meta.error(
                    "expected one of: column = \"...\", id, name, group, assets, updates",
                ));
            };
            if role.replace(parsed).is_some() {
                return Err(meta.error("a field can only have one monday role"));
            }
            Ok(())
        })?;
    }

    Ok(role)
}

/// Generate one `ColumnBinding` entry for an `Option<T>` column field
fn generate_binding(
    row: &Ident,
    field: &Field,
    ident: &Ident,
    id: &LitStr,
) -> syn::Result<proc_macro2::TokenStream> {
    let column = option_inner(&field.ty).ok_or_else(|| {
        syn::Error::new_spanned(
            &field.ty,
            "monday column fields must be Option<T> where T: Column",
        )
    })?;

    Ok(quote! {
        ::swissarmyhammer_monday::ColumnBinding {
            id: #id,
            kind: <#column as ::swissarmyhammer_monday::Column>::KIND,
            set: |row: &mut #row,
                  value: ::swissarmyhammer_monday::ColumnValue|
                  -> ::swissarmyhammer_monday::Result<()> {
                row.#ident = ::core::option::Option::Some(
                    <#column as ::swissarmyhammer_monday::Column>::from_value(value)?,
                );
                ::core::result::Result::Ok(())
            },
            get: |row: &#row| -> ::core::option::Option<::swissarmyhammer_monday::ColumnValue> {
                ::core::clone::Clone::clone(&row.#ident)
                    .map(<#column as ::swissarmyhammer_monday::Column>::into_value)
            },
        }
    })
}

/// Move one `ItemMeta` attribute into a field, converting with `Into`
fn assign(field: &Ident, source: &Ident) -> proc_macro2::TokenStream {
    quote! {
        self.#field = ::core::convert::Into::into(meta.#source);
    }
}

/// Extract `T` from `Option<T>`
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
