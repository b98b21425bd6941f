// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! `#[derive(Visitable)]`.

use proc_macro2::{Ident, Span, TokenStream, TokenTree};
use quote::{format_ident, quote, ToTokens};
use syn::{Attribute, Data, DeriveInput, Fields, GenericParam, LitStr, Member, Type};

pub(crate) fn expand_visitable(mut input: DeriveInput) -> syn::Result<TokenStream> {
    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Visitable nodes must be 'static: lifetime parameters are not supported",
        ));
    }
    for param in &mut input.generics.params {
        if let GenericParam::Type(param) = param {
            param.bounds.push(syn::parse_quote!('static));
        }
    }
    let params: Vec<Ident> = input
        .generics
        .type_params()
        .map(|param| param.ident.clone())
        .collect();
    if !params.is_empty() {
        let bounded = generic_child_types(&input.data, &params)?;
        let where_clause = input.generics.make_where_clause();
        for ty in bounded {
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: ::tugwalk::AsField));
        }
    }

    let name = &input.ident;
    let type_kinds = kinds(&input.attrs)?;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let (fields, kinds_fn) = match &input.data {
        Data::Struct(data) => {
            let entries = field_entries(&data.fields, |member, _| quote!(&self.#member))?;
            let kinds_fn = (!type_kinds.is_empty()).then(|| {
                quote! {
                    fn kinds(&self) -> &'static [&'static str] {
                        &[#(#type_kinds),*]
                    }
                }
            });
            (quote!(::std::vec![#(#entries),*]), kinds_fn)
        }
        Data::Enum(data) => {
            if data.variants.is_empty() {
                return Err(syn::Error::new_spanned(
                    name,
                    "cannot derive Visitable for an enum with no variants",
                ));
            }

            let mut field_arms = Vec::new();
            let mut kind_arms = Vec::new();
            for variant in &data.variants {
                let ident = &variant.ident;
                let mut bindings = Vec::new();
                let entries = field_entries(&variant.fields, |member, index| {
                    let binding = format_ident!("__field{}", index);
                    bindings.push(quote!(#member: #binding));
                    quote!(#binding)
                })?;
                field_arms.push(quote! {
                    Self::#ident { #(#bindings,)* .. } => ::std::vec![#(#entries),*],
                });

                let variant_name = LitStr::new(&ident.to_string(), ident.span());
                let variant_kinds = kinds(&variant.attrs)?;
                kind_arms.push(quote! {
                    Self::#ident { .. } => &[#variant_name, #(#variant_kinds,)* #(#type_kinds),*],
                });
            }

            let kinds_fn = quote! {
                fn kinds(&self) -> &'static [&'static str] {
                    match self {
                        #(#kind_arms)*
                    }
                }
            };
            (quote!(match self { #(#field_arms)* }), Some(kinds_fn))
        }
        Data::Union(data) => {
            return Err(syn::Error::new_spanned(
                data.union_token,
                "cannot derive Visitable for a union",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::tugwalk::Node for #name #ty_generics #where_clause {
            fn fields(&self) -> ::std::vec::Vec<(&'static str, ::tugwalk::Field<'_>)> {
                #fields
            }

            #kinds_fn

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    })
}

/// One `(name, field)` expression per field, in declaration order. `access`
/// produces the expression referring to a child field.
fn field_entries(
    fields: &Fields,
    mut access: impl FnMut(&Member, usize) -> TokenStream,
) -> syn::Result<Vec<TokenStream>> {
    let mut entries = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let (member, label) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
            None => (Member::Unnamed(index.into()), index.to_string()),
        };
        let label = LitStr::new(label.trim_start_matches("r#"), Span::call_site());

        if is_child(&field.attrs)? {
            let expr = access(&member, index);
            entries.push(quote!((#label, ::tugwalk::AsField::as_field(#expr))));
        } else {
            entries.push(quote!((#label, ::tugwalk::Field::Scalar)));
        }
    }
    Ok(entries)
}

/// `#[child]` field types that mention one of `params`, each listed once.
fn generic_child_types(data: &Data, params: &[Ident]) -> syn::Result<Vec<Type>> {
    let fields: Vec<&syn::Field> = match data {
        Data::Struct(data) => data.fields.iter().collect(),
        Data::Enum(data) => data.variants.iter().flat_map(|v| v.fields.iter()).collect(),
        Data::Union(_) => Vec::new(),
    };

    let mut types: Vec<Type> = Vec::new();
    for field in fields {
        if !is_child(&field.attrs)? || !mentions(field.ty.to_token_stream(), params) {
            continue;
        }
        let key = field.ty.to_token_stream().to_string();
        if !types.iter().any(|ty| ty.to_token_stream().to_string() == key) {
            types.push(field.ty.clone());
        }
    }
    Ok(types)
}

fn mentions(tokens: TokenStream, params: &[Ident]) -> bool {
    tokens.into_iter().any(|token| match token {
        TokenTree::Ident(ident) => params.contains(&ident),
        TokenTree::Group(group) => mentions(group.stream(), params),
        _ => false,
    })
}

fn is_child(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut child = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("child")) {
        attr.meta.require_path_only()?;
        child = true;
    }
    Ok(child)
}

/// Kinds listed in `#[visitable(kind = "...")]` attributes.
fn kinds(attrs: &[Attribute]) -> syn::Result<Vec<LitStr>> {
    let mut kinds: Vec<LitStr> = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("visitable")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                let kind: LitStr = meta.value()?.parse()?;
                if !kinds.iter().any(|k| k.value() == kind.value()) {
                    kinds.push(kind);
                }
                Ok(())
            } else {
                Err(meta.error("unknown visitable attribute: expected `kind = \"...\"`"))
            }
        })?;
    }
    Ok(kinds)
}
