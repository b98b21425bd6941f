// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Expansion of `#[visitor]`.
//!
//! The annotated impl block is emitted unchanged except for the phase tags,
//! followed by an `impl tugwalk::Visitor` whose registry registers one entry
//! per tagged method, in source order.
//!
//! Duplicates are caught here when two handlers spell the node type the same
//! way. Handlers naming one type through different paths are caught when the
//! table is built, and surface as the walk's registration error.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse_quote, ImplItem, ItemImpl, Type};

use crate::parsing::{is_tag, parse_tags, PhaseName, VisitorArgs};
use crate::validation::{analyze, HandlerSig, NodeParam};

pub(crate) fn expand_visitor(args: VisitorArgs, mut item: ItemImpl) -> syn::Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[visitor] goes on an inherent impl block, not on a trait impl",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[visitor] does not support generic visitor types",
        ));
    }

    let self_ty = (*item.self_ty).clone();
    let output: Type = args.output.unwrap_or_else(|| parse_quote!(()));

    let mut registrations = Vec::new();
    let mut seen: Vec<(PhaseName, String, String)> = Vec::new();
    let mut errors: Option<syn::Error> = None;
    let mut record = |err: syn::Error| match &mut errors {
        Some(errors) => errors.combine(err),
        None => errors = Some(err),
    };

    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let tags = match parse_tags(&method.attrs) {
            Ok(Some(tags)) => tags,
            Ok(None) => continue,
            Err(err) => {
                record(err);
                continue;
            }
        };
        method.attrs.retain(|attr| !is_tag(attr));

        let sig = match analyze(&method.sig, tags.kind.as_ref()) {
            Ok(sig) => sig,
            Err(err) => {
                record(err);
                continue;
            }
        };

        let name = method.sig.ident.to_string();
        let key = matcher_key(&sig.node);
        for &phase in &tags.phases {
            if args.mode.is_some_and(|mode| mode != phase) {
                continue;
            }
            if let Some((_, _, existing)) = seen
                .iter()
                .find(|(p, k, _)| *p == phase && *k == key)
            {
                record(syn::Error::new_spanned(
                    &method.sig.ident,
                    format!(
                        "duplicate {} handler for {key}: `{existing}` already handles it",
                        phase.as_str()
                    ),
                ));
                continue;
            }
            seen.push((phase, key.clone(), name.clone()));
        }

        registrations.push(registration(
            &self_ty,
            &output,
            &method.sig.ident,
            &tags.phases,
            &sig,
        ));
    }

    if let Some(errors) = errors {
        return Err(errors);
    }

    let mode = args.mode.map(|mode| quote!(.mode(#mode)));

    Ok(quote! {
        #item

        impl ::tugwalk::Visitor for #self_ty {
            type Output = #output;

            fn registry() -> ::core::result::Result<
                &'static ::tugwalk::Registry<Self>,
                &'static ::tugwalk::RegistrationError,
            > {
                static REGISTRY: ::std::sync::OnceLock<
                    ::core::result::Result<
                        ::tugwalk::Registry<#self_ty>,
                        ::tugwalk::RegistrationError,
                    >,
                > = ::std::sync::OnceLock::new();
                REGISTRY
                    .get_or_init(|| {
                        ::tugwalk::Registry::<#self_ty>::builder()
                            #mode
                            #(#registrations)*
                            .build()
                    })
                    .as_ref()
            }
        }
    })
}

fn matcher_key(node: &NodeParam) -> String {
    match node {
        NodeParam::Type(ty) => format!("`{}`", quote!(#ty)),
        NodeParam::Kind(kind) => format!("kind '{}'", kind.value()),
        NodeParam::Any => "any node".to_string(),
    }
}

fn registration(
    self_ty: &Type,
    output: &Type,
    method: &syn::Ident,
    phases: &[PhaseName],
    sig: &HandlerSig,
) -> TokenStream {
    let name = method.to_string();
    let receiver = if sig.mutable {
        quote!(visitor)
    } else {
        quote!(&*visitor)
    };
    let (cx, call) = if sig.takes_context {
        (quote!(cx), quote!(<#self_ty>::#method(#receiver, node, cx)))
    } else {
        (quote!(_cx), quote!(<#self_ty>::#method(#receiver, node)))
    };
    let body = if sig.returns {
        quote!(::core::convert::Into::<::core::option::Option<#output>>::into(#call))
    } else {
        quote!({
            #call;
            ::core::option::Option::None
        })
    };
    let context = quote!(::tugwalk::Context<'_, #output>);

    match &sig.node {
        NodeParam::Type(ty) => quote! {
            .on::<#ty, _>(
                #name,
                [#(#phases),*],
                |visitor: &mut #self_ty, node: &#ty, #cx: &#context| #body,
            )
        },
        NodeParam::Kind(kind) => quote! {
            .on_kind(
                #name,
                #kind,
                [#(#phases),*],
                |visitor: &mut #self_ty, node: &dyn ::tugwalk::Node, #cx: &#context| #body,
            )
        },
        NodeParam::Any => quote! {
            .on_any(
                #name,
                [#(#phases),*],
                |visitor: &mut #self_ty, node: &dyn ::tugwalk::Node, #cx: &#context| #body,
            )
        },
    }
}
