// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Parsing of `#[visitor(...)]` arguments and handler phase tags.

use proc_macro2::{Span, TokenStream};
use quote::{quote, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Attribute, Ident, LitStr, Token, Type,
};

/// The phase names a tag may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PhaseName {
    Prefix,
    Infix,
    Suffix,
}

impl PhaseName {
    pub(crate) fn parse(name: &str, span: Span) -> syn::Result<Self> {
        match name {
            "prefix" => Ok(PhaseName::Prefix),
            "infix" => Ok(PhaseName::Infix),
            "suffix" => Ok(PhaseName::Suffix),
            other => Err(syn::Error::new(
                span,
                format!(
                    "unknown phase `{other}`: only `prefix`, `infix` or `suffix` are available"
                ),
            )),
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PhaseName::Prefix => "prefix",
            PhaseName::Infix => "infix",
            PhaseName::Suffix => "suffix",
        }
    }
}

impl ToTokens for PhaseName {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let variant = match self {
            PhaseName::Prefix => quote!(Prefix),
            PhaseName::Infix => quote!(Infix),
            PhaseName::Suffix => quote!(Suffix),
        };
        tokens.extend(quote!(::tugwalk::Phase::#variant));
    }
}

/// A phase written either as an identifier or as a string literal.
fn parse_phase(input: ParseStream) -> syn::Result<PhaseName> {
    if input.peek(LitStr) {
        let lit: LitStr = input.parse()?;
        PhaseName::parse(&lit.value(), lit.span())
    } else {
        let ident: Ident = input.parse()?;
        PhaseName::parse(&ident.to_string(), ident.span())
    }
}

// ============================================================================
// #[visitor(...)]
// ============================================================================

/// Arguments to the `#[visitor]` attribute.
pub(crate) struct VisitorArgs {
    pub(crate) output: Option<Type>,
    pub(crate) mode: Option<PhaseName>,
}

enum VisitorArg {
    Output(Type),
    Mode(PhaseName),
}

impl Parse for VisitorArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let ident: Ident = input.parse()?;
        match ident.to_string().as_str() {
            "output" => {
                input.parse::<Token![=]>()?;
                Ok(VisitorArg::Output(input.parse()?))
            }
            "mode" | "traversal_mode" => {
                input.parse::<Token![=]>()?;
                Ok(VisitorArg::Mode(parse_phase(input)?))
            }
            other => Err(syn::Error::new(
                ident.span(),
                format!("unknown visitor argument `{other}`: expected `output` or `mode`"),
            )),
        }
    }
}

impl Parse for VisitorArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let mut output = None;
        let mut mode = None;

        let args = Punctuated::<VisitorArg, Token![,]>::parse_terminated(input)?;
        for arg in args {
            match arg {
                VisitorArg::Output(ty) => output = Some(ty),
                VisitorArg::Mode(phase) => mode = Some(phase),
            }
        }

        Ok(VisitorArgs { output, mode })
    }
}

// ============================================================================
// Handler tags
// ============================================================================

/// The phases and kind a handler method was tagged with.
#[derive(Default)]
pub(crate) struct HandlerTags {
    pub(crate) phases: Vec<PhaseName>,
    pub(crate) kind: Option<LitStr>,
}

enum TagArg {
    Phase(PhaseName),
    Kind(LitStr),
}

impl Parse for TagArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Ident) && input.peek2(Token![=]) {
            let ident: Ident = input.parse()?;
            if ident != "kind" {
                return Err(syn::Error::new(
                    ident.span(),
                    format!("unknown handler argument `{ident}`: expected `kind = \"...\"`"),
                ));
            }
            input.parse::<Token![=]>()?;
            return Ok(TagArg::Kind(input.parse()?));
        }
        Ok(TagArg::Phase(parse_phase(input)?))
    }
}

/// Returns `true` for the attributes `#[visitor]` consumes.
pub(crate) fn is_tag(attr: &Attribute) -> bool {
    ["prefix", "infix", "suffix", "traverse"]
        .iter()
        .any(|name| attr.path().is_ident(name))
}

/// Collect the tags on a method. Phases accumulate across attributes.
///
/// Returns `None` if the method carries no tag at all.
pub(crate) fn parse_tags(attrs: &[Attribute]) -> syn::Result<Option<HandlerTags>> {
    let mut tags: Option<HandlerTags> = None;

    for attr in attrs.iter().filter(|attr| is_tag(attr)) {
        let current = tags.get_or_insert_with(HandlerTags::default);
        let fixed = if attr.path().is_ident("prefix") {
            Some(PhaseName::Prefix)
        } else if attr.path().is_ident("infix") {
            Some(PhaseName::Infix)
        } else if attr.path().is_ident("suffix") {
            Some(PhaseName::Suffix)
        } else {
            None
        };

        let args = match &attr.meta {
            syn::Meta::Path(_) => Vec::new(),
            syn::Meta::List(_) => attr
                .parse_args_with(Punctuated::<TagArg, Token![,]>::parse_terminated)?
                .into_iter()
                .collect(),
            syn::Meta::NameValue(nv) => {
                return Err(syn::Error::new_spanned(
                    nv,
                    "phase tags take a list: `#[traverse(prefix, suffix)]`",
                ));
            }
        };

        let mut listed = Vec::new();
        for arg in args {
            match arg {
                TagArg::Phase(phase) => listed.push(phase),
                TagArg::Kind(kind) => {
                    if let Some(existing) = &current.kind {
                        if existing.value() != kind.value() {
                            return Err(syn::Error::new(
                                kind.span(),
                                format!(
                                    "conflicting kinds `{}` and `{}` on one handler",
                                    existing.value(),
                                    kind.value()
                                ),
                            ));
                        }
                    }
                    current.kind = Some(kind);
                }
            }
        }

        match fixed {
            Some(phase) => {
                if !listed.is_empty() {
                    return Err(syn::Error::new_spanned(
                        attr,
                        format!(
                            "`#[{}]` only accepts `kind = \"...\"`; use `#[traverse(...)]` to list phases",
                            phase.as_str()
                        ),
                    ));
                }
                listed.push(phase);
            }
            None if listed.is_empty() => {
                return Err(syn::Error::new_spanned(
                    attr,
                    "`#[traverse]` needs at least one phase: `#[traverse(prefix, infix, suffix)]`",
                ));
            }
            None => {}
        }

        for phase in listed {
            if !current.phases.contains(&phase) {
                current.phases.push(phase);
            }
        }
    }

    Ok(tags)
}
