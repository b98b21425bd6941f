// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Handler signature checks.
//!
//! A handler is `fn(&self | &mut self, node: &T [, cx: &Context<Output>]) [-> R]`
//! where `T` is a concrete node type or `dyn Node`, and `R` converts into
//! `Option<Output>`. Anything else is reported against the offending tokens.

use syn::{FnArg, LitStr, ReturnType, Signature, Type};

/// What a handler's node parameter binds to.
pub(crate) enum NodeParam {
    /// `&T`: nodes of exactly this type.
    Type(Type),
    /// `&dyn Node` with `kind = "..."`: nodes tagged with this kind.
    Kind(LitStr),
    /// `&dyn Node` without a kind: every node.
    Any,
}

/// The parts of a validated handler signature that code generation needs.
pub(crate) struct HandlerSig {
    pub(crate) mutable: bool,
    pub(crate) node: NodeParam,
    pub(crate) takes_context: bool,
    pub(crate) returns: bool,
}

pub(crate) fn analyze(sig: &Signature, kind: Option<&LitStr>) -> syn::Result<HandlerSig> {
    let name = &sig.ident;

    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            format!("handler `{name}` cannot be generic"),
        ));
    }
    if let Some(asyncness) = &sig.asyncness {
        return Err(syn::Error::new_spanned(
            asyncness,
            format!("handler `{name}` cannot be async"),
        ));
    }

    let mut inputs = sig.inputs.iter();

    let mutable = match inputs.next() {
        Some(FnArg::Receiver(receiver)) => {
            if receiver.reference.is_none() {
                return Err(syn::Error::new_spanned(
                    receiver,
                    format!("handler `{name}` must take `&self` or `&mut self`, not `self`"),
                ));
            }
            receiver.mutability.is_some()
        }
        _ => {
            return Err(syn::Error::new_spanned(
                sig,
                format!("handler `{name}` must take `&self` or `&mut self`"),
            ));
        }
    };

    let node_arg = match inputs.next() {
        Some(FnArg::Typed(arg)) => arg,
        Some(other) => return Err(syn::Error::new_spanned(other, "unexpected receiver")),
        None => {
            return Err(syn::Error::new(
                sig.paren_token.span.join(),
                format!("missing node argument in handler `{name}`"),
            ));
        }
    };
    let node = node_param(name, &node_arg.ty, kind)?;

    let takes_context = inputs.next().is_some();
    if let Some(extra) = inputs.next() {
        return Err(syn::Error::new_spanned(
            extra,
            format!("handler `{name}` takes at most a node and a context"),
        ));
    }

    let returns = match &sig.output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => !matches!(&**ty, Type::Tuple(tuple) if tuple.elems.is_empty()),
    };

    Ok(HandlerSig {
        mutable,
        node,
        takes_context,
        returns,
    })
}

fn node_param(name: &syn::Ident, ty: &Type, kind: Option<&LitStr>) -> syn::Result<NodeParam> {
    let missing = || {
        syn::Error::new_spanned(
            ty,
            format!("missing type annotation on the node argument of handler `{name}`"),
        )
    };

    let referent = match ty {
        Type::Reference(reference) => {
            if reference.mutability.is_some() {
                return Err(syn::Error::new_spanned(
                    ty,
                    format!("handler `{name}` must take its node by shared reference"),
                ));
            }
            &*reference.elem
        }
        Type::Infer(_) | Type::ImplTrait(_) => return Err(missing()),
        _ => {
            return Err(syn::Error::new_spanned(
                ty,
                format!("handler `{name}` must take its node by reference: `&{}`", quote::quote!(#ty)),
            ));
        }
    };

    match referent {
        Type::Infer(_) | Type::ImplTrait(_) => Err(missing()),
        Type::TraitObject(object) if is_node_trait(object) => Ok(match kind {
            Some(kind) => NodeParam::Kind(kind.clone()),
            None => NodeParam::Any,
        }),
        Type::TraitObject(_) => Err(syn::Error::new_spanned(
            referent,
            format!("handler `{name}` can only take `&dyn Node` as a trait object"),
        )),
        other => match kind {
            Some(kind) => Err(syn::Error::new(
                kind.span(),
                format!("kind handler `{name}` must take `&dyn Node`"),
            )),
            None => match pointee(other) {
                Some(inner) => Err(syn::Error::new_spanned(
                    other,
                    format!(
                        "handler `{name}` must take the node behind the pointer: `&{}`",
                        quote::quote!(#inner)
                    ),
                )),
                None => Ok(NodeParam::Type(other.clone())),
            },
        },
    }
}

/// The `T` of `Box<T>`, `Rc<T>` or `Arc<T>`. Walks see through these, so a
/// handler typed on the pointer itself could never match.
fn pointee(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if !matches!(segment.ident.to_string().as_str(), "Box" | "Rc" | "Arc") {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn is_node_trait(object: &syn::TypeTraitObject) -> bool {
    object.bounds.iter().any(|bound| match bound {
        syn::TypeParamBound::Trait(bound) => bound
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Node"),
        _ => false,
    })
}
