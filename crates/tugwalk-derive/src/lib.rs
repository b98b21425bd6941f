// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Proc macros for declaring tugwalk visitors and visitable nodes.
//!
//! # Visitors
//!
//! ```ignore
//! use tugwalk::{visitor, Context};
//!
//! #[visitor(output = String)]
//! impl Printer {
//!     #[prefix]
//!     fn open(&mut self, node: &Branch) { ... }
//!
//!     #[infix]
//!     fn comma(&mut self, _node: &Branch) { ... }
//!
//!     #[suffix]
//!     fn close(&mut self, node: &Branch, cx: &Context<String>) -> Option<String> { ... }
//!
//!     #[traverse(prefix, infix, suffix)]
//!     fn skip(&mut self, _node: &Marker) {}
//! }
//! ```
//!
//! The phase tags are consumed by `#[visitor]` and need no import. Handler
//! signatures are checked here, while the visitor type is compiled.
//!
//! # Nodes
//!
//! ```ignore
//! use tugwalk::Visitable;
//!
//! #[derive(Visitable)]
//! #[visitable(kind = "Statement")]
//! struct Branch {
//!     name: String,
//!     #[child]
//!     children: Vec<Branch>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemImpl};

mod codegen;
mod derive;
mod parsing;
mod validation;

/// Turn an inherent `impl` block into a visitor.
///
/// Arguments:
///
/// - `output = Type` - what handlers return (default `()`)
/// - `mode = prefix` (or `"prefix"`, `infix`, `suffix`) - single-phase visitor
///
/// Methods tagged `#[prefix]`, `#[infix]`, `#[suffix]` or
/// `#[traverse(prefix, ...)]` become handlers. Each tag accepts
/// `kind = "Tag"` to match nodes by kind instead of by type.
#[proc_macro_attribute]
pub fn visitor(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as parsing::VisitorArgs);
    let item = parse_macro_input!(item as ItemImpl);
    codegen::expand_visitor(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Implement `tugwalk::Node` for a struct or enum.
///
/// Fields marked `#[child]` are walked; all other fields are scalars.
/// `#[visitable(kind = "Tag")]` on the type (or on an enum variant) adds
/// kind tags. Enum variants also report their own name as a kind.
#[proc_macro_derive(Visitable, attributes(child, visitable))]
pub fn derive_visitable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive::expand_visitable(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
