// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The visitor side of the authoring contract.
//!
//! A visitor type owns one [`Registry`] of phase-tagged handlers. Instances
//! carry their own state (an indent counter, a path being built) and are
//! passed by `&mut` to every handler; the table itself is shared.
//!
//! Handlers receive a [`Context`] in place of variadic arguments. Each handler
//! reads the parts it cares about and ignores the rest.

use crate::dispatch::dispatch;
use crate::error::{RegistrationError, WalkError};
use crate::node::Node;
use crate::phase::Phase;
use crate::registry::Registry;
use crate::walk::VisitedAttrs;

/// A type whose instances can be dispatched on during a walk.
///
/// Usually implemented by `#[visitor]` on an inherent `impl` block. A manual
/// implementation builds its table once and hands out `'static` references to
/// the outcome:
///
/// ```ignore
/// impl Visitor for Printer {
///     type Output = String;
///
///     fn registry() -> Result<&'static Registry<Self>, &'static RegistrationError> {
///         static REGISTRY: OnceLock<Result<Registry<Printer>, RegistrationError>> =
///             OnceLock::new();
///         REGISTRY
///             .get_or_init(|| {
///                 Registry::<Printer>::builder()
///                     .on::<Branch, _>("open", Phase::Prefix, |p, node, _| p.open(node))
///                     .build()
///             })
///             .as_ref()
///     }
/// }
/// ```
pub trait Visitor: Sized + 'static {
    /// What handlers return. Threaded down as `parent_res` and collected
    /// into the [`TraversalResult`](crate::TraversalResult).
    type Output;

    /// The dispatch table shared by all instances of this type, or the error
    /// that prevented building it.
    fn registry() -> Result<&'static Registry<Self>, &'static RegistrationError>;

    /// Dispatch `node` for the phase named by `cx`.
    fn visit(
        &mut self,
        node: &dyn Node,
        cx: &Context<'_, Self::Output>,
    ) -> Result<Option<Self::Output>, WalkError> {
        dispatch(self, node, cx)
    }

    /// Dispatch `node` for [`Phase::Prefix`].
    fn visit_prefix(
        &mut self,
        node: &dyn Node,
        parent_res: Option<&Self::Output>,
    ) -> Result<Option<Self::Output>, WalkError> {
        self.visit(node, &Context::prefix(parent_res))
    }

    /// Dispatch `node` for [`Phase::Infix`].
    fn visit_infix(
        &mut self,
        node: &dyn Node,
        parent_res: Option<&Self::Output>,
        prefix_res: Option<&Self::Output>,
    ) -> Result<Option<Self::Output>, WalkError> {
        self.visit(node, &Context::infix(parent_res, prefix_res))
    }

    /// Dispatch `node` for [`Phase::Suffix`].
    fn visit_suffix(
        &mut self,
        node: &dyn Node,
        parent_res: Option<&Self::Output>,
        prefix_res: Option<&Self::Output>,
        visited_attrs: &VisitedAttrs<Self::Output>,
    ) -> Result<Option<Self::Output>, WalkError> {
        self.visit(
            node,
            &Context::suffix(parent_res, prefix_res, visited_attrs),
        )
    }
}

/// What a handler gets to see besides the node itself.
///
/// | phase    | `parent_res` | `prefix_res` | `visited_attrs` |
/// |----------|--------------|--------------|-----------------|
/// | prefix   | yes          | -            | -               |
/// | infix    | yes          | yes          | -               |
/// | suffix   | yes          | yes          | yes             |
///
/// `parent_res` is the prefix result of the node's parent (`None` at the root).
#[derive(Debug)]
pub struct Context<'a, R> {
    phase: Phase,
    parent_res: Option<&'a R>,
    prefix_res: Option<&'a R>,
    visited_attrs: Option<&'a VisitedAttrs<R>>,
}

impl<R> Clone for Context<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Context<'_, R> {}

impl<'a, R> Context<'a, R> {
    /// Context for a prefix call.
    pub fn prefix(parent_res: Option<&'a R>) -> Self {
        Context {
            phase: Phase::Prefix,
            parent_res,
            prefix_res: None,
            visited_attrs: None,
        }
    }

    /// Context for an infix call between two children.
    pub fn infix(parent_res: Option<&'a R>, prefix_res: Option<&'a R>) -> Self {
        Context {
            phase: Phase::Infix,
            parent_res,
            prefix_res,
            visited_attrs: None,
        }
    }

    /// Context for a suffix call.
    pub fn suffix(
        parent_res: Option<&'a R>,
        prefix_res: Option<&'a R>,
        visited_attrs: &'a VisitedAttrs<R>,
    ) -> Self {
        Context {
            phase: Phase::Suffix,
            parent_res,
            prefix_res,
            visited_attrs: Some(visited_attrs),
        }
    }

    /// The phase being dispatched.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Prefix result of the parent node.
    pub fn parent_res(&self) -> Option<&'a R> {
        self.parent_res
    }

    /// Prefix result of the current node. `None` during prefix.
    pub fn prefix_res(&self) -> Option<&'a R> {
        self.prefix_res
    }

    /// Results collected from the node's children. Only set during suffix.
    pub fn visited_attrs(&self) -> Option<&'a VisitedAttrs<R>> {
        self.visited_attrs
    }
}
