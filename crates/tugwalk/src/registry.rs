// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-visitor dispatch tables.
//!
//! A [`Registry`] maps each [`Phase`] to an ordered list of handler entries.
//! It is built once per visitor type, never mutated afterwards, and shared by
//! every instance of that visitor through [`Visitor::registry`].
//!
//! # Matching
//!
//! Each entry carries a [`NodeMatcher`]:
//!
//! - [`NodeMatcher::Type`] - the node's concrete type is exactly this type
//! - [`NodeMatcher::Kind`] - the node lists this tag in [`Node::kinds`]
//! - [`NodeMatcher::Any`] - every node (an explicit fallback)
//!
//! Lookup takes the first matching entry in registration order. When several
//! entries could match a node (say a type entry and a kind entry), the one
//! registered first wins. This is a defined policy: register specific
//! handlers before general ones.
//!
//! # Building
//!
//! ```ignore
//! let registry = Registry::<Printer>::builder()
//!     .on::<Branch, _>("open", Phase::Prefix, |printer, node, _cx| printer.open(node))
//!     .on::<Branch, _>("close", "suffix", |printer, node, _cx| printer.close(node))
//!     .on_any("ignore", ["prefix", "infix", "suffix"], |_, _, _| None)
//!     .build()?;
//! ```

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::error::RegistrationError;
use crate::node::Node;
use crate::phase::{IntoPhases, Phase};
use crate::visitor::{Context, Visitor};

/// Identity of a concrete node type.
#[derive(Debug, Clone, Copy)]
pub struct NodeType {
    id: TypeId,
    name: &'static str,
}

impl NodeType {
    /// The node type of `T`.
    pub fn of<T: Node>() -> Self {
        NodeType {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type's [`TypeId`].
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type's name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for NodeType {}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Which nodes a handler entry applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMatcher {
    /// Nodes whose concrete type is exactly this one.
    Type(NodeType),
    /// Nodes that list this tag in [`Node::kinds`].
    Kind(&'static str),
    /// Every node.
    Any,
}

impl NodeMatcher {
    /// Returns `true` if this matcher accepts `node`.
    pub fn matches(&self, node: &dyn Node) -> bool {
        match self {
            NodeMatcher::Type(ty) => node.as_any().type_id() == ty.id,
            NodeMatcher::Kind(kind) => node.kinds().contains(kind),
            NodeMatcher::Any => true,
        }
    }
}

impl fmt::Display for NodeMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeMatcher::Type(ty) => write!(f, "{ty}"),
            NodeMatcher::Kind(kind) => write!(f, "kind '{kind}'"),
            NodeMatcher::Any => f.write_str("any node"),
        }
    }
}

/// A type-erased handler bound to a visitor type.
pub type Handler<V> = Arc<
    dyn Fn(&mut V, &dyn Node, &Context<'_, <V as Visitor>::Output>) -> Option<<V as Visitor>::Output>
        + Send
        + Sync,
>;

/// One (matcher, handler) binding within a phase.
pub struct HandlerEntry<V: Visitor> {
    name: &'static str,
    matcher: NodeMatcher,
    handler: Handler<V>,
}

impl<V: Visitor> HandlerEntry<V> {
    /// The handler's name, as given at registration.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The nodes this entry applies to.
    pub fn matcher(&self) -> NodeMatcher {
        self.matcher
    }

    pub(crate) fn call(
        &self,
        visitor: &mut V,
        node: &dyn Node,
        cx: &Context<'_, V::Output>,
    ) -> Option<V::Output> {
        (self.handler)(visitor, node, cx)
    }
}

impl<V: Visitor> fmt::Debug for HandlerEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("name", &self.name)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}

/// The immutable dispatch table of a visitor type.
pub struct Registry<V: Visitor> {
    visitor: &'static str,
    mode: Option<Phase>,
    phases: [Vec<HandlerEntry<V>>; 3],
}

impl<V: Visitor> Registry<V> {
    /// Start building a registry for `V`.
    pub fn builder() -> RegistryBuilder<V> {
        RegistryBuilder::new()
    }

    /// Type name of the visitor this table belongs to.
    pub fn visitor(&self) -> &'static str {
        self.visitor
    }

    /// The single phase this visitor runs in, if it was declared single-phase.
    pub fn mode(&self) -> Option<Phase> {
        self.mode
    }

    /// Returns `false` for the phases a single-phase visitor suppresses.
    pub fn serves(&self, phase: Phase) -> bool {
        self.mode.is_none_or(|mode| mode == phase)
    }

    /// Entries for `phase`, in registration order.
    pub fn handlers(&self, phase: Phase) -> &[HandlerEntry<V>] {
        &self.phases[phase.index()]
    }

    /// Total number of entries across all phases.
    pub fn len(&self) -> usize {
        self.phases.iter().map(Vec::len).sum()
    }

    /// Returns `true` if no handler is registered for any phase.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The first entry for `phase` that matches `node`.
    pub fn resolve(&self, node: &dyn Node, phase: Phase) -> Option<&HandlerEntry<V>> {
        self.handlers(phase)
            .iter()
            .find(|entry| entry.matcher.matches(node))
    }
}

impl<V: Visitor> fmt::Debug for Registry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("visitor", &self.visitor)
            .field("mode", &self.mode)
            .field("prefix", &self.phases[0])
            .field("infix", &self.phases[1])
            .field("suffix", &self.phases[2])
            .finish()
    }
}

/// Builder for [`Registry`].
///
/// Registration errors are recorded as they happen and reported by
/// [`build`](RegistryBuilder::build); the first one wins.
pub struct RegistryBuilder<V: Visitor> {
    mode: Option<Phase>,
    pending: Vec<(Vec<Phase>, HandlerEntry<V>)>,
    error: Option<RegistrationError>,
}

impl<V: Visitor> Default for RegistryBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Visitor> RegistryBuilder<V> {
    /// An empty builder serving all three phases.
    pub fn new() -> Self {
        RegistryBuilder {
            mode: None,
            pending: Vec::new(),
            error: None,
        }
    }

    /// Restrict the visitor to a single phase.
    ///
    /// Dispatch for the other two phases returns nothing without a lookup, so
    /// no handlers are needed for them.
    pub fn mode(mut self, phase: Phase) -> Self {
        self.mode = Some(phase);
        self
    }

    /// Register a handler for nodes of concrete type `N`.
    pub fn on<N, F>(self, name: &'static str, phases: impl IntoPhases, handler: F) -> Self
    where
        N: Node,
        F: Fn(&mut V, &N, &Context<'_, V::Output>) -> Option<V::Output> + Send + Sync + 'static,
    {
        let handler: Handler<V> = Arc::new(
            move |visitor: &mut V, node: &dyn Node, cx: &Context<'_, V::Output>| {
                node.downcast_ref::<N>()
                    .and_then(|node| handler(visitor, node, cx))
            },
        );
        self.push(name, NodeMatcher::Type(NodeType::of::<N>()), phases, handler)
    }

    /// Register a handler for every node tagged with `kind`.
    pub fn on_kind<F>(
        self,
        name: &'static str,
        kind: &'static str,
        phases: impl IntoPhases,
        handler: F,
    ) -> Self
    where
        F: Fn(&mut V, &dyn Node, &Context<'_, V::Output>) -> Option<V::Output>
            + Send
            + Sync
            + 'static,
    {
        self.push(name, NodeMatcher::Kind(kind), phases, Arc::new(handler))
    }

    /// Register a fallback handler that matches every node.
    pub fn on_any<F>(self, name: &'static str, phases: impl IntoPhases, handler: F) -> Self
    where
        F: Fn(&mut V, &dyn Node, &Context<'_, V::Output>) -> Option<V::Output>
            + Send
            + Sync
            + 'static,
    {
        self.push(name, NodeMatcher::Any, phases, Arc::new(handler))
    }

    fn push(
        mut self,
        name: &'static str,
        matcher: NodeMatcher,
        phases: impl IntoPhases,
        handler: Handler<V>,
    ) -> Self {
        match phases.into_phases() {
            Ok(phases) => self.pending.push((
                phases,
                HandlerEntry {
                    name,
                    matcher,
                    handler,
                },
            )),
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    /// Validate the registrations and produce the table.
    pub fn build(self) -> Result<Registry<V>, RegistrationError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let visitor = std::any::type_name::<V>();
        let mut phases: [Vec<HandlerEntry<V>>; 3] = [Vec::new(), Vec::new(), Vec::new()];

        for (entry_phases, entry) in self.pending {
            for phase in entry_phases {
                if self.mode.is_some_and(|mode| mode != phase) {
                    tracing::debug!(
                        visitor,
                        handler = entry.name,
                        %phase,
                        "handler registered for a phase this visitor never runs; ignoring"
                    );
                    continue;
                }

                let table = &mut phases[phase.index()];
                if let Some(existing) = table.iter().find(|e| e.matcher == entry.matcher) {
                    return Err(RegistrationError::DuplicateHandler {
                        visitor,
                        phase,
                        node_type: entry.matcher.to_string(),
                        existing: existing.name,
                        handler: entry.name,
                    });
                }
                table.push(HandlerEntry {
                    name: entry.name,
                    matcher: entry.matcher,
                    handler: Arc::clone(&entry.handler),
                });
            }
        }

        let registry = Registry {
            visitor,
            mode: self.mode,
            phases,
        };
        tracing::debug!(
            visitor,
            mode = ?registry.mode,
            handlers = registry.len(),
            "built visitor registry"
        );
        Ok(registry)
    }
}
