// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The node capability: what a type must expose to be walked.
//!
//! A node enumerates its fields in declaration order. Each field is either a
//! single child node, an ordered sequence of child nodes, or a scalar that the
//! walker skips.
//!
//! # Field Classification
//!
//! A field is a child only when it is declared as one *and* its type is a
//! node. With `#[derive(Visitable)]` that means the field carries `#[child]`;
//! the compiler then checks the type through [`AsField`], which is implemented
//! for `T: Node`, `Vec<T: Node>` and `Option<T: Node>`. Every other field is a
//! [`Field::Scalar`]: not walked, and not counted when deciding where infix
//! calls go. An `Option` that is `None` is a scalar too.
//!
//! # Example
//!
//! ```ignore
//! use tugwalk::Visitable;
//!
//! #[derive(Visitable)]
//! struct Branch {
//!     name: String,
//!     #[child]
//!     children: Vec<Branch>,
//! }
//! ```

use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

/// A node of a walkable tree.
///
/// Usually derived with `#[derive(Visitable)]`. The field structure must not
/// change while a walk is in progress, and the tree must be acyclic.
pub trait Node: Any + 'static {
    /// The node's fields, in declaration order.
    fn fields(&self) -> Vec<(&'static str, Field<'_>)>;

    /// Explicit is-a tags, matched by kind handlers.
    ///
    /// Handlers registered for a kind apply to every node listing it, which is
    /// how a group of node types shares one handler without a type hierarchy.
    fn kinds(&self) -> &'static [&'static str] {
        &[]
    }

    /// Runtime type name, used in diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// The node as [`Any`], for type matching and downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Node {
    /// Returns `true` if the node is of type `T`.
    pub fn is<T: Node>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Returns the node as a `T`, if it is one.
    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// The shape of one field, as seen by the walker.
#[derive(Clone)]
pub enum Field<'a> {
    /// Opaque data. Never walked.
    Scalar,
    /// A single child node.
    Child(&'a dyn Node),
    /// An ordered sequence of child nodes.
    Children(Vec<&'a dyn Node>),
}

impl Field<'_> {
    /// Returns `true` for [`Field::Child`] and [`Field::Children`], even when
    /// the sequence is empty.
    pub fn is_child_bearing(&self) -> bool {
        !matches!(self, Field::Scalar)
    }
}

impl std::fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Scalar => f.write_str("Scalar"),
            Field::Child(node) => f.debug_tuple("Child").field(&node.type_name()).finish(),
            Field::Children(nodes) => f
                .debug_tuple("Children")
                .field(&nodes.iter().map(|n| n.type_name()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Conversion from a node-typed field value to a [`Field`].
///
/// The derive calls this for every `#[child]` field, so marking a field whose
/// type is not a node is a compile error rather than a silent scalar.
pub trait AsField {
    /// View the value as a walkable field.
    fn as_field(&self) -> Field<'_>;
}

impl<T: Node> AsField for T {
    fn as_field(&self) -> Field<'_> {
        Field::Child(self)
    }
}

impl<T: Node> AsField for Vec<T> {
    fn as_field(&self) -> Field<'_> {
        Field::Children(self.iter().map(|child| child as &dyn Node).collect())
    }
}

impl<T: Node> AsField for Option<T> {
    fn as_field(&self) -> Field<'_> {
        match self {
            Some(child) => Field::Child(child),
            None => Field::Scalar,
        }
    }
}

macro_rules! delegate_node {
    ($($pointer:ident),* $(,)?) => {
        $(
            impl<T: Node + ?Sized> Node for $pointer<T> {
                fn fields(&self) -> Vec<(&'static str, Field<'_>)> {
                    (**self).fields()
                }

                fn kinds(&self) -> &'static [&'static str] {
                    (**self).kinds()
                }

                fn type_name(&self) -> &'static str {
                    (**self).type_name()
                }

                fn as_any(&self) -> &dyn Any {
                    (**self).as_any()
                }
            }
        )*
    };
}

// Smart pointers are transparent: matching and downcasting see the pointee.
delegate_node!(Box, Rc, Arc);
