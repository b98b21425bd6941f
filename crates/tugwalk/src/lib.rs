// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Phase-tagged visitor dispatch and generic tree traversal.
//!
//! Node types describe their fields; visitor types bundle handlers bound to a
//! (phase, node type) pair. Neither knows about the other's concrete types.
//!
//! - [`Node`] / `#[derive(Visitable)]` - the node capability
//! - [`Registry`] - the per-visitor-type dispatch table
//! - [`Visitor`] / `#[visitor]` - the visitor capability
//! - [`dispatch`] - resolve and invoke one handler
//! - [`walk`], [`Walker`], [`Accept`] - the traversal engine
//!
//! # Example
//!
//! ```ignore
//! use tugwalk::{visitor, Accept, Visitable};
//!
//! #[derive(Visitable)]
//! struct Branch {
//!     name: String,
//!     #[child]
//!     children: Vec<Branch>,
//! }
//!
//! #[derive(Default)]
//! struct Path {
//!     names: Vec<String>,
//! }
//!
//! #[visitor(mode = prefix)]
//! impl Path {
//!     #[prefix]
//!     fn enter(&mut self, node: &Branch) {
//!         self.names.push(node.name.clone());
//!     }
//! }
//!
//! let mut path = Path::default();
//! tree.accept(&mut path)?;
//! ```
//!
//! # Handler Signatures
//!
//! Malformed handlers are rejected while the visitor type is compiled. A
//! handler without a node argument:
//!
//! ```compile_fail
//! use tugwalk::visitor;
//!
//! struct Broken;
//!
//! #[visitor(mode = prefix)]
//! impl Broken {
//!     #[prefix]
//!     fn enter(&mut self) {}
//! }
//! ```
//!
//! The messages themselves are pinned by the `tests/ui` cases.

// Lets macro-generated `::tugwalk::` paths resolve inside this crate's tests.
extern crate self as tugwalk;

pub mod dispatch;
pub mod error;
pub mod node;
pub mod phase;
pub mod registry;
pub mod visitor;
pub mod walk;

pub use dispatch::dispatch;
pub use error::{DispatchError, RegistrationError, WalkError};
pub use node::{AsField, Field, Node};
pub use phase::{IntoPhases, Phase};
pub use registry::{Handler, HandlerEntry, NodeMatcher, NodeType, Registry, RegistryBuilder};
pub use visitor::{Context, Visitor};
pub use walk::{
    walk, Accept, TraversalResult, Visited, VisitedAttrs, WalkOptions, Walker, MAX_DEPTH_ENV,
};

pub use tugwalk_derive::{visitor, Visitable};
