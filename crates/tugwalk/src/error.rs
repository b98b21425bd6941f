// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for visitor registration and traversal.
//!
//! ## Taxonomy
//!
//! - [`RegistrationError`]: a visitor table could not be built. Raised once,
//!   when the table for a visitor type is constructed. A walk with such a
//!   visitor fails before any handler runs.
//! - [`DispatchError`]: no handler of the visitor matches a node for the
//!   requested phase. Aborts the walk that hit it.
//! - [`WalkError`]: what the traversal entry points return.
//!
//! None of these are recovered from inside the engine. A failed walk discards
//! whatever partial result it had built for the current subtree.

use thiserror::Error;

use crate::phase::Phase;

/// A visitor table could not be built.
///
/// Handler signatures (node argument present, node type declared) are checked
/// by the `#[visitor]` macro while the visitor type is compiled; the variants
/// here cover what can only be detected when the table is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A phase name other than `prefix`, `infix` or `suffix`.
    #[error("unknown phase '{phase}': only 'prefix', 'infix' or 'suffix' are available")]
    UnknownPhase { phase: String },

    /// Two handlers claim the same (phase, node type) pair.
    #[error(
        "duplicate {phase} handler for {node_type} in visitor {visitor}: \
         '{handler}' conflicts with '{existing}'"
    )]
    DuplicateHandler {
        visitor: &'static str,
        phase: Phase,
        node_type: String,
        existing: &'static str,
        handler: &'static str,
    },
}

/// No registered handler matches a node for the requested phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no suitable {phase} handler found for node type {node_type} in visitor {visitor}")]
pub struct DispatchError {
    /// Runtime type name of the offending node.
    pub node_type: &'static str,
    /// Type name of the visitor that was asked.
    pub visitor: &'static str,
    /// The phase that was requested.
    pub phase: Phase,
}

/// Error returned by the traversal entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalkError {
    /// The visitor's table failed to build.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// A dispatch call found no handler.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The tree is deeper than the configured [`WalkOptions::max_depth`].
    ///
    /// [`WalkOptions::max_depth`]: crate::WalkOptions::max_depth
    #[error("traversal depth limit of {limit} exceeded at node type {node_type}")]
    DepthLimitExceeded {
        limit: usize,
        node_type: &'static str,
    },
}

impl WalkError {
    /// The dispatch failure behind this error, if that is what it is.
    pub fn as_dispatch(&self) -> Option<&DispatchError> {
        match self {
            WalkError::Dispatch(err) => Some(err),
            WalkError::Registration(_) | WalkError::DepthLimitExceeded { .. } => None,
        }
    }

    /// The registration failure behind this error, if that is what it is.
    pub fn as_registration(&self) -> Option<&RegistrationError> {
        match self {
            WalkError::Registration(err) => Some(err),
            WalkError::Dispatch(_) | WalkError::DepthLimitExceeded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_error_names_type_visitor_and_phase() {
        let err = DispatchError {
            node_type: "tree::Leaf",
            visitor: "tree::Printer",
            phase: Phase::Infix,
        };
        let message = err.to_string();
        assert!(message.contains("tree::Leaf"));
        assert!(message.contains("tree::Printer"));
        assert!(message.contains("infix"));
    }

    #[test]
    fn test_walk_error_is_transparent_over_dispatch() {
        let err = DispatchError {
            node_type: "Leaf",
            visitor: "Printer",
            phase: Phase::Prefix,
        };
        let walk: WalkError = err.clone().into();
        assert_eq!(walk.to_string(), err.to_string());
        assert_eq!(walk.as_dispatch(), Some(&err));
    }

    #[test]
    fn test_walk_error_is_transparent_over_registration() {
        let err = RegistrationError::UnknownPhase {
            phase: "before".to_string(),
        };
        let walk: WalkError = err.clone().into();
        assert_eq!(walk.to_string(), err.to_string());
        assert_eq!(walk.as_registration(), Some(&err));
        assert!(walk.as_dispatch().is_none());
    }

    #[test]
    fn test_depth_limit_message() {
        let err = WalkError::DepthLimitExceeded {
            limit: 4,
            node_type: "Leaf",
        };
        assert_eq!(
            err.to_string(),
            "traversal depth limit of 4 exceeded at node type Leaf"
        );
        assert!(err.as_dispatch().is_none());
    }

    #[test]
    fn test_duplicate_handler_message() {
        let err = RegistrationError::DuplicateHandler {
            visitor: "Printer",
            phase: Phase::Suffix,
            node_type: "Leaf".to_string(),
            existing: "close_leaf",
            handler: "close_again",
        };
        let message = err.to_string();
        assert!(message.contains("duplicate suffix handler for Leaf"));
        assert!(message.contains("'close_again' conflicts with 'close_leaf'"));
    }
}
