// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Handler resolution and invocation.
//!
//! [`dispatch`] looks up the visitor's table for the context's phase, takes
//! the first entry whose matcher accepts the node (registration order), and
//! calls it. Phases suppressed by a single-phase visitor short-circuit to
//! `Ok(None)` before any lookup.

use crate::error::{DispatchError, WalkError};
use crate::node::Node;
use crate::visitor::{Context, Visitor};

/// Resolve and invoke the handler of `visitor` for `node`.
///
/// # Errors
///
/// Returns [`WalkError::Registration`] if the visitor's table failed to build,
/// and [`WalkError::Dispatch`] if no entry for the phase matches the node.
pub fn dispatch<V: Visitor>(
    visitor: &mut V,
    node: &dyn Node,
    cx: &Context<'_, V::Output>,
) -> Result<Option<V::Output>, WalkError> {
    let registry = V::registry().map_err(|err| WalkError::Registration(err.clone()))?;
    let phase = cx.phase();

    if !registry.serves(phase) {
        return Ok(None);
    }

    match registry.resolve(node, phase) {
        Some(entry) => {
            tracing::trace!(
                visitor = registry.visitor(),
                node = node.type_name(),
                %phase,
                handler = entry.name(),
                "dispatch"
            );
            Ok(entry.call(visitor, node, cx))
        }
        None => {
            let err = DispatchError {
                node_type: node.type_name(),
                visitor: registry.visitor(),
                phase,
            };
            tracing::debug!(error = %err, "dispatch failed");
            Err(err.into())
        }
    }
}
