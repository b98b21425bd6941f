// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! The traversal engine.
//!
//! Walks a node and its descendants depth-first, dispatching the visitor at
//! three points per node, and returns a [`TraversalResult`] mirroring the
//! tree's child-bearing fields.
//!
//! # Traversal Order
//!
//! For each node:
//!
//! 1. `prefix` on the node, with the parent's prefix result as `parent_res`
//! 2. Each field in declaration order:
//!    - child sequence: walk every child; `infix` on the *current* node
//!      between consecutive children, never after the last one
//!    - single child: walk it; `infix` on the current node afterwards if a
//!      later child-bearing field exists
//!    - scalar: skipped, and not counted for infix placement
//! 3. `suffix` on the node, with `parent_res`, `prefix_res` and the results
//!    collected in step 2
//!
//! A sequence field counts as child-bearing even when it is empty, so infix
//! placement depends only on the node type's field layout.
//!
//! A visitor whose table failed to build is rejected before the root is
//! visited. The first [`DispatchError`](crate::DispatchError) aborts the walk.
//! Results already computed for the subtree are dropped.
//!
//! # Stack Depth
//!
//! Recursion depth equals tree depth and uses the host call stack. Trees deep
//! enough to overflow it are the caller's problem; [`WalkOptions::max_depth`]
//! turns that into a [`WalkError::DepthLimitExceeded`] instead.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::WalkError;
use crate::node::{Field, Node};
use crate::visitor::Visitor;

/// Environment variable read by [`WalkOptions::from_env`].
pub const MAX_DEPTH_ENV: &str = "TUGWALK_MAX_DEPTH";

// ============================================================================
// Results
// ============================================================================

/// The result of walking one node: `(prefix, visited children, suffix)`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TraversalResult<R> {
    /// What the prefix handler returned.
    pub prefix: Option<R>,
    /// Results of the node's children, keyed by field name.
    pub visited: VisitedAttrs<R>,
    /// What the suffix handler returned.
    pub suffix: Option<R>,
}

impl<R> TraversalResult<R> {
    /// Split into the `(prefix_res, visited_attrs, suffix_res)` triple.
    pub fn into_parts(self) -> (Option<R>, VisitedAttrs<R>, Option<R>) {
        (self.prefix, self.visited, self.suffix)
    }
}

/// What walking one child-bearing field produced.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Visited<R> {
    /// Result of a single-child field.
    Child(Box<TraversalResult<R>>),
    /// Results of a child-sequence field, in order. Never empty.
    Children(Vec<TraversalResult<R>>),
}

impl<R> Visited<R> {
    /// The single child's result, if this is a single-child field.
    pub fn as_child(&self) -> Option<&TraversalResult<R>> {
        match self {
            Visited::Child(result) => Some(result),
            Visited::Children(_) => None,
        }
    }

    /// The children's results, if this is a sequence field.
    pub fn as_children(&self) -> Option<&[TraversalResult<R>]> {
        match self {
            Visited::Child(_) => None,
            Visited::Children(results) => Some(results),
        }
    }
}

/// Children results keyed by field name, in field declaration order.
///
/// Sequence fields that produced no results are omitted.
#[derive(Clone, PartialEq)]
pub struct VisitedAttrs<R> {
    entries: Vec<(&'static str, Visited<R>)>,
}

impl<R> VisitedAttrs<R> {
    /// An empty map.
    pub fn new() -> Self {
        VisitedAttrs {
            entries: Vec::new(),
        }
    }

    /// The result recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&Visited<R>> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, visited)| visited)
    }

    /// Returns `true` if `field` produced a result.
    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Field names, in order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// `(field, result)` pairs, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Visited<R>)> {
        self.entries.iter().map(|(name, visited)| (*name, visited))
    }

    /// Number of fields with results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no field produced a result.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, field: &'static str, visited: Visited<R>) {
        self.entries.push((field, visited));
    }
}

impl<R> Default for VisitedAttrs<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: fmt::Debug> fmt::Debug for VisitedAttrs<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<R: Serialize> Serialize for VisitedAttrs<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, visited) in &self.entries {
            map.serialize_entry(name, visited)?;
        }
        map.end()
    }
}

// ============================================================================
// Options
// ============================================================================

/// Knobs for a [`Walker`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Deepest node level allowed, the root being level 0. `None` means no
    /// limit beyond the call stack.
    pub max_depth: Option<usize>,
}

impl WalkOptions {
    /// Options with the given depth limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        WalkOptions {
            max_depth: Some(max_depth),
        }
    }

    /// Options from the environment.
    ///
    /// Reads [`MAX_DEPTH_ENV`]. An unset variable means no limit; a value that
    /// is not a non-negative integer is ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MAX_DEPTH_ENV).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        let max_depth = value.and_then(|raw| match raw.trim().parse::<usize>() {
            Ok(depth) => Some(depth),
            Err(err) => {
                tracing::warn!(
                    variable = MAX_DEPTH_ENV,
                    value = raw,
                    error = %err,
                    "ignoring invalid traversal depth limit"
                );
                None
            }
        });
        WalkOptions { max_depth }
    }
}

// ============================================================================
// Walker
// ============================================================================

/// Walks trees with a fixed set of [`WalkOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Walker {
    options: WalkOptions,
}

impl Walker {
    /// A walker using `options`.
    pub fn new(options: WalkOptions) -> Self {
        Walker { options }
    }

    /// The options this walker was created with.
    pub fn options(&self) -> WalkOptions {
        self.options
    }

    /// Walk `root` with `visitor`.
    ///
    /// # Errors
    ///
    /// Fails if the visitor's table failed to build, on the first dispatch
    /// that finds no handler, or when the tree is deeper than the configured
    /// limit.
    pub fn walk<V: Visitor>(
        &self,
        root: &dyn Node,
        visitor: &mut V,
    ) -> Result<TraversalResult<V::Output>, WalkError> {
        V::registry().map_err(|err| WalkError::Registration(err.clone()))?;
        let span = tracing::debug_span!(
            "walk",
            visitor = std::any::type_name::<V>(),
            root = root.type_name()
        );
        let _guard = span.enter();
        self.walk_node(root, visitor, None, 0)
    }

    fn walk_node<V: Visitor>(
        &self,
        node: &dyn Node,
        visitor: &mut V,
        parent_res: Option<&V::Output>,
        depth: usize,
    ) -> Result<TraversalResult<V::Output>, WalkError> {
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return Err(WalkError::DepthLimitExceeded {
                    limit,
                    node_type: node.type_name(),
                });
            }
        }

        let prefix = visitor.visit_prefix(node, parent_res)?;

        let fields = node.fields();
        let last_child_field = fields.iter().rposition(|(_, field)| field.is_child_bearing());
        let mut visited = VisitedAttrs::new();

        for (index, (name, field)) in fields.into_iter().enumerate() {
            match field {
                Field::Scalar => {}
                Field::Children(children) => {
                    let count = children.len();
                    let mut results = Vec::with_capacity(count);
                    for (position, child) in children.into_iter().enumerate() {
                        results.push(self.walk_node(child, visitor, prefix.as_ref(), depth + 1)?);
                        if position + 1 < count {
                            visitor.visit_infix(node, parent_res, prefix.as_ref())?;
                        }
                    }
                    if !results.is_empty() {
                        visited.insert(name, Visited::Children(results));
                    }
                }
                Field::Child(child) => {
                    let result = self.walk_node(child, visitor, prefix.as_ref(), depth + 1)?;
                    if last_child_field != Some(index) {
                        visitor.visit_infix(node, parent_res, prefix.as_ref())?;
                    }
                    visited.insert(name, Visited::Child(Box::new(result)));
                }
            }
        }

        let suffix = visitor.visit_suffix(node, parent_res, prefix.as_ref(), &visited)?;

        Ok(TraversalResult {
            prefix,
            visited,
            suffix,
        })
    }
}

/// Walk `root` with `visitor`, without a depth limit.
///
/// # Errors
///
/// Fails if the visitor's table failed to build, or on the first dispatch
/// that finds no handler.
pub fn walk<V: Visitor>(
    root: &dyn Node,
    visitor: &mut V,
) -> Result<TraversalResult<V::Output>, WalkError> {
    Walker::default().walk(root, visitor)
}

/// The traversal entry point on the node side: `root.accept(&mut visitor)`.
pub trait Accept {
    /// Walk this node with `visitor`.
    fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<TraversalResult<V::Output>, WalkError>;
}

impl<T: Node> Accept for T {
    fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<TraversalResult<V::Output>, WalkError> {
        walk(self, visitor)
    }
}

impl Accept for dyn Node {
    fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<TraversalResult<V::Output>, WalkError> {
        walk(self, visitor)
    }
}
