// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Traversal phases.
//!
//! Every node visit has up to three points at which a visitor may act:
//!
//! - [`Phase::Prefix`] - before descending into children
//! - [`Phase::Infix`] - between consecutive children
//! - [`Phase::Suffix`] - after all children have been walked

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RegistrationError;

/// One of the three points at which a handler runs during a node visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before the node's children are walked.
    Prefix,
    /// Between two consecutive children of the node.
    Infix,
    /// After all of the node's children have been walked.
    Suffix,
}

impl Phase {
    /// All phases, in the order they occur during a node visit.
    pub const ALL: [Phase; 3] = [Phase::Prefix, Phase::Infix, Phase::Suffix];

    /// The lowercase name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Prefix => "prefix",
            Phase::Infix => "infix",
            Phase::Suffix => "suffix",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefix" => Ok(Phase::Prefix),
            "infix" => Ok(Phase::Infix),
            "suffix" => Ok(Phase::Suffix),
            other => Err(RegistrationError::UnknownPhase {
                phase: other.to_string(),
            }),
        }
    }
}

/// Conversion into the list of phases a handler is registered for.
///
/// Registration accepts a single [`Phase`], a phase name, or a slice, array
/// or `Vec` of either. Names are validated here, so a misspelled phase fails
/// the registration instead of silently registering nothing.
pub trait IntoPhases {
    /// Resolve into concrete phases, in the order given.
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError>;
}

impl IntoPhases for Phase {
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError> {
        Ok(vec![self])
    }
}

impl IntoPhases for &str {
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError> {
        Ok(vec![self.parse()?])
    }
}

impl IntoPhases for &[Phase] {
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError> {
        Ok(self.to_vec())
    }
}

impl<const N: usize> IntoPhases for [Phase; N] {
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError> {
        Ok(self.to_vec())
    }
}

impl IntoPhases for Vec<Phase> {
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError> {
        Ok(self)
    }
}

impl IntoPhases for &[&str] {
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError> {
        self.iter().map(|name| name.parse()).collect()
    }
}

impl<const N: usize> IntoPhases for [&str; N] {
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError> {
        self.iter().map(|name| name.parse()).collect()
    }
}

impl IntoPhases for Vec<&str> {
    fn into_phases(self) -> Result<Vec<Phase>, RegistrationError> {
        self.as_slice().into_phases()
    }
}
