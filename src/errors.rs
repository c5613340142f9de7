// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Errors which may occur while building or evaluating group computations.
//!
//! Every error is fail-fast: an operation which returns an `Error` has not
//! produced (and will not produce) a partial result, and retrying the same
//! call with the same inputs yields the same error.

use thiserror::Error;

/// Errors which may arise from misuse of the exponentiation engine or of the
/// lazy evaluation layer.
///
/// This error may arise due to:
///
/// * Asking a group for an operation it does not provide, such as inverting
///   an element of a group without efficient inversion.
///
/// * Combining or comparing elements which belong to different group
///   instances.  This is detected by comparing the owning groups, never by
///   running the operation and producing a wrong answer.
///
/// * Handing an out-of-domain exponent or window size to one of the
///   exponentiation algorithms.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The underlying group does not support the named capability.
    #[error("the group does not support {0}")]
    UnsupportedCapability(&'static str),
    /// The operands belong to different group instances.
    #[error("cannot combine elements of different group instances")]
    InconsistentStructure,
    /// The exponent is malformed or outside the domain of the operation.
    #[error("invalid exponent: {reason}")]
    InvalidExponent { reason: &'static str },
    /// The requested window size is outside of the supported range.
    #[error("window size {window_size} is outside of {min}..={max}")]
    InvalidWindowSize {
        window_size: usize,
        min: usize,
        max: usize,
    },
    /// The modulus handed to a residue group is too small to define a group.
    #[error("modulus must be at least 2")]
    InvalidModulus,
}
