// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Run-time configuration of lazy evaluation.

use crate::errors::Error;
use crate::exponent::check_window_size;

/// Window size used for exponentiations unless configured otherwise.
pub const DEFAULT_WINDOW_SIZE: usize = 4;

/// Multi-exponentiations with fewer terms than this are evaluated term by
/// term rather than interleaved.
pub const DEFAULT_INTERLEAVE_THRESHOLD: usize = 2;

/// Where [`LazyGroupElement::compute`](crate::lazy::LazyGroupElement::compute)
/// runs the evaluation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionPolicy {
    /// Evaluate on the calling thread before returning.
    #[default]
    Synchronous,
    /// Hand the evaluation to a background worker and return immediately.
    Background,
}

/// Settings shared by all elements of a
/// [`LazyGroup`](crate::lazy::LazyGroup).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LazyConfig {
    window_size: usize,
    execution_policy: ExecutionPolicy,
    interleave_threshold: usize,
}

impl Default for LazyConfig {
    fn default() -> Self {
        LazyConfig {
            window_size: DEFAULT_WINDOW_SIZE,
            execution_policy: ExecutionPolicy::Synchronous,
            interleave_threshold: DEFAULT_INTERLEAVE_THRESHOLD,
        }
    }
}

impl LazyConfig {
    /// Set the wNAF width used when evaluating multi-exponentiations.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidWindowSize`] unless \\( 2 \leq w \leq 16 \\).
    pub fn with_window_size(mut self, window_size: usize) -> Result<Self, Error> {
        check_window_size(window_size, 2)?;
        self.window_size = window_size;
        Ok(self)
    }

    pub fn with_execution_policy(mut self, execution_policy: ExecutionPolicy) -> Self {
        self.execution_policy = execution_policy;
        self
    }

    /// Set the smallest number of terms evaluated by interleaving.  Zero
    /// and one both mean "always interleave".
    pub fn with_interleave_threshold(mut self, interleave_threshold: usize) -> Self {
        self.interleave_threshold = interleave_threshold;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn execution_policy(&self) -> ExecutionPolicy {
        self.execution_policy
    }

    pub fn interleave_threshold(&self) -> usize {
        self.interleave_threshold
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = LazyConfig::default();
        assert_eq!(config.window_size(), 4);
        assert_eq!(config.execution_policy(), ExecutionPolicy::Synchronous);
        assert_eq!(config.interleave_threshold(), 2);
    }

    #[test]
    fn window_size_is_validated() {
        assert!(LazyConfig::default().with_window_size(1).is_err());
        assert!(LazyConfig::default().with_window_size(17).is_err());
        assert_eq!(LazyConfig::default().with_window_size(6).unwrap().window_size(), 6);
    }
}
