// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Implementations of various exponentiation algorithms.
//!
//! Every algorithm here is generic over [`GroupElement`] and computes the
//! same value as [`binary::square_and_multiply`]; they differ only in how
//! many group operations, squarings and inversions they spend.  The
//! single-base methods read their small powers from a
//! [`SmallExponentPrecomputation`](crate::window::SmallExponentPrecomputation),
//! and the interleaved (Straus) methods in [`straus`] share one chain of
//! squarings between all terms of a
//! [`Multiexponentiation`](crate::multiexp::Multiexponentiation).

use crate::traits::{Group, GroupElement};

pub mod binary;

pub mod sliding_window;

pub mod wnaf;

pub mod straus;

cfg_if::cfg_if! {
    if #[cfg(feature = "zeroize")] {
        /// Recoded exponent digits, wiped when dropped.
        pub(crate) type Digits<T> = zeroize::Zeroizing<Vec<T>>;

        #[inline]
        pub(crate) fn digits<T: zeroize::Zeroize>(v: Vec<T>) -> Digits<T> {
            zeroize::Zeroizing::new(v)
        }
    } else {
        /// Recoded exponent digits.
        pub(crate) type Digits<T> = Vec<T>;

        #[inline]
        pub(crate) fn digits<T>(v: Vec<T>) -> Digits<T> {
            v
        }
    }
}

/// A left-to-right accumulator that skips squarings while it still holds
/// the neutral element.
///
/// Leading zero digits therefore cost nothing, and evaluating an exponent of
/// zero performs no operation at all.
pub(crate) struct Accumulator<G> {
    value: Option<G>,
}

impl<G: GroupElement> Accumulator<G> {
    pub(crate) fn new() -> Self {
        Accumulator { value: None }
    }

    #[inline]
    pub(crate) fn square(&mut self) {
        if let Some(v) = self.value.as_mut() {
            *v = v.square();
        }
    }

    #[inline]
    pub(crate) fn op(&mut self, x: &G) {
        self.value = Some(match self.value.take() {
            Some(v) => v.op(x),
            None => x.clone(),
        });
    }

    /// Returns the accumulated product, multiplied onto `constant_factor` if
    /// one is given.
    pub(crate) fn finish(self, group: &G::Group, constant_factor: Option<&G>) -> G {
        match (constant_factor, self.value) {
            (Some(c), Some(v)) => c.op(&v),
            (Some(c), None) => c.clone(),
            (None, Some(v)) => v,
            (None, None) => group.neutral_element(),
        }
    }
}
