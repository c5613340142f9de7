// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Eagerly evaluated group elements with a cache of small powers.

use core::fmt;
use std::sync::{Arc, OnceLock};

use num_bigint::BigInt;

use crate::config::DEFAULT_WINDOW_SIZE;
use crate::errors::Error;
use crate::scalar_mul::{sliding_window::sliding_window_exp, wnaf::wnaf_exp};
use crate::traits::{check_same_group, Group, GroupElement};
use crate::window::SmallExponentPrecomputation;

/// Window used by [`BasicGroupElement::precompute_pow`] when none is given.
pub const DEFAULT_PRECOMPUTE_WINDOW_SIZE: usize = 8;

/// A group element whose operations are evaluated immediately.
///
/// The only state beyond the value is a lazily created
/// [`SmallExponentPrecomputation`], so repeated [`pow`](Self::pow) calls on
/// the same element reuse its tables.  Clones share that cache.
#[derive(Clone)]
pub struct BasicGroupElement<G: GroupElement> {
    value: G,
    precomputation: Arc<OnceLock<Arc<SmallExponentPrecomputation<G>>>>,
}

impl<G: GroupElement> BasicGroupElement<G> {
    pub fn new(value: G) -> Self {
        BasicGroupElement {
            value,
            precomputation: Arc::new(OnceLock::new()),
        }
    }

    pub fn value(&self) -> &G {
        &self.value
    }

    pub fn into_value(self) -> G {
        self.value
    }

    pub fn group(&self) -> &G::Group {
        self.value.group()
    }

    /// The cache of small powers of this element, created on first use.
    pub fn precomputation(&self) -> &Arc<SmallExponentPrecomputation<G>> {
        self.precomputation
            .get_or_init(|| Arc::new(SmallExponentPrecomputation::new(self.value.clone())))
    }

    pub fn op(&self, other: &Self) -> Result<Self, Error> {
        check_same_group(&self.value, &other.value)?;
        Ok(Self::new(self.value.op(&other.value)))
    }

    pub fn inv(&self) -> Result<Self, Error> {
        self.value.inv().map(Self::new)
    }

    pub fn square(&self) -> Self {
        Self::new(self.value.square())
    }

    /// Raise to `exponent` with a width-4 NAF, or sliding windows if the
    /// group cannot invert.
    pub fn pow(&self, exponent: &BigInt) -> Result<Self, Error> {
        let precomputation = self.precomputation();
        let value = if self.group().supports_inversion() {
            wnaf_exp(precomputation, exponent, DEFAULT_WINDOW_SIZE)?
        } else {
            sliding_window_exp(precomputation, exponent, DEFAULT_WINDOW_SIZE)?
        };
        Ok(Self::new(value))
    }

    /// Fill this element's power tables for `window_size`, including the
    /// inverse table when inversion is costly.
    pub fn precompute_pow(&self, window_size: usize) -> Result<&Self, Error> {
        let precomputation = self.precomputation();
        precomputation.compute(window_size, false)?;
        precomputation.compute_negative_powers(window_size)?;
        Ok(self)
    }

    /// [`precompute_pow`](Self::precompute_pow) with
    /// [`DEFAULT_PRECOMPUTE_WINDOW_SIZE`].
    pub fn precompute_pow_default(&self) -> Result<&Self, Error> {
        self.precompute_pow(DEFAULT_PRECOMPUTE_WINDOW_SIZE)
    }

    pub fn is_neutral_element(&self) -> bool {
        self.value.is_neutral_element()
    }
}

impl<G: GroupElement> From<G> for BasicGroupElement<G> {
    fn from(value: G) -> Self {
        BasicGroupElement::new(value)
    }
}

impl<G: GroupElement> PartialEq for BasicGroupElement<G> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<G: GroupElement> fmt::Debug for BasicGroupElement<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BasicGroupElement({:?})", self.value)
    }
}
