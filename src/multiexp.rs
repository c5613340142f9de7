// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Descriptions of multi-exponentiations
//! \\( c \cdot b\_1^{e\_1} \cdots b\_n^{e\_n} \\).

use core::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::Zero;

use crate::errors::Error;
use crate::traits::{Group, GroupElement};
use crate::window::SmallExponentPrecomputation;

/// A single factor \\( b^e \\) of a multi-exponentiation.
///
/// The term refers to its base through the base's
/// [`SmallExponentPrecomputation`], so tables computed while evaluating one
/// multi-exponentiation are reused by every later one sharing the same
/// precomputation.
#[derive(Clone)]
pub struct MultiExpTerm<G: GroupElement> {
    precomputation: Arc<SmallExponentPrecomputation<G>>,
    exponent: BigInt,
}

impl<G: GroupElement> MultiExpTerm<G> {
    /// Create the term `base^exponent` with a fresh precomputation.
    pub fn new(base: G, exponent: BigInt) -> Self {
        MultiExpTerm {
            precomputation: Arc::new(SmallExponentPrecomputation::new(base)),
            exponent,
        }
    }

    /// Create a term whose base is the base of `precomputation`.
    pub fn with_precomputation(precomputation: Arc<SmallExponentPrecomputation<G>>, exponent: BigInt) -> Self {
        MultiExpTerm {
            precomputation,
            exponent,
        }
    }

    pub fn base(&self) -> &G {
        self.precomputation.base()
    }

    pub fn exponent(&self) -> &BigInt {
        &self.exponent
    }

    pub fn precomputation(&self) -> &Arc<SmallExponentPrecomputation<G>> {
        &self.precomputation
    }
}

impl<G: GroupElement> fmt::Debug for MultiExpTerm<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiExpTerm({:?}^{})", self.base(), self.exponent)
    }
}

/// A product of powers \\( b\_i^{e\_i} \\) with an optional constant factor
/// \\( c \\).
///
/// Terms are kept in insertion order and bases are unique: putting a term
/// whose base is already present adds the exponents.
///
/// The value of a `Multiexponentiation` is
/// \\[
/// c \cdot b\_1^{e\_1} \cdots b\_n^{e\_n},
/// \\]
/// computed naively by [`Multiexponentiation::evaluate`] and efficiently by
/// the interleaved algorithms in [`crate::scalar_mul::straus`]; all of them
/// agree.
#[derive(Clone)]
pub struct Multiexponentiation<G: GroupElement> {
    group: G::Group,
    terms: Vec<MultiExpTerm<G>>,
    constant_factor: Option<G>,
}

impl<G: GroupElement> Multiexponentiation<G> {
    /// Create the empty product over `group`.
    pub fn new(group: G::Group) -> Self {
        Multiexponentiation {
            group,
            terms: Vec::new(),
            constant_factor: None,
        }
    }

    pub fn group(&self) -> &G::Group {
        &self.group
    }

    /// Add a term, merging it into an existing term with an equal base.
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentStructure`] if the base belongs to another group.
    pub fn put(&mut self, term: MultiExpTerm<G>) -> Result<(), Error> {
        if term.base().group() != &self.group {
            return Err(Error::InconsistentStructure);
        }
        match self.terms.iter_mut().find(|t| t.base() == term.base()) {
            Some(existing) => existing.exponent += term.exponent,
            None => self.terms.push(term),
        }
        Ok(())
    }

    /// Multiply `factor` into the constant factor.
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentStructure`] if `factor` belongs to another group.
    pub fn multiply_constant(&mut self, factor: &G) -> Result<(), Error> {
        if factor.group() != &self.group {
            return Err(Error::InconsistentStructure);
        }
        self.constant_factor = Some(match self.constant_factor.take() {
            Some(c) => c.op(factor),
            None => factor.clone(),
        });
        Ok(())
    }

    /// The terms, in insertion order.
    pub fn terms(&self) -> &[MultiExpTerm<G>] {
        &self.terms
    }

    pub fn constant_factor(&self) -> Option<&G> {
        self.constant_factor.as_ref()
    }

    /// Number of terms, not counting the constant factor.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Bit length of the largest exponent magnitude.
    pub fn max_exponent_bits(&self) -> u64 {
        self.terms.iter().map(|t| t.exponent.bits()).max().unwrap_or(0)
    }

    /// Evaluate by the left fold \\( c \cdot b\_1^{e\_1} \cdots b\_n^{e\_n} \\)
    /// using each base's own [`GroupElement::pow`].
    pub fn evaluate(&self) -> Result<G, Error> {
        let mut result = match &self.constant_factor {
            Some(c) => c.clone(),
            None => self.group.neutral_element(),
        };
        for term in &self.terms {
            if term.exponent.is_zero() {
                continue;
            }
            result = result.op(&term.base().pow(&term.exponent)?);
        }
        Ok(result)
    }
}

impl<G: GroupElement> fmt::Debug for Multiexponentiation<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multiexponentiation")
            .field("terms", &self.terms)
            .field("constant_factor", &self.constant_factor)
            .finish()
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------
