// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Module for the group capability traits.
//!
//! The engine is generic over these two traits only.  A concrete group
//! (elliptic curve, residue ring, pairing target group, ...) provides an
//! implementation of [`Group`] for the structure and of [`GroupElement`] for
//! its values, and in exchange gets windowed exponentiation, interleaved
//! multi-exponentiation and lazy evaluation.

use core::fmt::Debug;

use num_bigint::BigInt;
use rand_core::{CryptoRng, RngCore};

use crate::errors::Error;
use crate::scalar_mul::binary;

// ------------------------------------------------------------------------
// Public Traits
// ------------------------------------------------------------------------

/// The structure owning a set of [`GroupElement`]s.
///
/// Two groups comparing equal means their elements may be combined.
pub trait Group: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// The element type of this group.
    type Element: GroupElement<Group = Self>;

    /// Returns the neutral element of the group.
    fn neutral_element(&self) -> Self::Element;

    /// Whether elements of this group can be inverted.
    ///
    /// When this is `false`, [`GroupElement::inv`] returns
    /// [`Error::UnsupportedCapability`] and negative exponents are rejected.
    fn supports_inversion(&self) -> bool {
        true
    }

    /// Estimated cost of one inversion, measured in group operations.
    ///
    /// Used to decide whether tables of inverse powers are worth computing.
    fn inversion_cost(&self) -> f64 {
        1.0
    }

    /// Samples a uniformly random element.
    fn random_element<R: RngCore + CryptoRng + ?Sized>(
        &self,
        _rng: &mut R,
    ) -> Result<Self::Element, Error> {
        Err(Error::UnsupportedCapability("uniform sampling"))
    }
}

/// The capability a concrete group element exposes to the engine.
///
/// Elements are immutable values: every operation returns a new element.
pub trait GroupElement: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// The group this element belongs to.
    type Group: Group<Element = Self>;

    /// Returns the group owning this element.
    fn group(&self) -> &Self::Group;

    /// Applies the group operation.  Callers guarantee both operands belong
    /// to the same group.
    fn op(&self, other: &Self) -> Self;

    /// Returns the inverse of this element.
    fn inv(&self) -> Result<Self, Error> {
        Err(Error::UnsupportedCapability("inversion"))
    }

    /// Returns `self.op(self)`; groups with a faster doubling override this.
    fn square(&self) -> Self {
        self.op(self)
    }

    /// Raises this element to `exponent`.
    ///
    /// The default is plain square-and-multiply, which also serves as the
    /// correctness oracle for the windowed algorithms.
    fn pow(&self, exponent: &BigInt) -> Result<Self, Error> {
        binary::square_and_multiply(self, exponent)
    }

    /// Return true if this element is the neutral element of its group.
    fn is_neutral_element(&self) -> bool {
        *self == self.group().neutral_element()
    }
}

// ------------------------------------------------------------------------
// Helpers
// ------------------------------------------------------------------------

/// Fails with [`Error::InconsistentStructure`] unless `a` and `b` belong to
/// the same group.
pub(crate) fn check_same_group<G: GroupElement>(a: &G, b: &G) -> Result<(), Error> {
    if a.group() == b.group() {
        Ok(())
    } else {
        Err(Error::InconsistentStructure)
    }
}

/// Fails with [`Error::UnsupportedCapability`] if `exponent` is negative and
/// `group` cannot invert.
pub(crate) fn check_exponent_supported<S: Group>(group: &S, exponent: &BigInt) -> Result<(), Error> {
    if exponent.sign() == num_bigint::Sign::Minus && !group.supports_inversion() {
        Err(Error::UnsupportedCapability("inversion"))
    } else {
        Ok(())
    }
}
