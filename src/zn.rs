// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! The multiplicative group \\( \mathbb{Z}\_n^\* \\) of units modulo \\( n \\).
//!
//! This is a small reference implementation of the [`Group`] and
//! [`GroupElement`] capability.  It makes no attempt to be fast or
//! constant-time; it exists so the exponentiation engine has a concrete
//! group to run against.

use core::fmt;
use std::sync::Arc;

use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::One;
use rand_core::{CryptoRng, RngCore};

#[cfg(feature = "serde")]
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::Error;
use crate::traits::{Group, GroupElement};

/// Estimated cost of an inversion (extended Euclid) in modular
/// multiplications.
const INVERSION_COST: f64 = 4.0;

/// The group of units modulo `n`.
///
/// Cloning is cheap: the modulus is shared.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ZnGroup {
    modulus: Arc<BigUint>,
}

impl ZnGroup {
    /// Create the unit group modulo `modulus`, which must be at least 2.
    pub fn new(modulus: impl Into<BigUint>) -> Result<ZnGroup, Error> {
        let modulus = modulus.into();
        if modulus < BigUint::from(2u8) {
            return Err(Error::InvalidModulus);
        }
        Ok(ZnGroup {
            modulus: Arc::new(modulus),
        })
    }

    /// The modulus `n`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Return the residue of `value` as a group element, or `None` if it is
    /// not a unit modulo `n`.
    pub fn element(&self, value: impl Into<BigUint>) -> Option<ZnElement> {
        let value = value.into() % self.modulus.as_ref();
        if !value.gcd(&self.modulus).is_one() {
            return None;
        }
        Some(ZnElement {
            group: self.clone(),
            value,
        })
    }
}

impl fmt::Debug for ZnGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZnGroup(n = {})", self.modulus)
    }
}

impl Group for ZnGroup {
    type Element = ZnElement;

    fn neutral_element(&self) -> ZnElement {
        ZnElement {
            group: self.clone(),
            value: BigUint::one(),
        }
    }

    fn inversion_cost(&self) -> f64 {
        INVERSION_COST
    }

    fn random_element<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R) -> Result<ZnElement, Error> {
        loop {
            let value = rng.gen_biguint_below(&self.modulus);
            if let Some(elem) = self.element(value) {
                return Ok(elem);
            }
        }
    }
}

/// A unit modulo `n`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ZnElement {
    group: ZnGroup,
    value: BigUint,
}

impl ZnElement {
    /// The canonical representative in `[1, n)`.
    pub fn value(&self) -> &BigUint {
        &self.value
    }
}

impl fmt::Debug for ZnElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZnElement({} mod {})", self.value, self.group.modulus)
    }
}

impl fmt::Display for ZnElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl GroupElement for ZnElement {
    type Group = ZnGroup;

    fn group(&self) -> &ZnGroup {
        &self.group
    }

    fn op(&self, other: &ZnElement) -> ZnElement {
        ZnElement {
            group: self.group.clone(),
            value: (&self.value * &other.value) % self.group.modulus.as_ref(),
        }
    }

    fn inv(&self) -> Result<ZnElement, Error> {
        // Every element is a unit, so the inverse always exists.
        let value = self
            .value
            .modinv(&self.group.modulus)
            .ok_or(Error::UnsupportedCapability("inversion of non-units"))?;
        Ok(ZnElement {
            group: self.group.clone(),
            value,
        })
    }

    fn square(&self) -> ZnElement {
        ZnElement {
            group: self.group.clone(),
            value: (&self.value * &self.value) % self.group.modulus.as_ref(),
        }
    }

    fn pow(&self, exponent: &BigInt) -> Result<ZnElement, Error> {
        let base = match exponent.sign() {
            Sign::Minus => self.inv()?,
            _ => self.clone(),
        };
        Ok(ZnElement {
            group: self.group.clone(),
            value: base.value.modpow(exponent.magnitude(), &self.group.modulus),
        })
    }

    fn is_neutral_element(&self) -> bool {
        self.value.is_one()
    }
}

// ------------------------------------------------------------------------
// Serde support
// ------------------------------------------------------------------------

#[cfg(feature = "serde")]
impl Serialize for ZnGroup {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.modulus.as_ref().serialize(serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for ZnGroup {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let modulus = BigUint::deserialize(deserializer)?;
        ZnGroup::new(modulus).map_err(D::Error::custom)
    }
}

/// Elements serialize as their representative only; restoring one requires
/// the group, via [`ZnGroup::element`].
#[cfg(feature = "serde")]
impl Serialize for ZnElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(serializer)
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------
