// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Power products \\( b\_1^{e\_1} \cdots b\_n^{e\_n} \\) over bases known in
//! advance.
//!
//! A [`FixedBasePowProduct`] builds the small-power tables of its bases once,
//! at construction, and reuses them for every set of exponents it is
//! evaluated at.

use std::sync::Arc;

use num_bigint::BigInt;
use tracing::debug;

use crate::errors::Error;
use crate::exponent::check_window_size;
use crate::multiexp::{MultiExpTerm, Multiexponentiation};
use crate::scalar_mul::straus;
use crate::traits::{Group, GroupElement};
use crate::window::SmallExponentPrecomputation;

/// A product of powers of fixed bases, evaluated at varying exponents.
#[derive(Clone, Debug)]
pub struct FixedBasePowProduct<G: GroupElement> {
    group: G::Group,
    precomputations: Vec<Arc<SmallExponentPrecomputation<G>>>,
    window_size: usize,
}

impl<G: GroupElement> FixedBasePowProduct<G> {
    /// Precompute tables of width `window_size` for every base.
    ///
    /// # Errors
    ///
    /// * [`Error::InconsistentStructure`] if a base is not in `group`.
    /// * [`Error::InvalidWindowSize`] unless \\( 2 \leq w \leq 16 \\).
    pub fn new(group: G::Group, bases: Vec<G>, window_size: usize) -> Result<Self, Error> {
        check_window_size(window_size, 2)?;
        if bases.iter().any(|b| b.group() != &group) {
            return Err(Error::InconsistentStructure);
        }

        let precomputations: Vec<_> = bases
            .into_iter()
            .map(|b| Arc::new(SmallExponentPrecomputation::new(b)))
            .collect();
        for p in &precomputations {
            if group.supports_inversion() {
                p.compute(window_size - 1, false)?;
                p.compute_negative_powers(window_size - 1)?;
            } else {
                p.compute(window_size, false)?;
            }
        }
        debug!(bases = precomputations.len(), window_size, "precomputed fixed bases");

        Ok(FixedBasePowProduct {
            group,
            precomputations,
            window_size,
        })
    }

    pub fn len(&self) -> usize {
        self.precomputations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precomputations.is_empty()
    }

    pub fn group(&self) -> &G::Group {
        &self.group
    }

    /// The `index`-th base.
    pub fn base(&self, index: usize) -> Option<&G> {
        self.precomputations.get(index).map(|p| p.base())
    }

    fn multiexp(&self, exponents: &[BigInt]) -> Result<Multiexponentiation<G>, Error> {
        if exponents.len() != self.precomputations.len() {
            return Err(Error::InvalidExponent {
                reason: "exponent count does not match base count",
            });
        }
        let mut multiexp = Multiexponentiation::new(self.group.clone());
        for (p, e) in self.precomputations.iter().zip(exponents) {
            multiexp.put(MultiExpTerm::with_precomputation(p.clone(), e.clone()))?;
        }
        Ok(multiexp)
    }

    /// Compute \\( \prod\_i b\_i^{e\_i} \\) with one interleaved pass.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidExponent`] if `exponents` has the wrong length, and
    /// [`Error::UnsupportedCapability`] for negative exponents in a group
    /// without inversion.
    pub fn evaluate(&self, exponents: &[BigInt]) -> Result<G, Error> {
        let multiexp = self.multiexp(exponents)?;
        straus::interleaving_multiexp(&multiexp, self.window_size)
    }

    /// Compute \\( \prod\_i b\_i^{e\_i} \\) one base at a time.
    pub fn evaluate_per_term(&self, exponents: &[BigInt]) -> Result<G, Error> {
        let multiexp = self.multiexp(exponents)?;
        straus::per_term_multiexp(&multiexp, self.window_size)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::zn::ZnGroup;

    #[test]
    fn evaluate_matches_naive() {
        let group = ZnGroup::new(1_000_003u32).unwrap();
        let bases: Vec<_> = [2u32, 3, 5, 7].iter().map(|b| group.element(*b).unwrap()).collect();
        let product = FixedBasePowProduct::new(group.clone(), bases.clone(), 4).unwrap();
        assert_eq!(product.len(), 4);

        for shift in 0..5i64 {
            let exponents: Vec<BigInt> = [11i64, -4, 0, 123_456].iter().map(|e| BigInt::from(e * (shift + 1))).collect();
            let naive = bases
                .iter()
                .zip(&exponents)
                .fold(group.neutral_element(), |acc, (b, e)| acc.op(&b.pow(e).unwrap()));
            assert_eq!(product.evaluate(&exponents).unwrap(), naive);
            assert_eq!(product.evaluate_per_term(&exponents).unwrap(), naive);
        }
    }

    #[test]
    fn wrong_exponent_count_is_rejected() {
        let group = ZnGroup::new(101u32).unwrap();
        let product = FixedBasePowProduct::new(group.clone(), vec![group.element(2u32).unwrap()], 3).unwrap();
        assert!(matches!(product.evaluate(&[]), Err(Error::InvalidExponent { .. })));
    }
}
