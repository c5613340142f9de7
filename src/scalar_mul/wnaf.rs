// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Single-base exponentiation using a width-\\(w\\) NAF.

use num_bigint::BigInt;
use tracing::instrument;

use super::{digits, Accumulator};
use crate::errors::Error;
use crate::exponent::non_adjacent_form;
use crate::traits::{Group, GroupElement};
use crate::window::SmallExponentPrecomputation;

/// Look up \\( g^d \\) for a nonzero signed odd digit `d`.
#[inline]
pub(crate) fn signed_lookup<G: GroupElement>(
    precomputation: &SmallExponentPrecomputation<G>,
    digit: i32,
) -> Result<G, Error> {
    if digit > 0 {
        precomputation.get_power(digit as usize)
    } else {
        precomputation.get_negative_power_or_invert(digit.unsigned_abs() as usize)
    }
}

/// Prepare `precomputation` for width-`window_size` NAF digits: odd powers up
/// to \\( 2^{w-1} - 1 \\) and, if inversion is costly, their inverses.
pub(crate) fn prepare<G: GroupElement>(
    precomputation: &SmallExponentPrecomputation<G>,
    window_size: usize,
) -> Result<(), Error> {
    precomputation.compute(window_size - 1, false)?;
    precomputation.compute_negative_powers(window_size - 1)
}

/// Compute \\( g^e \\) from the width-`window_size` NAF of \\( e \\), where
/// \\( g \\) is the base of `precomputation`.
///
/// Positive digits read \\( g^d \\) from the odd-power table.  Negative digits
/// read \\( g^{-|d|} \\) from the inverse table when the group's inversion
/// cost justified building one, and invert \\( g^{|d|} \\) on the fly
/// otherwise.  The sign of \\( e \\) is carried by the digits, so no final
/// inversion is needed.
///
/// # Errors
///
/// * [`Error::InvalidWindowSize`] unless \\( 2 \leq w \leq 16 \\).
/// * [`Error::UnsupportedCapability`] if the group cannot invert.  Signed
///   digits need inverses even for positive exponents; use
///   [`sliding_window_exp`](super::sliding_window::sliding_window_exp) for
///   such groups.
#[instrument(level = "trace", skip_all, fields(window_size = window_size, bits = exponent.bits()))]
pub fn wnaf_exp<G: GroupElement>(
    precomputation: &SmallExponentPrecomputation<G>,
    exponent: &BigInt,
    window_size: usize,
) -> Result<G, Error> {
    let group = precomputation.base().group();
    if !group.supports_inversion() {
        return Err(Error::UnsupportedCapability("inversion"));
    }

    let naf = digits(non_adjacent_form(exponent, window_size)?);
    prepare(precomputation, window_size)?;

    let mut acc = Accumulator::new();
    for d in naf.iter().rev() {
        acc.square();
        if *d != 0 {
            acc.op(&signed_lookup(precomputation, *d)?);
        }
    }

    Ok(acc.finish(group, None))
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::zn::ZnGroup;

    #[test]
    fn wnaf_matches_pow() {
        let g = ZnGroup::new(1_000_000_007u32).unwrap().element(3u32).unwrap();
        let pre = SmallExponentPrecomputation::new(g.clone());
        for w in 2..=7 {
            for e in [-987_654_321i64, -8, -7, -1, 0, 1, 7, 8, 1023, 1024, 1 << 50] {
                let e = BigInt::from(e);
                assert_eq!(wnaf_exp(&pre, &e, w).unwrap(), g.pow(&e).unwrap());
            }
        }
    }

    #[test]
    fn wnaf_rejects_width_one() {
        let g = ZnGroup::new(11u32).unwrap().element(2u32).unwrap();
        let pre = SmallExponentPrecomputation::new(g);
        assert!(matches!(
            wnaf_exp(&pre, &BigInt::from(3), 1),
            Err(Error::InvalidWindowSize { window_size: 1, .. })
        ));
    }
}
