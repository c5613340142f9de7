// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Single-base sliding-window and fixed-window (\\( 2^w \\)-ary)
//! exponentiation.
//!
//! Both methods only ever multiply by powers of the base itself, so they
//! need no inversion for non-negative exponents.  A negative exponent is
//! handled by computing \\( g^{|e|} \\) and inverting once at the end.

use num_bigint::{BigInt, Sign};
use tracing::instrument;

use super::{digits, Accumulator};
use crate::errors::Error;
use crate::exponent::{radix_2w_form, sliding_window_form};
use crate::traits::{check_exponent_supported, GroupElement};
use crate::window::SmallExponentPrecomputation;

fn finish_signed<G: GroupElement>(result: G, exponent: &BigInt) -> Result<G, Error> {
    match exponent.sign() {
        Sign::Minus => result.inv(),
        _ => Ok(result),
    }
}

/// Compute \\( g^e \\) with odd windows of at most `window_size` bits,
/// where \\( g \\) is the base of `precomputation`.
///
/// Makes sure the odd-power table covers `window_size`, then scans the
/// exponent from the top: every bit costs one squaring, and every window one
/// table lookup and one operation.
///
/// # Errors
///
/// * [`Error::InvalidWindowSize`] unless \\( 1 \leq w \leq 16 \\).
/// * [`Error::UnsupportedCapability`] for a negative exponent in a group
///   without inversion.
#[instrument(level = "trace", skip_all, fields(window_size = window_size, bits = exponent.bits()))]
pub fn sliding_window_exp<G: GroupElement>(
    precomputation: &SmallExponentPrecomputation<G>,
    exponent: &BigInt,
    window_size: usize,
) -> Result<G, Error> {
    let group = precomputation.base().group();
    check_exponent_supported(group, exponent)?;

    let windows = digits(sliding_window_form(exponent.magnitude(), window_size)?);
    precomputation.compute(window_size, false)?;

    let mut acc = Accumulator::new();
    for d in windows.iter().rev() {
        acc.square();
        if *d != 0 {
            acc.op(&precomputation.get_power(*d as usize)?);
        }
    }

    finish_signed(acc.finish(group, None), exponent)
}

/// Compute \\( g^e \\) by the \\( 2^w \\)-ary method: \\( w \\) squarings per
/// radix-\\( 2^w \\) digit, then one operation with \\( g^{d} \\) from the
/// all-powers table for every nonzero digit.
///
/// # Errors
///
/// As for [`sliding_window_exp`].
#[instrument(level = "trace", skip_all, fields(window_size = window_size, bits = exponent.bits()))]
pub fn fixed_window_exp<G: GroupElement>(
    precomputation: &SmallExponentPrecomputation<G>,
    exponent: &BigInt,
    window_size: usize,
) -> Result<G, Error> {
    let group = precomputation.base().group();
    check_exponent_supported(group, exponent)?;

    let radix_digits = digits(radix_2w_form(exponent.magnitude(), window_size)?);
    precomputation.compute_all_powers(window_size)?;

    let mut acc = Accumulator::new();
    for d in radix_digits.iter().rev() {
        for _ in 0..window_size {
            acc.square();
        }
        if *d != 0 {
            acc.op(&precomputation.get_any_power(*d as usize)?);
        }
    }

    finish_signed(acc.finish(group, None), exponent)
}
