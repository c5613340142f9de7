// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Interleaved ("Straus") multi-exponentiation.
//!
//! Given \\( c \cdot b\_1^{e\_1} \cdots b\_n^{e\_n} \\), write every
//! exponent in the same digit system,
//! \\[
//!    e\_i = \sum\_j d\_{i,j} 2^j,
//! \\]
//! so that
//! \\[
//!    \prod\_i b\_i^{e\_i} = \prod\_j \Big( \prod\_i b\_i^{d\_{i,j}} \Big)^{2^j}.
//! \\]
//! We walk the digit positions from the top, squaring one shared accumulator
//! once per position and multiplying in \\( b\_i^{d\_{i,j}} \\) from each
//! base's table whenever a digit is nonzero.  This costs one chain of
//! squarings for the whole product instead of one per term.

use std::sync::Arc;

use num_bigint::{BigInt, Sign};
use tracing::{debug, instrument};

use super::sliding_window::sliding_window_exp;
use super::wnaf::{prepare, signed_lookup, wnaf_exp};
use super::{digits, Accumulator, Digits};
use crate::errors::Error;
use crate::exponent::{check_window_size, non_adjacent_form, radix_2w_form, sliding_window_form};
use crate::multiexp::Multiexponentiation;
use crate::traits::{check_exponent_supported, Group, GroupElement};
use crate::window::SmallExponentPrecomputation;

#[inline]
fn is_negative(exponent: &BigInt) -> bool {
    exponent.sign() == Sign::Minus
}

/// Evaluate `multiexp` by interleaved sliding windows of at most
/// `window_size` bits.
///
/// Every term's precomputation is populated with odd powers for
/// `window_size`; terms with a negative exponent also get inverse odd powers
/// (when the group's inversion cost warrants them) and are otherwise
/// inverted digit by digit.
///
/// # Errors
///
/// * [`Error::InvalidWindowSize`] unless \\( 1 \leq w \leq 16 \\).
/// * [`Error::UnsupportedCapability`] if a term has a negative exponent and
///   the group cannot invert.
#[instrument(level = "debug", skip_all, fields(terms = multiexp.len(), window_size = window_size))]
pub fn interleaving_sliding_window_multiexp<G: GroupElement>(
    multiexp: &Multiexponentiation<G>,
    window_size: usize,
) -> Result<G, Error> {
    check_window_size(window_size, 1)?;
    let group = multiexp.group();

    let mut lanes: Vec<(&SmallExponentPrecomputation<G>, bool, Digits<u32>)> =
        Vec::with_capacity(multiexp.len());
    for term in multiexp.terms() {
        let exponent = term.exponent();
        check_exponent_supported(group, exponent)?;
        let precomputation = term.precomputation().as_ref();
        precomputation.compute(window_size, false)?;
        if is_negative(exponent) {
            precomputation.compute_negative_powers(window_size)?;
        }
        let windows = digits(sliding_window_form(exponent.magnitude(), window_size)?);
        lanes.push((precomputation, is_negative(exponent), windows));
    }

    let len = lanes.iter().map(|(_, _, d)| d.len()).max().unwrap_or(0);
    let mut acc = Accumulator::new();
    for j in (0..len).rev() {
        acc.square();
        for (precomputation, negative, windows) in lanes.iter() {
            let d = match windows.get(j) {
                Some(&d) if d != 0 => d as usize,
                _ => continue,
            };
            let power = if *negative {
                precomputation.get_negative_power_or_invert(d)?
            } else {
                precomputation.get_power(d)?
            };
            acc.op(&power);
        }
    }

    Ok(acc.finish(group, multiexp.constant_factor()))
}

/// Evaluate `multiexp` by interleaved width-`window_size` NAFs.
///
/// Every term's precomputation is populated with odd powers up to
/// \\( 2^{w-1} - 1 \\) and, when the group's inversion cost warrants it,
/// their inverses.
///
/// # Errors
///
/// * [`Error::InvalidWindowSize`] unless \\( 2 \leq w \leq 16 \\).
/// * [`Error::UnsupportedCapability`] if the group cannot invert.
#[instrument(level = "debug", skip_all, fields(terms = multiexp.len(), window_size = window_size))]
pub fn interleaving_wnaf_multiexp<G: GroupElement>(
    multiexp: &Multiexponentiation<G>,
    window_size: usize,
) -> Result<G, Error> {
    check_window_size(window_size, 2)?;
    let group = multiexp.group();
    if !group.supports_inversion() {
        return Err(Error::UnsupportedCapability("inversion"));
    }

    let mut lanes: Vec<(&SmallExponentPrecomputation<G>, Digits<i32>)> = Vec::with_capacity(multiexp.len());
    for term in multiexp.terms() {
        let precomputation = term.precomputation().as_ref();
        prepare(precomputation, window_size)?;
        let naf = digits(non_adjacent_form(term.exponent(), window_size)?);
        lanes.push((precomputation, naf));
    }

    let len = lanes.iter().map(|(_, d)| d.len()).max().unwrap_or(0);
    let mut acc = Accumulator::new();
    for j in (0..len).rev() {
        acc.square();
        for (precomputation, naf) in lanes.iter() {
            match naf.get(j) {
                Some(&d) if d != 0 => acc.op(&signed_lookup(precomputation, d)?),
                _ => {}
            }
        }
    }

    Ok(acc.finish(group, multiexp.constant_factor()))
}

/// Evaluate `multiexp` by the interleaved \\( 2^w \\)-ary method.
///
/// Terms with a negative exponent are evaluated against a temporary
/// all-powers table of their inverted base.
///
/// # Errors
///
/// As for [`interleaving_sliding_window_multiexp`].
#[instrument(level = "debug", skip_all, fields(terms = multiexp.len(), window_size = window_size))]
pub fn interleaving_fixed_window_multiexp<G: GroupElement>(
    multiexp: &Multiexponentiation<G>,
    window_size: usize,
) -> Result<G, Error> {
    check_window_size(window_size, 1)?;
    let group = multiexp.group();

    let mut lanes: Vec<(Arc<SmallExponentPrecomputation<G>>, Digits<u32>)> = Vec::with_capacity(multiexp.len());
    for term in multiexp.terms() {
        let exponent = term.exponent();
        check_exponent_supported(group, exponent)?;
        let precomputation = if is_negative(exponent) {
            Arc::new(SmallExponentPrecomputation::new(term.base().inv()?))
        } else {
            term.precomputation().clone()
        };
        precomputation.compute_all_powers(window_size)?;
        let radix_digits = digits(radix_2w_form(exponent.magnitude(), window_size)?);
        lanes.push((precomputation, radix_digits));
    }

    let len = lanes.iter().map(|(_, d)| d.len()).max().unwrap_or(0);
    let mut acc = Accumulator::new();
    for j in (0..len).rev() {
        for _ in 0..window_size {
            acc.square();
        }
        for (precomputation, radix_digits) in lanes.iter() {
            match radix_digits.get(j) {
                Some(&d) if d != 0 => acc.op(&precomputation.get_any_power(d as usize)?),
                _ => {}
            }
        }
    }

    Ok(acc.finish(group, multiexp.constant_factor()))
}

/// Evaluate `multiexp` with the interleaved method suited to its group:
/// wNAF when the group can invert, sliding windows otherwise.
pub fn interleaving_multiexp<G: GroupElement>(
    multiexp: &Multiexponentiation<G>,
    window_size: usize,
) -> Result<G, Error> {
    if multiexp.group().supports_inversion() {
        interleaving_wnaf_multiexp(multiexp, window_size.max(2))
    } else {
        interleaving_sliding_window_multiexp(multiexp, window_size)
    }
}

/// Evaluate `multiexp` one term at a time, each with its own chain of
/// squarings.
///
/// Cheaper than interleaving when there is a single term, since that term
/// can then use the single-base methods directly.
#[instrument(level = "debug", skip_all, fields(terms = multiexp.len(), window_size = window_size))]
pub fn per_term_multiexp<G: GroupElement>(
    multiexp: &Multiexponentiation<G>,
    window_size: usize,
) -> Result<G, Error> {
    check_window_size(window_size, 1)?;
    let group = multiexp.group();

    let mut acc = Accumulator::new();
    if let Some(c) = multiexp.constant_factor() {
        acc.op(c);
    }
    for term in multiexp.terms() {
        let power = if group.supports_inversion() {
            wnaf_exp(term.precomputation(), term.exponent(), window_size.max(2))?
        } else {
            sliding_window_exp(term.precomputation(), term.exponent(), window_size)?
        };
        acc.op(&power);
    }
    debug!("evaluated terms separately");

    Ok(acc.finish(group, None))
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------
