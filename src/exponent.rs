// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Recodings of arbitrary-precision exponents into window digits.
//!
//! All digit vectors are little-endian: `digits[i]` is the coefficient of
//! \\( 2^i \\) (or of \\( 2^{wi} \\) for the radix-\\( 2^w \\) form).

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::Zero;

use crate::errors::Error;

/// Largest supported window size.  A table for this window holds
/// \\( 2^{15} \\) odd powers.
pub const MAX_WINDOW_SIZE: usize = 16;

/// Fails with [`Error::InvalidWindowSize`] unless `min <= w <= MAX_WINDOW_SIZE`.
pub(crate) fn check_window_size(w: usize, min: usize) -> Result<(), Error> {
    if w < min || w > MAX_WINDOW_SIZE {
        return Err(Error::InvalidWindowSize {
            window_size: w,
            min,
            max: MAX_WINDOW_SIZE,
        });
    }
    Ok(())
}

/// The low 64 bits of `k`.
#[inline]
fn low_u64(k: &BigUint) -> u64 {
    k.iter_u64_digits().next().unwrap_or(0)
}

/// Compute a width-\\(w\\) "Non-Adjacent Form" of `exponent`.
///
/// The result is a vector of signed odd digits \\( d\_i \\) with
/// \\( |d\_i| \leq 2^{w-1} - 1 \\) such that
/// \\[
/// e = \sum\_i d\_i 2^i,
/// \\]
/// and any two nonzero digits are at least \\( w \\) positions apart.  The
/// vector is at most one digit longer than the bit length of \\( |e| \\) and
/// is empty for \\( e = 0 \\).  For negative \\( e \\) every digit is
/// negated.
///
/// # Errors
///
/// [`Error::InvalidWindowSize`] unless \\( 2 \leq w \leq 16 \\).
pub fn non_adjacent_form(exponent: &BigInt, w: usize) -> Result<Vec<i32>, Error> {
    check_window_size(w, 2)?;

    let width = 1u64 << w;
    let half = width / 2;
    let mask = width - 1;

    let mut k: BigUint = exponent.magnitude().clone();
    let mut naf = Vec::with_capacity(k.bits() as usize + 1);

    while !k.is_zero() {
        if k.is_odd() {
            let low = low_u64(&k) & mask;
            if low < half {
                k -= low;
                naf.push(low as i32);
            } else {
                // Take the negative representative and carry upwards.
                let carry = width - low;
                k += carry;
                naf.push(-(carry as i32));
            }
        } else {
            naf.push(0);
        }
        k >>= 1u32;
    }

    if exponent.sign() == Sign::Minus {
        for digit in naf.iter_mut() {
            *digit = -*digit;
        }
    }

    Ok(naf)
}

/// Split `exponent` into left-to-right sliding windows of at most `w` bits.
///
/// Every window starts and ends with a set bit, so its value is odd and less
/// than \\( 2^w \\).  A window covering bits \\( j..=i \\) is stored at
/// `digits[j]`; all other digits are zero, and
/// \\( e = \sum\_j \mathrm{digits}[j] \cdot 2^j \\).
///
/// # Errors
///
/// [`Error::InvalidWindowSize`] unless \\( 1 \leq w \leq 16 \\).
pub fn sliding_window_form(exponent: &BigUint, w: usize) -> Result<Vec<u32>, Error> {
    check_window_size(w, 1)?;

    let nbits = exponent.bits() as usize;
    let mut digits = vec![0u32; nbits];

    // `i` is one past the highest bit still to be consumed.
    let mut i = nbits;
    while i > 0 {
        let top = i - 1;
        if !exponent.bit(top as u64) {
            i = top;
            continue;
        }
        // The longest window ending at `top` whose lowest bit is set.
        let mut low = (top + 1).saturating_sub(w);
        while !exponent.bit(low as u64) {
            low += 1;
        }
        let mut value = 0u32;
        for j in (low..=top).rev() {
            value = (value << 1) | exponent.bit(j as u64) as u32;
        }
        digits[low] = value;
        i = low;
    }

    Ok(digits)
}

/// Write `exponent` in radix \\( 2^w \\) with digits in \\( [0, 2^w) \\).
///
/// # Errors
///
/// [`Error::InvalidWindowSize`] unless \\( 1 \leq w \leq 16 \\).
pub fn radix_2w_form(exponent: &BigUint, w: usize) -> Result<Vec<u32>, Error> {
    check_window_size(w, 1)?;

    let nbits = exponent.bits() as usize;
    let ndigits = (nbits + w - 1) / w;
    let mut digits = Vec::with_capacity(ndigits);
    for j in 0..ndigits {
        let mut value = 0u32;
        for b in (0..w).rev() {
            let bit = (j * w + b) as u64;
            value = (value << 1) | exponent.bit(bit) as u32;
        }
        digits.push(value);
    }

    Ok(digits)
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    use num_traits::One;

    fn reconstruct_signed(digits: &[i32]) -> BigInt {
        digits
            .iter()
            .rev()
            .fold(BigInt::zero(), |acc, d| (acc << 1u32) + BigInt::from(*d))
    }

    fn reconstruct_windows(digits: &[u32], shift: usize) -> BigUint {
        digits
            .iter()
            .rev()
            .fold(BigUint::zero(), |acc, d| (acc << shift) + BigUint::from(*d))
    }

    #[test]
    fn naf_of_zero_is_empty() {
        assert!(non_adjacent_form(&BigInt::zero(), 4).unwrap().is_empty());
    }

    #[test]
    fn naf_known_value() {
        // 7 = 8 - 1 in width-2 NAF.
        assert_eq!(non_adjacent_form(&BigInt::from(7), 2).unwrap(), vec![-1, 0, 0, 1]);
        // 7 fits in a single width-4 digit.
        assert_eq!(non_adjacent_form(&BigInt::from(7), 4).unwrap(), vec![7]);
        assert_eq!(non_adjacent_form(&BigInt::from(-7), 4).unwrap(), vec![-7]);
    }

    #[test]
    fn naf_reconstructs_and_is_sparse() {
        let mut e = BigInt::from(0x1234_5678_9abc_def1u64) * BigInt::from(0xfeed_beef_u64);
        for _ in 0..20 {
            for w in 2..=8 {
                let naf = non_adjacent_form(&e, w).unwrap();
                assert_eq!(reconstruct_signed(&naf), e);
                assert!(naf.len() <= e.bits() as usize + 1);
                let bound = (1i32 << (w - 1)) - 1;
                let mut last: Option<usize> = None;
                for (i, d) in naf.iter().enumerate() {
                    if *d == 0 {
                        continue;
                    }
                    assert!(d.abs() <= bound, "digit {} out of range for w = {}", d, w);
                    assert_eq!(d.abs() % 2, 1);
                    if let Some(j) = last {
                        assert!(i - j >= w);
                    }
                    last = Some(i);
                }
            }
            e = -(e * 3u32 + 1u32);
        }
    }

    #[test]
    fn naf_rejects_bad_windows() {
        let e = BigInt::one();
        assert!(matches!(
            non_adjacent_form(&e, 1),
            Err(Error::InvalidWindowSize { window_size: 1, .. })
        ));
        assert!(non_adjacent_form(&e, MAX_WINDOW_SIZE + 1).is_err());
    }

    #[test]
    fn sliding_windows_reconstruct() {
        let e = BigUint::from(0b1011_0001_1110_1101u32);
        for w in 1..=6 {
            let digits = sliding_window_form(&e, w).unwrap();
            assert_eq!(digits.len(), e.bits() as usize);
            assert_eq!(reconstruct_windows(&digits, 1), e);
            for d in digits.iter().filter(|d| **d != 0) {
                assert_eq!(d % 2, 1);
                assert!(*d < (1 << w));
            }
        }
    }

    #[test]
    fn sliding_windows_known_value() {
        // 0b11101 with w = 3: windows 111 at bit 2, then 1 at bit 0.
        let digits = sliding_window_form(&BigUint::from(0b11101u32), 3).unwrap();
        assert_eq!(digits, vec![1, 0, 7, 0, 0]);
    }

    #[test]
    fn radix_2w_reconstructs() {
        let e = BigUint::from(0xdead_beef_cafe_u64);
        for w in 1..=8 {
            let digits = radix_2w_form(&e, w).unwrap();
            assert_eq!(reconstruct_windows(&digits, w), e);
            assert!(digits.iter().all(|d| *d < (1 << w)));
        }
        assert!(radix_2w_form(&BigUint::zero(), 4).unwrap().is_empty());
    }
}
