// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Plain square-and-multiply.

use num_bigint::{BigInt, Sign};

use super::Accumulator;
use crate::errors::Error;
use crate::traits::{check_exponent_supported, GroupElement};

/// Compute \\( g^e \\) by left-to-right square-and-multiply.
///
/// Spends one squaring per bit of \\( |e| \\) below the top bit and one
/// operation per further set bit; a negative exponent adds one final
/// inversion.
///
/// # Errors
///
/// [`Error::UnsupportedCapability`] for a negative exponent in a group
/// without inversion.
pub fn square_and_multiply<G: GroupElement>(base: &G, exponent: &BigInt) -> Result<G, Error> {
    check_exponent_supported(base.group(), exponent)?;

    let magnitude = exponent.magnitude();
    let mut acc = Accumulator::new();
    for i in (0..magnitude.bits()).rev() {
        acc.square();
        if magnitude.bit(i) {
            acc.op(base);
        }
    }
    let result = acc.finish(base.group(), None);

    match exponent.sign() {
        Sign::Minus => result.inv(),
        _ => Ok(result),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use num_bigint::BigUint;

    use crate::zn::ZnGroup;

    #[test]
    fn small_powers_mod_11() {
        let group = ZnGroup::new(11u32).unwrap();
        let g = group.element(2u32).unwrap();
        // 2^10 = 1 mod 11
        let expected = [1u32, 2, 4, 8, 5, 10, 9, 7, 3, 6, 1];
        for (e, x) in expected.iter().enumerate() {
            let r = square_and_multiply(&g, &BigInt::from(e)).unwrap();
            assert_eq!(r.value(), &BigUint::from(*x));
        }
        // 2^-1 = 6 mod 11
        let r = square_and_multiply(&g, &BigInt::from(-1)).unwrap();
        assert_eq!(r.value(), &BigUint::from(6u32));
    }
}
