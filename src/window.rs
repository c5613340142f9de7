// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Code for fixed- and sliding-window functionality: per-base tables of
//! small powers.

use core::fmt::Debug;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use crate::errors::Error;
use crate::exponent::{check_window_size, MAX_WINDOW_SIZE};
use crate::traits::{Group, GroupElement};

/// Inverse tables are only worth building when an inversion costs more than
/// this many group operations.
pub const NEGATIVE_POWERS_MIN_INVERSION_COST: f64 = 1.0;

/// Tables never cover more than the largest window.
fn check_table_exponent(exponent: usize) -> Result<(), Error> {
    if exponent >= 1 << MAX_WINDOW_SIZE {
        return Err(Error::InvalidExponent {
            reason: "power table lookup beyond the largest window",
        });
    }
    Ok(())
}

/// Lookup tables of small powers of a single base \\( g \\).
///
/// Holds, each grown on demand:
///
/// * the odd powers \\( g, g^3, g^5, \ldots \\),
/// * the odd powers of the inverse \\( g^{-1}, g^{-3}, \ldots \\),
/// * all powers \\( g^0, g^1, g^2, \ldots \\).
///
/// Tables only ever grow: once computed for a window \\( w \\) they serve
/// every window \\( w' \leq w \\) and are recomputed only when a strictly
/// larger window is requested.  The tables are internally synchronized, so a
/// precomputation can be shared (behind an `Arc`) between its base and every
/// multi-exponentiation term that uses that base.
pub struct SmallExponentPrecomputation<G: GroupElement> {
    base: G,
    tables: RwLock<PowerTables<G>>,
}

#[derive(Clone)]
struct PowerTables<G> {
    /// `odd_powers[i] == g^(2i+1)`
    odd_powers: Vec<G>,
    /// `negative_odd_powers[i] == g^-(2i+1)`
    negative_odd_powers: Vec<G>,
    /// `all_powers[i] == g^i`
    all_powers: Vec<G>,
    /// `g^2`, the step between consecutive odd powers.
    base_squared: Option<G>,
}

/// Number of entries a table needs to cover the window `w`, i.e. the number
/// of odd values below \\( 2^w \\).
#[inline]
fn odd_table_len(w: usize) -> usize {
    1 << (w - 1)
}

/// The largest window a table of `len` odd powers covers.
#[inline]
fn odd_table_window(len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (usize::BITS - len.leading_zeros()) as usize
    }
}

impl<G: GroupElement> SmallExponentPrecomputation<G> {
    /// Create an empty precomputation for `base`.
    pub fn new(base: G) -> Self {
        SmallExponentPrecomputation {
            base,
            tables: RwLock::new(PowerTables {
                odd_powers: Vec::new(),
                negative_odd_powers: Vec::new(),
                all_powers: Vec::new(),
                base_squared: None,
            }),
        }
    }

    /// The base all tables are powers of.
    pub fn base(&self) -> &G {
        &self.base
    }

    fn read(&self) -> RwLockReadGuard<'_, PowerTables<G>> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, PowerTables<G>> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Largest window the odd-power table currently covers.
    pub fn window_size(&self) -> usize {
        odd_table_window(self.read().odd_powers.len())
    }

    /// Largest window the inverse odd-power table currently covers.
    pub fn negative_window_size(&self) -> usize {
        odd_table_window(self.read().negative_odd_powers.len())
    }

    /// Largest window the all-powers table currently covers.
    pub fn all_powers_window_size(&self) -> usize {
        let len = self.read().all_powers.len();
        if len < 2 {
            0
        } else {
            (usize::BITS - 1 - len.leading_zeros()) as usize
        }
    }

    /// Populate the odd powers \\( g^1, \ldots, g^{2^w - 1} \\), and if
    /// `compute_negatives` is set their inverses as well.
    ///
    /// Does nothing for tables that already cover `window_size`.
    pub fn compute(&self, window_size: usize, compute_negatives: bool) -> Result<(), Error> {
        check_window_size(window_size, 1)?;
        {
            let mut tables = self.write();
            self.grow_odd_powers(&mut tables, odd_table_len(window_size));
        }
        if compute_negatives {
            self.force_negative_powers(window_size)?;
        }
        Ok(())
    }

    /// Populate the inverse odd powers \\( g^{-1}, \ldots, g^{-(2^w - 1)} \\)
    /// if the group makes that worthwhile.
    ///
    /// Nothing is computed for groups without inversion, or whose inversion
    /// costs at most [`NEGATIVE_POWERS_MIN_INVERSION_COST`] operations:
    /// inverting on demand is then as cheap as a table lookup saves.
    pub fn compute_negative_powers(&self, window_size: usize) -> Result<(), Error> {
        check_window_size(window_size, 1)?;
        let group = self.base.group();
        if !group.supports_inversion() || group.inversion_cost() <= NEGATIVE_POWERS_MIN_INVERSION_COST {
            trace!(window_size, "skipping inverse power table");
            return Ok(());
        }
        self.force_negative_powers(window_size)
    }

    fn force_negative_powers(&self, window_size: usize) -> Result<(), Error> {
        let mut tables = self.write();
        self.grow_odd_powers(&mut tables, odd_table_len(window_size));
        Self::grow_negative_powers(&mut tables, odd_table_len(window_size))
    }

    /// Populate all powers \\( g^0, \ldots, g^{2^w - 1} \\), as used by the
    /// fixed-window method.
    pub fn compute_all_powers(&self, window_size: usize) -> Result<(), Error> {
        check_window_size(window_size, 1)?;
        let mut tables = self.write();
        self.grow_all_powers(&mut tables, 1 << window_size);
        Ok(())
    }

    /// Return \\( g^e \\) for odd, positive `e`, growing the table on a miss.
    pub fn get_power(&self, exponent: usize) -> Result<G, Error> {
        check_table_exponent(exponent)?;
        if exponent % 2 == 0 {
            return Err(Error::InvalidExponent {
                reason: "odd power table lookup with an even exponent",
            });
        }
        let index = exponent / 2;
        if let Some(power) = self.read().odd_powers.get(index) {
            return Ok(power.clone());
        }
        let mut tables = self.write();
        self.grow_odd_powers(&mut tables, index + 1);
        Ok(tables.odd_powers[index].clone())
    }

    /// Return \\( g^{-e} \\) for odd, positive `e`, growing the inverse table
    /// on a miss.
    pub fn get_negative_power(&self, exponent: usize) -> Result<G, Error> {
        check_table_exponent(exponent)?;
        if exponent % 2 == 0 {
            return Err(Error::InvalidExponent {
                reason: "odd power table lookup with an even exponent",
            });
        }
        let index = exponent / 2;
        if let Some(power) = self.read().negative_odd_powers.get(index) {
            return Ok(power.clone());
        }
        let mut tables = self.write();
        self.grow_odd_powers(&mut tables, index + 1);
        Self::grow_negative_powers(&mut tables, index + 1)?;
        Ok(tables.negative_odd_powers[index].clone())
    }

    /// Return \\( g^{-e} \\) for odd, positive `e` from the inverse table if
    /// it covers `e`, and otherwise by inverting \\( g^e \\) without
    /// caching.
    pub(crate) fn get_negative_power_or_invert(&self, exponent: usize) -> Result<G, Error> {
        check_table_exponent(exponent)?;
        if let Some(power) = self.read().negative_odd_powers.get(exponent / 2) {
            return Ok(power.clone());
        }
        self.get_power(exponent)?.inv()
    }

    /// Return \\( g^e \\) for any `e` covered by (or just above) the
    /// all-powers table, growing it on a miss.
    pub fn get_any_power(&self, exponent: usize) -> Result<G, Error> {
        check_table_exponent(exponent)?;
        if let Some(power) = self.read().all_powers.get(exponent) {
            return Ok(power.clone());
        }
        let mut tables = self.write();
        self.grow_all_powers(&mut tables, exponent + 1);
        Ok(tables.all_powers[exponent].clone())
    }

    fn grow_odd_powers(&self, tables: &mut PowerTables<G>, len: usize) {
        if tables.odd_powers.len() >= len {
            return;
        }
        trace!(from = tables.odd_powers.len(), to = len, "growing odd power table");
        if tables.odd_powers.is_empty() {
            tables.odd_powers.push(self.base.clone());
        }
        let g2 = tables.base_squared.get_or_insert_with(|| self.base.square()).clone();
        tables.odd_powers.reserve(len - tables.odd_powers.len());
        while tables.odd_powers.len() < len {
            let next = tables.odd_powers[tables.odd_powers.len() - 1].op(&g2);
            tables.odd_powers.push(next);
        }
        // Now odd_powers = [g, g^3, g^5, ..., g^(2len-1)]
    }

    /// Requires the odd power table to hold at least `len` entries.
    fn grow_negative_powers(tables: &mut PowerTables<G>, len: usize) -> Result<(), Error> {
        if tables.negative_odd_powers.len() >= len {
            return Ok(());
        }
        trace!(from = tables.negative_odd_powers.len(), to = len, "growing inverse power table");
        if tables.negative_odd_powers.is_empty() {
            let g_inv = tables.odd_powers[0].inv()?;
            tables.negative_odd_powers.push(g_inv);
        }
        // g^-2 = (g^-1)^2; stepping avoids one inversion per entry.
        let g2_inv = tables.negative_odd_powers[0].square();
        while tables.negative_odd_powers.len() < len {
            let next = tables.negative_odd_powers[tables.negative_odd_powers.len() - 1].op(&g2_inv);
            tables.negative_odd_powers.push(next);
        }
        Ok(())
    }

    fn grow_all_powers(&self, tables: &mut PowerTables<G>, len: usize) {
        if tables.all_powers.len() >= len {
            return;
        }
        trace!(from = tables.all_powers.len(), to = len, "growing power table");
        if tables.all_powers.is_empty() {
            tables.all_powers.push(self.base.group().neutral_element());
        }
        while tables.all_powers.len() < len {
            let next = tables.all_powers[tables.all_powers.len() - 1].op(&self.base);
            tables.all_powers.push(next);
        }
    }
}

impl<G: GroupElement> Clone for SmallExponentPrecomputation<G> {
    fn clone(&self) -> Self {
        SmallExponentPrecomputation {
            base: self.base.clone(),
            tables: RwLock::new(self.read().clone()),
        }
    }
}

impl<G: GroupElement + Debug> Debug for SmallExponentPrecomputation<G> {
    fn fmt(&self, f: &mut ::core::fmt::Formatter) -> ::core::fmt::Result {
        let tables = self.read();
        f.debug_struct("SmallExponentPrecomputation")
            .field("base", &self.base)
            .field("odd_powers", &tables.odd_powers.len())
            .field("negative_odd_powers", &tables.negative_odd_powers.len())
            .field("all_powers", &tables.all_powers.len())
            .finish()
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------
