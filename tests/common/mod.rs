// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use groupexp::zn::{ZnElement, ZnGroup};
use groupexp::{Error, Group, GroupElement};
use rand_core::{CryptoRng, RngCore};

pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

#[derive(Debug, Default)]
pub struct Counters {
    ops: AtomicUsize,
    squarings: AtomicUsize,
    inversions: AtomicUsize,
}

/// Operation counts observed by a [`CountingGroup`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub ops: usize,
    pub squarings: usize,
    pub inversions: usize,
}

/// `Z_n^*` with counters on every group operation, optionally pretending it
/// cannot invert at all, or cannot invert one particular element while still
/// claiming support for inversion.
#[derive(Clone, Debug)]
pub struct CountingGroup {
    inner: ZnGroup,
    counters: Arc<Counters>,
    inversion: bool,
    inversion_cost: f64,
    failing_inverse: Option<ZnElement>,
}

impl CountingGroup {
    pub fn new(modulus: u64) -> CountingGroup {
        CountingGroup {
            inner: ZnGroup::new(modulus).unwrap(),
            counters: Arc::new(Counters::default()),
            inversion: true,
            inversion_cost: 4.0,
            failing_inverse: None,
        }
    }

    pub fn without_inversion(mut self) -> CountingGroup {
        self.inversion = false;
        self
    }

    pub fn with_inversion_cost(mut self, cost: f64) -> CountingGroup {
        self.inversion_cost = cost;
        self
    }

    /// Make `inv()` of the element `value` fail with
    /// [`Error::UnsupportedCapability`].
    pub fn with_failing_inverse(mut self, value: u64) -> CountingGroup {
        self.failing_inverse = Some(self.inner.element(value).unwrap());
        self
    }

    pub fn element(&self, value: u64) -> CountingElement {
        CountingElement {
            group: self.clone(),
            inner: self.inner.element(value).unwrap(),
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            ops: self.counters.ops.load(Ordering::SeqCst),
            squarings: self.counters.squarings.load(Ordering::SeqCst),
            inversions: self.counters.inversions.load(Ordering::SeqCst),
        }
    }

    pub fn reset(&self) {
        self.counters.ops.store(0, Ordering::SeqCst);
        self.counters.squarings.store(0, Ordering::SeqCst);
        self.counters.inversions.store(0, Ordering::SeqCst);
    }
}

impl PartialEq for CountingGroup {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner && self.inversion == other.inversion && Arc::ptr_eq(&self.counters, &other.counters)
    }
}

impl Group for CountingGroup {
    type Element = CountingElement;

    fn neutral_element(&self) -> CountingElement {
        CountingElement {
            group: self.clone(),
            inner: self.inner.neutral_element(),
        }
    }

    fn supports_inversion(&self) -> bool {
        self.inversion
    }

    fn inversion_cost(&self) -> f64 {
        self.inversion_cost
    }

    fn random_element<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R) -> Result<CountingElement, Error> {
        Ok(CountingElement {
            group: self.clone(),
            inner: self.inner.random_element(rng)?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct CountingElement {
    group: CountingGroup,
    inner: ZnElement,
}

impl CountingElement {
    pub fn inner(&self) -> &ZnElement {
        &self.inner
    }
}

impl PartialEq for CountingElement {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl GroupElement for CountingElement {
    type Group = CountingGroup;

    fn group(&self) -> &CountingGroup {
        &self.group
    }

    fn op(&self, other: &Self) -> Self {
        self.group.counters.ops.fetch_add(1, Ordering::SeqCst);
        CountingElement {
            group: self.group.clone(),
            inner: self.inner.op(&other.inner),
        }
    }

    fn inv(&self) -> Result<Self, Error> {
        if !self.group.inversion {
            return Err(Error::UnsupportedCapability("inversion"));
        }
        if self.group.failing_inverse.as_ref() == Some(&self.inner) {
            return Err(Error::UnsupportedCapability("inversion of this element"));
        }
        self.group.counters.inversions.fetch_add(1, Ordering::SeqCst);
        Ok(CountingElement {
            group: self.group.clone(),
            inner: self.inner.inv()?,
        })
    }

    fn square(&self) -> Self {
        self.group.counters.squarings.fetch_add(1, Ordering::SeqCst);
        CountingElement {
            group: self.group.clone(),
            inner: self.inner.square(),
        }
    }
}
