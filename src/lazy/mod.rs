// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Lazily evaluated group elements.
//!
//! Operations on a [`LazyGroupElement`] only record what is to be computed:
//! each one adds a node to an arena owned by its [`LazyGroup`].  Asking for a
//! value forces the node, which flattens the products and powers below it
//! into a single multi-exponentiation, evaluates that once with the
//! interleaved algorithms, and memoizes the result.
//!
//! ```
//! use num_bigint::BigInt;
//! use groupexp::lazy::LazyGroup;
//! use groupexp::zn::ZnGroup;
//!
//! # fn main() -> Result<(), groupexp::Error> {
//! let z11 = ZnGroup::new(11u32)?;
//! let lazy = LazyGroup::new(z11.clone());
//!
//! let g1 = lazy.wrap(z11.element(2u32).unwrap())?;
//! let g2 = lazy.wrap(z11.element(3u32).unwrap())?;
//!
//! // Nothing is computed yet.
//! let product = g1.power(&BigInt::from(2))?.combine(&g2.power(&BigInt::from(3))?)?;
//! assert!(!product.is_computed());
//!
//! // 2^2 * 3^3 = 4 * 27 = 108 = 9 mod 11
//! assert_eq!(product.compute_sync()?, z11.element(9u32).unwrap());
//! # Ok(())
//! # }
//! ```

use core::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use num_bigint::BigInt;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, warn};

use crate::config::{ExecutionPolicy, LazyConfig};
use crate::errors::Error;
use crate::traits::{check_exponent_supported, Group, GroupElement};

mod arena;
mod evaluate;
mod executor;
mod node;

use arena::{Arena, NodeId};
use node::{Node, Op};

/// State shared by a lazy group and all of its elements.
pub(crate) struct Shared<G: Group> {
    group: G,
    config: LazyConfig,
    arena: Arena<G::Element>,
    evaluated_nodes: AtomicUsize,
    multiexponentiations: AtomicUsize,
}

/// Counters of the work a [`LazyGroup`] has done so far.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct EvaluationStats {
    /// Nodes whose value was computed.
    pub evaluated_nodes: usize,
    /// Multi-exponentiations executed while doing so.
    pub multiexponentiations: usize,
}

/// A group whose elements are evaluated lazily.
///
/// Cloning yields another handle to the same arena.
#[derive(Clone)]
pub struct LazyGroup<G: Group> {
    shared: Arc<Shared<G>>,
}

impl<G: Group> LazyGroup<G> {
    pub fn new(group: G) -> Self {
        Self::with_config(group, LazyConfig::default())
    }

    pub fn with_config(group: G, config: LazyConfig) -> Self {
        debug!(?group, ?config, "creating lazy group");
        LazyGroup {
            shared: Arc::new(Shared {
                group,
                config,
                arena: Arena::new(),
                evaluated_nodes: AtomicUsize::new(0),
                multiexponentiations: AtomicUsize::new(0),
            }),
        }
    }

    /// The underlying concrete group.
    pub fn group(&self) -> &G {
        &self.shared.group
    }

    pub fn config(&self) -> &LazyConfig {
        &self.shared.config
    }

    /// Wrap an already computed value.
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentStructure`] if `value` is not in this group.
    pub fn wrap(&self, value: G::Element) -> Result<LazyGroupElement<G>, Error> {
        if value.group() != &self.shared.group {
            return Err(Error::InconsistentStructure);
        }
        Ok(self.insert(Node::done(value)))
    }

    pub fn neutral_element(&self) -> LazyGroupElement<G> {
        self.insert(Node::done(self.shared.group.neutral_element()))
    }

    pub fn random_element<R: RngCore + CryptoRng + ?Sized>(&self, rng: &mut R) -> Result<LazyGroupElement<G>, Error> {
        let value = self.shared.group.random_element(rng)?;
        Ok(self.insert(Node::done(value)))
    }

    pub fn stats(&self) -> EvaluationStats {
        EvaluationStats {
            evaluated_nodes: self.shared.evaluated_nodes.load(Ordering::Relaxed),
            multiexponentiations: self.shared.multiexponentiations.load(Ordering::Relaxed),
        }
    }

    /// Number of nodes currently held in the arena.
    pub fn live_nodes(&self) -> usize {
        self.shared.arena.live()
    }

    fn insert(&self, node: Node<G::Element>) -> LazyGroupElement<G> {
        LazyGroupElement {
            shared: self.shared.clone(),
            id: self.shared.arena.insert(node),
        }
    }
}

impl<G: Group> fmt::Debug for LazyGroup<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyGroup")
            .field("group", &self.shared.group)
            .field("config", &self.shared.config)
            .finish()
    }
}

impl<G: Group> PartialEq for LazyGroup<G> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

/// A handle to a (possibly not yet computed) element of a [`LazyGroup`].
///
/// Handles are cheap to clone; the node they point to lives as long as any
/// handle or pending expression refers to it.
pub struct LazyGroupElement<G: Group> {
    shared: Arc<Shared<G>>,
    id: NodeId,
}

impl<G: Group> LazyGroupElement<G> {
    fn pending(&self, op: Op) -> LazyGroupElement<G> {
        for operand in op.operands() {
            self.shared.arena.retain(operand);
        }
        LazyGroupElement {
            shared: self.shared.clone(),
            id: self.shared.arena.insert(Node::pending(op)),
        }
    }

    fn node(&self) -> Result<Arc<Node<G::Element>>, Error> {
        self.shared.arena.get(self.id).ok_or(Error::InconsistentStructure)
    }

    /// The lazy group this element belongs to.
    pub fn lazy_group(&self) -> LazyGroup<G> {
        LazyGroup {
            shared: self.shared.clone(),
        }
    }

    pub fn group(&self) -> &G {
        &self.shared.group
    }

    /// Returns `self · other`, to be computed later.
    ///
    /// # Errors
    ///
    /// [`Error::InconsistentStructure`] if `other` belongs to another lazy
    /// group.
    pub fn combine(&self, other: &Self) -> Result<Self, Error> {
        if !Arc::ptr_eq(&self.shared, &other.shared) {
            return Err(Error::InconsistentStructure);
        }
        Ok(self.pending(Op::Combine(self.id, other.id)))
    }

    /// Returns the inverse, to be computed later.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedCapability`] if the group cannot invert.
    pub fn invert(&self) -> Result<Self, Error> {
        if !self.shared.group.supports_inversion() {
            return Err(Error::UnsupportedCapability("inversion"));
        }
        Ok(self.pending(Op::Invert(self.id)))
    }

    /// Returns `self · self`, to be computed later.
    pub fn square(&self) -> Self {
        self.pending(Op::Square(self.id))
    }

    /// Returns `self^exponent`, to be computed later.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedCapability`] for a negative exponent if the group
    /// cannot invert.
    pub fn power(&self, exponent: &BigInt) -> Result<Self, Error> {
        check_exponent_supported(&self.shared.group, exponent)?;
        Ok(self.pending(Op::Power(self.id, exponent.clone())))
    }

    /// Start computing the value according to the group's
    /// [`ExecutionPolicy`].
    ///
    /// With [`ExecutionPolicy::Synchronous`] the value is computed before
    /// returning; with [`ExecutionPolicy::Background`] this returns at once
    /// and [`compute_sync`](Self::compute_sync) waits for the result.
    /// Does nothing for computed elements.
    pub fn compute(&self) -> Result<(), Error> {
        match self.shared.config.execution_policy() {
            ExecutionPolicy::Synchronous => self.compute_sync().map(|_| ()),
            ExecutionPolicy::Background => {
                if self.is_computed() {
                    return Ok(());
                }
                let handle = self.clone();
                executor::spawn(move || {
                    if let Err(e) = evaluate::force(&handle.shared, handle.id) {
                        warn!(node = ?handle.id, error = %e, "background evaluation failed");
                    }
                });
                Ok(())
            }
        }
    }

    /// Compute the value on this thread, or wait for the thread already
    /// computing it, and return it.
    pub fn compute_sync(&self) -> Result<G::Element, Error> {
        evaluate::force(&self.shared, self.id)
    }

    /// Whether the value is available without further computation.
    pub fn is_computed(&self) -> bool {
        self.node().map_or(false, |n| n.is_done())
    }

    /// The value, if already computed.
    pub fn concrete_value(&self) -> Option<G::Element> {
        self.node().ok().and_then(|n| n.value())
    }

    /// Compute the value and fill its small-power tables for
    /// `window_size`, so later powers of this element start from them.
    pub fn precompute_pow(&self, window_size: usize) -> Result<&Self, Error> {
        let value = self.compute_sync()?;
        let precomputation = self.node()?.precomputation(&value);
        precomputation.compute(window_size, false)?;
        precomputation.compute_negative_powers(window_size)?;
        Ok(self)
    }

    /// Compare values, computing both.
    pub fn equals(&self, other: &Self) -> Result<bool, Error> {
        if self.shared.group != other.shared.group {
            return Err(Error::InconsistentStructure);
        }
        Ok(self.compute_sync()? == other.compute_sync()?)
    }

    pub fn is_neutral_element(&self) -> Result<bool, Error> {
        Ok(self.compute_sync()?.is_neutral_element())
    }
}

impl<G: Group> Clone for LazyGroupElement<G> {
    fn clone(&self) -> Self {
        self.shared.arena.retain(self.id);
        LazyGroupElement {
            shared: self.shared.clone(),
            id: self.id,
        }
    }
}

impl<G: Group> Drop for LazyGroupElement<G> {
    fn drop(&mut self) {
        self.shared.arena.release(self.id);
    }
}

impl<G: Group> fmt::Debug for LazyGroupElement<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.concrete_value() {
            Some(value) => write!(f, "LazyGroupElement({:?})", value),
            None => write!(f, "LazyGroupElement({:?}, pending)", self.id),
        }
    }
}

#[cfg(feature = "serde")]
impl<G: Group> serde::Serialize for LazyGroupElement<G>
where
    G::Element: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::Error as _;

        let value = self.compute_sync().map_err(S::Error::custom)?;
        value.serialize(serializer)
    }
}

// ------------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------------
