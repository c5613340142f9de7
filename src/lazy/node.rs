// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

use core::mem;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock};

use num_bigint::BigInt;

use super::arena::NodeId;
use crate::traits::GroupElement;
use crate::window::SmallExponentPrecomputation;

/// A deferred group operation on other arena nodes.
#[derive(Clone, Debug)]
pub(crate) enum Op {
    Combine(NodeId, NodeId),
    Invert(NodeId),
    Square(NodeId),
    Power(NodeId, BigInt),
}

impl Op {
    /// The nodes this operation reads, each listed once per reference held.
    pub(crate) fn operands(&self) -> impl Iterator<Item = NodeId> {
        let (first, second) = match self {
            Op::Combine(a, b) => (*a, Some(*b)),
            Op::Invert(a) | Op::Square(a) | Op::Power(a, _) => (*a, None),
        };
        core::iter::once(first).chain(second)
    }
}

/// Evaluation state of a node.
///
/// `Pending` owns the operation, `InProgress` marks a node some thread is
/// evaluating (waiters block on [`Node::ready`]), and `Done` holds the
/// memoized value.  A failed evaluation moves `InProgress` back to
/// `Pending`.
#[derive(Debug)]
pub(crate) enum NodeState<E> {
    Pending(Op),
    InProgress,
    Done(E),
}

pub(crate) struct Node<E: GroupElement> {
    pub(crate) state: Mutex<NodeState<E>>,
    pub(crate) ready: Condvar,
    precomputation: OnceLock<Arc<SmallExponentPrecomputation<E>>>,
}

impl<E: GroupElement> Node<E> {
    pub(crate) fn pending(op: Op) -> Self {
        Node::with_state(NodeState::Pending(op))
    }

    pub(crate) fn done(value: E) -> Self {
        Node::with_state(NodeState::Done(value))
    }

    fn with_state(state: NodeState<E>) -> Self {
        Node {
            state: Mutex::new(state),
            ready: Condvar::new(),
            precomputation: OnceLock::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, NodeState<E>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn is_done(&self) -> bool {
        matches!(*self.lock(), NodeState::Done(_))
    }

    pub(crate) fn value(&self) -> Option<E> {
        match &*self.lock() {
            NodeState::Done(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Take the pending operation, leaving the node in progress.
    ///
    /// Blocks while another thread holds the node in progress, and returns
    /// `None` once the node is done.  A caller that gets `Some` must store
    /// either a value or the operation back.
    pub(crate) fn claim(&self) -> Option<Op> {
        let mut state = self.lock();
        loop {
            match mem::replace(&mut *state, NodeState::InProgress) {
                NodeState::Pending(op) => return Some(op),
                NodeState::Done(value) => {
                    *state = NodeState::Done(value);
                    return None;
                }
                NodeState::InProgress => {
                    state = self.ready.wait(state).unwrap_or_else(|poisoned| poisoned.into_inner());
                }
            }
        }
    }

    /// A copy of the operation if the node is a pending COMBINE or POWER.
    pub(crate) fn pending_product(&self) -> Option<Op> {
        match &*self.lock() {
            NodeState::Pending(op @ (Op::Combine(..) | Op::Power(..))) => Some(op.clone()),
            _ => None,
        }
    }

    /// Operand references a node still holds.  Only pending nodes hold any:
    /// finished nodes release theirs as soon as their value is stored.
    pub(crate) fn held_operands(&self) -> Vec<NodeId> {
        match &*self.lock() {
            NodeState::Pending(op) => op.operands().collect(),
            _ => Vec::new(),
        }
    }

    /// The small-power cache of this node's value, `value` being that value.
    pub(crate) fn precomputation(&self, value: &E) -> Arc<SmallExponentPrecomputation<E>> {
        self.precomputation
            .get_or_init(|| Arc::new(SmallExponentPrecomputation::new(value.clone())))
            .clone()
    }
}
