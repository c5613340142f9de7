// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

//! Forcing lazy nodes.
//!
//! A COMBINE or POWER node is evaluated by flattening the product below it
//! into one [`Multiexponentiation`]: COMBINE operands that are themselves
//! pending, unshared COMBINE or POWER nodes are inlined, POWER nodes become
//! terms (their base forced, its node's cache reused as the term's table),
//! and everything else is forced into the constant factor.  The whole
//! product then costs a single interleaved multi-exponentiation.

use std::sync::atomic::Ordering;

use num_bigint::BigInt;
use tracing::{debug, instrument, trace};

use super::arena::NodeId;
use super::node::{NodeState, Op};
use super::Shared;
use crate::errors::Error;
use crate::multiexp::{MultiExpTerm, Multiexponentiation};
use crate::scalar_mul::straus;
use crate::traits::{Group, GroupElement};

/// Return the value of `id`, evaluating it first if needed.
///
/// Nodes are evaluated bottom-up from an explicit work stack, so the depth
/// of an expression is bounded by memory rather than by the call stack.  A
/// node whose operands are not all done goes back to pending and those
/// operands are pushed above it.
///
/// At most one thread evaluates a node; others block until the value is
/// stored.  If evaluation fails the node goes back to pending, waiters are
/// woken and retry, and the error is returned.
pub(crate) fn force<G: Group>(shared: &Shared<G>, id: NodeId) -> Result<G::Element, Error> {
    let mut work = vec![id];

    while let Some(&top) = work.last() {
        let node = match shared.arena.get(top) {
            Some(node) => node,
            // Freed operands belonged to a parent another thread finished.
            None if top != id => {
                work.pop();
                continue;
            }
            None => return Err(Error::InconsistentStructure),
        };
        let op = match node.claim() {
            Some(op) => op,
            None => {
                work.pop();
                continue;
            }
        };

        let mut blocked = Vec::new();
        let result = evaluate_op(shared, &op, &mut blocked);

        let mut state = node.lock();
        match result {
            Ok(Some(value)) => {
                *state = NodeState::Done(value);
                drop(state);
                node.ready.notify_all();
                shared.evaluated_nodes.fetch_add(1, Ordering::Relaxed);
                for operand in op.operands() {
                    shared.arena.release(operand);
                }
                work.pop();
            }
            Ok(None) => {
                *state = NodeState::Pending(op);
                drop(state);
                node.ready.notify_all();
                trace!(node = ?top, operands = blocked.len(), "waiting on operands");
                work.extend(blocked);
            }
            Err(e) => {
                *state = NodeState::Pending(op);
                drop(state);
                node.ready.notify_all();
                debug!(node = ?top, error = %e, "evaluation failed");
                return Err(e);
            }
        }
    }

    shared
        .arena
        .get(id)
        .and_then(|node| node.value())
        .ok_or(Error::InconsistentStructure)
}

/// Evaluate `op` from operands that are already done.
///
/// Operands that are not done yet are appended to `blocked` and `None` is
/// returned; nothing is computed in that case.
#[instrument(level = "trace", skip_all)]
fn evaluate_op<G: Group>(
    shared: &Shared<G>,
    op: &Op,
    blocked: &mut Vec<NodeId>,
) -> Result<Option<G::Element>, Error> {
    match op {
        Op::Invert(a) => match done_value(shared, *a, blocked)? {
            Some(value) => value.inv().map(Some),
            None => Ok(None),
        },
        Op::Square(a) => Ok(done_value(shared, *a, blocked)?.map(|value| value.square())),
        Op::Combine(..) | Op::Power(..) => {
            let multiexp = flatten(shared, op, blocked)?;
            if !blocked.is_empty() {
                return Ok(None);
            }
            execute(shared, &multiexp).map(Some)
        }
    }
}

/// The value of `id` if it is done; otherwise `id` is recorded in `blocked`.
fn done_value<G: Group>(
    shared: &Shared<G>,
    id: NodeId,
    blocked: &mut Vec<NodeId>,
) -> Result<Option<G::Element>, Error> {
    let node = shared.arena.get(id).ok_or(Error::InconsistentStructure)?;
    let value = node.value();
    if value.is_none() {
        blocked.push(id);
    }
    Ok(value)
}

fn put_power<G: Group>(
    shared: &Shared<G>,
    multiexp: &mut Multiexponentiation<G::Element>,
    blocked: &mut Vec<NodeId>,
    base: NodeId,
    exponent: &BigInt,
) -> Result<(), Error> {
    let node = shared.arena.get(base).ok_or(Error::InconsistentStructure)?;
    match node.value() {
        Some(value) => {
            let precomputation = node.precomputation(&value);
            multiexp.put(MultiExpTerm::with_precomputation(precomputation, exponent.clone()))
        }
        None => {
            blocked.push(base);
            Ok(())
        }
    }
}

/// Collect the product rooted at `root` into a multi-exponentiation.
///
/// POWER bases and operands that cannot be inlined must already be done;
/// the ones that are not end up in `blocked` and the returned product is
/// incomplete.
fn flatten<G: Group>(
    shared: &Shared<G>,
    root: &Op,
    blocked: &mut Vec<NodeId>,
) -> Result<Multiexponentiation<G::Element>, Error> {
    let mut multiexp = Multiexponentiation::new(shared.group.clone());
    let mut stack = Vec::new();
    match root {
        Op::Combine(a, b) => {
            stack.push(*b);
            stack.push(*a);
        }
        Op::Power(base, exponent) => put_power(shared, &mut multiexp, blocked, *base, exponent)?,
        Op::Invert(_) | Op::Square(_) => {}
    }

    while let Some(id) = stack.pop() {
        let node = shared.arena.get(id).ok_or(Error::InconsistentStructure)?;
        // A count of one is the reference held by the node being evaluated,
        // so nobody else can observe the inlined node.
        let inlined = if shared.arena.refs(id) == 1 {
            node.pending_product()
        } else {
            None
        };
        match inlined {
            Some(Op::Combine(a, b)) => {
                trace!(node = ?id, "inlining product");
                stack.push(b);
                stack.push(a);
            }
            Some(Op::Power(base, exponent)) => {
                trace!(node = ?id, "inlining power");
                put_power(shared, &mut multiexp, blocked, base, &exponent)?;
            }
            _ => {
                if let Some(value) = done_value(shared, id, blocked)? {
                    multiexp.multiply_constant(&value)?;
                }
            }
        }
    }

    Ok(multiexp)
}

fn execute<G: Group>(shared: &Shared<G>, multiexp: &Multiexponentiation<G::Element>) -> Result<G::Element, Error> {
    shared.multiexponentiations.fetch_add(1, Ordering::Relaxed);
    let window_size = shared.config.window_size();
    if multiexp.len() < shared.config.interleave_threshold() {
        straus::per_term_multiexp(multiexp, window_size)
    } else {
        straus::interleaving_multiexp(multiexp, window_size)
    }
}
