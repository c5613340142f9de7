// -*- mode: rust; -*-
//
// This file is part of groupexp.
// See LICENSE for licensing information.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use num_bigint::BigInt;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use groupexp::zn::{ZnElement, ZnGroup};
use groupexp::{Error, ExecutionPolicy, Group, GroupElement, LazyConfig, LazyGroup};

use common::{init_tracing, CountingGroup};

fn zp() -> ZnGroup {
    ZnGroup::new(1_000_000_007u32).unwrap()
}

#[test]
fn chain_matches_eager_evaluation() {
    init_tracing();
    let group = zp();
    let lazy = LazyGroup::new(group.clone());
    let mut rng = ChaCha20Rng::seed_from_u64(1);

    let a = group.random_element(&mut rng).unwrap();
    let b = group.random_element(&mut rng).unwrap();
    let (la, lb) = (lazy.wrap(a.clone()).unwrap(), lazy.wrap(b.clone()).unwrap());

    let mut lazy_acc = la.clone();
    let mut eager_acc = a.clone();
    for k in 0..20i64 {
        let e = BigInt::from(k * 7919 - 50_000);
        lazy_acc = match k % 4 {
            0 => lazy_acc.combine(&lb.power(&e).unwrap()).unwrap(),
            1 => lazy_acc.power(&e).unwrap(),
            2 => lazy_acc.square(),
            _ => lazy_acc.invert().unwrap().combine(&la).unwrap(),
        };
        eager_acc = match k % 4 {
            0 => eager_acc.op(&b.pow(&e).unwrap()),
            1 => eager_acc.pow(&e).unwrap(),
            2 => eager_acc.square(),
            _ => eager_acc.inv().unwrap().op(&a),
        };
    }

    assert!(!lazy_acc.is_computed());
    assert_eq!(lazy_acc.concrete_value(), None);
    assert_eq!(lazy_acc.compute_sync().unwrap(), eager_acc);
    assert!(lazy_acc.is_computed());
    assert_eq!(lazy_acc.concrete_value(), Some(eager_acc));
}

#[test]
fn second_compute_is_a_noop() {
    let group = zp();
    let lazy = LazyGroup::new(group.clone());
    let g = lazy.wrap(group.element(5u32).unwrap()).unwrap();
    let x = g.power(&BigInt::from(1_000_000)).unwrap().combine(&g).unwrap();

    x.compute().unwrap();
    let stats = lazy.stats();
    assert!(x.is_computed());

    x.compute().unwrap();
    x.compute_sync().unwrap();
    assert_eq!(lazy.stats(), stats);
}

#[test]
fn concurrent_compute_sync_evaluates_once() {
    init_tracing();
    let group = zp();
    let lazy = LazyGroup::new(group.clone());
    let mut rng = ChaCha20Rng::seed_from_u64(2);

    let mut x = lazy.neutral_element();
    for _ in 0..8 {
        let base = lazy.random_element(&mut rng).unwrap();
        x = x.combine(&base.power(&BigInt::from(u64::MAX)).unwrap()).unwrap();
    }

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let x = x.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                x.compute_sync().unwrap()
            })
        })
        .collect();
    let results: Vec<ZnElement> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(lazy.stats().multiexponentiations, 1);
    assert_eq!(lazy.stats().evaluated_nodes, 1);
}

#[test]
fn background_policy_evaluates_off_thread() {
    let group = zp();
    let config = LazyConfig::default().with_execution_policy(ExecutionPolicy::Background);
    let lazy = LazyGroup::with_config(group.clone(), config);

    let g = group.element(3u32).unwrap();
    let e = BigInt::from(123_456_789_000u64);
    let x = lazy.wrap(g.clone()).unwrap().power(&e).unwrap();

    x.compute().unwrap();
    assert_eq!(x.compute_sync().unwrap(), g.pow(&e).unwrap());
    assert!(x.is_computed());
}

#[test]
fn construction_errors() {
    let group = CountingGroup::new(1_000_003).without_inversion();
    let lazy = LazyGroup::new(group.clone());
    let g = lazy.wrap(group.element(2)).unwrap();

    assert_eq!(g.invert().unwrap_err(), Error::UnsupportedCapability("inversion"));
    assert_eq!(
        g.power(&BigInt::from(-3)).unwrap_err(),
        Error::UnsupportedCapability("inversion")
    );

    let other = LazyGroup::new(CountingGroup::new(1_000_003));
    let h = other.neutral_element();
    assert_eq!(g.combine(&h).unwrap_err(), Error::InconsistentStructure);
    assert_eq!(
        other.wrap(group.element(2)).unwrap_err(),
        Error::InconsistentStructure
    );
}

#[test]
fn groups_without_inversion_use_sliding_windows() {
    let group = CountingGroup::new(1_000_003).without_inversion();
    let lazy = LazyGroup::new(group.clone());
    let a = lazy.wrap(group.element(2)).unwrap();
    let b = lazy.wrap(group.element(3)).unwrap();

    let x = a
        .power(&BigInt::from(1000))
        .unwrap()
        .combine(&b.power(&BigInt::from(77)).unwrap())
        .unwrap();
    let expected = group
        .element(2)
        .pow(&BigInt::from(1000))
        .unwrap()
        .op(&group.element(3).pow(&BigInt::from(77)).unwrap());
    assert_eq!(x.compute_sync().unwrap(), expected);
    assert_eq!(group.counts().inversions, 0);
}

#[test]
fn dropped_handles_free_slots() {
    let group = zp();
    let lazy = LazyGroup::new(group.clone());
    {
        let g = lazy.wrap(group.element(2u32).unwrap()).unwrap();
        let _chain = g.square().square().combine(&g).unwrap();
        assert_eq!(lazy.live_nodes(), 4);
    }
    assert_eq!(lazy.live_nodes(), 0);

    // Slots are reused.
    let g = lazy.wrap(group.element(2u32).unwrap()).unwrap();
    let x = g.power(&BigInt::from(10)).unwrap();
    assert_eq!(lazy.live_nodes(), 2);
    assert_eq!(x.compute_sync().unwrap(), group.element(1024u32).unwrap());
    drop(g);
    assert_eq!(lazy.live_nodes(), 1);
}

#[test]
fn precompute_pow_fills_tables() {
    let group = zp();
    let lazy = LazyGroup::new(group.clone());
    let g = lazy.wrap(group.element(2u32).unwrap()).unwrap();
    g.precompute_pow(6).unwrap();

    let x = g.power(&BigInt::from(-1_000_001)).unwrap();
    assert_eq!(
        x.compute_sync().unwrap(),
        group.element(2u32).unwrap().pow(&BigInt::from(-1_000_001)).unwrap()
    );
    assert!(x.equals(&x.clone()).unwrap());
    assert!(!x.is_neutral_element().unwrap());
    assert!(lazy.neutral_element().is_neutral_element().unwrap());
}

#[test]
fn long_square_chain_evaluates() {
    let group = zp();
    let lazy = LazyGroup::new(group.clone());
    let g = group.element(3u32).unwrap();

    let mut x = lazy.wrap(g.clone()).unwrap();
    let mut expected = g;
    for _ in 0..100_000 {
        x = x.square();
        expected = expected.square();
    }
    assert_eq!(x.compute_sync().unwrap(), expected);
    assert_eq!(lazy.stats().evaluated_nodes, 100_000);
    drop(x);
    assert_eq!(lazy.live_nodes(), 0);

    // Dropping a long chain that was never computed.
    let mut y = lazy.neutral_element();
    for _ in 0..100_000 {
        y = y.square();
    }
    assert_eq!(lazy.live_nodes(), 100_001);
    drop(y);
    assert_eq!(lazy.live_nodes(), 0);
}

#[test]
fn long_power_chain_evaluates() {
    let group = zp();
    let lazy = LazyGroup::new(group.clone());
    let g = group.element(5u32).unwrap();
    let three = BigInt::from(3);

    let mut x = lazy.wrap(g.clone()).unwrap();
    let mut expected = g;
    for _ in 0..100_000 {
        x = x.power(&three).unwrap();
        expected = expected.pow(&three).unwrap();
    }
    assert_eq!(x.compute_sync().unwrap(), expected);
    assert_eq!(lazy.stats().evaluated_nodes, 100_000);
    assert_eq!(lazy.stats().multiexponentiations, 100_000);
}

#[test]
fn failed_evaluation_leaves_element_pending() {
    init_tracing();
    let group = CountingGroup::new(1_000_003).with_failing_inverse(5);
    let lazy = LazyGroup::new(group.clone());
    let g = lazy.wrap(group.element(5)).unwrap();
    let x = g.invert().unwrap();
    let y = x.square().combine(&g).unwrap();
    let expected = Error::UnsupportedCapability("inversion of this element");
    let before = lazy.stats();

    for _ in 0..3 {
        assert_eq!(x.compute_sync().unwrap_err(), expected);
        assert_eq!(y.compute_sync().unwrap_err(), expected);
        assert_eq!(x.compute().unwrap_err(), expected);
    }

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let target = if i % 2 == 0 { x.clone() } else { y.clone() };
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                target.compute_sync()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap_err(), expected);
    }

    assert!(!x.is_computed());
    assert!(!y.is_computed());
    assert_eq!(x.concrete_value(), None);
    assert_eq!(lazy.stats().evaluated_nodes, before.evaluated_nodes);

    // Other elements of the same group still evaluate.
    let z = lazy.wrap(group.element(2)).unwrap().invert().unwrap();
    assert_eq!(z.compute_sync().unwrap(), group.element(2).inv().unwrap());
}

#[cfg(feature = "serde")]
#[test]
fn serializes_as_concrete_value() {
    let group = zp();
    let lazy = LazyGroup::new(group.clone());
    let x = lazy.wrap(group.element(3u32).unwrap()).unwrap().square();

    let bytes = bincode::serialize(&x).unwrap();
    assert!(x.is_computed());
    let value: num_bigint::BigUint = bincode::deserialize(&bytes).unwrap();
    assert_eq!(group.element(value).unwrap(), group.element(9u32).unwrap());
}
