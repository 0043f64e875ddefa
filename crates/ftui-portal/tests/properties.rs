//! Property-based invariant tests for primary tracking and channel cleanup.
//!
//! **PrimaryTracker:**
//! 1. `get()` is always the earliest still-registered value.
//! 2. The change callback fires exactly once per change of primary, with the
//!    new primary value.
//! 3. Deregistering an already removed entry has no effect.
//!
//! **ChannelRegistry:**
//! 4. A channel is live iff it has at least one source or target.
//! 5. The primary target's latest delivery is the primary source, or
//!    `Vacant` when there is none.
//! 6. Secondary targets are never called.
//! 7. The primary target gets exactly one delivery per change of either
//!    primary while it is primary.

use std::cell::RefCell;
use std::rc::Rc;

use ftui_portal::testing::CaptureTarget;
use ftui_portal::{ChannelRegistry, Delivery, PrimaryTracker, Registration};
use proptest::prelude::*;

// ── Strategies ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum TrackerOp {
    Store,
    Remove(usize),
    RemoveAgain(usize),
}

fn tracker_op() -> impl Strategy<Value = TrackerOp> {
    prop_oneof![
        3 => Just(TrackerOp::Store),
        2 => any::<usize>().prop_map(TrackerOp::Remove),
        1 => any::<usize>().prop_map(TrackerOp::RemoveAgain),
    ]
}

#[derive(Debug, Clone)]
enum ChannelOp {
    AddSource,
    AddTarget,
    RemoveSource(usize),
    RemoveTarget(usize),
}

fn channel_op() -> impl Strategy<Value = ChannelOp> {
    prop_oneof![
        Just(ChannelOp::AddSource),
        Just(ChannelOp::AddTarget),
        any::<usize>().prop_map(ChannelOp::RemoveSource),
        any::<usize>().prop_map(ChannelOp::RemoveTarget),
    ]
}

// ── PrimaryTracker ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn tracker_matches_model(ops in proptest::collection::vec(tracker_op(), 0..80)) {
        let notified = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&notified);
        let tracker = PrimaryTracker::new(move |v: Option<u32>| sink.borrow_mut().push(v));

        let mut live: Vec<(u32, Registration)> = Vec::new();
        let mut removed: Vec<Registration> = Vec::new();
        let mut expected: Vec<Option<u32>> = Vec::new();
        let mut next_value = 0u32;

        for op in ops {
            match op {
                TrackerOp::Store => {
                    if live.is_empty() {
                        expected.push(Some(next_value));
                    }
                    live.push((next_value, tracker.store(next_value)));
                    next_value += 1;
                }
                TrackerOp::Remove(i) if !live.is_empty() => {
                    let idx = i % live.len();
                    let (_, reg) = live.remove(idx);
                    reg.deregister();
                    if idx == 0 {
                        expected.push(live.first().map(|(v, _)| *v));
                    }
                    removed.push(reg);
                }
                TrackerOp::RemoveAgain(i) if !removed.is_empty() => {
                    let before = notified.borrow().len();
                    removed[i % removed.len()].deregister();
                    prop_assert_eq!(notified.borrow().len(), before);
                }
                _ => {}
            }

            prop_assert_eq!(tracker.get(), live.first().map(|(v, _)| *v));
            prop_assert_eq!(tracker.len(), live.len());
            prop_assert_eq!(tracker.is_empty(), live.is_empty());
            prop_assert_eq!(tracker.primary_id(), live.first().map(|(_, r)| r.id()));
            prop_assert_eq!(&*notified.borrow(), &expected);
        }
    }
}

// ── ChannelRegistry ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn channel_lifecycle_matches_model(ops in proptest::collection::vec(channel_op(), 0..80)) {
        let registry: ChannelRegistry<u32> = ChannelRegistry::new();
        let mut sources: Vec<(u32, Registration)> = Vec::new();
        let mut targets: Vec<CaptureTarget<u32>> = Vec::new();
        // Deliveries each target should have received so far.
        let mut delivered: Vec<usize> = Vec::new();
        let mut next_value = 0u32;

        for op in ops {
            match op {
                ChannelOp::AddSource => {
                    if sources.is_empty() && !delivered.is_empty() {
                        delivered[0] += 1;
                    }
                    sources.push((next_value, registry.get("p").register_source(next_value)));
                    next_value += 1;
                }
                ChannelOp::AddTarget => {
                    delivered.push(usize::from(targets.is_empty()));
                    targets.push(CaptureTarget::on(&registry, "p"));
                }
                ChannelOp::RemoveSource(i) if !sources.is_empty() => {
                    let idx = i % sources.len();
                    sources.remove(idx).1.deregister();
                    if idx == 0 && !delivered.is_empty() {
                        delivered[0] += 1;
                    }
                }
                ChannelOp::RemoveTarget(i) if !targets.is_empty() => {
                    let idx = i % targets.len();
                    targets.remove(idx).deregister();
                    delivered.remove(idx);
                    if idx == 0 && !delivered.is_empty() {
                        delivered[0] += 1;
                    }
                }
                _ => {}
            }

            let live = !sources.is_empty() || !targets.is_empty();
            prop_assert_eq!(registry.contains("p"), live);

            if let Some((primary, rest)) = targets.split_first() {
                let want = Delivery::from(sources.first().map(|(v, _)| *v));
                prop_assert_eq!(primary.latest(), Some(want));
                for secondary in rest {
                    prop_assert!(secondary.is_empty());
                }
            }
            for (target, want) in targets.iter().zip(&delivered) {
                prop_assert_eq!(target.len(), *want);
            }
        }
    }
}
