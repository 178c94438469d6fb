//! Integration test: end-to-end mining scenarios
//!
//! Drives the economy purely through its public façade: level setup, worker
//! commands, navigation callbacks and time. Covers the dependency rule,
//! fractional banking, depletion, shared special nodes and the one allowed
//! accounting leak (a banked fraction discarded on cancel).

use fixed::types::I32F32;
use orefield_core::abilities::ParentBypass;
use orefield_core::economy::Economy;
use orefield_core::event::{EconomyEvent, JobEndReason};
use orefield_core::geometry::Position;
use orefield_core::id::NodeId;
use orefield_core::navigation::PathFailure;
use orefield_core::node::SpecialNodeDef;
use orefield_core::resource::ResourceKind;
use orefield_core::strategy::Ability;
use orefield_core::test_utils::{arrive, economy, mine_now, run_ticks, standard};
use orefield_core::worker::WorkerState;
use std::time::Duration;

/// Root copper at x=0 with an iron child at x=4.
fn root_and_child(eco: &mut Economy) -> (NodeId, NodeId) {
    let root = eco.add_standard(standard(ResourceKind::Tier1, 1.0, 0.0)).unwrap();
    let child = eco
        .add_child(root, standard(ResourceKind::Tier2, 1.0, 4.0))
        .unwrap();
    (root, child)
}

fn state(eco: &Economy, worker: orefield_core::id::WorkerId) -> WorkerState {
    eco.worker(worker).unwrap().state()
}

#[test]
fn child_refused_while_parent_idle() {
    let mut eco = economy();
    let (_, child) = root_and_child(&mut eco);
    let w = eco.spawn_worker(Position::default(), Ability::Plain);

    assert!(eco.command_mine(w, Some(child)).unwrap());
    assert_eq!(state(&eco, w), WorkerState::MovingToSource);
    arrive(&mut eco, w);

    assert_eq!(state(&eco, w), WorkerState::Idle);
    assert!(eco.scheduler().is_empty());
    assert!(!eco.nodes().get(child).unwrap().is_mining());
    run_ticks(&mut eco, 5);
    assert_eq!(eco.ledger().grand_total(), 0);
    assert!(eco.drain_events().iter().any(|e| matches!(
        e,
        EconomyEvent::ActivationRefused { node, .. } if *node == child
    )));
}

#[test]
fn child_unlocks_once_parent_is_mined() {
    let mut eco = economy();
    let (root, child) = root_and_child(&mut eco);
    let a = eco.spawn_worker(Position::default(), Ability::Plain);
    let b = eco.spawn_worker(Position::default(), Ability::Plain);

    assert!(mine_now(&mut eco, a, root));
    assert!(mine_now(&mut eco, b, child));
    run_ticks(&mut eco, 3);
    assert_eq!(eco.ledger().total(ResourceKind::Tier1), 3);
    assert_eq!(eco.ledger().total(ResourceKind::Tier2), 3);
}

#[test]
fn bypass_mines_child_regardless_of_parent() {
    let mut eco = economy();
    let (root, child) = root_and_child(&mut eco);
    let w = eco.spawn_worker(Position::default(), Ability::custom(ParentBypass));

    assert!(mine_now(&mut eco, w, child));
    assert!(!eco.nodes().get(root).unwrap().is_mining());
    run_ticks(&mut eco, 2);
    assert_eq!(state(&eco, w), WorkerState::Mining);
    assert_eq!(eco.ledger().total(ResourceKind::Tier2), 2);
}

#[test]
fn parent_stopping_pulls_child_miner_off() {
    let mut eco = economy();
    let (root, child) = root_and_child(&mut eco);
    let a = eco.spawn_worker(Position::default(), Ability::Plain);
    let b = eco.spawn_worker(Position::default(), Ability::Plain);
    mine_now(&mut eco, a, root);
    mine_now(&mut eco, b, child);
    run_ticks(&mut eco, 1);

    eco.command_move(a, Position::new(-10.0, 0.0)).unwrap();
    assert!(!eco.nodes().get(root).unwrap().is_mining());
    // The child keeps its job until the next worker check.
    assert_eq!(state(&eco, b), WorkerState::Mining);

    run_ticks(&mut eco, 3);
    assert_eq!(state(&eco, b), WorkerState::Idle);
    assert_eq!(eco.ledger().total(ResourceKind::Tier2), 1);
    assert!(!eco.nodes().get(child).unwrap().is_mining());
}

#[test]
fn fractional_yield_banks_across_ticks() {
    let mut eco = economy();
    let node = eco.add_standard(standard(ResourceKind::Tier3, 0.3, 0.0)).unwrap();
    let w = eco.spawn_worker(Position::default(), Ability::Plain);
    mine_now(&mut eco, w, node);

    let result = run_ticks(&mut eco, 5);
    assert_eq!(result.units_posted, 1);
    assert_eq!(eco.ledger().total(ResourceKind::Tier3), 1);
    let banked = eco.worker_snapshot(w).unwrap().banked_remainder;
    assert!(banked > I32F32::from_num(0.49) && banked < I32F32::from_num(0.51));
}

#[test]
fn special_depletes_after_exactly_three_ticks() {
    let mut eco = economy();
    let host = eco.add_standard(standard(ResourceKind::Tier1, 1.0, 0.0)).unwrap();
    let special = eco
        .attach_special(host, SpecialNodeDef::new(1.0, 2.5))
        .unwrap();
    let w = eco.spawn_worker(Position::default(), Ability::Plain);
    assert!(mine_now(&mut eco, w, special));

    let result = run_ticks(&mut eco, 2);
    assert!(result.depleted.is_empty());
    assert_eq!(
        eco.node_snapshot(special).unwrap().remaining_capacity,
        Some(I32F32::from_num(0.5))
    );

    let result = eco.step();
    assert_eq!(result.depleted, vec![special]);
    assert!(!eco.nodes().contains(special));
    assert_eq!(eco.node_snapshot(host).unwrap().attachment, None);
    assert_eq!(state(&eco, w), WorkerState::Idle);
    assert!(eco.scheduler().is_empty());
    // 1 + 1 posted; the final 0.5 stays below a whole unit.
    assert_eq!(eco.ledger().total(ResourceKind::Special), 2);
}

#[test]
fn shared_special_yields_capacity_once() {
    let mut eco = economy();
    let host = eco.add_standard(standard(ResourceKind::Tier1, 1.0, 0.0)).unwrap();
    let special = eco
        .attach_special(host, SpecialNodeDef::new(1.0, 1.0))
        .unwrap();
    let a = eco.spawn_worker(Position::default(), Ability::Plain);
    let b = eco.spawn_worker(Position::new(1.0, 0.0), Ability::Plain);
    assert!(mine_now(&mut eco, a, special));
    assert!(mine_now(&mut eco, b, special));
    assert_eq!(eco.node_snapshot(special).unwrap().active_jobs, 2);

    let result = eco.step();
    assert_eq!(result.units_posted, 1);
    assert_eq!(eco.ledger().total(ResourceKind::Special), 1);
    assert!(!eco.nodes().contains(special));
    assert_eq!(state(&eco, a), WorkerState::Idle);
    assert_eq!(state(&eco, b), WorkerState::Idle);

    let reasons: Vec<JobEndReason> = result.ended.iter().map(|e| e.reason).collect();
    assert_eq!(reasons, vec![JobEndReason::Depleted, JobEndReason::Stale]);
}

#[test]
fn cancelling_discards_banked_fraction() {
    let mut eco = economy();
    let host = eco.add_standard(standard(ResourceKind::Tier1, 1.0, 0.0)).unwrap();
    let special = eco
        .attach_special(host, SpecialNodeDef::new(0.75, 2.5))
        .unwrap();
    let w = eco.spawn_worker(Position::default(), Ability::Plain);
    mine_now(&mut eco, w, special);
    run_ticks(&mut eco, 2);
    assert_eq!(eco.ledger().total(ResourceKind::Special), 1);

    // Cancel with 0.5 banked: it is not posted and not returned to the node.
    eco.command_move(w, Position::new(3.0, 3.0)).unwrap();
    let remaining = eco.node_snapshot(special).unwrap().remaining_capacity.unwrap();
    assert_eq!(remaining, I32F32::from_num(1.0));
    let posted = I32F32::from_num(eco.ledger().total(ResourceKind::Special));
    let lost = I32F32::from_num(2.5) - remaining - posted;
    assert_eq!(lost, I32F32::from_num(0.5));
}

#[test]
fn path_failure_leaves_no_job_behind() {
    let mut eco = economy();
    let node = eco.add_standard(standard(ResourceKind::Tier1, 1.0, 8.0)).unwrap();
    let w = eco.spawn_worker(Position::default(), Ability::Plain);
    mine_now(&mut eco, w, node);

    eco.command_mine(w, Some(node)).unwrap();
    assert!(eco.scheduler().is_empty());
    let handle = eco.worker(w).unwrap().pending_path().unwrap();
    assert!(eco.on_path_failed(handle, PathFailure::Unreachable));

    assert_eq!(state(&eco, w), WorkerState::Idle);
    assert!(eco.scheduler().is_empty());
    assert!(!eco.nodes().get(node).unwrap().is_mining());
    // A late arrival for the failed request changes nothing.
    assert!(!eco.on_arrived(handle));
}

#[test]
fn pushing_a_miner_off_its_spot_ends_the_job() {
    let mut eco = economy();
    let node = eco.add_standard(standard(ResourceKind::Tier1, 1.0, 0.0)).unwrap();
    let w = eco.spawn_worker(Position::default(), Ability::Plain);
    mine_now(&mut eco, w, node);

    eco.set_worker_position(w, Position::new(0.5, 0.0)).unwrap();
    eco.advance(Duration::from_secs(1));
    assert_eq!(state(&eco, w), WorkerState::Mining);

    eco.set_worker_position(w, Position::new(3.0, 0.0)).unwrap();
    eco.advance(Duration::from_secs(1));
    assert_eq!(state(&eco, w), WorkerState::Idle);
    assert_eq!(eco.ledger().total(ResourceKind::Tier1), 1);
}

#[test]
fn access_points_pick_the_nearest_spot() {
    let mut eco = economy();
    let node = eco
        .add_standard(
            standard(ResourceKind::Tier4, 1.0, 0.0)
                .with_access_points(vec![Position::new(-5.0, 0.0), Position::new(5.0, 0.0)]),
        )
        .unwrap();
    let w = eco.spawn_worker(Position::new(7.0, 0.0), Ability::Plain);
    assert!(mine_now(&mut eco, w, node));
    assert_eq!(eco.worker(w).unwrap().position(), Position::new(5.0, 0.0));
    run_ticks(&mut eco, 1);
    assert_eq!(state(&eco, w), WorkerState::Mining);
}
