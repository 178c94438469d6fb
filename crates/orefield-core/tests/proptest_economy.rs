//! Property-based tests for the mining economy.
//!
//! Uses proptest to generate random node layouts, abilities and command
//! sequences, then checks the accounting and job-table invariants.

use orefield_core::abilities::Multiplier;
use orefield_core::economy::Economy;
use orefield_core::fixed::Fixed64;
use orefield_core::geometry::Position;
use orefield_core::id::{NodeId, WorkerId};
use orefield_core::navigation::PathFailure;
use orefield_core::node::SpecialNodeDef;
use orefield_core::resource::ResourceKind;
use orefield_core::strategy::Ability;
use orefield_core::test_utils::*;
use orefield_core::worker::WorkerState;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Quarter-unit values: exact in Q32.32.
fn arb_quarters(max: u32) -> impl Strategy<Value = f64> {
    (0..=max).prop_map(|q| q as f64 / 4.0)
}

#[derive(Debug, Clone)]
enum Op {
    Mine(usize, usize),
    MineNothing(usize),
    Move(usize),
    Arrive(usize),
    Fail(usize),
    Nudge(usize, u8),
    RemoveNode(usize),
    Despawn(usize),
    Step,
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            3 => (0..6usize, 0..8usize).prop_map(|(w, n)| Op::Mine(w, n)),
            1 => (0..6usize).prop_map(Op::MineNothing),
            1 => (0..6usize).prop_map(Op::Move),
            4 => (0..6usize).prop_map(Op::Arrive),
            1 => (0..6usize).prop_map(Op::Fail),
            1 => (0..6usize, 0..4u8).prop_map(|(w, d)| Op::Nudge(w, d)),
            1 => (0..8usize).prop_map(Op::RemoveNode),
            1 => (0..6usize).prop_map(Op::Despawn),
            3 => Just(Op::Step),
        ],
        1..=max_ops,
    )
}

/// A root, a child, a grandchild and a special on each of the first two.
fn layout(economy: &mut Economy) -> Vec<NodeId> {
    let mut nodes = build_chain(economy, 3);
    let a = economy
        .attach_special(nodes[0], SpecialNodeDef::new(1.5, 4.0))
        .unwrap();
    let b = economy
        .attach_special(nodes[1], SpecialNodeDef::new(0.75, 2.5))
        .unwrap();
    nodes.extend([a, b]);
    nodes
}

fn apply(economy: &mut Economy, workers: &[WorkerId], nodes: &[NodeId], op: &Op) {
    let worker = |i: usize| workers[i % workers.len()];
    match *op {
        Op::Mine(w, n) => {
            let _ = economy.command_mine(worker(w), nodes.get(n % (nodes.len() + 1)).copied());
        }
        Op::MineNothing(w) => {
            let _ = economy.command_mine(worker(w), None);
        }
        Op::Move(w) => {
            let _ = economy.command_move(worker(w), Position::new(w as f64, 3.0));
        }
        Op::Arrive(w) => {
            arrive(economy, worker(w));
        }
        Op::Fail(w) => {
            if let Some(handle) = economy.worker(worker(w)).and_then(|w| w.pending_path()) {
                economy.on_path_failed(handle, PathFailure::Blocked);
            }
        }
        Op::Nudge(w, d) => {
            if let Some(p) = economy.worker(worker(w)).map(|w| w.position()) {
                let _ = economy
                    .set_worker_position(worker(w), Position::new(p.x + d as f64 * 0.5, p.y));
            }
        }
        Op::RemoveNode(n) => {
            if let Some(&id) = nodes.get(n) {
                let _ = economy.remove_node(id);
            }
        }
        Op::Despawn(w) => {
            let _ = economy.despawn_worker(worker(w));
        }
        Op::Step => {
            economy.step();
        }
    }
}

fn check_job_table(economy: &Economy, workers: &[WorkerId]) {
    for &w in workers {
        let jobs = economy
            .scheduler()
            .iter()
            .filter(|(_, job)| job.worker == w)
            .count();
        assert!(jobs <= 1, "worker {w:?} holds {jobs} jobs");
        if let Some(worker) = economy.worker(w) {
            assert_eq!(
                worker.state() == WorkerState::Mining,
                economy.scheduler().has_job(w),
                "worker {w:?} state {:?} disagrees with job table",
                worker.state()
            );
        } else {
            assert!(!economy.scheduler().has_job(w));
        }
    }
    for snap in economy.node_snapshots() {
        assert_eq!(snap.is_mining, snap.active_jobs > 0, "node {:?}", snap.id);
    }
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Capacity removed from a special node equals units posted plus the
    /// job's banked fraction, and the fraction is always below one unit.
    #[test]
    fn special_capacity_is_conserved(
        capacity in arb_quarters(40),
        base in arb_quarters(12),
        factor in arb_quarters(12),
        ticks in 0u64..40,
    ) {
        let mut eco = economy();
        let host = eco.add_standard(standard(ResourceKind::Tier1, 1.0, 0.0)).unwrap();
        let special = eco.attach_special(host, SpecialNodeDef::new(base, capacity)).unwrap();
        let w = eco.spawn_worker(Position::default(), Ability::custom(Multiplier::new(factor)));
        let started = mine_now(&mut eco, w, special);
        prop_assert_eq!(started, capacity > 0.0);

        let initial = fixed(capacity);
        for _ in 0..ticks {
            eco.step();
            let posted = Fixed64::from_num(eco.ledger().total(ResourceKind::Special));
            let remaining = eco
                .nodes()
                .get(special)
                .and_then(|n| n.remaining_capacity())
                .unwrap_or(Fixed64::ZERO);
            match eco.scheduler().job_for(w) {
                Some(job) => {
                    prop_assert!(job.banked_remainder < Fixed64::ONE);
                    prop_assert_eq!(posted + remaining + job.banked_remainder, initial);
                }
                None => {
                    // Depleted: only a sub-unit fraction may have been lost.
                    let lost = initial - remaining - posted;
                    prop_assert!(lost >= Fixed64::ZERO && lost < Fixed64::ONE);
                }
            }
        }
    }

    /// Whole units posted from a standard node are exactly the floor of the
    /// accumulated yield.
    #[test]
    fn banking_posts_floor_of_accumulated_yield(quarters in 0u32..=12, ticks in 0u64..60) {
        let mut eco = economy();
        let node = eco
            .add_standard(standard(ResourceKind::Tier3, quarters as f64 / 4.0, 0.0))
            .unwrap();
        let w = eco.spawn_worker(Position::default(), Ability::Plain);
        prop_assert!(mine_now(&mut eco, w, node));
        let result = run_ticks(&mut eco, ticks);

        let expected = ticks * quarters as u64 / 4;
        prop_assert_eq!(result.units_posted, expected);
        prop_assert_eq!(eco.ledger().total(ResourceKind::Tier3) as u64, expected);
        let banked = eco.scheduler().job_for(w).unwrap().banked_remainder;
        prop_assert_eq!(banked, fixed(((ticks * quarters as u64) % 4) as f64 / 4.0));
    }

    /// Under arbitrary command, callback and removal sequences every worker
    /// holds at most one job, and job table, worker states and node mining
    /// flags agree.
    #[test]
    fn job_table_stays_consistent(ops in arb_ops(80)) {
        let mut eco = economy();
        let nodes = layout(&mut eco);
        let workers: Vec<WorkerId> = (0..4)
            .map(|i| eco.spawn_worker(Position::new(i as f64, 0.0), Ability::Plain))
            .collect();

        for op in &ops {
            apply(&mut eco, &workers, &nodes, op);
            check_job_table(&eco, &workers);
        }
    }
}
