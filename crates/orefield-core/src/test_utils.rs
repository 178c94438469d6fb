//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available everywhere tests run (via the `test-utils` feature outside
//! this crate).

use crate::economy::Economy;
use crate::fixed::Fixed64;
use crate::geometry::Position;
use crate::id::{NodeId, PathHandle, WorkerId};
use crate::navigation::Navigator;
use crate::node::StandardNodeDef;
use crate::resource::ResourceKind;
use crate::sim::AdvanceResult;
use crate::worker::WorkerState;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Navigator
// ===========================================================================

/// A navigator that never moves anything. It records each request and hands
/// out sequential handles; tests decide when a worker "arrives".
#[derive(Debug, Default)]
pub struct ScriptedNavigator {
    pub requests: Vec<(WorkerId, Position, PathHandle)>,
    pub cancelled: Vec<PathHandle>,
    next_handle: u64,
}

impl ScriptedNavigator {
    /// The most recent request issued for `worker`.
    pub fn last_for(&self, worker: WorkerId) -> Option<PathHandle> {
        self.requests
            .iter()
            .rev()
            .find(|(w, _, _)| *w == worker)
            .map(|&(_, _, h)| h)
    }
}

impl Navigator for ScriptedNavigator {
    fn request_move(&mut self, worker: WorkerId, to: Position) -> PathHandle {
        self.next_handle += 1;
        let handle = PathHandle(self.next_handle);
        self.requests.push((worker, to, handle));
        handle
    }

    fn cancel(&mut self, handle: PathHandle) {
        self.cancelled.push(handle);
    }
}

// ===========================================================================
// Economy builders
// ===========================================================================

/// An economy with the default config (one tick per second) and a
/// [`ScriptedNavigator`].
pub fn economy() -> Economy {
    Economy::with_navigator(Box::new(ScriptedNavigator::default()))
}

/// A standard node definition on the x axis.
pub fn standard(kind: ResourceKind, base_yield: f64, x: f64) -> StandardNodeDef {
    StandardNodeDef::new(kind, base_yield, Position::new(x, 0.0))
}

/// Build a parent → child chain of `len` standard nodes along the x axis.
pub fn build_chain(economy: &mut Economy, len: usize) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = Vec::with_capacity(len);
    for i in 0..len {
        let def = standard(ResourceKind::ORDINARY[i % 4], 1.0, i as f64 * 2.0);
        let id = match ids.last() {
            Some(&parent) => economy.add_child(parent, def),
            None => economy.add_standard(def),
        }
        .expect("chain nodes are valid");
        ids.push(id);
    }
    ids
}

// ===========================================================================
// Drivers
// ===========================================================================

/// Complete the worker's pending navigation request. Returns false if it
/// had none.
pub fn arrive(economy: &mut Economy, worker: WorkerId) -> bool {
    let Some(handle) = economy.worker(worker).and_then(|w| w.pending_path()) else {
        return false;
    };
    economy.on_arrived(handle)
}

/// Command `worker` to mine `node` and arrive immediately. Returns whether
/// the worker ended up mining.
pub fn mine_now(economy: &mut Economy, worker: WorkerId, node: NodeId) -> bool {
    if !economy.command_mine(worker, Some(node)).unwrap_or(false) {
        return false;
    }
    arrive(economy, worker);
    economy
        .worker(worker)
        .is_some_and(|w| w.state() == WorkerState::Mining)
}

/// Run `n` scheduler ticks, folding the results together.
pub fn run_ticks(economy: &mut Economy, n: u64) -> AdvanceResult {
    let mut total = AdvanceResult::default();
    for _ in 0..n {
        let r = economy.step();
        total.steps_run += r.steps_run;
        total.units_posted += r.units_posted;
        total.depleted.extend(r.depleted);
        total.ended.extend(r.ended);
    }
    total
}
