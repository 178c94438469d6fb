//! Host-facing façade over the mining economy.
//!
//! [`Economy`] owns the node graph, workers, scheduler, ledger and price book,
//! and receives its navigator at construction. Nothing is global; two
//! economies in one process never see each other.
//!
//! Per frame the host calls [`Economy::advance`] with elapsed time. Each call
//! first runs every worker's leash and dependency checks, then as many
//! scheduler ticks as the accumulated time allows.

use crate::config::{ConfigError, EconomyConfig};
use crate::event::{EconomyEvent, EventLog};
use crate::fixed::Ticks;
use crate::geometry::Position;
use crate::id::{NodeId, PathHandle, WorkerId};
use crate::ledger::Ledger;
use crate::navigation::{Navigator, PathFailure};
use crate::node::{NodeError, NodeGraph, ResourceNode, SpecialNodeDef, StandardNodeDef};
use crate::pricing::PriceBook;
use crate::query::{LedgerSnapshot, NodeSnapshot, WorkerSnapshot};
use crate::rng::SimRng;
use crate::scheduler::Scheduler;
use crate::sim::{AdvanceResult, SimState};
use crate::strategy::{Ability, AttachContext};
use crate::worker::{Worker, WorkerContext, WorkerState};
use slotmap::SlotMap;
use std::collections::VecDeque;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EconomyError {
    #[error("worker not found: {0:?}")]
    WorkerNotFound(WorkerId),
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    #[error(transparent)]
    Node(#[from] NodeError),
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Economy {
    nodes: NodeGraph,
    workers: SlotMap<WorkerId, Worker>,
    scheduler: Scheduler,
    ledger: Ledger,
    pricing: PriceBook,
    sim_state: SimState,
    config: EconomyConfig,
    navigator: Box<dyn Navigator>,
    events: EventLog,
    seeds: SimRng,
    paused: bool,
}

impl Economy {
    /// Build an economy from a validated config.
    pub fn new(config: EconomyConfig, navigator: Box<dyn Navigator>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, navigator))
    }

    /// Build an economy with the default config.
    pub fn with_navigator(navigator: Box<dyn Navigator>) -> Self {
        Self::build(EconomyConfig::default(), navigator)
    }

    fn build(config: EconomyConfig, navigator: Box<dyn Navigator>) -> Self {
        Self {
            nodes: NodeGraph::new(),
            workers: SlotMap::with_key(),
            scheduler: Scheduler::new(),
            ledger: Ledger::new(),
            pricing: PriceBook::new(),
            sim_state: SimState::new(),
            seeds: SimRng::new(config.rng_seed),
            events: EventLog::with_capacity(config.event_capacity),
            config,
            navigator,
            paused: false,
        }
    }

    // -----------------------------------------------------------------------
    // Level setup
    // -----------------------------------------------------------------------

    pub fn add_standard(&mut self, def: StandardNodeDef) -> Result<NodeId, EconomyError> {
        Ok(self.nodes.add_standard(def)?)
    }

    pub fn add_child(&mut self, parent: NodeId, def: StandardNodeDef) -> Result<NodeId, EconomyError> {
        Ok(self.nodes.add_child(parent, def)?)
    }

    pub fn attach_special(
        &mut self,
        standard: NodeId,
        def: SpecialNodeDef,
    ) -> Result<NodeId, EconomyError> {
        Ok(self.nodes.attach_special(standard, def)?)
    }

    /// Remove a node outright. Jobs on it are dropped at the next tick and
    /// its miners fall back to idle at the next worker check.
    pub fn remove_node(&mut self, id: NodeId) -> Result<ResourceNode, EconomyError> {
        self.nodes.remove(id).ok_or(EconomyError::NodeNotFound(id))
    }

    /// A fresh deterministic seed for a randomized ability, derived from the
    /// configured `rng_seed`.
    pub fn next_seed(&mut self) -> u64 {
        self.seeds.next_u64()
    }

    // -----------------------------------------------------------------------
    // Workers
    // -----------------------------------------------------------------------

    /// Create a worker and bind its ability. The ability's attach hook runs
    /// exactly once, here.
    pub fn spawn_worker(&mut self, position: Position, ability: Ability) -> WorkerId {
        let id = self
            .workers
            .insert_with_key(|id| Worker::new(id, position, ability));

        let mut ctx = AttachContext {
            worker: id,
            nodes: &mut self.nodes,
            pricing: &mut self.pricing,
            revealed_specials: 0,
        };
        if let Some(worker) = self.workers.get_mut(id) {
            worker.ability_mut().on_attach(&mut ctx);
            tracing::info!(worker = ?id, ability = worker.ability().name(), "worker spawned");
        }

        let revealed = ctx.revealed_specials;
        if revealed > 0 {
            self.events.emit(EconomyEvent::SpecialsRevealed {
                worker: id,
                count: revealed,
                tick: self.sim_state.tick,
            });
        }
        id
    }

    /// Remove a worker, releasing its job and any discount it registered.
    pub fn despawn_worker(&mut self, id: WorkerId) -> Result<(), EconomyError> {
        self.with_worker(id, |worker, ctx| worker.force_idle(ctx))?;
        self.pricing.unregister_source(id);
        self.workers.remove(id);
        tracing::info!(worker = ?id, "worker despawned");
        Ok(())
    }

    /// Order a worker to mine `node`. Returns `Ok(false)` when the command was
    /// rejected (no target, or the target is missing or hidden); the worker
    /// then keeps doing whatever it was doing.
    pub fn command_mine(&mut self, id: WorkerId, node: Option<NodeId>) -> Result<bool, EconomyError> {
        self.with_worker(id, |worker, ctx| worker.mine(node, ctx))
    }

    pub fn command_move(&mut self, id: WorkerId, to: Position) -> Result<(), EconomyError> {
        self.with_worker(id, |worker, ctx| worker.move_to(to, ctx))
    }

    pub fn set_worker_position(&mut self, id: WorkerId, position: Position) -> Result<(), EconomyError> {
        let worker = self
            .workers
            .get_mut(id)
            .ok_or(EconomyError::WorkerNotFound(id))?;
        worker.set_position(position);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Navigation callbacks
    // -----------------------------------------------------------------------

    /// The navigator reports that request `handle` arrived. Returns false if
    /// no worker is waiting on it.
    pub fn on_arrived(&mut self, handle: PathHandle) -> bool {
        let Some(id) = self.waiting_on(handle) else {
            tracing::debug!(?handle, "ignoring arrival for unknown path");
            return false;
        };
        self.with_worker(id, |worker, ctx| worker.on_arrived(handle, ctx))
            .unwrap_or(false)
    }

    pub fn on_path_failed(&mut self, handle: PathHandle, reason: PathFailure) -> bool {
        let Some(id) = self.waiting_on(handle) else {
            tracing::debug!(?handle, "ignoring failure for unknown path");
            return false;
        };
        self.with_worker(id, |worker, ctx| worker.on_path_failed(handle, reason, ctx))
            .unwrap_or(false)
    }

    fn waiting_on(&self, handle: PathHandle) -> Option<WorkerId> {
        self.workers
            .iter()
            .find(|(_, w)| w.pending_path() == Some(handle))
            .map(|(id, _)| id)
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Advance by `dt` of wall time: run worker checks once, then one
    /// scheduler tick per elapsed `tick_interval`. Leftover time carries to
    /// the next call. Does nothing while paused.
    pub fn advance(&mut self, dt: Duration) -> AdvanceResult {
        let mut result = AdvanceResult::default();
        if self.paused {
            return result;
        }
        self.update_workers();
        let due = self
            .sim_state
            .accumulate(dt, self.config.tick_interval());
        for _ in 0..due {
            self.step_internal(&mut result);
        }
        result
    }

    /// Run worker checks and exactly one scheduler tick, ignoring the
    /// accumulator. Does nothing while paused.
    pub fn step(&mut self) -> AdvanceResult {
        let mut result = AdvanceResult::default();
        if self.paused {
            return result;
        }
        self.update_workers();
        self.step_internal(&mut result);
        result
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Scheduler ticks run so far.
    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    pub fn sim_state(&self) -> &SimState {
        &self.sim_state
    }

    fn update_workers(&mut self) {
        let ids: Vec<WorkerId> = self.workers.keys().collect();
        for id in ids {
            let _ = self.with_worker(id, |worker, ctx| worker.update(ctx));
        }
    }

    fn step_internal(&mut self, result: &mut AdvanceResult) {
        self.sim_state.tick += 1;
        let tick = self.sim_state.tick;
        let report = self.scheduler.tick(
            &mut self.workers,
            &mut self.nodes,
            &mut self.ledger,
            &mut self.events,
            tick,
        );
        tracing::debug!(
            tick,
            jobs = report.jobs_settled,
            units = report.units_posted,
            "scheduler tick"
        );

        // Workers whose job the scheduler ended are still flagged Mining.
        for ended in &report.ended {
            let _ = self.with_worker(ended.worker, |worker, ctx| {
                if worker.state() == WorkerState::Mining {
                    worker.force_idle(ctx);
                }
            });
        }
        result.absorb(report);
    }

    /// Run `f` against one worker with a context borrowing the rest of the
    /// economy.
    fn with_worker<R>(
        &mut self,
        id: WorkerId,
        f: impl FnOnce(&mut Worker, &mut WorkerContext<'_>) -> R,
    ) -> Result<R, EconomyError> {
        let worker = self
            .workers
            .get_mut(id)
            .ok_or(EconomyError::WorkerNotFound(id))?;
        let mut ctx = WorkerContext {
            scheduler: &mut self.scheduler,
            nodes: &mut self.nodes,
            navigator: &mut *self.navigator,
            events: &mut self.events,
            arrival_threshold: self.config.arrival_threshold,
            leash_slack: self.config.leash_slack,
            tick: self.sim_state.tick,
        };
        Ok(f(worker, &mut ctx))
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn nodes(&self) -> &NodeGraph {
        &self.nodes
    }

    pub fn worker(&self, id: WorkerId) -> Option<&Worker> {
        self.workers.get(id)
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn pricing(&self) -> &PriceBook {
        &self.pricing
    }

    pub fn pricing_mut(&mut self) -> &mut PriceBook {
        &mut self.pricing
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn node_snapshot(&self, id: NodeId) -> Option<NodeSnapshot> {
        let node = self.nodes.get(id)?;
        Some(NodeSnapshot::capture(id, node, &self.nodes, &self.scheduler))
    }

    pub fn node_snapshots(&self) -> Vec<NodeSnapshot> {
        self.nodes
            .iter()
            .map(|(id, node)| NodeSnapshot::capture(id, node, &self.nodes, &self.scheduler))
            .collect()
    }

    pub fn worker_snapshot(&self, id: WorkerId) -> Option<WorkerSnapshot> {
        let worker = self.workers.get(id)?;
        Some(WorkerSnapshot::capture(worker, &self.scheduler))
    }

    pub fn worker_snapshots(&self) -> Vec<WorkerSnapshot> {
        self.workers
            .values()
            .map(|w| WorkerSnapshot::capture(w, &self.scheduler))
            .collect()
    }

    pub fn ledger_snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::capture(&self.ledger)
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Event buffer, for suppressing kinds the host does not care about.
    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }

    pub fn pending_events(&self) -> &VecDeque<EconomyEvent> {
        self.events.pending()
    }

    pub fn drain_events(&mut self) -> Vec<EconomyEvent> {
        self.events.drain()
    }
}
