//! Worker state machine.
//!
//! ```text
//!            move_to                      arrived
//!   Idle ───────────────► MovingToPosition ───────► Idle
//!    │ mine(node)
//!    ▼            arrived + activate ok
//!   MovingToSource ──────────────────────► Mining
//!    │ arrived + refused                      │ leash / rule / job gone
//!    ▼                                        ▼
//!   Idle                                     Idle
//! ```
//!
//! Any path failure forces `Idle`. Every transition goes through
//! [`Worker::transition`], which releases the scheduler job whenever the
//! worker leaves `Mining`; no command or failure path can skip that release.

use crate::event::{EconomyEvent, EventLog, JobEndReason, RejectReason};
use crate::fixed::Ticks;
use crate::geometry::Position;
use crate::id::{NodeId, PathHandle, WorkerId};
use crate::navigation::{Navigator, PathFailure};
use crate::node::NodeGraph;
use crate::scheduler::Scheduler;
use crate::strategy::Ability;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkerState {
    Idle,
    MovingToPosition,
    MovingToSource,
    Mining,
}

/// Collaborators a worker needs to carry out a transition. Built by the
/// economy for each call; the worker never stores them.
pub struct WorkerContext<'a> {
    pub scheduler: &'a mut Scheduler,
    pub nodes: &'a mut NodeGraph,
    pub navigator: &'a mut dyn Navigator,
    pub events: &'a mut EventLog,
    /// Distance at which a worker counts as standing on its mining spot.
    pub arrival_threshold: f64,
    /// Multiplier on `arrival_threshold` before a mining worker is pulled off.
    pub leash_slack: f64,
    pub tick: Ticks,
}

#[derive(Debug)]
pub struct Worker {
    id: WorkerId,
    position: Position,
    state: WorkerState,
    target: Option<NodeId>,
    destination: Option<Position>,
    pending_path: Option<PathHandle>,
    ability: Ability,
}

impl Worker {
    pub fn new(id: WorkerId, position: Position, ability: Ability) -> Self {
        Self {
            id,
            position,
            state: WorkerState::Idle,
            target: None,
            destination: None,
            pending_path: None,
            ability,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Host-driven position update (the unit was pushed, or is mid-path).
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn pending_path(&self) -> Option<PathHandle> {
        self.pending_path
    }

    pub fn ability(&self) -> &Ability {
        &self.ability
    }

    pub(crate) fn ability_mut(&mut self) -> &mut Ability {
        &mut self.ability
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Walk to `position`, dropping whatever the worker was doing.
    pub fn move_to(&mut self, position: Position, ctx: &mut WorkerContext<'_>) {
        self.transition(WorkerState::MovingToPosition, ctx);
        self.cancel_path(ctx);
        self.target = None;
        self.destination = Some(position);
        self.pending_path = Some(ctx.navigator.request_move(self.id, position));
    }

    /// Walk to `node`'s mining spot and start mining on arrival.
    ///
    /// A missing or invalid target is rejected: the worker keeps its current
    /// state and `false` is returned.
    pub fn mine(&mut self, node: Option<NodeId>, ctx: &mut WorkerContext<'_>) -> bool {
        let Some(node) = node else {
            tracing::warn!(worker = ?self.id, "mine command without a target");
            self.reject(RejectReason::NoTarget, ctx);
            return false;
        };
        if !ctx.nodes.is_targetable(node) {
            tracing::warn!(worker = ?self.id, node = ?node, "mine command with invalid target");
            self.reject(RejectReason::InvalidTarget, ctx);
            return false;
        }
        let Some(spot) = ctx.nodes.closest_mining_spot(node, self.position) else {
            self.reject(RejectReason::InvalidTarget, ctx);
            return false;
        };

        self.transition(WorkerState::MovingToSource, ctx);
        self.cancel_path(ctx);
        self.target = Some(node);
        self.destination = Some(spot.position);
        self.pending_path = Some(ctx.navigator.request_move(self.id, spot.position));
        true
    }

    fn reject(&self, reason: RejectReason, ctx: &mut WorkerContext<'_>) {
        ctx.events.emit(EconomyEvent::CommandRejected {
            worker: self.id,
            reason,
            tick: ctx.tick,
        });
    }

    // -----------------------------------------------------------------------
    // Navigation callbacks
    // -----------------------------------------------------------------------

    /// Returns false when `handle` is not the request this worker is waiting
    /// on (superseded by a later command); such callbacks are ignored.
    pub fn on_arrived(&mut self, handle: PathHandle, ctx: &mut WorkerContext<'_>) -> bool {
        if self.pending_path != Some(handle) {
            return false;
        }
        self.pending_path = None;
        if let Some(destination) = self.destination.take() {
            self.position = destination;
        }

        match self.state {
            WorkerState::MovingToPosition => self.transition(WorkerState::Idle, ctx),
            WorkerState::MovingToSource => self.begin_mining(ctx),
            WorkerState::Idle | WorkerState::Mining => {}
        }
        true
    }

    fn begin_mining(&mut self, ctx: &mut WorkerContext<'_>) {
        let Some(node) = self.target else {
            self.transition(WorkerState::Idle, ctx);
            return;
        };
        if ctx.scheduler.activate(self, node, ctx.nodes) {
            ctx.events.emit(EconomyEvent::JobStarted {
                worker: self.id,
                node,
                tick: ctx.tick,
            });
            self.transition(WorkerState::Mining, ctx);
        } else {
            ctx.events.emit(EconomyEvent::ActivationRefused {
                worker: self.id,
                node,
                tick: ctx.tick,
            });
            self.target = None;
            self.transition(WorkerState::Idle, ctx);
        }
    }

    /// A navigation failure for the pending request forces `Idle` and
    /// releases any job.
    pub fn on_path_failed(
        &mut self,
        handle: PathHandle,
        reason: PathFailure,
        ctx: &mut WorkerContext<'_>,
    ) -> bool {
        if self.pending_path != Some(handle) {
            return false;
        }
        tracing::warn!(worker = ?self.id, %reason, "navigation failed");
        self.pending_path = None;
        ctx.events.emit(EconomyEvent::PathFailed {
            worker: self.id,
            reason,
            tick: ctx.tick,
        });
        self.force_idle(ctx);
        true
    }

    // -----------------------------------------------------------------------
    // Per-frame checks
    // -----------------------------------------------------------------------

    /// Run once per frame. While mining, the worker gives up its job if it
    /// has strayed from the spot, the node is gone, the scheduler no longer
    /// holds its job, or the node's parent stopped and the worker cannot
    /// bypass the rule.
    pub fn update(&mut self, ctx: &mut WorkerContext<'_>) {
        if self.state != WorkerState::Mining {
            return;
        }
        if let Some(reason) = self.mining_break_reason(ctx) {
            tracing::debug!(worker = ?self.id, reason, "leaving mining");
            self.force_idle(ctx);
        }
    }

    fn mining_break_reason(&self, ctx: &WorkerContext<'_>) -> Option<&'static str> {
        let Some(node) = self.target else {
            return Some("no target");
        };
        if !ctx.scheduler.has_job(self.id) {
            return Some("job ended");
        }
        let Some(spot) = ctx.nodes.closest_mining_spot(node, self.position) else {
            return Some("node gone");
        };
        if self.position.distance(&spot.position) > ctx.arrival_threshold * ctx.leash_slack {
            return Some("out of range");
        }
        if !self.ability.can_ignore_parent_rule() && !ctx.nodes.can_start_mining(node) {
            return Some("dependency lost");
        }
        None
    }

    /// Drop every pending activity and return to `Idle`.
    pub fn force_idle(&mut self, ctx: &mut WorkerContext<'_>) {
        self.transition(WorkerState::Idle, ctx);
        self.cancel_path(ctx);
        self.target = None;
        self.destination = None;
    }

    fn cancel_path(&mut self, ctx: &mut WorkerContext<'_>) {
        if let Some(handle) = self.pending_path.take() {
            ctx.navigator.cancel(handle);
        }
    }

    // -----------------------------------------------------------------------
    // Transition
    // -----------------------------------------------------------------------

    /// The only place `state` changes. Leaving `Mining` always releases the
    /// scheduler job; deactivation is a no-op if the scheduler already
    /// dropped it.
    fn transition(&mut self, to: WorkerState, ctx: &mut WorkerContext<'_>) {
        let from = self.state;
        if from == WorkerState::Mining && to != WorkerState::Mining {
            self.release_job(ctx);
        }
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(worker = ?self.id, ?from, ?to, "worker transition");
        ctx.events.emit(EconomyEvent::WorkerStateChanged {
            worker: self.id,
            from,
            to,
            tick: ctx.tick,
        });
    }

    fn release_job(&mut self, ctx: &mut WorkerContext<'_>) {
        if let Some(node) = ctx.scheduler.deactivate(self.id, ctx.nodes) {
            ctx.events.emit(EconomyEvent::JobEnded {
                worker: self.id,
                node,
                reason: JobEndReason::Released,
                tick: ctx.tick,
            });
        }
    }
}
