//! The job table: who is mining what, and what each tick settles.
//!
//! The scheduler is the single writer of node mining flags, special-node
//! capacity and the ledger. Workers only ask it to activate or deactivate
//! their own job.
//!
//! # Tick settlement
//!
//! For every job, in table order:
//! 1. drop the job if its worker or node is gone;
//! 2. ask the worker's ability for `(kind, amount)`;
//! 3. on special nodes, clamp to remaining capacity and subtract;
//! 4. add the job's banked remainder, split into whole units and a new remainder;
//! 5. post whole units to the ledger;
//! 6. if the special hit zero, end the job and destroy the node.
//!
//! # Shared nodes
//!
//! Several workers may mine the same node. Jobs are settled in table order,
//! so on a shared special node the earlier job draws first and may leave the
//! later one nothing. A node's mining flag is cleared only when its last job
//! ends.

use crate::fixed::{Fixed64, Ticks, split_whole};
use crate::id::{JobId, NodeId, WorkerId};
use crate::event::{EconomyEvent, EventLog, JobEndReason};
use crate::ledger::Ledger;
use crate::node::{NodeGraph, ResourceNode};
use crate::strategy::TickContext;
use crate::worker::Worker;
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};

// ---------------------------------------------------------------------------
// Job
// ---------------------------------------------------------------------------

/// One worker bound to one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningJob {
    pub worker: WorkerId,
    pub node: NodeId,
    /// Fractional yield carried between ticks. Always in `[0, 1)`.
    pub banked_remainder: Fixed64,
}

/// A job that left the table during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndedJob {
    pub worker: WorkerId,
    pub node: NodeId,
    pub reason: JobEndReason,
}

/// Summary of one scheduler tick.
#[derive(Debug, Default)]
pub struct TickReport {
    /// Jobs that were settled (not dropped) this tick.
    pub jobs_settled: usize,
    /// Whole units posted to the ledger this tick.
    pub units_posted: u64,
    pub ended: Vec<EndedJob>,
    pub depleted: Vec<NodeId>,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Scheduler {
    jobs: SlotMap<JobId, MiningJob>,
    by_worker: SecondaryMap<WorkerId, JobId>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            jobs: SlotMap::with_key(),
            by_worker: SecondaryMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Activation
    // -----------------------------------------------------------------------

    /// Try to start a job for `worker` on `node`.
    ///
    /// Refused (returns false, nothing mutated) when the worker already owns
    /// a job, the node is missing or already depleted, or the dependency rule
    /// fails and the worker's ability cannot bypass it.
    pub fn activate(&mut self, worker: &Worker, node: NodeId, nodes: &mut NodeGraph) -> bool {
        let worker_id = worker.id();
        if self.by_worker.contains_key(worker_id) {
            tracing::debug!(worker = ?worker_id, node = ?node, "activation refused: worker already has a job");
            return false;
        }
        let Some(target) = nodes.get(node) else {
            return false;
        };
        if target.is_depleted() {
            return false;
        }
        let bypass = worker.ability().can_ignore_parent_rule();
        if !bypass && !nodes.can_start_mining(node) {
            tracing::debug!(worker = ?worker_id, node = ?node, "activation refused: parent not mining");
            return false;
        }

        nodes.start_mining(node);
        let job = self.jobs.insert(MiningJob {
            worker: worker_id,
            node,
            banked_remainder: Fixed64::ZERO,
        });
        self.by_worker.insert(worker_id, job);
        tracing::debug!(worker = ?worker_id, node = ?node, bypass, "job activated");
        true
    }

    /// End `worker`'s job, if any, and return the node it was mining. Safe
    /// when the node has already been destroyed. Any banked remainder is
    /// discarded.
    pub fn deactivate(&mut self, worker: WorkerId, nodes: &mut NodeGraph) -> Option<NodeId> {
        let job_id = self.by_worker.remove(worker)?;
        let job = self.jobs.remove(job_id)?;
        self.release_node(job.node, nodes);
        tracing::debug!(worker = ?worker, node = ?job.node, "job deactivated");
        Some(job.node)
    }

    /// Clear the node's mining flag unless another job still holds it.
    fn release_node(&self, node: NodeId, nodes: &mut NodeGraph) {
        if !self.jobs.values().any(|j| j.node == node) {
            nodes.stop_mining(node);
        }
    }

    fn remove_job(&mut self, job_id: JobId) -> Option<MiningJob> {
        let job = self.jobs.remove(job_id)?;
        if self.by_worker.get(job.worker) == Some(&job_id) {
            self.by_worker.remove(job.worker);
        }
        Some(job)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn job_for(&self, worker: WorkerId) -> Option<&MiningJob> {
        self.by_worker.get(worker).and_then(|&id| self.jobs.get(id))
    }

    pub fn has_job(&self, worker: WorkerId) -> bool {
        self.by_worker.contains_key(worker)
    }

    /// Number of jobs currently mining `node`.
    pub fn jobs_on(&self, node: NodeId) -> usize {
        self.jobs.values().filter(|j| j.node == node).count()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs in table (settlement) order.
    pub fn iter(&self) -> impl Iterator<Item = (JobId, &MiningJob)> {
        self.jobs.iter()
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Settle one tick for every active job.
    pub fn tick(
        &mut self,
        workers: &mut SlotMap<WorkerId, Worker>,
        nodes: &mut NodeGraph,
        ledger: &mut Ledger,
        events: &mut EventLog,
        tick: Ticks,
    ) -> TickReport {
        let mut report = TickReport::default();

        // Collect IDs up front; jobs may be removed mid-iteration.
        let job_ids: Vec<JobId> = self.jobs.keys().collect();

        for job_id in job_ids {
            let Some(job) = self.jobs.get(job_id) else {
                continue;
            };
            let (worker_id, node_id) = (job.worker, job.node);

            // Step 1 + 2: stale check, then ask the ability.
            let produced = match (workers.get_mut(worker_id), nodes.get(node_id)) {
                (Some(worker), Some(node)) => {
                    let ctx = TickContext {
                        ledger: &*ledger,
                        tick,
                    };
                    worker.ability_mut().process_tick(node, &ctx)
                }
                _ => {
                    self.remove_job(job_id);
                    self.release_node(node_id, nodes);
                    tracing::debug!(worker = ?worker_id, node = ?node_id, "dropping stale job");
                    report.ended.push(EndedJob {
                        worker: worker_id,
                        node: node_id,
                        reason: JobEndReason::Stale,
                    });
                    events.emit(EconomyEvent::JobEnded {
                        worker: worker_id,
                        node: node_id,
                        reason: JobEndReason::Stale,
                        tick,
                    });
                    continue;
                }
            };

            // Step 3: capacity clamp.
            let mut amount = produced.amount.max(Fixed64::ZERO);
            let mut depleted = false;
            if let Some(ResourceNode::Special(special)) = nodes.get_mut(node_id) {
                amount = special.draw(amount);
                depleted = special.remaining_capacity() <= Fixed64::ZERO;
            }

            // Step 4: banking.
            let Some(job) = self.jobs.get_mut(job_id) else {
                continue;
            };
            let (whole, remainder) = split_whole(amount.saturating_add(job.banked_remainder));
            job.banked_remainder = remainder;
            report.jobs_settled += 1;

            // Step 5: post.
            if whole > 0 {
                report.units_posted += ledger.add(produced.kind, whole) as u64;
                events.emit(EconomyEvent::ResourcesSettled {
                    worker: worker_id,
                    node: node_id,
                    kind: produced.kind,
                    amount: whole,
                    tick,
                });
            }

            // Step 6: depletion.
            if depleted {
                self.remove_job(job_id);
                nodes.stop_mining(node_id);
                nodes.remove(node_id);
                tracing::info!(node = ?node_id, worker = ?worker_id, tick, "special node depleted");
                report.depleted.push(node_id);
                report.ended.push(EndedJob {
                    worker: worker_id,
                    node: node_id,
                    reason: JobEndReason::Depleted,
                });
                events.emit(EconomyEvent::JobEnded {
                    worker: worker_id,
                    node: node_id,
                    reason: JobEndReason::Depleted,
                    tick,
                });
                events.emit(EconomyEvent::NodeDepleted {
                    node: node_id,
                    tick,
                });
            }
        }

        report
    }
}
