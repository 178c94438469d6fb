//! Read-only snapshots of economy state.
//!
//! All types are owned copies with no references into internal storage, so
//! they can be handed to rendering or UI code freely.

use crate::fixed::Fixed64;
use crate::geometry::Position;
use crate::id::{NodeId, WorkerId};
use crate::ledger::Ledger;
use crate::node::{NodeGraph, ResourceNode};
use crate::resource::{RESOURCE_KIND_COUNT, ResourceKind};
use crate::scheduler::Scheduler;
use crate::worker::{Worker, WorkerState};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Node snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub kind: ResourceKind,
    pub base_yield_per_tick: Fixed64,
    pub position: Position,
    pub is_mining: bool,
    pub is_special: bool,
    /// `None` for standard nodes.
    pub remaining_capacity: Option<Fixed64>,
    pub parent: Option<NodeId>,
    /// The special riding on a standard node, or the host of a special.
    pub attachment: Option<NodeId>,
    pub hidden: bool,
    pub depleted: bool,
    /// Whether the dependency rule currently allows a new job here.
    pub can_start: bool,
    /// Jobs currently bound to this node.
    pub active_jobs: usize,
}

impl NodeSnapshot {
    pub(crate) fn capture(
        id: NodeId,
        node: &ResourceNode,
        nodes: &NodeGraph,
        scheduler: &Scheduler,
    ) -> Self {
        let (parent, attachment, hidden) = match node {
            ResourceNode::Standard(n) => (n.parent, n.attached_special, false),
            ResourceNode::Special(n) => (None, Some(n.attached_standard), n.hidden),
        };
        Self {
            id,
            kind: node.kind(),
            base_yield_per_tick: node.base_yield_per_tick(),
            position: node.position(),
            is_mining: node.is_mining(),
            is_special: node.is_special(),
            remaining_capacity: node.remaining_capacity(),
            parent,
            attachment,
            hidden,
            depleted: node.is_depleted(),
            can_start: nodes.can_start_mining(id),
            active_jobs: scheduler.jobs_on(id),
        }
    }
}

// ---------------------------------------------------------------------------
// Worker snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub state: WorkerState,
    pub target: Option<NodeId>,
    pub position: Position,
    pub ability: String,
    pub bypasses_parent_rule: bool,
    /// Fractional yield banked on the worker's job, zero when not mining.
    pub banked_remainder: Fixed64,
}

impl WorkerSnapshot {
    pub(crate) fn capture(worker: &Worker, scheduler: &Scheduler) -> Self {
        Self {
            id: worker.id(),
            state: worker.state(),
            target: worker.target(),
            position: worker.position(),
            ability: worker.ability().name().to_owned(),
            bypasses_parent_rule: worker.ability().can_ignore_parent_rule(),
            banked_remainder: scheduler
                .job_for(worker.id())
                .map_or(Fixed64::ZERO, |job| job.banked_remainder),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerSnapshot {
    pub totals: [(ResourceKind, u32); RESOURCE_KIND_COUNT],
    pub grand_total: u64,
}

impl LedgerSnapshot {
    pub(crate) fn capture(ledger: &Ledger) -> Self {
        Self {
            totals: ResourceKind::ALL.map(|kind| (kind, ledger.total(kind))),
            grand_total: ledger.grand_total(),
        }
    }

    pub fn total(&self, kind: ResourceKind) -> u32 {
        self.totals
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |&(_, n)| n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{SpecialNodeDef, StandardNodeDef};

    #[test]
    fn node_snapshot_reflects_links() {
        let mut nodes = NodeGraph::new();
        let root = nodes
            .add_standard(StandardNodeDef::new(ResourceKind::Tier1, 1.0, Position::default()))
            .unwrap();
        let child = nodes
            .add_child(root, StandardNodeDef::new(ResourceKind::Tier2, 1.0, Position::new(1.0, 0.0)))
            .unwrap();
        let special = nodes.attach_special(root, SpecialNodeDef::new(0.5, 4.0)).unwrap();
        let scheduler = Scheduler::new();

        let snap = NodeSnapshot::capture(child, nodes.get(child).unwrap(), &nodes, &scheduler);
        assert_eq!(snap.parent, Some(root));
        assert!(!snap.can_start);
        assert_eq!(snap.remaining_capacity, None);

        let snap = NodeSnapshot::capture(root, nodes.get(root).unwrap(), &nodes, &scheduler);
        assert_eq!(snap.attachment, Some(special));
        assert!(snap.can_start);

        let snap = NodeSnapshot::capture(special, nodes.get(special).unwrap(), &nodes, &scheduler);
        assert!(snap.is_special);
        assert_eq!(snap.attachment, Some(root));
        assert_eq!(snap.remaining_capacity, Some(Fixed64::from_num(4)));
        assert!(!snap.depleted);
    }

    #[test]
    fn ledger_snapshot_totals() {
        let mut ledger = Ledger::new();
        ledger.add(ResourceKind::Tier3, 7);
        ledger.add(ResourceKind::Special, 2);
        let snap = LedgerSnapshot::capture(&ledger);
        assert_eq!(snap.total(ResourceKind::Tier3), 7);
        assert_eq!(snap.total(ResourceKind::Tier1), 0);
        assert_eq!(snap.grand_total, 9);
    }
}
