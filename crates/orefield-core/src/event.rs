//! Buffered economy events.
//!
//! Events are appended as the economy runs and handed to the host in batch
//! via [`EventLog::drain`]. They are a read-only record: nothing in the
//! simulation reads them back.
//!
//! Kinds can be suppressed; a suppressed kind is never buffered. The buffer
//! has a fixed capacity: once full, each new event evicts the oldest one and
//! the eviction is counted in [`EventLog::dropped_count`].

use crate::fixed::Ticks;
use crate::id::{NodeId, WorkerId};
use crate::navigation::PathFailure;
use crate::resource::ResourceKind;
use crate::worker::WorkerState;
use std::collections::VecDeque;

/// Capacity used when none is configured.
pub const DEFAULT_EVENT_CAPACITY: usize = 4096;

/// Why a job left the scheduler's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobEndReason {
    /// The worker gave the job up (new command, leash break, path failure, despawn).
    Released,
    /// The special node ran out of capacity.
    Depleted,
    /// The worker or node vanished; dropped during tick cleanup.
    Stale,
}

/// Why a host command was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// `mine` was issued without a target.
    NoTarget,
    /// The target does not exist or is still hidden.
    InvalidTarget,
}

/// An economy event. All events carry the scheduler tick at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum EconomyEvent {
    JobStarted {
        worker: WorkerId,
        node: NodeId,
        tick: Ticks,
    },
    JobEnded {
        worker: WorkerId,
        node: NodeId,
        reason: JobEndReason,
        tick: Ticks,
    },
    ActivationRefused {
        worker: WorkerId,
        node: NodeId,
        tick: Ticks,
    },
    ResourcesSettled {
        worker: WorkerId,
        node: NodeId,
        kind: ResourceKind,
        amount: u32,
        tick: Ticks,
    },
    NodeDepleted {
        node: NodeId,
        tick: Ticks,
    },
    WorkerStateChanged {
        worker: WorkerId,
        from: WorkerState,
        to: WorkerState,
        tick: Ticks,
    },
    CommandRejected {
        worker: WorkerId,
        reason: RejectReason,
        tick: Ticks,
    },
    PathFailed {
        worker: WorkerId,
        reason: PathFailure,
        tick: Ticks,
    },
    SpecialsRevealed {
        worker: WorkerId,
        count: usize,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    JobStarted,
    JobEnded,
    ActivationRefused,
    ResourcesSettled,
    NodeDepleted,
    WorkerStateChanged,
    CommandRejected,
    PathFailed,
    SpecialsRevealed,
}

const EVENT_KIND_COUNT: usize = 9;

impl EconomyEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EconomyEvent::JobStarted { .. } => EventKind::JobStarted,
            EconomyEvent::JobEnded { .. } => EventKind::JobEnded,
            EconomyEvent::ActivationRefused { .. } => EventKind::ActivationRefused,
            EconomyEvent::ResourcesSettled { .. } => EventKind::ResourcesSettled,
            EconomyEvent::NodeDepleted { .. } => EventKind::NodeDepleted,
            EconomyEvent::WorkerStateChanged { .. } => EventKind::WorkerStateChanged,
            EconomyEvent::CommandRejected { .. } => EventKind::CommandRejected,
            EconomyEvent::PathFailed { .. } => EventKind::PathFailed,
            EconomyEvent::SpecialsRevealed { .. } => EventKind::SpecialsRevealed,
        }
    }
}

#[derive(Debug)]
pub struct EventLog {
    events: VecDeque<EconomyEvent>,
    capacity: usize,
    suppressed: [bool; EVENT_KIND_COUNT],
    total_written: u64,
    dropped: u64,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding at most `capacity` events. Zero is clamped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_EVENT_CAPACITY)),
            capacity,
            suppressed: [false; EVENT_KIND_COUNT],
            total_written: 0,
            dropped: 0,
        }
    }

    pub fn emit(&mut self, event: EconomyEvent) {
        if self.suppressed[event.kind() as usize] {
            return;
        }
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
        self.total_written += 1;
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind as usize] = true;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind as usize] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind as usize]
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events accepted since creation, including evicted ones.
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Events evicted because the buffer was full.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Buffered events, oldest first.
    pub fn pending(&self) -> &VecDeque<EconomyEvent> {
        &self.events
    }

    /// Take every buffered event, oldest first.
    pub fn drain(&mut self) -> Vec<EconomyEvent> {
        self.events.drain(..).collect()
    }
}
