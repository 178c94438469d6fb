//! Fixed-interval clock state and per-advance results.
//!
//! The host calls `Economy::advance(dt)` every frame with elapsed wall time.
//! Time accumulates here and the scheduler runs one tick per full
//! `tick_interval`, carrying the remainder forward. `Economy::step()` runs
//! exactly one tick regardless of the accumulator.

use crate::fixed::Ticks;
use crate::id::NodeId;
use crate::scheduler::{EndedJob, TickReport};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimState {
    /// Scheduler ticks run so far.
    pub tick: Ticks,

    /// Wall time not yet consumed by a tick. Always below the tick interval
    /// after an `advance`.
    pub accumulator: Duration,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dt` and return how many whole intervals are now due, consuming
    /// them from the accumulator.
    pub fn accumulate(&mut self, dt: Duration, interval: Duration) -> u64 {
        if interval.is_zero() {
            return 0;
        }
        self.accumulator = self.accumulator.saturating_add(dt);
        let mut due = 0;
        while self.accumulator >= interval {
            self.accumulator -= interval;
            due += 1;
        }
        due
    }
}

// ---------------------------------------------------------------------------
// Advance result
// ---------------------------------------------------------------------------

/// What happened during one `advance()` or `step()` call.
#[derive(Debug, Default)]
pub struct AdvanceResult {
    /// Scheduler ticks executed.
    pub steps_run: u64,

    /// Whole units posted to the ledger across all ticks.
    pub units_posted: u64,

    /// Special nodes destroyed by depletion.
    pub depleted: Vec<NodeId>,

    /// Jobs that left the scheduler during the ticks (depletion or stale).
    pub ended: Vec<EndedJob>,
}

impl AdvanceResult {
    pub(crate) fn absorb(&mut self, report: TickReport) {
        self.steps_run += 1;
        self.units_posted += report.units_posted;
        self.depleted.extend(report.depleted);
        self.ended.extend(report.ended);
    }
}
