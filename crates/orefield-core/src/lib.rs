//! Orefield Core -- a tick-based mining economy for RTS-style games.
//!
//! Workers walk to resource nodes, mine them on a fixed tick, and deposit
//! whole units into a shared ledger. Each worker carries an ability that can
//! change what a tick yields or whether it may skip a node's dependency rule.
//!
//! # Tick Settlement
//!
//! Each scheduler tick settles every active job in table order:
//!
//! 1. **Cleanup** -- Drop jobs whose worker or node no longer exists.
//! 2. **Yield** -- Ask the worker's ability for a `(kind, amount)`.
//! 3. **Clamp** -- On special nodes, draw at most the remaining capacity.
//! 4. **Bank** -- Add the job's carried fraction; split into whole units.
//! 5. **Post** -- Add whole units to the ledger.
//! 6. **Deplete** -- End the job and destroy a special node at zero capacity.
//!
//! # Dependency Rule
//!
//! A standard node with a parent may only start while that parent is being
//! mined. Special nodes follow their host. Abilities may opt out.
//!
//! # Key Types
//!
//! - [`economy::Economy`] -- Host-facing façade; owns everything below.
//! - [`node::NodeGraph`] -- Standard and special resource nodes.
//! - [`worker::Worker`] -- Per-worker state machine driven by commands and
//!   navigation callbacks.
//! - [`scheduler::Scheduler`] -- The job table and tick settlement.
//! - [`strategy::Ability`] -- Plain mining or a [`strategy::YieldStrategy`].
//! - [`ledger::Ledger`] -- Whole-unit totals per resource kind.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for exact accounting.

pub mod abilities;
pub mod config;
pub mod economy;
pub mod event;
pub mod fixed;
pub mod geometry;
pub mod id;
pub mod ledger;
pub mod navigation;
pub mod node;
pub mod pricing;
pub mod query;
pub mod resource;
pub mod rng;
pub mod scheduler;
pub mod sim;
pub mod strategy;
pub mod worker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
