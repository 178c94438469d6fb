//! Per-worker yield strategies.
//!
//! A worker carries an [`Ability`]: either [`Ability::Plain`], which mines a
//! node's base kind at its base rate, or [`Ability::Custom`] wrapping one
//! [`YieldStrategy`] trait object chosen at spawn time. Strategies replace
//! each other; they never stack.
//!
//! The scheduler consults the ability twice:
//! - on activation, to see whether the worker may ignore the parent rule;
//! - on every tick, to compute the `(kind, amount)` the tick produces.

use crate::fixed::{Fixed64, Ticks};
use crate::id::WorkerId;
use crate::ledger::Ledger;
use crate::node::{NodeGraph, ResourceNode};
use crate::pricing::PriceBook;
use crate::resource::ResourceKind;

// ---------------------------------------------------------------------------
// Yield
// ---------------------------------------------------------------------------

/// What one tick produces, before capacity clamping and banking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Yield {
    pub kind: ResourceKind,
    pub amount: Fixed64,
}

impl Yield {
    pub fn new(kind: ResourceKind, amount: Fixed64) -> Self {
        Self { kind, amount }
    }

    /// The node's own kind at its base rate.
    pub fn base(node: &ResourceNode) -> Self {
        Self::new(node.kind(), node.base_yield_per_tick())
    }
}

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// Read-only view handed to [`YieldStrategy::process_tick`].
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub ledger: &'a Ledger,
    pub tick: Ticks,
}

/// Mutable access to external systems for the one-time attach hook.
pub struct AttachContext<'a> {
    pub worker: WorkerId,
    pub nodes: &'a mut NodeGraph,
    pub pricing: &'a mut PriceBook,
    /// Set by hooks that reveal hidden specials; reported as an event.
    pub revealed_specials: usize,
}

// ---------------------------------------------------------------------------
// YieldStrategy trait
// ---------------------------------------------------------------------------

pub trait YieldStrategy: std::fmt::Debug + Send {
    /// Human-readable name, used in snapshots and logs.
    fn name(&self) -> &str;

    /// Whether the worker may mine a node whose parent is not being mined.
    fn can_ignore_parent_rule(&self) -> bool {
        false
    }

    /// Compute this tick's yield for `node`. The default mines the node's
    /// base kind at its base rate.
    fn process_tick(&mut self, node: &ResourceNode, ctx: &TickContext<'_>) -> Yield {
        let _ = ctx;
        Yield::base(node)
    }

    /// Runs exactly once, when the strategy is bound to its worker.
    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) {
        let _ = ctx;
    }
}

// ---------------------------------------------------------------------------
// Ability
// ---------------------------------------------------------------------------

/// The worker's yield policy.
#[derive(Debug, Default)]
pub enum Ability {
    /// No strategy: base kind, base rate, parent rule enforced.
    #[default]
    Plain,
    Custom(Box<dyn YieldStrategy>),
}

impl Ability {
    pub fn custom(strategy: impl YieldStrategy + 'static) -> Self {
        Ability::Custom(Box::new(strategy))
    }

    pub fn name(&self) -> &str {
        match self {
            Ability::Plain => "plain",
            Ability::Custom(s) => s.name(),
        }
    }

    pub fn can_ignore_parent_rule(&self) -> bool {
        match self {
            Ability::Plain => false,
            Ability::Custom(s) => s.can_ignore_parent_rule(),
        }
    }

    pub fn process_tick(&mut self, node: &ResourceNode, ctx: &TickContext<'_>) -> Yield {
        match self {
            Ability::Plain => Yield::base(node),
            Ability::Custom(s) => s.process_tick(node, ctx),
        }
    }

    pub(crate) fn on_attach(&mut self, ctx: &mut AttachContext<'_>) {
        if let Ability::Custom(s) = self {
            s.on_attach(ctx);
        }
    }
}
