//! Build-cost table with worker-sourced discounts.
//!
//! Some abilities register a discount here when they are bound to a worker.
//! Discounts do not stack: the largest active one applies.

use crate::fixed::Fixed64;
use fixed::types::I64F64;
use crate::id::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceBook {
    base_costs: BTreeMap<String, u32>,
    discounts: Vec<(WorkerId, Fixed64)>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_base_cost(&mut self, name: impl Into<String>, cost: u32) {
        self.base_costs.insert(name.into(), cost);
    }

    pub fn base_cost(&self, name: &str) -> Option<u32> {
        self.base_costs.get(name).copied()
    }

    /// Register a fractional discount (0.25 = 25% off) owned by `source`.
    /// Re-registering from the same source replaces its previous discount.
    pub fn register_discount(&mut self, source: WorkerId, fraction: Fixed64) {
        let fraction = fraction.clamp(Fixed64::ZERO, Fixed64::ONE);
        match self.discounts.iter_mut().find(|(s, _)| *s == source) {
            Some(entry) => entry.1 = fraction,
            None => self.discounts.push((source, fraction)),
        }
    }

    /// Drop any discount registered by `source`.
    pub fn unregister_source(&mut self, source: WorkerId) {
        self.discounts.retain(|(s, _)| *s != source);
    }

    /// The largest active discount, or zero.
    pub fn active_discount(&self) -> Fixed64 {
        self.discounts
            .iter()
            .map(|&(_, f)| f)
            .max()
            .unwrap_or(Fixed64::ZERO)
    }

    /// Discounted cost, rounded up to a whole unit.
    ///
    /// Computed in Q64.64 so every `u32` base cost is representable.
    pub fn price(&self, name: &str) -> Option<u32> {
        let base = I64F64::from_num(self.base_cost(name)?);
        let keep = I64F64::from_num(Fixed64::ONE - self.active_discount());
        let cost = (base * keep).ceil();
        Some(cost.saturating_to_num::<u32>())
    }
}
