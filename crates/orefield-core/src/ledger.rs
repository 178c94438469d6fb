//! Flat per-kind resource counters.
//!
//! The ledger stores whole units only. Fractional yield never reaches it; the
//! scheduler banks remainders per job and posts whole units as they accrue.
//! Inside an [`Economy`](crate::economy::Economy) the scheduler is the only
//! writer; hosts get a shared reference.

use crate::resource::{RESOURCE_KIND_COUNT, ResourceKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    counts: [u32; RESOURCE_KIND_COUNT],
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` units of `kind` and return how many were actually
    /// credited. Saturates at `u32::MAX`; clipped units are logged.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let slot = &mut self.counts[kind.index()];
        let credited = amount.min(u32::MAX - *slot);
        *slot += credited;
        if credited < amount {
            tracing::warn!(
                ?kind,
                requested = amount,
                credited,
                dropped = amount - credited,
                "ledger counter saturated; units dropped"
            );
        }
        credited
    }

    pub fn total(&self, kind: ResourceKind) -> u32 {
        self.counts[kind.index()]
    }

    /// Sum across every kind.
    pub fn grand_total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// `(kind, count)` pairs in discriminant order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        ResourceKind::ALL.iter().map(|&k| (k, self.total(k)))
    }
}
