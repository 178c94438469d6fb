//! Concrete [`YieldStrategy`] implementations.

use crate::fixed::{Fixed64, saturating_f64_to_fixed64};
use crate::node::ResourceNode;
use crate::resource::ResourceKind;
use crate::rng::SimRng;
use crate::strategy::{AttachContext, TickContext, Yield, YieldStrategy};

/// Multiplies every tick's amount by a constant factor.
#[derive(Debug, Clone)]
pub struct Multiplier {
    pub factor: Fixed64,
}

impl Multiplier {
    pub fn new(factor: f64) -> Self {
        Self {
            factor: saturating_f64_to_fixed64(factor.max(0.0)),
        }
    }
}

impl YieldStrategy for Multiplier {
    fn name(&self) -> &str {
        "multiplier"
    }

    fn process_tick(&mut self, node: &ResourceNode, _ctx: &TickContext<'_>) -> Yield {
        let base = Yield::base(node);
        Yield::new(base.kind, base.amount.saturating_mul(self.factor))
    }
}

/// Adds a flat amount to every tick.
#[derive(Debug, Clone)]
pub struct FlatBonus {
    pub bonus: Fixed64,
}

impl FlatBonus {
    pub fn new(bonus: f64) -> Self {
        Self {
            bonus: saturating_f64_to_fixed64(bonus.max(0.0)),
        }
    }
}

impl YieldStrategy for FlatBonus {
    fn name(&self) -> &str {
        "flat-bonus"
    }

    fn process_tick(&mut self, node: &ResourceNode, _ctx: &TickContext<'_>) -> Yield {
        let base = Yield::base(node);
        Yield::new(base.kind, base.amount.saturating_add(self.bonus))
    }
}

/// Scales yield with the ledger's current Special total:
/// `amount * (1 + per_special * special_total)`. A feedback loop: the more
/// special resource banked, the faster this worker mines.
#[derive(Debug, Clone)]
pub struct LedgerScaling {
    pub per_special: Fixed64,
}

impl LedgerScaling {
    pub fn new(per_special: f64) -> Self {
        Self {
            per_special: saturating_f64_to_fixed64(per_special.max(0.0)),
        }
    }
}

impl YieldStrategy for LedgerScaling {
    fn name(&self) -> &str {
        "ledger-scaling"
    }

    fn process_tick(&mut self, node: &ResourceNode, ctx: &TickContext<'_>) -> Yield {
        let base = Yield::base(node);
        let specials = Fixed64::saturating_from_num(ctx.ledger.total(ResourceKind::Special));
        let factor = Fixed64::ONE.saturating_add(self.per_special.saturating_mul(specials));
        Yield::new(base.kind, base.amount.saturating_mul(factor))
    }
}

/// Reports a uniformly random ordinary kind each tick; amount unchanged.
#[derive(Debug, Clone)]
pub struct KindShuffle {
    rng: SimRng,
}

impl KindShuffle {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SimRng::new(seed),
        }
    }
}

impl YieldStrategy for KindShuffle {
    fn name(&self) -> &str {
        "kind-shuffle"
    }

    fn process_tick(&mut self, node: &ResourceNode, _ctx: &TickContext<'_>) -> Yield {
        let kinds = ResourceKind::ORDINARY;
        let kind = kinds[self.rng.next_below(kinds.len())];
        Yield::new(kind, node.base_yield_per_tick())
    }
}

/// Doubles a tick's amount with fixed probability.
#[derive(Debug, Clone)]
pub struct LuckyStrike {
    pub chance: Fixed64,
    rng: SimRng,
}

impl LuckyStrike {
    pub fn new(chance: f64, seed: u64) -> Self {
        Self {
            chance: saturating_f64_to_fixed64(chance).clamp(Fixed64::ZERO, Fixed64::ONE),
            rng: SimRng::new(seed),
        }
    }
}

impl YieldStrategy for LuckyStrike {
    fn name(&self) -> &str {
        "lucky-strike"
    }

    fn process_tick(&mut self, node: &ResourceNode, _ctx: &TickContext<'_>) -> Yield {
        let base = Yield::base(node);
        if self.rng.chance(self.chance) {
            Yield::new(base.kind, base.amount.saturating_mul(Fixed64::from_num(2)))
        } else {
            base
        }
    }
}

/// Multiplies yield only on special nodes.
#[derive(Debug, Clone)]
pub struct SpecialAffinity {
    pub factor: Fixed64,
}

impl SpecialAffinity {
    pub fn new(factor: f64) -> Self {
        Self {
            factor: saturating_f64_to_fixed64(factor.max(0.0)),
        }
    }
}

impl YieldStrategy for SpecialAffinity {
    fn name(&self) -> &str {
        "special-affinity"
    }

    fn process_tick(&mut self, node: &ResourceNode, _ctx: &TickContext<'_>) -> Yield {
        let base = Yield::base(node);
        if node.is_special() {
            Yield::new(base.kind, base.amount.saturating_mul(self.factor))
        } else {
            base
        }
    }
}

/// May mine child nodes whose parent is idle. Yield unchanged.
#[derive(Debug, Clone, Default)]
pub struct ParentBypass;

impl YieldStrategy for ParentBypass {
    fn name(&self) -> &str {
        "parent-bypass"
    }

    fn can_ignore_parent_rule(&self) -> bool {
        true
    }
}

/// Registers a build-cost discount for its worker when attached.
#[derive(Debug, Clone)]
pub struct Bargain {
    pub discount: Fixed64,
}

impl Bargain {
    pub fn new(discount: f64) -> Self {
        Self {
            discount: saturating_f64_to_fixed64(discount).clamp(Fixed64::ZERO, Fixed64::ONE),
        }
    }
}

impl YieldStrategy for Bargain {
    fn name(&self) -> &str {
        "bargain"
    }

    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) {
        ctx.pricing.register_discount(ctx.worker, self.discount);
    }
}

/// Reveals every hidden special node on the map when attached.
#[derive(Debug, Clone, Default)]
pub struct Prospector;

impl YieldStrategy for Prospector {
    fn name(&self) -> &str {
        "prospector"
    }

    fn on_attach(&mut self, ctx: &mut AttachContext<'_>) {
        ctx.revealed_specials += ctx.nodes.reveal_all_specials();
    }
}
