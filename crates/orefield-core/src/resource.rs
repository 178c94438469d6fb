use serde::{Deserialize, Serialize};

/// The kind of resource a node yields and the ledger counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Tier1,
    Tier2,
    Tier3,
    Tier4,
    Special,
}

/// Number of resource kinds.
pub const RESOURCE_KIND_COUNT: usize = 5;

impl ResourceKind {
    /// Every kind, in discriminant order.
    pub const ALL: [ResourceKind; RESOURCE_KIND_COUNT] = [
        ResourceKind::Tier1,
        ResourceKind::Tier2,
        ResourceKind::Tier3,
        ResourceKind::Tier4,
        ResourceKind::Special,
    ];

    /// The ordinary (non-special) kinds. Kind-substituting strategies draw from these.
    pub const ORDINARY: [ResourceKind; 4] = [
        ResourceKind::Tier1,
        ResourceKind::Tier2,
        ResourceKind::Tier3,
        ResourceKind::Tier4,
    ];

    /// Array index for counter tables.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Whether this is the bonus resource produced by special nodes.
    pub fn is_special(self) -> bool {
        self == ResourceKind::Special
    }
}
