//! The resource node graph.
//!
//! Standard nodes are placed at level load and never deplete; they may name a
//! parent that must be actively mined before they can start. Special nodes ride
//! on exactly one standard node, hold a finite capacity and are destroyed when
//! it runs out.
//!
//! All cross-node links (parent, attachment) are [`NodeId`] keys into the
//! graph's slot map, so a removed node leaves at worst a stale key that fails
//! lookup instead of a dangling owner.

use crate::fixed::{Fixed64, checked_f64_to_fixed64};
use crate::geometry::{MiningSpot, Position, nearest};
use crate::id::NodeId;
use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while building the node graph.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NodeError {
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is not a standard node")]
    NotStandard(NodeId),
    #[error("standard node {standard:?} already carries special node {special:?}")]
    AlreadyAttached { standard: NodeId, special: NodeId },
    #[error("capacity must be finite, non-negative and representable, got {0}")]
    InvalidCapacity(f64),
    #[error("base yield must be finite, non-negative and representable, got {0}")]
    InvalidYield(f64),
}

// ---------------------------------------------------------------------------
// Node variants
// ---------------------------------------------------------------------------

/// A persistent, never-depleting node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardNode {
    pub kind: ResourceKind,
    pub base_yield_per_tick: Fixed64,
    pub position: Position,
    /// Extra places a worker may stand. Empty means "stand on the node".
    pub access_points: Vec<Position>,
    /// Parent that must be mining before this node may start.
    pub parent: Option<NodeId>,
    pub attached_special: Option<NodeId>,
    is_mining: bool,
}

/// A finite bonus node attached to a standard node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialNode {
    pub kind: ResourceKind,
    pub base_yield_per_tick: Fixed64,
    pub position: Position,
    pub attached_standard: NodeId,
    /// Hidden specials are not valid mining targets until revealed.
    pub hidden: bool,
    remaining_capacity: Fixed64,
    is_mining: bool,
}

impl SpecialNode {
    pub fn remaining_capacity(&self) -> Fixed64 {
        self.remaining_capacity
    }

    /// Remove up to `requested` from the capacity and return what was
    /// actually taken. Capacity never goes negative.
    pub(crate) fn draw(&mut self, requested: Fixed64) -> Fixed64 {
        let taken = requested.max(Fixed64::ZERO).min(self.remaining_capacity);
        self.remaining_capacity -= taken;
        taken
    }
}

/// A node in the mining graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResourceNode {
    Standard(StandardNode),
    Special(SpecialNode),
}

impl ResourceNode {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceNode::Standard(n) => n.kind,
            ResourceNode::Special(n) => n.kind,
        }
    }

    pub fn base_yield_per_tick(&self) -> Fixed64 {
        match self {
            ResourceNode::Standard(n) => n.base_yield_per_tick,
            ResourceNode::Special(n) => n.base_yield_per_tick,
        }
    }

    pub fn is_mining(&self) -> bool {
        match self {
            ResourceNode::Standard(n) => n.is_mining,
            ResourceNode::Special(n) => n.is_mining,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ResourceNode::Standard(n) => n.position,
            ResourceNode::Special(n) => n.position,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, ResourceNode::Special(_))
    }

    pub fn as_special(&self) -> Option<&SpecialNode> {
        match self {
            ResourceNode::Special(n) => Some(n),
            ResourceNode::Standard(_) => None,
        }
    }

    /// Remaining capacity for special nodes; `None` for inexhaustible nodes.
    pub fn remaining_capacity(&self) -> Option<Fixed64> {
        self.as_special().map(SpecialNode::remaining_capacity)
    }

    /// Standard nodes never deplete.
    pub fn is_depleted(&self) -> bool {
        match self {
            ResourceNode::Standard(_) => false,
            ResourceNode::Special(n) => n.remaining_capacity <= Fixed64::ZERO,
        }
    }

    /// Where a worker coming from `from` should stand.
    pub fn closest_mining_spot(&self, from: Position) -> MiningSpot {
        let position = match self {
            ResourceNode::Standard(n) => nearest(from, &n.access_points).unwrap_or(n.position),
            ResourceNode::Special(n) => n.position,
        };
        MiningSpot { position }
    }

    // Mining flag mutators are crate-private: only the scheduler flips them.

    pub(crate) fn start_mining(&mut self) {
        match self {
            ResourceNode::Standard(n) => n.is_mining = true,
            ResourceNode::Special(n) => n.is_mining = true,
        }
    }

    pub(crate) fn stop_mining(&mut self) {
        match self {
            ResourceNode::Standard(n) => n.is_mining = false,
            ResourceNode::Special(n) => n.is_mining = false,
        }
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// Construction parameters for a standard node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardNodeDef {
    pub kind: ResourceKind,
    pub base_yield_per_tick: f64,
    pub position: Position,
    #[serde(default)]
    pub access_points: Vec<Position>,
}

impl StandardNodeDef {
    pub fn new(kind: ResourceKind, base_yield_per_tick: f64, position: Position) -> Self {
        Self {
            kind,
            base_yield_per_tick,
            position,
            access_points: Vec::new(),
        }
    }

    pub fn with_access_points(mut self, points: Vec<Position>) -> Self {
        self.access_points = points;
        self
    }
}

/// Construction parameters for a special node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialNodeDef {
    #[serde(default = "default_special_kind")]
    pub kind: ResourceKind,
    pub base_yield_per_tick: f64,
    pub capacity: f64,
    /// Defaults to the host node's position.
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub hidden: bool,
}

fn default_special_kind() -> ResourceKind {
    ResourceKind::Special
}

impl SpecialNodeDef {
    pub fn new(base_yield_per_tick: f64, capacity: f64) -> Self {
        Self {
            kind: ResourceKind::Special,
            base_yield_per_tick,
            capacity,
            position: None,
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

fn checked_yield(v: f64) -> Result<Fixed64, NodeError> {
    match checked_f64_to_fixed64(v) {
        Some(fixed) if fixed >= Fixed64::ZERO => Ok(fixed),
        _ => Err(NodeError::InvalidYield(v)),
    }
}

fn checked_capacity(v: f64) -> Result<Fixed64, NodeError> {
    match checked_f64_to_fixed64(v) {
        Some(fixed) if fixed >= Fixed64::ZERO => Ok(fixed),
        _ => Err(NodeError::InvalidCapacity(v)),
    }
}

// ---------------------------------------------------------------------------
// NodeGraph
// ---------------------------------------------------------------------------

/// Owns every resource node and answers the dependency-rule query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeGraph {
    nodes: SlotMap<NodeId, ResourceNode>,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Place a root standard node.
    pub fn add_standard(&mut self, def: StandardNodeDef) -> Result<NodeId, NodeError> {
        self.insert_standard(def, None)
    }

    /// Place a standard node gated on `parent`.
    pub fn add_child(&mut self, parent: NodeId, def: StandardNodeDef) -> Result<NodeId, NodeError> {
        match self.nodes.get(parent).map(ResourceNode::is_special) {
            Some(false) => self.insert_standard(def, Some(parent)),
            Some(true) => Err(NodeError::NotStandard(parent)),
            None => Err(NodeError::NodeNotFound(parent)),
        }
    }

    fn insert_standard(
        &mut self,
        def: StandardNodeDef,
        parent: Option<NodeId>,
    ) -> Result<NodeId, NodeError> {
        let base = checked_yield(def.base_yield_per_tick)?;
        Ok(self.nodes.insert(ResourceNode::Standard(StandardNode {
            kind: def.kind,
            base_yield_per_tick: base,
            position: def.position,
            access_points: def.access_points,
            parent,
            attached_special: None,
            is_mining: false,
        })))
    }

    /// Spawn a special node riding on `standard`. At most one special per
    /// standard node.
    pub fn attach_special(
        &mut self,
        standard: NodeId,
        def: SpecialNodeDef,
    ) -> Result<NodeId, NodeError> {
        let host_position = match self.nodes.get(standard) {
            Some(ResourceNode::Standard(host)) => {
                if let Some(existing) = host.attached_special
                    && self.nodes.contains_key(existing)
                {
                    return Err(NodeError::AlreadyAttached {
                        standard,
                        special: existing,
                    });
                }
                host.position
            }
            Some(ResourceNode::Special(_)) => return Err(NodeError::NotStandard(standard)),
            None => return Err(NodeError::NodeNotFound(standard)),
        };
        let capacity = checked_capacity(def.capacity)?;
        let base = checked_yield(def.base_yield_per_tick)?;

        let id = self.nodes.insert(ResourceNode::Special(SpecialNode {
            kind: def.kind,
            base_yield_per_tick: base,
            position: def.position.unwrap_or(host_position),
            attached_standard: standard,
            hidden: def.hidden,
            remaining_capacity: capacity,
            is_mining: false,
        }));
        if let Some(ResourceNode::Standard(host)) = self.nodes.get_mut(standard) {
            host.attached_special = Some(id);
        }
        Ok(id)
    }

    /// Remove a node. Removing a special clears its host's attachment;
    /// removing a standard also removes the special riding on it.
    pub fn remove(&mut self, id: NodeId) -> Option<ResourceNode> {
        let removed = self.nodes.remove(id)?;
        match &removed {
            ResourceNode::Special(special) => {
                if let Some(ResourceNode::Standard(host)) =
                    self.nodes.get_mut(special.attached_standard)
                    && host.attached_special == Some(id)
                {
                    host.attached_special = None;
                }
            }
            ResourceNode::Standard(standard) => {
                if let Some(special) = standard.attached_special {
                    self.nodes.remove(special);
                }
            }
        }
        Some(removed)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn get(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut ResourceNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ResourceNode)> {
        self.nodes.iter()
    }

    /// Standard nodes whose parent is `id`.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().filter_map(move |(child, node)| match node {
            ResourceNode::Standard(n) if n.parent == Some(id) => Some(child),
            _ => None,
        })
    }

    /// Whether `id` exists and is visible as a mining target.
    pub fn is_targetable(&self, id: NodeId) -> bool {
        match self.nodes.get(id) {
            Some(ResourceNode::Special(n)) => !n.hidden,
            Some(ResourceNode::Standard(_)) => true,
            None => false,
        }
    }

    /// The dependency rule: a root standard node may always start; a child
    /// may start only while its parent is mining; a special node defers to
    /// its host. Missing nodes (or missing parents) cannot start.
    pub fn can_start_mining(&self, id: NodeId) -> bool {
        match self.nodes.get(id) {
            Some(ResourceNode::Standard(n)) => self.standard_unlocked(n),
            Some(ResourceNode::Special(n)) => match self.nodes.get(n.attached_standard) {
                Some(ResourceNode::Standard(host)) => self.standard_unlocked(host),
                _ => false,
            },
            None => false,
        }
    }

    fn standard_unlocked(&self, node: &StandardNode) -> bool {
        match node.parent {
            None => true,
            Some(parent) => self.nodes.get(parent).is_some_and(ResourceNode::is_mining),
        }
    }

    pub fn is_depleted(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(ResourceNode::is_depleted)
    }

    pub fn closest_mining_spot(&self, id: NodeId, from: Position) -> Option<MiningSpot> {
        self.nodes.get(id).map(|n| n.closest_mining_spot(from))
    }

    // -----------------------------------------------------------------------
    // Mutators used by the scheduler and strategies
    // -----------------------------------------------------------------------

    /// Idempotent. Returns false when the node does not exist.
    pub(crate) fn start_mining(&mut self, id: NodeId) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.start_mining();
                true
            }
            None => false,
        }
    }

    /// Idempotent; silently ignores missing nodes.
    pub(crate) fn stop_mining(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.stop_mining();
        }
    }

    /// Make every hidden special node targetable. Returns how many changed.
    pub fn reveal_all_specials(&mut self) -> usize {
        let mut revealed = 0;
        for (_, node) in self.nodes.iter_mut() {
            if let ResourceNode::Special(n) = node
                && n.hidden
            {
                n.hidden = false;
                revealed += 1;
            }
        }
        revealed
    }
}
