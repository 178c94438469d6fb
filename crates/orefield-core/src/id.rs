use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a resource node (standard or special) in the node graph.
    pub struct NodeId;

    /// Identifies a worker unit.
    pub struct WorkerId;

    /// Identifies an active mining job in the scheduler's job table.
    pub struct JobId;
}

/// Identifies one navigation request. Issued by the navigator; a worker only
/// honours callbacks for the handle it is currently waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PathHandle(pub u64);

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn path_handle_equality() {
        assert_eq!(PathHandle(3), PathHandle(3));
        assert_ne!(PathHandle(3), PathHandle(4));
    }

    #[test]
    fn stale_node_key_does_not_alias() {
        let mut nodes: SlotMap<NodeId, u8> = SlotMap::with_key();
        let a = nodes.insert(1);
        nodes.remove(a);
        let b = nodes.insert(2);
        assert_ne!(a, b);
        assert!(nodes.get(a).is_none());
    }

    #[test]
    fn ids_are_hashable() {
        use std::collections::HashMap;
        let mut workers: SlotMap<WorkerId, ()> = SlotMap::with_key();
        let w = workers.insert(());
        let mut map = HashMap::new();
        map.insert(w, "miner");
        assert_eq!(map[&w], "miner");
    }
}
