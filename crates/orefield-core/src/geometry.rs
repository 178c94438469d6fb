use serde::{Deserialize, Serialize};

/// A point in world space. Distances are Euclidean.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance; cheaper for comparisons.
    pub fn distance_squared(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Where a worker should stand to mine a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiningSpot {
    pub position: Position,
}

/// Pick the candidate nearest to `from`. Ties keep the earlier candidate.
pub(crate) fn nearest(from: Position, candidates: &[Position]) -> Option<Position> {
    let mut best: Option<(f64, Position)> = None;
    for &p in candidates {
        let d = from.distance_squared(&p);
        match best {
            Some((bd, _)) if bd <= d => {}
            _ => best = Some((d, p)),
        }
    }
    best.map(|(_, p)| p)
}
