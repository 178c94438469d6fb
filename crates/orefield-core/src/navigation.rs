//! Boundary to the host's path-following system.
//!
//! The economy only asks "move worker W to P" and later hears back through
//! [`Economy::on_arrived`](crate::economy::Economy::on_arrived) or
//! [`Economy::on_path_failed`](crate::economy::Economy::on_path_failed).

use crate::geometry::Position;
use crate::id::{PathHandle, WorkerId};
use serde::{Deserialize, Serialize};

/// Why a navigation request could not complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathFailure {
    Unreachable,
    Blocked,
    Cancelled,
    Other(String),
}

impl std::fmt::Display for PathFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathFailure::Unreachable => f.write_str("unreachable"),
            PathFailure::Blocked => f.write_str("blocked"),
            PathFailure::Cancelled => f.write_str("cancelled"),
            PathFailure::Other(reason) => f.write_str(reason),
        }
    }
}

/// Host-provided movement collaborator.
pub trait Navigator: std::fmt::Debug + Send {
    /// Start moving `worker` towards `to`. The returned handle identifies
    /// this request in later arrival/failure callbacks.
    fn request_move(&mut self, worker: WorkerId, to: Position) -> PathHandle;

    /// The worker no longer cares about `handle`. Default: nothing to do.
    fn cancel(&mut self, handle: PathHandle) {
        let _ = handle;
    }
}
