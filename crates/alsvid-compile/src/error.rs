//! Error handling for the compilation pipeline.

use alsvid_ir::{IrError, QubitId};
use thiserror::Error;

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that can occur during compilation.
///
/// Input validation errors are fatal. Placement and routing infeasibility are
/// recoverable: the caller may retry with a larger budget or window, a
/// different layout mode, or a larger array. Consistency errors indicate a
/// violated internal invariant and are never recoverable.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CompileError {
    /// Malformed interaction graph or illegal coordinate.
    #[error("Invalid input: {0}")]
    Ir(#[from] IrError),

    /// The array cannot hold the graph's qubits.
    #[error("Array has {sites} sites but the graph has {qubits} qubits")]
    ArrayTooSmall {
        /// Number of qubits to place.
        qubits: u32,
        /// Number of available sites.
        sites: u32,
    },

    /// A caller-supplied initial layout failed validation.
    #[error("Invalid initial layout: {0}")]
    InvalidLayout(String),

    /// No feasible placement was found within the annealing budget.
    #[error(
        "No feasible placement for stage {stage} within {iterations} annealing iterations"
    )]
    PlacementInfeasible {
        /// The stage whose placement failed.
        stage: usize,
        /// The iteration budget that was exhausted.
        iterations: usize,
    },

    /// The pending transport set could not be resolved within bounded rounds.
    #[error(
        "Routing into stage {transition} stalled after {rounds} rounds \
         ({} unresolved qubits, window {window:?})",
        unresolved.len()
    )]
    RoutingInfeasible {
        /// The stage the stalled transition leads into.
        transition: usize,
        /// Rounds executed before stalling.
        rounds: usize,
        /// Qubits whose moves could not be placed in any round.
        unresolved: Vec<QubitId>,
        /// The window configuration in effect.
        window: Option<usize>,
    },

    /// A violated internal invariant detected during code generation.
    #[error("Internal consistency failure: {0}")]
    Inconsistent(String),

    /// Program serialization failed.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_context() {
        let err = CompileError::PlacementInfeasible {
            stage: 3,
            iterations: 500,
        };
        let msg = err.to_string();
        assert!(msg.contains("stage 3"));
        assert!(msg.contains("500"));

        let err = CompileError::RoutingInfeasible {
            transition: 2,
            rounds: 9,
            unresolved: vec![QubitId(4), QubitId(7)],
            window: Some(8),
        };
        let msg = err.to_string();
        assert!(msg.contains("stage 2"));
        assert!(msg.contains("2 unresolved"));
    }
}
