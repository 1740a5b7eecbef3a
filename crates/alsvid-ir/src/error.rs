//! Error types for the IR crate.

use crate::interaction::InteractionId;
use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur in IR operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// An interaction pairs a qubit with itself.
    #[error("Interaction {interaction} pairs qubit {qubit} with itself")]
    SelfInteraction {
        /// The offending interaction.
        interaction: InteractionId,
        /// The repeated qubit.
        qubit: QubitId,
    },

    /// An interaction references a qubit outside the graph.
    #[error("Qubit {qubit} not in graph (graph has {num_qubits} qubits)")]
    UnknownQubit {
        /// The qubit that was not found.
        qubit: QubitId,
        /// Number of qubits in the graph.
        num_qubits: u32,
    },

    /// The per-qubit interaction order was violated.
    #[error(
        "Interaction {interaction} scheduled before an earlier interaction on qubit {qubit}"
    )]
    OrderViolation {
        /// The interaction scheduled out of order.
        interaction: InteractionId,
        /// The endpoint whose order constraint was violated.
        qubit: QubitId,
    },

    /// An interaction was scheduled more than once.
    #[error("Interaction {0} scheduled more than once")]
    AlreadyScheduled(InteractionId),

    /// A coordinate falls outside the array bounds.
    #[error("Site ({x}, {y}) outside a {width}x{height} array")]
    SiteOutOfBounds {
        /// X coordinate.
        x: u32,
        /// Y coordinate.
        y: u32,
        /// Array width.
        width: u32,
        /// Array height.
        height: u32,
    },

    /// The array has fewer sites than qubits.
    #[error("Array has {sites} sites but the graph has {qubits} qubits")]
    ArrayTooSmall {
        /// Number of qubits to place.
        qubits: u32,
        /// Number of available sites.
        sites: u32,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
