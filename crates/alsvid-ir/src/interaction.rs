//! Two-qubit interaction types.

use crate::qubit::QubitId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an interaction: its position in the original circuit order.
///
/// Multiple interactions between the same pair of qubits are allowed and are
/// distinguished by this index, which also fixes the per-qubit ordering the
/// scheduler must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InteractionId(pub u32);

impl InteractionId {
    /// The id as an index into per-interaction tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InteractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

impl From<u32> for InteractionId {
    fn from(id: u32) -> Self {
        InteractionId(id)
    }
}

/// A required two-qubit interaction.
///
/// The pair is unordered; the constructor stores the smaller qubit id first
/// so that `(a, b)` and `(b, a)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the original circuit order.
    pub id: InteractionId,
    /// First endpoint (smaller qubit id).
    pub a: QubitId,
    /// Second endpoint (larger qubit id).
    pub b: QubitId,
}

impl Interaction {
    /// Create an interaction, normalizing the endpoint order.
    pub fn new(id: InteractionId, a: QubitId, b: QubitId) -> Self {
        if a <= b {
            Self { id, a, b }
        } else {
            Self { id, a: b, b: a }
        }
    }

    /// Whether the interaction involves the given qubit.
    pub fn involves(&self, qubit: QubitId) -> bool {
        self.a == qubit || self.b == qubit
    }

    /// The endpoint opposite to `qubit`, if `qubit` is an endpoint.
    pub fn other(&self, qubit: QubitId) -> Option<QubitId> {
        if qubit == self.a {
            Some(self.b)
        } else if qubit == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for Interaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.id, self.a, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_normalized() {
        let g = Interaction::new(InteractionId(0), QubitId(5), QubitId(2));
        assert_eq!(g.a, QubitId(2));
        assert_eq!(g.b, QubitId(5));
        assert_eq!(g, Interaction::new(InteractionId(0), QubitId(2), QubitId(5)));
    }

    #[test]
    fn test_other_endpoint() {
        let g = Interaction::new(InteractionId(1), QubitId(0), QubitId(3));
        assert_eq!(g.other(QubitId(0)), Some(QubitId(3)));
        assert_eq!(g.other(QubitId(3)), Some(QubitId(0)));
        assert_eq!(g.other(QubitId(1)), None);
        assert!(g.involves(QubitId(3)));
        assert!(!g.involves(QubitId(2)));
    }

    #[test]
    fn test_display() {
        let g = Interaction::new(InteractionId(4), QubitId(1), QubitId(0));
        assert_eq!(g.to_string(), "g4(q0, q1)");
    }
}
