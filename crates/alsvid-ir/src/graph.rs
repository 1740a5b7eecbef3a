//! The interaction graph and its scheduling-eligibility frontier.
//!
//! An [`InteractionGraph`] is an ordered multiset of two-qubit interactions
//! over a fixed set of qubits. It is built once from external input and is
//! read-only afterwards; the scheduler tracks its own progress through a
//! [`Frontier`] of per-qubit cursors instead of mutating the graph.

use crate::error::{IrError, IrResult};
use crate::interaction::{Interaction, InteractionId};
use crate::qubit::QubitId;
use serde::{Deserialize, Serialize};

/// An ordered multiset of required two-qubit interactions.
///
/// Invariant: for each qubit, its interactions appear in id order, which is
/// the order the original circuit applies them. An interaction may only be
/// scheduled once every earlier interaction on both endpoints has been
/// scheduled; [`Frontier`] encodes that predicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionGraph {
    num_qubits: u32,
    interactions: Vec<Interaction>,
    /// Per qubit, the ids of its interactions in circuit order.
    per_qubit: Vec<Vec<InteractionId>>,
}

impl InteractionGraph {
    /// Create an empty graph over `num_qubits` qubits.
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            interactions: Vec::new(),
            per_qubit: vec![Vec::new(); num_qubits as usize],
        }
    }

    /// Build a graph from an ordered list of qubit-index pairs.
    pub fn from_pairs(num_qubits: u32, pairs: &[(u32, u32)]) -> IrResult<Self> {
        let mut graph = Self::new(num_qubits);
        for &(a, b) in pairs {
            graph.add_interaction(QubitId(a), QubitId(b))?;
        }
        Ok(graph)
    }

    /// Append the next interaction in circuit order.
    ///
    /// Fails on self-pairings and on qubits outside the graph.
    pub fn add_interaction(&mut self, a: QubitId, b: QubitId) -> IrResult<InteractionId> {
        let id = InteractionId(self.interactions.len() as u32);
        if a == b {
            return Err(IrError::SelfInteraction {
                interaction: id,
                qubit: a,
            });
        }
        for q in [a, b] {
            if q.0 >= self.num_qubits {
                return Err(IrError::UnknownQubit {
                    qubit: q,
                    num_qubits: self.num_qubits,
                });
            }
        }
        self.interactions.push(Interaction::new(id, a, b));
        self.per_qubit[a.index()].push(id);
        self.per_qubit[b.index()].push(id);
        Ok(id)
    }

    /// Number of qubits.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of interactions.
    pub fn num_interactions(&self) -> usize {
        self.interactions.len()
    }

    /// Look up an interaction by id.
    pub fn interaction(&self, id: InteractionId) -> &Interaction {
        &self.interactions[id.index()]
    }

    /// All interactions in circuit order.
    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    /// The ids of a qubit's interactions, in circuit order.
    pub fn interactions_on(&self, qubit: QubitId) -> &[InteractionId] {
        &self.per_qubit[qubit.index()]
    }

    /// Maximum qubit degree of the interaction multigraph.
    ///
    /// The theoretical lower bound on the stage count is this degree; the
    /// scheduler's stage count stays within a small factor of it.
    pub fn max_degree(&self) -> usize {
        self.per_qubit.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Per-qubit progress cursors over an [`InteractionGraph`].
///
/// `cursor[q]` counts how many of qubit q's interactions have been scheduled.
/// An interaction is eligible when it is the next unscheduled interaction on
/// both of its endpoints.
#[derive(Debug, Clone)]
pub struct Frontier {
    cursors: Vec<usize>,
    scheduled: usize,
}

impl Frontier {
    /// A frontier at the start of scheduling: nothing scheduled.
    pub fn new(graph: &InteractionGraph) -> Self {
        Self {
            cursors: vec![0; graph.num_qubits() as usize],
            scheduled: 0,
        }
    }

    /// Number of interactions scheduled so far.
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Whether every interaction of the graph has been scheduled.
    pub fn is_complete(&self, graph: &InteractionGraph) -> bool {
        self.scheduled == graph.num_interactions()
    }

    /// Whether `id` is currently eligible: all strictly-earlier interactions
    /// on both endpoints are already scheduled.
    pub fn is_eligible(&self, graph: &InteractionGraph, id: InteractionId) -> bool {
        let g = graph.interaction(id);
        self.next_on(graph, g.a) == Some(id) && self.next_on(graph, g.b) == Some(id)
    }

    /// The currently eligible interactions, in circuit order.
    pub fn eligible(&self, graph: &InteractionGraph) -> Vec<InteractionId> {
        let mut out = Vec::new();
        for (q, &cursor) in self.cursors.iter().enumerate() {
            let pending = graph.interactions_on(QubitId::from(q));
            if let Some(&id) = pending.get(cursor) {
                if self.is_eligible(graph, id) && !out.contains(&id) {
                    out.push(id);
                }
            }
        }
        out.sort_unstable();
        out
    }

    /// Mark `id` scheduled, advancing both endpoint cursors.
    ///
    /// Fails if `id` is not eligible, which means either a double-schedule or
    /// a per-qubit order violation.
    pub fn mark_scheduled(&mut self, graph: &InteractionGraph, id: InteractionId) -> IrResult<()> {
        let g = graph.interaction(id);
        for q in [g.a, g.b] {
            match self.next_on(graph, q) {
                Some(next) if next == id => {}
                Some(_) => {
                    return Err(IrError::OrderViolation {
                        interaction: id,
                        qubit: q,
                    });
                }
                None => return Err(IrError::AlreadyScheduled(id)),
            }
        }
        self.cursors[g.a.index()] += 1;
        self.cursors[g.b.index()] += 1;
        self.scheduled += 1;
        Ok(())
    }

    fn next_on(&self, graph: &InteractionGraph, qubit: QubitId) -> Option<InteractionId> {
        graph
            .interactions_on(qubit)
            .get(self.cursors[qubit.index()])
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_self_interaction() {
        let mut graph = InteractionGraph::new(3);
        let err = graph.add_interaction(QubitId(1), QubitId(1)).unwrap_err();
        assert!(matches!(err, IrError::SelfInteraction { qubit, .. } if qubit == QubitId(1)));
    }

    #[test]
    fn test_rejects_unknown_qubit() {
        let mut graph = InteractionGraph::new(3);
        let err = graph.add_interaction(QubitId(0), QubitId(3)).unwrap_err();
        assert!(matches!(
            err,
            IrError::UnknownQubit { qubit, num_qubits: 3 } if qubit == QubitId(3)
        ));
    }

    #[test]
    fn test_max_degree() {
        let graph = InteractionGraph::from_pairs(4, &[(0, 1), (0, 2), (0, 3), (1, 2)]).unwrap();
        assert_eq!(graph.max_degree(), 3);
        assert_eq!(InteractionGraph::new(2).max_degree(), 0);
    }

    #[test]
    fn test_multigraph_allowed() {
        let graph = InteractionGraph::from_pairs(2, &[(0, 1), (0, 1)]).unwrap();
        assert_eq!(graph.num_interactions(), 2);
        assert_eq!(graph.max_degree(), 2);
    }

    #[test]
    fn test_frontier_eligibility_chain() {
        // g0 = (0,1), g1 = (1,2): g1 must wait for g0 on qubit 1.
        let graph = InteractionGraph::from_pairs(3, &[(0, 1), (1, 2)]).unwrap();
        let mut frontier = Frontier::new(&graph);

        assert_eq!(frontier.eligible(&graph), vec![InteractionId(0)]);
        assert!(!frontier.is_eligible(&graph, InteractionId(1)));

        frontier.mark_scheduled(&graph, InteractionId(0)).unwrap();
        assert_eq!(frontier.eligible(&graph), vec![InteractionId(1)]);

        frontier.mark_scheduled(&graph, InteractionId(1)).unwrap();
        assert!(frontier.is_complete(&graph));
        assert!(frontier.eligible(&graph).is_empty());
    }

    #[test]
    fn test_frontier_rejects_out_of_order() {
        let graph = InteractionGraph::from_pairs(3, &[(0, 1), (1, 2)]).unwrap();
        let mut frontier = Frontier::new(&graph);
        let err = frontier
            .mark_scheduled(&graph, InteractionId(1))
            .unwrap_err();
        assert!(matches!(err, IrError::OrderViolation { qubit, .. } if qubit == QubitId(1)));
    }

    #[test]
    fn test_frontier_rejects_double_schedule() {
        let graph = InteractionGraph::from_pairs(2, &[(0, 1)]).unwrap();
        let mut frontier = Frontier::new(&graph);
        frontier.mark_scheduled(&graph, InteractionId(0)).unwrap();
        let err = frontier
            .mark_scheduled(&graph, InteractionId(0))
            .unwrap_err();
        assert!(matches!(err, IrError::AlreadyScheduled(InteractionId(0))));
    }

    #[test]
    fn test_disjoint_pairs_all_eligible() {
        let graph = InteractionGraph::from_pairs(4, &[(0, 1), (2, 3)]).unwrap();
        let frontier = Frontier::new(&graph);
        assert_eq!(
            frontier.eligible(&graph),
            vec![InteractionId(0), InteractionId(1)]
        );
    }
}
