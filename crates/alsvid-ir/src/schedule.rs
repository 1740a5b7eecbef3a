//! Stages, placements, transport steps, and the compiled schedule.

use crate::array::Site;
use crate::graph::InteractionGraph;
use crate::interaction::InteractionId;
use crate::qubit::QubitId;
use serde::{Deserialize, Serialize};

/// One simultaneous-execution stage: a matching of interactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Stage index in `[0, K)`.
    pub index: usize,
    /// Interactions executed in this stage, in circuit order.
    pub interactions: Vec<InteractionId>,
    /// Qubits active in this stage (each appears in exactly one interaction).
    pub active: Vec<QubitId>,
}

impl Stage {
    /// Build a stage from its interaction set, collecting the active qubits.
    pub fn new(index: usize, interactions: Vec<InteractionId>, graph: &InteractionGraph) -> Self {
        let mut active = Vec::with_capacity(interactions.len() * 2);
        for &id in &interactions {
            let g = graph.interaction(id);
            active.push(g.a);
            active.push(g.b);
        }
        active.sort_unstable();
        Self {
            index,
            interactions,
            active,
        }
    }

    /// A stage with no interactions (the single stage of an interaction-free
    /// graph).
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            interactions: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Whether the stage is a valid matching: no qubit in two interactions.
    pub fn is_matching(&self) -> bool {
        self.active.windows(2).all(|w| w[0] != w[1])
    }
}

/// A coordinate assignment for all qubits at one stage, indexed by qubit id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    sites: Vec<Site>,
}

impl Placement {
    /// Wrap a per-qubit site vector.
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }

    /// The site assigned to a qubit.
    pub fn site(&self, qubit: QubitId) -> Site {
        self.sites[qubit.index()]
    }

    /// Reassign a qubit's site.
    pub fn set(&mut self, qubit: QubitId, site: Site) {
        self.sites[qubit.index()] = site;
    }

    /// Number of placed qubits.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the placement is empty.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Iterate `(qubit, site)` pairs in qubit order.
    pub fn iter(&self) -> impl Iterator<Item = (QubitId, Site)> + '_ {
        self.sites
            .iter()
            .enumerate()
            .map(|(q, &s)| (QubitId::from(q), s))
    }

    /// Whether no two qubits share a site.
    pub fn is_injective(&self) -> bool {
        let mut seen = rustc_hash::FxHashSet::default();
        self.sites.iter().all(|s| seen.insert(*s))
    }

    /// Sum of per-qubit Euclidean displacement to another placement.
    pub fn total_displacement(&self, other: &Placement) -> f64 {
        self.sites
            .iter()
            .zip(&other.sites)
            .map(|(a, b)| a.dist(b))
            .sum()
    }

    /// Qubits whose sites differ from `other`.
    pub fn moved_qubits(&self, other: &Placement) -> Vec<QubitId> {
        self.iter()
            .filter(|&(q, s)| other.site(q) != s)
            .map(|(q, _)| q)
            .collect()
    }
}

/// One atom relocation within a transport sub-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// The relocated qubit.
    pub qubit: QubitId,
    /// Source site.
    pub from: Site,
    /// Destination site.
    pub to: Site,
}

/// A conflict-free simultaneous relocation of a subset of qubits.
///
/// All moves of one sub-step are executed by the same row/column axis sweep,
/// so the engaged source rows and columns are recorded as the transport group
/// tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportStep {
    /// The moves performed in this sub-step.
    pub moves: Vec<Move>,
    /// Source rows engaged by the sweep, ascending.
    pub rows: Vec<u32>,
    /// Source columns engaged by the sweep, ascending.
    pub cols: Vec<u32>,
}

impl TransportStep {
    /// Build a sub-step from its moves, deriving the engaged axes.
    pub fn new(moves: Vec<Move>) -> Self {
        let mut rows: Vec<u32> = moves.iter().map(|m| m.from.y).collect();
        let mut cols: Vec<u32> = moves.iter().map(|m| m.from.x).collect();
        rows.sort_unstable();
        rows.dedup();
        cols.sort_unstable();
        cols.dedup();
        Self { moves, rows, cols }
    }

    /// Apply the sub-step to a placement.
    pub fn apply(&self, placement: &mut Placement) {
        for m in &self.moves {
            placement.set(m.qubit, m.to);
        }
    }
}

/// The compiled program before serialization: stages interleaved with the
/// transport sub-steps leading into each stage.
///
/// `transitions[t]` is the ordered sub-step sequence that transforms the
/// stage `t-1` placement into the stage `t` placement; `transitions[0]` is
/// always empty because stage 0 starts from the initial layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// The stage sequence.
    pub stages: Vec<Stage>,
    /// Per-stage placements, parallel to `stages`.
    pub placements: Vec<Placement>,
    /// Per-stage incoming transport sequences, parallel to `stages`.
    pub transitions: Vec<Vec<TransportStep>>,
}

impl Schedule {
    /// Number of stages.
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InteractionGraph;

    #[test]
    fn test_stage_matching() {
        let graph = InteractionGraph::from_pairs(4, &[(0, 1), (2, 3), (1, 2)]).unwrap();
        let good = Stage::new(0, vec![InteractionId(0), InteractionId(1)], &graph);
        assert!(good.is_matching());
        assert_eq!(good.active.len(), 4);

        let bad = Stage::new(0, vec![InteractionId(0), InteractionId(2)], &graph);
        assert!(!bad.is_matching());
    }

    #[test]
    fn test_placement_displacement() {
        let a = Placement::new(vec![Site::new(0, 0), Site::new(1, 0)]);
        let mut b = a.clone();
        assert_eq!(a.total_displacement(&b), 0.0);
        assert!(a.moved_qubits(&b).is_empty());

        b.set(QubitId(1), Site::new(1, 2));
        assert_eq!(a.total_displacement(&b), 2.0);
        assert_eq!(a.moved_qubits(&b), vec![QubitId(1)]);
    }

    #[test]
    fn test_placement_injective() {
        let p = Placement::new(vec![Site::new(0, 0), Site::new(0, 0)]);
        assert!(!p.is_injective());
    }

    #[test]
    fn test_transport_step_axes() {
        let step = TransportStep::new(vec![
            Move {
                qubit: QubitId(0),
                from: Site::new(0, 2),
                to: Site::new(0, 3),
            },
            Move {
                qubit: QubitId(1),
                from: Site::new(4, 2),
                to: Site::new(4, 3),
            },
        ]);
        assert_eq!(step.rows, vec![2]);
        assert_eq!(step.cols, vec![0, 4]);

        let mut p = Placement::new(vec![Site::new(0, 2), Site::new(4, 2)]);
        step.apply(&mut p);
        assert_eq!(p.site(QubitId(0)), Site::new(0, 3));
        assert_eq!(p.site(QubitId(1)), Site::new(4, 3));
    }
}
