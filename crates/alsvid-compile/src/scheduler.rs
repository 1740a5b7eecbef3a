//! Stage scheduling: partitioning interactions into conflict-free matchings.
//!
//! Greedy edge-coloring in the Misra-Gries spirit: each round grows a maximal
//! matching among the eligible interactions, which becomes the next stage.
//! Eligible interactions are scanned in ascending circuit order, so the
//! result is deterministic.
//!
//! By default every unscheduled interaction is eligible (the interactions
//! commute), and the stage count K of the greedy matcher satisfies
//! K <= 2*delta - 1 where delta is the maximum qubit degree of the
//! multigraph: an interaction still unscheduled after a round conflicts with
//! a scheduled interaction on one of its endpoints, and each endpoint has at
//! most delta interactions. With the opt-in per-qubit order constraint only
//! the front interaction of each qubit is eligible, and the stage count is
//! bounded by the dependency depth instead; a cycle listed in ring order, for
//! example, serializes completely.

use alsvid_ir::{Frontier, InteractionGraph, InteractionId, Stage};
use tracing::debug;

use crate::error::{CompileError, CompileResult};

/// Partitions an interaction graph into an ordered sequence of stages.
pub struct StageScheduler<'g> {
    graph: &'g InteractionGraph,
    /// When set (the default), every unscheduled interaction is eligible;
    /// when cleared, only the front interaction of each qubit is.
    all_commutable: bool,
}

impl<'g> StageScheduler<'g> {
    /// Create a scheduler for the given graph, treating all interactions as
    /// commuting.
    pub fn new(graph: &'g InteractionGraph) -> Self {
        Self {
            graph,
            all_commutable: true,
        }
    }

    /// Toggle the commuting assumption; `false` enforces the per-qubit
    /// circuit order.
    #[must_use]
    pub fn all_commutable(mut self, yes: bool) -> Self {
        self.all_commutable = yes;
        self
    }

    /// Run the scheduler, consuming every interaction exactly once.
    ///
    /// A graph with no interactions yields a single empty stage, so that an
    /// isolated qubit still gets one interaction step in the program.
    pub fn schedule(&self) -> CompileResult<Vec<Stage>> {
        if self.graph.num_interactions() == 0 {
            return Ok(vec![Stage::empty(0)]);
        }
        if self.all_commutable {
            self.schedule_commutable()
        } else {
            self.schedule_ordered()
        }
    }

    /// Greedy matching rounds over the eligibility frontier.
    fn schedule_ordered(&self) -> CompileResult<Vec<Stage>> {
        let mut frontier = Frontier::new(self.graph);
        let mut stages = Vec::new();

        while !frontier.is_complete(self.graph) {
            let eligible = frontier.eligible(self.graph);
            let matching = maximal_matching(self.graph, &eligible);
            if matching.is_empty() {
                // Unreachable for a well-formed graph: the unscheduled
                // interaction with the smallest id is always eligible.
                return Err(CompileError::Inconsistent(format!(
                    "scheduler stalled with {} of {} interactions scheduled",
                    frontier.scheduled(),
                    self.graph.num_interactions()
                )));
            }
            for &id in &matching {
                frontier.mark_scheduled(self.graph, id)?;
            }
            let stage = Stage::new(stages.len(), matching, self.graph);
            debug!(
                stage = stage.index,
                interactions = stage.interactions.len(),
                "closed stage"
            );
            stages.push(stage);
        }
        Ok(stages)
    }

    /// Greedy matching rounds with every unscheduled interaction eligible.
    fn schedule_commutable(&self) -> CompileResult<Vec<Stage>> {
        let mut pending: Vec<InteractionId> =
            self.graph.interactions().iter().map(|g| g.id).collect();
        let mut stages = Vec::new();

        while !pending.is_empty() {
            let matching = maximal_matching(self.graph, &pending);
            pending.retain(|id| !matching.contains(id));
            stages.push(Stage::new(stages.len(), matching, self.graph));
        }
        Ok(stages)
    }
}

/// Greedily grow a maximal matching from candidates in ascending id order.
///
/// Tie-breaking decision: candidates are accepted in original circuit order,
/// the deterministic total order required for reproducible schedules.
fn maximal_matching(graph: &InteractionGraph, candidates: &[InteractionId]) -> Vec<InteractionId> {
    let mut used = vec![false; graph.num_qubits() as usize];
    let mut matching = Vec::new();
    for &id in candidates {
        let g = graph.interaction(id);
        if !used[g.a.index()] && !used[g.b.index()] {
            used[g.a.index()] = true;
            used[g.b.index()] = true;
            matching.push(id);
        }
    }
    matching
}
