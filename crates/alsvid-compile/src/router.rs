//! Transport routing between consecutive placements.
//!
//! Every qubit whose site differs between stage t and stage t+1 contributes a
//! move vector. Two vectors conflict when executing them in the same sub-step
//! would cross row or column order, or merge/split a shared axis coordinate;
//! a sub-step is therefore an independent set of the conflict graph. The
//! conflict graph is rebuilt per round and per transition, never persisted.
//!
//! A move is held back while its target trap is still occupied, so no
//! sub-step ever drops an atom onto a filled site. Movers occupying each
//! other's targets form a cycle; the router breaks a cycle by parking its
//! lowest-id member on a spare trap, which is the only case where an atom
//! takes more than one hop.

use alsvid_ir::{ArrayModel, Move, Placement, QubitId, Site, TransportStep};
use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::config::{CompileConfig, RoutingStrategy};
use crate::error::{CompileError, CompileResult};

/// Routes the transport between consecutive placements.
pub struct Router<'a> {
    config: &'a CompileConfig,
    array: ArrayModel,
}

impl<'a> Router<'a> {
    /// Create a router for the given configuration and array geometry.
    pub fn new(config: &'a CompileConfig, array: ArrayModel) -> Self {
        Self { config, array }
    }

    /// Compute the ordered transport sub-steps turning `from` into `to`.
    ///
    /// On success the cumulative effect of the returned steps is exactly the
    /// displacement between the two placements, every step is internally
    /// conflict-free, and no intermediate state puts two atoms on one site.
    /// `transition` is the index of the stage the transition leads into, used
    /// for error context.
    pub fn route(
        &self,
        from: &Placement,
        to: &Placement,
        transition: usize,
    ) -> CompileResult<Vec<TransportStep>> {
        let mut current = from.clone();
        let mut occupied: FxHashSet<Site> = from.iter().map(|(_, s)| s).collect();
        let mut pending: Vec<(QubitId, Site)> = from
            .iter()
            .filter(|&(q, s)| to.site(q) != s)
            .map(|(q, _)| (q, to.site(q)))
            .collect();
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        // Direct moves plus at most one parking hop per cycle.
        let round_limit = 2 * pending.len() + 1;
        let mut steps = Vec::new();
        let mut rounds = 0;
        while !pending.is_empty() {
            if rounds >= round_limit {
                return Err(self.stalled(transition, rounds, &pending));
            }

            let mut ready: Vec<Move> = pending
                .iter()
                .filter(|(_, target)| !occupied.contains(target))
                .map(|&(qubit, target)| Move {
                    qubit,
                    from: current.site(qubit),
                    to: target,
                })
                .collect();

            let moves = if ready.is_empty() {
                vec![self.park_cycle_member(&current, &occupied, &pending, transition, rounds)?]
            } else {
                if self.config.routing_strategy == RoutingStrategy::SortingHeuristic {
                    // Longest moves first; ties broken by qubit id.
                    ready.sort_by(|a, b| {
                        b.from
                            .dist(&b.to)
                            .partial_cmp(&a.from.dist(&a.to))
                            .unwrap_or(std::cmp::Ordering::Equal)
                            .then(a.qubit.cmp(&b.qubit))
                    });
                }
                let candidates = match self.config.window {
                    Some(w) => &ready[..w.max(1).min(ready.len())],
                    None => &ready[..],
                };
                let selected = match self.config.routing_strategy {
                    RoutingStrategy::Maximalis => independent_set_by_degree(candidates),
                    RoutingStrategy::SortingHeuristic => independent_set_first_fit(candidates),
                };
                if selected.is_empty() {
                    // A single move is always self-compatible, so an empty
                    // round means the selection itself is broken.
                    return Err(self.stalled(transition, rounds, &pending));
                }
                selected.iter().map(|&i| candidates[i]).collect()
            };

            for m in &moves {
                occupied.remove(&m.from);
                occupied.insert(m.to);
                current.set(m.qubit, m.to);
            }
            pending.retain(|&(q, target)| current.site(q) != target);
            steps.push(TransportStep::new(moves));
            rounds += 1;
        }
        debug!(transition, rounds, "routed transition");
        Ok(steps)
    }

    /// Break a target-occupancy cycle by parking one of its members.
    ///
    /// Called when every pending target is the current site of another
    /// pending mover. The lowest-id mover whose own site is also wanted gets
    /// relocated to a spare trap, freeing that site for the next round.
    fn park_cycle_member(
        &self,
        current: &Placement,
        occupied: &FxHashSet<Site>,
        pending: &[(QubitId, Site)],
        transition: usize,
        rounds: usize,
    ) -> CompileResult<Move> {
        let targets: FxHashSet<Site> = pending.iter().map(|&(_, t)| t).collect();
        let member = pending
            .iter()
            .find(|&&(q, _)| targets.contains(&current.site(q)));
        let Some(&(qubit, _)) = member else {
            return Err(self.stalled(transition, rounds, pending));
        };
        let spare = (0..self.array.num_sites())
            .map(|i| self.array.site_at(i))
            .find(|s| !occupied.contains(s) && !targets.contains(s));
        match spare {
            Some(park) => Ok(Move {
                qubit,
                from: current.site(qubit),
                to: park,
            }),
            // A fully packed array cannot resolve a swap cycle.
            None => Err(self.stalled(transition, rounds, pending)),
        }
    }

    fn stalled(
        &self,
        transition: usize,
        rounds: usize,
        pending: &[(QubitId, Site)],
    ) -> CompileError {
        CompileError::RoutingInfeasible {
            transition,
            rounds,
            unresolved: pending.iter().map(|&(q, _)| q).collect(),
            window: self.config.window,
        }
    }
}

/// Whether two moves can share one transport sub-step.
///
/// Per axis: moves starting at the same coordinate must end at the same
/// coordinate (they ride the same controlled row/column), moves ending at the
/// same coordinate must have started together, and the start order must be
/// preserved by the end order (no crossing).
pub fn compatible(a: &Move, b: &Move) -> bool {
    axis_compatible(a.from.y, a.to.y, b.from.y, b.to.y)
        && axis_compatible(a.from.x, a.to.x, b.from.x, b.to.x)
}

fn axis_compatible(s0: u32, e0: u32, s1: u32, e1: u32) -> bool {
    if s0 == s1 && e0 != e1 {
        return false;
    }
    if e0 == e1 && s0 != s1 {
        return false;
    }
    if s0 < s1 && e0 >= e1 {
        return false;
    }
    if s0 > s1 && e0 <= e1 {
        return false;
    }
    true
}

/// Conflict graph over candidate moves; an edge joins incompatible pairs.
fn conflict_graph(candidates: &[Move]) -> UnGraph<usize, ()> {
    let mut graph = UnGraph::new_undirected();
    let nodes: Vec<NodeIndex> = (0..candidates.len()).map(|i| graph.add_node(i)).collect();
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            if !compatible(&candidates[i], &candidates[j]) {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    graph
}

/// Greedy maximal independent set, lowest conflict degree first.
fn independent_set_by_degree(candidates: &[Move]) -> Vec<usize> {
    let graph = conflict_graph(candidates);
    let mut order: Vec<NodeIndex> = graph.node_indices().collect();
    order.sort_by_key(|&n| (graph.neighbors(n).count(), graph[n]));

    let mut excluded = vec![false; candidates.len()];
    let mut selected = Vec::new();
    for n in order {
        let i = graph[n];
        if excluded[i] {
            continue;
        }
        selected.push(i);
        for neighbor in graph.neighbors(n) {
            excluded[graph[neighbor]] = true;
        }
    }
    selected.sort_unstable();
    selected
}

/// Greedy independent set in candidate order (candidates are pre-sorted by
/// displacement, so long moves get the early rounds).
fn independent_set_first_fit(candidates: &[Move]) -> Vec<usize> {
    let graph = conflict_graph(candidates);
    let mut excluded = vec![false; candidates.len()];
    let mut selected = Vec::new();
    for n in graph.node_indices() {
        let i = graph[n];
        if excluded[i] {
            continue;
        }
        selected.push(i);
        for neighbor in graph.neighbors(n) {
            excluded[graph[neighbor]] = true;
        }
    }
    selected
}
