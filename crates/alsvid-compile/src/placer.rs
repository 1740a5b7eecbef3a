//! Qubit placement via simulated annealing.
//!
//! Two layout modes are supported. `Trivial` reuses one row-major layout for
//! every stage. `Dynamic` anneals: the initial layout minimizes weighted
//! interaction distance over the whole stage list (earlier stages weigh
//! more), and each subsequent stage minimizes movement from the previous
//! placement subject to the stage's gate-range constraint.
//!
//! The annealer state is an occupancy grid; a proposal relocates one qubit to
//! a random site inside a shrunken search window, swapping with any occupant,
//! so placements stay injective by construction. Costs are evaluated
//! incrementally over the terms touching the two affected qubits.

use alsvid_ir::{ArrayModel, InteractionGraph, Placement, QubitId, Site, Stage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::{CompileConfig, LayoutMode};
use crate::error::{CompileError, CompileResult};

/// Additive penalty for a matched pair outside the interaction radius.
/// Dominates any movement term, so the annealer restores feasibility before
/// it optimizes movement.
const VIOLATION_PENALTY: f64 = 1.0e4;

/// Temperature decays to this fraction of the initial value over the budget.
const COOLING_FLOOR: f64 = 1.0e-3;

/// One additive term of an annealing cost function.
#[derive(Debug, Clone, Copy)]
enum Term {
    /// Weighted distance between two interacting qubits.
    Pair { a: QubitId, b: QubitId, weight: f64 },
    /// Distance of a qubit from its previous-stage site.
    Anchor { q: QubitId, site: Site },
    /// Penalty when a matched pair exceeds the interaction radius.
    RangePair { a: QubitId, b: QubitId },
}

/// A cost function as a term list with a per-qubit index.
struct CostModel {
    terms: Vec<Term>,
    by_qubit: Vec<Vec<usize>>,
}

impl CostModel {
    fn new(num_qubits: usize) -> Self {
        Self {
            terms: Vec::new(),
            by_qubit: vec![Vec::new(); num_qubits],
        }
    }

    fn push(&mut self, term: Term) {
        let idx = self.terms.len();
        match term {
            Term::Pair { a, b, .. } | Term::RangePair { a, b } => {
                self.by_qubit[a.index()].push(idx);
                self.by_qubit[b.index()].push(idx);
            }
            Term::Anchor { q, .. } => self.by_qubit[q.index()].push(idx),
        }
        self.terms.push(term);
    }
}

/// Occupancy-grid annealer state.
struct SaState {
    sites: Vec<Site>,
    /// Occupant qubit per full-array site, row-major.
    occupant: Vec<Option<u32>>,
    width: u32,
}

impl SaState {
    fn new(sites: Vec<Site>, array: &ArrayModel) -> Self {
        let mut occupant = vec![None; array.num_sites() as usize];
        for (q, site) in sites.iter().enumerate() {
            occupant[(site.y * array.width + site.x) as usize] = Some(q as u32);
        }
        Self {
            sites,
            occupant,
            width: array.width,
        }
    }

    fn site_index(&self, site: Site) -> usize {
        (site.y * self.width + site.x) as usize
    }

    fn occupant_at(&self, site: Site) -> Option<u32> {
        self.occupant[self.site_index(site)]
    }

    /// Move `q` to `to`, swapping with any occupant. Returns the displaced
    /// qubit, if any.
    fn relocate(&mut self, q: u32, to: Site) -> Option<u32> {
        let from = self.sites[q as usize];
        let to_idx = self.site_index(to);
        let from_idx = self.site_index(from);
        let displaced = self.occupant[to_idx];
        self.occupant[to_idx] = Some(q);
        self.occupant[from_idx] = displaced;
        self.sites[q as usize] = to;
        if let Some(o) = displaced {
            self.sites[o as usize] = from;
        }
        displaced
    }
}

/// Computes per-stage placements for a schedule.
#[derive(Debug)]
pub struct Placer<'a> {
    graph: &'a InteractionGraph,
    array: ArrayModel,
    config: &'a CompileConfig,
    rng: StdRng,
    /// Search window for annealing proposals (full array for small grids).
    window_dims: (u32, u32),
}

impl<'a> Placer<'a> {
    /// Create a placer, validating array capacity.
    pub fn new(
        graph: &'a InteractionGraph,
        array: ArrayModel,
        config: &'a CompileConfig,
    ) -> CompileResult<Self> {
        if graph.num_qubits() > array.num_sites() {
            return Err(CompileError::ArrayTooSmall {
                qubits: graph.num_qubits(),
                sites: array.num_sites(),
            });
        }
        Ok(Self {
            graph,
            array,
            config,
            rng: StdRng::seed_from_u64(config.seed),
            window_dims: search_window(graph.num_qubits(), &array),
        })
    }

    /// The initial (stage 0) layout.
    ///
    /// A caller-supplied layout, when configured, is validated and used
    /// verbatim. Otherwise `Trivial` mode returns the row-major layout and
    /// `Dynamic` mode anneals a layout minimizing weighted interaction
    /// distance over all stages, with stage 0's matching required to be in
    /// gate range.
    pub fn initial_placement(&mut self, stages: &[Stage]) -> CompileResult<Placement> {
        let n = self.graph.num_qubits();
        if let Some(layout) = &self.config.initial_layout {
            return self.supplied_layout(layout.clone(), stages.first());
        }
        if self.config.layout_mode == LayoutMode::Trivial {
            return Ok(Placement::new(self.array.row_major(n)?));
        }
        if n == 0 {
            return Ok(Placement::new(Vec::new()));
        }

        let mut model = CostModel::new(n as usize);
        for stage in stages {
            // Geometric stage decay: nearby stages dominate the layout.
            let weight = (1.0 - 0.1 * stage.index as f64).max(0.1);
            for &id in &stage.interactions {
                let g = self.graph.interaction(id);
                model.push(Term::Pair {
                    a: g.a,
                    b: g.b,
                    weight,
                });
            }
        }
        if let Some(first) = stages.first() {
            for &id in &first.interactions {
                let g = self.graph.interaction(id);
                model.push(Term::RangePair { a: g.a, b: g.b });
            }
        }

        let state = SaState::new(self.random_layout(n), &self.array);
        self.anneal(&model, state, 0)
    }

    /// Validate a caller-supplied stage-0 layout.
    ///
    /// In `Dynamic` mode the layout pins stage 0, so its matching must
    /// already be in gate range; `Trivial` mode waives that check just as it
    /// does for the row-major layout.
    fn supplied_layout(
        &self,
        sites: Vec<Site>,
        first: Option<&Stage>,
    ) -> CompileResult<Placement> {
        let n = self.graph.num_qubits() as usize;
        if sites.len() != n {
            return Err(CompileError::InvalidLayout(format!(
                "layout covers {} of {n} qubits",
                sites.len()
            )));
        }
        for (q, &site) in sites.iter().enumerate() {
            if !self.array.contains(site) {
                return Err(CompileError::InvalidLayout(format!(
                    "q{q} placed outside the array at {site}"
                )));
            }
        }
        let placement = Placement::new(sites);
        if !placement.is_injective() {
            return Err(CompileError::InvalidLayout(
                "two qubits share a site".into(),
            ));
        }
        if self.config.layout_mode == LayoutMode::Dynamic {
            if let Some(stage) = first {
                for &id in &stage.interactions {
                    let g = self.graph.interaction(id);
                    if !self.array.in_range(placement.site(g.a), placement.site(g.b)) {
                        return Err(CompileError::InvalidLayout(format!(
                            "{g} out of gate range in the supplied layout"
                        )));
                    }
                }
            }
        }
        Ok(placement)
    }

    /// The placement for stage `t > 0`, minimizing movement from `prev`.
    pub fn next_placement(&mut self, stage: &Stage, prev: &Placement) -> CompileResult<Placement> {
        if stage.interactions.is_empty() {
            return Ok(prev.clone());
        }

        let n = self.graph.num_qubits() as usize;
        let mut model = CostModel::new(n);
        for (q, site) in prev.iter() {
            model.push(Term::Anchor { q, site });
        }
        for &id in &stage.interactions {
            let g = self.graph.interaction(id);
            model.push(Term::RangePair { a: g.a, b: g.b });
        }

        let mut state = SaState::new(prev.iter().map(|(_, s)| s).collect(), &self.array);
        self.repair(&mut state, stage);

        // The repaired seed is already optimal when nothing had to move.
        if self.total_cost(&model, &state) <= 1e-12 {
            return Ok(Placement::new(state.sites));
        }
        self.anneal(&model, state, stage.index)
    }

    /// Random injective layout inside the search window.
    fn random_layout(&mut self, n: u32) -> Vec<Site> {
        let (w, h) = self.window_dims;
        let mut positions: Vec<u32> = (0..w * h).collect();
        positions.shuffle(&mut self.rng);
        positions
            .iter()
            .take(n as usize)
            .map(|&p| Site::new(p % w, p / w))
            .collect()
    }

    /// Greedy feasibility repair: pull each out-of-range matched pair back
    /// into gate range, preferring free sites and minimal movement. Qubits
    /// active in the stage are never displaced.
    fn repair(&mut self, state: &mut SaState, stage: &Stage) {
        let mut active = vec![false; self.graph.num_qubits() as usize];
        for &q in &stage.active {
            active[q.index()] = true;
        }
        for &id in &stage.interactions {
            let g = self.graph.interaction(id);
            let (anchor, mover) = (g.a, g.b);
            let a_site = state.sites[anchor.index()];
            let m_site = state.sites[mover.index()];
            if self.array.in_range(a_site, m_site) {
                continue;
            }
            let mut best: Option<(f64, Site)> = None;
            for idx in 0..self.array.num_sites() {
                let s = self.array.site_at(idx);
                if !self.array.in_range(a_site, s) {
                    continue;
                }
                // A swap out of an active qubit's site would break its pair.
                if let Some(o) = state.occupant_at(s) {
                    if active[o as usize] {
                        continue;
                    }
                }
                let d = m_site.dist(&s);
                if best.map_or(true, |(bd, _)| d < bd) {
                    best = Some((d, s));
                }
            }
            if let Some((_, target)) = best {
                state.relocate(mover.0, target);
            }
        }
    }

    /// The annealing loop shared by both placement problems.
    fn anneal(
        &mut self,
        model: &CostModel,
        mut state: SaState,
        stage_index: usize,
    ) -> CompileResult<Placement> {
        if model.terms.is_empty() {
            return Ok(Placement::new(state.sites));
        }
        let n = state.sites.len() as u32;
        let (w, h) = self.window_dims;
        let iterations = self.config.anneal_iterations.max(1);
        let t0 = self.config.anneal_initial_temperature.max(1e-9);

        let mut current = self.total_cost(model, &state);
        let mut best: Option<(Vec<Site>, f64)> = None;
        if self.is_feasible(model, &state) {
            best = Some((state.sites.clone(), current));
        }

        let mut affected: Vec<usize> = Vec::new();
        for i in 0..iterations {
            let temp = t0 * COOLING_FLOOR.powf(i as f64 / iterations as f64);

            let q = self.rng.gen_range(0..n);
            let to = Site::new(self.rng.gen_range(0..w), self.rng.gen_range(0..h));
            if state.sites[q as usize] == to {
                continue;
            }

            affected.clear();
            affected.extend_from_slice(&model.by_qubit[q as usize]);
            if let Some(o) = state.occupant_at(to) {
                affected.extend_from_slice(&model.by_qubit[o as usize]);
            }
            affected.sort_unstable();
            affected.dedup();

            let before: f64 = affected.iter().map(|&t| self.term_cost(model, &state, t)).sum();
            let from = state.sites[q as usize];
            state.relocate(q, to);
            let after: f64 = affected.iter().map(|&t| self.term_cost(model, &state, t)).sum();
            let delta = after - before;

            let accept = delta <= 0.0 || self.rng.gen_range(0.0..1.0) < (-delta / temp).exp();
            if accept {
                current += delta;
                let improved = best.as_ref().is_none_or(|&(_, c)| current < c - 1e-9);
                if improved && self.is_feasible(model, &state) {
                    best = Some((state.sites.clone(), current));
                }
            } else {
                // Undo: relocating back also swaps any displaced qubit home.
                state.relocate(q, from);
            }
        }

        match best {
            Some((sites, cost)) => {
                debug!(stage = stage_index, cost, "annealed placement");
                Ok(Placement::new(sites))
            }
            None => Err(CompileError::PlacementInfeasible {
                stage: stage_index,
                iterations,
            }),
        }
    }

    fn total_cost(&self, model: &CostModel, state: &SaState) -> f64 {
        (0..model.terms.len())
            .map(|t| self.term_cost(model, state, t))
            .sum()
    }

    fn term_cost(&self, model: &CostModel, state: &SaState, term: usize) -> f64 {
        match model.terms[term] {
            Term::Pair { a, b, weight } => {
                weight * self.metric(state.sites[a.index()], state.sites[b.index()])
            }
            Term::Anchor { q, site } => self.metric(state.sites[q.index()], site),
            Term::RangePair { a, b } => {
                let d = state.sites[a.index()].dist(&state.sites[b.index()]);
                if d <= self.array.interaction_radius + 1e-9 {
                    0.0
                } else {
                    VIOLATION_PENALTY + d - self.array.interaction_radius
                }
            }
        }
    }

    fn is_feasible(&self, model: &CostModel, state: &SaState) -> bool {
        model.terms.iter().all(|t| match *t {
            Term::RangePair { a, b } => self
                .array
                .in_range(state.sites[a.index()], state.sites[b.index()]),
            _ => true,
        })
    }

    /// Euclidean or squared-Euclidean distance, per configuration.
    fn metric(&self, a: Site, b: Site) -> f64 {
        if self.config.l2_cost {
            a.dist_sq(&b)
        } else {
            a.dist(&b)
        }
    }
}

/// The annealer searches a `ceil(sqrt(n)) + 4` square window when the array
/// is larger, keeping the proposal space proportional to the qubit count.
fn search_window(n: u32, array: &ArrayModel) -> (u32, u32) {
    let side = (n as f64).sqrt().ceil() as u32 + 4;
    let w = array.width.min(side);
    let h = array.height.min(side);
    if w * h < n {
        (array.width, array.height)
    } else {
        (w, h)
    }
}
