//! Code generation: validating a schedule and emitting the program artifact.
//!
//! The code generator owns the final serialization step and performs no
//! scheduling, placement, or routing of its own. Before emitting it checks
//! every global invariant of the schedule; a violation here means a bug
//! upstream, reported as [`CompileError::Inconsistent`] and never patched.
//!
//! The emitted program is self-contained: replaying the instruction stream
//! reconstructs every atom's coordinate and transport status at every time
//! step without re-running any compilation logic.

use alsvid_ir::{ArrayModel, InteractionGraph, Move, Placement, QubitId, Schedule};
use serde::{Deserialize, Serialize};

use crate::config::{CompileConfig, LayoutMode};
use crate::error::{CompileError, CompileResult};
use crate::router::compatible;

/// A qubit coordinate snapshot inside an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitPosition {
    /// The qubit.
    pub id: QubitId,
    /// Column coordinate.
    pub x: u32,
    /// Row coordinate.
    pub y: u32,
}

/// An interaction record inside an `Interact` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Circuit order index.
    pub id: u32,
    /// First endpoint.
    pub a: QubitId,
    /// Second endpoint.
    pub b: QubitId,
}

/// One instruction of the serialized program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Instruction {
    /// Load atoms at the initial layout.
    Init {
        /// The initial coordinate of every qubit.
        placement: Vec<QubitPosition>,
    },
    /// One transport sub-step of a stage transition. Atoms listed in `moves`
    /// are under active transport; all others hold their sites.
    Transport {
        /// Index of the stage this transition leads into.
        transition: usize,
        /// Sub-step index within the transition.
        step: usize,
        /// The simultaneous relocations.
        moves: Vec<Move>,
        /// Source rows engaged by the sweep.
        rows: Vec<u32>,
        /// Source columns engaged by the sweep.
        cols: Vec<u32>,
    },
    /// Execute one stage's interactions simultaneously.
    Interact {
        /// The stage index.
        stage: usize,
        /// The stage's matching.
        interactions: Vec<InteractionRecord>,
        /// The coordinate of every qubit during the stage.
        placement: Vec<QubitPosition>,
    },
}

/// Wall-clock seconds spent in each compilation phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTimings {
    /// Stage scheduling.
    pub scheduling: f64,
    /// Placement (all stages).
    pub placement: f64,
    /// Transport routing (all transitions).
    pub routing: f64,
    /// Validation and emission.
    pub codegen: f64,
}

/// The compiled program: the sole artifact consumed by external animation
/// and fidelity-estimation tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Program name, chosen by the caller.
    pub name: String,
    /// Number of qubits.
    pub num_qubits: u32,
    /// The target array geometry.
    pub array: ArrayModel,
    /// The configuration the program was compiled with.
    pub config: CompileConfig,
    /// Per-phase compile times.
    pub timings: PhaseTimings,
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> CompileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a program back from JSON.
    pub fn from_json(json: &str) -> CompileResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of `Interact` instructions (the stage count).
    pub fn num_stages(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| matches!(i, Instruction::Interact { .. }))
            .count()
    }

    /// Number of `Transport` instructions.
    pub fn num_transport_steps(&self) -> usize {
        self.instructions
            .iter()
            .filter(|i| matches!(i, Instruction::Transport { .. }))
            .count()
    }
}

/// Validates a finished schedule and emits the program.
pub struct CodeGenerator<'a> {
    graph: &'a InteractionGraph,
    array: ArrayModel,
    config: &'a CompileConfig,
}

impl<'a> CodeGenerator<'a> {
    /// Create a code generator for the given compilation context.
    pub fn new(graph: &'a InteractionGraph, array: ArrayModel, config: &'a CompileConfig) -> Self {
        Self {
            graph,
            array,
            config,
        }
    }

    /// Validate the schedule and emit the instruction stream.
    pub fn generate(
        &self,
        schedule: &Schedule,
        name: &str,
        timings: PhaseTimings,
    ) -> CompileResult<Program> {
        self.validate(schedule)?;

        let mut instructions = Vec::new();
        instructions.push(Instruction::Init {
            placement: snapshot(&schedule.placements[0]),
        });
        for stage in &schedule.stages {
            for (step, transport) in schedule.transitions[stage.index].iter().enumerate() {
                instructions.push(Instruction::Transport {
                    transition: stage.index,
                    step,
                    moves: transport.moves.clone(),
                    rows: transport.rows.clone(),
                    cols: transport.cols.clone(),
                });
            }
            instructions.push(Instruction::Interact {
                stage: stage.index,
                interactions: stage
                    .interactions
                    .iter()
                    .map(|&id| {
                        let g = self.graph.interaction(id);
                        InteractionRecord {
                            id: id.0,
                            a: g.a,
                            b: g.b,
                        }
                    })
                    .collect(),
                placement: snapshot(&schedule.placements[stage.index]),
            });
        }

        Ok(Program {
            name: name.to_string(),
            num_qubits: self.graph.num_qubits(),
            array: self.array,
            config: self.config.clone(),
            timings,
            instructions,
        })
    }

    fn validate(&self, schedule: &Schedule) -> CompileResult<()> {
        let k = schedule.stages.len();
        if k == 0 {
            return Err(inconsistent("schedule has no stages"));
        }
        if schedule.placements.len() != k || schedule.transitions.len() != k {
            return Err(inconsistent(format!(
                "schedule shape mismatch: {k} stages, {} placements, {} transitions",
                schedule.placements.len(),
                schedule.transitions.len()
            )));
        }
        if !schedule.transitions[0].is_empty() {
            return Err(inconsistent("stage 0 must not have incoming transport"));
        }

        self.validate_partition(schedule)?;
        for (i, stage) in schedule.stages.iter().enumerate() {
            if stage.index != i {
                return Err(inconsistent(format!(
                    "stage index {} at position {i}",
                    stage.index
                )));
            }
            if !stage.is_matching() {
                return Err(inconsistent(format!(
                    "stage {} is not a matching",
                    stage.index
                )));
            }
            self.validate_placement(stage.index, schedule)?;
        }
        self.validate_transport(schedule)
    }

    /// Every interaction scheduled exactly once; the per-qubit circuit order
    /// is additionally enforced when the interactions are not commutable.
    fn validate_partition(&self, schedule: &Schedule) -> CompileResult<()> {
        let mut stage_of = vec![None; self.graph.num_interactions()];
        for stage in &schedule.stages {
            for &id in &stage.interactions {
                let slot = &mut stage_of[id.index()];
                if slot.is_some() {
                    return Err(inconsistent(format!("{id} scheduled more than once")));
                }
                *slot = Some(stage.index);
            }
        }
        for (i, slot) in stage_of.iter().enumerate() {
            if slot.is_none() {
                return Err(inconsistent(format!("g{i} was never scheduled")));
            }
        }
        if !self.config.all_commutable {
            for q in 0..self.graph.num_qubits() {
                let on_q = self.graph.interactions_on(QubitId(q));
                for pair in on_q.windows(2) {
                    if stage_of[pair[0].index()] >= stage_of[pair[1].index()] {
                        return Err(inconsistent(format!(
                            "order violated on q{q}: {} not before {}",
                            pair[0], pair[1]
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_placement(&self, index: usize, schedule: &Schedule) -> CompileResult<()> {
        let placement = &schedule.placements[index];
        if placement.len() != self.graph.num_qubits() as usize {
            return Err(inconsistent(format!(
                "stage {index} placement covers {} of {} qubits",
                placement.len(),
                self.graph.num_qubits()
            )));
        }
        for (q, site) in placement.iter() {
            if !self.array.contains(site) {
                return Err(inconsistent(format!(
                    "stage {index}: {q} placed outside the array at {site}"
                )));
            }
        }
        if !placement.is_injective() {
            return Err(inconsistent(format!(
                "stage {index}: two qubits share a site"
            )));
        }
        // Trivial layouts never chase the matching; range is waived there.
        if self.config.layout_mode == LayoutMode::Trivial {
            return Ok(());
        }
        for &id in &schedule.stages[index].interactions {
            let g = self.graph.interaction(id);
            if !self.array.in_range(placement.site(g.a), placement.site(g.b)) {
                return Err(inconsistent(format!(
                    "stage {index}: {} out of gate range ({} at {}, {} at {})",
                    g,
                    g.a,
                    placement.site(g.a),
                    g.b,
                    placement.site(g.b)
                )));
            }
        }
        Ok(())
    }

    /// Transport telescopes between placements, every step is internally
    /// conflict-free, and no step lands an atom on an occupied site.
    fn validate_transport(&self, schedule: &Schedule) -> CompileResult<()> {
        for t in 1..schedule.stages.len() {
            let mut current = schedule.placements[t - 1].clone();
            for (step, transport) in schedule.transitions[t].iter().enumerate() {
                for (i, a) in transport.moves.iter().enumerate() {
                    if current.site(a.qubit) != a.from {
                        return Err(inconsistent(format!(
                            "transition {t} step {step}: {} moves from {} but sits at {}",
                            a.qubit,
                            a.from,
                            current.site(a.qubit)
                        )));
                    }
                    for b in &transport.moves[i + 1..] {
                        if !compatible(a, b) {
                            return Err(inconsistent(format!(
                                "transition {t} step {step}: conflicting moves for {} and {}",
                                a.qubit, b.qubit
                            )));
                        }
                    }
                }
                transport.apply(&mut current);
                if !current.is_injective() {
                    return Err(inconsistent(format!(
                        "transition {t} step {step}: two atoms occupy one site"
                    )));
                }
            }
            if current != schedule.placements[t] {
                return Err(inconsistent(format!(
                    "transition {t} does not reach the stage {t} placement"
                )));
            }
        }
        Ok(())
    }
}

fn snapshot(placement: &Placement) -> Vec<QubitPosition> {
    placement
        .iter()
        .map(|(id, site)| QubitPosition {
            id,
            x: site.x,
            y: site.y,
        })
        .collect()
}

fn inconsistent(msg: impl Into<String>) -> CompileError {
    CompileError::Inconsistent(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alsvid_ir::{InteractionId, Site, Stage, TransportStep};

    fn two_stage_schedule(graph: &InteractionGraph) -> Schedule {
        // 0-1 then 1-2 on a 3-site row; qubit 2 slides next to qubit 1.
        let p0 = Placement::new(vec![Site::new(0, 0), Site::new(1, 0), Site::new(3, 0)]);
        let p1 = Placement::new(vec![Site::new(0, 0), Site::new(1, 0), Site::new(2, 0)]);
        let step = TransportStep::new(vec![Move {
            qubit: QubitId(2),
            from: Site::new(3, 0),
            to: Site::new(2, 0),
        }]);
        Schedule {
            stages: vec![
                Stage::new(0, vec![InteractionId(0)], graph),
                Stage::new(1, vec![InteractionId(1)], graph),
            ],
            placements: vec![p0, p1],
            transitions: vec![vec![], vec![step]],
        }
    }

    fn context() -> (InteractionGraph, ArrayModel, CompileConfig) {
        let graph = InteractionGraph::from_pairs(3, &[(0, 1), (1, 2)]).unwrap();
        let array = ArrayModel::new(4, 4, 1.5);
        (graph, array, CompileConfig::default())
    }

    #[test]
    fn test_generate_valid_program() {
        let (graph, array, config) = context();
        let schedule = two_stage_schedule(&graph);
        let codegen = CodeGenerator::new(&graph, array, &config);
        let program = codegen
            .generate(&schedule, "chain", PhaseTimings::default())
            .unwrap();

        assert_eq!(program.num_stages(), 2);
        assert_eq!(program.num_transport_steps(), 1);
        assert!(matches!(program.instructions[0], Instruction::Init { .. }));

        // Round-trips through JSON.
        let parsed = Program::from_json(&program.to_json().unwrap()).unwrap();
        assert_eq!(parsed, program);
    }

    #[test]
    fn test_detects_dropped_interaction() {
        let (graph, array, config) = context();
        let mut schedule = two_stage_schedule(&graph);
        schedule.stages[1].interactions.clear();
        let codegen = CodeGenerator::new(&graph, array, &config);
        let err = codegen
            .generate(&schedule, "bad", PhaseTimings::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Inconsistent(msg) if msg.contains("never scheduled")));
    }

    #[test]
    fn test_detects_double_schedule() {
        let (graph, array, config) = context();
        let mut schedule = two_stage_schedule(&graph);
        schedule.stages[1].interactions = vec![InteractionId(0), InteractionId(1)];
        schedule.stages[1] = Stage::new(1, schedule.stages[1].interactions.clone(), &graph);
        let codegen = CodeGenerator::new(&graph, array, &config);
        let err = codegen
            .generate(&schedule, "bad", PhaseTimings::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Inconsistent(msg) if msg.contains("more than once")));
    }

    #[test]
    fn test_detects_overlap() {
        let (graph, array, config) = context();
        let mut schedule = two_stage_schedule(&graph);
        schedule.placements[0].set(QubitId(2), Site::new(1, 0));
        let codegen = CodeGenerator::new(&graph, array, &config);
        let err = codegen
            .generate(&schedule, "bad", PhaseTimings::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Inconsistent(msg) if msg.contains("share a site")));
    }

    #[test]
    fn test_detects_out_of_range_pair() {
        let (graph, array, config) = context();
        let mut schedule = two_stage_schedule(&graph);
        schedule.placements[0].set(QubitId(1), Site::new(3, 3));
        let codegen = CodeGenerator::new(&graph, array, &config);
        let err = codegen
            .generate(&schedule, "bad", PhaseTimings::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Inconsistent(msg) if msg.contains("gate range")));
    }

    #[test]
    fn test_detects_transient_overlap() {
        // Reaches the stage 1 placement, but parks qubit 2 on qubit 1's
        // occupied site along the way.
        let (graph, array, config) = context();
        let mut schedule = two_stage_schedule(&graph);
        schedule.transitions[1] = vec![
            TransportStep::new(vec![Move {
                qubit: QubitId(2),
                from: Site::new(3, 0),
                to: Site::new(1, 0),
            }]),
            TransportStep::new(vec![Move {
                qubit: QubitId(2),
                from: Site::new(1, 0),
                to: Site::new(2, 0),
            }]),
        ];
        let codegen = CodeGenerator::new(&graph, array, &config);
        let err = codegen
            .generate(&schedule, "bad", PhaseTimings::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::Inconsistent(msg) if msg.contains("occupy one site")));
    }

    #[test]
    fn test_detects_broken_transport() {
        let (graph, array, config) = context();
        let mut schedule = two_stage_schedule(&graph);
        schedule.transitions[1].clear();
        let codegen = CodeGenerator::new(&graph, array, &config);
        let err = codegen
            .generate(&schedule, "bad", PhaseTimings::default())
            .unwrap_err();
        assert!(
            matches!(err, CompileError::Inconsistent(msg) if msg.contains("does not reach"))
        );
    }
}
