//! The compilation driver.
//!
//! Runs the pipeline phases (scheduling, placement, routing, code generation)
//! in order, passing immutable snapshots forward. Placement and routing
//! are strictly sequential across stages because each stage's movement cost
//! is defined relative to the previous placement.

use std::time::Instant;

use alsvid_ir::{ArrayModel, InteractionGraph, Placement, Schedule, TransportStep};
use tracing::{info, instrument};

use crate::codegen::{CodeGenerator, PhaseTimings, Program};
use crate::config::{CompileConfig, LayoutMode};
use crate::error::CompileResult;
use crate::placer::Placer;
use crate::router::Router;
use crate::scheduler::StageScheduler;

/// Compiles interaction graphs into array programs.
pub struct Compiler {
    config: CompileConfig,
}

impl Compiler {
    /// Create a compiler with the given configuration.
    pub fn new(config: CompileConfig) -> Self {
        Self { config }
    }

    /// The compiler's configuration.
    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Compile `graph` onto `array`, producing the serialized program.
    #[instrument(skip(self, graph))]
    pub fn compile(
        &self,
        graph: &InteractionGraph,
        array: ArrayModel,
        name: &str,
    ) -> CompileResult<Program> {
        let mut timings = PhaseTimings::default();

        let t = Instant::now();
        let stages = StageScheduler::new(graph)
            .all_commutable(self.config.all_commutable)
            .schedule()?;
        timings.scheduling = t.elapsed().as_secs_f64();
        info!(
            stages = stages.len(),
            interactions = graph.num_interactions(),
            max_degree = graph.max_degree(),
            "scheduling complete"
        );

        let t = Instant::now();
        let mut placer = Placer::new(graph, array, &self.config)?;
        let initial = placer.initial_placement(&stages)?;
        let mut placements = vec![initial.clone()];
        if self.config.layout_mode == LayoutMode::Trivial {
            placements.resize(stages.len(), initial.clone());
        } else {
            for stage in &stages[1..] {
                let seed = if self.config.return_to_initial {
                    &initial
                } else {
                    &placements[placements.len() - 1]
                };
                let next = placer.next_placement(stage, seed)?;
                placements.push(next);
            }
        }
        timings.placement = t.elapsed().as_secs_f64();
        info!("placement complete");

        let t = Instant::now();
        let router = Router::new(&self.config, array);
        let mut transitions: Vec<Vec<TransportStep>> = vec![Vec::new()];
        for t_idx in 1..stages.len() {
            let steps = self.route_transition(
                &router,
                &placements[t_idx - 1],
                &placements[t_idx],
                &initial,
                t_idx,
            )?;
            transitions.push(steps);
        }
        timings.routing = t.elapsed().as_secs_f64();
        info!(
            transport_steps = transitions.iter().map(Vec::len).sum::<usize>(),
            "routing complete"
        );

        let schedule = Schedule {
            stages,
            placements,
            transitions,
        };

        let t = Instant::now();
        let mut program =
            CodeGenerator::new(graph, array, &self.config).generate(&schedule, name, timings)?;
        program.timings.codegen = t.elapsed().as_secs_f64();
        info!(instructions = program.instructions.len(), "codegen complete");
        Ok(program)
    }

    /// Route one transition, taking the detour through the initial layout
    /// when `return_to_initial` is set.
    fn route_transition(
        &self,
        router: &Router<'_>,
        from: &Placement,
        to: &Placement,
        initial: &Placement,
        transition: usize,
    ) -> CompileResult<Vec<TransportStep>> {
        if !self.config.return_to_initial {
            return router.route(from, to, transition);
        }
        let mut steps = router.route(from, initial, transition)?;
        steps.extend(router.route(initial, to, transition)?);
        Ok(steps)
    }
}
