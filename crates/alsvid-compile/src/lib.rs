//! Alsvid Compilation Pipeline
//!
//! This crate turns an interaction graph into a validated, serialized program
//! for a dynamically field-programmable qubit array. The pipeline has four
//! phases, run strictly in order with immutable snapshots passed forward:
//!
//! ```text
//! InteractionGraph
//!       │
//!       ▼
//! ┌──────────────┐
//! │   Compiler   │ ◄── CompileConfig (layout mode, routing strategy, budgets)
//! └──────────────┘
//!       │
//!       ├── StageScheduler   greedy edge-coloring into matchings
//!       ├── Placer           simulated-annealing placements per stage
//!       ├── Router           MIS transport rounds per stage transition
//!       └── CodeGenerator    consistency validation + program emission
//!       │
//!       ▼
//! Program (JSON artifact)
//! ```
//!
//! # Example
//!
//! ```rust
//! use alsvid_compile::{CompileConfig, Compiler, LayoutMode, RoutingStrategy};
//! use alsvid_ir::{ArrayModel, InteractionGraph};
//!
//! // A 4-qubit interaction ring.
//! let graph = InteractionGraph::from_pairs(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
//!
//! let config = CompileConfig {
//!     layout_mode: LayoutMode::Trivial,
//!     routing_strategy: RoutingStrategy::SortingHeuristic,
//!     ..CompileConfig::default()
//! };
//!
//! let program = Compiler::new(config)
//!     .compile(&graph, ArrayModel::new(8, 8, 8.0), "ring")
//!     .unwrap();
//!
//! // An even cycle has chromatic index 2.
//! assert_eq!(program.num_stages(), 2);
//! ```
//!
//! # Determinism
//!
//! The scheduler and router are deterministic; the annealer draws from a
//! seeded RNG. The same graph, configuration, and seed always produce an
//! identical program.
//!
//! # Failure modes
//!
//! Input validation errors are fatal. [`CompileError::PlacementInfeasible`]
//! and [`CompileError::RoutingInfeasible`] are recoverable: retry with a
//! larger annealing budget or routing window, a `Trivial` layout, or
//! `return_to_initial`. [`CompileError::Inconsistent`] signals a violated
//! internal invariant and is never recoverable.

pub mod codegen;
pub mod compiler;
pub mod config;
pub mod error;
pub mod placer;
pub mod router;
pub mod scheduler;

pub use codegen::{CodeGenerator, Instruction, PhaseTimings, Program};
pub use compiler::Compiler;
pub use config::{CompileConfig, LayoutMode, RoutingStrategy};
pub use error::{CompileError, CompileResult};
pub use placer::Placer;
pub use router::Router;
pub use scheduler::StageScheduler;
