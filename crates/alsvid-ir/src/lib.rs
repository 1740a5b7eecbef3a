//! Alsvid Intermediate Representation
//!
//! This crate provides the core data structures for compiling two-qubit
//! interaction programs onto dynamically field-programmable qubit arrays.
//! It forms the foundation of the Alsvid compilation stack.
//!
//! # Overview
//!
//! A program is an ordered multiset of required two-qubit interactions over a
//! set of qubits, represented as an [`InteractionGraph`]. The compiler
//! partitions the interactions into conflict-free stages, assigns every qubit
//! a grid coordinate per stage, and routes the atom transport between
//! consecutive stages. This crate holds the shared data model; the algorithms
//! live in `alsvid-compile`.
//!
//! # Core Components
//!
//! - **Qubits**: [`QubitId`] for addressing atoms
//! - **Interactions**: [`Interaction`], [`InteractionId`] for required
//!   two-qubit operations, ordered per qubit as in the original circuit
//! - **Interaction graph**: [`InteractionGraph`] plus the [`Frontier`]
//!   eligibility cursor used by the stage scheduler
//! - **Array geometry**: [`ArrayModel`], [`Site`] for the physical trap grid
//! - **Schedule**: [`Stage`], [`Placement`], [`TransportStep`], [`Schedule`]
//!   for the compiled program before serialization
//!
//! # Example: Building an Interaction Graph
//!
//! ```rust
//! use alsvid_ir::{InteractionGraph, QubitId};
//!
//! // A 4-qubit ring: 0-1, 1-2, 2-3, 3-0
//! let graph = InteractionGraph::from_pairs(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
//!
//! assert_eq!(graph.num_qubits(), 4);
//! assert_eq!(graph.num_interactions(), 4);
//! assert_eq!(graph.max_degree(), 2);
//! ```

pub mod array;
pub mod error;
pub mod graph;
pub mod interaction;
pub mod qubit;
pub mod schedule;

pub use array::{ArrayModel, Site};
pub use error::{IrError, IrResult};
pub use graph::{Frontier, InteractionGraph};
pub use interaction::{Interaction, InteractionId};
pub use qubit::QubitId;
pub use schedule::{Move, Placement, Schedule, Stage, TransportStep};
