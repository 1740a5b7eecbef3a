//! Compilation configuration.

use alsvid_ir::Site;
use serde::{Deserialize, Serialize};

/// Placement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Full annealed placement per stage. Higher quality, higher compute cost.
    Dynamic,
    /// A single row-major layout reused for every stage. Scales to very large
    /// graphs at the cost of more inter-stage movement; the gate-range check
    /// is waived because the layout never chases the matching.
    Trivial,
}

/// Transport routing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingStrategy {
    /// Greedy degree-ordered maximal independent set per round.
    Maximalis,
    /// Pending moves pre-sorted by displacement, then first-fit independent
    /// selection in that order. Cheaper than the degree ordering; the rounds
    /// can be less parallel in degenerate cases.
    SortingHeuristic,
}

/// Configuration for one compilation run.
///
/// A fixed configuration plus a fixed [`seed`](Self::seed) makes the whole
/// pipeline deterministic: rerunning on the same graph yields an identical
/// program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Placement strategy.
    pub layout_mode: LayoutMode,
    /// Reset the placement to the initial layout after every stage. Trades
    /// movement efficiency for bounded routing complexity.
    pub return_to_initial: bool,
    /// Transport routing strategy.
    pub routing_strategy: RoutingStrategy,
    /// Cap on the number of pending moves considered per routing round.
    pub window: Option<usize>,
    /// Annealing proposal budget per placement.
    pub anneal_iterations: usize,
    /// Starting temperature of the annealing schedule.
    pub anneal_initial_temperature: f64,
    /// RNG seed for the annealer.
    pub seed: u64,
    /// Use squared-Euclidean instead of Euclidean cost terms.
    pub l2_cost: bool,
    /// Treat all interactions as commuting: any unscheduled interaction is
    /// eligible, and stages are free matchings of the multigraph. Set to
    /// `false` to enforce the per-qubit circuit order instead, serializing
    /// interactions that share a qubit into their original sequence.
    pub all_commutable: bool,
    /// A caller-supplied stage-0 layout, one site per qubit in qubit order.
    /// Overrides both the row-major layout of `Trivial` mode and the annealed
    /// initial layout of `Dynamic` mode.
    pub initial_layout: Option<Vec<Site>>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::Dynamic,
            return_to_initial: false,
            routing_strategy: RoutingStrategy::SortingHeuristic,
            window: None,
            anneal_iterations: 10_000,
            anneal_initial_temperature: 4.0,
            seed: 0,
            l2_cost: false,
            all_commutable: true,
            initial_layout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompileConfig::default();
        assert_eq!(config.layout_mode, LayoutMode::Dynamic);
        assert_eq!(config.routing_strategy, RoutingStrategy::SortingHeuristic);
        assert!(config.window.is_none());
        assert!(!config.return_to_initial);
        assert!(config.all_commutable);
        assert!(config.initial_layout.is_none());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&LayoutMode::Trivial).unwrap();
        assert_eq!(json, "\"trivial\"");
        let json = serde_json::to_string(&RoutingStrategy::SortingHeuristic).unwrap();
        assert_eq!(json, "\"sorting-heuristic\"");
        let parsed: RoutingStrategy = serde_json::from_str("\"maximalis\"").unwrap();
        assert_eq!(parsed, RoutingStrategy::Maximalis);
    }
}
