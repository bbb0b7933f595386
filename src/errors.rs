use thiserror::Error;

use crate::graph::ProblemType;

/// Errors surfaced by the solver core. Precondition violations are reported
/// eagerly and are not retried internally; heuristic dead ends are handled by
/// the callers' fallback paths instead of this enum.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("no components available for selection")]
    NoComponents,

    #[error("component is empty, can not select node")]
    EmptyComponent,

    #[error("no removed nodes can be added")]
    NoRemovedNodes,

    #[error("unknown search strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown problem type: {0}")]
    UnknownProblemType(String),

    #[error("search strategy is not set")]
    StrategyNotSet,

    #[error("budget exceeds vertex count")]
    BudgetExceedsVertexCount,

    #[error("beta must be in [0, 1]")]
    InvalidBeta,

    #[error("population size must be 3 to return all three solutions")]
    PopulationSizeNotThree,

    #[error("{op} requires {expected} parents, got {got}")]
    ParentCount {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("{op} requires a {expected:?} graph")]
    WrongVariant {
        op: &'static str,
        expected: ProblemType,
    },
}
