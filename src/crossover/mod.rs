pub mod dbx;
pub mod irr;
pub mod rsc;

pub use dbx::double_backbone_crossover;
pub use irr::inherit_repair_recombination;
pub use rsc::reduce_solve_combine;

use crate::errors::Error;
use crate::graph::{Graph, Solution};

/// Recombination operator choice. Parents are removed-vertex sets; applying
/// an operator yields a freshly materialized offspring graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Crossover {
    /// Double-backbone crossover over two parents.
    DoubleBackbone,
    /// Reduce-solve-combine over two parents: `beta` is the fraction of the
    /// common backbone fixed into the reduced instance, `search` overrides
    /// the strategy used on it (variant default otherwise).
    ReduceSolveCombine { beta: f64, search: Option<String> },
    /// Inherit-repair recombination over three parents.
    InheritRepair,
}

impl Default for Crossover {
    fn default() -> Self {
        Crossover::ReduceSolveCombine {
            beta: rsc::DEFAULT_BETA,
            search: None,
        }
    }
}

impl Crossover {
    pub fn name(&self) -> &'static str {
        match self {
            Crossover::DoubleBackbone => "DBX",
            Crossover::ReduceSolveCombine { .. } => "RSC",
            Crossover::InheritRepair => "IRR",
        }
    }

    pub fn required_parents(&self) -> usize {
        match self {
            Crossover::DoubleBackbone | Crossover::ReduceSolveCombine { .. } => 2,
            Crossover::InheritRepair => 3,
        }
    }

    /// Validates the parent count and dispatches to the operator.
    pub fn apply(
        &self,
        original: &Graph,
        parents: &[Solution],
        seed: u64,
    ) -> Result<Graph, Error> {
        let expected = self.required_parents();
        if parents.len() != expected {
            return Err(Error::ParentCount {
                op: self.name(),
                expected,
                got: parents.len(),
            });
        }

        match self {
            Crossover::DoubleBackbone => {
                double_backbone_crossover(original, &parents[0], &parents[1], seed)
            }
            Crossover::ReduceSolveCombine { beta, search } => reduce_solve_combine(
                original,
                &parents[0],
                &parents[1],
                search.as_deref(),
                *beta,
                seed,
            ),
            Crossover::InheritRepair => inherit_repair_recombination(
                original,
                (&parents[0], &parents[1], &parents[2]),
                seed,
            ),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::{ProblemData, ProblemType};

    #[test]
    fn parent_count_is_validated() {
        let data = ProblemData::from_edges(4, [(0, 1), (1, 2), (2, 3)]);
        let graph = data
            .create_original_graph(ProblemType::Cnp, 1, 1, 0)
            .unwrap();

        let one_parent = vec![Solution::default()];
        assert_eq!(
            Crossover::DoubleBackbone.apply(&graph, &one_parent, 1).err(),
            Some(Error::ParentCount {
                op: "DBX",
                expected: 2,
                got: 1,
            })
        );
        assert_eq!(
            Crossover::InheritRepair.apply(&graph, &one_parent, 1).err(),
            Some(Error::ParentCount {
                op: "IRR",
                expected: 3,
                got: 1,
            })
        );
    }

    #[test]
    fn default_is_rsc() {
        let crossover = Crossover::default();
        assert_eq!(crossover.name(), "RSC");
        assert_eq!(crossover.required_parents(), 2);
    }
}
