use crate::errors::Error;
use crate::graph::{Graph, Solution};
use crate::search::Search;
use crate::utils::RandomNumberGenerator;

/// Fraction of the common backbone fixed into the reduced instance.
pub const DEFAULT_BETA: f64 = 0.9;

/// Reduce-solve-combine crossover.
///
/// A Bernoulli(`beta`) subsample of the parents' common vertices is deleted
/// from a copy of the instance, shrinking the budget. The reduced instance
/// is solved by a local search from a random feasible state, and the union
/// of its solution with the fixed subsample is applied to a fresh clone of
/// the original graph.
pub fn reduce_solve_combine(
    original: &Graph,
    male: &Solution,
    female: &Solution,
    search_strategy: Option<&str>,
    beta: f64,
    seed: u64,
) -> Result<Graph, Error> {
    if !(0.0..=1.0).contains(&beta) {
        return Err(Error::InvalidBeta);
    }

    let mut rng = RandomNumberGenerator::new(seed);

    let mut reduced = Solution::default();
    for &node in male {
        if female.contains(&node) && rng.probability() < beta {
            reduced.insert(node);
        }
    }

    let mut working = original.clone();
    working.reduced_graph_by_removed_set(&reduced);

    let mut reduced_graph = working.random_feasible_graph();

    let strategy = search_strategy.unwrap_or(if original.is_dcnp() { "BCLS" } else { "CHNS" });
    let mut local_search = Search::new(&mut reduced_graph, seed);
    local_search.set_strategy(strategy)?;
    let result = local_search.run()?;

    let mut final_nodes = reduced;
    final_nodes.extend(result.solution.iter().copied());

    let mut improved = original.clone();
    improved.update_by_removed_set(&final_nodes);
    Ok(improved)
}
