use log::debug;

use super::{SearchParams, SearchResult, SearchStrategy};
use crate::errors::Error;
use crate::graph::{Graph, NumPairs};
use crate::utils::RandomNumberGenerator;

pub const DEFAULT_MAX_IDLE_STEPS: u64 = 1000;
pub const DEFAULT_THETA: f64 = 0.3;

/// Component-based hybrid neighborhood search: CBNS with an occasional
/// articulation-guided removal. With probability `theta` the vertex leaving
/// the selected component is the one of minimum estimated impact instead of
/// the youngest one.
pub struct Chns {
    max_idle_steps: u64,
    theta: f64,
    rng: RandomNumberGenerator,
}

impl Chns {
    pub fn new(params: &SearchParams) -> Self {
        Self {
            max_idle_steps: params.max_idle_steps.unwrap_or(DEFAULT_MAX_IDLE_STEPS),
            theta: params.theta.unwrap_or(DEFAULT_THETA),
            rng: RandomNumberGenerator::new(params.seed.unwrap_or(0)),
        }
    }

    fn perform_move(
        &mut self,
        graph: &mut Graph,
        current_obj: &mut NumPairs,
        num_steps: u64,
    ) -> Result<(), Error> {
        let component = match graph.select_component() {
            Ok(component) => component,
            Err(Error::NoComponents) => return Ok(()),
            Err(err) => return Err(err),
        };

        let node_to_remove = if self.rng.probability() < self.theta {
            graph.impact_select_node_from_component(component)?
        } else {
            graph.age_select_node_from_component(component)?
        };

        graph.remove_node(node_to_remove);
        graph.set_node_age(node_to_remove, num_steps);

        if let Ok(node_to_add) = graph.greedy_select_node_to_add() {
            graph.add_node(node_to_add);
            graph.set_node_age(node_to_add, num_steps);
        }

        *current_obj = graph.objective_value();
        Ok(())
    }
}

impl SearchStrategy for Chns {
    fn execute(&mut self, graph: &mut Graph) -> Result<SearchResult, Error> {
        let mut best_solution = graph.removed_nodes().clone();
        let mut current_obj = graph.objective_value();
        let mut best_obj = current_obj;

        let mut num_idle_steps = 0u64;
        let mut num_steps = 0u64;

        while num_idle_steps < self.max_idle_steps {
            num_steps += 1;
            self.perform_move(graph, &mut current_obj, num_steps)?;

            if current_obj < best_obj {
                best_solution = graph.removed_nodes().clone();
                best_obj = current_obj;
                num_idle_steps = 0;
            } else {
                num_idle_steps += 1;
            }

            if num_steps % 100_000 == 0 {
                debug!(
                    "CHNS step {num_steps}: best={best_obj}, current={current_obj}, idle={num_idle_steps}"
                );
            }
        }

        Ok(SearchResult {
            solution: best_solution,
            obj_value: best_obj,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::{ProblemData, ProblemType};
    use crate::search::Search;

    fn solve(data: &ProblemData, budget: u32, seed: u64) -> SearchResult {
        let mut graph = data
            .create_original_graph(ProblemType::Cnp, budget, seed, 0)
            .unwrap()
            .random_feasible_graph();
        let mut search = Search::new(&mut graph, seed);
        search.set_strategy("CHNS").unwrap();
        search.run().unwrap()
    }

    #[test]
    fn bridge_between_triangles() {
        let data = ProblemData::from_edges(
            7,
            [(0, 1), (1, 2), (0, 2), (2, 3), (3, 4), (4, 5), (5, 6), (4, 6)],
        );
        let result = solve(&data, 1, 17);

        // removing the bridge vertex leaves the two triangles
        assert_eq!(result.obj_value, 6);
        assert!(result.solution.contains(&3));
    }

    #[test]
    fn star_center() {
        let data = ProblemData::from_edges(6, [(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)]);
        let result = solve(&data, 1, 29);

        assert_eq!(result.obj_value, 0);
        assert!(result.solution.contains(&0));
    }

    #[test]
    fn theta_one_still_terminates() {
        let data = ProblemData::from_edges(5, (0..4).map(|i| (i, i + 1)));
        let mut graph = data
            .create_original_graph(ProblemType::Cnp, 1, 3, 0)
            .unwrap()
            .random_feasible_graph();

        let mut search = Search::new(&mut graph, 3).with_params(SearchParams {
            theta: Some(1.0),
            max_idle_steps: Some(50),
            ..SearchParams::default()
        });
        search.set_strategy("CHNS").unwrap();

        assert_eq!(search.run().unwrap().obj_value, 2);
    }
}
