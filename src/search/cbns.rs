use log::debug;

use super::{SearchParams, SearchResult, SearchStrategy};
use crate::errors::Error;
use crate::graph::{Graph, NumPairs};

pub const DEFAULT_MAX_IDLE_STEPS: u64 = 1000;

/// Component-based neighborhood search.
///
/// Every step targets a component picked by the size-guided selector,
/// removes its least recently touched vertex and greedily re-inserts one of
/// the removed vertices. Vertex ages are stamped with the step counter, so
/// the removal choice cycles through the component over time.
pub struct Cbns {
    max_idle_steps: u64,
}

impl Cbns {
    pub fn new(params: &SearchParams) -> Self {
        Self {
            max_idle_steps: params.max_idle_steps.unwrap_or(DEFAULT_MAX_IDLE_STEPS),
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
            // heuristic dead end: leave the state untouched
            Err(Error::NoComponents) => return Ok(()),
            Err(err) => return Err(err),
        };

        let node_to_remove = graph.age_select_node_from_component(component)?;
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

impl SearchStrategy for Cbns {
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
                    "CBNS step {num_steps}: best={best_obj}, current={current_obj}, idle={num_idle_steps}"
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
        search.set_strategy("CBNS").unwrap();
        search.run().unwrap()
    }

    #[test]
    fn path_graph_optimum() {
        let data = ProblemData::from_edges(5, (0..4).map(|i| (i, i + 1)));
        let result = solve(&data, 1, 11);

        assert_eq!(result.obj_value, 2);
        assert!(result.solution.contains(&2));
    }

    #[test]
    fn cycle_graph_optimum() {
        let data = ProblemData::from_edges(6, (0..6).map(|i| (i, (i + 1) % 6)));
        let result = solve(&data, 2, 23);

        // two antipodal removals leave two 2-vertex paths
        assert_eq!(result.obj_value, 2);
        assert_eq!(result.solution.len(), 2);
        let removed: Vec<u32> = result.solution.iter().copied().collect();
        assert_eq!((removed[0] as i32 - removed[1] as i32).rem_euclid(6).min(
            (removed[1] as i32 - removed[0] as i32).rem_euclid(6)
        ), 3);
    }

    #[test]
    fn keeps_solution_feasible() {
        let data = ProblemData::from_edges(8, [(0, 1), (1, 2), (2, 3), (4, 5), (5, 6), (6, 7)]);
        let result = solve(&data, 2, 5);

        assert_eq!(result.solution.len(), 2);
        assert!(result.obj_value <= 4);
    }
}
