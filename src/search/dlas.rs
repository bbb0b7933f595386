use log::debug;

use super::{SearchParams, SearchResult, SearchStrategy};
use crate::errors::Error;
use crate::graph::{Graph, NumPairs};

pub const DEFAULT_MAX_IDLE_STEPS: u64 = 1000;
pub const DEFAULT_HISTORY_LENGTH: usize = 5;

/// Diversified late-acceptance search.
///
/// A ring buffer holds the cost of the last `history_length` accepted
/// states. A move is accepted when it keeps the objective unchanged or beats
/// the maximum of the buffer; otherwise the removed set snapshot taken
/// before the move is restored. The buffer entry for the current step is
/// raised to the new cost when that cost exceeds it, and lowered on strict
/// improvement, keeping a cached count of how many entries still equal the
/// maximum.
pub struct Dlas {
    max_idle_steps: u64,
    history_length: usize,
}

impl Dlas {
    pub fn new(params: &SearchParams) -> Self {
        Self {
            max_idle_steps: params.max_idle_steps.unwrap_or(DEFAULT_MAX_IDLE_STEPS),
            history_length: params.history_length.unwrap_or(DEFAULT_HISTORY_LENGTH),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn perform_move(
        &mut self,
        graph: &mut Graph,
        current_obj: &mut NumPairs,
        history: &mut [NumPairs],
        max_cost: &mut NumPairs,
        num_max_cost: &mut usize,
        num_steps: u64,
    ) -> Result<(), Error> {
        let previous_removed = graph.removed_nodes().clone();
        let previous_obj = *current_obj;

        let component = match graph.select_component() {
            Ok(component) => component,
            Err(Error::NoComponents) => return Ok(()),
            Err(err) => return Err(err),
        };

        let node_to_remove = graph.random_select_node_from_component(component)?;
        graph.remove_node(node_to_remove);

        if let Ok(node_to_add) = graph.greedy_select_node_to_add() {
            graph.add_node(node_to_add);
            graph.set_node_age(node_to_add, num_steps);
        }

        *current_obj = graph.objective_value();

        // late acceptance; the snapshot rollback is the authoritative
        // contract for rejected moves
        if *current_obj != previous_obj && *current_obj >= *max_cost {
            graph.update_by_removed_set(&previous_removed);
            *current_obj = previous_obj;
        }

        let index = (num_steps as usize) % history.len();
        if *current_obj > history[index] {
            history[index] = *current_obj;
        } else if *current_obj < history[index] && *current_obj < previous_obj {
            let overwritten = history[index];
            history[index] = *current_obj;

            if overwritten == *max_cost {
                *num_max_cost -= 1;
                if *num_max_cost == 0 {
                    *max_cost = history.iter().copied().max().unwrap();
                    *num_max_cost = history.iter().filter(|&&cost| cost == *max_cost).count();
                }
            }
        }

        Ok(())
    }
}

impl SearchStrategy for Dlas {
    fn execute(&mut self, graph: &mut Graph) -> Result<SearchResult, Error> {
        let mut best_solution = graph.removed_nodes().clone();
        let mut current_obj = graph.objective_value();
        let mut best_obj = current_obj;

        let mut history = vec![current_obj; self.history_length];
        let mut max_cost = current_obj;
        let mut num_max_cost = self.history_length;

        let mut num_idle_steps = 0u64;
        let mut num_steps = 0u64;

        while num_idle_steps < self.max_idle_steps {
            num_steps += 1;
            self.perform_move(
                graph,
                &mut current_obj,
                &mut history,
                &mut max_cost,
                &mut num_max_cost,
                num_steps,
            )?;

            if current_obj < best_obj {
                best_solution = graph.removed_nodes().clone();
                best_obj = current_obj;
                num_idle_steps = 0;
            } else {
                num_idle_steps += 1;
            }

            if num_steps % 100_000 == 0 {
                debug!(
                    "DLAS step {num_steps}: best={best_obj}, current={current_obj}, max_cost={max_cost}, idle={num_idle_steps}"
                );
            }
        }

        Ok(SearchResult {
            solution: best_solution,
            obj_value: best_obj,
        })
    }
}
