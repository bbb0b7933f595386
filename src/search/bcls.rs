use std::collections::VecDeque;

use log::debug;

use super::{SearchParams, SearchResult, SearchStrategy};
use crate::errors::Error;
use crate::graph::{Graph, Node, NumPairs};
use crate::utils::RandomNumberGenerator;

pub const DEFAULT_MAX_IDLE_STEPS: u64 = 150;
pub const DEFAULT_SELECTION_PROB: f64 = 0.8;

/// Betweenness-centrality candidate-list search for the distance-based
/// variant.
///
/// Centrality is computed once and orders the vertices into a candidate
/// list. Each move pops the front candidate: with probability
/// `selection_prob` it is exchanged (removed, then the best removed vertex
/// is re-inserted and appended to the list), otherwise it is demoted to just
/// past the fifth position so the head of the list cycles through the top
/// candidates.
pub struct Bcls {
    max_idle_steps: u64,
    selection_prob: f64,
    rng: RandomNumberGenerator,
}

impl Bcls {
    pub fn new(params: &SearchParams) -> Self {
        Self {
            max_idle_steps: params.max_idle_steps.unwrap_or(DEFAULT_MAX_IDLE_STEPS),
            selection_prob: params.selection_prob.unwrap_or(DEFAULT_SELECTION_PROB),
            rng: RandomNumberGenerator::new(params.seed.unwrap_or(0)),
        }
    }

    fn perform_move(
        &mut self,
        graph: &mut Graph,
        current_obj: &mut NumPairs,
        candidates: &mut VecDeque<Node>,
    ) -> Result<(), Error> {
        if candidates.is_empty() {
            debug!("BCLS: candidate list is empty, skipping move");
            return Ok(());
        }

        while !candidates.is_empty() {
            let r = self.rng.probability();
            let front = candidates.pop_front().unwrap();

            // already removed candidates are stale entries and are dropped
            if graph.is_node_removed(front) {
                continue;
            }

            if r < self.selection_prob {
                graph.remove_node(front);
                match graph.find_best_node_to_add() {
                    Ok(node_to_add) => {
                        graph.add_node(node_to_add);
                        candidates.push_back(node_to_add);
                        *current_obj = graph.objective_value();
                    }
                    Err(_) => {
                        // cannot complete the exchange; restore the state
                        graph.add_node(front);
                        candidates.push_front(front);
                    }
                }
                return Ok(());
            }

            if candidates.len() >= 5 {
                candidates.insert(5, front);
            } else {
                candidates.push_back(front);
            }
        }

        Ok(())
    }
}

impl SearchStrategy for Bcls {
    fn execute(&mut self, graph: &mut Graph) -> Result<SearchResult, Error> {
        let centrality = graph.betweenness_centrality()?;

        let mut best_solution = graph.removed_nodes().clone();
        let mut current_obj = graph.objective_value();
        let mut best_obj = current_obj;

        let mut sorted_nodes: Vec<Node> = (0..graph.number_of_nodes()).collect();
        sorted_nodes
            .sort_by(|&a, &b| centrality[b as usize].total_cmp(&centrality[a as usize]));
        let mut candidates: VecDeque<Node> = sorted_nodes.into();

        let mut num_idle_steps = 0u64;
        let mut num_steps = 0u64;

        while num_idle_steps < self.max_idle_steps {
            num_steps += 1;
            self.perform_move(graph, &mut current_obj, &mut candidates)?;

            if current_obj < best_obj {
                best_solution = graph.removed_nodes().clone();
                best_obj = current_obj;
                num_idle_steps = 0;
            } else {
                num_idle_steps += 1;
            }

            if num_steps % 10_000 == 0 {
                debug!(
                    "BCLS step {num_steps}: best={best_obj}, current={current_obj}, idle={num_idle_steps}"
                );
            }
        }

        Ok(SearchResult {
            solution: best_solution,
            obj_value: best_obj,
        })
    }
}
