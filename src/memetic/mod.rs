pub mod statistics;
pub mod stop;

pub use statistics::{IterationStats, Statistics};
pub use stop::{CombinedCriterion, MaxIterations, NoImprovement, StoppingCriterion};

use log::info;

use crate::crossover::Crossover;
use crate::errors::Error;
use crate::graph::{Graph, NumPairs, ProblemType, Solution};
use crate::population::Population;
use crate::search::Search;

/// Configuration of the memetic layer: which local search refines
/// offspring, which recombination produces them, and how the population is
/// sized.
#[derive(Clone, Debug)]
pub struct MemeticParams {
    pub search: String,
    pub crossover: Crossover,
    pub adaptive_population: bool,
    pub initial_pop_size: usize,
    pub max_pop_size: usize,
    pub increase_pop_size: usize,
    pub max_idle_generations: u64,
}

impl Default for MemeticParams {
    fn default() -> Self {
        Self {
            search: "CHNS".into(),
            crossover: Crossover::default(),
            adaptive_population: true,
            initial_pop_size: 5,
            max_pop_size: 20,
            increase_pop_size: 3,
            max_idle_generations: 20,
        }
    }
}

impl MemeticParams {
    /// Defaults with the variant-appropriate local search.
    pub fn for_problem(problem_type: ProblemType) -> Self {
        Self {
            search: match problem_type {
                ProblemType::Cnp => "CHNS".into(),
                ProblemType::Dcnp => "BCLS".into(),
            },
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug)]
pub struct MemeticResult {
    pub best_solution: Solution,
    pub best_obj_value: NumPairs,
    pub iterations: u64,
    pub stats: Statistics,
}

/// Population-based driver alternating recombination and local search.
///
/// Each generation selects parents by tournament (or takes all three
/// members for the three-parent operator), recombines them into an
/// offspring graph, refines it with the configured search and folds the
/// result back into the population. The injected stopping criterion is
/// polled once per generation.
pub struct MemeticSearch {
    graph: Graph,
    params: MemeticParams,
    seed: u64,
}

impl MemeticSearch {
    pub fn new(graph: Graph, params: MemeticParams, seed: u64) -> Self {
        Self {
            graph,
            params,
            seed,
        }
    }

    pub fn run(
        &mut self,
        stopping_criterion: &mut dyn StoppingCriterion,
    ) -> Result<MemeticResult, Error> {
        self.run_with_stats(stopping_criterion, true)
    }

    pub fn run_with_stats(
        &mut self,
        stopping_criterion: &mut dyn StoppingCriterion,
        collect_stats: bool,
    ) -> Result<MemeticResult, Error> {
        let mut stats = Statistics::new(collect_stats);
        let mut population = Population::new(
            self.graph.clone(),
            &self.params.search,
            self.params.adaptive_population,
            self.params.initial_pop_size,
            self.params.max_pop_size,
            self.params.increase_pop_size,
            self.params.max_idle_generations,
            self.seed,
        );

        let (mut best_solution, mut best_obj_value) = population.initialize(None)?;
        info!(
            "initialized population of {} with best objective {best_obj_value}",
            population.size()
        );

        // operation seeds advance deterministically with the generation loop
        let mut seed = self.seed;
        let mut num_idle_generations: u64 = 0;
        let mut iterations: u64 = 0;

        while !stopping_criterion.should_stop(best_obj_value) {
            iterations += 1;

            let parents: Vec<Solution> =
                if matches!(self.params.crossover, Crossover::InheritRepair) {
                    let (parent1, parent2, parent3) = population.get_all_three_solutions()?;
                    vec![parent1, parent2, parent3]
                } else {
                    let (parent1, parent2) = population.tournament_select_two_solutions(2);
                    vec![parent1, parent2]
                };

            seed += 1;
            let mut offspring = self.params.crossover.apply(&self.graph, &parents, seed)?;

            seed += 1;
            let mut local_search = Search::new(&mut offspring, seed);
            local_search.set_strategy(&self.params.search)?;
            let result = local_search.run()?;

            population.update(&result.solution, result.obj_value, num_idle_generations)?;

            if result.obj_value < best_obj_value {
                best_solution = result.solution;
                best_obj_value = result.obj_value;
                num_idle_generations = 0;
            } else {
                num_idle_generations += 1;
            }

            stats.collect(best_obj_value, population.size(), num_idle_generations);

            if iterations % 10 == 0 {
                info!(
                    "generation {iterations}: best={best_obj_value}, population={}, idle={num_idle_generations}",
                    population.size()
                );
            }
        }

        Ok(MemeticResult {
            best_solution,
            best_obj_value,
            iterations,
            stats,
        })
    }
}
