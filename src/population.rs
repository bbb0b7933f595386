use log::info;

use crate::errors::Error;
use crate::graph::{Graph, NumPairs, Solution};
use crate::search::Search;
use crate::utils::RandomNumberGenerator;

/// Weight of the cost rank in the fitness; the rest weighs the diversity
/// rank. Larger fitness is worse.
const ALPHA: f64 = 0.60;

/// An individual: its solution, objective value, current fitness, a unique
/// id and the cached Jaccard similarities to every other member. Caching the
/// similarities keeps a fitness update quadratic in the population size
/// instead of quadratic times the solution size.
#[derive(Clone, Debug)]
pub struct Item {
    pub solution: Solution,
    pub obj_value: NumPairs,
    pub fitness: f64,
    pub id: u64,
    similarity: Vec<(f64, u64)>,
}

/// Population of solutions driving the memetic layer: rank-based fitness
/// over cost and diversity, tournament parent selection, duplicate
/// avoidance, and optional adaptive resizing on stagnation.
pub struct Population {
    graph: Graph,
    items: Vec<Item>,
    rng: RandomNumberGenerator,
    search_name: String,
    adaptive: bool,
    initial_pop_size: usize,
    max_pop_size: usize,
    increase_pop_size: usize,
    max_idle_generations: u64,
    next_item_id: u64,
    /// Seeds handed to the local searches of generated solutions; advancing
    /// deterministically keeps whole runs reproducible.
    seed_counter: u64,
}

impl Population {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        graph: Graph,
        search_name: &str,
        adaptive: bool,
        initial_pop_size: usize,
        max_pop_size: usize,
        increase_pop_size: usize,
        max_idle_generations: u64,
        seed: u64,
    ) -> Self {
        debug_assert!(initial_pop_size > 0);
        debug_assert!(max_idle_generations > 0);

        Self {
            graph,
            items: Vec::with_capacity(max_pop_size),
            rng: RandomNumberGenerator::new(seed),
            search_name: search_name.to_owned(),
            adaptive,
            initial_pop_size,
            max_pop_size,
            increase_pop_size,
            max_idle_generations,
            next_item_id: 0,
            seed_counter: 1000,
        }
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Jaccard similarity |A∩B| / |A∪B| of two solutions.
    fn similarity(a: &Solution, b: &Solution) -> f64 {
        let intersection = a.iter().filter(|node| b.contains(node)).count();
        let union = a.len() + b.len() - intersection;
        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }

    /// Appends a solution, recording its similarity to every member and
    /// vice versa.
    pub fn add(&mut self, solution: &Solution, obj_value: NumPairs) {
        let mut item = Item {
            solution: solution.clone(),
            obj_value,
            fitness: 0.0,
            id: self.next_item_id,
            similarity: Vec::with_capacity(self.items.len()),
        };
        self.next_item_id += 1;

        for other in &mut self.items {
            let similarity = Self::similarity(&item.solution, &other.solution);
            item.similarity.push((similarity, other.id));
            other.similarity.push((similarity, item.id));
        }

        self.items.push(item);
    }

    /// Accepts an offspring: the worst member (by fitness) is evicted, and
    /// on prolonged stagnation the population is expanded or rebuilt when
    /// adaptive sizing is enabled.
    pub fn update(
        &mut self,
        solution: &Solution,
        obj_value: NumPairs,
        num_idle_generations: u64,
    ) -> Result<(), Error> {
        self.add(solution, obj_value);
        self.remove_worst_solution();

        if self.adaptive
            && num_idle_generations > 0
            && num_idle_generations % self.max_idle_generations == 0
        {
            if self.items.len() < self.max_pop_size {
                info!(
                    "expanding population after {num_idle_generations} idle generations"
                );
                self.expand()?;
            } else {
                info!(
                    "rebuilding population after {num_idle_generations} idle generations"
                );
                self.rebuild()?;
            }
        }

        Ok(())
    }

    fn remove_worst_solution(&mut self) {
        self.update_fitness();

        let mut worst_index = 0;
        for (index, item) in self.items.iter().enumerate() {
            if item.fitness > self.items[worst_index].fitness {
                worst_index = index;
            }
        }

        let worst_id = self.items[worst_index].id;
        self.items.remove(worst_index);
        for item in &mut self.items {
            item.similarity.retain(|&(_, id)| id != worst_id);
        }
    }

    /// Fitness = ALPHA · cost rank + (1-ALPHA) · diversity rank, both
    /// 1-based ascending; the mean similarity to the rest of the population
    /// is the diversity score (lower = more diverse).
    fn update_fitness(&mut self) {
        let pop_size = self.items.len();
        if pop_size <= 1 {
            if pop_size == 1 {
                self.items[0].fitness = 0.0;
            }
            return;
        }

        let costs: Vec<f64> = self.items.iter().map(|item| item.obj_value as f64).collect();
        let diversity: Vec<f64> = self
            .items
            .iter()
            .map(|item| {
                if item.similarity.is_empty() {
                    0.0
                } else {
                    item.similarity.iter().map(|(s, _)| s).sum::<f64>()
                        / item.similarity.len() as f64
                }
            })
            .collect();

        let cost_ranks = ranks(&costs);
        let diversity_ranks = ranks(&diversity);

        for (index, item) in self.items.iter_mut().enumerate() {
            item.fitness =
                ALPHA * cost_ranks[index] as f64 + (1.0 - ALPHA) * diversity_ranks[index] as f64;
        }
    }

    pub fn is_duplicate(&self, solution: &Solution) -> bool {
        self.items.iter().any(|item| &item.solution == solution)
    }

    /// The three members in storage order, for the three-parent
    /// recombination.
    pub fn get_all_three_solutions(&self) -> Result<(Solution, Solution, Solution), Error> {
        if self.items.len() != 3 {
            return Err(Error::PopulationSizeNotThree);
        }
        Ok((
            self.items[0].solution.clone(),
            self.items[1].solution.clone(),
            self.items[2].solution.clone(),
        ))
    }

    pub fn get_best_item(&self) -> Option<&Item> {
        self.items.iter().min_by_key(|item| item.obj_value)
    }

    /// k-ary tournament selection of two distinct parents; the member of
    /// minimum fitness among the drawn candidates wins each tournament.
    pub fn tournament_select_two_solutions(&mut self, k: usize) -> (Solution, Solution) {
        debug_assert!(self.items.len() >= 2);
        let k = k.min(self.items.len());
        self.update_fitness();

        let parent1_index = {
            let candidates: Vec<usize> =
                (0..k).map(|_| self.rng.index(self.items.len())).collect();
            self.min_fitness_index(&candidates)
        };

        let parent2_index = {
            let mut candidates = Vec::with_capacity(k);
            for _ in 0..k {
                let mut candidate = self.rng.index(self.items.len());
                while candidate == parent1_index {
                    candidate = self.rng.index(self.items.len());
                }
                candidates.push(candidate);
            }
            self.min_fitness_index(&candidates)
        };

        (
            self.items[parent1_index].solution.clone(),
            self.items[parent2_index].solution.clone(),
        )
    }

    fn min_fitness_index(&self, candidates: &[usize]) -> usize {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.items[a].fitness.total_cmp(&self.items[b].fitness))
            .unwrap()
    }

    /// Builds the initial population. An optional stopping callback sees
    /// every freshly generated objective and aborts initialization early by
    /// returning true. Returns the best member generated so far.
    pub fn initialize(
        &mut self,
        mut stopping_criterion: Option<&mut dyn FnMut(NumPairs) -> bool>,
    ) -> Result<(Solution, NumPairs), Error> {
        self.items.clear();

        for _ in 0..self.initial_pop_size {
            let (solution, obj_value) = self.generate_non_duplicate_solution()?;

            if let Some(stop) = stopping_criterion.as_deref_mut() {
                if stop(obj_value) {
                    return Ok((solution, obj_value));
                }
            }

            self.add(&solution, obj_value);
        }

        let best = self.get_best_item().unwrap();
        Ok((best.solution.clone(), best.obj_value))
    }

    /// Refines a random feasible state with the configured search; on a
    /// duplicate against the population, up to ten swap repairs are applied.
    pub fn generate_non_duplicate_solution(&mut self) -> Result<(Solution, NumPairs), Error> {
        let seed = self.seed_counter;
        self.seed_counter += 1;

        let mut new_graph = self.graph.random_feasible_graph();
        {
            let mut local_search = Search::new(&mut new_graph, seed);
            local_search.set_strategy(&self.search_name)?;
            local_search.run()?;
        }

        let mut attempts = 0;
        while self.is_duplicate(new_graph.removed_nodes()) && attempts < 10 {
            let node_to_add = new_graph.greedy_select_node_to_add()?;
            new_graph.add_node(node_to_add);

            let node_to_remove = new_graph.random_select_node_to_remove()?;
            new_graph.remove_node(node_to_remove);
            attempts += 1;
        }

        Ok((new_graph.removed_nodes().clone(), new_graph.objective_value()))
    }

    fn expand(&mut self) -> Result<(), Error> {
        let target = self.items.len() + self.increase_pop_size;
        while self.items.len() < target {
            let (solution, obj_value) = self.generate_non_duplicate_solution()?;
            self.add(&solution, obj_value);
        }
        Ok(())
    }

    /// Restart keeping only the best member, refilled with one fresh
    /// non-duplicate.
    fn rebuild(&mut self) -> Result<(), Error> {
        let best = match self.get_best_item() {
            Some(best) => Item {
                solution: best.solution.clone(),
                obj_value: best.obj_value,
                fitness: best.fitness,
                id: self.next_item_id,
                similarity: Vec::new(),
            },
            None => return Ok(()),
        };
        self.next_item_id += 1;

        self.items.clear();
        self.items.push(best);

        let (solution, obj_value) = self.generate_non_duplicate_solution()?;
        self.add(&solution, obj_value);
        Ok(())
    }
}

/// 1-based ascending ranks under a stable order.
fn ranks(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let mut ranks = vec![0usize; values.len()];
    for (rank, &index) in indices.iter().enumerate() {
        ranks[index] = rank + 1;
    }
    ranks
}
