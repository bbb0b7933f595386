use crate::errors::Error;
use crate::graph::{Graph, Solution};
use crate::utils::RandomNumberGenerator;

/// Inheritance probability for vertices outside the common backbone.
pub const THETA: f64 = 0.85;

/// Double-backbone crossover.
///
/// The common backbone of the two parents is inherited unconditionally;
/// every other parent vertex is inherited with probability [`THETA`]. The
/// offspring is then repaired to the first parent's cardinality: component
/// removals while short, greedy re-insertions while over.
pub fn double_backbone_crossover(
    original: &Graph,
    male: &Solution,
    female: &Solution,
    seed: u64,
) -> Result<Graph, Error> {
    let mut rng = RandomNumberGenerator::new(seed);

    let mut nodes_to_remove = Solution::default();
    for &node in male {
        if female.contains(&node) || rng.probability() < THETA {
            nodes_to_remove.insert(node);
        }
    }
    for &node in female {
        if nodes_to_remove.contains(&node) {
            continue;
        }
        if rng.probability() < THETA {
            nodes_to_remove.insert(node);
        }
    }

    let mut offspring = original.clone();
    offspring.update_by_removed_set(&nodes_to_remove);

    let target_count = male.len();
    while offspring.removed_nodes().len() < target_count {
        let component = offspring.select_component()?;
        let node_to_remove = offspring.random_select_node_from_component(component)?;
        offspring.remove_node(node_to_remove);
    }
    while offspring.removed_nodes().len() > target_count {
        let node_to_add = offspring.greedy_select_node_to_add()?;
        offspring.add_node(node_to_add);
    }

    Ok(offspring)
}
