use crate::errors::Error;
use crate::graph::{Graph, Node, Solution};
use crate::utils::RandomNumberGenerator;

/// Fraction of the target cardinality filled by probabilistic inheritance;
/// the remainder is repaired greedily.
pub const TARGET_RATIO: f64 = 0.9;
/// Probability band for vertices shared by two parents.
pub const P2: f64 = 0.5;
/// Probability band (conditional) for vertices in exactly one parent.
pub const P1: f64 = 0.9;

/// Inherit-repair recombination over three parents.
///
/// Vertices present in all three parents are inherited unconditionally.
/// Further vertices are drawn by frequency band (two parents, one parent,
/// none) until ⌊0.9·N⌋ vertices are chosen, where N is the first parent's
/// cardinality. The offspring is then topped up to N with best-removal
/// moves.
pub fn inherit_repair_recombination(
    original: &Graph,
    parents: (&Solution, &Solution, &Solution),
    seed: u64,
) -> Result<Graph, Error> {
    let mut rng = RandomNumberGenerator::new(seed);
    let n = original.number_of_nodes() as usize;
    let target_count = parents.0.len();

    let mut frequency = vec![0u8; n];
    let mut nodes_to_remove = Solution::default();
    for parent in [parents.0, parents.1, parents.2] {
        for &node in parent {
            frequency[node as usize] += 1;
            if frequency[node as usize] == 3 {
                nodes_to_remove.insert(node);
            }
        }
    }

    let mut freq2: Vec<Node> = Vec::new();
    let mut freq1: Vec<Node> = Vec::new();
    let mut freq0: Vec<Node> = Vec::new();
    for node in 0..n as Node {
        if nodes_to_remove.contains(&node) {
            continue;
        }
        match frequency[node as usize] {
            2 => freq2.push(node),
            1 => freq1.push(node),
            0 => freq0.push(node),
            _ => unreachable!(),
        }
    }

    let inherit_target = (TARGET_RATIO * target_count as f64) as usize;
    while nodes_to_remove.len() < inherit_target {
        if freq2.is_empty() && freq1.is_empty() && freq0.is_empty() {
            break;
        }

        let r = rng.probability();
        if r < P2 && !freq2.is_empty() {
            let index = rng.index(freq2.len());
            nodes_to_remove.insert(freq2.swap_remove(index));
        } else if r < P2 + (1.0 - P2) * P1 && !freq1.is_empty() {
            let index = rng.index(freq1.len());
            nodes_to_remove.insert(freq1.swap_remove(index));
        } else if !freq0.is_empty() {
            let index = rng.index(freq0.len());
            nodes_to_remove.insert(freq0.swap_remove(index));
        }
    }

    let mut offspring = original.clone();
    offspring.update_by_removed_set(&nodes_to_remove);

    while nodes_to_remove.len() < target_count {
        let node_to_remove = offspring.find_best_node_to_remove()?;
        offspring.remove_node(node_to_remove);
        nodes_to_remove.insert(node_to_remove);
    }

    Ok(offspring)
}
