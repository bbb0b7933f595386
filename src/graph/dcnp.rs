use fxhash::FxHashSet;

use super::{Age, BitSet, Node, NumNodes, NumPairs, ProblemData, Solution};
use crate::errors::Error;
use crate::utils::{EpochMarker, RandomNumberGenerator};

/// Residual-graph engine for the distance-based critical node problem.
///
/// For every unremoved vertex `v` the engine maintains `intree[v]`, the set
/// of vertices reachable from `v` within `k_hops` in `G[V \ S]` (including
/// `v` itself), and `tree_size[v] = |intree[v]| - 1`. The objective is half
/// the sum of all tree sizes, since reachability within K hops is symmetric.
///
/// The reach matrix dominates the memory footprint at n² bits; incremental
/// maintenance rebuilds exactly the rows an add/remove can affect.
#[derive(Clone)]
pub struct DcnpGraph {
    budget: NumNodes,
    k_hops: NumNodes,
    alive: Vec<Node>,
    original_adj: Vec<FxHashSet<Node>>,
    current_adj: Vec<FxHashSet<Node>>,
    removed: Solution,
    age: Vec<Age>,
    intree: Vec<BitSet>,
    tree_size: Vec<NumNodes>,
    rng: RandomNumberGenerator,

    // BFS scratch, sized to n at construction and reused across calls.
    bfs_queue: Vec<Node>,
    bfs_level: Vec<NumNodes>,
    visit: EpochMarker,
}

impl DcnpGraph {
    pub fn new(data: &ProblemData, k_hops: NumNodes, budget: NumNodes, seed: u64) -> Self {
        let n = data.number_of_nodes() as usize;
        let adj = data.adjacency().to_vec();

        let mut graph = Self {
            budget,
            k_hops,
            alive: (0..n as Node).collect(),
            original_adj: adj.clone(),
            current_adj: adj,
            removed: Solution::default(),
            age: vec![0; n],
            intree: vec![BitSet::new(n as NumNodes); n],
            tree_size: vec![0; n],
            rng: RandomNumberGenerator::new(seed),
            bfs_queue: Vec::with_capacity(n),
            bfs_level: vec![0; n],
            visit: EpochMarker::new(n),
        };
        graph.build_tree();
        graph
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.original_adj.len() as NumNodes
    }

    pub fn budget(&self) -> NumNodes {
        self.budget
    }

    pub fn k_hops(&self) -> NumNodes {
        self.k_hops
    }

    pub fn is_node_removed(&self, node: Node) -> bool {
        self.removed.contains(&node)
    }

    pub fn removed_nodes(&self) -> &Solution {
        &self.removed
    }

    pub fn tree_size(&self, node: Node) -> NumNodes {
        self.tree_size[node as usize]
    }

    /// Vertices reachable from `node` within the hop limit, including the
    /// node itself.
    pub fn reachable_within_k(&self, node: Node) -> &BitSet {
        &self.intree[node as usize]
    }

    pub fn set_node_age(&mut self, node: Node, age: Age) {
        self.age[node as usize] = age;
    }

    /// Half the sum of all tree sizes over the unremoved vertices.
    pub fn objective_value(&self) -> NumPairs {
        let sum: NumPairs = (0..self.number_of_nodes())
            .filter(|&v| !self.is_node_removed(v))
            .map(|v| self.tree_size[v as usize] as NumPairs)
            .sum();
        sum / 2
    }

    /// Rebuilds the K-hop tree of `v`: a breadth-first search bounded at
    /// `k_hops` levels over the residual graph.
    fn bfs_k_tree(&mut self, v: Node) {
        self.intree[v as usize].unset_all();
        if self.is_node_removed(v) {
            self.tree_size[v as usize] = 0;
            return;
        }

        self.visit.next_epoch();
        self.bfs_queue.clear();
        self.bfs_queue.push(v);
        self.visit.mark(v as usize);
        self.bfs_level[v as usize] = 0;

        let mut head = 0usize;
        let mut visited_count: NumNodes = 0;
        while head < self.bfs_queue.len() {
            let current = self.bfs_queue[head];
            head += 1;

            if self.bfs_level[current as usize] < self.k_hops {
                for &neighbor in &self.current_adj[current as usize] {
                    if self.removed.contains(&neighbor) || self.visit.is_marked(neighbor as usize)
                    {
                        continue;
                    }
                    self.visit.mark(neighbor as usize);
                    self.bfs_level[neighbor as usize] = self.bfs_level[current as usize] + 1;
                    self.bfs_queue.push(neighbor);
                }
            }

            self.intree[v as usize].set_bit(current);
            visited_count += 1;
        }

        self.tree_size[v as usize] = visited_count.saturating_sub(1);
    }

    /// Recomputes every K-hop tree from scratch.
    pub fn build_tree(&mut self) {
        for v in 0..self.number_of_nodes() {
            self.bfs_k_tree(v);
        }
    }

    /// Replaces the removed set and recomputes all trees.
    pub fn update_by_removed_set(&mut self, nodes_to_remove: &Solution) {
        self.removed = nodes_to_remove.clone();
        self.current_adj.clone_from(&self.original_adj);
        self.build_tree();
    }

    /// Permanently deletes `nodes_to_delete` from the instance and shrinks
    /// the budget accordingly; the removed set is reset.
    pub fn reduced_graph_by_removed_set(&mut self, nodes_to_delete: &Solution) {
        debug_assert!(nodes_to_delete.len() as NumNodes <= self.budget);
        self.removed.clear();
        self.budget -= nodes_to_delete.len() as NumNodes;

        for &node in nodes_to_delete {
            let neighbors = std::mem::take(&mut self.original_adj[node as usize]);
            for &neighbor in &neighbors {
                self.original_adj[neighbor as usize].remove(&node);
            }
        }
        self.alive.retain(|node| !nodes_to_delete.contains(node));

        self.current_adj.clone_from(&self.original_adj);
        self.build_tree();
    }

    /// Re-inserts `node` and rebuilds its tree plus the trees of every
    /// vertex it can now reach: those are the only rows whose reach may
    /// have expanded.
    pub fn add_node(&mut self, node: Node) {
        debug_assert!(self.is_node_removed(node));
        self.removed.remove(&node);

        self.bfs_k_tree(node);
        let reachable: Vec<Node> = self.intree[node as usize].iter_set_bits().collect();
        for member in reachable {
            self.bfs_k_tree(member);
        }
    }

    /// Removes `node` and rebuilds the trees of every vertex that could
    /// reach it: those are the only rows whose reach may have shrunk. The
    /// vertex's own row is cleared along the way.
    pub fn remove_node(&mut self, node: Node) {
        debug_assert!(!self.is_node_removed(node));
        self.removed.insert(node);

        for v in 0..self.number_of_nodes() {
            if self.intree[v as usize].get_bit(node) {
                self.bfs_k_tree(v);
            }
        }
    }

    /// Brandes betweenness centrality restricted to the residual graph.
    /// Used as a static vertex ranking; removed vertices score zero.
    pub fn betweenness_centrality(&self) -> Vec<f64> {
        let n = self.number_of_nodes() as usize;
        let mut betweenness = vec![0.0f64; n];
        let mut distance = vec![-1i64; n];
        let mut sigma = vec![0u64; n];
        let mut delta = vec![0.0f64; n];
        let mut predecessors: Vec<Vec<Node>> = vec![Vec::new(); n];
        let mut order: Vec<Node> = Vec::with_capacity(n);

        for s in 0..n as Node {
            if self.is_node_removed(s) {
                continue;
            }

            distance.iter_mut().for_each(|d| *d = -1);
            sigma.iter_mut().for_each(|x| *x = 0);
            delta.iter_mut().for_each(|x| *x = 0.0);
            predecessors.iter_mut().for_each(|p| p.clear());
            order.clear();

            sigma[s as usize] = 1;
            distance[s as usize] = 0;
            order.push(s);

            let mut head = 0usize;
            while head < order.len() {
                let v = order[head];
                head += 1;

                for &w in &self.current_adj[v as usize] {
                    if self.is_node_removed(w) {
                        continue;
                    }
                    if distance[w as usize] < 0 {
                        distance[w as usize] = distance[v as usize] + 1;
                        order.push(w);
                    }
                    if distance[w as usize] == distance[v as usize] + 1 {
                        sigma[w as usize] += sigma[v as usize];
                        predecessors[w as usize].push(v);
                    }
                }
            }

            for &w in order.iter().rev() {
                for &v in &predecessors[w as usize] {
                    delta[v as usize] += (sigma[v as usize] as f64 / sigma[w as usize] as f64)
                        * (1.0 + delta[w as usize]);
                }
                if w != s {
                    betweenness[w as usize] += delta[w as usize];
                }
            }
        }

        betweenness
    }

    /// Speculatively removes every unremoved vertex and keeps the one with
    /// the largest objective drop, breaking ties uniformly; each trial is
    /// rolled back through the incremental add.
    pub fn find_best_node_to_remove(&mut self) -> Result<Node, Error> {
        let current_objective = self.objective_value();
        let mut max_improvement: NumPairs = 0;
        let mut candidates: Vec<Node> = Vec::new();

        for v in 0..self.number_of_nodes() {
            if self.is_node_removed(v) {
                continue;
            }

            self.remove_node(v);
            let improvement = current_objective - self.objective_value();
            self.add_node(v);

            if improvement > max_improvement {
                max_improvement = improvement;
                candidates.clear();
                candidates.push(v);
            } else if improvement == max_improvement {
                candidates.push(v);
            }
        }

        if candidates.is_empty() {
            return Err(Error::NoComponents);
        }
        Ok(self.pick_uniform(&candidates))
    }

    /// Speculatively re-inserts every removed vertex and keeps the one with
    /// the smallest objective increase, breaking ties uniformly.
    pub fn find_best_node_to_add(&mut self) -> Result<Node, Error> {
        if self.removed.is_empty() {
            return Err(Error::NoRemovedNodes);
        }

        let current_objective = self.objective_value();
        let mut min_deterioration = NumPairs::MAX;
        let mut candidates: Vec<Node> = Vec::new();

        let removed: Vec<Node> = self.removed.iter().copied().collect();
        for node in removed {
            self.add_node(node);
            let deterioration = self.objective_value() - current_objective;
            self.remove_node(node);

            if deterioration < min_deterioration {
                min_deterioration = deterioration;
                candidates.clear();
                candidates.push(node);
            } else if deterioration == min_deterioration {
                candidates.push(node);
            }
        }

        Ok(self.pick_uniform(&candidates))
    }

    /// Uniform unremoved vertex, by rejection sampling as long as the draw
    /// hits the removed set.
    pub fn random_select_node_to_remove(&mut self) -> Result<Node, Error> {
        debug_assert!(self.removed.len() < self.alive.len());

        let n = self.number_of_nodes() as usize;
        loop {
            let node = self.rng.index(n) as Node;
            if !self.is_node_removed(node) {
                return Ok(node);
            }
        }
    }

    /// Clone of this graph with a fresh, uniformly drawn removed set of
    /// budget size.
    pub fn random_feasible_graph(&mut self) -> DcnpGraph {
        let mut graph = self.clone();

        let mut available = self.alive.clone();
        let mut solution = Solution::default();
        for _ in 0..self.budget {
            if available.is_empty() {
                break;
            }
            let choice = self.rng.index(available.len());
            solution.insert(available.swap_remove(choice));
        }

        graph.update_by_removed_set(&solution);
        graph
    }

    fn pick_uniform(&mut self, candidates: &[Node]) -> Node {
        debug_assert!(!candidates.is_empty());
        if candidates.len() == 1 {
            candidates[0]
        } else {
            candidates[self.rng.index(candidates.len())]
        }
    }
}
