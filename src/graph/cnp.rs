use fxhash::FxHashSet;

use super::{
    pair_count, Age, BitSet, ComponentIndex, Node, NumNodes, NumPairs, ProblemData, Solution,
    INVALID_COMPONENT,
};
use crate::errors::Error;
use crate::utils::{EpochMarker, RandomNumberGenerator};

/// A maximal connected subgraph of the residual graph, stored as the list of
/// its member vertices in discovery order.
#[derive(Clone, Debug, Default)]
pub struct Component {
    pub nodes: Vec<Node>,
}

impl Component {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of connected vertex pairs this component contributes.
    pub fn pair_count(&self) -> NumPairs {
        pair_count(self.nodes.len())
    }
}

/// Residual-graph engine for the critical node problem.
///
/// Maintains the connected components of `G[V \ S]` incrementally under
/// single-vertex add/remove moves, together with the aggregate objective
/// `connected_pairs = Σ |C|·(|C|−1)/2`.
///
/// Invariants outside a mutating call:
/// * the components partition the unremoved vertices,
/// * every residual edge lies inside exactly one component,
/// * `node_to_component` maps each unremoved vertex to its component,
/// * `connected_pairs` matches the component sizes.
#[derive(Clone)]
pub struct CnpGraph {
    budget: NumNodes,
    /// Vertices that still exist in the instance; shrinks only under
    /// [`CnpGraph::reduced_graph_by_removed_set`].
    alive: Vec<Node>,
    original_adj: Vec<FxHashSet<Node>>,
    current_adj: Vec<FxHashSet<Node>>,
    removed: Solution,
    age: Vec<Age>,
    components: Vec<Component>,
    node_to_component: Vec<ComponentIndex>,
    connected_pairs: NumPairs,
    rng: RandomNumberGenerator,

    // Scratch buffers, sized to n at construction and reused across calls.
    dfs_stack: Vec<Node>,
    visit: EpochMarker,
    split_seen: BitSet,
}

impl CnpGraph {
    pub fn new(data: &ProblemData, budget: NumNodes, seed: u64) -> Self {
        let n = data.number_of_nodes() as usize;
        let adj = data.adjacency().to_vec();

        let mut graph = Self {
            budget,
            alive: (0..n as Node).collect(),
            original_adj: adj.clone(),
            current_adj: adj,
            removed: Solution::default(),
            age: vec![0; n],
            components: Vec::new(),
            node_to_component: vec![INVALID_COMPONENT; n],
            connected_pairs: 0,
            rng: RandomNumberGenerator::new(seed),
            dfs_stack: Vec::with_capacity(n),
            visit: EpochMarker::new(n),
            split_seen: BitSet::new(n as NumNodes),
        };
        graph.rebuild_components();
        graph
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.original_adj.len() as NumNodes
    }

    pub fn budget(&self) -> NumNodes {
        self.budget
    }

    pub fn objective_value(&self) -> NumPairs {
        self.connected_pairs
    }

    pub fn is_node_removed(&self, node: Node) -> bool {
        self.removed.contains(&node)
    }

    pub fn removed_nodes(&self) -> &Solution {
        &self.removed
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component index of an unremoved vertex.
    pub fn component_of_node(&self, node: Node) -> Option<ComponentIndex> {
        let index = self.node_to_component[node as usize];
        (index != INVALID_COMPONENT).then_some(index)
    }

    pub fn set_node_age(&mut self, node: Node, age: Age) {
        self.age[node as usize] = age;
    }

    /// Replaces the removed set with `nodes_to_remove` and recomputes the
    /// residual adjacency and all component state from scratch.
    pub fn update_by_removed_set(&mut self, nodes_to_remove: &Solution) {
        self.removed = nodes_to_remove.clone();
        self.current_adj.clone_from(&self.original_adj);

        for &node in &self.removed {
            for &neighbor in &self.original_adj[node as usize] {
                self.current_adj[neighbor as usize].remove(&node);
            }
            self.current_adj[node as usize].clear();
        }

        self.rebuild_components();
    }

    /// Permanently deletes `nodes_to_delete` from the instance and shrinks the
    /// budget accordingly. The removed set is reset; the deleted vertices no
    /// longer participate in any operation.
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
        self.rebuild_components();
    }

    fn rebuild_components(&mut self) {
        self.node_to_component
            .iter_mut()
            .for_each(|c| *c = INVALID_COMPONENT);
        self.components.clear();
        self.connected_pairs = 0;

        for i in 0..self.alive.len() {
            let node = self.alive[i];
            if self.node_to_component[node as usize] != INVALID_COMPONENT
                || self.is_node_removed(node)
            {
                continue;
            }

            let component = self.dfs_component(node);
            let index = self.components.len();
            for &member in &component.nodes {
                self.node_to_component[member as usize] = index;
            }
            self.connected_pairs += component.pair_count();
            self.components.push(component);
        }
    }

    /// Iterative DFS over the residual graph collecting the component of
    /// `start` in discovery order. The visit marker resets in O(1) per call.
    fn dfs_component(&mut self, start: Node) -> Component {
        self.visit.next_epoch();
        self.dfs_stack.clear();
        self.dfs_stack.push(start);

        let mut nodes = Vec::new();
        while let Some(node) = self.dfs_stack.pop() {
            if self.visit.is_marked(node as usize) || self.is_node_removed(node) {
                continue;
            }
            self.visit.mark(node as usize);
            nodes.push(node);

            for &neighbor in &self.current_adj[node as usize] {
                if !self.visit.is_marked(neighbor as usize) && !self.removed.contains(&neighbor) {
                    self.dfs_stack.push(neighbor);
                }
            }
        }

        Component { nodes }
    }

    /// Moves `node` into the removed set and repairs the component structure:
    /// either the component shrinks by one vertex or it splits, in which case
    /// the surviving piece keeps the old index and every further piece is
    /// appended.
    pub fn remove_node(&mut self, node: Node) {
        debug_assert!(!self.is_node_removed(node));
        let component_index = self.node_to_component[node as usize];
        debug_assert_ne!(component_index, INVALID_COMPONENT);

        let original_nodes = self.components[component_index].nodes.clone();
        let original_size = original_nodes.len();

        self.removed.insert(node);
        self.node_to_component[node as usize] = INVALID_COMPONENT;

        let neighbors = std::mem::take(&mut self.current_adj[node as usize]);
        for &neighbor in &neighbors {
            self.current_adj[neighbor as usize].remove(&node);
        }

        if original_size == 1 {
            // A singleton contributes no pairs; only the index gap closes.
            self.components.remove(component_index);
            for component in &self.components[component_index..] {
                for &member in &component.nodes {
                    self.node_to_component[member as usize] -= 1;
                }
            }
            return;
        }

        self.components[component_index]
            .nodes
            .retain(|&member| member != node);
        let shrunk_size = self.components[component_index].len();

        let start_node = original_nodes
            .iter()
            .copied()
            .find(|&member| member != node)
            .unwrap();
        let new_component = self.dfs_component(start_node);

        if new_component.len() == shrunk_size {
            // Still connected: exactly the pairs through `node` are lost.
            self.connected_pairs -= new_component.len() as NumPairs;
            return;
        }

        // The component split. The piece found first replaces the original
        // entry; remaining pieces are discovered from the leftover members.
        self.connected_pairs -= pair_count(original_size);
        self.connected_pairs += new_component.pair_count();

        self.split_seen.unset_all();
        for &member in &new_component.nodes {
            self.split_seen.set_bit(member);
            self.node_to_component[member as usize] = component_index;
        }
        self.components[component_index] = new_component;

        for &member in &original_nodes {
            if member == node || self.split_seen.get_bit(member) {
                continue;
            }

            let split = self.dfs_component(member);
            let new_index = self.components.len();
            self.connected_pairs += split.pair_count();
            for &piece_member in &split.nodes {
                self.split_seen.set_bit(piece_member);
                self.node_to_component[piece_member as usize] = new_index;
            }
            self.components.push(split);
        }
    }

    /// Takes `node` out of the removed set, re-inserts its residual edges and
    /// repairs the component structure: the vertex becomes a singleton, joins
    /// one component, or merges several components into a new one.
    pub fn add_node(&mut self, node: Node) {
        debug_assert!(self.is_node_removed(node));
        self.removed.remove(&node);

        let mut component_index = INVALID_COMPONENT;
        for &neighbor in &self.original_adj[node as usize] {
            if self.node_to_component[neighbor as usize] == INVALID_COMPONENT {
                continue;
            }
            self.current_adj[node as usize].insert(neighbor);
            self.current_adj[neighbor as usize].insert(node);
            if component_index == INVALID_COMPONENT {
                component_index = self.node_to_component[neighbor as usize];
            }
        }

        if component_index == INVALID_COMPONENT {
            self.node_to_component[node as usize] = self.components.len();
            self.components.push(Component { nodes: vec![node] });
            return;
        }

        self.components[component_index].nodes.push(node);
        self.node_to_component[node as usize] = component_index;

        let new_component = self.dfs_component(node);

        if new_component.len() == self.components[component_index].len() {
            // Joined a single component: its size grew by one.
            self.connected_pairs += (self.components[component_index].len() - 1) as NumPairs;
            return;
        }

        // The vertex bridges several components; replace them by the union.
        self.components[component_index].nodes.pop();

        let mut merged: Vec<ComponentIndex> = Vec::new();
        for &member in &new_component.nodes {
            let index = self.node_to_component[member as usize];
            if index != INVALID_COMPONENT && !merged.contains(&index) {
                merged.push(index);
            }
        }
        merged.sort_unstable();

        // Remap surviving indices; entries of merged components are
        // overwritten below when the union is assigned.
        for index in self.node_to_component.iter_mut() {
            if *index != INVALID_COMPONENT {
                let shift = merged.partition_point(|&m| m < *index);
                *index -= shift;
            }
        }

        for &index in merged.iter().rev() {
            self.connected_pairs -= self.components[index].pair_count();
            self.components.remove(index);
        }

        self.connected_pairs += new_component.pair_count();
        let new_index = self.components.len();
        for &member in &new_component.nodes {
            self.node_to_component[member as usize] = new_index;
        }
        self.components.push(new_component);
    }

    /// Picks a component for the next move. With many components the choice
    /// is proportional to size among the above-average ones; otherwise a
    /// jittered size threshold keeps the focus on the larger components.
    pub fn select_component(&mut self) -> Result<ComponentIndex, Error> {
        let num_components = self.components.len();
        if num_components == 0 {
            return Err(Error::NoComponents);
        }
        if num_components > 50 {
            return self.select_larger_component();
        }

        let mut min_size = self.number_of_nodes() as i64;
        let mut max_size = 0i64;
        for component in &self.components {
            let size = component.len() as i64;
            if size > 2 {
                min_size = min_size.min(size);
                max_size = max_size.max(size);
            }
        }

        let threshold = max_size as f64
            - (max_size - min_size) as f64 * 0.5
            - self.rng.index(3) as f64;

        let candidates: Vec<ComponentIndex> = (0..num_components)
            .filter(|&i| self.components[i].len() as f64 >= threshold)
            .collect();

        if candidates.is_empty() {
            return self.largest_component().ok_or(Error::NoComponents);
        }
        let choice = self.rng.index(candidates.len());
        Ok(candidates[choice])
    }

    /// Size-proportional selection among components larger than the mean
    /// residual component size.
    fn select_larger_component(&mut self) -> Result<ComponentIndex, Error> {
        let total_size = self.number_of_nodes() as usize - self.removed.len();
        let num_components = self.components.len();
        let avg_size = ((total_size as f32 / num_components as f32).round() as usize).max(2);

        let mut large: Vec<ComponentIndex> = Vec::with_capacity(num_components);
        let mut sizes: Vec<usize> = Vec::with_capacity(num_components);
        let mut nodes_in_large = 0usize;
        for (index, component) in self.components.iter().enumerate() {
            if component.len() > avg_size {
                large.push(index);
                sizes.push(component.len());
                nodes_in_large += component.len();
            }
        }

        if large.is_empty() {
            return self.largest_component().ok_or(Error::NoComponents);
        }

        if large.len() == 1 {
            let second = self.second_largest_component().unwrap_or(large[0]);
            return Ok(if self.rng.gen_bool(0.5) { second } else { large[0] });
        }

        let target = self.rng.index(nodes_in_large);
        let mut prefix = 0usize;
        for (i, &size) in sizes.iter().enumerate() {
            prefix += size;
            if target < prefix {
                return Ok(large[i]);
            }
        }
        Ok(*large.last().unwrap())
    }

    fn largest_component(&self) -> Option<ComponentIndex> {
        let mut best = None;
        let mut best_size = 0usize;
        for (index, component) in self.components.iter().enumerate() {
            if component.len() > best_size {
                best_size = component.len();
                best = Some(index);
            }
        }
        best
    }

    fn second_largest_component(&self) -> Option<ComponentIndex> {
        let mut best: Option<(usize, ComponentIndex)> = None;
        let mut second: Option<(usize, ComponentIndex)> = None;
        for (index, component) in self.components.iter().enumerate() {
            let entry = (component.len(), index);
            if best.map_or(true, |(size, _)| component.len() > size) {
                second = best;
                best = Some(entry);
            } else if second.map_or(true, |(size, _)| component.len() > size) {
                second = Some(entry);
            }
        }
        second.map(|(_, index)| index)
    }

    pub fn random_select_node_from_component(
        &mut self,
        component_index: ComponentIndex,
    ) -> Result<Node, Error> {
        let len = self.components[component_index].len();
        if len == 0 {
            return Err(Error::EmptyComponent);
        }
        let choice = self.rng.index(len);
        Ok(self.components[component_index].nodes[choice])
    }

    /// Selects a minimum-age member of the component, breaking ties uniformly.
    pub fn age_select_node_from_component(
        &mut self,
        component_index: ComponentIndex,
    ) -> Result<Node, Error> {
        if self.components[component_index].is_empty() {
            return Err(Error::EmptyComponent);
        }

        let mut candidates = Vec::with_capacity(self.components[component_index].len());
        let mut min_age = Age::MAX;
        for i in 0..self.components[component_index].len() {
            let member = self.components[component_index].nodes[i];
            let age = self.age[member as usize];
            if age < min_age {
                min_age = age;
                candidates.clear();
                candidates.push(member);
            } else if age == min_age {
                candidates.push(member);
            }
        }

        Ok(self.pick_uniform(&candidates))
    }

    /// Selects a member whose removal is estimated to reduce the connected
    /// pairs the most, via an articulation-point analysis of the component.
    ///
    /// Tarjan's DFS (iterative, to survive long paths) yields for every
    /// member its `dfn`/`low` numbers and subtree size. For an articulation
    /// vertex the detached subtrees plus the remainder bound the pairs
    /// surviving its removal; for any other vertex the component merely
    /// shrinks by one.
    pub fn impact_select_node_from_component(
        &mut self,
        component_index: ComponentIndex,
    ) -> Result<Node, Error> {
        let m = self.components[component_index].len();
        if m == 0 {
            return Err(Error::EmptyComponent);
        }

        let nodes = self.components[component_index].nodes.clone();

        // Local numbering, independent of vertex ids. Stale entries are never
        // read: membership is checked through `node_to_component` first.
        let mut local_index = vec![0 as NumNodes; self.number_of_nodes() as usize];
        for (i, &member) in nodes.iter().enumerate() {
            local_index[member as usize] = i as NumNodes;
        }

        let mut local_adj: Vec<Vec<NumNodes>> = vec![Vec::new(); m];
        for (i, &member) in nodes.iter().enumerate() {
            for &neighbor in &self.current_adj[member as usize] {
                if !self.removed.contains(&neighbor)
                    && self.node_to_component[neighbor as usize] == component_index
                {
                    local_adj[i].push(local_index[neighbor as usize]);
                }
            }
        }

        let mut dfn = vec![0 as NumNodes; m];
        let mut low = vec![0 as NumNodes; m];
        let mut subtree_size = vec![1 as NumNodes; m];
        let mut cut_size = vec![1 as NumNodes; m];
        let mut detached_pairs = vec![0 as NumPairs; m];
        let mut num_articulated = vec![0u32; m];
        let mut is_cut = vec![false; m];

        const ROOT: usize = 0;
        let mut timestamp: NumNodes = 1;
        dfn[ROOT] = timestamp;
        low[ROOT] = timestamp;

        // Frames of (vertex, dfs parent, next neighbor position).
        let mut stack: Vec<(usize, usize, usize)> = Vec::with_capacity(m);
        stack.push((ROOT, usize::MAX, 0));

        while let Some(&mut (v, parent, ref mut next)) = stack.last_mut() {
            let pos = *next;
            *next += 1;

            if pos < local_adj[v].len() {
                let w = local_adj[v][pos] as usize;
                if dfn[w] == 0 {
                    timestamp += 1;
                    dfn[w] = timestamp;
                    low[w] = timestamp;
                    stack.push((w, v, 0));
                } else {
                    low[v] = low[v].min(dfn[w]);
                }
                continue;
            }

            stack.pop();
            if parent == usize::MAX {
                continue;
            }

            low[parent] = low[parent].min(low[v]);
            subtree_size[parent] += subtree_size[v];

            if low[v] >= dfn[parent] {
                num_articulated[parent] += 1;
                cut_size[parent] += subtree_size[v];
                detached_pairs[parent] += pair_count(subtree_size[v] as usize);

                // the root cuts only with at least two DFS children
                if parent != ROOT || num_articulated[parent] > 1 {
                    is_cut[parent] = true;
                }
            }
        }
        debug_assert_eq!(timestamp as usize, m);

        let mut min_impact = NumPairs::MAX;
        let mut candidates = Vec::new();
        for i in 0..m {
            let impact = if is_cut[i] {
                detached_pairs[i] + pair_count(m - cut_size[i] as usize)
            } else {
                pair_count(m - 1)
            };

            if impact < min_impact {
                min_impact = impact;
                candidates.clear();
                candidates.push(nodes[i]);
            } else if impact == min_impact {
                candidates.push(nodes[i]);
            }
        }

        Ok(self.pick_uniform(&candidates))
    }

    /// Among the removed vertices, selects one whose re-insertion would add
    /// the fewest connected pairs, breaking ties uniformly.
    pub fn greedy_select_node_to_add(&mut self) -> Result<Node, Error> {
        if self.removed.is_empty() {
            return Err(Error::NoRemovedNodes);
        }

        let mut candidates = Vec::with_capacity(self.removed.len());
        let mut min_gain = NumPairs::MAX;
        let removed: Vec<Node> = self.removed.iter().copied().collect();
        for node in removed {
            let gain = self.connection_gain(node);
            if gain < min_gain {
                min_gain = gain;
                candidates.clear();
                candidates.push(node);
            } else if gain == min_gain {
                candidates.push(node);
            }
        }

        Ok(self.pick_uniform(&candidates))
    }

    /// Pair-count increase caused by re-inserting `node`: the components
    /// touched by its original neighbors fuse into one of size
    /// `1 + Σ sizes`.
    pub fn connection_gain(&self, node: Node) -> NumPairs {
        let mut touched: Vec<ComponentIndex> = Vec::new();
        let mut total_size = 1usize;

        for &neighbor in &self.original_adj[node as usize] {
            let index = self.node_to_component[neighbor as usize];
            if index != INVALID_COMPONENT && !touched.contains(&index) {
                total_size += self.components[index].len();
                touched.push(index);
            }
        }

        let old_pairs: NumPairs = touched
            .iter()
            .map(|&index| self.components[index].pair_count())
            .sum();

        pair_count(total_size) - old_pairs
    }

    /// Uniform member of a uniformly chosen component.
    pub fn random_select_node_to_remove(&mut self) -> Result<Node, Error> {
        if self.components.is_empty() {
            return Err(Error::NoComponents);
        }
        let component_index = self.rng.index(self.components.len());
        let len = self.components[component_index].len();
        if len == 0 {
            return Err(Error::EmptyComponent);
        }
        let choice = self.rng.index(len);
        Ok(self.components[component_index].nodes[choice])
    }

    /// Clone of this graph with a fresh, uniformly drawn removed set of
    /// budget size. The clone is taken before the draws, so its generator
    /// stream is unaffected by them.
    pub fn random_feasible_graph(&mut self) -> CnpGraph {
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

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    fn graph_from_edges(n: NumNodes, edges: &[(Node, Node)], budget: NumNodes) -> CnpGraph {
        let data = ProblemData::from_edges(n, edges.iter().copied());
        CnpGraph::new(&data, budget, 1234)
    }

    fn path(n: NumNodes) -> Vec<(Node, Node)> {
        (0..n - 1).map(|i| (i, i + 1)).collect()
    }

    /// Recomputes components and pairs from `current_adj` alone and checks
    /// the four structural invariants against the incremental state.
    fn assert_invariants(graph: &CnpGraph) {
        let n = graph.number_of_nodes() as usize;

        // residual adjacency is symmetric and disjoint from the removed set
        for u in 0..n as Node {
            for &v in &graph.current_adj[u as usize] {
                assert!(!graph.is_node_removed(u));
                assert!(!graph.is_node_removed(v));
                assert!(graph.current_adj[v as usize].contains(&u));
                assert!(graph.original_adj[u as usize].contains(&v));
            }
        }

        // reference components via a plain BFS
        let mut seen = vec![false; n];
        let mut reference: Vec<std::collections::BTreeSet<Node>> = Vec::new();
        for start in graph.alive.iter().copied() {
            if seen[start as usize] || graph.is_node_removed(start) {
                continue;
            }
            let mut queue = vec![start];
            let mut members = std::collections::BTreeSet::new();
            seen[start as usize] = true;
            while let Some(u) = queue.pop() {
                members.insert(u);
                for &v in &graph.current_adj[u as usize] {
                    if !seen[v as usize] {
                        seen[v as usize] = true;
                        queue.push(v);
                    }
                }
            }
            reference.push(members);
        }

        // partition matches modulo ordering
        let actual: Vec<std::collections::BTreeSet<Node>> = graph
            .components()
            .iter()
            .map(|c| c.nodes.iter().copied().collect())
            .collect();
        assert_eq!(
            actual.iter().sorted().collect_vec(),
            reference.iter().sorted().collect_vec()
        );

        // membership mapping and pair count
        let mut pairs = 0;
        for (index, component) in graph.components().iter().enumerate() {
            assert!(!component.is_empty());
            pairs += component.pair_count();
            for &member in &component.nodes {
                assert_eq!(graph.component_of_node(member), Some(index));
            }
        }
        assert_eq!(graph.objective_value(), pairs);

        for &u in &graph.alive {
            if graph.is_node_removed(u) {
                assert_eq!(graph.component_of_node(u), None);
            } else {
                assert!(graph.component_of_node(u).is_some());
            }
        }
    }

    #[test]
    fn path_graph_single_removal() {
        let mut graph = graph_from_edges(5, &path(5), 1);
        assert_eq!(graph.objective_value(), pair_count(5));

        graph.remove_node(2);
        assert_eq!(graph.objective_value(), 2);
        assert_eq!(graph.components().len(), 2);
        assert_invariants(&graph);

        // any other single removal is worse
        for v in [0u32, 1, 3, 4] {
            let mut other = graph_from_edges(5, &path(5), 1);
            other.remove_node(v);
            assert!(other.objective_value() >= 3);
        }
    }

    #[test]
    fn bridge_between_triangles() {
        // two triangles {0,1,2} and {4,5,6} joined through vertex 3
        let edges = [
            (0, 1),
            (1, 2),
            (0, 2),
            (2, 3),
            (3, 4),
            (4, 5),
            (5, 6),
            (4, 6),
        ];
        let mut graph = graph_from_edges(7, &edges, 1);
        assert_eq!(graph.objective_value(), pair_count(7));

        // the bridge vertex has the smallest estimated impact
        let component = graph.component_of_node(0).unwrap();
        assert_eq!(graph.impact_select_node_from_component(component), Ok(3));

        graph.remove_node(3);
        assert_eq!(graph.objective_value(), 6);
        assert_invariants(&graph);
    }

    #[test]
    fn star_impact_picks_center() {
        let edges = [(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)];
        let mut graph = graph_from_edges(6, &edges, 1);

        let component = graph.component_of_node(0).unwrap();
        assert_eq!(graph.impact_select_node_from_component(component), Ok(0));

        graph.remove_node(0);
        assert_eq!(graph.objective_value(), 0);
        assert_eq!(graph.components().len(), 5);
        assert_invariants(&graph);
    }

    #[test]
    fn add_node_merges_components() {
        let mut graph = graph_from_edges(5, &path(5), 1);

        graph.remove_node(2);
        assert_eq!(graph.components().len(), 2);

        graph.add_node(2);
        assert_eq!(graph.components().len(), 1);
        assert_eq!(graph.objective_value(), pair_count(5));
        assert_invariants(&graph);
    }

    #[test]
    fn add_node_without_neighbors_creates_singleton() {
        let mut graph = graph_from_edges(4, &[(0, 1)], 2);
        let solution: Solution = [2u32, 3].into_iter().collect();
        graph.update_by_removed_set(&solution);

        graph.add_node(3);
        assert_eq!(graph.component_of_node(3).map(|c| graph.components()[c].len()), Some(1));
        assert_invariants(&graph);
    }

    #[test]
    fn remove_then_add_restores_state() {
        let mut rng = Pcg64Mcg::seed_from_u64(777);
        let data = ProblemData::random_gnp(&mut rng, 40, 0.08);
        let mut graph = CnpGraph::new(&data, 6, 99).random_feasible_graph();

        for _ in 0..50 {
            let pairs_before = graph.objective_value();
            let partition_before: Vec<std::collections::BTreeSet<Node>> = graph
                .components()
                .iter()
                .map(|c| c.nodes.iter().copied().collect())
                .sorted()
                .collect();

            let component = graph.select_component().unwrap();
            let node = graph.random_select_node_from_component(component).unwrap();
            graph.remove_node(node);
            graph.add_node(node);

            assert_eq!(graph.objective_value(), pairs_before);
            let partition_after: Vec<std::collections::BTreeSet<Node>> = graph
                .components()
                .iter()
                .map(|c| c.nodes.iter().copied().collect())
                .sorted()
                .collect();
            assert_eq!(partition_before, partition_after);
            assert_invariants(&graph);
        }
    }

    #[test]
    fn random_walk_keeps_invariants() {
        let mut rng = Pcg64Mcg::seed_from_u64(31337);

        for round in 0..30 {
            let n = rng.gen_range(10..60u32);
            let p = rng.gen_range(0.02..0.15);
            let data = ProblemData::random_gnp(&mut rng, n, p);
            let budget = rng.gen_range(1..n / 2);
            let mut graph = CnpGraph::new(&data, budget, round as u64).random_feasible_graph();
            assert_invariants(&graph);

            for _ in 0..120 {
                if rng.gen_bool(0.5) && !graph.removed_nodes().is_empty() {
                    let node = *graph
                        .removed_nodes()
                        .iter()
                        .nth(rng.gen_range(0..graph.removed_nodes().len()))
                        .unwrap();
                    graph.add_node(node);
                } else if let Ok(component) = graph.select_component() {
                    let node = graph.random_select_node_from_component(component).unwrap();
                    graph.remove_node(node);
                }
                assert_invariants(&graph);
            }
        }
    }

    #[test]
    fn bulk_update_matches_incremental() {
        let mut rng = Pcg64Mcg::seed_from_u64(4242);
        let data = ProblemData::random_gnp(&mut rng, 50, 0.1);

        let mut incremental = CnpGraph::new(&data, 5, 1);
        let solution: Solution = [3u32, 17, 29, 41, 8].into_iter().collect();
        for &node in &solution {
            incremental.remove_node(node);
        }

        let mut bulk = CnpGraph::new(&data, 5, 1);
        bulk.update_by_removed_set(&solution);

        assert_eq!(incremental.objective_value(), bulk.objective_value());
        assert_invariants(&incremental);
        assert_invariants(&bulk);
    }

    #[test]
    fn connection_gain_on_path() {
        let mut graph = graph_from_edges(5, &path(5), 1);
        graph.remove_node(2);

        // re-inserting 2 fuses {0,1} and {3,4}: 10 - 1 - 1 = 8
        assert_eq!(graph.connection_gain(2), 8);
        assert_eq!(graph.greedy_select_node_to_add(), Ok(2));
    }

    #[test]
    fn greedy_add_prefers_small_components() {
        //  0-1-2 path and isolated 4-5 edge; removed = {3, 6}
        let edges = [(0, 1), (1, 2), (2, 3), (4, 5), (5, 6)];
        let mut graph = graph_from_edges(7, &edges, 2);
        let solution: Solution = [3u32, 6].into_iter().collect();
        graph.update_by_removed_set(&solution);

        // adding 6 touches only {4,5}: gain 2; adding 3 touches {0,1,2} and
        // {4,5}: gain 15 - 3 - 1 = 11
        assert_eq!(graph.connection_gain(6), 2);
        assert_eq!(graph.connection_gain(3), 11);
        assert_eq!(graph.greedy_select_node_to_add(), Ok(6));
    }

    #[test]
    fn select_component_on_empty_residual_fails() {
        let mut graph = graph_from_edges(2, &[(0, 1)], 2);
        let solution: Solution = [0u32, 1].into_iter().collect();
        graph.update_by_removed_set(&solution);

        assert_eq!(graph.select_component(), Err(Error::NoComponents));
    }

    #[test]
    fn select_component_degenerate_threshold_falls_back() {
        // all components have size <= 2, so the threshold keeps its
        // degenerate sentinel bounds and selection must still succeed
        let edges = [(0, 1), (2, 3), (4, 5)];
        let mut graph = graph_from_edges(7, &edges, 1);

        for _ in 0..20 {
            let index = graph.select_component().unwrap();
            assert!(index < graph.components().len());
        }
    }

    #[test]
    fn reduced_graph_shrinks_budget_and_instance() {
        let mut graph = graph_from_edges(5, &path(5), 3);
        let reduced: Solution = [2u32].into_iter().collect();
        graph.reduced_graph_by_removed_set(&reduced);

        assert_eq!(graph.budget(), 2);
        assert!(graph.removed_nodes().is_empty());
        assert_eq!(graph.components().len(), 2);
        assert_eq!(graph.objective_value(), 2);
        assert_invariants(&graph);
    }

    #[test]
    fn random_feasible_graph_respects_budget() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        let data = ProblemData::random_gnp(&mut rng, 30, 0.1);
        let mut graph = CnpGraph::new(&data, 7, 11);

        for _ in 0..10 {
            let feasible = graph.random_feasible_graph();
            assert_eq!(feasible.removed_nodes().len(), 7);
            assert_invariants(&feasible);
        }
    }
}
