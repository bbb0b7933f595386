use fxhash::FxHashSet;
use rand::Rng;
use rand_distr::{Distribution, Geometric};

use super::{CnpGraph, DcnpGraph, Graph, Node, NumEdges, NumNodes, ProblemType};
use crate::errors::Error;

/// Immutable problem instance: vertex count and undirected adjacency.
/// Self-loops and multi-edges are rejected at insertion.
#[derive(Clone, Debug, Default)]
pub struct ProblemData {
    adj: Vec<FxHashSet<Node>>,
    number_of_edges: NumEdges,
}

impl ProblemData {
    pub fn new(number_of_nodes: NumNodes) -> Self {
        Self {
            adj: vec![FxHashSet::default(); number_of_nodes as usize],
            number_of_edges: 0,
        }
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.adj.len() as NumNodes
    }

    pub fn number_of_edges(&self) -> NumEdges {
        self.number_of_edges
    }

    pub fn neighbors_of(&self, u: Node) -> &FxHashSet<Node> {
        &self.adj[u as usize]
    }

    pub fn has_edge(&self, u: Node, v: Node) -> bool {
        self.adj[u as usize].contains(&v)
    }

    pub(crate) fn adjacency(&self) -> &[FxHashSet<Node>] {
        &self.adj
    }

    /// Inserts the undirected edge {u, v}; inserting an existing edge is a
    /// non-op.
    pub fn add_edge(&mut self, u: Node, v: Node) {
        debug_assert_ne!(u, v, "self-loops are not supported");
        let inserted = self.adj[u as usize].insert(v);
        self.adj[v as usize].insert(u);
        self.number_of_edges += inserted as NumEdges;
    }

    pub fn from_edges(
        number_of_nodes: NumNodes,
        edges: impl IntoIterator<Item = (Node, Node)>,
    ) -> Self {
        let mut data = Self::new(number_of_nodes);
        for (u, v) in edges {
            data.add_edge(u, v);
        }
        data
    }

    /// Generates a Gilbert `G(n, p)` instance in which each of the
    /// `n(n-1)/2` edges exists independently with probability `p`, skipping
    /// absent edges geometrically.
    pub fn random_gnp<R: Rng>(rng: &mut R, n: NumNodes, p: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&p));
        let mut data = Self::new(n);
        if p <= 0.0 || n < 2 {
            return data;
        }

        let distr = Geometric::new(p).unwrap();
        let end = (n as i64) * (n as i64);
        let mut current: i64 = -1;
        loop {
            let skip = distr.sample(rng);
            if skip > i64::MAX as u64 {
                break;
            }
            current = match (current + 1).checked_add(skip as i64) {
                Some(next) => next,
                None => break,
            };
            if current >= end {
                break;
            }

            let u = (current / n as i64) as Node;
            let v = (current % n as i64) as Node;
            if u < v {
                data.add_edge(u, v);
            }
        }

        data
    }

    /// Materializes a residual-graph engine of the requested variant.
    /// `hop_distance` is only consulted for [`ProblemType::Dcnp`].
    pub fn create_original_graph(
        &self,
        problem_type: ProblemType,
        budget: NumNodes,
        seed: u64,
        hop_distance: NumNodes,
    ) -> Result<Graph, Error> {
        if budget > self.number_of_nodes() {
            return Err(Error::BudgetExceedsVertexCount);
        }

        Ok(match problem_type {
            ProblemType::Cnp => Graph::Cnp(CnpGraph::new(self, budget, seed)),
            ProblemType::Dcnp => Graph::Dcnp(DcnpGraph::new(self, hop_distance, budget, seed)),
        })
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn edges_are_undirected_and_deduplicated() {
        let mut data = ProblemData::new(4);
        data.add_edge(0, 1);
        data.add_edge(1, 0);
        data.add_edge(2, 3);

        assert_eq!(data.number_of_edges(), 2);
        assert!(data.has_edge(0, 1) && data.has_edge(1, 0));
        assert!(!data.has_edge(0, 2));
        assert_eq!(data.neighbors_of(1).len(), 1);
    }

    #[test]
    fn gnp_density_is_plausible() {
        let mut rng = Pcg64Mcg::seed_from_u64(1234);

        for p in [0.01, 0.1, 0.4] {
            let repeats = 50;
            let n = 100u32;

            let mean_edges = (0..repeats)
                .map(|_| ProblemData::random_gnp(&mut rng, n, p).number_of_edges() as f64)
                .sum::<f64>()
                / repeats as f64;

            let expected = p * (n as f64) * ((n - 1) as f64) / 2.0;
            assert!((0.75 * expected..1.25 * expected).contains(&mean_edges));
        }
    }

    #[test]
    fn gnp_extremes() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        assert_eq!(ProblemData::random_gnp(&mut rng, 50, 0.0).number_of_edges(), 0);
        assert_eq!(
            ProblemData::random_gnp(&mut rng, 20, 1.0).number_of_edges(),
            20 * 19 / 2
        );
    }

    #[test]
    fn oversized_budget_is_rejected() {
        let data = ProblemData::from_edges(3, [(0, 1), (1, 2)]);
        let result = data.create_original_graph(ProblemType::Cnp, 4, 0, 0);
        assert!(matches!(result, Err(Error::BudgetExceedsVertexCount)));
    }

    #[test]
    fn factory_creates_both_variants() {
        let data = ProblemData::from_edges(3, [(0, 1), (1, 2)]);

        let cnp = data
            .create_original_graph(ProblemType::Cnp, 1, 0, 0)
            .unwrap();
        assert!(cnp.is_cnp());
        assert_eq!(cnp.number_of_nodes(), 3);

        let dcnp = data
            .create_original_graph(ProblemType::Dcnp, 1, 0, 2)
            .unwrap();
        assert!(dcnp.is_dcnp());
        assert_eq!(dcnp.number_of_nodes(), 3);
    }
}
