use std::fmt;
use std::str::FromStr;

use super::{Age, CnpGraph, ComponentIndex, DcnpGraph, Node, NumNodes, NumPairs, Solution};
use crate::errors::Error;

/// The two supported problem variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProblemType {
    Cnp,
    Dcnp,
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProblemType::Cnp => "CNP",
            ProblemType::Dcnp => "DCNP",
        })
    }
}

impl FromStr for ProblemType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Error> {
        match value {
            "CNP" => Ok(ProblemType::Cnp),
            "DCNP" => Ok(ProblemType::Dcnp),
            other => Err(Error::UnknownProblemType(other.into())),
        }
    }
}

/// Uniform handle over the CNP and DCNP engines.
///
/// Variant-specific primitives return [`Error::WrongVariant`] when called on
/// the other engine, with two dispatch exceptions that keep the search and
/// recombination layers variant-agnostic:
/// * `greedy_select_node_to_add` runs `find_best_node_to_add` on DCNP,
/// * `find_best_node_to_remove` / `find_best_node_to_add` degrade to the
///   random / greedy selector on CNP.
#[derive(Clone)]
pub enum Graph {
    Cnp(CnpGraph),
    Dcnp(DcnpGraph),
}

macro_rules! dispatch {
    ($self : expr, $graph : ident => $body : expr) => {
        match $self {
            Graph::Cnp($graph) => $body,
            Graph::Dcnp($graph) => $body,
        }
    };
}

impl Graph {
    pub fn problem_type(&self) -> ProblemType {
        match self {
            Graph::Cnp(_) => ProblemType::Cnp,
            Graph::Dcnp(_) => ProblemType::Dcnp,
        }
    }

    pub fn is_cnp(&self) -> bool {
        matches!(self, Graph::Cnp(_))
    }

    pub fn is_dcnp(&self) -> bool {
        matches!(self, Graph::Dcnp(_))
    }

    pub fn as_cnp(&self) -> Option<&CnpGraph> {
        match self {
            Graph::Cnp(graph) => Some(graph),
            Graph::Dcnp(_) => None,
        }
    }

    pub fn as_dcnp(&self) -> Option<&DcnpGraph> {
        match self {
            Graph::Cnp(_) => None,
            Graph::Dcnp(graph) => Some(graph),
        }
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        dispatch!(self, graph => graph.number_of_nodes())
    }

    pub fn budget(&self) -> NumNodes {
        dispatch!(self, graph => graph.budget())
    }

    pub fn objective_value(&self) -> NumPairs {
        dispatch!(self, graph => graph.objective_value())
    }

    pub fn is_node_removed(&self, node: Node) -> bool {
        dispatch!(self, graph => graph.is_node_removed(node))
    }

    pub fn removed_nodes(&self) -> &Solution {
        dispatch!(self, graph => graph.removed_nodes())
    }

    pub fn set_node_age(&mut self, node: Node, age: Age) {
        dispatch!(self, graph => graph.set_node_age(node, age))
    }

    pub fn update_by_removed_set(&mut self, nodes_to_remove: &Solution) {
        dispatch!(self, graph => graph.update_by_removed_set(nodes_to_remove))
    }

    pub fn reduced_graph_by_removed_set(&mut self, nodes_to_delete: &Solution) {
        dispatch!(self, graph => graph.reduced_graph_by_removed_set(nodes_to_delete))
    }

    pub fn add_node(&mut self, node: Node) {
        dispatch!(self, graph => graph.add_node(node))
    }

    pub fn remove_node(&mut self, node: Node) {
        dispatch!(self, graph => graph.remove_node(node))
    }

    pub fn random_feasible_graph(&mut self) -> Graph {
        match self {
            Graph::Cnp(graph) => Graph::Cnp(graph.random_feasible_graph()),
            Graph::Dcnp(graph) => Graph::Dcnp(graph.random_feasible_graph()),
        }
    }

    pub fn random_select_node_to_remove(&mut self) -> Result<Node, Error> {
        dispatch!(self, graph => graph.random_select_node_to_remove())
    }

    // ------------------------------------------------------------- CNP only

    pub fn select_component(&mut self) -> Result<ComponentIndex, Error> {
        match self {
            Graph::Cnp(graph) => graph.select_component(),
            Graph::Dcnp(_) => Err(Error::WrongVariant {
                op: "select_component",
                expected: ProblemType::Cnp,
            }),
        }
    }

    pub fn random_select_node_from_component(
        &mut self,
        component_index: ComponentIndex,
    ) -> Result<Node, Error> {
        match self {
            Graph::Cnp(graph) => graph.random_select_node_from_component(component_index),
            Graph::Dcnp(_) => Err(Error::WrongVariant {
                op: "random_select_node_from_component",
                expected: ProblemType::Cnp,
            }),
        }
    }

    pub fn age_select_node_from_component(
        &mut self,
        component_index: ComponentIndex,
    ) -> Result<Node, Error> {
        match self {
            Graph::Cnp(graph) => graph.age_select_node_from_component(component_index),
            Graph::Dcnp(_) => Err(Error::WrongVariant {
                op: "age_select_node_from_component",
                expected: ProblemType::Cnp,
            }),
        }
    }

    pub fn impact_select_node_from_component(
        &mut self,
        component_index: ComponentIndex,
    ) -> Result<Node, Error> {
        match self {
            Graph::Cnp(graph) => graph.impact_select_node_from_component(component_index),
            Graph::Dcnp(_) => Err(Error::WrongVariant {
                op: "impact_select_node_from_component",
                expected: ProblemType::Cnp,
            }),
        }
    }

    /// Greedy insertion candidate; on DCNP this transparently dispatches to
    /// the speculative best-add search.
    pub fn greedy_select_node_to_add(&mut self) -> Result<Node, Error> {
        match self {
            Graph::Cnp(graph) => graph.greedy_select_node_to_add(),
            Graph::Dcnp(graph) => graph.find_best_node_to_add(),
        }
    }

    pub fn connection_gain(&self, node: Node) -> Result<NumPairs, Error> {
        match self {
            Graph::Cnp(graph) => Ok(graph.connection_gain(node)),
            Graph::Dcnp(_) => Err(Error::WrongVariant {
                op: "connection_gain",
                expected: ProblemType::Cnp,
            }),
        }
    }

    // ------------------------------------------------------------ DCNP only

    pub fn build_tree(&mut self) -> Result<(), Error> {
        match self {
            Graph::Dcnp(graph) => {
                graph.build_tree();
                Ok(())
            }
            Graph::Cnp(_) => Err(Error::WrongVariant {
                op: "build_tree",
                expected: ProblemType::Dcnp,
            }),
        }
    }

    pub fn betweenness_centrality(&self) -> Result<Vec<f64>, Error> {
        match self {
            Graph::Dcnp(graph) => Ok(graph.betweenness_centrality()),
            Graph::Cnp(_) => Err(Error::WrongVariant {
                op: "betweenness_centrality",
                expected: ProblemType::Dcnp,
            }),
        }
    }

    /// Best removal candidate; on CNP this degrades to the uniform selector,
    /// which keeps the inherit-repair recombination variant-agnostic.
    pub fn find_best_node_to_remove(&mut self) -> Result<Node, Error> {
        match self {
            Graph::Dcnp(graph) => graph.find_best_node_to_remove(),
            Graph::Cnp(graph) => graph.random_select_node_to_remove(),
        }
    }

    /// Best insertion candidate; on CNP this degrades to the greedy selector.
    pub fn find_best_node_to_add(&mut self) -> Result<Node, Error> {
        match self {
            Graph::Dcnp(graph) => graph.find_best_node_to_add(),
            Graph::Cnp(graph) => graph.greedy_select_node_to_add(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::ProblemData;
    use super::*;

    fn cnp_path() -> Graph {
        let data = ProblemData::from_edges(5, (0..4).map(|i| (i, i + 1)));
        data.create_original_graph(ProblemType::Cnp, 1, 7, 0).unwrap()
    }

    fn dcnp_path() -> Graph {
        let data = ProblemData::from_edges(5, (0..4).map(|i| (i, i + 1)));
        data.create_original_graph(ProblemType::Dcnp, 1, 7, 2).unwrap()
    }

    #[test]
    fn problem_type_parsing() {
        assert_eq!("CNP".parse::<ProblemType>(), Ok(ProblemType::Cnp));
        assert_eq!("DCNP".parse::<ProblemType>(), Ok(ProblemType::Dcnp));
        assert!(matches!(
            "cnp".parse::<ProblemType>(),
            Err(Error::UnknownProblemType(_))
        ));
    }

    #[test]
    fn variant_checks() {
        let cnp = cnp_path();
        assert!(cnp.is_cnp() && !cnp.is_dcnp());
        assert!(cnp.as_cnp().is_some() && cnp.as_dcnp().is_none());

        let dcnp = dcnp_path();
        assert_eq!(dcnp.problem_type(), ProblemType::Dcnp);
        assert!(dcnp.as_dcnp().is_some());
    }

    #[test]
    fn wrong_variant_calls_fail() {
        let mut dcnp = dcnp_path();
        assert!(matches!(
            dcnp.select_component(),
            Err(Error::WrongVariant { .. })
        ));
        assert!(matches!(
            dcnp.impact_select_node_from_component(0),
            Err(Error::WrongVariant { .. })
        ));

        let mut cnp = cnp_path();
        assert!(matches!(
            cnp.betweenness_centrality(),
            Err(Error::WrongVariant { .. })
        ));
        assert!(matches!(cnp.build_tree(), Err(Error::WrongVariant { .. })));
    }

    #[test]
    fn greedy_add_dispatches_on_dcnp() {
        let mut dcnp = dcnp_path();
        dcnp.remove_node(0);
        dcnp.remove_node(2);

        // endpoint 0 reconnects less reach than the middle vertex
        assert_eq!(dcnp.greedy_select_node_to_add(), Ok(0));
    }

    #[test]
    fn best_node_fallbacks_on_cnp() {
        let mut cnp = cnp_path();
        cnp.remove_node(2);

        // greedy fallback: re-inserting 2 is the only option
        assert_eq!(cnp.find_best_node_to_add(), Ok(2));
        // re-inserting 2 fuses the two 2-vertex pieces: 10 - 1 - 1 pairs
        assert_eq!(cnp.connection_gain(2), Ok(8));

        // random fallback must return some residual vertex
        let node = cnp.find_best_node_to_remove().unwrap();
        assert!(!cnp.is_node_removed(node));
    }

    #[test]
    fn mutation_surface_is_uniform() {
        for mut graph in [cnp_path(), dcnp_path()] {
            let initial = graph.objective_value();

            graph.remove_node(2);
            assert!(graph.is_node_removed(2));
            assert!(graph.objective_value() < initial);

            graph.add_node(2);
            assert_eq!(graph.objective_value(), initial);

            let feasible = graph.random_feasible_graph();
            assert_eq!(feasible.removed_nodes().len(), graph.budget() as usize);
        }
    }
}
