pub mod bcls;
pub mod cbns;
pub mod chns;
pub mod dlas;

pub use bcls::Bcls;
pub use cbns::Cbns;
pub use chns::Chns;
pub use dlas::Dlas;

use crate::errors::Error;
use crate::graph::{Graph, NumPairs, Solution};

/// Outcome of a local-search run: the best removed set seen and its
/// objective value.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub solution: Solution,
    pub obj_value: NumPairs,
}

/// A local-search strategy mutates the residual state of the borrowed graph
/// and reports the best solution encountered.
pub trait SearchStrategy {
    fn execute(&mut self, graph: &mut Graph) -> Result<SearchResult, Error>;
}

/// Tunable knobs shared by all strategies; unset fields fall back to the
/// strategy defaults.
#[derive(Clone, Debug, Default)]
pub struct SearchParams {
    pub seed: Option<u64>,
    /// Non-improving steps tolerated before the strategy stops.
    pub max_idle_steps: Option<u64>,
    /// CHNS: probability of an impact-guided removal instead of an age-guided
    /// one.
    pub theta: Option<f64>,
    /// DLAS: length of the late-acceptance cost history.
    pub history_length: Option<usize>,
    /// BCLS: probability of performing an exchange move on the front
    /// candidate.
    pub selection_prob: Option<f64>,
}

/// Name-keyed strategy runner. The chosen strategy is instantiated with the
/// parameter bag, seeded from the search seed unless the bag overrides it.
pub struct Search<'a> {
    graph: &'a mut Graph,
    seed: u64,
    params: SearchParams,
    strategy: Option<Box<dyn SearchStrategy>>,
}

impl<'a> Search<'a> {
    pub fn new(graph: &'a mut Graph, seed: u64) -> Self {
        Self {
            graph,
            seed,
            params: SearchParams::default(),
            strategy: None,
        }
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    /// Selects the strategy by name: "CBNS", "CHNS", "DLAS" or "BCLS".
    pub fn set_strategy(&mut self, name: &str) -> Result<&mut Self, Error> {
        let mut params = self.params.clone();
        params.seed.get_or_insert(self.seed);

        self.strategy = Some(match name {
            "CBNS" => Box::new(Cbns::new(&params)),
            "CHNS" => Box::new(Chns::new(&params)),
            "DLAS" => Box::new(Dlas::new(&params)),
            "BCLS" => Box::new(Bcls::new(&params)),
            _ => return Err(Error::UnknownStrategy(name.into())),
        });

        Ok(self)
    }

    pub fn run(&mut self) -> Result<SearchResult, Error> {
        match self.strategy.as_mut() {
            Some(strategy) => strategy.execute(self.graph),
            None => Err(Error::StrategyNotSet),
        }
    }
}
