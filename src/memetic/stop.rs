use crate::graph::NumPairs;

/// Decides when the memetic generation loop ends. The criterion is polled
/// once per generation with the incumbent best objective; wall-clock budgets
/// live outside the core and are injected through this trait.
pub trait StoppingCriterion {
    fn should_stop(&mut self, best_obj_value: NumPairs) -> bool;
}

/// Stops after a fixed number of generations.
pub struct MaxIterations {
    max_iterations: u64,
    iterations: u64,
}

impl MaxIterations {
    pub fn new(max_iterations: u64) -> Self {
        assert!(max_iterations > 0, "max_iterations must be positive");
        Self {
            max_iterations,
            iterations: 0,
        }
    }
}

impl StoppingCriterion for MaxIterations {
    fn should_stop(&mut self, _best_obj_value: NumPairs) -> bool {
        self.iterations += 1;
        self.iterations > self.max_iterations
    }
}

/// Stops once the incumbent has not improved for a number of consecutive
/// generations.
pub struct NoImprovement {
    max_idle_iterations: u64,
    idle_iterations: u64,
    last_best: NumPairs,
}

impl NoImprovement {
    pub fn new(max_idle_iterations: u64) -> Self {
        assert!(max_idle_iterations > 0, "max_idle_iterations must be positive");
        Self {
            max_idle_iterations,
            idle_iterations: 0,
            last_best: NumPairs::MAX,
        }
    }
}

impl StoppingCriterion for NoImprovement {
    fn should_stop(&mut self, best_obj_value: NumPairs) -> bool {
        if best_obj_value < self.last_best {
            self.last_best = best_obj_value;
            self.idle_iterations = 0;
        } else {
            self.idle_iterations += 1;
        }
        self.idle_iterations >= self.max_idle_iterations
    }
}

/// Stops as soon as any of the combined criteria stops. Every criterion is
/// polled each generation so their counters stay in step.
#[derive(Default)]
pub struct CombinedCriterion {
    criteria: Vec<Box<dyn StoppingCriterion>>,
}

impl CombinedCriterion {
    pub fn new(criteria: Vec<Box<dyn StoppingCriterion>>) -> Self {
        Self { criteria }
    }

    pub fn push(&mut self, criterion: Box<dyn StoppingCriterion>) {
        self.criteria.push(criterion);
    }
}

impl StoppingCriterion for CombinedCriterion {
    fn should_stop(&mut self, best_obj_value: NumPairs) -> bool {
        let mut stop = false;
        for criterion in &mut self.criteria {
            stop |= criterion.should_stop(best_obj_value);
        }
        stop
    }
}
