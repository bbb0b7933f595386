use cnp::graph::{ProblemType, Solution};
use cnp::io;
use cnp::memetic::{MaxIterations, MemeticParams, MemeticSearch, NoImprovement};
use cnp::search::Search;

const BRIDGED_TRIANGLES: &str = "c two triangles joined through vertex 3\n\
p edge 7 8\n\
e 0 1\ne 1 2\ne 0 2\ne 2 3\ne 3 4\ne 4 5\ne 5 6\ne 4 6\n";

#[test]
fn edge_list_to_local_search() {
    let data = io::read_edge_list(BRIDGED_TRIANGLES.as_bytes()).unwrap();
    let mut graph = data
        .create_original_graph(ProblemType::Cnp, 1, 7, 0)
        .unwrap()
        .random_feasible_graph();

    let mut search = Search::new(&mut graph, 7);
    search.set_strategy("CHNS").unwrap();
    let result = search.run().unwrap();

    assert_eq!(result.obj_value, 6);
    assert!(result.solution.contains(&3));
}

#[test]
fn adjacency_list_to_memetic_dcnp() {
    const INSTANCE: &str = "7\n0: 1\n1: 0 2\n2: 1 3\n3: 2 4\n4: 3 5\n5: 4 6\n6: 5\n";
    let data = io::read_adjacency_list(INSTANCE.as_bytes()).unwrap();
    let graph = data
        .create_original_graph(ProblemType::Dcnp, 1, 99, 2)
        .unwrap();

    let mut search =
        MemeticSearch::new(graph, MemeticParams::for_problem(ProblemType::Dcnp), 99);
    let result = search.run(&mut MaxIterations::new(2)).unwrap();

    assert_eq!(result.best_obj_value, 6);
    assert_eq!(result.best_solution.len(), 1);
}

#[test]
fn memetic_runs_are_reproducible() {
    let data = io::read_edge_list(BRIDGED_TRIANGLES.as_bytes()).unwrap();

    let results: Vec<(Solution, u64)> = (0..2)
        .map(|_| {
            let graph = data
                .create_original_graph(ProblemType::Cnp, 1, 42, 0)
                .unwrap();
            let mut search = MemeticSearch::new(graph, MemeticParams::default(), 42);
            let result = search.run(&mut NoImprovement::new(3)).unwrap();
            (result.best_solution, result.best_obj_value)
        })
        .collect();

    assert_eq!(results[0], results[1]);
}
