use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{parse_next_value, raise_error_unless, Result};
use crate::graph::{Node, NumEdges, NumNodes, ProblemData};

/// Reads a DIMACS-style edge-list instance: a `p edge n m` header line and
/// one `e u v` record per edge, with every other token ignored.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<ProblemData> {
    let mut data: Option<ProblemData> = None;
    let mut number_of_nodes: NumNodes = 0;

    for line in reader.lines() {
        let line = line?;
        let mut tokens = line.split_whitespace();

        while let Some(token) = tokens.next() {
            match token {
                "p" => {
                    raise_error_unless!(data.is_none(), "Duplicate problem header");
                    // format tag, usually "edge"
                    raise_error_unless!(
                        tokens.next().is_some(),
                        "Premature end of line in problem header"
                    );
                    number_of_nodes = parse_next_value!(tokens, "Header>Number of nodes");
                    let _number_of_edges: NumEdges =
                        parse_next_value!(tokens, "Header>Number of edges");
                    data = Some(ProblemData::new(number_of_nodes));
                }
                "e" => {
                    raise_error_unless!(
                        data.is_some(),
                        "Edge record before the problem header"
                    );
                    let u: Node = parse_next_value!(tokens, "Source node");
                    let v: Node = parse_next_value!(tokens, "Target node");
                    raise_error_unless!(
                        u < number_of_nodes && v < number_of_nodes,
                        format!("Edge ({u}, {v}) out of range")
                    );
                    raise_error_unless!(
                        u != v,
                        format!("Self-loop at vertex {u} is not supported")
                    );
                    data.as_mut().unwrap().add_edge(u, v);
                }
                // comments and any unknown records are skipped
                _ => break,
            }
        }
    }

    match data {
        Some(data) => Ok(data),
        None => {
            raise_error_unless!(false, "No problem header found");
            unreachable!()
        }
    }
}

pub fn read_edge_list_file<P: AsRef<Path>>(path: P) -> Result<ProblemData> {
    let reader = BufReader::new(File::open(path)?);
    read_edge_list(reader)
}
