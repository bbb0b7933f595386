use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{parse_next_value, raise_error_unless, Result};
use crate::graph::{Node, NumNodes, ProblemData};

/// Reads an adjacency-list instance: the first line carries the vertex
/// count, followed by one `id : neighbor neighbor …` line per vertex.
pub fn read_adjacency_list<R: BufRead>(reader: R) -> Result<ProblemData> {
    let mut lines = reader.lines().filter(|line| match line {
        Ok(content) => !content.trim().is_empty(),
        Err(_) => true,
    });

    let header = lines.next();
    raise_error_unless!(header.is_some(), "No header found");
    let header = header.unwrap()?;

    let mut tokens = header.split_whitespace();
    let number_of_nodes: NumNodes = parse_next_value!(tokens, "Header>Number of nodes");
    raise_error_unless!(
        tokens.next().is_none(),
        "Invalid header found; expected end of line"
    );

    let mut data = ProblemData::new(number_of_nodes);

    for line in lines {
        let line = line?;
        let (vertex, neighbors) = match line.split_once(':') {
            Some(parts) => parts,
            None => {
                raise_error_unless!(false, format!("Missing ':' separator in line {line:?}"));
                unreachable!()
            }
        };

        let mut vertex_tokens = vertex.split_whitespace();
        let node: Node = parse_next_value!(vertex_tokens, "Vertex id");
        raise_error_unless!(
            node < number_of_nodes,
            format!("Vertex id {node} out of range")
        );

        for token in neighbors.split_whitespace() {
            let mut once = std::iter::once(token);
            let neighbor: Node = parse_next_value!(once, "Neighbor id");
            raise_error_unless!(
                neighbor < number_of_nodes,
                format!("Neighbor id {neighbor} out of range")
            );
            raise_error_unless!(
                neighbor != node,
                format!("Self-loop at vertex {node} is not supported")
            );
            data.add_edge(node, neighbor);
        }
    }

    Ok(data)
}

pub fn read_adjacency_list_file<P: AsRef<Path>>(path: P) -> Result<ProblemData> {
    let reader = BufReader::new(File::open(path)?);
    read_adjacency_list(reader)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_small_instance() {
        const DEMO: &str = "5\n0: 1\n1: 0 2\n2: 1 3\n3: 2 4\n4: 3\n";
        let data = read_adjacency_list(DEMO.as_bytes()).unwrap();

        assert_eq!(data.number_of_nodes(), 5);
        assert_eq!(data.number_of_edges(), 4);
        for (u, v) in [(0, 1), (1, 2), (2, 3), (3, 4)] {
            assert!(data.has_edge(u, v));
        }
        assert!(!data.has_edge(0, 2));
    }

    #[test]
    fn one_sided_lists_are_symmetrized() {
        const DEMO: &str = "3\n0: 1 2\n1:\n2:\n";
        let data = read_adjacency_list(DEMO.as_bytes()).unwrap();

        assert_eq!(data.number_of_edges(), 2);
        assert!(data.has_edge(1, 0));
        assert!(data.has_edge(2, 0));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(read_adjacency_list("".as_bytes()).is_err());
        assert!(read_adjacency_list("abc\n".as_bytes()).is_err());
        assert!(read_adjacency_list("2\n0 1\n".as_bytes()).is_err());
        assert!(read_adjacency_list("2\n0: 5\n".as_bytes()).is_err());
        assert!(read_adjacency_list("2\n0: 0\n".as_bytes()).is_err());
    }
}
