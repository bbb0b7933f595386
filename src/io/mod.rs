pub mod adjacency_list;
pub mod edge_list;

pub use adjacency_list::*;
pub use edge_list::*;

pub type Result<T> = std::io::Result<T>;

macro_rules! raise_error_unless {
    ($cond : expr, $info : expr) => {
        if !($cond) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                $info,
            ));
        }
    };
}

macro_rules! parse_next_value {
    ($iterator : expr, $name : expr) => {{
        let next = $iterator.next();
        raise_error_unless!(
            next.is_some(),
            format!("Premature end of input when parsing {}.", $name)
        );

        let parsed = next.unwrap().parse();
        raise_error_unless!(
            parsed.is_ok(),
            format!("Invalid value found. Cannot parse {}.", $name)
        );

        parsed.unwrap()
    }};
}

pub(crate) use parse_next_value;
pub(crate) use raise_error_unless;
