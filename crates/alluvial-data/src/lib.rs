mod extract;
mod graph;
mod table;

pub use extract::extract_graph;
pub use graph::{FlowGraph, FlowLink, FlowNode, NodeRef};
pub use table::Table;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv input")]
    Csv(#[from] csv::Error),
    #[error("input has no columns")]
    EmptyTable,
}
