use serde::{Deserialize, Serialize};

/// A categorical node named `"<column>-<value>"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub name: String,
    #[serde(default)]
    pub label: String,
}

/// A link endpoint: either an index into the node array or a node name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeRef {
    Index(usize),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLink {
    pub source: NodeRef,
    pub target: NodeRef,
    pub value: f32,
}

/// The `{nodes, links}` interchange form consumed by the layout engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub links: Vec<FlowLink>,
}
