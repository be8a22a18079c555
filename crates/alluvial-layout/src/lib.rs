mod analysis;
mod phases;

pub use analysis::{cluster_metrics, full_paths, ClusterMetrics, FlowPath};

use alluvial_data::FlowGraph;
use serde::{Deserialize, Serialize};

/// Layout parameters. `layers` is the ordered list of column names that node
/// names are prefix-matched against; it decides each node's horizontal band.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub layers: Vec<String>,
    pub node_width: f32,
    pub node_padding: f32,
    pub size: [f32; 2],
    pub iterations: usize,
    pub curvature: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            node_width: 24.0,
            node_padding: 8.0,
            size: [1.0, 1.0],
            iterations: 32,
            curvature: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyNode {
    pub name: String,
    pub label: String,
    /// Horizontal band index after sink correction.
    pub layer: usize,
    pub x: f32,
    pub dx: f32,
    pub y: f32,
    pub dy: f32,
    pub value: f32,
    /// Rank by depth within the node's name-prefix group; picks its color.
    pub cid: usize,
    /// Outgoing link indices, ordered by target depth.
    pub source_links: Vec<usize>,
    /// Incoming link indices, ordered by source depth.
    pub target_links: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SankeyLink {
    pub source: usize,
    pub target: usize,
    pub value: f32,
    pub dy: f32,
    pub sy: f32,
    pub ty: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SankeyLayout {
    pub nodes: Vec<SankeyNode>,
    pub links: Vec<SankeyLink>,
    pub size: [f32; 2],
    pub node_width: f32,
    pub curvature: f32,
}

/// Position every node and link of `graph`. Owns working copies throughout;
/// the input is never mutated, and identical inputs give identical output.
pub fn layout(graph: &FlowGraph, config: &LayoutConfig) -> SankeyLayout {
    tracing::debug!(
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        layers = config.layers.len(),
        "laying out flow graph"
    );
    let linked = phases::index_links(graph);
    let valued = phases::compute_values(linked);
    let spread = phases::assign_breadths(valued, config);
    let settled = phases::assign_depths(spread, config);
    let stacked = phases::stack_links(settled);
    phases::assign_color_ids(stacked, config)
}

impl SankeyLayout {
    /// Restack link offsets after an external change to a node's `y`.
    /// Touches only link ordering and `sy`/`ty`; node positions, extents,
    /// and values are left as they are.
    pub fn relayout(&mut self) {
        phases::restack(&mut self.nodes, &mut self.links);
    }

    /// Ribbon path for a link index, at the configured curvature.
    pub fn link_path(&self, link: usize) -> String {
        let l = &self.links[link];
        link_path(&self.nodes[l.source], &self.nodes[l.target], l, self.curvature)
    }

    pub fn total_flow(&self) -> f32 {
        self.links.iter().map(|l| l.value).sum()
    }
}

/// Cubic Bezier ribbon from the source's right edge to the target's left
/// edge, vertically centered on the link's slice of each node.
pub fn link_path(
    source: &SankeyNode,
    target: &SankeyNode,
    link: &SankeyLink,
    curvature: f32,
) -> String {
    let x0 = source.x + source.dx;
    let x1 = target.x;
    let x2 = x0 + (x1 - x0) * curvature;
    let x3 = x0 + (x1 - x0) * (1.0 - curvature);
    let y0 = source.y + link.sy + link.dy / 2.0;
    let y1 = target.y + link.ty + link.dy / 2.0;
    format!("M{x0},{y0}C{x2},{y0} {x3},{y1} {x1},{y1}")
}
