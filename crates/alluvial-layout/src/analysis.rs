use std::collections::HashMap;

use crate::SankeyLayout;

/// One complete source-to-sink traversal. `bottleneck` is the smallest link
/// value along the way (infinite for a path with no links).
#[derive(Debug, Clone, PartialEq)]
pub struct FlowPath {
    pub nodes: Vec<usize>,
    pub bottleneck: f32,
}

/// Per name-prefix flow totals, in first-seen node order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterMetrics {
    pub cluster: String,
    pub total_flow: f32,
    pub node_count: usize,
    pub mean_flow: f32,
}

/// Enumerate every path from a pure source (no incoming links) to a pure
/// sink (no outgoing links), depth first, guarding against cycles.
pub fn full_paths(layout: &SankeyLayout) -> Vec<FlowPath> {
    let mut paths = Vec::new();
    let mut visited = vec![false; layout.nodes.len()];
    let mut trail = Vec::new();

    for (index, node) in layout.nodes.iter().enumerate() {
        if node.target_links.is_empty() {
            visited[index] = true;
            walk(layout, index, f32::INFINITY, &mut trail, &mut visited, &mut paths);
            visited[index] = false;
        }
    }
    paths
}

fn walk(
    layout: &SankeyLayout,
    index: usize,
    bottleneck: f32,
    trail: &mut Vec<usize>,
    visited: &mut [bool],
    paths: &mut Vec<FlowPath>,
) {
    trail.push(index);
    if layout.nodes[index].source_links.is_empty() {
        paths.push(FlowPath {
            nodes: trail.clone(),
            bottleneck,
        });
    } else {
        for &link_index in &layout.nodes[index].source_links {
            let link = &layout.links[link_index];
            if visited[link.target] {
                continue;
            }
            visited[link.target] = true;
            walk(
                layout,
                link.target,
                bottleneck.min(link.value),
                trail,
                visited,
                paths,
            );
            visited[link.target] = false;
        }
    }
    trail.pop();
}

/// Group nodes by the name prefix before the first `-` and total their flow.
pub fn cluster_metrics(layout: &SankeyLayout) -> Vec<ClusterMetrics> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (f32, usize)> = HashMap::new();

    for node in &layout.nodes {
        let key = node.name.split('-').next().unwrap_or_default().to_string();
        if !totals.contains_key(&key) {
            order.push(key.clone());
        }
        let entry = totals.entry(key).or_insert((0.0, 0));
        entry.0 += node.value;
        entry.1 += 1;
    }

    order
        .into_iter()
        .map(|cluster| {
            let (total_flow, node_count) = totals[&cluster];
            ClusterMetrics {
                cluster,
                total_flow,
                node_count,
                mean_flow: total_flow / node_count as f32,
            }
        })
        .collect()
}
