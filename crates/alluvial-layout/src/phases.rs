use std::cmp::Ordering;
use std::collections::HashMap;
// Depth positions are relative to the top of the drawing area; collision
// sweeps keep every layer inside [0, size[1]].

use alluvial_data::{FlowGraph, NodeRef};

use crate::{LayoutConfig, SankeyLayout, SankeyLink, SankeyNode};

// Each phase consumes the previous phase's wrapper, so the pipeline can only
// run in order: index_links -> compute_values -> assign_breadths ->
// assign_depths -> stack_links -> assign_color_ids.

pub(crate) struct Working {
    nodes: Vec<SankeyNode>,
    links: Vec<SankeyLink>,
}

pub(crate) struct Linked(Working);
pub(crate) struct Valued(Working);
pub(crate) struct Spread(Working);
pub(crate) struct Settled(Working);
pub(crate) struct Stacked(Working);

/// Resolve link endpoints and record each node's incident links. Links whose
/// endpoints resolve to no node are dropped.
pub(crate) fn index_links(graph: &FlowGraph) -> Linked {
    let mut nodes: Vec<SankeyNode> = graph
        .nodes
        .iter()
        .map(|node| SankeyNode {
            name: node.name.clone(),
            label: if node.label.is_empty() {
                node.name.clone()
            } else {
                node.label.clone()
            },
            layer: 0,
            x: 0.0,
            dx: 0.0,
            y: 0.0,
            dy: 0.0,
            value: 0.0,
            cid: 0,
            source_links: Vec::new(),
            target_links: Vec::new(),
        })
        .collect();

    let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(graph.nodes.len());
    for (index, node) in graph.nodes.iter().enumerate() {
        by_name.insert(node.name.as_str(), index);
    }

    let mut links = Vec::with_capacity(graph.links.len());
    for link in &graph.links {
        let resolved = resolve(&link.source, &by_name, nodes.len())
            .zip(resolve(&link.target, &by_name, nodes.len()));
        let Some((source, target)) = resolved else {
            tracing::warn!(source = ?link.source, target = ?link.target, "dropping unresolved link");
            continue;
        };
        let index = links.len();
        links.push(SankeyLink {
            source,
            target,
            value: link.value,
            dy: 0.0,
            sy: 0.0,
            ty: 0.0,
        });
        nodes[source].source_links.push(index);
        nodes[target].target_links.push(index);
    }

    Linked(Working { nodes, links })
}

fn resolve(endpoint: &NodeRef, by_name: &HashMap<&str, usize>, node_count: usize) -> Option<usize> {
    match endpoint {
        NodeRef::Index(index) if *index < node_count => Some(*index),
        NodeRef::Index(_) => None,
        NodeRef::Name(name) => by_name.get(name.as_str()).copied(),
    }
}

/// Node value = max of the outgoing and incoming sums, so pure sources and
/// sinks size to their one non-zero direction.
pub(crate) fn compute_values(linked: Linked) -> Valued {
    let Working { mut nodes, links } = linked.0;
    for node in &mut nodes {
        let outgoing: f32 = node.source_links.iter().map(|&i| links[i].value).sum();
        let incoming: f32 = node.target_links.iter().map(|&i| links[i].value).sum();
        node.value = outgoing.max(incoming);
    }
    Valued(Working { nodes, links })
}

/// Assign each node a layer by prefix-matching its name against the
/// configured layer order, then force nodes with no outgoing links into the
/// last layer, then scale layer indices to x positions.
pub(crate) fn assign_breadths(valued: Valued, config: &LayoutConfig) -> Spread {
    let Working { mut nodes, links } = valued.0;

    for node in &mut nodes {
        node.dx = config.node_width;
    }
    for (index, layer) in config.layers.iter().enumerate() {
        for node in nodes.iter_mut().filter(|n| n.name.starts_with(layer.as_str())) {
            node.layer = index;
        }
    }

    // Terminal categories always sit in the rightmost column, whatever
    // column their name belongs to.
    let last = config.layers.len().saturating_sub(1);
    for node in &mut nodes {
        if node.source_links.is_empty() {
            node.layer = last;
        }
    }

    let kx = if config.layers.len() > 1 {
        (config.size[0] - config.node_width) / (config.layers.len() - 1) as f32
    } else {
        0.0
    };
    for node in &mut nodes {
        node.x = node.layer as f32 * kx;
    }

    Spread(Working { nodes, links })
}

/// Initialize depths from a global value scale, then relax toward neighbor
/// centers with decaying alpha, resolving collisions after every half-pass.
pub(crate) fn assign_depths(spread: Spread, config: &LayoutConfig) -> Settled {
    let Working { mut nodes, mut links } = spread.0;

    let layer_count = nodes.iter().map(|n| n.layer + 1).max().unwrap_or(0);
    let mut by_breadth: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
    for (index, node) in nodes.iter().enumerate() {
        by_breadth[node.layer].push(index);
    }

    // Global scale: the tightest layer decides, so no layer can overflow.
    // Layers with no value are skipped rather than dividing by zero.
    let mut ky = f32::INFINITY;
    for group in &by_breadth {
        if group.is_empty() {
            continue;
        }
        let total: f32 = group.iter().map(|&i| nodes[i].value).sum();
        if total <= 0.0 {
            continue;
        }
        let scale = (config.size[1] - (group.len() - 1) as f32 * config.node_padding) / total;
        ky = ky.min(scale);
    }
    if !ky.is_finite() || ky < 0.0 {
        ky = 0.0;
    }
    tracing::trace!(ky, layers = by_breadth.len(), "initialized depth scale");

    for group in &by_breadth {
        for (position, &index) in group.iter().enumerate() {
            nodes[index].y = position as f32;
            nodes[index].dy = nodes[index].value * ky;
        }
    }
    for link in &mut links {
        link.dy = link.value * ky;
    }

    resolve_collisions(&mut nodes, &by_breadth, config);
    let mut alpha = 1.0f32;
    for _ in 0..config.iterations {
        alpha *= 0.99;
        relax_right_to_left(&mut nodes, &links, &by_breadth, alpha);
        resolve_collisions(&mut nodes, &by_breadth, config);
        relax_left_to_right(&mut nodes, &links, &by_breadth, alpha);
        resolve_collisions(&mut nodes, &by_breadth, config);
    }

    Settled(Working { nodes, links })
}

fn center(node: &SankeyNode) -> f32 {
    node.y + node.dy / 2.0
}

fn relax_right_to_left(
    nodes: &mut [SankeyNode],
    links: &[SankeyLink],
    by_breadth: &[Vec<usize>],
    alpha: f32,
) {
    for group in by_breadth.iter().rev() {
        for &index in group {
            if nodes[index].source_links.is_empty() {
                continue;
            }
            let mut weighted = 0.0;
            let mut total = 0.0;
            for &link_index in &nodes[index].source_links {
                let link = &links[link_index];
                weighted += center(&nodes[link.target]) * link.value;
                total += link.value;
            }
            if total <= 0.0 {
                continue;
            }
            let shift = (weighted / total - center(&nodes[index])) * alpha;
            nodes[index].y += shift;
        }
    }
}

fn relax_left_to_right(
    nodes: &mut [SankeyNode],
    links: &[SankeyLink],
    by_breadth: &[Vec<usize>],
    alpha: f32,
) {
    for group in by_breadth {
        for &index in group {
            if nodes[index].target_links.is_empty() {
                continue;
            }
            let mut weighted = 0.0;
            let mut total = 0.0;
            for &link_index in &nodes[index].target_links {
                let link = &links[link_index];
                weighted += center(&nodes[link.source]) * link.value;
                total += link.value;
            }
            if total <= 0.0 {
                continue;
            }
            let shift = (weighted / total - center(&nodes[index])) * alpha;
            nodes[index].y += shift;
        }
    }
}

/// Two order-preserving sweeps per layer: push overlapping nodes down from
/// the top, then push back up from the bottom if the layer ran past the
/// available height.
fn resolve_collisions(nodes: &mut [SankeyNode], by_breadth: &[Vec<usize>], config: &LayoutConfig) {
    let padding = config.node_padding;
    let height = config.size[1];

    for group in by_breadth {
        if group.is_empty() {
            continue;
        }
        let mut order = group.clone();
        order.sort_by(|&a, &b| {
            nodes[a]
                .y
                .partial_cmp(&nodes[b].y)
                .unwrap_or(Ordering::Equal)
        });

        let mut floor = 0.0;
        for &index in &order {
            let overlap = floor - nodes[index].y;
            if overlap > 0.0 {
                nodes[index].y += overlap;
            }
            floor = nodes[index].y + nodes[index].dy + padding;
        }

        let overflow = floor - padding - height;
        if overflow > 0.0 {
            let last = *order.last().expect("non-empty group");
            nodes[last].y -= overflow;
            let mut ceiling = nodes[last].y;
            for &index in order.iter().rev().skip(1) {
                let overlap = nodes[index].y + nodes[index].dy + padding - ceiling;
                if overlap > 0.0 {
                    nodes[index].y -= overlap;
                }
                ceiling = nodes[index].y;
            }
        }
    }
}

/// Order each node's links by the opposite endpoint's depth and stack them
/// contiguously, so ribbons never cross inside a node's edge bundle.
pub(crate) fn stack_links(settled: Settled) -> Stacked {
    let Working { mut nodes, mut links } = settled.0;
    restack(&mut nodes, &mut links);
    Stacked(Working { nodes, links })
}

pub(crate) fn restack(nodes: &mut [SankeyNode], links: &mut [SankeyLink]) {
    let depths: Vec<f32> = nodes.iter().map(|n| n.y).collect();
    for node in nodes.iter_mut() {
        node.source_links.sort_by(|&a, &b| {
            depths[links[a].target]
                .partial_cmp(&depths[links[b].target])
                .unwrap_or(Ordering::Equal)
        });
        node.target_links.sort_by(|&a, &b| {
            depths[links[a].source]
                .partial_cmp(&depths[links[b].source])
                .unwrap_or(Ordering::Equal)
        });
    }

    for node in nodes.iter() {
        let mut sy = 0.0;
        for &index in &node.source_links {
            links[index].sy = sy;
            sy += links[index].dy;
        }
        let mut ty = 0.0;
        for &index in &node.target_links {
            links[index].ty = ty;
            ty += links[index].dy;
        }
    }
}

/// Rank nodes by depth within each name-prefix group; the rank is a stable
/// palette slot however many values the group has.
pub(crate) fn assign_color_ids(stacked: Stacked, config: &LayoutConfig) -> SankeyLayout {
    let Working { mut nodes, links } = stacked.0;

    for layer in &config.layers {
        let mut members: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.name.starts_with(layer.as_str()))
            .map(|(index, _)| index)
            .collect();
        members.sort_by(|&a, &b| {
            nodes[a]
                .y
                .partial_cmp(&nodes[b].y)
                .unwrap_or(Ordering::Equal)
        });
        for (rank, &index) in members.iter().enumerate() {
            nodes[index].cid = rank;
        }
    }

    SankeyLayout {
        nodes,
        links,
        size: config.size,
        node_width: config.node_width,
        curvature: config.curvature,
    }
}
