use alluvial_data::{FlowGraph, FlowLink, FlowNode, NodeRef};
use alluvial_layout::{cluster_metrics, full_paths, layout, LayoutConfig};

fn graph(nodes: &[&str], links: &[(&str, &str, f32)]) -> FlowGraph {
    FlowGraph {
        nodes: nodes
            .iter()
            .map(|name| FlowNode {
                name: name.to_string(),
                label: name.to_string(),
            })
            .collect(),
        links: links
            .iter()
            .map(|(source, target, value)| FlowLink {
                source: NodeRef::Name(source.to_string()),
                target: NodeRef::Name(target.to_string()),
                value: *value,
            })
            .collect(),
    }
}

fn config(layers: &[&str]) -> LayoutConfig {
    LayoutConfig {
        layers: layers.iter().map(|l| l.to_string()).collect(),
        node_width: 10.0,
        node_padding: 2.0,
        size: [100.0, 100.0],
        iterations: 0,
        ..LayoutConfig::default()
    }
}

#[test]
fn chain_has_one_path_with_min_bottleneck() {
    let graph = graph(
        &["a-1", "b-1", "c-1"],
        &[("a-1", "b-1", 5.0), ("b-1", "c-1", 3.0)],
    );
    let result = layout(&graph, &config(&["a", "b", "c"]));

    let paths = full_paths(&result);
    assert_eq!(paths.len(), 1);
    let names: Vec<&str> = paths[0]
        .nodes
        .iter()
        .map(|&i| result.nodes[i].name.as_str())
        .collect();
    assert_eq!(names, ["a-1", "b-1", "c-1"]);
    assert_eq!(paths[0].bottleneck, 3.0);
}

#[test]
fn diamond_has_two_paths() {
    let graph = graph(
        &["a-1", "b-top", "b-bottom", "c-1"],
        &[
            ("a-1", "b-top", 6.0),
            ("a-1", "b-bottom", 2.0),
            ("b-top", "c-1", 6.0),
            ("b-bottom", "c-1", 2.0),
        ],
    );
    let result = layout(&graph, &config(&["a", "b", "c"]));

    let mut bottlenecks: Vec<f32> = full_paths(&result).iter().map(|p| p.bottleneck).collect();
    bottlenecks.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(bottlenecks, [2.0, 6.0]);
}

#[test]
fn isolated_node_is_a_trivial_path() {
    let graph = graph(&["a-1", "b-1", "c-alone"], &[("a-1", "b-1", 4.0)]);
    let result = layout(&graph, &config(&["a", "b", "c"]));

    let paths = full_paths(&result);
    assert_eq!(paths.len(), 2);
    let trivial = paths
        .iter()
        .find(|p| p.nodes.len() == 1)
        .expect("isolated node path missing");
    assert!(trivial.bottleneck.is_infinite());
}

#[test]
fn cluster_metrics_total_per_prefix() {
    let graph = graph(
        &["price-low", "rating-high", "rating-mid"],
        &[
            ("price-low", "rating-high", 6.0),
            ("price-low", "rating-mid", 4.0),
        ],
    );
    let result = layout(&graph, &config(&["price", "rating"]));

    let metrics = cluster_metrics(&result);
    assert_eq!(metrics.len(), 2);
    assert_eq!(metrics[0].cluster, "price");
    assert_eq!(metrics[0].total_flow, 10.0);
    assert_eq!(metrics[0].node_count, 1);
    assert_eq!(metrics[1].cluster, "rating");
    assert_eq!(metrics[1].total_flow, 10.0);
    assert_eq!(metrics[1].node_count, 2);
    assert_eq!(metrics[1].mean_flow, 5.0);
}
