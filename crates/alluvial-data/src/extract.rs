use indexmap::{IndexMap, IndexSet};

use crate::{FlowGraph, FlowLink, FlowNode, NodeRef, Table};

const LABEL_LIMIT: usize = 20;

/// Aggregate a categorical table into a flow graph: every adjacent column
/// pair in every row becomes a weight-1 link between `"<column>-<value>"`
/// nodes, summed over rows. An empty value ends that row's chain.
pub fn extract_graph(table: &Table) -> FlowGraph {
    let mut names: IndexSet<String> = IndexSet::new();
    let mut weights: IndexMap<(String, String), f32> = IndexMap::new();

    for row in &table.rows {
        for i in 0..table.columns.len().saturating_sub(1) {
            let source_value = cell(row, i);
            let target_value = cell(row, i + 1);
            if target_value.is_empty() {
                break;
            }

            let source = format!("{}-{}", table.columns[i], source_value);
            let target = format!("{}-{}", table.columns[i + 1], target_value);

            *weights.entry((source.clone(), target.clone())).or_insert(0.0) += 1.0;
            names.insert(source);
            names.insert(target);
        }
    }

    let nodes: Vec<FlowNode> = names
        .into_iter()
        .map(|name| {
            let label = name.chars().take(LABEL_LIMIT).collect();
            FlowNode { name, label }
        })
        .collect();
    let links: Vec<FlowLink> = weights
        .into_iter()
        .map(|((source, target), value)| FlowLink {
            source: NodeRef::Name(source),
            target: NodeRef::Name(target),
            value,
        })
        .collect();

    tracing::debug!(
        nodes = nodes.len(),
        links = links.len(),
        "extracted flow graph"
    );
    FlowGraph { nodes, links }
}

fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}
