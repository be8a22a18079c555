use alluvial_data::{extract_graph, DataError, FlowGraph, NodeRef, Table};

fn link_value(graph: &FlowGraph, source: &str, target: &str) -> Option<f32> {
    graph.links.iter().find_map(|link| {
        match (&link.source, &link.target) {
            (NodeRef::Name(s), NodeRef::Name(t)) if s == source && t == target => Some(link.value),
            _ => None,
        }
    })
}

#[test]
fn aggregates_adjacent_column_pairs() {
    let csv = "price,rating\nlow,high\nlow,mid\nlow,high\n";
    let table = Table::from_reader(csv.as_bytes()).expect("load failed");
    let graph = extract_graph(&table);

    let names: Vec<&str> = graph.nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["price-low", "rating-high", "rating-mid"]);

    assert_eq!(link_value(&graph, "price-low", "rating-high"), Some(2.0));
    assert_eq!(link_value(&graph, "price-low", "rating-mid"), Some(1.0));
    assert_eq!(graph.links.len(), 2);
}

#[test]
fn chains_span_all_columns() {
    let csv = "a,b,c\nx,y,z\n";
    let table = Table::from_reader(csv.as_bytes()).expect("load failed");
    let graph = extract_graph(&table);

    assert_eq!(graph.links.len(), 2);
    assert_eq!(link_value(&graph, "a-x", "b-y"), Some(1.0));
    assert_eq!(link_value(&graph, "b-y", "c-z"), Some(1.0));
}

#[test]
fn empty_value_ends_the_row_chain() {
    let csv = "a,b,c\nx,,z\nx,y,\n";
    let table = Table::from_reader(csv.as_bytes()).expect("load failed");
    let graph = extract_graph(&table);

    // First row breaks before any pair; second records only a-x -> b-y.
    assert_eq!(graph.links.len(), 1);
    assert_eq!(link_value(&graph, "a-x", "b-y"), Some(1.0));
    assert!(graph.nodes.iter().all(|n| !n.name.ends_with('-')));
}

#[test]
fn headerless_input_uses_supplied_columns() {
    let csv = "low,high\nlow,mid\n";
    let table = Table::from_reader_with_columns(
        csv.as_bytes(),
        vec!["price".to_string(), "rating".to_string()],
    )
    .expect("load failed");

    assert_eq!(table.rows.len(), 2);
    let graph = extract_graph(&table);
    assert_eq!(link_value(&graph, "price-low", "rating-high"), Some(1.0));
}

#[test]
fn labels_truncate_to_twenty_characters() {
    let csv = "verylongcolumnname,b\nextremelylongvalue,y\n";
    let table = Table::from_reader(csv.as_bytes()).expect("load failed");
    let graph = extract_graph(&table);

    let node = graph
        .nodes
        .iter()
        .find(|n| n.name == "verylongcolumnname-extremelylongvalue")
        .expect("node missing");
    assert_eq!(node.label.chars().count(), 20);
    assert!(node.name.starts_with(&node.label));
}

#[test]
fn empty_input_is_rejected() {
    let result = Table::from_reader("".as_bytes());
    assert!(matches!(result, Err(DataError::EmptyTable)));
}

#[test]
fn interchange_accepts_index_and_name_endpoints() {
    let json = r#"{
        "nodes": [{"name": "a-1", "label": "a-1"}, {"name": "b-1"}],
        "links": [{"source": 0, "target": "b-1", "value": 3.0}]
    }"#;
    let graph: FlowGraph = serde_json::from_str(json).expect("parse failed");

    assert_eq!(graph.links[0].source, NodeRef::Index(0));
    assert_eq!(graph.links[0].target, NodeRef::Name("b-1".to_string()));
    assert_eq!(graph.nodes[1].label, "");
    assert_eq!(graph.links[0].value, 3.0);
}
