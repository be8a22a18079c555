use std::cmp::Ordering;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use alluvial_data::{extract_graph, Table};
use alluvial_layout::{cluster_metrics, full_paths, layout, LayoutConfig};
use alluvial_svg_render::{render_svg, SvgRenderOptions};

/// Render categorical CSV records as an alluvial (Sankey) flow diagram.
#[derive(Debug, Parser)]
#[command(name = "alluvial", version)]
struct Args {
    /// CSV input path, or '-' for stdin
    input: PathBuf,

    /// Column names for headerless input, in order (comma separated)
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Overall drawing width in pixels, margins included
    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    /// Overall drawing height in pixels, margins included
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    #[arg(long, default_value_t = 10.0)]
    node_width: f32,

    #[arg(long, default_value_t = 2.0)]
    node_padding: f32,

    /// Relaxation passes over the node depths
    #[arg(long, default_value_t = 32)]
    iterations: usize,

    /// Write the output here instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Emit the positioned graph as JSON instead of SVG
    #[arg(long)]
    json: bool,

    /// Report the N source-to-sink paths with the largest bottleneck
    #[arg(long, value_name = "N")]
    top_paths: Option<usize>,

    /// Report per-column flow totals
    #[arg(long)]
    cluster_metrics: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let table = load_table(&args)?;
    let graph = extract_graph(&table);
    info!(
        columns = table.columns.len(),
        rows = table.rows.len(),
        nodes = graph.nodes.len(),
        links = graph.links.len(),
        "extracted flow graph"
    );

    let options = SvgRenderOptions::default();
    let config = LayoutConfig {
        layers: table.columns.clone(),
        node_width: args.node_width,
        node_padding: args.node_padding,
        size: [
            args.width - options.margin.left - options.margin.right,
            args.height - options.margin.top - options.margin.bottom,
        ],
        iterations: args.iterations,
        ..LayoutConfig::default()
    };
    let positioned = layout(&graph, &config);

    if let Some(count) = args.top_paths {
        report_top_paths(&positioned, count);
    }
    if args.cluster_metrics {
        report_cluster_metrics(&positioned);
    }

    let output = if args.json {
        serde_json::to_string_pretty(&positioned)?
    } else {
        render_svg(&positioned, &table.columns, &options)
    };
    match &args.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{output}"),
    }
    Ok(())
}

fn load_table(args: &Args) -> Result<Table> {
    let reader: Box<dyn Read> = if args.input.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(
            fs::File::open(&args.input)
                .with_context(|| format!("failed to open {}", args.input.display()))?,
        )
    };
    let table = match &args.columns {
        Some(columns) => Table::from_reader_with_columns(reader, columns.clone())?,
        None => Table::from_reader(reader)?,
    };
    Ok(table)
}

fn report_top_paths(positioned: &alluvial_layout::SankeyLayout, count: usize) {
    let mut paths = full_paths(positioned);
    paths.sort_by(|a, b| {
        b.bottleneck
            .partial_cmp(&a.bottleneck)
            .unwrap_or(Ordering::Equal)
    });
    for path in paths.iter().take(count) {
        let names: Vec<&str> = path
            .nodes
            .iter()
            .map(|&index| positioned.nodes[index].name.as_str())
            .collect();
        println!("{} (bottleneck {})", names.join(" -> "), path.bottleneck);
    }
}

fn report_cluster_metrics(positioned: &alluvial_layout::SankeyLayout) {
    for metrics in cluster_metrics(positioned) {
        println!(
            "{}: total {} across {} nodes (mean {:.2})",
            metrics.cluster, metrics.total_flow, metrics.node_count, metrics.mean_flow
        );
    }
}
