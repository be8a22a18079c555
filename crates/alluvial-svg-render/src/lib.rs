use alluvial_layout::{SankeyLayout, SankeyNode};

#[derive(Debug, Clone, Copy)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    pub margin: Margins,
    pub font_size: f32,
    pub font_family: String,
    /// One color ramp per layer, indexed by the node's `cid`.
    pub palettes: Vec<Vec<String>>,
    pub fallback_color: String,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            margin: Margins {
                top: 50.0,
                right: 50.0,
                bottom: 150.0,
                left: 50.0,
            },
            font_size: 12.0,
            font_family: "sans-serif".to_string(),
            palettes: default_palettes(),
            fallback_color: "#808080".to_string(),
        }
    }
}

pub fn default_palettes() -> Vec<Vec<String>> {
    let ramps: [&[&str]; 6] = [
        &["#cc00cc", "#ff00ff", "#ff66ff", "#ff99ff"],
        &["#3333ff", "#3366ff", "#6699ff", "#99ccff"],
        &["#66ffff", "#33cccc", "#006699", "#003366"],
        &["#99ff66", "#66ff33", "#009900"],
        &["#ffcc66", "#ffcc00", "#ff9900"],
        &["#ff6600", "#ff3300", "#993300"],
    ];
    ramps
        .iter()
        .map(|ramp| ramp.iter().map(|color| color.to_string()).collect())
        .collect()
}

/// Emit the positioned graph as a static SVG document: gradient-stroked
/// ribbons with tooltips, palette-filled node rectangles, value labels,
/// and one column title per layer.
pub fn render_svg(layout: &SankeyLayout, layers: &[String], options: &SvgRenderOptions) -> String {
    let margin = options.margin;
    let width = layout.size[0] + margin.left + margin.right;
    let height = layout.size[1] + margin.top + margin.bottom;
    let total_flow = layout.total_flow();

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\" font-family=\"{}\" font-size=\"{}\">",
        escape_xml(&options.font_family),
        options.font_size
    ));

    svg.push_str("<defs>");
    for (index, link) in layout.links.iter().enumerate() {
        let source = &layout.nodes[link.source];
        let target = &layout.nodes[link.target];
        svg.push_str(&format!(
            "<linearGradient id=\"grad-{index}\" gradientUnits=\"userSpaceOnUse\" x1=\"{:.2}\" x2=\"{:.2}\">",
            source.x, target.x
        ));
        svg.push_str(&format!(
            "<stop offset=\"0%\" stop-color=\"{}\"/><stop offset=\"100%\" stop-color=\"{}\"/></linearGradient>",
            node_color(source, layers, options),
            node_color(target, layers, options)
        ));
    }
    svg.push_str("</defs>");

    for node in layout.nodes.iter().filter(|n| n.cid == 0) {
        let prefix = node.name.split('-').next().unwrap_or_default();
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"30\" text-anchor=\"middle\">{}</text>",
            margin.left + node.x + node.dx / 2.0,
            escape_xml(prefix)
        ));
    }

    svg.push_str(&format!(
        "<g transform=\"translate({:.0},{:.0})\">",
        margin.left, margin.top
    ));

    // Thickest ribbons first so thin ones stay visible on top.
    let mut ribbon_order: Vec<usize> = (0..layout.links.len()).collect();
    ribbon_order.sort_by(|&a, &b| {
        layout.links[b]
            .dy
            .partial_cmp(&layout.links[a].dy)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for &index in &ribbon_order {
        let link = &layout.links[index];
        let source = &layout.nodes[link.source];
        let target = &layout.nodes[link.target];
        let percentage = if total_flow > 0.0 {
            link.value / total_flow * 100.0
        } else {
            0.0
        };
        svg.push_str(&format!(
            "<path class=\"link\" d=\"{}\" fill=\"none\" stroke=\"url(#grad-{index})\" stroke-width=\"{:.2}\" opacity=\"0.7\">",
            layout.link_path(index),
            link.dy.max(1.0)
        ));
        svg.push_str(&format!(
            "<title>{} \u{2192} {}\nCount: {}\nPercentage: {percentage:.1}%</title></path>",
            escape_xml(&source.name),
            escape_xml(&target.name),
            link.value
        ));
    }

    for node in &layout.nodes {
        let fill = node_color(node, layers, options);
        svg.push_str(&format!(
            "<g class=\"node\" transform=\"translate({:.2},{:.2})\">",
            node.x, node.y
        ));
        svg.push_str(&format!(
            "<rect width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\"><title>{}</title></rect>",
            node.dx,
            node.dy,
            fill,
            darken(fill, 2.0),
            escape_xml(&node.name)
        ));

        let value_label = node
            .label
            .split_once('-')
            .map(|(_, value)| value)
            .unwrap_or(node.label.as_str());
        let (label_x, anchor) = if node.x < layout.size[0] / 2.0 {
            (node.dx + 6.0, "start")
        } else {
            (-6.0, "end")
        };
        svg.push_str(&format!(
            "<text x=\"{label_x:.2}\" y=\"{:.2}\" dy=\".35em\" text-anchor=\"{anchor}\">{}</text></g>",
            node.dy / 2.0,
            escape_xml(value_label)
        ));
    }

    svg.push_str("</g></svg>");
    svg
}

fn node_color<'a>(node: &SankeyNode, layers: &[String], options: &'a SvgRenderOptions) -> &'a str {
    let palette = layers
        .iter()
        .position(|layer| node.name.starts_with(layer.as_str()))
        .and_then(|index| options.palettes.get(index));
    match palette {
        Some(palette) => palette
            .get(node.cid)
            .or_else(|| palette.first())
            .map(String::as_str)
            .unwrap_or(options.fallback_color.as_str()),
        None => options.fallback_color.as_str(),
    }
}

/// Channel-multiply darkening, matching d3's `color.darker(k)` factor.
fn darken(color: &str, amount: f32) -> String {
    let Some(hex) = color.strip_prefix('#') else {
        return color.to_string();
    };
    if hex.len() != 6 {
        return color.to_string();
    }
    let Ok(packed) = u32::from_str_radix(hex, 16) else {
        return color.to_string();
    };
    let factor = 0.7f32.powf(amount);
    let r = (((packed >> 16) & 0xff) as f32 * factor) as u32;
    let g = (((packed >> 8) & 0xff) as f32 * factor) as u32;
    let b = ((packed & 0xff) as f32 * factor) as u32;
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
