use std::fmt::Write;

use crate::config::RenderConfig;
use crate::layout::*;

const ARROWHEAD_ID: &str = "arrowhead";

pub fn render(layout: &Layout, config: &RenderConfig) -> String {
    let mut out = String::new();
    let b = &layout.bounds;

    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="{} {} {} {}" font-family="{}">"#,
        num(layout.width),
        num(layout.height),
        num(b.min_x),
        num(b.min_y),
        num(b.width()),
        num(b.height()),
        escape_xml(&config.font_family),
    );
    write_defs(&mut out, config);

    out.push_str("<g class=\"relationships\">\n");
    for edge in &layout.edges {
        write_edge(&mut out, edge, config);
    }
    out.push_str("</g>\n");

    out.push_str("<g class=\"nodes\">\n");
    for node in &layout.nodes {
        write_node(&mut out, node, config);
    }
    out.push_str("</g>\n");

    out.push_str("<g class=\"node-properties\">\n");
    for node in &layout.nodes {
        if let Some(props) = &node.properties {
            let _ = writeln!(out, r#"<g data-id="{}">"#, escape_xml(&node.id));
            write_text_block(
                &mut out,
                props,
                "node-property",
                config.property_label_color.as_str(),
                config.property_text_color.as_str(),
            );
            out.push_str("</g>\n");
        }
    }
    out.push_str("</g>\n");

    out.push_str("<g class=\"relationship-labels\">\n");
    for edge in &layout.edges {
        if let Some(label) = &edge.label {
            write_text_block(
                &mut out,
                label,
                "relationship-label",
                config.relationship_label_background.as_str(),
                config.relationship_text_color.as_str(),
            );
        }
    }
    out.push_str("</g>\n");

    out.push_str("</svg>\n");
    out
}

fn write_defs(out: &mut String, config: &RenderConfig) {
    let size = num(config.arrow_head_size);
    let _ = writeln!(
        out,
        r#"<defs><marker id="{ARROWHEAD_ID}" viewBox="0 0 10 10" refX="10" refY="5" markerUnits="userSpaceOnUse" markerWidth="{size}" markerHeight="{size}" orient="auto"><path d="M 0 0 L 10 5 L 0 10 z" fill="{}"/></marker></defs>"#,
        config.relationship_line_color,
    );
}

fn write_edge(out: &mut String, edge: &EdgeLayout, config: &RenderConfig) {
    let d = match edge.path {
        EdgePath::Straight { start, end } => format!(
            "M {} {} L {} {}",
            num(start.x),
            num(start.y),
            num(end.x),
            num(end.y)
        ),
        EdgePath::Loop {
            start,
            control1,
            control2,
            end,
        } => format!(
            "M {} {} C {} {} {} {} {} {}",
            num(start.x),
            num(start.y),
            num(control1.x),
            num(control1.y),
            num(control2.x),
            num(control2.y),
            num(end.x),
            num(end.y)
        ),
    };
    let rel_type = edge
        .rel_type
        .as_deref()
        .map(|t| format!(r#" data-type="{}""#, escape_xml(t)))
        .unwrap_or_default();

    let _ = writeln!(
        out,
        r#"<path class="relationship" data-from="{}" data-to="{}"{rel_type} d="{d}" fill="none" stroke="{}" stroke-width="{}" marker-end="url(#{ARROWHEAD_ID})"/>"#,
        escape_xml(&edge.from_id),
        escape_xml(&edge.to_id),
        config.relationship_line_color,
        num(config.relationship_line_width),
    );
}

fn write_node(out: &mut String, node: &NodeLayout, config: &RenderConfig) {
    let _ = writeln!(out, r#"<g class="node" data-id="{}">"#, escape_xml(&node.id));
    let _ = writeln!(
        out,
        r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{}"/>"#,
        num(node.center.x),
        num(node.center.y),
        num(node.radius),
        config.node_fill_color,
        config.node_edge_color,
    );
    write_text_block(
        out,
        &node.label,
        "node-label",
        node.label_fill.as_str(),
        config.node_text_color.as_str(),
    );
    out.push_str("</g>\n");
}

fn write_text_block(out: &mut String, block: &TextBlock, class: &str, fill: &str, text_fill: &str) {
    let r = &block.background;
    let _ = writeln!(
        out,
        r#"<rect class="{class}" x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{fill}" stroke="{fill}"/>"#,
        num(r.x),
        num(r.y),
        num(r.width),
        num(r.height),
        num(r.corner),
    );
    let anchor = match block.anchor {
        Anchor::Middle => "middle",
        Anchor::Start => "start",
    };
    let _ = write!(
        out,
        r#"<text class="{class}" text-anchor="{anchor}" dominant-baseline="central" font-size="{}" fill="{text_fill}">"#,
        num(block.font_size),
    );
    for line in &block.lines {
        let _ = write!(
            out,
            r#"<tspan x="{}" y="{}">{}</tspan>"#,
            num(line.x),
            num(line.y),
            escape_xml(&line.text),
        );
    }
    out.push_str("</text>\n");
}

pub fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            // Not allowed anywhere in an XML 1.0 document.
            '\u{0}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}' => escaped.push(char::REPLACEMENT_CHARACTER),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Coordinates rounded to two decimals, without trailing zeros. Magnitudes
/// past 1e15 have no fractional digits left to round.
fn num(value: f64) -> String {
    let rounded = if value.abs() < 1e15 {
        (value * 100.0).round() / 100.0
    } else {
        value
    };
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}
