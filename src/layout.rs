use serde_json::Value;
use tracing::debug;

use crate::color::Color;
use crate::config::{ColorMode, RenderConfig};
use crate::display_width::{LINE_HEIGHT, split_lines, text_extent};
use crate::error::{Error, Result};
use crate::graph::{NodeData, PropertyGraph};
use crate::palette::ColorAssigner;

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub bounds: Bounds,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
}

/// Visible region in input coordinates, y pointing down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    fn midpoint(self, other: Point) -> Point {
        Point {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub corner: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Middle,
    Start,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f64,
    /// Vertical center of the line.
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
    pub anchor: Anchor,
    pub background: Rect,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub center: Point,
    pub radius: f64,
    pub label: TextBlock,
    pub label_fill: Color,
    pub properties: Option<TextBlock>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EdgePath {
    Straight {
        start: Point,
        end: Point,
    },
    Loop {
        start: Point,
        control1: Point,
        control2: Point,
        end: Point,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub from_id: String,
    pub to_id: String,
    pub rel_type: Option<String>,
    pub path: EdgePath,
    pub label: Option<TextBlock>,
}

pub fn compute(graph: &PropertyGraph, config: &RenderConfig) -> Result<Layout> {
    let bounds = compute_bounds(graph, config.margin).ok_or(Error::EmptyGraph)?;

    let mut assigner = ColorAssigner::new(&config.palette);
    let mut nodes = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        let label_fill = match config.color_mode {
            ColorMode::Uniform => config.node_label_color.clone(),
            ColorMode::ByLabels => assigner.assign(&node.labels)?.clone(),
        };
        nodes.push(layout_node(node, label_fill, config));
    }

    let edges: Vec<EdgeLayout> = graph
        .edges()
        .map(|(from, to, data)| {
            let (path, label_at) = if from.id == to.id {
                loop_path(point(from), config.node_radius)
            } else {
                straight_path(point(from), point(to), config.arrow_shrink)
            };
            let label = data
                .rel_type
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(|t| centered_block(t, label_at, config.relationship_font_size));
            EdgeLayout {
                from_id: from.id.clone(),
                to_id: to.id.clone(),
                rel_type: data.rel_type.clone(),
                path,
                label,
            }
        })
        .collect();

    debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        color_groups = assigner.groups(),
        "computed layout"
    );

    let width = bounds.width() * config.scale;
    let height = bounds.height() * config.scale;
    if !(width.is_finite() && height.is_finite()) {
        return Err(Error::CoordinateOverflow);
    }

    Ok(Layout {
        bounds,
        width,
        height,
        nodes,
        edges,
    })
}

fn compute_bounds(graph: &PropertyGraph, margin: f64) -> Option<Bounds> {
    let mut positions = graph.nodes().map(|n| n.position);
    let first = positions.next()?;
    let mut bounds = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for p in positions {
        bounds.min_x = bounds.min_x.min(p.x);
        bounds.min_y = bounds.min_y.min(p.y);
        bounds.max_x = bounds.max_x.max(p.x);
        bounds.max_y = bounds.max_y.max(p.y);
    }
    Some(Bounds {
        min_x: bounds.min_x - margin,
        min_y: bounds.min_y - margin,
        max_x: bounds.max_x + margin,
        max_y: bounds.max_y + margin,
    })
}

fn point(node: &NodeData) -> Point {
    Point {
        x: node.position.x,
        y: node.position.y,
    }
}

fn layout_node(node: &NodeData, label_fill: Color, config: &RenderConfig) -> NodeLayout {
    let center = point(node);
    let properties = (!node.properties.is_empty()).then(|| {
        let text = node
            .properties
            .iter()
            .map(|(key, value)| format!("{key}: {}", format_value(value)))
            .collect::<Vec<_>>()
            .join("\n");
        let top_left = Point {
            x: center.x,
            y: center.y + config.property_offset,
        };
        top_left_block(&text, top_left, config.property_font_size)
    });

    NodeLayout {
        id: node.id.clone(),
        center,
        radius: config.node_radius,
        label: centered_block(&node.label, center, config.node_font_size),
        label_fill,
        properties,
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn padding(font_size: f64) -> f64 {
    font_size * 0.3
}

fn centered_block(text: &str, center: Point, font_size: f64) -> TextBlock {
    let (width, height) = text_extent(text, font_size);
    let top_left = Point {
        x: center.x - width / 2.0,
        y: center.y - height / 2.0,
    };
    text_block(text, Anchor::Middle, center.x, top_left, font_size)
}

fn top_left_block(text: &str, top_left: Point, font_size: f64) -> TextBlock {
    text_block(text, Anchor::Start, top_left.x, top_left, font_size)
}

fn text_block(
    text: &str,
    anchor: Anchor,
    line_x: f64,
    top_left: Point,
    font_size: f64,
) -> TextBlock {
    let (width, height) = text_extent(text, font_size);
    let line_height = font_size * LINE_HEIGHT;
    let pad = padding(font_size);
    let lines = split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(i, line)| TextLine {
            text: line.to_string(),
            x: line_x,
            y: top_left.y + line_height * (i as f64 + 0.5),
        })
        .collect();

    TextBlock {
        lines,
        anchor,
        background: Rect {
            x: top_left.x - pad,
            y: top_left.y - pad,
            width: width + 2.0 * pad,
            height: height + 2.0 * pad,
            corner: pad,
        },
        font_size,
    }
}

/// Segment between two centers, pulled in at both ends so the arrow stops
/// at the node outline. Returns the path and the label anchor.
fn straight_path(from: Point, to: Point, shrink: f64) -> (EdgePath, Point) {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let distance = dx.hypot(dy);
    let (mut start, mut end) = (from, to);
    if distance > 0.0 {
        let (ux, uy) = (dx / distance * shrink, dy / distance * shrink);
        start.x += ux;
        start.y += uy;
        end.x -= ux;
        end.y -= uy;
    }
    (EdgePath::Straight { start, end }, from.midpoint(to))
}

fn loop_path(center: Point, radius: f64) -> (EdgePath, Point) {
    let at = |dx: f64, dy: f64| Point {
        x: center.x + radius * dx,
        y: center.y + radius * dy,
    };
    let start = at(-0.5, -0.866);
    let control1 = at(-1.2, -2.6);
    let control2 = at(1.2, -2.6);
    let end = at(0.5, -0.866);
    // Cubic Bezier at t = 0.5.
    let apex = Point {
        x: 0.125 * start.x + 0.375 * control1.x + 0.375 * control2.x + 0.125 * end.x,
        y: 0.125 * start.y + 0.375 * control1.y + 0.375 * control2.y + 0.125 * end.y,
    };
    (
        EdgePath::Loop {
            start,
            control1,
            control2,
            end,
        },
        apex,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse_document;
    use crate::graph::build;
    use pretty_assertions::assert_eq;

    fn layout_with(input: &str, config: &RenderConfig) -> Result<Layout> {
        compute(&build(&parse_document(input).unwrap()).unwrap(), config)
    }

    fn layout(input: &str) -> Layout {
        layout_with(input, &RenderConfig::default()).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    const TWO_NODES: &str = r#"{"nodes":[
        {"id":"A","position":{"x":0,"y":0}},
        {"id":"B","position":{"x":200,"y":0}}],
      "relationships":[{"fromId":"A","toId":"B","type":"KNOWS"}]}"#;

    #[test]
    fn bounds_add_margin() {
        let l = layout(TWO_NODES);
        assert_eq!(
            l.bounds,
            Bounds {
                min_x: -50.0,
                min_y: -50.0,
                max_x: 250.0,
                max_y: 50.0
            }
        );
        assert!(close(l.width, 300.0));
        assert!(close(l.height, 100.0));
    }

    #[test]
    fn canvas_follows_scale() {
        let config = RenderConfig {
            scale: 2.0,
            ..RenderConfig::default()
        };
        let l = layout_with(TWO_NODES, &config).unwrap();
        assert!(close(l.width, 600.0));
        assert!(close(l.height, 200.0));
    }

    #[test]
    fn huge_coordinates_stay_finite() {
        let l = layout(
            r#"{"nodes":[
                {"id":"A","position":{"x":-1e307,"y":0}},
                {"id":"B","position":{"x":1e307,"y":0}}]}"#,
        );
        assert!(l.width.is_finite() && l.width > 2e307);
    }

    #[test]
    fn overflowing_extent_is_error() {
        let err = layout_with(
            r#"{"nodes":[
                {"id":"A","position":{"x":-1.7e308,"y":0}},
                {"id":"B","position":{"x":1.7e308,"y":0}}]}"#,
            &RenderConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::CoordinateOverflow), "got: {err:?}");
    }

    #[test]
    fn empty_graph_is_error() {
        let err = layout_with(r#"{"nodes":[]}"#, &RenderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyGraph), "got: {err:?}");
    }

    #[test]
    fn straight_edge_is_shrunk() {
        let l = layout(TWO_NODES);
        assert_eq!(l.edges.len(), 1);
        match l.edges[0].path {
            EdgePath::Straight { start, end } => {
                assert!(close(start.x, 30.0) && close(start.y, 0.0), "start {start:?}");
                assert!(close(end.x, 170.0) && close(end.y, 0.0), "end {end:?}");
            }
            ref other => panic!("expected straight edge, got {other:?}"),
        }
    }

    #[test]
    fn edge_label_at_midpoint() {
        let l = layout(TWO_NODES);
        let label = l.edges[0].label.as_ref().unwrap();
        assert_eq!(label.lines.len(), 1);
        assert_eq!(label.lines[0].text, "KNOWS");
        assert!(close(label.lines[0].x, 100.0));
        assert!(close(label.lines[0].y, 0.0));
    }

    #[test]
    fn coincident_endpoints_are_not_shrunk() {
        let l = layout(
            r#"{"nodes":[
                {"id":"A","position":{"x":10,"y":10}},
                {"id":"B","position":{"x":10,"y":10}}],
              "relationships":[{"fromId":"A","toId":"B"}]}"#,
        );
        let expected = Point { x: 10.0, y: 10.0 };
        assert_eq!(
            l.edges[0].path,
            EdgePath::Straight {
                start: expected,
                end: expected
            }
        );
        assert_eq!(l.edges[0].label, None);
    }

    #[test]
    fn self_loop_sits_above_node() {
        let l = layout(
            r#"{"nodes":[{"id":"A","position":{"x":0,"y":0}}],
              "relationships":[{"fromId":"A","toId":"A","type":"SELF"}]}"#,
        );
        match l.edges[0].path {
            EdgePath::Loop { start, end, .. } => {
                assert!(start.y < 0.0 && end.y < 0.0);
                assert!(start.x < end.x);
            }
            ref other => panic!("expected loop, got {other:?}"),
        }
        let label = l.edges[0].label.as_ref().unwrap();
        assert!(label.lines[0].y < -30.0, "label above the node outline");
    }

    #[test]
    fn multiline_label_is_vertically_centered() {
        let l = layout(
            r#"{"nodes":[{"id":"A","position":{"x":0,"y":100},"labels":["Person","Admin"]}]}"#,
        );
        let label = &l.nodes[0].label;
        let ys: Vec<f64> = label.lines.iter().map(|line| line.y).collect();
        assert_eq!(ys.len(), 2);
        assert!(close((ys[0] + ys[1]) / 2.0, 100.0), "lines {ys:?}");
        assert!(ys[0] < ys[1]);
        assert_eq!(label.anchor, Anchor::Middle);
    }

    #[test]
    fn properties_block_below_node() {
        let l = layout(
            r#"{"nodes":[{"id":"A","position":{"x":5,"y":10},
                "properties":{"name":"Alice","age":42,"tags":["a","b"]}}]}"#,
        );
        let props = l.nodes[0].properties.as_ref().unwrap();
        let texts: Vec<&str> = props.lines.iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, vec!["name: Alice", "age: 42", r#"tags: ["a","b"]"#]);
        assert_eq!(props.anchor, Anchor::Start);
        assert!(close(props.lines[0].x, 5.0));
        assert!(props.lines[0].y > 60.0);
    }

    #[test]
    fn no_properties_no_block() {
        let l = layout(TWO_NODES);
        assert!(l.nodes.iter().all(|n| n.properties.is_none()));
    }

    #[test]
    fn uniform_mode_uses_label_color() {
        let l = layout(
            r#"{"nodes":[
                {"id":"A","position":{"x":0,"y":0},"labels":["X"]},
                {"id":"B","position":{"x":1,"y":1},"labels":["Y"]}]}"#,
        );
        assert!(l.nodes.iter().all(|n| n.label_fill.as_str() == "blue"));
    }

    #[test]
    fn by_labels_mode_groups_colors() {
        let config = RenderConfig {
            color_mode: ColorMode::ByLabels,
            ..RenderConfig::default()
        };
        let l = layout_with(
            r#"{"nodes":[
                {"id":"A","position":{"x":0,"y":0},"labels":["X","Y"]},
                {"id":"B","position":{"x":1,"y":1},"labels":["Z"]},
                {"id":"C","position":{"x":2,"y":2},"labels":["Y","X"]}]}"#,
            &config,
        )
        .unwrap();
        assert_eq!(l.nodes[0].label_fill, l.nodes[2].label_fill);
        assert_ne!(l.nodes[0].label_fill, l.nodes[1].label_fill);
    }

    #[test]
    fn by_labels_mode_exhausts_palette() {
        let config = RenderConfig {
            color_mode: ColorMode::ByLabels,
            palette: vec![Color::parse("red").unwrap()],
            ..RenderConfig::default()
        };
        let err = layout_with(
            r#"{"nodes":[
                {"id":"A","position":{"x":0,"y":0},"labels":["X"]},
                {"id":"B","position":{"x":1,"y":1},"labels":["Y"]}]}"#,
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, Error::PaletteExhausted { capacity: 1 }), "got: {err:?}");
    }

    #[test]
    fn format_value_strings_are_bare() {
        assert_eq!(format_value(&Value::from("x")), "x");
        assert_eq!(format_value(&Value::from(1.5)), "1.5");
        assert_eq!(format_value(&Value::Null), "null");
        assert_eq!(format_value(&Value::from(true)), "true");
    }
}
