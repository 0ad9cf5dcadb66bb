use indexmap::IndexMap;
use indexmap::map::Entry;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::document::{Document, NodeRecord, Position};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeData {
    pub id: String,
    pub label: String,
    pub labels: Vec<String>,
    pub position: Position,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeData {
    pub rel_type: Option<String>,
    pub properties: Map<String, Value>,
}

/// Directed multigraph keyed by node id. Parallel edges and self-loops are
/// kept as separate edges.
#[derive(Debug, Clone, Default)]
pub struct PropertyGraph {
    graph: DiGraph<NodeData, EdgeData>,
    index: IndexMap<String, NodeIndex>,
}

impl PropertyGraph {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node(&self, id: &str) -> Option<&NodeData> {
        self.index.get(id).map(|&ix| &self.graph[ix])
    }

    /// Nodes in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> + '_ {
        self.index.values().map(|&ix| &self.graph[ix])
    }

    /// Edges in input order as `(source, target, data)`.
    pub fn edges(&self) -> impl Iterator<Item = (&NodeData, &NodeData, &EdgeData)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }
}

pub fn display_label(labels: &[String], caption: Option<&str>, id: &str) -> String {
    if !labels.is_empty() {
        return labels.join("\n");
    }
    match caption {
        Some(caption) if !caption.is_empty() => caption.to_string(),
        _ => id.to_string(),
    }
}

fn node_data(record: &NodeRecord) -> NodeData {
    NodeData {
        id: record.id.clone(),
        label: display_label(&record.labels, record.caption.as_deref(), &record.id),
        labels: record.labels.clone(),
        position: record.position,
        properties: record.properties.clone(),
    }
}

pub fn build(document: &Document) -> Result<PropertyGraph> {
    let mut graph = PropertyGraph::default();

    for record in &document.nodes {
        let data = node_data(record);
        match graph.index.entry(record.id.clone()) {
            Entry::Occupied(entry) => {
                warn!(id = %record.id, "duplicate node id, later record replaces earlier one");
                graph.graph[*entry.get()] = data;
            }
            Entry::Vacant(entry) => {
                entry.insert(graph.graph.add_node(data));
            }
        }
    }

    for (index, rel) in document.relationships.iter().enumerate() {
        let endpoint = |id: &str| {
            graph
                .index
                .get(id)
                .copied()
                .ok_or_else(|| Error::UnknownEndpoint {
                    index,
                    id: id.to_string(),
                })
        };
        let from = endpoint(&rel.from_id)?;
        let to = endpoint(&rel.to_id)?;
        graph.graph.add_edge(
            from,
            to,
            EdgeData {
                rel_type: rel.rel_type.clone(),
                properties: rel.properties.clone(),
            },
        );
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built property graph"
    );
    Ok(graph)
}
