use std::collections::{BTreeMap, HashMap, HashSet};

use itertools::Itertools;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use self::shape::NodeShape;

pub mod builder;
pub mod graphviz;
pub mod shape;

pub type GraphNodeId = String;
pub type Attributes = BTreeMap<String, String>;

/// Role of a vertex, derived from its rendering shape when the vertex is built.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GraphNodeKind {
    #[default]
    Unknown,
    Cell,
    Net,
}

impl GraphNodeKind {
    pub fn from_shape(shape: Option<&str>) -> Self {
        let Some(shape) = shape else {
            return GraphNodeKind::Unknown;
        };

        match shape.parse::<NodeShape>() {
            Ok(shape) if shape.is_net() => GraphNodeKind::Net,
            Ok(_) => GraphNodeKind::Cell,
            Err(_) => {
                tracing::debug!("unrecognised shape {shape:?}, node left unclassified");
                GraphNodeKind::Unknown
            }
        }
    }

    pub fn is_net(&self) -> bool {
        matches!(self, GraphNodeKind::Net)
    }

    pub fn is_cell(&self) -> bool {
        matches!(self, GraphNodeKind::Cell)
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    id: GraphNodeId,
    kind: GraphNodeKind,
    attributes: Attributes,
    inputs: Vec<GraphNodeId>,
    outputs: Vec<GraphNodeId>,
}

impl GraphNode {
    pub fn new(id: GraphNodeId, attributes: Attributes) -> Self {
        let kind = GraphNodeKind::from_shape(attributes.get("shape").map(String::as_str));

        Self {
            id,
            kind,
            attributes,
            ..Default::default()
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> GraphNodeKind {
        self.kind
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn inputs(&self) -> &[GraphNodeId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[GraphNodeId] {
        &self.outputs
    }

    // later attributes win, as in DOT
    fn merge_attributes(&mut self, attributes: Attributes) {
        if attributes.is_empty() {
            return;
        }

        self.attributes.extend(attributes);
        self.kind = GraphNodeKind::from_shape(self.attribute("shape"));
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub nodes: usize,
    pub edges: usize,
    pub cells: usize,
    pub nets: usize,
    pub unknown: usize,
}

/// Directed multigraph keyed by string ids.
///
/// Nodes keep their insertion order and every node keeps its edges in
/// insertion order, so [`Graph::edges`] is reproducible. Parallel edges are
/// kept as they are.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    index: HashMap<GraphNodeId, usize>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, or merges `attributes` into the node if the id is taken.
    pub fn add_node(&mut self, id: impl Into<GraphNodeId>, attributes: Attributes) {
        let id = id.into();

        if let Some(&index) = self.index.get(&id) {
            self.nodes[index].merge_attributes(attributes);
            return;
        }

        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(GraphNode::new(id, attributes));
    }

    /// Adds an edge. Missing endpoints are created without attributes.
    pub fn add_edge(&mut self, from: impl Into<GraphNodeId>, to: impl Into<GraphNodeId>) {
        let from = from.into();
        let to = to.into();

        let from_index = self.ensure_node(&from);
        let to_index = self.ensure_node(&to);

        self.nodes[from_index].outputs.push(to);
        self.nodes[to_index].inputs.push(from);
    }

    fn ensure_node(&mut self, id: &str) -> usize {
        if let Some(&index) = self.index.get(id) {
            return index;
        }

        self.add_node(id, Attributes::new());
        self.nodes.len() - 1
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).map(|&index| &self.nodes[index])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.id.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.outputs.len()).sum()
    }

    /// Edges ordered by source node insertion, then by edge insertion.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes.iter().flat_map(|node| {
            node.outputs
                .iter()
                .map(move |target| (node.id.as_str(), target.as_str()))
        })
    }

    pub fn predecessors(&self, id: &str) -> Option<&[GraphNodeId]> {
        self.node(id).map(GraphNode::inputs)
    }

    pub fn successors(&self, id: &str) -> Option<&[GraphNodeId]> {
        self.node(id).map(GraphNode::outputs)
    }

    pub fn summary(&self) -> GraphSummary {
        let counts = self.nodes.iter().counts_by(|node| node.kind);

        GraphSummary {
            nodes: self.node_count(),
            edges: self.edge_count(),
            cells: counts.get(&GraphNodeKind::Cell).copied().unwrap_or_default(),
            nets: counts.get(&GraphNodeKind::Net).copied().unwrap_or_default(),
            unknown: counts
                .get(&GraphNodeKind::Unknown)
                .copied()
                .unwrap_or_default(),
        }
    }

    // drops the nodes and every edge touching them
    pub(crate) fn remove_nodes(&mut self, targets: &HashSet<GraphNodeId>) {
        if targets.is_empty() {
            return;
        }

        self.nodes.retain(|node| !targets.contains(&node.id));
        for node in self.nodes.iter_mut() {
            node.inputs.retain(|id| !targets.contains(id));
            node.outputs.retain(|id| !targets.contains(id));
        }

        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();
    }

    pub fn to_petgraph(&self) -> petgraph::Graph<GraphNodeId, ()> {
        self.into()
    }

    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.to_petgraph())
    }

    pub fn is_reachable(&self, from: &str, to: &str) -> bool {
        let (Some(&from), Some(&to)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };

        petgraph::algo::has_path_connecting(
            &self.to_petgraph(),
            NodeIndex::new(from),
            NodeIndex::new(to),
            None,
        )
    }
}

// node indices follow insertion order
impl From<&Graph> for petgraph::Graph<GraphNodeId, ()> {
    fn from(value: &Graph) -> Self {
        let mut graph = petgraph::Graph::with_capacity(value.node_count(), value.edge_count());

        for node in &value.nodes {
            graph.add_node(node.id.clone());
        }

        for (from, to) in value.edges() {
            graph.add_edge(
                NodeIndex::new(value.index[from]),
                NodeIndex::new(value.index[to]),
                (),
            );
        }

        graph
    }
}
