//! # Graph
//!
//! Content-addressed graph of nodes and edges.
//!
//! Every entity is keyed by its address. Graphs built independently (one per
//! activity source) are combined with [`Graph::merge`], which fails rather than
//! choose between two different entities claiming the same address.
//!
//! All storage uses `BTreeMap`, so iteration is address-ordered and stable.

use crate::address::{EdgeAddress, NodeAddress};
use crate::CredError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ENTITIES
// =============================================================================

/// A graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identity of the node.
    pub address: NodeAddress,
    /// Human-readable description (markdown in most sources).
    pub description: String,
    /// Creation time, if the node corresponds to a dated event.
    pub timestamp_ms: Option<i64>,
}

impl Node {
    /// Create a new node.
    #[must_use]
    pub fn new(address: NodeAddress, description: impl Into<String>, timestamp_ms: Option<i64>) -> Self {
        Self {
            address,
            description: description.into(),
            timestamp_ms,
        }
    }
}

/// A directed graph edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Identity of the edge.
    pub address: EdgeAddress,
    /// Source node.
    pub src: NodeAddress,
    /// Destination node.
    pub dst: NodeAddress,
    /// Time the relationship was created.
    pub timestamp_ms: i64,
}

impl Edge {
    /// Create a new edge.
    #[must_use]
    pub fn new(address: EdgeAddress, src: NodeAddress, dst: NodeAddress, timestamp_ms: i64) -> Self {
        Self {
            address,
            src,
            dst,
            timestamp_ms,
        }
    }
}

// =============================================================================
// GRAPH
// =============================================================================

/// A set of nodes and edges keyed by address.
///
/// Built with [`Graph::add_node`] / [`Graph::add_edge`], then treated as frozen.
/// Equality is structural.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: BTreeMap<NodeAddress, Node>,
    edges: BTreeMap<EdgeAddress, Edge>,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node.
    ///
    /// Re-adding an identical node is a no-op; adding different content under
    /// an existing address fails.
    pub fn add_node(&mut self, node: Node) -> Result<(), CredError> {
        match self.nodes.get(&node.address) {
            Some(existing) if *existing == node => Ok(()),
            Some(_) => Err(CredError::MergeConflict {
                address: node.address.to_string(),
            }),
            None => {
                self.nodes.insert(node.address.clone(), node);
                Ok(())
            }
        }
    }

    /// Add an edge. Both endpoints must already be nodes of this graph.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), CredError> {
        for endpoint in [&edge.src, &edge.dst] {
            if !self.nodes.contains_key(endpoint) {
                return Err(CredError::DanglingEdge {
                    edge: edge.address.to_string(),
                    endpoint: endpoint.to_string(),
                });
            }
        }
        match self.edges.get(&edge.address) {
            Some(existing) if *existing == edge => Ok(()),
            Some(_) => Err(CredError::MergeConflict {
                address: edge.address.to_string(),
            }),
            None => {
                self.edges.insert(edge.address.clone(), edge);
                Ok(())
            }
        }
    }

    /// Union of several graphs.
    ///
    /// Any address present in more than one input must carry identical
    /// content everywhere, otherwise the whole merge fails naming that
    /// address. Inputs are only borrowed. `merge([])` is the empty graph.
    pub fn merge<'a, I>(graphs: I) -> Result<Self, CredError>
    where
        I: IntoIterator<Item = &'a Graph>,
    {
        let mut merged = Self::new();
        for graph in graphs {
            for node in graph.nodes.values() {
                merged.add_node(node.clone())?;
            }
            for edge in graph.edges.values() {
                merged.add_edge(edge.clone())?;
            }
        }
        Ok(merged)
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, address: &NodeAddress) -> Option<&Node> {
        self.nodes.get(address)
    }

    /// Look up an edge.
    #[must_use]
    pub fn edge(&self, address: &EdgeAddress) -> Option<&Edge> {
        self.edges.get(address)
    }

    /// Check if the graph contains a node.
    #[must_use]
    pub fn contains_node(&self, address: &NodeAddress) -> bool {
        self.nodes.contains_key(address)
    }

    /// Check if the graph contains an edge.
    #[must_use]
    pub fn contains_edge(&self, address: &EdgeAddress) -> bool {
        self.edges.contains_key(address)
    }

    /// All nodes in address order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in address order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Nodes whose address starts with `prefix`.
    ///
    /// Addresses sharing a prefix are contiguous in address order, so this is
    /// a range scan.
    pub fn nodes_with_prefix<'a>(&'a self, prefix: &'a NodeAddress) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes
            .range(prefix..)
            .take_while(move |(address, _)| address.has_prefix(prefix))
            .map(|(_, node)| node)
    }

    /// Edges whose address starts with `prefix`.
    pub fn edges_with_prefix<'a>(&'a self, prefix: &'a EdgeAddress) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .range(prefix..)
            .take_while(move |(address, _)| address.has_prefix(prefix))
            .map(|(_, edge)| edge)
    }

    /// Edges with `node` as source or destination, in edge address order.
    /// Loops appear once.
    pub fn adjacent_edges<'a>(&'a self, node: &'a NodeAddress) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .values()
            .filter(move |edge| edge.src == *node || edge.dst == *node)
    }

    /// Total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// =============================================================================
// SERIALIZATION
// =============================================================================

/// Serializable form of a graph: address-sorted node and edge lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableGraph {
    /// Nodes in address order.
    pub nodes: Vec<Node>,
    /// Edges in address order.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl From<&Graph> for SerializableGraph {
    fn from(graph: &Graph) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().cloned().collect(),
        }
    }
}

impl TryFrom<SerializableGraph> for Graph {
    type Error = CredError;

    /// Rebuild a graph, re-validating endpoints and address uniqueness.
    ///
    /// A serialized graph lists each address once; a repeated entry is
    /// rejected even when identical.
    fn try_from(sg: SerializableGraph) -> Result<Self, Self::Error> {
        let mut graph = Self::new();
        for node in sg.nodes {
            if graph.contains_node(&node.address) {
                return Err(CredError::DuplicateAddress(node.address.to_string()));
            }
            graph.add_node(node)?;
        }
        for edge in sg.edges {
            if graph.contains_edge(&edge.address) {
                return Err(CredError::DuplicateAddress(edge.address.to_string()));
            }
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}

// =============================================================================
// TESTS
// =============================================================================
