use crate::core::models::edge::SimilarityEdge;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::{Graph, Undirected};
use std::collections::HashMap;

/// An undirected weighted graph keyed by protein id.
///
/// Inserting a pair that already exists is a no-op: the weight recorded at
/// first insertion is kept.
#[derive(Debug, Clone)]
pub struct SimilarityGraph {
    graph: Graph<String, f64, Undirected>,
    node_index_map: HashMap<String, NodeIndex>,
}

impl Default for SimilarityGraph {
    fn default() -> Self {
        Self {
            graph: Graph::new_undirected(),
            node_index_map: HashMap::new(),
        }
    }
}

impl SimilarityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_edges<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = &'a SimilarityEdge>,
    {
        let mut graph = Self::new();
        for edge in edges {
            graph.insert_edge(edge);
        }
        graph
    }

    /// Registers a node without edges. Existing nodes are left untouched.
    pub fn insert_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.node_index_map.insert(id.to_string(), idx);
        idx
    }

    /// Inserts an edge, returning `true` if the pair was not yet connected.
    pub fn insert_edge(&mut self, edge: &SimilarityEdge) -> bool {
        let (a, b) = edge.key();
        let a = self.insert_node(a);
        let b = self.insert_node(b);
        if self.graph.find_edge(a, b).is_some() {
            return false;
        }
        self.graph.add_edge(a, b, edge.weight());
        true
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index_map.contains_key(id)
    }

    pub fn contains_edge(&self, a: &str, b: &str) -> bool {
        self.weight(a, b).is_some()
    }

    /// Weight of the edge between `a` and `b`, in either order.
    pub fn weight(&self, a: &str, b: &str) -> Option<f64> {
        let a = *self.node_index_map.get(a)?;
        let b = *self.node_index_map.get(b)?;
        self.graph
            .find_edge(a, b)
            .and_then(|e| self.graph.edge_weight(e))
            .copied()
    }

    /// Neighbors of `id` in ascending id order.
    pub fn neighbors<'a>(&'a self, id: &str) -> impl Iterator<Item = (&'a str, f64)> + use<'a> {
        let mut neighbors: Vec<(&'a str, f64)> = match self.node_index_map.get(id) {
            Some(&idx) => self
                .graph
                .edges(idx)
                .map(|e| {
                    let other = if e.source() == idx { e.target() } else { e.source() };
                    (self.graph[other].as_str(), *e.weight())
                })
                .collect(),
            None => Vec::new(),
        };
        neighbors.sort_unstable_by(|x, y| x.0.cmp(y.0));
        neighbors.into_iter()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.node_index_map
            .get(id)
            .map_or(0, |&idx| self.graph.edges(idx).count())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `2E / N`, or `0` for an empty graph.
    pub fn average_degree(&self) -> f64 {
        if self.graph.node_count() == 0 {
            0.0
        } else {
            2.0 * self.graph.edge_count() as f64 / self.graph.node_count() as f64
        }
    }

    /// All edges in canonical order, sorted by `(source, target)`.
    pub fn edges(&self) -> Vec<SimilarityEdge> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .filter_map(|e| {
                SimilarityEdge::new(
                    self.graph[e.source()].as_str(),
                    self.graph[e.target()].as_str(),
                    *e.weight(),
                )
            })
            .collect();
        edges.sort_by(|x, y| x.key().cmp(&y.key()));
        edges
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_index_map.clear();
    }
}
