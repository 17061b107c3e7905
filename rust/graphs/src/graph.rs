// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Undirected planar graph of vertices and edges.
//!
//! Nodes are vertices deduplicated by tolerant equality; edges are weighted by
//! their length. A graph built from polygons also keeps those polygons, each
//! stamped with its index as id, so algorithms can reason about obstacles:
//!
//! - **boundary polygons** enclose the free space
//! - **internal polygons** are obstacles inside it
//!
//! Besides adjacency queries the graph can regroup its edges into closed
//! loops. [`Graph::build_polygons`] traces the faces of the undirected
//! arrangement; [`Graph::build_oriented_polygons`] follows each edge's own
//! direction, which is how boolean results keep their holes clockwise.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use rustc_hash::FxHashSet;

use crate::error::{Error, Result};
use crate::geometry::{Edge, Polygon, Vertex, ANGLE_TOLERANCE, TOLERANCE};
use crate::spatial::SpatialIndex;

/// A graph of vertices joined by straight edges.
#[derive(Debug, Clone, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "GraphData", into = "GraphData")
)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    /// Node indices of each edge's endpoints.
    edge_nodes: Vec<(usize, usize)>,
    /// Adjacency list: node index → list of (neighbor index, edge index).
    adjacency: Vec<Vec<(usize, usize)>>,
    index: SpatialIndex,
    polygons: Vec<Polygon>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of all polygon edges.
    ///
    /// Polygons are numbered boundaries first, then internals; the number is
    /// stamped on each polygon and its vertices. Every polygon must be closed
    /// and planar.
    pub fn by_boundary_and_internal_polygons(
        boundaries: &[Polygon],
        internals: &[Polygon],
    ) -> Result<Self> {
        let mut graph = Self::new();
        let tagged = boundaries
            .iter()
            .map(|p| (p, true))
            .chain(internals.iter().map(|p| (p, false)));

        for (polygon, is_boundary) in tagged {
            let id = graph.polygons.len();
            if !polygon.is_closed() {
                return Err(Error::invalid(format!("polygon {id} is not closed")));
            }
            if !polygon.is_planar() {
                return Err(Error::invalid(format!("polygon {id} is not planar")));
            }
            let polygon = Polygon::by_vertices(polygon.vertices().to_vec(), is_boundary)?.with_id(id);
            for edge in polygon.edges() {
                graph.add_edge(*edge);
            }
            graph.polygons.push(polygon);
        }

        tracing::debug!(
            polygons = graph.polygons.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph built from polygons"
        );
        Ok(graph)
    }

    /// Builds a graph from edges, keeping their order.
    pub fn from_edges(edges: impl IntoIterator<Item = Edge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            graph.add_edge(edge);
        }
        graph
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Adds `v` unless an equal vertex exists. Returns the node index.
    pub fn add_vertex(&mut self, v: Vertex) -> usize {
        if let Some(existing) = self.index.find(&self.vertices, &v) {
            return existing;
        }
        let idx = self.vertices.len();
        self.vertices.push(v);
        self.adjacency.push(Vec::new());
        self.index.insert(idx, &v);
        idx
    }

    /// Adds an undirected edge, reusing equal endpoints.
    ///
    /// Returns the index of the new or already present edge, or `None` for a
    /// zero-length edge.
    pub fn add_edge(&mut self, edge: Edge) -> Option<usize> {
        if edge.start == edge.end {
            return None;
        }
        let a = self.add_vertex(edge.start);
        let b = self.add_vertex(edge.end);
        if a == b {
            return None;
        }
        if let Some(&(_, existing)) = self.adjacency[a].iter().find(|&&(n, _)| n == b) {
            return Some(existing);
        }

        let idx = self.edges.len();
        self.edges.push(Edge::by_start_vertex_end_vertex(self.vertices[a], self.vertices[b]));
        self.edge_nodes.push((a, b));
        self.adjacency[a].push((b, idx));
        self.adjacency[b].push((a, idx));
        Some(idx)
    }

    /// Union of both graphs' vertices, edges and polygons.
    pub fn merge(&self, other: &Graph) -> Graph {
        let mut merged = self.clone();
        for v in &other.vertices {
            merged.add_vertex(*v);
        }
        for e in &other.edges {
            merged.add_edge(*e);
        }
        merged.polygons.extend(other.polygons.iter().cloned());
        merged
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Vertices in node-index order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Polygons the graph was built from, boundaries first.
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// The polygon carrying `id`.
    pub fn polygon(&self, id: usize) -> Option<&Polygon> {
        self.polygons.get(id)
    }

    /// Vertex at a node index.
    pub fn vertex(&self, node: usize) -> Option<&Vertex> {
        self.vertices.get(node)
    }

    /// Number of distinct vertices.
    pub fn node_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node index of the vertex equal to `v` within tolerance.
    pub fn vertex_index(&self, v: &Vertex) -> Option<usize> {
        self.index.find(&self.vertices, v)
    }

    /// Returns true if a vertex equal to `v` is present.
    pub fn contains_vertex(&self, v: &Vertex) -> bool {
        self.vertex_index(v).is_some()
    }

    /// Returns true if the edge is present in either direction.
    pub fn contains_edge(&self, edge: &Edge) -> bool {
        match (self.vertex_index(&edge.start), self.vertex_index(&edge.end)) {
            (Some(a), Some(b)) => self.adjacency[a].iter().any(|&(n, _)| n == b),
            _ => false,
        }
    }

    /// Edges incident to `v`; empty if `v` is not in the graph.
    pub fn vertex_edges(&self, v: &Vertex) -> Vec<Edge> {
        self.vertex_index(v)
            .map(|i| self.adjacency[i].iter().map(|&(_, e)| self.edges[e]).collect())
            .unwrap_or_default()
    }

    /// Vertices joined to `v` by an edge.
    pub fn adjacent_vertices(&self, v: &Vertex) -> Vec<Vertex> {
        self.vertex_index(v)
            .map(|i| self.adjacency[i].iter().map(|&(n, _)| self.vertices[n]).collect())
            .unwrap_or_default()
    }

    /// Neighbours of a node as (neighbor_index, edge_length) pairs.
    pub fn neighbors(&self, node: usize) -> Vec<(usize, f64)> {
        self.adjacency
            .get(node)
            .map(|adj| {
                adj.iter()
                    .map(|&(neighbor, edge_idx)| (neighbor, self.edges[edge_idx].length()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of edges at a node.
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency.get(node).map_or(0, Vec::len)
    }

    /// Sum of all edge lengths.
    pub fn total_length(&self) -> f64 {
        self.edges.iter().map(Edge::length).sum()
    }

    /// Ratio of present edges to the edges of a complete graph.
    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        let max_edges = n * (n - 1) / 2;
        self.edge_count() as f64 / max_edges as f64
    }

    /// Degree of every node normalized to [0, 1], where 1 means connected
    /// to every other node.
    pub fn degree_centrality(&self) -> Vec<f64> {
        let n = self.node_count();
        if n < 2 {
            return vec![0.0; n];
        }
        let max_degree = (n - 1) as f64;
        (0..n).map(|i| self.degree(i) as f64 / max_degree).collect()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Connected components as lists of node indices.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }

            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            visited[start] = true;
            queue.push_back(start);

            while let Some(node) = queue.pop_front() {
                component.push(node);
                for &(neighbor, _) in &self.adjacency[node] {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }

            components.push(component);
        }

        components
    }

    /// Returns true if every node is reachable from every other.
    pub fn is_connected(&self) -> bool {
        self.connected_components().len() <= 1
    }

    // =========================================================================
    // Loop extraction
    // =========================================================================

    /// Regroups the edges into closed polygons.
    ///
    /// Every bounded face of the planar edge arrangement is traced
    /// counter-clockwise by always leaving a node along the edge immediately
    /// clockwise of the one it arrived on. Faces with no area (open chains,
    /// dangling edges) and the unbounded outer face are dropped. A hole
    /// comes back as its own loop.
    pub fn build_polygons(&self) -> Vec<Polygon> {
        let rings: Vec<Vec<usize>> = (0..self.node_count())
            .map(|node| {
                let centre = self.vertices[node];
                let mut ring: Vec<(usize, f64)> = self.adjacency[node]
                    .iter()
                    .map(|&(n, _)| (n, self.vertices[n].angle_about(&centre)))
                    .collect();
                ring.sort_by(|a, b| a.1.total_cmp(&b.1));
                ring.into_iter().map(|(n, _)| n).collect()
            })
            .collect();

        let mut used: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut polygons = Vec::new();

        for &(a, b) in &self.edge_nodes {
            for start in [(a, b), (b, a)] {
                if used.contains(&start) {
                    continue;
                }
                let mut face = Vec::new();
                let (mut u, mut v) = start;
                loop {
                    used.insert((u, v));
                    face.push(u);
                    let ring = &rings[v];
                    let Some(pos) = ring.iter().position(|&w| w == u) else {
                        break;
                    };
                    let w = ring[(pos + ring.len() - 1) % ring.len()];
                    (u, v) = (v, w);
                    if used.contains(&(u, v)) {
                        break;
                    }
                }

                if face.len() < 3 || loop_area(&self.vertices, &face) <= TOLERANCE {
                    continue;
                }
                let vertices = face.iter().map(|&i| self.vertices[i]).collect();
                match Polygon::by_vertices(vertices, false) {
                    Ok(polygon) => polygons.push(polygon),
                    Err(err) => tracing::debug!(error = %err, "skipping degenerate loop"),
                }
            }
        }
        polygons
    }

    /// Chains the edges, each taken in its stored direction, into closed
    /// loops.
    ///
    /// A loop keeps the left side of its edges as interior, so it runs
    /// counter-clockwise around a region and clockwise around a hole. The
    /// walk cuts off a loop whenever it comes back to a node already on its
    /// path, so loops touching at a vertex come out separately. Chains that
    /// never close and loops without area are dropped.
    pub fn build_oriented_polygons(&self) -> Vec<Polygon> {
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); self.node_count()];
        for (idx, &(a, _)) in self.edge_nodes.iter().enumerate() {
            outgoing[a].push(idx);
        }

        let mut used = vec![false; self.edge_count()];
        let mut polygons = Vec::new();

        for first in 0..self.edge_count() {
            if used[first] {
                continue;
            }
            let mut path = vec![self.edge_nodes[first].0];
            let mut current = first;
            loop {
                used[current] = true;
                let (u, v) = self.edge_nodes[current];
                match path.iter().position(|&n| n == v) {
                    Some(at) => {
                        let mut face = path.split_off(at + 1);
                        face.insert(0, v);
                        self.push_loop(&face, &mut polygons);
                        if path.len() == 1 {
                            break;
                        }
                    }
                    None => path.push(v),
                }
                match self.sharpest_right_turn(&outgoing[v], &used, u, v) {
                    Some(next) => current = next,
                    None => {
                        tracing::warn!(
                            start = %self.vertices[path[0]],
                            nodes = path.len(),
                            "dropping open chain"
                        );
                        break;
                    }
                }
            }
        }
        polygons
    }

    fn push_loop(&self, face: &[usize], polygons: &mut Vec<Polygon>) {
        if face.len() < 3 || loop_area(&self.vertices, face).abs() <= TOLERANCE {
            return;
        }
        let vertices = face.iter().map(|&i| self.vertices[i]).collect();
        match Polygon::by_vertices(vertices, false) {
            Ok(polygon) => polygons.push(polygon),
            Err(err) => tracing::debug!(error = %err, "skipping degenerate loop"),
        }
    }

    /// The unused edge among `candidates` leaving `at` with the smallest
    /// clockwise turn from the direction back to `from`. Going straight back
    /// counts as a full turn.
    fn sharpest_right_turn(
        &self,
        candidates: &[usize],
        used: &[bool],
        from: usize,
        at: usize,
    ) -> Option<usize> {
        let centre = self.vertices[at];
        let back = self.vertices[from].angle_about(&centre);
        candidates
            .iter()
            .copied()
            .filter(|&e| !used[e])
            .map(|e| {
                let ahead = self.vertices[self.edge_nodes[e].1].angle_about(&centre);
                let turn = (back - ahead).rem_euclid(TAU);
                (e, if turn <= ANGLE_TOLERANCE { TAU } else { turn })
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(e, _)| e)
    }
}

/// Signed area of a node loop, positive when counter-clockwise.
fn loop_area(vertices: &[Vertex], face: &[usize]) -> f64 {
    let n = face.len();
    (0..n)
        .map(|i| {
            let p = vertices[face[i]];
            let q = vertices[face[(i + 1) % n]];
            p.x * q.y - q.x * p.y
        })
        .sum::<f64>()
        / 2.0
}

/// Serialized form of a [`Graph`]; the adjacency and spatial index are
/// rebuilt on load.
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct GraphData {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    polygons: Vec<Polygon>,
}

#[cfg(feature = "serde")]
impl From<Graph> for GraphData {
    fn from(graph: Graph) -> Self {
        Self {
            vertices: graph.vertices,
            edges: graph.edges,
            polygons: graph.polygons,
        }
    }
}

#[cfg(feature = "serde")]
impl From<GraphData> for Graph {
    fn from(data: GraphData) -> Self {
        let mut graph = Graph::new();
        for v in data.vertices {
            graph.add_vertex(v);
        }
        for e in data.edges {
            graph.add_edge(e);
        }
        graph.polygons = data.polygons;
        graph
    }
}
