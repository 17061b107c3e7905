// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Visibility graph built with Lee's radial sweep.
//!
//! From every vertex a ray is rotated counter-clockwise through the other
//! vertices in angular order. The obstacle edges currently cut by the ray are
//! kept sorted by their distance along it ("open edges"); a vertex is visible
//! when the closest open edge does not lie between it and the ray's centre.
//! Edges enter the open set at the endpoint where the ray first reaches them
//! and leave at the other one.
//!
//! The sweep only sees edges. Sight lines that pass through the interior of
//! an obstacle between two of its own vertices, or leave the boundary through
//! a concave corner, are rejected by probing points along the sight line.

use std::cmp::Ordering;
use std::f64::consts::TAU;

use crate::algorithms::dijkstra;
use crate::error::{Error, Result};
use crate::geometry::{Edge, Intersection, Orientation, Polygon, Vertex, ANGLE_TOLERANCE, TOLERANCE};
use crate::graph::Graph;

/// Largest offset from a sight line's ends at which free space is sampled.
const SAMPLE_DISTANCE: f64 = 1e-3;

/// Angular offset of the side rays cast past each vertex for an isovist.
const ISOVIST_RAY_OFFSET: f64 = 1e-6;

/// An obstacle edge seen along the ray from `centre` through `vertex`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeKey {
    pub centre: Vertex,
    pub vertex: Vertex,
    pub edge: Edge,
}

impl EdgeKey {
    pub fn new(centre: Vertex, vertex: Vertex, edge: Edge) -> Self {
        Self { centre, vertex, edge }
    }

    /// Distance from the centre to where this key's ray meets `edge`'s line.
    fn distance_to(&self, edge: &Edge) -> f64 {
        if edge.contains_vertex(&self.vertex) {
            return self.centre.distance_to(&self.vertex);
        }
        if edge.contains_vertex(&self.centre) {
            return 0.0;
        }
        let length = self.centre.distance_to(&self.vertex);
        if length <= TOLERANCE {
            return f64::INFINITY;
        }
        let (dx, dy) = (
            (self.vertex.x - self.centre.x) / length,
            (self.vertex.y - self.centre.y) / length,
        );
        let (ex, ey) = (edge.end.x - edge.start.x, edge.end.y - edge.start.y);
        let denom = dx * ey - dy * ex;
        if denom.abs() <= ANGLE_TOLERANCE * edge.length() {
            return f64::INFINITY;
        }
        let (wx, wy) = (edge.start.x - self.centre.x, edge.start.y - self.centre.y);
        (wx * ey - wy * ex) / denom
    }

    /// Which of the two edges the ray of `self` meets first.
    ///
    /// Edges met at the same distance share an endpoint there; the one
    /// turning back towards the centre more sharply is closer.
    pub fn compare(&self, other: &EdgeKey) -> Ordering {
        if self.edge == other.edge {
            return Ordering::Equal;
        }
        let by_distance = cmp_distance(self.distance_to(&self.edge), self.distance_to(&other.edge));
        if by_distance != Ordering::Equal {
            return by_distance;
        }

        let shared = if self.edge.contains_vertex(&other.edge.start) {
            other.edge.start
        } else if self.edge.contains_vertex(&other.edge.end) {
            other.edge.end
        } else {
            return Ordering::Equal;
        };
        let (Some(mine), Some(theirs)) = (
            self.edge.other_vertex(&shared),
            other.edge.other_vertex(&shared),
        ) else {
            return Ordering::Equal;
        };
        let mine = Vertex::arc_angle(&shared, &self.centre, &mine);
        let theirs = Vertex::arc_angle(&shared, &self.centre, &theirs);
        mine.total_cmp(&theirs)
    }
}

fn cmp_distance(a: f64, b: f64) -> Ordering {
    if (a - b).abs() <= TOLERANCE || (a.is_infinite() && b.is_infinite()) {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

impl PartialEq for EdgeKey {
    fn eq(&self, other: &Self) -> bool {
        self.edge == other.edge
    }
}

impl PartialOrd for EdgeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

/// Open edges sorted by distance along the current ray.
#[derive(Debug, Default)]
struct OpenEdges {
    keys: Vec<EdgeKey>,
}

impl OpenEdges {
    fn insert(&mut self, key: EdgeKey) {
        let pos = self
            .keys
            .partition_point(|existing| key.compare(existing) == Ordering::Greater);
        self.keys.insert(pos, key);
    }

    fn remove(&mut self, edge: &Edge) {
        if let Some(pos) = self.keys.iter().position(|k| k.edge == *edge) {
            self.keys.remove(pos);
        }
    }

    fn closest(&self) -> Option<&EdgeKey> {
        self.keys.first()
    }

    fn iter(&self) -> impl Iterator<Item = &EdgeKey> {
        self.keys.iter()
    }
}

/// Graph of mutually visible vertices over a base graph of obstacles.
#[derive(Debug, Clone)]
pub struct VisibilityGraph {
    base: Graph,
    graph: Graph,
    reduced: bool,
}

impl VisibilityGraph {
    /// Runs the radial sweep from every vertex of `base`.
    ///
    /// With `reduced` set, two vertices of the same internal polygon are only
    /// joined when they are adjacent on it.
    pub fn by_base_graph(base: &Graph, reduced: bool) -> Result<Self> {
        if let Some(open) = base.polygons().iter().find(|p| !p.is_closed()) {
            return Err(Error::invalid(format!(
                "polygon {} is not closed",
                open.id().map_or_else(|| "?".to_string(), |id| id.to_string())
            )));
        }

        let mut visibility = Self {
            base: base.clone(),
            graph: Graph::new(),
            reduced,
        };
        let mut graph = Graph::new();
        for v in base.vertices() {
            graph.add_vertex(*v);
        }
        for centre in base.vertices() {
            for v in visibility.visible_vertices(centre, &[]) {
                graph.add_edge(Edge::by_start_vertex_end_vertex(*centre, v));
            }
        }
        visibility.graph = graph;

        tracing::debug!(
            vertices = visibility.graph.node_count(),
            edges = visibility.graph.edge_count(),
            reduced,
            "visibility graph built"
        );
        Ok(visibility)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn base_graph(&self) -> &Graph {
        &self.base
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    /// Vertices of the base graph, plus `extra`, visible from `centre`.
    pub fn visible_vertices(&self, centre: &Vertex, extra: &[Vertex]) -> Vec<Vertex> {
        let candidates = self.sorted_candidates(centre, extra);
        let mut open = self.initial_open_edges(centre);

        let mut visible = Vec::new();
        let mut prev: Option<Vertex> = None;
        let mut prev_visible = false;

        for p in candidates {
            let incident = self.base.vertex_edges(&p);

            for edge in &incident {
                if let Some(other) = edge.other_vertex(&p) {
                    if Vertex::orientation(centre, &p, &other) == Orientation::Clockwise {
                        open.remove(edge);
                    }
                }
            }

            let collinear_with_prev = prev.is_some_and(|q| {
                Vertex::orientation(centre, &q, &p) == Orientation::Collinear
                    && Edge::by_start_vertex_end_vertex(*centre, p).is_on_edge(&q)
            });

            let mut is_visible = match prev {
                Some(q) if collinear_with_prev => {
                    prev_visible
                        && !open
                            .iter()
                            .any(|k| !k.edge.contains_vertex(&q) && blocks(&q, &p, &k.edge))
                        && self.in_free_space(&q, &p)
                }
                _ => open.closest().map_or(true, |k| !blocks(centre, &p, &k.edge)),
            };

            if is_visible && !self.base.adjacent_vertices(centre).contains(&p) {
                is_visible = self.in_free_space(centre, &p);
            }

            if is_visible && !(self.reduced && self.same_obstacle_non_adjacent(centre, &p)) {
                visible.push(p);
            }

            for edge in &incident {
                if edge.contains_vertex(centre) {
                    continue;
                }
                if let Some(other) = edge.other_vertex(&p) {
                    if Vertex::orientation(centre, &p, &other) == Orientation::CounterClockwise {
                        open.insert(EdgeKey::new(*centre, p, *edge));
                    }
                }
            }

            prev = Some(p);
            prev_visible = is_visible;
        }
        visible
    }

    /// True if the sight line between `a` and `b` is unobstructed.
    pub fn are_visible(&self, a: &Vertex, b: &Vertex) -> bool {
        if a == b {
            return true;
        }
        if self.graph.contains_vertex(a) && self.graph.contains_vertex(b) {
            return self
                .graph
                .contains_edge(&Edge::by_start_vertex_end_vertex(*a, *b));
        }
        self.visible_vertices(a, std::slice::from_ref(b)).contains(b)
    }

    /// Visibility degree of every vertex, normalized to [0, 1].
    pub fn connectivity(&self) -> Vec<f64> {
        self.graph.degree_centrality()
    }

    /// Region visible from `centre`, traced counter-clockwise.
    ///
    /// Rays are cast at every vertex and slightly to either side of it, so
    /// the region wraps around obstacle corners.
    pub fn isovist(&self, centre: &Vertex) -> Result<Polygon> {
        if !self.point_in_free_space(centre) {
            return Err(Error::invalid(format!(
                "isovist centre {centre} lies outside free space"
            )));
        }

        let mut angles: Vec<f64> = self
            .base
            .vertices()
            .iter()
            .filter(|v| *v != centre)
            .flat_map(|v| {
                let angle = v.angle_about(centre);
                [angle - ISOVIST_RAY_OFFSET, angle, angle + ISOVIST_RAY_OFFSET]
            })
            .map(|a| a.rem_euclid(TAU))
            .collect();
        angles.sort_by(f64::total_cmp);
        angles.dedup_by(|a, b| (*a - *b).abs() < ISOVIST_RAY_OFFSET * 0.1);

        let edges = self.base.edges();
        let mut points: Vec<Vertex> = Vec::with_capacity(angles.len());
        for angle in angles {
            let Some(hit) = cast_ray(centre, angle, edges) else {
                continue;
            };
            if points.last().map_or(true, |last| *last != hit) {
                points.push(hit);
            }
        }
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Polygon::by_vertices(points, false)
    }

    /// Shortest path between two arbitrary points through the visibility
    /// graph. Points outside the graph are joined to it by their sight lines
    /// without modifying it.
    pub fn shortest_path(&self, origin: &Vertex, destination: &Vertex) -> Result<Graph> {
        let mut temp = Graph::new();
        for (point, other) in [(origin, destination), (destination, origin)] {
            if self.graph.contains_vertex(point) {
                continue;
            }
            temp.add_vertex(*point);
            for v in self.visible_vertices(point, std::slice::from_ref(other)) {
                temp.add_edge(Edge::by_start_vertex_end_vertex(*point, v));
            }
        }
        dijkstra(&self.graph, origin, destination, Some(&temp))
    }

    /// All candidate vertices other than `centre`, by angle then distance.
    fn sorted_candidates(&self, centre: &Vertex, extra: &[Vertex]) -> Vec<Vertex> {
        let mut candidates: Vec<Vertex> = Vec::with_capacity(self.base.node_count() + extra.len());
        for v in self.base.vertices().iter().chain(extra) {
            if v != centre && !candidates.contains(v) {
                candidates.push(*v);
            }
        }

        let mut keyed: Vec<(f64, f64, Vertex)> = candidates
            .into_iter()
            .map(|v| (v.angle_about(centre), v.distance_to(centre), v))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Angles within tolerance of each other count as one direction.
        let mut start = 0;
        while start < keyed.len() {
            let mut end = start + 1;
            while end < keyed.len() && keyed[end].0 - keyed[start].0 <= ANGLE_TOLERANCE {
                end += 1;
            }
            keyed[start..end].sort_by(|a, b| a.1.total_cmp(&b.1));
            start = end;
        }
        keyed.into_iter().map(|(_, _, v)| v).collect()
    }

    /// Edges properly crossing the ray from `centre` along +x.
    fn initial_open_edges(&self, centre: &Vertex) -> OpenEdges {
        let through = centre.translate(1.0, 0.0, 0.0);
        let mut open = OpenEdges::default();
        for edge in self.base.edges() {
            if edge.contains_vertex(centre) {
                continue;
            }
            let (da, db) = (edge.start.y - centre.y, edge.end.y - centre.y);
            if da.abs() <= TOLERANCE || db.abs() <= TOLERANCE || (da > 0.0) == (db > 0.0) {
                continue;
            }
            let t = da / (da - db);
            let x = edge.start.x + t * (edge.end.x - edge.start.x);
            if x > centre.x + TOLERANCE {
                open.insert(EdgeKey::new(*centre, through, *edge));
            }
        }
        open
    }

    fn same_obstacle_non_adjacent(&self, a: &Vertex, b: &Vertex) -> bool {
        let (Some(id), Some(other)) = (self.polygon_id_of(a), self.polygon_id_of(b)) else {
            return false;
        };
        id == other
            && self.base.polygon(id).is_some_and(|p| !p.is_boundary())
            && !self.base.adjacent_vertices(a).contains(b)
    }

    fn polygon_id_of(&self, v: &Vertex) -> Option<usize> {
        self.base
            .vertex_index(v)
            .and_then(|i| self.base.vertex(i))
            .and_then(|v| v.polygon_id)
    }

    /// Samples the segment near both ends, and at its middle when both ends
    /// lie on one polygon.
    fn in_free_space(&self, a: &Vertex, b: &Vertex) -> bool {
        let length = a.distance_to(b);
        if length <= TOLERANCE {
            return true;
        }
        let t = (length / 2.0).min(SAMPLE_DISTANCE) / length;
        let mut samples = vec![a.lerp(b, t), b.lerp(a, t)];
        let (ia, ib) = (self.polygon_id_of(a), self.polygon_id_of(b));
        if ia.is_some() && ia == ib {
            samples.push(a.mid_vertex(b));
        }
        samples.iter().all(|p| self.point_in_free_space(p))
    }

    /// Inside or on every boundary polygon and not strictly inside any
    /// obstacle.
    fn point_in_free_space(&self, p: &Vertex) -> bool {
        self.base.polygons().iter().all(|polygon| {
            if polygon.is_boundary() {
                polygon.contains_vertex(p)
            } else {
                !polygon.interior_contains_vertex(p)
            }
        })
    }
}

/// True if `edge` crosses the sight line `from -> to` anywhere other than
/// at its ends. Running along the sight line does not block it.
fn blocks(from: &Vertex, to: &Vertex, edge: &Edge) -> bool {
    match Edge::by_start_vertex_end_vertex(*from, *to).intersection(edge) {
        Intersection::Point(p) => p != *from && p != *to,
        Intersection::Segment(_) | Intersection::None => false,
    }
}

/// Nearest point where the ray from `origin` at `angle` meets an edge.
fn cast_ray(origin: &Vertex, angle: f64, edges: &[Edge]) -> Option<Vertex> {
    let (dx, dy) = (angle.cos(), angle.sin());
    let mut closest: Option<f64> = None;
    for edge in edges {
        let (ex, ey) = (edge.end.x - edge.start.x, edge.end.y - edge.start.y);
        let cross = dx * ey - dy * ex;
        if cross.abs() <= f64::EPSILON {
            continue;
        }
        let (wx, wy) = (edge.start.x - origin.x, edge.start.y - origin.y);
        let t = (wx * ey - wy * ex) / cross;
        let u = (wx * dy - wy * dx) / cross;
        if t > TOLERANCE && (0.0..=1.0).contains(&u) && closest.map_or(true, |c| t < c) {
            closest = Some(t);
        }
    }
    closest.map(|t| Vertex::by_coordinates(origin.x + t * dx, origin.y + t * dy, origin.z))
}
