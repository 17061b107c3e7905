// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line segments and their pairwise intersection.

use std::fmt;

use nalgebra::Vector3;

use super::{BoundingBox, HasBoundingBox, Vertex, ANGLE_TOLERANCE, TOLERANCE};

/// A line segment between two vertices.
///
/// Equality is undirected: an edge equals its reverse.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    pub start: Vertex,
    pub end: Vertex,
}

/// Result of intersecting two edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The edges do not meet.
    None,
    /// The edges meet at a single point.
    Point(Vertex),
    /// The edges are collinear and share a segment.
    Segment(Edge),
}

impl Intersection {
    /// Returns true when the edges do not meet.
    pub fn is_none(&self) -> bool {
        matches!(self, Intersection::None)
    }
}

impl Edge {
    /// Creates an edge between two vertices. Never fails.
    pub fn by_start_vertex_end_vertex(start: Vertex, end: Vertex) -> Self {
        Self { start, end }
    }

    /// Euclidean length.
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Unnormalised direction vector from start to end.
    pub fn direction(&self) -> Vector3<f64> {
        self.end.to_point() - self.start.to_point()
    }

    /// The same edge running from end to start.
    pub fn reversed(&self) -> Edge {
        Edge::by_start_vertex_end_vertex(self.end, self.start)
    }

    /// Point halfway between the endpoints.
    pub fn mid_vertex(&self) -> Vertex {
        self.start.mid_vertex(&self.end)
    }

    /// Returns true if `v` is one of the edge's endpoints.
    pub fn contains_vertex(&self, v: &Vertex) -> bool {
        self.start == *v || self.end == *v
    }

    /// Returns the endpoint opposite to `v`, or `None` if `v` is not an endpoint.
    pub fn other_vertex(&self, v: &Vertex) -> Option<Vertex> {
        if self.start == *v {
            Some(self.end)
        } else if self.end == *v {
            Some(self.start)
        } else {
            None
        }
    }

    /// Returns true if `v` lies anywhere on the segment.
    pub fn is_on_edge(&self, v: &Vertex) -> bool {
        v.is_on_edge(self)
    }

    /// Returns true if the edges meet anywhere, endpoints included.
    pub fn intersects(&self, other: &Edge) -> bool {
        !self.intersection(other).is_none()
    }

    /// Intersects two edges in the XY plane.
    ///
    /// Point results that land within tolerance of an endpoint are snapped to
    /// that endpoint. Overlap segments are returned with `start < end`.
    pub fn intersection(&self, other: &Edge) -> Intersection {
        let len_a = self.length();
        let len_b = other.length();

        if len_a <= TOLERANCE || len_b <= TOLERANCE {
            return degenerate_intersection(self, other, len_a, len_b);
        }

        let d1 = self.direction();
        let d2 = other.direction();
        let denom = d1.x * d2.y - d1.y * d2.x;

        if (denom / (len_a * len_b)).abs() <= ANGLE_TOLERANCE {
            let off_line = Vertex::cross(&self.start, &self.end, &other.start).abs() / len_a;
            if off_line > TOLERANCE {
                return Intersection::None;
            }
            return collinear_overlap(self, other);
        }

        let wx = other.start.x - self.start.x;
        let wy = other.start.y - self.start.y;
        let t = (wx * d2.y - wy * d2.x) / denom;
        let u = (wx * d1.y - wy * d1.x) / denom;

        let tol_t = TOLERANCE / len_a;
        let tol_u = TOLERANCE / len_b;
        if t < -tol_t || t > 1.0 + tol_t || u < -tol_u || u > 1.0 + tol_u {
            return Intersection::None;
        }

        let point = self.start.lerp(&self.end, t.clamp(0.0, 1.0));
        let snapped = [self.start, self.end, other.start, other.end]
            .into_iter()
            .find(|v| *v == point)
            .unwrap_or(point);
        Intersection::Point(snapped)
    }
}

fn degenerate_intersection(a: &Edge, b: &Edge, len_a: f64, len_b: f64) -> Intersection {
    match (len_a <= TOLERANCE, len_b <= TOLERANCE) {
        (true, true) if a.start == b.start => Intersection::Point(a.start),
        (true, false) if b.is_on_edge(&a.start) => Intersection::Point(a.start),
        (false, true) if a.is_on_edge(&b.start) => Intersection::Point(b.start),
        _ => Intersection::None,
    }
}

fn collinear_overlap(a: &Edge, b: &Edge) -> Intersection {
    let mut shared: Vec<Vertex> = Vec::with_capacity(4);
    for v in [a.start, a.end, b.start, b.end] {
        if a.is_on_edge(&v) && b.is_on_edge(&v) && !shared.contains(&v) {
            shared.push(v);
        }
    }
    shared.sort_by(|p, q| p.cmp_tolerance(q));

    match shared.as_slice() {
        [] => Intersection::None,
        [only] => Intersection::Point(*only),
        [first, .., last] => Intersection::Segment(Edge::by_start_vertex_end_vertex(*first, *last)),
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        (self.start == other.start && self.end == other.end)
            || (self.start == other.end && self.end == other.start)
    }
}

impl HasBoundingBox for Edge {
    fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices([&self.start, &self.end])
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}
