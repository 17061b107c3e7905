// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point value type with tolerance-based equality and ordering.

use std::cmp::Ordering;
use std::f64::consts::TAU;
use std::fmt;

use nalgebra::{Point3, Vector3};

use super::{cmp_tol, Edge, TOLERANCE};

/// A point in 3D space.
///
/// Two vertices are equal when every coordinate differs by at most
/// [`TOLERANCE`]. The optional `polygon_id` records which polygon the vertex
/// was inserted into and takes no part in comparisons.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub polygon_id: Option<usize>,
}

/// Turn direction of three points in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Clockwise,
    Collinear,
    CounterClockwise,
}

impl Vertex {
    /// Creates a vertex from its coordinates. Never fails.
    pub fn by_coordinates(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z,
            polygon_id: None,
        }
    }

    /// Shorthand for a vertex on the XY plane.
    pub fn new(x: f64, y: f64) -> Self {
        Self::by_coordinates(x, y, 0.0)
    }

    /// Returns a copy tagged as belonging to polygon `id`.
    pub fn with_polygon_id(mut self, id: usize) -> Self {
        self.polygon_id = Some(id);
        self
    }

    /// Returns the vertex as a nalgebra point.
    pub fn to_point(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    /// Euclidean distance to another vertex.
    pub fn distance_to(&self, other: &Vertex) -> f64 {
        (other.to_point() - self.to_point()).norm()
    }

    /// Returns a copy moved by the given offsets. The polygon id is kept.
    pub fn translate(&self, dx: f64, dy: f64, dz: f64) -> Vertex {
        Vertex {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
            polygon_id: self.polygon_id,
        }
    }

    /// Midpoint between this vertex and `other`.
    pub fn mid_vertex(&self, other: &Vertex) -> Vertex {
        Vertex::by_coordinates(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }

    /// Point at parameter `t` along the segment from `self` to `other`.
    pub(crate) fn lerp(&self, other: &Vertex, t: f64) -> Vertex {
        let p = self.to_point() + (other.to_point() - self.to_point()) * t;
        Vertex::by_coordinates(p.x, p.y, p.z)
    }

    /// Signed doubled area of the triangle (a, b, c) in the XY plane.
    /// Positive when the points turn counter-clockwise.
    pub fn cross(a: &Vertex, b: &Vertex, c: &Vertex) -> f64 {
        let ab = Vector3::new(b.x - a.x, b.y - a.y, 0.0);
        let ac = Vector3::new(c.x - a.x, c.y - a.y, 0.0);
        ab.cross(&ac).z
    }

    /// Turn direction of `a -> b -> c`.
    pub fn orientation(a: &Vertex, b: &Vertex, c: &Vertex) -> Orientation {
        let cross = Self::cross(a, b, c);
        if cross.abs() <= TOLERANCE {
            Orientation::Collinear
        } else if cross > 0.0 {
            Orientation::CounterClockwise
        } else {
            Orientation::Clockwise
        }
    }

    /// Angle of the direction `centre -> self`, in `[0, 2π)`.
    pub fn angle_about(&self, centre: &Vertex) -> f64 {
        let angle = (self.y - centre.y).atan2(self.x - centre.x);
        if angle < 0.0 {
            angle + TAU
        } else {
            angle
        }
    }

    /// Unsigned angle at `centre` between the directions to `a` and `b`, in `[0, π]`.
    pub fn arc_angle(centre: &Vertex, a: &Vertex, b: &Vertex) -> f64 {
        let va = a.to_point() - centre.to_point();
        let vb = b.to_point() - centre.to_point();
        let denom = va.norm() * vb.norm();
        if denom <= f64::EPSILON {
            return 0.0;
        }
        (va.dot(&vb) / denom).clamp(-1.0, 1.0).acos()
    }

    /// Returns true if the vertex lies on the edge (endpoints included).
    pub fn is_on_edge(&self, edge: &Edge) -> bool {
        let length = edge.length();
        if length <= TOLERANCE {
            return *self == edge.start;
        }
        let off_line = Self::cross(&edge.start, &edge.end, self).abs() / length;
        off_line <= TOLERANCE
            && self.x >= edge.start.x.min(edge.end.x) - TOLERANCE
            && self.x <= edge.start.x.max(edge.end.x) + TOLERANCE
            && self.y >= edge.start.y.min(edge.end.y) - TOLERANCE
            && self.y <= edge.start.y.max(edge.end.y) + TOLERANCE
    }

    /// Total order by x, then y, then z, each with tolerance.
    pub fn cmp_tolerance(&self, other: &Vertex) -> Ordering {
        cmp_tol(self.x, other.x)
            .then_with(|| cmp_tol(self.y, other.y))
            .then_with(|| cmp_tol(self.z, other.z))
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_tolerance(other) == Ordering::Equal
    }
}

impl PartialOrd for Vertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_tolerance(other))
    }
}

impl From<Point3<f64>> for Vertex {
    fn from(p: Point3<f64>) -> Self {
        Vertex::by_coordinates(p.x, p.y, p.z)
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn equality_uses_tolerance() {
        let a = Vertex::by_coordinates(1.0, 2.0, 3.0);
        let b = Vertex::by_coordinates(1.0 + TOLERANCE / 2.0, 2.0, 3.0);
        let c = Vertex::by_coordinates(1.0 + TOLERANCE * 10.0, 2.0, 3.0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn equality_ignores_polygon_id() {
        let a = Vertex::new(1.0, 1.0).with_polygon_id(3);
        let b = Vertex::new(1.0, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn ordering_is_x_then_y_then_z() {
        let a = Vertex::by_coordinates(0.0, 5.0, 5.0);
        let b = Vertex::by_coordinates(1.0, 0.0, 0.0);
        let c = Vertex::by_coordinates(1.0, 1.0, 0.0);
        let d = Vertex::by_coordinates(1.0, 1.0, 1.0);
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
    }

    #[test]
    fn orientation_of_triangles() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(1.0, 0.0);
        assert_eq!(
            Vertex::orientation(&a, &b, &Vertex::new(1.0, 1.0)),
            Orientation::CounterClockwise
        );
        assert_eq!(
            Vertex::orientation(&a, &b, &Vertex::new(1.0, -1.0)),
            Orientation::Clockwise
        );
        assert_eq!(
            Vertex::orientation(&a, &b, &Vertex::new(3.0, 0.0)),
            Orientation::Collinear
        );
    }

    #[test]
    fn angle_about_wraps_to_positive() {
        let centre = Vertex::new(0.0, 0.0);
        assert_relative_eq!(Vertex::new(1.0, 0.0).angle_about(&centre), 0.0);
        assert_relative_eq!(Vertex::new(0.0, 1.0).angle_about(&centre), PI / 2.0);
        assert_relative_eq!(Vertex::new(0.0, -1.0).angle_about(&centre), 1.5 * PI);
    }

    #[test]
    fn arc_angle_between_directions() {
        let centre = Vertex::new(0.0, 0.0);
        let angle = Vertex::arc_angle(&centre, &Vertex::new(1.0, 0.0), &Vertex::new(0.0, 2.0));
        assert_relative_eq!(angle, PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn on_edge_detection() {
        let edge = Edge::by_start_vertex_end_vertex(Vertex::new(0.0, 0.0), Vertex::new(4.0, 4.0));
        assert!(Vertex::new(2.0, 2.0).is_on_edge(&edge));
        assert!(Vertex::new(4.0, 4.0).is_on_edge(&edge));
        assert!(!Vertex::new(5.0, 5.0).is_on_edge(&edge));
        assert!(!Vertex::new(2.0, 2.1).is_on_edge(&edge));
    }

    #[test]
    fn distance_and_display() {
        let a = Vertex::new(0.0, 0.0);
        let b = Vertex::new(3.0, 4.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
        assert_eq!(b.to_string(), "(3, 4, 0)");
    }
}
