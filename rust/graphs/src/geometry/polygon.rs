// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed polygons, containment, planarity and boolean entry points.

use std::cell::OnceCell;

use nalgebra::Vector3;

use super::{BoundingBox, Edge, HasBoundingBox, Intersection, Vertex, TOLERANCE};
use crate::error::{Error, Result};
use crate::sweep::{BooleanType, SweepLine};

/// An ordered loop of vertices.
///
/// Vertex order defines the winding; edges join consecutive vertices and wrap
/// around from the last vertex to the first. Boundary polygons enclose free
/// space, internal polygons are obstacles inside it.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    id: Option<usize>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    is_boundary: bool,
    #[cfg_attr(feature = "serde", serde(skip))]
    bbox: OnceCell<BoundingBox>,
}

impl Polygon {
    /// Builds a polygon from an ordered point loop.
    ///
    /// A closing vertex equal to the first one is dropped. Fewer than three
    /// distinct vertices is an error.
    pub fn by_vertices(mut vertices: Vec<Vertex>, is_boundary: bool) -> Result<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(Error::invalid(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(Self::from_loop(vertices, is_boundary, None))
    }

    fn from_loop(vertices: Vec<Vertex>, is_boundary: bool, id: Option<usize>) -> Self {
        let n = vertices.len();
        let edges = if n < 2 {
            Vec::new()
        } else {
            (0..n)
                .map(|i| Edge::by_start_vertex_end_vertex(vertices[i], vertices[(i + 1) % n]))
                .collect()
        };
        Self {
            id,
            vertices,
            edges,
            is_boundary,
            bbox: OnceCell::new(),
        }
    }

    /// Returns a copy with `id` stamped on the polygon and all its vertices.
    pub fn with_id(&self, id: usize) -> Self {
        let vertices = self.vertices.iter().map(|v| v.with_polygon_id(id)).collect();
        Self::from_loop(vertices, self.is_boundary, Some(id))
    }

    /// Index assigned by the graph the polygon was added to.
    pub fn id(&self) -> Option<usize> {
        self.id
    }

    /// Vertices in loop order, without a repeated closing vertex.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Edges joining consecutive vertices, wrapping around.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns true for polygons enclosing free space.
    pub fn is_boundary(&self) -> bool {
        self.is_boundary
    }

    /// Returns true for the polygon with no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// A polygon is closed when it has more than two edges and the first
    /// edge touches the last.
    pub fn is_closed(&self) -> bool {
        match (self.edges.first(), self.edges.last()) {
            (Some(first), Some(last)) if self.edges.len() > 2 => {
                first.contains_vertex(&last.start) || first.contains_vertex(&last.end)
            }
            _ => false,
        }
    }

    /// Unit normal computed with Newell's method, or `None` for degenerate
    /// polygons.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        let n = self.vertices.len();
        if n < 3 {
            return None;
        }

        let mut normal = Vector3::new(0.0, 0.0, 0.0);
        for i in 0..n {
            let curr = &self.vertices[i];
            let next = &self.vertices[(i + 1) % n];
            normal.x += (curr.y - next.y) * (curr.z + next.z);
            normal.y += (curr.z - next.z) * (curr.x + next.x);
            normal.z += (curr.x - next.x) * (curr.y + next.y);
        }

        let len = normal.norm();
        if len < 1e-15 {
            return None;
        }
        Some(normal / len)
    }

    /// Returns true if every vertex lies on the polygon's plane.
    pub fn is_planar(&self) -> bool {
        self.lies_on_plane(&self.vertices)
    }

    /// Returns true if both polygons lie on the same plane.
    pub fn coplanar(&self, other: &Polygon) -> bool {
        self.lies_on_plane(&self.vertices) && self.lies_on_plane(&other.vertices)
    }

    fn lies_on_plane(&self, vertices: &[Vertex]) -> bool {
        let (Some(normal), Some(origin)) = (self.normal(), self.vertices.first()) else {
            return false;
        };
        let origin = origin.to_point();
        vertices
            .iter()
            .all(|v| (v.to_point() - origin).dot(&normal).abs() <= TOLERANCE)
    }

    /// Winding number of the polygon around `v`.
    ///
    /// A ray is cast from `v` towards +x past the farthest vertex; each edge
    /// crossing it upwards with `v` on its left adds one, each edge crossing
    /// downwards with `v` on its right subtracts one.
    fn winding_number(&self, v: &Vertex) -> i32 {
        let mut winding = 0;
        for edge in &self.edges {
            let side = Vertex::cross(&edge.start, &edge.end, v);
            if edge.start.y <= v.y {
                if edge.end.y > v.y && side > 0.0 {
                    winding += 1;
                }
            } else if edge.end.y <= v.y && side < 0.0 {
                winding -= 1;
            }
        }
        winding
    }

    /// Returns true if `v` lies on one of the polygon's edges.
    pub fn boundary_contains_vertex(&self, v: &Vertex) -> bool {
        self.edges.iter().any(|e| e.is_on_edge(v))
    }

    /// Containment test; vertices on the boundary count as contained.
    pub fn contains_vertex(&self, v: &Vertex) -> bool {
        if self.edges.is_empty() || !self.bounding_box().contains_vertex(v) {
            return false;
        }
        self.boundary_contains_vertex(v) || self.winding_number(v) != 0
    }

    /// Strict interior containment; vertices on the boundary are excluded.
    pub fn interior_contains_vertex(&self, v: &Vertex) -> bool {
        if self.edges.is_empty() || !self.bounding_box().contains_vertex(v) {
            return false;
        }
        !self.boundary_contains_vertex(v) && self.winding_number(v) != 0
    }

    /// Returns a new polygon with `v` spliced in after the start of `edge`.
    ///
    /// `self` is left untouched, so references held elsewhere stay valid.
    pub fn add_vertex(&self, v: Vertex, edge: &Edge) -> Result<Polygon> {
        let index = self
            .edges
            .iter()
            .position(|e| e == edge)
            .ok_or_else(|| Error::invalid(format!("edge {edge} is not part of the polygon")))?;

        let v = match self.id {
            Some(id) => v.with_polygon_id(id),
            None => v,
        };
        let mut vertices = self.vertices.clone();
        vertices.insert(index + 1, v);
        Ok(Self::from_loop(vertices, self.is_boundary, self.id))
    }

    /// Signed area in the XY plane; positive for counter-clockwise loops.
    pub fn signed_area(&self) -> f64 {
        self.edges
            .iter()
            .map(|e| e.start.x * e.end.y - e.end.x * e.start.y)
            .sum::<f64>()
            / 2.0
    }

    /// Unsigned area in the XY plane.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Returns true for clockwise loops, such as the holes of a boolean result.
    pub fn is_clockwise(&self) -> bool {
        self.signed_area() < 0.0
    }

    /// Area-weighted centroid, falling back to the vertex average for
    /// degenerate loops.
    pub fn centroid(&self) -> Option<Vertex> {
        if self.vertices.is_empty() {
            return None;
        }
        let area = self.signed_area();
        if area.abs() <= TOLERANCE {
            let n = self.vertices.len() as f64;
            let (sx, sy, sz) = self
                .vertices
                .iter()
                .fold((0.0, 0.0, 0.0), |(x, y, z), v| (x + v.x, y + v.y, z + v.z));
            return Some(Vertex::by_coordinates(sx / n, sy / n, sz / n));
        }

        let (mut cx, mut cy) = (0.0, 0.0);
        for e in &self.edges {
            let f = e.start.x * e.end.y - e.end.x * e.start.y;
            cx += (e.start.x + e.end.x) * f;
            cy += (e.start.y + e.end.y) * f;
        }
        let z = self.vertices[0].z;
        Some(Vertex::by_coordinates(cx / (6.0 * area), cy / (6.0 * area), z))
    }

    /// Returns true if the vertex sets match, regardless of start and winding.
    pub fn same_vertices(&self, other: &Polygon) -> bool {
        self.vertices.len() == other.vertices.len()
            && self.vertices.iter().all(|v| other.vertices.contains(v))
    }

    /// Returns true if any edge of `self` crosses or touches an edge of
    /// `other` anywhere other than at a shared endpoint.
    ///
    /// Only boundaries are compared: a polygon fully inside another does not
    /// intersect it.
    pub fn intersects(&self, other: &Polygon) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        if !self.bounding_box().intersects(&other.bounding_box()) {
            return false;
        }
        SweepLine::by_polygons(std::slice::from_ref(self), std::slice::from_ref(other))
            .has_intersection()
    }

    /// Every point or overlap where the two boundaries meet.
    pub fn intersection_points(&self, other: &Polygon) -> Vec<Intersection> {
        if self.is_empty()
            || other.is_empty()
            || !self.bounding_box().intersects(&other.bounding_box())
        {
            return Vec::new();
        }
        SweepLine::by_polygons(std::slice::from_ref(self), std::slice::from_ref(other))
            .get_intersections()
    }

    /// Area covered by either polygon. Holes come back as clockwise loops.
    pub fn union(&self, other: &Polygon) -> Result<Vec<Polygon>> {
        self.boolean(other, BooleanType::Union)
    }

    /// Area of `self` outside `other`. Holes come back as clockwise loops.
    pub fn difference(&self, other: &Polygon) -> Result<Vec<Polygon>> {
        self.boolean(other, BooleanType::Difference)
    }

    /// Area shared by both polygons.
    pub fn intersection(&self, other: &Polygon) -> Result<Vec<Polygon>> {
        self.boolean(other, BooleanType::Intersection)
    }

    fn boolean(&self, other: &Polygon, operation: BooleanType) -> Result<Vec<Polygon>> {
        ensure_coplanar(self, other)?;
        SweepLine::by_polygons(std::slice::from_ref(self), std::slice::from_ref(other))
            .compute_boolean_operation(operation)
    }

    /// Union of all polygons in the list.
    pub fn union_list(polygons: &[Polygon]) -> Result<Vec<Polygon>> {
        let mut iter = polygons.iter().filter(|p| !p.is_empty());
        let Some(first) = iter.next() else {
            return Ok(Vec::new());
        };
        let mut acc = vec![first.clone()];
        for polygon in iter {
            for existing in &acc {
                ensure_coplanar(existing, polygon)?;
            }
            acc = SweepLine::by_polygons(&acc, std::slice::from_ref(polygon))
                .compute_boolean_operation(BooleanType::Union)?;
        }
        Ok(acc)
    }

    /// Subtracts every clip polygon from every subject polygon.
    pub fn difference_list(subjects: &[Polygon], clips: &[Polygon]) -> Result<Vec<Polygon>> {
        let subjects: Vec<Polygon> = subjects.iter().filter(|p| !p.is_empty()).cloned().collect();
        let clips = Self::union_list(clips)?;
        if subjects.is_empty() || clips.is_empty() {
            return Ok(subjects);
        }
        for s in &subjects {
            for c in &clips {
                ensure_coplanar(s, c)?;
            }
        }
        SweepLine::by_polygons(&subjects, &clips).compute_boolean_operation(BooleanType::Difference)
    }

    /// Region shared by all polygons in the list.
    pub fn intersection_list(polygons: &[Polygon]) -> Result<Vec<Polygon>> {
        let Some((first, rest)) = polygons.split_first() else {
            return Ok(Vec::new());
        };
        let mut acc = vec![first.clone()];
        for polygon in rest {
            if acc.is_empty() {
                break;
            }
            for existing in &acc {
                ensure_coplanar(existing, polygon)?;
            }
            acc = SweepLine::by_polygons(&acc, std::slice::from_ref(polygon))
                .compute_boolean_operation(BooleanType::Intersection)?;
        }
        Ok(acc)
    }
}

fn ensure_coplanar(a: &Polygon, b: &Polygon) -> Result<()> {
    if a.is_empty() || b.is_empty() {
        return Ok(());
    }
    if !a.is_planar() || !b.is_planar() {
        return Err(Error::invalid("boolean operations require planar polygons"));
    }
    if !a.coplanar(b) {
        return Err(Error::invalid("boolean operations require coplanar polygons"));
    }
    Ok(())
}

impl HasBoundingBox for Polygon {
    fn bounding_box(&self) -> BoundingBox {
        *self
            .bbox
            .get_or_init(|| BoundingBox::from_vertices(&self.vertices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Polygon {
        Polygon::by_vertices(
            vec![
                Vertex::new(-0.5, -0.5),
                Vertex::new(0.5, -0.5),
                Vertex::new(0.5, 0.5),
                Vertex::new(-0.5, 0.5),
            ],
            false,
        )
        .unwrap()
    }

    #[test]
    fn rejects_fewer_than_three_vertices() {
        let result = Polygon::by_vertices(vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0)], false);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn drops_repeated_closing_vertex() {
        let p = Polygon::by_vertices(
            vec![
                Vertex::new(0.0, 0.0),
                Vertex::new(1.0, 0.0),
                Vertex::new(1.0, 1.0),
                Vertex::new(0.0, 0.0),
            ],
            false,
        )
        .unwrap();
        assert_eq!(p.vertices().len(), 3);
        assert_eq!(p.edges().len(), 3);
    }

    #[test]
    fn edges_wrap_around() {
        let p = unit_square();
        assert_eq!(p.edges().len(), 4);
        assert_eq!(p.edges()[3].start, Vertex::new(-0.5, 0.5));
        assert_eq!(p.edges()[3].end, Vertex::new(-0.5, -0.5));
        assert!(p.is_closed());
        assert!(!Polygon::default().is_closed());
    }

    #[test]
    fn with_id_tags_vertices() {
        let p = unit_square().with_id(7);
        assert_eq!(p.id(), Some(7));
        assert!(p.vertices().iter().all(|v| v.polygon_id == Some(7)));
    }

    #[test]
    fn containment_of_unit_square() {
        let p = unit_square();
        assert!(p.contains_vertex(&Vertex::new(0.0, 0.0)));
        assert!(!p.contains_vertex(&Vertex::new(0.5 + 10.0 * TOLERANCE, 0.0)));
        assert!(!p.contains_vertex(&Vertex::new(0.0, -0.6)));
        assert!(!p.contains_vertex(&Vertex::new(3.0, 3.0)));
        // On an edge counts as inside.
        assert!(p.contains_vertex(&Vertex::new(0.5, 0.1)));
        assert!(p.contains_vertex(&Vertex::new(-0.5, -0.5)));
        assert!(!p.interior_contains_vertex(&Vertex::new(0.5, 0.1)));
        assert!(p.interior_contains_vertex(&Vertex::new(0.1, 0.1)));
    }

    #[test]
    fn containment_of_concave_polygon() {
        // U shape opening upwards.
        let p = Polygon::by_vertices(
            vec![
                Vertex::new(0.0, 0.0),
                Vertex::new(3.0, 0.0),
                Vertex::new(3.0, 3.0),
                Vertex::new(2.0, 3.0),
                Vertex::new(2.0, 1.0),
                Vertex::new(1.0, 1.0),
                Vertex::new(1.0, 3.0),
                Vertex::new(0.0, 3.0),
            ],
            false,
        )
        .unwrap();
        assert!(p.contains_vertex(&Vertex::new(0.5, 2.0)));
        assert!(p.contains_vertex(&Vertex::new(2.5, 2.0)));
        assert!(!p.contains_vertex(&Vertex::new(1.5, 2.0)));
    }

    #[test]
    fn clockwise_loops_contain_too() {
        let vertices: Vec<Vertex> = unit_square().vertices().iter().rev().copied().collect();
        let p = Polygon::by_vertices(vertices, false).unwrap();
        assert!(p.is_clockwise());
        assert!(p.contains_vertex(&Vertex::new(0.1, -0.2)));
    }

    #[test]
    fn planarity() {
        assert!(unit_square().is_planar());
        let skew = Polygon::by_vertices(
            vec![
                Vertex::by_coordinates(0.0, 0.0, 0.0),
                Vertex::by_coordinates(1.0, 0.0, 0.0),
                Vertex::by_coordinates(1.0, 1.0, 1.0),
                Vertex::by_coordinates(0.0, 1.0, 0.0),
            ],
            false,
        )
        .unwrap();
        assert!(!skew.is_planar());

        let lifted = Polygon::by_vertices(
            unit_square().vertices().iter().map(|v| v.translate(0.0, 0.0, 2.0)).collect(),
            false,
        )
        .unwrap();
        assert!(lifted.is_planar());
        assert!(!unit_square().coplanar(&lifted));
    }

    #[test]
    fn add_vertex_is_non_destructive() {
        let p = unit_square();
        let edge = p.edges()[0];
        let split = p.add_vertex(Vertex::new(0.0, -0.5), &edge).unwrap();

        assert_eq!(p.vertices().len(), 4);
        assert_eq!(split.vertices().len(), 5);
        assert_eq!(split.vertices()[1], Vertex::new(0.0, -0.5));
        assert_eq!(split.edges().len(), 5);
        assert_relative_eq!(split.area(), p.area(), epsilon = 1e-12);
    }

    #[test]
    fn add_vertex_on_reversed_edge_uses_polygon_order() {
        let p = unit_square();
        let edge = p.edges()[1].reversed();
        let split = p.add_vertex(Vertex::new(0.5, 0.0), &edge).unwrap();
        assert_eq!(split.vertices()[2], Vertex::new(0.5, 0.0));
    }

    #[test]
    fn add_vertex_rejects_foreign_edge() {
        let p = unit_square();
        let edge = Edge::by_start_vertex_end_vertex(Vertex::new(5.0, 5.0), Vertex::new(6.0, 6.0));
        assert!(p.add_vertex(Vertex::new(5.5, 5.5), &edge).is_err());
    }

    #[test]
    fn area_and_centroid() {
        let p = unit_square();
        assert_relative_eq!(p.area(), 1.0, epsilon = 1e-12);
        let c = p.centroid().unwrap();
        assert_relative_eq!(c.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(c.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bounding_box_is_cached() {
        let p = unit_square();
        let first = p.bounding_box();
        assert_eq!(first, p.bounding_box());
        assert_eq!(first.min_vertex(), Vertex::new(-0.5, -0.5));
    }
}
