// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes used as a cheap pre-filter.

use super::{Vertex, TOLERANCE};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

/// Geometry that can report its axis-aligned extent.
pub trait HasBoundingBox {
    fn bounding_box(&self) -> BoundingBox;
}

impl BoundingBox {
    /// Smallest box containing every vertex. An empty input yields an
    /// inverted box that intersects nothing.
    pub fn from_vertices<'a>(vertices: impl IntoIterator<Item = &'a Vertex>) -> Self {
        let mut min = [f64::INFINITY; 3];
        let mut max = [f64::NEG_INFINITY; 3];
        for v in vertices {
            for (axis, value) in [v.x, v.y, v.z].into_iter().enumerate() {
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }
        Self { min, max }
    }

    /// Returns true if the box contains no point.
    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    /// Tolerance-inclusive overlap test; touching boxes intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        (0..3).all(|axis| {
            self.min[axis] <= other.max[axis] + TOLERANCE
                && other.min[axis] <= self.max[axis] + TOLERANCE
        })
    }

    /// Tolerance-inclusive point test.
    pub fn contains_vertex(&self, v: &Vertex) -> bool {
        [v.x, v.y, v.z].into_iter().enumerate().all(|(axis, value)| {
            value >= self.min[axis] - TOLERANCE && value <= self.max[axis] + TOLERANCE
        })
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        for axis in 0..3 {
            out.min[axis] = out.min[axis].min(other.min[axis]);
            out.max[axis] = out.max[axis].max(other.max[axis]);
        }
        out
    }

    /// Corner with the smallest coordinates.
    pub fn min_vertex(&self) -> Vertex {
        Vertex::by_coordinates(self.min[0], self.min[1], self.min[2])
    }

    /// Corner with the largest coordinates.
    pub fn max_vertex(&self) -> Vertex {
        Vertex::by_coordinates(self.max[0], self.max[1], self.max[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min: f64, max: f64) -> BoundingBox {
        BoundingBox::from_vertices(&[Vertex::new(min, min), Vertex::new(max, max)])
    }

    #[test]
    fn overlapping_boxes_intersect() {
        assert!(square(0.0, 2.0).intersects(&square(1.0, 3.0)));
        assert!(square(0.0, 1.0).intersects(&square(1.0, 2.0)));
        assert!(!square(0.0, 1.0).intersects(&square(1.5, 2.0)));
    }

    #[test]
    fn empty_box_intersects_nothing() {
        let empty = BoundingBox::from_vertices(&[]);
        assert!(empty.is_empty());
        assert!(!empty.intersects(&square(0.0, 1.0)));
    }

    #[test]
    fn union_and_corners() {
        let b = square(0.0, 1.0).union(&square(2.0, 3.0));
        assert_eq!(b.min_vertex(), Vertex::new(0.0, 0.0));
        assert_eq!(b.max_vertex(), Vertex::new(3.0, 3.0));
        assert!(b.contains_vertex(&Vertex::new(1.5, 1.5)));
    }
}
