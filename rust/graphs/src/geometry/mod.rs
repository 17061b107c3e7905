// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance-aware planar geometry kernel.
//!
//! Vertices, edges, bounding boxes and polygons are plain value types. Vertex
//! equality and ordering use a fixed per-axis [`TOLERANCE`] instead of bitwise
//! comparison, so two vertices computed along different arithmetic paths still
//! compare equal when they describe the same point.
//!
//! Intersections and containment are evaluated in the XY projection. Callers
//! that run booleans or visibility queries are expected to pass planar input
//! (see [`Polygon::is_planar`]).

mod bbox;
mod edge;
mod polygon;
mod vertex;

pub use bbox::{BoundingBox, HasBoundingBox};
pub use edge::{Edge, Intersection};
pub use polygon::Polygon;
pub use vertex::{Orientation, Vertex};

/// Per-axis distance under which two coordinates are considered equal.
pub const TOLERANCE: f64 = 1e-6;

/// Angular difference (radians) under which two directions are considered equal.
pub const ANGLE_TOLERANCE: f64 = 1e-9;

/// Compares two scalars with [`TOLERANCE`].
#[inline]
pub(crate) fn cmp_tol(a: f64, b: f64) -> std::cmp::Ordering {
    if (a - b).abs() <= TOLERANCE {
        std::cmp::Ordering::Equal
    } else if a < b {
        std::cmp::Ordering::Less
    } else {
        std::cmp::Ordering::Greater
    }
}
