// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Graphical Graphs
//!
//! Planar geometry and graph engine for floor-plan style spatial reasoning.
//!
//! The crate is layered bottom-up:
//!
//! - [`geometry`]: tolerance-aware vertices, edges, bounding boxes and polygons.
//! - [`queue`]: an indexed min-priority queue with decrease-key.
//! - [`sweep`]: a Bentley-Ottmann sweep line that reports segment
//!   intersections and computes boolean union, difference and intersection
//!   of polygon sets.
//! - [`graph`]: an undirected graph of vertices and edges, built from
//!   boundary and obstacle polygons.
//! - [`visibility`]: a visibility graph built with a radial sweep per vertex,
//!   isovists and point-to-point shortest paths.
//! - [`algorithms`]: Dijkstra over a graph plus optional temporary edges.
//!
//! ## Example
//!
//! ```
//! use graphical_graphs::{Graph, Polygon, Vertex, VisibilityGraph};
//!
//! let square = |x0: f64, y0: f64, x1: f64, y1: f64, boundary: bool| {
//!     Polygon::by_vertices(
//!         vec![
//!             Vertex::new(x0, y0),
//!             Vertex::new(x1, y0),
//!             Vertex::new(x1, y1),
//!             Vertex::new(x0, y1),
//!         ],
//!         boundary,
//!     )
//! };
//!
//! let room = square(0.0, 0.0, 10.0, 10.0, true)?;
//! let pillar = square(4.0, 4.0, 6.0, 6.0, false)?;
//! let base = Graph::by_boundary_and_internal_polygons(&[room], &[pillar])?;
//! let visibility = VisibilityGraph::by_base_graph(&base, false)?;
//!
//! let path = visibility.shortest_path(&Vertex::new(1.0, 5.0), &Vertex::new(9.0, 5.0))?;
//! assert!(path.total_length() > 8.0);
//! # Ok::<(), graphical_graphs::Error>(())
//! ```
//!
//! All operations are synchronous and deterministic. Vertex equality uses a
//! fixed [`TOLERANCE`]; there is no global state.

pub mod algorithms;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod keys;
pub mod queue;
pub mod spatial;
pub mod sweep;
pub mod visibility;

pub use algorithms::dijkstra;
pub use error::{Error, Result};
pub use geometry::{
    BoundingBox, Edge, HasBoundingBox, Intersection, Orientation, Polygon, Vertex, ANGLE_TOLERANCE,
    TOLERANCE,
};
pub use graph::Graph;
pub use queue::MinPriorityQ;
pub use sweep::{BooleanType, SweepLine};
pub use visibility::{EdgeKey, VisibilityGraph};
