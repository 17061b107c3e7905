// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry and graph operations.

use crate::geometry::{Edge, Vertex};

/// Result type alias for geometry and graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building geometry or running graph algorithms.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input geometry is unusable (too few vertices, open, non-planar...).
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The boolean sweep met two overlapping edges whose endpoints do not
    /// match any of the classified overlap configurations.
    #[error("unhandled intersection configuration between {first} and {second}")]
    UnhandledIntersection { first: Edge, second: Edge },

    /// The destination cannot be reached from the origin.
    #[error("no path from {origin} to {destination}")]
    Unreachable { origin: Vertex, destination: Vertex },

    /// A vertex required by the query is not part of the graph.
    #[error("vertex not found in graph: {0}")]
    VertexNotFound(Vertex),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidGeometry(msg.into())
    }
}
