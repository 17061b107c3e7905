// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns the labelled events of a finished boolean sweep into polygons.

use super::event::EventArena;
use super::BooleanType;
use crate::geometry::{Edge, Polygon};
use crate::graph::Graph;
use crate::keys::SweepEventKey;

/// Collects the result edges of a boolean sweep and closes them into loops.
pub struct EventChainer<'a> {
    events: &'a EventArena,
    processed: &'a [SweepEventKey],
}

impl<'a> EventChainer<'a> {
    pub(crate) fn new(events: &'a EventArena, processed: &'a [SweepEventKey]) -> Self {
        Self { events, processed }
    }

    /// Edges of processed left events that bound the result of `operation`,
    /// each directed so the result lies on its left.
    pub fn contributing_edges(&self, operation: BooleanType) -> Vec<Edge> {
        self.processed
            .iter()
            .filter_map(|&key| {
                let event = &self.events[key];
                if !event.is_left || !event.contributes(operation) {
                    return None;
                }
                let right = self.events[event.pair].vertex;
                Some(if event.result_is_above(operation) {
                    Edge::by_start_vertex_end_vertex(event.vertex, right)
                } else {
                    Edge::by_start_vertex_end_vertex(right, event.vertex)
                })
            })
            .collect()
    }

    /// Result polygons: outer boundaries counter-clockwise, holes clockwise.
    pub fn chain(&self, operation: BooleanType) -> Vec<Polygon> {
        let edges = self.contributing_edges(operation);
        tracing::trace!(%operation, edges = edges.len(), "chaining result edges");
        Graph::from_edges(edges).build_oriented_polygons()
    }
}
