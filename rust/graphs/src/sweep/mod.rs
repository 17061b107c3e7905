// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bentley–Ottmann sweep line for intersection queries and polygon booleans.
//!
//! Edge endpoints become [`SweepEvent`]s processed left to right. Events are
//! stored in a slot map arena owned by one [`SweepLine`]; each event refers to
//! the event at the other end of its edge by key. When two active edges
//! intersect they are split at the intersection point so that the active list
//! always holds non-crossing edges, which keeps its vertical order valid.
//!
//! For boolean operations every left event additionally carries in/out flags
//! propagated from the edge directly below it and a label for coincident
//! edges. [`EventChainer`] then keeps the edges that bound the requested
//! region and regroups them into polygons.

mod chainer;
mod event;
mod line;

pub use chainer::EventChainer;
pub use event::{EdgeLabel, PolygonType, SweepEvent};
pub use line::SweepLine;

/// Polygon boolean operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BooleanType {
    Union,
    Difference,
    Intersection,
}

impl BooleanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanType::Union => "Union",
            BooleanType::Difference => "Difference",
            BooleanType::Intersection => "Intersection",
        }
    }
}

impl std::fmt::Display for BooleanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
