// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sweep events and the two orderings the sweep depends on.

use std::cmp::Ordering;

use slotmap::SlotMap;

use super::BooleanType;
use crate::geometry::{Edge, Orientation, Vertex, TOLERANCE};
use crate::keys::SweepEventKey;

/// Which operand an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonType {
    Subject,
    Clip,
}

/// Classification of an edge after coincident-edge detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeLabel {
    Normal,
    /// Duplicate of a coincident edge that already speaks for both.
    NoContributing,
    /// Coincident edges whose operands lie on the same side.
    SameTransition,
    /// Coincident edges whose operands lie on opposite sides.
    DifferentTransition,
}

/// One endpoint of one edge during a sweep.
#[derive(Debug, Clone)]
pub struct SweepEvent {
    pub vertex: Vertex,
    /// The edge, oriented from its left endpoint to its right endpoint.
    pub edge: Edge,
    /// Event at the other end of the edge.
    pub pair: SweepEventKey,
    /// True if this event is reached before its pair.
    pub is_left: bool,
    pub polygon_type: PolygonType,
    /// True if the edge is an inside-to-outside transition of its own operand
    /// when crossing it upwards.
    pub in_out: Option<bool>,
    /// True if the edge lies inside the other operand.
    pub is_inside: Option<bool>,
    pub label: EdgeLabel,
    pub(crate) sequence: usize,
}

impl SweepEvent {
    pub(crate) fn new(
        vertex: Vertex,
        edge: Edge,
        is_left: bool,
        polygon_type: PolygonType,
        sequence: usize,
    ) -> Self {
        Self {
            vertex,
            edge,
            pair: SweepEventKey::default(),
            is_left,
            polygon_type,
            in_out: None,
            is_inside: None,
            label: EdgeLabel::Normal,
            sequence,
        }
    }

    pub fn is_vertical(&self) -> bool {
        (self.edge.start.x - self.edge.end.x).abs() <= TOLERANCE
    }

    /// Whether the edge bounds the result of `operation`.
    pub fn contributes(&self, operation: BooleanType) -> bool {
        match self.label {
            EdgeLabel::Normal => {
                let inside = self.is_inside.unwrap_or(false);
                match operation {
                    BooleanType::Intersection => inside,
                    BooleanType::Union => !inside,
                    BooleanType::Difference => match self.polygon_type {
                        PolygonType::Subject => !inside,
                        PolygonType::Clip => inside,
                    },
                }
            }
            EdgeLabel::SameTransition => operation != BooleanType::Difference,
            EdgeLabel::DifferentTransition => operation == BooleanType::Difference,
            EdgeLabel::NoContributing => false,
        }
    }

    /// Whether the result of `operation` lies above a contributing edge
    /// (on its -x side when the edge is vertical).
    ///
    /// The result sits on the own operand's interior side, except for clip
    /// edges of a difference, where it sits on the other side.
    pub(crate) fn result_is_above(&self, operation: BooleanType) -> bool {
        let interior_above = !self.in_out.unwrap_or(false);
        let flipped =
            operation == BooleanType::Difference && self.polygon_type == PolygonType::Clip;
        interior_above != flipped
    }
}

pub(crate) type EventArena = SlotMap<SweepEventKey, SweepEvent>;

/// The fields that decide an event's position in the event queue.
///
/// The queue stores this snapshot as the priority; whenever an event's pair
/// is rewritten the snapshot is rebuilt and the event repositioned.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EventOrder {
    vertex: Vertex,
    pair_vertex: Vertex,
    is_left: bool,
    polygon_type: PolygonType,
    sequence: usize,
}

impl EventOrder {
    pub(crate) fn of(arena: &EventArena, key: SweepEventKey) -> Self {
        let event = &arena[key];
        Self {
            vertex: event.vertex,
            pair_vertex: arena[event.pair].vertex,
            is_left: event.is_left,
            polygon_type: event.polygon_type,
            sequence: event.sequence,
        }
    }

    /// The edge as (left endpoint, right endpoint).
    fn segment(&self) -> (Vertex, Vertex) {
        if self.is_left {
            (self.vertex, self.pair_vertex)
        } else {
            (self.pair_vertex, self.vertex)
        }
    }

    /// x, then y, then z; right events before left events at the same point;
    /// then the edge lying below the other first; then by pair, operand and
    /// creation order.
    fn compare(&self, other: &Self) -> Ordering {
        let by_vertex = self.vertex.cmp_tolerance(&other.vertex);
        if by_vertex != Ordering::Equal {
            return by_vertex;
        }
        if self.is_left != other.is_left {
            return if self.is_left {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let (left, right) = self.segment();
        match Vertex::orientation(&left, &right, &other.pair_vertex) {
            Orientation::CounterClockwise => return Ordering::Less,
            Orientation::Clockwise => return Ordering::Greater,
            Orientation::Collinear => {}
        }

        // Collinear edges sharing this point: the shorter one first.
        let by_pair = if self.is_left {
            self.pair_vertex.cmp_tolerance(&other.pair_vertex)
        } else {
            other.pair_vertex.cmp_tolerance(&self.pair_vertex)
        };
        by_pair
            .then_with(|| type_rank(self.polygon_type).cmp(&type_rank(other.polygon_type)))
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

fn type_rank(polygon_type: PolygonType) -> u8 {
    match polygon_type {
        PolygonType::Subject => 0,
        PolygonType::Clip => 1,
    }
}

impl PartialEq for EventOrder {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl PartialOrd for EventOrder {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

/// Event-queue order of two events.
pub(crate) fn compare_events(arena: &EventArena, a: SweepEventKey, b: SweepEventKey) -> Ordering {
    EventOrder::of(arena, a).compare(&EventOrder::of(arena, b))
}

/// Vertical order of two left events in the active list.
pub(crate) fn compare_segments(
    arena: &EventArena,
    le1: SweepEventKey,
    le2: SweepEventKey,
) -> Ordering {
    if le1 == le2 {
        return Ordering::Equal;
    }
    let e1 = &arena[le1];
    let e2 = &arena[le2];
    let (p1, q1) = (e1.vertex, arena[e1.pair].vertex);
    let (p2, q2) = (e2.vertex, arena[e2.pair].vertex);

    let side_p2 = Vertex::orientation(&p1, &q1, &p2);
    let side_q2 = Vertex::orientation(&p1, &q1, &q2);

    if side_p2 != Orientation::Collinear || side_q2 != Orientation::Collinear {
        if p1 == p2 {
            return if side_q2 == Orientation::CounterClockwise {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if (p1.x - p2.x).abs() <= TOLERANCE {
            return if p1.y < p2.y {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        if compare_events(arena, le1, le2) == Ordering::Greater {
            // le1 entered the active list after le2: locate p1 against le2.
            return if Vertex::orientation(&p2, &q2, &p1) != Orientation::CounterClockwise {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }
        return if side_p2 == Orientation::CounterClockwise {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    if e1.polygon_type != e2.polygon_type {
        return if e1.polygon_type == PolygonType::Subject {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }
    compare_events(arena, le1, le2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_pair(arena: &mut EventArena, a: Vertex, b: Vertex, polygon_type: PolygonType) -> SweepEventKey {
        let seq = arena.len();
        let edge = Edge::by_start_vertex_end_vertex(a, b);
        let l = arena.insert(SweepEvent::new(a, edge, true, polygon_type, seq));
        let r = arena.insert(SweepEvent::new(b, edge, false, polygon_type, seq + 1));
        arena[l].pair = r;
        arena[r].pair = l;
        l
    }

    #[test]
    fn events_order_by_x_then_y() {
        let mut arena = EventArena::with_key();
        let a = add_pair(&mut arena, Vertex::new(0.0, 5.0), Vertex::new(3.0, 5.0), PolygonType::Subject);
        let b = add_pair(&mut arena, Vertex::new(1.0, 0.0), Vertex::new(3.0, 0.0), PolygonType::Subject);
        let c = add_pair(&mut arena, Vertex::new(1.0, 2.0), Vertex::new(3.0, 2.0), PolygonType::Subject);
        assert_eq!(compare_events(&arena, a, b), Ordering::Less);
        assert_eq!(compare_events(&arena, b, c), Ordering::Less);
    }

    #[test]
    fn right_events_precede_left_events_at_same_point() {
        let mut arena = EventArena::with_key();
        let ending = add_pair(&mut arena, Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0), PolygonType::Subject);
        let starting = add_pair(&mut arena, Vertex::new(1.0, 1.0), Vertex::new(2.0, 0.0), PolygonType::Subject);
        let right = arena[ending].pair;
        assert_eq!(compare_events(&arena, right, starting), Ordering::Less);
    }

    #[test]
    fn lower_edge_first_at_shared_left_point() {
        let mut arena = EventArena::with_key();
        let upper = add_pair(&mut arena, Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0), PolygonType::Subject);
        let lower = add_pair(&mut arena, Vertex::new(0.0, 0.0), Vertex::new(1.0, -1.0), PolygonType::Subject);
        assert_eq!(compare_events(&arena, lower, upper), Ordering::Less);
        assert_eq!(compare_events(&arena, upper, lower), Ordering::Greater);
    }

    #[test]
    fn shorter_collinear_edge_first() {
        let mut arena = EventArena::with_key();
        let long = add_pair(&mut arena, Vertex::new(0.0, 0.0), Vertex::new(4.0, 0.0), PolygonType::Subject);
        let short = add_pair(&mut arena, Vertex::new(0.0, 0.0), Vertex::new(2.0, 0.0), PolygonType::Clip);
        assert_eq!(compare_events(&arena, short, long), Ordering::Less);
    }

    #[test]
    fn segments_order_vertically() {
        let mut arena = EventArena::with_key();
        let low = add_pair(&mut arena, Vertex::new(0.0, 0.0), Vertex::new(4.0, 0.0), PolygonType::Subject);
        let high = add_pair(&mut arena, Vertex::new(1.0, 2.0), Vertex::new(4.0, 3.0), PolygonType::Clip);
        assert_eq!(compare_segments(&arena, low, high), Ordering::Less);
        assert_eq!(compare_segments(&arena, high, low), Ordering::Greater);
    }

    #[test]
    fn collinear_segments_put_subject_first() {
        let mut arena = EventArena::with_key();
        let clip = add_pair(&mut arena, Vertex::new(0.0, 0.0), Vertex::new(2.0, 0.0), PolygonType::Clip);
        let subject = add_pair(&mut arena, Vertex::new(0.0, 0.0), Vertex::new(2.0, 0.0), PolygonType::Subject);
        assert_eq!(compare_segments(&arena, subject, clip), Ordering::Less);
    }

    #[test]
    fn contribution_rules() {
        let edge = Edge::by_start_vertex_end_vertex(Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0));
        let mut event = SweepEvent::new(edge.start, edge, true, PolygonType::Clip, 0);
        event.is_inside = Some(true);
        assert!(event.contributes(BooleanType::Intersection));
        assert!(event.contributes(BooleanType::Difference));
        assert!(!event.contributes(BooleanType::Union));

        event.label = EdgeLabel::SameTransition;
        assert!(event.contributes(BooleanType::Union));
        assert!(!event.contributes(BooleanType::Difference));

        event.label = EdgeLabel::NoContributing;
        assert!(!event.contributes(BooleanType::Intersection));
    }

    #[test]
    fn result_side_follows_operand_interior() {
        let edge = Edge::by_start_vertex_end_vertex(Vertex::new(0.0, 0.0), Vertex::new(1.0, 0.0));
        let mut subject = SweepEvent::new(edge.start, edge, true, PolygonType::Subject, 0);
        subject.in_out = Some(false);
        assert!(subject.result_is_above(BooleanType::Union));
        assert!(subject.result_is_above(BooleanType::Difference));

        // A clip edge with its interior above bounds a hole below it.
        let mut clip = SweepEvent::new(edge.start, edge, true, PolygonType::Clip, 1);
        clip.in_out = Some(false);
        assert!(clip.result_is_above(BooleanType::Intersection));
        assert!(!clip.result_is_above(BooleanType::Difference));

        clip.in_out = Some(true);
        assert!(clip.result_is_above(BooleanType::Difference));
    }
}
