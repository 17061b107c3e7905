// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The sweep itself: event queue, active list and edge splitting.

use std::cmp::Ordering;

use slotmap::SlotMap;

use super::chainer::EventChainer;
use super::event::{
    compare_events, compare_segments, EdgeLabel, EventArena, EventOrder, PolygonType, SweepEvent,
};
use super::BooleanType;
use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, Edge, HasBoundingBox, Intersection, Polygon, Vertex};
use crate::keys::SweepEventKey;
use crate::queue::MinPriorityQ;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepMode {
    Detect { first_only: bool },
    Boolean,
}

/// Outcome of testing two neighbouring edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    None,
    Point,
    /// Overlap starting at a shared left endpoint.
    SharedLeft,
    Overlap,
}

/// A single sweep over the edges of two polygon sets.
///
/// Each query consumes the sweep; build a new one per query.
#[derive(Debug)]
pub struct SweepLine {
    events: EventArena,
    queue: MinPriorityQ<SweepEventKey, EventOrder>,
    /// Left events of the edges currently cut by the sweep, bottom to top.
    active: Vec<SweepEventKey>,
    /// Events in the order they were taken from the queue.
    processed: Vec<SweepEventKey>,
    intersections: Vec<Intersection>,
    subjects: Vec<Polygon>,
    clips: Vec<Polygon>,
    sequence: usize,
}

impl SweepLine {
    /// Queues both endpoints of every edge of `subjects` and `clips`.
    pub fn by_polygons(subjects: &[Polygon], clips: &[Polygon]) -> Self {
        let mut sweep = Self {
            events: SlotMap::with_key(),
            queue: MinPriorityQ::new(),
            active: Vec::new(),
            processed: Vec::new(),
            intersections: Vec::new(),
            subjects: subjects.to_vec(),
            clips: clips.to_vec(),
            sequence: 0,
        };
        for polygon in subjects {
            for edge in polygon.edges() {
                sweep.add_edge(*edge, PolygonType::Subject);
            }
        }
        for polygon in clips {
            for edge in polygon.edges() {
                sweep.add_edge(*edge, PolygonType::Clip);
            }
        }
        tracing::trace!(events = sweep.events.len(), "sweep line queued");
        sweep
    }

    /// True if any two edges cross or overlap anywhere other than a shared
    /// endpoint. Stops at the first hit.
    pub fn has_intersection(mut self) -> bool {
        self.detect(true);
        !self.intersections.is_empty()
    }

    /// Every crossing point and overlap segment, without duplicates.
    pub fn get_intersections(mut self) -> Vec<Intersection> {
        self.detect(false);
        self.intersections
    }

    /// Runs the boolean `operation` with the subjects as first operand.
    pub fn compute_boolean_operation(mut self, operation: BooleanType) -> Result<Vec<Polygon>> {
        if let Some(result) = self.trivial_result(operation) {
            tracing::debug!(%operation, polygons = result.len(), "boolean resolved without sweep");
            return Ok(result);
        }
        self.run(SweepMode::Boolean)?;
        let polygons = EventChainer::new(&self.events, &self.processed).chain(operation);
        tracing::debug!(
            %operation,
            events = self.processed.len(),
            polygons = polygons.len(),
            "boolean sweep complete"
        );
        Ok(polygons)
    }

    fn detect(&mut self, first_only: bool) {
        // Overlaps are recorded but never split when only detecting, so the
        // run cannot meet an unclassified configuration.
        if let Err(err) = self.run(SweepMode::Detect { first_only }) {
            tracing::warn!(error = %err, "intersection sweep stopped early");
        }
        tracing::debug!(
            events = self.processed.len(),
            intersections = self.intersections.len(),
            first_only,
            "intersection sweep complete"
        );
    }

    /// Empty operands and operands with disjoint extents need no sweep.
    fn trivial_result(&self, operation: BooleanType) -> Option<Vec<Polygon>> {
        let subjects: Vec<Polygon> = self.subjects.iter().filter(|p| !p.is_empty()).cloned().collect();
        let clips: Vec<Polygon> = self.clips.iter().filter(|p| !p.is_empty()).cloned().collect();

        let disjoint = subjects.is_empty()
            || clips.is_empty()
            || !extent(&subjects).intersects(&extent(&clips));
        if !disjoint {
            return None;
        }
        Some(match operation {
            BooleanType::Intersection => Vec::new(),
            BooleanType::Difference => subjects,
            BooleanType::Union => subjects.into_iter().chain(clips).collect(),
        })
    }

    fn next_sequence(&mut self) -> usize {
        let sequence = self.sequence;
        self.sequence += 1;
        sequence
    }

    fn add_edge(&mut self, edge: Edge, polygon_type: PolygonType) {
        let (left, right) = match edge.start.cmp_tolerance(&edge.end) {
            Ordering::Less => (edge.start, edge.end),
            Ordering::Greater => (edge.end, edge.start),
            Ordering::Equal => return,
        };
        let edge = Edge::by_start_vertex_end_vertex(left, right);
        let l = self.insert_event(left, edge, true, polygon_type);
        let r = self.insert_event(right, edge, false, polygon_type);
        self.events[l].pair = r;
        self.events[r].pair = l;
        self.enqueue(l);
        self.enqueue(r);
    }

    fn insert_event(
        &mut self,
        vertex: Vertex,
        edge: Edge,
        is_left: bool,
        polygon_type: PolygonType,
    ) -> SweepEventKey {
        let sequence = self.next_sequence();
        self.events
            .insert(SweepEvent::new(vertex, edge, is_left, polygon_type, sequence))
    }

    fn enqueue(&mut self, key: SweepEventKey) {
        let order = EventOrder::of(&self.events, key);
        self.queue.add(key, order);
    }

    /// Re-sorts a queued event after its pair changed.
    fn reposition(&mut self, key: SweepEventKey) {
        if self.queue.contains(&key) {
            let order = EventOrder::of(&self.events, key);
            self.queue.update_item(&key, order);
        }
    }

    /// The edge of an event from its current endpoints.
    fn segment(&self, key: SweepEventKey) -> Edge {
        let event = &self.events[key];
        Edge::by_start_vertex_end_vertex(event.vertex, self.events[event.pair].vertex)
    }

    fn record(&mut self, intersection: Intersection) {
        if !self.intersections.contains(&intersection) {
            self.intersections.push(intersection);
        }
    }

    fn run(&mut self, mode: SweepMode) -> Result<()> {
        let stop_on_hit = mode == SweepMode::Detect { first_only: true };
        let boolean = mode == SweepMode::Boolean;

        while let Some(key) = self.queue.take() {
            self.processed.push(key);

            if self.events[key].is_left {
                let pos = self
                    .active
                    .partition_point(|&k| compare_segments(&self.events, k, key) == Ordering::Less);
                self.active.insert(pos, key);
                let prev = pos.checked_sub(1).map(|i| self.active[i]);
                let next = self.active.get(pos + 1).copied();

                if boolean {
                    self.compute_fields(key, prev);
                }

                if let Some(next) = next {
                    let crossing = self.possible_intersection(key, next, mode)?;
                    if stop_on_hit && crossing != Crossing::None {
                        return Ok(());
                    }
                    if boolean && crossing == Crossing::SharedLeft {
                        self.compute_fields(key, prev);
                        self.compute_fields(next, Some(key));
                    }
                }
                if let Some(prev) = prev {
                    let crossing = self.possible_intersection(prev, key, mode)?;
                    if stop_on_hit && crossing != Crossing::None {
                        return Ok(());
                    }
                    if boolean && crossing == Crossing::SharedLeft {
                        let prev_prev = pos.checked_sub(2).map(|i| self.active[i]);
                        self.compute_fields(prev, prev_prev);
                        self.compute_fields(key, Some(prev));
                    }
                }
            } else {
                let left = self.events[key].pair;
                let Some(pos) = self.active.iter().position(|&k| k == left) else {
                    continue;
                };
                let prev = pos.checked_sub(1).map(|i| self.active[i]);
                let next = self.active.get(pos + 1).copied();
                self.active.remove(pos);

                if let (Some(prev), Some(next)) = (prev, next) {
                    let crossing = self.possible_intersection(prev, next, mode)?;
                    if stop_on_hit && crossing != Crossing::None {
                        return Ok(());
                    }
                }
            }
        }
        Ok(())
    }

    /// Propagates the in/out flags of the edge below onto `key`.
    fn compute_fields(&mut self, key: SweepEventKey, below: Option<SweepEventKey>) {
        let (in_out, is_inside) = match below {
            None => (false, false),
            Some(below) => {
                let prev = &self.events[below];
                let prev_in_out = prev.in_out.unwrap_or(false);
                let prev_inside = prev.is_inside.unwrap_or(false);
                if prev.polygon_type == self.events[key].polygon_type {
                    (!prev_in_out, prev_inside)
                } else {
                    let other_in_out = if prev.is_vertical() {
                        !prev_in_out
                    } else {
                        prev_in_out
                    };
                    (prev_inside, !other_in_out)
                }
            }
        };
        let event = &mut self.events[key];
        event.in_out = Some(in_out);
        event.is_inside = Some(is_inside);
    }

    /// Tests two vertically adjacent edges and splits them where they meet.
    fn possible_intersection(
        &mut self,
        le1: SweepEventKey,
        le2: SweepEventKey,
        mode: SweepMode,
    ) -> Result<Crossing> {
        let e1 = self.segment(le1);
        let e2 = self.segment(le2);

        match e1.intersection(&e2) {
            Intersection::None => Ok(Crossing::None),
            Intersection::Point(p) => {
                let on_end_1 = e1.contains_vertex(&p);
                let on_end_2 = e2.contains_vertex(&p);
                if on_end_1 && on_end_2 {
                    return Ok(Crossing::None);
                }
                if mode != SweepMode::Boolean {
                    self.record(Intersection::Point(p));
                }
                if !on_end_1 {
                    self.divide_segment(le1, p);
                }
                if !on_end_2 {
                    self.divide_segment(le2, p);
                }
                Ok(Crossing::Point)
            }
            Intersection::Segment(overlap) => {
                if mode != SweepMode::Boolean {
                    self.record(Intersection::Segment(overlap));
                    return Ok(Crossing::Overlap);
                }
                if self.events[le1].polygon_type == self.events[le2].polygon_type {
                    tracing::warn!(
                        first = %e1,
                        second = %e2,
                        "overlapping edges within one operand are ignored"
                    );
                    return Ok(Crossing::None);
                }
                self.split_overlap(le1, le2)
            }
        }
    }

    /// Splits two overlapping edges of different operands so the overlap
    /// becomes a pair of identical edges, and labels that pair.
    fn split_overlap(&mut self, le1: SweepEventKey, le2: SweepEventKey) -> Result<Crossing> {
        let re1 = self.events[le1].pair;
        let re2 = self.events[le2].pair;
        let left_coincide = self.events[le1].vertex == self.events[le2].vertex;
        let right_coincide = self.events[re1].vertex == self.events[re2].vertex;
        let (first_left, second_left) = self.ordered(le1, le2);
        let (first_right, second_right) = self.ordered(re1, re2);

        if left_coincide {
            let same_transition = self.events[le1].in_out == self.events[le2].in_out;
            self.events[le2].label = EdgeLabel::NoContributing;
            self.events[le1].label = if same_transition {
                EdgeLabel::SameTransition
            } else {
                EdgeLabel::DifferentTransition
            };
            if !right_coincide {
                // Cut the longer edge where the shorter one ends.
                let longer = self.events[second_right].pair;
                let at = self.events[first_right].vertex;
                self.divide_segment(longer, at);
            }
            return Ok(Crossing::SharedLeft);
        }

        if right_coincide {
            let at = self.events[second_left].vertex;
            self.divide_segment(first_left, at);
            return Ok(Crossing::Overlap);
        }

        if compare_events(&self.events, second_left, first_right) != Ordering::Less {
            return Err(self.unhandled(le1, le2));
        }

        if self.events[first_left].pair == first_right {
            // Staggered: each edge sticks out on one side.
            let at = self.events[second_left].vertex;
            self.divide_segment(first_left, at);
            let at = self.events[first_right].vertex;
            self.divide_segment(second_left, at);
            return Ok(Crossing::Overlap);
        }

        if self.events[first_left].pair == second_right {
            // Containment: the first edge covers the second entirely.
            let at = self.events[second_left].vertex;
            self.divide_segment(first_left, at);
            let tail = self.events[second_right].pair;
            let at = self.events[first_right].vertex;
            self.divide_segment(tail, at);
            return Ok(Crossing::Overlap);
        }

        Err(self.unhandled(le1, le2))
    }

    fn unhandled(&self, le1: SweepEventKey, le2: SweepEventKey) -> Error {
        let first = self.segment(le1);
        let second = self.segment(le2);
        tracing::error!(%first, %second, "unclassified overlap");
        Error::UnhandledIntersection { first, second }
    }

    fn ordered(&self, a: SweepEventKey, b: SweepEventKey) -> (SweepEventKey, SweepEventKey) {
        if compare_events(&self.events, a, b) == Ordering::Greater {
            (b, a)
        } else {
            (a, b)
        }
    }

    /// Splits the edge of left event `le` at `p` into `le -> r` and `l -> re`.
    fn divide_segment(&mut self, le: SweepEventKey, p: Vertex) {
        let re = self.events[le].pair;
        let polygon_type = self.events[le].polygon_type;
        let left_vertex = self.events[le].vertex;
        let right_vertex = self.events[re].vertex;
        if p == left_vertex || p == right_vertex {
            return;
        }

        let head = Edge::by_start_vertex_end_vertex(left_vertex, p);
        let tail = Edge::by_start_vertex_end_vertex(p, right_vertex);
        let r = self.insert_event(p, head, false, polygon_type);
        let l = self.insert_event(p, tail, true, polygon_type);
        self.events[r].pair = le;
        self.events[l].pair = re;
        self.update_event_pair(le, r, head);
        self.update_event_pair(re, l, tail);

        if compare_events(&self.events, l, re) == Ordering::Greater {
            // Rounding moved the split point past the old right end.
            self.events[re].is_left = true;
            self.events[l].is_left = false;
        }

        self.reposition(re);
        self.reposition(le);
        self.enqueue(l);
        self.enqueue(r);
        tracing::trace!(edge = %head, at = %p, "edge divided");
    }

    fn update_event_pair(&mut self, key: SweepEventKey, pair: SweepEventKey, edge: Edge) {
        let event = &mut self.events[key];
        event.pair = pair;
        event.edge = edge;
    }
}

fn extent(polygons: &[Polygon]) -> BoundingBox {
    polygons
        .iter()
        .map(|p| p.bounding_box())
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(|| BoundingBox::from_vertices(std::iter::empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::by_vertices(
            vec![
                Vertex::new(x0, y0),
                Vertex::new(x1, y0),
                Vertex::new(x1, y1),
                Vertex::new(x0, y1),
            ],
            false,
        )
        .unwrap()
    }

    fn total_area(polygons: &[Polygon]) -> f64 {
        polygons.iter().map(|p| p.area()).sum()
    }

    fn boolean(a: &Polygon, b: &Polygon, op: BooleanType) -> Vec<Polygon> {
        SweepLine::by_polygons(std::slice::from_ref(a), std::slice::from_ref(b))
            .compute_boolean_operation(op)
            .unwrap()
    }

    #[test]
    fn crossing_squares_intersect() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.0, 1.0, 3.0, 3.0);
        assert!(SweepLine::by_polygons(&[a.clone()], &[b.clone()]).has_intersection());

        let points = SweepLine::by_polygons(&[a], &[b]).get_intersections();
        assert_eq!(points.len(), 2);
        assert!(points.contains(&Intersection::Point(Vertex::new(2.0, 1.0))));
        assert!(points.contains(&Intersection::Point(Vertex::new(1.0, 2.0))));
    }

    #[test]
    fn separate_squares_do_not_intersect() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(2.0, 0.0, 3.0, 1.0);
        assert!(!SweepLine::by_polygons(&[a], &[b]).has_intersection());
    }

    #[test]
    fn corner_touch_is_not_an_intersection() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 1.0, 2.0, 2.0);
        assert!(!SweepLine::by_polygons(&[a], &[b]).has_intersection());
    }

    #[test]
    fn shared_edge_is_reported_as_overlap() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);
        let found = SweepLine::by_polygons(&[a], &[b]).get_intersections();
        let shared = Edge::by_start_vertex_end_vertex(Vertex::new(1.0, 0.0), Vertex::new(1.0, 1.0));
        assert_eq!(found, vec![Intersection::Segment(shared)]);
    }

    #[test]
    fn overlapping_squares_booleans() {
        let a = rect(0.0, 0.0, 2.0, 2.0);
        let b = rect(1.0, 1.0, 3.0, 3.0);

        let union = boolean(&a, &b, BooleanType::Union);
        assert_eq!(union.len(), 1);
        assert_relative_eq!(total_area(&union), 7.0, epsilon = 1e-9);

        let intersection = boolean(&a, &b, BooleanType::Intersection);
        assert_eq!(intersection.len(), 1);
        assert_relative_eq!(total_area(&intersection), 1.0, epsilon = 1e-9);
        assert!(intersection[0].same_vertices(&rect(1.0, 1.0, 2.0, 2.0)));

        let difference = boolean(&a, &b, BooleanType::Difference);
        assert_eq!(difference.len(), 1);
        assert_relative_eq!(total_area(&difference), 3.0, epsilon = 1e-9);
    }

    #[test]
    fn union_with_itself_is_itself() {
        let p = rect(0.0, 0.0, 1.0, 1.0);
        let union = boolean(&p, &p, BooleanType::Union);
        assert_eq!(union.len(), 1);
        assert!(union[0].same_vertices(&p));

        let intersection = boolean(&p, &p, BooleanType::Intersection);
        assert_eq!(intersection.len(), 1);
        assert!(intersection[0].same_vertices(&p));

        assert!(boolean(&p, &p, BooleanType::Difference).is_empty());
    }

    #[test]
    fn empty_operand_shortcuts() {
        let p = rect(0.0, 0.0, 1.0, 1.0);
        let empty = Polygon::default();

        assert!(boolean(&p, &empty, BooleanType::Intersection).is_empty());
        let difference = boolean(&p, &empty, BooleanType::Difference);
        assert_eq!(difference.len(), 1);
        assert!(difference[0].same_vertices(&p));
        let union = boolean(&empty, &p, BooleanType::Union);
        assert_eq!(union.len(), 1);
    }

    #[test]
    fn disjoint_operands_shortcut() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(5.0, 5.0, 6.0, 6.0);
        assert_eq!(boolean(&a, &b, BooleanType::Union).len(), 2);
        assert!(boolean(&a, &b, BooleanType::Intersection).is_empty());
        assert_eq!(boolean(&a, &b, BooleanType::Difference).len(), 1);
    }

    #[test]
    fn squares_sharing_an_edge_union_to_a_rectangle() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);
        let union = boolean(&a, &b, BooleanType::Union);
        assert_eq!(union.len(), 1);
        assert_relative_eq!(union[0].area(), 2.0, epsilon = 1e-9);

        let intersection = boolean(&a, &b, BooleanType::Intersection);
        assert!(total_area(&intersection) < 1e-9);
    }

    #[test]
    fn contained_square_difference_and_intersection() {
        let outer = rect(0.0, 0.0, 4.0, 4.0);
        let inner = rect(1.0, 1.0, 2.0, 2.0);

        let intersection = boolean(&outer, &inner, BooleanType::Intersection);
        assert_eq!(intersection.len(), 1);
        assert!(intersection[0].same_vertices(&inner));

        let union = boolean(&outer, &inner, BooleanType::Union);
        assert_eq!(union.len(), 1);
        assert!(union[0].same_vertices(&outer));

        let difference = boolean(&outer, &inner, BooleanType::Difference);
        assert_eq!(difference.len(), 2);
        let (holes, shells): (Vec<Polygon>, Vec<Polygon>) =
            difference.into_iter().partition(Polygon::is_clockwise);
        assert_eq!(shells.len(), 1);
        assert_eq!(holes.len(), 1);
        assert_relative_eq!(shells[0].signed_area(), 16.0, epsilon = 1e-9);
        assert_relative_eq!(holes[0].signed_area(), -1.0, epsilon = 1e-9);
        assert!(holes[0].same_vertices(&inner));
    }

    #[test]
    fn partially_overlapping_edges_are_split() {
        // b's bottom edge lies on a's bottom edge, staggered.
        let a = rect(0.0, 0.0, 2.0, 1.0);
        let b = rect(1.0, 0.0, 3.0, 1.0);
        let union = boolean(&a, &b, BooleanType::Union);
        assert_eq!(union.len(), 1);
        assert_relative_eq!(union[0].area(), 3.0, epsilon = 1e-9);

        let intersection = boolean(&a, &b, BooleanType::Intersection);
        assert_eq!(intersection.len(), 1);
        assert_relative_eq!(intersection[0].area(), 1.0, epsilon = 1e-9);
    }
}
