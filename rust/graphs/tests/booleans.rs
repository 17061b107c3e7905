// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use graphical_graphs::{BooleanType, Polygon, SweepLine, Vertex};

fn square(x0: f64, y0: f64, size: f64) -> Polygon {
    Polygon::by_vertices(
        vec![
            Vertex::new(x0, y0),
            Vertex::new(x0 + size, y0),
            Vertex::new(x0 + size, y0 + size),
            Vertex::new(x0, y0 + size),
        ],
        false,
    )
    .unwrap()
}

fn total_area(polygons: &[Polygon]) -> f64 {
    polygons.iter().map(Polygon::area).sum()
}

fn net_area(polygons: &[Polygon]) -> f64 {
    polygons.iter().map(Polygon::signed_area).sum()
}

#[test]
fn overlapping_squares() {
    let a = square(0.0, 0.0, 2.0);
    let b = square(1.0, 1.0, 2.0);

    assert_relative_eq!(total_area(&a.union(&b).unwrap()), 7.0, epsilon = 1e-9);
    assert_relative_eq!(total_area(&a.intersection(&b).unwrap()), 1.0, epsilon = 1e-9);
    assert_relative_eq!(total_area(&a.difference(&b).unwrap()), 3.0, epsilon = 1e-9);
}

#[test]
fn intersection_of_overlapping_squares_is_the_shared_square() {
    let a = square(0.0, 0.0, 2.0);
    let b = square(1.0, 1.0, 2.0);
    let result = a.intersection(&b).unwrap();
    assert_eq!(result.len(), 1);
    assert!(result[0].same_vertices(&square(1.0, 1.0, 1.0)));
}

#[test]
fn union_list_merges_a_row_of_tiles() {
    let tiles: Vec<Polygon> = (0..3).map(|i| square(i as f64, 0.0, 1.0)).collect();
    let merged = Polygon::union_list(&tiles).unwrap();
    assert_eq!(merged.len(), 1);
    assert_relative_eq!(merged[0].area(), 3.0, epsilon = 1e-9);
}

#[test]
fn difference_list_subtracts_every_clip() {
    let room = square(0.0, 0.0, 4.0);
    let clips = [square(-1.0, -1.0, 2.0), square(3.0, 3.0, 2.0)];
    let rest = Polygon::difference_list(&[room], &clips).unwrap();
    assert_relative_eq!(total_area(&rest), 14.0, epsilon = 1e-9);
}

#[test]
fn difference_with_disjoint_clip_keeps_subject() {
    let a = square(0.0, 0.0, 1.0);
    let far = square(10.0, 10.0, 1.0);
    let rest = a.difference(&far).unwrap();
    assert_eq!(rest.len(), 1);
    assert!(rest[0].same_vertices(&a));
}

#[test]
fn polygon_crossings() {
    let a = square(0.0, 0.0, 2.0);
    let b = square(1.0, 1.0, 2.0);
    let far = square(10.0, 0.0, 1.0);

    assert!(a.intersects(&b));
    assert!(!a.intersects(&far));
    assert_eq!(a.intersection_points(&b).len(), 2);
    assert!(a.intersection_points(&far).is_empty());
}

#[test]
fn results_without_holes_are_counter_clockwise() {
    let a = square(0.0, 0.0, 2.0);
    let b = square(1.0, 1.0, 2.0);
    for op in [BooleanType::Union, BooleanType::Intersection, BooleanType::Difference] {
        let result = SweepLine::by_polygons(&[a.clone()], &[b.clone()])
            .compute_boolean_operation(op)
            .unwrap();
        assert!(!result.is_empty(), "{op} produced nothing");
        for polygon in &result {
            assert!(polygon.signed_area() > 0.0, "{op} produced a clockwise loop");
        }
    }
}

#[test]
fn difference_of_contained_square_leaves_a_clockwise_hole() {
    let room = square(0.0, 0.0, 4.0);
    let pillar = square(1.0, 1.0, 1.0);
    let result = room.difference(&pillar).unwrap();
    assert_eq!(result.len(), 2);

    let shell = result.iter().find(|p| !p.is_clockwise()).unwrap();
    let hole = result.iter().find(|p| p.is_clockwise()).unwrap();
    assert_relative_eq!(shell.signed_area(), 16.0, epsilon = 1e-9);
    assert_relative_eq!(hole.signed_area(), -1.0, epsilon = 1e-9);
    assert_relative_eq!(net_area(&result), 15.0, epsilon = 1e-9);
}

#[test]
fn union_keeps_the_hole_of_a_ring() {
    let ring = [square(0.0, 0.0, 6.0), square(2.0, 2.0, 2.0)];
    let patch = square(0.5, 0.5, 1.0);
    let result = SweepLine::by_polygons(&ring, &[patch])
        .compute_boolean_operation(BooleanType::Union)
        .unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.iter().filter(|p| p.is_clockwise()).count(), 1);
    assert_relative_eq!(net_area(&result), 32.0, epsilon = 1e-9);
}

#[test]
fn clockwise_holes_feed_back_into_later_booleans() {
    let room = square(0.0, 0.0, 4.0);
    let with_hole = room.difference(&square(1.0, 1.0, 1.0)).unwrap();
    let result = SweepLine::by_polygons(&with_hole, &[square(2.5, 2.5, 1.0)])
        .compute_boolean_operation(BooleanType::Difference)
        .unwrap();
    assert_eq!(result.len(), 3);
    assert_eq!(result.iter().filter(|p| p.is_clockwise()).count(), 2);
    assert_relative_eq!(net_area(&result), 14.0, epsilon = 1e-9);
}
