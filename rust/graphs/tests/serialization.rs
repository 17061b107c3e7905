// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![cfg(feature = "serde")]

use graphical_graphs::{BooleanType, Graph, HasBoundingBox, Polygon, Vertex};

fn room_with_pillar() -> Graph {
    let room = Polygon::by_vertices(
        vec![
            Vertex::new(0.0, 0.0),
            Vertex::new(10.0, 0.0),
            Vertex::new(10.0, 10.0),
            Vertex::new(0.0, 10.0),
        ],
        true,
    )
    .unwrap();
    let pillar = Polygon::by_vertices(
        vec![
            Vertex::new(4.0, 4.0),
            Vertex::new(6.0, 4.0),
            Vertex::new(6.0, 6.0),
            Vertex::new(4.0, 6.0),
        ],
        false,
    )
    .unwrap();
    Graph::by_boundary_and_internal_polygons(&[room], &[pillar]).unwrap()
}

#[test]
fn graph_survives_json() {
    let graph = room_with_pillar();
    let json = serde_json::to_string(&graph).unwrap();
    let back: Graph = serde_json::from_str(&json).unwrap();

    assert_eq!(back.node_count(), graph.node_count());
    assert_eq!(back.edge_count(), graph.edge_count());
    assert_eq!(back.polygons().len(), 2);
    for (a, b) in graph.vertices().iter().zip(back.vertices()) {
        assert_eq!(a, b);
        assert_eq!(a.polygon_id, b.polygon_id);
    }
    // Adjacency is rebuilt on load.
    let corner = Vertex::new(4.0, 4.0);
    assert_eq!(back.adjacent_vertices(&corner).len(), 2);
}

#[test]
fn polygon_keeps_id_and_role() {
    let graph = room_with_pillar();
    let pillar = graph.polygon(1).unwrap();
    let json = serde_json::to_value(pillar).unwrap();
    let back: Polygon = serde_json::from_value(json).unwrap();

    assert_eq!(back.id(), Some(1));
    assert!(!back.is_boundary());
    assert!(back.same_vertices(pillar));
    assert_eq!(back.bounding_box(), pillar.bounding_box());
}

#[test]
fn vertex_without_polygon_omits_the_field() {
    let json = serde_json::to_value(Vertex::new(1.5, -2.0)).unwrap();
    assert_eq!(json, serde_json::json!({ "x": 1.5, "y": -2.0, "z": 0.0 }));
}

#[test]
fn boolean_type_round_trips() {
    let json = serde_json::to_string(&BooleanType::Difference).unwrap();
    let back: BooleanType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, BooleanType::Difference);
}
