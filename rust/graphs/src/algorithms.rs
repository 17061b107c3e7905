// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shortest paths over [`Graph`]s.

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::geometry::{Edge, Vertex};
use crate::graph::Graph;
use crate::queue::MinPriorityQ;

/// Dijkstra's shortest path from `origin` to `destination`.
///
/// Neither end has to be a vertex of `graph`. Edges of `temp_graph` (sight
/// lines from the query points, typically) are relaxed together with the
/// graph's own edges; `graph` itself is never modified.
///
/// The origin must be a vertex of `graph` or `temp_graph`. Returns a graph
/// whose edges are the path segments in order from origin to
/// destination.
pub fn dijkstra(
    graph: &Graph,
    origin: &Vertex,
    destination: &Vertex,
    temp_graph: Option<&Graph>,
) -> Result<Graph> {
    let known = |v: &Vertex| {
        graph.contains_vertex(v) || temp_graph.is_some_and(|temp| temp.contains_vertex(v))
    };
    if !known(origin) {
        return Err(Error::VertexNotFound(*origin));
    }

    let base = graph.node_count();
    let mut extras: Vec<Vertex> = Vec::new();

    // Temp-graph vertices missing from the graph get indices after its own.
    let temp_nodes: Vec<usize> = temp_graph
        .map(|temp| {
            temp.vertices()
                .iter()
                .map(|v| resolve(graph, &mut extras, v))
                .collect()
        })
        .unwrap_or_default();
    let source = resolve(graph, &mut extras, origin);
    let target = resolve(graph, &mut extras, destination);

    let mut temp_adjacency: FxHashMap<usize, Vec<(usize, f64)>> = FxHashMap::default();
    if let Some(temp) = temp_graph {
        for (ti, &node) in temp_nodes.iter().enumerate() {
            for (tn, weight) in temp.neighbors(ti) {
                temp_adjacency
                    .entry(node)
                    .or_default()
                    .push((temp_nodes[tn], weight));
            }
        }
    }

    let n = base + extras.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut queue = MinPriorityQ::with_capacity(n);
    for node in 0..n {
        queue.add(node, if node == source { 0.0 } else { f64::INFINITY });
    }
    dist[source] = 0.0;

    let mut settled = 0usize;
    while let Some((node, cost)) = queue.take_with_value() {
        settled += 1;
        if node == target || cost.is_infinite() {
            break;
        }

        let own = if node < base { graph.neighbors(node) } else { Vec::new() };
        let temp = temp_adjacency.get(&node).map(Vec::as_slice).unwrap_or_default();
        for &(neighbor, weight) in own.iter().chain(temp) {
            if !queue.contains(&neighbor) {
                continue;
            }
            let next_cost = cost + weight;
            if next_cost < dist[neighbor] {
                dist[neighbor] = next_cost;
                parent[neighbor] = Some(node);
                queue.update_item(&neighbor, next_cost);
            }
        }
    }

    let mut path = vec![target];
    let mut current = target;
    while current != source {
        let Some(previous) = parent[current] else {
            return Err(Error::Unreachable {
                origin: *origin,
                destination: *destination,
            });
        };
        path.push(previous);
        current = previous;
    }
    path.reverse();

    let vertex_at = |i: usize| {
        if i < base {
            graph.vertices()[i]
        } else {
            extras[i - base]
        }
    };
    let result = Graph::from_edges(
        path.windows(2)
            .map(|pair| Edge::by_start_vertex_end_vertex(vertex_at(pair[0]), vertex_at(pair[1]))),
    );

    tracing::debug!(
        settled,
        edges = result.edge_count(),
        length = dist[target],
        "shortest path found"
    );
    Ok(result)
}

/// Node index of `v`: its graph index, or a slot among the extras.
fn resolve(graph: &Graph, extras: &mut Vec<Vertex>, v: &Vertex) -> usize {
    if let Some(i) = graph.vertex_index(v) {
        return i;
    }
    if let Some(i) = extras.iter().position(|e| e == v) {
        return graph.node_count() + i;
    }
    extras.push(*v);
    graph.node_count() + extras.len() - 1
}
