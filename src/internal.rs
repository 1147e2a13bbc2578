use crate::{Decomposition, Position, SequenceGraph, SimpleGraph, SnarlDistanceIndex, TemporaryIndex};
use crate::utils::{self, UNREACHABLE, add_distance};

use gbwt::{GBZ, Orientation};
use gbwt::support;

use simple_sds::serialize;

use std::cmp::Reverse;
use std::collections::{BinaryHeap, BTreeSet};

//-----------------------------------------------------------------------------

// Fixture graphs with hand-written decompositions.

fn build_graph(nodes: &[(usize, usize)], edges: &[(&str, &str)]) -> SimpleGraph {
    let mut graph = SimpleGraph::new();
    for &(node_id, len) in nodes {
        let result = graph.add_node(node_id, len);
        assert!(result.is_ok(), "Failed to add node {}: {}", node_id, result.unwrap_err());
    }
    for &(from, to) in edges {
        let from = utils::parse_handle(from).unwrap();
        let to = utils::parse_handle(to).unwrap();
        let result = graph.add_edge(from, to);
        assert!(result.is_ok(), "Failed to add edge {} -> {}: {}", from, to, result.unwrap_err());
    }
    graph
}

fn parse_decomposition(events: &[&str]) -> Decomposition {
    let text = events.join("\n");
    let result = Decomposition::parse(text.as_bytes());
    assert!(result.is_ok(), "Failed to parse the decomposition: {}", result.unwrap_err());
    result.unwrap()
}

// A path 1 (3 bp) -> 2 (4 bp) -> 3 (5 bp) as a chain of trivial snarls.
pub(crate) fn path_graph() -> (SimpleGraph, Decomposition) {
    let graph = build_graph(
        &[(1, 3), (2, 4), (3, 5)],
        &[(">1", ">2"), (">2", ">3")]
    );
    let decomposition = parse_decomposition(&[
        "CS >1", "SS >1", "SE >2", "SS >2", "SE >3", "CE >3",
    ]);
    (graph, decomposition)
}

// A bubble from 1 (2 bp) to 4 (1 bp) with alternatives 2 (3 bp) and 3 (7 bp).
pub(crate) fn bubble_graph() -> (SimpleGraph, Decomposition) {
    let graph = build_graph(
        &[(1, 2), (2, 3), (3, 7), (4, 1)],
        &[(">1", ">2"), (">1", ">3"), (">2", ">4"), (">3", ">4")]
    );
    let decomposition = parse_decomposition(&[
        "CS >1", "SS >1", "CS >2", "CE >2", "CS >3", "CE >3", "SE >4", "CE >4",
    ]);
    (graph, decomposition)
}

// Four components:
//
// * Chain 1, 6, 7, 9 with snarls:
//   * 1..6 containing chain 2, 4 (with snarl 2..4 containing 3) and node 5;
//   * a trivial snarl 6..7;
//   * 7..9 containing node 8 in reverse orientation with an inversion edge and a tip 10.
// * Chain 11, 12.
// * Isolated node 13.
// * A snarl 14..16 containing 15, without an explicit chain.
pub(crate) fn nested_graph() -> (SimpleGraph, Decomposition) {
    let graph = build_graph(
        &[
            (1, 4), (2, 1), (3, 2), (4, 3), (5, 6), (6, 2), (7, 5), (8, 1),
            (9, 3), (10, 2), (11, 3), (12, 4), (13, 5), (14, 1), (15, 2), (16, 3),
        ],
        &[
            (">1", ">2"), (">2", ">3"), (">3", ">4"), (">2", ">4"), (">4", ">6"),
            (">1", ">5"), (">5", ">6"), (">6", ">7"),
            (">7", "<8"), ("<8", ">9"), (">7", ">10"), ("<8", ">8"),
            (">11", ">12"),
            (">14", ">15"), (">15", ">16"), (">14", ">16"),
        ]
    );
    let decomposition = parse_decomposition(&[
        "CS >1", "SS >1",
        "CS >2", "SS >2", "CS >3", "CE >3", "SE >4", "CE >4",
        "CS >5", "CE >5",
        "SE >6",
        "SS >6", "SE >7",
        "SS >7", "CS <8", "CE <8", "CS >10", "CE >10", "SE >9",
        "CE >9",
        "CS >11", "SS >11", "SE >12", "CE >12",
        "CS >13", "CE >13",
        "SS >14", "CS >15", "CE >15", "SE >16",
    ]);
    (graph, decomposition)
}

// Two components:
//
// * Chain 1, 6 with snarl 1..6 containing chain 2, 4 and node 5:
//   * snarl 2..4 contains node 3 and an inversion edge from 2 to the end of 3;
//   * node 5 is reachable from 1 only by turning around in chain 2..4.
// * Chain 7, 10 with snarl 7..10 containing nodes 8 and 9 in a cycle.
pub(crate) fn turnaround_graph() -> (SimpleGraph, Decomposition) {
    let graph = build_graph(
        &[(1, 4), (2, 1), (3, 2), (4, 3), (5, 6), (6, 2), (7, 1), (8, 2), (9, 3), (10, 1)],
        &[
            (">1", ">2"), (">2", ">3"), (">3", ">4"), (">2", "<3"), (">4", ">6"),
            ("<2", ">5"), (">5", ">6"),
            (">7", ">8"), (">8", ">9"), (">9", ">8"), (">9", ">10"),
        ]
    );
    let decomposition = parse_decomposition(&[
        "CS >1", "SS >1",
        "CS >2", "SS >2", "CS >3", "CE >3", "SE >4", "CE >4",
        "CS >5", "CE >5",
        "SE >6", "CE >6",
        "CS >7", "SS >7", "CS >8", "CE >8", "CS >9", "CE >9", "SE >10", "CE >10",
    ]);
    (graph, decomposition)
}

// A chain 1 (2 bp), 2 (3 bp), 1 that returns to its start node.
pub(crate) fn looping_graph() -> (SimpleGraph, Decomposition) {
    let graph = build_graph(&[(1, 2), (2, 3)], &[(">1", ">2"), (">2", ">1")]);
    let decomposition = parse_decomposition(&[
        "CS >1", "SS >1", "SE >2", "SS >2", "SE >1", "CE >1",
    ]);
    (graph, decomposition)
}

pub(crate) fn build_temporary<G: SequenceGraph>(graph: &G, decomposition: &Decomposition) -> TemporaryIndex {
    let result = TemporaryIndex::new(graph, decomposition.clone(), false);
    assert!(result.is_ok(), "Failed to build the temporary index: {}", result.unwrap_err());
    result.unwrap()
}

pub(crate) fn build_index<G: SequenceGraph>(graph: &G, decomposition: &Decomposition) -> SnarlDistanceIndex {
    let result = SnarlDistanceIndex::new(graph, decomposition.clone(), false);
    assert!(result.is_ok(), "Failed to build the distance index: {}", result.unwrap_err());
    result.unwrap()
}

//-----------------------------------------------------------------------------

// Files for the GBWT-rs test case.

pub(crate) fn load_gbz(filename: &'static str) -> GBZ {
    let gbz_file = support::get_test_data(filename);
    let graph = serialize::load_from(&gbz_file);
    if let Err(err) = graph {
        panic!("Failed to load GBZ graph from {}: {}", gbz_file.display(), err);
    }
    graph.unwrap()
}

//-----------------------------------------------------------------------------

// Distance oracle.

// Returns all positions in the graph in both orientations.
pub(crate) fn all_positions<G: SequenceGraph>(graph: &G) -> Vec<Position> {
    let mut result = Vec::new();
    for node_id in graph.min_node_id()..=graph.max_node_id() {
        if let Some(len) = graph.node_len(node_id) {
            for orientation in [Orientation::Forward, Orientation::Reverse] {
                for offset in 0..=len {
                    result.push(Position::new(node_id, orientation, offset));
                }
            }
        }
    }
    result
}

// Dijkstra over oriented nodes in the base graph.
pub(crate) fn brute_force_distance<G: SequenceGraph>(graph: &G, from: Position, to: Position) -> Option<usize> {
    let mut best = UNREACHABLE;
    if from.node == to.node && from.orientation == to.orientation && to.offset >= from.offset {
        best = to.offset - from.offset;
    }

    let from_handle = from.handle();
    let to_handle = to.handle();
    let from_len = graph.node_len(from.node).unwrap();

    // (distance to the start of the handle, handle)
    let mut queue: BinaryHeap<Reverse<(usize, usize)>> = BinaryHeap::new();
    let mut settled: BTreeSet<usize> = BTreeSet::new();
    graph.follow_edges(from_handle, false, |next| {
        queue.push(Reverse((from_len - from.offset, next)));
        true
    });
    while let Some(Reverse((distance, handle))) = queue.pop() {
        if !settled.insert(handle) {
            continue;
        }
        if handle == to_handle {
            best = best.min(add_distance(distance, to.offset));
            break;
        }
        let through = add_distance(distance, graph.node_len(support::node_id(handle)).unwrap());
        graph.follow_edges(handle, false, |next| {
            if !settled.contains(&next) {
                queue.push(Reverse((through, next)));
            }
            true
        });
    }

    utils::finite(best)
}

//-----------------------------------------------------------------------------
