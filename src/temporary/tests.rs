use super::*;

use crate::{Decomposition, Position, SimpleGraph};
use crate::internal;
use crate::net_handle::Connectivity;
use crate::records::{side_count, side_index};

use gbwt::Orientation;

//-----------------------------------------------------------------------------

fn try_build(graph: &SimpleGraph, text: &str) -> Result<TemporaryIndex, String> {
    let decomposition = Decomposition::parse(text.as_bytes())?;
    TemporaryIndex::new(graph, decomposition, false)
}

fn chain_starting_at(index: &TemporaryIndex, handle: &str) -> usize {
    let handle = utils::parse_handle(handle).unwrap();
    let chain = index.chains().iter().position(|chain| chain.start == handle);
    assert!(chain.is_some(), "No chain starts at {}", utils::handle_to_string(handle));
    chain.unwrap()
}

fn snarl_starting_at(index: &TemporaryIndex, handle: &str) -> usize {
    let handle = utils::parse_handle(handle).unwrap();
    let snarl = index.snarls().iter().position(|snarl| snarl.start == handle);
    assert!(snarl.is_some(), "No snarl starts at {}", utils::handle_to_string(handle));
    snarl.unwrap()
}

//-----------------------------------------------------------------------------

#[test]
fn path_structure() {
    let (graph, decomposition) = internal::path_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    assert_eq!(index.nodes().len(), 3, "Wrong number of nodes");
    assert_eq!(index.chains().len(), 1, "Wrong number of chains");
    assert_eq!(index.snarls().len(), 2, "Wrong number of snarls");
    assert_eq!(index.components(), &[0], "Wrong components");

    let chain = &index.chains()[0];
    assert_eq!(chain.parent, TemporaryParent::Root, "The chain should be a component");
    assert!(!chain.is_trivial, "The chain should not be trivial");
    assert!(!chain.is_synthetic, "The chain should not be synthetic");
    assert_eq!(chain.nodes.len(), 3, "Wrong number of nodes in the chain");
    assert_eq!(chain.prefix_sum, vec![0, 3, 7], "Wrong prefix sums");
    assert_eq!(chain.min_length, 12, "Wrong minimum length");
    assert_eq!(chain.max_length, 12, "Wrong maximum length");
    assert!(Connectivity::StartEnd.is_in(chain.connectivity), "The chain cannot be traversed");
    assert!(Connectivity::EndStart.is_in(chain.connectivity), "The chain cannot be traversed in reverse");
    assert!(!Connectivity::StartStart.is_in(chain.connectivity), "The chain has a loop");

    for snarl in index.snarls() {
        assert!(snarl.is_trivial(), "Snarl {} should be trivial", utils::handle_to_string(snarl.start));
        assert_eq!(snarl.min_length, 0, "Wrong minimum length for a trivial snarl");
        assert!(snarl.distances.is_empty(), "A trivial snarl has a distance matrix");
    }

    for (position, handle) in chain.nodes.iter().enumerate() {
        let node = index.node(support::node_id(*handle)).unwrap();
        assert_eq!(node.chain, 0, "Wrong chain for node {}", node.node_id);
        assert_eq!(node.rank, position, "Wrong rank for node {}", node.node_id);
        assert!(!node.reversed, "Node {} should not be reversed", node.node_id);
    }
}

#[test]
fn bubble_distances() {
    let (graph, decomposition) = internal::bubble_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    assert_eq!(index.snarls().len(), 1, "Wrong number of snarls");
    let snarl = &index.snarls()[0];
    assert_eq!(snarl.children.len(), 2, "Wrong number of children");
    assert_eq!(snarl.min_length, 3, "The minimum length should use the shorter path");
    assert_eq!(snarl.max_length, 7, "The maximum length should use the longer path");
    assert_eq!(snarl.distances.len(), crate::records::matrix_size(side_count(2)), "Wrong matrix size");

    let start = side_index(0, true);
    let end = side_index(3, false);
    assert_eq!(snarl.distance(start, end), 3, "Wrong distance through the snarl");
    assert_eq!(snarl.distance(start, side_index(1, false)), 0, "Wrong distance to the shorter path");
    assert_eq!(snarl.distance(start, side_index(2, false)), 0, "Wrong distance to the longer path");
    assert_eq!(snarl.distance(side_index(2, true), end), 0, "Wrong distance from the longer path");
    // Entering the end after taking the longer path costs its full length.
    let through_long = snarl.distance(start, side_index(2, false)) + index.node_length(3) + snarl.distance(side_index(2, true), end);
    assert_eq!(through_long, 7, "Wrong length for the longer path");
    assert!(through_long > snarl.min_length, "The longer path should be longer");
    assert_eq!(snarl.distance(side_index(1, true), side_index(2, false)), UNREACHABLE, "The alternatives should not be connected");
    assert_eq!(snarl.start_loop, UNREACHABLE, "The snarl should not have a start loop");

    let chain = &index.chains()[chain_starting_at(&index, ">1")];
    assert_eq!(chain.prefix_sum, vec![0, 5], "Wrong prefix sums");
    assert_eq!(chain.min_length, 6, "Wrong chain length");
    assert_eq!(chain.max_length, 10, "Wrong maximum chain length");

    for handle in [">2", ">3"] {
        let child = &index.chains()[chain_starting_at(&index, handle)];
        assert!(child.is_trivial, "Chain {} should be trivial", handle);
        assert_eq!(child.parent, TemporaryParent::Snarl(0), "Wrong parent for chain {}", handle);
    }
}

#[test]
fn nested_structure() {
    let (graph, decomposition) = internal::nested_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    assert_eq!(index.nodes().len(), 16, "Wrong number of nodes");
    assert_eq!(index.components().len(), 4, "Wrong number of components");

    let top = &index.chains()[chain_starting_at(&index, ">1")];
    assert_eq!(top.nodes.len(), 4, "Wrong number of nodes in the top-level chain");
    assert_eq!(top.prefix_sum, vec![0, 8, 10, 16], "Wrong prefix sums");
    assert_eq!(top.min_length, 19, "Wrong minimum length");
    assert_eq!(top.forward_loops[2], 2, "Wrong forward loop at node 7");
    assert_eq!(top.forward_loops[1], 12, "Wrong forward loop at node 6");
    assert_eq!(top.forward_loops[0], 24, "Wrong forward loop at node 1");
    assert_eq!(top.backward_loops[3], UNREACHABLE, "Node 9 should not have a backward loop");
    assert!(Connectivity::StartTip.is_in(top.connectivity), "The top-level chain should reach a tip");
    assert!(Connectivity::StartStart.is_in(top.connectivity), "The top-level chain should have a start loop");

    let inversion = &index.snarls()[snarl_starting_at(&index, ">7")];
    assert_eq!(inversion.children.len(), 2, "Wrong number of children in the inversion snarl");
    assert_eq!(inversion.min_length, 1, "Wrong length for the inversion snarl");
    assert_eq!(inversion.start_loop, 2, "Wrong start loop for the inversion snarl");
    assert!(Connectivity::StartTip.is_in(inversion.connectivity), "The inversion snarl should reach a tip");
    assert!(Connectivity::StartStart.is_in(inversion.connectivity), "The inversion snarl should have a start loop");

    let reversed = index.node(8).unwrap();
    assert!(reversed.reversed, "Node 8 should be reversed in its chain");
    let chain = &index.chains()[reversed.chain];
    assert!(chain.is_trivial, "Node 8 should be a trivial chain");
    assert_eq!(chain.start, utils::parse_handle("<8").unwrap(), "Wrong start for the chain of node 8");

    let inner = &index.chains()[chain_starting_at(&index, ">2")];
    assert_eq!(inner.min_length, 4, "Wrong length for chain 2..4");
    assert_eq!(inner.parent, TemporaryParent::Snarl(snarl_starting_at(&index, ">1")), "Wrong parent for chain 2..4");
    assert_eq!(inner.rank, 1, "Wrong rank for chain 2..4");

    let trivial = &index.snarls()[snarl_starting_at(&index, ">6")];
    assert!(trivial.is_trivial(), "Snarl 6..7 should be trivial");
    assert_eq!(trivial.min_length, 0, "Wrong length for snarl 6..7");
}

#[test]
fn synthetic_chain() {
    let (graph, decomposition) = internal::nested_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    let chain_id = chain_starting_at(&index, ">14");
    let chain = &index.chains()[chain_id];
    assert!(chain.is_synthetic, "A root-level snarl should be in a synthetic chain");
    assert!(!chain.is_trivial, "The synthetic chain should not be trivial");
    assert_eq!(chain.parent, TemporaryParent::Root, "The synthetic chain should be a component");
    assert_eq!(chain.end, utils::parse_handle(">16").unwrap(), "Wrong end for the synthetic chain");
    assert_eq!(chain.prefix_sum, vec![0, 1], "Wrong prefix sums for the synthetic chain");
    assert_eq!(chain.min_length, 4, "Wrong length for the synthetic chain");
    assert!(index.components().contains(&chain_id), "The synthetic chain is not a component");

    let isolated = &index.chains()[chain_starting_at(&index, ">13")];
    assert!(isolated.is_trivial, "The isolated node should be a trivial chain");
    assert_eq!(isolated.parent, TemporaryParent::Root, "The isolated node should be a component");
}

#[test]
fn turnaround_in_child_chain() {
    let (graph, decomposition) = internal::turnaround_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    let inner = &index.chains()[chain_starting_at(&index, ">2")];
    assert_eq!(inner.min_length, 6, "Wrong length for chain 2..4");
    assert_eq!(inner.forward_loops[0], 2, "The inversion should give a forward loop at node 2");
    assert_eq!(inner.backward_loops[1], UNREACHABLE, "Node 4 should not have a backward loop");

    let snarl = &index.snarls()[snarl_starting_at(&index, ">1")];
    assert_eq!(snarl.children.len(), 2, "Wrong number of children in snarl 1..6");
    let start = side_index(0, true);
    let end = side_index(3, false);
    assert_eq!(snarl.min_length, 6, "Wrong length for snarl 1..6");
    // Entering node 2 and leaving through it again costs 2 * 1 + 2.
    assert_eq!(snarl.start_loop, 4, "Wrong start loop through chain 2..4");
    assert_eq!(snarl.distance(start, side_index(2, false)), 4, "Node 5 should be reachable by turning around in chain 2..4");
    assert_eq!(snarl.distance(side_index(2, false), side_index(1, false)), 0, "Wrong distance from node 5 to chain 2..4");
    assert_eq!(snarl.end_loop, 12, "Wrong end loop through chain 2..4 and node 5");
    assert_eq!(snarl.distance(end, end), 12, "The end loop does not match the matrix");
    assert_eq!(snarl.max_length, UNREACHABLE, "Turning around in a child should make the maximum length unbounded");
    check_triangle_inequality(&index, snarl);

    let top = &index.chains()[chain_starting_at(&index, ">1")];
    assert_eq!(top.prefix_sum, vec![0, 10], "Wrong prefix sums for chain 1..6");
    assert_eq!(top.min_length, 12, "Wrong length for chain 1..6");
    assert_eq!(top.forward_loops[0], 4, "Wrong forward loop at node 1");
    assert_eq!(top.backward_loops[1], 12, "Wrong backward loop at node 6");
    assert!(Connectivity::StartStart.is_in(top.connectivity), "Chain 1..6 should have a start loop");
    assert!(Connectivity::EndEnd.is_in(top.connectivity), "Chain 1..6 should have an end loop");
}

#[test]
fn cyclic_snarl() {
    let (graph, decomposition) = internal::turnaround_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    let snarl = &index.snarls()[snarl_starting_at(&index, ">7")];
    assert_eq!(snarl.min_length, 5, "Wrong length for snarl 7..10");
    assert_eq!(snarl.max_length, UNREACHABLE, "A cycle should make the maximum length unbounded");
    assert_eq!(snarl.distance(side_index(1, true), side_index(1, false)), 3, "Wrong distance around the cycle");
    check_triangle_inequality(&index, snarl);

    let chain = &index.chains()[chain_starting_at(&index, ">7")];
    assert_eq!(chain.min_length, 7, "Wrong length for chain 7..10");
    assert_eq!(chain.max_length, UNREACHABLE, "The chain should inherit the unbounded maximum length");
}

#[test]
fn looping_chain() {
    let (graph, decomposition) = internal::looping_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    assert_eq!(index.nodes().len(), 2, "The start node should be registered once");
    assert_eq!(index.components().len(), 1, "Wrong number of components");
    let chain = &index.chains()[0];
    let first = utils::parse_handle(">1").unwrap();
    let second = utils::parse_handle(">2").unwrap();
    assert_eq!(chain.nodes, vec![first, second, first], "Wrong nodes in the looping chain");
    assert_eq!(chain.start, chain.end, "The looping chain should end at its start node");
    assert_eq!(index.node(1).unwrap().rank, 0, "The start node should keep its first rank");
    assert_eq!(chain.prefix_sum, vec![0, 2, 5], "Wrong prefix sums for the looping chain");
    assert_eq!(chain.min_length, 7, "Wrong length for the looping chain");
}

//-----------------------------------------------------------------------------

#[test]
fn invalid_decompositions() {
    let (graph, _) = internal::path_graph();
    let cases = [
        ("CS >1\nCE >2\n", "chain end at a different node"),
        ("CS >1\nSS >2\nSE >3\nCE >3\n", "snarl start away from the chain end"),
        ("CS >1\nSS >1\nSE >2\n", "unclosed chain"),
        ("CS >1\nSS >1\n", "unclosed snarl"),
        ("CE >1\n", "chain end without a chain"),
        ("CS >1\nSE >2\nCE >2\n", "snarl end without a snarl"),
        ("CS >1\nCS >2\nCE >2\nCE >1\n", "chain inside a chain"),
        ("CS >9\nCE >9\n", "missing node"),
        ("CS <1\nSS >1\nSE >2\nCE >2\n", "orientation mismatch"),
    ];
    for (text, name) in cases {
        let result = try_build(&graph, text);
        assert!(result.is_err(), "Accepted a decomposition with {}", name);
    }

    let (graph, _) = internal::bubble_graph();
    let text = "CS >1\nSS >1\nCS >2\nCE >2\nCS >2\nCE >2\nSE >4\nCE >4\n";
    let result = try_build(&graph, text);
    assert!(result.is_err(), "Accepted a node in two chains");
    assert!(result.unwrap_err().starts_with("Event 5"), "The error does not report the event");
}

//-----------------------------------------------------------------------------

// Checks d(a, c) <= d(a, b) + len(b) + d(b', c), where b' is the other side of b.
fn check_triangle_inequality(index: &TemporaryIndex, snarl: &TemporarySnarl) {
    let sides = side_count(snarl.children.len());
    let end_rank = snarl.children.len() + 1;
    for a in 0..sides {
        for b in 0..sides {
            let rank = b / 2;
            if rank == 0 || rank == end_rank {
                continue;
            }
            let through = index.chains()[snarl.children[rank - 1]].min_length;
            for c in 0..sides {
                let first = snarl.distance(a, b);
                let second = snarl.distance(b ^ 1, c);
                if first == UNREACHABLE || second == UNREACHABLE || through == UNREACHABLE {
                    continue;
                }
                assert!(
                    snarl.distance(a, c) <= first + through + second,
                    "Triangle inequality fails in snarl {} for sides {}, {}, {}",
                    utils::handle_to_string(snarl.start), a, b, c
                );
            }
        }
    }
}

#[test]
fn snarl_matrix_properties() {
    let (graph, decomposition) = internal::nested_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    for snarl in index.snarls().iter().filter(|snarl| !snarl.is_trivial()) {
        let sides = side_count(snarl.children.len());
        for a in 0..sides {
            for b in 0..sides {
                assert_eq!(
                    snarl.distance(a, b), snarl.distance(b, a),
                    "Distances are not symmetric in snarl {} for sides {}, {}",
                    utils::handle_to_string(snarl.start), a, b
                );
            }
        }
        check_triangle_inequality(&index, snarl);
        assert_eq!(
            snarl.min_length, snarl.distance(side_index(0, true), side_index(snarl.children.len() + 1, false)),
            "Minimum length does not match the matrix in snarl {}", utils::handle_to_string(snarl.start)
        );
    }
}

#[test]
fn prefix_sums_are_distances() {
    let (graph, decomposition) = internal::nested_graph();
    let index = internal::build_temporary(&graph, &decomposition);

    for chain in index.chains().iter().filter(|chain| !chain.is_trivial) {
        let start = Position::new(support::node_id(chain.start), support::node_orientation(chain.start), 0);
        for (position, &handle) in chain.nodes.iter().enumerate() {
            if position > 0 {
                assert!(chain.prefix_sum[position] >= chain.prefix_sum[position - 1], "Prefix sums decrease at position {}", position);
            }
            let target = Position::new(support::node_id(handle), support::node_orientation(handle), 0);
            let expected = if position == 0 { Some(0) } else { internal::brute_force_distance(&graph, start, target) };
            assert_eq!(
                utils::finite(chain.prefix_sum[position]), expected,
                "Wrong prefix sum at position {} of chain {}", position, utils::handle_to_string(chain.start)
            );
        }
    }
}

#[test]
fn trivial_snarl_connectivity() {
    // Node 1 has a reversing edge on its right side.
    let mut graph = SimpleGraph::new();
    graph.add_node(1, 2).unwrap();
    graph.add_node(2, 3).unwrap();
    graph.connect((1, Orientation::Forward), (2, Orientation::Forward)).unwrap();
    graph.connect((1, Orientation::Forward), (1, Orientation::Reverse)).unwrap();

    let index = try_build(&graph, "CS >1\nSS >1\nSE >2\nCE >2\n");
    assert!(index.is_ok(), "Failed to build the index: {}", index.unwrap_err());
    let index = index.unwrap();
    let snarl = &index.snarls()[0];
    assert_eq!(snarl.min_length, 0, "Wrong length for the trivial snarl");
    assert_eq!(snarl.start_loop, 0, "The reversing edge should give a start loop");
    assert_eq!(snarl.end_loop, UNREACHABLE, "The end should not have a loop");
    assert!(Connectivity::StartStart.is_in(snarl.connectivity), "Missing start-start connectivity");

    let chain = &index.chains()[0];
    assert_eq!(chain.forward_loops[0], 0, "Wrong forward loop for node 1");
    assert_eq!(chain.backward_loops[1], UNREACHABLE, "Node 2 should not have a backward loop");
}

//-----------------------------------------------------------------------------
