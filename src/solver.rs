//! Distance computations for the temporary index.
//!
//! Chains are processed in the order they were closed, so the children of a snarl are always solved before the snarl.
//! For each chain, the snarls in it are solved first and the chain arrays are then folded from the snarl results.
//!
//! A snarl is solved over its net graph.
//! The boundaries and the child chains are the net graph nodes, and each of them has a left side and a right side.
//! Edges of the base graph connect the sides, and traversing a child costs its minimum length.
//! A child chain can also be entered and left through the same side by turning around inside it.

use crate::{SequenceGraph, TemporaryIndex};
use crate::net_handle::{Connectivity, symmetric_mask};
use crate::records::{matrix_index, matrix_size, side_count, side_index};
use crate::temporary::TemporaryParent;
use crate::utils::{self, UNREACHABLE, add_distance};

use gbwt::support;

use std::cmp::Reverse;
use std::collections::BinaryHeap;

//-----------------------------------------------------------------------------

/// Computes the distances for all snarls and chains in the temporary index.
pub fn solve<G: SequenceGraph>(graph: &G, index: &mut TemporaryIndex, verbose: bool) -> Result<(), String> {
    let mut solved_snarls = 0;
    let mut trivial_snarls = 0;
    let order = index.chain_order().to_vec();
    for chain in order {
        let snarls = index.chains()[chain].snarls.clone();
        for snarl in snarls {
            if index.snarls()[snarl].is_trivial() {
                solve_trivial_snarl(graph, index, snarl);
                trivial_snarls += 1;
            } else {
                solve_snarl(graph, index, snarl)?;
                solved_snarls += 1;
            }
        }
        fold_chain(index, chain);
    }
    if verbose {
        eprintln!("Solved {} snarls and {} trivial snarls", solved_snarls, trivial_snarls);
    }
    Ok(())
}

//-----------------------------------------------------------------------------

// A snarl without children: the boundaries are connected directly.
fn solve_trivial_snarl<G: SequenceGraph>(graph: &G, index: &mut TemporaryIndex, snarl: usize) {
    let (start, end) = (index.snarls()[snarl].start, index.snarls()[snarl].end);
    let reachable = |from: usize, to: usize| if graph.has_edge(from, to) { 0 } else { UNREACHABLE };

    let min_length = reachable(start, end);
    let start_loop = reachable(start, utils::flip_handle(start));
    let end_loop = reachable(utils::flip_handle(end), end);
    let mut mask = 0;
    if min_length != UNREACHABLE {
        mask |= Connectivity::StartEnd.bit();
    }
    if start_loop != UNREACHABLE {
        mask |= Connectivity::StartStart.bit();
    }
    if end_loop != UNREACHABLE {
        mask |= Connectivity::EndEnd.bit();
    }
    if graph.is_dead_end(start) {
        mask |= Connectivity::StartTip.bit();
    }
    if graph.is_dead_end(utils::flip_handle(end)) {
        mask |= Connectivity::EndTip.bit();
    }

    let record = index.snarl_mut(snarl);
    record.min_length = min_length;
    record.max_length = 0;
    record.start_loop = start_loop;
    record.end_loop = end_loop;
    record.connectivity = symmetric_mask(mask);
}

//-----------------------------------------------------------------------------

/// The net graph of a snarl.
///
/// Sides are indexed as in the snarl distance matrix.
/// A path leaves a net graph node through one side and enters the next one through another side.
#[derive(Clone, Debug)]
struct NetGraph {
    end_rank: usize,
    // Entering sides reachable by an edge from each leaving side.
    edges: Vec<Vec<usize>>,
    // Minimum and maximum cost of traversing each rank from one side to the other.
    traverse: Vec<usize>,
    max_traverse: Vec<usize>,
    // Cost of entering a side and leaving through the same side.
    turnaround: Vec<usize>,
    // Sides without edges to the outside of the child.
    dead_end: Vec<bool>,
    // Entering this side reaches a tip inside the child chain.
    tip_inside: Vec<bool>,
    // Some child chain connects two tips.
    child_tip_tip: bool,
}

impl NetGraph {
    fn new<G: SequenceGraph>(graph: &G, index: &TemporaryIndex, snarl: usize) -> Result<Self, String> {
        let record = &index.snarls()[snarl];
        let child_count = record.children.len();
        let end_rank = child_count + 1;
        let sides = side_count(child_count);

        let mut result = NetGraph {
            end_rank,
            edges: vec![Vec::new(); sides],
            traverse: vec![UNREACHABLE; end_rank + 1],
            max_traverse: vec![UNREACHABLE; end_rank + 1],
            turnaround: vec![UNREACHABLE; sides],
            dead_end: vec![false; sides],
            tip_inside: vec![false; sides],
            child_tip_tip: false,
        };

        // Leaving handles for each side. The outer sides of the boundaries are outside the snarl.
        let mut leaving: Vec<Option<usize>> = vec![None; sides];
        leaving[side_index(0, true)] = Some(record.start);
        leaving[side_index(end_rank, false)] = Some(utils::flip_handle(record.end));
        for (i, &child) in record.children.iter().enumerate() {
            let rank = i + 1;
            let chain = &index.chains()[child];
            let first = index.node_length(support::node_id(chain.start));
            let last = index.node_length(support::node_id(chain.end));
            leaving[side_index(rank, false)] = Some(utils::flip_handle(chain.start));
            leaving[side_index(rank, true)] = Some(chain.end);
            result.traverse[rank] = chain.min_length;
            result.max_traverse[rank] = chain.max_length;
            let forward = chain.forward_loops.first().copied().unwrap_or(UNREACHABLE);
            let backward = chain.backward_loops.last().copied().unwrap_or(UNREACHABLE);
            result.turnaround[side_index(rank, false)] = add_distance(add_distance(first, first), forward);
            result.turnaround[side_index(rank, true)] = add_distance(add_distance(last, last), backward);
            result.tip_inside[side_index(rank, false)] = Connectivity::StartTip.is_in(chain.connectivity);
            result.tip_inside[side_index(rank, true)] = Connectivity::EndTip.is_in(chain.connectivity);
            result.child_tip_tip |= Connectivity::TipTip.is_in(chain.connectivity);
        }

        for side in 0..sides {
            if let Some(handle) = leaving[side] {
                let mut reached = Vec::new();
                let is_dead_end = graph.follow_edges(handle, false, |next| {
                    reached.push(next);
                    true
                }) && reached.is_empty();
                result.dead_end[side] = is_dead_end && side / 2 != 0 && side / 2 != end_rank;
                for next in reached {
                    if let Some(entered) = Self::entering_side(index, snarl, next)? {
                        if !result.edges[side].contains(&entered) {
                            result.edges[side].push(entered);
                        }
                    }
                }
            }
        }

        Ok(result)
    }

    // Maps a handle reached by an edge to the net graph side it enters.
    // Returns `None` if the handle does not enter the snarl.
    fn entering_side(index: &TemporaryIndex, snarl: usize, handle: usize) -> Result<Option<usize>, String> {
        let record = &index.snarls()[snarl];
        let end_rank = record.children.len() + 1;
        let node_id = support::node_id(handle);
        if node_id == support::node_id(record.start) || node_id == support::node_id(record.end) {
            if handle == utils::flip_handle(record.start) {
                return Ok(Some(side_index(0, true)));
            }
            if handle == record.end {
                return Ok(Some(side_index(end_rank, false)));
            }
            return Ok(None);
        }

        // Find the child of the snarl containing the node.
        let node = index.node(node_id).ok_or(
            format!("Node {} is not in the decomposition", node_id)
        )?;
        let mut chain = node.chain;
        loop {
            match index.chains()[chain].parent {
                TemporaryParent::Snarl(parent) if parent == snarl => break,
                TemporaryParent::Snarl(parent) => chain = index.snarls()[parent].chain,
                TemporaryParent::Root => {
                    return Err(format!(
                        "Node {} is adjacent to snarl {}..{} but not inside it",
                        node_id, utils::handle_to_string(record.start), utils::handle_to_string(record.end)
                    ));
                },
            }
        }
        let child = &index.chains()[chain];
        if handle == child.start {
            Ok(Some(side_index(child.rank, false)))
        } else if handle == utils::flip_handle(child.end) {
            Ok(Some(side_index(child.rank, true)))
        } else {
            Ok(None)
        }
    }

    fn sides(&self) -> usize {
        self.edges.len()
    }

    fn is_boundary(&self, rank: usize) -> bool {
        rank == 0 || rank == self.end_rank
    }

    // Dijkstra from the leaving side.
    // Returns the distances to all entering sides.
    // The first time a side is popped from the queue fixes the distance for leaving through it.
    fn shortest_paths(&self, source: usize) -> Vec<usize> {
        let mut result = vec![UNREACHABLE; self.sides()];
        let mut settled = vec![false; self.sides()];
        let mut queue: BinaryHeap<Reverse<(usize, usize)>> = BinaryHeap::new(); // (distance, leaving side)
        queue.push(Reverse((0, source)));

        while let Some(Reverse((distance, side))) = queue.pop() {
            if settled[side] {
                continue;
            }
            settled[side] = true;
            for &entered in self.edges[side].iter() {
                result[entered] = result[entered].min(distance);
                let rank = entered / 2;
                if self.is_boundary(rank) {
                    continue;
                }
                let through = add_distance(distance, self.traverse[rank]);
                if through != UNREACHABLE && !settled[entered ^ 1] {
                    queue.push(Reverse((through, entered ^ 1)));
                }
                let turn = add_distance(distance, self.turnaround[entered]);
                if turn != UNREACHABLE && !settled[entered] {
                    queue.push(Reverse((turn, entered)));
                }
            }
        }

        result
    }

    // Longest start-to-end walk, or `UNREACHABLE` if the walks from the start are unbounded.
    // Returns `0` if the end is not reachable.
    fn longest_path(&self) -> usize {
        let mut state = vec![Visit::Unvisited; self.sides()];
        match self.longest_from(side_index(0, true), &mut state) {
            Ok(Some(length)) => length,
            Ok(None) => 0,
            Err(_) => UNREACHABLE,
        }
    }

    // Returns `Err` if there is a cycle.
    fn longest_from(&self, side: usize, state: &mut [Visit]) -> Result<Option<usize>, ()> {
        match state[side] {
            Visit::Active => return Err(()),
            Visit::Done(result) => return Ok(result),
            Visit::Unvisited => {},
        }
        state[side] = Visit::Active;

        let mut best: Option<usize> = None;
        for &entered in self.edges[side].iter() {
            let rank = entered / 2;
            if entered == side_index(self.end_rank, false) {
                best = best.max(Some(0));
                continue;
            }
            if self.is_boundary(rank) {
                continue;
            }
            if self.turnaround[entered] != UNREACHABLE || self.max_traverse[rank] == UNREACHABLE {
                return Err(());
            }
            if let Some(rest) = self.longest_from(entered ^ 1, state)? {
                best = best.max(Some(add_distance(self.max_traverse[rank], rest)));
            }
        }

        state[side] = Visit::Done(best);
        Ok(best)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Visit {
    Unvisited,
    Active,
    Done(Option<usize>),
}

//-----------------------------------------------------------------------------

fn solve_snarl<G: SequenceGraph>(graph: &G, index: &mut TemporaryIndex, snarl: usize) -> Result<(), String> {
    let net_graph = NetGraph::new(graph, index, snarl)?;
    let sides = net_graph.sides();
    let end_rank = net_graph.end_rank;

    let mut distances = vec![UNREACHABLE; matrix_size(sides)];
    for source in 0..sides {
        let rank = source / 2;
        // The outer sides of the boundaries lead out of the snarl.
        if (rank == 0 && source % 2 == 0) || (rank == end_rank && source % 2 == 1) {
            continue;
        }
        let from_source = net_graph.shortest_paths(source);
        for (target, distance) in from_source.into_iter().enumerate() {
            let cell = matrix_index(source, target);
            distances[cell] = distances[cell].min(distance);
        }
    }

    let start_side = side_index(0, true);
    let end_side = side_index(end_rank, false);
    let distance = |a: usize, b: usize| distances[matrix_index(a, b)];
    let min_length = distance(start_side, end_side);
    let start_loop = distance(start_side, start_side);
    let end_loop = distance(end_side, end_side);

    let mut mask = 0;
    if min_length != UNREACHABLE {
        mask |= Connectivity::StartEnd.bit();
    }
    if start_loop != UNREACHABLE {
        mask |= Connectivity::StartStart.bit();
    }
    if end_loop != UNREACHABLE {
        mask |= Connectivity::EndEnd.bit();
    }

    // Entering one of these sides reaches a tip.
    let tip_entries: Vec<usize> = (0..sides).filter(|&side| {
        net_graph.dead_end[side ^ 1] || net_graph.tip_inside[side]
    }).collect();
    if tip_entries.iter().any(|&side| distance(start_side, side) != UNREACHABLE) {
        mask |= Connectivity::StartTip.bit();
    }
    if tip_entries.iter().any(|&side| distance(end_side, side) != UNREACHABLE) {
        mask |= Connectivity::EndTip.bit();
    }
    let tip_sides: Vec<usize> = (0..sides).filter(|&side| net_graph.dead_end[side]).collect();
    let mut tip_tip = net_graph.child_tip_tip;
    for &from in tip_sides.iter() {
        for &to in tip_sides.iter() {
            // Start from the dead end, walk out through the other side, and enter the other dead end.
            if distance(from ^ 1, to ^ 1) != UNREACHABLE {
                tip_tip = true;
            }
        }
    }
    if tip_tip {
        mask |= Connectivity::TipTip.bit();
    }

    let max_length = if min_length == UNREACHABLE { 0 } else { net_graph.longest_path() };

    let record = index.snarl_mut(snarl);
    record.distances = distances;
    record.min_length = min_length;
    record.max_length = max_length;
    record.start_loop = start_loop;
    record.end_loop = end_loop;
    record.connectivity = symmetric_mask(mask);
    Ok(())
}

//-----------------------------------------------------------------------------

// Computes prefix sums, loops, lengths, and connectivity for a chain with solved snarls.
fn fold_chain(index: &mut TemporaryIndex, chain: usize) {
    let record = &index.chains()[chain];
    let lengths: Vec<usize> = record.nodes.iter().map(|handle| index.node_length(support::node_id(*handle))).collect();
    let snarls: Vec<_> = record.snarls.iter().map(|s| &index.snarls()[*s]).collect();
    let k = snarls.len();
    let twice = |x: usize| add_distance(x, x);

    let mut prefix_sum = vec![0; k + 1];
    let mut backward_loops = vec![UNREACHABLE; k + 1];
    for i in 1..=k {
        let snarl = snarls[i - 1];
        prefix_sum[i] = add_distance(add_distance(prefix_sum[i - 1], lengths[i - 1]), snarl.min_length);
        let extended = add_distance(backward_loops[i - 1], twice(add_distance(lengths[i - 1], snarl.min_length)));
        backward_loops[i] = snarl.end_loop.min(extended);
    }

    let mut forward_loops = vec![UNREACHABLE; k + 1];
    for i in (0..k).rev() {
        let snarl = snarls[i];
        let extended = add_distance(forward_loops[i + 1], twice(add_distance(lengths[i + 1], snarl.min_length)));
        forward_loops[i] = snarl.start_loop.min(extended);
    }

    // Distance from the right side of each node to the end of the chain.
    let mut suffix = vec![0; k + 1];
    for i in (0..k).rev() {
        suffix[i] = add_distance(add_distance(snarls[i].min_length, lengths[i + 1]), suffix[i + 1]);
    }

    let min_length = add_distance(prefix_sum[k], lengths[k]);
    let mut max_length = lengths.iter().fold(0, |acc, len| add_distance(acc, *len));
    for snarl in snarls.iter() {
        max_length = add_distance(max_length, snarl.max_length);
    }

    let mut mask = 0;
    if min_length != UNREACHABLE {
        mask |= Connectivity::StartEnd.bit();
    }
    if forward_loops[0] != UNREACHABLE {
        mask |= Connectivity::StartStart.bit();
    }
    if backward_loops[k] != UNREACHABLE {
        mask |= Connectivity::EndEnd.bit();
    }
    let mut tip_open = false;
    for (i, snarl) in snarls.iter().enumerate() {
        if Connectivity::StartTip.is_in(snarl.connectivity) {
            if prefix_sum[i] != UNREACHABLE {
                mask |= Connectivity::StartTip.bit();
            }
            if tip_open {
                mask |= Connectivity::TipTip.bit();
            }
        }
        if Connectivity::EndTip.is_in(snarl.connectivity) && suffix[i + 1] != UNREACHABLE {
            mask |= Connectivity::EndTip.bit();
        }
        if Connectivity::TipTip.is_in(snarl.connectivity) {
            mask |= Connectivity::TipTip.bit();
        }
        if snarl.min_length == UNREACHABLE {
            tip_open = false;
        }
        if Connectivity::EndTip.is_in(snarl.connectivity) {
            tip_open = true;
        }
    }

    let record = index.chain_mut(chain);
    record.prefix_sum = prefix_sum;
    record.forward_loops = forward_loops;
    record.backward_loops = backward_loops;
    record.min_length = min_length;
    record.max_length = max_length;
    record.connectivity = symmetric_mask(mask);
}

//-----------------------------------------------------------------------------
