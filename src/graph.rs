//! The base graph the distance index is built over.
//!
//! The index only needs node identifiers, node lengths, and edges between oriented nodes.
//! [`SequenceGraph`] provides them for a [`GBZ`] graph and for the in-memory [`SimpleGraph`].
//!
//! Oriented nodes are represented as GBWT node identifiers (handles).
//! See [`gbwt::support::encode_node`].

use crate::utils;

use gbwt::{GBZ, Orientation};
use gbwt::support;

use std::collections::{BTreeMap, BTreeSet};


//-----------------------------------------------------------------------------

/// A bidirected sequence graph.
///
/// Handles are GBWT node identifiers: `2 * node_id` for the forward orientation and `2 * node_id + 1` for the reverse orientation.
/// Node identifiers are positive.
pub trait SequenceGraph {
    /// Returns the smallest node identifier in the graph, or `0` if the graph is empty.
    fn min_node_id(&self) -> usize;

    /// Returns the largest node identifier in the graph, or `0` if the graph is empty.
    fn max_node_id(&self) -> usize;

    /// Returns `true` if the graph contains the node.
    fn has_node(&self, node_id: usize) -> bool;

    /// Returns the sequence length of the node, or [`None`] if there is no such node.
    fn node_len(&self, node_id: usize) -> Option<usize>;

    /// Calls `iteratee` with every handle reachable by an edge from `handle`.
    ///
    /// If `go_left` is `false`, follows the edges leaving the handle to the right.
    /// Otherwise follows the edges entering the handle from the left, reporting each predecessor in the orientation that leads into the handle.
    /// Stops early and returns `false` if `iteratee` returns `false`.
    /// Returns `true` otherwise.
    fn follow_edges<F: FnMut(usize) -> bool>(&self, handle: usize, go_left: bool, iteratee: F) -> bool;

    /// Returns `true` if there is an edge from `from` to `to`.
    fn has_edge(&self, from: usize, to: usize) -> bool {
        !self.follow_edges(from, false, |next| next != to)
    }

    /// Returns `true` if there are no edges leaving the handle to the right.
    fn is_dead_end(&self, handle: usize) -> bool {
        self.follow_edges(handle, false, |_| false)
    }
}

//-----------------------------------------------------------------------------

impl SequenceGraph for GBZ {
    fn min_node_id(&self) -> usize {
        self.node_iter().next().unwrap_or(0)
    }

    fn max_node_id(&self) -> usize {
        self.node_iter().last().unwrap_or(0)
    }

    fn has_node(&self, node_id: usize) -> bool {
        GBZ::has_node(self, node_id)
    }

    fn node_len(&self, node_id: usize) -> Option<usize> {
        self.sequence_len(node_id)
    }

    fn follow_edges<F: FnMut(usize) -> bool>(&self, handle: usize, go_left: bool, mut iteratee: F) -> bool {
        let (node_id, orientation) = support::decode_node(handle);
        let orientation = if go_left { utils::flip_orientation(orientation) } else { orientation };
        if let Some(iter) = self.successors(node_id, orientation) {
            for (next_id, next_orientation) in iter {
                let next_orientation = if go_left { utils::flip_orientation(next_orientation) } else { next_orientation };
                if !iteratee(support::encode_node(next_id, next_orientation)) {
                    return false;
                }
            }
        }
        true
    }
}

//-----------------------------------------------------------------------------

/// A small in-memory bidirected graph.
///
/// Edges are stored between handles.
/// Adding an edge `from -> to` also adds the reverse edge `flip(to) -> flip(from)`.
///
/// # Examples
///
/// ```
/// use snarl_distance::{SequenceGraph, SimpleGraph};
/// use snarl_distance::utils;
///
/// let mut graph = SimpleGraph::new();
/// graph.add_node(1, 3).unwrap();
/// graph.add_node(2, 5).unwrap();
/// graph.add_edge(utils::oriented_handle(1, false), utils::oriented_handle(2, true)).unwrap();
///
/// assert_eq!(graph.node_len(2), Some(5));
/// assert!(graph.has_edge(utils::oriented_handle(2, false), utils::oriented_handle(1, true)));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimpleGraph {
    lengths: BTreeMap<usize, usize>,
    edges: BTreeMap<usize, BTreeSet<usize>>,
}

impl SimpleGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.lengths.len()
    }

    /// Returns the number of edges in the graph, counting each edge once.
    pub fn edge_count(&self) -> usize {
        let mut result = 0;
        for (from, successors) in self.edges.iter() {
            for to in successors.iter() {
                let reverse = (utils::flip_handle(*to), utils::flip_handle(*from));
                if (*from, *to) <= reverse {
                    result += 1;
                }
            }
        }
        result
    }

    /// Returns an iterator over the node identifiers in increasing order.
    pub fn node_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.lengths.keys().copied()
    }

    /// Adds a node with the given sequence length.
    ///
    /// Returns an error if the identifier is `0` or the node already exists.
    pub fn add_node(&mut self, node_id: usize, len: usize) -> Result<(), String> {
        if node_id == 0 {
            return Err(String::from("Node identifiers must be positive"));
        }
        if self.lengths.contains_key(&node_id) {
            return Err(format!("Node {} already exists", node_id));
        }
        self.lengths.insert(node_id, len);
        Ok(())
    }

    /// Adds an edge between two handles, and the same edge in the other direction.
    ///
    /// Returns an error if either node does not exist.
    pub fn add_edge(&mut self, from: usize, to: usize) -> Result<(), String> {
        for handle in [from, to] {
            if !self.lengths.contains_key(&support::node_id(handle)) {
                return Err(format!("Cannot add an edge to a missing node {}", support::node_id(handle)));
            }
        }
        self.edges.entry(from).or_default().insert(to);
        self.edges.entry(utils::flip_handle(to)).or_default().insert(utils::flip_handle(from));
        Ok(())
    }

    /// Adds an edge between the nodes in the given orientations.
    pub fn connect(&mut self, from: (usize, Orientation), to: (usize, Orientation)) -> Result<(), String> {
        self.add_edge(support::encode_node(from.0, from.1), support::encode_node(to.0, to.1))
    }
}

impl SequenceGraph for SimpleGraph {
    fn min_node_id(&self) -> usize {
        self.lengths.keys().next().copied().unwrap_or(0)
    }

    fn max_node_id(&self) -> usize {
        self.lengths.keys().next_back().copied().unwrap_or(0)
    }

    fn has_node(&self, node_id: usize) -> bool {
        self.lengths.contains_key(&node_id)
    }

    fn node_len(&self, node_id: usize) -> Option<usize> {
        self.lengths.get(&node_id).copied()
    }

    fn follow_edges<F: FnMut(usize) -> bool>(&self, handle: usize, go_left: bool, mut iteratee: F) -> bool {
        let from = if go_left { utils::flip_handle(handle) } else { handle };
        if let Some(successors) = self.edges.get(&from) {
            for next in successors.iter() {
                let next = if go_left { utils::flip_handle(*next) } else { *next };
                if !iteratee(next) {
                    return false;
                }
            }
        }
        true
    }
}

//-----------------------------------------------------------------------------
