//! # Snarl distance index: minimum distances in a bidirected sequence graph.
//!
//! This crate builds a hierarchical minimum distance index over the snarl decomposition of a bidirected sequence graph.
//! The index answers minimum distance queries between graph positions without searching the graph.
//! It also supports navigating the decomposition: from structures to their parents, children, boundaries, and neighbors in the net graph.
//!
//! The index builds on the [`gbwt`] crate.
//! A [`gbwt::GBZ`] graph can be used directly as the base graph, and [`SimpleGraph`] is an in-memory alternative for small graphs.
//!
//! See [`SnarlDistanceIndex`] for the index and [`NetHandle`] for the handles used in navigation.
//! See [`Decomposition`] for the input format and [`TemporaryIndex`] for the construction.
//!
//! ### Basic concepts
//!
//! Nodes are accessed by handles, which are [`gbwt::GBWT`] node identifiers.
//! A handle encodes both the identifier of the node in the underlying graph and its orientation.
//!
//! A snarl is a subgraph between two boundary nodes, and a chain is a sequence of nodes and snarls sharing boundaries.
//! Each connected component of the graph is a top-level chain.
//! A snarl contains chains, and a chain consisting of a single node is stored as the node itself.
//!
//! ### Construction
//!
//! The index is built from a depth-first stream of [`DecompositionEvent`] values that start and end chains and snarls.
//! Construction first builds a [`TemporaryIndex`] and computes the distances within each snarl and chain.
//! The temporary index is then encoded into a single flat array of integers (see [`records`]).
//! The final index can be serialized with [`simple_sds::serialize`].
//!
//! ### Distances
//!
//! Positions are offsets on oriented nodes, between `0` and the node length.
//! Distances are measured in bases, and an unreachable position has no distance.
//! Internally, unreachable distances are represented as [`utils::UNREACHABLE`].

pub mod decomposition;
pub mod distance;
mod encoder;
pub mod graph;
pub mod index;
pub mod net_handle;
pub mod records;
mod solver;
pub mod temporary;
pub mod utils;

#[cfg(test)]
mod internal;

pub use decomposition::{Decomposition, DecompositionEvent};
pub use distance::Position;
pub use graph::{SequenceGraph, SimpleGraph};
pub use index::SnarlDistanceIndex;
pub use net_handle::{Connectivity, Endpoint, HandleType, NetHandle};
pub use temporary::TemporaryIndex;
