//! Temporary snarl tree built from decomposition events.
//!
//! [`TemporaryIndex`] is the mutable form of the index.
//! Records refer to each other by indexes into per-kind vectors.
//! Construction consumes the events with an explicit stack of open structures and then computes the distances.
//! The temporary index is encoded into a [`crate::SnarlDistanceIndex`] and discarded.

use crate::{DecompositionEvent, SequenceGraph};
use crate::solver;
use crate::utils::{self, UNREACHABLE};

use gbwt::support;

use std::collections::BTreeMap;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Parent of a temporary chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemporaryParent {
    /// The chain is a connected component.
    Root,
    /// The chain is a child of the snarl with this index.
    Snarl(usize),
}

/// A node in the temporary index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemporaryNode {
    pub node_id: usize,
    pub length: usize,
    /// Index of the chain containing the node.
    pub chain: usize,
    /// Position of the first occurrence of the node in the chain.
    pub rank: usize,
    /// The chain traverses the node in reverse orientation.
    pub reversed: bool,
}

/// A chain in the temporary index.
///
/// A chain alternates between nodes and snarls, starting and ending with a node.
/// Snarl `i` is between nodes `i` and `i + 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemporaryChain {
    /// Handle to the first node, oriented into the chain.
    pub start: usize,
    /// Handle to the last node, oriented out of the chain.
    pub end: usize,
    pub parent: TemporaryParent,
    /// Child rank in the parent snarl (`1..`) or the component number.
    pub rank: usize,
    /// Node handles in chain orientation.
    pub nodes: Vec<usize>,
    /// Snarl indexes.
    pub snarls: Vec<usize>,
    /// A single node without snarls.
    pub is_trivial: bool,
    /// Opened implicitly for a snarl without an enclosing chain.
    pub is_synthetic: bool,

    pub prefix_sum: Vec<usize>,
    pub forward_loops: Vec<usize>,
    pub backward_loops: Vec<usize>,
    pub min_length: usize,
    pub max_length: usize,
    pub connectivity: u64,
}

impl TemporaryChain {
    fn new(start: usize) -> Self {
        TemporaryChain {
            start, end: start,
            parent: TemporaryParent::Root, rank: 0,
            nodes: vec![start], snarls: Vec::new(),
            is_trivial: false, is_synthetic: false,
            prefix_sum: Vec::new(), forward_loops: Vec::new(), backward_loops: Vec::new(),
            min_length: UNREACHABLE, max_length: 0, connectivity: 0,
        }
    }
}

/// A snarl in the temporary index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemporarySnarl {
    /// Handle to the start boundary, oriented into the snarl.
    pub start: usize,
    /// Handle to the end boundary, oriented out of the snarl.
    pub end: usize,
    /// Index of the enclosing chain.
    pub chain: usize,
    /// Position of the snarl in the chain.
    pub rank: usize,
    /// Chain indexes of the children in rank order (ranks `1..=children.len()`).
    pub children: Vec<usize>,

    /// Triangular distance matrix over node sides; see [`crate::records`].
    pub distances: Vec<usize>,
    pub min_length: usize,
    pub max_length: usize,
    /// Distance from leaving the start to the right to entering it again from the right.
    pub start_loop: usize,
    /// Distance from leaving the end to the left to entering it again from the left.
    pub end_loop: usize,
    pub connectivity: u64,
}

impl TemporarySnarl {
    fn new(start: usize, chain: usize, rank: usize) -> Self {
        TemporarySnarl {
            start, end: start, chain, rank,
            children: Vec::new(),
            distances: Vec::new(),
            min_length: UNREACHABLE, max_length: 0,
            start_loop: UNREACHABLE, end_loop: UNREACHABLE,
            connectivity: 0,
        }
    }

    /// Returns `true` if the snarl has no children.
    ///
    /// Trivial snarls have no distance matrix and no permanent record.
    pub fn is_trivial(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the distance between two node sides, or [`UNREACHABLE`] for trivial snarls.
    pub fn distance(&self, a: usize, b: usize) -> usize {
        self.distances.get(crate::records::matrix_index(a, b)).copied().unwrap_or(UNREACHABLE)
    }
}

//-----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpenStructure {
    Chain(usize),
    Snarl(usize),
}

/// A mutable snarl tree with distances, built from decomposition events.
///
/// # Examples
///
/// ```
/// use snarl_distance::{Decomposition, SimpleGraph, TemporaryIndex};
/// use snarl_distance::utils;
///
/// // A bubble: 1 -> {2, 3} -> 4.
/// let mut graph = SimpleGraph::new();
/// for (id, len) in [(1, 2), (2, 3), (3, 7), (4, 1)] {
///     graph.add_node(id, len).unwrap();
/// }
/// for (from, to) in [(1, 2), (1, 3), (2, 4), (3, 4)] {
///     graph.add_edge(utils::oriented_handle(from, false), utils::oriented_handle(to, false)).unwrap();
/// }
///
/// let text = "CS >1\nSS >1\nCS >2\nCE >2\nCS >3\nCE >3\nSE >4\nCE >4\n";
/// let decomposition = Decomposition::parse(text.as_bytes()).unwrap();
/// let index = TemporaryIndex::new(&graph, decomposition, false).unwrap();
///
/// assert_eq!(index.components().len(), 1);
/// let snarl = &index.snarls()[0];
/// assert_eq!(snarl.children.len(), 2);
/// assert_eq!(snarl.min_length, 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemporaryIndex {
    nodes: BTreeMap<usize, TemporaryNode>,
    chains: Vec<TemporaryChain>,
    snarls: Vec<TemporarySnarl>,
    components: Vec<usize>,
    // Chains in the order they were closed. Children are closed before their parents.
    chain_order: Vec<usize>,
}

impl TemporaryIndex {
    /// Builds the temporary index from the events and computes the distances.
    ///
    /// Returns an error if the events do not form a valid decomposition of (a part of) the graph.
    /// Prints progress information to stderr if `verbose` is set.
    pub fn new<G: SequenceGraph, I: IntoIterator<Item = DecompositionEvent>>(graph: &G, events: I, verbose: bool) -> Result<Self, String> {
        let mut builder = TemporaryIndex::default();
        let mut stack: Vec<OpenStructure> = Vec::new();
        let mut event_count = 0;
        for event in events {
            builder.process(graph, &mut stack, event).map_err(|x| format!("Event {} ({}): {}", event_count + 1, event, x))?;
            event_count += 1;
        }
        if let Some(open) = stack.last() {
            return Err(format!("The decomposition ends with an open {}", match open {
                OpenStructure::Chain(_) => "chain",
                OpenStructure::Snarl(_) => "snarl",
            }));
        }
        if verbose {
            eprintln!(
                "Built the snarl tree from {} events: {} nodes, {} chains, {} snarls, {} components",
                event_count, builder.nodes.len(), builder.chains.len(), builder.snarls.len(), builder.components.len()
            );
        }

        solver::solve(graph, &mut builder, verbose)?;
        Ok(builder)
    }

    fn process<G: SequenceGraph>(&mut self, graph: &G, stack: &mut Vec<OpenStructure>, event: DecompositionEvent) -> Result<(), String> {
        match event {
            DecompositionEvent::ChainStart(handle) => {
                if let Some(OpenStructure::Chain(_)) = stack.last() {
                    return Err(String::from("A chain cannot start directly inside a chain"));
                }
                let chain = self.open_chain(graph, handle)?;
                stack.push(OpenStructure::Chain(chain));
            },
            DecompositionEvent::ChainEnd(handle) => {
                let chain = match stack.pop() {
                    Some(OpenStructure::Chain(chain)) => chain,
                    Some(OpenStructure::Snarl(_)) => return Err(String::from("Chain end inside an open snarl")),
                    None => return Err(String::from("Chain end without an open chain")),
                };
                if self.chains[chain].is_synthetic {
                    return Err(String::from("Chain end for an implicit chain"));
                }
                self.close_chain(stack, chain, handle)?;
            },
            DecompositionEvent::SnarlStart(handle) => {
                let chain = match stack.last() {
                    Some(OpenStructure::Chain(chain)) => *chain,
                    Some(OpenStructure::Snarl(_)) => return Err(String::from("A snarl cannot start directly inside a snarl")),
                    None => {
                        let chain = self.open_chain(graph, handle)?;
                        self.chains[chain].is_synthetic = true;
                        stack.push(OpenStructure::Chain(chain));
                        chain
                    },
                };
                let last = *self.chains[chain].nodes.last().unwrap_or(&handle);
                if last != handle {
                    return Err(format!(
                        "Snarl starts at {} but the chain is at {}",
                        utils::handle_to_string(handle), utils::handle_to_string(last)
                    ));
                }
                let rank = self.chains[chain].snarls.len();
                self.snarls.push(TemporarySnarl::new(handle, chain, rank));
                stack.push(OpenStructure::Snarl(self.snarls.len() - 1));
            },
            DecompositionEvent::SnarlEnd(handle) => {
                let snarl = match stack.pop() {
                    Some(OpenStructure::Snarl(snarl)) => snarl,
                    Some(OpenStructure::Chain(_)) => return Err(String::from("Snarl end inside an open chain")),
                    None => return Err(String::from("Snarl end without an open snarl")),
                };
                self.snarls[snarl].end = handle;
                let chain = self.snarls[snarl].chain;
                self.chains[chain].snarls.push(snarl);
                self.chains[chain].nodes.push(handle);
                let rank = self.chains[chain].nodes.len() - 1;
                self.register_node(graph, handle, chain, rank)?;
                if self.chains[chain].is_synthetic {
                    if stack.pop() != Some(OpenStructure::Chain(chain)) {
                        return Err(String::from("Stack does not contain the implicit chain"));
                    }
                    self.close_chain(stack, chain, handle)?;
                }
            },
        }
        Ok(())
    }

    // Creates a new chain starting at the handle.
    fn open_chain<G: SequenceGraph>(&mut self, graph: &G, handle: usize) -> Result<usize, String> {
        if self.nodes.contains_key(&support::node_id(handle)) {
            return Err(format!("Node {} is already in the decomposition", support::node_id(handle)));
        }
        self.chains.push(TemporaryChain::new(handle));
        let chain = self.chains.len() - 1;
        self.register_node(graph, handle, chain, 0)?;
        Ok(chain)
    }

    // Closes the chain and attaches it to its parent.
    fn close_chain(&mut self, stack: &[OpenStructure], chain: usize, handle: usize) -> Result<(), String> {
        let last = *self.chains[chain].nodes.last().unwrap_or(&handle);
        if last != handle {
            return Err(format!(
                "Chain ends at {} but the last node is {}",
                utils::handle_to_string(handle), utils::handle_to_string(last)
            ));
        }
        self.chains[chain].end = handle;
        self.chains[chain].is_trivial = self.chains[chain].nodes.len() == 1;
        match stack.last() {
            Some(OpenStructure::Snarl(snarl)) => {
                self.snarls[*snarl].children.push(chain);
                self.chains[chain].parent = TemporaryParent::Snarl(*snarl);
                self.chains[chain].rank = self.snarls[*snarl].children.len();
            },
            Some(OpenStructure::Chain(_)) => {
                return Err(String::from("A chain cannot end directly inside a chain"));
            },
            None => {
                self.chains[chain].parent = TemporaryParent::Root;
                self.chains[chain].rank = self.components.len();
                self.components.push(chain);
            },
        }
        self.chain_order.push(chain);
        Ok(())
    }

    // Registers a node at the given position in the chain, unless the chain already contains it.
    fn register_node<G: SequenceGraph>(&mut self, graph: &G, handle: usize, chain: usize, rank: usize) -> Result<(), String> {
        let node_id = support::node_id(handle);
        if let Some(node) = self.nodes.get(&node_id) {
            if node.chain != chain {
                return Err(format!("Node {} is in more than one chain", node_id));
            }
            return Ok(());
        }
        let length = graph.node_len(node_id).ok_or(format!("The graph does not contain node {}", node_id))?;
        self.nodes.insert(node_id, TemporaryNode {
            node_id, length, chain, rank,
            reversed: utils::is_reverse(handle),
        });
        Ok(())
    }
}

//-----------------------------------------------------------------------------

/// Accessors.
impl TemporaryIndex {
    /// Returns the nodes by identifier.
    pub fn nodes(&self) -> &BTreeMap<usize, TemporaryNode> {
        &self.nodes
    }

    pub fn node(&self, node_id: usize) -> Option<&TemporaryNode> {
        self.nodes.get(&node_id)
    }

    pub fn chains(&self) -> &[TemporaryChain] {
        &self.chains
    }

    pub fn snarls(&self) -> &[TemporarySnarl] {
        &self.snarls
    }

    /// Returns the chain indexes of the connected components.
    pub fn components(&self) -> &[usize] {
        &self.components
    }

    pub(crate) fn chain_order(&self) -> &[usize] {
        &self.chain_order
    }

    pub(crate) fn chain_mut(&mut self, chain: usize) -> &mut TemporaryChain {
        &mut self.chains[chain]
    }

    pub(crate) fn snarl_mut(&mut self, snarl: usize) -> &mut TemporarySnarl {
        &mut self.snarls[snarl]
    }

    /// Returns the length of the node, or `0` if there is no such node.
    pub fn node_length(&self, node_id: usize) -> usize {
        self.nodes.get(&node_id).map(|node| node.length).unwrap_or(0)
    }
}

//-----------------------------------------------------------------------------
