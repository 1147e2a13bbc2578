//! Encoding temporary indexes into the flat record store.
//!
//! The first pass writes the records top-down, so that every parent has an offset before its children are written.
//! Trivial chains are not stored: their node record is linked directly to the parent snarl or the root.
//! The second pass fills in the offsets of child records: connected components in the root, snarls in chains, and children in snarls.

use crate::{SequenceGraph, TemporaryIndex};
use crate::records::*;
use crate::utils;

use gbwt::support;

use std::collections::{BTreeSet, HashMap};

//-----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Structure {
    Chain(usize),
    Snarl(usize),
}

// A structure waiting to be written.
#[derive(Clone, Copy, Debug)]
struct Pending {
    index: usize,
    structure: Structure,
    parent: usize,
    rank: usize,
}

struct Encoder<'a> {
    indexes: &'a [TemporaryIndex],
    store: Vec<u64>,
    min_node_id: usize,
    node_count: usize,
    // (temporary index, structure) -> offset
    offsets: HashMap<(usize, Structure), usize>,
}

//-----------------------------------------------------------------------------

/// Encodes the temporary indexes into a flat record store.
///
/// The indexes must cover every node of the graph exactly once.
/// Connected components are numbered in the order of the indexes.
pub fn encode<G: SequenceGraph>(graph: &G, indexes: &[TemporaryIndex], verbose: bool) -> Result<Vec<u64>, String> {
    check_coverage(graph, indexes)?;

    let min_node_id = graph.min_node_id();
    let max_node_id = graph.max_node_id();
    let node_count = if max_node_id == 0 { 0 } else { max_node_id + 1 - min_node_id };
    let component_count: usize = indexes.iter().map(|index| index.components().len()).sum();

    let mut encoder = Encoder {
        indexes,
        store: vec![ROOT_TAG, component_count as u64, min_node_id as u64, node_count as u64],
        min_node_id,
        node_count,
        offsets: HashMap::new(),
    };
    encoder.store.resize(ROOT_HEADER_SIZE + node_count + component_count, 0);

    // First pass: records.
    let mut pending: Vec<Pending> = Vec::new();
    let mut component = 0;
    for (i, index) in indexes.iter().enumerate() {
        for &chain in index.components() {
            pending.push(Pending { index: i, structure: Structure::Chain(chain), parent: 0, rank: component });
            component += 1;
        }
    }
    pending.reverse();
    while let Some(next) = pending.pop() {
        let children = match next.structure {
            Structure::Chain(chain) => encoder.write_chain(next, chain)?,
            Structure::Snarl(snarl) => encoder.write_snarl(next, snarl),
        };
        pending.extend(children.into_iter().rev());
    }

    // Second pass: child offsets.
    encoder.fill_offsets()?;

    if verbose {
        eprintln!(
            "Encoded {} components into {} words ({})",
            component_count, encoder.store.len(), utils::human_readable_size(encoder.store.len() * std::mem::size_of::<u64>())
        );
    }
    Ok(encoder.store)
}

fn check_coverage<G: SequenceGraph>(graph: &G, indexes: &[TemporaryIndex]) -> Result<(), String> {
    let mut seen: BTreeSet<usize> = BTreeSet::new();
    for index in indexes.iter() {
        for &node_id in index.nodes().keys() {
            if !graph.has_node(node_id) {
                return Err(format!("The graph does not contain node {}", node_id));
            }
            if !seen.insert(node_id) {
                return Err(format!("Node {} is in more than one temporary index", node_id));
            }
        }
    }
    for node_id in graph.min_node_id()..=graph.max_node_id() {
        if graph.has_node(node_id) && !seen.contains(&node_id) {
            return Err(format!("Node {} is not in the decomposition", node_id));
        }
    }
    Ok(())
}

//-----------------------------------------------------------------------------

impl<'a> Encoder<'a> {
    fn write_node(&mut self, node_id: usize, length: usize, parent: usize, rank: usize, reversed: bool) -> usize {
        let offset = self.store.len();
        self.store.extend_from_slice(&[NODE_TAG, node_id as u64, length as u64, parent as u64, rank as u64, reversed as u64]);
        self.store[ROOT_HEADER_SIZE + node_id - self.min_node_id] = offset as u64;
        offset
    }

    fn node_offset(&self, node_id: usize) -> usize {
        if node_id < self.min_node_id || node_id >= self.min_node_id + self.node_count {
            return 0;
        }
        self.store[ROOT_HEADER_SIZE + node_id - self.min_node_id] as usize
    }

    // Returns the snarls in the chain, to be written next.
    fn write_chain(&mut self, pending: Pending, chain: usize) -> Result<Vec<Pending>, String> {
        let indexes = self.indexes;
        let index = &indexes[pending.index];
        let record = &index.chains()[chain];
        if record.is_trivial {
            let node_id = support::node_id(record.start);
            let offset = self.write_node(node_id, index.node_length(node_id), pending.parent, pending.rank, utils::is_reverse(record.start));
            self.offsets.insert((pending.index, pending.structure), offset);
            return Ok(Vec::new());
        }

        let offset = self.store.len();
        self.store.extend_from_slice(&[
            CHAIN_TAG, pending.parent as u64, pending.rank as u64,
            record.start as u64, record.end as u64,
            encode_distance(record.min_length), encode_distance(record.max_length),
            record.connectivity, record.nodes.len() as u64,
        ]);
        self.store.resize(offset + chain_record_size(record.nodes.len()), 0);
        self.offsets.insert((pending.index, pending.structure), offset);

        for (position, &handle) in record.nodes.iter().enumerate() {
            let node_id = support::node_id(handle);
            let mut node_offset = self.node_offset(node_id);
            if node_offset == 0 {
                node_offset = self.write_node(node_id, index.node_length(node_id), offset, position, utils::is_reverse(handle));
            } else if NodeRecord::new(&self.store, node_offset).map(|node| node.parent()) != Some(offset) {
                return Err(format!("Node {} is in more than one chain", node_id));
            }
            let entry = offset + STRUCTURE_HEADER_SIZE + position * CHAIN_ENTRY_SIZE;
            self.store[entry + ENTRY_NODE] = node_offset as u64;
            self.store[entry + ENTRY_PREFIX_SUM] = encode_distance(record.prefix_sum[position]);
            self.store[entry + ENTRY_FORWARD_LOOP] = encode_distance(record.forward_loops[position]);
            self.store[entry + ENTRY_BACKWARD_LOOP] = encode_distance(record.backward_loops[position]);
        }

        let mut result = Vec::new();
        for (position, &snarl) in record.snarls.iter().enumerate() {
            if !index.snarls()[snarl].is_trivial() {
                result.push(Pending { index: pending.index, structure: Structure::Snarl(snarl), parent: offset, rank: position });
            }
        }
        Ok(result)
    }

    // Returns the children of the snarl, to be written next.
    fn write_snarl(&mut self, pending: Pending, snarl: usize) -> Vec<Pending> {
        let indexes = self.indexes;
        let index = &indexes[pending.index];
        let record = &index.snarls()[snarl];
        let child_count = record.children.len();

        let offset = self.store.len();
        self.store.extend_from_slice(&[
            SNARL_TAG, pending.parent as u64, pending.rank as u64,
            record.start as u64, record.end as u64,
            encode_distance(record.min_length), encode_distance(record.max_length),
            record.connectivity, child_count as u64,
        ]);
        self.store.resize(offset + STRUCTURE_HEADER_SIZE + child_count, 0);
        self.store.extend(record.distances.iter().map(|d| encode_distance(*d)));
        self.offsets.insert((pending.index, pending.structure), offset);

        record.children.iter().enumerate().map(|(i, &child)| {
            Pending { index: pending.index, structure: Structure::Chain(child), parent: offset, rank: i + 1 }
        }).collect()
    }

    fn offset(&self, index: usize, structure: Structure) -> Result<usize, String> {
        self.offsets.get(&(index, structure)).copied().ok_or(
            format!("No record for {:?} in temporary index {}", structure, index)
        )
    }

    fn fill_offsets(&mut self) -> Result<(), String> {
        let indexes = self.indexes;
        let mut component_slot = ROOT_HEADER_SIZE + self.node_count;
        for (i, index) in indexes.iter().enumerate() {
            for &chain in index.components() {
                let component_offset = self.offset(i, Structure::Chain(chain))?;
                self.store[component_slot] = component_offset as u64;
                component_slot += 1;
            }

            for (chain, record) in index.chains().iter().enumerate() {
                if record.is_trivial {
                    continue;
                }
                let chain_offset = self.offset(i, Structure::Chain(chain))?;
                for (position, &snarl) in record.snarls.iter().enumerate() {
                    if index.snarls()[snarl].is_trivial() {
                        continue;
                    }
                    let entry = chain_offset + STRUCTURE_HEADER_SIZE + position * CHAIN_ENTRY_SIZE;
                    let snarl_offset = self.offset(i, Structure::Snarl(snarl))?;
                    self.store[entry + ENTRY_SNARL] = snarl_offset as u64;
                }
            }

            for (snarl, record) in index.snarls().iter().enumerate() {
                if record.is_trivial() {
                    continue;
                }
                let snarl_offset = self.offset(i, Structure::Snarl(snarl))?;
                for (j, &child) in record.children.iter().enumerate() {
                    let child_offset = self.offset(i, Structure::Chain(child))?;
                    self.store[snarl_offset + STRUCTURE_HEADER_SIZE + j] = child_offset as u64;
                }
            }
        }
        Ok(())
    }
}

//-----------------------------------------------------------------------------
