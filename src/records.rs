//! The flat record store.
//!
//! All permanent records live in a single `Vec<u64>` and refer to each other by offsets.
//! Each record starts with a tag word that determines its kind and layout.
//! Offset `0` is the root record, and a parent or child slot with value `0` means the root or no record.
//!
//! * Root: `[tag, component_count, min_node_id, node_count, node_offsets[node_count], component_offsets[component_count]]`.
//! * Node: `[tag, node_id, length, parent, rank, reversed]`.
//! * Snarl: `[tag, parent, rank, start, end, min_length, max_length, connectivity, child_count, child_offsets[child_count], distances]`.
//! * Chain: `[tag, parent, rank, start, end, min_length, max_length, connectivity, node_count, entries[node_count]]`.
//!
//! Chain entries are `[node_offset, prefix_sum, forward_loop, backward_loop, snarl_offset]`, where the snarl follows the node in the chain.
//! The snarl offset is `0` after the last node and for snarls without internal structure, which are not stored.
//!
//! Snarl distances are stored as a triangular matrix over node sides.
//! The snarl has `child_count + 2` ranks: `0` for the start boundary, `1..=child_count` for the children, and `child_count + 1` for the end boundary.
//! Each rank has a left side and a right side, and the side index is `2 * rank + right`.
//! The distance between sides `a >= b` is at index `a * (a + 1) / 2 + b`.

use crate::utils::UNREACHABLE;

//-----------------------------------------------------------------------------

/// Record tag for the root.
pub const ROOT_TAG: u64 = 1;

/// Record tag for a node.
pub const NODE_TAG: u64 = 2;

/// Record tag for a snarl.
pub const SNARL_TAG: u64 = 3;

/// Record tag for a chain.
pub const CHAIN_TAG: u64 = 4;

/// Size of a node record in words.
pub const NODE_RECORD_SIZE: usize = 6;

pub(crate) const ROOT_HEADER_SIZE: usize = 4;
pub(crate) const STRUCTURE_HEADER_SIZE: usize = 9;
pub(crate) const CHAIN_ENTRY_SIZE: usize = 5;

// Common fields of snarl and chain records.
pub(crate) const PARENT: usize = 1;
pub(crate) const RANK: usize = 2;
pub(crate) const START: usize = 3;
pub(crate) const END: usize = 4;
pub(crate) const MIN_LENGTH: usize = 5;
pub(crate) const MAX_LENGTH: usize = 6;
pub(crate) const CONNECTIVITY: usize = 7;
pub(crate) const COUNT: usize = 8;

// Node record fields.
pub(crate) const NODE_ID: usize = 1;
pub(crate) const NODE_LENGTH: usize = 2;
pub(crate) const NODE_PARENT: usize = 3;
pub(crate) const NODE_RANK: usize = 4;
pub(crate) const NODE_REVERSED: usize = 5;

// Chain entry fields.
pub(crate) const ENTRY_NODE: usize = 0;
pub(crate) const ENTRY_PREFIX_SUM: usize = 1;
pub(crate) const ENTRY_FORWARD_LOOP: usize = 2;
pub(crate) const ENTRY_BACKWARD_LOOP: usize = 3;
pub(crate) const ENTRY_SNARL: usize = 4;

//-----------------------------------------------------------------------------

/// Converts a stored distance back to `usize`.
#[inline]
pub(crate) fn decode_distance(value: u64) -> usize {
    if value == u64::MAX { UNREACHABLE } else { value as usize }
}

/// Converts a distance to a stored word.
#[inline]
pub(crate) fn encode_distance(value: usize) -> u64 {
    if value == UNREACHABLE { u64::MAX } else { value as u64 }
}

/// Returns the side index for the given rank and side.
#[inline]
pub fn side_index(rank: usize, right: bool) -> usize {
    2 * rank + (right as usize)
}

/// Returns the number of node sides in a snarl with `child_count` children.
#[inline]
pub fn side_count(child_count: usize) -> usize {
    2 * (child_count + 2)
}

/// Returns the size of the triangular distance matrix over `sides` node sides.
#[inline]
pub fn matrix_size(sides: usize) -> usize {
    sides * (sides + 1) / 2
}

/// Returns the matrix index for the distance between two sides.
#[inline]
pub fn matrix_index(a: usize, b: usize) -> usize {
    let (high, low) = if a >= b { (a, b) } else { (b, a) };
    high * (high + 1) / 2 + low
}

/// Returns the size of a snarl record with `child_count` children.
pub fn snarl_record_size(child_count: usize) -> usize {
    STRUCTURE_HEADER_SIZE + child_count + matrix_size(side_count(child_count))
}

/// Returns the size of a chain record with `node_count` nodes.
pub fn chain_record_size(node_count: usize) -> usize {
    STRUCTURE_HEADER_SIZE + node_count * CHAIN_ENTRY_SIZE
}

//-----------------------------------------------------------------------------

/// Kind of a record in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Root,
    Node,
    Snarl,
    Chain,
}

impl RecordKind {
    /// Returns the kind of the record at the given offset, or [`None`] if there is no valid tag.
    pub fn at(store: &[u64], offset: usize) -> Option<Self> {
        match store.get(offset)? {
            &ROOT_TAG => Some(RecordKind::Root),
            &NODE_TAG => Some(RecordKind::Node),
            &SNARL_TAG => Some(RecordKind::Snarl),
            &CHAIN_TAG => Some(RecordKind::Chain),
            _ => None,
        }
    }
}

//-----------------------------------------------------------------------------

/// The root record.
#[derive(Clone, Copy, Debug)]
pub struct RootRecord<'a> {
    store: &'a [u64],
}

impl<'a> RootRecord<'a> {
    /// Returns the root record, or [`None`] if offset 0 does not contain one.
    pub fn new(store: &'a [u64]) -> Option<Self> {
        if RecordKind::at(store, 0)? != RecordKind::Root || store.len() < ROOT_HEADER_SIZE {
            return None;
        }
        let result = RootRecord { store };
        if store.len() < ROOT_HEADER_SIZE + result.node_count() + result.component_count() {
            return None;
        }
        Some(result)
    }

    pub fn component_count(&self) -> usize {
        self.store[1] as usize
    }

    pub fn min_node_id(&self) -> usize {
        self.store[2] as usize
    }

    /// Returns the size of the node identifier range.
    pub fn node_count(&self) -> usize {
        self.store[3] as usize
    }

    /// Returns the offset of the node record, or [`None`] if there is no such node.
    pub fn node_offset(&self, node_id: usize) -> Option<usize> {
        if node_id < self.min_node_id() || node_id >= self.min_node_id() + self.node_count() {
            return None;
        }
        let offset = self.store[ROOT_HEADER_SIZE + node_id - self.min_node_id()] as usize;
        if offset == 0 { None } else { Some(offset) }
    }

    pub fn component_offset(&self, component: usize) -> usize {
        self.store[ROOT_HEADER_SIZE + self.node_count() + component] as usize
    }
}

//-----------------------------------------------------------------------------

/// A node record.
#[derive(Clone, Copy, Debug)]
pub struct NodeRecord<'a> {
    store: &'a [u64],
    offset: usize,
}

impl<'a> NodeRecord<'a> {
    /// Returns the node record at the offset, or [`None`] if there is no such record.
    pub fn new(store: &'a [u64], offset: usize) -> Option<Self> {
        if RecordKind::at(store, offset)? != RecordKind::Node || offset + NODE_RECORD_SIZE > store.len() {
            return None;
        }
        Some(NodeRecord { store, offset })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn node_id(&self) -> usize {
        self.store[self.offset + NODE_ID] as usize
    }

    pub fn length(&self) -> usize {
        self.store[self.offset + NODE_LENGTH] as usize
    }

    /// Returns the offset of the parent record: a chain, a snarl, or the root.
    pub fn parent(&self) -> usize {
        self.store[self.offset + NODE_PARENT] as usize
    }

    /// Returns the rank of the node in its parent.
    ///
    /// This is the position in a chain, the child rank in a snarl, or the component in the root.
    pub fn rank(&self) -> usize {
        self.store[self.offset + NODE_RANK] as usize
    }

    /// Returns `true` if the parent traverses the node in reverse orientation.
    pub fn is_reversed(&self) -> bool {
        self.store[self.offset + NODE_REVERSED] != 0
    }
}

//-----------------------------------------------------------------------------

/// Fields shared by snarl and chain records.
pub trait StructureRecord {
    /// Returns the store and the offset of the record.
    fn location(&self) -> (&[u64], usize);

    fn field(&self, field: usize) -> u64 {
        let (store, offset) = self.location();
        store[offset + field]
    }

    /// Returns the offset of the parent record.
    fn parent(&self) -> usize {
        self.field(PARENT) as usize
    }

    /// Returns the rank of the record in its parent.
    fn rank(&self) -> usize {
        self.field(RANK) as usize
    }

    /// Returns the start handle, oriented into the structure.
    fn start(&self) -> usize {
        self.field(START) as usize
    }

    /// Returns the end handle, oriented out of the structure.
    fn end(&self) -> usize {
        self.field(END) as usize
    }

    fn min_length(&self) -> usize {
        decode_distance(self.field(MIN_LENGTH))
    }

    fn max_length(&self) -> usize {
        decode_distance(self.field(MAX_LENGTH))
    }

    /// Returns the connectivity mask.
    fn connectivity(&self) -> u64 {
        self.field(CONNECTIVITY)
    }
}

//-----------------------------------------------------------------------------

/// A snarl record.
#[derive(Clone, Copy, Debug)]
pub struct SnarlRecord<'a> {
    store: &'a [u64],
    offset: usize,
}

impl<'a> SnarlRecord<'a> {
    /// Returns the snarl record at the offset, or [`None`] if there is no such record.
    pub fn new(store: &'a [u64], offset: usize) -> Option<Self> {
        if RecordKind::at(store, offset)? != RecordKind::Snarl || offset + STRUCTURE_HEADER_SIZE > store.len() {
            return None;
        }
        let result = SnarlRecord { store, offset };
        if offset + snarl_record_size(result.child_count()) > store.len() {
            return None;
        }
        Some(result)
    }

    pub fn child_count(&self) -> usize {
        self.store[self.offset + COUNT] as usize
    }

    /// Returns the offset of the child with the given rank (`1..=child_count`).
    ///
    /// The child is a chain record or a node record.
    pub fn child_offset(&self, rank: usize) -> usize {
        self.store[self.offset + STRUCTURE_HEADER_SIZE + rank - 1] as usize
    }

    /// Returns the rank of the end boundary.
    pub fn end_rank(&self) -> usize {
        self.child_count() + 1
    }

    /// Returns the distance from leaving side `a` to entering side `b`, excluding the lengths of both.
    pub fn distance(&self, a: usize, b: usize) -> usize {
        let base = self.offset + STRUCTURE_HEADER_SIZE + self.child_count();
        decode_distance(self.store[base + matrix_index(a, b)])
    }
}

impl<'a> StructureRecord for SnarlRecord<'a> {
    fn location(&self) -> (&[u64], usize) {
        (self.store, self.offset)
    }
}

//-----------------------------------------------------------------------------

/// A chain record.
#[derive(Clone, Copy, Debug)]
pub struct ChainRecord<'a> {
    store: &'a [u64],
    offset: usize,
}

impl<'a> ChainRecord<'a> {
    /// Returns the chain record at the offset, or [`None`] if there is no such record.
    pub fn new(store: &'a [u64], offset: usize) -> Option<Self> {
        if RecordKind::at(store, offset)? != RecordKind::Chain || offset + STRUCTURE_HEADER_SIZE > store.len() {
            return None;
        }
        let result = ChainRecord { store, offset };
        if offset + chain_record_size(result.node_count()) > store.len() {
            return None;
        }
        Some(result)
    }

    pub fn node_count(&self) -> usize {
        self.store[self.offset + COUNT] as usize
    }

    fn entry(&self, position: usize, field: usize) -> u64 {
        self.store[self.offset + STRUCTURE_HEADER_SIZE + position * CHAIN_ENTRY_SIZE + field]
    }

    /// Returns the offset of the node record at the given position.
    pub fn node_offset(&self, position: usize) -> usize {
        self.entry(position, ENTRY_NODE) as usize
    }

    /// Returns the distance from the start of the chain to the start of the node at the given position.
    pub fn prefix_sum(&self, position: usize) -> usize {
        decode_distance(self.entry(position, ENTRY_PREFIX_SUM))
    }

    /// Returns the distance from leaving the node at the given position to the right to entering it again from the right.
    pub fn forward_loop(&self, position: usize) -> usize {
        decode_distance(self.entry(position, ENTRY_FORWARD_LOOP))
    }

    /// Returns the distance from leaving the node at the given position to the left to entering it again from the left.
    pub fn backward_loop(&self, position: usize) -> usize {
        decode_distance(self.entry(position, ENTRY_BACKWARD_LOOP))
    }

    /// Returns the offset of the snarl after the node at the given position, or `0` if there is no stored snarl.
    pub fn snarl_offset(&self, position: usize) -> usize {
        self.entry(position, ENTRY_SNARL) as usize
    }
}

impl<'a> StructureRecord for ChainRecord<'a> {
    fn location(&self) -> (&[u64], usize) {
        (self.store, self.offset)
    }
}

//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_layout() {
        for children in 0..4 {
            let sides = side_count(children);
            let mut seen = vec![false; matrix_size(sides)];
            for a in 0..sides {
                for b in 0..=a {
                    let index = matrix_index(a, b);
                    assert!(index < seen.len(), "Index {} out of bounds with {} children", index, children);
                    assert!(!seen[index], "Index {} used twice with {} children", index, children);
                    seen[index] = true;
                    assert_eq!(matrix_index(b, a), index, "Matrix index is not symmetric for ({}, {})", a, b);
                }
            }
            assert!(seen.iter().all(|x| *x), "Unused matrix cells with {} children", children);
        }
    }

    #[test]
    fn distance_words() {
        assert_eq!(decode_distance(encode_distance(UNREACHABLE)), UNREACHABLE, "Unreachable was not preserved");
        assert_eq!(encode_distance(UNREACHABLE), u64::MAX, "Wrong stored value for unreachable");
        assert_eq!(decode_distance(encode_distance(1234)), 1234, "Finite distance was not preserved");
    }

    #[test]
    fn record_views() {
        // Root with node range 5..=6 and one component, followed by two node records.
        let mut store: Vec<u64> = vec![ROOT_TAG, 1, 5, 2, 7, 13, 7];
        store.extend_from_slice(&[NODE_TAG, 5, 10, 0, 0, 1]);
        store.extend_from_slice(&[NODE_TAG, 6, 20, 0, 1, 0]);

        let root = RootRecord::new(&store);
        assert!(root.is_some(), "Failed to find the root");
        let root = root.unwrap();
        assert_eq!(root.component_count(), 1, "Wrong component count");
        assert_eq!(root.node_offset(5), Some(7), "Wrong offset for node 5");
        assert_eq!(root.node_offset(6), Some(13), "Wrong offset for node 6");
        assert_eq!(root.node_offset(7), None, "Found a node past the range");
        assert_eq!(root.component_offset(0), 7, "Wrong component offset");

        let node = NodeRecord::new(&store, 7).unwrap();
        assert_eq!(node.node_id(), 5, "Wrong node id");
        assert_eq!(node.length(), 10, "Wrong node length");
        assert!(node.is_reversed(), "Node should be reversed");
        assert!(NodeRecord::new(&store, 8).is_none(), "Found a node record at an invalid offset");
        assert!(SnarlRecord::new(&store, 7).is_none(), "A node record was accepted as a snarl");
        assert!(ChainRecord::new(&store, 7).is_none(), "A node record was accepted as a chain");
    }
}

//-----------------------------------------------------------------------------
