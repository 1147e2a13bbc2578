//! The snarl distance index and its navigation interface.

use crate::{Decomposition, NetHandle, SequenceGraph, TemporaryIndex};
use crate::encoder;
use crate::net_handle::{Connectivity, Endpoint, HandleType};
use crate::records::{ChainRecord, NodeRecord, RecordKind, RootRecord, SnarlRecord, StructureRecord};
use crate::utils;

use simple_sds::serialize::Serialize;

use gbwt::support;

use std::io;


//-----------------------------------------------------------------------------

/// A minimum distance index over the snarl decomposition of a bidirected sequence graph.
///
/// The index is a single flat array of records (see [`crate::records`]).
/// Structures in the decomposition are accessed through [`NetHandle`] values.
/// Once built, the index is immutable and does not need the graph, except for [`SnarlDistanceIndex::follow_net_edges`].
///
/// Usage errors, such as asking for the parent of the root or the graph handle of a snarl, panic.
/// Unreachable distances are reported as [`None`] or [`crate::utils::UNREACHABLE`].
///
/// # Examples
///
/// ```
/// use snarl_distance::{Decomposition, SimpleGraph, SnarlDistanceIndex, Position};
/// use snarl_distance::utils;
/// use gbwt::Orientation;
///
/// // A path 1 -> 2 -> 3.
/// let mut graph = SimpleGraph::new();
/// for (id, len) in [(1, 3), (2, 4), (3, 5)] {
///     graph.add_node(id, len).unwrap();
/// }
/// graph.add_edge(utils::oriented_handle(1, false), utils::oriented_handle(2, false)).unwrap();
/// graph.add_edge(utils::oriented_handle(2, false), utils::oriented_handle(3, false)).unwrap();
///
/// let text = "CS >1\nSS >1\nSE >2\nSS >2\nSE >3\nCE >3\n";
/// let decomposition = Decomposition::parse(text.as_bytes()).unwrap();
/// let index = SnarlDistanceIndex::new(&graph, decomposition, false).unwrap();
///
/// let root = index.get_root();
/// let mut components = Vec::new();
/// index.for_each_child(root, |child| {
///     components.push(child);
///     true
/// });
/// assert_eq!(components.len(), 1);
/// assert_eq!(index.min_length(components[0]), Some(12));
///
/// let from = Position::new(1, Orientation::Forward, 0);
/// let to = Position::new(3, Orientation::Forward, 0);
/// assert_eq!(index.minimum_distance(from, to), Some(7));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnarlDistanceIndex {
    store: Vec<u64>,
}

//-----------------------------------------------------------------------------

/// Construction and serialization.
impl SnarlDistanceIndex {
    /// Builds the index from the graph and its snarl decomposition.
    ///
    /// Returns an error if the decomposition is invalid or does not cover the graph.
    /// Prints progress information to stderr if `verbose` is set.
    pub fn new<G: SequenceGraph>(graph: &G, decomposition: Decomposition, verbose: bool) -> Result<Self, String> {
        let index = TemporaryIndex::new(graph, decomposition, verbose)?;
        Self::from_temporary(graph, &[index], verbose)
    }

    /// Builds the index by merging temporary indexes, such as one per connected component.
    ///
    /// Returns an error if the indexes share nodes or do not cover the graph.
    pub fn from_temporary<G: SequenceGraph>(graph: &G, indexes: &[TemporaryIndex], verbose: bool) -> Result<Self, String> {
        let store = encoder::encode(graph, indexes, verbose)?;
        Self::from_store(store)
    }

    /// Creates the index from a record store.
    ///
    /// Returns an error if the store does not start with a valid root record.
    pub fn from_store(store: Vec<u64>) -> Result<Self, String> {
        if RootRecord::new(&store).is_none() {
            return Err(String::from("The record store does not start with a valid root record"));
        }
        Ok(SnarlDistanceIndex { store })
    }

    /// Returns the flat record store.
    pub fn store(&self) -> &[u64] {
        &self.store
    }

    const MAGIC: u64 = 0x5853_4944_4C52_4E53; // "SNRLDISX"
}

impl Serialize for SnarlDistanceIndex {
    fn serialize_header<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        writer.write_all(&Self::MAGIC.to_le_bytes())
    }

    fn serialize_body<T: io::Write>(&self, writer: &mut T) -> io::Result<()> {
        self.store.serialize(writer)
    }

    fn load<T: io::Read>(reader: &mut T) -> io::Result<Self> {
        let mut magic = [0; 8];
        reader.read_exact(&mut magic)?;
        if u64::from_le_bytes(magic) != Self::MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "SnarlDistanceIndex: invalid magic number"));
        }
        let store = Vec::<u64>::load(reader)?;
        Self::from_store(store).map_err(|x| io::Error::new(io::ErrorKind::InvalidData, x))
    }

    fn size_in_elements(&self) -> usize {
        1 + self.store.size_in_elements()
    }
}

//-----------------------------------------------------------------------------

// Record access. These panic if the offset does not contain the expected record.
impl SnarlDistanceIndex {
    pub(crate) fn root_record(&self) -> RootRecord<'_> {
        RootRecord::new(&self.store).unwrap_or_else(|| panic!("Missing root record"))
    }

    pub(crate) fn node_record(&self, offset: usize) -> NodeRecord<'_> {
        NodeRecord::new(&self.store, offset).unwrap_or_else(|| panic!("No node record at offset {}", offset))
    }

    pub(crate) fn snarl_record(&self, offset: usize) -> SnarlRecord<'_> {
        SnarlRecord::new(&self.store, offset).unwrap_or_else(|| panic!("No snarl record at offset {}", offset))
    }

    pub(crate) fn chain_record(&self, offset: usize) -> ChainRecord<'_> {
        ChainRecord::new(&self.store, offset).unwrap_or_else(|| panic!("No chain record at offset {}", offset))
    }

    pub(crate) fn record_kind(&self, offset: usize) -> RecordKind {
        RecordKind::at(&self.store, offset).unwrap_or_else(|| panic!("No record at offset {}", offset))
    }

    // Returns the parent offset of a node, snarl, or chain record.
    fn parent_offset(&self, offset: usize) -> usize {
        match self.record_kind(offset) {
            RecordKind::Root => panic!("The root has no parent"),
            RecordKind::Node => self.node_record(offset).parent(),
            RecordKind::Snarl => self.snarl_record(offset).parent(),
            RecordKind::Chain => self.chain_record(offset).parent(),
        }
    }

    // Start and end handles of a chain; a node record is a single-node chain.
    pub(crate) fn chain_bounds(&self, offset: usize) -> (usize, usize) {
        if self.record_kind(offset) == RecordKind::Node {
            let node = self.node_record(offset);
            let handle = utils::oriented_handle(node.node_id(), node.is_reversed());
            (handle, handle)
        } else {
            let chain = self.chain_record(offset);
            (chain.start(), chain.end())
        }
    }

    // Node handle for a node record traversed in chain orientation (or against it).
    fn node_in_chain(&self, offset: usize, forward: bool) -> NetHandle {
        let node = self.node_record(offset);
        let reverse = if forward { node.is_reversed() } else { !node.is_reversed() };
        NetHandle::new(offset, HandleType::Node, if reverse { Connectivity::EndStart } else { Connectivity::StartEnd })
    }
}

//-----------------------------------------------------------------------------

/// Global properties.
impl SnarlDistanceIndex {
    /// Returns the number of connected components.
    pub fn connected_components(&self) -> usize {
        self.root_record().component_count()
    }

    /// Returns the smallest node identifier in the graph.
    pub fn min_node_id(&self) -> usize {
        self.root_record().min_node_id()
    }

    /// Returns the largest node identifier in the graph, or `0` if the graph is empty.
    pub fn max_node_id(&self) -> usize {
        let root = self.root_record();
        if root.node_count() == 0 { 0 } else { root.min_node_id() + root.node_count() - 1 }
    }

    /// Returns `true` if the index contains the node.
    pub fn has_node(&self, node_id: usize) -> bool {
        self.root_record().node_offset(node_id).is_some()
    }
}

//-----------------------------------------------------------------------------

/// Navigation.
impl SnarlDistanceIndex {
    /// Returns the handle to the root.
    pub fn get_root(&self) -> NetHandle {
        NetHandle::new(0, HandleType::Root, Connectivity::StartEnd)
    }

    pub fn is_root(&self, handle: NetHandle) -> bool {
        handle.handle_type() == HandleType::Root
    }

    pub fn is_snarl(&self, handle: NetHandle) -> bool {
        handle.handle_type() == HandleType::Snarl
    }

    /// Returns `true` for chains, including nodes pretending to be single-node chains.
    pub fn is_chain(&self, handle: NetHandle) -> bool {
        handle.handle_type() == HandleType::Chain
    }

    pub fn is_node(&self, handle: NetHandle) -> bool {
        handle.handle_type() == HandleType::Node
    }

    pub fn is_sentinel(&self, handle: NetHandle) -> bool {
        handle.handle_type() == HandleType::Sentinel
    }

    /// Returns `true` if the handle is a chain consisting of a single node without a chain record.
    pub fn is_trivial_chain(&self, handle: NetHandle) -> bool {
        self.is_chain(handle) && self.record_kind(handle.offset()) == RecordKind::Node
    }

    /// Returns the node handle for the given GBWT handle.
    ///
    /// # Panics
    ///
    /// Panics if the index does not contain the node.
    pub fn get_net(&self, handle: usize) -> NetHandle {
        let node_id = support::node_id(handle);
        let offset = self.root_record().node_offset(node_id).unwrap_or_else(|| {
            panic!("The index does not contain node {}", node_id)
        });
        let connectivity = if utils::is_reverse(handle) { Connectivity::EndStart } else { Connectivity::StartEnd };
        NetHandle::new(offset, HandleType::Node, connectivity)
    }

    /// Returns the GBWT handle for the node handle.
    ///
    /// A node traversed from end to start is in reverse orientation.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not a node.
    pub fn get_handle(&self, net: NetHandle) -> usize {
        if !self.is_node(net) {
            panic!("Cannot get a graph handle for {}", net);
        }
        let node = self.node_record(net.offset());
        utils::oriented_handle(node.node_id(), net.starts_at() == Endpoint::End)
    }

    /// Returns the structural parent of the handle.
    ///
    /// The parent is returned in start-to-end orientation.
    /// A node that is a child of a snarl or the root is reported as a single-node chain with the same orientation relative to its parent.
    /// The parent of a sentinel is its snarl.
    ///
    /// # Panics
    ///
    /// Panics if the handle is the root.
    pub fn get_parent(&self, handle: NetHandle) -> NetHandle {
        match handle.handle_type() {
            HandleType::Root => panic!("The root has no parent"),
            HandleType::Sentinel => handle.with(HandleType::Snarl, Connectivity::StartEnd),
            HandleType::Node => {
                let node = self.node_record(handle.offset());
                if node.parent() != 0 && self.record_kind(node.parent()) == RecordKind::Chain {
                    NetHandle::new(node.parent(), HandleType::Chain, Connectivity::StartEnd)
                } else {
                    let connectivity = if node.is_reversed() { handle.connectivity().reverse() } else { handle.connectivity() };
                    handle.with(HandleType::Chain, connectivity)
                }
            },
            HandleType::Chain | HandleType::Snarl => {
                let parent = self.parent_offset(handle.offset());
                match self.record_kind(parent) {
                    RecordKind::Root => self.get_root(),
                    RecordKind::Snarl => NetHandle::new(parent, HandleType::Snarl, Connectivity::StartEnd),
                    RecordKind::Chain => NetHandle::new(parent, HandleType::Chain, Connectivity::StartEnd),
                    RecordKind::Node => panic!("Record at offset {} has a node as its parent", handle.offset()),
                }
            },
        }
    }

    /// Returns a boundary of a chain or a snarl.
    ///
    /// For a chain, the boundary is the first or the last node, oriented into or out of the chain.
    /// For a snarl, the boundary is a sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not a chain or a snarl.
    pub fn get_bound(&self, handle: NetHandle, get_end: bool, face_in: bool) -> NetHandle {
        match handle.handle_type() {
            HandleType::Chain => {
                let (start, end) = self.chain_bounds(handle.offset());
                let bound = match (get_end, face_in) {
                    (false, true) => start,
                    (false, false) => utils::flip_handle(start),
                    (true, true) => utils::flip_handle(end),
                    (true, false) => end,
                };
                self.get_net(bound)
            },
            HandleType::Snarl => {
                let connectivity = match (get_end, face_in) {
                    (false, true) => Connectivity::StartEnd,
                    (false, false) => Connectivity::StartStart,
                    (true, true) => Connectivity::EndStart,
                    (true, false) => Connectivity::EndEnd,
                };
                handle.with(HandleType::Sentinel, connectivity)
            },
            _ => panic!("Cannot get the bounds of {}", handle),
        }
    }

    /// Returns the same structure traversed in the other direction.
    ///
    /// A sentinel changes between facing into and out of its snarl.
    pub fn flip(&self, handle: NetHandle) -> NetHandle {
        handle.flip()
    }

    /// Returns `true` if the structure can be traversed with the given connectivity.
    pub fn has_connectivity(&self, handle: NetHandle, connectivity: Connectivity) -> bool {
        match handle.handle_type() {
            HandleType::Root => false,
            HandleType::Sentinel => handle.connectivity() == connectivity,
            HandleType::Node => connectivity == Connectivity::StartEnd || connectivity == Connectivity::EndStart,
            HandleType::Chain => {
                if self.is_trivial_chain(handle) {
                    connectivity == Connectivity::StartEnd || connectivity == Connectivity::EndStart
                } else {
                    connectivity.is_in(self.chain_record(handle.offset()).connectivity())
                }
            },
            HandleType::Snarl => connectivity.is_in(self.snarl_record(handle.offset()).connectivity()),
        }
    }

    /// Returns the handle with the first connectivity the structure supports.
    ///
    /// The connectivities are tried in the order of [`Connectivity::CANONICAL_ORDER`].
    /// If none of them is supported, the handle is returned with [`Connectivity::StartEnd`].
    /// Sentinels are returned unchanged.
    pub fn canonical(&self, handle: NetHandle) -> NetHandle {
        if self.is_sentinel(handle) {
            return handle;
        }
        for connectivity in Connectivity::CANONICAL_ORDER {
            if self.has_connectivity(handle, connectivity) {
                return handle.with_connectivity(connectivity);
            }
        }
        handle.with_connectivity(Connectivity::StartEnd)
    }

    /// Calls `iteratee` with each child of the structure in order.
    ///
    /// Children of the root and snarls are chains.
    /// Children of a chain are its nodes and the snarls between them, in chain orientation.
    /// Snarls without internal structure are not stored and therefore not reported.
    /// Stops early and returns `false` if `iteratee` returns `false`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is a node or a sentinel.
    pub fn for_each_child<F: FnMut(NetHandle) -> bool>(&self, handle: NetHandle, mut iteratee: F) -> bool {
        match handle.handle_type() {
            HandleType::Root => {
                let root = self.root_record();
                for component in 0..root.component_count() {
                    let child = NetHandle::new(root.component_offset(component), HandleType::Chain, Connectivity::StartEnd);
                    if !iteratee(child) {
                        return false;
                    }
                }
            },
            HandleType::Snarl => {
                let snarl = self.snarl_record(handle.offset());
                for rank in 1..=snarl.child_count() {
                    let child = NetHandle::new(snarl.child_offset(rank), HandleType::Chain, Connectivity::StartEnd);
                    if !iteratee(child) {
                        return false;
                    }
                }
            },
            HandleType::Chain => {
                if self.is_trivial_chain(handle) {
                    return iteratee(self.node_in_chain(handle.offset(), true));
                }
                let chain = self.chain_record(handle.offset());
                for position in 0..chain.node_count() {
                    if !iteratee(self.node_in_chain(chain.node_offset(position), true)) {
                        return false;
                    }
                    let snarl = chain.snarl_offset(position);
                    if snarl != 0 && !iteratee(NetHandle::new(snarl, HandleType::Snarl, Connectivity::StartEnd)) {
                        return false;
                    }
                }
            },
            _ => panic!("{} has no children", handle),
        }
        true
    }

    /// Calls `iteratee` with the handle in every connectivity the structure supports.
    ///
    /// A sentinel is reported as both boundaries of its snarl facing into the snarl.
    /// Stops early and returns `false` if `iteratee` returns `false`.
    pub fn for_each_traversal<F: FnMut(NetHandle) -> bool>(&self, handle: NetHandle, mut iteratee: F) -> bool {
        if self.is_sentinel(handle) {
            let snarl = self.get_parent(handle);
            return iteratee(self.get_bound(snarl, false, true)) && iteratee(self.get_bound(snarl, true, true));
        }
        for connectivity in Connectivity::ALL {
            if self.has_connectivity(handle, connectivity) && !iteratee(handle.with_connectivity(connectivity)) {
                return false;
            }
        }
        true
    }

    /// Calls `iteratee` with the net graph neighbors of the handle.
    ///
    /// Chains and sentinels inside a snarl follow the edges of the graph from the end of the traversal.
    /// Each node reached is reported as the child of the snarl containing it or as a sentinel facing out of the snarl.
    /// Nodes and snarls inside a chain step to the next child of the chain.
    /// Structures at the root level have no neighbors.
    ///
    /// If `go_left` is set, follows the edges from the start of the traversal instead.
    /// The neighbors are then reported in the orientation that leads into the handle.
    ///
    /// Stops early and returns `false` if `iteratee` returns `false`.
    pub fn follow_net_edges<G: SequenceGraph, F: FnMut(NetHandle) -> bool>(&self, graph: &G, handle: NetHandle, go_left: bool, mut iteratee: F) -> bool {
        let here = if go_left { handle.flip() } else { handle };
        let mut report = |next: NetHandle| iteratee(if go_left { next.flip() } else { next });

        match handle.handle_type() {
            HandleType::Root => true,
            HandleType::Sentinel => {
                let snarl = self.snarl_record(handle.offset());
                let leaving = match here.connectivity() {
                    Connectivity::StartEnd => snarl.start(),
                    Connectivity::EndStart => utils::flip_handle(snarl.end()),
                    _ => return true,
                };
                self.follow_into_snarl(graph, handle.offset(), leaving, &mut report)
            },
            HandleType::Node | HandleType::Snarl if self.in_chain_record(handle) => {
                match self.next_in_chain(here) {
                    Some(next) => report(next),
                    None => true,
                }
            },
            _ => {
                let chain = if self.is_node(here) { self.get_parent(here) } else { here };
                let parent = self.get_parent(chain);
                if self.is_root(parent) {
                    return true;
                }
                let (start, end) = self.chain_bounds(chain.offset());
                let leaving = match chain.ends_at() {
                    Endpoint::End => end,
                    Endpoint::Start => utils::flip_handle(start),
                    Endpoint::Tip => return true,
                };
                self.follow_into_snarl(graph, parent.offset(), leaving, &mut report)
            },
        }
    }

    // Nodes and snarls stored in a chain record step along the chain.
    fn in_chain_record(&self, handle: NetHandle) -> bool {
        let parent = match handle.handle_type() {
            HandleType::Node => self.node_record(handle.offset()).parent(),
            HandleType::Snarl => self.snarl_record(handle.offset()).parent(),
            _ => return false,
        };
        parent != 0 && self.record_kind(parent) == RecordKind::Chain
    }

    // Follows the graph edges from the leaving handle and reports what they enter in the snarl.
    fn follow_into_snarl<G: SequenceGraph, F: FnMut(NetHandle) -> bool>(&self, graph: &G, snarl: usize, leaving: usize, report: &mut F) -> bool {
        let mut reached = Vec::new();
        graph.follow_edges(leaving, false, |next| {
            reached.push(next);
            true
        });
        for next in reached {
            if let Some(net) = self.snarl_net_handle(snarl, next) {
                if !report(net) {
                    return false;
                }
            }
        }
        true
    }

    // Maps a handle entering the snarl to the child of the snarl or a sentinel facing out.
    fn snarl_net_handle(&self, snarl: usize, handle: usize) -> Option<NetHandle> {
        let record = self.snarl_record(snarl);
        if handle == utils::flip_handle(record.start()) {
            return Some(NetHandle::new(snarl, HandleType::Sentinel, Connectivity::StartStart));
        }
        if handle == record.end() {
            return Some(NetHandle::new(snarl, HandleType::Sentinel, Connectivity::EndEnd));
        }
        let node_id = support::node_id(handle);
        if node_id == support::node_id(record.start()) || node_id == support::node_id(record.end()) {
            return None;
        }

        let mut child = self.root_record().node_offset(node_id)?;
        loop {
            let parent = self.parent_offset(child);
            if parent == snarl {
                break;
            }
            if parent == 0 {
                return None;
            }
            child = parent;
        }
        let (start, end) = self.chain_bounds(child);
        if handle == start {
            Some(NetHandle::new(child, HandleType::Chain, Connectivity::StartEnd))
        } else if handle == utils::flip_handle(end) {
            Some(NetHandle::new(child, HandleType::Chain, Connectivity::EndStart))
        } else {
            None
        }
    }

    // Next child of the parent chain in the direction of the traversal.
    fn next_in_chain(&self, handle: NetHandle) -> Option<NetHandle> {
        let parent = self.get_parent(handle);
        let chain = self.chain_record(parent.offset());
        let last = chain.node_count() - 1;
        match handle.handle_type() {
            HandleType::Node => {
                let node = self.node_record(handle.offset());
                let position = node.rank();
                let reverse = handle.starts_at() == Endpoint::End;
                if reverse == node.is_reversed() {
                    let snarl = chain.snarl_offset(position);
                    if snarl != 0 {
                        Some(NetHandle::new(snarl, HandleType::Snarl, Connectivity::StartEnd))
                    } else if position < last {
                        Some(self.node_in_chain(chain.node_offset(position + 1), true))
                    } else {
                        None
                    }
                } else if position == 0 {
                    None
                } else {
                    let snarl = chain.snarl_offset(position - 1);
                    if snarl != 0 {
                        Some(NetHandle::new(snarl, HandleType::Snarl, Connectivity::EndStart))
                    } else {
                        Some(self.node_in_chain(chain.node_offset(position - 1), false))
                    }
                }
            },
            HandleType::Snarl => {
                let position = self.snarl_record(handle.offset()).rank();
                match handle.ends_at() {
                    Endpoint::End => Some(self.node_in_chain(chain.node_offset(position + 1), true)),
                    Endpoint::Start => Some(self.node_in_chain(chain.node_offset(position), false)),
                    Endpoint::Tip => None,
                }
            },
            _ => None,
        }
    }

    /// Returns the traversal of the common parent from `start` to `end`.
    ///
    /// Two sentinels of the same snarl give a traversal of the snarl between the boundaries.
    /// Otherwise the handles must be children of the same structure.
    /// A child that is a boundary of the parent chain maps to the start or the end.
    /// Snarls in a chain and chains in a snarl are tips.
    ///
    /// # Panics
    ///
    /// Panics if the handles are not siblings or the parent does not support the traversal.
    pub fn get_parent_traversal(&self, start: NetHandle, end: NetHandle) -> NetHandle {
        if self.is_sentinel(start) && self.is_sentinel(end) {
            if start.offset() != end.offset() {
                panic!("Sentinels {} and {} belong to different snarls", start, end);
            }
            let connectivity = Connectivity::new(start.starts_at(), end.starts_at());
            let result = NetHandle::new(start.offset(), HandleType::Snarl, connectivity);
            if !self.has_connectivity(result, connectivity) {
                panic!("Snarl {} does not support connectivity {}", result, connectivity);
            }
            return result;
        }

        let parent = self.get_parent(start);
        let other = self.get_parent(end);
        if parent.offset() != other.offset() || parent.handle_type() != other.handle_type() {
            panic!("{} and {} are not siblings", start, end);
        }

        let from = if self.is_sentinel(start) {
            start.starts_at()
        } else if self.is_chain(parent) && start == self.get_bound(parent, false, true) {
            Endpoint::Start
        } else if self.is_chain(parent) && start == self.get_bound(parent, true, true) {
            Endpoint::End
        } else if self.is_chain(parent) && !self.is_snarl(start) {
            panic!("{} is not a boundary of chain {} in the direction of the traversal", start, parent);
        } else {
            Endpoint::Tip
        };
        let to = if self.is_sentinel(end) {
            end.starts_at()
        } else if self.is_chain(parent) && end == self.get_bound(parent, true, false) {
            Endpoint::End
        } else if self.is_chain(parent) && end == self.get_bound(parent, false, false) {
            Endpoint::Start
        } else if self.is_chain(parent) && !self.is_snarl(end) {
            panic!("{} is not a boundary of chain {} in the direction of the traversal", end, parent);
        } else {
            Endpoint::Tip
        };

        let connectivity = Connectivity::new(from, to);
        let result = parent.with_connectivity(connectivity);
        if !self.has_connectivity(result, connectivity) {
            panic!("{} does not support connectivity {}", parent, connectivity);
        }
        result
    }
}

//-----------------------------------------------------------------------------

/// Structure properties.
impl SnarlDistanceIndex {
    /// Returns the node identifier for a node or a single-node chain.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not a node or a single-node chain.
    pub fn node_id(&self, handle: NetHandle) -> usize {
        self.node_record(handle.offset()).node_id()
    }

    /// Returns the sequence length of a node or a single-node chain.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not a node or a single-node chain.
    pub fn node_length(&self, handle: NetHandle) -> usize {
        self.node_record(handle.offset()).length()
    }

    /// Returns the minimum length of a traversal from start to end, or [`None`] if there is no such traversal.
    ///
    /// The length of a chain includes its boundary nodes, while the length of a snarl does not.
    ///
    /// # Panics
    ///
    /// Panics if the handle is the root or a sentinel.
    pub fn min_length(&self, handle: NetHandle) -> Option<usize> {
        let length = match (handle.handle_type(), self.record_kind(handle.offset())) {
            (HandleType::Node, _) | (HandleType::Chain, RecordKind::Node) => self.node_length(handle),
            (HandleType::Chain, _) => self.chain_record(handle.offset()).min_length(),
            (HandleType::Snarl, _) => self.snarl_record(handle.offset()).min_length(),
            _ => panic!("{} has no length", handle),
        };
        utils::finite(length)
    }

    /// Returns the maximum length of a traversal from start to end, or [`None`] if it is unbounded.
    ///
    /// # Panics
    ///
    /// Panics if the handle is the root or a sentinel.
    pub fn max_length(&self, handle: NetHandle) -> Option<usize> {
        let length = match (handle.handle_type(), self.record_kind(handle.offset())) {
            (HandleType::Node, _) | (HandleType::Chain, RecordKind::Node) => self.node_length(handle),
            (HandleType::Chain, _) => self.chain_record(handle.offset()).max_length(),
            (HandleType::Snarl, _) => self.snarl_record(handle.offset()).max_length(),
            _ => panic!("{} has no length", handle),
        };
        utils::finite(length)
    }

    /// Returns the rank of the structure in its parent.
    ///
    /// This is the position of a node or a snarl in a chain, the rank (`1..`) of a chain in a snarl, or the number of a connected component.
    ///
    /// # Panics
    ///
    /// Panics if the handle is the root.
    pub fn rank_in_parent(&self, handle: NetHandle) -> usize {
        match self.record_kind(handle.offset()) {
            RecordKind::Root => panic!("The root has no rank"),
            RecordKind::Node => self.node_record(handle.offset()).rank(),
            RecordKind::Snarl => self.snarl_record(handle.offset()).rank(),
            RecordKind::Chain => self.chain_record(handle.offset()).rank(),
        }
    }

    /// Returns `true` if the traversal of the structure starts at the given endpoint.
    pub fn starts_at(&self, handle: NetHandle, endpoint: Endpoint) -> bool {
        handle.starts_at() == endpoint
    }

    /// Returns `true` if the traversal of the structure ends at the given endpoint.
    pub fn ends_at(&self, handle: NetHandle, endpoint: Endpoint) -> bool {
        handle.ends_at() == endpoint
    }

    /// Returns the distance within a snarl from leaving a side of one child to entering a side of another.
    ///
    /// Rank `0` is the start boundary and rank `child_count + 1` is the end boundary.
    /// Returns [`None`] if the target side is unreachable.
    ///
    /// # Panics
    ///
    /// Panics if the handle is not a snarl.
    pub fn distance_in_snarl(&self, snarl: NetHandle, from: (usize, bool), to: (usize, bool)) -> Option<usize> {
        if !self.is_snarl(snarl) {
            panic!("{} is not a snarl", snarl);
        }
        let record = self.snarl_record(snarl.offset());
        let from = crate::records::side_index(from.0, from.1);
        let to = crate::records::side_index(to.0, to.1);
        utils::finite(record.distance(from, to))
    }
}

//-----------------------------------------------------------------------------
