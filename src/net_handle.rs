//! Net handles: immutable tokens for positions and traversals in the snarl decomposition.
//!
//! A [`NetHandle`] refers to a record in the flat record store of a [`crate::SnarlDistanceIndex`] by its offset.
//! It also carries the structural type of the record and a [`Connectivity`], which tells how the structure is traversed.
//! The in-memory representation is a plain struct.
//! The packed single-word form from [`NetHandle::pack`] is only used when handles have to be stored as integers.

use std::fmt::Display;


//-----------------------------------------------------------------------------

/// Structural type of a [`NetHandle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandleType {
    /// The root of the decomposition.
    Root,
    /// A graph node.
    Node,
    /// A snarl.
    Snarl,
    /// A chain, possibly a node pretending to be a single-node chain.
    Chain,
    /// A boundary node of a snarl, seen from inside the snarl.
    Sentinel,
}

impl HandleType {
    const ALL: [HandleType; 5] = [HandleType::Root, HandleType::Node, HandleType::Snarl, HandleType::Chain, HandleType::Sentinel];

    fn code(self) -> u64 {
        match self {
            HandleType::Root => 0,
            HandleType::Node => 1,
            HandleType::Snarl => 2,
            HandleType::Chain => 3,
            HandleType::Sentinel => 4,
        }
    }

    fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }
}

impl Display for HandleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HandleType::Root => "root",
            HandleType::Node => "node",
            HandleType::Snarl => "snarl",
            HandleType::Chain => "chain",
            HandleType::Sentinel => "sentinel",
        };
        write!(f, "{}", name)
    }
}

//-----------------------------------------------------------------------------

/// An endpoint of a traversal: the start or the end boundary of a structure, or a tip inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Endpoint {
    Start,
    End,
    Tip,
}

impl Endpoint {
    /// Returns the opposite boundary, or [`Endpoint::Tip`] for a tip.
    pub fn opposite(self) -> Self {
        match self {
            Endpoint::Start => Endpoint::End,
            Endpoint::End => Endpoint::Start,
            Endpoint::Tip => Endpoint::Tip,
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Endpoint::Start => "start",
            Endpoint::End => "end",
            Endpoint::Tip => "tip",
        };
        write!(f, "{}", name)
    }
}

//-----------------------------------------------------------------------------

/// A traversal of a structure from one [`Endpoint`] to another.
///
/// Snarl and chain records store the supported connectivities as a bitmask with one bit per variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Connectivity {
    StartStart,
    StartEnd,
    StartTip,
    EndStart,
    EndEnd,
    EndTip,
    TipStart,
    TipEnd,
    TipTip,
}

impl Connectivity {
    /// All connectivities in bitmask order.
    pub const ALL: [Connectivity; 9] = [
        Connectivity::StartStart, Connectivity::StartEnd, Connectivity::StartTip,
        Connectivity::EndStart, Connectivity::EndEnd, Connectivity::EndTip,
        Connectivity::TipStart, Connectivity::TipEnd, Connectivity::TipTip,
    ];

    /// Connectivities in the order [`crate::SnarlDistanceIndex::canonical`] tries them.
    pub const CANONICAL_ORDER: [Connectivity; 6] = [
        Connectivity::StartEnd, Connectivity::StartTip, Connectivity::EndTip,
        Connectivity::StartStart, Connectivity::EndEnd, Connectivity::TipTip,
    ];

    /// Creates a connectivity from the given endpoints.
    pub fn new(from: Endpoint, to: Endpoint) -> Self {
        match (from, to) {
            (Endpoint::Start, Endpoint::Start) => Connectivity::StartStart,
            (Endpoint::Start, Endpoint::End) => Connectivity::StartEnd,
            (Endpoint::Start, Endpoint::Tip) => Connectivity::StartTip,
            (Endpoint::End, Endpoint::Start) => Connectivity::EndStart,
            (Endpoint::End, Endpoint::End) => Connectivity::EndEnd,
            (Endpoint::End, Endpoint::Tip) => Connectivity::EndTip,
            (Endpoint::Tip, Endpoint::Start) => Connectivity::TipStart,
            (Endpoint::Tip, Endpoint::End) => Connectivity::TipEnd,
            (Endpoint::Tip, Endpoint::Tip) => Connectivity::TipTip,
        }
    }

    /// Returns the endpoint where the traversal starts.
    pub fn start(self) -> Endpoint {
        self.endpoints().0
    }

    /// Returns the endpoint where the traversal ends.
    pub fn end(self) -> Endpoint {
        self.endpoints().1
    }

    /// Returns the endpoints of the traversal as (start, end).
    pub fn endpoints(self) -> (Endpoint, Endpoint) {
        match self {
            Connectivity::StartStart => (Endpoint::Start, Endpoint::Start),
            Connectivity::StartEnd => (Endpoint::Start, Endpoint::End),
            Connectivity::StartTip => (Endpoint::Start, Endpoint::Tip),
            Connectivity::EndStart => (Endpoint::End, Endpoint::Start),
            Connectivity::EndEnd => (Endpoint::End, Endpoint::End),
            Connectivity::EndTip => (Endpoint::End, Endpoint::Tip),
            Connectivity::TipStart => (Endpoint::Tip, Endpoint::Start),
            Connectivity::TipEnd => (Endpoint::Tip, Endpoint::End),
            Connectivity::TipTip => (Endpoint::Tip, Endpoint::Tip),
        }
    }

    /// Returns the same traversal in the other direction.
    pub fn reverse(self) -> Self {
        let (from, to) = self.endpoints();
        Self::new(to, from)
    }

    /// Returns the bit for this connectivity in a connectivity mask.
    pub fn bit(self) -> u64 {
        1 << self.code()
    }

    /// Returns `true` if the mask contains this connectivity.
    pub fn is_in(self, mask: u64) -> bool {
        mask & self.bit() != 0
    }

    fn code(self) -> u64 {
        match self {
            Connectivity::StartStart => 0,
            Connectivity::StartEnd => 1,
            Connectivity::StartTip => 2,
            Connectivity::EndStart => 3,
            Connectivity::EndEnd => 4,
            Connectivity::EndTip => 5,
            Connectivity::TipStart => 6,
            Connectivity::TipEnd => 7,
            Connectivity::TipTip => 8,
        }
    }

    fn from_code(code: u64) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }
}

impl Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}

/// Returns a connectivity mask closed under reversal.
pub fn symmetric_mask(mask: u64) -> u64 {
    let mut result = mask;
    for connectivity in Connectivity::ALL {
        if connectivity.is_in(mask) {
            result |= connectivity.reverse().bit();
        }
    }
    result
}

//-----------------------------------------------------------------------------

/// A handle to a structure in the snarl decomposition.
///
/// Two handles are equal if they refer to the same record with the same type and connectivity.
///
/// For sentinels, the first endpoint of the connectivity names the boundary.
/// The second endpoint is the opposite boundary if the sentinel faces into the snarl and the same boundary if it faces out.
///
/// # Examples
///
/// ```
/// use snarl_distance::{NetHandle, HandleType, Connectivity};
///
/// let handle = NetHandle::new(42, HandleType::Chain, Connectivity::StartEnd);
/// assert_eq!(handle.offset(), 42);
/// assert_eq!(handle.flip().connectivity(), Connectivity::EndStart);
/// assert_eq!(NetHandle::unpack(handle.pack()), Some(handle));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetHandle {
    offset: usize,
    handle_type: HandleType,
    connectivity: Connectivity,
}

impl NetHandle {
    const TYPE_BITS: usize = 4;
    const CONNECTIVITY_BITS: usize = 4;
    const OFFSET_SHIFT: usize = Self::TYPE_BITS + Self::CONNECTIVITY_BITS;

    /// Creates a new handle.
    pub fn new(offset: usize, handle_type: HandleType, connectivity: Connectivity) -> Self {
        NetHandle { offset, handle_type, connectivity }
    }

    /// Returns the offset of the record in the record store.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the structural type of the handle.
    pub fn handle_type(&self) -> HandleType {
        self.handle_type
    }

    /// Returns the connectivity of the handle.
    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Returns a handle to the same record with the given type and connectivity.
    pub fn with(&self, handle_type: HandleType, connectivity: Connectivity) -> Self {
        NetHandle::new(self.offset, handle_type, connectivity)
    }

    /// Returns a handle to the same record with the given connectivity.
    pub fn with_connectivity(&self, connectivity: Connectivity) -> Self {
        NetHandle::new(self.offset, self.handle_type, connectivity)
    }

    /// Returns the endpoint where the traversal starts.
    pub fn starts_at(&self) -> Endpoint {
        self.connectivity.start()
    }

    /// Returns the endpoint where the traversal ends.
    pub fn ends_at(&self) -> Endpoint {
        self.connectivity.end()
    }

    /// Returns the same structure traversed in the other direction.
    ///
    /// A sentinel keeps its boundary and changes the facing instead.
    pub fn flip(&self) -> Self {
        if self.handle_type == HandleType::Sentinel {
            let (bound, other) = self.connectivity.endpoints();
            let other = if other == bound { bound.opposite() } else { bound };
            return self.with_connectivity(Connectivity::new(bound, other));
        }
        self.with_connectivity(self.connectivity.reverse())
    }

    /// Returns the packed single-word representation of the handle.
    pub fn pack(&self) -> u64 {
        ((self.offset as u64) << Self::OFFSET_SHIFT) | (self.connectivity.code() << Self::TYPE_BITS) | self.handle_type.code()
    }

    /// Unpacks a handle from the representation returned by [`NetHandle::pack`].
    ///
    /// Returns [`None`] if the value does not encode a handle.
    pub fn unpack(value: u64) -> Option<Self> {
        let handle_type = HandleType::from_code(value & ((1 << Self::TYPE_BITS) - 1))?;
        let connectivity = Connectivity::from_code((value >> Self::TYPE_BITS) & ((1 << Self::CONNECTIVITY_BITS) - 1))?;
        let offset = (value >> Self::OFFSET_SHIFT) as usize;
        Some(NetHandle::new(offset, handle_type, connectivity))
    }
}

impl Display for NetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} ({})", self.handle_type, self.offset, self.connectivity)
    }
}

//-----------------------------------------------------------------------------
