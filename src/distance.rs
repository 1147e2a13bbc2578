//! Minimum distance queries between graph positions.
//!
//! A query climbs the snarl tree from both positions.
//! At each level it records the distances from the position to the two sides of the current child in its parent.
//! The target position is reversed, so that both climbs measure distances away from the position.
//! The two climbs are then combined at every common ancestor using the chain arrays or the snarl distance matrix.

use crate::SnarlDistanceIndex;
use crate::records::{side_index, ChainRecord, RecordKind, StructureRecord};
use crate::utils::{self, UNREACHABLE, add_distance};

use gbwt::Orientation;

use std::fmt::Display;


//-----------------------------------------------------------------------------

/// A position in the graph: an offset on an oriented node.
///
/// The offset is measured from the start of the node in the given orientation, and it can be between `0` and the node length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub node: usize,
    pub orientation: Orientation,
    pub offset: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(node: usize, orientation: Orientation, offset: usize) -> Self {
        Position { node, orientation, offset }
    }

    /// Returns the same position on the other strand of a node of length `len`.
    pub fn reverse(&self, len: usize) -> Self {
        Position::new(self.node, utils::flip_orientation(self.orientation), len - self.offset)
    }

    /// Returns the GBWT handle for the oriented node.
    pub fn handle(&self) -> usize {
        gbwt::support::encode_node(self.node, self.orientation)
    }

    /// Parses a position of the form `>12:3` or `<15:0`.
    pub fn parse(value: &str) -> Result<Self, String> {
        let (handle, offset) = value.split_once(':').ok_or(format!("Missing offset in position {}", value))?;
        let handle = utils::parse_handle(handle)?;
        let offset = offset.parse::<usize>().map_err(|x| format!("Invalid offset in position {}: {}", value, x))?;
        Ok(Position::new(gbwt::support::node_id(handle), gbwt::support::node_orientation(handle), offset))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", utils::handle_to_string(self.handle()), self.offset)
    }
}

//-----------------------------------------------------------------------------

// The child of a structure on the path from a position to the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Child {
    // Node at this position in a chain.
    Node(usize),
    // Snarl after the node at this position in a chain.
    Snarl(usize),
    // Chain or node with this rank in a snarl or the root.
    Chain(usize),
}

// Distances from a position to the left and right sides of a child in its parent.
// Sides are in the orientation the parent traverses the child.
#[derive(Clone, Copy, Debug)]
struct Level {
    parent: usize,
    child_offset: usize,
    child: Child,
    left: usize,
    right: usize,
}

// Reaching node side (position, right) of a chain.
// An outward entry has left the node through that side, while an inward entry is about to enter the node through it.
#[derive(Clone, Copy, Debug)]
struct ChainEntry {
    position: usize,
    right: bool,
    distance: usize,
}

//-----------------------------------------------------------------------------

/// Distance queries.
impl SnarlDistanceIndex {
    /// Returns the minimum distance from `from` to `to`, or [`None`] if `to` is not reachable.
    ///
    /// The distance is the number of bases walked from `from` in its orientation until reaching `to` in its orientation.
    /// On the same oriented node, the distance from offset `i` to offset `j >= i` is at most `j - i`.
    ///
    /// # Panics
    ///
    /// Panics if the index does not contain either node or if an offset is past the end of the node.
    pub fn minimum_distance(&self, from: Position, to: Position) -> Option<usize> {
        let mut best = UNREACHABLE;
        if from.node == to.node && from.orientation == to.orientation && to.offset >= from.offset {
            best = to.offset - from.offset;
        }

        let to_len = self.position_node_length(to);
        let first = self.ascend(from);
        let second = self.ascend(to.reverse(to_len));

        // Combine at every common parent from the root down.
        let (mut i, mut j) = (first.len(), second.len());
        while i > 0 && j > 0 {
            let (a, b) = (&first[i - 1], &second[j - 1]);
            if a.parent != b.parent {
                break;
            }
            best = best.min(self.combine(a, b));
            if a.child_offset != b.child_offset {
                break;
            }
            i -= 1;
            j -= 1;
        }

        utils::finite(best)
    }

    fn position_node_length(&self, position: Position) -> usize {
        let offset = self.root_record().node_offset(position.node).unwrap_or_else(|| {
            panic!("The index does not contain node {}", position.node)
        });
        let length = self.node_record(offset).length();
        if position.offset > length {
            panic!("Offset {} is past the end of node {} of length {}", position.offset, position.node, length);
        }
        length
    }

    // Returns the levels from the node to a child of the root.
    fn ascend(&self, position: Position) -> Vec<Level> {
        let length = self.position_node_length(position);
        let offset = self.root_record().node_offset(position.node).unwrap_or(0);
        let node = self.node_record(offset);

        let along_parent = (position.orientation == Orientation::Reverse) == node.is_reversed();
        let remaining = length - position.offset;
        let (left, right) = if along_parent { (UNREACHABLE, remaining) } else { (remaining, UNREACHABLE) };
        let parent = node.parent();
        let child = if parent != 0 && self.record_kind(parent) == RecordKind::Chain {
            Child::Node(node.rank())
        } else {
            Child::Chain(node.rank())
        };

        let mut result = vec![Level { parent, child_offset: offset, child, left, right }];
        while let Some(&level) = result.last() {
            let next = match self.record_kind(level.parent) {
                RecordKind::Root => break,
                RecordKind::Chain => self.leave_chain(&level),
                RecordKind::Snarl => self.leave_snarl(&level),
                RecordKind::Node => panic!("Node record at offset {} is a parent", level.parent),
            };
            result.push(next);
        }
        result
    }

    // Distances from the position to the sides of the chain containing the child.
    fn leave_chain(&self, level: &Level) -> Level {
        let chain = self.chain_record(level.parent);
        let chain_length = chain.min_length();
        let (mut left, mut right) = (UNREACHABLE, UNREACHABLE);
        for entry in self.outward_entries(&chain, level) {
            let node_length = self.chain_node_length(&chain, entry.position);
            let prefix = chain.prefix_sum(entry.position);
            let suffix = remaining_length(chain_length, prefix, node_length);
            let through = add_distance(entry.distance, node_length);
            if entry.right {
                right = right.min(add_distance(entry.distance, suffix));
                let back = add_distance(through, chain.forward_loop(entry.position));
                left = left.min(add_distance(back, prefix));
            } else {
                left = left.min(add_distance(entry.distance, prefix));
                let back = add_distance(through, chain.backward_loop(entry.position));
                right = right.min(add_distance(back, suffix));
            }
        }
        Level { parent: chain.parent(), child_offset: level.parent, child: Child::Chain(chain.rank()), left, right }
    }

    // Distances from the position to the sides of the snarl containing the child.
    fn leave_snarl(&self, level: &Level) -> Level {
        let snarl = self.snarl_record(level.parent);
        let rank = match level.child {
            Child::Chain(rank) => rank,
            _ => panic!("Invalid child {:?} in snarl at offset {}", level.child, level.parent),
        };
        let exit = |target: usize| {
            let through_left = add_distance(level.left, snarl.distance(side_index(rank, false), target));
            let through_right = add_distance(level.right, snarl.distance(side_index(rank, true), target));
            through_left.min(through_right)
        };
        let left = exit(side_index(0, true));
        let right = exit(side_index(snarl.end_rank(), false));
        Level { parent: snarl.parent(), child_offset: level.parent, child: Child::Snarl(snarl.rank()), left, right }
    }

    fn chain_node_length(&self, chain: &ChainRecord, position: usize) -> usize {
        self.node_record(chain.node_offset(position)).length()
    }

    // Node sides the position leaves through when starting from the child of the chain.
    fn outward_entries(&self, chain: &ChainRecord, level: &Level) -> Vec<ChainEntry> {
        match level.child {
            Child::Node(position) => vec![
                ChainEntry { position, right: false, distance: level.left },
                ChainEntry { position, right: true, distance: level.right },
            ],
            Child::Snarl(position) => {
                let before = add_distance(level.left, self.chain_node_length(chain, position));
                let after = add_distance(level.right, self.chain_node_length(chain, position + 1));
                vec![
                    ChainEntry { position, right: false, distance: before },
                    ChainEntry { position: position + 1, right: true, distance: after },
                ]
            },
            Child::Chain(_) => panic!("Chain {} has a chain as a child", level.parent),
        }
    }

    // Node sides the position enters from a snarl child of the chain.
    fn inward_entries(&self, level: &Level) -> Vec<ChainEntry> {
        match level.child {
            Child::Snarl(position) => vec![
                ChainEntry { position, right: true, distance: level.left },
                ChainEntry { position: position + 1, right: false, distance: level.right },
            ],
            _ => Vec::new(),
        }
    }

    // Combines the levels of the two positions at their common parent.
    fn combine(&self, first: &Level, second: &Level) -> usize {
        match self.record_kind(first.parent) {
            RecordKind::Root | RecordKind::Node => UNREACHABLE,
            RecordKind::Snarl => {
                let snarl = self.snarl_record(first.parent);
                let (Child::Chain(a), Child::Chain(b)) = (first.child, second.child) else {
                    panic!("Invalid children {:?} and {:?} in snarl at offset {}", first.child, second.child, first.parent);
                };
                let mut best = UNREACHABLE;
                for (from_right, from_distance) in [(false, first.left), (true, first.right)] {
                    for (to_right, to_distance) in [(false, second.left), (true, second.right)] {
                        let between = snarl.distance(side_index(a, from_right), side_index(b, to_right));
                        best = best.min(add_distance(add_distance(from_distance, between), to_distance));
                    }
                }
                best
            },
            RecordKind::Chain => {
                let chain = self.chain_record(first.parent);
                let from_out = self.outward_entries(&chain, first);
                let to_out = self.outward_entries(&chain, second);
                let mut best = UNREACHABLE;
                for a in from_out.iter() {
                    for b in to_out.iter() {
                        let between = self.chain_distance(&chain, a, b);
                        best = best.min(add_distance(add_distance(a.distance, between), b.distance));
                    }
                }
                // The path leaves one node side and the other position is behind the same side.
                let matching = |outward: &[ChainEntry], inward: &[ChainEntry]| {
                    let mut result = UNREACHABLE;
                    for a in outward.iter() {
                        for b in inward.iter() {
                            if a.position == b.position && a.right == b.right {
                                result = result.min(add_distance(a.distance, b.distance));
                            }
                        }
                    }
                    result
                };
                best = best.min(matching(from_out.as_slice(), self.inward_entries(second).as_slice()));
                best = best.min(matching(to_out.as_slice(), self.inward_entries(first).as_slice()));
                best
            },
        }
    }

    // Distance from leaving the first node side to entering the second node side, excluding the nodes.
    fn chain_distance(&self, chain: &ChainRecord, from: &ChainEntry, to: &ChainEntry) -> usize {
        // The reverse walk has the same length.
        let (from, to) = if from.position <= to.position { (from, to) } else { (to, from) };
        let from_length = self.chain_node_length(chain, from.position);
        let forward = chain.forward_loop(to.position);
        let backward = chain.backward_loop(from.position);

        if from.position == to.position {
            return match (from.right, to.right) {
                (true, true) => forward,
                (false, false) => backward,
                _ => add_distance(add_distance(forward, from_length), backward),
            };
        }

        let start = add_distance(chain.prefix_sum(from.position), from_length);
        let end = chain.prefix_sum(to.position);
        let between = if start == UNREACHABLE || end == UNREACHABLE { UNREACHABLE } else { end.saturating_sub(start) };
        let to_length = self.chain_node_length(chain, to.position);
        let mut result = between;
        if !from.right {
            result = add_distance(add_distance(backward, from_length), result);
        }
        if to.right {
            result = add_distance(add_distance(result, to_length), forward);
        }
        result
    }
}

// Distance from the right side of a node to the end of the chain.
fn remaining_length(chain_length: usize, prefix: usize, node_length: usize) -> usize {
    let before = add_distance(prefix, node_length);
    if chain_length == UNREACHABLE || before == UNREACHABLE {
        UNREACHABLE
    } else {
        chain_length.saturating_sub(before)
    }
}

//-----------------------------------------------------------------------------
