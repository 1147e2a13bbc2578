//! Snarl decomposition as a stream of boundary events.
//!
//! The decomposition is produced by an external tool that walks the snarl tree depth-first.
//! Each chain is reported as a [`DecompositionEvent::ChainStart`], the snarls in the chain, and a [`DecompositionEvent::ChainEnd`].
//! Each snarl is reported as a [`DecompositionEvent::SnarlStart`], the chains inside it, and a [`DecompositionEvent::SnarlEnd`].
//!
//! Every event carries a handle to a boundary node, oriented in the direction of the traversal.
//! A chain starts at the start handle of its first node and ends at the end handle of its last node.
//! A snarl starts at the last node of the enclosing chain and ends at the next node of the chain.
//!
//! ### Text format
//!
//! One event per line: a two-letter code (`CS`, `CE`, `SS`, `SE`) followed by an oriented node (`>12` or `<12`).
//! Empty lines and lines starting with `#` are ignored.
//!
//! ```text
//! # A single snarl between nodes 1 and 4.
//! CS >1
//! SS >1
//! CS >2
//! CE >2
//! SE >4
//! CE >4
//! ```

use crate::utils;

use std::fmt::Display;
use std::io::BufRead;
use std::path::Path;

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// A boundary event in a depth-first traversal of the snarl decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecompositionEvent {
    ChainStart(usize),
    ChainEnd(usize),
    SnarlStart(usize),
    SnarlEnd(usize),
}

impl DecompositionEvent {
    /// Returns the boundary handle of the event.
    pub fn handle(&self) -> usize {
        match self {
            DecompositionEvent::ChainStart(handle) => *handle,
            DecompositionEvent::ChainEnd(handle) => *handle,
            DecompositionEvent::SnarlStart(handle) => *handle,
            DecompositionEvent::SnarlEnd(handle) => *handle,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            DecompositionEvent::ChainStart(_) => "CS",
            DecompositionEvent::ChainEnd(_) => "CE",
            DecompositionEvent::SnarlStart(_) => "SS",
            DecompositionEvent::SnarlEnd(_) => "SE",
        }
    }

    /// Parses an event from a line in the text format.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut fields = line.split_whitespace();
        let code = fields.next().ok_or(String::from("Empty event"))?;
        let handle = fields.next().ok_or(format!("Missing node in event {}", line))?;
        if fields.next().is_some() {
            return Err(format!("Too many fields in event {}", line));
        }
        let handle = utils::parse_handle(handle)?;
        match code {
            "CS" => Ok(DecompositionEvent::ChainStart(handle)),
            "CE" => Ok(DecompositionEvent::ChainEnd(handle)),
            "SS" => Ok(DecompositionEvent::SnarlStart(handle)),
            "SE" => Ok(DecompositionEvent::SnarlEnd(handle)),
            _ => Err(format!("Invalid event type: {}", code)),
        }
    }
}

impl Display for DecompositionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code(), utils::handle_to_string(self.handle()))
    }
}

//-----------------------------------------------------------------------------

/// A replayable snarl decomposition.
///
/// # Examples
///
/// ```
/// use snarl_distance::{Decomposition, DecompositionEvent};
/// use snarl_distance::utils;
///
/// let text = "CS >1\nSS >1\nSE >2\nCE >2\n";
/// let decomposition = Decomposition::parse(text.as_bytes()).unwrap();
/// assert_eq!(decomposition.len(), 4);
/// assert_eq!(decomposition.events()[1], DecompositionEvent::SnarlStart(utils::oriented_handle(1, false)));
/// assert_eq!(decomposition.to_string(), text);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Decomposition {
    events: Vec<DecompositionEvent>,
}

impl Decomposition {
    /// Creates an empty decomposition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the decomposition.
    pub fn push(&mut self, event: DecompositionEvent) {
        self.events.push(event);
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if there are no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the events in order.
    pub fn events(&self) -> &[DecompositionEvent] {
        &self.events
    }

    /// Returns an iterator over the events.
    pub fn iter(&self) -> impl Iterator<Item = DecompositionEvent> + '_ {
        self.events.iter().copied()
    }

    /// Parses a decomposition in the text format.
    ///
    /// Errors report the line number.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, String> {
        let mut result = Decomposition::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|x| format!("Failed to read line {}: {}", line_num + 1, x))?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let event = DecompositionEvent::parse(line).map_err(|x| format!("Line {}: {}", line_num + 1, x))?;
            result.push(event);
        }
        Ok(result)
    }

    /// Loads a decomposition from a file in the text format.
    ///
    /// The file may be gzip-compressed.
    pub fn load_from<P: AsRef<Path>>(filename: P) -> Result<Self, String> {
        let reader = utils::open_file(&filename)?;
        Self::parse(reader).map_err(|x| format!("{}: {}", filename.as_ref().display(), x))
    }
}

impl From<Vec<DecompositionEvent>> for Decomposition {
    fn from(events: Vec<DecompositionEvent>) -> Self {
        Decomposition { events }
    }
}

impl IntoIterator for Decomposition {
    type Item = DecompositionEvent;
    type IntoIter = std::vec::IntoIter<DecompositionEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl Display for Decomposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in self.events.iter() {
            writeln!(f, "{}", event)?;
        }
        Ok(())
    }
}

//-----------------------------------------------------------------------------
