use super::*;

use crate::internal;

use flate2::Compression;
use flate2::write::GzEncoder;

use simple_sds::serialize;

use std::fs::{self, File};
use std::io::Write;

//-----------------------------------------------------------------------------

#[test]
fn parse_events() {
    let forward = utils::oriented_handle(12, false);
    let reverse = utils::oriented_handle(40, true);
    let truth = [
        ("CS >12", DecompositionEvent::ChainStart(forward)),
        ("CE <40", DecompositionEvent::ChainEnd(reverse)),
        ("SS >12", DecompositionEvent::SnarlStart(forward)),
        ("SE\t<40", DecompositionEvent::SnarlEnd(reverse)),
    ];
    for (line, event) in truth {
        let parsed = DecompositionEvent::parse(line);
        assert_eq!(parsed, Ok(event), "Wrong event for {:?}", line);
        assert_eq!(event.handle(), support_handle(line), "Wrong handle for {:?}", line);
    }
}

fn support_handle(line: &str) -> usize {
    let handle = line.split_whitespace().nth(1).unwrap();
    utils::parse_handle(handle).unwrap()
}

#[test]
fn invalid_events() {
    for line in ["", "CS", "XX >1", "CS 1", "CS >1 >2", "SE <0"] {
        assert!(DecompositionEvent::parse(line).is_err(), "Parsed an invalid event {:?}", line);
    }
}

#[test]
fn comments_and_errors() {
    let text = "# comment\n\nCS >1\n  CE >1  \n";
    let decomposition = Decomposition::parse(text.as_bytes());
    assert!(decomposition.is_ok(), "Failed to parse: {}", decomposition.unwrap_err());
    let decomposition = decomposition.unwrap();
    assert_eq!(decomposition.len(), 2, "Wrong number of events");

    let text = "CS >1\nCE >1\nSS 2\n";
    let result = Decomposition::parse(text.as_bytes());
    assert!(result.is_err(), "Parsed an invalid decomposition");
    assert!(result.unwrap_err().starts_with("Line 3"), "The error does not report the line");
}

#[test]
fn text_round_trip() {
    let (_, decomposition) = internal::nested_graph();
    let text = decomposition.to_string();
    let parsed = Decomposition::parse(text.as_bytes());
    assert_eq!(parsed, Ok(decomposition.clone()), "Text representation does not round-trip");

    let events: Vec<DecompositionEvent> = decomposition.clone().into_iter().collect();
    assert_eq!(Decomposition::from(events), decomposition, "Event vector does not round-trip");
}

//-----------------------------------------------------------------------------

#[test]
fn load_from_files() {
    let (_, decomposition) = internal::bubble_graph();
    let text = decomposition.to_string();

    let plain_file = serialize::temp_file_name("decomposition");
    fs::write(&plain_file, text.as_bytes()).unwrap();
    let loaded = Decomposition::load_from(&plain_file);
    assert_eq!(loaded, Ok(decomposition.clone()), "Wrong decomposition from a plain file");
    fs::remove_file(&plain_file).unwrap();

    let gz_file = serialize::temp_file_name("decomposition-gz");
    let mut encoder = GzEncoder::new(File::create(&gz_file).unwrap(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap();
    assert!(utils::is_gzipped(&gz_file), "The compressed file is not recognized");
    let loaded = Decomposition::load_from(&gz_file);
    assert_eq!(loaded, Ok(decomposition), "Wrong decomposition from a compressed file");
    fs::remove_file(&gz_file).unwrap();

    let missing = serialize::temp_file_name("missing");
    assert!(Decomposition::load_from(&missing).is_err(), "Loaded a missing file");
}

//-----------------------------------------------------------------------------
