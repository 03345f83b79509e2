//! Polygon extraction from a KML boundary file.
//!
//! Only the first `<coordinates>` element is read. Its text is a
//! whitespace-separated list of `lon,lat[,alt]` tuples.

use crate::error::ParseError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs;
use std::path::Path;

/// A polygon vertex in KML order: longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub lon: f64,
    pub lat: f64,
}

impl Vertex {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Read a KML file and return its boundary as a closed ring.
pub fn parse_kml_file(path: &Path) -> Result<Vec<Vertex>, ParseError> {
    let xml = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_kml_str(&xml)
}

/// Parse KML text and return the first coordinate list as a closed ring.
pub fn parse_kml_str(xml: &str) -> Result<Vec<Vertex>, ParseError> {
    let text = first_coordinates_text(xml)?.ok_or(ParseError::MissingCoordinates)?;
    let vertices = parse_coordinates(&text)?;
    if vertices.is_empty() {
        return Err(ParseError::EmptyCoordinates);
    }
    Ok(close_ring(vertices))
}

/// Text content of the first `<coordinates>` element, matched by local name
/// so both `<coordinates>` and `<kml:coordinates>` are accepted.
fn first_coordinates_text(xml: &str) -> Result<Option<String>, ParseError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut inside = false;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"coordinates" => {
                inside = true;
            }
            Event::Empty(e) if e.local_name().as_ref() == b"coordinates" => {
                return Ok(Some(String::new()));
            }
            Event::Text(t) if inside => {
                text.push_str(&t.unescape()?);
            }
            Event::CData(c) if inside => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::End(e) if inside && e.local_name().as_ref() == b"coordinates" => {
                return Ok(Some(text));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Parse `lon,lat[,alt]` tokens. Tokens with fewer than two fields are
/// skipped; a non-numeric or non-finite lon or lat is an error.
pub fn parse_coordinates(text: &str) -> Result<Vec<Vertex>, ParseError> {
    let mut vertices = Vec::new();
    for token in text.split_whitespace() {
        let fields: Vec<&str> = token.split(',').collect();
        if fields.len() < 2 {
            continue;
        }
        let lon = parse_field(fields[0], token)?;
        let lat = parse_field(fields[1], token)?;
        vertices.push(Vertex::new(lon, lat));
    }
    Ok(vertices)
}

fn parse_field(field: &str, token: &str) -> Result<f64, ParseError> {
    field
        .trim()
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            token: token.to_string(),
        })
}

/// Append the first vertex when the ring is open.
pub fn close_ring(mut vertices: Vec<Vertex>) -> Vec<Vertex> {
    if let (Some(&first), Some(&last)) = (vertices.first(), vertices.last()) {
        if first != last {
            vertices.push(first);
        }
    }
    vertices
}
