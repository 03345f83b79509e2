#![allow(dead_code)]

use polygon_localities::config::{Config, Pacing};
use polygon_localities::error::ServiceError;
use polygon_localities::google::types::{LocalizedText, PartialLatLng, PlaceInsight};
use polygon_localities::google::{
    AggregateRequest, AggregateResponse, DetailsReply, DistanceMatrixResponse, GeoServices, GeocodeResponse,
    LatLng, PlaceDetails,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

pub const SQUARE_KML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document>
    <Placemark>
      <name>Southern Highlands</name>
      <Polygon><outerBoundaryIs><LinearRing>
        <coordinates>
          150.2,-34.4,0 150.6,-34.4,0 150.6,-34.7,0 150.2,-34.4,0
        </coordinates>
      </LinearRing></outerBoundaryIs></Polygon>
    </Placemark>
  </Document>
</kml>"#;

/// In-memory services with canned answers and a call log.
pub struct ScriptedServices {
    pub place_ids: Vec<String>,
    pub details: HashMap<String, DetailsReply>,
    /// `None` → geocoder answers `ZERO_RESULTS`.
    pub origin: Option<LatLng>,
    /// Matrix status for every batch.
    pub matrix_status: String,
    /// Fail the matrix call at the transport level.
    pub matrix_transport_error: bool,
    pub aggregate_requests: RefCell<Vec<AggregateRequest>>,
    pub detail_calls: RefCell<Vec<String>>,
    pub matrix_calls: RefCell<Vec<Vec<LatLng>>>,
}

impl ScriptedServices {
    pub fn new() -> Self {
        Self {
            place_ids: Vec::new(),
            details: HashMap::new(),
            origin: Some(LatLng::new(-34.4775, 150.4179)),
            matrix_status: "OK".into(),
            matrix_transport_error: false,
            aggregate_requests: RefCell::new(Vec::new()),
            detail_calls: RefCell::new(Vec::new()),
            matrix_calls: RefCell::new(Vec::new()),
        }
    }

    /// Add a place that resolves cleanly.
    pub fn with_place(mut self, id: &str, name: &str, lat: f64, lng: f64) -> Self {
        self.place_ids.push(id.to_string());
        self.details.insert(
            id.to_string(),
            DetailsReply::Found(PlaceDetails {
                display_name: Some(LocalizedText {
                    text: Some(name.to_string()),
                }),
                location: Some(PartialLatLng {
                    latitude: Some(lat),
                    longitude: Some(lng),
                }),
            }),
        );
        self
    }

    /// Add a place whose details lookup fails with `status`.
    pub fn with_failed_place(mut self, id: &str, status: u16) -> Self {
        self.place_ids.push(id.to_string());
        self.details.insert(id.to_string(), DetailsReply::Failed { status });
        self
    }

    pub fn without_origin(mut self) -> Self {
        self.origin = None;
        self
    }
}

/// Fake distance: 1 km and 60 s per 0.01 degree of latitude from the origin.
fn fake_element(origin: LatLng, dest: LatLng) -> serde_json::Value {
    let steps = ((dest.latitude - origin.latitude).abs() * 100.0).round() as u64;
    json!({
        "status": "OK",
        "distance": {"text": format!("{} km", steps), "value": steps * 1000},
        "duration": {"text": format!("{} mins", steps), "value": steps * 60}
    })
}

impl GeoServices for ScriptedServices {
    fn aggregate(&self, request: &AggregateRequest) -> Result<AggregateResponse, ServiceError> {
        self.aggregate_requests.borrow_mut().push(request.clone());
        Ok(AggregateResponse {
            place_insights: self
                .place_ids
                .iter()
                .map(|id| PlaceInsight {
                    place: Some(format!("places/{}", id)),
                })
                .collect(),
        })
    }

    fn place_details(&self, place_id: &str) -> Result<DetailsReply, ServiceError> {
        self.detail_calls.borrow_mut().push(place_id.to_string());
        Ok(self
            .details
            .get(place_id)
            .cloned()
            .unwrap_or(DetailsReply::Failed { status: 404 }))
    }

    fn geocode(&self, _address: &str) -> Result<GeocodeResponse, ServiceError> {
        let body = match self.origin {
            Some(o) => json!({
                "status": "OK",
                "results": [{"geometry": {"location": {"lat": o.latitude, "lng": o.longitude}}}]
            }),
            None => json!({"status": "ZERO_RESULTS", "results": []}),
        };
        Ok(serde_json::from_value(body).unwrap())
    }

    fn distance_matrix(
        &self,
        origin: LatLng,
        destinations: &[LatLng],
    ) -> Result<DistanceMatrixResponse, ServiceError> {
        self.matrix_calls.borrow_mut().push(destinations.to_vec());
        if self.matrix_transport_error {
            return Err(ServiceError::Transport {
                service: "Distance Matrix",
                message: "timed out".into(),
            });
        }
        let elements: Vec<_> = destinations.iter().map(|d| fake_element(origin, *d)).collect();
        Ok(serde_json::from_value(json!({
            "status": self.matrix_status,
            "rows": [{"elements": elements}]
        }))
        .unwrap())
    }
}

/// Scratch directory holding a boundary file, plus a config pointing into it.
pub struct Workspace {
    _dir: TempDir,
    pub config: Config,
}

impl Workspace {
    pub fn new(kml: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let boundary = dir.path().join("myMap.kml");
        fs::write(&boundary, kml).expect("write kml");

        let mut config = Config::with_api_key("test-key");
        config.boundary_path = boundary;
        config.output_path = dir.path().join("myMap.xlsx");
        config.pacing = Pacing::immediate();
        Self { _dir: dir, config }
    }

    pub fn output(&self) -> PathBuf {
        self.config.output_path.clone()
    }
}

// ─── Workbook readback ──────────────────────────────────────────

/// What a written `.xlsx` actually holds.
#[derive(Debug)]
pub struct Readback {
    pub sheet_names: Vec<String>,
    /// First sheet, one entry per `<row>`, three columns each. `None` is a
    /// cell that was never written.
    pub rows: Vec<Vec<Option<String>>>,
}

/// Unzip `path` and read the sheet names and first worksheet's cells.
pub fn read_workbook(path: &Path) -> Readback {
    let mut archive = ZipArchive::new(File::open(path).expect("open xlsx")).expect("xlsx is a zip");
    let workbook = zip_entry(&mut archive, "xl/workbook.xml");
    let shared = zip_entry(&mut archive, "xl/sharedStrings.xml");
    let sheet = zip_entry(&mut archive, "xl/worksheets/sheet1.xml");
    let strings = shared_strings(&shared);
    Readback {
        sheet_names: sheet_names(&workbook),
        rows: sheet_rows(&sheet, &strings, 3),
    }
}

fn zip_entry(archive: &mut ZipArchive<File>, name: &str) -> String {
    let mut text = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|e| panic!("{} missing: {}", name, e))
        .read_to_string(&mut text)
        .expect("utf-8 entry");
    text
}

fn attribute(e: &BytesStart, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .expect("well-formed attribute")
        .map(|a| a.unescape_value().expect("attribute value").into_owned())
}

fn sheet_names(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut names = Vec::new();
    loop {
        match reader.read_event().expect("workbook.xml") {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                names.extend(attribute(&e, "name"));
            }
            Event::Eof => return names,
            _ => {}
        }
    }
}

fn shared_strings(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event().expect("sharedStrings.xml") {
            Event::Start(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_text = false,
            Event::Text(t) if in_text => {
                if let Some(last) = strings.last_mut() {
                    last.push_str(&t.unescape().expect("text"));
                }
            }
            Event::Eof => return strings,
            _ => {}
        }
    }
}

/// Column index of a cell reference such as `C12`.
fn column(reference: &str) -> usize {
    reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .fold(0, |acc, c| acc * 26 + (c as usize - 'A' as usize + 1))
        - 1
}

fn sheet_rows(xml: &str, strings: &[String], width: usize) -> Vec<Vec<Option<String>>> {
    let mut reader = Reader::from_str(xml);
    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    // (column, value is a shared-string index)
    let mut cell: Option<(usize, bool)> = None;
    let mut in_value = false;
    loop {
        match reader.read_event().expect("sheet1.xml") {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"row" => {
                rows.push(vec![None; width]);
            }
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let reference = attribute(&e, "r").expect("cell reference");
                let shared = attribute(&e, "t").as_deref() == Some("s");
                cell = Some((column(&reference), shared));
            }
            Event::End(e) if e.local_name().as_ref() == b"c" => cell = None,
            Event::Start(e) if matches!(e.local_name().as_ref(), b"v" | b"t") => in_value = true,
            Event::End(e) if matches!(e.local_name().as_ref(), b"v" | b"t") => in_value = false,
            Event::Text(t) if in_value => {
                let (col, shared) = cell.expect("value inside a cell");
                let raw = t.unescape().expect("text").into_owned();
                let value = if shared {
                    strings[raw.parse::<usize>().expect("string index")].clone()
                } else {
                    raw
                };
                if let Some(row) = rows.last_mut() {
                    row[col] = Some(value);
                }
            }
            Event::Eof => return rows,
            _ => {}
        }
    }
}
