//! Track serialization: route geometry to a GPX 1.1 document.
//!
//! One track, one track segment, one `<trkpt>` per point in order.
//! Coordinates are written with Rust's default `f64` formatting, which
//! produces the shortest decimal string that parses back to the same bits,
//! so re-parsing the emitted document reproduces the exact point sequence.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::fmt::Write;

use crate::geo_utils::polyline_length;
use crate::{GeoPoint, PipelineError, RouteGeometry};

/// Creator identifier written to the root element.
const CREATOR: &str = "shape-route";

/// Fixed track name.
const TRACK_NAME: &str = "Shape Route";

/// Serialize a route geometry to a GPX 1.1 document.
///
/// Never fails; an empty geometry yields a structurally valid document
/// with an empty track segment.
pub fn to_track_file(route: &RouteGeometry) -> String {
    let mut out = String::new();

    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<gpx version="1.1" creator="{}" xmlns="http://www.topografix.com/GPX/1/1">"#,
        CREATOR
    );
    let _ = writeln!(out, "  <trk>");
    let _ = writeln!(out, "    <name>{}</name>", TRACK_NAME);
    let _ = writeln!(out, "    <trkseg>");
    for point in &route.points {
        let _ = writeln!(
            out,
            r#"      <trkpt lat="{}" lon="{}"/>"#,
            point.latitude, point.longitude
        );
    }
    let _ = writeln!(out, "    </trkseg>");
    let _ = writeln!(out, "  </trk>");
    let _ = writeln!(out, "</gpx>");

    out
}

/// Parse a GPX document produced by [`to_track_file`] back into a route
/// geometry.
///
/// Only `<trkpt>` latitude/longitude attributes are read; the recovered
/// `distance_meters` is recomputed from geometry since provider-reported
/// leg distances are not carried in the file.
pub fn parse_track_file(text: &str) -> Result<RouteGeometry, PipelineError> {
    let mut points = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("<trkpt") {
        rest = &rest[start + "<trkpt".len()..];
        let end = rest.find('>').ok_or_else(|| {
            PipelineError::InvalidInput("unterminated <trkpt> element".to_string())
        })?;
        let tag = &rest[..end];

        let latitude = parse_attribute(tag, "lat")?;
        let longitude = parse_attribute(tag, "lon")?;
        points.push(GeoPoint::new(latitude, longitude));

        rest = &rest[end + 1..];
    }

    let distance_meters = polyline_length(&points);
    Ok(RouteGeometry {
        points,
        distance_meters,
    })
}

fn parse_attribute(tag: &str, name: &str) -> Result<f64, PipelineError> {
    let marker = format!("{}=\"", name);
    let start = tag.find(&marker).ok_or_else(|| {
        PipelineError::InvalidInput(format!("track point missing {} attribute", name))
    })?;
    let value = &tag[start + marker.len()..];
    let end = value.find('"').ok_or_else(|| {
        PipelineError::InvalidInput(format!("unterminated {} attribute", name))
    })?;

    value[..end].parse::<f64>().map_err(|e| {
        PipelineError::InvalidInput(format!("bad {} value {:?}: {}", name, &value[..end], e))
    })
}
