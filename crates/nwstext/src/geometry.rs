//! Warning polygons and storm motion
//!
//! Storm-based warnings carry a `LAT...LON` polygon, given as
//! pairs of latitude and longitude in hundredths of a degree:
//!
//! ```txt
//! LAT...LON 3244 9017 3234 9076 3282 9081 3292 9013
//! ```
//!
//! Longitudes are written as positive numbers west of Greenwich.
//! Coordinates in this module are `(lon, lat)` pairs in degrees,
//! with east longitude positive.

use chrono::{DateTime, NaiveTime, TimeZone, Timelike, Utc};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use thiserror::Error;

/// A `(lon, lat)` pair, in degrees
pub type Coord = (f64, f64);

const AREA_EPSILON: f64 = 1.0e-9;
const MAX_SPLIT_DEPTH: usize = 16;

/// A polygon with too few vertices to enclose any area
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
#[error("LAT...LON polygon has {0} distinct vertices; at least 3 are required")]
pub struct InvalidPolygonErr(pub usize);

/// A closed, clockwise polygon
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Polygon {
    ring: Vec<Coord>,
}

impl Polygon {
    /// Exterior ring
    ///
    /// The first vertex is repeated as the last.
    pub fn exterior(&self) -> &[Coord] {
        &self.ring
    }

    /// Area, in square degrees
    pub fn area(&self) -> f64 {
        signed_area(&self.ring).abs()
    }

    /// True if the exterior ring is clockwise
    pub fn is_clockwise(&self) -> bool {
        signed_area(&self.ring) < 0.0
    }

    /// Well-Known Text, like `POLYGON((-90.17 32.44, …))`
    pub fn to_wkt(&self) -> String {
        format!("POLYGON(({}))", wkt_coords(&self.ring))
    }
}

/// Storm motion vector
///
/// From a `TIME...MOT...LOC` line.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Motion {
    /// Time of the observation
    pub time: DateTime<Utc>,

    /// Direction the storm is moving *from*, in degrees
    pub direction: u16,

    /// Speed, in knots
    pub speed_kt: u16,

    /// Storm location(s)
    pub location: MotionLocation,
}

/// Location of a moving storm
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum MotionLocation {
    /// A single storm cell
    Point(Coord),

    /// A line of storms
    LineString(Vec<Coord>),
}

impl MotionLocation {
    /// Well-Known Text
    pub fn to_wkt(&self) -> String {
        match self {
            MotionLocation::Point(pt) => format!("POINT({})", wkt_coords(&[*pt])),
            MotionLocation::LineString(pts) => format!("LINESTRING({})", wkt_coords(pts)),
        }
    }
}

/// Find and decode the `LAT...LON` polygon in segment text
///
/// Set `east_longitude` for offices which write east longitudes
/// (Guam). Repairs are reported in `warnings`. Returns `Ok(None)`
/// if there is no polygon, or if the polygon could not be
/// repaired into a single ring.
pub fn find_polygon(
    text: &str,
    east_longitude: bool,
    warnings: &mut Vec<String>,
) -> Result<Option<Polygon>, InvalidPolygonErr> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?i)LAT\.\.\.LON\s+([0-9][0-9\s]*)").expect("bad LAT...LON regexp");
    }

    let digits = match RE.captures(text) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => return Ok(None),
    };

    let mut values = Vec::new();
    for token in digits.split_whitespace() {
        if token.len() == 8 {
            values.push(&token[0..4]);
            values.push(&token[4..8]);
        } else {
            values.push(token);
        }
    }

    let mut ring: Vec<Coord> = Vec::with_capacity(values.len() / 2 + 1);
    for pair in values.chunks_exact(2) {
        ring.push((parse_lon(pair[1], east_longitude), parse_hundredths(pair[0])));
    }
    if values.len() % 2 != 0 {
        warnings.push("LAT...LON has an odd number of values; the last was ignored".to_owned());
    }

    dedup_consecutive(&mut ring);
    let distinct = distinct_count(&ring);
    if distinct < 3 {
        return Err(InvalidPolygonErr(distinct));
    }
    close_ring(&mut ring);

    if find_crossing(&ring).is_some() {
        let mut loops = Vec::new();
        split_loops(ring, 0, &mut loops);
        let dominant = loops
            .iter()
            .map(|l| signed_area(l))
            .fold(0.0f64, |acc, a| if a.abs() > acc.abs() { a } else { acc });
        loops.retain(|l| {
            let a = signed_area(l);
            a.abs() > AREA_EPSILON && a.signum() == dominant.signum()
        });

        if loops.len() == 1 {
            warnings.push("polygon is not valid, but buffer(0) fixed it".to_owned());
            ring = loops.remove(0);
        } else {
            warnings.push(format!(
                "polygon is not valid; repair yields {} parts and it was discarded",
                loops.len()
            ));
            debug!("discarding multipolygon with {} parts", loops.len());
            return Ok(None);
        }
    }

    if signed_area(&ring) > 0.0 {
        warnings.push("polygon is counter-clockwise; reversed".to_owned());
        ring.reverse();
    }

    Ok(Some(Polygon { ring }))
}

/// Find and decode a `TIME...MOT...LOC` line
///
/// `text` should be whitespace-collapsed. The observation time
/// lies on the UTC day of `reference` (the UGC expiration or,
/// failing that, the issuance time), or on the day before if its
/// hour is later than the reference hour. Set `east_longitude`
/// as for [`find_polygon()`].
pub fn find_motion(
    text: &str,
    reference: &DateTime<Utc>,
    east_longitude: bool,
) -> Option<Motion> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"TIME\.\.\.MOT\.\.\.LOC (\d{4})Z (\d{1,3})DEG (\d{1,3})KT (\d+(?:\s+\d+)*)"
        )
        .expect("bad TIME...MOT...LOC regexp");
    }

    let caps = RE.captures(text)?;
    let hhmm = &caps[1];
    let hour: u32 = hhmm[0..2].parse().ok()?;
    let minute: u32 = hhmm[2..4].parse().ok()?;
    let clock = NaiveTime::from_hms_opt(hour, minute, 0)?;

    let mut day = reference.date_naive();
    if hour > reference.hour() {
        day = day.pred_opt()?;
    }
    let time = Utc.from_utc_datetime(&day.and_time(clock));

    let values: Vec<&str> = caps[4].split_whitespace().collect();
    let mut points: Vec<Coord> = values
        .chunks_exact(2)
        .map(|pair| (parse_lon(pair[1], east_longitude), parse_hundredths(pair[0])))
        .collect();

    let location = match points.len() {
        0 => return None,
        1 => MotionLocation::Point(points.remove(0)),
        _ => MotionLocation::LineString(points),
    };

    Some(Motion {
        time,
        direction: caps[2].parse().ok()?,
        speed_kt: caps[3].parse().ok()?,
        location,
    })
}

/// Shoelace area; positive for counter-clockwise rings
pub(crate) fn signed_area(ring: &[Coord]) -> f64 {
    let mut sum = 0.0;
    for w in ring.windows(2) {
        sum += w[0].0 * w[1].1 - w[1].0 * w[0].1;
    }
    if let (Some(first), Some(last)) = (ring.first(), ring.last()) {
        if first != last {
            sum += last.0 * first.1 - first.0 * last.1;
        }
    }
    sum / 2.0
}

fn parse_hundredths(digits: &str) -> f64 {
    digits.parse::<f64>().unwrap_or(0.0) / 100.0
}

// Longitudes past 180W are written without the leading 1
fn parse_lon(digits: &str, east_longitude: bool) -> f64 {
    let mut lon = parse_hundredths(digits);
    if lon < 40.0 {
        lon += 100.0;
    }
    if east_longitude {
        lon
    } else {
        -lon
    }
}

fn wkt_coords(pts: &[Coord]) -> String {
    pts.iter()
        .map(|(lon, lat)| format!("{:.2} {:.2}", lon, lat))
        .collect::<Vec<_>>()
        .join(", ")
}

fn dedup_consecutive(ring: &mut Vec<Coord>) {
    ring.dedup_by(|a, b| same_point(*a, *b));
}

fn same_point(a: Coord, b: Coord) -> bool {
    (a.0 - b.0).abs() < 1.0e-9 && (a.1 - b.1).abs() < 1.0e-9
}

fn distinct_count(ring: &[Coord]) -> usize {
    let mut seen: Vec<Coord> = Vec::with_capacity(ring.len());
    for pt in ring {
        if !seen.iter().any(|s| same_point(*s, *pt)) {
            seen.push(*pt);
        }
    }
    seen.len()
}

fn close_ring(ring: &mut Vec<Coord>) {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if !same_point(first, last) {
            ring.push(first);
        }
    }
}

// First pair of non-adjacent edges which cross, with the crossing
fn find_crossing(ring: &[Coord]) -> Option<(usize, usize, Coord)> {
    let edges = ring.len().saturating_sub(1);
    for i in 0..edges {
        for j in (i + 2)..edges {
            if i == 0 && j == edges - 1 {
                continue;
            }
            if let Some(pt) = edge_intersection(ring[i], ring[i + 1], ring[j], ring[j + 1]) {
                return Some((i, j, pt));
            }
        }
    }
    None
}

fn edge_intersection(p1: Coord, p2: Coord, q1: Coord, q2: Coord) -> Option<Coord> {
    let r = (p2.0 - p1.0, p2.1 - p1.1);
    let s = (q2.0 - q1.0, q2.1 - q1.1);
    let denom = r.0 * s.1 - r.1 * s.0;
    if denom.abs() < 1.0e-12 {
        return None;
    }
    let qp = (q1.0 - p1.0, q1.1 - p1.1);
    let t = (qp.0 * s.1 - qp.1 * s.0) / denom;
    let u = (qp.0 * r.1 - qp.1 * r.0) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((p1.0 + t * r.0, p1.1 + t * r.1))
    } else {
        None
    }
}

// Split a closed ring at its crossings into simple closed loops
fn split_loops(ring: Vec<Coord>, depth: usize, out: &mut Vec<Vec<Coord>>) {
    let crossing = if depth < MAX_SPLIT_DEPTH {
        find_crossing(&ring)
    } else {
        None
    };

    let (i, j, pt) = match crossing {
        Some(c) => c,
        None => {
            if distinct_count(&ring) >= 3 {
                out.push(ring);
            }
            return;
        }
    };

    let mut inner = Vec::with_capacity(j - i + 2);
    inner.push(pt);
    inner.extend_from_slice(&ring[i + 1..=j]);
    dedup_consecutive(&mut inner);
    close_ring(&mut inner);

    let mut outer = Vec::with_capacity(ring.len());
    outer.extend_from_slice(&ring[..=i]);
    outer.push(pt);
    outer.extend_from_slice(&ring[j + 1..]);
    dedup_consecutive(&mut outer);
    close_ring(&mut outer);

    split_loops(inner, depth + 1, out);
    split_loops(outer, depth + 1, out);
}
