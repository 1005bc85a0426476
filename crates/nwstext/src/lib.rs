//! # nwstext: NWS Text Product Decoding
//!
//! This crate decodes the text bulletins which the United States
//! National Weather Service (NWS) issues for warnings, watches,
//! advisories, and climate summaries. It turns the bulletin text
//! into strongly-typed records, tracks the lifecycle of the events
//! they describe, and renders short human-readable messages.
//!
//! ## Disclaimer
//!
//! This crate is dual-licensed MIT and Apache 2.0. Read these licenses
//! carefully as they may affect your rights.
//!
//! This crate has not been certified for any purpose. The author
//! **strongly discourages** its use in any safety-critical
//! applications. Always have at least two methods available for
//! receiving weather alerts.
//!
//! ## Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use nwstext::{assemble_messages, MessageOptions, ProductParserBuilder, VtecAction};
//!
//! let text = "000 \n\
//! WUUS53 KJAN 291651\n\
//! TORJAN\n\
//! MSC035-MSC073-MSC091-291715-\n\
//! /O.NEW.KJAN.TO.W.0130.050829T1651Z-050829T1815Z/\n\
//! \n\
//! TORNADO WARNING\n\
//! NATIONAL WEATHER SERVICE JACKSON MS\n\
//! 1151 AM CDT MON AUG 29 2005\n\
//! \n\
//! $$\n";
//!
//! // archived products are resolved relative to a fixed time
//! let parser = ProductParserBuilder::new()
//!     .with_utcnow(Utc.with_ymd_and_hms(2005, 8, 29, 17, 0, 0).unwrap())
//!     .build();
//! let product = parser.parse(text).expect("decode failed");
//!
//! assert_eq!(product.afos(), Some("TORJAN"));
//! assert_eq!(product.valid().to_rfc3339(), "2005-08-29T16:51:00+00:00");
//!
//! let segment = &product.segments()[0];
//! assert_eq!(segment.ugcs().len(), 3);
//!
//! let vtec = &segment.vtecs()[0];
//! assert_eq!(vtec.action(), VtecAction::New);
//! assert_eq!(vtec.ps_string(), "Tornado Warning");
//!
//! let msgs = assemble_messages(&product, &MessageOptions::new());
//! assert!(msgs[0].plain.starts_with("JAN issues Tornado Warning for"));
//! ```
//!
//! Parsers are created via a [builder](ProductParserBuilder), which
//! also accepts [providers](UgcProvider) for UGC and river gauge
//! names.
//!
//! ## Background
//!
//! Most NWS products share a common framing:
//!
//! * a WMO abbreviated heading, like `WUUS53 KJAN 291651`, which
//!   names the originating center and a day-of-month timestamp;
//! * an AFOS identifier, like `TORJAN`;
//! * a "mass news disseminator" (MND) line with the issuance time in
//!   local time, like `1151 AM CDT MON AUG 29 2005`; and
//! * one or more *segments* separated by `$$`.
//!
//! Each segment may begin with a Universal Geographic Code (UGC)
//! block that lists the affected counties or forecast zones, and a
//! set of Valid Time Event Code (VTEC) strings which identify the
//! events and what is happening to them. Storm-based warnings also
//! carry a `LAT...LON` polygon.
//!
//! ## Crate features
//!
//! * `serde`: derive `Serialize` for decoded types.

mod assembler;
mod builder;
mod climate;
mod codes;
mod geometry;
mod hvtec;
mod lifecycle;
mod product;
mod provider;
mod segment;
mod tags;
mod text;
mod time;
mod ugc;
mod vtec;
mod wmo;

#[cfg(test)]
mod testdata;

pub use assembler::{assemble_messages, ugcs_to_count_text, ugcs_to_text, Message, MessageOptions};
pub use builder::{ProductParser, ProductParserBuilder};
pub use climate::{
    parse_climate_product, parse_climate_text, ClimateReport, ClimateRow, ClimateSection,
    ClimateValue, ClimateWind,
};
pub use codes::{ps_string, Phenomenon, SignificanceLevel};
pub use geometry::{Coord, InvalidPolygonErr, Motion, MotionLocation, Polygon};
pub use hvtec::{FloodCause, FloodRecord, FloodSeverity, Hvtec, HvtecParseErr};
pub use lifecycle::{
    apply_product, EventStore, LifecycleReport, MemoryEventStore, SbwRow, StatusFilter,
    WarningRow, WarningUpdate,
};
pub use product::{Product, ProductDecodeErr};
pub use provider::{EmptyProvider, NwsliInfo, NwsliProvider, UgcInfo, UgcProvider};
pub use segment::Segment;
pub use tags::{DamageLevel, DamageTag, HailTag, Observation, SpoutTag, Tags, WindTag};
pub use time::{InvalidDateErr, MndErr, ZoneLabel};
pub use ugc::{encode_ugcs, parse_ugc_codes, Ugc, UgcKind, UgcParseErr};
pub use vtec::{Vtec, VtecAction, VtecClass, VtecKey, VtecParseErr};
pub use wmo::{WmoHeaderErr, WmoHeading};
