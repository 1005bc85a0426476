//! Hydrologic VTEC (H-VTEC)
//!
//! Flood products follow each P-VTEC with an H-VTEC string which
//! names the river gauge and flood details:
//!
//! ```txt
//! /KEOI4.2.ER.130402T1200Z.130404T0000Z.130407T0600Z.NO/
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use strum::EnumMessage;
use thiserror::Error;

use crate::provider::NwsliProvider;
use crate::time::{format_vtec_time, parse_vtec_time};

/// NWSLI which means "no particular gauge"
pub const NULL_NWSLI: &str = "00000";

/// Error decoding an H-VTEC string
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
#[error("H-VTEC \"{0}\" has an invalid timestamp")]
pub struct HvtecParseErr(pub String);

/// Flood severity
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FloodSeverity {
    #[strum(serialize = "N", detailed_message = "None")]
    None,
    #[strum(serialize = "0", detailed_message = "Areal or Flash Flood")]
    Areal,
    #[strum(serialize = "1", detailed_message = "Minor")]
    Minor,
    #[strum(serialize = "2", detailed_message = "Moderate")]
    Moderate,
    #[strum(serialize = "3", detailed_message = "Major")]
    Major,
    #[strum(serialize = "U", detailed_message = "Unknown")]
    Unknown,
}

/// Immediate cause of a flood
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[non_exhaustive]
pub enum FloodCause {
    /// Unrecognized cause code
    #[strum(serialize = "??", detailed_message = "Unrecognized")]
    Unrecognized,

    #[strum(serialize = "ER", detailed_message = "Excessive Rainfall")]
    ExcessiveRainfall,
    #[strum(serialize = "SM", detailed_message = "Snowmelt")]
    Snowmelt,
    #[strum(serialize = "RS", detailed_message = "Rain and Snowmelt")]
    RainAndSnowmelt,
    #[strum(serialize = "DM", detailed_message = "Dam or Levee Failure")]
    DamFailure,
    #[strum(serialize = "DR", detailed_message = "Upstream Dam or Reservoir Release")]
    DamRelease,
    #[strum(serialize = "GO", detailed_message = "Glacier-Dammed Lake Outburst")]
    GlacierOutburst,
    #[strum(serialize = "IJ", detailed_message = "Ice Jam")]
    IceJam,
    #[strum(serialize = "IC", detailed_message = "Rain and/or Snowmelt and/or Ice Jam")]
    RainSnowmeltIceJam,
    #[strum(serialize = "FS", detailed_message = "Upstream Flooding plus Storm Surge")]
    UpstreamStormSurge,
    #[strum(serialize = "FT", detailed_message = "Upstream Flooding plus Tidal Effects")]
    UpstreamTidal,
    #[strum(serialize = "ET", detailed_message = "Elevated Upstream Flow plus Tidal Effects")]
    ElevatedUpstreamTidal,
    #[strum(serialize = "WT", detailed_message = "Wind and/or Tidal Effects")]
    WindTidal,
    #[strum(serialize = "MC", detailed_message = "Other Multiple Causes")]
    MultipleCauses,
    #[strum(serialize = "OT", detailed_message = "Other Effects")]
    Other,
    #[strum(serialize = "UU", detailed_message = "Unknown")]
    Unknown,
}

/// Flood record status
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[non_exhaustive]
pub enum FloodRecord {
    /// Unrecognized record code
    #[strum(serialize = "??", detailed_message = "Unrecognized")]
    Unrecognized,

    #[strum(serialize = "NO", detailed_message = "Record Flood Not Expected")]
    NotExpected,
    #[strum(serialize = "NR", detailed_message = "Near Record or Record Flood Expected")]
    NearRecord,
    #[strum(serialize = "UU", detailed_message = "No Period of Record")]
    NoPeriodOfRecord,
    #[strum(serialize = "OO", detailed_message = "Areal or Flash Flood")]
    Areal,
}

macro_rules! coded_enum {
    ($name:ident, $fallback:expr) => {
        impl $name {
            /// Parse from a code, with a fallback for unknown codes
            pub fn from<S>(code: S) -> Self
            where
                S: AsRef<str>,
            {
                str::parse(code.as_ref()).unwrap_or($fallback)
            }

            /// Human-readable string representation
            pub fn as_display_str(&self) -> &'static str {
                self.get_detailed_message().expect("missing definition")
            }

            /// Code, as written in the H-VTEC
            pub fn as_code_str(&self) -> &'static str {
                self.get_serializations()[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if f.alternate() {
                    self.as_code_str().fmt(f)
                } else {
                    self.as_display_str().fmt(f)
                }
            }
        }
    };
}

coded_enum!(FloodSeverity, FloodSeverity::Unknown);
coded_enum!(FloodCause, FloodCause::Unrecognized);
coded_enum!(FloodRecord, FloodRecord::Unrecognized);

/// A decoded H-VTEC string
///
/// The raw cause and record codes are retained, so unrecognized
/// codes survive a round trip through `Display`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Hvtec {
    nwsli: String,
    severity: FloodSeverity,
    cause: String,
    begin: Option<DateTime<Utc>>,
    crest: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    record: String,
    name: Option<String>,
}

impl Hvtec {
    /// Five-character location identifier
    ///
    /// `None` for the `00000` sentinel.
    pub fn nwsli(&self) -> Option<&str> {
        if self.nwsli == NULL_NWSLI {
            None
        } else {
            Some(&self.nwsli)
        }
    }

    /// Flood severity
    pub fn severity(&self) -> FloodSeverity {
        self.severity
    }

    /// Flood cause, decoded
    pub fn cause(&self) -> FloodCause {
        FloodCause::from(&self.cause)
    }

    /// Flood cause code, as written
    pub fn cause_code(&self) -> &str {
        &self.cause
    }

    /// Flood start
    pub fn begin(&self) -> Option<&DateTime<Utc>> {
        self.begin.as_ref()
    }

    /// Time of crest
    pub fn crest(&self) -> Option<&DateTime<Utc>> {
        self.crest.as_ref()
    }

    /// Flood end
    pub fn end(&self) -> Option<&DateTime<Utc>> {
        self.end.as_ref()
    }

    /// Record status, decoded
    pub fn record(&self) -> FloodRecord {
        FloodRecord::from(&self.record)
    }

    /// Record status code, as written
    pub fn record_code(&self) -> &str {
        &self.record
    }

    /// Gauge name, if the location provider knows it
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Display for Hvtec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}.{}.{}.{}.{}.{}.{}/",
            self.nwsli,
            self.severity.as_code_str(),
            self.cause,
            format_vtec_time(self.begin.as_ref()),
            format_vtec_time(self.crest.as_ref()),
            format_vtec_time(self.end.as_ref()),
            self.record
        )
    }
}

/// Find every H-VTEC string in `text`, in order
///
/// Gauge names are filled in from `provider`.
pub fn find_hvtecs(
    text: &str,
    provider: &dyn NwsliProvider,
) -> Vec<Result<Hvtec, HvtecParseErr>> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"/([A-Z0-9]{5})\.([N0-3U])\.([A-Z]{2})\.([0-9TZ]+)\.([0-9TZ]+)\.([0-9TZ]+)\.([A-Z]{2})/"
        )
        .expect("bad H-VTEC regexp");
    }

    RE.captures_iter(text)
        .map(|caps| -> Result<Hvtec, HvtecParseErr> {
            let bad_time = |_e| HvtecParseErr(caps[0].to_owned());
            let nwsli = caps[1].to_owned();
            let name = if nwsli == NULL_NWSLI {
                None
            } else {
                provider.lookup(&nwsli).map(|info| info.name)
            };

            Ok(Hvtec {
                severity: FloodSeverity::from(&caps[2]),
                cause: caps[3].to_owned(),
                begin: parse_vtec_time(&caps[4]).map_err(bad_time)?,
                crest: parse_vtec_time(&caps[5]).map_err(bad_time)?,
                end: parse_vtec_time(&caps[6]).map_err(bad_time)?,
                record: caps[7].to_owned(),
                nwsli,
                name,
            })
        })
        .collect()
}
