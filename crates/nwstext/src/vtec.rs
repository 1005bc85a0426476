//! Valid Time Event Code (VTEC)
//!
//! A P-VTEC string identifies one event and what the product does
//! to it:
//!
//! ```txt
//! /O.NEW.KJAN.TO.W.0130.050829T1651Z-050829T1815Z/
//!  | |   |    |  | |    |            |
//!  | |   |    |  | |    begin        end
//!  | |   |    |  | event tracking number (ETN)
//!  | |   |    |  significance
//!  | |   |    phenomenon
//!  | |   issuing office
//!  | action
//!  product class
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use strum::EnumMessage;
use thiserror::Error;

use crate::codes::{ps_string, Phenomenon, SignificanceLevel};
use crate::time::{format_vtec_time, parse_vtec_time};

/// Error decoding a VTEC string
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VtecParseErr {
    /// Text resembles a VTEC but does not match its grammar
    #[error("unparseable VTEC \"{0}\"")]
    Unparseable(String),

    /// A begin or end timestamp does not exist
    #[error("VTEC \"{0}\" has an invalid timestamp")]
    InvalidTime(String),
}

/// VTEC product class
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
pub enum VtecClass {
    #[strum(serialize = "O", detailed_message = "Operational")]
    Operational,

    /// Test products must not be acted upon
    #[strum(serialize = "T", detailed_message = "Test")]
    Test,

    #[strum(serialize = "E", detailed_message = "Experimental")]
    Experimental,

    #[strum(serialize = "X", detailed_message = "Experimental VTEC in Operational Product")]
    ExperimentalInOperational,
}

impl VtecClass {
    /// One-character code
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }
}

/// VTEC action
///
/// What the product does to the event.
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
pub enum VtecAction {
    #[strum(serialize = "NEW", message = "issues", detailed_message = "New")]
    New,
    #[strum(serialize = "CON", message = "continues", detailed_message = "Continued")]
    Continue,
    #[strum(
        serialize = "EXA",
        message = "expands area to include",
        detailed_message = "Extended in Area"
    )]
    ExtendArea,
    #[strum(serialize = "EXT", message = "extends time of", detailed_message = "Extended in Time")]
    ExtendTime,
    #[strum(
        serialize = "EXB",
        message = "extends time and expands area to include",
        detailed_message = "Extended in Time and Area"
    )]
    ExtendBoth,
    #[strum(serialize = "UPG", message = "issues upgrade to", detailed_message = "Upgraded")]
    Upgrade,
    #[strum(serialize = "CAN", message = "cancels", detailed_message = "Cancelled")]
    Cancel,
    #[strum(serialize = "EXP", message = "expires", detailed_message = "Expired")]
    Expire,
    #[strum(serialize = "ROU", message = "issues routine", detailed_message = "Routine")]
    Routine,
    #[strum(serialize = "COR", message = "corrects", detailed_message = "Correction")]
    Correct,
}

impl VtecAction {
    /// Three-character code, like "`NEW`"
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// Human-readable description, like "`Extended in Time`"
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// Verb phrase for messages, like "`continues`"
    pub fn verb(&self) -> &'static str {
        self.get_message().expect("missing definition")
    }

    /// True for actions which start an event in new areas
    pub fn is_starting(&self) -> bool {
        matches!(
            self,
            VtecAction::New | VtecAction::ExtendArea | VtecAction::ExtendBoth
        )
    }

    /// True for actions which end an event
    pub fn is_ending(&self) -> bool {
        matches!(
            self,
            VtecAction::Cancel | VtecAction::Expire | VtecAction::Upgrade
        )
    }
}

impl fmt::Display for VtecAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_code_str().fmt(f)
    }
}

/// Event identity
///
/// Events are unique by year, issuing office, phenomenon,
/// significance, and event tracking number.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VtecKey {
    pub year: i32,
    pub office: String,
    pub phenomenon: String,
    pub significance: String,
    pub etn: u16,
}

impl fmt::Display for VtecKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{:04}",
            self.year, self.office, self.phenomenon, self.significance, self.etn
        )
    }
}

/// A decoded P-VTEC string
///
/// ```
/// use nwstext::{Phenomenon, SignificanceLevel, Vtec, VtecAction};
///
/// let vtec: Vtec = "/O.NEW.KJAN.TO.W.0130.050829T1651Z-050829T1815Z/".parse().unwrap();
/// assert_eq!(vtec.action(), VtecAction::New);
/// assert_eq!(vtec.office(), "KJAN");
/// assert_eq!(vtec.phenomenon(), Phenomenon::Tornado);
/// assert_eq!(vtec.significance(), SignificanceLevel::Warning);
/// assert_eq!(vtec.etn(), 130);
/// assert_eq!(vtec.ps_string(), "Tornado Warning");
/// assert_eq!(vtec.url_fragment(2005), "2005-O-NEW-KJAN-TO-W-0130");
/// assert_eq!(vtec.to_string(), "/O.NEW.KJAN.TO.W.0130.050829T1651Z-050829T1815Z/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Vtec {
    class: VtecClass,
    action: VtecAction,
    office: String,
    phenomenon: String,
    significance: String,
    etn: u16,
    begin: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl Vtec {
    /// Product class
    pub fn class(&self) -> VtecClass {
        self.class
    }

    /// Action
    pub fn action(&self) -> VtecAction {
        self.action
    }

    /// Four-character issuing office, like "`KJAN`"
    pub fn office(&self) -> &str {
        &self.office
    }

    /// Three-character forecast office, like "`JAN`"
    pub fn wfo(&self) -> &str {
        self.office.get(1..).unwrap_or(&self.office)
    }

    /// Phenomenon, decoded
    ///
    /// Unknown codes decode to [`Phenomenon::Unrecognized`];
    /// the raw code remains available from
    /// [`phenomenon_code()`](Vtec::phenomenon_code).
    pub fn phenomenon(&self) -> Phenomenon {
        Phenomenon::from(&self.phenomenon)
    }

    /// Two-character phenomenon code, as written
    pub fn phenomenon_code(&self) -> &str {
        &self.phenomenon
    }

    /// Significance, decoded
    pub fn significance(&self) -> SignificanceLevel {
        SignificanceLevel::from(&self.significance)
    }

    /// One-character significance code, as written
    pub fn significance_code(&self) -> &str {
        &self.significance
    }

    /// Event tracking number
    pub fn etn(&self) -> u16 {
        self.etn
    }

    /// Event start; `None` if already in effect
    pub fn begin(&self) -> Option<&DateTime<Utc>> {
        self.begin.as_ref()
    }

    /// Event end; `None` means "until further notice"
    pub fn end(&self) -> Option<&DateTime<Utc>> {
        self.end.as_ref()
    }

    /// True if both times are present and begin follows end
    pub fn is_inverted(&self) -> bool {
        matches!((&self.begin, &self.end), (Some(b), Some(e)) if b > e)
    }

    /// Product name, like "`Tornado Warning`"
    pub fn ps_string(&self) -> String {
        ps_string(&self.phenomenon, &self.significance)
    }

    /// Event year
    ///
    /// Events are numbered within the year they begin. Events
    /// already in effect take the year of `fallback`, which is
    /// usually the product issuance time.
    pub fn year(&self, fallback: &DateTime<Utc>) -> i32 {
        self.begin.as_ref().unwrap_or(fallback).year()
    }

    /// Event identity, see [`year()`](Vtec::year)
    pub fn key(&self, fallback: &DateTime<Utc>) -> VtecKey {
        self.key_for_year(self.year(fallback))
    }

    /// Event identity in the given `year`
    pub fn key_for_year(&self, year: i32) -> VtecKey {
        VtecKey {
            year,
            office: self.office.clone(),
            phenomenon: self.phenomenon.clone(),
            significance: self.significance.clone(),
            etn: self.etn,
        }
    }

    /// Link fragment, like `2005-O-NEW-KJAN-TO-W-0130`
    pub fn url_fragment(&self, year: i32) -> String {
        format!(
            "{}-{}-{}-{}-{}-{}-{:04}",
            year,
            self.class.as_code_str(),
            self.action.as_code_str(),
            self.office,
            self.phenomenon,
            self.significance,
            self.etn
        )
    }
}

impl fmt::Display for Vtec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/{}.{}.{}.{}.{}.{:04}.{}-{}/",
            self.class.as_code_str(),
            self.action.as_code_str(),
            self.office,
            self.phenomenon,
            self.significance,
            self.etn,
            format_vtec_time(self.begin.as_ref()),
            format_vtec_time(self.end.as_ref())
        )
    }
}

impl FromStr for Vtec {
    type Err = VtecParseErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = VTEC_RE
            .captures(s)
            .ok_or_else(|| VtecParseErr::Unparseable(s.trim().to_owned()))?;
        from_captures(&caps)
    }
}

lazy_static! {
    static ref VTEC_RE: Regex = Regex::new(
        r"/(O|T|E|X)\.(NEW|CON|EXA|EXT|EXB|UPG|CAN|EXP|ROU|COR)\.([A-Z]{4})\.([A-Z]{2})\.([WAYSOFN])\.([0-9]{4})\.([0-9TZ]+)-([0-9TZ]+)/"
    )
    .expect("bad VTEC regexp");
}

/// Find every VTEC string in `text`, in order
///
/// Lines which look like a VTEC but fail to decode are returned
/// as errors in their place.
pub fn find_vtecs(text: &str) -> Vec<Result<Vtec, VtecParseErr>> {
    lazy_static! {
        static ref LOOKALIKE: Regex = Regex::new(r"/[OTEX]\.[A-Z]{3}\.").expect("bad VTEC regexp");
    }

    let mut out = Vec::new();
    for line in text.lines() {
        let before = out.len();
        for caps in VTEC_RE.captures_iter(line) {
            out.push(from_captures(&caps));
        }
        if out.len() == before && LOOKALIKE.is_match(line) {
            out.push(Err(VtecParseErr::Unparseable(line.trim().to_owned())));
        }
    }
    out
}

fn from_captures(caps: &regex::Captures) -> Result<Vtec, VtecParseErr> {
    let raw = caps[0].to_owned();
    let bad_time = |_e| VtecParseErr::InvalidTime(raw.clone());

    Ok(Vtec {
        class: caps[1]
            .parse()
            .map_err(|_e| VtecParseErr::Unparseable(raw.clone()))?,
        action: caps[2]
            .parse()
            .map_err(|_e| VtecParseErr::Unparseable(raw.clone()))?,
        office: caps[3].to_owned(),
        phenomenon: caps[4].to_owned(),
        significance: caps[5].to_owned(),
        etn: caps[6]
            .parse()
            .map_err(|_e| VtecParseErr::Unparseable(raw.clone()))?,
        begin: parse_vtec_time(&caps[7]).map_err(bad_time)?,
        end: parse_vtec_time(&caps[8]).map_err(bad_time)?,
    })
}
