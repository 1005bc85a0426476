//! Universal Geographic Code (UGC) decoding
//!
//! A UGC block lists the counties or forecast zones a segment
//! applies to, followed by an expiration time:
//!
//! ```txt
//! DCZ001-MDZ004>007-009>011-013-014-016>018-VAZ036>042-050>057-170200-
//! ```
//!
//! Each six-character token (`MDZ004`) sets a rolling state-and-kind
//! prefix; three-character tokens (`013`) reuse it. `A>B` denotes
//! a range.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::provider::UgcProvider;
use crate::time::{parse_ddhhmm, resolve_ddhhmm};

/// Error decoding a UGC block
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UgcParseErr {
    /// A three-digit token appeared before any state-and-kind prefix
    #[error("UGC token \"{0}\" has no state and kind prefix")]
    MissingPrefix(String),

    /// A token is not of the form `SSKNNN`, `NNN`, or a range
    #[error("UGC token \"{0}\" is malformed")]
    MalformedToken(String),

    /// A range ends before it starts
    #[error("UGC range \"{0}\" is empty")]
    EmptyRange(String),

    /// The `DDHHMM` expiration cannot be placed on the calendar
    #[error("UGC expiration \"{0}\" is not valid")]
    InvalidExpiration(String),
}

/// UGC kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UgcKind {
    /// County, parish, or independent city (`C`)
    County,

    /// Forecast zone (`Z`)
    Zone,
}

impl UgcKind {
    /// One-character code, `C` or `Z`
    pub fn as_char(&self) -> char {
        match self {
            UgcKind::County => 'C',
            UgcKind::Zone => 'Z',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(UgcKind::County),
            'Z' => Some(UgcKind::Zone),
            _ => None,
        }
    }

    /// Range stride for a range starting at `first`
    ///
    /// County FIPS codes are odd, so a county range which begins on
    /// an odd number steps by two.
    fn stride(&self, first: u16) -> u16 {
        if *self == UgcKind::County && first % 2 == 1 {
            2
        } else {
            1
        }
    }
}

/// A single UGC identifier, like `IAC001`
///
/// Identifiers may carry a display name and forecast-office list
/// from a [`UgcProvider`]. Identifiers which the provider does not
/// know display as `((IAC001))`.
///
/// ```
/// use nwstext::{Ugc, UgcKind};
///
/// let ugc: Ugc = "MDZ004".parse().unwrap();
/// assert_eq!(ugc.state(), "MD");
/// assert_eq!(ugc.kind(), UgcKind::Zone);
/// assert_eq!(ugc.number(), 4);
/// assert_eq!(ugc.to_string(), "MDZ004");
/// assert_eq!(ugc.display_name(), "((MDZ004))");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ugc {
    state: String,
    kind: UgcKind,
    number: u16,
    name: Option<String>,
    wfos: Vec<String>,
}

impl Ugc {
    /// New identifier without metadata
    pub fn new<S>(state: S, kind: UgcKind, number: u16) -> Self
    where
        S: Into<String>,
    {
        Self {
            state: state.into(),
            kind,
            number,
            name: None,
            wfos: Vec::new(),
        }
    }

    /// Two-letter state, like "`IA`"
    pub fn state(&self) -> &str {
        &self.state
    }

    /// County or zone
    pub fn kind(&self) -> UgcKind {
        self.kind
    }

    /// Three-digit number
    pub fn number(&self) -> u16 {
        self.number
    }

    /// Six-character code, like "`IAC001`"
    pub fn code(&self) -> String {
        self.to_string()
    }

    /// Display name, if known
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Display name, or a bracketed placeholder like `((IAC001))`
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("(({}))", self),
        }
    }

    /// Responsible forecast offices, if known
    pub fn wfos(&self) -> &[String] {
        &self.wfos
    }

    /// Attach metadata from `provider`
    pub fn enrich(&mut self, provider: &dyn UgcProvider) {
        if let Some(info) = provider.lookup(&self.code()) {
            self.name = Some(info.name);
            self.wfos = info.wfos;
        }
    }
}

impl fmt::Display for Ugc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:03}", self.state, self.kind.as_char(), self.number)
    }
}

impl FromStr for Ugc {
    type Err = UgcParseErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (state, kind) = parse_prefix(s).ok_or_else(|| UgcParseErr::MalformedToken(s.to_owned()))?;
        let number = parse_number(&s[3..]).ok_or_else(|| UgcParseErr::MalformedToken(s.to_owned()))?;
        Ok(Ugc::new(state, kind, number))
    }
}

/// A decoded UGC block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UgcBlock {
    /// Identifiers, in the order listed
    pub ugcs: Vec<Ugc>,

    /// Expiration; `None` for `000000` and `123456`
    pub expire: Option<DateTime<Utc>>,
}

/// Find raw UGC blocks in segment text
///
/// Returns `(codes, ddhhmm)` for each block, in order. The codes
/// may span several lines.
pub fn find_ugc_blocks(text: &str) -> Vec<(String, String)> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?m)^((?:[A-Z]?[A-Z]?[CZ]?[0-9]{3}[>\-][ \t]?\n?)+)([0-9]{6})-[ \t]*$"
        )
        .expect("bad UGC regexp");
    }

    RE.captures_iter(text)
        .map(|caps| (caps[1].to_owned(), caps[2].to_owned()))
        .collect()
}

/// Decode one UGC block
///
/// `valid` is the product issuance time, against which the
/// expiration's `DDHHMM` is placed on the calendar.
pub fn parse_ugc_block(
    codes: &str,
    ddhhmm: &str,
    valid: &DateTime<Utc>,
) -> Result<UgcBlock, UgcParseErr> {
    Ok(UgcBlock {
        ugcs: parse_ugc_codes(codes)?,
        expire: parse_ugc_expire(ddhhmm, valid)?,
    })
}

/// Expand the code portion of a UGC block into identifiers
pub fn parse_ugc_codes(codes: &str) -> Result<Vec<Ugc>, UgcParseErr> {
    let cleaned: String = codes.chars().filter(|c| !c.is_whitespace()).collect();

    let mut prefix: Option<(String, UgcKind)> = None;
    let mut out = Vec::new();
    for token in cleaned.split('-').filter(|t| !t.is_empty()) {
        let mut parts = token.split('>');
        let first = parts.next().unwrap_or_default();
        let last = parts.next();
        if parts.next().is_some() {
            return Err(UgcParseErr::MalformedToken(token.to_owned()));
        }

        let start = take_number(first, &mut prefix, token)?;
        let (state, kind) = prefix
            .clone()
            .ok_or_else(|| UgcParseErr::MissingPrefix(token.to_owned()))?;

        match last {
            None => out.push(Ugc::new(state, kind, start)),
            Some(last) => {
                let end = match last.len() {
                    3 | 6 => parse_number(&last[last.len() - 3..]),
                    _ => None,
                }
                .ok_or_else(|| UgcParseErr::MalformedToken(token.to_owned()))?;
                if end < start {
                    return Err(UgcParseErr::EmptyRange(token.to_owned()));
                }

                let stride = kind.stride(start);
                let mut num = start;
                while num <= end {
                    out.push(Ugc::new(state.clone(), kind, num));
                    num += stride;
                }
            }
        }
    }

    Ok(out)
}

/// Decode a UGC expiration `DDHHMM`
///
/// The sentinels `000000` and `123456` mean "no expiration."
pub fn parse_ugc_expire(
    ddhhmm: &str,
    valid: &DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, UgcParseErr> {
    if ddhhmm == "000000" || ddhhmm == "123456" {
        return Ok(None);
    }
    let (day, hour, minute) =
        parse_ddhhmm(ddhhmm).ok_or_else(|| UgcParseErr::InvalidExpiration(ddhhmm.to_owned()))?;
    resolve_ddhhmm(day, hour, minute, valid)
        .map(Some)
        .map_err(|_e| UgcParseErr::InvalidExpiration(ddhhmm.to_owned()))
}

/// Re-encode identifiers into compressed UGC form
///
/// Runs of three or more identifiers which step by the kind's
/// stride collapse into `A>B` ranges. A new state-and-kind prefix
/// is written only when it changes. The output ends with `-`, as
/// in the product.
///
/// ```
/// use nwstext::{encode_ugcs, parse_ugc_codes};
///
/// let ugcs = parse_ugc_codes("IAC001>005-MDZ004-006-").unwrap();
/// assert_eq!(ugcs.len(), 5);
/// assert_eq!(encode_ugcs(&ugcs), "IAC001>005-MDZ004-006-");
/// ```
pub fn encode_ugcs(ugcs: &[Ugc]) -> String {
    let mut out = String::new();
    let mut prefix: Option<(&str, UgcKind)> = None;

    let mut i = 0;
    while i < ugcs.len() {
        let head = &ugcs[i];
        let stride = head.kind.stride(head.number);

        // extend the run while numbers step by the stride
        let mut j = i;
        while j + 1 < ugcs.len()
            && ugcs[j + 1].state == head.state
            && ugcs[j + 1].kind == head.kind
            && ugcs[j + 1].number == ugcs[j].number + stride
        {
            j += 1;
        }

        let this_prefix = (head.state.as_str(), head.kind);
        if prefix != Some(this_prefix) {
            out.push_str(&head.state);
            out.push(head.kind.as_char());
            prefix = Some(this_prefix);
        }

        if j - i >= 2 {
            out.push_str(&format!("{:03}>{:03}-", head.number, ugcs[j].number));
            i = j + 1;
        } else {
            out.push_str(&format!("{:03}-", head.number));
            i += 1;
        }
    }

    out
}

// Consume a 3- or 6-character token, updating the rolling prefix
fn take_number(
    part: &str,
    prefix: &mut Option<(String, UgcKind)>,
    token: &str,
) -> Result<u16, UgcParseErr> {
    match part.len() {
        6 => {
            let (state, kind) =
                parse_prefix(part).ok_or_else(|| UgcParseErr::MalformedToken(token.to_owned()))?;
            *prefix = Some((state.to_owned(), kind));
            parse_number(&part[3..]).ok_or_else(|| UgcParseErr::MalformedToken(token.to_owned()))
        }
        3 => {
            if prefix.is_none() {
                return Err(UgcParseErr::MissingPrefix(token.to_owned()));
            }
            parse_number(part).ok_or_else(|| UgcParseErr::MalformedToken(token.to_owned()))
        }
        _ if prefix.is_none() => Err(UgcParseErr::MissingPrefix(token.to_owned())),
        _ => Err(UgcParseErr::MalformedToken(token.to_owned())),
    }
}

// Split `IAC` from `IAC001`
fn parse_prefix(code: &str) -> Option<(&str, UgcKind)> {
    if code.len() != 6 || !code.is_ascii() {
        return None;
    }
    let state = &code[0..2];
    if !state.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let kind = UgcKind::from_char(code.as_bytes()[2] as char)?;
    Some((state, kind))
}

fn parse_number(digits: &str) -> Option<u16> {
    if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
