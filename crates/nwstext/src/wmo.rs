//! WMO abbreviated heading and AFOS identifier

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Error decoding the WMO abbreviated heading
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WmoHeaderErr {
    /// No heading was found near the start of the product
    #[error("invalid product: WMO abbreviated heading not found")]
    NotFound,
}

/// Originators known to send four-character `TTAAII`
///
/// Padding is applied silently for these.
const SILENT_SHORT_TTAAII: &[&str] = &["KWNO", "KWBC", "KNCF"];

/// WMO abbreviated heading
///
/// The first line of every bulletin, such as
///
/// ```txt
/// WUUS53 KJAN 291651 CCA
/// ```
///
/// * `TTAAII`: data type and geographic designators
/// * `CCCC`: originating center
/// * `DDHHMM`: UTC day of month, hour, and minute
/// * `BBB`: optional amendment indicator, like `CCA` or `RRA`
///
/// `Display` re-emits the heading in canonical form.
///
/// ```
/// use nwstext::WmoHeading;
///
/// let (hdr, _padded) = WmoHeading::parse("000 \nWUUS53 KJAN 291651\nTORJAN").unwrap();
/// assert_eq!(hdr.ttaaii(), "WUUS53");
/// assert_eq!(hdr.cccc(), "KJAN");
/// assert_eq!(hdr.to_string(), "WUUS53 KJAN 291651");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WmoHeading {
    ttaaii: String,
    cccc: String,
    ddhhmm: String,
    bbb: Option<String>,
}

impl WmoHeading {
    /// Locate and decode the heading in normalized product text
    ///
    /// Only the first 100 bytes are searched. Returns the heading
    /// and a flag which is `true` when a four-character `TTAAII`
    /// was padded with `00`.
    pub fn parse(text: &str) -> Result<(Self, bool), WmoHeaderErr> {
        lazy_static! {
            static ref RE: Regex = Regex::new(
                r"(?m)^([A-Z0-9]{4,6}) ([A-Z]{4}) ([0-3][0-9][0-2][0-9][0-5][0-9])[ \t]*([ACR][ACMORT][A-Z])?"
            )
            .expect("bad WMO regexp");
        }

        let mut end = text.len().min(100);
        while !text.is_char_boundary(end) {
            end -= 1;
        }

        let caps = RE.captures(&text[..end]).ok_or(WmoHeaderErr::NotFound)?;
        let mut ttaaii = caps[1].to_owned();
        let padded = ttaaii.len() == 4;
        if padded {
            ttaaii.push_str("00");
        }

        Ok((
            Self {
                ttaaii,
                cccc: caps[2].to_owned(),
                ddhhmm: caps[3].to_owned(),
                bbb: caps.get(4).map(|m| m.as_str().to_owned()),
            },
            padded,
        ))
    }

    /// Data type and geographic designators, like "`WUUS53`"
    pub fn ttaaii(&self) -> &str {
        &self.ttaaii
    }

    /// Originating center, like "`KJAN`"
    pub fn cccc(&self) -> &str {
        &self.cccc
    }

    /// UTC day-hour-minute, like "`291651`"
    pub fn ddhhmm(&self) -> &str {
        &self.ddhhmm
    }

    /// Amendment indicator, like "`CCA`"
    pub fn bbb(&self) -> Option<&str> {
        self.bbb.as_deref()
    }

    /// True if padding a short `TTAAII` from this center merits a warning
    pub(crate) fn padding_is_noteworthy(&self) -> bool {
        !SILENT_SHORT_TTAAII.contains(&self.cccc.as_str())
    }
}

impl fmt::Display for WmoHeading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.ttaaii, self.cccc, self.ddhhmm)?;
        if let Some(bbb) = &self.bbb {
            write!(f, " {}", bbb)?;
        }
        Ok(())
    }
}

/// Find the AFOS product identifier
///
/// The AFOS identifier (or "PIL") is a line of four to six
/// upper-case letters and digits, like `TORJAN`, which appears
/// within the first few lines after the WMO heading.
pub fn find_afos(text: &str) -> Option<String> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^([A-Z0-9]{4,6})\s*$").expect("bad AFOS regexp");
    }
    const SEARCH_LINES: usize = 5;

    let mut lines = text.lines();
    // skip through the WMO heading itself
    lines
        .by_ref()
        .find(|line| WmoHeading::parse(line).is_ok())?;

    lines
        .take(SEARCH_LINES)
        .filter_map(|line| RE.captures(line))
        .map(|caps| caps[1].to_owned())
        .next()
}
