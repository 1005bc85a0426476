//! VTEC significance level

use std::fmt;

use strum::EnumMessage;

/// VTEC significance level
///
/// The one-letter code which follows the phenomenon in a VTEC
/// string. `TO.W` is a Tornado **Warning**; `TO.A` is a Tornado
/// **Watch**.
///
/// | Code | Significance                                     |
/// |------|--------------------------------------------------|
/// | `N`  | [synopsis](crate::SignificanceLevel::Synopsis)   |
/// | `F`  | [forecast](crate::SignificanceLevel::Forecast)   |
/// | `O`  | [outlook](crate::SignificanceLevel::Outlook)     |
/// | `S`  | [statement](crate::SignificanceLevel::Statement) |
/// | `Y`  | [advisory](crate::SignificanceLevel::Advisory)   |
/// | `A`  | [watch](crate::SignificanceLevel::Watch)         |
/// | `W`  | [warning](crate::SignificanceLevel::Warning)     |
///
/// ```
/// use nwstext::SignificanceLevel;
///
/// assert_eq!(SignificanceLevel::Watch, SignificanceLevel::from("A"));
/// assert_eq!("Advisory", SignificanceLevel::Advisory.as_display_str());
/// assert_eq!("Y", format!("{:#}", SignificanceLevel::Advisory));
/// ```
///
/// Significance levels are `Ord`, from least to most urgent.
/// Unrecognized codes become [`SignificanceLevel::Unknown`], which
/// sorts above `Warning`.
///
/// ```
/// # use nwstext::SignificanceLevel;
/// assert!(SignificanceLevel::Advisory < SignificanceLevel::Warning);
/// assert!(SignificanceLevel::Unknown > SignificanceLevel::Warning);
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum SignificanceLevel {
    /// Synopsis
    #[strum(serialize = "N", detailed_message = "Synopsis")]
    Synopsis,

    /// Forecast
    #[strum(serialize = "F", detailed_message = "Forecast")]
    Forecast,

    /// Outlook
    #[strum(serialize = "O", detailed_message = "Outlook")]
    Outlook,

    /// Statement
    ///
    /// Follow-up information for a warning, watch, or advisory.
    #[strum(serialize = "S", detailed_message = "Statement")]
    Statement,

    /// Advisory
    ///
    /// Conditions which cause significant inconvenience but are
    /// less serious than a warning.
    #[strum(serialize = "Y", detailed_message = "Advisory")]
    Advisory,

    /// Watch
    ///
    /// Risk of a hazardous event has increased, but its
    /// occurrence, location, or timing is uncertain.
    #[strum(serialize = "A", detailed_message = "Watch")]
    Watch,

    /// Warning (the most severe event)
    ///
    /// A hazardous event is occurring, imminent, or likely.
    #[strum(serialize = "W", detailed_message = "Warning")]
    Warning,

    /// Unknown significance level
    ///
    /// Clients are advised to treat unknown-significance events as
    /// [`SignificanceLevel::Warning`].
    #[default]
    #[strum(serialize = "", detailed_message = "Warning")]
    Unknown,
}

impl SignificanceLevel {
    /// Parse from a one-character code like "`W`"
    ///
    /// Unrecognized input yields [`SignificanceLevel::Unknown`].
    pub fn from<S>(code: S) -> Self
    where
        S: AsRef<str>,
    {
        str::parse(code.as_ref()).unwrap_or_default()
    }

    /// Human-readable string representation, like "`Warning`"
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// One-character VTEC code
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }
}

impl AsRef<str> for SignificanceLevel {
    fn as_ref(&self) -> &'static str {
        self.as_code_str()
    }
}

/// `{}` gives the name and `{:#}` gives the code
impl fmt::Display for SignificanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.as_code_str().fmt(f)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use strum::IntoEnumIterator;

    #[test]
    fn test_round_trip_codes() {
        for sig in SignificanceLevel::iter() {
            if sig == SignificanceLevel::Unknown {
                continue;
            }
            assert_eq!(sig, SignificanceLevel::from(sig.as_code_str()));
        }
        assert_eq!(SignificanceLevel::Unknown, SignificanceLevel::from("Q"));
        assert_eq!(SignificanceLevel::Unknown, SignificanceLevel::from(""));
    }
}
