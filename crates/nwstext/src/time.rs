//! Issuance time resolution
//!
//! NWS products carry two independent clues to their issuance time:
//!
//! 1. The WMO heading's `DDHHMM` field (UTC day-of-month, hour,
//!    and minute), which omits the month and year.
//!
//! 2. The Mass News Dissemination (MND) line, such as
//!    `1151 AM CDT MON AUG 29 2005`, which is complete but given
//!    in local time.
//!
//! When both are available the MND wins.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use lazy_static::lazy_static;
use phf::phf_map;
use regex::Regex;
use thiserror::Error;

/// An invalid or unrepresentable timestamp
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
#[error("timestamp is not valid: {0}")]
pub struct InvalidDateErr(pub String);

/// Error decoding the MND timestamp line
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MndErr {
    /// The timezone abbreviation is not in the offset table
    #[error("unknown timezone abbreviation \"{0}\"")]
    UnknownTimezone(String),

    /// The hour or minute is impossible for the clock in use
    #[error("MND clock time {0:02}:{1:02} is not valid")]
    InvalidClock(u32, u32),

    /// The calendar date does not exist
    #[error("MND calendar date is not valid")]
    InvalidDate,
}

/// UTC offsets, in minutes east, keyed by upper-case abbreviation
static TIMEZONES: phf::Map<&'static str, i32> = phf_map! {
    "UTC" => 0,
    "GMT" => 0,
    "Z" => 0,
    "NST" => -210,
    "NDT" => -150,
    "AST" => -240,
    "ADT" => -180,
    "EST" => -300,
    "EDT" => -240,
    "CST" => -360,
    "CDT" => -300,
    "MST" => -420,
    "MDT" => -360,
    "PST" => -480,
    "PDT" => -420,
    "AKST" => -540,
    "AKDT" => -480,
    "HST" => -600,
    "HDT" => -540,
    "SST" => -660,
    "CHST" => 600,
};

/// Look up a timezone abbreviation's UTC offset in minutes
///
/// The lookup is case-insensitive, so `ChST` and `CHST` agree.
pub fn timezone_offset_minutes(abbrev: &str) -> Option<i32> {
    TIMEZONES.get(abbrev.to_ascii_uppercase().as_str()).copied()
}

/// A product's local timezone, as written in its MND line
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ZoneLabel {
    abbrev: String,
    offset_minutes: i32,
}

impl ZoneLabel {
    /// Label for a known abbreviation, or `None` if it is unknown
    pub fn new<S>(abbrev: S) -> Option<Self>
    where
        S: Into<String>,
    {
        let abbrev = abbrev.into();
        let offset_minutes = timezone_offset_minutes(&abbrev)?;
        Some(Self {
            abbrev,
            offset_minutes,
        })
    }

    /// The UTC label
    pub fn utc() -> Self {
        Self {
            abbrev: "UTC".to_owned(),
            offset_minutes: 0,
        }
    }

    /// Abbreviation, like "`CDT`"
    pub fn abbrev(&self) -> &str {
        &self.abbrev
    }

    /// Offset from UTC in minutes (east positive)
    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes
    }

    /// Offset as a chrono `FixedOffset`
    pub fn fixed_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Convert a UTC instant into this zone's wall-clock time
    pub fn localize(&self, utc: &DateTime<Utc>) -> DateTime<FixedOffset> {
        utc.with_timezone(&self.fixed_offset())
    }
}

impl fmt::Display for ZoneLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.abbrev.fmt(f)
    }
}

/// AM/PM marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Meridiem {
    /// Ante meridiem
    Am,
    /// Post meridiem
    Pm,
}

/// Raw fields of an MND timestamp line
///
/// Obtained from [`find_mnd()`]. The fields are exactly as written;
/// convert with [`MndTime::to_utc()`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MndTime {
    pub hour: u32,
    pub minute: u32,
    pub meridiem: Option<Meridiem>,
    pub zone: String,
    pub month: u32,
    pub day: u32,
    pub year: i32,
}

impl MndTime {
    /// Resolve to a UTC instant
    ///
    /// Returns the instant and the zone label. Products which
    /// write a 24-hour UTC clock without a meridiem (`1651 UTC`)
    /// are accepted.
    pub fn to_utc(&self) -> Result<(DateTime<Utc>, ZoneLabel), MndErr> {
        let label =
            ZoneLabel::new(self.zone.clone()).ok_or_else(|| MndErr::UnknownTimezone(self.zone.clone()))?;
        let is_utc = matches!(
            label.abbrev().to_ascii_uppercase().as_str(),
            "UTC" | "GMT" | "Z"
        );

        let mut hour = self.hour;
        let mut meridiem = self.meridiem;
        if meridiem.is_none() && hour > 12 && is_utc {
            hour -= 12;
            meridiem = Some(Meridiem::Pm);
        }

        if self.minute > 59 {
            return Err(MndErr::InvalidClock(self.hour, self.minute));
        }

        let hour24 = match meridiem {
            Some(m) => {
                if !(1..=12).contains(&hour) {
                    return Err(MndErr::InvalidClock(self.hour, self.minute));
                }
                match m {
                    Meridiem::Am => hour % 12,
                    Meridiem::Pm => hour % 12 + 12,
                }
            }
            None if hour < 24 => hour,
            None => return Err(MndErr::InvalidClock(self.hour, self.minute)),
        };

        let local = NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .and_then(|d| d.and_hms_opt(hour24, self.minute, 0))
            .ok_or(MndErr::InvalidDate)?;
        let utc = local - Duration::minutes(label.offset_minutes() as i64);
        Ok((Utc.from_utc_datetime(&utc), label))
    }
}

/// Search product text for the MND timestamp line
///
/// Accepts `HHMM AM TZ WKD MON DD YYYY`, with an optional colon in
/// the clock, an optional meridiem, and an optional trailing
/// duplicate time in slashes or parentheses (which is ignored).
pub fn find_mnd(text: &str) -> Option<MndTime> {
    lazy_static! {
        static ref RE: Regex = Regex::new(
            r"(?im)^[ \t]*(\d{1,2}):?(\d{2})[ \t]*(AM|PM)?[ \t]+([A-Z]{1,4})[ \t]+(SUN|MON|TUE|WED|THU|FRI|SAT)[ \t]+([A-Z]{3})[ \t]+(\d{1,2})[ \t]+(\d{4})(?:[ \t]*[/(].*)?[ \t]*$"
        )
        .expect("bad MND regexp");
    }

    for caps in RE.captures_iter(text) {
        let month = match month_number(&caps[6]) {
            Some(m) => m,
            None => continue,
        };
        let meridiem = caps.get(3).map(|m| {
            if m.as_str().eq_ignore_ascii_case("AM") {
                Meridiem::Am
            } else {
                Meridiem::Pm
            }
        });

        return Some(MndTime {
            hour: caps[1].parse().ok()?,
            minute: caps[2].parse().ok()?,
            meridiem,
            zone: caps[4].to_owned(),
            month,
            day: caps[7].parse().ok()?,
            year: caps[8].parse().ok()?,
        });
    }

    None
}

/// Month number for a three-letter (or longer) English month name
pub fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(0..3)?.to_ascii_uppercase();
    let num = match prefix.as_str() {
        "JAN" => 1,
        "FEB" => 2,
        "MAR" => 3,
        "APR" => 4,
        "MAY" => 5,
        "JUN" => 6,
        "JUL" => 7,
        "AUG" => 8,
        "SEP" => 9,
        "OCT" => 10,
        "NOV" => 11,
        "DEC" => 12,
        _ => return None,
    };
    Some(num)
}

/// Split a `DDHHMM` string into (day, hour, minute)
pub fn parse_ddhhmm(ddhhmm: &str) -> Option<(u32, u32, u32)> {
    if ddhhmm.len() != 6 || !ddhhmm.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((
        ddhhmm[0..2].parse().ok()?,
        ddhhmm[2..4].parse().ok()?,
        ddhhmm[4..6].parse().ok()?,
    ))
}

/// Place a `DDHHMM` timestamp onto the calendar
///
/// The month and year are inferred from `now`. The day is tried
/// in the month of `now` and of `now + 1 day`. Early in a month, a
/// late day (> 25) may belong to the previous month; late in a
/// month, an early day (< 5) may belong to the next. Whichever
/// candidate lies nearest `now` wins.
pub fn resolve_ddhhmm(
    day: u32,
    hour: u32,
    minute: u32,
    now: &DateTime<Utc>,
) -> Result<DateTime<Utc>, InvalidDateErr> {
    let mut anchors = vec![*now, *now + Duration::days(1)];
    if day > 25 && now.day() < 15 {
        anchors.push(*now - Duration::days(10));
    }
    if day < 5 && now.day() > 25 {
        anchors.push(*now + Duration::days(10));
    }

    anchors
        .iter()
        .filter_map(|anchor| {
            Utc.with_ymd_and_hms(anchor.year(), anchor.month(), day, hour, minute, 0)
                .single()
        })
        .min_by_key(|candidate| (*candidate - *now).num_seconds().abs())
        .ok_or_else(|| InvalidDateErr(format!("{:02}{:02}{:02}", day, hour, minute)))
}

/// Parse a VTEC-style `YYMMDDTHHMMZ` timestamp
///
/// A run of zeros (as in `000000T0000Z`) means "no time" and
/// yields `Ok(None)`.
pub fn parse_vtec_time(stamp: &str) -> Result<Option<DateTime<Utc>>, InvalidDateErr> {
    if stamp.bytes().all(|b| matches!(b, b'0' | b'T' | b'Z')) {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(stamp, "%y%m%dT%H%MZ")
        .map(|dt| Some(Utc.from_utc_datetime(&dt)))
        .map_err(|_e| InvalidDateErr(stamp.to_owned()))
}

/// Format a UTC instant as a VTEC timestamp, or zeros for `None`
pub fn format_vtec_time(ts: Option<&DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => ts.format("%y%m%dT%H%MZ").to_string(),
        None => "000000T0000Z".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_timezone_table() {
        assert_eq!(Some(-300), timezone_offset_minutes("CDT"));
        assert_eq!(Some(600), timezone_offset_minutes("ChST"));
        assert_eq!(Some(-540), timezone_offset_minutes("akst"));
        assert_eq!(None, timezone_offset_minutes("XYZ"));
    }

    #[test]
    fn test_find_mnd() {
        let txt = "TORNADO WARNING\nNATIONAL WEATHER SERVICE JACKSON MS\n1151 AM CDT MON AUG 29 2005\n\nMORE";
        let mnd = find_mnd(txt).expect("no MND");
        assert_eq!(mnd.hour, 11);
        assert_eq!(mnd.minute, 51);
        assert_eq!(mnd.meridiem, Some(Meridiem::Am));
        assert_eq!(mnd.zone, "CDT");
        assert_eq!((mnd.year, mnd.month, mnd.day), (2005, 8, 29));

        let (ts, label) = mnd.to_utc().unwrap();
        assert_eq!(ts, utc(2005, 8, 29, 16, 51));
        assert_eq!(label.abbrev(), "CDT");

        // colon form, lower case, with trailing duplicate time
        let mnd = find_mnd("1:05 pm est tue jan 8 2019 /12:05 PM CST TUE JAN 8 2019/").unwrap();
        assert_eq!(mnd.to_utc().unwrap().0, utc(2019, 1, 8, 18, 5));

        assert!(find_mnd("NOTHING TO SEE HERE").is_none());
    }

    #[test]
    fn test_mnd_clock_edge_cases() {
        // 12 AM is midnight
        let mnd = find_mnd("1200 AM CST SUN JAN 27 2013").unwrap();
        assert_eq!(mnd.to_utc().unwrap().0, utc(2013, 1, 27, 6, 0));

        // 24-hour UTC without a meridiem
        let mnd = find_mnd("1651 UTC MON AUG 29 2005").unwrap();
        assert_eq!(mnd.to_utc().unwrap().0, utc(2005, 8, 29, 16, 51));

        // Guam is ahead of UTC
        let mnd = find_mnd("1000 AM ChST WED JUL 5 2023").unwrap();
        assert_eq!(mnd.to_utc().unwrap().0, utc(2023, 7, 5, 0, 0));

        // impossible 12-hour clock
        let mnd = find_mnd("24:59 PM CDT MON AUG 29 2005").unwrap();
        assert_eq!(mnd.to_utc(), Err(MndErr::InvalidClock(24, 59)));

        // unknown zone
        let mnd = find_mnd("1151 AM QQT MON AUG 29 2005").unwrap();
        assert_eq!(mnd.to_utc(), Err(MndErr::UnknownTimezone("QQT".to_owned())));

        // no such day
        let mnd = find_mnd("1151 AM CDT MON FEB 30 2005").unwrap();
        assert_eq!(mnd.to_utc(), Err(MndErr::InvalidDate));
    }

    #[test]
    fn test_resolve_ddhhmm() {
        let now = utc(2005, 8, 29, 17, 0);
        assert_eq!(resolve_ddhhmm(29, 16, 51, &now).unwrap(), utc(2005, 8, 29, 16, 51));

        // tomorrow, across the end of the month
        let now = utc(2005, 8, 31, 23, 50);
        assert_eq!(resolve_ddhhmm(1, 0, 5, &now).unwrap(), utc(2005, 9, 1, 0, 5));

        // late in the previous month
        let now = utc(2013, 3, 1, 2, 0);
        assert_eq!(resolve_ddhhmm(28, 23, 0, &now).unwrap(), utc(2013, 2, 28, 23, 0));

        // across the new year
        let now = utc(2012, 12, 31, 23, 0);
        assert_eq!(resolve_ddhhmm(1, 1, 0, &now).unwrap(), utc(2013, 1, 1, 1, 0));

        // there is no 31 April, and the 20th is too late to wrap back
        let now = utc(2013, 4, 20, 0, 0);
        resolve_ddhhmm(31, 0, 0, &now).expect_err("should not succeed");
    }

    #[test]
    fn test_vtec_time() {
        assert_eq!(
            parse_vtec_time("050829T1651Z").unwrap(),
            Some(utc(2005, 8, 29, 16, 51))
        );
        assert_eq!(parse_vtec_time("000000T0000Z").unwrap(), None);
        parse_vtec_time("051329T1651Z").expect_err("should not succeed");

        assert_eq!(format_vtec_time(Some(&utc(2013, 1, 28, 6, 0))), "130128T0600Z");
        assert_eq!(format_vtec_time(None), "000000T0000Z");
    }
}
