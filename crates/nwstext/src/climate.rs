//! Daily climate reports
//!
//! Climate Report (`CLI`) products tabulate one day's observations
//! for one station, alongside normals, records, and departures.
//! A product may hold several reports. Each begins with a header
//! like
//!
//! ```txt
//! ...THE WATERLOO CLIMATE SUMMARY FOR JANUARY 22 2013...
//! ```
//!
//! and is followed by a `WEATHER ITEM` table whose rows are
//! grouped into sections like `TEMPERATURE (F)`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use strum_macros::{EnumIter, EnumMessage, EnumString};

use crate::product::Product;
use crate::time::month_number;

/// One observed or tabulated quantity
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ClimateValue {
    /// A number, in the units of its section
    Value(f64),

    /// Precipitation too small to measure, printed as `T`
    Trace,

    /// Not available, printed as `MM`
    Missing,
}

impl ClimateValue {
    /// Numeric value, if there is one
    ///
    /// A trace counts as zero.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ClimateValue::Value(v) => Some(*v),
            ClimateValue::Trace => Some(0.0),
            ClimateValue::Missing => None,
        }
    }
}

impl FromStr for ClimateValue {
    type Err = ();

    /// Parse a table cell
    ///
    /// A trailing `R`, which marks a new or tied record, is
    /// ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T" => Ok(ClimateValue::Trace),
            "MM" | "M" => Ok(ClimateValue::Missing),
            _ => {
                let num = s.strip_suffix('R').unwrap_or(s);
                if num.is_empty() || !num.chars().any(|c| c.is_ascii_digit()) {
                    return Err(());
                }
                num.parse().map(ClimateValue::Value).map_err(|_| ())
            }
        }
    }
}

impl fmt::Display for ClimateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClimateValue::Value(v) => write!(f, "{}", v),
            ClimateValue::Trace => write!(f, "T"),
            ClimateValue::Missing => write!(f, "MM"),
        }
    }
}

/// Climate report table section
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumMessage, EnumString, EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ClimateSection {
    #[strum(serialize = "TEMPERATURE (F)", detailed_message = "Temperature")]
    Temperature,

    #[strum(serialize = "PRECIPITATION (IN)", detailed_message = "Precipitation")]
    Precipitation,

    #[strum(serialize = "SNOWFALL (IN)", detailed_message = "Snowfall")]
    Snowfall,

    #[strum(serialize = "DEGREE DAYS", detailed_message = "Degree days")]
    DegreeDays,

    #[strum(serialize = "WIND (MPH)", detailed_message = "Wind")]
    Wind,

    #[strum(serialize = "SKY COVER", detailed_message = "Sky cover")]
    SkyCover,

    #[strum(serialize = "RELATIVE HUMIDITY (PERCENT)", detailed_message = "Relative humidity")]
    RelativeHumidity,
}

impl ClimateSection {
    /// Human-readable section name
    pub fn as_display_str(&self) -> &'static str {
        use strum::EnumMessage;
        self.get_detailed_message().expect("missing definition")
    }

    /// Section heading as printed, like `TEMPERATURE (F)`
    pub fn as_heading_str(&self) -> &'static str {
        use strum::EnumMessage;
        self.get_serializations()[0]
    }
}

impl fmt::Display for ClimateSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_display_str())
    }
}

/// One row of a climate table
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClimateRow {
    pub section: ClimateSection,

    /// Sub-heading the row appears under, like `YESTERDAY` or
    /// `HEATING`
    pub period: Option<String>,

    /// Row label, like `MAXIMUM` or `MONTH TO DATE`
    pub label: String,

    pub value: ClimateValue,

    /// Time of occurrence, like `259 PM`
    pub time: Option<String>,

    pub record: Option<ClimateValue>,

    /// Every year in which the record was set
    pub record_years: Vec<u16>,

    pub normal: Option<ClimateValue>,
    pub departure: Option<ClimateValue>,
    pub last_year: Option<ClimateValue>,
}

/// Wind summary
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClimateWind {
    pub highest_speed: Option<f64>,

    /// Compass point and degrees, like `("NW", 310)`
    pub highest_direction: Option<(String, u16)>,

    pub highest_gust_speed: Option<f64>,
    pub highest_gust_direction: Option<(String, u16)>,
    pub average_speed: Option<f64>,
    pub resultant_speed: Option<f64>,
    pub resultant_direction: Option<(String, u16)>,
}

/// One station's daily climate report
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClimateReport {
    /// Station name, like `WATERLOO`
    pub station: Option<String>,

    /// Day the report summarizes
    pub date: Option<NaiveDate>,

    /// Table rows, in report order
    pub rows: Vec<ClimateRow>,

    pub wind: ClimateWind,

    /// Average sky cover, in tenths
    pub average_sky_cover: Option<ClimateValue>,

    /// Defects found while decoding
    pub warnings: Vec<String>,
}

impl ClimateReport {
    /// First row in `section` with `label`
    ///
    /// If `period` is given, the row must also appear under that
    /// sub-heading.
    pub fn row(
        &self,
        section: ClimateSection,
        period: Option<&str>,
        label: &str,
    ) -> Option<&ClimateRow> {
        self.rows.iter().find(|r| {
            r.section == section
                && r.label == label
                && period.map_or(true, |p| r.period.as_deref() == Some(p))
        })
    }

    /// Daily maximum temperature
    pub fn temperature_maximum(&self) -> Option<&ClimateRow> {
        self.row(ClimateSection::Temperature, None, "MAXIMUM")
    }

    /// Daily minimum temperature
    pub fn temperature_minimum(&self) -> Option<&ClimateRow> {
        self.row(ClimateSection::Temperature, None, "MINIMUM")
    }

    /// Precipitation on the report day
    pub fn precip_today(&self) -> Option<&ClimateRow> {
        self.day_row(ClimateSection::Precipitation, None)
    }

    /// Precipitation for the month to date
    pub fn precip_month(&self) -> Option<&ClimateRow> {
        self.row(ClimateSection::Precipitation, None, "MONTH TO DATE")
    }

    /// Snowfall on the report day
    pub fn snow_today(&self) -> Option<&ClimateRow> {
        self.day_row(ClimateSection::Snowfall, None)
    }

    /// Snow depth
    pub fn snow_depth(&self) -> Option<&ClimateRow> {
        self.row(ClimateSection::Snowfall, None, "SNOW DEPTH")
    }

    /// Heating degree days on the report day
    pub fn heating_degree_days(&self) -> Option<&ClimateRow> {
        self.day_row(ClimateSection::DegreeDays, Some("HEATING"))
    }

    /// Cooling degree days on the report day
    pub fn cooling_degree_days(&self) -> Option<&ClimateRow> {
        self.day_row(ClimateSection::DegreeDays, Some("COOLING"))
    }

    fn day_row(&self, section: ClimateSection, period: Option<&str>) -> Option<&ClimateRow> {
        self.row(section, period, "YESTERDAY")
            .or_else(|| self.row(section, period, "TODAY"))
    }
}

/// Decode every climate report in a product
pub fn parse_climate_product(product: &Product) -> Vec<ClimateReport> {
    parse_climate_text(product.text())
}

/// Decode every climate report in normalized product text
///
/// Text without any `CLIMATE SUMMARY FOR` header is decoded as
/// a single report with no station or date. A report without a
/// `WEATHER ITEM` table is returned empty, with a warning.
pub fn parse_climate_text(text: &str) -> Vec<ClimateReport> {
    lazy_static! {
        static ref HEADER: Regex = Regex::new(
            r"(?m)^[ \t]*\.*[ \t]*(?:THE[ \t]+)?(.*?)[ \t]+CLIMATE SUMMARY FOR[ \t]+([A-Z]+)[ \t]+(\d{1,2})[ \t]+(\d{4})"
        )
        .expect("bad climate header regexp");
    }

    let headers: Vec<_> = HEADER.captures_iter(text).collect();
    if headers.is_empty() {
        return vec![parse_report(text, None, None)];
    }

    let mut out = Vec::with_capacity(headers.len());
    for (i, caps) in headers.iter().enumerate() {
        let start = caps.get(0).map_or(0, |m| m.start());
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());

        let station = caps
            .get(1)
            .map(|m| m.as_str().trim().to_owned())
            .filter(|s| !s.is_empty());
        let date = month_number(&caps[2]).and_then(|month| {
            NaiveDate::from_ymd_opt(caps[4].parse().ok()?, month, caps[3].parse().ok()?)
        });

        let mut report = parse_report(&text[start..end], station, date);
        if date.is_none() {
            report.warnings.push(format!(
                "climate summary date \"{} {} {}\" is invalid",
                &caps[2], &caps[3], &caps[4]
            ));
        }
        out.push(report);
    }
    out
}

fn parse_report(text: &str, station: Option<String>, date: Option<NaiveDate>) -> ClimateReport {
    let mut report = ClimateReport {
        station,
        date,
        ..Default::default()
    };

    let table = match text.find("WEATHER ITEM") {
        Some(pos) => &text[pos..],
        None => {
            report
                .warnings
                .push("climate report has no WEATHER ITEM table".to_owned());
            return report;
        }
    };

    let mut section: Option<ClimateSection> = None;
    let mut period: Option<String> = None;
    for line in table.lines().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
            continue;
        }
        if trimmed == "$$" {
            break;
        }

        // section headings start in the first column
        if !line.starts_with(' ') {
            section = trimmed.parse().ok();
            period = None;
            continue;
        }
        let section = match section {
            Some(s) => s,
            None => continue,
        };

        match section {
            ClimateSection::Wind => parse_wind_line(trimmed, &mut report.wind),
            ClimateSection::SkyCover => {
                if let Some(v) = trimmed.strip_prefix("AVERAGE SKY COVER") {
                    report.average_sky_cover = v.trim().parse().ok();
                }
            }
            _ => {
                let tokens: Vec<&str> = trimmed.split_whitespace().collect();
                if tokens.iter().all(|t| is_year(t)) {
                    // record years which did not fit on the row
                    match report.rows.last_mut() {
                        Some(row) if row.section == section => row
                            .record_years
                            .extend(tokens.iter().filter_map(|t| t.parse::<u16>().ok())),
                        _ => report
                            .warnings
                            .push(format!("orphaned record years \"{}\"", trimmed)),
                    }
                    continue;
                }
                match parse_row(&tokens) {
                    Some((label, mut row)) => {
                        row.section = section;
                        row.period = period.clone();
                        row.label = label;
                        report.rows.push(row);
                    }
                    None => period = Some(trimmed.to_owned()),
                }
            }
        }
    }

    report
}

/// Split a row into its label and values
///
/// Returns `None` if the row has no values, in which case it is
/// a sub-heading.
fn parse_row(tokens: &[&str]) -> Option<(String, ClimateRow)> {
    // labels like "SINCE JAN 1" contain a number
    let label_len = tokens
        .iter()
        .enumerate()
        .position(|(i, tok)| {
            let after_month = i > 0 && month_number(tokens[i - 1]).is_some();
            !after_month && tok.parse::<ClimateValue>().is_ok()
        })?;
    if label_len == 0 {
        return None;
    }
    let label = tokens[..label_len].join(" ");
    let rest = &tokens[label_len..];

    let value: ClimateValue = rest[0].parse().ok()?;
    let mut idx = 1;

    let mut time = None;
    if idx + 1 < rest.len()
        && is_clock(rest[idx])
        && (rest[idx + 1] == "AM" || rest[idx + 1] == "PM")
    {
        time = Some(format!("{} {}", rest[idx], rest[idx + 1]));
        idx += 2;
    }

    let mut row = ClimateRow {
        section: ClimateSection::Temperature,
        period: None,
        label: String::new(),
        value,
        time,
        record: None,
        record_years: Vec::new(),
        normal: None,
        departure: None,
        last_year: None,
    };

    // a record is followed by the year(s) it was set, and then by
    // the normal, departure, and last year columns
    let tail = &rest[idx..];
    let tail = if tail.len() >= 4 && is_year(tail[1]) {
        row.record = tail[0].parse().ok();
        let years_end = tail.len().saturating_sub(3).max(2);
        row.record_years.extend(
            tail[1..years_end]
                .iter()
                .filter(|t| is_year(t))
                .filter_map(|t| t.parse::<u16>().ok()),
        );
        &tail[years_end..]
    } else {
        // columns are counted from the right
        let skip = tail.len().saturating_sub(3);
        match skip {
            0 => {}
            1 => row.record = tail[0].parse().ok(),
            _ => row.record = tail[skip - 2].parse().ok(),
        }
        &tail[skip..]
    };

    let mut cells = tail.iter().map(|t| t.parse::<ClimateValue>().ok());
    row.normal = cells.next().flatten();
    row.departure = cells.next().flatten();
    row.last_year = cells.next().flatten();

    Some((label, row))
}

fn parse_wind_line(line: &str, wind: &mut ClimateWind) {
    lazy_static! {
        static ref SPEED: Regex = Regex::new(
            r"(HIGHEST WIND|HIGHEST GUST|AVERAGE WIND|RESULTANT WIND) SPEED\s+(\d+(?:\.\d+)?)"
        )
        .expect("bad climate wind regexp");
        static ref DIRECTION: Regex =
            Regex::new(r"(HIGHEST WIND|HIGHEST GUST|RESULTANT WIND) DIRECTION\s+([A-Z]{1,3})\s*\((\d{1,3})\)")
                .expect("bad climate wind regexp");
    }

    for caps in SPEED.captures_iter(line) {
        let speed = caps[2].parse().ok();
        match &caps[1] {
            "HIGHEST WIND" => wind.highest_speed = speed,
            "HIGHEST GUST" => wind.highest_gust_speed = speed,
            "AVERAGE WIND" => wind.average_speed = speed,
            _ => wind.resultant_speed = speed,
        }
    }
    for caps in DIRECTION.captures_iter(line) {
        let dir = caps[3].parse().ok().map(|deg| (caps[2].to_owned(), deg));
        match &caps[1] {
            "HIGHEST WIND" => wind.highest_direction = dir,
            "HIGHEST GUST" => wind.highest_gust_direction = dir,
            _ => wind.resultant_direction = dir,
        }
    }
}

fn is_year(tok: &str) -> bool {
    tok.len() == 4
        && tok.chars().all(|c| c.is_ascii_digit())
        && tok.parse::<u16>().map_or(false, |y| (1800..=2100).contains(&y))
}

fn is_clock(tok: &str) -> bool {
    (3..=4).contains(&tok.len()) && tok.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;
    use strum::IntoEnumIterator;

    use crate::testdata;

    #[test]
    fn test_section_headings() {
        for section in ClimateSection::iter() {
            assert_eq!(section.as_heading_str().parse::<ClimateSection>(), Ok(section));
        }
        assert_eq!(ClimateSection::DegreeDays.to_string(), "Degree days");
    }

    #[test]
    fn test_values() {
        assert_eq!("T".parse::<ClimateValue>(), Ok(ClimateValue::Trace));
        assert_eq!("MM".parse::<ClimateValue>(), Ok(ClimateValue::Missing));
        assert_eq!("-21R".parse::<ClimateValue>(), Ok(ClimateValue::Value(-21.0)));
        assert_eq!("0.65".parse::<ClimateValue>(), Ok(ClimateValue::Value(0.65)));
        assert!("PM".parse::<ClimateValue>().is_err());
        assert!("-".parse::<ClimateValue>().is_err());
        assert_eq!(ClimateValue::Trace.as_f64(), Some(0.0));
    }

    #[test]
    fn test_waterloo() {
        let reports = parse_climate_text(testdata::CLI_ALO);
        assert_eq!(reports.len(), 1);
        let rpt = &reports[0];
        assert!(rpt.warnings.is_empty(), "{:?}", rpt.warnings);
        assert_eq!(rpt.station.as_deref(), Some("WATERLOO"));
        assert_eq!(rpt.date, NaiveDate::from_ymd_opt(2013, 1, 22));

        let max = rpt.temperature_maximum().unwrap();
        assert_eq!(max.period.as_deref(), Some("YESTERDAY"));
        assert_eq!(max.value, ClimateValue::Value(-1.0));
        assert_eq!(max.time.as_deref(), Some("259 PM"));
        assert_eq!(max.record, Some(ClimateValue::Value(51.0)));
        assert_eq!(max.record_years, vec![1900]);
        assert_eq!(max.normal, Some(ClimateValue::Value(26.0)));
        assert_eq!(max.departure, Some(ClimateValue::Value(-27.0)));
        assert_eq!(max.last_year, Some(ClimateValue::Value(38.0)));

        let min = rpt.temperature_minimum().unwrap();
        assert_eq!(min.value, ClimateValue::Value(-21.0));
        assert_eq!(min.record, Some(ClimateValue::Value(-21.0)));
        assert_eq!(min.record_years, vec![2013, 1936]);

        let avg = rpt
            .row(ClimateSection::Temperature, Some("YESTERDAY"), "AVERAGE")
            .unwrap();
        assert_eq!(avg.record, None);
        assert_eq!(avg.normal, Some(ClimateValue::Value(17.0)));

        let precip = rpt.precip_today().unwrap();
        assert_eq!(precip.value, ClimateValue::Trace);
        assert_eq!(precip.record, Some(ClimateValue::Value(0.65)));
        assert_eq!(precip.record_years, vec![1960]);
        assert_eq!(precip.normal, Some(ClimateValue::Value(0.02)));

        let jan1 = rpt
            .row(ClimateSection::Precipitation, None, "SINCE JAN 1")
            .unwrap();
        assert_eq!(jan1.value, ClimateValue::Value(0.22));
        assert_eq!(jan1.departure, Some(ClimateValue::Value(-0.32)));

        assert_eq!(rpt.snow_today().unwrap().value, ClimateValue::Trace);
        assert_eq!(rpt.snow_depth().unwrap().value, ClimateValue::Value(1.0));

        let hdd = rpt.heating_degree_days().unwrap();
        assert_eq!(hdd.value, ClimateValue::Value(76.0));
        let mtd = rpt
            .row(ClimateSection::DegreeDays, Some("HEATING"), "MONTH TO DATE")
            .unwrap();
        assert_eq!(mtd.value, ClimateValue::Value(1166.0));
        assert_eq!(mtd.normal, Some(ClimateValue::Value(1172.0)));
        assert_eq!(rpt.cooling_degree_days().unwrap().value, ClimateValue::Value(0.0));

        assert_eq!(rpt.wind.highest_speed, Some(22.0));
        assert_eq!(rpt.wind.highest_gust_direction, Some(("NW".to_owned(), 310)));
        assert_approx_eq!(rpt.wind.average_speed.unwrap(), 14.1);
        assert_eq!(rpt.average_sky_cover, Some(ClimateValue::Value(0.3)));

        let rh = rpt
            .row(ClimateSection::RelativeHumidity, None, "LOWEST")
            .unwrap();
        assert_eq!(rh.value, ClimateValue::Value(57.0));
        assert_eq!(rh.time.as_deref(), Some("300 PM"));

        // normals for the next day are not part of the table
        assert!(rpt.rows.iter().all(|r| r.label != "MAXIMUM TEMPERATURE (F)"));
    }

    #[test]
    fn test_two_reports() {
        let text = format!(
            "{}\n{}",
            testdata::CLI_ALO,
            testdata::CLI_ALO.replace("WATERLOO", "CEDAR FALLS")
        );
        let reports = parse_climate_text(&text);
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[1].station.as_deref(), Some("CEDAR FALLS"));
        assert_eq!(reports[1].rows.len(), reports[0].rows.len());
    }

    #[test]
    fn test_year_like_values() {
        let text = "WEATHER ITEM   OBSERVED TIME   RECORD YEAR NORMAL DEPARTURE LAST\n\
                    DEGREE DAYS\n \
                    HEATING\n  \
                    MONTH TO DATE 1950                       1985    -35     1800\n  \
                    SINCE JUL 1   4100   4300 1936           4050     50     3900\n";
        let reports = parse_climate_text(text);
        let rpt = &reports[0];
        assert!(rpt.warnings.is_empty(), "{:?}", rpt.warnings);

        let mtd = rpt
            .row(ClimateSection::DegreeDays, Some("HEATING"), "MONTH TO DATE")
            .unwrap();
        assert_eq!(mtd.value, ClimateValue::Value(1950.0));
        assert_eq!(mtd.record, None);
        assert!(mtd.record_years.is_empty());
        assert_eq!(mtd.normal, Some(ClimateValue::Value(1985.0)));
        assert_eq!(mtd.departure, Some(ClimateValue::Value(-35.0)));
        assert_eq!(mtd.last_year, Some(ClimateValue::Value(1800.0)));

        let season = rpt
            .row(ClimateSection::DegreeDays, Some("HEATING"), "SINCE JUL 1")
            .unwrap();
        assert_eq!(season.record, Some(ClimateValue::Value(4300.0)));
        assert_eq!(season.record_years, vec![1936]);
        assert_eq!(season.normal, Some(ClimateValue::Value(4050.0)));
        assert_eq!(season.last_year, Some(ClimateValue::Value(3900.0)));
    }

    #[test]
    fn test_no_table() {
        let reports =
            parse_climate_text("...THE AMES CLIMATE SUMMARY FOR JUNE 1 2020...\n\nDATA NOT AVAILABLE\n");
        assert_eq!(reports.len(), 1);
        assert!(reports[0].rows.is_empty());
        assert_eq!(reports[0].warnings.len(), 1);
        assert_eq!(reports[0].date, NaiveDate::from_ymd_opt(2020, 6, 1));
    }
}
