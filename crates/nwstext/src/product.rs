//! Decoded text products

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::builder::ProductParserBuilder;
use crate::geometry::InvalidPolygonErr;
use crate::segment::Segment;
use crate::text;
use crate::time::{InvalidDateErr, ZoneLabel};
use crate::ugc::UgcParseErr;
use crate::vtec::{Vtec, VtecAction, VtecClass};
use crate::wmo::{WmoHeaderErr, WmoHeading};

/// Structural failure while decoding a product
///
/// Any of these abort the whole product. Lesser defects are
/// reported as [warnings](Product::warnings).
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ProductDecodeErr {
    /// No WMO abbreviated heading
    #[error(transparent)]
    MissingWmoHeading(#[from] WmoHeaderErr),

    /// A UGC block could not be decoded
    #[error("invalid UGC block: {0}")]
    Ugc(#[from] UgcParseErr),

    /// A `LAT...LON` polygon has fewer than three vertices
    #[error("invalid polygon: {0}")]
    InvalidPolygon(#[from] InvalidPolygonErr),

    /// The issuance time cannot be determined
    #[error("invalid issuance time: {0}")]
    InvalidTime(#[from] InvalidDateErr),
}

/// A decoded NWS text product
///
/// Obtain with a [`ProductParser`](crate::ProductParser), or with
/// [`Product::parse()`] for the default configuration.
///
/// ```
/// use nwstext::Product;
///
/// let product = Product::parse(
///     "000 \nNOUS43 KDMX 281200\nPNSDMX\n\nPUBLIC INFORMATION STATEMENT\n\
///      600 AM CST MON JAN 28 2013\n\n...SNOWFALL REPORTS...\n\n$$\n\nSMITH\n",
/// )
/// .unwrap();
///
/// assert_eq!(product.afos(), Some("PNSDMX"));
/// assert_eq!(product.source(), "KDMX");
/// assert_eq!(product.valid().to_rfc3339(), "2013-01-28T12:00:00+00:00");
/// assert_eq!(product.product_id(), "201301281200-KDMX-NOUS43-PNSDMX");
/// assert_eq!(product.signature(), Some("SMITH"));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Product {
    #[cfg_attr(feature = "serde", serde(skip))]
    raw: String,
    text: String,
    wmo: WmoHeading,
    afos: Option<String>,
    valid: DateTime<Utc>,
    zone: Option<ZoneLabel>,
    warnings: Vec<String>,
    segments: Vec<Segment>,
}

impl Product {
    /// Decode with the default parser configuration
    ///
    /// Products which lack an MND line are placed on the
    /// calendar relative to the system clock.
    pub fn parse(raw: &str) -> Result<Self, ProductDecodeErr> {
        ProductParserBuilder::new().build().parse(raw)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        raw: String,
        text: String,
        wmo: WmoHeading,
        afos: Option<String>,
        valid: DateTime<Utc>,
        zone: Option<ZoneLabel>,
        warnings: Vec<String>,
        segments: Vec<Segment>,
    ) -> Self {
        Self {
            raw,
            text,
            wmo,
            afos,
            valid,
            zone,
            warnings,
            segments,
        }
    }

    /// Product text, as received
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized product text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// WMO abbreviated heading
    pub fn wmo_heading(&self) -> &WmoHeading {
        &self.wmo
    }

    /// AFOS identifier, like `TORJAN`
    pub fn afos(&self) -> Option<&str> {
        self.afos.as_deref()
    }

    /// Originating center, like `KJAN`
    pub fn source(&self) -> &str {
        self.wmo.cccc()
    }

    /// Issuance time
    pub fn valid(&self) -> &DateTime<Utc> {
        &self.valid
    }

    /// Local timezone of the MND line, if one was decoded
    pub fn zone(&self) -> Option<&ZoneLabel> {
        self.zone.as_ref()
    }

    /// Non-fatal defects found while decoding
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Segments, in product order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Blank-line-delimited sections of the normalized text
    pub fn sections(&self) -> Vec<&str> {
        text::sections(&self.text)
    }

    /// All VTEC strings, in product order
    pub fn vtecs(&self) -> impl Iterator<Item = &Vtec> {
        self.segments.iter().flat_map(|s| s.vtecs().iter())
    }

    /// True if any segment carries a VTEC
    pub fn has_vtec(&self) -> bool {
        self.vtecs().next().is_some()
    }

    /// True for Climate Report (`CLI`) products
    pub fn is_climate_report(&self) -> bool {
        self.afos().map_or(false, |a| a.starts_with("CLI"))
    }

    /// Unique product identifier
    ///
    /// `YYYYMMDDHHMM-CCCC-TTAAII-AFOS`, with a `-BBB` suffix
    /// when the heading carries one.
    pub fn product_id(&self) -> String {
        let mut id = format!(
            "{}-{}-{}",
            self.valid.format("%Y%m%d%H%M"),
            self.wmo.cccc(),
            self.wmo.ttaaii()
        );
        if let Some(afos) = &self.afos {
            id.push('-');
            id.push_str(afos);
        }
        if let Some(bbb) = self.wmo.bbb() {
            id.push('-');
            id.push_str(bbb);
        }
        id
    }

    /// True if this product corrects an earlier one
    ///
    /// Any `COR` action, a `CCx` or `RRx` amendment indicator, or
    /// the phrase `...CORRECTED` or `...RESENT` marks a correction.
    pub fn is_correction(&self) -> bool {
        self.vtecs().any(|v| v.action() == VtecAction::Correct)
            || self
                .wmo
                .bbb()
                .map_or(false, |b| b.starts_with("CC") || b.starts_with("RR"))
            || self.text.contains("...CORRECTED")
            || self.is_resent()
    }

    /// True if this product re-sends an earlier one
    pub fn is_resent(&self) -> bool {
        self.wmo.bbb().map_or(false, |b| b.starts_with("RR")) || self.text.contains("...RESENT")
    }

    /// True if any segment declares an emergency
    pub fn is_emergency(&self) -> bool {
        self.segments.iter().any(Segment::is_emergency)
    }

    /// True if any segment declares a particularly dangerous situation
    pub fn is_pds(&self) -> bool {
        self.segments.iter().any(Segment::is_pds)
    }

    /// Forecaster signature
    ///
    /// The short line which follows the last `$$`, if there is one.
    pub fn signature(&self) -> Option<&str> {
        const MAX_SIGNATURE_LEN: usize = 40;

        if self.segments.len() < 2 {
            return None;
        }
        let last = self.segments.last()?;
        let sig = last.text().trim();
        if last.ugcs().is_empty()
            && !sig.is_empty()
            && sig.len() <= MAX_SIGNATURE_LEN
            && !sig.contains('\n')
        {
            Some(sig)
        } else {
            None
        }
    }

    /// Forecast offices responsible for any listed UGC
    pub fn affected_wfos(&self) -> Vec<String> {
        let wfos: BTreeSet<&String> = self
            .segments
            .iter()
            .flat_map(|s| s.ugcs())
            .flat_map(|u| u.wfos())
            .collect();
        wfos.into_iter().cloned().collect()
    }

    /// True if every VTEC-bearing segment describes the same event
    ///
    /// Test-class VTECs are ignored. A product with no VTEC is
    /// not homogeneous.
    pub fn is_homogeneous(&self) -> bool {
        let events: BTreeSet<(&str, &str, u16)> = self
            .vtecs()
            .filter(|v| v.class() != VtecClass::Test)
            .map(|v| (v.phenomenon_code(), v.significance_code(), v.etn()))
            .collect();
        events.len() == 1
    }

    /// First headline in the product
    pub fn first_headline(&self) -> Option<&str> {
        self.segments
            .iter()
            .flat_map(|s| s.headlines())
            .map(String::as_str)
            .next()
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_approx_eq::assert_approx_eq;
    use chrono::TimeZone;

    use crate::builder::ProductParserBuilder;
    use crate::testdata;

    fn parse_at(text: &str, now: DateTime<Utc>) -> Product {
        ProductParserBuilder::new()
            .with_utcnow(now)
            .build()
            .parse(text)
            .expect("product should decode")
    }

    #[test]
    fn test_tornado_warning() {
        let now = Utc.with_ymd_and_hms(2005, 8, 29, 17, 0, 0).unwrap();
        let prod = parse_at(testdata::TOR_JAN, now);

        assert!(prod.warnings().is_empty(), "{:?}", prod.warnings());
        assert_eq!(prod.wmo_heading().to_string(), "WUUS53 KJAN 291651");
        assert_eq!(prod.afos(), Some("TORJAN"));
        assert_eq!(prod.valid(), &Utc.with_ymd_and_hms(2005, 8, 29, 16, 51, 0).unwrap());
        assert_eq!(prod.zone().map(|z| z.abbrev()), Some("CDT"));
        assert_eq!(prod.segments().len(), 1);
        assert_eq!(prod.product_id(), "200508291651-KJAN-WUUS53-TORJAN");

        let seg = &prod.segments()[0];
        assert_eq!(seg.ugcs().len(), 3);
        assert_eq!(seg.ugcs()[2].code(), "MSC091");
        assert_eq!(seg.vtecs().len(), 1);
        assert_approx_eq!(seg.polygon().unwrap().area(), 0.3053, 1.0e-4);
        assert!(seg.polygon().unwrap().is_clockwise());
        assert!(seg.motion().is_some());
        assert_eq!(
            seg.headlines(),
            &["TORNADO WARNING FOR FORREST...LAMAR AND MARION COUNTIES".to_owned()]
        );
        assert!(prod.is_homogeneous());
        assert!(!prod.is_correction());
        assert!(!prod.is_emergency());
        assert_eq!(prod.signature(), None);
    }

    #[test]
    fn test_tornado_emergency() {
        let now = Utc.with_ymd_and_hms(2016, 5, 25, 0, 0, 0).unwrap();
        let prod = parse_at(testdata::TOR_EMERGENCY, now);

        assert!(prod.is_emergency());
        let seg = &prod.segments()[0];
        assert!(seg.is_emergency());
        assert_eq!(seg.tags().tornado.map(|t| t.as_str()), Some("OBSERVED"));
        assert_eq!(
            seg.tags().damage.as_ref().map(|d| d.level.as_str()),
            Some("CATASTROPHIC")
        );
        assert_eq!(seg.tags().max_hail.as_ref().map(|h| h.size.as_str()), Some("2.50"));
        assert!(prod.warnings().is_empty(), "{:?}", prod.warnings());
    }

    #[test]
    fn test_repaired_polygon() {
        let now = Utc.with_ymd_and_hms(2005, 8, 29, 17, 0, 0).unwrap();
        let prod = parse_at(testdata::SVR_BOWTIE, now);

        let fixed: Vec<&String> = prod
            .warnings()
            .iter()
            .filter(|w| w.as_str() == "polygon is not valid, but buffer(0) fixed it")
            .collect();
        assert_eq!(fixed.len(), 1);
        let poly = prod.segments()[0].polygon().unwrap();
        assert!(poly.is_clockwise());
        assert_eq!(poly.exterior().first(), poly.exterior().last());
    }

    #[test]
    fn test_missing_heading() {
        assert_eq!(
            Product::parse("THIS IS NOT A PRODUCT\n"),
            Err(ProductDecodeErr::MissingWmoHeading(WmoHeaderErr::NotFound))
        );
    }

    #[test]
    fn test_segments_in_order() {
        let now = Utc.with_ymd_and_hms(2013, 1, 27, 18, 0, 0).unwrap();
        let prod = parse_at(testdata::WSW_SERIES[0], now);
        let codes: Vec<String> = prod
            .segments()
            .iter()
            .flat_map(|s| s.ugcs())
            .map(|u| u.code())
            .collect();
        assert_eq!(codes, vec!["IAZ006".to_owned(), "IAZ007".to_owned()]);
        assert!(!prod.is_homogeneous());
    }

    #[test]
    fn test_correction() {
        let now = Utc.with_ymd_and_hms(2013, 1, 28, 0, 0, 0).unwrap();
        let corrected = testdata::WSW_SERIES[1].replace("WWUS43 KDMX 280000", "WWUS43 KDMX 280000 CCA");
        let prod = parse_at(&corrected, now);
        assert!(prod.is_correction());
        assert!(!prod.is_resent());
        assert_eq!(prod.product_id(), "201301280000-KDMX-WWUS43-WSWDMX-CCA");
    }

    #[test]
    fn test_bad_mnd_falls_back() {
        let now = Utc.with_ymd_and_hms(2005, 8, 29, 17, 0, 0).unwrap();
        let text = testdata::TOR_JAN.replace("1151 AM CDT MON AUG 29 2005", "2459 PM CDT MON AUG 29 2005");
        let prod = parse_at(&text, now);
        assert_eq!(prod.valid(), &Utc.with_ymd_and_hms(2005, 8, 29, 16, 51, 0).unwrap());
        assert!(prod.zone().is_none());
        assert_eq!(prod.warnings().len(), 1);
    }
}
