//! Product segments
//!
//! Segmented products separate each group of areas with a `$$`
//! line. Every segment carries its own UGC block, VTEC strings,
//! and free text.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::geometry::{find_motion, find_polygon, Motion, Polygon};
use crate::hvtec::{find_hvtecs, Hvtec};
use crate::product::ProductDecodeErr;
use crate::provider::{NwsliProvider, UgcProvider};
use crate::tags::{find_tags, Tags};
use crate::text::{collapse_whitespace, sections, strip_trailing_punctuation};
use crate::ugc::{find_ugc_blocks, parse_ugc_block, Ugc};
use crate::vtec::{find_vtecs, Vtec, VtecAction, VtecClass};

/// Product-level facts needed to decode a segment
///
/// Segments do not refer back to their product. Whatever they
/// need from it is passed in here.
#[derive(Clone, Copy)]
pub struct SegmentContext<'a> {
    /// Product issuance time
    pub valid: DateTime<Utc>,

    /// Originating center, like `KJAN`
    pub source: &'a str,

    /// AFOS identifier, if any
    pub afos: Option<&'a str>,

    pub ugc_provider: &'a dyn UgcProvider,
    pub nwsli_provider: &'a dyn NwsliProvider,
}

impl<'a> SegmentContext<'a> {
    // Products from Guam write east longitudes
    fn east_longitude(&self) -> bool {
        self.source == "PGUM"
    }

    fn allows_many_ugc_blocks(&self) -> bool {
        matches!(self.afos.and_then(|a| a.get(0..3)), Some("FWF") | Some("FWS"))
    }
}

/// One segment of a product
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    text: String,
    ugcs: Vec<Ugc>,
    ugc_expire: Option<DateTime<Utc>>,
    vtecs: Vec<Vtec>,
    hvtecs: Vec<Hvtec>,
    headlines: Vec<String>,
    bullets: Vec<String>,
    polygon: Option<Polygon>,
    motion: Option<Motion>,
    tags: Tags,
    is_emergency: bool,
    is_pds: bool,
}

impl Segment {
    /// Decode one segment
    ///
    /// Non-fatal defects are appended to `warnings`. A malformed
    /// UGC block or a degenerate polygon is fatal.
    pub fn parse(
        text: &str,
        ctx: &SegmentContext,
        warnings: &mut Vec<String>,
    ) -> Result<Self, ProductDecodeErr> {
        let mut seg = Segment {
            text: text.to_owned(),
            ugcs: Vec::new(),
            ugc_expire: None,
            vtecs: Vec::new(),
            hvtecs: Vec::new(),
            headlines: find_headlines(text),
            bullets: find_bullets(text),
            polygon: None,
            motion: None,
            tags: Tags::default(),
            is_emergency: false,
            is_pds: false,
        };

        let blocks = find_ugc_blocks(text);
        if blocks.len() > 1 && !ctx.allows_many_ugc_blocks() {
            warnings.push(format!(
                "segment has {} UGC blocks; only the first is used",
                blocks.len()
            ));
        }
        if let Some((codes, ddhhmm)) = blocks.first() {
            let block = parse_ugc_block(codes, ddhhmm, &ctx.valid)?;
            seg.ugcs = block.ugcs;
            seg.ugc_expire = block.expire;
            for ugc in seg.ugcs.iter_mut() {
                ugc.enrich(ctx.ugc_provider);
            }
        }

        for found in find_vtecs(text) {
            match found {
                Ok(vtec) => {
                    if vtec.is_inverted() {
                        warnings.push(format!("VTEC {} begins after it ends", vtec));
                    }
                    seg.vtecs.push(vtec);
                }
                Err(e) => warnings.push(e.to_string()),
            }
        }
        seg.check_duplicate_vtecs(warnings);

        for found in find_hvtecs(text, ctx.nwsli_provider) {
            match found {
                Ok(hvtec) => seg.hvtecs.push(hvtec),
                Err(e) => warnings.push(e.to_string()),
            }
        }

        seg.polygon = find_polygon(text, ctx.east_longitude(), warnings)?;

        let collapsed = collapse_whitespace(text);
        if collapsed.contains("TIME...MOT...LOC") {
            let reference = seg.ugc_expire.unwrap_or(ctx.valid);
            seg.motion = find_motion(&collapsed, &reference, ctx.east_longitude());
            if seg.motion.is_none() {
                warnings.push("TIME...MOT...LOC is present but could not be decoded".to_owned());
            }
        }

        seg.tags = find_tags(&collapsed, text);
        seg.is_pds = is_pds(text);
        seg.is_emergency = is_emergency(text);
        if seg.is_emergency {
            seg.reconcile_emergency(warnings);
        }

        Ok(seg)
    }

    /// Segment text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// UGC identifiers, in listing order
    pub fn ugcs(&self) -> &[Ugc] {
        &self.ugcs
    }

    /// UGC expiration, if any
    pub fn ugc_expire(&self) -> Option<&DateTime<Utc>> {
        self.ugc_expire.as_ref()
    }

    /// VTEC strings, in listing order
    pub fn vtecs(&self) -> &[Vtec] {
        &self.vtecs
    }

    /// H-VTEC strings, in listing order
    pub fn hvtecs(&self) -> &[Hvtec] {
        &self.hvtecs
    }

    /// Headlines, like `TORNADO WARNING REMAINS IN EFFECT UNTIL 615 PM CDT`
    pub fn headlines(&self) -> &[String] {
        &self.headlines
    }

    /// Bullet points, with nested bullets flattened
    pub fn bullets(&self) -> &[String] {
        &self.bullets
    }

    /// Warning polygon
    pub fn polygon(&self) -> Option<&Polygon> {
        self.polygon.as_ref()
    }

    /// Storm motion
    pub fn motion(&self) -> Option<&Motion> {
        self.motion.as_ref()
    }

    /// Impact tags
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// True for a tornado or flash flood emergency
    pub fn is_emergency(&self) -> bool {
        self.is_emergency
    }

    /// True for a particularly dangerous situation
    pub fn is_pds(&self) -> bool {
        self.is_pds
    }

    /// The VTEC which describes this segment
    ///
    /// This is the first VTEC which is neither a test nor a
    /// routine issuance.
    pub fn governing_vtec(&self) -> Option<&Vtec> {
        self.vtecs
            .iter()
            .find(|v| v.class() != VtecClass::Test && v.action() != VtecAction::Routine)
    }

    /// Display names of all UGCs
    pub fn ugc_names(&self) -> Vec<String> {
        self.ugcs.iter().map(Ugc::display_name).collect()
    }

    fn check_duplicate_vtecs(&self, warnings: &mut Vec<String>) {
        for (i, a) in self.vtecs.iter().enumerate() {
            for b in &self.vtecs[i + 1..] {
                if a.phenomenon_code() != b.phenomenon_code()
                    || a.significance_code() != b.significance_code()
                {
                    continue;
                }
                let handoff = (a.action().is_ending() && b.action().is_starting())
                    || (a.action().is_starting() && b.action().is_ending());
                if handoff && a.etn() != b.etn() {
                    continue;
                }
                warnings.push(format!(
                    "segment has duplicate VTEC {} for {}.{}",
                    a.ps_string(),
                    a.phenomenon_code(),
                    a.significance_code()
                ));
            }
        }
    }

    fn reconcile_emergency(&mut self, warnings: &mut Vec<String>) {
        if !self.tags.is_catastrophic() {
            warnings.push("emergency is declared without a CATASTROPHIC damage threat".to_owned());
        }

        let mut governing = self
            .vtecs
            .iter()
            .filter(|v| v.class() != VtecClass::Test && v.action() != VtecAction::Routine)
            .peekable();
        if governing.peek().is_none() {
            return;
        }
        let ongoing = governing.any(|v| {
            !matches!(v.action(), VtecAction::Cancel | VtecAction::Expire)
        });
        if !ongoing {
            debug!("negating emergency flag for cancelled or expired event");
            warnings.push("emergency phrase appears in a CAN/EXP segment; not an emergency".to_owned());
            self.is_emergency = false;
        }
    }
}

/// True if `text` declares a tornado or flash flood emergency
pub fn is_emergency(text: &str) -> bool {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(TORNADO|FLASH\s+FLOOD)\s+EMERGENCY").expect("bad emergency regexp");
    }
    RE.is_match(text)
}

/// True if `text` declares a particularly dangerous situation
pub fn is_pds(text: &str) -> bool {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"THIS\s+IS\s+A\s+PARTICULARLY\s+DANGEROUS\s+SITUATION").expect("bad PDS regexp");
    }
    RE.is_match(text)
}

/// Find `...HEADLINE...` paragraphs
///
/// A headline starts a line with `...` and ends with `...`
/// followed by a blank line. It may wrap over several lines.
pub fn find_headlines(text: &str) -> Vec<String> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"(?m)^ ?\.\.\.((?:.|\n[^\n])*?)\.\.\.[ \t]*\n[ \t]*$")
            .expect("bad headline regexp");
    }

    RE.captures_iter(text)
        .map(|caps| {
            let collapsed = collapse_whitespace(&caps[1]);
            strip_trailing_punctuation(&collapsed).to_owned()
        })
        .filter(|h| !h.is_empty())
        .collect()
}

/// Find `* BULLET` paragraphs
///
/// Nested `- ` bullets within a bullet are split out and emitted
/// after their parent.
pub fn find_bullets(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for section in sections(text) {
        let section = section.trim_start();
        let body = match section.strip_prefix("* ") {
            Some(body) => body,
            None => continue,
        };

        let mut current = String::new();
        for line in body.lines() {
            let trimmed = line.trim_start();
            if let Some(sub) = trimmed.strip_prefix("- ") {
                push_bullet(&mut out, &current);
                current = sub.to_owned();
            } else {
                current.push(' ');
                current.push_str(trimmed);
            }
        }
        push_bullet(&mut out, &current);
    }
    out
}

fn push_bullet(out: &mut Vec<String>, text: &str) {
    let collapsed = collapse_whitespace(text);
    if !collapsed.is_empty() {
        out.push(collapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::provider::EmptyProvider;

    fn context(source: &'static str) -> SegmentContext<'static> {
        SegmentContext {
            valid: Utc.with_ymd_and_hms(2005, 8, 29, 16, 51, 0).unwrap(),
            source,
            afos: None,
            ugc_provider: &EmptyProvider,
            nwsli_provider: &EmptyProvider,
        }
    }

    #[test]
    fn test_headlines() {
        const TEXT: &str = "\n...WINTER STORM WARNING REMAINS IN EFFECT UNTIL\nMIDNIGHT CST TONIGHT...\n\n...WIND CHILL ADVISORY IN EFFECT...\n\nOTHER TEXT...\n";
        assert_eq!(
            find_headlines(TEXT),
            vec![
                "WINTER STORM WARNING REMAINS IN EFFECT UNTIL MIDNIGHT CST TONIGHT".to_owned(),
                "WIND CHILL ADVISORY IN EFFECT".to_owned(),
            ]
        );
    }

    #[test]
    fn test_bullets() {
        const TEXT: &str = "* WHAT...Heavy snow expected.\n  Total accumulations of 8 inches.\n\n* WHERE...Portions of central Iowa.\n  - Ames\n  - Ankeny\n\nNot a bullet.\n";
        assert_eq!(
            find_bullets(TEXT),
            vec![
                "WHAT...Heavy snow expected. Total accumulations of 8 inches.".to_owned(),
                "WHERE...Portions of central Iowa.".to_owned(),
                "Ames".to_owned(),
                "Ankeny".to_owned(),
            ]
        );
    }

    #[test]
    fn test_duplicate_vtec() {
        const TEXT: &str = "IAZ006-281200-\n\
/O.NEW.KDMX.WS.W.0005.130127T1800Z-130128T0600Z/\n\
/O.CON.KDMX.WS.W.0005.130127T1800Z-130128T0600Z/\n";
        let mut warnings = Vec::new();
        Segment::parse(TEXT, &context("KDMX"), &mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("duplicate"));
    }

    #[test]
    fn test_upgrade_pair_is_legal() {
        const TEXT: &str = "IAZ006-281200-\n\
/O.UPG.KDMX.FW.A.0002.130127T1800Z-130128T0600Z/\n\
/O.NEW.KDMX.FW.W.0003.130127T1800Z-130128T0600Z/\n\
/O.CAN.KDMX.WS.W.0004.000000T0000Z-130128T0600Z/\n\
/O.NEW.KDMX.WS.W.0005.130127T1800Z-130128T0600Z/\n";
        let mut warnings = Vec::new();
        let seg = Segment::parse(TEXT, &context("KDMX"), &mut warnings).unwrap();
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert_eq!(seg.vtecs().len(), 4);
        assert_eq!(seg.governing_vtec().unwrap().action(), VtecAction::Upgrade);
    }

    #[test]
    fn test_emergency_negated_on_expire() {
        const TEXT: &str = "KSC173-250045-\n\
/O.EXP.KICT.TO.W.0040.000000T0000Z-160525T0045Z/\n\
\n\
THE TORNADO EMERGENCY FOR WICHITA HAS EXPIRED.\n";
        let mut warnings = Vec::new();
        let seg = Segment::parse(TEXT, &context("KICT"), &mut warnings).unwrap();
        assert!(!seg.is_emergency());
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_segment_without_vtec() {
        const TEXT: &str = "\nLAT...LON 3244 9017 3234 9076 3282 9081 3292 9013\n\
THIS IS A PARTICULARLY DANGEROUS SITUATION.\n";
        let mut warnings = Vec::new();
        let seg = Segment::parse(TEXT, &context("KJAN"), &mut warnings).unwrap();
        assert!(seg.ugcs().is_empty());
        assert!(seg.polygon().is_some());
        assert!(seg.is_pds());
        assert!(seg.governing_vtec().is_none());
    }

    #[test]
    fn test_bad_ugc_is_fatal() {
        const TEXT: &str = "006-007-281200-\n";
        let mut warnings = Vec::new();
        assert!(matches!(
            Segment::parse(TEXT, &context("KDMX"), &mut warnings),
            Err(ProductDecodeErr::Ugc(_))
        ));
    }
}
