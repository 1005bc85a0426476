//! Human-readable messages
//!
//! Each decoded VTEC product becomes one or more short messages
//! suitable for chat rooms and social media, like
//!
//! ```txt
//! JAN issues Tornado Warning for Forrest, Lamar and Marion [MS] till 1:15 PM CDT
//! ```
//!
//! Each message has plain-text, HTML, and length-limited
//! renderings, plus a list of channels which subscribers may
//! follow.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::product::Product;
use crate::segment::Segment;
use crate::text::escape_html;
use crate::time::ZoneLabel;
use crate::ugc::{Ugc, UgcKind};
use crate::vtec::{Vtec, VtecAction, VtecClass};

/// Area listings for one state longer than this are summarized
const MAX_STATE_TEXT: usize = 350;

/// Length limit of short messages, including the link
const SHORT_MESSAGE_LEN: usize = 280;

/// Placeholder for products without a headline
const NO_HEADLINE: &str = "[No headline was found]";

/// Message rendering options
///
/// ```
/// use nwstext::MessageOptions;
///
/// let opts = MessageOptions::new()
///     .with_vtec_url("https://example.com/vtec/#")
///     .with_url_reserve(30)
///     .clone();
/// assert_eq!(opts.url_reserve(), 30);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageOptions {
    vtec_url: String,
    product_url: String,
    url_reserve: usize,
}

impl MessageOptions {
    /// Default options
    pub fn new() -> Self {
        Self {
            vtec_url: "https://mesonet.agron.iastate.edu/vtec/#".to_owned(),
            product_url: "https://mesonet.agron.iastate.edu/p.php?pid=".to_owned(),
            url_reserve: 25,
        }
    }

    /// Link prefix for VTEC events
    ///
    /// The event's [fragment](Vtec::url_fragment) is appended.
    pub fn with_vtec_url<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.vtec_url = url.into();
        self
    }

    /// Link prefix for products without VTEC
    ///
    /// The [product ID](Product::product_id) is appended.
    pub fn with_product_url<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.product_url = url.into();
        self
    }

    /// Characters reserved for the link in short messages
    pub fn with_url_reserve(&mut self, reserve: usize) -> &mut Self {
        self.url_reserve = reserve;
        self
    }

    pub fn vtec_url(&self) -> &str {
        &self.vtec_url
    }

    pub fn product_url(&self) -> &str {
        &self.product_url
    }

    pub fn url_reserve(&self) -> usize {
        self.url_reserve
    }
}

impl Default for MessageOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// An assembled message
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Message {
    /// Plain text, with link
    pub plain: String,

    /// HTML paragraph
    pub html: String,

    /// Length-limited plain text, with link
    pub short: String,

    /// Subscription channels, in order, without duplicates
    pub channels: Vec<String>,

    /// Link to the event or product
    pub url: String,
}

/// Assemble messages for a product
///
/// VTEC products produce one message per segment, with a clause
/// for each VTEC. Test-class and routine VTECs are skipped. A
/// [homogeneous](Product::is_homogeneous) product produces a single
/// message. Products without VTEC produce one message from the
/// AFOS identifier and first headline.
pub fn assemble_messages(product: &Product, opts: &MessageOptions) -> Vec<Message> {
    if !product.has_vtec() {
        return vec![assemble_plain(product, opts)];
    }

    let by_segment: Vec<Vec<Clause>> = product
        .segments()
        .iter()
        .map(|segment| {
            segment
                .vtecs()
                .iter()
                .map(|vtec| Clause { segment, vtec })
                .filter(|c| {
                    c.vtec.class() != VtecClass::Test && c.vtec.action() != VtecAction::Routine
                })
                .collect::<Vec<Clause>>()
        })
        .filter(|clauses| !clauses.is_empty())
        .collect();
    if by_segment.is_empty() {
        return Vec::new();
    }

    let renderer = Renderer { product, opts };
    if product.is_homogeneous() {
        vec![renderer.message(&by_segment.concat())]
    } else {
        by_segment
            .iter()
            .map(|clauses| renderer.message(clauses))
            .collect()
    }
}

/// Describe the area covered by `ugcs`
///
/// UGCs are grouped by state. Within each state, names are sorted
/// and followed by the state in brackets, like `Adair and Story
/// [IA]`. A state whose listing would be too long is summarized as
/// a count, like `40 counties in [IA]`.
pub fn ugcs_to_text(ugcs: &[Ugc]) -> String {
    let parts: Vec<String> = group_by_state(ugcs)
        .into_iter()
        .map(|(state, members)| {
            let mut names: Vec<String> = members.iter().map(|u| u.display_name()).collect();
            names.sort();
            names.dedup();
            let text = format!("{} [{}]", join_and(&names), state);
            if text.len() > MAX_STATE_TEXT {
                count_text(state, &members)
            } else {
                text
            }
        })
        .collect();
    join_and(&parts)
}

/// Describe the area covered by `ugcs` as counts per state
pub fn ugcs_to_count_text(ugcs: &[Ugc]) -> String {
    let parts: Vec<String> = group_by_state(ugcs)
        .into_iter()
        .map(|(state, members)| count_text(state, &members))
        .collect();
    join_and(&parts)
}

fn group_by_state(ugcs: &[Ugc]) -> BTreeMap<&str, Vec<&Ugc>> {
    let mut out: BTreeMap<&str, Vec<&Ugc>> = BTreeMap::new();
    for ugc in ugcs {
        out.entry(ugc.state()).or_default().push(ugc);
    }
    out
}

fn count_text(state: &str, members: &[&Ugc]) -> String {
    let zones = members.iter().all(|u| u.kind() == UgcKind::Zone);
    let noun = match (zones, state, members.len()) {
        (true, _, 1) => "zone",
        (true, _, _) => "zones",
        (false, "LA", 1) => "parish",
        (false, "LA", _) => "parishes",
        (false, _, 1) => "county",
        (false, _, _) => "counties",
    };
    format!("{} {} in [{}]", members.len(), noun, state)
}

/// `a`, `a and b`, `a, b and c`
fn join_and<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_owned(),
        [rest @ .., last] => {
            let head: Vec<&str> = rest.iter().map(|s| s.as_ref()).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}

fn assemble_plain(product: &Product, opts: &MessageOptions) -> Message {
    let wfo = office_id(product.source());
    let name = product.afos().unwrap_or_else(|| product.wmo_heading().ttaaii());
    let headline = product.first_headline().unwrap_or(NO_HEADLINE);
    let url = format!("{}{}", opts.product_url, product.product_id());

    let text = format!("{} issues {}: {}", wfo, name, headline);
    let html = format!(
        "<p>{} issues <a href=\"{}\">{}</a>: {}</p>",
        escape_html(wfo),
        escape_html(&url),
        escape_html(name),
        escape_html(headline)
    );
    let short = format!("{} {}", truncate(&text, short_limit(opts)), url);

    let mut channels = Vec::new();
    push_product_channels(&mut channels, wfo, product.afos());

    Message {
        plain: format!("{} {}", text, url),
        html,
        short,
        channels,
        url,
    }
}

/// One VTEC in one segment
#[derive(Clone, Copy)]
struct Clause<'a> {
    segment: &'a Segment,
    vtec: &'a Vtec,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AreaStyle {
    Names,
    Counts,
}

struct Renderer<'a> {
    product: &'a Product,
    opts: &'a MessageOptions,
}

impl<'a> Renderer<'a> {
    fn message(&self, clauses: &[Clause]) -> Message {
        let wfo = clauses
            .first()
            .map(|c| c.vtec.wfo())
            .unwrap_or_else(|| office_id(self.product.source()));
        let url = clauses
            .first()
            .map(|c| self.url(c.vtec))
            .unwrap_or_default();

        let text = |style, with_begin| {
            let parts: Vec<String> = clauses
                .iter()
                .map(|c| self.clause_text(c, style, with_begin))
                .collect();
            format!("{} {}", wfo, parts.join(", "))
        };

        let full = text(AreaStyle::Names, true);
        let limit = short_limit(self.opts);
        let short_text = [
            text(AreaStyle::Counts, true),
            text(AreaStyle::Counts, false),
        ]
        .into_iter()
        .fold(full.clone(), |best, next| {
            if best.chars().count() <= limit {
                best
            } else {
                next
            }
        });

        let html_parts: Vec<String> = clauses.iter().map(|c| self.clause_html(c)).collect();
        let html = format!("<p>{} {}</p>", escape_html(wfo), html_parts.join(", "));

        let mut channels = Vec::new();
        push_product_channels(&mut channels, wfo, self.product.afos());
        for c in clauses {
            self.push_event_channels(&mut channels, c, wfo);
        }

        Message {
            plain: format!("{} {}", full, url),
            html,
            short: format!("{} {}", truncate(&short_text, limit), url),
            channels,
            url,
        }
    }

    fn clause_text(&self, clause: &Clause, style: AreaStyle, with_begin: bool) -> String {
        let vtec = clause.vtec;
        let area = match style {
            AreaStyle::Names => ugcs_to_text(clause.segment.ugcs()),
            AreaStyle::Counts => ugcs_to_count_text(clause.segment.ugcs()),
        };

        let mut out = format!("{} {}", vtec.action().verb(), vtec.ps_string());
        if let Some(tags) = clause.segment.tags().summary() {
            out.push_str(&format!(" [{}]", tags));
        }
        out.push_str(" for ");
        out.push_str(&area);
        out.push_str(&self.time_clause(vtec, with_begin));
        out
    }

    fn clause_html(&self, clause: &Clause) -> String {
        let vtec = clause.vtec;
        let mut out = format!(
            "<a href=\"{}\">{} {}</a>",
            escape_html(&self.url(vtec)),
            vtec.action().verb(),
            escape_html(&vtec.ps_string())
        );
        if let Some(tags) = clause.segment.tags().summary() {
            out.push_str(&format!(" [{}]", escape_html(&tags)));
        }
        out.push_str(" for ");
        out.push_str(&escape_html(&ugcs_to_text(clause.segment.ugcs())));
        out.push_str(&escape_html(&self.time_clause(vtec, true)));
        out
    }

    /// ` till 1:15 PM CDT`, ` until further notice`, or nothing
    fn time_clause(&self, vtec: &Vtec, with_begin: bool) -> String {
        let valid = self.product.valid();
        match vtec.action() {
            VtecAction::Cancel | VtecAction::Upgrade => String::new(),
            VtecAction::Expire => match vtec.end() {
                Some(end) if end > valid => format!(" at {}", self.format_time(end)),
                _ => String::new(),
            },
            _ => {
                let mut out = String::new();
                if with_begin {
                    if let Some(begin) = vtec.begin().filter(|b| *b > valid) {
                        out.push_str(&format!(" valid at {}", self.format_time(begin)));
                    }
                }
                match vtec.end() {
                    Some(end) => out.push_str(&format!(" till {}", self.format_time(end))),
                    None => out.push_str(" until further notice"),
                }
                out
            }
        }
    }

    /// Local time, with the date only if it differs from issuance
    fn format_time(&self, ts: &DateTime<Utc>) -> String {
        let zone = self.product.zone().cloned().unwrap_or_else(ZoneLabel::utc);
        let local = zone.localize(ts);
        let issued = zone.localize(self.product.valid());
        let fmt = if local.date_naive() == issued.date_naive() {
            "%-I:%M %p"
        } else {
            "%b %-d, %-I:%M %p"
        };
        format!("{} {}", local.format(fmt), zone.abbrev())
    }

    fn url(&self, vtec: &Vtec) -> String {
        format!(
            "{}{}",
            self.opts.vtec_url,
            vtec.url_fragment(vtec.year(self.product.valid()))
        )
    }

    fn push_event_channels(&self, channels: &mut Vec<String>, clause: &Clause, wfo: &str) {
        let vtec = clause.vtec;
        let ps = format!("{}.{}", vtec.phenomenon_code(), vtec.significance_code());
        match vtec.action() {
            VtecAction::Continue | VtecAction::Expire | VtecAction::Cancel => push_unique(
                channels,
                format!("{}.{}-{}", ps, wfo, vtec.action().as_code_str()),
            ),
            _ => push_unique(channels, format!("{}.{}", ps, wfo)),
        }
        for ugc in clause.segment.ugcs() {
            push_unique(channels, format!("{}.{}", ps, ugc));
        }
        for ugc in clause.segment.ugcs() {
            push_unique(channels, format!("{}.{}", ps, ugc.state()));
        }
        if clause.segment.is_emergency() {
            push_unique(channels, format!("{}.EMERGENCY", vtec.phenomenon_code()));
        }
        if clause.segment.is_pds() {
            push_unique(channels, format!("{}.PDS", vtec.phenomenon_code()));
        }
    }
}

fn push_product_channels(channels: &mut Vec<String>, wfo: &str, afos: Option<&str>) {
    push_unique(channels, wfo.to_owned());
    if let Some(afos) = afos {
        push_unique(channels, afos.to_owned());
        if let Some(prefix) = afos.get(0..3) {
            push_unique(channels, format!("{}...", prefix));
        }
    }
}

fn push_unique(channels: &mut Vec<String>, channel: String) {
    if !channels.contains(&channel) {
        channels.push(channel);
    }
}

/// Three-letter office from a four-letter center, like `KJAN`
fn office_id(source: &str) -> &str {
    if source.len() == 4 {
        &source[1..]
    } else {
        source
    }
}

fn short_limit(opts: &MessageOptions) -> usize {
    SHORT_MESSAGE_LEN.saturating_sub(opts.url_reserve)
}

/// Shorten `text` to `limit` characters, ending with an ellipsis
fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Arc;

    use chrono::TimeZone;

    use crate::builder::ProductParserBuilder;
    use crate::provider::UgcInfo;
    use crate::testdata;

    fn parse_at(text: &str, now: DateTime<Utc>) -> Product {
        let mut ugcs = HashMap::new();
        for (code, name) in [
            ("MSC035", "Forrest"),
            ("MSC073", "Lamar"),
            ("MSC091", "Marion"),
            ("KSC173", "Sedgwick"),
        ] {
            ugcs.insert(
                code.to_owned(),
                UgcInfo {
                    name: name.to_owned(),
                    wfos: Vec::new(),
                },
            );
        }
        ProductParserBuilder::new()
            .with_utcnow(now)
            .with_ugc_provider(Arc::new(ugcs))
            .build()
            .parse(text)
            .expect("product should decode")
    }

    fn tor_jan(text: &str) -> Product {
        parse_at(text, Utc.with_ymd_and_hms(2005, 8, 29, 17, 0, 0).unwrap())
    }

    #[test]
    fn test_join_and() {
        let none: [&str; 0] = [];
        assert_eq!(join_and(&none), "");
        assert_eq!(join_and(&["A"]), "A");
        assert_eq!(join_and(&["A", "B"]), "A and B");
        assert_eq!(join_and(&["A", "B", "C"]), "A, B and C");
    }

    #[test]
    fn test_ugcs_to_text() {
        let ugcs: Vec<Ugc> = ["IAC001", "IAC003", "MNC001"]
            .iter()
            .map(|c| c.parse().unwrap())
            .collect();
        assert_eq!(
            ugcs_to_text(&ugcs),
            "((IAC001)) and ((IAC003)) [IA] and ((MNC001)) [MN]"
        );
        assert_eq!(ugcs_to_count_text(&ugcs), "2 counties in [IA] and 1 county in [MN]");

        let many: Vec<Ugc> = (1..=79u16)
            .step_by(2)
            .map(|n| Ugc::new("IA", UgcKind::County, n))
            .collect();
        assert_eq!(ugcs_to_text(&many), "40 counties in [IA]");

        let parishes: Vec<Ugc> = (1..=40u16)
            .map(|n| Ugc::new("LA", UgcKind::County, n))
            .collect();
        assert_eq!(ugcs_to_text(&parishes), "40 parishes in [LA]");

        let zones: Vec<Ugc> = (1..=40u16)
            .map(|n| Ugc::new("LA", UgcKind::Zone, n))
            .collect();
        assert_eq!(ugcs_to_text(&zones), "40 zones in [LA]");
    }

    #[test]
    fn test_tornado_warning() {
        let prod = tor_jan(testdata::TOR_JAN);
        let msgs = assemble_messages(&prod, &MessageOptions::new());
        assert_eq!(msgs.len(), 1);

        let msg = &msgs[0];
        assert_eq!(
            msg.plain,
            "JAN issues Tornado Warning for Forrest, Lamar and Marion [MS] till 1:15 PM CDT \
             https://mesonet.agron.iastate.edu/vtec/#2005-O-NEW-KJAN-TO-W-0130"
        );
        assert_eq!(msg.short, msg.plain);
        assert!(msg.html.starts_with(
            "<p>JAN <a href=\"https://mesonet.agron.iastate.edu/vtec/#2005-O-NEW-KJAN-TO-W-0130\">\
             issues Tornado Warning</a> for Forrest, Lamar and Marion [MS]"
        ));
        assert_eq!(
            msg.channels,
            vec![
                "JAN", "TORJAN", "TOR...", "TO.W.JAN", "TO.W.MSC035", "TO.W.MSC073", "TO.W.MSC091",
                "TO.W.MS"
            ]
        );
    }

    #[test]
    fn test_emergency() {
        let prod = parse_at(
            testdata::TOR_EMERGENCY,
            Utc.with_ymd_and_hms(2016, 5, 25, 0, 0, 0).unwrap(),
        );
        let msgs = assemble_messages(&prod, &MessageOptions::new());
        assert_eq!(msgs.len(), 1);
        let msg = &msgs[0];
        assert!(msg.channels.contains(&"TO.EMERGENCY".to_owned()));
        assert!(msg.channels.contains(&"TO.PDS".to_owned()));
        assert!(msg.plain.contains(
            "[tornado: OBSERVED, tornado damage threat: CATASTROPHIC, hail: 2.50 IN] for Sedgwick [KS]"
        ));
        assert!(msg.plain.contains("till 7:45 PM CDT"));
    }

    #[test]
    fn test_until_further_notice() {
        let text = testdata::TOR_JAN.replace("050829T1815Z/", "000000T0000Z/");
        let msgs = assemble_messages(&tor_jan(&text), &MessageOptions::new());
        assert!(msgs[0].plain.contains("[MS] until further notice "));
    }

    #[test]
    fn test_continuation_channels() {
        let series = [
            (testdata::WSW_SERIES[0], Utc.with_ymd_and_hms(2013, 1, 27, 18, 0, 0).unwrap()),
            (testdata::WSW_SERIES[1], Utc.with_ymd_and_hms(2013, 1, 28, 0, 0, 0).unwrap()),
            (testdata::WSW_SERIES[2], Utc.with_ymd_and_hms(2013, 1, 28, 5, 38, 0).unwrap()),
        ];
        let msgs: Vec<Vec<Message>> = series
            .iter()
            .map(|(text, now)| assemble_messages(&parse_at(text, *now), &MessageOptions::new()))
            .collect();

        // two different events in the first product
        assert_eq!(msgs[0].len(), 2);
        assert!(msgs[0][1].plain.starts_with("DMX issues Winter Weather Advisory for ((IAZ007)) [IA]"));

        assert!(msgs[1][0].channels.contains(&"WS.W.DMX-CON".to_owned()));
        assert!(msgs[1][0].plain.contains("till Jan 28, 12:00 AM CST"));

        assert!(msgs[2][0].channels.contains(&"WS.W.DMX-CAN".to_owned()));
        assert!(msgs[2][0]
            .plain
            .starts_with("DMX cancels Winter Storm Warning for ((IAZ006)) [IA] https://"));
    }

    #[test]
    fn test_short_message() {
        // without names, the listing is longer than the count
        let prod = ProductParserBuilder::new()
            .with_utcnow(Utc.with_ymd_and_hms(2005, 8, 29, 17, 0, 0).unwrap())
            .build()
            .parse(testdata::TOR_JAN)
            .unwrap();
        let counted = "JAN issues Tornado Warning for 3 counties in [MS] till 1:15 PM CDT";

        let mut opts = MessageOptions::new();
        opts.with_url_reserve(SHORT_MESSAGE_LEN - counted.len());
        let msg = &assemble_messages(&prod, &opts)[0];
        assert!(msg.plain.contains("((MSC035)), ((MSC073)) and ((MSC091)) [MS]"));
        assert!(msg.short.starts_with(counted));

        opts.with_url_reserve(SHORT_MESSAGE_LEN - 20);
        let msg = &assemble_messages(&prod, &opts)[0];
        let text = msg.short.split(" https://").next().unwrap();
        assert_eq!(text.chars().count(), 20);
        assert!(text.ends_with('…'));
    }

    #[test]
    fn test_one_message_per_segment() {
        // an expiring warning and a new one share a segment
        let text = testdata::TOR_JAN.replace(
            "/O.NEW.KJAN.TO.W.0130.",
            "/O.EXP.KJAN.SV.W.0199.000000T0000Z-050829T1651Z/\n/O.NEW.KJAN.TO.W.0130.",
        );
        let prod = tor_jan(&text);
        assert!(!prod.is_homogeneous());

        let msgs = assemble_messages(&prod, &MessageOptions::new());
        assert_eq!(msgs.len(), 1);

        let msg = &msgs[0];
        assert!(msg.plain.starts_with("JAN "));
        assert!(msg
            .plain
            .contains("Severe Thunderstorm Warning for Forrest, Lamar and Marion [MS], issues Tornado Warning"));
        assert!(msg.url.ends_with("#2005-O-EXP-KJAN-SV-W-0199"));
        assert!(msg.channels.contains(&"SV.W.JAN-EXP".to_owned()));
        assert!(msg.channels.contains(&"TO.W.JAN".to_owned()));
    }

    #[test]
    fn test_test_class_skipped() {
        let text = testdata::TOR_JAN.replace("/O.NEW.", "/T.NEW.");
        assert!(assemble_messages(&tor_jan(&text), &MessageOptions::new()).is_empty());
    }

    #[test]
    fn test_no_vtec() {
        let prod = parse_at(
            "000\nNOUS43 KDMX 281200\nPNSDMX\n\n600 AM CST MON JAN 28 2013\n\n\
             ...SNOWFALL REPORTS...\n\nSOME TEXT\n",
            Utc.with_ymd_and_hms(2013, 1, 28, 12, 0, 0).unwrap(),
        );
        let msgs = assemble_messages(&prod, &MessageOptions::new());
        assert_eq!(msgs.len(), 1);
        assert_eq!(
            msgs[0].plain,
            "DMX issues PNSDMX: SNOWFALL REPORTS \
             https://mesonet.agron.iastate.edu/p.php?pid=201301281200-KDMX-NOUS43-PNSDMX"
        );
        assert_eq!(msgs[0].channels, vec!["DMX", "PNSDMX", "PNS..."]);

        let prod = parse_at(
            "000\nNOUS43 KDMX 281200\nPNSDMX\n\nSOME TEXT\n",
            Utc.with_ymd_and_hms(2013, 1, 28, 12, 0, 0).unwrap(),
        );
        let msgs = assemble_messages(&prod, &MessageOptions::new());
        assert!(msgs[0].plain.contains(NO_HEADLINE));
    }
}
