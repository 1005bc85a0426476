//! Impact-based warning tags
//!
//! Severe weather warnings end with a block of machine-readable
//! tags:
//!
//! ```txt
//! TORNADO...OBSERVED
//! TORNADO DAMAGE THREAT...CATASTROPHIC
//! HAIL...2.50IN
//! ```

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use strum::EnumMessage;

/// How a hazard was detected
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
pub enum Observation {
    #[strum(serialize = "RADAR INDICATED")]
    RadarIndicated,
    #[strum(serialize = "OBSERVED")]
    Observed,
    #[strum(serialize = "POSSIBLE")]
    Possible,
}

/// Damage threat level, from least to most severe
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DamageLevel {
    #[strum(serialize = "CONSIDERABLE")]
    Considerable,
    #[strum(serialize = "SIGNIFICANT")]
    Significant,
    #[strum(serialize = "DESTRUCTIVE")]
    Destructive,
    #[strum(serialize = "CATASTROPHIC")]
    Catastrophic,
}

macro_rules! tag_display {
    ($name:ident) => {
        impl $name {
            /// Tag text, as written
            pub fn as_str(&self) -> &'static str {
                self.get_serializations()[0]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.as_str().fmt(f)
            }
        }
    };
}

tag_display!(Observation);
tag_display!(DamageLevel);

/// Waterspout or landspout tag
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpoutTag {
    /// `WATERSPOUT` or `LANDSPOUT`
    pub kind: String,
    pub observation: Observation,
}

/// Damage threat tag
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DamageTag {
    /// `TORNADO` or `THUNDERSTORM`
    pub source: String,
    pub level: DamageLevel,
}

/// Maximum wind gust tag
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindTag {
    /// `<`, `>`, or empty
    pub qualifier: String,
    pub value: u16,
    /// `MPH` or `KTS`
    pub units: String,
}

/// Maximum hail size tag
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HailTag {
    /// `<`, `>`, or empty
    pub qualifier: String,
    /// Size in inches, as written, like `2.50`
    pub size: String,
}

/// All tags found in one segment
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tags {
    pub tornado: Option<Observation>,
    pub spout: Option<SpoutTag>,
    pub damage: Option<DamageTag>,
    pub hail_threat: Option<Observation>,
    pub wind_threat: Option<Observation>,
    pub max_wind: Option<WindTag>,
    pub max_hail: Option<HailTag>,

    /// Flood phrases like `("FLASH FLOOD", "RADAR INDICATED")`,
    /// in listing order
    pub flood: Vec<(String, String)>,
}

impl Tags {
    /// True if no tags were found
    pub fn is_empty(&self) -> bool {
        *self == Tags::default()
    }

    /// Value of a flood phrase, like `flood("DAM FAILURE")`
    pub fn flood(&self, key: &str) -> Option<&str> {
        self.flood
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True for a catastrophic damage threat of any kind
    pub fn is_catastrophic(&self) -> bool {
        matches!(&self.damage, Some(d) if d.level == DamageLevel::Catastrophic)
            || self
                .flood("FLASH FLOOD DAMAGE THREAT")
                .map(|v| v.trim() == "CATASTROPHIC")
                .unwrap_or(false)
    }

    /// Short summary for messages, like `tornado: OBSERVED, hail: 2.50 IN`
    pub fn summary(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(t) = &self.tornado {
            parts.push(format!("tornado: {}", t));
        }
        if let Some(s) = &self.spout {
            parts.push(format!("{}: {}", s.kind.to_ascii_lowercase(), s.observation));
        }
        if let Some(d) = &self.damage {
            parts.push(format!("{} damage threat: {}", d.source.to_ascii_lowercase(), d.level));
        }
        if let Some(w) = &self.max_wind {
            parts.push(format!("wind: {}{} {}", w.qualifier, w.value, w.units));
        }
        if let Some(h) = &self.max_hail {
            parts.push(format!("hail: {}{} IN", h.qualifier, h.size));
        }
        if let Some(threat) = self.flood("FLASH FLOOD DAMAGE THREAT") {
            parts.push(format!("flash flood damage threat: {}", threat));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Scan segment text for tags
///
/// Threat tags are matched against `collapsed`, the
/// whitespace-collapsed segment text. Flood phrases are matched
/// line-by-line against `raw`.
pub fn find_tags(collapsed: &str, raw: &str) -> Tags {
    lazy_static! {
        static ref TORNADO: Regex =
            Regex::new(r"TORNADO\.\.\.(RADAR INDICATED|OBSERVED|POSSIBLE)").expect("bad tag regexp");
        static ref SPOUT: Regex = Regex::new(r"(WATER|LAND)SPOUT\.\.\.(RADAR INDICATED|OBSERVED|POSSIBLE)")
            .expect("bad tag regexp");
        static ref DAMAGE: Regex = Regex::new(
            r"(TORNADO|THUNDERSTORM) DAMAGE THREAT\.\.\.(CONSIDERABLE|SIGNIFICANT|CATASTROPHIC|DESTRUCTIVE)"
        )
        .expect("bad tag regexp");
        static ref THREAT: Regex = Regex::new(r"(HAIL|WIND) THREAT\.\.\.(RADAR INDICATED|OBSERVED|POSSIBLE)")
            .expect("bad tag regexp");
        static ref WIND: Regex = Regex::new(r"(WIND|MAX WIND GUST)\.\.\.([><]?)\s?(\d+)\s?(MPH|KTS)")
            .expect("bad tag regexp");
        static ref HAIL: Regex = Regex::new(r"(HAIL|MAX HAIL SIZE)\.\.\.([><]?)(\d+(?:\.\d+)?)\s?IN")
            .expect("bad tag regexp");
        static ref LEGACY: Regex =
            Regex::new(r"WIND\.\.\.HAIL ([><]?)(\d+)(MPH|KTS) ([><]?)(\d*\.?\d+)IN").expect("bad tag regexp");
        static ref FLOOD: Regex = Regex::new(
            r"(?m)^[ \t]*(FLASH FLOOD DAMAGE THREAT|FLASH FLOOD|EXPECTED RAINFALL|DAM FAILURE|LEVEE FAILURE)\.\.\.(.+?)[ \t]*$"
        )
        .expect("bad tag regexp");
    }

    let mut tags = Tags::default();

    if let Some(caps) = TORNADO.captures(collapsed) {
        tags.tornado = caps[1].parse().ok();
    }
    if let Some(caps) = SPOUT.captures(collapsed) {
        if let Ok(observation) = caps[2].parse() {
            tags.spout = Some(SpoutTag {
                kind: format!("{}SPOUT", &caps[1]),
                observation,
            });
        }
    }
    if let Some(caps) = DAMAGE.captures(collapsed) {
        if let Ok(level) = caps[2].parse() {
            tags.damage = Some(DamageTag {
                source: caps[1].to_owned(),
                level,
            });
        }
    }
    for caps in THREAT.captures_iter(collapsed) {
        let observation = caps[2].parse().ok();
        match &caps[1] {
            "HAIL" => tags.hail_threat = observation,
            _ => tags.wind_threat = observation,
        }
    }

    if let Some(caps) = LEGACY.captures(collapsed) {
        tags.max_wind = caps[2].parse().ok().map(|value| WindTag {
            qualifier: caps[1].to_owned(),
            value,
            units: caps[3].to_owned(),
        });
        tags.max_hail = Some(HailTag {
            qualifier: caps[4].to_owned(),
            size: caps[5].to_owned(),
        });
    }
    if let Some(caps) = WIND.captures(collapsed) {
        tags.max_wind = caps[3].parse().ok().map(|value| WindTag {
            qualifier: caps[2].to_owned(),
            value,
            units: caps[4].to_owned(),
        });
    }
    if let Some(caps) = HAIL.captures(collapsed) {
        tags.max_hail = Some(HailTag {
            qualifier: caps[2].to_owned(),
            size: caps[3].to_owned(),
        });
    }

    for caps in FLOOD.captures_iter(raw) {
        tags.flood.push((caps[1].to_owned(), caps[2].to_owned()));
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::text::collapse_whitespace;

    #[test]
    fn test_tornado_emergency_tags() {
        const RAW: &str = "TORNADO...OBSERVED\nTORNADO DAMAGE THREAT...CATASTROPHIC\nHAIL...2.50IN\n";
        let tags = find_tags(&collapse_whitespace(RAW), RAW);
        assert_eq!(tags.tornado, Some(Observation::Observed));
        assert_eq!(
            tags.damage,
            Some(DamageTag {
                source: "TORNADO".to_owned(),
                level: DamageLevel::Catastrophic
            })
        );
        assert_eq!(tags.max_hail.as_ref().map(|h| h.size.as_str()), Some("2.50"));
        assert!(tags.is_catastrophic());
        assert_eq!(
            tags.summary().unwrap(),
            "tornado: OBSERVED, tornado damage threat: CATASTROPHIC, hail: 2.50 IN"
        );
    }

    #[test]
    fn test_threat_tags() {
        const RAW: &str = "HAIL THREAT...RADAR INDICATED\nMAX HAIL SIZE...1.00 IN\n\nWIND THREAT...OBSERVED\nMAX WIND GUST...>70 MPH\n";
        let tags = find_tags(&collapse_whitespace(RAW), RAW);
        assert_eq!(tags.hail_threat, Some(Observation::RadarIndicated));
        assert_eq!(tags.wind_threat, Some(Observation::Observed));
        assert_eq!(
            tags.max_wind,
            Some(WindTag {
                qualifier: ">".to_owned(),
                value: 70,
                units: "MPH".to_owned()
            })
        );
        assert_eq!(tags.max_hail.unwrap().size, "1.00");
        assert_eq!(tags.tornado, None);
    }

    #[test]
    fn test_legacy_and_spout() {
        const RAW: &str = "WATERSPOUT...POSSIBLE\nWIND...HAIL <50KTS <.75IN\n";
        let tags = find_tags(&collapse_whitespace(RAW), RAW);
        let spout = tags.spout.unwrap();
        assert_eq!(spout.kind, "WATERSPOUT");
        assert_eq!(spout.observation, Observation::Possible);
        let wind = tags.max_wind.unwrap();
        assert_eq!(wind.value, 50);
        assert_eq!(wind.units, "KTS");
        assert_eq!(tags.max_hail.unwrap().size, ".75");
    }

    #[test]
    fn test_flood_phrases() {
        const RAW: &str = "FLASH FLOOD...OBSERVED\nFLASH FLOOD DAMAGE THREAT...CATASTROPHIC\nEXPECTED RAINFALL...2-4 INCHES IN 1 HOUR\n";
        let tags = find_tags(&collapse_whitespace(RAW), RAW);
        assert_eq!(tags.flood.len(), 3);
        assert_eq!(tags.flood("FLASH FLOOD"), Some("OBSERVED"));
        assert_eq!(tags.flood("EXPECTED RAINFALL"), Some("2-4 INCHES IN 1 HOUR"));
        assert!(tags.is_catastrophic());
        assert!(!tags.is_empty());
        assert!(find_tags("", "").is_empty());
    }
}
