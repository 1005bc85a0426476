//! VTEC phenomenon codes

use std::fmt;

use phf::phf_map;
use strum::EnumMessage;

use super::SignificanceLevel;

/// VTEC phenomenon
///
/// The two-letter code which describes *what* is occurring, like
/// `TO` for Tornado. Codes are listed in NWSI 10-1703.
///
/// ```
/// use nwstext::Phenomenon;
///
/// let ph = Phenomenon::from("SV");
/// assert_eq!(Phenomenon::SevereThunderstorm, ph);
/// assert_eq!("SV", ph.as_code_str());
/// assert_eq!("Severe Thunderstorm", ph.to_string());
///
/// assert!(Phenomenon::from("??").is_unrecognized());
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
    strum_macros::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[non_exhaustive]
pub enum Phenomenon {
    /// Unrecognized phenomenon code
    #[strum(serialize = "??", detailed_message = "Unrecognized")]
    Unrecognized,

    #[strum(serialize = "AF", detailed_message = "Ashfall")]
    Ashfall,
    #[strum(serialize = "AS", detailed_message = "Air Stagnation")]
    AirStagnation,
    #[strum(serialize = "BH", detailed_message = "Beach Hazards")]
    BeachHazards,
    #[strum(serialize = "BS", detailed_message = "Blowing Snow")]
    BlowingSnow,
    #[strum(serialize = "BW", detailed_message = "Brisk Wind")]
    BriskWind,
    #[strum(serialize = "BZ", detailed_message = "Blizzard")]
    Blizzard,
    #[strum(serialize = "CF", detailed_message = "Coastal Flood")]
    CoastalFlood,
    #[strum(serialize = "CW", detailed_message = "Cold Weather")]
    ColdWeather,
    #[strum(serialize = "DF", detailed_message = "Debris Flow")]
    DebrisFlow,
    #[strum(serialize = "DS", detailed_message = "Dust Storm")]
    DustStorm,
    #[strum(serialize = "DU", detailed_message = "Blowing Dust")]
    BlowingDust,
    #[strum(serialize = "EC", detailed_message = "Extreme Cold")]
    ExtremeCold,
    #[strum(serialize = "EH", detailed_message = "Excessive Heat")]
    ExcessiveHeat,
    #[strum(serialize = "EW", detailed_message = "Extreme Wind")]
    ExtremeWind,
    #[strum(serialize = "FA", detailed_message = "Areal Flood")]
    ArealFlood,
    #[strum(serialize = "FF", detailed_message = "Flash Flood")]
    FlashFlood,
    #[strum(serialize = "FG", detailed_message = "Dense Fog")]
    DenseFog,
    #[strum(serialize = "FL", detailed_message = "Flood")]
    Flood,
    #[strum(serialize = "FR", detailed_message = "Frost")]
    Frost,
    #[strum(serialize = "FW", detailed_message = "Fire Weather")]
    FireWeather,
    #[strum(serialize = "FZ", detailed_message = "Freeze")]
    Freeze,
    #[strum(serialize = "GL", detailed_message = "Gale")]
    Gale,
    #[strum(serialize = "HF", detailed_message = "Hurricane Force Wind")]
    HurricaneForceWind,
    #[strum(serialize = "HI", detailed_message = "Inland Hurricane")]
    InlandHurricane,
    #[strum(serialize = "HS", detailed_message = "Heavy Snow")]
    HeavySnow,
    #[strum(serialize = "HT", detailed_message = "Heat")]
    Heat,
    #[strum(serialize = "HU", detailed_message = "Hurricane")]
    Hurricane,
    #[strum(serialize = "HW", detailed_message = "High Wind")]
    HighWind,
    #[strum(serialize = "HY", detailed_message = "Hydrologic")]
    Hydrologic,
    #[strum(serialize = "HZ", detailed_message = "Hard Freeze")]
    HardFreeze,
    #[strum(serialize = "IS", detailed_message = "Ice Storm")]
    IceStorm,
    #[strum(serialize = "LE", detailed_message = "Lake Effect Snow")]
    LakeEffectSnow,
    #[strum(serialize = "LO", detailed_message = "Low Water")]
    LowWater,
    #[strum(serialize = "LS", detailed_message = "Lakeshore Flood")]
    LakeshoreFlood,
    #[strum(serialize = "LW", detailed_message = "Lake Wind")]
    LakeWind,
    #[strum(serialize = "MA", detailed_message = "Marine")]
    Marine,
    #[strum(serialize = "MF", detailed_message = "Marine Dense Fog")]
    MarineDenseFog,
    #[strum(serialize = "MH", detailed_message = "Marine Ashfall")]
    MarineAshfall,
    #[strum(serialize = "MS", detailed_message = "Marine Dense Smoke")]
    MarineDenseSmoke,
    #[strum(serialize = "RB", detailed_message = "Small Craft for Rough Bar")]
    SmallCraftRoughBar,
    #[strum(serialize = "RP", detailed_message = "Rip Current Risk")]
    RipCurrent,
    #[strum(serialize = "SC", detailed_message = "Small Craft")]
    SmallCraft,
    #[strum(serialize = "SE", detailed_message = "Hazardous Seas")]
    HazardousSeas,
    #[strum(serialize = "SI", detailed_message = "Small Craft for Winds")]
    SmallCraftWinds,
    #[strum(serialize = "SM", detailed_message = "Dense Smoke")]
    DenseSmoke,
    #[strum(serialize = "SN", detailed_message = "Snow")]
    Snow,
    #[strum(serialize = "SQ", detailed_message = "Snow Squall")]
    SnowSquall,
    #[strum(serialize = "SR", detailed_message = "Storm")]
    Storm,
    #[strum(serialize = "SS", detailed_message = "Storm Surge")]
    StormSurge,
    #[strum(serialize = "SU", detailed_message = "High Surf")]
    HighSurf,
    #[strum(serialize = "SV", detailed_message = "Severe Thunderstorm")]
    SevereThunderstorm,
    #[strum(serialize = "SW", detailed_message = "Small Craft for Hazardous Seas")]
    SmallCraftHazardousSeas,
    #[strum(serialize = "TI", detailed_message = "Inland Tropical Storm")]
    InlandTropicalStorm,
    #[strum(serialize = "TO", detailed_message = "Tornado")]
    Tornado,
    #[strum(serialize = "TR", detailed_message = "Tropical Storm")]
    TropicalStorm,
    #[strum(serialize = "TS", detailed_message = "Tsunami")]
    Tsunami,
    #[strum(serialize = "TY", detailed_message = "Typhoon")]
    Typhoon,
    #[strum(serialize = "UP", detailed_message = "Heavy Freezing Spray")]
    HeavyFreezingSpray,
    #[strum(serialize = "WC", detailed_message = "Wind Chill")]
    WindChill,
    #[strum(serialize = "WI", detailed_message = "Wind")]
    Wind,
    #[strum(serialize = "WS", detailed_message = "Winter Storm")]
    WinterStorm,
    #[strum(serialize = "WW", detailed_message = "Winter Weather")]
    WinterWeather,
    #[strum(serialize = "XH", detailed_message = "Extreme Heat")]
    ExtremeHeat,
    #[strum(serialize = "ZF", detailed_message = "Freezing Fog")]
    FreezingFog,
    #[strum(serialize = "ZR", detailed_message = "Freezing Rain")]
    FreezingRain,
}

/// Product names which do not follow "phenomenon significance"
static SPECIAL_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "FW.W" => "Red Flag Warning",
    "FW.A" => "Fire Weather Watch",
    "MA.W" => "Special Marine Warning",
    "MA.S" => "Marine Weather Statement",
    "RP.S" => "High Rip Current Risk",
    "HY.S" => "Hydrologic Statement",
    "HY.O" => "Hydrologic Outlook",
    "FA.Y" => "Areal Flood Advisory",
};

impl Phenomenon {
    /// Parse from a two-character code like "`TO`"
    ///
    /// Unrecognized input yields [`Phenomenon::Unrecognized`].
    pub fn from<S>(code: S) -> Self
    where
        S: AsRef<str>,
    {
        str::parse(code.as_ref()).unwrap_or(Phenomenon::Unrecognized)
    }

    /// Human-readable string representation, like "`Flash Flood`"
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().expect("missing definition")
    }

    /// Two-character VTEC code
    pub fn as_code_str(&self) -> &'static str {
        self.get_serializations()[0]
    }

    /// True if the code was not recognized
    pub fn is_unrecognized(&self) -> bool {
        *self == Phenomenon::Unrecognized
    }

    /// True for phenomena whose warnings are storm-based polygons
    pub fn is_storm_based(&self) -> bool {
        matches!(
            self,
            Phenomenon::Tornado
                | Phenomenon::SevereThunderstorm
                | Phenomenon::FlashFlood
                | Phenomenon::Marine
                | Phenomenon::SnowSquall
                | Phenomenon::ExtremeWind
                | Phenomenon::DustStorm
        )
    }
}

/// Product name for a phenomenon and significance pair
///
/// Combines the raw `phenomenon` and `significance` codes into a
/// human-readable name like "Tornado Warning." A few products have
/// special names; `FW.W` is a "Red Flag Warning." Unknown codes are
/// shown in brackets.
pub fn ps_string(phenomenon: &str, significance: &str) -> String {
    let key = format!("{}.{}", phenomenon, significance);
    if let Some(name) = SPECIAL_NAMES.get(key.as_str()) {
        return (*name).to_owned();
    }

    let ph = Phenomenon::from(phenomenon);
    let sig = SignificanceLevel::from(significance);
    let ph_name = if ph.is_unrecognized() {
        format!("[{}]", phenomenon)
    } else {
        ph.as_display_str().to_owned()
    };
    let sig_name = if sig == SignificanceLevel::Unknown {
        format!("[{}]", significance)
    } else {
        sig.as_display_str().to_owned()
    };
    format!("{} {}", ph_name, sig_name)
}

impl AsRef<str> for Phenomenon {
    fn as_ref(&self) -> &'static str {
        self.as_code_str()
    }
}

impl fmt::Display for Phenomenon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            self.as_code_str().fmt(f)
        } else {
            self.as_display_str().fmt(f)
        }
    }
}
