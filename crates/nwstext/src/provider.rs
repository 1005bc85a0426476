//! Read-only metadata providers
//!
//! The decoder does not own any geographic database. Callers
//! supply UGC and NWSLI metadata through these traits, which
//! are consulted while a product is decoded. Plain `HashMap`s
//! implement both.

use std::collections::HashMap;

/// Metadata for one UGC, such as `IAC001`
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UgcInfo {
    /// Display name, like "Adair"
    pub name: String,

    /// Responsible forecast offices, like `["DMX"]`
    pub wfos: Vec<String>,
}

/// Metadata for one NWS location identifier (river gauge or site)
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NwsliInfo {
    /// Display name, like "Des Moines River at Keosauqua"
    pub name: String,

    /// Latitude, degrees north
    pub lat: f64,

    /// Longitude, degrees east
    pub lon: f64,

    /// Responsible forecast offices
    pub wfos: Vec<String>,
}

/// Lookup of UGC metadata by six-character code
pub trait UgcProvider {
    /// Metadata for `code`, like "`IAC001`", if known
    fn lookup(&self, code: &str) -> Option<UgcInfo>;
}

/// Lookup of NWSLI metadata by five-character identifier
pub trait NwsliProvider {
    /// Metadata for `nwsli`, like "`KEOI4`", if known
    fn lookup(&self, nwsli: &str) -> Option<NwsliInfo>;
}

impl UgcProvider for HashMap<String, UgcInfo> {
    fn lookup(&self, code: &str) -> Option<UgcInfo> {
        self.get(code).cloned()
    }
}

impl NwsliProvider for HashMap<String, NwsliInfo> {
    fn lookup(&self, nwsli: &str) -> Option<NwsliInfo> {
        self.get(nwsli).cloned()
    }
}

/// A provider which knows nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyProvider;

impl UgcProvider for EmptyProvider {
    fn lookup(&self, _code: &str) -> Option<UgcInfo> {
        None
    }
}

impl NwsliProvider for EmptyProvider {
    fn lookup(&self, _nwsli: &str) -> Option<NwsliInfo> {
        None
    }
}
