//! Static code tables for VTEC phenomena and significance

mod phenomenon;
mod significance;

pub use phenomenon::{ps_string, Phenomenon};
pub use significance::SignificanceLevel;
