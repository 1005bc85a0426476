//! Event store contract

use chrono::{DateTime, Utc};

use crate::geometry::{Motion, Polygon};
use crate::tags::Tags;
use crate::vtec::{VtecAction, VtecKey};

/// One event in one UGC
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WarningRow {
    pub key: VtecKey,

    /// Six-character UGC, like `IAZ006`
    pub ugc: String,

    /// Most recent action
    pub status: VtecAction,

    /// Event start
    pub issue: DateTime<Utc>,

    /// Event end, as first issued
    pub init_expire: DateTime<Utc>,

    /// Event end, as last amended
    pub expire: DateTime<Utc>,

    /// Issuance time of the product which created the row
    pub product_issue: DateTime<Utc>,

    /// Issuance time of the product which last touched the row
    pub updated: DateTime<Utc>,

    /// UGC expiration of the last product
    pub purge_time: Option<DateTime<Utc>>,

    /// Every product which touched the row, oldest first
    pub product_ids: Vec<String>,

    /// Follow-up statement texts
    pub svs: Vec<String>,

    /// Forecaster signature
    pub fcster: Option<String>,

    pub hvtec_nwsli: Option<String>,
    pub hvtec_severity: Option<String>,
    pub hvtec_cause: Option<String>,
    pub hvtec_record: Option<String>,

    pub is_emergency: bool,
    pub is_pds: bool,
}

impl WarningRow {
    /// True unless the event has been cancelled, upgraded, or expired
    pub fn is_active(&self) -> bool {
        StatusFilter::Active.matches(self.status)
    }
}

/// One storm-based warning polygon
///
/// SBW rows are keyed by event alone. Each product which touches
/// a storm-based warning adds a row, and truncates the previous
/// row's `polygon_end` to the new `polygon_begin`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SbwRow {
    pub key: VtecKey,
    pub status: VtecAction,
    pub polygon: Polygon,
    pub polygon_begin: DateTime<Utc>,
    pub polygon_end: DateTime<Utc>,
    pub issue: DateTime<Utc>,
    pub init_expire: DateTime<Utc>,
    pub expire: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub product_id: String,
    pub tags: Tags,
    pub motion: Option<Motion>,
    pub hvtec_nwsli: Option<String>,
    pub is_emergency: bool,
    pub is_pds: bool,
}

impl SbwRow {
    /// True if the polygon covers any span of time
    pub fn is_current_candidate(&self) -> bool {
        self.polygon_begin != self.polygon_end
    }
}

/// Which rows an update or delete may touch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// Any status
    Any,

    /// Status is not CAN, UPG, or EXP
    Active,

    /// Status is NEW, EXA, or EXB
    Starting,
}

impl StatusFilter {
    /// True if a row with `status` passes the filter
    pub fn matches(&self, status: VtecAction) -> bool {
        match self {
            StatusFilter::Any => true,
            StatusFilter::Active => !status.is_ending(),
            StatusFilter::Starting => status.is_starting(),
        }
    }
}

/// Changes to apply to matching warning rows
#[derive(Clone, Debug, PartialEq)]
pub struct WarningUpdate {
    /// New status, if changing
    pub status: Option<VtecAction>,

    /// New expiration, if changing
    ///
    /// A row whose `issue` would follow the new expiration has
    /// its `issue` pulled back to match.
    pub expire: Option<DateTime<Utc>>,

    /// Statement text to append
    pub append_svs: Option<String>,

    /// Product to record
    pub product_id: String,

    /// Issuance time of the updating product
    pub updated: DateTime<Utc>,

    /// New UGC expiration
    pub purge_time: Option<DateTime<Utc>>,

    pub is_emergency: bool,
    pub is_pds: bool,
}

/// Persistent storage for event rows
///
/// The lifecycle engine wraps all calls for one product between
/// [`begin()`](EventStore::begin) and
/// [`commit()`](EventStore::commit), and calls
/// [`rollback()`](EventStore::rollback) if any call fails.
/// Implementations for a database would map these onto a
/// transaction.
///
/// The engine assumes a single writer per office, phenomenon,
/// and significance.
pub trait EventStore {
    /// Store failure
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start a transaction
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Make the transaction's changes permanent
    fn commit(&mut self) -> Result<(), Self::Error>;

    /// Discard the transaction's changes
    fn rollback(&mut self) -> Result<(), Self::Error>;

    /// Active rows for one event in one UGC
    fn find_active(&self, key: &VtecKey, ugc: &str) -> Result<Vec<WarningRow>, Self::Error>;

    /// Add a warning row
    fn insert(&mut self, row: WarningRow) -> Result<(), Self::Error>;

    /// Update rows for `key` in any of `ugcs` which pass `filter`
    ///
    /// Returns the number of rows changed.
    fn update_by_key(
        &mut self,
        key: &VtecKey,
        ugcs: &[String],
        filter: StatusFilter,
        update: &WarningUpdate,
    ) -> Result<usize, Self::Error>;

    /// Delete rows for `key` in any of `ugcs` which pass `filter`
    ///
    /// Returns the number of rows removed.
    fn delete(
        &mut self,
        key: &VtecKey,
        ugcs: &[String],
        filter: StatusFilter,
    ) -> Result<usize, Self::Error>;

    /// The polygon currently in force for `key`
    ///
    /// This is the most recently updated row whose polygon covers
    /// a span of time.
    fn find_current_sbw(&self, key: &VtecKey) -> Result<Option<SbwRow>, Self::Error>;

    /// End the polygon for `key` which now ends at `current_polygon_end`
    ///
    /// Its `polygon_end` becomes `new_polygon_end`. Returns the
    /// number of rows changed.
    fn truncate_sbw_end(
        &mut self,
        key: &VtecKey,
        new_polygon_end: DateTime<Utc>,
        current_polygon_end: DateTime<Utc>,
    ) -> Result<usize, Self::Error>;

    /// Add a polygon row
    fn insert_sbw(&mut self, row: SbwRow) -> Result<(), Self::Error>;
}
