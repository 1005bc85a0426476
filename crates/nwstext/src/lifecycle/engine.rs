use chrono::{DateTime, Datelike, Duration, Utc};
use log::{debug, warn};

use super::store::{EventStore, SbwRow, StatusFilter, WarningRow, WarningUpdate};
use crate::product::Product;
use crate::segment::Segment;
use crate::vtec::{Vtec, VtecAction, VtecClass, VtecKey};

/// Events without an end time are assumed to last this long
const OPEN_ENDED_HOURS: i64 = 24;

/// Outcome of applying one product
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LifecycleReport {
    /// Inconsistencies between the product and the store
    pub warnings: Vec<String>,

    /// Warning rows inserted
    pub inserted: usize,

    /// Warning rows updated
    pub updated: usize,

    /// Warning rows deleted
    pub deleted: usize,

    /// Polygon rows inserted
    pub sbw_inserted: usize,
}

/// Apply a product's VTEC actions to an event store
///
/// Every non-test VTEC in every segment is applied, in product
/// order, within one store transaction. Inconsistencies such as
/// a continuation of an unknown event are reported as warnings
/// and do not stop processing. A store error rolls back the
/// transaction and is returned.
pub fn apply_product<S: EventStore>(
    product: &Product,
    store: &mut S,
) -> Result<LifecycleReport, S::Error> {
    let mut report = LifecycleReport::default();

    store.begin()?;
    match apply_all(product, store, &mut report) {
        Ok(()) => {
            store.commit()?;
            debug!(
                "{}: {} inserted, {} updated, {} deleted, {} warnings",
                product,
                report.inserted,
                report.updated,
                report.deleted,
                report.warnings.len()
            );
            Ok(report)
        }
        Err(e) => {
            if let Err(rb) = store.rollback() {
                warn!("{}: rollback failed: {}", product, rb);
            }
            Err(e)
        }
    }
}

fn apply_all<S: EventStore>(
    product: &Product,
    store: &mut S,
    report: &mut LifecycleReport,
) -> Result<(), S::Error> {
    for segment in product.segments() {
        for vtec in segment.vtecs() {
            if vtec.class() == VtecClass::Test {
                continue;
            }
            let mut step = Step {
                product,
                segment,
                vtec,
                ugcs: segment.ugcs().iter().map(|u| u.code()).collect(),
                report: &mut *report,
            };
            if step.ugcs.is_empty() {
                step.warn(format!("VTEC {} has no UGCs", vtec));
                continue;
            }
            step.apply(store)?;
        }
    }
    Ok(())
}

/// One VTEC in one segment
struct Step<'a> {
    product: &'a Product,
    segment: &'a Segment,
    vtec: &'a Vtec,
    ugcs: Vec<String>,
    report: &'a mut LifecycleReport,
}

impl<'a> Step<'a> {
    fn apply<S: EventStore>(&mut self, store: &mut S) -> Result<(), S::Error> {
        let key = self.vtec.key(self.product.valid());
        match self.vtec.action() {
            VtecAction::New | VtecAction::ExtendArea | VtecAction::ExtendBoth => {
                self.apply_start(store, &key)?
            }
            VtecAction::Correct => {
                let update = self.update(None, self.vtec.end().copied());
                self.apply_update(store, key, StatusFilter::Any, &update)?;
            }
            VtecAction::Cancel | VtecAction::Upgrade => {
                let update = self.update(Some(self.vtec.action()), Some(*self.product.valid()));
                self.apply_update(store, key, StatusFilter::Active, &update)?;
            }
            VtecAction::ExtendTime
            | VtecAction::Continue
            | VtecAction::Expire
            | VtecAction::Routine => {
                let update = self.update(Some(self.vtec.action()), Some(self.end_or_default()));
                self.apply_update(store, key, StatusFilter::Active, &update)?;
            }
        }
        Ok(())
    }

    /// NEW, EXA, and EXB create rows
    fn apply_start<S: EventStore>(&mut self, store: &mut S, key: &VtecKey) -> Result<(), S::Error> {
        let bts = self
            .vtec
            .begin()
            .copied()
            .unwrap_or(*self.product.valid());
        let mut ets = match self.vtec.end() {
            Some(end) => *end,
            None => bts + Duration::hours(OPEN_ENDED_HOURS),
        };
        if ets < bts {
            self.warn(format!("VTEC {} ends before it begins; end clamped", self.vtec));
            ets = bts;
        }

        let segment = self.segment;
        let hvtec = segment.hvtecs().first();
        for ugc in self.ugcs.clone() {
            if !store.find_active(key, &ugc)?.is_empty() {
                if self.product.is_correction() {
                    self.warn(format!("{} {}: duplicate via correction", key, ugc));
                    self.report.deleted +=
                        store.delete(key, &[ugc.clone()], StatusFilter::Starting)?;
                } else {
                    self.warn(format!("{} {}: duplicate", key, ugc));
                }
            }

            store.insert(WarningRow {
                key: key.clone(),
                ugc,
                status: self.vtec.action(),
                issue: bts,
                init_expire: ets,
                expire: ets,
                product_issue: *self.product.valid(),
                updated: *self.product.valid(),
                purge_time: segment.ugc_expire().copied(),
                product_ids: vec![self.product.product_id()],
                svs: Vec::new(),
                fcster: self.product.signature().map(str::to_owned),
                hvtec_nwsli: hvtec.and_then(|h| h.nwsli()).map(str::to_owned),
                hvtec_severity: hvtec.map(|h| h.severity().as_code_str().to_owned()),
                hvtec_cause: hvtec.map(|h| h.cause_code().to_owned()),
                hvtec_record: hvtec.map(|h| h.record_code().to_owned()),
                is_emergency: segment.is_emergency(),
                is_pds: segment.is_pds(),
            })?;
            self.report.inserted += 1;
        }

        self.apply_sbw(store, key, bts, ets)
    }

    /// Every other action updates rows
    ///
    /// A correction which cancels, upgrades, or extends may
    /// legitimately touch fewer rows than it lists. Updates which
    /// match nothing in January are retried against the previous
    /// year's events, which may have begun before the new year.
    fn apply_update<S: EventStore>(
        &mut self,
        store: &mut S,
        mut key: VtecKey,
        filter: StatusFilter,
        update: &WarningUpdate,
    ) -> Result<(), S::Error> {
        let mut rows = store.update_by_key(&key, &self.ugcs, filter, update)?;
        if rows == 0 && self.product.valid().month() == 1 {
            let previous = self.vtec.key_for_year(key.year - 1);
            rows = store.update_by_key(&previous, &self.ugcs, filter, update)?;
            if rows > 0 {
                key = previous;
            }
        }
        self.report.updated += rows;

        if rows != self.ugcs.len() {
            let excused = self.product.is_correction()
                && matches!(
                    self.vtec.action(),
                    VtecAction::Cancel | VtecAction::Upgrade | VtecAction::ExtendTime
                );
            if !excused {
                self.warn(format!(
                    "{} {}: updated {} rows for {} UGCs",
                    key,
                    self.vtec.action(),
                    rows,
                    self.ugcs.len()
                ));
            }
        }

        let bts = *self.product.valid();
        let ets = update.expire.unwrap_or_else(|| self.end_or_default());
        self.apply_sbw(store, &key, bts, ets)
    }

    fn apply_sbw<S: EventStore>(
        &mut self,
        store: &mut S,
        key: &VtecKey,
        bts: DateTime<Utc>,
        ets: DateTime<Utc>,
    ) -> Result<(), S::Error> {
        let segment = self.segment;
        let polygon = match segment.polygon() {
            Some(p) => p,
            None => return Ok(()),
        };
        let action = self.vtec.action();
        let valid = *self.product.valid();

        let current = store.find_current_sbw(key)?;
        let polygon_begin = if action == VtecAction::New {
            if let Some(prior) = current {
                self.warn(format!("{}: SBW duplicate", key));
                store.truncate_sbw_end(key, bts, prior.polygon_end)?;
            }
            bts
        } else {
            match current {
                Some(prior) => {
                    store.truncate_sbw_end(key, valid, prior.polygon_end)?;
                }
                None => self.warn(format!("{}: SBW prior polygon not found", key)),
            }
            valid
        };
        let polygon_end = if action.is_ending() {
            valid
        } else {
            ets.max(polygon_begin)
        };

        let hvtec = segment.hvtecs().first();
        store.insert_sbw(SbwRow {
            key: key.clone(),
            status: action,
            polygon: polygon.clone(),
            polygon_begin,
            polygon_end,
            issue: bts,
            init_expire: ets,
            expire: ets,
            updated: valid,
            product_id: self.product.product_id(),
            tags: segment.tags().clone(),
            motion: segment.motion().cloned(),
            hvtec_nwsli: hvtec.and_then(|h| h.nwsli()).map(str::to_owned),
            is_emergency: self.product.is_emergency(),
            is_pds: self.product.is_pds(),
        })?;
        self.report.sbw_inserted += 1;
        Ok(())
    }

    /// Every update appends the whole product text to the rows
    fn update(&self, status: Option<VtecAction>, expire: Option<DateTime<Utc>>) -> WarningUpdate {
        WarningUpdate {
            status,
            expire,
            append_svs: Some(self.product.text().to_owned()),
            product_id: self.product.product_id(),
            updated: *self.product.valid(),
            purge_time: self.segment.ugc_expire().copied(),
            is_emergency: self.segment.is_emergency(),
            is_pds: self.segment.is_pds(),
        }
    }

    /// VTEC end time, or a day past issuance if open-ended
    fn end_or_default(&self) -> DateTime<Utc> {
        self.vtec
            .end()
            .copied()
            .unwrap_or_else(|| *self.product.valid() + Duration::hours(OPEN_ENDED_HOURS))
    }

    fn warn(&mut self, msg: String) {
        debug!("{}: {}", self.product, msg);
        self.report.warnings.push(msg);
    }
}
