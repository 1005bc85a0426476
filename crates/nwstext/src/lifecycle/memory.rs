use std::convert::Infallible;

use chrono::{DateTime, Utc};

use super::store::{EventStore, SbwRow, StatusFilter, WarningRow, WarningUpdate};
use crate::vtec::VtecKey;

/// An in-memory event store
///
/// Transactions are implemented with a snapshot taken at
/// [`begin()`](EventStore::begin), which
/// [`rollback()`](EventStore::rollback) restores.
#[derive(Clone, Debug, Default)]
pub struct MemoryEventStore {
    warnings: Vec<WarningRow>,
    sbw: Vec<SbwRow>,
    snapshot: Option<(Vec<WarningRow>, Vec<SbwRow>)>,
}

impl MemoryEventStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// All warning rows, in insertion order
    pub fn warnings(&self) -> &[WarningRow] {
        &self.warnings
    }

    /// All polygon rows, in insertion order
    pub fn sbw(&self) -> &[SbwRow] {
        &self.sbw
    }

    /// Number of active rows for `key`
    pub fn active_count(&self, key: &VtecKey) -> usize {
        self.warnings
            .iter()
            .filter(|r| &r.key == key && r.is_active())
            .count()
    }
}

impl EventStore for MemoryEventStore {
    type Error = Infallible;

    fn begin(&mut self) -> Result<(), Self::Error> {
        self.snapshot = Some((self.warnings.clone(), self.sbw.clone()));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), Self::Error> {
        self.snapshot = None;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), Self::Error> {
        if let Some((warnings, sbw)) = self.snapshot.take() {
            self.warnings = warnings;
            self.sbw = sbw;
        }
        Ok(())
    }

    fn find_active(&self, key: &VtecKey, ugc: &str) -> Result<Vec<WarningRow>, Self::Error> {
        Ok(self
            .warnings
            .iter()
            .filter(|r| &r.key == key && r.ugc == ugc && r.is_active())
            .cloned()
            .collect())
    }

    fn insert(&mut self, row: WarningRow) -> Result<(), Self::Error> {
        self.warnings.push(row);
        Ok(())
    }

    fn update_by_key(
        &mut self,
        key: &VtecKey,
        ugcs: &[String],
        filter: StatusFilter,
        update: &WarningUpdate,
    ) -> Result<usize, Self::Error> {
        let mut count = 0;
        for row in self.warnings.iter_mut() {
            if &row.key != key || !ugcs.contains(&row.ugc) || !filter.matches(row.status) {
                continue;
            }

            if let Some(status) = update.status {
                row.status = status;
            }
            if let Some(expire) = update.expire {
                row.expire = expire;
                if row.issue > expire {
                    row.issue = expire;
                }
            }
            if let Some(svs) = &update.append_svs {
                row.svs.push(svs.clone());
            }
            row.product_ids.push(update.product_id.clone());
            row.updated = update.updated;
            if update.purge_time.is_some() {
                row.purge_time = update.purge_time;
            }
            row.is_emergency |= update.is_emergency;
            row.is_pds |= update.is_pds;
            count += 1;
        }
        Ok(count)
    }

    fn delete(
        &mut self,
        key: &VtecKey,
        ugcs: &[String],
        filter: StatusFilter,
    ) -> Result<usize, Self::Error> {
        let before = self.warnings.len();
        self.warnings
            .retain(|r| !(&r.key == key && ugcs.contains(&r.ugc) && filter.matches(r.status)));
        Ok(before - self.warnings.len())
    }

    fn find_current_sbw(&self, key: &VtecKey) -> Result<Option<SbwRow>, Self::Error> {
        // on ties, the later insertion wins
        Ok(self
            .sbw
            .iter()
            .filter(|r| &r.key == key && r.is_current_candidate())
            .fold(None, |best: Option<&SbwRow>, r| match best {
                Some(b) if b.updated > r.updated => Some(b),
                _ => Some(r),
            })
            .cloned())
    }

    fn truncate_sbw_end(
        &mut self,
        key: &VtecKey,
        new_polygon_end: DateTime<Utc>,
        current_polygon_end: DateTime<Utc>,
    ) -> Result<usize, Self::Error> {
        let mut count = 0;
        for row in self.sbw.iter_mut() {
            if &row.key == key && row.polygon_end == current_polygon_end && row.is_current_candidate()
            {
                row.polygon_end = new_polygon_end.max(row.polygon_begin);
                count += 1;
            }
        }
        Ok(count)
    }

    fn insert_sbw(&mut self, row: SbwRow) -> Result<(), Self::Error> {
        self.sbw.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    use crate::geometry::find_polygon;
    use crate::tags::Tags;
    use crate::vtec::VtecAction;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2005, 8, 29, hour, min, 0).unwrap()
    }

    fn key() -> VtecKey {
        VtecKey {
            year: 2005,
            office: "KJAN".to_owned(),
            phenomenon: "TO".to_owned(),
            significance: "W".to_owned(),
            etn: 130,
        }
    }

    fn warning(ugc: &str) -> WarningRow {
        WarningRow {
            key: key(),
            ugc: ugc.to_owned(),
            status: VtecAction::New,
            issue: at(16, 51),
            init_expire: at(18, 15),
            expire: at(18, 15),
            product_issue: at(16, 51),
            updated: at(16, 51),
            purge_time: None,
            product_ids: vec!["200508291651-KJAN-WUUS53-TORJAN".to_owned()],
            svs: Vec::new(),
            fcster: None,
            hvtec_nwsli: None,
            hvtec_severity: None,
            hvtec_cause: None,
            hvtec_record: None,
            is_emergency: false,
            is_pds: false,
        }
    }

    fn sbw(begin: DateTime<Utc>, end: DateTime<Utc>, product_id: &str) -> SbwRow {
        let polygon = find_polygon("LAT...LON 3244 9017 3234 9076 3282 9081", false, &mut Vec::new())
            .unwrap()
            .unwrap();
        SbwRow {
            key: key(),
            status: VtecAction::New,
            polygon,
            polygon_begin: begin,
            polygon_end: end,
            issue: begin,
            init_expire: end,
            expire: end,
            updated: begin,
            product_id: product_id.to_owned(),
            tags: Tags::default(),
            motion: None,
            hvtec_nwsli: None,
            is_emergency: false,
            is_pds: false,
        }
    }

    #[test]
    fn test_rollback() {
        let mut store = MemoryEventStore::new();
        store.begin().unwrap();
        store.insert(warning("MSC035")).unwrap();
        store.commit().unwrap();

        store.begin().unwrap();
        store.insert(warning("MSC073")).unwrap();
        store.insert_sbw(sbw(at(16, 51), at(18, 15), "a")).unwrap();
        assert_eq!(store.warnings().len(), 2);
        store.rollback().unwrap();

        assert_eq!(store.warnings().len(), 1);
        assert_eq!(store.warnings()[0].ugc, "MSC035");
        assert!(store.sbw().is_empty());

        // nothing to restore after a commit
        store.rollback().unwrap();
        assert_eq!(store.warnings().len(), 1);
    }

    #[test]
    fn test_update_and_delete() {
        let mut store = MemoryEventStore::new();
        store.insert(warning("MSC035")).unwrap();
        store.insert(warning("MSC073")).unwrap();

        let update = WarningUpdate {
            status: Some(VtecAction::Cancel),
            expire: Some(at(16, 30)),
            append_svs: Some("CANCELLED".to_owned()),
            product_id: "200508291630-KJAN-WWUS53-SVSJAN".to_owned(),
            updated: at(16, 30),
            purge_time: None,
            is_emergency: false,
            is_pds: true,
        };
        let ugcs = vec!["MSC035".to_owned()];
        assert_eq!(
            store.update_by_key(&key(), &ugcs, StatusFilter::Active, &update).unwrap(),
            1
        );

        let row = &store.warnings()[0];
        assert_eq!(row.status, VtecAction::Cancel);
        assert_eq!(row.expire, at(16, 30));
        assert_eq!(row.issue, at(16, 30));
        assert_eq!(row.svs, vec!["CANCELLED".to_owned()]);
        assert_eq!(row.product_ids.len(), 2);
        assert!(row.is_pds);
        assert_eq!(store.active_count(&key()), 1);

        // the cancelled row is no longer active or starting
        assert_eq!(
            store.update_by_key(&key(), &ugcs, StatusFilter::Active, &update).unwrap(),
            0
        );
        assert_eq!(store.delete(&key(), &ugcs, StatusFilter::Starting).unwrap(), 0);
        assert_eq!(store.delete(&key(), &ugcs, StatusFilter::Any).unwrap(), 1);
        assert_eq!(store.warnings().len(), 1);
    }

    #[test]
    fn test_find_current_sbw() {
        let mut store = MemoryEventStore::new();
        assert_eq!(store.find_current_sbw(&key()).unwrap(), None);

        store.insert_sbw(sbw(at(17, 0), at(18, 15), "later")).unwrap();
        store.insert_sbw(sbw(at(16, 51), at(18, 15), "earlier")).unwrap();
        assert_eq!(
            store.find_current_sbw(&key()).unwrap().unwrap().product_id,
            "later"
        );

        // on ties, the last insertion wins
        store.insert_sbw(sbw(at(17, 0), at(18, 15), "tied")).unwrap();
        assert_eq!(
            store.find_current_sbw(&key()).unwrap().unwrap().product_id,
            "tied"
        );

        // polygons without any duration are never current
        store.insert_sbw(sbw(at(17, 30), at(17, 30), "empty")).unwrap();
        assert_eq!(
            store.find_current_sbw(&key()).unwrap().unwrap().product_id,
            "tied"
        );
    }

    #[test]
    fn test_truncate_sbw_end() {
        let mut store = MemoryEventStore::new();
        store.insert_sbw(sbw(at(16, 51), at(18, 15), "a")).unwrap();
        store.insert_sbw(sbw(at(17, 0), at(18, 30), "b")).unwrap();

        assert_eq!(store.truncate_sbw_end(&key(), at(17, 30), at(18, 15)).unwrap(), 1);
        assert_eq!(store.sbw()[0].polygon_end, at(17, 30));
        assert_eq!(store.sbw()[1].polygon_end, at(18, 30));

        // never ends before it begins
        assert_eq!(store.truncate_sbw_end(&key(), at(16, 0), at(18, 30)).unwrap(), 1);
        assert_eq!(store.sbw()[1].polygon_end, at(17, 0));
        assert!(!store.sbw()[1].is_current_candidate());

        // rows which are no longer current are left alone
        assert_eq!(store.truncate_sbw_end(&key(), at(16, 55), at(17, 0)).unwrap(), 0);
    }
}
