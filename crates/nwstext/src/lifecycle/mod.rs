//! Event lifecycle tracking
//!
//! VTEC actions in successive products start, continue, extend,
//! and end events. The [engine](apply_product) replays each
//! product's actions against an [`EventStore`] that the caller
//! supplies. [`MemoryEventStore`] is a complete in-memory store.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use nwstext::{apply_product, MemoryEventStore, ProductParserBuilder};
//!
//! # const TEXT: &str = "000 \nWUUS53 KJAN 291651\nTORJAN\nMSC035-MSC073-MSC091-291715-\n\
//! # /O.NEW.KJAN.TO.W.0130.050829T1651Z-050829T1815Z/\n\nTORNADO WARNING\n\
//! # 1151 AM CDT MON AUG 29 2005\n\n$$\n";
//! let parser = ProductParserBuilder::new()
//!     .with_utcnow(Utc.with_ymd_and_hms(2005, 8, 29, 17, 0, 0).unwrap())
//!     .build();
//! let product = parser.parse(TEXT).unwrap();
//!
//! let mut store = MemoryEventStore::new();
//! let report = apply_product(&product, &mut store).unwrap();
//! assert_eq!(report.inserted, 3);
//! assert!(report.warnings.is_empty());
//! assert_eq!(store.warnings().len(), 3);
//! ```

mod engine;
mod memory;
mod store;

pub use engine::{apply_product, LifecycleReport};
pub use memory::MemoryEventStore;
pub use store::{EventStore, SbwRow, StatusFilter, WarningRow, WarningUpdate};
