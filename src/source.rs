//! Record retrieval seam: where the ordered offense records of a petition come from.
//!
//! Implementations own filtering (which records belong to the petition) and must
//! return them in `ordering::offense_record_order`.
//! Provided here for plain in-memory collections; the store implements it too.

use anyhow::Result;

use crate::model::{OffenseRecord, PetitionId};
use crate::ordering::sort_offense_records;

pub trait RecordSource {
    /// Full, deterministically ordered sequence of the petition's offense records.
    fn ordered_offense_records(&self, petition: PetitionId) -> Result<Vec<OffenseRecord>>;
}

impl RecordSource for [OffenseRecord] {
    fn ordered_offense_records(&self, petition: PetitionId) -> Result<Vec<OffenseRecord>> {
        let mut out: Vec<OffenseRecord> = self
            .iter()
            .filter(|r| r.petition == petition)
            .cloned()
            .collect();
        sort_offense_records(&mut out);
        Ok(out)
    }
}

impl RecordSource for Vec<OffenseRecord> {
    fn ordered_offense_records(&self, petition: PetitionId) -> Result<Vec<OffenseRecord>> {
        self.as_slice().ordered_offense_records(petition)
    }
}
