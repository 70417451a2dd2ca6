//! Deterministic full ordering of a petition's offense records.
//!
//! Key, in priority order:
//! 1. record_number — originating legal record (case);
//! 2. offense_id    — offense within that record;
//! 3. id            — offense record id, final tiebreak.
//!
//! The key is total over distinct ids, so repeated reads of the same record set
//! always yield the same sequence. Pagination never sorts on its own; the
//! position in this order is the only thing page boundaries look at.

use std::cmp::Ordering;

use crate::model::OffenseRecord;

pub fn offense_record_order(a: &OffenseRecord, b: &OffenseRecord) -> Ordering {
    a.record_number
        .cmp(&b.record_number)
        .then_with(|| a.offense_id.cmp(&b.offense_id))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort in place by `offense_record_order`.
pub fn sort_offense_records(records: &mut [OffenseRecord]) {
    records.sort_by(offense_record_order);
}
