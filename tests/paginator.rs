use anyhow::Result;

use petition_pager::{
    OffenseRecord, OffenseRecordId, OffenseRecordPaginator, Petition, PetitionId, Store,
};

const PETITION: PetitionId = PetitionId(1);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Petition with `size` records, one per originating record (case).
fn store_with_records(size: u64) -> Result<Store> {
    let mut store = Store::in_memory();
    store.transaction(|tx| {
        tx.insert_petition(Petition::new(PETITION))?;
        for i in 0..size {
            tx.insert_offense_record(OffenseRecord::new(
                OffenseRecordId(i + 1),
                PETITION,
                format!("20CR{:06}", i + 1),
                1,
            ))?;
        }
        Ok(())
    })?;
    Ok(store)
}

#[test]
fn paginator_initial_page_size() -> Result<()> {
    let store = store_with_records(0)?;
    for (given, expected) in [(10i64, 10usize), (0, 10), (-10, 10)] {
        let p = OffenseRecordPaginator::new(&store, PETITION, given, 0);
        assert_eq!(p.initial_page_size(), expected, "given={given}");
    }
    Ok(())
}

#[test]
fn paginator_attachment_page_size() -> Result<()> {
    let store = store_with_records(0)?;
    for (given, expected) in [(10i64, 10usize), (0, 20), (-10, 20)] {
        let p = OffenseRecordPaginator::new(&store, PETITION, 0, given);
        assert_eq!(p.attachment_page_size(), expected, "given={given}");
    }
    Ok(())
}

#[test]
fn paginator_petition_offense_records() -> Result<()> {
    init_logger();
    let store = store_with_records(11)?;
    let paginator = store.offense_record_paginator(PETITION)?;
    let primary = paginator.petition_offense_records()?;
    assert_eq!(primary.len(), 10);
    // first ten in order
    let ids: Vec<u64> = primary.iter().map(|r| r.id.0).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
    Ok(())
}

#[test]
fn paginator_attachment_records_10() -> Result<()> {
    let store = store_with_records(10)?;
    let paginator = store.offense_record_paginator(PETITION)?;
    assert_eq!(paginator.attachment_offense_records()?.count(), 0);
    Ok(())
}

#[test]
fn paginator_attachment_records_11() -> Result<()> {
    let store = store_with_records(11)?;
    let paginator = store.offense_record_paginator(PETITION)?;
    let pages: Vec<Vec<OffenseRecord>> = paginator.attachment_offense_records()?.collect();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].len(), 1);
    assert_eq!(pages[0][0].id, OffenseRecordId(11));
    Ok(())
}

#[test]
fn paginator_attachment_records_35() -> Result<()> {
    let store = store_with_records(35)?;
    let paginator = store.offense_record_paginator(PETITION)?;
    let pages: Vec<Vec<OffenseRecord>> = paginator.attachment_offense_records()?.collect();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].len(), 20);
    assert_eq!(pages[1].len(), 5);
    assert_eq!(pages[0][0].id, OffenseRecordId(11));
    assert_eq!(pages[1][4].id, OffenseRecordId(35));
    Ok(())
}

#[test]
fn paginator_results_are_recomputed() -> Result<()> {
    let store = store_with_records(35)?;
    let paginator = store.offense_record_paginator(PETITION)?;
    let a: Vec<Vec<OffenseRecord>> = paginator.attachment_offense_records()?.collect();
    let b: Vec<Vec<OffenseRecord>> = paginator.attachment_offense_records()?.collect();
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn paginator_uses_petition_page_sizes() -> Result<()> {
    let mut store = Store::in_memory();
    store.transaction(|tx| {
        tx.insert_petition(Petition::new(PETITION).with_page_sizes(Some(4), Some(3)))?;
        for i in 0..12u64 {
            tx.insert_offense_record(OffenseRecord::new(
                OffenseRecordId(i + 1),
                PETITION,
                format!("20CR{:06}", i + 1),
                1,
            ))?;
        }
        Ok(())
    })?;
    let paginator = store.offense_record_paginator(PETITION)?;
    assert_eq!(paginator.initial_page_size(), 4);
    assert_eq!(paginator.attachment_page_size(), 3);
    let lens: Vec<usize> = paginator.attachment_offense_records()?.map(|p| p.len()).collect();
    assert_eq!(lens, vec![3, 3, 2]);
    Ok(())
}

#[test]
fn paginator_unknown_petition_is_an_error() -> Result<()> {
    let store = store_with_records(3)?;
    assert!(store.offense_record_paginator(PetitionId(99)).is_err());
    Ok(())
}
