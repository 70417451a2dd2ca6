use anyhow::Result;

use petition_pager::{PageSizes, PagerConfig, Petition, PetitionId, Store, StoreBuilder};

#[test]
fn default_config_has_default_page_sizes() {
    let cfg = PagerConfig::default();
    assert_eq!(cfg.page_sizes(), PageSizes::default());
    assert_eq!(cfg.page_sizes().initial(), 10);
    assert_eq!(cfg.page_sizes().attachment(), 20);
    assert!(cfg.data_fsync);
}

#[test]
fn builder_overrides_fields() {
    let cfg = StoreBuilder::from_default()
        .initial_page_size(3)
        .attachment_page_size(7)
        .data_fsync(false)
        .build();
    assert_eq!(cfg.initial_page_size, 3);
    assert_eq!(cfg.attachment_page_size, 7);
    assert!(!cfg.data_fsync);
    assert_eq!(cfg, PagerConfig::default()
        .with_initial_page_size(3)
        .with_attachment_page_size(7)
        .with_data_fsync(false)
        .build());
}

#[test]
fn non_positive_config_sizes_are_corrected_not_rejected() {
    let cfg = PagerConfig::default()
        .with_initial_page_size(-1)
        .with_attachment_page_size(0);
    let sizes = cfg.page_sizes();
    assert_eq!(sizes.initial(), 10);
    assert_eq!(sizes.attachment(), 20);
    // Display shows both raw and effective values
    let s = cfg.to_string();
    assert!(s.contains("initial_page_size: -1 (effective 10)"), "{s}");
    assert!(s.contains("attachment_page_size: 0 (effective 20)"), "{s}");
}

#[test]
fn petition_sizes_take_precedence() {
    let cfg = PagerConfig::default().with_initial_page_size(4);
    let plain = Petition::new(PetitionId(1));
    assert_eq!(cfg.page_sizes_for(&plain), PageSizes::new(4, 20));

    let own = Petition::new(PetitionId(2)).with_page_sizes(Some(2), Some(3));
    assert_eq!(cfg.page_sizes_for(&own), PageSizes::new(2, 3));

    // a set-but-invalid petition size falls back to the default, not to the config
    let bad = Petition::new(PetitionId(3)).with_page_sizes(Some(0), None);
    assert_eq!(cfg.page_sizes_for(&bad), PageSizes::new(10, 20));
}

#[test]
fn builder_in_memory_store_carries_config() -> Result<()> {
    let store = StoreBuilder::from_default()
        .initial_page_size(2)
        .in_memory();
    assert_eq!(store.config().initial_page_size, 2);
    assert!(store.root().is_none());

    let mut store = store;
    store.transaction(|tx| tx.insert_petition(Petition::new(PetitionId(1))))?;
    let p = store.offense_record_paginator(PetitionId(1))?;
    assert_eq!(p.initial_page_size(), 2);
    assert_eq!(p.attachment_page_size(), 20);
    let _ = Store::builder();
    Ok(())
}
