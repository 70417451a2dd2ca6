use anyhow::Result;

use petition_pager::{
    check_links, link_offense_records_and_attachments, partition, partition_stream,
    OffenseRecord, OffenseRecordId, PageSizes, PagerConfig, Petition, PetitionId, RecordSource,
    Store,
};

#[test]
fn random_partitions_are_gap_free_and_positional() {
    let mut rng = oorandom::Rand64::new(0x5EED_0F_9A6E);
    for _ in 0..500 {
        let n = rng.rand_range(0..200) as usize;
        let p = rng.rand_range(0..30) as i64 - 5; // includes non-positive values
        let a = rng.rand_range(0..30) as i64 - 5;
        let sizes = PageSizes::new(p, a);
        let (ep, ea) = (sizes.initial(), sizes.attachment());
        assert!(ep >= 1 && ea >= 1);
        if p <= 0 {
            assert_eq!(ep, 10);
        } else {
            assert_eq!(ep, p as usize);
        }
        if a <= 0 {
            assert_eq!(ea, 20);
        } else {
            assert_eq!(ea, a as usize);
        }

        let v: Vec<usize> = (0..n).collect();
        let part = partition(&v, sizes);
        assert_eq!(part.primary().len(), n.min(ep));

        let pages: Vec<&[usize]> = part.overflow().collect();
        let rest = n.saturating_sub(ep);
        let want_pages = if rest == 0 { 0 } else { (rest + ea - 1) / ea };
        assert_eq!(pages.len(), want_pages, "n={n} p={ep} a={ea}");
        assert_eq!(part.overflow_len(), want_pages);
        for (i, page) in pages.iter().enumerate() {
            if i + 1 < pages.len() {
                assert_eq!(page.len(), ea);
            } else {
                assert_eq!(page.len(), rest - ea * (want_pages - 1));
            }
        }

        // concatenation restores the input exactly
        let mut joined: Vec<usize> = part.primary().to_vec();
        for page in &pages {
            joined.extend_from_slice(page);
        }
        assert_eq!(joined, v);

        // the streaming form agrees
        let (sp, so) = partition_stream(v.iter().copied(), sizes);
        assert_eq!(sp.as_slice(), part.primary());
        let streamed: Vec<Vec<usize>> = so.collect();
        let sliced: Vec<Vec<usize>> = pages.iter().map(|p| p.to_vec()).collect();
        assert_eq!(streamed, sliced);
    }
}

#[test]
fn random_linking_keeps_invariant() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut rng = oorandom::Rand64::new(42);
    for round in 0..40u64 {
        let n = rng.rand_range(0..90);
        let cfg = PagerConfig::default()
            .with_initial_page_size(rng.rand_range(0..15) as i64)
            .with_attachment_page_size(rng.rand_range(0..15) as i64);
        let mut store = Store::in_memory_with_config(cfg);
        let petition = PetitionId(round + 1);
        store.transaction(|tx| {
            tx.insert_petition(Petition::new(petition))?;
            for i in 0..n {
                // few cases, several offenses each, ids not in case order
                let case = rng.rand_range(0..8);
                tx.insert_offense_record(OffenseRecord::new(
                    OffenseRecordId(10_000 - i),
                    petition,
                    format!("19CR{:06}", case),
                    i % 4,
                ))?;
            }
            Ok(())
        })?;

        let report = link_offense_records_and_attachments(&mut store, petition)?;
        assert_eq!(report.total_records(), n as usize);
        let check = check_links(&store, petition)?;
        assert!(check.is_ok(), "round {round}: {check}");
        assert!(!check.layout_mismatch, "round {round}: {check}");
        assert_eq!(check.expected_records, store.ordered_offense_records(petition)?.len());
    }
    Ok(())
}
