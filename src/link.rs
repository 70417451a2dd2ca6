//! link — persist a petition's pagination as petition/attachment ownership.
//!
//! link_offense_records_and_attachments(store, petition), one transaction:
//! 1. Page sizes: petition's own if set, else the store config (<= 0 ⇒ 10 / 20).
//! 2. Delete the petition's previous attachments (clear-then-relink); their
//!    records become Unlinked for the rest of the transaction.
//! 3. Primary page → Owner::Petition.
//! 4. Overflow page k (k = 1, 2, ...) → new attachment with sequence k, its records
//!    → Owner::Attachment.
//!
//! Re-linking an unchanged petition yields the same page membership with fresh
//! attachment ids. Any storage error aborts the transaction: nothing is half-linked.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::fmt;

use crate::config::PagerConfig;
use crate::consts::FIRST_ATTACHMENT_SEQUENCE;
use crate::metrics::{record_attachments_cleared, record_link};
use crate::model::{AttachmentId, Owner, PetitionId};
use crate::paginate::partition_stream;
use crate::source::RecordSource;
use crate::store::{Store, Tx};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkedAttachment {
    pub id: AttachmentId,
    pub sequence: u32,
    pub records: usize,
}

/// What a link run wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub petition: PetitionId,
    pub initial_page_size: usize,
    pub attachment_page_size: usize,
    pub petition_records: usize,
    pub attachments: Vec<LinkedAttachment>,
    /// Attachments removed before relinking.
    pub cleared_attachments: usize,
}

impl LinkReport {
    pub fn total_records(&self) -> usize {
        self.petition_records + self.attachments.iter().map(|a| a.records).sum::<usize>()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("encode link report")
    }
}

impl fmt::Display for LinkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} record(s) on petition, {} attachment(s) [",
            self.petition,
            self.petition_records,
            self.attachments.len()
        )?;
        for (i, a) in self.attachments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "#{}={}", a.sequence, a.records)?;
        }
        write!(f, "], sizes {}/{}", self.initial_page_size, self.attachment_page_size)
    }
}

/// Link a petition's offense records to the petition and fresh attachments.
pub fn link_offense_records_and_attachments(
    store: &mut Store,
    petition: PetitionId,
) -> Result<LinkReport> {
    let cfg = store.config().clone();
    let report = store
        .transaction(|tx| link_in_tx(tx, &cfg, petition))
        .with_context(|| format!("link {}", petition))?;

    record_link(report.total_records(), report.attachments.len());
    record_attachments_cleared(report.cleared_attachments);
    info!("linked {}", report);
    Ok(report)
}

/// Linking steps inside a caller-owned transaction.
pub fn link_in_tx(tx: &mut Tx, cfg: &PagerConfig, petition: PetitionId) -> Result<LinkReport> {
    let sizes = cfg.page_sizes_for(tx.petition(petition)?);

    let cleared_attachments = tx.delete_attachments(petition)?;
    if cleared_attachments > 0 {
        debug!("{}: cleared {} previous attachment(s)", petition, cleared_attachments);
    }

    let records = tx.ordered_offense_records(petition)?;
    let (primary, overflow) = partition_stream(records, sizes);

    for rec in &primary {
        tx.set_owner(rec.id, Owner::Petition(petition))?;
    }

    let mut attachments = Vec::new();
    for (sequence, page) in (FIRST_ATTACHMENT_SEQUENCE..).zip(overflow) {
        let id = tx.create_attachment(petition, sequence)?;
        for rec in &page {
            tx.set_owner(rec.id, Owner::Attachment(id))?;
        }
        debug!("{}: {} (sequence {}) <- {} record(s)", petition, id, sequence, page.len());
        attachments.push(LinkedAttachment {
            id,
            sequence,
            records: page.len(),
        });
    }

    Ok(LinkReport {
        petition,
        initial_page_size: sizes.initial(),
        attachment_page_size: sizes.attachment(),
        petition_records: primary.len(),
        attachments,
        cleared_attachments,
    })
}

/// Remove all attachments of a petition and unlink every one of its records.
/// Returns the number of attachments removed.
pub fn unlink_offense_records(store: &mut Store, petition: PetitionId) -> Result<usize> {
    let removed = store.transaction(|tx| {
        let removed = tx.delete_attachments(petition)?;
        for rec in tx.ordered_offense_records(petition)? {
            tx.set_owner(rec.id, Owner::Unlinked)?;
        }
        Ok(removed)
    })?;
    record_attachments_cleared(removed);
    info!("unlinked {} ({} attachment(s) removed)", petition, removed);
    Ok(removed)
}
