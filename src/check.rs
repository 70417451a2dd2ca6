//! check — read-only verification of a linked petition, with a text or JSON report.
//!
//! Rebuilds the sequence
//!   petition records ++ attachment #1 records ++ attachment #2 records ++ ...
//! from stored ownership and compares it with the ordered record set of the petition:
//! - unlinked        : selected records owned by nothing;
//! - out_of_order    : rebuilt id sequence differs from the ordered one
//!                     (missing, duplicated or moved across a page boundary);
//! - layout_mismatch : page lengths differ from what pagination gives for the
//!                     current record count and page sizes;
//! - sequence_gap    : attachment sequences are not exactly 1..=n;
//! - empty           : attachments that own no record.
//!
//! Strict mode (ENV PP_CHECK_STRICT=1|true|yes|on): layout_mismatch also fails the check.
//! Off by default, since page sizes may have changed since the last link.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

use crate::consts::FIRST_ATTACHMENT_SEQUENCE;
use crate::model::{AttachmentId, OffenseRecordId, Owner, PetitionId};
use crate::paginate::partition;
use crate::source::RecordSource;
use crate::store::Store;

#[inline]
fn check_strict_env() -> bool {
    std::env::var("PP_CHECK_STRICT")
        .ok()
        .map(|s| s.to_ascii_lowercase())
        .map(|s| s == "1" || s == "true" || s == "yes" || s == "on")
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkCheck {
    pub petition: PetitionId,
    pub strict: bool,
    pub expected_records: usize,
    pub petition_records: usize,
    /// Record count per attachment, in sequence order.
    pub attachment_records: Vec<usize>,
    pub unlinked: Vec<OffenseRecordId>,
    pub out_of_order: bool,
    pub layout_mismatch: bool,
    pub sequence_gap: bool,
    pub empty_attachments: Vec<AttachmentId>,
}

impl LinkCheck {
    pub fn is_ok(&self) -> bool {
        self.unlinked.is_empty()
            && !self.out_of_order
            && !self.sequence_gap
            && self.empty_attachments.is_empty()
            && !(self.strict && self.layout_mismatch)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("encode link check")
    }
}

impl fmt::Display for LinkCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "check {}:", self.petition)?;
        writeln!(f, "  status            = {}", if self.is_ok() { "ok" } else { "FAIL" })?;
        writeln!(f, "  strict            = {}", self.strict)?;
        writeln!(f, "  expected_records  = {}", self.expected_records)?;
        writeln!(f, "  petition_records  = {}", self.petition_records)?;
        writeln!(f, "  attachments       = {:?}", self.attachment_records)?;
        writeln!(f, "  unlinked          = {}", self.unlinked.len())?;
        writeln!(f, "  out_of_order      = {}", self.out_of_order)?;
        writeln!(f, "  layout_mismatch   = {}", self.layout_mismatch)?;
        writeln!(f, "  sequence_gap      = {}", self.sequence_gap)?;
        write!(f, "  empty_attachments = {}", self.empty_attachments.len())
    }
}

pub fn check_links(store: &Store, petition: PetitionId) -> Result<LinkCheck> {
    check_links_with(store, petition, check_strict_env())
}

pub fn check_links_with(store: &Store, petition: PetitionId, strict: bool) -> Result<LinkCheck> {
    let expected = store.ordered_offense_records(petition)?;
    let sizes = store.config().page_sizes_for(store.petition(petition)?);

    let unlinked: Vec<OffenseRecordId> = expected
        .iter()
        .filter(|r| r.owner == Owner::Unlinked)
        .map(|r| r.id)
        .collect();

    let mut rebuilt: Vec<OffenseRecordId> = store
        .petition_offense_records(petition)?
        .iter()
        .map(|r| r.id)
        .collect();
    let petition_records = rebuilt.len();

    let attachments = store.attachments(petition)?;
    let mut attachment_records = Vec::with_capacity(attachments.len());
    let mut empty_attachments = Vec::new();
    let mut sequence_gap = false;
    for (want_seq, att) in (FIRST_ATTACHMENT_SEQUENCE..).zip(attachments.iter()) {
        if att.sequence != want_seq {
            sequence_gap = true;
        }
        let recs = store.attachment_offense_records(att.id)?;
        if recs.is_empty() {
            empty_attachments.push(att.id);
        }
        attachment_records.push(recs.len());
        rebuilt.extend(recs.iter().map(|r| r.id));
    }

    let expected_ids: Vec<OffenseRecordId> = expected.iter().map(|r| r.id).collect();
    let out_of_order = rebuilt != expected_ids;

    let layout = partition(&expected, sizes);
    let want_pages: Vec<usize> = layout.overflow().map(|p| p.len()).collect();
    let layout_mismatch =
        petition_records != layout.primary().len() || attachment_records != want_pages;

    Ok(LinkCheck {
        petition,
        strict,
        expected_records: expected.len(),
        petition_records,
        attachment_records,
        unlinked,
        out_of_order,
        layout_mismatch,
        sequence_gap,
        empty_attachments,
    })
}
