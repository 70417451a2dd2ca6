//! store/tx — transaction API for Store.
//!
//! What it does:
//! - Store::transaction(|tx| ...) hands the closure a Tx over a scratch copy of the tables.
//! - Closure returned Ok → snapshot of the scratch copy is written (tmp+rename), then swapped in.
//! - Closure returned Err, or the snapshot write failed → scratch copy is dropped,
//!   the store (memory and disk) stays exactly as before. Error is returned unchanged.
//!
//! Constraints enforced by Tx (storage-level, not pagination rules):
//! - ids are unique per table; offense records reference an existing petition;
//! - (petition, sequence) is unique among attachments, sequence >= 1;
//! - a record may only be owned by its own petition or by an attachment of it.

use anyhow::{anyhow, Result};
use log::{debug, warn};
use std::collections::BTreeSet;

use crate::consts::FIRST_ATTACHMENT_SEQUENCE;
use crate::metrics::{record_commit, record_rollback};
use crate::model::{
    Attachment, AttachmentId, OffenseRecord, OffenseRecordId, Owner, Petition, PetitionId,
};
use crate::source::RecordSource;

use super::file::write_snapshot;
use super::{Store, Tables};

pub struct Tx {
    tables: Tables,
}

impl Store {
    /// Run `f` as one all-or-nothing unit of work.
    pub fn transaction<F, R>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Tx) -> Result<R>,
    {
        let mut tx = Tx {
            tables: self.tables.clone(),
        };

        let out = match f(&mut tx) {
            Ok(v) => v,
            Err(e) => {
                warn!("transaction rolled back: {:#}", e);
                record_rollback();
                return Err(e);
            }
        };

        if let Some(root) = self.root.as_deref() {
            if let Err(e) = write_snapshot(root, &tx.tables, self.cfg.data_fsync) {
                warn!("transaction rolled back (snapshot write failed): {:#}", e);
                record_rollback();
                return Err(e);
            }
        }
        self.tables = tx.tables;
        record_commit();
        Ok(out)
    }
}

impl Tx {
    // -------- reads (see uncommitted changes of this Tx) --------

    pub fn petition(&self, id: PetitionId) -> Result<&Petition> {
        self.tables.petition(id)
    }

    pub fn offense_record(&self, id: OffenseRecordId) -> Result<&OffenseRecord> {
        self.tables.offense_record(id)
    }

    pub fn attachments(&self, petition: PetitionId) -> Result<Vec<&Attachment>> {
        self.tables.attachments_of(petition)
    }

    // -------- writes --------

    pub fn insert_petition(&mut self, petition: Petition) -> Result<()> {
        if self.tables.petitions.contains_key(&petition.id) {
            return Err(anyhow!("{} already exists", petition.id));
        }
        self.tables.petitions.insert(petition.id, petition);
        Ok(())
    }

    pub fn insert_offense_record(&mut self, record: OffenseRecord) -> Result<()> {
        if self.tables.offense_records.contains_key(&record.id) {
            return Err(anyhow!("{} already exists", record.id));
        }
        self.tables.petition(record.petition)?;
        self.check_owner(&record, record.owner)?;
        self.tables.offense_records.insert(record.id, record);
        Ok(())
    }

    /// Create an attachment of `petition` at position `sequence` (1-based).
    pub fn create_attachment(&mut self, petition: PetitionId, sequence: u32) -> Result<AttachmentId> {
        self.tables.petition(petition)?;
        if sequence < FIRST_ATTACHMENT_SEQUENCE {
            return Err(anyhow!(
                "attachment sequence must be >= {}, got {}",
                FIRST_ATTACHMENT_SEQUENCE,
                sequence
            ));
        }
        if self.tables.attachment_at(petition, sequence).is_some() {
            return Err(anyhow!(
                "attachment ({}, sequence {}) already exists",
                petition,
                sequence
            ));
        }

        let id = AttachmentId(self.tables.next_attachment_id);
        self.tables.next_attachment_id = self
            .tables
            .next_attachment_id
            .checked_add(1)
            .ok_or_else(|| anyhow!("attachment id space exhausted"))?;
        self.tables.attachment_slots.insert((petition, sequence), id);
        self.tables.attachments.insert(
            id,
            Attachment {
                id,
                petition,
                sequence,
            },
        );
        debug!("created {} ({}, sequence {})", id, petition, sequence);
        Ok(id)
    }

    /// Point an offense record at the petition, one of its attachments, or nothing.
    pub fn set_owner(&mut self, record: OffenseRecordId, owner: Owner) -> Result<()> {
        let rec = self.tables.offense_record(record)?;
        self.check_owner(rec, owner)?;
        if let Some(r) = self.tables.offense_records.get_mut(&record) {
            r.owner = owner;
        }
        Ok(())
    }

    /// Delete all attachments of a petition; their records become Unlinked.
    /// Returns the number of attachments removed.
    pub fn delete_attachments(&mut self, petition: PetitionId) -> Result<usize> {
        self.tables.petition(petition)?;
        let slots: Vec<(PetitionId, u32)> = self
            .tables
            .attachment_slots
            .range((petition, 0)..=(petition, u32::MAX))
            .map(|(slot, _)| *slot)
            .collect();
        let mut doomed = BTreeSet::new();
        for slot in &slots {
            if let Some(id) = self.tables.attachment_slots.remove(slot) {
                doomed.insert(id);
            }
        }
        if doomed.is_empty() {
            return Ok(0);
        }
        // only this petition's records can point at its attachments
        for r in self
            .tables
            .offense_records
            .values_mut()
            .filter(|r| r.petition == petition)
        {
            if let Owner::Attachment(a) = r.owner {
                if doomed.contains(&a) {
                    r.owner = Owner::Unlinked;
                }
            }
        }
        for id in &doomed {
            self.tables.attachments.remove(id);
        }
        Ok(doomed.len())
    }

    fn check_owner(&self, record: &OffenseRecord, owner: Owner) -> Result<()> {
        match owner {
            Owner::Unlinked => Ok(()),
            Owner::Petition(p) => {
                if p != record.petition {
                    return Err(anyhow!(
                        "{} belongs to {}, cannot link it to {}",
                        record.id,
                        record.petition,
                        p
                    ));
                }
                Ok(())
            }
            Owner::Attachment(a) => {
                let att = self.tables.attachment(a)?;
                if att.petition != record.petition {
                    return Err(anyhow!(
                        "{} belongs to {}, cannot link it to {} of {}",
                        record.id,
                        record.petition,
                        a,
                        att.petition
                    ));
                }
                Ok(())
            }
        }
    }
}

impl RecordSource for Tx {
    fn ordered_offense_records(&self, petition: PetitionId) -> Result<Vec<OffenseRecord>> {
        self.tables.ordered_offense_records(petition)
    }
}
