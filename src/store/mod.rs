//! store — embedded petition/attachment/offense-record store.
//!
//! Split by submodule:
//! - core.rs — Store: open/init/in_memory, lock handling, read accessors
//! - tx.rs   — Tx: closure-scoped transaction (scratch copy → commit or rollback)
//! - file.rs — on-disk snapshot: header + CRC32 + JSON payload, tmp+rename writes
//!
//! Tables is the whole state; a transaction clones it, mutates the clone and
//! swaps it in only after the snapshot hit disk.

pub mod core;
pub mod file;
pub mod tx;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::{
    Attachment, AttachmentId, OffenseRecord, OffenseRecordId, Owner, Petition, PetitionId,
};
use crate::ordering::offense_record_order;

pub use self::core::Store;
pub use self::tx::Tx;

/// In-memory state of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Tables {
    pub next_attachment_id: u64,
    pub petitions: BTreeMap<PetitionId, Petition>,
    pub offense_records: BTreeMap<OffenseRecordId, OffenseRecord>,
    pub attachments: BTreeMap<AttachmentId, Attachment>,
    /// (petition, sequence) → attachment; rebuilt on load, never serialized.
    pub attachment_slots: BTreeMap<(PetitionId, u32), AttachmentId>,
}

/// On-disk form of Tables (JSON payload of the snapshot file).
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct Payload {
    pub next_attachment_id: u64,
    pub petitions: Vec<Petition>,
    pub offense_records: Vec<OffenseRecord>,
    pub attachments: Vec<Attachment>,
}

impl Tables {
    pub(crate) fn to_payload(&self) -> Payload {
        Payload {
            next_attachment_id: self.next_attachment_id,
            petitions: self.petitions.values().cloned().collect(),
            offense_records: self.offense_records.values().cloned().collect(),
            attachments: self.attachments.values().cloned().collect(),
        }
    }

    pub(crate) fn from_payload(p: Payload) -> Result<Self> {
        let mut t = Tables {
            next_attachment_id: p.next_attachment_id,
            ..Default::default()
        };
        for pet in p.petitions {
            let id = pet.id;
            if t.petitions.insert(id, pet).is_some() {
                return Err(anyhow!("snapshot: duplicate {}", id));
            }
        }
        for rec in p.offense_records {
            let id = rec.id;
            if t.offense_records.insert(id, rec).is_some() {
                return Err(anyhow!("snapshot: duplicate {}", id));
            }
        }
        for att in p.attachments {
            if att.id.0 >= t.next_attachment_id {
                return Err(anyhow!(
                    "snapshot: {} not below next_attachment_id={}",
                    att.id,
                    t.next_attachment_id
                ));
            }
            let id = att.id;
            if t
                .attachment_slots
                .insert((att.petition, att.sequence), id)
                .is_some()
            {
                return Err(anyhow!(
                    "snapshot: duplicate ({}, sequence {})",
                    att.petition,
                    att.sequence
                ));
            }
            if t.attachments.insert(id, att).is_some() {
                return Err(anyhow!("snapshot: duplicate {}", id));
            }
        }
        Ok(t)
    }

    // ---------------- reads shared by Store and Tx ----------------

    pub(crate) fn petition(&self, id: PetitionId) -> Result<&Petition> {
        self.petitions
            .get(&id)
            .ok_or_else(|| anyhow!("{} not found", id))
    }

    pub(crate) fn offense_record(&self, id: OffenseRecordId) -> Result<&OffenseRecord> {
        self.offense_records
            .get(&id)
            .ok_or_else(|| anyhow!("{} not found", id))
    }

    pub(crate) fn attachment_at(&self, petition: PetitionId, sequence: u32) -> Option<AttachmentId> {
        self.attachment_slots.get(&(petition, sequence)).copied()
    }

    pub(crate) fn attachment(&self, id: AttachmentId) -> Result<&Attachment> {
        self.attachments
            .get(&id)
            .ok_or_else(|| anyhow!("{} not found", id))
    }

    /// Attachments of a petition in sequence order.
    pub(crate) fn attachments_of(&self, petition: PetitionId) -> Result<Vec<&Attachment>> {
        self.petition(petition)?;
        Ok(self
            .attachment_slots
            .range((petition, 0)..=(petition, u32::MAX))
            .filter_map(|(_, id)| self.attachments.get(id))
            .collect())
    }

    /// Records with the given owner, in offense record order.
    pub(crate) fn owned_by(&self, owner: Owner) -> Vec<&OffenseRecord> {
        let mut out: Vec<&OffenseRecord> = self
            .offense_records
            .values()
            .filter(|r| r.owner == owner)
            .collect();
        out.sort_by(|a, b| offense_record_order(a, b));
        out
    }

    /// All records selected for a petition, in offense record order.
    pub(crate) fn ordered_offense_records(&self, petition: PetitionId) -> Result<Vec<OffenseRecord>> {
        self.petition(petition)?;
        let mut out: Vec<OffenseRecord> = self
            .offense_records
            .values()
            .filter(|r| r.petition == petition)
            .cloned()
            .collect();
        out.sort_by(offense_record_order);
        Ok(out)
    }
}
