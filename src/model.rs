//! Entities kept by the store: petitions, offense records, attachments.
//!
//! Ids are plain u64 newtypes so they serialize as numbers in the snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetitionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OffenseRecordId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(pub u64);

impl fmt::Display for PetitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "petition#{}", self.0)
    }
}

impl fmt::Display for OffenseRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offense_record#{}", self.0)
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attachment#{}", self.0)
    }
}

/// Who an offense record is linked to.
/// After linking every selected record is either on the petition itself
/// or on exactly one of its attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Owner {
    #[default]
    Unlinked,
    Petition(PetitionId),
    Attachment(AttachmentId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Petition {
    pub id: PetitionId,
    /// Per-petition override of the primary page size (None = configured default).
    #[serde(default)]
    pub initial_page_size: Option<i64>,
    /// Per-petition override of the attachment page size (None = configured default).
    #[serde(default)]
    pub attachment_page_size: Option<i64>,
}

impl Petition {
    pub fn new(id: PetitionId) -> Self {
        Self {
            id,
            initial_page_size: None,
            attachment_page_size: None,
        }
    }

    pub fn with_page_sizes(mut self, initial: Option<i64>, attachment: Option<i64>) -> Self {
        self.initial_page_size = initial;
        self.attachment_page_size = attachment;
        self
    }
}

/// One charge-level entry selected for a petition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseRecord {
    pub id: OffenseRecordId,
    /// Petition this record was selected for (upstream selection).
    pub petition: PetitionId,
    /// Originating legal record (case) number; records of one case share it.
    pub record_number: String,
    /// Offense within the originating record.
    pub offense_id: u64,
    #[serde(default)]
    pub owner: Owner,
}

impl OffenseRecord {
    pub fn new<S: Into<String>>(
        id: OffenseRecordId,
        petition: PetitionId,
        record_number: S,
        offense_id: u64,
    ) -> Self {
        Self {
            id,
            petition,
            record_number: record_number.into(),
            offense_id,
            owner: Owner::Unlinked,
        }
    }
}

/// Overflow page of a petition, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub petition: PetitionId,
    pub sequence: u32,
}
