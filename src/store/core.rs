//! store/core — Store: open/init/in_memory, single-writer lock, read accessors.
//!
//! - On-disk store: <root>/petitions.db + <root>/LOCK. open() takes the exclusive
//!   lock for the lifetime of the Store and loads the snapshot into memory.
//! - In-memory store: same API, no file and no lock (tests, one-shot tools).
//! - All writes go through Store::transaction (see tx.rs).

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::config::{PagerConfig, StoreBuilder};
use crate::lock::{acquire_exclusive_lock, try_acquire_exclusive_lock, LockGuard};
use crate::model::{
    Attachment, AttachmentId, OffenseRecord, OffenseRecordId, Owner, Petition, PetitionId,
};
use crate::paginate::OffenseRecordPaginator;
use crate::source::RecordSource;

use super::file::{read_snapshot, snapshot_path, write_snapshot};
use super::Tables;

#[derive(Debug)]
pub struct Store {
    pub(crate) root: Option<PathBuf>,
    pub(crate) cfg: PagerConfig,
    pub(crate) tables: Tables,
    _lock: Option<LockGuard>, // держим дескриптор
}

impl Store {
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Create the root directory (if needed) and an empty snapshot.
    /// Error if a snapshot already exists.
    pub fn init(root: &Path) -> Result<()> {
        if !root.exists() {
            std::fs::create_dir_all(root)
                .with_context(|| format!("create root {}", root.display()))?;
        }
        let path = snapshot_path(root);
        if path.exists() {
            return Err(anyhow!("store already exists at {}", path.display()));
        }
        let _lock = try_acquire_exclusive_lock(root)?;
        write_snapshot(root, &Self::empty_tables(), true)?;
        info!("store initialized at {}", root.display());
        Ok(())
    }

    pub fn open(root: &Path) -> Result<Self> {
        Self::open_with_config(root, PagerConfig::from_env())
    }

    /// Open a store; fails fast if another writer holds the lock.
    pub fn open_with_config(root: &Path, cfg: PagerConfig) -> Result<Self> {
        let lock = try_acquire_exclusive_lock(root)?;
        Self::load(root, cfg, lock)
    }

    /// Open a store, waiting for the current writer (if any) to release the lock.
    pub fn open_wait_with_config(root: &Path, cfg: PagerConfig) -> Result<Self> {
        let lock = acquire_exclusive_lock(root)?;
        Self::load(root, cfg, lock)
    }

    fn load(root: &Path, cfg: PagerConfig, lock: LockGuard) -> Result<Self> {
        let tables = read_snapshot(root)?;
        debug!(
            "store opened at {} (petitions={}, offense_records={}, attachments={}, lock={})",
            root.display(),
            tables.petitions.len(),
            tables.offense_records.len(),
            tables.attachments.len(),
            lock.path().display()
        );
        Ok(Self {
            root: Some(root.to_path_buf()),
            cfg,
            tables,
            _lock: Some(lock),
        })
    }

    pub fn in_memory() -> Self {
        Self::in_memory_with_config(PagerConfig::default())
    }

    pub fn in_memory_with_config(cfg: PagerConfig) -> Self {
        Self {
            root: None,
            cfg,
            tables: Self::empty_tables(),
            _lock: None,
        }
    }

    fn empty_tables() -> Tables {
        Tables {
            next_attachment_id: 1,
            ..Default::default()
        }
    }

    #[inline]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    #[inline]
    pub fn config(&self) -> &PagerConfig {
        &self.cfg
    }

    // -------- reads --------

    pub fn petition(&self, id: PetitionId) -> Result<&Petition> {
        self.tables.petition(id)
    }

    pub fn petitions(&self) -> impl Iterator<Item = &Petition> + '_ {
        self.tables.petitions.values()
    }

    pub fn offense_record(&self, id: OffenseRecordId) -> Result<&OffenseRecord> {
        self.tables.offense_record(id)
    }

    pub fn attachment(&self, id: AttachmentId) -> Result<&Attachment> {
        self.tables.attachment(id)
    }

    /// Attachments of a petition in sequence order.
    pub fn attachments(&self, petition: PetitionId) -> Result<Vec<&Attachment>> {
        self.tables.attachments_of(petition)
    }

    /// Records linked directly to the petition (primary page), in offense record order.
    pub fn petition_offense_records(&self, petition: PetitionId) -> Result<Vec<&OffenseRecord>> {
        self.tables.petition(petition)?;
        Ok(self.tables.owned_by(Owner::Petition(petition)))
    }

    /// Records linked to an attachment, in offense record order.
    pub fn attachment_offense_records(&self, attachment: AttachmentId) -> Result<Vec<&OffenseRecord>> {
        self.tables.attachment(attachment)?;
        Ok(self.tables.owned_by(Owner::Attachment(attachment)))
    }

    /// Paginator over this store for a petition, sized by the petition's own page
    /// sizes when set, else by the store config.
    pub fn offense_record_paginator(
        &self,
        petition: PetitionId,
    ) -> Result<OffenseRecordPaginator<'_, Self>> {
        let p = self.tables.petition(petition)?;
        Ok(OffenseRecordPaginator::with_sizes(
            self,
            petition,
            self.cfg.page_sizes_for(p),
        ))
    }
}

impl RecordSource for Store {
    fn ordered_offense_records(&self, petition: PetitionId) -> Result<Vec<OffenseRecord>> {
        self.tables.ordered_offense_records(petition)
    }
}
