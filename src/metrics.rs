//! Lightweight global metrics for the store and the linker.
//!
//! Thread-safe atomic counters for:
//! - Linker (runs, records linked, attachments created/cleared)
//! - Transactions (commits, rollbacks)
//! - Snapshot file writes

use std::sync::atomic::{AtomicU64, Ordering};

// ----- Linker -----
static LINK_RUNS: AtomicU64 = AtomicU64::new(0);
static RECORDS_LINKED: AtomicU64 = AtomicU64::new(0);
static ATTACHMENTS_CREATED: AtomicU64 = AtomicU64::new(0);
static ATTACHMENTS_CLEARED: AtomicU64 = AtomicU64::new(0);

// ----- Transactions -----
static TX_COMMITS: AtomicU64 = AtomicU64::new(0);
static TX_ROLLBACKS: AtomicU64 = AtomicU64::new(0);

// ----- Snapshot -----
static SNAPSHOT_WRITES: AtomicU64 = AtomicU64::new(0);
static SNAPSHOT_BYTES_WRITTEN: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    // Linker
    pub link_runs: u64,
    pub records_linked: u64,
    pub attachments_created: u64,
    pub attachments_cleared: u64,

    // Transactions
    pub tx_commits: u64,
    pub tx_rollbacks: u64,

    // Snapshot
    pub snapshot_writes: u64,
    pub snapshot_bytes_written: u64,
}

impl MetricsSnapshot {
    pub fn avg_attachments_per_link(&self) -> f64 {
        if self.link_runs == 0 {
            0.0
        } else {
            self.attachments_created as f64 / self.link_runs as f64
        }
    }

    pub fn rollback_ratio(&self) -> f64 {
        let total = self.tx_commits + self.tx_rollbacks;
        if total == 0 {
            0.0
        } else {
            self.tx_rollbacks as f64 / total as f64
        }
    }
}

// ----- Recorders (Linker) -----
pub fn record_link(records: usize, attachments: usize) {
    LINK_RUNS.fetch_add(1, Ordering::Relaxed);
    RECORDS_LINKED.fetch_add(records as u64, Ordering::Relaxed);
    ATTACHMENTS_CREATED.fetch_add(attachments as u64, Ordering::Relaxed);
}

pub fn record_attachments_cleared(n: usize) {
    ATTACHMENTS_CLEARED.fetch_add(n as u64, Ordering::Relaxed);
}

// ----- Recorders (Transactions) -----
pub fn record_commit() {
    TX_COMMITS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_rollback() {
    TX_ROLLBACKS.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Snapshot) -----
pub fn record_snapshot_write(bytes: usize) {
    SNAPSHOT_WRITES.fetch_add(1, Ordering::Relaxed);
    SNAPSHOT_BYTES_WRITTEN.fetch_add(bytes as u64, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        link_runs: LINK_RUNS.load(Ordering::Relaxed),
        records_linked: RECORDS_LINKED.load(Ordering::Relaxed),
        attachments_created: ATTACHMENTS_CREATED.load(Ordering::Relaxed),
        attachments_cleared: ATTACHMENTS_CLEARED.load(Ordering::Relaxed),

        tx_commits: TX_COMMITS.load(Ordering::Relaxed),
        tx_rollbacks: TX_ROLLBACKS.load(Ordering::Relaxed),

        snapshot_writes: SNAPSHOT_WRITES.load(Ordering::Relaxed),
        snapshot_bytes_written: SNAPSHOT_BYTES_WRITTEN.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    LINK_RUNS.store(0, Ordering::Relaxed);
    RECORDS_LINKED.store(0, Ordering::Relaxed);
    ATTACHMENTS_CREATED.store(0, Ordering::Relaxed);
    ATTACHMENTS_CLEARED.store(0, Ordering::Relaxed);

    TX_COMMITS.store(0, Ordering::Relaxed);
    TX_ROLLBACKS.store(0, Ordering::Relaxed);

    SNAPSHOT_WRITES.store(0, Ordering::Relaxed);
    SNAPSHOT_BYTES_WRITTEN.store(0, Ordering::Relaxed);
}
