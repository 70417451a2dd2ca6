//! Centralized configuration and builder for the petition store.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - PagerConfig::from_env() reads PP_* variables; PagerConfig::default() ignores env.
//! - StoreBuilder produces a PagerConfig and can open a Store with it.
//!
//! Page sizes are kept signed on purpose: non-positive values are accepted and
//! fall back to the defaults (10 / 20) when turned into PageSizes.
//! A petition's own page sizes, when set, win over the configured ones.

use anyhow::Result;
use std::fmt;
use std::path::Path;

use crate::consts::{DEFAULT_ATTACHMENT_PAGE_SIZE, DEFAULT_INITIAL_PAGE_SIZE};
use crate::model::Petition;
use crate::paginate::PageSizes;
use crate::store::Store;

#[inline]
fn env_flag(s: &str) -> bool {
    let s = s.trim().to_ascii_lowercase();
    s == "1" || s == "true" || s == "on" || s == "yes"
}

/// Top-level configuration for the store and the linker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerConfig {
    /// Size of the primary page kept directly on the petition.
    /// Env: PP_INITIAL_PAGE_SIZE (default 10; <= 0 means default)
    pub initial_page_size: i64,

    /// Size of each overflow page (attachment).
    /// Env: PP_ATTACHMENT_PAGE_SIZE (default 20; <= 0 means default)
    pub attachment_page_size: i64,

    /// Whether to fsync the snapshot file on every commit.
    /// Env: PP_DATA_FSYNC (default true; "1|true|on|yes" => true)
    pub data_fsync: bool,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            initial_page_size: DEFAULT_INITIAL_PAGE_SIZE as i64,
            attachment_page_size: DEFAULT_ATTACHMENT_PAGE_SIZE as i64,
            data_fsync: true,
        }
    }
}

impl PagerConfig {
    /// Load configuration from environment variables on top of the defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("PP_INITIAL_PAGE_SIZE") {
            if let Ok(n) = v.trim().parse::<i64>() {
                cfg.initial_page_size = n;
            }
        }

        if let Ok(v) = std::env::var("PP_ATTACHMENT_PAGE_SIZE") {
            if let Ok(n) = v.trim().parse::<i64>() {
                cfg.attachment_page_size = n;
            }
        }

        if let Ok(v) = std::env::var("PP_DATA_FSYNC") {
            cfg.data_fsync = env_flag(&v);
        }

        cfg
    }

    /// Fluent setters (builder-style) to override specific fields.

    pub fn with_initial_page_size(mut self, size: i64) -> Self {
        self.initial_page_size = size;
        self
    }

    pub fn with_attachment_page_size(mut self, size: i64) -> Self {
        self.attachment_page_size = size;
        self
    }

    pub fn with_data_fsync(mut self, on: bool) -> Self {
        self.data_fsync = on;
        self
    }

    /// Effective page sizes from this config alone (defaulting rule applied).
    pub fn page_sizes(&self) -> PageSizes {
        PageSizes::new(self.initial_page_size, self.attachment_page_size)
    }

    /// Effective page sizes for a petition: its own sizes take precedence,
    /// unset ones come from this config.
    pub fn page_sizes_for(&self, petition: &Petition) -> PageSizes {
        PageSizes::new(
            petition.initial_page_size.unwrap_or(self.initial_page_size),
            petition
                .attachment_page_size
                .unwrap_or(self.attachment_page_size),
        )
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> Self {
        self
    }
}

impl fmt::Display for PagerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes = self.page_sizes();
        write!(
            f,
            "PagerConfig {{ \
             initial_page_size: {} (effective {}), \
             attachment_page_size: {} (effective {}), \
             data_fsync: {} \
             }}",
            self.initial_page_size,
            sizes.initial(),
            self.attachment_page_size,
            sizes.attachment(),
            self.data_fsync,
        )
    }
}

/// Lightweight builder that produces a PagerConfig.
/// Store exposes `Store::builder()` returning this builder.
#[derive(Clone, Debug)]
pub struct StoreBuilder {
    cfg: PagerConfig,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: PagerConfig::from_env(),
        }
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: PagerConfig::default(),
        }
    }

    pub fn initial_page_size(mut self, size: i64) -> Self {
        self.cfg.initial_page_size = size;
        self
    }

    pub fn attachment_page_size(mut self, size: i64) -> Self {
        self.cfg.attachment_page_size = size;
        self
    }

    pub fn data_fsync(mut self, on: bool) -> Self {
        self.cfg.data_fsync = on;
        self
    }

    /// Finish the builder and obtain the configuration.
    pub fn build(self) -> PagerConfig {
        self.cfg
    }

    /// Open an initialized on-disk store with the built configuration.
    pub fn open(self, root: &Path) -> Result<Store> {
        Store::open_with_config(root, self.cfg)
    }

    /// Create an in-memory store (no file, no lock) with the built configuration.
    pub fn in_memory(self) -> Store {
        Store::in_memory_with_config(self.cfg)
    }
}
