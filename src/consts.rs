//! Общие константы: page sizes по умолчанию и формат файла store.

// -------- Pagination --------
pub const DEFAULT_INITIAL_PAGE_SIZE: usize = 10;
pub const DEFAULT_ATTACHMENT_PAGE_SIZE: usize = 20;

// Attachments are numbered from 1 within a petition.
pub const FIRST_ATTACHMENT_SEQUENCE: u32 = 1;

// -------- Store --------
pub const STORE_FILE: &str = "petitions.db";
pub const STORE_MAGIC: &[u8; 8] = b"PPSTORE1";
pub const STORE_VERSION: u32 = 1;
pub const STORE_HDR_SIZE: usize = 24; // [magic8][ver u32][payload_len u64][crc32 u32]

// -------- Lock --------
pub const LOCK_FILE: &str = "LOCK";
