// src/store/file.rs — snapshot file of the store
//
// Format <root>/petitions.db (LE):
// MAGIC8 = "PPSTORE1"
// u32 version      = 1
// u64 payload_len
// u32 crc32        (crc32fast over payload)
// payload          (JSON, see store::Payload)
//
// Policy:
// - Atomic write: tmp+rename, then fsync of the parent directory (best-effort off Unix).
// - fsync of the tmp file itself is controlled by PagerConfig::data_fsync.
// - Any magic/version/length/CRC mismatch on read is an error; nothing is repaired.

use anyhow::{anyhow, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use log::debug;
use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::consts::{STORE_FILE, STORE_HDR_SIZE, STORE_MAGIC, STORE_VERSION};
use crate::metrics::record_snapshot_write;

use super::{Payload, Tables};

#[inline]
pub fn snapshot_path(root: &Path) -> PathBuf {
    root.join(STORE_FILE)
}

fn payload_crc(payload: &[u8]) -> u32 {
    let mut hasher = Crc32::new();
    hasher.update(payload);
    hasher.finalize()
}

#[cfg(unix)]
fn fsync_parent_dir(p: &Path) -> std::io::Result<()> {
    use std::fs::File;
    if let Some(parent) = p.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_parent_dir(_p: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Serialize Tables into header+payload bytes.
pub(crate) fn encode_snapshot(tables: &Tables) -> Result<Vec<u8>> {
    let payload = serde_json::to_vec(&tables.to_payload()).context("encode snapshot payload")?;
    let mut out = Vec::with_capacity(STORE_HDR_SIZE + payload.len());
    out.write_all(STORE_MAGIC)?;
    out.write_u32::<LittleEndian>(STORE_VERSION)?;
    out.write_u64::<LittleEndian>(payload.len() as u64)?;
    out.write_u32::<LittleEndian>(payload_crc(&payload))?;
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Parse and verify header+payload bytes.
pub(crate) fn decode_snapshot(bytes: &[u8], origin: &Path) -> Result<Tables> {
    if bytes.len() < STORE_HDR_SIZE {
        return Err(anyhow!(
            "snapshot {} too short ({} B < header {} B)",
            origin.display(),
            bytes.len(),
            STORE_HDR_SIZE
        ));
    }
    let mut hdr = &bytes[..STORE_HDR_SIZE];
    let mut magic = [0u8; 8];
    hdr.read_exact(&mut magic)?;
    if &magic != STORE_MAGIC {
        return Err(anyhow!("bad store magic in {}", origin.display()));
    }
    let version = hdr.read_u32::<LittleEndian>()?;
    if version != STORE_VERSION {
        return Err(anyhow!(
            "unsupported store version {} in {}",
            version,
            origin.display()
        ));
    }
    let payload_len = hdr.read_u64::<LittleEndian>()? as usize;
    let stored_crc = hdr.read_u32::<LittleEndian>()?;

    let payload = &bytes[STORE_HDR_SIZE..];
    if payload.len() != payload_len {
        return Err(anyhow!(
            "snapshot {} payload length mismatch (header={}, actual={})",
            origin.display(),
            payload_len,
            payload.len()
        ));
    }
    let calc = payload_crc(payload);
    if calc != stored_crc {
        return Err(anyhow!(
            "snapshot {} checksum mismatch (stored={}, calc={})",
            origin.display(),
            stored_crc,
            calc
        ));
    }

    let p: Payload = serde_json::from_slice(payload)
        .with_context(|| format!("decode snapshot payload {}", origin.display()))?;
    Tables::from_payload(p)
}

pub(crate) fn read_snapshot(root: &Path) -> Result<Tables> {
    let path = snapshot_path(root);
    let mut f = OpenOptions::new()
        .read(true)
        .open(&path)
        .with_context(|| format!("open snapshot {}", path.display()))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    decode_snapshot(&buf, &path)
}

/// Write the snapshot atomically (tmp+rename).
pub(crate) fn write_snapshot(root: &Path, tables: &Tables, data_fsync: bool) -> Result<()> {
    let path = snapshot_path(root);
    let tmp = root.join(format!("{}.tmp", STORE_FILE));
    let _ = fs::remove_file(&tmp); // best-effort

    let bytes = encode_snapshot(tables)?;

    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)
        .with_context(|| format!("open snapshot tmp {}", tmp.display()))?;
    f.write_all(&bytes)
        .with_context(|| format!("write snapshot tmp {}", tmp.display()))?;
    if data_fsync {
        f.sync_all()?;
    }
    drop(f);

    fs::rename(&tmp, &path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    let _ = fsync_parent_dir(&path);

    record_snapshot_write(bytes.len());
    debug!("snapshot written: {} ({} B)", path.display(), bytes.len());
    Ok(())
}
