//! Snapshot file format and persistence for a [`Catalog`].
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ HEADER (64 bytes, fixed)             │
//! │  magic: [u8; 8] = b"MAILKV\0\0"      │
//! │  version: u32                        │
//! │  flags: u32                          │
//! │  table_count: u64                    │
//! │  payload_len: u64                    │
//! │  payload_sha256: [u8; 32]            │
//! ├──────────────────────────────────────┤
//! │ PAYLOAD (variable)                   │
//! │  bincode-serialized Catalog          │
//! └──────────────────────────────────────┘
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{MailKvError, Result};
use crate::store::catalog::Catalog;

/// Magic bytes identifying a mailkv snapshot.
pub const MAGIC: &[u8; 8] = b"MAILKV\0\0";

/// Current snapshot format version.
pub const VERSION: u32 = 1;

/// Fixed header size in bytes.
pub const HEADER_SIZE: usize = 64;

/// Serializable snapshot header.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct SnapshotHeader {
    /// Magic bytes (must equal [`MAGIC`]).
    pub magic: [u8; 8],
    /// Format version (must equal [`VERSION`]).
    pub version: u32,
    /// Reserved flags (currently unused).
    pub flags: u32,
    /// Number of tables in the payload.
    pub table_count: u64,
    /// Payload length in bytes.
    pub payload_len: u64,
    /// SHA-256 of the payload.
    pub payload_sha256: [u8; 32],
}

impl SnapshotHeader {
    /// Validate that the header is well-formed and matches the current format.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.magic != *MAGIC {
            return Err("Invalid magic bytes".into());
        }
        if self.version != VERSION {
            return Err(format!(
                "Incompatible version: expected {VERSION}, found {}",
                self.version
            ));
        }
        Ok(())
    }
}

/// Write `catalog` to `path`, replacing any previous snapshot.
///
/// The data goes to a sibling temporary file first and is renamed into place.
pub fn save(catalog: &Catalog, path: &Path) -> Result<()> {
    let payload = bincode::serialize(catalog).map_err(|e| invalid(path, e))?;

    let header = SnapshotHeader {
        magic: *MAGIC,
        version: VERSION,
        flags: 0,
        table_count: catalog.len() as u64,
        payload_len: payload.len() as u64,
        payload_sha256: Sha256::digest(&payload).into(),
    };
    let header_bytes = bincode::serialize(&header).map_err(|e| invalid(path, e))?;

    let mut padded_header = vec![0u8; HEADER_SIZE];
    let copy_len = header_bytes.len().min(HEADER_SIZE);
    padded_header[..copy_len].copy_from_slice(&header_bytes[..copy_len]);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MailKvError::io(parent, e))?;
    }

    let tmp_path = path.with_extension("tmp");
    {
        let mut file = File::create(&tmp_path).map_err(|e| MailKvError::io(&tmp_path, e))?;
        file.write_all(&padded_header)
            .map_err(|e| MailKvError::io(&tmp_path, e))?;
        file.write_all(&payload)
            .map_err(|e| MailKvError::io(&tmp_path, e))?;
        file.sync_all()
            .map_err(|e| MailKvError::io(&tmp_path, e))?;
    }
    std::fs::rename(&tmp_path, path).map_err(|e| MailKvError::io(path, e))?;

    info!(
        path = %path.display(),
        tables = catalog.len(),
        bytes = HEADER_SIZE + payload.len(),
        "Snapshot written"
    );
    Ok(())
}

/// Load a snapshot. Returns `None` if the file does not exist.
pub fn load(path: &Path) -> Result<Option<Catalog>> {
    if !path.exists() {
        debug!(path = %path.display(), "No snapshot");
        return Ok(None);
    }

    let data = std::fs::read(path).map_err(|e| MailKvError::io(path, e))?;
    if data.len() < HEADER_SIZE {
        return Err(invalid(path, "file shorter than header"));
    }

    let header: SnapshotHeader = bincode::deserialize(&data[..HEADER_SIZE])
        .map_err(|e| invalid(path, format!("Header deserialization failed: {e}")))?;
    header.validate().map_err(|reason| invalid(path, reason))?;

    let payload = &data[HEADER_SIZE..];
    if payload.len() as u64 != header.payload_len {
        return Err(invalid(
            path,
            format!(
                "payload is {} bytes, header says {}",
                payload.len(),
                header.payload_len
            ),
        ));
    }

    let digest: [u8; 32] = Sha256::digest(payload).into();
    if digest != header.payload_sha256 {
        return Err(invalid(path, "payload checksum mismatch"));
    }

    let catalog: Catalog = bincode::deserialize(payload)
        .map_err(|e| invalid(path, format!("Payload deserialization failed: {e}")))?;

    if catalog.len() as u64 != header.table_count {
        return Err(invalid(path, "table count mismatch"));
    }

    debug!(path = %path.display(), tables = catalog.len(), "Loaded snapshot");
    Ok(Some(catalog))
}

fn invalid(path: &Path, reason: impl ToString) -> MailKvError {
    MailKvError::InvalidSnapshot {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
