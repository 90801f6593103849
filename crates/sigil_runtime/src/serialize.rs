//! Alias and grant table persistence using `MessagePack`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use sigil_foundation::{Error, ErrorKind, Result};
use sigil_storage::StoreSnapshot;

/// Serializes a snapshot to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(snapshot: &StoreSnapshot) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(snapshot)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Deserializes a snapshot from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<StoreSnapshot> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| Error::new(ErrorKind::SerializationError(e.to_string())))
}

/// Saves a snapshot to a file, replacing its previous contents.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_store<P: AsRef<Path>>(snapshot: &StoreSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let io_error = |what: &str, e: std::io::Error| {
        Error::new(ErrorKind::IoError(format!(
            "failed to {what} '{}': {e}",
            path.display()
        )))
    };

    let bytes = to_bytes(snapshot)?;
    let file = File::create(path).map_err(|e| io_error("create", e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| io_error("write", e))?;
    writer.flush().map_err(|e| io_error("flush", e))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "store saved");
    Ok(())
}

/// Loads a snapshot from a `MessagePack` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_store<P: AsRef<Path>>(path: P) -> Result<StoreSnapshot> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open '{}': {e}",
            path.display()
        )))
    })?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read '{}': {e}",
            path.display()
        )))
    })?;

    from_bytes(&bytes)
}
