//! Atomic whole-file replacement
//!
//! Writes go to a temporary file in the target's directory, are flushed and
//! synced, then renamed over the target. A failure at any step leaves the
//! previous file as it was.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Atomically replace `path` with `data`
///
/// The parent directory is created if missing. The temporary file lives in
/// the same directory so the final rename never crosses filesystems.
pub fn write_atomic(path: impl AsRef<Path>, data: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.flush()?;
    temp.as_file().sync_all()?;

    // The temp file is removed on drop if persist fails.
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
