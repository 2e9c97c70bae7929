//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use fs2::FileExt;
use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    write_atomic_with_mode(path, content, None)
}

/// Write content atomically, creating the file with `mode` on unix.
///
/// The temp file carries the mode from creation, so the content is never
/// visible with wider permissions. `mode` is ignored on other platforms.
/// On failure the temp file is removed.
pub fn write_atomic_with_mode(path: &NormalizedPath, content: &[u8], mode: Option<u32>) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    // A stale temp file from a crashed run would keep its old mode
    let _ = fs::remove_file(&temp_path);

    let result = write_temp(&temp_path, &native_path, content, mode).and_then(|()| {
        fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_temp(temp_path: &Path, target: &Path, content: &[u8], mode: Option<u32>) -> Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        if let Some(mode) = mode {
            options.mode(mode);
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut temp_file = options
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.lock_exclusive()
        .map_err(|_| Error::LockFailed { path: target.to_path_buf() })?;

    temp_file.write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.sync_all()
        .map_err(|e| Error::io(temp_path, e))?;

    temp_file.unlock()
        .map_err(|_| Error::LockFailed { path: target.to_path_buf() })?;

    Ok(())
}

/// Read raw bytes from a file.
pub fn read_bytes(path: &NormalizedPath) -> Result<Vec<u8>> {
    let native_path = path.to_native();
    fs::read(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path)
        .map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Move a file to a new location, creating the destination's parent
/// directories.
///
/// Tries a rename first. When the rename fails because source and destination
/// live on different filesystems, falls back to copy followed by removal of
/// the source, so the source never survives a successful call.
pub fn move_file(from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
    let source = from.to_native();
    let dest = to.to_native();

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    match fs::rename(&source, &dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::io(&source, e)),
        Err(e) => {
            tracing::debug!(?source, ?dest, error = %e, "rename failed, falling back to copy");
            fs::copy(&source, &dest).map_err(|e| Error::io(&dest, e))?;
            fs::remove_file(&source).map_err(|e| Error::io(&source, e))
        }
    }
}
