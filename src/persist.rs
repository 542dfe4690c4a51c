use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{OverlayError, OverlayResult};

/// Writes `contents` to `path` atomically: a temp file in the destination
/// directory is filled, flushed and renamed over the target.
///
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> OverlayResult<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = NamedTempFile::new_in(parent)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| OverlayError::Io(e.error))?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}
