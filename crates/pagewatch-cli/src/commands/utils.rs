//! Shared helpers for command implementations.

use std::io::Write as _;
use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{CliError, Result};

/// Writes `value` as pretty JSON, replacing `path` atomically.
///
/// Missing parent directories are created. The JSON goes to a temporary
/// file in the same directory first, so readers never see a partial file.
///
/// # Errors
///
/// Returns [`CliError::Persist`] if any step of the write fails, and
/// [`CliError::Json`] if `value` cannot be serialized.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let persist_err = |source: std::io::Error| CliError::Persist {
        path: path.to_path_buf(),
        source,
    };

    let json = serde_json::to_string_pretty(value)?;

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(persist_err)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(persist_err)?;
    tmp.write_all(json.as_bytes()).map_err(persist_err)?;
    tmp.write_all(b"\n").map_err(persist_err)?;
    tmp.as_file().sync_all().map_err(persist_err)?;
    tmp.persist(path).map_err(|e| persist_err(e.error))?;

    debug!(path = %path.display(), bytes = json.len() + 1, "wrote file");
    Ok(())
}

/// Milliseconds elapsed since `start`, saturating.
pub fn elapsed_ms(start: std::time::Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("public/nested/report.json");

        write_json_atomic(&path, &json!({"ok": true})).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"ok\": true"));
        assert!(written.ends_with('\n'));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("history.json");
        std::fs::write(&path, "stale and much longer than the replacement").unwrap();

        write_json_atomic(&path, &json!([])).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");
        let leftovers = std::fs::read_dir(temp.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_into_a_file_path_fails_as_persist() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = write_json_atomic(&blocker.join("report.json"), &json!({})).unwrap_err();
        assert!(matches!(err, CliError::Persist { .. }));
    }
}
