//! Loading and saving the target text.
//!
//! Lines keep their own terminators so that joining them reproduces the
//! file byte-for-byte, apart from the intended edits.

use crate::error::PatchError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read `path` as UTF-8 and split it into lines, terminators included.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<String>, PatchError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| PatchError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| PatchError::InvalidUtf8 {
        path: path.to_path_buf(),
    })?;
    Ok(split_lines(&text))
}

/// Split text into lines, each keeping its trailing `\n` (or `\r\n`).
///
/// A final line without a terminator is kept as-is; empty input yields no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Inverse of [`split_lines`].
pub fn join_lines(lines: &[String]) -> String {
    lines.concat()
}

/// Where and how [`save`] writes the patched text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Write here instead of over the target
    pub output: Option<PathBuf>,
    /// Copy the original to `<target>.bak` before replacing it
    pub backup: bool,
}

/// Outcome of [`save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveResult {
    pub written: PathBuf,
    pub backup: Option<PathBuf>,
}

/// Write `text` for `target`, atomically.
///
/// Without an output path the target itself is replaced. The new content goes
/// to a tempfile beside the destination and is renamed over it, so a failed
/// write never leaves a truncated file behind.
pub fn save(target: &Path, text: &str, options: &SaveOptions) -> Result<SaveResult, PatchError> {
    let destination = options
        .output
        .clone()
        .unwrap_or_else(|| target.to_path_buf());

    let backup = if options.backup && destination == target {
        let backup_path = backup_path(target);
        fs::copy(target, &backup_path).map_err(|source| PatchError::Write {
            path: backup_path.clone(),
            source,
        })?;
        Some(backup_path)
    } else {
        None
    };

    atomic_write(&destination, text.as_bytes()).map_err(|source| PatchError::Write {
        path: destination.clone(),
        source,
    })?;

    // Bump mtime so file watchers (dev servers) pick up the change
    let now = filetime::FileTime::now();
    filetime::set_file_mtime(&destination, now).map_err(|source| PatchError::Write {
        path: destination.clone(),
        source,
    })?;

    Ok(SaveResult {
        written: destination,
        backup,
    })
}

/// `index.js` -> `index.js.bak`
pub fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Tempfile must live on the same filesystem as the destination
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;

    // Tempfiles are created 0600; keep the mode of the file being replaced
    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_terminators() {
        let lines = split_lines("a\r\nb\nc");
        assert_eq!(lines, vec!["a\r\n", "b\n", "c"]);
        assert_eq!(join_lines(&lines), "a\r\nb\nc");
    }

    #[test]
    fn test_split_empty_and_trailing_newline() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("x\n"), vec!["x\n"]);
        assert_eq!(split_lines("\n\n"), vec!["\n", "\n"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load("/nonexistent/index.js").unwrap_err();
        assert!(matches!(err, PatchError::FileAccess { .. }));
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.js");
        fs::write(&path, [0x61, 0xff, 0x0a]).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, PatchError::InvalidUtf8 { .. }));
    }

    #[test]
    fn test_save_in_place_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.js");
        fs::write(&path, "original\n").unwrap();

        let options = SaveOptions {
            output: None,
            backup: true,
        };
        let result = save(&path, "patched\n", &options).unwrap();

        assert_eq!(result.written, path);
        assert_eq!(result.backup.as_deref(), Some(dir.path().join("index.js.bak").as_path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "patched\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("index.js.bak")).unwrap(),
            "original\n"
        );
    }

    #[test]
    fn test_save_to_output_leaves_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.js");
        let output = dir.path().join("index.patched.js");
        fs::write(&path, "original\n").unwrap();

        let options = SaveOptions {
            output: Some(output.clone()),
            backup: true,
        };
        let result = save(&path, "patched\n", &options).unwrap();

        assert_eq!(result.written, output);
        assert!(result.backup.is_none());
        assert_eq!(fs::read_to_string(&path).unwrap(), "original\n");
        assert_eq!(fs::read_to_string(&output).unwrap(), "patched\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.js");
        fs::write(&path, "original\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        save(&path, "patched\n", &SaveOptions::default()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("index.js");
        let err = save(&path, "text", &SaveOptions::default()).unwrap_err();
        assert!(matches!(err, PatchError::Write { .. }));
    }
}
