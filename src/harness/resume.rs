//! Interruption sentinel and run-mode decision.
//!
//! An external supervisor marks an interrupted run by writing a sentinel
//! file containing the literal word `interrupted`. At startup the harness
//! consumes the sentinel: if it was present with that exact content the run
//! resumes from its latest checkpoint, otherwise it starts fresh. The file
//! is removed in either case so a stale sentinel can never trigger a second
//! resume.

use std::fs;
use std::io;
use std::path::Path;

/// Sentinel content that requests a resume.
pub const INTERRUPTED_MARKER: &str = "interrupted";

/// Whether a run starts fresh or resumes from its latest checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// No valid sentinel: start from scratch.
    Fresh,
    /// Sentinel found: restore from the latest checkpoint.
    Resuming,
}

impl RunMode {
    /// Read and remove the sentinel file, returning the resulting mode.
    ///
    /// A missing file means [`RunMode::Fresh`]. A present file is removed
    /// whatever its content; only the exact marker (modulo surrounding
    /// whitespace) yields [`RunMode::Resuming`].
    pub fn consume(sentinel_path: &Path) -> io::Result<RunMode> {
        let content = match fs::read_to_string(sentinel_path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(RunMode::Fresh),
            Err(e) => return Err(e),
        };
        fs::remove_file(sentinel_path)?;

        if content.trim() == INTERRUPTED_MARKER {
            Ok(RunMode::Resuming)
        } else {
            log::warn!(
                "sentinel {} had unexpected content, starting fresh",
                sentinel_path.display()
            );
            Ok(RunMode::Fresh)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_sentinel_is_fresh() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("experiment_state");
        assert_eq!(RunMode::consume(&path).unwrap(), RunMode::Fresh);
    }

    #[test]
    fn test_marker_resumes_and_is_consumed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("experiment_state");
        fs::write(&path, "interrupted").unwrap();

        assert_eq!(RunMode::consume(&path).unwrap(), RunMode::Resuming);
        assert!(!path.exists());
        // A second startup must not resume again.
        assert_eq!(RunMode::consume(&path).unwrap(), RunMode::Fresh);
    }

    #[test]
    fn test_marker_tolerates_trailing_newline() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("experiment_state");
        fs::write(&path, "interrupted\n").unwrap();
        assert_eq!(RunMode::consume(&path).unwrap(), RunMode::Resuming);
    }

    #[test]
    fn test_unexpected_content_is_fresh_but_removed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("experiment_state");
        fs::write(&path, "finished").unwrap();

        assert_eq!(RunMode::consume(&path).unwrap(), RunMode::Fresh);
        assert!(!path.exists());
    }
}
