//! Append-only results file of per-seed outcomes.
//!
//! Each completed seed appends a one-element JSON array fragment, so the
//! file accumulates `[{...}]\n[{...}]\n...` across seeds and across
//! interrupted-and-resumed processes without ever rewriting earlier
//! entries. [`ResultsFile::load`] reads the fragments back into a flat
//! list.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One seed's recorded outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedResult {
    /// The seed the run used.
    pub seed: u64,
    /// Checkpoint with the best mean episode reward, if any was saved.
    pub best_checkpoint: Option<PathBuf>,
}

/// Handle to the experiment's results file.
#[derive(Debug, Clone)]
pub struct ResultsFile {
    path: PathBuf,
}

impl ResultsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one seed's result as a JSON array fragment.
    pub fn append(&self, result: &SeedResult) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let fragment = serde_json::to_string(&[result])?;
        writeln!(file, "{}", fragment)
    }

    /// Read every recorded result, oldest first.
    ///
    /// A missing file is an empty result set.
    pub fn load(&self) -> io::Result<Vec<SeedResult>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let reader = BufReader::new(file);
        let mut results = Vec::new();
        for fragment in
            serde_json::Deserializer::from_reader(reader).into_iter::<Vec<SeedResult>>()
        {
            results.extend(fragment?);
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_load() {
        let tmp = TempDir::new().unwrap();
        let file = ResultsFile::new(tmp.path().join("results.json"));

        file.append(&SeedResult {
            seed: 1,
            best_checkpoint: Some(PathBuf::from("/runs/a/checkpoint_000050")),
        })
        .unwrap();
        file.append(&SeedResult {
            seed: 2,
            best_checkpoint: None,
        })
        .unwrap();

        let results = file.load().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].seed, 1);
        assert!(results[1].best_checkpoint.is_none());
    }

    #[test]
    fn test_file_is_array_fragments() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.json");
        let file = ResultsFile::new(&path);

        file.append(&SeedResult {
            seed: 9,
            best_checkpoint: None,
        })
        .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.trim().starts_with('['));
        assert!(raw.trim().ends_with(']'));
        assert!(raw.contains("\"seed\":9"));
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let file = ResultsFile::new(tmp.path().join("absent.json"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_survives_across_handles() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("results.json");

        ResultsFile::new(&path)
            .append(&SeedResult {
                seed: 1,
                best_checkpoint: None,
            })
            .unwrap();
        // A later process opens the same file and appends.
        ResultsFile::new(&path)
            .append(&SeedResult {
                seed: 2,
                best_checkpoint: None,
            })
            .unwrap();

        let results = ResultsFile::new(&path).load().unwrap();
        let seeds: Vec<u64> = results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![1, 2]);
    }
}
