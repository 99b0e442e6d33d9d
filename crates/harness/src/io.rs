//! Output file layout.
//!
//! A run writes three files into one output directory: the raw results log,
//! the per-method statistics and a markdown summary.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Results log file name.
pub const RESULTS_FILE: &str = "results.csv";

/// Statistics file name.
pub const STATISTICS_FILE: &str = "statistics.csv";

/// Summary file name.
pub const SUMMARY_FILE: &str = "summary.md";

/// Paths of every file a run produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// Output directory.
    pub dir: PathBuf,
    /// Raw results log.
    pub results: PathBuf,
    /// Per-method statistics.
    pub statistics: PathBuf,
    /// Markdown summary.
    pub summary: PathBuf,
}

impl OutputPaths {
    /// Derive output paths inside `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            dir: dir.to_path_buf(),
            results: dir.join(RESULTS_FILE),
            statistics: dir.join(STATISTICS_FILE),
            summary: dir.join(SUMMARY_FILE),
        }
    }

    /// Ensure the output directory exists.
    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }
}

/// Write the markdown summary file.
pub fn write_summary(path: impl AsRef<Path>, summary: &str) -> Result<()> {
    fs::write(path, summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_live_in_output_dir() {
        let paths = OutputPaths::new("/app/output");
        assert_eq!(paths.results, PathBuf::from("/app/output/results.csv"));
        assert_eq!(paths.statistics, PathBuf::from("/app/output/statistics.csv"));
        assert_eq!(paths.summary, PathBuf::from("/app/output/summary.md"));
    }

    #[test]
    fn test_ensure_dir_creates_nested_directories() {
        let root = tempfile::tempdir().unwrap();
        let paths = OutputPaths::new(root.path().join("runs/today"));

        paths.ensure_dir().unwrap();
        assert!(paths.dir.is_dir());

        write_summary(&paths.summary, "# Latency Summary\n").unwrap();
        assert!(paths.summary.is_file());
    }
}
