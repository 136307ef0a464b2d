//! Admission rules for discovered entries.

use std::fs;
use std::path::Path;
use tracing::debug;

/// Decides whether a filesystem entry enters the organize pipeline
#[derive(Debug, Clone)]
pub struct AdmissionFilter {
    /// Name suffixes of in-progress downloads and scratch files
    temp_suffixes: Vec<String>,
    /// Whether to admit names starting with `.`
    include_hidden: bool,
}

impl AdmissionFilter {
    /// Create a filter rejecting hidden, `.tmp` and `.temp` files
    pub fn new() -> Self {
        Self {
            temp_suffixes: vec![".tmp".to_string(), ".temp".to_string()],
            include_hidden: false,
        }
    }

    /// Admit hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of temporary-file suffixes
    pub fn with_temp_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.temp_suffixes = suffixes;
        self
    }

    /// Check if an entry should be organized.
    ///
    /// Rejects symlinks, anything that is not a regular file (including
    /// entries that no longer exist), hidden names and temporary files.
    /// Only symlink rejections are logged.
    pub fn is_eligible(&self, path: &Path) -> bool {
        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(_) => return false,
        };

        if metadata.file_type().is_symlink() {
            debug!(path = %path.display(), "Skipping symlink");
            return false;
        }

        if !metadata.is_file() {
            return false;
        }

        let name = match path.file_name() {
            Some(n) => n.to_string_lossy(),
            None => return false,
        };

        if !self.include_hidden && name.starts_with('.') {
            return false;
        }

        !self
            .temp_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }
}

impl Default for AdmissionFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn admits_regular_file() {
        let dir = TempDir::new().unwrap();
        let filter = AdmissionFilter::new();
        assert!(filter.is_eligible(&touch(&dir, "report.pdf")));
    }

    #[test]
    fn rejects_directory() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("folder");
        fs::create_dir(&sub).unwrap();
        assert!(!AdmissionFilter::new().is_eligible(&sub));
    }

    #[test]
    fn rejects_hidden_by_default() {
        let dir = TempDir::new().unwrap();
        let hidden = touch(&dir, ".hidden");
        assert!(!AdmissionFilter::new().is_eligible(&hidden));
        assert!(AdmissionFilter::new().with_hidden(true).is_eligible(&hidden));
    }

    #[test]
    fn rejects_temp_files() {
        let dir = TempDir::new().unwrap();
        let filter = AdmissionFilter::new();
        assert!(!filter.is_eligible(&touch(&dir, "report.tmp")));
        assert!(!filter.is_eligible(&touch(&dir, "download.temp")));
        assert!(filter.is_eligible(&touch(&dir, "template.txt")));
    }

    #[test]
    fn custom_temp_suffixes() {
        let dir = TempDir::new().unwrap();
        let filter = AdmissionFilter::new().with_temp_suffixes(vec![".crdownload".to_string()]);
        assert!(!filter.is_eligible(&touch(&dir, "movie.mp4.crdownload")));
        assert!(filter.is_eligible(&touch(&dir, "report.tmp")));
    }

    #[test]
    fn rejects_vanished_file() {
        let dir = TempDir::new().unwrap();
        assert!(!AdmissionFilter::new().is_eligible(&dir.path().join("gone.pdf")));
    }

    #[cfg(unix)]
    #[test]
    fn rejects_symlink_even_to_regular_file() {
        let dir = TempDir::new().unwrap();
        let target = touch(&dir, "target.pdf");
        let link = dir.path().join("link.pdf");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(!AdmissionFilter::new().is_eligible(&link));
    }
}
