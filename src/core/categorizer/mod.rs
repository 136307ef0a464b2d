//! # Categorizer Module
//!
//! Maps a file name to a category label by its extension.
//!
//! ## Built-in Categories
//! - Pictures (.jpg, .jpeg, .png, .gif, .bmp, .svg, .webp)
//! - Documents (.pdf, .doc, .docx, .txt, .rtf, .odt, .xls, .xlsx, .ppt, .pptx)
//! - Videos (.mp4, .avi, .mkv, .mov, .wmv, .flv, .webm)
//! - Audio (.mp3, .wav, .flac, .aac, .ogg, .m4a)
//! - Archives (.zip, .rar, .tar, .gz, .7z, .bz2)
//!
//! Anything else, including names without an extension, is `Others`.
//!
//! ## Example
//! ```rust,ignore
//! let table = CategoryTable::builder()
//!     .with_defaults()
//!     .category("Code", ["py", "rs", "go"])
//!     .build()?;
//!
//! assert_eq!(table.category_for("main.RS"), "Code");
//! ```

use crate::error::CategoryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Label returned for every unmapped extension
pub const OTHERS: &str = "Others";

const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    ("Pictures", &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp"]),
    (
        "Documents",
        &["pdf", "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "ppt", "pptx"],
    ),
    ("Videos", &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"]),
    ("Audio", &["mp3", "wav", "flac", "aac", "ogg", "m4a"]),
    ("Archives", &["zip", "rar", "tar", "gz", "7z", "bz2"]),
];

/// One label and the extensions it claims
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDefinition {
    pub name: String,
    pub extensions: Vec<String>,
}

/// Immutable extension -> label lookup
#[derive(Debug, Clone)]
pub struct CategoryTable {
    by_extension: HashMap<String, String>,
}

impl CategoryTable {
    /// Start an empty builder
    pub fn builder() -> CategoryTableBuilder {
        CategoryTableBuilder::new()
    }

    /// Category label for a file name.
    ///
    /// Case-insensitive; only the text after the last `.` counts.
    pub fn category_for(&self, file_name: &str) -> &str {
        split_extension(file_name)
            .1
            .and_then(|ext| self.by_extension.get(&ext.to_lowercase()))
            .map(String::as_str)
            .unwrap_or(OTHERS)
    }

    /// Category label for a path, looking only at its final component
    pub fn category_for_path(&self, path: &Path) -> &str {
        match path.file_name() {
            Some(name) => self.category_for(&name.to_string_lossy()),
            None => OTHERS,
        }
    }

    /// Every label that can be returned, sorted, excluding `Others`
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.by_extension.values().map(String::as_str).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    /// Number of mapped extensions
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        CategoryTableBuilder::new().with_defaults().build_unchecked()
    }
}

/// Merges ordered category definitions into a [`CategoryTable`].
///
/// Later definitions win when two claim the same extension.
#[derive(Debug, Clone, Default)]
pub struct CategoryTableBuilder {
    definitions: Vec<CategoryDefinition>,
}

impl CategoryTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the built-in categories
    pub fn with_defaults(mut self) -> Self {
        for (name, extensions) in DEFAULT_CATEGORIES {
            self.definitions.push(CategoryDefinition {
                name: (*name).to_string(),
                extensions: extensions.iter().map(|e| (*e).to_string()).collect(),
            });
        }
        self
    }

    /// Add a single category
    pub fn category<I, S>(mut self, name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definitions.push(CategoryDefinition {
            name: name.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Add several categories in order
    pub fn overrides(mut self, definitions: impl IntoIterator<Item = CategoryDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    /// Add categories from a JSON file of `[{"name": .., "extensions": [..]}]`
    pub fn overrides_from_file(self, path: &Path) -> Result<Self, CategoryError> {
        let contents = fs::read_to_string(path).map_err(|source| CategoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let definitions: Vec<CategoryDefinition> =
            serde_json::from_str(&contents).map_err(|e| CategoryError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(self.overrides(definitions))
    }

    /// Build the table, rejecting empty labels
    pub fn build(self) -> Result<CategoryTable, CategoryError> {
        if self.definitions.iter().any(|d| d.name.trim().is_empty()) {
            return Err(CategoryError::EmptyLabel);
        }
        Ok(self.build_unchecked())
    }

    fn build_unchecked(self) -> CategoryTable {
        let mut by_extension = HashMap::new();
        for definition in self.definitions {
            for ext in definition.extensions {
                let ext = ext.trim().trim_start_matches('.').to_lowercase();
                if ext.is_empty() {
                    continue;
                }
                by_extension.insert(ext, definition.name.clone());
            }
        }
        CategoryTable { by_extension }
    }
}

/// Split a file name at its last dot into `(stem, extension)`.
///
/// A leading dot does not start an extension (`.bashrc` has none), and
/// neither does a trailing one (`notes.`).
fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => {
            (&file_name[..idx], Some(&file_name[idx + 1..]))
        }
        _ => (file_name, None),
    }
}
