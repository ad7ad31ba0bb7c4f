use anyhow::{Result, Context};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: Source file discovery and naming

/// Category assumed when a filename carries no `-<category>` part
pub const DEFAULT_CATEGORY: &str = "基础";

static ORDINAL_SUFFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"_\d+$").expect("valid ordinal suffix pattern")
});

/// Language and category labels encoded in a source filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLabels {
    pub language: String,
    pub category: String,
}

impl SourceLabels {
    /// Parse `<language>-<category>[_<ordinal>].json`
    ///
    /// Only the first `-` separates the two labels, so categories may
    /// themselves contain dashes. A trailing `_<digits>` ordinal marks one part
    /// of a category split across several files and is dropped.
    pub fn from_filename(filename: &str, default_category: &str) -> Self {
        let stem = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match stem.split_once('-') {
            Some((language, category)) => Self {
                language: language.to_string(),
                category: ORDINAL_SUFFIX_REGEX.replace(category, "").into_owned(),
            },
            None => Self {
                language: stem.to_string(),
                category: default_category.to_string(),
            },
        }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    /// Find files with a specific extension directly inside a directory, sorted by name
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// File name component as a string, or an empty string
    pub fn file_name<P: AsRef<Path>>(path: P) -> String {
        path.as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
