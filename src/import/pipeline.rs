/*!
 * Word list import.
 *
 * Walks a directory of `<language>-<category>[_<n>].json` files and stores
 * every new word. Each file is isolated: its words are written in one
 * transaction, and a failure rolls back that file only.
 */

use anyhow::Result;
use log::{debug, error, info, warn};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use crate::app_controller::RunOutcome;
use crate::catalog::CatalogResolver;
use crate::database::models::{InsertOutcome, NewWord};
use crate::database::VocabStore;
use crate::errors::ImportError;
use crate::file_utils::{FileManager, SourceLabels};

use super::normalizer::normalize_entry;

/// Running totals of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Files found in the source directory
    pub files_total: usize,
    /// Files committed
    pub files_imported: usize,
    /// Files skipped or rolled back
    pub files_failed: usize,
    /// Entries read from committed files
    pub words_seen: usize,
    pub words_inserted: usize,
    pub duplicates: usize,
    /// Entries the normalizer rejected
    pub rejected: usize,
    /// Inserts that failed
    pub insert_errors: usize,
}

impl ImportStats {
    fn absorb(&mut self, report: &FileReport) {
        self.files_imported += 1;
        self.words_seen += report.seen;
        self.words_inserted += report.inserted;
        self.duplicates += report.duplicates;
        self.rejected += report.rejected;
        self.insert_errors += report.failed;
    }
}

impl fmt::Display for ImportStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "files {}/{} imported ({} failed), words seen {}, inserted {}, duplicates {}, rejected {}, insert errors {}",
            self.files_imported,
            self.files_total,
            self.files_failed,
            self.words_seen,
            self.words_inserted,
            self.duplicates,
            self.rejected,
            self.insert_errors
        )
    }
}

/// Outcome of one committed file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReport {
    pub language: String,
    pub category: String,
    pub seen: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Imports word list files into the store
pub struct ImportPipeline<'a> {
    store: &'a dyn VocabStore,
    default_category: String,
}

impl<'a> ImportPipeline<'a> {
    pub fn new(store: &'a dyn VocabStore, default_category: impl Into<String>) -> Self {
        Self {
            store,
            default_category: default_category.into(),
        }
    }

    /// Import every JSON file in `words_dir`, accumulating into `stats`
    ///
    /// `progress` is called with `(files_done, files_total)` after each file.
    /// `interrupt` is checked between files: the file in progress always
    /// finishes, so `stats` covers everything committed.
    pub async fn run<I>(
        &self,
        words_dir: &Path,
        stats: &mut ImportStats,
        progress: impl Fn(usize, usize),
        interrupt: I,
    ) -> Result<RunOutcome>
    where
        I: Future<Output = ()>,
    {
        if !FileManager::dir_exists(words_dir) {
            return Err(anyhow::anyhow!("Source directory does not exist: {:?}", words_dir));
        }

        let files = FileManager::find_files(words_dir, "json")?;
        if files.is_empty() {
            warn!("No JSON files found in {:?}", words_dir);
            return Ok(RunOutcome::Completed);
        }

        // First poll registers the listener before any file is touched
        tokio::pin!(interrupt);
        if has_fired(interrupt.as_mut()).await {
            return Ok(RunOutcome::Interrupted);
        }

        stats.files_total = files.len();
        info!("Found {} JSON files in {:?}", files.len(), words_dir);

        for (index, path) in files.iter().enumerate() {
            let name = FileManager::file_name(path);
            debug!("Progress: {}/{} - {}", index + 1, files.len(), name);

            match self.import_file(path).await {
                Ok(report) => stats.absorb(&report),
                Err(e) => {
                    stats.files_failed += 1;
                    if let Some(structural) = e.downcast_ref::<ImportError>() {
                        warn!("Skipping file {}: {}", name, structural);
                    } else {
                        error!("Failed to process file {}, changes rolled back: {:#}", name, e);
                    }
                }
            }

            progress(index + 1, files.len());

            if index + 1 < files.len() && has_fired(interrupt.as_mut()).await {
                warn!("Stopping after {} ({}/{} files)", name, index + 1, files.len());
                return Ok(RunOutcome::Interrupted);
            }
        }

        info!("Import finished: {}", stats);
        Ok(RunOutcome::Completed)
    }

    /// Import a single file inside its own transaction
    pub async fn import_file(&self, path: &Path) -> Result<FileReport> {
        let name = FileManager::file_name(path);
        let labels = SourceLabels::from_filename(&name, &self.default_category);
        info!(
            "Processing file: {} (language: {}, category: {})",
            name, labels.language, labels.category
        );

        let entries = read_entries(path, &name)?;

        let resolver = CatalogResolver::new(self.store);
        let language_id = resolver.resolve_language(&labels.language).await?;
        let category_id = resolver.resolve_category(language_id, &labels.category).await?;

        let mut report = FileReport {
            language: labels.language,
            category: labels.category,
            seen: entries.len(),
            ..Default::default()
        };

        let mut words: Vec<NewWord> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            match normalize_entry(entry) {
                Ok(word) => words.push(word),
                Err(reason) => {
                    report.rejected += 1;
                    warn!("Skipping entry #{} in {}: {}", index, name, reason);
                }
            }
        }

        let outcomes = self
            .store
            .insert_words_if_absent(language_id, category_id, &words)
            .await?;

        for (word, outcome) in words.iter().zip(outcomes) {
            match outcome {
                InsertOutcome::Inserted => report.inserted += 1,
                InsertOutcome::Duplicate => {
                    report.duplicates += 1;
                    debug!("Duplicate word skipped: {} ({})", word.word, report.language);
                }
                InsertOutcome::Failed(message) => {
                    report.failed += 1;
                    error!(
                        "Failed to insert word: {} ({}/{}) - {}",
                        word.word, report.language, report.category, message
                    );
                }
            }
        }

        info!(
            "File {} processed: {}/{} words inserted ({} duplicates, {} rejected)",
            name, report.inserted, report.seen, report.duplicates, report.rejected
        );
        Ok(report)
    }
}

/// Poll `signal` once without waiting
async fn has_fired<F: Future<Output = ()>>(signal: Pin<&mut F>) -> bool {
    tokio::select! {
        biased;
        _ = signal => true,
        _ = std::future::ready(()) => false,
    }
}

/// Read and parse a source file into its list of raw entries
fn read_entries(path: &Path, name: &str) -> Result<Vec<Value>, ImportError> {
    let content = FileManager::read_to_string(path).map_err(|e| ImportError::UnreadableFile {
        file: name.to_string(),
        message: format!("{:#}", e),
    })?;

    let payload: Value = serde_json::from_str(&content).map_err(|e| ImportError::InvalidJson {
        file: name.to_string(),
        message: e.to_string(),
    })?;

    match payload {
        Value::Array(entries) => Ok(entries),
        _ => Err(ImportError::NotAList {
            file: name.to_string(),
        }),
    }
}
