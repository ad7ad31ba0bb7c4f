/*!
 * Short gloss backfill.
 *
 * Pages through words that still lack `meaning_short`, asks a
 * `GlossSource` for a gloss and writes it back one word at a time. Two
 * sources share the loop:
 * - `LocalSource` derives the gloss from the stored meaning
 * - `RemoteSource` translates the headword through a `Translator`
 *
 * Pages are keyed on the last seen id, so a word that is skipped or fails
 * is not fetched again in the same run. It stays unglossed for the next run.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::database::models::{PendingSelector, PendingWord};
use crate::database::VocabStore;
use crate::language_utils::is_chinese_variant;
use crate::providers::Translator;

use super::extractor::ShortGlossExtractor;

/// What a source produced for one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlossOutcome {
    /// Gloss to persist
    Derived(String),
    /// Nothing usable could be derived
    Skipped,
    /// The source failed; the message says why
    Failed(String),
}

/// Produces short glosses for pending words
#[async_trait]
pub trait GlossSource: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Which words this source processes
    fn selector(&self) -> PendingSelector;

    /// Pause after each fetched batch
    fn batch_delay(&self) -> Duration {
        Duration::ZERO
    }

    /// Gloss for one word
    async fn gloss(&self, word: &PendingWord) -> GlossOutcome;
}

/// Derives glosses from stored meanings, without network calls
pub struct LocalSource {
    extractor: ShortGlossExtractor,
}

impl LocalSource {
    pub fn new(extractor: ShortGlossExtractor) -> Self {
        Self { extractor }
    }
}

#[async_trait]
impl GlossSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    fn selector(&self) -> PendingSelector {
        PendingSelector::HasMeaning
    }

    async fn gloss(&self, word: &PendingWord) -> GlossOutcome {
        match self.extractor.extract_short(&word.meaning) {
            Some(gloss) => GlossOutcome::Derived(gloss),
            None => GlossOutcome::Skipped,
        }
    }
}

/// Translates headwords through an external service
pub struct RemoteSource {
    translator: Arc<dyn Translator>,
    target_language: String,
    call_delay: Duration,
    batch_delay: Duration,
}

impl RemoteSource {
    pub fn new(translator: Arc<dyn Translator>, target_language: impl Into<String>) -> Self {
        Self {
            translator,
            target_language: target_language.into(),
            call_delay: Duration::ZERO,
            batch_delay: Duration::ZERO,
        }
    }

    /// Set the pause after each service call and after each batch
    pub fn with_delays(mut self, call_delay: Duration, batch_delay: Duration) -> Self {
        self.call_delay = call_delay;
        self.batch_delay = batch_delay;
        self
    }
}

#[async_trait]
impl GlossSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn selector(&self) -> PendingSelector {
        PendingSelector::AnyMissing
    }

    fn batch_delay(&self) -> Duration {
        self.batch_delay
    }

    async fn gloss(&self, word: &PendingWord) -> GlossOutcome {
        if is_chinese_variant(&word.language_code) {
            return GlossOutcome::Derived(word.word.clone());
        }

        let result = self
            .translator
            .translate(&word.word, &word.language_code, &self.target_language)
            .await;

        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }

        match result {
            Ok(text) if !text.trim().is_empty() => GlossOutcome::Derived(text.trim().to_string()),
            Ok(_) => GlossOutcome::Failed("empty translation".to_string()),
            Err(e) => GlossOutcome::Failed(e.to_string()),
        }
    }
}

/// Counters of one backfill run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillStats {
    pub processed: usize,
    /// Glosses written
    pub success: usize,
    /// Words with no derivable gloss, or glossed by someone else meanwhile
    pub skipped: usize,
    /// Source failures
    pub failed: usize,
    /// Writes that raised an error
    pub update_errors: usize,
}

impl fmt::Display for BackfillStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed {}, success {}, skipped {}, failed {}, update errors {}",
            self.processed, self.success, self.skipped, self.failed, self.update_errors
        )
    }
}

/// Paged backfill loop
pub struct BackfillPipeline<'a> {
    store: &'a dyn VocabStore,
    source: &'a dyn GlossSource,
    batch_size: usize,
    progress_interval: usize,
}

impl<'a> BackfillPipeline<'a> {
    pub fn new(store: &'a dyn VocabStore, source: &'a dyn GlossSource, batch_size: usize) -> Self {
        Self {
            store,
            source,
            batch_size: batch_size.max(1),
            progress_interval: 0,
        }
    }

    /// Log progress every `interval` processed words (0 disables)
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Process every pending word, accumulating into `stats`
    ///
    /// Store errors while fetching abort the run; per-word failures are
    /// counted and logged.
    pub async fn run(&self, stats: &mut BackfillStats) -> Result<()> {
        info!(
            "Starting {} backfill on {} store (batch size: {})",
            self.source.name(),
            self.store.backend_name(),
            self.batch_size
        );

        let selector = self.source.selector();
        let mut after_id = 0;

        loop {
            let batch = self
                .store
                .fetch_pending(selector, after_id, self.batch_size)
                .await?;

            if batch.is_empty() {
                info!("No more words to process");
                break;
            }

            info!("Processing {} words", batch.len());

            for word in &batch {
                after_id = after_id.max(word.id);
                stats.processed += 1;

                self.process_word(word, stats).await;

                if self.progress_interval > 0 && stats.processed % self.progress_interval == 0 {
                    info!("Progress: {}", stats);
                }
            }

            let pause = self.source.batch_delay();
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        Ok(())
    }

    async fn process_word(&self, word: &PendingWord, stats: &mut BackfillStats) {
        let gloss = match self.source.gloss(word).await {
            GlossOutcome::Derived(gloss) => gloss,
            GlossOutcome::Skipped => {
                stats.skipped += 1;
                warn!("Skipped: {} (no usable gloss)", word.word);
                return;
            }
            GlossOutcome::Failed(reason) => {
                stats.failed += 1;
                error!(
                    "Gloss failed: {} (id {}, {}) - {}",
                    word.word, word.id, word.language_code, reason
                );
                return;
            }
        };

        match self.store.update_meaning_short(word.id, &gloss).await {
            Ok(true) => {
                stats.success += 1;
                debug!("Glossed: {} ({}) -> {}", word.word, word.language_code, gloss);
            }
            Ok(false) => {
                stats.skipped += 1;
                warn!("Skipped: {} (id {} already glossed)", word.word, word.id);
            }
            Err(e) => {
                stats.update_errors += 1;
                error!("Failed to update word {} (id {}): {:#}", word.word, word.id, e);
            }
        }
    }
}
