/*!
 * Application controller.
 *
 * Owns the configuration and drives one command per process: it opens the
 * store, runs the matching pipeline against it, and releases the store on
 * every exit path. A Ctrl-C during a pipeline run ends the run cleanly
 * with the counters gathered so far.
 */

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::database::models::PendingSelector;
use crate::database::{self, VocabStore};
use crate::gloss::{
    default_segmenter, BackfillPipeline, BackfillStats, GlossSource, LocalSource, RemoteSource,
    ShortGlossExtractor,
};
use crate::import::{ImportPipeline, ImportStats};
use crate::providers::{MyMemory, Translator};

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The pipeline ran to the end
    Completed,
    /// The user interrupted the run
    Interrupted,
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(self) -> i32 {
        match self {
            RunOutcome::Completed => 0,
            RunOutcome::Interrupted => 130,
        }
    }
}

/// Options of the `extract` command
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Overrides the configured batch size
    pub batch_size: Option<usize>,
    /// Disable segmentation for this run
    pub no_segmentation: bool,
}

// @struct: Main application controller
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Create a controller from an already validated configuration
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Import word lists from `words_dir`, or the configured directory
    pub async fn run_import(&self, words_dir: Option<PathBuf>) -> Result<RunOutcome> {
        let store = database::open_store(&self.config.database).await?;
        let result = self.import_with(store.as_ref(), words_dir).await;
        close_store(store.as_ref()).await;
        result
    }

    /// Import into an already opened store
    pub async fn import_with(
        &self,
        store: &dyn VocabStore,
        words_dir: Option<PathBuf>,
    ) -> Result<RunOutcome> {
        let words_dir = words_dir.unwrap_or_else(|| self.config.import.words_dir.clone());
        info!("Starting word import from {:?}", words_dir);

        let started = Instant::now();
        let pipeline = ImportPipeline::new(store, self.config.import.default_category.clone());
        let progress_bar = file_progress_bar();
        let mut stats = ImportStats::default();

        // Ctrl-C takes effect between files so every committed file is counted
        let outcome = pipeline
            .run(
                &words_dir,
                &mut stats,
                |done, total| {
                    progress_bar.set_length(total as u64);
                    progress_bar.set_position(done as u64);
                },
                ctrl_c(),
            )
            .await;
        progress_bar.finish_and_clear();

        log_elapsed(started);
        match &outcome {
            Ok(RunOutcome::Completed) => info!("Import completed: {}", stats),
            Ok(RunOutcome::Interrupted) => warn!("Import interrupted by user: {}", stats),
            Err(e) => error!("Import failed: {:#} ({})", e, stats),
        }
        outcome
    }

    /// Fill short glosses from stored meanings
    pub async fn run_extract(&self, options: ExtractOptions) -> Result<RunOutcome> {
        let store = database::open_store(&self.config.database).await?;
        let result = self.extract_with(store.as_ref(), options).await;
        close_store(store.as_ref()).await;
        result
    }

    /// Local backfill against an already opened store
    pub async fn extract_with(
        &self,
        store: &dyn VocabStore,
        options: ExtractOptions,
    ) -> Result<RunOutcome> {
        let segmentation = self.config.extract.segmentation && !options.no_segmentation;
        let extractor = ShortGlossExtractor::new(default_segmenter(segmentation));
        info!("Starting short gloss extraction (segmenter: {})", extractor.segmenter_name());

        let source = LocalSource::new(extractor);
        let batch_size = options.batch_size.unwrap_or(self.config.extract.batch_size);

        self.backfill(store, &source, batch_size, self.config.extract.progress_interval)
            .await
    }

    /// Fill short glosses through the configured translation service
    pub async fn run_translate(&self, batch_size: Option<usize>) -> Result<RunOutcome> {
        let translator: Arc<dyn Translator> = Arc::new(MyMemory::from_config(&self.config.translation));
        let store = database::open_store(&self.config.database).await?;
        let result = self.translate_with(store.as_ref(), translator, batch_size).await;
        close_store(store.as_ref()).await;
        result
    }

    /// Remote backfill against an already opened store and translator
    pub async fn translate_with(
        &self,
        store: &dyn VocabStore,
        translator: Arc<dyn Translator>,
        batch_size: Option<usize>,
    ) -> Result<RunOutcome> {
        let settings = &self.config.translation;
        info!(
            "Starting batch translation via {} into {}",
            translator.name(),
            settings.target_language
        );

        let source = RemoteSource::new(translator, settings.target_language.clone()).with_delays(
            Duration::from_millis(settings.call_delay_ms),
            Duration::from_millis(settings.batch_delay_ms),
        );
        let batch_size = batch_size.unwrap_or(settings.batch_size);

        self.backfill(store, &source, batch_size, settings.progress_interval)
            .await
    }

    /// Print gloss coverage
    pub async fn run_stats(&self) -> Result<()> {
        let store = database::open_store(&self.config.database).await?;
        let result = print_stats(store.as_ref()).await;
        close_store(store.as_ref()).await;
        result
    }

    /// Print existing glosses next to a dry run of the extractor
    pub async fn run_check(&self, limit: usize) -> Result<()> {
        let store = database::open_store(&self.config.database).await?;
        let result = self.check_with(store.as_ref(), limit).await;
        close_store(store.as_ref()).await;
        result
    }

    /// Dry run against an already opened store; writes nothing
    pub async fn check_with(&self, store: &dyn VocabStore, limit: usize) -> Result<()> {
        let extractor = ShortGlossExtractor::new(default_segmenter(self.config.extract.segmentation));
        let samples = store.sample_glossed(limit).await?;

        if samples.is_empty() {
            println!("No words with a meaning found");
            return Ok(());
        }

        println!("=== Existing glosses ({} samples) ===", samples.len());
        for sample in &samples {
            println!("Word:       {}", sample.word);
            println!("Meaning:    {}", sample.meaning.replace('\n', " / "));
            println!("Stored:     {}", sample.meaning_short.as_deref().unwrap_or("-"));
            println!(
                "Extracted:  {}",
                extractor.extract_short(&sample.meaning).as_deref().unwrap_or("-")
            );
            println!("---");
        }
        Ok(())
    }

    async fn backfill(
        &self,
        store: &dyn VocabStore,
        source: &dyn GlossSource,
        batch_size: usize,
        progress_interval: usize,
    ) -> Result<RunOutcome> {
        let selector = source.selector();
        log_gloss_stats(store, selector).await;

        let started = Instant::now();
        let pipeline = BackfillPipeline::new(store, source, batch_size)
            .with_progress_interval(progress_interval);
        let mut stats = BackfillStats::default();

        let outcome = run_until_interrupted(pipeline.run(&mut stats), ctrl_c()).await;

        log_elapsed(started);
        match &outcome {
            Ok(RunOutcome::Completed) => info!("Backfill completed: {}", stats),
            Ok(RunOutcome::Interrupted) => warn!("Backfill interrupted by user: {}", stats),
            Err(e) => error!("Backfill failed: {:#} ({})", e, stats),
        }

        if outcome.is_ok() {
            log_gloss_stats(store, selector).await;
        }
        outcome
    }
}

/// Drive `work` until it finishes or `interrupt` resolves first
///
/// The work future is dropped on interrupt; anything it committed stays
/// committed.
pub async fn run_until_interrupted<W, I>(work: W, interrupt: I) -> Result<RunOutcome>
where
    W: Future<Output = Result<()>>,
    I: Future<Output = ()>,
{
    tokio::select! {
        result = work => result.map(|_| RunOutcome::Completed),
        _ = interrupt => Ok(RunOutcome::Interrupted),
    }
}

/// Resolves on Ctrl-C; never resolves when the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn close_store(store: &dyn VocabStore) {
    match store.close().await {
        Ok(()) => info!("Database connection closed"),
        Err(e) => warn!("Failed to close database connection: {:#}", e),
    }
}

async fn log_gloss_stats(store: &dyn VocabStore, selector: PendingSelector) {
    match store.gloss_stats().await {
        Ok(stats) => {
            info!("Statistics:");
            info!("  Total words: {}", stats.total);
            info!("  With meaning: {}", stats.with_meaning);
            info!("  With short gloss: {}", stats.with_short);
            info!("  Pending: {}", stats.pending(selector));
            if let Some(percent) = stats.completion(selector) {
                info!("  Completion: {:.2}%", percent);
            }
        }
        Err(e) => error!("Failed to read statistics: {:#}", e),
    }
}

async fn print_stats(store: &dyn VocabStore) -> Result<()> {
    let stats = store.gloss_stats().await?;

    println!("Total words:        {}", stats.total);
    println!("With meaning:       {}", stats.with_meaning);
    println!("With short gloss:   {}", stats.with_short);
    for (label, selector) in [
        ("extract:", PendingSelector::HasMeaning),
        ("translate:", PendingSelector::AnyMissing),
    ] {
        let pending = stats.pending(selector);
        match stats.completion(selector) {
            Some(percent) => println!("Pending {:<11} {} ({:.2}% done)", label, pending, percent),
            None => println!("Pending {:<11} {}", label, pending),
        }
    }
    Ok(())
}

fn log_elapsed(started: Instant) {
    info!("Elapsed time: {:.2} s", started.elapsed().as_secs_f64());
}

fn file_progress_bar() -> ProgressBar {
    let progress_bar = ProgressBar::new(0);
    let template_result = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(template_result.progress_chars("█▓▒░"));
    progress_bar
}
