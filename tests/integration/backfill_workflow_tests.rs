/*!
 * Integration tests for the short gloss backfill workflow
 */

use anyhow::Result;
use std::sync::Arc;

use glossfill::database::models::PendingSelector;
use glossfill::gloss::{BackfillPipeline, BackfillStats, LocalSource, RemoteSource, ShortGlossExtractor};
use glossfill::providers::mock::MockTranslator;
use glossfill::VocabStore;

use crate::common;

#[tokio::test]
async fn test_localBackfill_thenRerun_shouldOnlyRevisitSkippedWords() -> Result<()> {
    common::init_test_logging();
    let store = common::seeded_store(
        "en",
        &[
            ("apple", "n. 苹果；苹果树"),
            ("matter", "n. 重要，要紧，有关系；物质，物体"),
            ("dot", "n. ."),
            ("blank", ""),
        ],
    )
    .await?;
    let source = LocalSource::new(ShortGlossExtractor::basic());
    let pipeline = BackfillPipeline::new(&store, &source, 2);

    let mut first = BackfillStats::default();
    pipeline.run(&mut first).await?;

    assert_eq!(first.processed, 3);
    assert_eq!(first.success, 2);
    assert_eq!(first.skipped, 1);
    assert_eq!(first.failed, 0);

    let samples = store.sample_glossed(10).await?;
    let matter = samples.iter().find(|s| s.word == "matter").expect("matter stored");
    assert_eq!(matter.meaning_short.as_deref(), Some("重要"));

    let mut second = BackfillStats::default();
    pipeline.run(&mut second).await?;
    assert_eq!(second.processed, 1);
    assert_eq!(second.success, 0);
    assert_eq!(second.skipped, 1);
    Ok(())
}

#[tokio::test]
async fn test_localBackfill_shouldReachFullCompletion() -> Result<()> {
    let store = common::seeded_store("en", &[("pen", "n. 钢笔"), ("ink", "n. 墨水；油墨")]).await?;
    let source = LocalSource::new(ShortGlossExtractor::basic());

    let mut stats = BackfillStats::default();
    BackfillPipeline::new(&store, &source, 50)
        .with_progress_interval(1)
        .run(&mut stats)
        .await?;

    let gloss_stats = store.gloss_stats().await?;
    assert_eq!(gloss_stats.pending(PendingSelector::HasMeaning), 0);
    assert_eq!(gloss_stats.completion(PendingSelector::HasMeaning), Some(100.0));
    Ok(())
}

#[tokio::test]
async fn test_remoteBackfill_withWorkingTranslator_shouldGlossEveryWord() -> Result<()> {
    let store = common::seeded_store("en", &[("apple", "n. 苹果"), ("orphan", ""), ("tree", "")]).await?;
    let translator = MockTranslator::working();
    let source = RemoteSource::new(Arc::new(translator.clone()), "zh-CN");

    let mut stats = BackfillStats::default();
    BackfillPipeline::new(&store, &source, 2).run(&mut stats).await?;

    assert_eq!(stats.processed, 3);
    assert_eq!(stats.success, 3);
    assert_eq!(translator.call_count(), 3);

    let gloss_stats = store.gloss_stats().await?;
    assert_eq!(gloss_stats.with_short, 3);
    assert_eq!(gloss_stats.completion(PendingSelector::AnyMissing), Some(100.0));

    let samples = store.sample_glossed(10).await?;
    assert_eq!(
        samples[0].meaning_short.as_deref(),
        Some(MockTranslator::expected_translation("apple", "zh-CN").as_str())
    );
    Ok(())
}

#[tokio::test]
async fn test_remoteBackfill_withIntermittentTranslator_shouldLeaveFailuresPending() -> Result<()> {
    let store = common::seeded_store("en", &[("a", ""), ("b", ""), ("c", ""), ("d", "")]).await?;
    let translator = MockTranslator::intermittent(2);
    let source = RemoteSource::new(Arc::new(translator.clone()), "zh-CN");
    let pipeline = BackfillPipeline::new(&store, &source, 10);

    let mut stats = BackfillStats::default();
    pipeline.run(&mut stats).await?;

    assert_eq!(stats.processed, 4);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.failed, 2);
    assert_eq!(store.gloss_stats().await?.pending(PendingSelector::AnyMissing), 2);

    let mut retry = BackfillStats::default();
    pipeline.run(&mut retry).await?;
    assert_eq!(retry.processed, 2);
    Ok(())
}

#[tokio::test]
async fn test_updateMeaningShort_onGlossedWord_shouldNotOverwrite() -> Result<()> {
    let store = common::seeded_store("en", &[("apple", "n. 苹果")]).await?;
    let pending = store.fetch_pending(PendingSelector::HasMeaning, 0, 10).await?;
    let id = pending[0].id;

    assert!(store.update_meaning_short(id, "苹果").await?);
    assert!(!store.update_meaning_short(id, "别的").await?);

    let samples = store.sample_glossed(1).await?;
    assert_eq!(samples[0].meaning_short.as_deref(), Some("苹果"));
    Ok(())
}

#[tokio::test]
async fn test_localBackfill_withFailingUpdate_shouldCountItAndKeepGoing() -> Result<()> {
    let inner = common::seeded_store(
        "en",
        &[("apple", "n. 苹果"), ("book", "n. 书"), ("pen", "n. 钢笔")],
    )
    .await?;
    let first_id = inner.fetch_pending(PendingSelector::HasMeaning, 0, 1).await?[0].id;
    let store = common::FaultyStore::new(inner).failing_update_for(first_id);
    let source = LocalSource::new(ShortGlossExtractor::basic());

    let mut stats = BackfillStats::default();
    let result = BackfillPipeline::new(&store, &source, 2).run(&mut stats).await;

    assert!(result.is_ok());
    assert_eq!(stats.processed, 3);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.update_errors, 1);
    assert_eq!(stats.failed, 0);

    let gloss_stats = store.gloss_stats().await?;
    assert_eq!(gloss_stats.with_short, 2);
    let still_pending = store.fetch_pending(PendingSelector::HasMeaning, 0, 10).await?;
    assert_eq!(still_pending.len(), 1);
    assert_eq!(still_pending[0].id, first_id);
    Ok(())
}
