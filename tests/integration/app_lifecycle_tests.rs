/*!
 * Integration tests for the full app lifecycle
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use glossfill::app_controller::{Controller, ExtractOptions, RunOutcome};
use glossfill::providers::mock::MockTranslator;
use glossfill::{SqliteStore, VocabStore};

use crate::common;

#[tokio::test]
async fn test_controller_importExtractStatsCheck_shouldCompleteEndToEnd() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let config = common::sqlite_config(temp_dir.path());
    fs::create_dir_all(&config.import.words_dir)?;
    common::create_word_list(&config.import.words_dir, "en-CET4.json")?;
    let db_path = config.database.sqlite_path.clone().expect("sqlite path set");
    let controller = Controller::with_config(config);

    assert_eq!(controller.run_import(None).await?, RunOutcome::Completed);

    let options = ExtractOptions {
        batch_size: Some(1),
        no_segmentation: true,
    };
    assert_eq!(controller.run_extract(options).await?, RunOutcome::Completed);

    controller.run_stats().await?;
    controller.run_check(5).await?;

    let store = SqliteStore::open(&db_path)?;
    let stats = store.gloss_stats().await?;
    assert_eq!(stats.total, 2);
    assert_eq!(stats.with_short, 2);
    Ok(())
}

#[tokio::test]
async fn test_controller_importWithMissingDirectory_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::sqlite_config(temp_dir.path()));

    let result = controller
        .run_import(Some(temp_dir.path().join("does-not-exist")))
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_controller_translateWith_shouldSkipChineseWords() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::sqlite_config(temp_dir.path()));
    let store = common::seeded_store("zh", &[("苹果", ""), ("书", "")]).await?;
    let translator = MockTranslator::working();

    let outcome = controller
        .translate_with(&store, Arc::new(translator.clone()), Some(1))
        .await?;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(translator.call_count(), 0);
    assert_eq!(store.gloss_stats().await?.with_short, 2);
    Ok(())
}

#[tokio::test]
async fn test_controller_checkWith_onEmptyStore_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::sqlite_config(temp_dir.path()));
    let store = SqliteStore::new_in_memory()?;

    tokio_test::assert_ok!(controller.check_with(&store, 3).await);
    Ok(())
}
