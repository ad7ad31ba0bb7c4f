/*!
 * Integration tests for the word list import workflow
 */

use anyhow::Result;
use std::cell::Cell;
use std::future::pending;

use glossfill::app_controller::RunOutcome;
use glossfill::database::models::PendingSelector;
use glossfill::import::{ImportPipeline, ImportStats};
use glossfill::{SqliteStore, VocabStore};

use crate::common;

const SECOND_PART: &str = r#"[
  {"name": "apple", "trans": ["n. 苹果"]},
  {"name": "", "trans": ["n. 无"]},
  {"name": "book", "trans": ["n. 书；书籍"], "phonetic": "bʊk"}
]"#;

#[tokio::test]
async fn test_importRun_withMixedFiles_shouldCountEveryOutcome() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_word_list(dir, "en-CET4.json")?;
    common::create_test_file(dir, "en-CET4_2.json", SECOND_PART)?;
    common::create_test_file(dir, "broken.json", "{ oops")?;

    let store = SqliteStore::new_in_memory()?;
    let pipeline = ImportPipeline::new(&store, "基础");
    let mut stats = ImportStats::default();
    let progress_calls = Cell::new(0);

    let outcome = pipeline
        .run(
            dir,
            &mut stats,
            |done, total| {
                assert!(done <= total);
                progress_calls.set(progress_calls.get() + 1);
            },
            pending(),
        )
        .await?;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(stats.files_total, 3);
    assert_eq!(stats.files_imported, 2);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.words_seen, 5);
    assert_eq!(stats.words_inserted, 3);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.insert_errors, 0);
    assert_eq!(progress_calls.get(), 3);

    let gloss_stats = store.gloss_stats().await?;
    assert_eq!(gloss_stats.total, 3);
    assert_eq!(gloss_stats.with_meaning, 3);
    assert_eq!(gloss_stats.with_short, 0);
    Ok(())
}

#[tokio::test]
async fn test_importRun_twice_shouldInsertNothingTheSecondTime() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_word_list(temp_dir.path(), "en-CET4.json")?;
    let store = SqliteStore::new_in_memory()?;
    let pipeline = ImportPipeline::new(&store, "基础");

    let mut first = ImportStats::default();
    pipeline.run(temp_dir.path(), &mut first, |_, _| {}, pending()).await?;
    let mut second = ImportStats::default();
    pipeline.run(temp_dir.path(), &mut second, |_, _| {}, pending()).await?;

    assert_eq!(first.words_inserted, 2);
    assert_eq!(second.words_inserted, 0);
    assert_eq!(second.duplicates, 2);
    assert_eq!(store.gloss_stats().await?.total, 2);
    Ok(())
}

#[tokio::test]
async fn test_importRun_withSameWordInTwoCategories_shouldKeepBoth() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_word_list(temp_dir.path(), "en-CET4.json")?;
    common::create_word_list(temp_dir.path(), "en-CET6.json")?;
    let store = SqliteStore::new_in_memory()?;

    let mut stats = ImportStats::default();
    ImportPipeline::new(&store, "基础")
        .run(temp_dir.path(), &mut stats, |_, _| {}, pending())
        .await?;

    assert_eq!(stats.words_inserted, 4);
    assert_eq!(stats.duplicates, 0);
    Ok(())
}

#[tokio::test]
async fn test_importFile_withoutCategory_shouldUseDefaultCategory() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_word_list(temp_dir.path(), "编程.json")?;
    let store = SqliteStore::new_in_memory()?;

    let report = ImportPipeline::new(&store, "基础").import_file(&path).await?;

    assert_eq!(report.language, "编程");
    assert_eq!(report.category, "基础");
    assert_eq!(report.inserted, 2);

    let pending = store.fetch_pending(PendingSelector::HasMeaning, 0, 10).await?;
    assert_eq!(pending.len(), 2);
    assert!(pending.iter().all(|word| word.language_code == "prog"));
    Ok(())
}

#[tokio::test]
async fn test_importRun_withEmptyDirectory_shouldSucceedWithoutWork() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = SqliteStore::new_in_memory()?;

    let mut stats = ImportStats::default();
    tokio_test::assert_ok!(
        ImportPipeline::new(&store, "基础")
            .run(temp_dir.path(), &mut stats, |_, _| {}, pending())
            .await
    );

    assert_eq!(stats, ImportStats::default());
    Ok(())
}

#[tokio::test]
async fn test_importRun_withStoreFailureMidFile_shouldRollBackThatFileOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    for name in ["en-A1.json", "en-B1.json", "en-C1.json"] {
        common::create_word_list(temp_dir.path(), name)?;
    }
    let store = common::FaultyStore::new(SqliteStore::new_in_memory()?).failing_insert_call(2);

    let mut stats = ImportStats::default();
    let outcome = ImportPipeline::new(&store, "基础")
        .run(temp_dir.path(), &mut stats, |_, _| {}, pending())
        .await?;

    assert_eq!(outcome, RunOutcome::Completed);
    assert_eq!(stats.files_failed, 1);
    assert_eq!(stats.files_imported, 2);
    assert_eq!(stats.words_inserted, 4);
    assert_eq!(common::words_in_category(&store.inner, "A1")?, 2);
    assert_eq!(common::words_in_category(&store.inner, "B1")?, 0);
    assert_eq!(common::words_in_category(&store.inner, "C1")?, 2);
    Ok(())
}

#[tokio::test]
async fn test_importRun_withRejectedInsert_shouldCountItAndKeepOthers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(
        temp_dir.path(),
        "en-CET4.json",
        r#"[
  {"name": "apple", "trans": ["n. 苹果"]},
  {"name": "poison", "trans": ["n. 毒药"]},
  {"name": "book", "trans": ["n. 书"]}
]"#,
    )?;
    let store = SqliteStore::new_in_memory()?;
    store.connection().execute(|conn| {
        conn.execute_batch(
            "CREATE TRIGGER reject_poison BEFORE INSERT ON words
             WHEN NEW.word = 'poison'
             BEGIN SELECT RAISE(ABORT, 'word rejected'); END;",
        )?;
        Ok(())
    })?;

    let mut stats = ImportStats::default();
    ImportPipeline::new(&store, "基础")
        .run(temp_dir.path(), &mut stats, |_, _| {}, pending())
        .await?;

    assert_eq!(stats.files_imported, 1);
    assert_eq!(stats.words_inserted, 2);
    assert_eq!(stats.insert_errors, 1);
    assert_eq!(common::words_in_category(&store, "CET4")?, 2);
    Ok(())
}
