/*!
 * Common test utilities for the glossfill test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::params;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use glossfill::app_config::{Config, DatabaseBackend};
use glossfill::database::models::{
    GlossSample, GlossStats, InsertOutcome, NewCategory, NewLanguage, NewWord, PendingSelector,
    PendingWord, Resolved,
};
use glossfill::{SqliteStore, StoreError, VocabStore};

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a word list with two regular entries
pub fn create_word_list(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = r#"[
  {"name": "apple", "trans": ["n. 苹果；苹果树"], "usphone": "ˈæpl", "ukphone": "ˈæpl"},
  {"name": "matter", "trans": ["n. 重要，要紧，有关系；物质，物体"], "usphone": "ˈmætər"}
]"#;
    create_test_file(dir, filename, content)
}

/// Config pointing at a SQLite file inside `dir`
pub fn sqlite_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.database.backend = DatabaseBackend::Sqlite;
    config.database.sqlite_path = Some(dir.join("vocab.db"));
    config.import.words_dir = dir.join("words");
    config.translation.call_delay_ms = 0;
    config.translation.batch_delay_ms = 0;
    config
}

/// In-memory store holding `words` under language `code` and category 基础
pub async fn seeded_store(code: &str, words: &[(&str, &str)]) -> Result<SqliteStore> {
    let store = SqliteStore::new_in_memory()?;
    let language = store
        .find_or_create_language(&NewLanguage {
            name: code.to_string(),
            code: code.to_string(),
            script: "Latin".to_string(),
        })
        .await?;
    let category = store
        .find_or_create_category(&NewCategory {
            language_id: language.id,
            name: "基础".to_string(),
            description: "基础相关词汇".to_string(),
            difficulty: 1,
        })
        .await?;

    let words: Vec<NewWord> = words
        .iter()
        .map(|(word, meaning)| NewWord {
            word: word.to_string(),
            meaning: meaning.to_string(),
            ..Default::default()
        })
        .collect();
    store
        .insert_words_if_absent(language.id, category.id, &words)
        .await?;

    Ok(store)
}

/// Route library logs through env_logger while a test runs
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// SQLite store that fails chosen operations
pub struct FaultyStore {
    pub inner: SqliteStore,
    /// Word whose `update_meaning_short` errors
    fail_update_for: Option<i64>,
    /// 1-based `insert_words_if_absent` call that writes its words, then errors
    fail_insert_call: Option<usize>,
    insert_calls: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            fail_update_for: None,
            fail_insert_call: None,
            insert_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_update_for(mut self, word_id: i64) -> Self {
        self.fail_update_for = Some(word_id);
        self
    }

    pub fn failing_insert_call(mut self, call: usize) -> Self {
        self.fail_insert_call = Some(call);
        self
    }
}

#[async_trait]
impl VocabStore for FaultyStore {
    fn backend_name(&self) -> &'static str {
        "faulty"
    }

    async fn find_or_create_language(&self, language: &NewLanguage) -> Result<Resolved> {
        self.inner.find_or_create_language(language).await
    }

    async fn find_or_create_category(&self, category: &NewCategory) -> Result<Resolved> {
        self.inner.find_or_create_category(category).await
    }

    async fn insert_words_if_absent(
        &self,
        language_id: i64,
        category_id: i64,
        words: &[NewWord],
    ) -> Result<Vec<InsertOutcome>> {
        let call = self.insert_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_insert_call != Some(call) {
            return self.inner.insert_words_if_absent(language_id, category_id, words).await;
        }

        // Write the whole batch inside the transaction, then lose the connection
        let words = words.to_vec();
        self.inner
            .connection()
            .transaction_async(move |tx| {
                for word in &words {
                    tx.execute(
                        "INSERT INTO words (language_id, category_id, word, meaning) VALUES (?1, ?2, ?3, ?4)",
                        params![language_id, category_id, word.word, word.meaning],
                    )?;
                }
                Err(StoreError::Connection(format!("lost after {} inserts", words.len())).into())
            })
            .await
    }

    async fn fetch_pending(
        &self,
        selector: PendingSelector,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<PendingWord>> {
        self.inner.fetch_pending(selector, after_id, limit).await
    }

    async fn update_meaning_short(&self, word_id: i64, meaning_short: &str) -> Result<bool> {
        if self.fail_update_for == Some(word_id) {
            return Err(StoreError::Query(format!("deadlock updating word {}", word_id)).into());
        }
        self.inner.update_meaning_short(word_id, meaning_short).await
    }

    async fn gloss_stats(&self) -> Result<GlossStats> {
        self.inner.gloss_stats().await
    }

    async fn sample_glossed(&self, limit: usize) -> Result<Vec<GlossSample>> {
        self.inner.sample_glossed(limit).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}

/// Number of stored words in category `category`
pub fn words_in_category(store: &SqliteStore, category: &str) -> Result<i64> {
    let category = category.to_string();
    store.connection().execute(move |conn| {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM words w
             JOIN corpus_categories c ON c.id = w.category_id
             WHERE c.name = ?1",
            [category],
            |row| row.get(0),
        )?)
    })
}
