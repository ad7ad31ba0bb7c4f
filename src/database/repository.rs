/*!
 * Repository layer for vocabulary persistence.
 *
 * `VocabStore` is the interface the pipelines program against; this module
 * also provides the SQLite implementation built on the shared
 * `DatabaseConnection`. Every statement is parameterized.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::connection::DatabaseConnection;
use super::models::{
    GlossSample, GlossStats, InsertOutcome, NewCategory, NewLanguage, NewWord, PendingSelector,
    PendingWord, Resolved,
};

/// Persistence operations used by the import and backfill pipelines
#[async_trait]
pub trait VocabStore: Send + Sync {
    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;

    /// Return the id of the language named `language.name`, creating it if absent
    async fn find_or_create_language(&self, language: &NewLanguage) -> Result<Resolved>;

    /// Return the id of the category `(language_id, name)`, creating it if absent
    async fn find_or_create_category(&self, category: &NewCategory) -> Result<Resolved>;

    /// Insert every word whose `(language_id, category_id, word)` is not yet stored
    ///
    /// All inserts share one transaction, committed at the end. A failing
    /// insert is reported as `InsertOutcome::Failed` without aborting the
    /// others; any other error rolls the whole batch back.
    async fn insert_words_if_absent(
        &self,
        language_id: i64,
        category_id: i64,
        words: &[NewWord],
    ) -> Result<Vec<InsertOutcome>>;

    /// Fetch up to `limit` words without a short gloss with an id above `after_id`, by id
    async fn fetch_pending(
        &self,
        selector: PendingSelector,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<PendingWord>>;

    /// Set the short gloss of a word that does not have one yet
    ///
    /// Returns `false` when the row is missing or already glossed.
    async fn update_meaning_short(&self, word_id: i64, meaning_short: &str) -> Result<bool>;

    /// Coverage counters over the whole `words` table
    async fn gloss_stats(&self) -> Result<GlossStats>;

    /// Up to `limit` words that have a full meaning, by id
    async fn sample_glossed(&self, limit: usize) -> Result<Vec<GlossSample>>;

    /// Release the underlying connection(s)
    async fn close(&self) -> Result<()>;
}

/// `WHERE` clause shared by both backends for pending-word selection
pub(crate) fn pending_condition(selector: PendingSelector) -> &'static str {
    match selector {
        PendingSelector::HasMeaning => {
            "w.meaning IS NOT NULL AND w.meaning != '' AND (w.meaning_short IS NULL OR w.meaning_short = '')"
        }
        PendingSelector::AnyMissing => "(w.meaning_short IS NULL OR w.meaning_short = '')",
    }
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteStore {
    /// Database connection
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Create a store over an existing connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open (and initialize) the database file at `path`
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Create a store with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Get the underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn find_language_sync(conn: &Connection, name: &str) -> Result<Option<i64>> {
        Ok(conn
            .query_row("SELECT id FROM languages WHERE name = ?1", [name], |row| row.get(0))
            .optional()?)
    }

    fn find_category_sync(conn: &Connection, language_id: i64, name: &str) -> Result<Option<i64>> {
        Ok(conn
            .query_row(
                "SELECT id FROM corpus_categories WHERE language_id = ?1 AND name = ?2",
                params![language_id, name],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn word_exists_sync(conn: &Connection, language_id: i64, category_id: i64, word: &str) -> Result<bool> {
        let found: Option<i64> = conn
            .query_row(
                "SELECT id FROM words WHERE language_id = ?1 AND category_id = ?2 AND word = ?3 LIMIT 1",
                params![language_id, category_id, word],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_word_sync(conn: &Connection, language_id: i64, category_id: i64, word: &NewWord) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO words (
                language_id, category_id, word, transliteration,
                us_phonetic, uk_phonetic, meaning, example
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                language_id,
                category_id,
                word.word,
                word.transliteration,
                word.us_phonetic,
                word.uk_phonetic,
                word.meaning,
                word.example,
            ],
        )
    }

    fn count_sync(conn: &Connection, sql: &str) -> Result<i64> {
        conn.query_row(sql, [], |row| row.get(0))
            .with_context(|| format!("Failed to run count query: {}", sql))
    }
}

#[async_trait]
impl VocabStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn find_or_create_language(&self, language: &NewLanguage) -> Result<Resolved> {
        let language = language.clone();

        self.db
            .execute_async(move |conn| {
                if let Some(id) = Self::find_language_sync(conn, &language.name)? {
                    return Ok(Resolved { id, created: false });
                }

                let inserted = conn.execute(
                    "INSERT INTO languages (name, code, script, is_active) VALUES (?1, ?2, ?3, 1)
                     ON CONFLICT(name) DO NOTHING",
                    params![language.name, language.code, language.script],
                )?;

                let id = Self::find_language_sync(conn, &language.name)?
                    .ok_or_else(|| anyhow::anyhow!("Language '{}' vanished after insert", language.name))?;

                Ok(Resolved { id, created: inserted == 1 })
            })
            .await
    }

    async fn find_or_create_category(&self, category: &NewCategory) -> Result<Resolved> {
        let category = category.clone();

        self.db
            .execute_async(move |conn| {
                if let Some(id) = Self::find_category_sync(conn, category.language_id, &category.name)? {
                    return Ok(Resolved { id, created: false });
                }

                let inserted = conn.execute(
                    "INSERT INTO corpus_categories (language_id, name, description, difficulty)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(language_id, name) DO NOTHING",
                    params![
                        category.language_id,
                        category.name,
                        category.description,
                        category.difficulty,
                    ],
                )?;

                let id = Self::find_category_sync(conn, category.language_id, &category.name)?
                    .ok_or_else(|| anyhow::anyhow!("Category '{}' vanished after insert", category.name))?;

                Ok(Resolved { id, created: inserted == 1 })
            })
            .await
    }

    async fn insert_words_if_absent(
        &self,
        language_id: i64,
        category_id: i64,
        words: &[NewWord],
    ) -> Result<Vec<InsertOutcome>> {
        let words = words.to_vec();

        self.db
            .transaction_async(move |tx| {
                let mut outcomes = Vec::with_capacity(words.len());

                for word in &words {
                    if Self::word_exists_sync(tx, language_id, category_id, &word.word)? {
                        outcomes.push(InsertOutcome::Duplicate);
                        continue;
                    }

                    match Self::insert_word_sync(tx, language_id, category_id, word) {
                        Ok(_) => outcomes.push(InsertOutcome::Inserted),
                        Err(e) => outcomes.push(InsertOutcome::Failed(e.to_string())),
                    }
                }

                Ok(outcomes)
            })
            .await
    }

    async fn fetch_pending(
        &self,
        selector: PendingSelector,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<PendingWord>> {
        let sql = format!(
            r#"
            SELECT w.id, w.word, COALESCE(w.meaning, ''), l.code
            FROM words w
            JOIN languages l ON l.id = w.language_id
            WHERE w.id > ?1 AND {}
            ORDER BY w.id
            LIMIT ?2
            "#,
            pending_condition(selector)
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![after_id, limit], |row| {
                        Ok(PendingWord {
                            id: row.get(0)?,
                            word: row.get(1)?,
                            meaning: row.get(2)?,
                            language_code: row.get(3)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                debug!("Fetched {} pending words after id {}", rows.len(), after_id);
                Ok(rows)
            })
            .await
    }

    async fn update_meaning_short(&self, word_id: i64, meaning_short: &str) -> Result<bool> {
        let meaning_short = meaning_short.to_string();

        self.db
            .execute_async(move |conn| {
                let changed = conn.execute(
                    "UPDATE words SET meaning_short = ?1
                     WHERE id = ?2 AND (meaning_short IS NULL OR meaning_short = '')",
                    params![meaning_short, word_id],
                )?;
                Ok(changed > 0)
            })
            .await
    }

    async fn gloss_stats(&self) -> Result<GlossStats> {
        self.db
            .execute_async(|conn| {
                Ok(GlossStats {
                    total: Self::count_sync(conn, "SELECT COUNT(*) FROM words")?,
                    with_meaning: Self::count_sync(
                        conn,
                        "SELECT COUNT(*) FROM words WHERE meaning IS NOT NULL AND meaning != ''",
                    )?,
                    with_short: Self::count_sync(
                        conn,
                        "SELECT COUNT(*) FROM words WHERE meaning_short IS NOT NULL AND meaning_short != ''",
                    )?,
                })
            })
            .await
    }

    async fn sample_glossed(&self, limit: usize) -> Result<Vec<GlossSample>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT word, meaning, meaning_short FROM words
                     WHERE meaning IS NOT NULL AND meaning != ''
                     ORDER BY id LIMIT ?1",
                )?;
                let rows = stmt
                    .query_map([limit], |row| {
                        Ok(GlossSample {
                            word: row.get(0)?,
                            meaning: row.get(1)?,
                            meaning_short: row.get(2)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await
    }

    async fn close(&self) -> Result<()> {
        debug!("Closing SQLite store at {:?}", self.db.path());
        Ok(())
    }
}
