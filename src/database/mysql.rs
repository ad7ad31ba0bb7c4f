/*!
 * MySQL implementation of `VocabStore`.
 *
 * The production vocabulary database is MySQL-compatible. This backend uses a
 * single-connection sqlx pool: the batch jobs are strictly sequential, so one
 * connection is held for the whole run and released by `close`.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use std::time::Duration;

use crate::app_config::DatabaseConfig;
use crate::errors::StoreError;

use super::models::{
    GlossSample, GlossStats, InsertOutcome, NewCategory, NewLanguage, NewWord, PendingSelector,
    PendingWord, Resolved,
};
use super::repository::{pending_condition, VocabStore};

/// MySQL-backed store
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    /// Connect using the host/port/credential settings
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database)
            .charset(&config.charset);

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(options)
            .await
            .map_err(StoreError::from)
            .with_context(|| {
                format!(
                    "Failed to connect to MySQL at {}:{}/{}",
                    config.host, config.port, config.database
                )
            })?;

        info!(
            "Connected to MySQL at {}:{}/{}",
            config.host, config.port, config.database
        );
        Ok(Self { pool })
    }

    async fn find_language(&self, name: &str) -> Result<Option<i64>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT CAST(id AS SIGNED) FROM languages WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(StoreError::from)?;
        Ok(row.map(|(id,)| id))
    }

    async fn find_category(&self, language_id: i64, name: &str) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT CAST(id AS SIGNED) FROM corpus_categories WHERE language_id = ? AND name = ?",
        )
        .bind(language_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from)?;
        Ok(row.map(|(id,)| id))
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from)
            .with_context(|| format!("Failed to run count query: {}", sql))?;
        Ok(count)
    }
}

#[async_trait]
impl VocabStore for MySqlStore {
    fn backend_name(&self) -> &'static str {
        "mysql"
    }

    async fn find_or_create_language(&self, language: &NewLanguage) -> Result<Resolved> {
        if let Some(id) = self.find_language(&language.name).await? {
            return Ok(Resolved { id, created: false });
        }

        let result = sqlx::query(
            "INSERT IGNORE INTO languages (name, code, script, is_active) VALUES (?, ?, ?, 1)",
        )
        .bind(&language.name)
        .bind(&language.code)
        .bind(&language.script)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let id = self
            .find_language(&language.name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Language '{}' vanished after insert", language.name))?;

        Ok(Resolved { id, created: result.rows_affected() == 1 })
    }

    async fn find_or_create_category(&self, category: &NewCategory) -> Result<Resolved> {
        if let Some(id) = self.find_category(category.language_id, &category.name).await? {
            return Ok(Resolved { id, created: false });
        }

        let result = sqlx::query(
            "INSERT IGNORE INTO corpus_categories (language_id, name, description, difficulty)
             VALUES (?, ?, ?, ?)",
        )
        .bind(category.language_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.difficulty)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        let id = self
            .find_category(category.language_id, &category.name)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Category '{}' vanished after insert", category.name))?;

        Ok(Resolved { id, created: result.rows_affected() == 1 })
    }

    async fn insert_words_if_absent(
        &self,
        language_id: i64,
        category_id: i64,
        words: &[NewWord],
    ) -> Result<Vec<InsertOutcome>> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from)?;
        let mut outcomes = Vec::with_capacity(words.len());

        for word in words {
            let existing: Option<(i64,)> = sqlx::query_as(
                "SELECT CAST(id AS SIGNED) FROM words
                 WHERE language_id = ? AND category_id = ? AND word = ? LIMIT 1",
            )
            .bind(language_id)
            .bind(category_id)
            .bind(&word.word)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::from)?;

            if existing.is_some() {
                outcomes.push(InsertOutcome::Duplicate);
                continue;
            }

            let inserted = sqlx::query(
                "INSERT INTO words (
                    language_id, category_id, word, transliteration,
                    us_phonetic, uk_phonetic, meaning, example
                 ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(language_id)
            .bind(category_id)
            .bind(&word.word)
            .bind(&word.transliteration)
            .bind(&word.us_phonetic)
            .bind(&word.uk_phonetic)
            .bind(&word.meaning)
            .bind(&word.example)
            .execute(&mut *tx)
            .await;

            match inserted {
                Ok(_) => outcomes.push(InsertOutcome::Inserted),
                Err(e) => outcomes.push(InsertOutcome::Failed(e.to_string())),
            }
        }

        // Dropping `tx` on an early return above rolls the batch back
        tx.commit().await.map_err(StoreError::from)?;
        Ok(outcomes)
    }

    async fn fetch_pending(
        &self,
        selector: PendingSelector,
        after_id: i64,
        limit: usize,
    ) -> Result<Vec<PendingWord>> {
        let sql = format!(
            "SELECT CAST(w.id AS SIGNED), w.word, COALESCE(w.meaning, ''), l.code
             FROM words w
             JOIN languages l ON l.id = w.language_id
             WHERE w.id > ? AND {}
             ORDER BY w.id
             LIMIT ?",
            pending_condition(selector)
        );

        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(&sql)
            .bind(after_id)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)?;

        debug!("Fetched {} pending words after id {}", rows.len(), after_id);

        Ok(rows
            .into_iter()
            .map(|(id, word, meaning, language_code)| PendingWord {
                id,
                word,
                meaning,
                language_code,
            })
            .collect())
    }

    async fn update_meaning_short(&self, word_id: i64, meaning_short: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE words SET meaning_short = ?
             WHERE id = ? AND (meaning_short IS NULL OR meaning_short = '')",
        )
        .bind(meaning_short)
        .bind(word_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn gloss_stats(&self) -> Result<GlossStats> {
        Ok(GlossStats {
            total: self.count("SELECT COUNT(*) FROM words").await?,
            with_meaning: self
                .count("SELECT COUNT(*) FROM words WHERE meaning IS NOT NULL AND meaning != ''")
                .await?,
            with_short: self
                .count("SELECT COUNT(*) FROM words WHERE meaning_short IS NOT NULL AND meaning_short != ''")
                .await?,
        })
    }

    async fn sample_glossed(&self, limit: usize) -> Result<Vec<GlossSample>> {
        let rows: Vec<(String, String, Option<String>)> = sqlx::query_as(
            "SELECT word, meaning, meaning_short FROM words
             WHERE meaning IS NOT NULL AND meaning != ''
             ORDER BY id LIMIT ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from)?;

        Ok(rows
            .into_iter()
            .map(|(word, meaning, meaning_short)| GlossSample { word, meaning, meaning_short })
            .collect())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        info!("MySQL connection closed");
        Ok(())
    }
}
