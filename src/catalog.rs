/*!
 * Language and category resolution.
 *
 * Maps the labels parsed from source filenames onto stable row ids,
 * creating `languages` and `corpus_categories` rows on first use. Existing
 * rows are never updated.
 */

use anyhow::Result;
use log::info;

use crate::database::models::{NewCategory, NewLanguage};
use crate::database::VocabStore;
use crate::language_utils;

/// Level markers scanned in order; the first one contained in the category name wins
pub const DIFFICULTY_MARKERS: &[(&str, u8)] = &[
    ("基础", 1),
    ("初级", 1),
    ("初中", 2),
    ("中级", 2),
    ("高中", 3),
    ("高级", 3),
    ("专业", 4),
    ("考试", 4),
    ("N5", 1),
    ("N4", 2),
    ("N3", 3),
    ("N2", 4),
    ("N1", 5),
    ("CET4", 3),
    ("CET6", 4),
    ("IELTS", 4),
    ("TOEFL", 4),
    ("GRE", 5),
    ("GMAT", 5),
];

/// Difficulty used when no marker matches
pub const DEFAULT_DIFFICULTY: u8 = 1;

/// Infer a category's difficulty from its name
pub fn infer_difficulty(category_name: &str) -> u8 {
    DIFFICULTY_MARKERS
        .iter()
        .find(|(marker, _)| category_name.contains(marker))
        .map(|(_, level)| *level)
        .unwrap_or(DEFAULT_DIFFICULTY)
}

/// Description stored on newly created categories
pub fn category_description(category_name: &str) -> String {
    format!("{}相关词汇", category_name)
}

/// Get-or-create access to languages and categories
pub struct CatalogResolver<'a> {
    store: &'a dyn VocabStore,
}

impl<'a> CatalogResolver<'a> {
    pub fn new(store: &'a dyn VocabStore) -> Self {
        Self { store }
    }

    /// Id of the language labelled `name`
    pub async fn resolve_language(&self, name: &str) -> Result<i64> {
        let profile = language_utils::profile_for_label(name);
        let resolved = self
            .store
            .find_or_create_language(&NewLanguage {
                name: name.to_string(),
                code: profile.code.clone(),
                script: profile.script,
            })
            .await?;

        if resolved.created {
            info!(
                "Created language: {} (ID: {}, code: {}, {})",
                name,
                resolved.id,
                profile.code,
                language_utils::display_name(&profile.code)
            );
        }
        Ok(resolved.id)
    }

    /// Id of the category `name` within `language_id`
    pub async fn resolve_category(&self, language_id: i64, name: &str) -> Result<i64> {
        let difficulty = infer_difficulty(name);
        let resolved = self
            .store
            .find_or_create_category(&NewCategory {
                language_id,
                name: name.to_string(),
                description: category_description(name),
                difficulty,
            })
            .await?;

        if resolved.created {
            info!(
                "Created category: {} (ID: {}, difficulty: {})",
                name, resolved.id, difficulty
            );
        }
        Ok(resolved.id)
    }
}
