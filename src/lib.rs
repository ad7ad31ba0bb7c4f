/*!
 * # glossfill - vocabulary import and short gloss backfill
 *
 * Batch tooling for a language-learning vocabulary database.
 *
 * ## Features
 *
 * - Import JSON word lists named `<language>-<category>[_<n>].json`
 * - Create languages and categories on first use, with inferred difficulty
 * - Derive short glosses from full dictionary meanings, optionally with
 *   part-of-speech segmentation (`jieba` feature)
 * - Translate headwords through the MyMemory API for words without a meaning
 * - MySQL for the production database, SQLite for local runs
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: `VocabStore` and its SQLite and MySQL backends
 * - `catalog`: Language and category resolution
 * - `import`: Word list normalization and the import pipeline
 * - `gloss`: Segmentation, short gloss extraction and the backfill pipeline
 * - `providers`: Translation service clients
 * - `app_controller`: Command orchestration and interrupt handling
 * - `file_utils`: Source file discovery and filename parsing
 * - `language_utils`: Language labels, codes and scripts
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(non_snake_case)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod gloss;
pub mod import;
pub mod language_utils;
pub mod providers;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOutcome};
pub use database::{SqliteStore, VocabStore};
pub use errors::{AppError, ImportError, ProviderError, StoreError};
pub use gloss::ShortGlossExtractor;
pub use language_utils::get_language_name;
