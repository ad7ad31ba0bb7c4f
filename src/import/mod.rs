/*!
 * Import of raw word lists into the vocabulary store.
 *
 * - `normalizer`: one raw JSON entry to a canonical word
 * - `pipeline`: directory walk, per-file transactions and totals
 */

pub mod normalizer;
pub mod pipeline;

pub use normalizer::{normalize_entry, Rejection};
pub use pipeline::{FileReport, ImportPipeline, ImportStats};
