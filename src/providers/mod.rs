/*!
 * Translation service clients.
 *
 * - MyMemory: public HTTP translation API used by the remote backfill
 * - Mock: configurable in-process translator for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for translation services
///
/// Implementations translate one short text at a time and are used
/// interchangeably by the remote gloss source.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Short service name for logs
    fn name(&self) -> &'static str;

    /// Translate `text` from `source_language` into `target_language`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The trimmed, non-empty translation or an error
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;
}

pub mod mymemory;
pub mod mock;

pub use mymemory::MyMemory;
