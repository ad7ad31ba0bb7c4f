/*!
 * Short gloss derivation.
 *
 * - `segmenter`: optional part-of-speech segmentation
 * - `extractor`: full meaning to short gloss
 * - `backfill`: paged loop filling `meaning_short`
 */

pub mod backfill;
pub mod extractor;
pub mod segmenter;

pub use backfill::{BackfillPipeline, BackfillStats, GlossOutcome, GlossSource, LocalSource, RemoteSource};
pub use extractor::ShortGlossExtractor;
pub use segmenter::{default_segmenter, NoSegmenter, Segmenter, TaggedToken};
