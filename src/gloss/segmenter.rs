/*!
 * Word segmentation with part-of-speech tagging.
 *
 * Segmentation is optional. `NoSegmenter` stands in when it is disabled
 * or when the crate is built without the `jieba` feature, and the
 * extractor then relies on its punctuation fallback alone.
 */

#[cfg(not(feature = "jieba"))]
use log::warn;

/// One segmented token and its part-of-speech tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub word: String,
    /// ICTCLAS-style tag, e.g. `n`, `vn`, `a`, `uj`
    pub tag: String,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

/// Splits text into tagged tokens
pub trait Segmenter: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Whether `segment` produces tokens at all
    fn is_available(&self) -> bool {
        true
    }

    /// Segment `text` into tagged tokens, in order
    fn segment(&self, text: &str) -> Vec<TaggedToken>;
}

/// Absent segmentation capability
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSegmenter;

impl Segmenter for NoSegmenter {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn segment(&self, _text: &str) -> Vec<TaggedToken> {
        Vec::new()
    }
}

/// Chinese segmentation backed by jieba
#[cfg(feature = "jieba")]
pub struct JiebaSegmenter {
    jieba: jieba_rs::Jieba,
}

#[cfg(feature = "jieba")]
impl JiebaSegmenter {
    /// Load the bundled dictionary
    pub fn new() -> Self {
        Self {
            jieba: jieba_rs::Jieba::new(),
        }
    }
}

#[cfg(feature = "jieba")]
impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "jieba")]
impl Segmenter for JiebaSegmenter {
    fn name(&self) -> &'static str {
        "jieba"
    }

    fn segment(&self, text: &str) -> Vec<TaggedToken> {
        self.jieba
            .tag(text, true)
            .into_iter()
            .map(|t| TaggedToken::new(t.word, t.tag))
            .collect()
    }
}

/// Best segmenter this build offers, or `NoSegmenter` when `enabled` is false
pub fn default_segmenter(enabled: bool) -> Box<dyn Segmenter> {
    if !enabled {
        return Box::new(NoSegmenter);
    }

    #[cfg(feature = "jieba")]
    {
        Box::new(JiebaSegmenter::new())
    }

    #[cfg(not(feature = "jieba"))]
    {
        warn!("Segmentation requested but this build has no segmenter (enable the `jieba` feature); using basic extraction");
        Box::new(NoSegmenter)
    }
}
