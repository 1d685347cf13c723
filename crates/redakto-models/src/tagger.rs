//! Tagger trait

use async_trait::async_trait;
use redakto_core::{Result, TaggedSpan};
use redakto_tokens::Sentence;

/// Labels entity spans in tokenized sentences.
#[async_trait]
pub trait EntityTagger: Send + Sync {
    /// Tag all sentences; returns one span list per sentence, in order.
    async fn tag(&self, sentences: &[Sentence]) -> Result<Vec<Vec<TaggedSpan>>>;

    /// Short name for logs
    fn name(&self) -> &str;
}
