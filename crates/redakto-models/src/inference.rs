use std::sync::Arc;

use redakto_core::{Error, Result, TaggedSentence};
use redakto_tokens::Tokenizer;

use crate::loader::ModelLoader;

/// Runs one model over raw text: sentence splitting, tagging, and pairing
/// each sentence's spans with its char window.
pub struct InferenceMaker {
    loader: Arc<dyn ModelLoader>,
    tokenizer: Tokenizer,
}

impl InferenceMaker {
    pub fn new(loader: Arc<dyn ModelLoader>, tokenizer: Tokenizer) -> Self {
        Self { loader, tokenizer }
    }

    pub fn loader(&self) -> &dyn ModelLoader {
        self.loader.as_ref()
    }

    pub async fn infer(&self, text: &str) -> Result<Vec<TaggedSentence>> {
        let sentences = self.tokenizer.split_sentences(text);
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let tagger = self.loader.load().await?;
        let tagged = tagger.tag(&sentences).await?;
        if tagged.len() != sentences.len() {
            return Err(Error::Prediction(format!(
                "{} returned {} results for {} sentences",
                tagger.name(),
                tagged.len(),
                sentences.len()
            )));
        }

        Ok(sentences
            .into_iter()
            .zip(tagged)
            .map(|(sentence, spans)| TaggedSentence {
                start: sentence.start,
                end: sentence.end,
                spans,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::CachedModelLoader;
    use crate::pattern::{PatternSource, PatternTaggerLoader};

    fn maker() -> InferenceMaker {
        let loader = CachedModelLoader::new(PatternTaggerLoader::new(PatternSource::Builtin));
        InferenceMaker::new(Arc::new(loader), Tokenizer::new())
    }

    #[tokio::test]
    async fn test_sentence_windows_are_kept() {
        let text = "Termin am 01.02.2020. Rückruf unter Tel. 030 123456.";
        let sentences = maker().infer(text).await.unwrap();

        assert_eq!(sentences.len(), 2);
        assert_eq!((sentences[0].start, sentences[0].end), (0, 21));
        assert_eq!(sentences[0].spans[0].label, "DATE");
        assert_eq!(sentences[1].start, 22);
        assert_eq!(sentences[1].spans[0].text, "030 123456");
    }

    #[tokio::test]
    async fn test_blank_text_has_no_sentences() {
        assert!(maker().infer("   ").await.unwrap().is_empty());
    }
}
