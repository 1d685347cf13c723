//! Sequence tagger served over HTTP.
//!
//! Request: `{"model": "<name>", "sentences": ["sentence text", ...]}`
//! Response: `{"sentences": [[{"text", "label", "score", "start"?, "end"?}, ...], ...]}`
//!
//! Sentences are sent as they appear in the input, so optional `start`/`end`
//! char offsets in the response are relative to the sentence text.

use std::sync::Arc;

use async_trait::async_trait;
use redakto_core::{Error, Result, TaggedSpan};
use redakto_tokens::Sentence;
use serde::{Deserialize, Serialize};

use crate::loader::ModelLoader;
use crate::tagger::EntityTagger;

#[derive(Debug, Serialize)]
struct TagRequest<'a> {
    model: &'a str,
    sentences: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    sentences: Vec<Vec<TaggedSpan>>,
}

pub struct RemoteSequenceTagger {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl RemoteSequenceTagger {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl EntityTagger for RemoteSequenceTagger {
    async fn tag(&self, sentences: &[Sentence]) -> Result<Vec<Vec<TaggedSpan>>> {
        if sentences.is_empty() {
            return Ok(Vec::new());
        }

        let request = TagRequest {
            model: &self.model,
            sentences: sentences.iter().map(|s| s.text.clone()).collect(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Prediction(format!("Tagger request to {} failed: {}", self.endpoint, e)))?;

        if !response.status().is_success() {
            return Err(Error::Prediction(format!(
                "Tagger at {} returned HTTP {}",
                self.endpoint,
                response.status()
            )));
        }

        let body: TagResponse = response
            .json()
            .await
            .map_err(|e| Error::Prediction(format!("Invalid tagger response: {}", e)))?;

        if body.sentences.len() != sentences.len() {
            return Err(Error::Prediction(format!(
                "Tagger returned {} sentences for {} inputs",
                body.sentences.len(),
                sentences.len()
            )));
        }

        Ok(body.sentences)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Loader for models served by a remote tagger. Loading only binds the
/// endpoint; the remote side owns the weights.
pub struct RemoteTaggerLoader {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    strategy: String,
}

impl RemoteTaggerLoader {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            strategy: strategy.into(),
        }
    }
}

#[async_trait]
impl ModelLoader for RemoteTaggerLoader {
    fn name_or_path(&self) -> &str {
        &self.model
    }

    fn strategy(&self) -> &str {
        &self.strategy
    }

    async fn load(&self) -> Result<Arc<dyn EntityTagger>> {
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(Error::ModelLoad {
                model_name_or_path: self.model.clone(),
                reason: format!("Endpoint must start with http:// or https://: {}", self.endpoint),
            });
        }
        Ok(Arc::new(RemoteSequenceTagger::new(
            self.client.clone(),
            self.endpoint.clone(),
            self.model.clone(),
        )))
    }
}
