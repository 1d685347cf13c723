use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A detected entity in one input text.
///
/// Offsets are char offsets; `-1` marks an entity whose text could not be
/// located in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EntityItem {
    #[serde(rename = "Token_ID", alias = "token_id")]
    #[schema(example = "T1")]
    pub token_id: String,
    #[serde(rename = "Label", alias = "label")]
    #[schema(example = "NAME")]
    pub label: String,
    /// Char offset, `-1` if unresolved
    #[serde(rename = "Start", alias = "start")]
    pub start: i64,
    #[serde(rename = "End", alias = "end")]
    pub end: i64,
    #[serde(rename = "Token", alias = "token")]
    pub token: String,
}

impl EntityItem {
    pub fn new(
        token_id: impl Into<String>,
        label: impl Into<String>,
        start: usize,
        end: usize,
        token: impl Into<String>,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            label: label.into(),
            start: start as i64,
            end: end as i64,
            token: token.into(),
        }
    }

    pub fn unresolved(
        token_id: impl Into<String>,
        label: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            token_id: token_id.into(),
            label: label.into(),
            start: -1,
            end: -1,
            token: token.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.start >= 0 && self.end >= self.start
    }

    /// Char span, if resolved.
    pub fn span(&self) -> Option<(usize, usize)> {
        self.is_resolved()
            .then(|| (self.start as usize, self.end as usize))
    }
}

/// One span predicted by a tagger, identified by its surface text and,
/// when the tagger knows them, char offsets relative to the sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSpan {
    pub text: String,
    pub label: String,
    #[serde(default = "default_score")]
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

fn default_score() -> f32 {
    1.0
}

impl TaggedSpan {
    pub fn new(text: impl Into<String>, label: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            score,
            start: None,
            end: None,
        }
    }

    pub fn with_offsets(mut self, start: usize, end: usize) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn offsets(&self) -> Option<(usize, usize)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => None,
        }
    }
}

/// Tagger output for one sentence plus the sentence's char window in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedSentence {
    pub start: usize,
    pub end: usize,
    pub spans: Vec<TaggedSpan>,
}
