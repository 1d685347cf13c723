//! Regex-based tagger

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use redakto_core::{CharIndex, Error, Result, TaggedSpan};
use redakto_security::{PatternRule, PatternRuleSpec, builtin_rules};
use redakto_tokens::Sentence;
use serde::Deserialize;

use crate::loader::ModelLoader;
use crate::tagger::EntityTagger;

/// File with custom rules inside a `local_disk_storage` model directory.
pub const PATTERNS_FILE: &str = "patterns.yml";

pub struct PatternTagger {
    rules: Vec<PatternRule>,
    label_map: HashMap<String, String>,
    min_score: f32,
}

impl PatternTagger {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self {
            rules,
            label_map: HashMap::new(),
            min_score: 0.0,
        }
    }

    /// Tagger with the built-in German PII rules.
    pub fn builtin() -> Result<Self> {
        let rules = builtin_rules()
            .into_iter()
            .map(PatternRuleSpec::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(rules))
    }

    /// Rename rule labels, e.g. `EMAIL` -> `CONTACT_EMAIL`.
    pub fn with_label_map(mut self, label_map: HashMap<String, String>) -> Self {
        self.label_map = label_map;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    fn tag_sentence(&self, sentence: &Sentence) -> Vec<TaggedSpan> {
        let text = sentence.text.as_str();
        let index = CharIndex::new(text);

        let mut matches: Vec<(usize, usize, &PatternRule)> = Vec::new();
        for rule in self.rules.iter().filter(|r| r.score >= self.min_score) {
            for caps in rule.regex.captures_iter(text) {
                if let Some(m) = caps.get(rule.group).filter(|m| !m.is_empty()) {
                    matches.push((m.start(), m.end(), rule));
                }
            }
        }
        matches.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut spans = Vec::new();
        let mut last_end = 0;
        for (start, end, rule) in matches {
            if start < last_end {
                continue;
            }
            last_end = end;
            let label = self
                .label_map
                .get(&rule.label)
                .cloned()
                .unwrap_or_else(|| rule.label.clone());
            spans.push(
                TaggedSpan::new(&text[start..end], label, rule.score)
                    .with_offsets(index.char_of(start), index.char_of(end)),
            );
        }
        spans
    }
}

#[async_trait]
impl EntityTagger for PatternTagger {
    async fn tag(&self, sentences: &[Sentence]) -> Result<Vec<Vec<TaggedSpan>>> {
        Ok(sentences.iter().map(|s| self.tag_sentence(s)).collect())
    }

    fn name(&self) -> &str {
        "pattern-tagger"
    }
}

#[derive(Debug, Deserialize)]
struct PatternsFile {
    patterns: Vec<PatternRuleSpec>,
}

/// Where a pattern tagger takes its rules from.
#[derive(Debug, Clone)]
pub enum PatternSource {
    Builtin,
    /// Model directory containing `patterns.yml`
    Directory(PathBuf),
}

pub struct PatternTaggerLoader {
    source: PatternSource,
    name_or_path: String,
    label_map: HashMap<String, String>,
    min_score: f32,
}

impl PatternTaggerLoader {
    pub fn new(source: PatternSource) -> Self {
        let name_or_path = match &source {
            PatternSource::Builtin => "builtin".to_string(),
            PatternSource::Directory(dir) => dir.display().to_string(),
        };
        Self {
            source,
            name_or_path,
            label_map: HashMap::new(),
            min_score: 0.0,
        }
    }

    pub fn with_label_map(mut self, label_map: HashMap<String, String>) -> Self {
        self.label_map = label_map;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    async fn load_rules(&self, dir: &Path) -> Result<Vec<PatternRule>> {
        let path = dir.join(PATTERNS_FILE);
        let load_error = |reason: String| Error::ModelLoad {
            model_name_or_path: self.name_or_path.clone(),
            reason,
        };

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| load_error(format!("{}: {}", path.display(), e)))?;
        let file: PatternsFile = serde_yaml::from_str(&content)
            .map_err(|e| load_error(format!("{}: {}", path.display(), e)))?;

        file.patterns
            .into_iter()
            .map(|spec| spec.compile().map_err(|e| load_error(e.to_string())))
            .collect()
    }
}

#[async_trait]
impl ModelLoader for PatternTaggerLoader {
    fn name_or_path(&self) -> &str {
        &self.name_or_path
    }

    fn strategy(&self) -> &str {
        match self.source {
            PatternSource::Builtin => "builtin",
            PatternSource::Directory(_) => "local_disk_storage",
        }
    }

    async fn load(&self) -> Result<Arc<dyn EntityTagger>> {
        let tagger = match &self.source {
            PatternSource::Builtin => PatternTagger::builtin()?,
            PatternSource::Directory(dir) => PatternTagger::new(self.load_rules(dir).await?),
        };
        Ok(Arc::new(
            tagger
                .with_label_map(self.label_map.clone())
                .with_min_score(self.min_score),
        ))
    }
}
