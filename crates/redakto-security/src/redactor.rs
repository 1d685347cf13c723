use redakto_core::{CharIndex, EntityItem, RedactionCount, RedactionStyle};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionInfo {
    pub label: String,
    pub count: usize,
}

impl From<RedactionInfo> for RedactionCount {
    fn from(info: RedactionInfo) -> Self {
        RedactionCount {
            label: info.label,
            count: info.count,
        }
    }
}

/// Replaces entity spans in a text
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    style: RedactionStyle,
    placeholder: Option<String>,
}

impl Redactor {
    pub fn new(style: RedactionStyle) -> Self {
        Self {
            style,
            placeholder: None,
        }
    }

    /// Custom replacement for the `label` and `mask` styles; `{label}` is substituted.
    pub fn with_placeholder(mut self, placeholder: Option<String>) -> Self {
        self.placeholder = placeholder;
        self
    }

    fn replacement(&self, label: &str, covered: &str) -> String {
        let template = |default: String| {
            self.placeholder
                .as_ref()
                .map(|p| p.replace("{label}", label))
                .unwrap_or(default)
        };
        match self.style {
            RedactionStyle::Label => template(format!("[REDACTED:{}]", label)),
            RedactionStyle::Mask => template("[REDACTED]".to_string()),
            RedactionStyle::Asterisks => "*".repeat(covered.chars().count()),
            RedactionStyle::Remove => String::new(),
        }
    }

    /// Redact entity spans from `content`.
    ///
    /// Unresolved and out-of-range entities are ignored. Of overlapping spans
    /// the one starting first wins (the longer one on equal starts).
    pub fn redact(&self, content: &str, entities: &[EntityItem]) -> (String, Vec<RedactionInfo>) {
        let index = CharIndex::new(content);

        let mut spans: Vec<(usize, usize, &str)> = entities
            .iter()
            .filter_map(|e| e.span().map(|(s, end)| (s, end, e.label.as_str())))
            .filter(|&(start, end, _)| start < end && end <= index.len())
            .collect();
        spans.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let mut selected = Vec::with_capacity(spans.len());
        let mut last_end = 0;
        for span in spans {
            if span.0 >= last_end {
                last_end = span.1;
                selected.push(span);
            }
        }

        let mut redactions: Vec<RedactionInfo> = Vec::new();
        for &(_, _, label) in &selected {
            match redactions.iter_mut().find(|r| r.label == label) {
                Some(info) => info.count += 1,
                None => redactions.push(RedactionInfo {
                    label: label.to_string(),
                    count: 1,
                }),
            }
        }

        let mut result = content.to_string();
        for &(start, end, label) in selected.iter().rev() {
            let replacement = self.replacement(label, index.slice(start, end));
            result.replace_range(index.byte_of(start)..index.byte_of(end), &replacement);
        }

        (result, redactions)
    }
}
