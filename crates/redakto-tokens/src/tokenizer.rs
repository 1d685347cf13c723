//! Rule-based tokenizer and sentence splitter for German clinical and
//! conversational text.
//!
//! Every token and sentence carries char offsets into the input, so callers
//! never need to search for a sentence again after splitting.

use std::collections::HashSet;

use lazy_static::lazy_static;
use redakto_core::CharIndex;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    // URLs first, then words with inner joiners (e-mails, dates, numbers), then any single symbol.
    static ref TOKEN: Regex = Regex::new(
        r#"(?:https?://|www\.)[^\s<>"]*[^\s<>".,;:!?)\]]|[\p{L}\p{N}]+(?:[-.'’@/:_+&][\p{L}\p{N}]+)*|\S"#
    )
    .unwrap();
}

const GERMAN_ABBREVIATIONS: &[&str] = &[
    "dr.", "fr.", "hr.", "prof.", "z.b.", "bzw.", "ca.", "str.", "nr.", "tel.", "geb.", "gest.",
    "med.", "dipl.", "ing.", "u.a.", "d.h.", "usw.", "vgl.", "evtl.", "ggf.", "inkl.", "bzgl.",
    "z.t.", "o.g.", "v.a.", "u.u.", "pat.", "abt.", "st.", "mr.", "mrs.", "ms.", "jr.", "sr.",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub space_after: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    /// Surface text, `input[start..end]` in chars
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    abbreviations: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Tokenizer with the built-in German abbreviation list.
    pub fn new() -> Self {
        Self::with_abbreviations(GERMAN_ABBREVIATIONS.iter().copied())
    }

    pub fn with_abbreviations<'a>(abbreviations: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            abbreviations: abbreviations
                .into_iter()
                .map(|a| a.to_lowercase())
                .collect(),
        }
    }

    /// Add abbreviations (with their trailing period) on top of the current list.
    pub fn extend_abbreviations<S: AsRef<str>>(mut self, extra: impl IntoIterator<Item = S>) -> Self {
        self.abbreviations
            .extend(extra.into_iter().map(|a| a.as_ref().to_lowercase()));
        self
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        let mut chars = word.chars();
        // Initials like "A." in "A. Meier"
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_alphabetic() {
                return true;
            }
        }
        self.abbreviations
            .contains(&format!("{}.", word.to_lowercase()))
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let index = CharIndex::new(text);
        let mut tokens = Vec::new();
        let mut pos = 0;

        while let Some(m) = TOKEN.find_at(text, pos) {
            let mut end = m.end();
            let word = m.as_str();
            let is_word = word.chars().next().is_some_and(char::is_alphanumeric);
            if is_word && text[end..].starts_with('.') && self.is_abbreviation(word) {
                end += 1;
            }

            tokens.push(Token {
                text: text[m.start()..end].to_string(),
                start: index.char_of(m.start()),
                end: index.char_of(end),
                space_after: text[end..].chars().next().is_some_and(char::is_whitespace),
            });
            pos = end;
        }

        tokens
    }

    /// Split into sentences. A sentence ends after a run of `.`, `!` or `?`
    /// (plus closing quotes or brackets) followed by whitespace or the end of
    /// the text, and before a blank line.
    pub fn split_sentences(&self, text: &str) -> Vec<Sentence> {
        let index = CharIndex::new(text);
        let tokens = self.tokenize(text);
        let mut sentences = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut pending_end = false;

        for (i, token) in tokens.iter().enumerate() {
            if let Some(prev) = current.last() {
                if is_blank_line(index.slice(prev.end, token.start)) {
                    flush(&index, &mut current, &mut sentences);
                    pending_end = false;
                }
            }
            current.push(token.clone());

            pending_end = is_terminal(&token.text) || (pending_end && is_closer(&token.text));
            if pending_end {
                let next = tokens.get(i + 1);
                let run_continues = next.is_some_and(|n| {
                    !token.space_after && (is_terminal(&n.text) || is_closer(&n.text))
                });
                if !run_continues && (next.is_none() || token.space_after) {
                    flush(&index, &mut current, &mut sentences);
                    pending_end = false;
                }
            }
        }
        flush(&index, &mut current, &mut sentences);

        sentences
    }
}

fn is_terminal(token: &str) -> bool {
    matches!(token, "." | "!" | "?" | "…")
}

fn is_closer(token: &str) -> bool {
    matches!(token, "\"" | "'" | ")" | "]" | "»" | "«" | "“" | "”")
}

fn is_blank_line(gap: &str) -> bool {
    gap.matches('\n').count() >= 2
}

fn flush(index: &CharIndex<'_>, current: &mut Vec<Token>, sentences: &mut Vec<Sentence>) {
    let (Some(first), Some(last)) = (current.first(), current.last()) else {
        return;
    };
    let (start, end) = (first.start, last.end);
    sentences.push(Sentence {
        text: index.slice(start, end).to_string(),
        start,
        end,
        tokens: std::mem::take(current),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_char_offsets_with_umlauts() {
        let tokens = Tokenizer::new().tokenize("Müller, Köln.");
        assert_eq!(texts(&tokens), vec!["Müller", ",", "Köln", "."]);
        assert_eq!((tokens[0].start, tokens[0].end), (0, 6));
        assert_eq!((tokens[2].start, tokens[2].end), (8, 12));
        assert!(tokens[1].space_after);
        assert!(!tokens[2].space_after);
    }

    #[test]
    fn test_emails_urls_and_dates_stay_whole() {
        let tokens = Tokenizer::new()
            .tokenize("Mail an max.mustermann@example.de oder https://example.org/a am 01.02.2020.");
        let t = texts(&tokens);
        assert!(t.contains(&"max.mustermann@example.de"));
        assert!(t.contains(&"https://example.org/a"));
        assert!(t.contains(&"01.02.2020"));
        assert_eq!(t.last(), Some(&"."));
    }

    #[test]
    fn test_abbreviations_do_not_end_sentences() {
        let sentences = Tokenizer::new().split_sentences("Dr. Meier kam. Er ging!");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Dr. Meier kam.");
        assert_eq!((sentences[0].start, sentences[0].end), (0, 14));
        assert_eq!(sentences[0].tokens.len(), 4);
        assert!(!sentences[0].tokens[2].space_after);
        assert_eq!((sentences[1].start, sentences[1].end), (15, 23));
    }

    #[test]
    fn test_terminal_runs_and_closing_quotes() {
        let sentences = Tokenizer::new().split_sentences("Wirklich?! Er sagte \"Hallo.\" Dann ging er.");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0].text, "Wirklich?!");
        assert_eq!(sentences[1].text, "Er sagte \"Hallo.\"");
        assert_eq!(sentences[2].text, "Dann ging er.");
    }

    #[test]
    fn test_blank_line_breaks_sentence() {
        let sentences = Tokenizer::new().split_sentences("Befund\n\nDiagnose folgt");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1].start, 8);
        assert_eq!(sentences[1].text, "Diagnose folgt");
    }

    #[test]
    fn test_single_line_break_does_not_split() {
        let sentences = Tokenizer::new().split_sentences("Patient: Max\nMustermann");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_extra_abbreviations() {
        let text = "Siehe Anl. Drei folgt.";
        assert_eq!(Tokenizer::new().split_sentences(text).len(), 2);

        let tokenizer = Tokenizer::new().extend_abbreviations(["Anl."]);
        assert_eq!(tokenizer.split_sentences(text).len(), 1);
    }

    #[test]
    fn test_whitespace_only_has_no_sentences() {
        assert!(Tokenizer::new().split_sentences(" \t\n ").is_empty());
    }

    #[test]
    fn test_boundaries_are_monotonic() {
        let text = "Erster Satz. Zweiter Satz! Dritter?\n\nVierter";
        let sentences = Tokenizer::new().split_sentences(text);
        assert_eq!(sentences.len(), 4);
        for pair in sentences.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        assert!(sentences.iter().all(|s| !s.is_empty()));
    }
}
