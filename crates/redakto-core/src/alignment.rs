//! Alignment of tagger output to char offsets in the input text.
//!
//! Spans that carry sentence-relative offsets are placed there directly.
//! Spans known only by surface text are searched left to right with a
//! cursor so repeated surface forms map to successive occurrences.

use crate::entity::{EntityItem, TaggedSentence, TaggedSpan};
use crate::text::{CharIndex, char_len, normalize_whitespace};

/// Resolve predicted spans of all sentences into numbered entity items.
///
/// Token ids are `T1, T2, ...` in emission order. Spans without whitespace
/// that cannot be found are kept as unresolved items; multi-word spans that
/// cannot be matched even after whitespace normalization are dropped.
pub fn align_entities(text: &str, sentences: &[TaggedSentence]) -> Vec<EntityItem> {
    let index = CharIndex::new(text);
    let mut items = Vec::new();
    let mut token_id = 0usize;

    for sentence in sentences {
        let window_end = sentence.end.min(index.len());
        let mut cursor = sentence.start.min(window_end);

        for span in &sentence.spans {
            let located = locate_by_offsets(&index, span, sentence.start, window_end)
                .or_else(|| {
                    index
                        .find(&span.text, cursor, window_end)
                        .map(|start| (start, start + char_len(&span.text)))
                })
                .or_else(|| {
                    span.text
                        .chars()
                        .any(char::is_whitespace)
                        .then(|| find_by_boundary_tokens(&index, &span.text, cursor, window_end))
                        .flatten()
                });

            match located {
                Some((start, end)) => {
                    token_id += 1;
                    cursor = cursor.max(end);
                    items.push(EntityItem::new(
                        format!("T{}", token_id),
                        &span.label,
                        start,
                        end,
                        index.slice(start, end),
                    ));
                }
                // Multi-word spans that cannot be placed are dropped.
                None if span.text.chars().any(char::is_whitespace) => {}
                None => {
                    token_id += 1;
                    items.push(EntityItem::unresolved(
                        format!("T{}", token_id),
                        &span.label,
                        &span.text,
                    ));
                }
            }
        }
    }

    items
}

/// Place a span by its reported offsets if they fall inside the sentence
/// window and the text there matches the reported surface form.
fn locate_by_offsets(
    index: &CharIndex<'_>,
    span: &TaggedSpan,
    sentence_start: usize,
    window_end: usize,
) -> Option<(usize, usize)> {
    let (start, end) = span.offsets()?;
    let (start, end) = (sentence_start + start, sentence_start + end);
    if end > window_end {
        return None;
    }
    let found = index.slice(start, end);
    (found == span.text || normalize_whitespace(found) == normalize_whitespace(&span.text))
        .then_some((start, end))
}

/// Locate a multi-word prediction whose whitespace differs from the input,
/// e.g. a line break inside a name.
fn find_by_boundary_tokens(
    index: &CharIndex<'_>,
    predicted: &str,
    cursor: usize,
    window_end: usize,
) -> Option<(usize, usize)> {
    let tokens: Vec<&str> = predicted.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let first = tokens[0];
    let last = tokens[tokens.len() - 1];

    let first_pos = index.find(first, cursor, window_end)?;
    let last_pos = index.find(last, first_pos + char_len(first), window_end)?;

    let start = first_pos;
    let end = last_pos + char_len(last);
    let extracted = index.slice(start, end);

    (normalize_whitespace(extracted) == normalize_whitespace(predicted)).then_some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::TaggedSpan;

    fn sentence(start: usize, end: usize, spans: &[(&str, &str)]) -> TaggedSentence {
        TaggedSentence {
            start,
            end,
            spans: spans
                .iter()
                .map(|(t, l)| TaggedSpan::new(*t, *l, 1.0))
                .collect(),
        }
    }

    #[test]
    fn test_exact_matches_advance_cursor() {
        let text = "Anna trifft Anna in Köln.";
        let sentences = vec![sentence(0, 25, &[("Anna", "NAME"), ("Anna", "NAME"), ("Köln", "CITY")])];

        let items = align_entities(text, &sentences);
        assert_eq!(items.len(), 3);
        assert_eq!((items[0].start, items[0].end), (0, 4));
        assert_eq!((items[1].start, items[1].end), (12, 16));
        assert_eq!(items[2].token, "Köln");
        assert_eq!(items[2].token_id, "T3");
    }

    #[test]
    fn test_whitespace_fallback_matches_line_break() {
        let text = "Patient: Max\nMustermann, geb. 01.02.1960";
        let sentences = vec![sentence(0, text.chars().count(), &[("Max Mustermann", "NAME_PATIENT")])];

        let items = align_entities(text, &sentences);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].start, 9);
        assert_eq!(items[0].end, 23);
        assert_eq!(items[0].token, "Max\nMustermann");
    }

    #[test]
    fn test_missing_single_word_is_unresolved() {
        let text = "Hallo Welt";
        let sentences = vec![sentence(0, 10, &[("Berlin", "CITY")])];

        let items = align_entities(text, &sentences);
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_resolved());
        assert_eq!(items[0].token, "Berlin");
    }

    #[test]
    fn test_missing_multi_word_is_dropped() {
        let text = "Hallo Welt";
        let sentences = vec![sentence(0, 10, &[("Max Mustermann", "NAME"), ("Welt", "LOC")])];

        let items = align_entities(text, &sentences);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].token_id, "T1");
        assert_eq!(items[0].label, "LOC");
    }

    #[test]
    fn test_reported_offsets_win_over_earlier_occurrence() {
        let text = "Kennung 10115, Anschrift 10115 Berlin";
        let sentences = vec![TaggedSentence {
            start: 0,
            end: 37,
            spans: vec![
                TaggedSpan::new("10115", "ZIP", 1.0).with_offsets(25, 30),
                TaggedSpan::new("Berlin", "CITY", 1.0).with_offsets(31, 37),
            ],
        }];

        let items = align_entities(text, &sentences);
        assert_eq!((items[0].start, items[0].end), (25, 30));
        assert_eq!((items[1].start, items[1].end), (31, 37));
    }

    #[test]
    fn test_offsets_are_relative_to_sentence() {
        let text = "Erster Satz. Anna und Anna.";
        let sentences = vec![TaggedSentence {
            start: 13,
            end: 27,
            spans: vec![TaggedSpan::new("Anna", "NAME", 1.0).with_offsets(9, 13)],
        }];

        let items = align_entities(text, &sentences);
        assert_eq!((items[0].start, items[0].end), (22, 26));
    }

    #[test]
    fn test_mismatched_offsets_fall_back_to_search() {
        let text = "Anna wohnt in Köln.";
        let sentences = vec![TaggedSentence {
            start: 0,
            end: 19,
            spans: vec![TaggedSpan::new("Köln", "CITY", 1.0).with_offsets(0, 4)],
        }];

        let items = align_entities(text, &sentences);
        assert_eq!((items[0].start, items[0].end), (14, 18));
    }

    #[test]
    fn test_multi_word_span_with_inner_punctuation() {
        let text = "Patientin Meier, Anna kam";
        let sentences = vec![sentence(0, 25, &[("Meier, Anna", "NAME_PATIENT")])];

        let items = align_entities(text, &sentences);
        assert_eq!(items.len(), 1);
        assert_eq!((items[0].start, items[0].end), (10, 21));
    }

    #[test]
    fn test_search_is_limited_to_sentence_window() {
        let text = "Erster Satz. Berlin ist groß.";
        let sentences = vec![
            sentence(0, 12, &[("Berlin", "CITY")]),
            sentence(13, 29, &[("Berlin", "CITY")]),
        ];

        let items = align_entities(text, &sentences);
        assert!(!items[0].is_resolved());
        assert_eq!(items[1].start, 13);
    }
}
