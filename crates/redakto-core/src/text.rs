//! Character-offset view over a string.
//!
//! All offsets exchanged over the API are Unicode scalar offsets. `CharIndex`
//! converts between those and the byte offsets Rust string slicing needs.

#[derive(Debug, Clone)]
pub struct CharIndex<'a> {
    text: &'a str,
    /// Byte offset of every char, followed by `text.len()`.
    offsets: Vec<usize>,
}

impl<'a> CharIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Number of chars in the text.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset of a char offset, clamped to the end of the text.
    pub fn byte_of(&self, char_idx: usize) -> usize {
        self.offsets[char_idx.min(self.len())]
    }

    /// Char offset of a byte offset on a char boundary.
    pub fn char_of(&self, byte_idx: usize) -> usize {
        match self.offsets.binary_search(&byte_idx) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    /// Slice by char offsets (clamped).
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.max(start);
        &self.text[self.byte_of(start)..self.byte_of(end)]
    }

    /// Find `needle` fully contained in chars `[from, to)`; returns the char offset.
    pub fn find(&self, needle: &str, from: usize, to: usize) -> Option<usize> {
        if from > to || from > self.len() {
            return None;
        }
        let start_byte = self.byte_of(from);
        self.slice(from, to)
            .find(needle)
            .map(|b| self.char_of(start_byte + b))
    }
}

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Collapse every whitespace run to a single space.
pub fn normalize_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}
