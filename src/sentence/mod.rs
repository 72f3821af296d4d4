//! Sentences of a cleaned text, and the tokens placed in them.

use crate::token::Token;

mod examples;

pub use examples::{select_examples, ExamplePass, ExampleSentence, EXAMPLE_PASSES};

/// A token and where its surface sits, in bytes from the start of its sentence.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TokenSpan {
    pub token: Token,
    pub start: usize,
    pub len: usize,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Sentence {
    pub text: String,
    /// Byte offset in the whole text.
    pub start: usize,
    pub tokens: Vec<TokenSpan>,
}

impl Sentence {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

fn ends_sentence(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '!' | '?' | '…')
}

fn closes_bracket(c: char) -> bool {
    matches!(c, '」' | '』' | '）' | ')')
}

/// Byte ranges of the sentences of `text`, which they cover without gaps.
///
/// A sentence ends after a run of sentence-ending punctuation and the closing
/// brackets right after it, or after a line break.
pub fn split_sentences(text: &str) -> Vec<(usize, usize)> {
    let mut ranges = vec![];
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((at, c)) = chars.next() {
        let mut end = at + c.len_utf8();
        if c == '\n' {
            ranges.push((start, end));
            start = end;
            continue;
        }
        if !ends_sentence(c) {
            continue;
        }
        while let Some(&(next_at, next)) = chars.peek() {
            if ends_sentence(next) || closes_bracket(next) {
                end = next_at + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }
        ranges.push((start, end));
        start = end;
    }
    if start < text.len() {
        ranges.push((start, text.len()));
    }
    ranges
}

/// Places `tokens`, in text order, into the sentences of `text`.
///
/// Each token is expected where the previous one ended, past any whitespace.
/// Otherwise it is looked for in the rest of the current sentence only, and
/// one that is not there gets an empty span at the cursor. A token reaching
/// past the end of its sentence merges that sentence with the following ones.
pub fn assemble(text: &str, tokens: Vec<Token>) -> Vec<Sentence> {
    let mut sentences: Vec<Sentence> = split_sentences(text)
        .into_iter()
        .map(|(start, end)| Sentence {
            text: text[start..end].to_owned(),
            start,
            tokens: vec![],
        })
        .collect();
    if sentences.is_empty() {
        return sentences;
    }

    let mut cursor = 0;
    let mut current = 0;
    for token in tokens {
        let rest = &text[cursor..];
        cursor += rest.len() - rest.trim_start().len();
        while current + 1 < sentences.len() && cursor >= sentences[current].end() {
            current += 1;
        }
        let surface = token.surface.as_str();
        let found = if surface.is_empty() {
            None
        } else if text[cursor..].starts_with(surface) {
            Some(cursor)
        } else {
            let bound = sentences[current].end().max(cursor);
            text[cursor..bound].find(surface).map(|offset| cursor + offset)
        };
        let (start, len) = found.map_or((cursor, 0), |start| (start, surface.len()));
        cursor = start + len;
        while current + 1 < sentences.len() && start + len > sentences[current].end() {
            let next = sentences.remove(current + 1);
            sentences[current].text.push_str(&next.text);
        }
        let sentence = &mut sentences[current];
        sentence.tokens.push(TokenSpan {
            start: start - sentence.start,
            len,
            token,
        });
    }
    sentences
}
