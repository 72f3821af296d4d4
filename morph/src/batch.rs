use anyhow::{bail, Result};
use log::debug;

use crate::{MorphAnalyzer, Morpheme, PartOfSpeech};

/// Joins batched texts for a single tokenizer call. Cleaned text never
/// contains fullwidth number signs, so the delimiter cannot collide.
pub const BATCH_DELIMITER: &str = "＃＃＃";

pub fn join_batch(texts: &[String]) -> String {
    texts.join(&format!(" {} ", BATCH_DELIMITER))
}

/// Splits a batched morpheme stream back into one stream per input text.
///
/// The tokenizer may cut the delimiter into several morphemes, so a run of
/// morphemes is only treated as a delimiter once their surfaces add up to it.
pub fn split_batch(morphemes: Vec<Morpheme>, expected: usize) -> Result<Vec<Vec<Morpheme>>> {
    let mut segments = Vec::with_capacity(expected);
    let mut current: Vec<Morpheme> = vec![];
    let mut pending: Vec<Morpheme> = vec![];
    let mut pending_text = String::new();

    for morpheme in morphemes {
        let candidate = format!("{}{}", pending_text, morpheme.surface);
        if BATCH_DELIMITER.starts_with(&candidate) {
            pending.push(morpheme);
            pending_text = candidate;
        } else {
            current.append(&mut pending);
            pending_text.clear();
            if BATCH_DELIMITER.starts_with(&morpheme.surface) {
                pending_text.push_str(&morpheme.surface);
                pending.push(morpheme);
            } else {
                current.push(morpheme);
            }
        }

        if pending_text == BATCH_DELIMITER {
            pending.clear();
            pending_text.clear();
            segments.push(trim_whitespace(std::mem::take(&mut current)));
        }
    }
    current.append(&mut pending);
    segments.push(trim_whitespace(current));

    if segments.len() != expected {
        bail!(
            "tokenizer output holds {} texts, expected {}",
            segments.len(),
            expected
        );
    }
    Ok(segments)
}

fn trim_whitespace(mut segment: Vec<Morpheme>) -> Vec<Morpheme> {
    while segment.last().map_or(false, |m| m.pos == PartOfSpeech::Whitespace) {
        segment.pop();
    }
    let leading = segment
        .iter()
        .take_while(|m| m.pos == PartOfSpeech::Whitespace)
        .count();
    segment.drain(..leading);
    segment
}

/// Tokenizes several texts with one call to `analyzer`.
pub async fn analyze_batch(analyzer: &dyn MorphAnalyzer, texts: &[String]) -> Result<Vec<Vec<Morpheme>>> {
    match texts.len() {
        0 => Ok(vec![]),
        1 => Ok(vec![analyzer.analyze(&texts[0]).await?]),
        n => {
            let joined = join_batch(texts);
            debug!("tokenizing {} texts in one call ({} bytes)", n, joined.len());
            split_batch(analyzer.analyze(&joined).await?, n)
        }
    }
}
