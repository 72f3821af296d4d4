use log::trace;
use serde::{Deserialize, Serialize};

use super::{is_hiragana, is_kanji, is_katakana};

/// Segmentation hint understood by every tokenizer: a plain space becomes a
/// whitespace morpheme, which no morpheme can straddle.
pub const BOUNDARY: char = ' ';

/// Sequences the tokenizer reliably cuts in the wrong place, with the hint
/// that splits them correctly.
pub const DEFAULT_SUBSTITUTIONS: &[(&str, &str)] = &[
    ("はずだ", "はず だ"),
    ("わけだ", "わけ だ"),
    ("ことだ", "こと だ"),
    ("ものだ", "もの だ"),
    ("ようだ", "よう だ"),
    ("ところだ", "ところ だ"),
];

const SENTENCE_ENDS: &str = "。！？…";
const BRACKETS: &str = "「」『』（）";
const PUNCTUATION: &str = "。、！？「」『』（）…ー〜・";

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

/// Cleans raw text before it reaches the tokenizer.
#[derive(Clone, Debug)]
pub struct Preprocessor {
    substitutions: Vec<Substitution>,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Preprocessor::new(&[])
    }
}

impl Preprocessor {
    /// Built-in table followed by `extra`.
    pub fn new(extra: &[Substitution]) -> Self {
        let substitutions = DEFAULT_SUBSTITUTIONS
            .iter()
            .map(|(from, to)| Substitution {
                from: from.to_string(),
                to: to.to_string(),
            })
            .chain(extra.iter().cloned())
            .filter(|s| !s.from.is_empty())
            .collect();
        Preprocessor { substitutions }
    }

    pub fn clean(&self, text: &str) -> String {
        let mut cleaned = String::with_capacity(text.len() + text.len() / 4);
        let mut chars = text.chars().map(normalize_char).peekable();
        while let Some(c) = chars.next() {
            if !is_allowed(c) {
                cleaned.push(BOUNDARY);
                continue;
            }
            if is_repeated_elongation(&cleaned, c) {
                continue;
            }
            if BRACKETS.contains(c) {
                cleaned.push(BOUNDARY);
                cleaned.push(c);
                cleaned.push(BOUNDARY);
                continue;
            }
            cleaned.push(c);
            if SENTENCE_ENDS.contains(c) {
                let run_continues = chars
                    .peek()
                    .map_or(false, |next| SENTENCE_ENDS.contains(*next) || BRACKETS.contains(*next));
                if !run_continues {
                    cleaned.push(BOUNDARY);
                }
            }
        }

        for substitution in &self.substitutions {
            if cleaned.contains(&substitution.from) {
                cleaned = cleaned.replace(&substitution.from, &substitution.to);
            }
        }

        let collapsed = collapse_boundaries(&cleaned);
        trace!("preprocessed {} chars into {} chars", text.chars().count(), collapsed.chars().count());
        collapsed
    }
}

fn normalize_char(c: char) -> char {
    match c {
        '!' => '！',
        '?' => '？',
        '～' => '〜',
        '\r' | '\t' => BOUNDARY,
        _ => c,
    }
}

fn is_allowed(c: char) -> bool {
    is_hiragana(c)
        || is_katakana(c)
        || is_kanji(c)
        || ('\u{ff10}'..='\u{ff19}').contains(&c) // fullwidth digits
        || ('\u{ff21}'..='\u{ff3a}').contains(&c) // fullwidth upper case
        || ('\u{ff41}'..='\u{ff5a}').contains(&c) // fullwidth lower case
        || PUNCTUATION.contains(c)
        || c == '\n'
}

fn is_repeated_elongation(cleaned: &str, c: char) -> bool {
    matches!(c, 'ー' | '〜') && cleaned.ends_with(c)
}

fn collapse_boundaries(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    for c in text.chars() {
        let after_space = collapsed.ends_with(BOUNDARY) || collapsed.ends_with('\n') || collapsed.is_empty();
        if c == BOUNDARY && after_space {
            continue;
        }
        if c == '\n' && collapsed.ends_with(BOUNDARY) {
            collapsed.pop();
        }
        collapsed.push(c);
    }
    while collapsed.ends_with(BOUNDARY) {
        collapsed.pop();
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disallowed_runs_become_one_boundary() {
        let preprocessor = Preprocessor::default();
        assert_eq!(preprocessor.clean("abc日本def語"), "日本 語");
        assert_eq!(preprocessor.clean("♪♪♪です"), "です");
    }

    #[test]
    fn punctuation_gets_hints() {
        let preprocessor = Preprocessor::default();
        assert_eq!(preprocessor.clean("「はい」と言った。そう！？"), "「 はい 」 と言った。 そう！？");
        assert_eq!(preprocessor.clean("本当?"), "本当？");
    }

    #[test]
    fn elongation_collapses() {
        let preprocessor = Preprocessor::default();
        assert_eq!(preprocessor.clean("すごーーーい〜〜"), "すごーい〜");
    }

    #[test]
    fn substitutions_are_data() {
        let preprocessor = Preprocessor::new(&[Substitution {
            from: "なんだ".to_owned(),
            to: "なん だ".to_owned(),
        }]);
        assert_eq!(preprocessor.clean("行くはずだ"), "行くはず だ");
        assert_eq!(preprocessor.clean("なんだ"), "なん だ");
    }

    #[test]
    fn newlines_survive() {
        let preprocessor = Preprocessor::default();
        assert_eq!(preprocessor.clean("一行目。\n二行目"), "一行目。\n二行目");
    }
}
