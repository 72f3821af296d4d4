use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::Sentence;
use crate::{dictionary::EntryId, resolve::ResolvedWord, text::char_len, token::Token};

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ExampleSentence {
    pub text: String,
    /// (entry id, reading index) of the words this sentence illustrates.
    pub words: Vec<(EntryId, u8)>,
}

/// Sentence lengths in characters, and how far into the text a sentence
/// may start, as a fraction of the text's length.
#[derive(Clone, Copy, Debug)]
pub struct ExamplePass {
    pub min_len: usize,
    pub max_len: usize,
    pub cutoff: f64,
}

pub const EXAMPLE_PASSES: [ExamplePass; 3] = [
    ExamplePass { min_len: 10, max_len: 25, cutoff: 0.25 },
    ExamplePass { min_len: 8, max_len: 40, cutoff: 0.60 },
    ExamplePass { min_len: 5, max_len: 80, cutoff: 1.0 },
];

type WordKey = (EntryId, u8);

/// Words of the pool a token stands for.
fn words_of(token: &Token, resolved: &[WordKey], words: &[ResolvedWord], pool: &HashSet<WordKey>) -> Vec<WordKey> {
    let direct: Vec<WordKey> = resolved.iter().copied().filter(|k| pool.contains(k)).collect();
    if !direct.is_empty() {
        return direct;
    }
    let available = move || {
        words
            .iter()
            .filter(move |w| pool.contains(&w.key()) && w.surface == token.surface)
    };
    let fallback = available()
        .find(|w| w.pos.contains(&token.pos) && !token.reading.is_empty() && w.reading == token.reading)
        .or_else(|| available().find(|w| w.pos.contains(&token.pos)))
        .or_else(|| {
            if token.is_name_like() && token.person_name_context {
                available().next()
            } else {
                None
            }
        });
    fallback.map(ResolvedWord::key).into_iter().collect()
}

/// Picks sentences illustrating `words`, each word at most once.
///
/// `resolved[s][t]` lists the words token `t` of sentence `s` resolved to.
/// Every pass takes the longest untouched sentence within its bounds until
/// none is left, and everything stops once every word has its example.
pub fn select_examples(
    sentences: &[Sentence],
    resolved: &[Vec<Vec<WordKey>>],
    words: &[ResolvedWord],
) -> Vec<ExampleSentence> {
    let mut pool: HashSet<WordKey> = words.iter().map(ResolvedWord::key).collect();
    let mut used = vec![false; sentences.len()];
    let mut examples = vec![];
    let text_len = sentences.last().map_or(0, Sentence::end);

    for pass in EXAMPLE_PASSES {
        let cutoff = (text_len as f64 * pass.cutoff).ceil() as usize;
        while !pool.is_empty() {
            let pick = sentences
                .iter()
                .enumerate()
                .filter(|(i, s)| {
                    let len = char_len(s.text.trim());
                    !used[*i] && s.start < cutoff && (pass.min_len..=pass.max_len).contains(&len)
                })
                .max_by_key(|(i, s)| (char_len(s.text.trim()), std::cmp::Reverse(*i)));
            let (i, sentence) = match pick {
                Some(pick) => pick,
                None => break,
            };
            used[i] = true;

            let mut found = vec![];
            for (t, span) in sentence.tokens.iter().enumerate() {
                let keys = resolved.get(i).and_then(|r| r.get(t)).map_or(&[][..], Vec::as_slice);
                for key in words_of(&span.token, keys, words, &pool) {
                    if pool.remove(&key) {
                        found.push(key);
                    }
                }
            }
            if !found.is_empty() {
                examples.push(ExampleSentence {
                    text: sentence.text.trim().to_owned(),
                    words: found,
                });
            }
        }
        if pool.is_empty() {
            break;
        }
    }
    examples
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use morph::{PartOfSpeech, PosSection, PosSections};

    use super::*;
    use crate::{resolve::Origin, sentence::TokenSpan};

    fn sentence(start: usize, text: &str, tokens: &[&str]) -> Sentence {
        Sentence {
            text: text.to_owned(),
            start,
            tokens: tokens
                .iter()
                .map(|s| TokenSpan {
                    token: Token::new(s, PartOfSpeech::Noun),
                    start: 0,
                    len: s.len(),
                })
                .collect(),
        }
    }

    fn word(entry_id: EntryId, surface: &str) -> ResolvedWord {
        ResolvedWord {
            entry_id,
            reading_index: 0,
            surface: surface.to_owned(),
            occurrences: 1,
            conjugations: vec![],
            pos: BTreeSet::from([PartOfSpeech::Noun]),
            origin: Origin::Direct,
            reading: String::new(),
        }
    }

    #[test]
    fn longest_early_sentence_wins() {
        let short = "猫がいる。";
        let long = "猫と犬がいつも一緒に遊んでいる。";
        let sentences = vec![sentence(0, short, &["猫"]), sentence(short.len(), long, &["猫", "犬"])];
        let resolved = vec![vec![vec![(1, 0)]], vec![vec![(1, 0)], vec![(2, 0)]]];
        let words = vec![word(1, "猫"), word(2, "犬")];
        let examples = select_examples(&sentences, &resolved, &words);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].text, long);
        assert_eq!(examples[0].words, vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn every_word_appears_once() {
        let first = "今日は朝から猫を見た。";
        let second = "猫はまだそこにいる。";
        let sentences = vec![sentence(0, first, &["猫"]), sentence(first.len(), second, &["猫", "そこ"])];
        let resolved = vec![vec![vec![(1, 0)]], vec![vec![(1, 0)], vec![(3, 0)]]];
        let words = vec![word(1, "猫"), word(3, "そこ")];
        let examples = select_examples(&sentences, &resolved, &words);
        let listed: Vec<WordKey> = examples.iter().flat_map(|e| e.words.clone()).collect();
        assert_eq!(listed.len(), 2);
        assert!(listed.contains(&(1, 0)) && listed.contains(&(3, 0)));
    }

    #[test]
    fn unresolved_tokens_fall_back_to_their_surface() {
        let pool: HashSet<WordKey> = [(1, 0), (5, 0)].into_iter().collect();
        let mut tanaka = word(5, "田中");
        tanaka.pos = BTreeSet::from([PartOfSpeech::Pronoun]);
        let words = vec![word(1, "猫"), tanaka];
        assert_eq!(words_of(&Token::new("猫", PartOfSpeech::Noun), &[], &words, &pool), vec![(1, 0)]);
        assert!(words_of(&Token::new("猫", PartOfSpeech::Verb), &[], &words, &pool).is_empty());

        let mut name = Token::new("田中", PartOfSpeech::Noun)
            .with_sections(PosSections::empty().with(PosSection::ProperNoun));
        assert!(words_of(&name, &[], &words, &pool).is_empty());
        name.person_name_context = true;
        assert_eq!(words_of(&name, &[], &words, &pool), vec![(5, 0)]);
    }
}
