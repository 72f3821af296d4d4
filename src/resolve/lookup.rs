use std::{collections::HashSet, sync::Arc};

use anyhow::Result;
use log::trace;
use morph::PartOfSpeech;

use super::{
    score::{rank, score, ScoreInput},
    Origin, Resolver,
};
use crate::{
    deconjugate::ConjTag,
    dictionary::{DictEntry, DictPos, EntryId},
    text::{char_len, fold_long_vowels, has_elongation, strip_elongation, to_hiragana},
    token::Token,
};

/// The best (entry, form) pair found for a token.
#[derive(Clone, Debug)]
pub struct Match {
    pub entry: Arc<DictEntry>,
    pub reading_index: u8,
    pub conjugations: Vec<String>,
    pub origin: Origin,
    pub score: i32,
}

impl Match {
    fn better_than(&self, other: &Match) -> bool {
        rank(
            (self.score, self.entry.id, self.reading_index),
            (other.score, other.entry.id, other.reading_index),
        )
        .is_lt()
    }
}

fn keep_best(best: &mut Option<Match>, candidate: Match) {
    if best.as_ref().map_or(true, |b| candidate.better_than(b)) {
        *best = Some(candidate);
    }
}

/// Strings a token's surface may be listed under.
pub(super) fn direct_keys(surface: &str) -> Vec<String> {
    let hiragana = to_hiragana(surface);
    let folded = fold_long_vowels(&hiragana);
    let mut keys = vec![surface.to_owned(), hiragana, folded];
    if has_elongation(surface) {
        let stripped = strip_elongation(surface);
        if char_len(&stripped) >= 2 {
            keys.push(to_hiragana(&stripped));
            keys.push(stripped);
        }
    }
    let mut seen = HashSet::new();
    keys.retain(|k| !k.is_empty() && seen.insert(k.clone()));
    keys
}

fn form_matches(text: &str, keys: &[String]) -> bool {
    let hiragana = to_hiragana(text);
    keys.iter().any(|k| *k == text || *k == hiragana || *k == fold_long_vowels(&hiragana))
}

/// Whether `token.pos` has a say in which entries a conjugation may reach.
fn constrains(pos: PartOfSpeech) -> bool {
    !matches!(pos, PartOfSpeech::Auxiliary | PartOfSpeech::Unknown | PartOfSpeech::Expression)
}

impl Resolver {
    fn collect_ids(&self, keys: &[String]) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = keys.iter().flat_map(|k| self.lexicon.candidates(k)).copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn score_entry(
        &self,
        best: &mut Option<Match>,
        entry: &Arc<DictEntry>,
        keys: &[String],
        input: &ScoreInput,
        conjugations: &[String],
        origin: Origin,
    ) {
        for form in entry.forms.iter().filter(|f| form_matches(&f.text, keys)) {
            let total = score(entry, form, input).total();
            keep_best(
                best,
                Match {
                    entry: entry.clone(),
                    reading_index: form.reading_index,
                    conjugations: conjugations.to_vec(),
                    origin,
                    score: total,
                },
            );
        }
    }

    /// Looks the surface and its spelling variants up as they are.
    pub(super) async fn direct_lookup(&self, token: &Token, origin: Origin) -> Result<Option<Match>> {
        let keys = direct_keys(&token.surface);
        let ids = self.collect_ids(&keys);
        if ids.is_empty() {
            return Ok(None);
        }
        let entries = self.lexicon.entries(&ids).await?;
        let any_common = entries.iter().any(|e| !e.is_name_only());
        let (names, common): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .filter(|e| e.accepts(token.pos))
            .partition(|e| e.is_name_only());
        let pool = if token.person_name_context && !names.is_empty() {
            names
        } else if !common.is_empty() {
            common
        } else if !any_common {
            names
        } else {
            vec![]
        };
        let input = ScoreInput {
            surface: &token.surface,
            target: &token.surface,
            dictionary_form: &token.dictionary_form,
            normalized_form: &token.normalized_form,
            reading: &token.reading,
            process_len: 0,
            person_name_context: token.person_name_context,
            conjugated: false,
        };
        let mut best = None;
        for entry in &pool {
            self.score_entry(&mut best, entry, &keys, &input, &[], origin);
        }
        Ok(best)
    }

    /// Undoes the inflection of the surface and looks up the dictionary
    /// forms reached, keeping entries whose class fits the inflection.
    pub(super) async fn conjugation_lookup(&self, token: &Token, origin: Origin) -> Result<Option<Match>> {
        let mut best = None;
        let forms = self.deconjugator.dictionary_forms(&to_hiragana(&token.surface));
        for form in &forms {
            let tag = match form.terminal_tag() {
                Some(tag) => tag,
                None => continue,
            };
            let mut lookups: Vec<(String, fn(ConjTag, &DictPos) -> bool)> = vec![(form.text.clone(), ConjTag::matches)];
            match tag {
                ConjTag::Suru => {
                    if let Some(noun) = form.text.strip_suffix("する").filter(|n| !n.is_empty()) {
                        lookups.push((noun.to_owned(), |_, pos| *pos == DictPos::Suru));
                    }
                }
                ConjTag::Copula => {
                    if let Some(stem) = form.text.strip_suffix('だ').filter(|n| !n.is_empty()) {
                        lookups.push((stem.to_owned(), |_, pos| {
                            matches!(pos, DictPos::NaAdjective | DictPos::Noun | DictPos::NoAdjective)
                        }));
                    }
                }
                _ => {}
            }
            for (text, fits) in lookups {
                let keys = vec![text.clone(), to_hiragana(&text)];
                let ids = self.collect_ids(&keys);
                if ids.is_empty() {
                    continue;
                }
                let input = ScoreInput {
                    surface: &token.surface,
                    target: &text,
                    dictionary_form: &token.dictionary_form,
                    normalized_form: &token.normalized_form,
                    reading: &token.reading,
                    process_len: form.process.len(),
                    person_name_context: token.person_name_context,
                    conjugated: true,
                };
                for entry in self.lexicon.entries(&ids).await? {
                    if !entry.pos.iter().any(|p| fits(tag, p)) {
                        continue;
                    }
                    if constrains(token.pos) && !entry.accepts(token.pos) {
                        continue;
                    }
                    self.score_entry(&mut best, &entry, &keys, &input, &form.process, origin);
                }
            }
        }
        if best.is_none() && token.dictionary_form != token.surface {
            best = self.lemma_lookup(token, origin).await?;
        }
        if let Some(found) = &best {
            trace!("{} conjugates from entry {}", token.surface, found.entry.id);
        }
        Ok(best)
    }

    /// The tokenizer's own dictionary form, when no deconjugation found anything.
    async fn lemma_lookup(&self, token: &Token, origin: Origin) -> Result<Option<Match>> {
        let keys = vec![token.dictionary_form.clone(), to_hiragana(&token.dictionary_form)];
        let ids = self.collect_ids(&keys);
        if ids.is_empty() {
            return Ok(None);
        }
        let input = ScoreInput {
            surface: &token.surface,
            target: &token.dictionary_form,
            dictionary_form: &token.dictionary_form,
            normalized_form: &token.normalized_form,
            reading: &token.reading,
            process_len: 0,
            person_name_context: token.person_name_context,
            conjugated: true,
        };
        let mut best = None;
        for entry in self.lexicon.entries(&ids).await? {
            if entry.accepts(token.pos) && !entry.is_name_only() {
                self.score_entry(&mut best, &entry, &keys, &input, &[], origin);
            }
        }
        Ok(best)
    }

    /// Scores every form of an entry a compound resolver already picked.
    pub(super) async fn pre_matched_lookup(&self, token: &Token, id: EntryId) -> Result<Option<Match>> {
        let entry = match self.lexicon.entry(id).await? {
            Some(entry) => entry,
            None => return Ok(None),
        };
        let conjugations = if token.dictionary_form == token.surface {
            vec![]
        } else {
            self.deconjugator
                .dictionary_forms(&token.surface)
                .into_iter()
                .find(|f| f.text == token.dictionary_form)
                .map(|f| f.process)
                .unwrap_or_default()
        };
        let input = ScoreInput {
            surface: &token.surface,
            target: &token.dictionary_form,
            dictionary_form: &token.dictionary_form,
            normalized_form: &token.normalized_form,
            reading: &token.reading,
            process_len: conjugations.len(),
            person_name_context: token.person_name_context,
            conjugated: !conjugations.is_empty(),
        };
        let mut best = None;
        for form in &entry.forms {
            let total = score(&entry, form, &input).total();
            keep_best(
                &mut best,
                Match {
                    entry: entry.clone(),
                    reading_index: form.reading_index,
                    conjugations: conjugations.clone(),
                    origin: Origin::PreMatched,
                    score: total,
                },
            );
        }
        Ok(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elongated_surfaces_get_stripped_keys() {
        assert_eq!(direct_keys("すごーい"), vec!["すごーい", "すごうい", "すごい"]);
        assert_eq!(direct_keys("テスト"), vec!["テスト", "てすと"]);
        // too short once stripped
        assert_eq!(direct_keys("ねー"), vec!["ねー", "ねい"]);
    }

    #[test]
    fn forms_match_through_kana_and_folding() {
        let keys = direct_keys("ラーメン");
        assert!(form_matches("らあめん", &keys));
        assert!(form_matches("ラーメン", &keys));
        assert!(!form_matches("うどん", &keys));
    }
}
