//! Greedy merging of adjacent tokens into words the dictionary lists as a
//! whole: fixed expressions and inflected idioms (気をつけて), and noun
//! compounds (日本語).
//!
//! Merged tokens carry the entry they matched in `pre_matched`, which also
//! keeps them out of any further merge.

use std::sync::Arc;

use log::{debug, warn};
use morph::PartOfSpeech;

use crate::{
    cache::{CacheStore, CompoundCache, CompoundValidity},
    deconjugate::Deconjugator,
    dictionary::{DictEntry, DictPos, EntryId, Lexicon},
    token::{surface_of, Token},
};

const MAX_EXPRESSION_TOKENS: usize = 5;
const MAX_NOUN_TOKENS: usize = 4;

pub struct CompoundResolver<'a> {
    lexicon: &'a Lexicon,
    deconjugator: &'a Deconjugator,
    local: &'a CompoundCache,
    store: &'a dyn CacheStore,
}

fn mergeable(token: &Token) -> bool {
    token.pre_matched.is_none() && !token.is_symbolic()
}

/// Expressions end in something that inflects: 気をつけて, not これは.
fn ends_expression(token: &Token) -> bool {
    mergeable(token) && (token.pos.is_inflectable() || token.pos == PartOfSpeech::Expression)
}

/// Whether an entry found for a window ending in `last` may replace it.
fn fits_expression(entry: &DictEntry, last: &Token) -> bool {
    entry.is_expression()
        || match last.pos {
            PartOfSpeech::Verb => entry.pos.iter().any(DictPos::is_verb),
            PartOfSpeech::IAdjective => entry.pos.iter().any(DictPos::is_i_adjective),
            _ => false,
        }
}

fn noun_window(window: &[Token]) -> bool {
    let last = window.len() - 1;
    window.iter().enumerate().all(|(i, t)| {
        mergeable(t) && (t.pos.is_nominal() || (i != 0 && i != last && t.surface == "の"))
    })
}

impl<'a> CompoundResolver<'a> {
    pub fn new(
        lexicon: &'a Lexicon,
        deconjugator: &'a Deconjugator,
        local: &'a CompoundCache,
        store: &'a dyn CacheStore,
    ) -> Self {
        CompoundResolver {
            lexicon,
            deconjugator,
            local,
            store,
        }
    }

    async fn cached(&self, key: &str) -> Option<CompoundValidity> {
        if let Some(validity) = self.local.get(key) {
            return Some(validity);
        }
        match self.store.get_compound(key).await {
            Ok(Some(validity)) => {
                self.local.insert(key.to_owned(), validity);
                Some(validity)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("compound cache read failed: {}", e);
                None
            }
        }
    }

    async fn remember(&self, key: String, validity: CompoundValidity) {
        self.local.insert(key.clone(), validity);
        if let Err(e) = self.store.set_compound(key, validity).await {
            warn!("compound cache write failed: {}", e);
        }
    }

    /// Looks `key` up under `namespace`, validating candidates with `pick`.
    async fn validity(
        &self,
        namespace: &str,
        key: &str,
        pick: impl Fn(&[Arc<DictEntry>]) -> Option<EntryId>,
    ) -> Option<EntryId> {
        let cache_key = format!("{}:{}", namespace, key);
        if let Some(validity) = self.cached(&cache_key).await {
            return validity.entry_id.filter(|_| validity.valid);
        }
        let ids = self.lexicon.candidates(key);
        let validity = if ids.is_empty() {
            CompoundValidity::invalid()
        } else {
            match self.lexicon.entries(ids).await {
                Ok(entries) => pick(&entries).map_or(CompoundValidity::invalid(), CompoundValidity::valid),
                Err(e) => {
                    warn!("could not validate compound {}: {}", key, e);
                    return None;
                }
            }
        };
        self.remember(cache_key, validity).await;
        validity.entry_id
    }

    /// Dictionary forms the last token of a window may stand for.
    fn lemmas(&self, last: &Token) -> Vec<String> {
        let mut lemmas = vec![last.dictionary_form.clone()];
        for form in self.deconjugator.dictionary_forms(&last.surface) {
            if !lemmas.contains(&form.text) {
                lemmas.push(form.text);
            }
        }
        if !lemmas.contains(&last.surface) {
            lemmas.push(last.surface.clone());
        }
        lemmas
    }

    async fn expression_match(&self, window: &[Token]) -> Option<(EntryId, String)> {
        let (last, prefix) = window.split_last()?;
        let prefix = surface_of(prefix);
        for lemma in self.lemmas(last) {
            let key = format!("{}{}", prefix, lemma);
            let found = self
                .validity("exp", &key, |entries| {
                    entries
                        .iter()
                        .filter(|e| fits_expression(e, last))
                        .min_by_key(|e| (!e.is_expression(), e.id))
                        .map(|e| e.id)
                })
                .await;
            if let Some(id) = found {
                return Some((id, key));
            }
        }
        None
    }

    /// Right to left, so the end of a long idiom claims the longest window
    /// before a shorter match inside it can.
    pub async fn resolve_expressions(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        let mut end = tokens.len();
        'scan: while end > 0 {
            if ends_expression(&tokens[end - 1]) {
                for size in (2..=MAX_EXPRESSION_TOKENS.min(end)).rev() {
                    let start = end - size;
                    let window = &tokens[start..end];
                    if !window.iter().all(mergeable) {
                        continue;
                    }
                    if let Some((id, lemma)) = self.expression_match(window).await {
                        let mut merged = Token::joined(window, PartOfSpeech::Expression, &lemma);
                        merged.pre_matched = Some(id);
                        debug!("expression {} -> entry {}", merged.surface, id);
                        tokens.splice(start..end, [merged]);
                        end = start;
                        continue 'scan;
                    }
                }
            }
            end -= 1;
        }
        tokens
    }

    async fn noun_match(&self, window: &[Token]) -> Option<EntryId> {
        let key = surface_of(window);
        let common = self
            .validity("noun", &key, |entries| {
                entries
                    .iter()
                    .filter(|e| !e.is_name_only() && e.pos.iter().any(DictPos::is_nominal))
                    .map(|e| e.id)
                    .min()
            })
            .await;
        if common.is_some() || !window.iter().any(Token::is_name_like) {
            return common;
        }
        self.validity("name", &key, |entries| {
            entries.iter().filter(|e| e.is_name_only()).map(|e| e.id).min()
        })
        .await
    }

    /// Left to right, largest window first.
    pub async fn resolve_nouns(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        let mut start = 0;
        'scan: while start < tokens.len() {
            if mergeable(&tokens[start]) && tokens[start].pos.is_nominal() {
                let longest = MAX_NOUN_TOKENS.min(tokens.len() - start);
                for size in (2..=longest).rev() {
                    let window = &tokens[start..start + size];
                    if !noun_window(window) {
                        continue;
                    }
                    if let Some(id) = self.noun_match(window).await {
                        let mut merged = Token::joined(window, PartOfSpeech::Noun, &surface_of(window));
                        merged.pre_matched = Some(id);
                        debug!("noun compound {} -> entry {}", merged.surface, id);
                        tokens.splice(start..start + size, [merged]);
                        start += 1;
                        continue 'scan;
                    }
                }
            }
            start += 1;
        }
        tokens
    }

    /// Expressions first, then noun compounds.
    pub async fn resolve(&self, tokens: Vec<Token>) -> Vec<Token> {
        let tokens = self.resolve_expressions(tokens).await;
        self.resolve_nouns(tokens).await
    }
}
