//! Per-token dictionary resolution.
//!
//! A token is resolved on its own, independently of every other token: first
//! through the cache, then through the lookups its part of speech calls for,
//! then through spelling normalizations. Tokens that still resolve to nothing
//! go through [`Resolver::rescue`], which rescans their surface for known
//! words.

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use anyhow::Result;
use log::{debug, warn};
use morph::PartOfSpeech;
use serde::{Deserialize, Serialize};

use crate::{
    cache::{CacheStore, CachedResolution, ResolutionKey},
    deconjugate::Deconjugator,
    dictionary::{EntryId, Lexicon},
    text::{is_elongation, strip_elongation, strip_small_kana},
    token::Token,
};

mod lookup;
mod rescue;
mod score;

pub use lookup::Match;
pub use score::{score, ScoreBreakdown, ScoreInput};

/// Reading index of a word whose entry has no form to point at.
pub const UNRESOLVED_READING: u8 = u8::MAX;

/// Which step of the resolution found a word.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Direct,
    Deconjugated,
    Compound,
    PreMatched,
    AlternatePos,
    Normalized,
    Rescue,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ResolvedWord {
    pub entry_id: EntryId,
    pub reading_index: u8,
    pub surface: String,
    pub occurrences: u32,
    pub conjugations: Vec<String>,
    pub pos: BTreeSet<PartOfSpeech>,
    pub origin: Origin,
    /// Reading the tokenizer reported.
    pub reading: String,
}

impl ResolvedWord {
    pub fn key(&self) -> (EntryId, u8) {
        (self.entry_id, self.reading_index)
    }

    pub fn is_resolved(&self) -> bool {
        self.reading_index != UNRESOLVED_READING
    }

    fn new(token: &Token, entry_id: EntryId, reading_index: u8, conjugations: Vec<String>, origin: Origin) -> Self {
        ResolvedWord {
            entry_id,
            reading_index,
            surface: token.surface.clone(),
            occurrences: 1,
            conjugations,
            pos: BTreeSet::from([token.pos]),
            origin,
            reading: token.reading.clone(),
        }
    }
}

/// Folds words sharing an (entry, reading index) pair into one, in order of
/// first occurrence. Unresolved words are dropped.
pub fn merge_words(words: impl IntoIterator<Item = ResolvedWord>) -> Vec<ResolvedWord> {
    let mut merged: Vec<ResolvedWord> = vec![];
    let mut index: HashMap<(EntryId, u8), usize> = HashMap::new();
    for word in words.into_iter().filter(ResolvedWord::is_resolved) {
        match index.get(&word.key()) {
            Some(&at) => {
                let existing = &mut merged[at];
                existing.occurrences += word.occurrences;
                existing.pos.extend(word.pos);
            }
            None => {
                index.insert(word.key(), merged.len());
                merged.push(word);
            }
        }
    }
    merged
}

/// Parts of speech tried, in order, when a token's own finds nothing.
const ALTERNATE_POS: [PartOfSpeech; 4] = [
    PartOfSpeech::Verb,
    PartOfSpeech::IAdjective,
    PartOfSpeech::NaAdjective,
    PartOfSpeech::Interjection,
];

const HONORIFIC_PREFIXES: [char; 3] = ['お', 'ご', '御'];

/// Spellings to retry a token under, in order.
fn normalizations(surface: &str) -> Vec<String> {
    let chars: Vec<char> = surface.chars().collect();
    let mut variants = vec![];
    if let Some((&last, rest)) = chars.split_last() {
        if is_elongation(last) || rest.last() == Some(&last) {
            variants.push(rest.iter().collect::<String>());
        }
    }
    if let Some((&first, rest)) = chars.split_first() {
        if HONORIFIC_PREFIXES.contains(&first) && !rest.is_empty() {
            variants.push(rest.iter().collect::<String>());
        }
    }
    variants.push(strip_elongation(surface));
    variants.push(strip_small_kana(surface));
    let mut unique: Vec<String> = vec![];
    for variant in variants {
        if !variant.is_empty() && variant != surface && !unique.contains(&variant) {
            unique.push(variant);
        }
    }
    unique
}

fn respelled(token: &Token, surface: &str) -> Token {
    let mut variant = token.clone();
    variant.surface = surface.to_owned();
    if token.dictionary_form == token.surface {
        variant.dictionary_form = surface.to_owned();
    }
    if token.normalized_form == token.surface {
        variant.normalized_form = surface.to_owned();
    }
    variant
}

#[derive(Clone, Debug)]
pub struct ResolverSettings {
    pub max_retries: usize,
    pub rescue_window: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        ResolverSettings {
            max_retries: 3,
            rescue_window: 10,
        }
    }
}

pub struct Resolver {
    lexicon: Arc<Lexicon>,
    deconjugator: Arc<Deconjugator>,
    cache: Arc<dyn CacheStore>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        lexicon: Arc<Lexicon>,
        deconjugator: Arc<Deconjugator>,
        cache: Arc<dyn CacheStore>,
        settings: ResolverSettings,
    ) -> Self {
        Resolver {
            lexicon,
            deconjugator,
            cache,
            settings,
        }
    }

    /// Every word found in `token`: one for a regular resolution, any number
    /// from a rescue, none for symbols and text nothing matches.
    pub async fn resolve_token(&self, token: &Token) -> Vec<ResolvedWord> {
        if token.is_symbolic() {
            return vec![];
        }
        match self.resolve(token).await {
            Some(word) => vec![word],
            None => self.rescue(token).await,
        }
    }

    /// Cached resolution of a single token.
    pub async fn resolve(&self, token: &Token) -> Option<ResolvedWord> {
        let key = ResolutionKey::of(token);
        match self.cache.get_resolution(&key).await {
            Ok(Some(CachedResolution::Found {
                entry_id,
                reading_index,
                conjugations,
                origin,
            })) => return Some(ResolvedWord::new(token, entry_id, reading_index, conjugations, origin)),
            Ok(Some(CachedResolution::Missing)) => return None,
            Ok(None) => {}
            Err(e) => warn!("resolution cache read failed: {}", e),
        }

        let found = match self.compute(token).await {
            Ok(found) => found,
            Err(e) => {
                warn!("could not resolve {}: {}", token.surface, e);
                return None;
            }
        };
        let cached = match &found {
            Some(m) => CachedResolution::Found {
                entry_id: m.entry.id,
                reading_index: m.reading_index,
                conjugations: m.conjugations.clone(),
                origin: m.origin,
            },
            None => CachedResolution::Missing,
        };
        if let Err(e) = self.cache.set_resolution(key, cached).await {
            warn!("resolution cache write failed: {}", e);
        }
        found.map(|m| ResolvedWord::new(token, m.entry.id, m.reading_index, m.conjugations, m.origin))
    }

    async fn compute(&self, token: &Token) -> Result<Option<Match>> {
        if let Some(id) = token.pre_matched {
            return self.pre_matched_lookup(token, id).await;
        }
        if let Some(found) = self.attempt(token).await? {
            return Ok(Some(found));
        }
        for variant in normalizations(&token.surface).into_iter().take(self.settings.max_retries) {
            let retry = respelled(token, &variant);
            if let Some(mut found) = self.attempt(&retry).await? {
                debug!("{} resolved as {}", token.surface, variant);
                found.origin = Origin::Normalized;
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Lookups in the order the token's part of speech calls for.
    async fn attempt(&self, token: &Token) -> Result<Option<Match>> {
        if token.pos.is_inflectable() {
            if let Some(found) = self.conjugation_lookup(token, Origin::Deconjugated).await? {
                return Ok(Some(found));
            }
            return self.direct_lookup(token, Origin::Direct).await;
        }
        if let Some(found) = self.direct_lookup(token, Origin::Direct).await? {
            return Ok(Some(found));
        }
        for pos in ALTERNATE_POS.into_iter().filter(|p| *p != token.pos) {
            let mut retyped = token.clone();
            retyped.pos = pos;
            let found = if pos.is_inflectable() {
                self.conjugation_lookup(&retyped, Origin::AlternatePos).await?
            } else {
                self.direct_lookup(&retyped, Origin::AlternatePos).await?
            };
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::MemoryCacheStore,
        dictionary::{DictEntry, MemoryStore},
    };

    fn word(entry_id: EntryId, reading_index: u8, pos: PartOfSpeech) -> ResolvedWord {
        ResolvedWord {
            entry_id,
            reading_index,
            surface: String::new(),
            occurrences: 1,
            conjugations: vec![],
            pos: BTreeSet::from([pos]),
            origin: Origin::Direct,
            reading: String::new(),
        }
    }

    #[test]
    fn merging_sums_and_keeps_first_seen_order() {
        let words = vec![
            word(2, 0, PartOfSpeech::Verb),
            word(1, 0, PartOfSpeech::Noun),
            word(2, 0, PartOfSpeech::Auxiliary),
            word(2, 1, PartOfSpeech::Verb),
            word(3, UNRESOLVED_READING, PartOfSpeech::Noun),
        ];
        let merged = merge_words(words);
        assert_eq!(merged.iter().map(ResolvedWord::key).collect::<Vec<_>>(), vec![(2, 0), (1, 0), (2, 1)]);
        assert_eq!(merged[0].occurrences, 2);
        assert_eq!(merged[0].pos.len(), 2);
    }

    #[test]
    fn retries_in_a_fixed_order() {
        assert_eq!(normalizations("すごーー"), vec!["すごー", "すご"]);
        assert_eq!(normalizations("お茶"), vec!["茶"]);
        assert_eq!(normalizations("やったー"), vec!["やった", "やたー"]);
        assert_eq!(normalizations("ねこ"), Vec::<String>::new());
    }

    fn entries() -> Vec<DictEntry> {
        serde_json::from_str(
            r#"[
                {"id": 1, "forms": [{"reading_index": 0, "text": "猫", "form_type": "kanji"},
                                    {"reading_index": 1, "text": "ねこ", "form_type": "kana"}], "pos": ["n"]},
                {"id": 2, "forms": [{"reading_index": 0, "text": "食べる", "form_type": "kanji"},
                                    {"reading_index": 1, "text": "たべる", "form_type": "kana"}], "pos": ["v1"]},
                {"id": 3, "forms": [{"reading_index": 0, "text": "すごい", "form_type": "kana"}], "pos": ["adj-i"]},
                {"id": 4, "forms": [{"reading_index": 0, "text": "茶", "form_type": "kanji"}], "pos": ["n"]}
            ]"#,
        )
        .unwrap()
    }

    fn resolver() -> (Resolver, Arc<MemoryCacheStore>) {
        let store = Arc::new(MemoryStore::new(entries()));
        let lexicon = Arc::new(Lexicon::new(store.clone(), store.table()));
        let cache = Arc::new(MemoryCacheStore::new());
        let resolver = Resolver::new(lexicon, Arc::new(Deconjugator::default()), cache.clone(), ResolverSettings::default());
        (resolver, cache)
    }

    #[tokio::test]
    async fn 食べた_resolves_through_deconjugation() {
        let (resolver, cache) = resolver();
        let token = Token::new("食べた", PartOfSpeech::Verb)
            .with_dictionary_form("食べる")
            .with_reading("タベタ");
        let word = resolver.resolve(&token).await.unwrap();
        assert_eq!(word.key(), (2, 0));
        assert_eq!(word.origin, Origin::Deconjugated);
        assert_eq!(word.conjugations, vec!["past"]);
        assert_eq!(cache.resolution_count(), 1);
        assert_eq!(resolver.resolve(&token).await.unwrap(), word);
    }

    #[tokio::test]
    async fn kana_spelling_picks_the_kana_form() {
        let (resolver, _) = resolver();
        let word = resolver.resolve(&Token::new("ねこ", PartOfSpeech::Noun)).await.unwrap();
        assert_eq!(word.key(), (1, 1));
    }

    #[tokio::test]
    async fn misclassified_adjective_resolves_under_another_pos() {
        let (resolver, _) = resolver();
        let word = resolver.resolve(&Token::new("すごく", PartOfSpeech::Adverb)).await.unwrap();
        assert_eq!(word.key(), (3, 0));
        assert_eq!(word.origin, Origin::AlternatePos);
    }

    #[tokio::test]
    async fn honorific_prefix_is_retried_without() {
        let (resolver, _) = resolver();
        let word = resolver.resolve(&Token::new("お茶", PartOfSpeech::Noun)).await.unwrap();
        assert_eq!(word.key(), (4, 0));
        assert_eq!(word.origin, Origin::Normalized);
        assert_eq!(word.surface, "お茶");
    }

    #[tokio::test]
    async fn misses_are_cached_and_symbols_skipped() {
        let (resolver, cache) = resolver();
        assert!(resolver.resolve(&Token::new("ぬぬぬ", PartOfSpeech::Noun)).await.is_none());
        assert_eq!(cache.resolution_count(), 1);
        assert!(resolver.resolve_token(&Token::new("。", PartOfSpeech::SupplementarySymbol)).await.is_empty());
    }
}
