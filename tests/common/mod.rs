#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use kotoba::{
    cache::{CacheStore, CachedResolution, CompoundValidity, MemoryCacheStore, ResolutionKey},
    config::KotobaConfig,
    dictionary::{EntryId, Lexicon, MemoryStore},
    Parser,
};
use morph::{MorphAnalyzer, Morpheme};

pub const これ: EntryId = 1;
pub const は: EntryId = 2;
pub const テスト: EntryId = 3;
pub const です: EntryId = 4;
pub const 食べる: EntryId = 5;
pub const 表_ひょう: EntryId = 6;
pub const 表_おもて: EntryId = 7;
pub const 日本: EntryId = 15;
pub const 日本語: EntryId = 17;
pub const 田中: EntryId = 18;
pub const 気をつける: EntryId = 20;

const ENTRIES: &str = r#"[
    {"id": 1, "forms": [{"reading_index": 0, "text": "これ", "form_type": "kana"}], "pos": ["pn"], "priorities": ["ichi1"]},
    {"id": 2, "forms": [{"reading_index": 0, "text": "は", "form_type": "kana"}], "pos": ["prt"], "priorities": ["spec1"]},
    {"id": 3, "forms": [{"reading_index": 0, "text": "テスト", "form_type": "kana"}], "pos": ["n", "vs"], "priorities": ["gai1"]},
    {"id": 4, "forms": [{"reading_index": 0, "text": "です", "form_type": "kana"}], "pos": ["cop"], "priorities": ["spec1"]},
    {"id": 5, "forms": [{"reading_index": 0, "text": "食べる", "form_type": "kanji"},
                        {"reading_index": 1, "text": "たべる", "form_type": "kana"}], "pos": ["v1"], "priorities": ["ichi1"]},
    {"id": 6, "forms": [{"reading_index": 0, "text": "表", "form_type": "kanji"},
                        {"reading_index": 1, "text": "ひょう", "form_type": "kana"}], "pos": ["n"], "priorities": ["ichi1"]},
    {"id": 7, "forms": [{"reading_index": 0, "text": "表", "form_type": "kanji"},
                        {"reading_index": 1, "text": "おもて", "form_type": "kana"}], "pos": ["n"], "priorities": ["ichi1"]},
    {"id": 8, "forms": [{"reading_index": 0, "text": "へ", "form_type": "kana"}], "pos": ["prt"]},
    {"id": 9, "forms": [{"reading_index": 0, "text": "に", "form_type": "kana"}], "pos": ["prt"]},
    {"id": 10, "forms": [{"reading_index": 0, "text": "を", "form_type": "kana"}], "pos": ["prt"]},
    {"id": 11, "forms": [{"reading_index": 0, "text": "出る", "form_type": "kanji"},
                         {"reading_index": 1, "text": "でる", "form_type": "kana"}], "pos": ["v1"]},
    {"id": 12, "forms": [{"reading_index": 0, "text": "見る", "form_type": "kanji"},
                         {"reading_index": 1, "text": "みる", "form_type": "kana"}], "pos": ["v1"]},
    {"id": 13, "forms": [{"reading_index": 0, "text": "私", "form_type": "kanji"},
                         {"reading_index": 1, "text": "わたし", "form_type": "kana"}], "pos": ["pn"]},
    {"id": 14, "forms": [{"reading_index": 0, "text": "パン", "form_type": "kana"}], "pos": ["n"]},
    {"id": 15, "forms": [{"reading_index": 0, "text": "日本", "form_type": "kanji"}], "pos": ["n"]},
    {"id": 16, "forms": [{"reading_index": 0, "text": "語", "form_type": "kanji"}], "pos": ["n", "suf"]},
    {"id": 17, "forms": [{"reading_index": 0, "text": "日本語", "form_type": "kanji"}], "pos": ["n"]},
    {"id": 18, "forms": [{"reading_index": 0, "text": "田中", "form_type": "kanji"}], "pos": ["surname"]},
    {"id": 19, "forms": [{"reading_index": 0, "text": "さん", "form_type": "kana"}], "pos": ["suf"]},
    {"id": 20, "forms": [{"reading_index": 0, "text": "気をつける", "form_type": "kanji"}], "pos": ["exp", "v1"]},
    {"id": 21, "forms": [{"reading_index": 0, "text": "いる", "form_type": "kana"}], "pos": ["v1"]},
    {"id": 22, "forms": [{"reading_index": 0, "text": "ます", "form_type": "kana"}], "pos": ["aux-v"]},
    {"id": 23, "forms": [{"reading_index": 0, "text": "行く", "form_type": "kanji"}], "pos": ["v5k-s"]},
    {"id": 24, "forms": [{"reading_index": 0, "text": "て", "form_type": "kana"}], "pos": ["prt"]},
    {"id": 25, "forms": [{"reading_index": 0, "text": "た", "form_type": "kana"}], "pos": ["aux-v"]},
    {"id": 26, "forms": [{"reading_index": 0, "text": "つける", "form_type": "kana"}], "pos": ["v1"]},
    {"id": 27, "forms": [{"reading_index": 0, "text": "も", "form_type": "kana"}], "pos": ["prt"]},
    {"id": 28, "forms": [{"reading_index": 0, "text": "話す", "form_type": "kanji"}], "pos": ["v5s"]},
    {"id": 29, "forms": [{"reading_index": 0, "text": "これは", "form_type": "kana"}], "pos": ["exp", "int"]}
]"#;

/// (surface, POS hierarchy, dictionary form, reading), UniDic style.
const SCRIPT: &[(&str, &str, &str, &str)] = &[
    ("これ", "代名詞,*,*,*", "これ", "コレ"),
    ("は", "助詞,係助詞,*,*", "は", "ハ"),
    ("テスト", "名詞,普通名詞,サ変可能,*", "テスト", "テスト"),
    ("です", "助動詞,*,*,*", "です", "デス"),
    ("食べ", "動詞,一般,*,*", "食べる", "タベ"),
    ("た", "助動詞,*,*,*", "た", "タ"),
    ("表", "名詞,普通名詞,一般,*", "表", "ヒョウ"),
    ("へ", "助詞,格助詞,*,*", "へ", "エ"),
    ("を", "助詞,格助詞,*,*", "を", "ヲ"),
    ("出る", "動詞,一般,*,*", "出る", "デル"),
    ("出", "動詞,一般,*,*", "出る", "デ"),
    ("て", "助詞,接続助詞,*,*", "て", "テ"),
    ("見る", "動詞,非自立可能,*,*", "見る", "ミル"),
    ("見", "動詞,非自立可能,*,*", "見る", "ミ"),
    ("い", "動詞,非自立可能,*,*", "いる", "イ"),
    ("ます", "助動詞,*,*,*", "ます", "マス"),
    ("私", "代名詞,*,*,*", "私", "ワタシ"),
    ("も", "助詞,係助詞,*,*", "も", "モ"),
    ("パン", "名詞,普通名詞,一般,*", "パン", "パン"),
    ("日本", "名詞,固有名詞,地名,国", "日本", "ニホン"),
    ("語", "名詞,普通名詞,一般,*", "語", "ゴ"),
    ("話す", "動詞,一般,*,*", "話す", "ハナス"),
    ("気", "名詞,普通名詞,一般,*", "気", "キ"),
    ("つけ", "動詞,一般,*,*", "つける", "ツケ"),
    ("田中", "名詞,固有名詞,人名,姓", "田中", "タナカ"),
    ("さん", "接尾辞,名詞的,一般,*", "さん", "サン"),
    ("。", "補助記号,句点,*,*", "。", "*"),
];

/// Longest-match tokenizer over a fixed vocabulary; anything else becomes a
/// one-character symbol.
pub struct ScriptedAnalyzer;

#[async_trait]
impl MorphAnalyzer for ScriptedAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Vec<Morpheme>> {
        let mut morphemes = vec![];
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            let known = SCRIPT
                .iter()
                .filter(|(surface, ..)| rest.starts_with(surface))
                .max_by_key(|(surface, ..)| surface.len());
            let len = match known {
                Some((surface, pos, lemma, reading)) => {
                    morphemes.push(Morpheme::new(surface, pos, lemma, lemma, reading));
                    surface.len()
                }
                None if c.is_whitespace() => {
                    morphemes.push(Morpheme::new(&c.to_string(), "空白,*,*,*", "*", "*", "*"));
                    c.len_utf8()
                }
                None => {
                    morphemes.push(Morpheme::new(&c.to_string(), "補助記号,一般,*,*", "*", "*", "*"));
                    c.len_utf8()
                }
            };
            rest = &rest[len..];
        }
        Ok(morphemes)
    }
}

/// Fails every call.
pub struct BrokenAnalyzer;

#[async_trait]
impl MorphAnalyzer for BrokenAnalyzer {
    async fn analyze(&self, _: &str) -> Result<Vec<Morpheme>> {
        anyhow::bail!("tokenizer crashed")
    }
}

/// A cache backend that is down.
pub struct UnreachableCache;

#[async_trait]
impl CacheStore for UnreachableCache {
    async fn get_resolution(&self, _: &ResolutionKey) -> Result<Option<CachedResolution>> {
        anyhow::bail!("connection refused")
    }

    async fn set_resolution(&self, _: ResolutionKey, _: CachedResolution) -> Result<()> {
        anyhow::bail!("connection refused")
    }

    async fn get_compound(&self, _: &str) -> Result<Option<CompoundValidity>> {
        anyhow::bail!("connection refused")
    }

    async fn set_compound(&self, _: String, _: CompoundValidity) -> Result<()> {
        anyhow::bail!("connection refused")
    }
}

/// A memory cache answering resolution reads after `delay`.
pub struct SlowCache {
    pub delay: Duration,
    inner: MemoryCacheStore,
}

impl SlowCache {
    pub fn new(delay: Duration) -> Self {
        SlowCache {
            delay,
            inner: MemoryCacheStore::new(),
        }
    }
}

#[async_trait]
impl CacheStore for SlowCache {
    async fn get_resolution(&self, key: &ResolutionKey) -> Result<Option<CachedResolution>> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_resolution(key).await
    }

    async fn set_resolution(&self, key: ResolutionKey, value: CachedResolution) -> Result<()> {
        self.inner.set_resolution(key, value).await
    }

    async fn get_compound(&self, key: &str) -> Result<Option<CompoundValidity>> {
        self.inner.get_compound(key).await
    }

    async fn set_compound(&self, key: String, value: CompoundValidity) -> Result<()> {
        self.inner.set_compound(key, value).await
    }
}

pub fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_json(ENTRIES).unwrap())
}

pub fn lexicon() -> Lexicon {
    let store = store();
    Lexicon::new(store.clone(), store.table())
}

pub async fn parser() -> Parser {
    parser_with(KotobaConfig::default()).await
}

pub async fn parser_with(config: KotobaConfig) -> Parser {
    Parser::new(config, Arc::new(ScriptedAnalyzer), store(), Arc::new(MemoryCacheStore::new()))
        .await
        .unwrap()
}

pub async fn parser_over(config: KotobaConfig, cache: Arc<dyn CacheStore>) -> Parser {
    Parser::new(config, Arc::new(ScriptedAnalyzer), store(), cache).await.unwrap()
}
