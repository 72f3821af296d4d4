//! The parsing service: built once at startup, shared by every parse call.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, info, warn};
use morph::{analyze_batch, MorphAnalyzer};
use serde::{Deserialize, Serialize};
use tokio::{sync::Semaphore, task::JoinSet, time::timeout};

use crate::{
    cache::{CacheStore, CompoundCache},
    compound::CompoundResolver,
    config::KotobaConfig,
    deconjugate::Deconjugator,
    dictionary::{DictionaryStore, EntryId, Lexicon},
    repair::{RepairContext, RepairPipeline},
    resolve::{merge_words, ResolvedWord, Resolver, ResolverSettings},
    sentence::{assemble, select_examples, ExampleSentence, Sentence},
    text::Preprocessor,
    token::Token,
};

/// Vocabulary of one input text.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ParsedText {
    pub words: Vec<ResolvedWord>,
    pub examples: Vec<ExampleSentence>,
}

struct Inner {
    config: KotobaConfig,
    preprocessor: Preprocessor,
    analyzer: Arc<dyn MorphAnalyzer>,
    lexicon: Arc<Lexicon>,
    deconjugator: Arc<Deconjugator>,
    pipeline: RepairPipeline,
    compounds: CompoundCache,
    cache: Arc<dyn CacheStore>,
    resolver: Arc<Resolver>,
    permits: Arc<Semaphore>,
}

#[derive(Clone)]
pub struct Parser {
    inner: Arc<Inner>,
}

impl Parser {
    /// Loads the lookup table of `store`, which must be initialized.
    pub async fn new(
        config: KotobaConfig,
        analyzer: Arc<dyn MorphAnalyzer>,
        store: Arc<dyn DictionaryStore>,
        cache: Arc<dyn CacheStore>,
    ) -> Result<Self> {
        let lexicon = Arc::new(Lexicon::load(store).await?);
        Ok(Parser::with_lexicon(config, analyzer, lexicon, cache))
    }

    pub fn with_lexicon(
        config: KotobaConfig,
        analyzer: Arc<dyn MorphAnalyzer>,
        lexicon: Arc<Lexicon>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let deconjugator = Arc::new(Deconjugator::default());
        let settings = ResolverSettings {
            max_retries: config.resolution.max_retries,
            rescue_window: config.resolution.rescue_window,
        };
        let resolver = Arc::new(Resolver::new(
            lexicon.clone(),
            deconjugator.clone(),
            cache.clone(),
            settings,
        ));
        let max_concurrency = config.resolution.max_concurrency.max(1);
        info!(
            "parser ready: {} resolution tasks at most, compound cache of {}",
            max_concurrency, config.cache.compound_capacity
        );
        Parser {
            inner: Arc::new(Inner {
                preprocessor: Preprocessor::new(&config.preprocess.substitutions),
                analyzer,
                lexicon,
                deconjugator,
                pipeline: RepairPipeline::standard(),
                compounds: CompoundCache::new(config.cache.compound_capacity),
                cache,
                resolver,
                permits: Arc::new(Semaphore::new(max_concurrency)),
                config,
            }),
        }
    }

    pub fn config(&self) -> &KotobaConfig {
        &self.inner.config
    }

    pub async fn parse(&self, text: &str) -> Result<ParsedText> {
        let mut parsed = self.parse_many(&[text]).await?;
        Ok(parsed.pop().unwrap_or_default())
    }

    /// Parses several texts with a single tokenizer call.
    ///
    /// Only a tokenizer failure is an error; words that cannot be resolved
    /// are left out of the result.
    pub async fn parse_many<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<ParsedText>> {
        let cleaned: Vec<String> = texts
            .iter()
            .map(|text| self.inner.preprocessor.clean(text.as_ref()))
            .collect();
        let streams = analyze_batch(&*self.inner.analyzer, &cleaned).await?;

        let mut parsed = Vec::with_capacity(cleaned.len());
        for (text, morphemes) in cleaned.iter().zip(streams) {
            let tokens: Vec<Token> = morphemes.into_iter().map(Token::from).collect();
            parsed.push(self.parse_tokens(text, tokens).await);
        }
        Ok(parsed)
    }

    async fn parse_tokens(&self, text: &str, tokens: Vec<Token>) -> ParsedText {
        let inner = &*self.inner;
        let context = RepairContext::new(&inner.lexicon, &inner.deconjugator);
        let tokens = inner.pipeline.run(&context, tokens);
        let tokens = CompoundResolver::new(&inner.lexicon, &inner.deconjugator, &inner.compounds, &*inner.cache)
            .resolve(tokens)
            .await;
        let sentences = assemble(text, tokens);

        let found = self.resolve_all(&sentences).await;
        let mut found = found.into_iter();
        let resolved: Vec<Vec<Vec<ResolvedWord>>> = sentences
            .iter()
            .map(|s| found.by_ref().take(s.tokens.len()).collect())
            .collect();
        let keys: Vec<Vec<Vec<(EntryId, u8)>>> = resolved
            .iter()
            .map(|s| s.iter().map(|t| t.iter().map(ResolvedWord::key).collect()).collect())
            .collect();
        let words = merge_words(resolved.into_iter().flatten().flatten());
        let examples = if inner.config.examples.enabled {
            select_examples(&sentences, &keys, &words)
        } else {
            vec![]
        };
        debug!(
            "{} sentences, {} tokens, {} words, {} examples",
            sentences.len(),
            sentences.iter().map(|s| s.tokens.len()).sum::<usize>(),
            words.len(),
            examples.len()
        );
        ParsedText { words, examples }
    }

    /// Words of every token, in text order. Batches run concurrently, each
    /// once it holds a permit; a batch that cannot get one in time stays
    /// unresolved.
    async fn resolve_all(&self, sentences: &[Sentence]) -> Vec<Vec<ResolvedWord>> {
        let tokens: Vec<Token> = sentences
            .iter()
            .flat_map(|s| s.tokens.iter().map(|span| span.token.clone()))
            .collect();
        let total = tokens.len();
        let batch_size = self.inner.config.resolution.batch_size.max(1);
        let permit_timeout = self.inner.config.resolution.permit_timeout;

        let mut tasks = JoinSet::new();
        for (index, batch) in tokens.chunks(batch_size).enumerate() {
            let batch = batch.to_vec();
            let resolver = self.inner.resolver.clone();
            let permits = self.inner.permits.clone();
            tasks.spawn(async move {
                let _permit = match timeout(permit_timeout, permits.acquire_owned()).await {
                    Ok(Ok(permit)) => permit,
                    Ok(Err(e)) => {
                        warn!("resolution permits closed: {}", e);
                        return (index, None);
                    }
                    Err(_) => {
                        warn!("no resolution permit within {:?}, {} tokens left unresolved", permit_timeout, batch.len());
                        return (index, None);
                    }
                };
                let mut words = Vec::with_capacity(batch.len());
                for token in &batch {
                    words.push(resolver.resolve_token(token).await);
                }
                (index, Some(words))
            });
        }

        let mut batches: Vec<Option<Vec<Vec<ResolvedWord>>>> = vec![None; (total + batch_size - 1) / batch_size];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, words)) => batches[index] = words,
                Err(e) => warn!("resolution task failed: {}", e),
            }
        }
        batches
            .into_iter()
            .zip(tokens.chunks(batch_size))
            .flat_map(|(words, batch)| words.unwrap_or_else(|| vec![vec![]; batch.len()]))
            .collect()
    }
}
