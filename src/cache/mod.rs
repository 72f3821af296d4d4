//! Memoized resolutions and compound validity.

use std::{
    borrow::Borrow,
    collections::{HashMap, VecDeque},
    hash::Hash,
};

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use morph::PartOfSpeech;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::{dictionary::EntryId, resolve::Origin, token::Token};

/// Everything about a token that can change how it resolves.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ResolutionKey {
    pub surface: String,
    pub pos: PartOfSpeech,
    pub dictionary_form: String,
    pub reading: String,
    pub person_name_context: bool,
    pub name_like: bool,
    /// Substring rescans of a token are cached apart from its regular resolution.
    pub rescue: bool,
}

impl ResolutionKey {
    pub fn of(token: &Token) -> Self {
        ResolutionKey {
            surface: token.surface.clone(),
            pos: token.pos,
            dictionary_form: token.dictionary_form.clone(),
            reading: token.reading.clone(),
            person_name_context: token.person_name_context,
            name_like: token.is_name_like(),
            rescue: false,
        }
    }

    pub fn rescue_of(token: &Token) -> Self {
        ResolutionKey {
            rescue: true,
            ..ResolutionKey::of(token)
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum CachedResolution {
    Found {
        entry_id: EntryId,
        reading_index: u8,
        conjugations: Vec<String>,
        origin: Origin,
    },
    Missing,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CompoundValidity {
    pub valid: bool,
    pub entry_id: Option<EntryId>,
}

impl CompoundValidity {
    pub fn invalid() -> Self {
        CompoundValidity {
            valid: false,
            entry_id: None,
        }
    }

    pub fn valid(entry_id: EntryId) -> Self {
        CompoundValidity {
            valid: true,
            entry_id: Some(entry_id),
        }
    }
}

/// External cache shared across processes. Callers treat every error as a miss.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get_resolution(&self, key: &ResolutionKey) -> Result<Option<CachedResolution>>;

    async fn set_resolution(&self, key: ResolutionKey, value: CachedResolution) -> Result<()>;

    async fn get_compound(&self, key: &str) -> Result<Option<CompoundValidity>>;

    async fn set_compound(&self, key: String, value: CompoundValidity) -> Result<()>;
}

pub const DEFAULT_RESOLUTION_CAPACITY: usize = 500_000;

/// Bounded map; when full the oldest quarter of the keys goes at once.
struct Fifo<K, V> {
    capacity: usize,
    map: HashMap<K, V>,
    order: VecDeque<K>,
}

impl<K: Hash + Eq + Clone, V: Clone> Fifo<K, V> {
    fn new(capacity: usize) -> Self {
        Fifo {
            capacity: capacity.max(1),
            map: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.map.get(key).cloned()
    }

    /// Returns how many keys were evicted to make room.
    fn insert(&mut self, key: K, value: V) -> usize {
        if let Some(existing) = self.map.get_mut(&key) {
            *existing = value;
            return 0;
        }
        let mut evicted = 0;
        if self.map.len() >= self.capacity {
            for _ in 0..(self.capacity / 4).max(1) {
                if let Some(oldest) = self.order.pop_front() {
                    self.map.remove(&oldest);
                    evicted += 1;
                }
            }
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
        evicted
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// In-process [`CacheStore`], bounded like [`CompoundCache`].
pub struct MemoryCacheStore {
    resolutions: RwLock<Fifo<ResolutionKey, CachedResolution>>,
    compounds: RwLock<Fifo<String, CompoundValidity>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        MemoryCacheStore::with_capacity(DEFAULT_RESOLUTION_CAPACITY)
    }

    /// `capacity` resolutions and as many compound keys.
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryCacheStore {
            resolutions: RwLock::new(Fifo::new(capacity)),
            compounds: RwLock::new(Fifo::new(capacity)),
        }
    }

    pub fn resolution_count(&self) -> usize {
        self.resolutions.read().len()
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        MemoryCacheStore::new()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get_resolution(&self, key: &ResolutionKey) -> Result<Option<CachedResolution>> {
        Ok(self.resolutions.read().get(key))
    }

    async fn set_resolution(&self, key: ResolutionKey, value: CachedResolution) -> Result<()> {
        let evicted = self.resolutions.write().insert(key, value);
        if evicted > 0 {
            debug!("resolution cache full, evicted {} keys", evicted);
        }
        Ok(())
    }

    async fn get_compound(&self, key: &str) -> Result<Option<CompoundValidity>> {
        Ok(self.compounds.read().get(key))
    }

    async fn set_compound(&self, key: String, value: CompoundValidity) -> Result<()> {
        self.compounds.write().insert(key, value);
        Ok(())
    }
}

/// In-process compound validity cache in front of the [`CacheStore`].
pub struct CompoundCache {
    inner: Mutex<Fifo<String, CompoundValidity>>,
}

impl CompoundCache {
    pub fn new(capacity: usize) -> Self {
        CompoundCache {
            inner: Mutex::new(Fifo::new(capacity)),
        }
    }

    pub fn get(&self, key: &str) -> Option<CompoundValidity> {
        self.inner.lock().get(key)
    }

    pub fn insert(&self, key: String, value: CompoundValidity) {
        let evicted = self.inner.lock().insert(key, value);
        if evicted > 0 {
            debug!("compound cache full, evicted {} keys", evicted);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity
    }
}
