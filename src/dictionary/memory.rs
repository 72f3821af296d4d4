use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::info;

use super::{DictEntry, DictionaryStore, EntryId};
use crate::text::{fold_long_vowels, to_hiragana};

/// Dictionary held entirely in memory, typically loaded from a JSON export.
pub struct MemoryStore {
    entries: HashMap<EntryId, DictEntry>,
    lookup: HashMap<String, Vec<EntryId>>,
}

impl MemoryStore {
    pub fn new(entries: Vec<DictEntry>) -> Self {
        let mut lookup: HashMap<String, Vec<EntryId>> = HashMap::new();
        for entry in &entries {
            for form in &entry.forms {
                let hiragana = to_hiragana(&form.text);
                let folded = fold_long_vowels(&hiragana);
                for key in [form.text.clone(), hiragana, folded] {
                    lookup.entry(key).or_default().push(entry.id);
                }
            }
        }
        MemoryStore {
            entries: entries.into_iter().map(|e| (e.id, e)).collect(),
            lookup,
        }
    }

    /// Parses a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<DictEntry> = serde_json::from_str(json)?;
        Ok(MemoryStore::new(entries))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let store = MemoryStore::from_json(&json).with_context(|| format!("invalid dictionary {}", path.display()))?;
        info!("{} dictionary entries from {}", store.entries.len(), path.display());
        Ok(store)
    }

    pub fn table(&self) -> HashMap<String, Vec<EntryId>> {
        self.lookup.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DictionaryStore for MemoryStore {
    async fn entries(&self, ids: &[EntryId]) -> Result<Vec<DictEntry>> {
        Ok(ids.iter().filter_map(|id| self.entries.get(id).cloned()).collect())
    }

    async fn lookup_table(&self) -> Result<HashMap<String, Vec<EntryId>>> {
        Ok(self.table())
    }

    async fn is_cache_initialized(&self) -> Result<bool> {
        Ok(true)
    }
}
