//! Read-only view of the dictionary: entries, their forms, and the lookup
//! table mapping every searchable string to candidate entries.

use std::{collections::HashMap, sync::Arc};

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::text::to_hiragana;

#[cfg(feature = "jmdict")]
mod embedded;
mod memory;
mod pos;

#[cfg(feature = "jmdict")]
pub use embedded::JmdictStore;
pub use memory::MemoryStore;
pub use pos::{DictPos, GodanRow, NameKind};

pub type EntryId = u32;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormType {
    Kanji,
    Kana,
}

/// One spelling of an entry.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DictForm {
    pub reading_index: u8,
    pub text: String,
    pub form_type: FormType,
    #[serde(default)]
    pub priorities: Vec<String>,
    #[serde(default)]
    pub search_only: bool,
    #[serde(default)]
    pub obsolete: bool,
    /// Absent from the latest dictionary release.
    #[serde(default)]
    pub inactive: bool,
}

impl DictForm {
    pub fn is_valid(&self) -> bool {
        !(self.search_only || self.obsolete || self.inactive)
    }

    pub fn is_kana(&self) -> bool {
        self.form_type == FormType::Kana
    }
}

#[serde_as]
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct DictEntry {
    pub id: EntryId,
    pub forms: Vec<DictForm>,
    #[serde_as(as = "Vec<DisplayFromStr>")]
    #[serde(default)]
    pub pos: Vec<DictPos>,
    #[serde(default)]
    pub priorities: Vec<String>,
    #[serde(default)]
    pub usually_kana: bool,
}

impl DictEntry {
    /// Entries whose every part of speech is a name class.
    pub fn is_name_only(&self) -> bool {
        !self.pos.is_empty() && self.pos.iter().all(DictPos::is_name)
    }

    pub fn is_expression(&self) -> bool {
        self.pos.contains(&DictPos::Expression)
    }

    pub fn form(&self, reading_index: u8) -> Option<&DictForm> {
        self.forms.iter().find(|f| f.reading_index == reading_index)
    }

    pub fn kana_forms(&self) -> impl Iterator<Item = &DictForm> {
        self.forms.iter().filter(|f| f.is_kana())
    }

    pub fn has_kana_reading(&self, reading: &str) -> bool {
        let reading = to_hiragana(reading);
        self.kana_forms().any(|f| to_hiragana(&f.text) == reading)
    }

    pub fn accepts(&self, pos: morph::PartOfSpeech) -> bool {
        self.pos.is_empty() || self.pos.iter().any(|p| p.compatible_with(pos))
    }
}

/// Backing store of dictionary entries.
#[async_trait]
pub trait DictionaryStore: Send + Sync {
    async fn entries(&self, ids: &[EntryId]) -> Result<Vec<DictEntry>>;

    /// Every searchable key with its candidate entries. Loaded once.
    async fn lookup_table(&self) -> Result<HashMap<String, Vec<EntryId>>>;

    async fn is_cache_initialized(&self) -> Result<bool>;
}

/// Lookup table plus a memo of fetched entries, shared by every parse.
pub struct Lexicon {
    store: Arc<dyn DictionaryStore>,
    lookup: HashMap<String, Vec<EntryId>>,
    memo: Mutex<HashMap<EntryId, Arc<DictEntry>>>,
}

impl Lexicon {
    pub async fn load(store: Arc<dyn DictionaryStore>) -> Result<Self> {
        if !store.is_cache_initialized().await? {
            bail!("dictionary store is not initialized");
        }
        let lookup = store.lookup_table().await?;
        info!("loaded {} dictionary lookup keys", lookup.len());
        Ok(Lexicon::new(store, lookup))
    }

    pub fn new(store: Arc<dyn DictionaryStore>, mut lookup: HashMap<String, Vec<EntryId>>) -> Self {
        for ids in lookup.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }
        Lexicon {
            store,
            lookup,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn candidates(&self, key: &str) -> &[EntryId] {
        self.lookup.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains_key(key)
    }

    /// Fetches entries, hitting the store only for ids never seen before.
    /// Unknown ids are skipped.
    pub async fn entries(&self, ids: &[EntryId]) -> Result<Vec<Arc<DictEntry>>> {
        let missing: Vec<EntryId> = {
            let memo = self.memo.lock();
            ids.iter().copied().filter(|id| !memo.contains_key(id)).collect()
        };
        if !missing.is_empty() {
            let fetched = self.store.entries(&missing).await?;
            debug!("fetched {} of {} dictionary entries", fetched.len(), missing.len());
            let mut memo = self.memo.lock();
            for entry in fetched {
                memo.insert(entry.id, Arc::new(entry));
            }
        }
        let memo = self.memo.lock();
        Ok(ids.iter().filter_map(|id| memo.get(id).cloned()).collect())
    }

    pub async fn entry(&self, id: EntryId) -> Result<Option<Arc<DictEntry>>> {
        Ok(self.entries(&[id]).await?.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> DictEntry {
        serde_json::from_str(
            r#"{
                "id": 7,
                "forms": [
                    {"reading_index": 0, "text": "表", "form_type": "kanji", "priorities": ["ichi1"]},
                    {"reading_index": 1, "text": "おもて", "form_type": "kana"}
                ],
                "pos": ["n"]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn entries_deserialize_with_defaults() {
        let entry = entry();
        assert_eq!(entry.pos, vec![DictPos::Noun]);
        assert!(entry.form(1).unwrap().is_kana());
        assert!(entry.has_kana_reading("オモテ"));
        assert!(!entry.is_name_only());
        assert!(entry.forms.iter().all(DictForm::is_valid));
    }

    #[tokio::test]
    async fn lexicon_dedups_and_memoizes() {
        let store = Arc::new(MemoryStore::new(vec![entry()]));
        let mut lookup = store.table();
        lookup.get_mut("表").unwrap().push(7);
        let lexicon = Lexicon::new(store, lookup);
        assert_eq!(lexicon.candidates("表"), &[7]);
        assert!(lexicon.candidates("裏").is_empty());
        let entries = lexicon.entries(&[7, 8]).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(lexicon.entry(7).await.unwrap().unwrap().id, 7);
    }
}
