use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use jmdict::{Enum, Priority, PriorityInCorpus};
use log::info;

use super::{DictEntry, DictForm, DictPos, DictionaryStore, EntryId, FormType, MemoryStore};

/// The JMdict copy embedded in the `jmdict` crate.
pub struct JmdictStore {
    inner: MemoryStore,
}

impl JmdictStore {
    pub fn new() -> Self {
        let entries: Vec<DictEntry> = jmdict::entries().map(convert).collect();
        info!("{} entries from the embedded JMdict", entries.len());
        JmdictStore {
            inner: MemoryStore::new(entries),
        }
    }
}

impl Default for JmdictStore {
    fn default() -> Self {
        JmdictStore::new()
    }
}

fn convert(entry: jmdict::Entry) -> DictEntry {
    let mut forms = vec![];
    let mut priorities: Vec<String> = vec![];
    for kanji in entry.kanji_elements() {
        let mut form = new_form(forms.len(), kanji.text, FormType::Kanji, &kanji.priority);
        for info in kanji.infos() {
            match info.code() {
                "sK" => form.search_only = true,
                "oK" => form.obsolete = true,
                _ => {}
            }
        }
        forms.push(form);
    }
    for reading in entry.reading_elements() {
        let mut form = new_form(forms.len(), reading.text, FormType::Kana, &reading.priority);
        for info in reading.infos() {
            match info.code() {
                "sk" => form.search_only = true,
                "ok" => form.obsolete = true,
                _ => {}
            }
        }
        forms.push(form);
    }
    for form in &forms {
        for tag in &form.priorities {
            if !priorities.contains(tag) {
                priorities.push(tag.clone());
            }
        }
    }

    let mut pos: Vec<DictPos> = vec![];
    let mut usually_kana = false;
    for sense in entry.senses() {
        for part in sense.parts_of_speech() {
            let tag = part.code().parse().unwrap_or(DictPos::Other(part.code().to_owned()));
            if !pos.contains(&tag) {
                pos.push(tag);
            }
        }
        usually_kana |= sense.infos().any(|info| info.code() == "uk");
    }
    DictEntry {
        id: entry.number,
        forms,
        pos,
        priorities,
        usually_kana,
    }
}

/// JMdict priority tags: news1, ichi2, gai1, spec1, nf12...
fn priority_tags(priority: &Priority) -> Vec<String> {
    let mut tags = vec![];
    let corpora = [
        ("news", &priority.news),
        ("ichi", &priority.ichimango),
        ("spec", &priority.additional),
        ("gai", &priority.loanwords),
    ];
    for (corpus, rank) in corpora {
        match rank {
            PriorityInCorpus::Primary => tags.push(format!("{}1", corpus)),
            PriorityInCorpus::Secondary => tags.push(format!("{}2", corpus)),
            PriorityInCorpus::Absent => {}
        }
    }
    if priority.frequency_bucket > 0 {
        tags.push(format!("nf{:02}", priority.frequency_bucket));
    }
    tags
}

// the embedded release has no history, so no form is ever inactive
fn new_form(index: usize, text: &str, form_type: FormType, priority: &Priority) -> DictForm {
    DictForm {
        reading_index: index.min(u8::MAX as usize - 1) as u8,
        text: text.to_owned(),
        form_type,
        priorities: priority_tags(priority),
        search_only: false,
        obsolete: false,
        inactive: false,
    }
}

#[async_trait]
impl DictionaryStore for JmdictStore {
    async fn entries(&self, ids: &[EntryId]) -> Result<Vec<DictEntry>> {
        self.inner.entries(ids).await
    }

    async fn lookup_table(&self) -> Result<HashMap<String, Vec<EntryId>>> {
        self.inner.lookup_table().await
    }

    async fn is_cache_initialized(&self) -> Result<bool> {
        Ok(!self.inner.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(kanji: &str, reading: &str) -> DictEntry {
        jmdict::entries()
            .find(|e| e.kanji_elements().any(|k| k.text == kanji) && e.reading_elements().any(|r| r.text == reading))
            .map(convert)
            .unwrap()
    }

    #[test]
    fn 食べる_keeps_its_priorities() {
        let entry = find("食べる", "たべる");
        assert!(entry.priorities.iter().any(|p| p == "ichi1"));
        assert!(entry.forms[0].priorities.iter().any(|p| p == "ichi1"));
        assert!(entry.forms.iter().all(DictForm::is_valid));
        assert!(!entry.usually_kana);
    }

    #[test]
    fn これ_is_usually_kana() {
        let entry = find("此れ", "これ");
        assert!(entry.usually_kana);
        assert!(entry.forms.iter().any(|f| f.text == "これ" && f.is_kana()));
    }
}
