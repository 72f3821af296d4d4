//! Recovers dictionary forms from inflected text.
//!
//! Rules strip an inflected ending and put back the ending of a less inflected
//! form, recording the word class the result belongs to. They are applied
//! breadth first until nothing new turns up: a rule only applies to the raw
//! input or to a form whose class is one the rule's ending can follow.

use std::{
    collections::{hash_map::DefaultHasher, HashMap, HashSet},
    hash::{Hash, Hasher},
    sync::Arc,
};

use log::trace;
use parking_lot::Mutex;

use crate::dictionary::{DictPos, GodanRow};

mod rules;

pub use rules::{standard_rules, Rule};

const MAX_DEPTH: usize = 10;
const MEMO_LIMIT: usize = 100_000;

/// Word class reached after undoing an inflection.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ConjTag {
    Ichidan,
    Godan(GodanRow),
    Suru,
    Kuru,
    IAdjective,
    Copula,
    // not dictionary forms, only links between two rules
    Masu,
    Te,
    Ta,
}

impl ConjTag {
    /// Tags describing a dictionary form, as opposed to intermediate links.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ConjTag::Masu | ConjTag::Te | ConjTag::Ta)
    }

    /// Whether an entry tagged `pos` conjugates the way this tag says.
    pub fn matches(self, pos: &DictPos) -> bool {
        match (self, pos) {
            (ConjTag::Ichidan, DictPos::Ichidan) => true,
            (ConjTag::Godan(row), DictPos::Godan(other)) => row.conjugates_like(*other),
            (ConjTag::Suru, DictPos::Suru) => true,
            (ConjTag::Kuru, DictPos::Kuru) => true,
            (ConjTag::IAdjective, pos) => pos.is_i_adjective(),
            (ConjTag::Copula, DictPos::Copula | DictPos::Auxiliary | DictPos::AuxiliaryVerb) => true,
            _ => false,
        }
    }
}

/// A candidate dictionary form and how it was reached.
#[derive(Clone, Debug)]
pub struct ConjugationForm {
    pub text: String,
    pub original_text: String,
    pub tags: Vec<ConjTag>,
    pub seen: HashSet<String>,
    /// Operations in the order they were applied to the dictionary form.
    pub process: Vec<String>,
    hash: u64,
}

impl ConjugationForm {
    pub fn new(
        text: String,
        original_text: String,
        tags: Vec<ConjTag>,
        seen: HashSet<String>,
        process: Vec<String>,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        original_text.hash(&mut hasher);
        tags.hash(&mut hasher);
        process.hash(&mut hasher);
        let seen_hash = seen.iter().fold(0u64, |acc, s| {
            let mut h = DefaultHasher::new();
            s.hash(&mut h);
            acc ^ h.finish()
        });
        hasher.write_u64(seen_hash);
        ConjugationForm {
            text,
            original_text,
            tags,
            seen,
            process,
            hash: hasher.finish(),
        }
    }

    fn raw(text: &str) -> Self {
        ConjugationForm::new(
            text.to_owned(),
            text.to_owned(),
            vec![],
            HashSet::from([text.to_owned()]),
            vec![],
        )
    }

    pub fn last_tag(&self) -> Option<ConjTag> {
        self.tags.last().copied()
    }

    /// The word class of `text`, when it is a dictionary form.
    pub fn terminal_tag(&self) -> Option<ConjTag> {
        self.last_tag().filter(|t| t.is_terminal())
    }
}

impl PartialEq for ConjugationForm {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.text == other.text
            && self.original_text == other.original_text
            && self.tags == other.tags
            && self.seen == other.seen
            && self.process == other.process
    }
}

impl Eq for ConjugationForm {}

impl Hash for ConjugationForm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

pub struct Deconjugator {
    rules: Vec<Rule>,
    memo: Mutex<HashMap<String, Arc<HashSet<ConjugationForm>>>>,
}

impl Default for Deconjugator {
    fn default() -> Self {
        Deconjugator::new(standard_rules())
    }
}

impl Deconjugator {
    pub fn new(rules: Vec<Rule>) -> Self {
        Deconjugator {
            rules,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Every form reachable from `text`. Empty when no rule matches.
    pub fn deconjugate(&self, text: &str) -> Arc<HashSet<ConjugationForm>> {
        if let Some(forms) = self.memo.lock().get(text) {
            return forms.clone();
        }
        let forms = Arc::new(self.compute(text));
        let mut memo = self.memo.lock();
        if memo.len() >= MEMO_LIMIT {
            memo.clear();
        }
        memo.insert(text.to_owned(), forms.clone());
        forms
    }

    fn compute(&self, text: &str) -> HashSet<ConjugationForm> {
        let mut results = HashSet::new();
        if text.is_empty() {
            return results;
        }
        let mut frontier = vec![ConjugationForm::raw(text)];
        for _ in 0..MAX_DEPTH {
            let mut next = vec![];
            for form in &frontier {
                for rule in &self.rules {
                    if let Some(derived) = rule.apply(form) {
                        if results.insert(derived.clone()) {
                            next.push(derived);
                        }
                    }
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }
        trace!("{:?} deconjugates into {} forms", text, results.len());
        results
    }

    /// Forms ending in a word class, fewest operations first.
    pub fn dictionary_forms(&self, text: &str) -> Vec<ConjugationForm> {
        let mut forms: Vec<ConjugationForm> = self
            .deconjugate(text)
            .iter()
            .filter(|f| f.terminal_tag().is_some())
            .cloned()
            .collect();
        forms.sort_by(|a, b| {
            a.process
                .len()
                .cmp(&b.process.len())
                .then_with(|| a.text.cmp(&b.text))
                .then_with(|| format!("{:?}", a.tags).cmp(&format!("{:?}", b.tags)))
        });
        forms
    }

    pub fn deconjugates_to(&self, text: &str, lemma: &str) -> bool {
        self.deconjugate(text)
            .iter()
            .any(|f| f.text == lemma && f.terminal_tag().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(deconjugator: &Deconjugator, text: &str, lemma: &str, tag: ConjTag) -> Option<ConjugationForm> {
        deconjugator
            .dictionary_forms(text)
            .into_iter()
            .find(|f| f.text == lemma && f.terminal_tag() == Some(tag))
    }

    #[test]
    fn 食べなかった_is_negative_past_of_食べる() {
        let deconjugator = Deconjugator::default();
        let form = find(&deconjugator, "食べなかった", "食べる", ConjTag::Ichidan).unwrap();
        assert_eq!(form.process, vec!["negative", "past"]);
        assert_eq!(form.original_text, "食べなかった");
    }

    #[test]
    fn conjugations_lead_back_to_their_class() {
        let deconjugator = Deconjugator::default();
        let cases = [
            ("書いた", "書く", ConjTag::Godan(GodanRow::Ku)),
            ("読んでいます", "読む", ConjTag::Godan(GodanRow::Mu)),
            ("勉強しました", "勉強する", ConjTag::Suru),
            ("来なかった", "来る", ConjTag::Kuru),
            ("高くなかった", "高い", ConjTag::IAdjective),
            ("静かだった", "静かだ", ConjTag::Copula),
            ("行った", "行く", ConjTag::Godan(GodanRow::Iku)),
            ("話せる", "話す", ConjTag::Godan(GodanRow::Su)),
            ("見られた", "見る", ConjTag::Ichidan),
            ("待ってください", "待つ", ConjTag::Godan(GodanRow::Tsu)),
            ("食べたら", "食べる", ConjTag::Ichidan),
            ("よかった", "いい", ConjTag::IAdjective),
        ];
        for (text, lemma, tag) in cases {
            assert!(find(&deconjugator, text, lemma, tag).is_some(), "{} -> {}", text, lemma);
        }
    }

    #[test]
    fn unknown_text_gives_nothing() {
        let deconjugator = Deconjugator::default();
        assert!(deconjugator.deconjugate("ｘｙｚ").is_empty());
        assert!(deconjugator.deconjugate("").is_empty());
    }

    #[test]
    fn forms_never_revisit_their_own_text() {
        let deconjugator = Deconjugator::default();
        for form in deconjugator.deconjugate("食べさせられなかった").iter() {
            assert_ne!(form.text, form.original_text);
            assert!(form.seen.contains(&form.text));
            assert!(form.seen.len() == form.tags.len() + 1);
        }
    }

    #[test]
    fn equality_ignores_seen_order() {
        let a = ConjugationForm::new(
            "見る".to_owned(),
            "見た".to_owned(),
            vec![ConjTag::Ichidan],
            HashSet::from(["見た".to_owned(), "見る".to_owned()]),
            vec!["past".to_owned()],
        );
        let b = ConjugationForm::new(
            "見る".to_owned(),
            "見た".to_owned(),
            vec![ConjTag::Ichidan],
            HashSet::from(["見る".to_owned(), "見た".to_owned()]),
            vec!["past".to_owned()],
        );
        assert_eq!(a, b);
        assert_eq!(HashSet::from([a.clone()]).len(), HashSet::from([a, b]).len());
    }

    #[test]
    fn memoized_results_are_shared() {
        let deconjugator = Deconjugator::default();
        let first = deconjugator.deconjugate("食べた");
        let second = deconjugator.deconjugate("食べた");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(deconjugator.deconjugates_to("食べた", "食べる"));
    }
}
