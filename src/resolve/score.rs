//! Ranking of (entry, form) candidates.
//!
//! Each component is computed on its own so tests and debug logs can show
//! why a candidate won.

use std::cmp::Ordering;

use crate::{
    dictionary::{DictEntry, DictForm},
    text::{common_prefix_len, fold_long_vowels, strip_elongation, to_hiragana},
};

const CUSTOM_PRIORITY: &str = "custom";

/// What a candidate is compared against.
#[derive(Clone, Debug, Default)]
pub struct ScoreInput<'a> {
    pub surface: &'a str,
    /// Text that found the candidate: the surface itself, or the dictionary
    /// form a deconjugation produced.
    pub target: &'a str,
    pub dictionary_form: &'a str,
    pub normalized_form: &'a str,
    pub reading: &'a str,
    pub process_len: usize,
    pub person_name_context: bool,
    pub conjugated: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ScoreBreakdown {
    pub entry: i32,
    pub frequency: i32,
    pub form: i32,
    pub validity: i32,
    pub surface: i32,
    pub lemma: i32,
    pub prefix: i32,
    pub reading: i32,
    pub process: i32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> i32 {
        self.entry
            + self.frequency
            + self.form
            + self.validity
            + self.surface
            + self.lemma
            + self.prefix
            + self.reading
            + self.process
    }
}

fn priority_weight(tag: &str) -> i32 {
    match tag {
        "ichi1" => 20,
        "news1" | "spec1" => 15,
        "gai1" => 10,
        "ichi2" | "news2" | "spec2" | "gai2" => 5,
        tag => tag
            .strip_prefix("nf")
            .and_then(|rank| rank.parse::<i32>().ok())
            .map_or(0, |rank| (50 - rank).max(0) / 5),
    }
}

fn entry_weight(entry: &DictEntry, input: &ScoreInput) -> i32 {
    let mut weight = 0;
    if entry.priorities.iter().any(|p| p == CUSTOM_PRIORITY) {
        weight += 50;
    }
    if entry.is_name_only() && !input.person_name_context {
        weight -= 60;
    }
    weight
}

fn form_weight(entry: &DictEntry, form: &DictForm) -> i32 {
    let mut weight = 0;
    if !form.priorities.is_empty() {
        weight += 8;
    }
    if entry.usually_kana && form.is_kana() {
        weight += 10;
    }
    weight
}

fn match_strength(form: &str, target: &str) -> i32 {
    if form == target {
        return 40;
    }
    let (form, target) = (to_hiragana(form), to_hiragana(target));
    if form == target {
        25
    } else if fold_long_vowels(&form) == fold_long_vowels(&target)
        || strip_elongation(&form) == strip_elongation(&target)
    {
        10
    } else {
        0
    }
}

fn reading_bonus(entry: &DictEntry, input: &ScoreInput) -> i32 {
    if input.reading.is_empty() {
        return 0;
    }
    if entry.has_kana_reading(input.reading) {
        return 15;
    }
    if input.conjugated {
        let reading = to_hiragana(input.reading);
        let stem_matches = entry.kana_forms().any(|f| {
            let text = to_hiragana(&f.text);
            let mut stem = text.chars();
            stem.next_back();
            !stem.as_str().is_empty() && reading.starts_with(stem.as_str())
        });
        if stem_matches {
            return 8;
        }
    }
    0
}

pub fn score(entry: &DictEntry, form: &DictForm, input: &ScoreInput) -> ScoreBreakdown {
    let mut lemma = 0;
    if form.text == input.dictionary_form && input.dictionary_form != input.surface {
        lemma += 12;
    } else if form.text == input.normalized_form
        && input.normalized_form != input.surface
        && input.normalized_form != input.dictionary_form
    {
        lemma += 8;
    }
    ScoreBreakdown {
        entry: entry_weight(entry, input),
        frequency: entry.priorities.iter().map(|p| priority_weight(p)).sum(),
        form: form_weight(entry, form),
        validity: if form.is_valid() || form.text == input.surface { 0 } else { -100 },
        surface: match_strength(&form.text, input.target),
        lemma,
        prefix: 2 * common_prefix_len(input.surface, &form.text) as i32,
        reading: reading_bonus(entry, input),
        process: -2 * input.process_len as i32,
    }
}

/// Higher score first, then lowest entry id, then lowest reading index.
pub fn rank(a: (i32, u32, u8), b: (i32, u32, u8)) -> Ordering {
    b.0.cmp(&a.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::FormType;

    fn form(index: u8, text: &str, form_type: FormType) -> DictForm {
        DictForm {
            reading_index: index,
            text: text.to_owned(),
            form_type,
            priorities: vec![],
            search_only: false,
            obsolete: false,
            inactive: false,
        }
    }

    fn entry(id: u32, forms: Vec<DictForm>) -> DictEntry {
        DictEntry {
            id,
            forms,
            pos: vec!["n".parse().unwrap()],
            priorities: vec![],
            usually_kana: false,
        }
    }

    fn input<'a>(surface: &'a str) -> ScoreInput<'a> {
        ScoreInput {
            surface,
            target: surface,
            dictionary_form: surface,
            normalized_form: surface,
            ..ScoreInput::default()
        }
    }

    #[test]
    fn exact_match_beats_phonetic_match() {
        let katakana = entry(1, vec![form(0, "テスト", FormType::Kana)]);
        let hiragana = entry(1, vec![form(0, "てすと", FormType::Kana)]);
        let exact = score(&katakana, &katakana.forms[0], &input("テスト"));
        let phonetic = score(&hiragana, &hiragana.forms[0], &input("テスト"));
        assert_eq!(exact.surface, 40);
        assert_eq!(phonetic.surface, 25);
        assert!(exact.total() > phonetic.total());
    }

    #[test]
    fn priorities_add_up() {
        let mut common = entry(1, vec![form(0, "猫", FormType::Kanji)]);
        common.priorities = vec!["ichi1".to_owned(), "news2".to_owned(), "nf10".to_owned()];
        let breakdown = score(&common, &common.forms[0], &input("猫"));
        assert_eq!(breakdown.frequency, 20 + 5 + 8);
        assert_eq!(priority_weight("nf48"), 0);
        assert_eq!(priority_weight("spec1"), 15);
    }

    #[test]
    fn hidden_forms_are_penalized_unless_typed_exactly() {
        let mut hidden = form(1, "ねこ", FormType::Kana);
        hidden.search_only = true;
        let cat = entry(1, vec![form(0, "猫", FormType::Kanji), hidden]);
        assert_eq!(score(&cat, &cat.forms[1], &input("ネコ")).validity, -100);
        assert_eq!(score(&cat, &cat.forms[1], &input("ねこ")).validity, 0);
    }

    #[test]
    fn reported_reading_picks_the_entry() {
        let hyou = entry(6, vec![form(0, "表", FormType::Kanji), form(1, "ひょう", FormType::Kana)]);
        let omote = entry(7, vec![form(0, "表", FormType::Kanji), form(1, "おもて", FormType::Kana)]);
        let reading = ScoreInput {
            reading: "オモテ",
            ..input("表")
        };
        let a = score(&hyou, &hyou.forms[0], &reading).total();
        let b = score(&omote, &omote.forms[0], &reading).total();
        assert!(b > a);
        assert_eq!(rank((a, 6, 0), (b, 7, 0)), Ordering::Greater);
    }

    #[test]
    fn names_lose_outside_name_context() {
        let mut name = entry(9, vec![form(0, "田中", FormType::Kanji)]);
        name.pos = vec!["surname".parse().unwrap()];
        assert_eq!(score(&name, &name.forms[0], &input("田中")).entry, -60);
        let in_context = ScoreInput {
            person_name_context: true,
            ..input("田中")
        };
        assert_eq!(score(&name, &name.forms[0], &in_context).entry, 0);
    }

    #[test]
    fn conjugated_words_match_on_the_stem_of_their_reading() {
        let eat = entry(3, vec![form(0, "食べる", FormType::Kanji), form(1, "たべる", FormType::Kana)]);
        let input = ScoreInput {
            surface: "食べた",
            target: "食べる",
            dictionary_form: "食べる",
            normalized_form: "食べる",
            reading: "タベタ",
            process_len: 1,
            conjugated: true,
            ..ScoreInput::default()
        };
        let breakdown = score(&eat, &eat.forms[0], &input);
        assert_eq!(breakdown.reading, 8);
        assert_eq!(breakdown.surface, 40);
        assert_eq!(breakdown.lemma, 12);
        assert_eq!(breakdown.process, -2);
    }

    #[test]
    fn ties_go_to_the_lowest_id() {
        assert_eq!(rank((10, 1, 0), (10, 2, 0)), Ordering::Less);
        assert_eq!(rank((10, 1, 1), (10, 1, 0)), Ordering::Greater);
        assert_eq!(rank((11, 9, 0), (10, 1, 0)), Ordering::Less);
    }
}
