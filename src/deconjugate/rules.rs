use super::{ConjTag, ConjugationForm};
use crate::{dictionary::GodanRow, text::vowel_of};

use ConjTag::*;

/// Only applies to the raw input.
const RAW: &[ConjTag] = &[];
const ADJ: &[ConjTag] = &[IAdjective];
const ICHI: &[ConjTag] = &[Ichidan];
const TE: &[ConjTag] = &[Te];
const TA: &[ConjTag] = &[Ta];
const MASU: &[ConjTag] = &[Masu];

/// `inflected` ending turned back into `base`, producing a form of class `produces`.
#[derive(Clone, Debug)]
pub struct Rule {
    pub inflected: String,
    pub base: String,
    /// Classes the inflected ending may carry; any rule applies to raw input.
    pub requires: &'static [ConjTag],
    pub produces: ConjTag,
    pub process: &'static [&'static str],
    /// May consume the whole word.
    pub bare: bool,
    pub guard: Option<fn(&str) -> bool>,
}

impl Rule {
    fn new(
        inflected: &str,
        base: &str,
        requires: &'static [ConjTag],
        produces: ConjTag,
        process: &'static [&'static str],
    ) -> Self {
        Rule {
            inflected: inflected.to_owned(),
            base: base.to_owned(),
            requires,
            produces,
            process,
            bare: false,
            guard: None,
        }
    }

    fn bare(mut self) -> Self {
        self.bare = true;
        self
    }

    fn guarded(mut self, guard: fn(&str) -> bool) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn apply(&self, form: &ConjugationForm) -> Option<ConjugationForm> {
        if let Some(last) = form.last_tag() {
            if !self.requires.contains(&last) {
                return None;
            }
        }
        let stem = form.text.strip_suffix(self.inflected.as_str())?;
        if stem.is_empty() && !self.bare {
            return None;
        }
        if let Some(guard) = self.guard {
            if !guard(stem) {
                return None;
            }
        }
        let text = format!("{}{}", stem, self.base);
        if text.is_empty() || form.seen.contains(&text) {
            return None;
        }
        let mut seen = form.seen.clone();
        seen.insert(text.clone());
        let mut tags = form.tags.clone();
        tags.push(self.produces);
        let process = self
            .process
            .iter()
            .map(|s| s.to_string())
            .chain(form.process.iter().cloned())
            .collect();
        Some(ConjugationForm::new(text, form.original_text.clone(), tags, seen, process))
    }
}

struct Row {
    row: GodanRow,
    u: &'static str,
    a: &'static str,
    i: &'static str,
    e: &'static str,
    o: &'static str,
    te: &'static str,
    ta: &'static str,
}

#[rustfmt::skip]
const ROWS: [Row; 9] = [
    Row { row: GodanRow::Ku, u: "く", a: "か", i: "き", e: "け", o: "こ", te: "いて", ta: "いた" },
    Row { row: GodanRow::Gu, u: "ぐ", a: "が", i: "ぎ", e: "げ", o: "ご", te: "いで", ta: "いだ" },
    Row { row: GodanRow::Su, u: "す", a: "さ", i: "し", e: "せ", o: "そ", te: "して", ta: "した" },
    Row { row: GodanRow::Tsu, u: "つ", a: "た", i: "ち", e: "て", o: "と", te: "って", ta: "った" },
    Row { row: GodanRow::Nu, u: "ぬ", a: "な", i: "に", e: "ね", o: "の", te: "んで", ta: "んだ" },
    Row { row: GodanRow::Bu, u: "ぶ", a: "ば", i: "び", e: "べ", o: "ぼ", te: "んで", ta: "んだ" },
    Row { row: GodanRow::Mu, u: "む", a: "ま", i: "み", e: "め", o: "も", te: "んで", ta: "んだ" },
    Row { row: GodanRow::Ru, u: "る", a: "ら", i: "り", e: "れ", o: "ろ", te: "って", ta: "った" },
    Row { row: GodanRow::U, u: "う", a: "わ", i: "い", e: "え", o: "お", te: "って", ta: "った" },
];

fn godan() -> Vec<Rule> {
    let mut rules = vec![];
    for r in &ROWS {
        let g = Godan(r.row);
        let with = |kana: &str, ending: &str| format!("{}{}", kana, ending);
        rules.extend([
            Rule::new(&with(r.a, "ない"), r.u, ADJ, g, &["negative"]),
            Rule::new(&with(r.a, "ず"), r.u, RAW, g, &["negative"]),
            Rule::new(&with(r.a, "ぬ"), r.u, RAW, g, &["negative"]),
            Rule::new(&with(r.a, "ん"), r.u, RAW, g, &["negative"]),
            Rule::new(r.ta, r.u, TA, g, &["past"]),
            Rule::new(r.te, r.u, TE, g, &["te"]),
            Rule::new(&with(r.i, "ます"), r.u, MASU, g, &["polite"]),
            Rule::new(r.i, r.u, RAW, g, &["stem"]),
            Rule::new(&with(r.i, "たい"), r.u, ADJ, g, &["desire"]),
            Rule::new(&with(r.i, "そう"), r.u, RAW, g, &["appearance"]),
            Rule::new(&with(r.i, "ながら"), r.u, RAW, g, &["while"]),
            Rule::new(&with(r.i, "すぎる"), r.u, ICHI, g, &["excess"]),
            Rule::new(&with(r.i, "なさい"), r.u, RAW, g, &["command"]),
            Rule::new(&with(r.e, "る"), r.u, ICHI, g, &["potential"]),
            Rule::new(&with(r.a, "れる"), r.u, ICHI, g, &["passive"]),
            Rule::new(&with(r.a, "せる"), r.u, ICHI, g, &["causative"]),
            Rule::new(&with(r.o, "う"), r.u, RAW, g, &["volitional"]),
            Rule::new(r.e, r.u, RAW, g, &["imperative"]),
            Rule::new(&with(r.e, "ば"), r.u, RAW, g, &["conditional"]),
        ]);
        let causative_passive = if r.row == GodanRow::Su { "させられる" } else { "される" };
        let inflected = if r.row == GodanRow::Su {
            causative_passive.to_owned()
        } else {
            with(r.a, causative_passive)
        };
        rules.push(Rule::new(&inflected, r.u, ICHI, g, &["causative passive"]));
    }

    let iku = Godan(GodanRow::Iku);
    for (inflected, base) in [("いって", "いく"), ("行って", "行く")] {
        rules.push(Rule::new(inflected, base, TE, iku, &["te"]).bare());
    }
    for (inflected, base) in [("いった", "いく"), ("行った", "行く")] {
        rules.push(Rule::new(inflected, base, TA, iku, &["past"]).bare());
    }

    let aru = Godan(GodanRow::Aru);
    rules.push(Rule::new("います", "る", MASU, aru, &["polite"]));
    rules.push(Rule::new("い", "る", RAW, aru, &["imperative"]));
    rules
}

fn ends_in_ichidan_stem(stem: &str) -> bool {
    stem.chars()
        .last()
        .and_then(vowel_of)
        .map_or(false, |vowel| vowel == 'え' || vowel == 'い')
}

fn ichidan() -> Vec<Rule> {
    vec![
        Rule::new("ない", "る", ADJ, Ichidan, &["negative"]),
        Rule::new("ず", "る", RAW, Ichidan, &["negative"]),
        Rule::new("ぬ", "る", RAW, Ichidan, &["negative"]),
        Rule::new("ん", "る", RAW, Ichidan, &["negative"]),
        Rule::new("た", "る", TA, Ichidan, &["past"]),
        Rule::new("て", "る", TE, Ichidan, &["te"]),
        Rule::new("ます", "る", MASU, Ichidan, &["polite"]),
        Rule::new("", "る", RAW, Ichidan, &["stem"]).guarded(ends_in_ichidan_stem),
        Rule::new("られる", "る", ICHI, Ichidan, &["passive"]),
        Rule::new("れる", "る", ICHI, Ichidan, &["potential"]),
        Rule::new("させる", "る", ICHI, Ichidan, &["causative"]),
        Rule::new("させられる", "る", ICHI, Ichidan, &["causative passive"]),
        Rule::new("よう", "る", RAW, Ichidan, &["volitional"]),
        Rule::new("ろ", "る", RAW, Ichidan, &["imperative"]),
        Rule::new("よ", "る", RAW, Ichidan, &["imperative"]),
        Rule::new("れば", "る", RAW, Ichidan, &["conditional"]),
        Rule::new("たい", "る", ADJ, Ichidan, &["desire"]),
        Rule::new("ながら", "る", RAW, Ichidan, &["while"]),
        Rule::new("そう", "る", RAW, Ichidan, &["appearance"]),
        Rule::new("すぎる", "る", ICHI, Ichidan, &["excess"]),
        Rule::new("なさい", "る", RAW, Ichidan, &["command"]),
    ]
}

fn suru() -> Vec<Rule> {
    let rules: [(&str, &'static [ConjTag], &'static [&'static str]); 17] = [
        ("しない", ADJ, &["negative"]),
        ("せず", RAW, &["negative"]),
        ("した", TA, &["past"]),
        ("して", TE, &["te"]),
        ("します", MASU, &["polite"]),
        ("し", RAW, &["stem"]),
        ("しよう", RAW, &["volitional"]),
        ("しろ", RAW, &["imperative"]),
        ("せよ", RAW, &["imperative"]),
        ("すれば", RAW, &["conditional"]),
        ("される", ICHI, &["passive"]),
        ("させる", ICHI, &["causative"]),
        ("させられる", ICHI, &["causative passive"]),
        ("したい", ADJ, &["desire"]),
        ("しそう", RAW, &["appearance"]),
        ("しながら", RAW, &["while"]),
        ("しすぎる", ICHI, &["excess"]),
    ];
    rules
        .into_iter()
        .map(|(inflected, requires, process)| Rule::new(inflected, "する", requires, Suru, process).bare())
        .collect()
}

fn kuru() -> Vec<Rule> {
    let endings: [(&str, &str, &'static [ConjTag], &'static [&'static str]); 9] = [
        ("こない", "来ない", ADJ, &["negative"]),
        ("きた", "来た", TA, &["past"]),
        ("きて", "来て", TE, &["te"]),
        ("きます", "来ます", MASU, &["polite"]),
        ("こよう", "来よう", RAW, &["volitional"]),
        ("こい", "来い", RAW, &["imperative"]),
        ("くれば", "来れば", RAW, &["conditional"]),
        ("こられる", "来られる", ICHI, &["passive"]),
        ("こさせる", "来させる", ICHI, &["causative"]),
    ];
    let mut rules = vec![];
    for (kana, kanji, requires, process) in endings {
        rules.push(Rule::new(kana, "くる", requires, Kuru, process).bare());
        rules.push(Rule::new(kanji, "来る", requires, Kuru, process).bare());
    }
    rules
}

fn i_adjective() -> Vec<Rule> {
    let mut rules = vec![
        Rule::new("かった", "い", TA, IAdjective, &["past"]),
        Rule::new("くない", "い", ADJ, IAdjective, &["negative"]),
        Rule::new("くありません", "い", RAW, IAdjective, &["polite negative"]),
        Rule::new("く", "い", RAW, IAdjective, &["adverbial"]),
        Rule::new("くて", "い", TE, IAdjective, &["te"]),
        Rule::new("くなる", "い", &[Godan(GodanRow::Ru)], IAdjective, &["become"]),
        Rule::new("さ", "い", RAW, IAdjective, &["noun"]),
        Rule::new("そう", "い", RAW, IAdjective, &["appearance"]),
        Rule::new("ければ", "い", RAW, IAdjective, &["conditional"]),
        Rule::new("かろう", "い", RAW, IAdjective, &["presumptive"]),
        Rule::new("すぎる", "い", ICHI, IAdjective, &["excess"]),
    ];
    // いい conjugates from its older form よい
    let ii: [(&str, &'static [ConjTag], &'static [&'static str]); 6] = [
        ("よかった", TA, &["past"]),
        ("よくない", ADJ, &["negative"]),
        ("よく", RAW, &["adverbial"]),
        ("よくて", TE, &["te"]),
        ("よければ", RAW, &["conditional"]),
        ("よさそう", RAW, &["appearance"]),
    ];
    for (inflected, requires, process) in ii {
        rules.push(Rule::new(inflected, "いい", requires, IAdjective, process).bare());
    }
    rules
}

fn copula() -> Vec<Rule> {
    vec![
        Rule::new("だった", "だ", TA, Copula, &["past"]).bare(),
        Rule::new("でした", "です", TA, Copula, &["past"]).bare(),
        Rule::new("じゃない", "だ", ADJ, Copula, &["negative"]).bare(),
        Rule::new("ではない", "だ", ADJ, Copula, &["negative"]).bare(),
        Rule::new("じゃありません", "だ", RAW, Copula, &["polite negative"]).bare(),
        Rule::new("ではありません", "だ", RAW, Copula, &["polite negative"]).bare(),
        Rule::new("でしょう", "です", RAW, Copula, &["presumptive"]).bare(),
        Rule::new("だろう", "だ", RAW, Copula, &["presumptive"]).bare(),
        Rule::new("なら", "だ", RAW, Copula, &["conditional"]).bare(),
        Rule::new("で", "だ", TE, Copula, &["te"]).bare(),
    ]
}

fn polite() -> Vec<Rule> {
    vec![
        Rule::new("ました", "ます", TA, Masu, &["past"]),
        Rule::new("ません", "ます", RAW, Masu, &["negative"]),
        Rule::new("ませんでした", "ます", RAW, Masu, &["negative", "past"]),
        Rule::new("ましょう", "ます", RAW, Masu, &["volitional"]),
        Rule::new("まして", "ます", TE, Masu, &["te"]),
        Rule::new("ませ", "ます", RAW, Masu, &["imperative"]),
    ]
}

fn aspect() -> Vec<Rule> {
    const GODAN_U: &[ConjTag] = &[Godan(GodanRow::U)];
    const GODAN_KU: &[ConjTag] = &[Godan(GodanRow::Ku)];
    const GODAN_RU: &[ConjTag] = &[Godan(GodanRow::Ru)];
    const IKU: &[ConjTag] = &[Godan(GodanRow::Iku), Godan(GodanRow::Ku)];
    const KURU: &[ConjTag] = &[Kuru];
    let endings: [(&str, &'static [ConjTag], &'static [&'static str]); 12] = [
        ("いる", ICHI, &["progressive"]),
        ("る", ICHI, &["progressive"]),
        ("しまう", GODAN_U, &["completion"]),
        ("おく", GODAN_KU, &["preparation"]),
        ("ある", GODAN_RU, &["resultative"]),
        ("みる", ICHI, &["attempt"]),
        ("くれる", ICHI, &["favour"]),
        ("いく", IKU, &["direction away"]),
        ("くる", KURU, &["direction toward"]),
        ("ください", RAW, &["request"]),
        ("も", RAW, &["concessive"]),
        ("は", RAW, &["topic"]),
    ];
    let mut rules = vec![];
    for (ending, requires, process) in endings {
        for te in ["て", "で"] {
            rules.push(Rule::new(&format!("{}{}", te, ending), te, requires, Te, process));
        }
    }
    rules.extend([
        Rule::new("ちゃう", "て", GODAN_U, Te, &["completion"]),
        Rule::new("じゃう", "で", GODAN_U, Te, &["completion"]),
        Rule::new("とく", "て", GODAN_KU, Te, &["preparation"]),
        Rule::new("どく", "で", GODAN_KU, Te, &["preparation"]),
        Rule::new("たら", "た", RAW, Ta, &["conditional"]),
        Rule::new("だら", "だ", RAW, Ta, &["conditional"]),
        Rule::new("たり", "た", RAW, Ta, &["alternative"]),
        Rule::new("だり", "だ", RAW, Ta, &["alternative"]),
    ]);
    rules
}

/// The complete rule table, in the order rules are tried.
pub fn standard_rules() -> Vec<Rule> {
    let mut rules = vec![];
    rules.extend(godan());
    rules.extend(ichidan());
    rules.extend(suru());
    rules.extend(kuru());
    rules.extend(i_adjective());
    rules.extend(copula());
    rules.extend(polite());
    rules.extend(aspect());
    rules
}
