use std::fmt;

use serde::{Deserialize, Serialize};

/// Primary part of speech, the first field of a morpheme's POS hierarchy.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    Pronoun,
    Verb,
    IAdjective,
    NaAdjective,
    Adverb,
    Adnominal,
    Conjunction,
    Interjection,
    Particle,
    Auxiliary,
    Prefix,
    Suffix,
    Symbol,
    SupplementarySymbol,
    Whitespace,
    // produced by the compound resolvers, never by a tokenizer
    Expression,
    Unknown,
}

impl PartOfSpeech {
    // 名詞: noun
    // 代名詞: pronoun
    // 動詞: verb
    // 形容詞: i-adjective
    // 形状詞 / 形容動詞: na-adjective
    // 連体詞: adnominal
    // 助詞: particle
    // 助動詞: auxiliary verb
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "名詞" => PartOfSpeech::Noun,
            "代名詞" => PartOfSpeech::Pronoun,
            "動詞" => PartOfSpeech::Verb,
            "形容詞" => PartOfSpeech::IAdjective,
            "形状詞" | "形容動詞" => PartOfSpeech::NaAdjective,
            "副詞" => PartOfSpeech::Adverb,
            "連体詞" => PartOfSpeech::Adnominal,
            "接続詞" => PartOfSpeech::Conjunction,
            "感動詞" | "フィラー" => PartOfSpeech::Interjection,
            "助詞" => PartOfSpeech::Particle,
            "助動詞" => PartOfSpeech::Auxiliary,
            "接頭辞" | "接頭詞" => PartOfSpeech::Prefix,
            "接尾辞" => PartOfSpeech::Suffix,
            "記号" => PartOfSpeech::Symbol,
            "補助記号" => PartOfSpeech::SupplementarySymbol,
            "空白" => PartOfSpeech::Whitespace,
            _ => PartOfSpeech::Unknown,
        }
    }

    /// Verbs, i-adjectives and auxiliaries conjugate.
    pub fn is_inflectable(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::Verb | PartOfSpeech::IAdjective | PartOfSpeech::Auxiliary
        )
    }

    pub fn is_symbolic(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::Symbol | PartOfSpeech::SupplementarySymbol | PartOfSpeech::Whitespace
        )
    }

    pub fn is_nominal(&self) -> bool {
        matches!(
            self,
            PartOfSpeech::Noun | PartOfSpeech::Pronoun | PartOfSpeech::Prefix | PartOfSpeech::Suffix
        )
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, formatter)
    }
}

/// Finer sub-classification carried by the 2nd to 4th POS fields.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PosSection {
    Common,
    ProperNoun,
    PersonName,
    FamilyName,
    GivenName,
    PlaceName,
    Numeral,
    SuruPossible,
    AdjectivalPossible,
    AdverbialPossible,
    Counter,
    NonIndependent,
    CaseParticle,
    BindingParticle,
    ConjunctiveParticle,
    AdverbialParticle,
    SentenceEndingParticle,
    QuasiParticle,
    Period,
    Comma,
    BracketOpen,
    BracketClose,
}

const SECTIONS: [PosSection; 22] = [
    PosSection::Common,
    PosSection::ProperNoun,
    PosSection::PersonName,
    PosSection::FamilyName,
    PosSection::GivenName,
    PosSection::PlaceName,
    PosSection::Numeral,
    PosSection::SuruPossible,
    PosSection::AdjectivalPossible,
    PosSection::AdverbialPossible,
    PosSection::Counter,
    PosSection::NonIndependent,
    PosSection::CaseParticle,
    PosSection::BindingParticle,
    PosSection::ConjunctiveParticle,
    PosSection::AdverbialParticle,
    PosSection::SentenceEndingParticle,
    PosSection::QuasiParticle,
    PosSection::Period,
    PosSection::Comma,
    PosSection::BracketOpen,
    PosSection::BracketClose,
];

impl PosSection {
    // 普通名詞: common noun
    // 固有名詞: proper noun
    //   人名: person name, 姓: family name, 名: given name, 地名: place name
    // 数詞 / 数: numeral
    // サ変可能 / サ変接続: can take する
    // 形状詞可能 / 形容動詞語幹: can act as a na-adjective
    // 副詞可能: can act as an adverb
    // 非自立 / 非自立可能: not independent
    // 格助詞: case marking particle
    // 係助詞: binding particle
    // 接続助詞: conjunction particle
    // 副助詞: adverbial particle
    // 終助詞: sentence ending particle
    // 準体助詞: nominalising particle
    // 句点: period, 読点: comma
    pub fn from_tag(tag: &str) -> Option<Self> {
        let section = match tag {
            "普通名詞" | "一般" => PosSection::Common,
            "固有名詞" => PosSection::ProperNoun,
            "人名" => PosSection::PersonName,
            "姓" => PosSection::FamilyName,
            "名" => PosSection::GivenName,
            "地名" => PosSection::PlaceName,
            "数詞" | "数" => PosSection::Numeral,
            "サ変可能" | "サ変接続" | "サ変形状詞可能" => PosSection::SuruPossible,
            "形状詞可能" | "形容動詞語幹" => PosSection::AdjectivalPossible,
            "副詞可能" => PosSection::AdverbialPossible,
            "助数詞" | "助数詞可能" => PosSection::Counter,
            "非自立" | "非自立可能" => PosSection::NonIndependent,
            "格助詞" => PosSection::CaseParticle,
            "係助詞" => PosSection::BindingParticle,
            "接続助詞" => PosSection::ConjunctiveParticle,
            "副助詞" => PosSection::AdverbialParticle,
            "終助詞" => PosSection::SentenceEndingParticle,
            "準体助詞" => PosSection::QuasiParticle,
            "句点" => PosSection::Period,
            "読点" => PosSection::Comma,
            "括弧開" => PosSection::BracketOpen,
            "括弧閉" => PosSection::BracketClose,
            _ => return None,
        };
        Some(section)
    }

    /// Canonical tag written back into wire records.
    pub fn tag(self) -> &'static str {
        match self {
            PosSection::Common => "普通名詞",
            PosSection::ProperNoun => "固有名詞",
            PosSection::PersonName => "人名",
            PosSection::FamilyName => "姓",
            PosSection::GivenName => "名",
            PosSection::PlaceName => "地名",
            PosSection::Numeral => "数詞",
            PosSection::SuruPossible => "サ変可能",
            PosSection::AdjectivalPossible => "形状詞可能",
            PosSection::AdverbialPossible => "副詞可能",
            PosSection::Counter => "助数詞",
            PosSection::NonIndependent => "非自立可能",
            PosSection::CaseParticle => "格助詞",
            PosSection::BindingParticle => "係助詞",
            PosSection::ConjunctiveParticle => "接続助詞",
            PosSection::AdverbialParticle => "副助詞",
            PosSection::SentenceEndingParticle => "終助詞",
            PosSection::QuasiParticle => "準体助詞",
            PosSection::Period => "句点",
            PosSection::Comma => "読点",
            PosSection::BracketOpen => "括弧開",
            PosSection::BracketClose => "括弧閉",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// The set of sections attached to a morpheme.
///
/// Sections are independent of each other and of the primary tag, so they are
/// kept as flags rather than folded into [`PartOfSpeech`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PosSections(u32);

impl PosSections {
    pub fn empty() -> Self {
        PosSections(0)
    }

    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Self {
        tags.into_iter()
            .filter_map(PosSection::from_tag)
            .fold(PosSections::empty(), PosSections::with)
    }

    pub fn with(mut self, section: PosSection) -> Self {
        self.insert(section);
        self
    }

    pub fn insert(&mut self, section: PosSection) {
        self.0 |= section.bit();
    }

    pub fn remove(&mut self, section: PosSection) {
        self.0 &= !section.bit();
    }

    pub fn contains(&self, section: PosSection) -> bool {
        self.0 & section.bit() != 0
    }

    pub fn union(self, other: PosSections) -> Self {
        PosSections(self.0 | other.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = PosSection> + '_ {
        SECTIONS.iter().copied().filter(move |s| self.contains(*s))
    }

    /// Proper nouns naming a person (or any name section at all).
    pub fn is_name_like(&self) -> bool {
        self.contains(PosSection::ProperNoun)
            || self.contains(PosSection::PersonName)
            || self.contains(PosSection::FamilyName)
            || self.contains(PosSection::GivenName)
    }

    pub fn ends_clause(&self) -> bool {
        self.contains(PosSection::SentenceEndingParticle)
            || self.contains(PosSection::Period)
            || self.contains(PosSection::Comma)
    }
}

impl fmt::Debug for PosSections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
