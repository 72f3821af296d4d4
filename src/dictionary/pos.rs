use std::{convert::Infallible, fmt, str::FromStr};

use morph::PartOfSpeech;

/// Conjugation row of a godan verb, named after its dictionary-form ending.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum GodanRow {
    Ku,
    Gu,
    Su,
    Tsu,
    Nu,
    Bu,
    Mu,
    Ru,
    U,
    /// 行く: く row with って/った euphony
    Iku,
    /// ござる, なさる, くださる...: る row with い in polite and imperative forms
    Aru,
}

impl GodanRow {
    /// Irregular rows are a refinement of a regular one.
    pub fn conjugates_like(self, other: GodanRow) -> bool {
        self.regular() == other.regular()
    }

    fn regular(self) -> GodanRow {
        match self {
            GodanRow::Iku => GodanRow::Ku,
            GodanRow::Aru => GodanRow::Ru,
            row => row,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum NameKind {
    Generic,
    Surname,
    Given,
    Person,
    Place,
    Organization,
}

/// Part-of-speech tag of a dictionary entry, in JMdict terms.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum DictPos {
    Noun,
    AdverbialNoun,
    TemporalNoun,
    NounSuffix,
    NounPrefix,
    Pronoun,
    Particle,
    Auxiliary,
    AuxiliaryVerb,
    AuxiliaryAdjective,
    Copula,
    Expression,
    Interjection,
    Adverb,
    AdverbTo,
    Conjunction,
    Prefix,
    Suffix,
    Counter,
    Numeric,
    Adnominal,
    IAdjective,
    IxAdjective,
    NaAdjective,
    NoAdjective,
    TaruAdjective,
    Ichidan,
    Godan(GodanRow),
    Kuru,
    Suru,
    Name(NameKind),
    Other(String),
}

impl FromStr for DictPos {
    type Err = Infallible;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        use DictPos::*;
        let pos = match code {
            "n" => Noun,
            "n-adv" => AdverbialNoun,
            "n-t" => TemporalNoun,
            "n-suf" => NounSuffix,
            "n-pref" => NounPrefix,
            "pn" => Pronoun,
            "prt" => Particle,
            "aux" => Auxiliary,
            "aux-v" => AuxiliaryVerb,
            "aux-adj" => AuxiliaryAdjective,
            "cop" | "cop-da" => Copula,
            "exp" => Expression,
            "int" => Interjection,
            "adv" => Adverb,
            "adv-to" => AdverbTo,
            "conj" => Conjunction,
            "pref" => Prefix,
            "suf" => Suffix,
            "ctr" => Counter,
            "num" => Numeric,
            "adj-pn" => Adnominal,
            "adj-i" => IAdjective,
            "adj-ix" => IxAdjective,
            "adj-na" => NaAdjective,
            "adj-no" => NoAdjective,
            "adj-t" => TaruAdjective,
            "v1" | "v1-s" => Ichidan,
            "v5k" => Godan(GodanRow::Ku),
            "v5k-s" => Godan(GodanRow::Iku),
            "v5g" => Godan(GodanRow::Gu),
            "v5s" => Godan(GodanRow::Su),
            "v5t" => Godan(GodanRow::Tsu),
            "v5n" => Godan(GodanRow::Nu),
            "v5b" => Godan(GodanRow::Bu),
            "v5m" => Godan(GodanRow::Mu),
            "v5r" | "v5r-i" => Godan(GodanRow::Ru),
            "v5u" | "v5u-s" => Godan(GodanRow::U),
            "v5aru" => Godan(GodanRow::Aru),
            "vk" => Kuru,
            "vs" | "vs-i" | "vs-s" => Suru,
            "name" | "unclass" => Name(NameKind::Generic),
            "surname" => Name(NameKind::Surname),
            "given" | "fem" | "masc" => Name(NameKind::Given),
            "person" => Name(NameKind::Person),
            "place" | "station" => Name(NameKind::Place),
            "company" | "organization" => Name(NameKind::Organization),
            other => Other(other.to_owned()),
        };
        Ok(pos)
    }
}

impl fmt::Display for DictPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DictPos::*;
        let code = match self {
            Noun => "n",
            AdverbialNoun => "n-adv",
            TemporalNoun => "n-t",
            NounSuffix => "n-suf",
            NounPrefix => "n-pref",
            Pronoun => "pn",
            Particle => "prt",
            Auxiliary => "aux",
            AuxiliaryVerb => "aux-v",
            AuxiliaryAdjective => "aux-adj",
            Copula => "cop",
            Expression => "exp",
            Interjection => "int",
            Adverb => "adv",
            AdverbTo => "adv-to",
            Conjunction => "conj",
            Prefix => "pref",
            Suffix => "suf",
            Counter => "ctr",
            Numeric => "num",
            Adnominal => "adj-pn",
            IAdjective => "adj-i",
            IxAdjective => "adj-ix",
            NaAdjective => "adj-na",
            NoAdjective => "adj-no",
            TaruAdjective => "adj-t",
            Ichidan => "v1",
            Godan(GodanRow::Ku) => "v5k",
            Godan(GodanRow::Iku) => "v5k-s",
            Godan(GodanRow::Gu) => "v5g",
            Godan(GodanRow::Su) => "v5s",
            Godan(GodanRow::Tsu) => "v5t",
            Godan(GodanRow::Nu) => "v5n",
            Godan(GodanRow::Bu) => "v5b",
            Godan(GodanRow::Mu) => "v5m",
            Godan(GodanRow::Ru) => "v5r",
            Godan(GodanRow::U) => "v5u",
            Godan(GodanRow::Aru) => "v5aru",
            Kuru => "vk",
            Suru => "vs",
            Name(NameKind::Generic) => "name",
            Name(NameKind::Surname) => "surname",
            Name(NameKind::Given) => "given",
            Name(NameKind::Person) => "person",
            Name(NameKind::Place) => "place",
            Name(NameKind::Organization) => "organization",
            Other(code) => code,
        };
        f.write_str(code)
    }
}

impl DictPos {
    pub fn is_name(&self) -> bool {
        matches!(self, DictPos::Name(_))
    }

    pub fn is_verb(&self) -> bool {
        matches!(
            self,
            DictPos::Ichidan | DictPos::Godan(_) | DictPos::Kuru | DictPos::Suru | DictPos::AuxiliaryVerb
        )
    }

    pub fn is_i_adjective(&self) -> bool {
        matches!(
            self,
            DictPos::IAdjective | DictPos::IxAdjective | DictPos::AuxiliaryAdjective
        )
    }

    pub fn is_nominal(&self) -> bool {
        use DictPos::*;
        matches!(
            self,
            Noun | AdverbialNoun
                | TemporalNoun
                | NounSuffix
                | NounPrefix
                | Pronoun
                | NoAdjective
                | NaAdjective
                | Counter
                | Numeric
                | Prefix
                | Suffix
                | Name(_)
        )
    }

    /// Whether a token the tokenizer classified as `pos` may be this entry.
    pub fn compatible_with(&self, pos: PartOfSpeech) -> bool {
        use DictPos::*;
        if *self == Expression {
            return true;
        }
        match pos {
            PartOfSpeech::Noun | PartOfSpeech::Pronoun | PartOfSpeech::Prefix | PartOfSpeech::Suffix => {
                self.is_nominal() || matches!(self, Adverb | Suru)
            }
            PartOfSpeech::Verb => self.is_verb(),
            PartOfSpeech::IAdjective => self.is_i_adjective(),
            PartOfSpeech::NaAdjective => matches!(self, NaAdjective | Noun | NoAdjective | TaruAdjective),
            PartOfSpeech::Adverb => matches!(self, Adverb | AdverbTo | Noun | AdverbialNoun | TemporalNoun),
            PartOfSpeech::Adnominal => matches!(self, Adnominal | Pronoun),
            PartOfSpeech::Conjunction => matches!(self, Conjunction),
            PartOfSpeech::Interjection => matches!(self, Interjection),
            PartOfSpeech::Particle => matches!(self, Particle | Conjunction),
            PartOfSpeech::Auxiliary => {
                matches!(self, Auxiliary | AuxiliaryVerb | AuxiliaryAdjective | Copula | Suffix)
            }
            PartOfSpeech::Expression | PartOfSpeech::Unknown => true,
            PartOfSpeech::Symbol | PartOfSpeech::SupplementarySymbol | PartOfSpeech::Whitespace => false,
        }
    }
}
