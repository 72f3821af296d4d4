use morph::{Morpheme, PartOfSpeech, PosSections};

use crate::dictionary::EntryId;

/// A morpheme as it travels through repair, compounding and resolution.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub surface: String,
    pub pos: PartOfSpeech,
    pub sections: PosSections,
    pub normalized_form: String,
    pub dictionary_form: String,
    pub reading: String,
    pub invalid: bool,
    pub person_name_context: bool,
    /// Entry already chosen by a compound resolver.
    pub pre_matched: Option<EntryId>,
}

impl Token {
    pub fn new(surface: &str, pos: PartOfSpeech) -> Self {
        Token {
            surface: surface.to_owned(),
            pos,
            sections: PosSections::empty(),
            normalized_form: surface.to_owned(),
            dictionary_form: surface.to_owned(),
            reading: String::new(),
            invalid: false,
            person_name_context: false,
            pre_matched: None,
        }
    }

    pub fn with_dictionary_form(mut self, dictionary_form: &str) -> Self {
        self.dictionary_form = dictionary_form.to_owned();
        self.normalized_form = dictionary_form.to_owned();
        self
    }

    pub fn with_sections(mut self, sections: PosSections) -> Self {
        self.sections = sections;
        self
    }

    pub fn with_reading(mut self, reading: &str) -> Self {
        self.reading = reading.to_owned();
        self
    }

    /// Nouns the tokenizer classified as some kind of proper name.
    pub fn is_name_like(&self) -> bool {
        self.pos == PartOfSpeech::Noun && self.sections.is_name_like()
    }

    pub fn is_symbolic(&self) -> bool {
        self.pos.is_symbolic()
    }

    /// Appends `other` to this token; lemma and classification stay those of `self`.
    pub fn absorb(&mut self, other: &Token) {
        self.surface.push_str(&other.surface);
        self.reading.push_str(&other.reading);
        self.person_name_context |= other.person_name_context;
    }

    /// Concatenation of `tokens` classified as `pos`, with `dictionary_form` as lemma.
    pub fn joined(tokens: &[Token], pos: PartOfSpeech, dictionary_form: &str) -> Token {
        let mut joined = Token::new(&surface_of(tokens), pos).with_dictionary_form(dictionary_form);
        joined.reading = tokens.iter().map(|t| t.reading.as_str()).collect();
        joined.sections = tokens
            .iter()
            .fold(PosSections::empty(), |sections, t| sections.union(t.sections));
        joined.person_name_context = tokens.iter().any(|t| t.person_name_context);
        joined
    }
}

impl From<Morpheme> for Token {
    fn from(morpheme: Morpheme) -> Self {
        // blank morphemes, and stray pieces of a batch delimiter
        let invalid = morpheme.surface.trim().is_empty() && morpheme.pos != PartOfSpeech::Whitespace
            || morpheme.surface.contains('＃');
        Token {
            surface: morpheme.surface,
            pos: morpheme.pos,
            sections: morpheme.sections,
            normalized_form: morpheme.normalized_form,
            dictionary_form: morpheme.dictionary_form,
            reading: morpheme.reading,
            invalid,
            person_name_context: false,
            pre_matched: None,
        }
    }
}

pub fn surface_of(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.surface.as_str()).collect()
}
