use morph::{PartOfSpeech, PosSection, PosSections};

use super::{RepairContext, RepairPass};
use crate::token::Token;

/// Drops tokens nothing downstream can use.
pub struct Cleanup;

impl RepairPass for Cleanup {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn apply(&self, _: &RepairContext, tokens: Vec<Token>) -> Vec<Token> {
        tokens
            .into_iter()
            .filter(|t| !t.invalid && t.pos != PartOfSpeech::Whitespace && !t.surface.trim().is_empty())
            .collect()
    }
}

/// A part of speech the tokenizer is known to get wrong for `surface`.
pub struct Misparse {
    pub surface: &'static str,
    pub from: PartOfSpeech,
    pub to: PartOfSpeech,
    pub section: Option<PosSection>,
    /// Decides from the previous and next tokens whether the fix applies.
    pub when: fn(Option<&Token>, Option<&Token>) -> bool,
}

fn after_nominal(prev: Option<&Token>, _: Option<&Token>) -> bool {
    prev.map_or(false, |p| p.pos.is_nominal())
}

fn between_adjectival_and_noun(prev: Option<&Token>, next: Option<&Token>) -> bool {
    prev.map_or(false, |p| matches!(p.pos, PartOfSpeech::NaAdjective | PartOfSpeech::Noun))
        && next.map_or(false, |n| n.pos == PartOfSpeech::Noun)
}

fn between_nominal_and_verb(prev: Option<&Token>, next: Option<&Token>) -> bool {
    prev.map_or(false, |p| p.pos.is_nominal()) && next.map_or(false, |n| n.pos == PartOfSpeech::Verb)
}

pub const MISPARSES: &[Misparse] = &[
    Misparse {
        surface: "は",
        from: PartOfSpeech::Noun,
        to: PartOfSpeech::Particle,
        section: Some(PosSection::BindingParticle),
        when: after_nominal,
    },
    Misparse {
        surface: "な",
        from: PartOfSpeech::Particle,
        to: PartOfSpeech::Auxiliary,
        section: None,
        when: between_adjectival_and_noun,
    },
    Misparse {
        surface: "に",
        from: PartOfSpeech::Auxiliary,
        to: PartOfSpeech::Particle,
        section: Some(PosSection::CaseParticle),
        when: between_nominal_and_verb,
    },
    Misparse {
        surface: "で",
        from: PartOfSpeech::Auxiliary,
        to: PartOfSpeech::Particle,
        section: Some(PosSection::CaseParticle),
        when: between_nominal_and_verb,
    },
];

/// Corrects the part of speech of the surfaces listed in [`MISPARSES`].
pub struct MisparseFilter;

impl RepairPass for MisparseFilter {
    fn name(&self) -> &'static str {
        "misparse filter"
    }

    fn apply(&self, _: &RepairContext, mut tokens: Vec<Token>) -> Vec<Token> {
        for i in 0..tokens.len() {
            let prev = i.checked_sub(1).and_then(|j| tokens.get(j));
            let next = tokens.get(i + 1);
            let fix = MISPARSES.iter().find(|m| {
                m.surface == tokens[i].surface && m.from == tokens[i].pos && (m.when)(prev, next)
            });
            if let Some(fix) = fix {
                let sections = fix.section.map_or(PosSections::empty(), |s| PosSections::empty().with(s));
                let token = &mut tokens[i];
                token.pos = fix.to;
                token.sections = sections;
                token.dictionary_form = token.surface.clone();
                token.normalized_form = token.surface.clone();
            }
        }
        tokens
    }
}
