use morph::{PartOfSpeech, PosSection};

use super::{RepairContext, RepairPass};
use crate::token::{surface_of, Token};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Placement {
    Anywhere,
    /// Right after a verb, adjective or auxiliary.
    AfterInflectable,
    /// At the start of the text or after a clause boundary.
    ClauseInitial,
}

impl Placement {
    fn allows(self, prev: Option<&Token>) -> bool {
        match self {
            Placement::Anywhere => true,
            Placement::AfterInflectable => prev.map_or(false, |p| p.pos.is_inflectable()),
            Placement::ClauseInitial => {
                prev.map_or(true, |p| p.sections.ends_clause() || p.is_symbolic())
            }
        }
    }
}

/// Fixed sequences the tokenizer splits into pieces that mean nothing alone.
pub struct SpecialSequence {
    pub text: &'static str,
    pub pos: PartOfSpeech,
    pub placement: Placement,
}

const fn sequence(text: &'static str, pos: PartOfSpeech, placement: Placement) -> SpecialSequence {
    SpecialSequence { text, pos, placement }
}

pub const SPECIAL_SEQUENCES: &[SpecialSequence] = &[
    sequence("について", PartOfSpeech::Expression, Placement::Anywhere),
    sequence("にとって", PartOfSpeech::Expression, Placement::Anywhere),
    sequence("として", PartOfSpeech::Expression, Placement::Anywhere),
    sequence("によって", PartOfSpeech::Expression, Placement::Anywhere),
    sequence("に対して", PartOfSpeech::Expression, Placement::Anywhere),
    sequence("という", PartOfSpeech::Expression, Placement::Anywhere),
    sequence("かな", PartOfSpeech::Particle, Placement::Anywhere),
    sequence("ので", PartOfSpeech::Particle, Placement::AfterInflectable),
    sequence("のに", PartOfSpeech::Particle, Placement::AfterInflectable),
    sequence("でも", PartOfSpeech::Conjunction, Placement::ClauseInitial),
    sequence("だけど", PartOfSpeech::Conjunction, Placement::ClauseInitial),
];

pub struct SpecialSequences;

impl SpecialSequences {
    fn find(tokens: &[Token], i: usize) -> Option<(usize, &'static SpecialSequence)> {
        let prev = i.checked_sub(1).and_then(|j| tokens.get(j));
        for len in [3, 2] {
            let window = match tokens.get(i..i + len) {
                Some(window) => window,
                None => continue,
            };
            if window.iter().any(|t| t.is_symbolic() || t.pre_matched.is_some()) {
                continue;
            }
            let text = surface_of(window);
            let found = SPECIAL_SEQUENCES
                .iter()
                .find(|s| s.text == text && s.placement.allows(prev));
            if let Some(found) = found {
                return Some((len, found));
            }
        }
        None
    }
}

impl RepairPass for SpecialSequences {
    fn name(&self) -> &'static str {
        "special sequences"
    }

    fn apply(&self, _: &RepairContext, tokens: Vec<Token>) -> Vec<Token> {
        let mut repaired = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            match SpecialSequences::find(&tokens, i) {
                Some((len, found)) => {
                    repaired.push(Token::joined(&tokens[i..i + len], found.pos, found.text));
                    i += len;
                }
                None => {
                    repaired.push(tokens[i].clone());
                    i += 1;
                }
            }
        }
        repaired
    }
}

/// Copula forms never continue a verb's inflection.
const CHAIN_STOPS: &[&str] = &["だ", "です", "でしょう", "だろう", "じゃ", "な", "の", "ん"];

/// Verbs that follow a te-form to add aspect rather than meaning.
const TE_AUXILIARIES: &[&str] = &[
    "いる", "居る", "ある", "有る", "おく", "置く", "しまう", "仕舞う", "いく", "行く", "くる", "来る", "みる", "見る", "くれる",
];

fn ends_in_te(token: &Token) -> bool {
    token.surface.ends_with('て') || token.surface.ends_with('で')
}

/// Joins a verb or adjective with the auxiliaries and particles carrying its
/// inflection (食べ+させ+られ+た), as long as the whole still deconjugates to
/// the same dictionary form.
pub struct InflectionChain;

impl InflectionChain {
    fn is_base(token: &Token) -> bool {
        token.pre_matched.is_none() && token.pos.is_inflectable()
    }

    fn continues(prev: &Token, token: &Token) -> bool {
        if token.pre_matched.is_some() || CHAIN_STOPS.contains(&token.surface.as_str()) {
            return false;
        }
        match token.pos {
            PartOfSpeech::Auxiliary | PartOfSpeech::Suffix => true,
            PartOfSpeech::Particle => {
                matches!(token.surface.as_str(), "て" | "で" | "ば") && !token.sections.ends_clause()
            }
            PartOfSpeech::Verb => {
                ends_in_te(prev) && TE_AUXILIARIES.contains(&token.dictionary_form.as_str())
            }
            _ => false,
        }
    }

    /// Exclusive end of the longest chain starting at `start`, if any.
    fn chain_end(context: &RepairContext, tokens: &[Token], start: usize) -> Option<usize> {
        let base = &tokens[start];
        let mut text = base.surface.clone();
        let mut longest = None;
        let mut end = start + 1;
        while end < tokens.len() && InflectionChain::continues(&tokens[end - 1], &tokens[end]) {
            text.push_str(&tokens[end].surface);
            end += 1;
            if context.deconjugates_to(&text, &base.dictionary_form) {
                longest = Some(end);
            }
        }
        longest
    }
}

impl RepairPass for InflectionChain {
    fn name(&self) -> &'static str {
        "inflection chain"
    }

    fn apply(&self, context: &RepairContext, tokens: Vec<Token>) -> Vec<Token> {
        let mut repaired = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let end = if InflectionChain::is_base(&tokens[i]) {
                InflectionChain::chain_end(context, &tokens, i)
            } else {
                None
            };
            match end {
                Some(end) => {
                    let mut chain = tokens[i].clone();
                    for token in &tokens[i + 1..end] {
                        chain.absorb(token);
                    }
                    repaired.push(chain);
                    i = end;
                }
                None => {
                    repaired.push(tokens[i].clone());
                    i += 1;
                }
            }
        }
        repaired
    }
}

/// Particles that end a clause or nominalize; they stay separate words.
const UNATTACHABLE: &[&str] = &[
    "だ", "です", "でしょう", "だろう", "じゃ", "の", "ん", "よ", "ね", "か", "な", "わ", "ぞ", "さ", "ぜ",
];

/// Attaches conjunctive particles and suffixes onto the inflected word they
/// belong to (見て+も), when the result deconjugates to that word.
pub struct AttachParticles;

impl AttachParticles {
    fn attaches(context: &RepairContext, base: &Token, token: &Token) -> bool {
        base.pos.is_inflectable()
            && base.pre_matched.is_none()
            && matches!(token.pos, PartOfSpeech::Particle | PartOfSpeech::Suffix)
            && !token.sections.contains(PosSection::SentenceEndingParticle)
            && !UNATTACHABLE.contains(&token.surface.as_str())
            && context.deconjugates_to(&format!("{}{}", base.surface, token.surface), &base.dictionary_form)
    }
}

impl RepairPass for AttachParticles {
    fn name(&self) -> &'static str {
        "attach particles"
    }

    fn apply(&self, context: &RepairContext, tokens: Vec<Token>) -> Vec<Token> {
        let mut repaired: Vec<Token> = Vec::with_capacity(tokens.len());
        for token in tokens {
            match repaired.last_mut() {
                Some(base) if AttachParticles::attaches(context, base, &token) => base.absorb(&token),
                _ => repaired.push(token),
            }
        }
        repaired
    }
}
