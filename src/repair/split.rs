use morph::{PartOfSpeech, PosSection, PosSections};

use super::{RepairContext, RepairPass};
use crate::{
    text::{has_elongation, is_elongation, strip_elongation},
    token::Token,
};

/// Verbs that attach to another verb's stem to form a compound.
const COMPOUNDING_AUXILIARIES: &[&str] = &[
    "始める", "はじめる", "出す", "だす", "続ける", "つづける", "終わる", "おわる", "込む", "こむ",
    "過ぎる", "すぎる", "合う", "あう", "直す", "なおす",
];

/// Splits compound verbs the dictionary does not list (読み始める) into the
/// main verb's stem and the auxiliary, both of which it does list.
pub struct FusedCompoundVerbs;

impl FusedCompoundVerbs {
    fn split(context: &RepairContext, token: &Token) -> Option<(Token, Token)> {
        if token.pos != PartOfSpeech::Verb || context.is_word(&token.dictionary_form) {
            return None;
        }
        for auxiliary in COMPOUNDING_AUXILIARIES {
            let head = match token.dictionary_form.strip_suffix(auxiliary) {
                Some(head) if !head.is_empty() => head,
                _ => continue,
            };
            let tail_surface = match token.surface.strip_prefix(head) {
                Some(tail) if !tail.is_empty() => tail,
                _ => continue,
            };
            let lemma = match context.lemma_of(head) {
                Some(lemma) => lemma,
                None => continue,
            };
            let first = Token::new(head, PartOfSpeech::Verb).with_dictionary_form(&lemma);
            let second = Token::new(tail_surface, PartOfSpeech::Verb).with_dictionary_form(auxiliary);
            return Some((first, second));
        }
        None
    }
}

impl RepairPass for FusedCompoundVerbs {
    fn name(&self) -> &'static str {
        "fused compound verbs"
    }

    fn apply(&self, context: &RepairContext, tokens: Vec<Token>) -> Vec<Token> {
        let mut repaired = Vec::with_capacity(tokens.len());
        for token in tokens {
            match FusedCompoundVerbs::split(context, &token) {
                Some((mut first, second)) => {
                    first.person_name_context = token.person_name_context;
                    repaired.push(first);
                    repaired.push(second);
                }
                None => repaired.push(token),
            }
        }
        repaired
    }
}

/// Explanatory nominalizer fused with the copula that follows it.
const FUSED_CONTRACTIONS: &[(&str, &str, &str, &str)] = &[
    // surface, nominalizer, copula surface, copula lemma
    ("んだ", "ん", "だ", "だ"),
    ("んです", "ん", "です", "です"),
    ("のだ", "の", "だ", "だ"),
    ("んじゃ", "ん", "じゃ", "だ"),
];

/// Separates explanatory んだ/のだ from the copula, and joins a negative ん
/// back onto the verb it negates.
pub struct Contractions;

impl Contractions {
    fn nominalizer(surface: &str) -> Token {
        Token::new(surface, PartOfSpeech::Particle)
            .with_sections(PosSections::empty().with(PosSection::QuasiParticle))
    }

    fn negates(context: &RepairContext, prev: &Token, token: &Token) -> bool {
        token.surface == "ん"
            && matches!(prev.pos, PartOfSpeech::Verb | PartOfSpeech::Auxiliary)
            && context.deconjugates_to(&format!("{}ん", prev.surface), &prev.dictionary_form)
    }
}

impl RepairPass for Contractions {
    fn name(&self) -> &'static str {
        "contractions"
    }

    fn apply(&self, context: &RepairContext, tokens: Vec<Token>) -> Vec<Token> {
        let mut split = Vec::with_capacity(tokens.len());
        for token in tokens {
            let fused = FUSED_CONTRACTIONS
                .iter()
                .find(|(surface, ..)| token.surface == *surface && token.pos != PartOfSpeech::Verb);
            match fused {
                Some((_, nominalizer, copula, lemma)) => {
                    split.push(Contractions::nominalizer(nominalizer));
                    split.push(Token::new(copula, PartOfSpeech::Auxiliary).with_dictionary_form(lemma));
                }
                None => split.push(token),
            }
        }

        let mut merged: Vec<Token> = Vec::with_capacity(split.len());
        for token in split {
            match merged.last_mut() {
                Some(prev) if Contractions::negates(context, prev, &token) => prev.absorb(&token),
                _ => merged.push(token),
            }
        }
        merged
    }
}

fn is_elongation_only(token: &Token) -> bool {
    !token.surface.is_empty() && token.surface.chars().all(is_elongation)
}

/// Puts elongation marks back into the word they lengthen, and gives
/// elongated words the tokenizer did not know their plain lemma.
pub struct Elongation;

impl Elongation {
    /// Lemma of `text` once its elongation marks are gone, with whether it
    /// took a deconjugation to get there.
    fn plain_lemma(context: &RepairContext, text: &str) -> Option<(String, bool)> {
        let stripped = strip_elongation(text);
        if stripped.is_empty() {
            return None;
        }
        if context.is_word(&stripped) {
            return Some((stripped, false));
        }
        context.lemma_of(&stripped).map(|lemma| (lemma, true))
    }

    fn merge_three(context: &RepairContext, window: &[Token]) -> Option<Token> {
        let (first, mark, last) = match window {
            [first, mark, last] => (first, mark, last),
            _ => return None,
        };
        if first.is_symbolic() || last.is_symbolic() || !is_elongation_only(mark) {
            return None;
        }
        let text = format!("{}{}{}", first.surface, mark.surface, last.surface);
        let (lemma, deconjugated) = Elongation::plain_lemma(context, &text)?;
        let pos = if deconjugated && last.pos.is_inflectable() { last.pos } else { first.pos };
        Some(Token::joined(window, pos, &lemma))
    }
}

impl RepairPass for Elongation {
    fn name(&self) -> &'static str {
        "elongation"
    }

    fn apply(&self, context: &RepairContext, tokens: Vec<Token>) -> Vec<Token> {
        let mut repaired: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            if let Some(merged) = tokens.get(i..i + 3).and_then(|w| Elongation::merge_three(context, w)) {
                repaired.push(merged);
                i += 3;
                continue;
            }
            let token = &tokens[i];
            match repaired.last_mut() {
                Some(prev) if is_elongation_only(token) && !prev.is_symbolic() => prev.absorb(token),
                _ => repaired.push(token.clone()),
            }
            i += 1;
        }

        for token in repaired.iter_mut() {
            if has_elongation(&token.surface) && !context.is_word(&token.dictionary_form) {
                if let Some((lemma, _)) = Elongation::plain_lemma(context, &token.surface) {
                    token.dictionary_form = lemma.clone();
                    token.normalized_form = lemma;
                }
            }
        }
        repaired
    }
}
