//! Passes fixing the tokenizer's known mistakes before resolution.
//!
//! Every pass is a pure function of the token sequence and runs in a fixed
//! order, since later passes rely on what earlier ones normalized. Passes
//! are idempotent: feeding a pass its own output changes nothing.

use log::trace;

use crate::{deconjugate::Deconjugator, dictionary::Lexicon, text::to_hiragana, token::Token};

mod cleanup;
mod combine;
mod context;
mod split;

pub use cleanup::{Cleanup, MisparseFilter, MISPARSES};
pub use combine::{AttachParticles, InflectionChain, SpecialSequences, SPECIAL_SEQUENCES};
pub use context::{PersonNames, ReadingDisambiguation, HONORIFICS, READING_RULES};
pub use split::{Contractions, Elongation, FusedCompoundVerbs};

/// What passes may consult when deciding on a merge or split.
pub struct RepairContext<'a> {
    pub lexicon: &'a Lexicon,
    pub deconjugator: &'a Deconjugator,
}

impl<'a> RepairContext<'a> {
    pub fn new(lexicon: &'a Lexicon, deconjugator: &'a Deconjugator) -> Self {
        RepairContext { lexicon, deconjugator }
    }

    pub fn is_word(&self, text: &str) -> bool {
        self.lexicon.contains(text) || self.lexicon.contains(&to_hiragana(text))
    }

    /// A dictionary word `text` deconjugates to, fewest operations first.
    pub fn lemma_of(&self, text: &str) -> Option<String> {
        self.deconjugator
            .dictionary_forms(text)
            .into_iter()
            .map(|form| form.text)
            .find(|lemma| self.is_word(lemma))
    }

    pub fn deconjugates_to(&self, text: &str, lemma: &str) -> bool {
        self.deconjugator.deconjugates_to(text, lemma)
    }
}

pub trait RepairPass: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, context: &RepairContext, tokens: Vec<Token>) -> Vec<Token>;
}

pub struct RepairPipeline {
    passes: Vec<Box<dyn RepairPass>>,
}

impl RepairPipeline {
    pub fn new(passes: Vec<Box<dyn RepairPass>>) -> Self {
        RepairPipeline { passes }
    }

    /// All passes, in the order they must run.
    pub fn standard() -> Self {
        RepairPipeline::new(vec![
            Box::new(Cleanup),
            Box::new(MisparseFilter),
            Box::new(FusedCompoundVerbs),
            Box::new(Contractions),
            Box::new(Elongation),
            Box::new(SpecialSequences),
            Box::new(InflectionChain),
            Box::new(AttachParticles),
            Box::new(ReadingDisambiguation),
            Box::new(PersonNames),
        ])
    }

    pub fn run(&self, context: &RepairContext, mut tokens: Vec<Token>) -> Vec<Token> {
        for pass in &self.passes {
            let before = tokens.len();
            tokens = pass.apply(context, tokens);
            trace!("{}: {} -> {} tokens", pass.name(), before, tokens.len());
        }
        tokens
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }
}


#[cfg(test)]
mod tests {
    use super::{testing::*, *};

    #[test]
    fn pipeline_is_idempotent() {
        let lexicon = lexicon(&["食べる", "見る", "いる", "表", "へ", "出る", "田中", "さん", "は"]);
        let deconjugator = deconjugator();
        let context = RepairContext::new(&lexicon, &deconjugator);
        let tokens = vec![
            token("田中", "名詞,固有名詞,人名,姓", "田中"),
            token("さん", "接尾辞,名詞的,一般,*", "さん"),
            particle("は"),
            noun("表"),
            particle("へ"),
            verb("出", "出る"),
            token("て", "助詞,接続助詞,*,*", "て"),
            verb("見", "見る"),
            token("て", "助詞,接続助詞,*,*", "て"),
            verb("い", "いる"),
            aux("ます"),
            token("。", "補助記号,句点,*,*", "。"),
            token(" ", "空白,*,*,*", " "),
        ];
        let pipeline = RepairPipeline::standard();
        let once = pipeline.run(&context, tokens);
        let twice = pipeline.run(&context, once.clone());
        assert_eq!(once, twice);
        assert_eq!(surfaces(&once), vec!["田中", "さん", "は", "表", "へ", "出て", "見ています", "。"]);
        assert_eq!(once[3].reading, "オモテ");
        assert!(once[0].person_name_context);
    }

    #[test]
    fn passes_run_in_a_fixed_order() {
        let names = RepairPipeline::standard().pass_names();
        assert_eq!(names.first(), Some(&"cleanup"));
        assert_eq!(names.last(), Some(&"person names"));
        assert_eq!(names.len(), 10);
    }
}
