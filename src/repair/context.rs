use morph::PartOfSpeech;

use super::{RepairContext, RepairPass};
use crate::token::Token;

/// Reading of a homograph in the context its `when` describes.
pub struct ReadingRule {
    pub surface: &'static str,
    pub reading: &'static str,
    pub when: fn(Option<&Token>, Option<&Token>) -> bool,
}

fn always(_: Option<&Token>, _: Option<&Token>) -> bool {
    true
}

fn 表_as_surface(prev: Option<&Token>, next: Option<&Token>) -> bool {
    next.map_or(false, |n| n.surface == "へ" || n.surface == "に")
        && !prev.map_or(false, |p| p.pos.is_nominal())
}

fn after_month(prev: Option<&Token>, _: Option<&Token>) -> bool {
    prev.map_or(false, |p| p.surface.ends_with('月'))
}

fn after_verb(prev: Option<&Token>, _: Option<&Token>) -> bool {
    prev.map_or(false, |p| p.pos == PartOfSpeech::Verb)
}

fn before_nan(_: Option<&Token>, next: Option<&Token>) -> bool {
    next.and_then(|n| n.surface.chars().next())
        .map_or(false, |c| "てでとのだな".contains(c))
}

/// First matching rule for a surface wins.
pub const READING_RULES: &[ReadingRule] = &[
    ReadingRule { surface: "表", reading: "オモテ", when: 表_as_surface },
    ReadingRule { surface: "表", reading: "ヒョウ", when: always },
    ReadingRule { surface: "一日", reading: "ツイタチ", when: after_month },
    ReadingRule { surface: "一日", reading: "イチニチ", when: always },
    ReadingRule { surface: "方", reading: "カタ", when: after_verb },
    ReadingRule { surface: "方", reading: "ホウ", when: always },
    ReadingRule { surface: "何", reading: "ナン", when: before_nan },
    ReadingRule { surface: "何", reading: "ナニ", when: always },
];

/// Picks the reading of homographic kanji from their neighbours.
pub struct ReadingDisambiguation;

impl RepairPass for ReadingDisambiguation {
    fn name(&self) -> &'static str {
        "reading disambiguation"
    }

    fn apply(&self, _: &RepairContext, mut tokens: Vec<Token>) -> Vec<Token> {
        for i in 0..tokens.len() {
            let prev = i.checked_sub(1).and_then(|j| tokens.get(j));
            let next = tokens.get(i + 1);
            let rule = READING_RULES
                .iter()
                .find(|r| r.surface == tokens[i].surface && (r.when)(prev, next));
            if let Some(rule) = rule {
                tokens[i].reading = rule.reading.to_owned();
            }
        }
        tokens
    }
}

pub const HONORIFICS: &[&str] = &["さん", "くん", "君", "ちゃん", "様", "さま", "先生", "氏", "殿"];

/// Flags name-like nouns that are clearly about a person.
pub struct PersonNames;

impl PersonNames {
    fn in_context(tokens: &[Token], i: usize) -> bool {
        let prev = i.checked_sub(1).and_then(|j| tokens.get(j));
        let next = tokens.get(i + 1);
        tokens[i].is_name_like()
            && (next.map_or(false, |n| HONORIFICS.contains(&n.surface.as_str()) || n.is_name_like())
                || prev.map_or(false, Token::is_name_like))
    }
}

impl RepairPass for PersonNames {
    fn name(&self) -> &'static str {
        "person names"
    }

    fn apply(&self, _: &RepairContext, mut tokens: Vec<Token>) -> Vec<Token> {
        let flagged: Vec<usize> = (0..tokens.len())
            .filter(|&i| PersonNames::in_context(&tokens, i))
            .collect();
        for i in flagged {
            tokens[i].person_name_context = true;
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::{super::testing::*, *};

    fn reading_of(tokens: Vec<Token>, at: usize) -> String {
        let lexicon = lexicon(&[]);
        let deconjugator = deconjugator();
        let context = RepairContext::new(&lexicon, &deconjugator);
        ReadingDisambiguation.apply(&context, tokens)[at].reading.clone()
    }

    #[test]
    fn 表_reads_omote_before_a_direction() {
        assert_eq!(reading_of(vec![noun("表"), particle("へ"), verb("出る", "出る")], 0), "オモテ");
        assert_eq!(reading_of(vec![particle("を"), noun("表"), particle("に")], 1), "オモテ");
        assert_eq!(reading_of(vec![noun("表"), particle("を"), verb("見る", "見る")], 0), "ヒョウ");
        assert_eq!(reading_of(vec![noun("時間"), noun("表"), particle("に")], 1), "ヒョウ");
        assert_eq!(reading_of(vec![noun("表")], 0), "ヒョウ");
    }

    #[test]
    fn other_homographs() {
        assert_eq!(reading_of(vec![noun("四月"), noun("一日")], 1), "ツイタチ");
        assert_eq!(reading_of(vec![noun("一日"), particle("中")], 0), "イチニチ");
        assert_eq!(reading_of(vec![verb("書き", "書く"), noun("方")], 1), "カタ");
        assert_eq!(reading_of(vec![noun("何"), aux("です")], 0), "ナン");
        assert_eq!(reading_of(vec![noun("何"), particle("を")], 0), "ナニ");
    }

    #[test]
    fn names_before_honorifics() {
        let lexicon = lexicon(&[]);
        let deconjugator = deconjugator();
        let context = RepairContext::new(&lexicon, &deconjugator);
        let surname = token("田中", "名詞,固有名詞,人名,姓", "田中");
        let given = token("太郎", "名詞,固有名詞,人名,名", "太郎");
        let honorific = token("さん", "接尾辞,名詞的,一般,*", "さん");

        let tokens = PersonNames.apply(&context, vec![surname.clone(), honorific.clone()]);
        assert!(tokens[0].person_name_context);
        assert!(!tokens[1].person_name_context);

        let tokens = PersonNames.apply(&context, vec![surname.clone(), given, particle("が")]);
        assert!(tokens[0].person_name_context && tokens[1].person_name_context);

        let tokens = PersonNames.apply(&context, vec![surname, particle("が")]);
        assert!(!tokens[0].person_name_context);
        assert!(!PersonNames.apply(&context, vec![noun("先生"), honorific])[0].person_name_context);
    }
}
