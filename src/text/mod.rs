//! Character classes and kana conversions shared by every stage.

mod preprocess;

pub use preprocess::{Preprocessor, Substitution, BOUNDARY, DEFAULT_SUBSTITUTIONS};

pub fn is_kanji(c: char) -> bool {
    ('\u{4e00}'..='\u{9ffc}').contains(&c)         // https://www.unicode.org/charts/PDF/U4E00.pdf
        || ('\u{f900}'..='\u{faff}').contains(&c)  // https://www.unicode.org/charts/PDF/UF900.pdf
        || ('\u{3400}'..='\u{4dbf}').contains(&c)  // https://www.unicode.org/charts/PDF/U3400.pdf
        || ('\u{20000}'..='\u{2a6dd}').contains(&c)// https://www.unicode.org/charts/PDF/U20000.pdf
        || ('\u{2a700}'..='\u{2b734}').contains(&c)// https://www.unicode.org/charts/PDF/U2A700.pdf
        || ('\u{2b740}'..='\u{2b81d}').contains(&c)// https://www.unicode.org/charts/PDF/U2B740.pdf
        || ('\u{2b820}'..='\u{2cea1}').contains(&c)// https://www.unicode.org/charts/PDF/U2B820.pdf
        || ('\u{2ceb0}'..='\u{2ebe0}').contains(&c)// https://www.unicode.org/charts/PDF/U2CEB0.pdf
        || ('\u{2f800}'..='\u{2fa1d}').contains(&c)// https://www.unicode.org/charts/PDF/U2F800.pdf
        || ('\u{30000}'..='\u{3134a}').contains(&c)// https://www.unicode.org/charts/PDF/U30000.pdf
        || c == '\u{3005}' // 々
}

pub fn is_hiragana(c: char) -> bool {
    ('\u{3041}'..='\u{3096}').contains(&c)          // https://www.unicode.org/charts/PDF/U3040.pdf
        || c == '\u{1b001}'                              // https://www.unicode.org/charts/PDF/U1B000.pdf
        || c == '\u{1b11f}'                              // https://www.unicode.org/charts/PDF/U1B100.pdf
        || ('\u{1b150}'..='\u{1b152}').contains(&c) // https://www.unicode.org/charts/PDF/U1B130.pdf
}

pub fn is_katakana(c: char) -> bool {
    ('\u{30a1}'..='\u{30fa}').contains(&c) || c == '\u{30fc}' // https://www.unicode.org/charts/PDF/U30A0.pdf
        || ('\u{31f0}'..='\u{31ff}').contains(&c)            // https://www.unicode.org/charts/PDF/U31F0.pdf
        || ('\u{ff66}'..='\u{ff9d}').contains(&c)            // https://www.unicode.org/charts/PDF/UFF00.pdf
        || c == '\u{1b000}'                                  // https://www.unicode.org/charts/PDF/U1B000.pdf
        || ('\u{1b164}'..='\u{1b167}').contains(&c)          // https://www.unicode.org/charts/PDF/U1B130.pdf
}

pub fn is_kana(c: char) -> bool {
    is_hiragana(c) || is_katakana(c)
}

/// Long vowel mark and wave dashes used the same way in casual text.
pub fn is_elongation(c: char) -> bool {
    matches!(c, 'ー' | '〜' | '～')
}

pub fn has_elongation(text: &str) -> bool {
    text.chars().any(is_elongation)
}

pub fn is_all_kana(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| is_kana(c) || is_elongation(c))
}

// ァ..ヶ sit exactly 0x60 above ぁ..ゖ
const KANA_OFFSET: u32 = 0x60;

pub fn to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{30a1}'..='\u{30f6}' => char::from_u32(c as u32 - KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

pub fn to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{3041}'..='\u{3096}' => char::from_u32(c as u32 + KANA_OFFSET).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Vowel row of a hiragana character, as the matching vowel kana.
pub fn vowel_of(c: char) -> Option<char> {
    const ROWS: [(char, &str); 5] = [
        ('あ', "ぁあかがさざただなはばぱまゃやらゎわ"),
        ('い', "ぃいきぎしじちぢにひびぴみりゐ"),
        ('う', "ぅうゔくぐすずっつづぬふぶぷむゅゆる"),
        ('え', "ぇえけげせぜてでねへべぺめれゑ"),
        ('お', "ぉおこごそぞとどのほぼぽもょよろを"),
    ];
    let c = to_hiragana(&c.to_string()).chars().next()?;
    ROWS.iter()
        .find(|(_, row)| row.contains(c))
        .map(|(vowel, _)| *vowel)
}

/// Replaces each elongation mark with the vowel it lengthens, the way the
/// word is spelled in kana dictionaries (えー becomes えい, おー becomes おう).
pub fn fold_long_vowels(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    for c in text.chars() {
        let replacement = if is_elongation(c) {
            previous.and_then(vowel_of).map(|vowel| match vowel {
                'え' => 'い',
                'お' => 'う',
                other => other,
            })
        } else {
            None
        };
        match replacement {
            Some(vowel) => {
                folded.push(vowel);
                previous = Some(vowel);
            }
            None => {
                folded.push(c);
                previous = Some(c);
            }
        }
    }
    folded
}

pub fn strip_elongation(text: &str) -> String {
    text.chars().filter(|c| !is_elongation(*c)).collect()
}

/// Drops small vowels and the small tsu. Small ゃゅょ spell syllables and stay.
pub fn strip_small_kana(text: &str) -> String {
    text.chars()
        .filter(|c| !"ぁぃぅぇぉっァィゥェォッ".contains(*c))
        .collect()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Number of leading characters shared by `a` and `b`.
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kana_round_trip() {
        assert_eq!(to_hiragana("テスト"), "てすと");
        assert_eq!(to_katakana("たべる"), "タベル");
        assert_eq!(to_hiragana("ラーメン"), "らーめん");
        assert_eq!(to_hiragana("食べる"), "食べる");
    }

    #[test]
    fn long_vowels_follow_the_previous_kana() {
        assert_eq!(fold_long_vowels("らーめん"), "らあめん");
        assert_eq!(fold_long_vowels("ねー"), "ねい");
        assert_eq!(fold_long_vowels("そーだ"), "そうだ");
        assert_eq!(fold_long_vowels("ー"), "ー");
        assert_eq!(strip_elongation("すごーい"), "すごい");
    }

    #[test]
    fn small_kana() {
        assert_eq!(strip_small_kana("すごぉい"), "すごい");
        assert_eq!(strip_small_kana("きょう"), "きょう");
    }

    #[test]
    fn classes() {
        assert!(is_kanji('表'));
        assert!(is_kanji('々'));
        assert!(is_hiragana('は'));
        assert!(is_katakana('ー'));
        assert!(!is_kana('表'));
        assert!(is_all_kana("テスト"));
        assert!(!is_all_kana("表へ"));
        assert_eq!(common_prefix_len("食べた", "食べる"), 2);
    }
}
