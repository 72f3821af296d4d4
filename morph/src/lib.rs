use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

mod batch;
mod pos;
mod wire;

pub use batch::{analyze_batch, join_batch, split_batch, BATCH_DELIMITER};
pub use pos::{PartOfSpeech, PosSection, PosSections};
pub use wire::{parse_output, parse_record, NativeTokenizer, NativeWorker, SplitMode, TokenizerSettings, EOS};

#[cfg(feature = "lindera")]
pub use wire::LocalLindera;

/// One morpheme as reported by the tokenizer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Morpheme {
    pub surface: String,
    pub pos: PartOfSpeech,
    pub sections: PosSections,
    pub normalized_form: String,
    pub dictionary_form: String,
    pub reading: String,
}

impl Morpheme {
    /// Builds a morpheme from a comma separated POS hierarchy, e.g. `名詞,普通名詞,一般,*`.
    pub fn new(
        surface: &str,
        pos_hierarchy: &str,
        normalized_form: &str,
        dictionary_form: &str,
        reading: &str,
    ) -> Self {
        let mut fields = pos_hierarchy.split(',').map(str::trim);
        let pos = PartOfSpeech::from_tag(fields.next().unwrap_or_default());
        let sections = PosSections::from_tags(fields.take(3));
        Morpheme {
            surface: surface.to_owned(),
            pos,
            sections,
            normalized_form: or_surface(normalized_form, surface),
            dictionary_form: or_surface(dictionary_form, surface),
            reading: if reading == "*" { String::new() } else { reading.to_owned() },
        }
    }
}

fn or_surface(form: &str, surface: &str) -> String {
    if form.is_empty() || form == "*" {
        surface.to_owned()
    } else {
        form.to_owned()
    }
}

/// Anything able to turn cleaned text into a morpheme stream.
#[async_trait]
pub trait MorphAnalyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Vec<Morpheme>>;
}

/// Field layout of the `detail` vector returned by Lindera.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLayout {
    Ipadic,
    Unidic,
}

#[derive(Serialize, Deserialize, Debug)]
struct LinderaToken {
    #[serde(default)]
    text: String,
    detail: Vec<String>,
}

/// Client of a Lindera server, the tokenizer adapter used in production.
pub struct JpnMorphAnalysisAPI {
    lindera_addr: SocketAddr,
    layout: DetailLayout,
    client: reqwest::Client,
}

impl Default for JpnMorphAnalysisAPI {
    fn default() -> Self {
        JpnMorphAnalysisAPI {
            lindera_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 3333)),
            layout: DetailLayout::Unidic,
            client: reqwest::Client::new(),
        }
    }
}

impl JpnMorphAnalysisAPI {
    pub fn with_lindera_address(lindera_addr: impl ToSocketAddrs, layout: DetailLayout) -> Result<Self> {
        let lindera_addr = lindera_addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| anyhow!("failed to resolve `lindera_addr`"))?;
        Ok(JpnMorphAnalysisAPI {
            lindera_addr,
            layout,
            client: reqwest::Client::new(),
        })
    }

    pub async fn morphemes(&self, text: &str) -> Result<Vec<Morpheme>> {
        let layout = self.layout;
        Ok(self
            .lindera_tokens(text)
            .await?
            .into_iter()
            .filter_map(|t| categorize(&t.text, &t.detail, layout))
            .collect())
    }

    async fn lindera_tokens(&self, text: &str) -> Result<Vec<LinderaToken>> {
        let response = self
            .client
            .post(format!("http://{}/tokenize", self.lindera_addr))
            .body(text.to_owned())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(serde_json::from_str::<Vec<LinderaToken>>(&response)?)
    }
}

#[async_trait]
impl MorphAnalyzer for JpnMorphAnalysisAPI {
    async fn analyze(&self, text: &str) -> Result<Vec<Morpheme>> {
        self.morphemes(text).await
    }
}

// `detail` structure (empirical)
// ipadic: [pos, sub1, sub2, sub3, conjugation type, conjugation form, base form, reading, pronunciation]
// unidic: [pos, sub1, sub2, sub3, conjugation type, conjugation form, lemma reading, lemma,
//          surface, surface pronunciation, base form, base pronunciation, origin, ...]
pub fn categorize(text: &str, details: &[String], layout: DetailLayout) -> Option<Morpheme> {
    let expected = match layout {
        DetailLayout::Ipadic => 9,
        DetailLayout::Unidic => 17,
    };
    if details.len() != expected {
        debug!("dropping morpheme {:?} with {} detail fields", text, details.len());
        return None;
    }
    trace!("{:?}", details);
    let pos = details[..4].join(",");
    let morpheme = match layout {
        DetailLayout::Ipadic => {
            let surface = if text.is_empty() { &details[6] } else { text };
            Morpheme::new(surface, &pos, &details[6], &details[6], &details[7])
        }
        DetailLayout::Unidic => {
            let surface = if text.is_empty() { &details[8] } else { text };
            Morpheme::new(surface, &pos, &details[7], &details[10], &details[9])
        }
    };
    Some(morpheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn 食べる_is_verb() {
        let details = detail(&["動詞", "自立", "*", "*", "一段", "基本形", "食べる", "タベル", "タベル"]);
        let morpheme = categorize("食べる", &details, DetailLayout::Ipadic).unwrap();
        assert_eq!(morpheme.pos, PartOfSpeech::Verb);
        assert_eq!(morpheme.dictionary_form, "食べる");
        assert_eq!(morpheme.reading, "タベル");
    }

    #[test]
    fn きれい_is_na_adjective() {
        let details = detail(&[
            "形状詞", "一般", "*", "*", "*", "*", "キレイ", "綺麗", "きれい", "キレー", "きれい",
            "キレー", "和", "*", "*", "*", "*",
        ]);
        let morpheme = categorize("", &details, DetailLayout::Unidic).unwrap();
        assert_eq!(morpheme.surface, "きれい");
        assert_eq!(morpheme.pos, PartOfSpeech::NaAdjective);
        assert_eq!(morpheme.normalized_form, "綺麗");
        assert!(morpheme.sections.contains(PosSection::Common));
    }

    #[test]
    fn wrong_field_count_is_dropped() {
        let details = detail(&["UNK"]);
        assert_eq!(categorize("ｘ", &details, DetailLayout::Ipadic), None);
    }

    #[test]
    fn placeholder_forms_fall_back_to_surface() {
        let morpheme = Morpheme::new("テスト", "名詞,普通名詞,サ変可能,*", "*", "*", "*");
        assert_eq!(morpheme.dictionary_form, "テスト");
        assert_eq!(morpheme.normalized_form, "テスト");
        assert_eq!(morpheme.reading, "");
        assert!(morpheme.sections.contains(PosSection::SuruPossible));
    }

    #[tokio::test]
    #[ignore = "requires a Lindera server on LINDERA_ADDR"]
    async fn 降ります_is_verb() {
        let addr = std::env::var("LINDERA_ADDR").unwrap_or_else(|_| "0.0.0.0:3333".to_owned());
        let details = JpnMorphAnalysisAPI::with_lindera_address(addr, DetailLayout::Unidic)
            .unwrap()
            .morphemes("降ります")
            .await
            .unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].pos, PartOfSpeech::Verb);
        assert_eq!(details[1].pos, PartOfSpeech::Auxiliary);
    }
}
