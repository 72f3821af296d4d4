use std::{fmt, path::PathBuf, str::FromStr, thread};

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::{MorphAnalyzer, Morpheme};

/// End-of-sentence marker line.
pub const EOS: &str = "EOS";

const RECORD_FIELDS: usize = 5;

/// Parses one `surface \t pos1,pos2,pos3,pos4 \t normalized \t dictionary \t reading` record.
pub fn parse_record(line: &str) -> Result<Morpheme> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != RECORD_FIELDS {
        bail!("expected {} fields, got {} in {:?}", RECORD_FIELDS, fields.len(), line);
    }
    if fields[0].is_empty() {
        bail!("empty surface in {:?}", line);
    }
    Ok(Morpheme::new(fields[0], fields[1], fields[2], fields[3], fields[4]))
}

/// Parses a complete tokenizer output; malformed records are dropped.
pub fn parse_output(output: &str) -> Vec<Morpheme> {
    output
        .lines()
        .filter(|line| !line.is_empty() && *line != EOS)
        .filter_map(|line| match parse_record(line) {
            Ok(morpheme) => Some(morpheme),
            Err(e) => {
                debug!("dropping malformed record: {}", e);
                None
            }
        })
        .collect()
}

impl Morpheme {
    /// Serializes back into the wire record format.
    pub fn to_record(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.surface,
            pos_hierarchy(self),
            self.normalized_form,
            self.dictionary_form,
            if self.reading.is_empty() { "*" } else { &self.reading }
        )
    }
}

fn pos_hierarchy(morpheme: &Morpheme) -> String {
    let mut fields = vec![primary_tag(morpheme)];
    fields.extend(morpheme.sections.iter().take(3).map(|s| s.tag()));
    while fields.len() < 4 {
        fields.push("*");
    }
    fields.join(",")
}

fn primary_tag(morpheme: &Morpheme) -> &'static str {
    use crate::PartOfSpeech::*;
    match morpheme.pos {
        Noun => "名詞",
        Pronoun => "代名詞",
        Verb => "動詞",
        IAdjective => "形容詞",
        NaAdjective => "形状詞",
        Adverb => "副詞",
        Adnominal => "連体詞",
        Conjunction => "接続詞",
        Interjection => "感動詞",
        Particle => "助詞",
        Auxiliary => "助動詞",
        Prefix => "接頭辞",
        Suffix => "接尾辞",
        Symbol => "記号",
        SupplementarySymbol => "補助記号",
        Whitespace => "空白",
        Expression | Unknown => "*",
    }
}

/// Segmentation granularity of the native tokenizer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum SplitMode {
    A,
    B,
    C,
}

impl FromStr for SplitMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" | "a" => Ok(SplitMode::A),
            "B" | "b" => Ok(SplitMode::B),
            "C" | "c" => Ok(SplitMode::C),
            _ => Err(anyhow!("unknown split mode {:?}", s)),
        }
    }
}

impl fmt::Display for SplitMode {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, formatter)
    }
}

#[derive(Clone, Debug)]
pub struct TokenizerSettings {
    pub config_path: PathBuf,
    pub dictionary_path: PathBuf,
    pub mode: SplitMode,
}

/// A tokenizer handle that must not be shared between threads.
///
/// Output is streamed through `sink` in the wire record format, in as many
/// fragments as the implementation likes.
pub trait NativeTokenizer: Send {
    fn run(&mut self, text: &str, settings: &TokenizerSettings, sink: &mut dyn FnMut(&str)) -> Result<()>;
}

struct Job {
    text: String,
    reply: oneshot::Sender<Result<Vec<Morpheme>>>,
}

/// Owns a [`NativeTokenizer`] on a dedicated thread; callers only ever talk
/// to it through a channel, so at most one native call is in flight.
pub struct NativeWorker {
    jobs: mpsc::Sender<Job>,
}

impl NativeWorker {
    pub fn spawn(mut native: impl NativeTokenizer + 'static, settings: TokenizerSettings) -> Result<Self> {
        let (jobs, mut queue) = mpsc::channel::<Job>(32);
        thread::Builder::new()
            .name("morph-native".to_owned())
            .spawn(move || {
                while let Some(job) = queue.blocking_recv() {
                    // per call buffer, dropped with the call
                    let mut buffer = String::new();
                    let outcome = native.run(&job.text, &settings, &mut |chunk: &str| buffer.push_str(chunk));
                    let result = outcome.map(|()| parse_output(&buffer));
                    if let Err(e) = &result {
                        warn!("native tokenizer failed: {:?}", e);
                    }
                    let _ = job.reply.send(result);
                }
                debug!("native tokenizer worker stopped");
            })?;
        Ok(NativeWorker { jobs })
    }
}

#[async_trait]
impl MorphAnalyzer for NativeWorker {
    async fn analyze(&self, text: &str) -> Result<Vec<Morpheme>> {
        let (reply, answer) = oneshot::channel();
        self.jobs
            .send(Job {
                text: text.to_owned(),
                reply,
            })
            .await
            .map_err(|_| anyhow!("native tokenizer worker is gone"))?;
        answer
            .await
            .map_err(|_| anyhow!("native tokenizer worker dropped the call"))?
    }
}

/// In-process Lindera, driven through the worker like any native tokenizer.
#[cfg(feature = "lindera")]
pub struct LocalLindera {
    tokenizer: lindera::tokenizer::Tokenizer,
}

#[cfg(feature = "lindera")]
impl LocalLindera {
    pub fn new() -> Result<Self> {
        let tokenizer = lindera::tokenizer::Tokenizer::new().map_err(|e| anyhow!("{:?}", e))?;
        Ok(LocalLindera { tokenizer })
    }
}

#[cfg(feature = "lindera")]
impl NativeTokenizer for LocalLindera {
    fn run(&mut self, text: &str, _: &TokenizerSettings, sink: &mut dyn FnMut(&str)) -> Result<()> {
        let tokens = self.tokenizer.tokenize(text).map_err(|e| anyhow!("{:?}", e))?;
        for token in tokens {
            if let Some(morpheme) = crate::categorize(token.text, &token.detail, crate::DetailLayout::Ipadic) {
                sink(&morpheme.to_record());
                sink("\n");
            }
        }
        sink(EOS);
        sink("\n");
        Ok(())
    }
}
