use std::{
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::Result;
use config::File;
use directories::BaseDirs;
use log::{info, warn};
use morph::{DetailLayout, SplitMode, TokenizerSettings};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};

use crate::text::Substitution;

const CONFIG_FILE: &str = "kotoba.toml";

/// Reads `path`, or `kotoba.toml` in the platform config directory.
///
/// A missing or incompatible file is not an error: the defaults are used.
pub fn load_config(path: Option<&Path>) -> KotobaConfig {
    let path = match path.map(Path::to_path_buf).or_else(config_path) {
        Some(path) => path,
        None => {
            warn!("No configuration directory\nUsing default config");
            return KotobaConfig::default();
        }
    };
    match config::Config::builder()
        .add_source(File::from(path.as_path()).required(false))
        .build()
    {
        Ok(c) => match c.try_deserialize() {
            Ok(config) => {
                info!("configuration from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Incompatible configuration: {:?}\nUsing default config", e);
                KotobaConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to load config file: {:?}\nUsing default config", e);
            KotobaConfig::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    let mut path = BaseDirs::new()?.config_dir().to_path_buf();
    path.push(CONFIG_FILE);
    Some(path)
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct KotobaConfig {
    #[serde(default = "Tokenizer::default")]
    pub tokenizer: Tokenizer,
    #[serde(default = "Preprocess::default")]
    pub preprocess: Preprocess,
    #[serde(default = "Resolution::default")]
    pub resolution: Resolution,
    #[serde(default = "Cache::default")]
    pub cache: Cache,
    #[serde(default = "Examples::default")]
    pub examples: Examples,
}

impl KotobaConfig {
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

// tokenizer

fn default_server_address() -> String {
    "0.0.0.0:3333".to_owned()
}

fn default_detail_layout() -> DetailLayout {
    DetailLayout::Unidic
}

fn default_mode() -> SplitMode {
    SplitMode::C
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Tokenizer {
    /// Lindera server.
    #[serde(default = "default_server_address")]
    pub server_address: String,
    #[serde(default = "default_detail_layout")]
    pub detail_layout: DetailLayout,
    #[serde(default)]
    pub config_path: PathBuf,
    #[serde(default)]
    pub dictionary_path: PathBuf,
    #[serde(default = "default_mode")]
    pub mode: SplitMode,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            server_address: default_server_address(),
            detail_layout: default_detail_layout(),
            config_path: PathBuf::new(),
            dictionary_path: PathBuf::new(),
            mode: default_mode(),
        }
    }
}

impl Tokenizer {
    pub fn settings(&self) -> TokenizerSettings {
        TokenizerSettings {
            config_path: self.config_path.clone(),
            dictionary_path: self.dictionary_path.clone(),
            mode: self.mode,
        }
    }
}

// preprocess

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Preprocess {
    /// Appended to the built-in boundary substitutions.
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
}

// resolution

fn default_max_concurrency() -> usize {
    thread::available_parallelism().map_or(4, |n| n.get())
}

fn default_permit_timeout() -> Duration {
    Duration::from_millis(3000)
}

fn default_batch_size() -> usize {
    64
}

fn default_max_retries() -> usize {
    3
}

fn default_rescue_window() -> usize {
    10
}

#[serde_as]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Resolution {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(default = "default_permit_timeout")]
    pub permit_timeout: Duration,
    /// Tokens resolved per task.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_rescue_window")]
    pub rescue_window: usize,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            permit_timeout: default_permit_timeout(),
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            rescue_window: default_rescue_window(),
        }
    }
}

// cache

fn default_compound_capacity() -> usize {
    100_000
}

fn default_store_capacity() -> usize {
    crate::cache::DEFAULT_RESOLUTION_CAPACITY
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Cache {
    #[serde(default = "default_compound_capacity")]
    pub compound_capacity: usize,
    /// Keys kept by the in-process store.
    #[serde(default = "default_store_capacity")]
    pub store_capacity: usize,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            compound_capacity: default_compound_capacity(),
            store_capacity: default_store_capacity(),
        }
    }
}

// examples

fn default_enabled() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Examples {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Default for Examples {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("kotoba-{}-{}.toml", name, std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_sections_take_their_defaults() {
        let path = write_config(
            "partial",
            r#"
            [resolution]
            permit_timeout = 500
            batch_size = 8

            [[preprocess.substitutions]]
            from = "のです"
            to = "の です"
            "#,
        );
        let config = load_config(Some(&path));
        assert_eq!(config.resolution.permit_timeout, Duration::from_millis(500));
        assert_eq!(config.resolution.batch_size, 8);
        assert_eq!(config.resolution.max_retries, 3);
        assert_eq!(config.preprocess.substitutions[0].to, "の です");
        assert_eq!(config.tokenizer.server_address, "0.0.0.0:3333");
        assert_eq!(config.cache.compound_capacity, 100_000);
        assert_eq!(config.cache.store_capacity, 500_000);
        assert!(config.examples.enabled);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn incompatible_file_falls_back_to_defaults() {
        let path = write_config("broken", "[cache]\ncompound_capacity = \"lots\"\n");
        let config = load_config(Some(&path));
        assert_eq!(config.cache.compound_capacity, 100_000);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn dumped_config_reads_back() {
        let mut config = KotobaConfig::default();
        config.tokenizer.mode = SplitMode::A;
        config.examples.enabled = false;
        let path = write_config("dump", &config.to_toml().unwrap());
        let read = load_config(Some(&path));
        assert_eq!(read.tokenizer.mode, SplitMode::A);
        assert!(!read.examples.enabled);
        assert_eq!(read.resolution.permit_timeout, config.resolution.permit_timeout);
        std::fs::remove_file(path).unwrap();
    }
}
