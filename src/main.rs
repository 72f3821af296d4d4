use std::{io::Read, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use kotoba::{
    cache::MemoryCacheStore,
    config::load_config,
    dictionary::{DictionaryStore, MemoryStore},
    Parser,
};
use log::info;
use morph::{JpnMorphAnalysisAPI, MorphAnalyzer};

#[derive(ClapParser)]
struct Opts {
    /// Text files to parse, standard input when none is given.
    inputs: Vec<PathBuf>,
    /// Set the configuration file.
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Set the socket address of the Lindera server.
    #[clap(short, long)]
    lindera_addr: Option<String>,
    /// Set the dictionary, as a JSON list of entries.
    #[clap(short, long)]
    dictionary: Option<PathBuf>,
    /// Tokenize in process instead of through a Lindera server.
    #[cfg(feature = "lindera")]
    #[clap(long)]
    local: bool,
    /// Print the effective configuration and exit.
    #[clap(long)]
    dump_config: bool,
}

fn dictionary(opts: &Opts) -> Result<Arc<dyn DictionaryStore>> {
    match &opts.dictionary {
        Some(path) => Ok(Arc::new(MemoryStore::open(path)?)),
        #[cfg(feature = "jmdict")]
        None => Ok(Arc::new(kotoba::dictionary::JmdictStore::new())),
        #[cfg(not(feature = "jmdict"))]
        None => anyhow::bail!("no dictionary: pass --dictionary or build with the `jmdict` feature"),
    }
}

fn analyzer(opts: &Opts, config: &kotoba::config::KotobaConfig) -> Result<Arc<dyn MorphAnalyzer>> {
    #[cfg(feature = "lindera")]
    if opts.local {
        let native = morph::LocalLindera::new()?;
        return Ok(Arc::new(morph::NativeWorker::spawn(native, config.tokenizer.settings())?));
    }
    let address = opts
        .lindera_addr
        .as_deref()
        .unwrap_or(&config.tokenizer.server_address);
    Ok(Arc::new(JpnMorphAnalysisAPI::with_lindera_address(
        address,
        config.tokenizer.detail_layout,
    )?))
}

fn read_inputs(inputs: &[PathBuf]) -> Result<Vec<String>> {
    if inputs.is_empty() {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read standard input")?;
        return Ok(vec![text]);
    }
    inputs
        .iter()
        .map(|path| std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display())))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();

    let config = load_config(opts.config.as_deref());
    if opts.dump_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let texts = read_inputs(&opts.inputs)?;
    let analyzer = analyzer(&opts, &config)?;
    let cache = Arc::new(MemoryCacheStore::with_capacity(config.cache.store_capacity));
    let parser = Parser::new(config, analyzer, dictionary(&opts)?, cache).await?;

    let parsed = parser.parse_many(&texts).await?;
    info!("parsed {} texts", parsed.len());
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    Ok(())
}
