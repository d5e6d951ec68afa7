//! bitmerkle CLI - build a Merkle bit trie from key/value pairs
//!
//! Reads one pair per line as `<hex key> <hex value>` (a missing value is
//! empty), skipping blank lines and `#` comments, then reports on the
//! resulting trie.

use anyhow::Context;
use bitmerkle::{HashAlgorithm, MerkleTrie, TrieConfig};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bitmerkle")]
#[command(about = "Build a binary Merkle trie from key/value pairs and inspect it")]
#[command(version)]
struct Cli {
    /// Pair file to read ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// JSON trie config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hash function (overrides the config file)
    #[arg(short, long)]
    algorithm: Option<AlgorithmArg>,

    /// Require every key to be exactly this many bytes (overrides the config file)
    #[arg(short, long)]
    key_len: Option<usize>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum AlgorithmArg {
    Sha256,
    Blake3,
}

impl From<AlgorithmArg> for HashAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Sha256 => HashAlgorithm::Sha256,
            AlgorithmArg::Blake3 => HashAlgorithm::Blake3,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the Merkle root
    Root,

    /// Print the deepest leaf level in bits
    Depth,

    /// List every entry with its branch path
    Dump,

    /// Look up the value stored under a key
    Get {
        /// The key, hex encoded
        key: String,
    },

    /// Show key count, node count, depth and root
    Stats,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let trie = build_trie(&cli.input, config)?;

    match cli.command {
        Commands::Root => {
            output(
                &cli.format,
                &serde_json::json!({
                    "root": trie.root_hash().to_hex(),
                    "algorithm": trie.algorithm().name()
                }),
            );
        }

        Commands::Depth => {
            output(
                &cli.format,
                &serde_json::json!({
                    "max_depth": trie.max_depth()
                }),
            );
        }

        Commands::Dump => match cli.format {
            OutputFormat::Text => trie.print()?,
            OutputFormat::Json => {
                let items: Vec<_> = trie
                    .iter()
                    .map(|e| {
                        serde_json::json!({
                            "path": e.path(),
                            "key": hex::encode(e.key),
                            "value": hex::encode(e.value)
                        })
                    })
                    .collect();
                output(
                    &cli.format,
                    &serde_json::json!({
                        "count": items.len(),
                        "entries": items
                    }),
                );
            }
        },

        Commands::Get { key } => {
            let key_bytes = hex::decode(&key).context("key must be hex encoded")?;
            match trie.get(&key_bytes) {
                Some(value) => {
                    output(
                        &cli.format,
                        &serde_json::json!({
                            "key": key,
                            "value": hex::encode(value)
                        }),
                    );
                }
                None => {
                    output(
                        &cli.format,
                        &serde_json::json!({
                            "status": "error",
                            "message": format!("Key not found: {}", key)
                        }),
                    );
                    std::process::exit(1);
                }
            }
        }

        Commands::Stats => {
            output(
                &cli.format,
                &serde_json::json!({
                    "keys": trie.len(),
                    "nodes": trie.node_count(),
                    "max_depth": trie.max_depth(),
                    "root": trie.root_hash().to_hex(),
                    "algorithm": trie.algorithm().name()
                }),
            );
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<TrieConfig> {
    let mut config = match &cli.config {
        Some(path) => TrieConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TrieConfig::default(),
    };
    if let Some(algorithm) = cli.algorithm {
        config.algorithm = algorithm.into();
    }
    if let Some(len) = cli.key_len {
        config.key_len = Some(len);
    }
    Ok(config)
}

fn build_trie(input: &Path, config: TrieConfig) -> anyhow::Result<MerkleTrie> {
    let text = if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };

    let mut trie = MerkleTrie::with_config(config);
    for (number, line) in text.lines().enumerate() {
        let Some((key, value)) = parse_pair(line)
            .with_context(|| format!("line {}: malformed pair", number + 1))?
        else {
            continue;
        };
        trie.insert(&key, &value)
            .with_context(|| format!("line {}: insert failed", number + 1))?;
    }
    Ok(trie)
}

/// Parse `<hex key> [hex value]`; `None` for blank and comment lines
fn parse_pair(line: &str) -> anyhow::Result<Option<(Vec<u8>, Vec<u8>)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut parts = line.split_whitespace();
    let key = parts.next().unwrap_or_default();
    let value = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        anyhow::bail!("expected `<key> <value>`, found extra fields");
    }

    Ok(Some((hex::decode(key)?, hex::decode(value)?)))
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value),
        OutputFormat::Text => serde_json::to_string_pretty(value),
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to render output: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("00ff abcd").unwrap(),
            Some((vec![0x00, 0xff], vec![0xab, 0xcd]))
        );
        assert_eq!(parse_pair("  01  ").unwrap(), Some((vec![0x01], vec![])));
        assert_eq!(parse_pair("").unwrap(), None);
        assert_eq!(parse_pair("# comment").unwrap(), None);
    }

    #[test]
    fn test_parse_pair_rejects_garbage() {
        assert!(parse_pair("zz 00").is_err());
        assert!(parse_pair("00 01 02").is_err());
    }
}
