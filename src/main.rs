//! MLCC command-line tool.
//!
//! Generates keys, encrypts and decrypts text, and runs the analysis
//! toolkit. Text comes from `--text`, `--input <file>` or standard input.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, Level};

use mlcc::{
    analyze_frequency, brute_force_transposition, crack_substitution, crack_vigenere, decrypt,
    encrypt, generate_key, generate_key_with_rng, recover_vigenere_key, AnalysisConfig,
    CompositeKey, KeyParams, Pipeline, PositionalModifier,
};

#[derive(Parser)]
#[command(name = "mlcc")]
#[command(about = "MLCC - Multi-Layer Custom Cipher and cryptanalysis toolkit")]
#[command(version)]
struct Cli {
    /// Log verbosity on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// JSON file with analysis budgets; flags override its fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random key
    Keygen {
        #[arg(long, default_value_t = 26)]
        alphabet_size: usize,
        #[arg(long, default_value_t = 12)]
        vigenere_length: usize,
        #[arg(long, default_value_t = 5)]
        block_width: usize,
        #[arg(long, default_value_t = 2)]
        direction_count: usize,
        /// Seed for a reproducible key
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Encrypt text with a key
    Encrypt {
        #[command(flatten)]
        key: KeyArgs,
        #[command(flatten)]
        input: InputArgs,
        /// Also print the output of every layer
        #[arg(long)]
        trace: bool,
    },
    /// Decrypt text with a key
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,
        #[command(flatten)]
        input: InputArgs,
    },
    /// Letter frequency report
    Freq {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Crack a monoalphabetic substitution
    CrackSub {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        restarts: Option<usize>,
        #[arg(long)]
        iterations: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        deadline_ms: Option<u64>,
        #[arg(long)]
        top: Option<usize>,
    },
    /// Crack a (positional) Vigenere cipher
    CrackVig {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value_t = 16)]
        max_key_length: usize,
        /// Modifier hypothesis, e.g. `zero` or `stepped:5` (repeatable)
        #[arg(long = "modifier")]
        modifiers: Vec<PositionalModifier>,
        /// Try every modifier with a parameter up to this value
        #[arg(long, conflicts_with = "modifiers")]
        modifier_family: Option<usize>,
        #[arg(long)]
        top: Option<usize>,
    },
    /// Brute force a transposition
    CrackTrans {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, default_value_t = 12)]
        max_width: usize,
        #[arg(long)]
        max_chain: Option<usize>,
        #[arg(long)]
        max_candidates: Option<usize>,
        /// Search every width even after a confident reconstruction
        #[arg(long)]
        exhaustive: bool,
        /// Column-order restarts per keyed traversal and width (0 disables)
        #[arg(long)]
        column_restarts: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long)]
        top: Option<usize>,
    },
    /// Recover Vigenere keywords from aligned text before and after the layer
    RecoverVig {
        #[arg(long)]
        plaintext: String,
        #[arg(long)]
        ciphertext: String,
        #[arg(long, default_value = "zero")]
        modifier: PositionalModifier,
        #[arg(long, default_value_t = 1)]
        min_length: usize,
        #[arg(long, default_value_t = 16)]
        max_length: usize,
    },
}

#[derive(Args)]
struct KeyArgs {
    /// Serialized key
    #[arg(long, conflicts_with = "key_file")]
    key: Option<String>,
    /// File holding a serialized key
    #[arg(long)]
    key_file: Option<PathBuf>,
}

impl KeyArgs {
    fn load(&self) -> Result<CompositeKey> {
        let text = match (&self.key, &self.key_file) {
            (Some(key), _) => key.clone(),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("reading key file {}", path.display()))?,
            (None, None) => bail!("a key is required: pass --key or --key-file"),
        };
        CompositeKey::parse(text.trim()).context("parsing key")
    }
}

#[derive(Args)]
struct InputArgs {
    /// Input text
    #[arg(long, conflicts_with = "input")]
    text: Option<String>,
    /// Input file (default: standard input)
    #[arg(long, short)]
    input: Option<PathBuf>,
}

impl InputArgs {
    /// Reads the input; one trailing line break from a file or stdin is
    /// dropped.
    fn read(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        let mut text = match &self.input {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("reading input file {}", path.display()))?,
            None => {
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("reading standard input")?;
                buffer
            }
        };
        if text.ends_with('\n') {
            text.pop();
            if text.ends_with('\r') {
                text.pop();
            }
        }
        Ok(text)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            AnalysisConfig::from_json(&json).context("parsing config file")?
        }
        None => AnalysisConfig::default(),
    };
    debug!(?config, "analysis configuration");

    match cli.command {
        Commands::Keygen {
            alphabet_size,
            vigenere_length,
            block_width,
            direction_count,
            seed,
        } => {
            let params = KeyParams {
                alphabet_size,
                vigenere_length,
                block_width,
                direction_count,
            };
            let key = match seed {
                Some(seed) => generate_key_with_rng(&params, &mut StdRng::seed_from_u64(seed))?,
                None => generate_key(&params)?,
            };
            emit(cli.json, &key, |key| key.serialize())?;
        }
        Commands::Encrypt { key, input, trace } => {
            let key = key.load()?;
            let plaintext = input.read()?;
            if trace {
                let trace = Pipeline::new(&key).encrypt_traced(&plaintext)?;
                emit(cli.json, &trace, |t| {
                    format!(
                        "substitution:  {}\nvigenere:      {}\ntransposition: {}",
                        t.substituted, t.vigenere, t.ciphertext
                    )
                })?;
            } else {
                let ciphertext = encrypt(&plaintext, &key)?;
                emit(cli.json, &ciphertext, String::clone)?;
            }
        }
        Commands::Decrypt { key, input } => {
            let key = key.load()?;
            let plaintext = decrypt(&input.read()?, &key)?;
            emit(cli.json, &plaintext, String::clone)?;
        }
        Commands::Freq { input } => {
            let report = analyze_frequency(&input.read()?);
            emit(cli.json, &report, |r| {
                let mut lines = vec![format!(
                    "letters: {}  chi2: {:.2}  ioc: {:.4}",
                    r.total, r.chi_squared, r.index_of_coincidence
                )];
                lines.extend(
                    r.distribution
                        .iter()
                        .map(|s| format!("{}  {:>6}  {:>6.2}%", s.symbol, s.count, s.percent)),
                );
                lines.push(format!("best shift: {}", r.ranked_shifts[0].shift));
                lines.push(format!("suggested mapping: {}", r.suggested_mapping));
                lines.join("\n")
            })?;
        }
        Commands::CrackSub {
            input,
            restarts,
            iterations,
            seed,
            workers,
            deadline_ms,
            top,
        } => {
            let sub = &mut config.substitution;
            override_field(&mut sub.restarts, restarts);
            override_field(&mut sub.iterations, iterations);
            override_field(&mut sub.workers, workers);
            override_field(&mut sub.top_k, top);
            sub.seed = seed.or(sub.seed);
            sub.deadline_ms = deadline_ms.or(sub.deadline_ms);
            let candidates = crack_substitution(&input.read()?, sub);
            emit(cli.json, &candidates, |cs| {
                cs.iter()
                    .map(|c| format!("{:.3}  {}  {}", c.confidence, c.mapping, c.plaintext))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Commands::CrackVig {
            input,
            max_key_length,
            modifiers,
            modifier_family,
            top,
        } => {
            let vig = &mut config.vigenere;
            if let Some(max_param) = modifier_family {
                vig.modifiers = PositionalModifier::family(max_param);
            } else if !modifiers.is_empty() {
                vig.modifiers = modifiers;
            }
            override_field(&mut vig.top_k, top);
            let candidates = crack_vigenere(&input.read()?, max_key_length, vig);
            emit(cli.json, &candidates, |cs| {
                cs.iter()
                    .map(|c| {
                        format!(
                            "{:.3}  {} ({})  {}",
                            c.confidence, c.keyword, c.modifier, c.plaintext
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Commands::CrackTrans {
            input,
            max_width,
            max_chain,
            max_candidates,
            exhaustive,
            column_restarts,
            seed,
            workers,
            top,
        } => {
            let trans = &mut config.transposition;
            override_field(&mut trans.max_chain, max_chain);
            override_field(&mut trans.max_candidates, max_candidates);
            override_field(&mut trans.column_restarts, column_restarts);
            override_field(&mut trans.workers, workers);
            override_field(&mut trans.top_k, top);
            trans.seed = seed.or(trans.seed);
            if exhaustive {
                trans.stop_confidence = None;
            }
            let candidates = brute_force_transposition(&input.read()?, max_width, trans);
            emit(cli.json, &candidates, |cs| {
                cs.iter()
                    .map(|c| {
                        let dirs: Vec<String> =
                            c.directions.iter().map(|d| d.to_string()).collect();
                        let order: Vec<String> =
                            c.column_order.iter().map(|k| k.to_string()).collect();
                        format!(
                            "{:.3}  w={} order={} {}  {}",
                            c.confidence,
                            c.width,
                            order.join(","),
                            dirs.join(","),
                            c.plaintext
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
        Commands::RecoverVig {
            plaintext,
            ciphertext,
            modifier,
            min_length,
            max_length,
        } => {
            let keys =
                recover_vigenere_key(&plaintext, &ciphertext, modifier, min_length, max_length)?;
            emit(cli.json, &keys, |ks| {
                ks.iter()
                    .map(|k| format!("{} ({})", k.keyword, k.modifier))
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
    }
    Ok(())
}

fn override_field<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Prints `value` as JSON or through its plain-text rendering.
fn emit<T: Serialize>(json: bool, value: &T, plain: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value).context("encoding JSON output")?);
    } else {
        println!("{}", plain(value));
    }
    Ok(())
}
