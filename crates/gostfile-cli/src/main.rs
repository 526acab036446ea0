//! gostfile: encrypt and decrypt files with GOST ciphers
//!
//! Commands:
//!   encrypt <PATH>...   - encrypt files and directory trees in place (.kuz / .mag)
//!   decrypt <PATH>...   - verify and decrypt containers back to plaintext
//!   status <PATH>...    - show which paths are encrypted, decrypted, current or missing
//!   passgen             - generate a random password
//!   config show         - display the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use gostfile_core::config::GostfileConfig;
use gostfile_core::{Algorithm, Direction, PathState};
use gostfile_crypto::{
    generate_password, password_strength, prehash_password, sanitize_password, GeneratorOptions,
    Strength,
};
use gostfile_engine::{classify, relocate, BatchProcessor, BatchProgress, BatchRequest, ProgressFn};

const PASSWORD_ENV: &str = "GOSTFILE_PASSWORD";
const MAX_PASSWORD_LEN: usize = 64;

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "gostfile",
    version,
    about = "Password-based file encryption with Kuznyechik and Magma",
    long_about = "gostfile: encrypt files in place with GOST R 34.12-2015 ciphers in counter mode, \
                  authenticated with HMAC-Streebog"
)]
struct Cli {
    /// Path to gostfile.toml configuration file
    #[arg(long, short = 'c', env = "GOSTFILE_CONFIG", default_value = "gostfile.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "GOSTFILE_LOG")]
    log: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "GOSTFILE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt files and directories, replacing each file with <name>.kuz or <name>.mag
    ///
    /// The password is read from GOSTFILE_PASSWORD, or prompted for.
    Encrypt {
        /// Files or directories, processed in the order given
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        crypt: CryptArgs,
    },

    /// Decrypt .kuz / .mag containers back to their original names
    Decrypt {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        #[command(flatten)]
        crypt: CryptArgs,
    },

    /// Show the encryption status of paths
    Status {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Print one JSON object per path
        #[arg(long)]
        json: bool,
    },

    /// Generate a random password
    Passgen {
        /// Length, clamped to 8..=128 (default from config)
        #[arg(long, short = 'l')]
        length: Option<usize>,
        #[arg(long)]
        no_lower: bool,
        #[arg(long)]
        no_upper: bool,
        #[arg(long)]
        no_digits: bool,
        #[arg(long)]
        no_special: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct CryptArgs {
    /// Cipher: kuznyechik (.kuz) or magma (.mag); default from config
    #[arg(long, short = 'a')]
    algorithm: Option<Algorithm>,

    /// Use the hex Streebog-256 digest of the password instead of the password itself
    #[arg(long)]
    prehash: bool,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = cli
        .log_format
        .clone()
        .unwrap_or(if config.log.format.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        });
    init_logging(&level, &format);

    match cli.command {
        Commands::Encrypt { paths, crypt } => cmd_crypt(&config, Direction::Encrypt, paths, &crypt),
        Commands::Decrypt { paths, crypt } => cmd_crypt(&config, Direction::Decrypt, paths, &crypt),
        Commands::Status { paths, json } => cmd_status(&paths, json),
        Commands::Passgen {
            length,
            no_lower,
            no_upper,
            no_digits,
            no_special,
        } => {
            let mut options = GeneratorOptions::from(&config.password);
            if let Some(length) = length {
                options.length = length;
            }
            options.lowercase &= !no_lower;
            options.uppercase &= !no_upper;
            options.digits &= !no_digits;
            options.special &= !no_special;
            cmd_passgen(&options)
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

fn load_config(path: &Path) -> Result<GostfileConfig> {
    GostfileConfig::load(path).with_context(|| format!("loading config: {}", path.display()))
}

// ── Password input ────────────────────────────────────────────────────────────

/// Read the password from the environment or the terminal.
///
/// When encrypting from a prompt the password is asked for twice.
fn read_password(direction: Direction, prehash: bool) -> Result<SecretString> {
    let typed = match std::env::var(PASSWORD_ENV) {
        Ok(value) => normalize_password(&value, prehash)?,
        Err(_) => {
            let first = rpassword::prompt_password("Password: ").context("reading password")?;
            let typed = normalize_password(&first, prehash)?;
            if direction == Direction::Encrypt {
                let second = rpassword::prompt_password("Confirm password: ")
                    .context("reading password confirmation")?;
                if normalize_password(&second, prehash)? != typed {
                    anyhow::bail!("passwords do not match");
                }
            }
            typed
        }
    };

    if direction == Direction::Encrypt {
        let score = password_strength(&typed);
        if Strength::from_score(score) == Strength::Weak {
            warn!(score, "weak password");
            eprintln!("warning: weak password (strength {score}/5)");
        }
    }

    Ok(SecretString::from(if prehash {
        prehash_password(&typed)
    } else {
        typed
    }))
}

/// Clean up typed input before it is used as a password.
///
/// Spaces are stripped, except with `prehash` where the input is only
/// trimmed so the digest matches what other tools compute.
fn normalize_password(raw: &str, prehash: bool) -> Result<String> {
    let typed = if prehash {
        raw.trim().to_string()
    } else {
        sanitize_password(raw)
    };
    if typed.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let len = typed.chars().count();
    if len > MAX_PASSWORD_LEN {
        anyhow::bail!("password is {len} characters long, at most {MAX_PASSWORD_LEN} are accepted");
    }
    Ok(typed)
}

// ── Progress bar helpers ──────────────────────────────────────────────────────

fn make_progress_bar(prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::with_template("{prefix:.bold} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    pb.set_style(style);
    pb.set_prefix(prefix.to_string());
    pb
}

// ── `gostfile encrypt` / `gostfile decrypt` ───────────────────────────────────

fn cmd_crypt(
    config: &GostfileConfig,
    direction: Direction,
    paths: Vec<PathBuf>,
    args: &CryptArgs,
) -> Result<()> {
    let algorithm = args.algorithm.unwrap_or(config.crypto.algorithm);
    let password = read_password(direction, args.prehash)?;
    let processor = BatchProcessor::from_config(config);

    let verb = match direction {
        Direction::Encrypt => "encrypt",
        Direction::Decrypt => "decrypt",
    };
    info!(%algorithm, paths = paths.len(), "{verb} started");

    let pb = make_progress_bar(verb);
    let pb_clone = pb.clone();
    let progress: ProgressFn = Box::new(move |p: &BatchProgress| {
        pb_clone.set_length(p.total as u64);
        pb_clone.set_position(p.completed as u64);
        pb_clone.set_message(
            p.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
    });

    let request = BatchRequest {
        paths,
        direction,
        algorithm,
        password,
    };
    let report = processor.run(&request, Some(&progress));
    pb.finish_and_clear();

    if let Some(failure) = report.failure() {
        println!(
            "{verb}: {} of {} files converted before failure",
            report.completed(),
            report.tasks.len()
        );
        anyhow::bail!("{verb} failed at {failure}");
    }

    println!("{verb} complete:");
    println!("  files:     {}", report.completed());
    println!("  algorithm: {algorithm}");
    for output in &report.outputs {
        println!("  {}", output.display());
    }
    Ok(())
}

// ── `gostfile status` ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusLine<'a> {
    path: &'a Path,
    status: PathState,
    /// Encrypted file that replaced a missing path
    relocated: Option<PathBuf>,
}

fn cmd_status(paths: &[PathBuf], json: bool) -> Result<()> {
    for path in paths {
        let line = StatusLine {
            path,
            status: classify(path),
            relocated: relocate(path).map(|(found, _)| found),
        };

        if json {
            println!(
                "{}",
                serde_json::to_string(&line).context("serializing status")?
            );
            continue;
        }

        let text = match line.status {
            PathState::Encrypted(alg) => format!("encrypted ({alg})"),
            PathState::Decrypted(alg) => format!("decrypted (was {alg})"),
            PathState::Current => "current".to_string(),
            PathState::Missing => "missing".to_string(),
        };
        println!("{}: {text}", path.display());
        if let Some(found) = &line.relocated {
            println!("  now at: {}", found.display());
        }
    }
    Ok(())
}

// ── `gostfile passgen` ────────────────────────────────────────────────────────

fn cmd_passgen(options: &GeneratorOptions) -> Result<()> {
    use secrecy::ExposeSecret;

    let password = generate_password(options).context("generating password")?;
    let score = password_strength(password.expose_secret());
    println!("{}", password.expose_secret());
    eprintln!("strength: {} ({score}/5)", Strength::from_score(score));
    if options.length > MAX_PASSWORD_LEN {
        eprintln!("note: passwords longer than {MAX_PASSWORD_LEN} characters are refused at input");
    }
    Ok(())
}

// ── `gostfile config show` ────────────────────────────────────────────────────

fn cmd_config_show(config: &GostfileConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}
