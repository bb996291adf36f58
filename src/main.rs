//! seal-log command-line tool.
//!
//! # Usage
//!
//! ```bash
//! # Create public_key.json and private_key.json
//! seal-log generate --output-dir keys --key-size 2048
//!
//! # Encrypt a plaintext file, one frame per 4 KiB
//! seal-log encrypt --public-key keys/public_key.json --input app.txt --output app.log
//!
//! # Recover the plaintext
//! seal-log decrypt --private-key keys/private_key.json --input app.log --output app.txt
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use seal_log::CryptoConfig;
use seal_log::files::{self, DEFAULT_CHUNK_SIZE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Envelope encryption for append-only log files
#[derive(Parser, Debug)]
#[command(name = "seal-log")]
#[command(about = "Encrypt log files with RSA + AES-GCM envelopes and decrypt them again")]
#[command(version)]
struct Args {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new RSA key pair
    Generate {
        /// Directory that receives public_key.json and private_key.json
        #[arg(short, long)]
        output_dir: PathBuf,

        /// RSA modulus size in bits (defaults to the configured size)
        #[arg(short, long)]
        key_size: Option<usize>,
    },

    /// Decrypt an encrypted log file
    Decrypt {
        /// Private key file
        #[arg(short, long)]
        private_key: PathBuf,

        /// Encrypted log file
        #[arg(short, long)]
        input: PathBuf,

        /// Destination for the plaintext
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Encrypt a plaintext file into the log format
    Encrypt {
        /// Public key file
        #[arg(short = 'k', long)]
        public_key: PathBuf,

        /// Plaintext input file
        #[arg(short, long)]
        input: PathBuf,

        /// Destination log file
        #[arg(short, long)]
        output: PathBuf,

        /// Plaintext bytes per frame
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Append frames to an existing output file instead of replacing it
        #[arg(long)]
        append: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(args) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<String> {
    let config = match &args.config {
        Some(path) => CryptoConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CryptoConfig::default(),
    };

    match args.command {
        Command::Generate { output_dir, key_size } => {
            let config = match key_size {
                Some(bits) => config.with_rsa_key_bits(bits),
                None => config,
            };
            let paths = files::generate_keys(&output_dir, &config)
                .with_context(|| format!("failed to generate keys in {}", output_dir.display()))?;
            Ok(format!(
                "Generated {}-bit key pair:\n  public:  {}\n  private: {}",
                config.rsa_key_bits,
                paths.public_key.display(),
                paths.private_key.display()
            ))
        }
        Command::Decrypt {
            private_key,
            input,
            output,
        } => {
            let key = files::load_private_key(&private_key)
                .with_context(|| format!("failed to load private key {}", private_key.display()))?;
            let len = files::decrypt_file(&key, &input, &output, &config)
                .with_context(|| format!("failed to decrypt {}", input.display()))?;
            Ok(format!("Decrypted {len} bytes to {}", output.display()))
        }
        Command::Encrypt {
            public_key,
            input,
            output,
            chunk_size,
            append,
        } => {
            let key = files::load_public_key(&public_key)
                .with_context(|| format!("failed to load public key {}", public_key.display()))?;
            let frames = files::encrypt_file(&key, &input, &output, chunk_size, append)
                .with_context(|| format!("failed to encrypt {}", input.display()))?;
            tracing::info!(frames, output = %output.display(), "encryption finished");
            Ok(format!(
                "Encrypted {} into {frames} frame(s) at {}",
                input.display(),
                output.display()
            ))
        }
    }
}
