//! Trust Fingerprint CLI
//!
//! Usage:
//!   fingerprint fingerprint --transcript chat.log --a alice --b bob
//!   fingerprint evaluate --signals signals.json --identity alice.eth
//!   fingerprint report --transcript chat.log --a alice --b bob --signals signals.json --identity alice.eth
//!   fingerprint verify --transcript chat.log --a alice --b bob --remote 0x…
//!   fingerprint serve --addr 127.0.0.1:3000
//!
//! Exit codes: 0 ok, 1 a requested pipeline failed, 2 hashes disagree.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::debug;

use trust_fingerprint::config::{Config, LogFormat};
use trust_fingerprint::core::{
    run_server, InMemoryMessageStore, JsonSignalReader, MessageStore, ReportFormatter,
    ReportRequest, SignalReader, StaticSignalReader, TranscriptFileStore, TrustPipeline,
};
use trust_fingerprint::logging;
use trust_fingerprint::types::{Hash256, ParticipantId, StructuredReport};
use trust_fingerprint::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "fingerprint",
    version = VERSION,
    about = "Private rhythm fingerprints and stake-weighted trust verdicts",
    long_about = "Derives a privacy-preserving commitment from the rhythm of a two-party\n\
                  exchange (timing and lengths only, never content) and evaluates\n\
                  stake-weighted trust signals for an identity.\n\n\
                  Both parties computing a fingerprint over the same exchange get the\n\
                  same exchange hash; `verify` compares yours with theirs."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log filter directive (overrides config, overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fingerprint the exchange between two participants
    Fingerprint(ExchangeArgs),

    /// Evaluate the trust signal of an identity
    Evaluate(IdentityArgs),

    /// Run both pipelines concurrently and print one report
    Report {
        #[command(flatten)]
        exchange: OptionalExchangeArgs,

        #[command(flatten)]
        identity: OptionalIdentityArgs,
    },

    /// Compare our exchange hash with the counter-party's
    Verify {
        #[command(flatten)]
        exchange: ExchangeArgs,

        /// Counter-party's exchange hash (hex, 0x optional)
        #[arg(long)]
        remote: Hash256,
    },

    /// Run the HTTP API server
    Serve {
        /// Listen address (default from config)
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(ClapArgs, Debug)]
struct ExchangeArgs {
    /// Transcript file (`<RFC3339> | <sender> -> <recipient> | <body>`)
    #[arg(long)]
    transcript: PathBuf,

    /// First participant
    #[arg(long)]
    a: String,

    /// Second participant
    #[arg(long)]
    b: String,

    /// Only messages at or after this RFC3339 instant
    #[arg(long)]
    since: Option<DateTime<Utc>>,
}

#[derive(ClapArgs, Debug)]
struct OptionalExchangeArgs {
    /// Transcript file
    #[arg(long)]
    transcript: Option<PathBuf>,

    #[arg(long)]
    a: Option<String>,

    #[arg(long)]
    b: Option<String>,

    #[arg(long)]
    since: Option<DateTime<Utc>>,
}

#[derive(ClapArgs, Debug)]
struct IdentityArgs {
    /// JSON file mapping identity key to signal
    #[arg(long)]
    signals: PathBuf,

    /// Identity to evaluate
    #[arg(long)]
    identity: String,

    /// Override thresholds.min_stake
    #[arg(long)]
    min_stake: Option<f64>,

    /// Override thresholds.min_sentiment
    #[arg(long)]
    min_sentiment: Option<f64>,
}

#[derive(ClapArgs, Debug)]
struct OptionalIdentityArgs {
    /// JSON file mapping identity key to signal
    #[arg(long)]
    signals: Option<PathBuf>,

    #[arg(long)]
    identity: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.log_json {
        config.logging.format = LogFormat::Json;
    }
    logging::init_from_config(&config.logging);

    if cli.no_color {
        colored::control::set_override(false);
    }
    debug!(?config, "configuration loaded");

    let output = Output {
        json: cli.json,
        no_color: cli.no_color,
    };

    match cli.command {
        Command::Fingerprint(exchange) => {
            let pipeline = pipeline(&config, transcript_store(&exchange.transcript), empty_reader());
            let request = ReportRequest {
                participants: Some((exchange.a.into(), exchange.b.into())),
                since: exchange.since,
                identity_key: None,
            };
            output.report(&pipeline.report(&request).await)
        }
        Command::Evaluate(identity) => {
            if let Some(min_stake) = identity.min_stake {
                config.thresholds.min_stake = min_stake;
            }
            if let Some(min_sentiment) = identity.min_sentiment {
                config.thresholds.min_sentiment = min_sentiment;
            }
            config.validate().context("Invalid threshold override")?;

            let pipeline = pipeline(&config, empty_store(), Arc::new(JsonSignalReader::new(&identity.signals)));
            let request = ReportRequest {
                identity_key: Some(identity.identity),
                ..Default::default()
            };
            output.report(&pipeline.report(&request).await)
        }
        Command::Report { exchange, identity } => {
            let store = match &exchange.transcript {
                Some(path) => transcript_store(path),
                None => empty_store(),
            };
            let reader: Arc<dyn SignalReader> = match &identity.signals {
                Some(path) => Arc::new(JsonSignalReader::new(path)),
                None => empty_reader(),
            };
            let request = report_request(&exchange, &identity)?;
            output.report(&pipeline(&config, store, reader).report(&request).await)
        }
        Command::Verify { exchange, remote } => {
            let pipeline = pipeline(&config, transcript_store(&exchange.transcript), empty_reader());
            let agreed = pipeline
                .verify(&exchange.a.into(), &exchange.b.into(), exchange.since, &remote)
                .await;

            match agreed {
                Ok(agreed) => Ok(output.agreement(agreed, &remote)),
                Err(e) => {
                    eprintln!("{}: {}", e.kind(), e);
                    Ok(ExitCode::from(1))
                }
            }
        }
        Command::Serve { addr } => {
            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            run_server(&addr, config.thresholds)
                .await
                .with_context(|| format!("API server on {} failed", addr))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Check that each requested half of a report is complete
fn report_request(exchange: &OptionalExchangeArgs, identity: &OptionalIdentityArgs) -> Result<ReportRequest> {
    let participants = match (&exchange.transcript, &exchange.a, &exchange.b) {
        (Some(_), Some(a), Some(b)) => Some((ParticipantId::from(a.as_str()), ParticipantId::from(b.as_str()))),
        (Some(_), _, _) => anyhow::bail!("--transcript needs both --a and --b"),
        (None, None, None) => None,
        (None, _, _) => anyhow::bail!("--a/--b need --transcript"),
    };
    let identity_key = match (&identity.signals, &identity.identity) {
        (Some(_), Some(key)) => Some(key.clone()),
        (Some(_), None) => anyhow::bail!("--signals needs --identity"),
        (None, Some(_)) => anyhow::bail!("--identity needs --signals"),
        (None, None) => None,
    };
    if participants.is_none() && identity_key.is_none() {
        anyhow::bail!("report needs --transcript/--a/--b, --signals/--identity, or both");
    }
    if participants.is_none() && exchange.since.is_some() {
        anyhow::bail!("--since needs --transcript");
    }

    Ok(ReportRequest {
        participants,
        since: exchange.since,
        identity_key,
    })
}

fn pipeline(config: &Config, store: Arc<dyn MessageStore>, reader: Arc<dyn SignalReader>) -> TrustPipeline {
    TrustPipeline::from_config(store, reader, config)
}

fn transcript_store(path: &Path) -> Arc<dyn MessageStore> {
    Arc::new(TranscriptFileStore::new(path))
}

fn empty_store() -> Arc<dyn MessageStore> {
    Arc::new(InMemoryMessageStore::default())
}

fn empty_reader() -> Arc<dyn SignalReader> {
    Arc::new(StaticSignalReader::default())
}

/// Output settings shared by every subcommand
struct Output {
    json: bool,
    no_color: bool,
}

impl Output {
    /// Print the report; exit 1 when any requested pipeline failed
    fn report(&self, report: &StructuredReport) -> Result<ExitCode> {
        let formatter = ReportFormatter::new();

        if self.json {
            println!("{}", serde_json::to_string_pretty(report).context("Failed to serialize report")?);
        } else if self.no_color {
            println!("{}", formatter.to_parseable_string(report));
        } else {
            println!("{}", formatter.to_terminal_string(report));
        }

        if report.has_errors() {
            for err in &report.errors {
                eprintln!("{} pipeline failed: {}", err.pipeline, err.kind);
            }
            return Ok(ExitCode::from(1));
        }
        Ok(ExitCode::SUCCESS)
    }

    fn agreement(&self, agreed: bool, remote: &Hash256) -> ExitCode {
        if self.json {
            println!("{}", serde_json::json!({ "agreed": agreed, "remote_exchange_hash": remote }));
        } else if agreed {
            println!("agreed | exchange={}", remote);
        } else {
            println!("mismatch | remote={}", remote);
        }

        if agreed {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(2)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
