mod menu;
mod prompt;
mod render;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use croupier_core::{spin_with_seeds, Casino, CasinoConfig, FairWheel, FileUserStore};
use serde::Serialize;
use tracing::info;

use crate::prompt::Prompter;

#[derive(Parser)]
#[command(name = "croupier", version, about = "Terminal roulette table with a flat-file player store")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Player records file, overrides `store.users_file`
    #[arg(long, global = true)]
    users_file: Option<PathBuf>,
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log filter written to stderr, e.g. `info` or `croupier_core=debug`
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the table (default)
    Play,
    /// Recompute a spin from revealed seeds
    Verify {
        #[arg(long)]
        server_seed: String,
        #[arg(long)]
        client_seed: String,
        #[arg(long)]
        nonce: u64,
        /// Result to check against the recomputed one
        #[arg(long)]
        result: Option<u8>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct VerifyReport {
    server_seed_hash: String,
    client_seed: String,
    nonce: u64,
    result: u8,
    color: String,
    matches: Option<bool>,
}

fn load_config(global: &GlobalArgs) -> Result<CasinoConfig> {
    let mut cfg = match &global.config {
        Some(path) => CasinoConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => CasinoConfig::default(),
    };
    if let Some(path) = &global.users_file {
        cfg.store.users_file = path.clone();
    }
    cfg.validate().context("invalid settings")?;
    Ok(cfg)
}

fn play(cfg: CasinoConfig) -> Result<ExitCode> {
    let store = FileUserStore::new(cfg.store.users_file.clone(), cfg.store.max_users);
    let mut casino = Casino::new(store, FairWheel::new(), cfg);
    info!(users_file = %casino.config().store.users_file.display(), "table open");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut prompt = Prompter::new(stdin.lock(), stdout.lock());
    render::fairness_commitment(prompt.out(), &casino.wheel().server_seed_hash_hex())?;

    let finish = menu::run(&mut prompt, &mut casino)?;

    let wheel = casino.wheel();
    if let (Some(player), true) = (&finish.player, wheel.nonce() > 0) {
        render::fairness_reveal(prompt.out(), wheel.reveal(), player, wheel.nonce())?;
    }
    prompt.out().flush()?;
    Ok(finish.exit.into())
}

fn verify(server_seed: &str, client_seed: &str, nonce: u64, expected: Option<u8>, json: bool) -> Result<ExitCode> {
    let outcome = spin_with_seeds(server_seed, client_seed, nonce);
    let report = VerifyReport {
        server_seed_hash: croupier_core::derive_hash_hex(server_seed.as_bytes()),
        client_seed: client_seed.to_string(),
        nonce,
        result: outcome.result(),
        color: outcome.color.to_string(),
        matches: expected.map(|r| r == outcome.result()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "nonce {} -> {} {} (server seed hash {})",
            report.nonce, report.result, report.color, report.server_seed_hash
        );
        if let Some(ok) = report.matches {
            println!("{}", if ok { "result matches" } else { "result DOES NOT match" });
        }
    }

    Ok(match report.matches {
        Some(false) => ExitCode::from(1),
        _ => ExitCode::SUCCESS,
    })
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&cli.global.log_level))
        .with_writer(io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Play => play(load_config(&cli.global)?),
        Commands::Verify {
            server_seed,
            client_seed,
            nonce,
            result,
            json,
        } => verify(&server_seed, &client_seed, nonce, result, json),
    }
}
