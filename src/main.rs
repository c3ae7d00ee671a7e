//! Worker Console CLI

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use worker_console::node::mock::DEMO_ACCOUNT;
use worker_console::node::{Backend, DirKeystore, MockConnector, MockKeystore, MockNode};
use worker_console::{Config, ConsoleError, FixSuggestion};

#[derive(Parser)]
#[command(name = "worker-console")]
#[command(about = "Worker Console - manage and confirm workers of a node")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/worker-console/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file (the terminal is taken by the console)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console (default)
    Run {
        /// Management node endpoint, overrides the config
        #[arg(long)]
        node: Option<String>,

        /// Use the built-in demo account (passphrase "demo")
        #[arg(long)]
        demo: bool,
    },

    /// List configured accounts and their keystore directories
    Accounts,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        if let Some(suggestion) = e
            .downcast_ref::<ConsoleError>()
            .and_then(|e| e.fix_suggestion())
        {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_env();

    match cli.command.unwrap_or(Commands::Run {
        node: None,
        demo: false,
    }) {
        Commands::Run { node, demo } => {
            let log_file = cli.log_file.or_else(|| config.log_file.clone());
            if let Some(path) = &log_file {
                init_tracing(path)?;
            }
            run_console(config, node, demo).await
        }
        Commands::Accounts => {
            list_accounts(&config);
            Ok(())
        }
    }
}

/// Logs go to a file only; without one no subscriber is installed
fn init_tracing(path: &Path) -> anyhow::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_console(mut config: Config, node: Option<String>, demo: bool) -> anyhow::Result<()> {
    if let Some(node) = node {
        config.node = node;
    }

    let backend = if demo {
        config
            .accounts
            .entry(DEMO_ACCOUNT)
            .or_insert_with(|| PathBuf::from("demo"));
        Backend::new(
            Arc::new(MockConnector::ready(Arc::new(MockNode::demo()))),
            Arc::new(MockKeystore::demo()),
        )
    } else {
        Backend::new(
            Arc::new(MockConnector::ready(Arc::new(MockNode::demo()))),
            Arc::new(DirKeystore::new()),
        )
    };

    worker_console::tui::run(config, backend).await
}

fn list_accounts(config: &Config) {
    println!("{} {}", "Node:".cyan().bold(), config.node);
    if config.accounts.is_empty() {
        println!("{}", "No accounts configured".dimmed());
        return;
    }

    println!("{}", "Accounts:".cyan().bold());
    for (address, path) in &config.accounts {
        println!("  {} {}", address.to_hex().bold(), path.display());
    }
}
