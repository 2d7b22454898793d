// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! jettyctl: the jetty invocation shell.

mod commands;
mod exit_error;

use clap::{Parser, Subcommand};
use exit_error::ExitError;
use tokio_util::sync::CancellationToken;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")");

#[derive(Parser)]
#[command(name = "jettyctl", version = VERSION, about = "Declarative build executor")]
struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new Jettyfile in the current directory
    Init,
    /// View the status of builds
    Ps(commands::ps::PsArgs),
    /// Run a new build
    Build(commands::build::BuildArgs),
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_tracing(cli.verbose);

    let root = CancellationToken::new();
    spawn_signal_handler(root.clone());

    // `ps` is the default when no command is given.
    let command = cli.command.unwrap_or_else(|| Command::Ps(commands::ps::PsArgs::default()));
    let result = match command {
        Command::Init => commands::init::handle().await,
        Command::Ps(args) => commands::ps::handle(args).await,
        Command::Build(args) => commands::build::handle(args, root.child_token()).await,
    };

    let code = match result {
        Ok(()) if root.is_cancelled() => {
            eprintln!("Operation canceled");
            1
        }
        Ok(()) => 0,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                if let Some(message) = exit.message() {
                    eprintln!("{message}");
                }
                exit.code()
            }
            None => {
                eprintln!("Error: {e:#}");
                1
            }
        },
    };
    std::process::exit(code);
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancel the root token on SIGINT or SIGTERM; in-flight work observes
/// the token and winds down before the process exits.
fn spawn_signal_handler(root: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("received termination signal; initiating graceful shutdown");
        root.cancel();
    });
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
