//! chatrelay CLI and HTTP entry point.
//!
//! Binary name: `chatrelay`
//!
//! Parses CLI arguments, resolves configuration, opens the message store,
//! then dispatches to a command handler or starts the HTTP server.

mod cli;
mod http;
mod state;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use chatrelay_infra::config::{apply_env_overrides, load_config, resolve_api_key, resolve_data_dir};
use chatrelay_observe::tracing_setup::{init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_directive(), cli.otel)
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "chatrelay", &mut std::io::stdout());
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    let env = |key: &str| std::env::var(key).ok();
    let mut config = apply_env_overrides(load_config(&data_dir).await, env);

    if let Commands::Serve { port, host, .. } = &cli.command {
        if let Some(port) = port {
            config.port = *port;
        }
        if let Some(host) = host {
            config.host = host.clone();
        }
    }
    config.bootstrap = cli.command.bootstrap_policy(config.bootstrap);

    let state = AppState::init(config, data_dir, resolve_api_key(env)).await?;

    let result = run(&cli, state.clone()).await;

    state.shutdown().await;
    shutdown_tracing();

    result
}

async fn run(cli: &Cli, state: AppState) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Serve { .. } => serve(state, cli.quiet).await,
        Commands::History => cli::message::history(&state, cli.json).await,
        Commands::Send { content } => cli::message::send(&state, content, cli.json).await,
        Commands::Status => cli::status::status(&state, cli.json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

async fn serve(state: AppState, quiet: bool) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "chatrelay listening");
    if !quiet {
        println!(
            "  {} chatrelay listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
