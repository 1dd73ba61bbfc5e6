//! System status command.

use anyhow::Result;
use console::style;

use chatrelay_core::chat::repository::MessageRepository;
use chatrelay_core::llm::gateway::CompletionGateway;

use crate::state::AppState;

/// Display store and gateway status.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let count = state.conversation.repo().count().await?;
    let gateway = state.conversation.gateway();
    let completion = &state.config.completion;

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "messages": count,
            "bootstrap": state.config.bootstrap.to_string(),
            "gateway": {
                "name": gateway.name(),
                "configured": gateway.is_configured(),
                "model": completion.model,
                "base_url": completion.base_url,
            },
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} chatrelay v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Store ──").dim());
    println!("  Messages:  {}", style(count).bold());
    println!("  Bootstrap: {}", state.config.bootstrap);
    println!("  Data dir:  {}", style(state.data_dir.display()).dim());
    println!("  Database:  {}", style("SQLite (WAL mode)").dim());
    println!();

    println!("  {}", style("── Gateway ──").dim());
    let configured = if gateway.is_configured() {
        style("API key set").green()
    } else {
        style("no API key (replies disabled)").yellow()
    };
    println!("  Provider:  {} ({configured})", gateway.name());
    println!("  Model:     {}", completion.model);
    println!("  Endpoint:  {}", style(&completion.base_url).dim());
    println!();

    Ok(())
}
