//! Transcript commands: `history` and `send`.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chatrelay_types::message::{Message, Sender};

use crate::state::AppState;

/// Print every stored message, oldest first.
pub async fn history(state: &AppState, json: bool) -> Result<()> {
    let messages = state.conversation.list_history().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!();
        println!("  {}", style("No messages yet.").dim());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Time"),
            Cell::new("Sender"),
            Cell::new("Content"),
        ]);

    for m in &messages {
        table.add_row(vec![
            Cell::new(m.id),
            Cell::new(m.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            sender_cell(m.sender),
            Cell::new(&m.content),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!("  {} message(s)", style(messages.len()).bold());
    println!();

    Ok(())
}

fn sender_cell(sender: Sender) -> Cell {
    match sender {
        Sender::User => Cell::new(sender).fg(Color::Green),
        Sender::Assistant => Cell::new(sender).fg(Color::Magenta),
    }
}

/// Submit one user message and print the exchange.
pub async fn send(state: &AppState, content: &str, json: bool) -> Result<()> {
    let outcome = state.conversation.submit_user_message(content).await?;

    if json {
        let mut body = serde_json::json!({ "userMessage": outcome.user_message });
        if let Some(ai) = &outcome.assistant_message {
            body["aiMessage"] = serde_json::to_value(ai)?;
        }
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!();
    print_message(&outcome.user_message);
    match (&outcome.assistant_message, &outcome.generation_error) {
        (Some(ai), _) => print_message(ai),
        (None, Some(err)) => {
            println!(
                "  {} No reply generated: {}",
                style("!").yellow().bold(),
                style(err).dim()
            );
        }
        (None, None) => {
            println!("  {} No reply generated", style("!").yellow().bold());
        }
    }
    println!();

    Ok(())
}

fn print_message(message: &Message) {
    let label = match message.sender {
        Sender::User => style("you").green().bold(),
        Sender::Assistant => style("assistant").magenta().bold(),
    };
    println!("  {label} {}", style(format!("#{}", message.id)).dim());
    println!("  {}", message.content);
}
