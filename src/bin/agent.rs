//! Interactive aviation assistant
//!
//! With arguments, answers them as a single question and exits. Otherwise
//! reads questions from stdin until `exit`, `quit` or `q`.

use adsb_tracker::agent::{Agent, BackendToolExecutor, ChatModel, MistralClient, ToolExecutor};
use adsb_tracker::{AdsbConfig, telemetry};
use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

async fn ask<M: ChatModel, E: ToolExecutor>(agent: &Agent<M, E>, question: &str) {
    match agent.chat(question).await {
        Ok(answer) => println!("\n{answer}\n"),
        Err(e) => {
            tracing::error!(error = %e, "Agent request failed");
            println!("\nError: {}\n", e.user_message());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AdsbConfig::load()?;
    telemetry::init(&config.logging)?;

    let model = MistralClient::new(&config.agent).context("Failed to create language model client")?;
    let executor = BackendToolExecutor::new(&config.agent).context("Failed to create tool executor")?;
    tracing::info!(model = model.model(), backend = %config.agent.backend_url, "Agent ready");
    let agent = Agent::new(model, executor, config.agent.max_tool_rounds);

    let question = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if !question.trim().is_empty() {
        ask(&agent, &question).await;
        return Ok(());
    }

    println!("ADS-B flight tracking assistant. Type 'exit' to quit.");
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "exit" | "quit" | "q") {
            break;
        }
        ask(&agent, line).await;
    }

    println!("Goodbye!");
    Ok(())
}
