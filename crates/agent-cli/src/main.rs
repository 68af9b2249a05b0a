//! todo-agent
//!
//! Terminal chat with the todo assistant. Tasks live in memory for the
//! lifetime of the process.
//!
//! Provider selection comes from the environment (or a `.env` file):
//! `LLM_PROVIDER` (`groq` | `openai` | `gemini`) plus the matching
//! `GROQ_*` / `GEMINI_*` settings.

mod commands;
mod state;

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_assistant::StatusFilter;

use crate::commands::{Command, HELP, format_history, format_tasks, format_tool_calls};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let adapter = agent_runtime::adapter_from_env()?;
    let (user_id, max_rounds) = AppState::settings_from_env()?;
    let mut state = AppState::new(adapter.clone(), &user_id, max_rounds)?;

    tracing::info!(
        provider = adapter.name(),
        model = adapter.model(),
        user = %user_id,
        tools = state.agent.dispatch().registry().len(),
        "todo-agent ready"
    );

    println!("Todo assistant ({} / {}). {HELP}", adapter.name(), adapter.model());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::History => print!("{}", format_history(state.context.conversation_history())),
            Command::Tasks => match state.store.list(&user_id, StatusFilter::All).await {
                Ok(tasks) => print!("{}", format_tasks(&tasks)),
                Err(err) => println!("Could not load tasks: {err}"),
            },
            Command::Unknown(cmd) => println!("Unknown command {cmd}. {HELP}"),
            Command::Message(text) => handle_message(&mut state, text).await,
        }
    }

    println!("Bye!");
    Ok(())
}

/// Send one message, letting Ctrl-C abandon it
async fn handle_message(state: &mut AppState, text: &str) {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let result = state
        .agent
        .process_message_cancellable(text, &mut state.context, None, &cancel)
        .await;
    watcher.abort();

    match result {
        Ok(reply) => {
            println!("{}", reply.message);
            if !reply.tool_calls.is_empty() {
                print!("{}", format_tool_calls(&reply.tool_calls));
            }
        }
        Err(err) => {
            tracing::error!(error = %err, "Message failed");
            println!("{}", err.user_message());
        }
    }
}
