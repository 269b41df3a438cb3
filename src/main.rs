//! Prompt Stash CLI
//!
//! Thin command-line front end over the application state: inspect the
//! library, search it, manage the stored credential, and chat with the
//! assistant.

use std::io::Write as _;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use prompt_stash_core::streaming::UnifiedStreamEvent;

use prompt_stash::services::{collect_tag_facets, filter_prompts, PromptFilters};
use prompt_stash::state::{AppState, PROVIDER_NAME};
use prompt_stash::AppResult;

const PASSPHRASE_ENV: &str = "PROMPT_STASH_PASSPHRASE";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let passphrase =
        std::env::var(PASSPHRASE_ENV).unwrap_or_else(|_| "prompt-stash".to_string());

    let state = AppState::new();
    state.initialize(None, &passphrase, None).await?;

    match args.first().map(String::as_str) {
        Some("list") | None => list(&state),
        Some("show") => show(&state, args.get(1).map(String::as_str)),
        Some("search") => search(&state, &args[1..]),
        Some("tags") => tags(&state),
        Some("set-key") => set_key(&state, args.get(1).map(String::as_str)),
        Some("chat") => chat(&state, &args[1..]).await,
        Some(other) => {
            eprintln!("unknown command: {}", other);
            eprintln!("usage: prompt-stash [list | show <id> | search <text> | tags | set-key <key> | chat <message>]");
            Ok(())
        }
    }
}

fn list(state: &AppState) -> AppResult<()> {
    state.with_library(|lib| {
        let prompts = filter_prompts(lib.prompts(), &PromptFilters::default());
        for prompt in &prompts {
            let marker = match (prompt.bookmarked, prompt.locked) {
                (true, true) => "*!",
                (true, false) => "* ",
                (false, true) => " !",
                (false, false) => "  ",
            };
            println!("{} {}  {}", marker, prompt.id, prompt.title);
        }
        println!("{} prompts", prompts.len());
    })
}

fn show(state: &AppState, id: Option<&str>) -> AppResult<()> {
    let Some(id) = id else {
        eprintln!("usage: prompt-stash show <id>");
        return Ok(());
    };
    state.with_library(|lib| match lib.get(id) {
        Some(prompt) => match serde_json::to_string_pretty(prompt) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: {}", e),
        },
        None => eprintln!("no prompt with id {}", id),
    })
}

fn search(state: &AppState, terms: &[String]) -> AppResult<()> {
    let needle = terms.join(" ");
    state.with_library(|lib| {
        let filters = PromptFilters {
            search: Some(needle.clone()),
            ..Default::default()
        };
        for prompt in filter_prompts(lib.prompts(), &filters) {
            println!("{}  {}", prompt.id, prompt.title);
        }
    })
}

fn tags(state: &AppState) -> AppResult<()> {
    state.with_library(|lib| {
        let facets = collect_tag_facets(lib.prompts());
        println!("types:");
        for facet in &facets.types {
            println!("  {} ({})", facet.label, facet.count);
        }
        println!("use cases:");
        for facet in &facets.use_cases {
            println!("  {} ({})", facet.label, facet.count);
        }
    })
}

fn set_key(state: &AppState, key: Option<&str>) -> AppResult<()> {
    let Some(key) = key else {
        eprintln!("usage: prompt-stash set-key <api-key>");
        return Ok(());
    };
    state.secrets()?.set(PROVIDER_NAME, key)?;
    println!("credential stored; restart to use it");
    Ok(())
}

async fn chat(state: &AppState, terms: &[String]) -> AppResult<()> {
    let message = terms.join(" ");
    if message.trim().is_empty() {
        eprintln!("usage: prompt-stash chat <message>");
        return Ok(());
    }

    let (tx, mut rx) = mpsc::channel(256);
    let printer = tokio::spawn(async move {
        let mut out = std::io::stdout();
        while let Some(event) = rx.recv().await {
            match event {
                UnifiedStreamEvent::TextDelta { content } => {
                    let _ = write!(out, "{}", content);
                    let _ = out.flush();
                }
                UnifiedStreamEvent::ToolStart { tool_name, .. } => {
                    let _ = writeln!(out, "\n[running {}...]", tool_name);
                }
                UnifiedStreamEvent::ToolResult {
                    tool_name,
                    result,
                    error,
                    ..
                } => match error {
                    Some(message) => {
                        let _ = writeln!(out, "[{} failed: {}]", tool_name, message);
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "[{}] {}",
                            tool_name,
                            result.unwrap_or(serde_json::Value::Null)
                        );
                    }
                },
                UnifiedStreamEvent::Error { message, .. } => {
                    let _ = writeln!(out, "\nerror: {}", message);
                }
                _ => {}
            }
        }
    });

    let selected_template = state.with_library(|lib| {
        lib.selected().and_then(|p| p.template.clone())
    })?;

    let chat = state.chat();
    let mut guard = chat.lock().await;
    let service = guard
        .as_mut()
        .ok_or_else(|| prompt_stash::AppError::internal("Chat not initialized"))?;
    let result = service.send_message(&message, &[], selected_template, tx).await;
    drop(guard);

    let _ = printer.await;
    println!();
    result.map(|_| ())
}
