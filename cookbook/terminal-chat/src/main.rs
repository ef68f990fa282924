//! Interactive terminal front-end for a Sahayak chat session.
//!
//! Configuration comes from the environment (a `.env` file is honored):
//! `GEMINI_API_KEY` is required, `GEMINI_MODEL`, `MAX_CHAT_HISTORY`,
//! `CHAT_HISTORY_DIR` and `LOG_LEVEL` are optional.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing::warn;

use sahayak::{
    init_logging, recommended_model, AssistantConfig, ChatSession, FileTranscriptStore,
    GeminiClient,
};

#[tokio::main]
async fn main() -> sahayak::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = AssistantConfig::from_env();
    if let Err(err) = cfg.validate() {
        eprintln!("startup failed: {err}");
        eprintln!("set GEMINI_API_KEY in the environment or in a .env file");
        std::process::exit(1);
    }
    init_logging(&cfg.logging.level)?;

    let model = Arc::new(GeminiClient::from_config(&cfg.model)?);
    preflight(&model).await;

    let store = FileTranscriptStore::new(&cfg.history.dir);
    let mut session = ChatSession::from_config(model, store, &cfg);

    println!("sahayak terminal chat (/help for commands)");
    let stdin = io::stdin();
    loop {
        print!("you> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/help" => print_help(),
            "/clear" => {
                session.clear_history();
                println!("history cleared");
            }
            "/list" => match session.list_saved_files().await {
                Ok(files) if files.is_empty() => println!("no saved conversations"),
                Ok(files) => {
                    for file in files {
                        println!("  {file}");
                    }
                }
                Err(err) => eprintln!("error: {err}"),
            },
            "/export" => println!("{}", session.export_as_text()),
            "/stats" => {
                let stats = session.statistics();
                println!(
                    "{} messages ({} yours, {} assistant), avg {} chars, ~{} minutes",
                    stats.total_messages,
                    stats.user_messages,
                    stats.assistant_messages,
                    stats.avg_message_length,
                    stats.estimated_duration_minutes
                );
            }
            _ if input == "/save" || input.starts_with("/save ") => {
                let name = input.strip_prefix("/save").map(str::trim).filter(|n| !n.is_empty());
                match session.save_history(name).await {
                    Ok(filename) => println!("saved as {filename}"),
                    Err(err) => eprintln!("error: {err}"),
                }
            }
            _ if input.starts_with("/load ") => {
                let filename = input["/load ".len()..].trim();
                match session.load_history(filename).await {
                    Ok(()) => println!("loaded {filename} ({} messages)", session.transcript().len()),
                    Err(err) => eprintln!("error: {err}"),
                }
            }
            _ if input.starts_with('/') => println!("unknown command, try /help"),
            message => match session.submit(message).await {
                Ok(reply) => println!("sahayak> {}", reply.content),
                Err(err) => eprintln!("error: {err}"),
            },
        }
    }

    Ok(())
}

/// Checks the configured model against the service's availability listing.
/// Advisory only: a mismatch is reported, never auto-corrected.
async fn preflight(model: &GeminiClient) {
    match model.list_models().await {
        Ok(available) => {
            if !available.iter().any(|m| m == model.model()) {
                match recommended_model(&available) {
                    Some(suggestion) => warn!(
                        configured = model.model(),
                        %suggestion,
                        "configured model not reported as available"
                    ),
                    None => warn!("the model service reported no available models"),
                }
            }
        }
        Err(err) => warn!(error = %err, "model availability preflight failed"),
    }
}

fn print_help() {
    println!("  /save [name]   save the conversation");
    println!("  /load <file>   load a saved conversation");
    println!("  /list          list saved conversations");
    println!("  /export        print the conversation as text");
    println!("  /stats         show conversation statistics");
    println!("  /clear         forget the current conversation");
    println!("  /quit          leave");
}
