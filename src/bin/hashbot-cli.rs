//! Terminal client for a running HashBot server. Keeps its history in a JSON
//! state file, scoped per user the same way the browser scopes local storage.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::warn;
use tokio::io::{AsyncBufReadExt, BufReader};

use hashbot::client::chat::{ChatSession, SendOutcome};
use hashbot::client::image::{ImageStudio, StudioState};
use hashbot::client::relay::RelayClient;
use hashbot::client::scope::{IdentityScope, IdentityWatcher, ScopedStore};
use hashbot::client::store::FileStore;
use hashbot::config;
use hashbot::models::chat_message::Role;

const DEFAULT_STATE_FILE: &str = "hashbot-state.json";

/// HashBot AI from the terminal
#[derive(Parser)]
#[command(name = "hashbot-cli")]
#[command(about = "Chat with HashBot or generate images from the terminal", long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    url: String,

    /// User id to scope history to; anonymous when omitted
    #[arg(long)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat; `/clear` resets the conversation, `/quit` exits
    Chat,
    /// Interactive image generator
    Image,
}

type Store = Arc<FileStore>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Keep the terminal for the conversation.
    config::init_logging_with("warn");
    let cli = Cli::parse();

    let state_file = std::env::var("HASHBOT_STATE_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE));
    let store: Store = Arc::new(
        FileStore::open(&state_file)
            .with_context(|| format!("could not open state file {}", state_file.display()))?,
    );

    let scope = IdentityScope::from_user_id(cli.user.as_deref());
    if let Some(cleared) = IdentityWatcher::new(store.clone()).observe(&scope)? {
        println!("Cleared saved data for {}", cleared);
    }

    let relay = RelayClient::new(&cli.url)?;
    let scoped = ScopedStore::new(store, scope);
    match cli.command {
        Commands::Chat => chat(relay, scoped).await,
        Commands::Image => image(relay, scoped).await,
    }
}

async fn chat(relay: RelayClient, store: ScopedStore<Store>) -> anyhow::Result<()> {
    let mut session = ChatSession::open(store);
    for message in session.messages() {
        let speaker = match message.role {
            Role::User => "you",
            Role::Assistant => "hashbot",
        };
        println!("{}> {}", speaker, message.content);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt("you> ")?;
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                session.clear();
                println!("hashbot> {}", config::GREETING);
            }
            input => {
                print!("hashbot> ");
                let outcome = session
                    .send(&relay, input, |fragment| {
                        print!("{}", fragment);
                        if let Err(e) = std::io::stdout().flush() {
                            warn!("Could not flush stdout: {}", e);
                        }
                    })
                    .await;
                match outcome {
                    SendOutcome::Completed => println!(),
                    SendOutcome::Failed(_) => println!("\n{}", config::APOLOGY),
                    SendOutcome::Ignored => println!(),
                }
            }
        }
        prompt("you> ")?;
    }
    Ok(())
}

async fn image(relay: RelayClient, store: ScopedStore<Store>) -> anyhow::Result<()> {
    let mut studio = ImageStudio::open(store);
    println!("Commands: generate <prompt>, random, list, view <n>, download [path], quit");
    if !studio.prompt().is_empty() {
        println!("Saved prompt: {}", studio.prompt());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt("image> ")?;
    while let Some(line) = lines.next_line().await? {
        let (command, rest) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
        match command {
            "quit" => break,
            "generate" => {
                if !rest.trim().is_empty() {
                    studio.set_prompt(rest.trim());
                }
                generate(&relay, &mut studio).await;
            }
            "random" => {
                println!("Prompt: {}", studio.random_prompt());
            }
            "list" => {
                if studio.recent().is_empty() {
                    println!("No images yet");
                }
                for (index, image) in studio.recent().iter().enumerate() {
                    println!("{:>3}  {}", index, studio.prompt_for(image));
                }
            }
            "view" => match rest.trim().parse::<usize>() {
                Ok(index) if studio.select_recent(index) => show_current(&studio),
                _ => println!("No image at {:?}", rest.trim()),
            },
            "download" => {
                let path = Some(rest.trim()).filter(|p| !p.is_empty()).map(PathBuf::from);
                match studio.download(path.as_deref()) {
                    Ok(saved) => println!("Saved {}", saved.display()),
                    Err(e) => println!("Download failed: {}", e),
                }
            }
            "" => {}
            other => println!("Unknown command {:?}", other),
        }
        prompt("image> ")?;
    }
    Ok(())
}

async fn generate(relay: &RelayClient, studio: &mut ImageStudio<Store>) {
    if studio.prompt().trim().is_empty() {
        println!("Enter a prompt first");
        return;
    }
    println!("Generating...");
    studio.generate(relay).await;
    match studio.state() {
        StudioState::Error => println!("{}", studio.error().unwrap_or("Failed to generate image")),
        _ => show_current(studio),
    }
}

fn show_current(studio: &ImageStudio<Store>) {
    match (studio.current(), studio.current_prompt()) {
        (Some(image), Some(prompt)) => println!("Current image: {} ({} chars of data URI)", prompt, image.len()),
        _ => println!("No current image"),
    }
}

fn prompt(text: &str) -> std::io::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()
}
