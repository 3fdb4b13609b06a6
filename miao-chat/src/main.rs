use anyhow::Result;
use clap::{Parser, Subcommand};
use miao_chat::{Assistant, ChatClient, ChatConfig, PromptBuilder, Session, SessionList};
use miao_knowledge::{BackendKind, KnowledgeBase, SearchConfig, build_backend, loader};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Knowledge-augmented chat on the command line
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Knowledge base file (.json or .toml); the built-in sample is used when omitted
    #[arg(short, long, global = true)]
    kb: Option<PathBuf>,

    /// Search configuration file (.toml)
    #[arg(long, global = true)]
    search_config: Option<PathBuf>,

    /// Minimum knowledge score for augmentation
    #[arg(short, long, global = true)]
    threshold: Option<f64>,

    /// Knowledge search backend: lexical, remote or semantic
    #[arg(short, long, global = true)]
    backend: Option<BackendKind>,

    /// API key (defaults to DEEPSEEK_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// API base URL (defaults to DEEPSEEK_BASE_URL or https://api.deepseek.com)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Send the last ten messages of history instead of only the latest
    #[arg(short, long, global = true)]
    multi_turn: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question
    Ask {
        /// The question
        question: String,
        /// Print the reply and knowledge match as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start an interactive chat
    Chat,
    /// Show the effective configuration with the API key masked
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let (chat_config, search_config) = build_configs(&args)?;

    match args.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&chat_config)?);
            println!("{}", serde_json::to_string_pretty(&search_config)?);
            Ok(())
        }
        Commands::Ask { ref question, json } => {
            let assistant = build_assistant(&chat_config, &search_config).await?;
            let mut session = Session::new();
            match assistant.ask(&mut session, question).await? {
                Some(outcome) if json => {
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
                Some(outcome) => {
                    if let Some(matched) = &outcome.knowledge {
                        eprintln!("[knowledge] {}", matched.question);
                    }
                    println!("{}", outcome.reply.content);
                }
                None => eprintln!("Nothing to ask"),
            }
            Ok(())
        }
        Commands::Chat => {
            let assistant = build_assistant(&chat_config, &search_config).await?;
            run_repl(assistant).await
        }
    }
}

fn build_configs(args: &Args) -> Result<(ChatConfig, SearchConfig)> {
    let mut chat = ChatConfig::from_env().with_multi_turn(args.multi_turn);
    if let Some(key) = &args.api_key {
        chat = chat.with_api_key(key.clone());
    }
    if let Some(url) = &args.base_url {
        chat = chat.with_base_url(url.clone());
    }
    if let Some(model) = &args.model {
        chat = chat.with_model(model.clone());
    }
    chat.validate()?;

    let mut search = match &args.search_config {
        Some(path) => SearchConfig::from_toml_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(kb) = &args.kb {
        search = search.with_knowledge_path(kb.clone());
    }
    if let Some(threshold) = args.threshold {
        search = search.with_threshold(threshold);
    }
    if let Some(backend) = args.backend {
        search = search.with_backend(backend);
    }
    search.validate()?;

    Ok((chat, search))
}

async fn build_assistant(chat: &ChatConfig, search: &SearchConfig) -> Result<Assistant> {
    let kb = match &search.knowledge_path {
        Some(path) => loader::load_or_empty(path),
        None => KnowledgeBase::sample(),
    };
    let backend = build_backend(search, Arc::new(kb)).await?;
    let client = ChatClient::new(chat)?;

    let prompt = PromptBuilder::new()
        .with_multi_turn(chat.multi_turn)
        .with_history_window(chat.history_window);
    Ok(Assistant::new(Arc::from(backend), Arc::new(client))
        .with_prompt(prompt)
        .with_threshold(search.threshold)
        .with_top_k(search.top_k))
}

const HELP: &str = "Commands: /new, /list, /switch <id>, /delete <id>, /multi on|off, /clear, /quit";

async fn run_repl(mut assistant: Assistant) -> Result<()> {
    let mut sessions = SessionList::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("{}", sessions.current().messages()[0].content);
    println!("{HELP}");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("quit" | "exit"), _) => break,
                (Some("new"), _) => {
                    let session = sessions.create();
                    println!("{}", session.messages()[0].content);
                }
                (Some("list"), _) => {
                    let current = sessions.current().id.clone();
                    for session in sessions.sessions() {
                        let marker = if session.id == current { "*" } else { " " };
                        println!("{marker} {} {}", &session.id[..8], session.title);
                    }
                }
                (Some("switch"), Some(prefix)) => match find_session(&sessions, prefix) {
                    Some(id) => {
                        let session = sessions.select(&id)?;
                        println!("Switched to {}", session.title);
                    }
                    None => println!("No session matches '{prefix}'"),
                },
                (Some("delete"), Some(prefix)) => match find_session(&sessions, prefix) {
                    Some(id) => {
                        let removed = sessions.delete(&id)?;
                        println!("Deleted {}", removed.title);
                    }
                    None => println!("No session matches '{prefix}'"),
                },
                (Some("multi"), Some(state)) => {
                    assistant.set_multi_turn(state == "on");
                    println!(
                        "Multi-turn {}",
                        if assistant.prompt().multi_turn() { "on" } else { "off" }
                    );
                }
                (Some("clear"), _) => {
                    sessions.current_mut().clear();
                    println!("Session cleared");
                }
                _ => println!("{HELP}"),
            }
            continue;
        }

        match assistant.ask(sessions.current_mut(), line).await {
            Ok(Some(outcome)) => {
                if let Some(matched) = &outcome.knowledge {
                    println!("[knowledge] {}", matched.question);
                }
                println!("{}", outcome.reply.content);
            }
            Ok(None) => {}
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    Ok(())
}

fn find_session(sessions: &SessionList, prefix: &str) -> Option<String> {
    sessions
        .sessions()
        .iter()
        .find(|s| s.id.starts_with(prefix))
        .map(|s| s.id.clone())
}
