use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod prompt;
mod session;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive session with the weather agent
    Chat {
        /// Caller identifier passed to tools as invocation context
        #[arg(long, default_value = "1")]
        user_id: String,

        /// Persist the conversation to a session file instead of memory
        #[arg(long)]
        save: bool,

        /// Thread identifier; a fresh one is generated when omitted
        #[arg(long)]
        thread: Option<String>,
    },
    /// Chunk a PDF, embed it, and run a similarity query against it
    Rag {
        /// Path to the PDF file to ingest
        #[arg(long)]
        file: PathBuf,

        /// The similarity query to run after ingestion
        #[arg(long)]
        query: String,

        /// Number of results to retrieve
        #[arg(long, default_value_t = 4)]
        k: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Rag { file, query, k }) => commands::rag::run(&file, &query, k).await,
        Some(Command::Chat {
            user_id,
            save,
            thread,
        }) => {
            let mut session = commands::chat::build_session(&user_id, save, thread)?;
            session.start().await
        }
        None => {
            let mut session = commands::chat::build_session("1", false, None)?;
            session.start().await
        }
    }
}
