use std::io::{self, IsTerminal};
use std::process;

use clap::Parser;
use newssense::commands::chat::{self, ChatArgs};
use tracing_subscriber::EnvFilter;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("NS_BUILD_INFO"), ")");

const HELP_EXAMPLES: &str = "Environment:\n  BASE_URL     OpenAI-compatible API root, e.g. https://api.openai.com/v1\n  API_KEY      API key for the service\n  MODEL_NAME   Model used for routing and specialists\n\nExamples:\n  newssense\n  newssense --profile local --output json\n  RUST_LOG=newssense=debug newssense";

#[derive(Debug, Parser)]
#[command(
    name = "newssense",
    version = VERSION,
    about = "Chat with trending-news, fact-check and summary specialists",
    after_help = HELP_EXAMPLES
)]
struct Cli {
    #[command(flatten)]
    chat: ChatArgs,
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "newssense=debug",
            _ => "trace",
        })
    });

    tracing_subscriber::fmt()
        .without_time()
        .with_env_filter(filter)
        .with_target(verbose != 0)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.chat.verbose);

    if let Err(err) = chat::run(cli.chat).await {
        eprintln!("{err}");
        process::exit(1);
    }
}
