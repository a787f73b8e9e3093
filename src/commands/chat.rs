use std::io::{self, IsTerminal};

use clap::{ArgAction, Args};
use tracing::info;

use crate::config::{ConfigError, Overrides, Settings};
use crate::news::controller::Controller;
use crate::news::guardrail::QueryGuardrail;
use crate::news::models::UserContext;
use crate::news::render::{OutputMode, Renderer};
use crate::rchain::openai::OpenAiChat;
use crate::session;

#[derive(Debug, Args, Clone, Default)]
pub struct ChatArgs {
    /// Profile name from the config file
    #[arg(long)]
    pub profile: Option<String>,
    /// Identifier reported for this session
    #[arg(long)]
    pub user_id: Option<String>,
    #[arg(long)]
    pub temperature: Option<f32>,
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Per-request HTTP timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Limit for one whole turn in seconds
    #[arg(long)]
    pub turn_timeout: Option<u64>,
    #[arg(long)]
    pub retries: Option<u32>,
    /// Base retry delay in milliseconds
    #[arg(long)]
    pub retry_delay: Option<u64>,
    #[arg(long, value_parser = parse_output_mode)]
    pub output: Option<OutputMode>,
    /// Disable colored headers
    #[arg(long)]
    pub no_color: bool,
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

fn parse_output_mode(raw: &str) -> Result<OutputMode, String> {
    OutputMode::parse(raw).ok_or_else(|| format!("invalid output '{raw}', expected text or json"))
}

impl ChatArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            profile: self.profile.clone(),
            user_id: self.user_id.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: self.timeout,
            turn_timeout: self.turn_timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            output: self.output,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Builds the controller from settings and runs the session on stdin/stdout.
pub async fn run(args: ChatArgs) -> Result<(), ChatError> {
    let settings = Settings::from_env(&args.overrides())?;
    info!(
        model = %settings.model,
        user_id = %settings.user_id,
        endpoint = %settings.base_url,
        "configuration loaded"
    );

    let client = OpenAiChat::new(
        &settings.base_url,
        settings.api_key.clone(),
        settings.model.clone(),
        settings.ask,
    );
    let guardrail = QueryGuardrail::new(settings.max_query_chars)
        .with_blocked_terms(&settings.blocked_terms);
    let controller = Controller::new(client)
        .with_guardrail(guardrail)
        .with_max_tool_rounds(settings.max_tool_rounds)
        .with_turn_timeout(settings.turn_timeout);

    let context = UserContext::new(settings.user_id.clone())
        .with_categories(settings.preferred_categories.clone());
    let color = !args.no_color && io::stdout().is_terminal();
    let renderer = Renderer::new(settings.output, color);

    let stdin = io::stdin();
    let summary = session::run(&controller, &context, renderer, stdin.lock(), io::stdout()).await?;
    info!(
        turns = summary.turns,
        guardrail_trips = summary.guardrail_trips,
        failures = summary.failures,
        "session finished"
    );
    Ok(())
}
