//! Interactive read-dispatch-render loop.

use std::io::{self, BufRead, Write};

use tracing::error;

use crate::news::controller::{Controller, TurnOutcome};
use crate::news::models::UserContext;
use crate::news::render::Renderer;
use crate::rchain::provider::ChatModel;

pub const WELCOME: &str = "Welcome to NewsSense! (Type 'exit' or 'quit' to leave)";
pub const FAREWELL: &str = "Goodbye!";
const PROMPT: &str = "\nYou: ";
const EXIT_KEYWORDS: [&str; 2] = ["exit", "quit"];

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Queries handed to the controller.
    pub turns: usize,
    pub guardrail_trips: usize,
    pub failures: usize,
}

pub fn is_exit_keyword(line: &str) -> bool {
    let line = line.trim();
    EXIT_KEYWORDS
        .iter()
        .any(|keyword| line.eq_ignore_ascii_case(keyword))
}

/// Runs the chat loop until an exit keyword or end of input.
///
/// Queries are handled strictly one at a time. A failed turn is reported and
/// the loop keeps going; only I/O errors on the console end it early.
pub async fn run<M, R, W>(
    controller: &Controller<M>,
    context: &UserContext,
    renderer: Renderer,
    mut input: R,
    mut output: W,
) -> io::Result<SessionSummary>
where
    M: ChatModel,
    R: BufRead,
    W: Write,
{
    let mut summary = SessionSummary::default();
    writeln!(output, "{WELCOME}")?;

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let query = line.trim();
        if is_exit_keyword(query) {
            break;
        }
        if query.is_empty() {
            continue;
        }

        summary.turns += 1;
        match controller.handle(query, context).await {
            Ok(outcome) => {
                if matches!(outcome, TurnOutcome::GuardrailTripped(_)) {
                    summary.guardrail_trips += 1;
                } else {
                    writeln!(output, "\nNewsSense: ")?;
                }
                write!(output, "{}", renderer.outcome(&outcome))?;
            }
            Err(err) => {
                summary.failures += 1;
                error!(error = %err, "turn failed");
                writeln!(output, "\nerror: {err}")?;
            }
        }
    }

    writeln!(output, "{FAREWELL}")?;
    output.flush()?;
    Ok(summary)
}
