mod config;

use crate::config::Config;
use anyhow::{Context, Result};
use clap::Parser;
use doubt_core::prompts::{PromptSet, load_prompts};
use doubt_core::transcript::CONTEXT_WINDOW_SECS;
use doubt_core::{Assistant, Transcript, build_oracle};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing_subscriber::fmt::time::ChronoLocal;

#[derive(Parser, Debug)]
#[command(version, about = "Ask questions about a recorded lesson")]
struct Cli {
    /// Lesson transcript JSON. Overrides TRANSCRIPT_PATH.
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Print the transcript lines around this playback time (in seconds) first.
    #[arg(long)]
    at: Option<f64>,

    /// The question to answer. Questions are read from stdin, one per line, when omitted.
    question: Option<String>,
}

/// Renders the lines within the context window of `at`, one `[start-end] text` per line.
fn render_window(transcript: &Transcript, at: f64) -> String {
    transcript
        .window(at, CONTEXT_WINDOW_SECS)
        .into_iter()
        .map(|seg| format!("[{:.1}-{:.1}] {}", seg.start, seg.end, seg.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Answers every non-blank line of `reader`, writing each response followed by a blank line.
async fn answer_lines<R, W>(assistant: &Assistant, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    while let Some(line) = lines.next_line().await? {
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }

        let answer = assistant.answer(utterance).await;
        tracing::debug!(outcome = ?answer.outcome, "Answered {:?}", utterance);

        writer.write_all(answer.response.as_bytes()).await?;
        writer.write_all(b"\n\n").await?;
        writer.flush().await?;
        answered += 1;
    }

    Ok(answered)
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    // Logs go to stderr so stdout only carries answers.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    // --- 4. Load the Lesson and Prompts ---
    let transcript_path = args.transcript.unwrap_or(config.transcript_path);
    let transcript =
        Transcript::from_path(&transcript_path).context("Failed to load lesson transcript")?;

    let mut prompts = PromptSet::default();
    if let Some(dir) = &config.prompts_dir {
        let overrides = load_prompts(dir).context("Failed to load prompt overrides")?;
        tracing::info!("Loaded {} prompt overrides.", overrides.len());
        prompts = prompts.with_overrides(&overrides);
    }

    if let Some(at) = args.at {
        println!("{}\n", render_window(&transcript, at));
    }

    // --- 5. Answer ---
    let timeout = config.oracle.timeout();
    let assistant = Assistant::new(Arc::new(transcript), build_oracle(config.oracle))
        .with_prompts(prompts)
        .with_oracle_timeout(timeout);

    match args.question {
        Some(question) => println!("{}", assistant.resolve(&question).await),
        None => {
            let answered =
                answer_lines(&assistant, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
                    .await
                    .context("Failed to answer questions from stdin")?;
            tracing::info!("Answered {} utterances.", answered);
        }
    }

    Ok(())
}
