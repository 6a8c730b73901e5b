use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chat_agent::{
    AnthropicClient, ChatSessionUseCase, DomainError, LineInput, TerminalRenderer,
    DEFAULT_ASSISTANT_NAME,
};

#[derive(Parser)]
#[command(name = "chat-agent")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level (logs go to stderr)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            error!("{e:#}");
            println!("{}", error_report(&e));
            1
        }
    };
    // Stdin reads block on a runtime thread that cannot be cancelled; exit
    // explicitly instead of waiting on it during runtime shutdown.
    std::process::exit(code);
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let client = AnthropicClient::from_env();
    info!("Using model {} at {}", client.model(), client.url());

    let renderer =
        TerminalRenderer::new(DEFAULT_ASSISTANT_NAME).with_color(std::io::stdout().is_terminal());

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received; cancelling session");
            on_interrupt.cancel();
        }
    });

    let mut input = LineInput::stdin();
    let mut output = std::io::stdout();
    let mut session = ChatSessionUseCase::new(&client, &renderer);
    session.execute(&mut input, &mut output, &cancel).await?;

    Ok(())
}

/// The line printed when the session fails. An I/O failure can leave the
/// `You: ` prompt open, so it gets its own line first.
fn error_report(e: &anyhow::Error) -> String {
    let prompt_open = e
        .downcast_ref::<DomainError>()
        .is_some_and(DomainError::is_io_error);
    if prompt_open {
        format!("\nError: {e}")
    } else {
        format!("Error: {e}")
    }
}
