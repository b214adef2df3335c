//! lanchat - Main entry point
//!
//! Console chat client: reads lines from stdin and hands them to the
//! command interpreter until the user quits.

use anyhow::{Context, Result};
use lanchat::{
    CliArgs, CommandInterpreter, ConsoleUi, OfflineGateway, Peer, PeerDirectory, SessionCode, Settings,
    SharedTopic, TransferRegistry, APP_NAME, APP_VERSION,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

/// Set up panic handler for unexpected errors
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        let backtrace = std::backtrace::Backtrace::capture();

        if let Some(location) = panic_info.location() {
            error!(
                "PANIC occurred at {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }

        let payload = panic_info.payload();
        if let Some(s) = payload.downcast_ref::<&str>() {
            error!("Panic message: {}", s);
        } else if let Some(s) = payload.downcast_ref::<String>() {
            error!("Panic message: {}", s);
        } else {
            error!("Panic message: unknown");
        }
        error!("Backtrace:\n{:?}", backtrace);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_panic_handler();

    let args = CliArgs::parse_args();
    init_logging(&args);
    debug!("CLI arguments: {:?}", args);

    let settings = Settings::from_args(&args).context("Failed to load settings")?;
    settings.validate().context("Invalid configuration")?;

    tokio::fs::create_dir_all(&settings.download_dir)
        .await
        .with_context(|| format!("Failed to create download directory {}", settings.download_dir.display()))?;

    info!("{} v{} starting as {}", APP_NAME, APP_VERSION, settings.nick);

    let me = Peer::local(settings.nick.clone(), SessionCode::random())
        .with_private_chat_port(settings.advertised_private_port())
        .with_client(settings.client.clone(), std::env::consts::OS);

    let peers = Arc::new(PeerDirectory::new(me));
    let transfers = Arc::new(TransferRegistry::new());
    let topic = Arc::new(SharedTopic::default());
    let console = Arc::new(ConsoleUi::new());

    let interpreter = CommandInterpreter::new(
        peers,
        transfers,
        topic,
        Arc::new(OfflineGateway::new()),
        console.clone(),
        console.clone(),
    )
    .with_settings(&settings);

    if !settings.quiet {
        println!("Welcome to {} v{}! Type /help for a list of commands.", APP_NAME, APP_VERSION);
    }

    run_console(&interpreter, &console).await?;

    info!("{} finished", APP_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings
fn init_logging(args: &CliArgs) {
    let level = args.log_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if args.verbose {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    debug!("Logging initialized with level {:?}", level);
}

/// Read lines from stdin until /quit, end of input or Ctrl-C
async fn run_console(interpreter: &CommandInterpreter, console: &ConsoleUi) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while !console.is_shutdown() {
        console.print_prompt()?;

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        };

        match line {
            Some(line) => interpreter.handle_line(&line).await,
            None => {
                debug!("End of input");
                break;
            }
        }
    }

    Ok(())
}
