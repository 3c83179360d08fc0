//! birdsock - query the BIRD routing daemon over its control socket.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use birdsock::config::{ConfigError, ConfigLoader, SocketConfig};
use birdsock::socket::{BirdSocket, ReadMode, SocketError};

#[derive(Parser)]
#[command(
    name = "birdsock",
    about = "Query the BIRD routing daemon over its control socket",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path of the BIRD control socket.
    #[arg(short, long)]
    socket: Option<PathBuf>,

    /// Maximum bytes per socket read.
    #[arg(short, long)]
    buffer_size: Option<usize>,

    /// Give up waiting for the reply after this many milliseconds.
    #[arg(short = 't', long = "timeout")]
    timeout_ms: Option<u64>,

    /// Read until the timeout instead of stopping at the completion code.
    /// Needs a timeout, from `--timeout` or the config file.
    #[arg(long)]
    no_confirm: bool,

    /// Print the greeting banner before the reply.
    #[arg(long)]
    greeting: bool,

    /// Command to send, e.g. `show protocols all`.
    #[arg(required = true, num_args = 1..)]
    command: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Socket(#[from] SocketError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<SocketConfig, ConfigError> {
    let loader = cli
        .config
        .clone()
        .map_or_else(ConfigLoader::new, ConfigLoader::from_file);
    let mut config = loader.load()?;

    if let Some(socket) = &cli.socket {
        config.socket_path.clone_from(socket);
    }
    if let Some(buffer_size) = cli.buffer_size {
        config.buffer_size = buffer_size;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_read_timeout(Duration::from_millis(timeout_ms));
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let command = cli.command.join(" ");
    let mode = if cli.no_confirm {
        ReadMode::Unconfirmed
    } else {
        ReadMode::Confirmed
    };

    tracing::info!(
        socket = %config.socket_path.display(),
        command = %command,
        ?mode,
        "Querying BIRD"
    );

    let mut socket = BirdSocket::with_config(config);
    let greeting = socket.connect().await?;
    let reply = socket.query_with_mode(&command, mode).await;
    socket.close().await;
    let reply = reply?;

    let mut stdout = std::io::stdout().lock();
    if cli.greeting {
        stdout.write_all(&greeting)?;
    }
    stdout.write_all(&reply)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "Query failed");
            eprintln!("birdsock: {e}");
            ExitCode::FAILURE
        }
    }
}
