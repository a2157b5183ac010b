//! NavSpark CLI - Command-line interface
//!
//! Talks to a NavSpark / SkyTraq receiver over a serial port, or decodes
//! captured bytes offline.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use navspark_core::cli::print_exit_codes;
use navspark_core::core::protocol::{DEFAULT_MAX_BUFFER, MIN_FRAME_LEN};
use navspark_core::core::transport;
use navspark_core::{
    AppConfig, CliError, ConfigurePositionUpdateRate, Direction, ExitCodes, Link, LinkError, LoggingConfig, Message,
    MessageReceiver, PersistSetting, QueryBasePosition, QueryBinaryMeasurementOutputStatus,
    QueryBinaryRtcmOutputStatus, QueryPositionUpdateRate, QuerySoftwareCrc, QuerySoftwareVersion, Reassembler,
    Registry, UpdateRate,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Acknowledgement and reply timeout when neither the flag nor the config sets one
const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// CLI output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format for scripting
    Json,
}

/// NavSpark CLI
#[derive(Parser, Debug)]
#[command(
    name = "navspark-cli",
    version,
    about = "Binary protocol console for NavSpark / SkyTraq GNSS receivers",
    long_about = None
)]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "NAVSPARK_CONFIG")]
    config: Option<PathBuf>,

    /// Serial port name (e.g., COM3, /dev/ttyUSB0)
    #[arg(short, long, env = "NAVSPARK_PORT")]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available serial ports
    ListPorts,

    /// Print decoded messages from the receiver
    Monitor {
        /// Exit after this many messages
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Send a query and print the receiver's reply
    Query {
        /// What to ask for
        #[arg(value_enum)]
        what: QueryKind,

        /// Acknowledgement and reply timeout in milliseconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Set the position update rate
    SetUpdateRate {
        /// Rate in Hz (1, 2, 4, 5, 8, 10, 20, 25, 40, 50)
        #[arg(value_parser = parse_update_rate)]
        hz: UpdateRate,

        /// Store in flash as well as SRAM
        #[arg(long)]
        persist: bool,

        /// Acknowledgement timeout in milliseconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Decode a hex byte string offline
    Decode {
        /// Captured bytes, whitespace allowed (e.g. "A0 A1 00 01 83 83 0D 0A")
        hex: String,
    },

    /// Print the message catalog
    Catalog,

    /// Print the exit code table
    ExitCodes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum QueryKind {
    /// Firmware version
    Version,
    /// Firmware CRC
    Crc,
    /// Position update rate
    UpdateRate,
    /// Binary measurement output settings
    MeasurementOutput,
    /// RTCM output settings
    RtcmOutput,
    /// Base station position
    BasePosition,
}

impl QueryKind {
    /// Command to send and the name of the reply to wait for
    fn command(self) -> (Message, &'static str) {
        match self {
            Self::Version => (QuerySoftwareVersion::default().into(), "ReceiverSoftwareVersion"),
            Self::Crc => (QuerySoftwareCrc::default().into(), "ReceiverSoftwareCrc"),
            Self::UpdateRate => (QueryPositionUpdateRate.into(), "ConfigurePositionUpdateRate"),
            Self::MeasurementOutput => (
                QueryBinaryMeasurementOutputStatus.into(),
                "ConfigureBinaryMeasurementOutput",
            ),
            Self::RtcmOutput => (QueryBinaryRtcmOutputStatus.into(), "ConfigureBinaryRtcmOutput"),
            Self::BasePosition => (QueryBasePosition.into(), "ConfigureBasePosition"),
        }
    }
}

fn parse_update_rate(value: &str) -> Result<UpdateRate, String> {
    let hz: u8 = value.parse().map_err(|_| format!("not a number: {}", value))?;
    UpdateRate::from_u8(hz).ok_or_else(|| format!("unsupported update rate: {} Hz", hz))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            return ExitCodes::exit_code(ExitCodes::for_error(&err));
        }
    };
    init_logging(&cli, &config.logging);

    match run(&cli, config).await {
        Ok(()) => ExitCodes::exit_code(ExitCodes::SUCCESS),
        Err(err) => {
            tracing::debug!(error = ?err, "Command failed");
            eprintln!("Error: {:#}", err);
            ExitCodes::exit_code(ExitCodes::for_error(&err))
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(port) = &cli.port {
        config.serial.port.clone_from(port);
    }
    if let Some(baud) = cli.baud {
        config.serial.baud_rate = baud;
    }
    Ok(config)
}

fn init_logging(cli: &Cli, logging: &LoggingConfig) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: &Cli, config: AppConfig) -> anyhow::Result<()> {
    match &cli.command {
        Commands::ListPorts => list_ports(cli),
        Commands::Monitor { count } => monitor(cli, &config, *count).await,
        Commands::Query { what, timeout } => query(cli, config, *what, *timeout).await,
        Commands::SetUpdateRate { hz, persist, timeout } => {
            set_update_rate(cli, config, *hz, *persist, *timeout).await
        }
        Commands::Decode { hex } => decode(cli, hex),
        Commands::Catalog => catalog(cli),
        Commands::ExitCodes => {
            print_exit_codes();
            Ok(())
        }
    }
}

fn list_ports(cli: &Cli) -> anyhow::Result<()> {
    let ports = transport::list_ports()?;

    if cli.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&ports)?);
        return Ok(());
    }

    if ports.is_empty() {
        if !cli.quiet {
            println!("No serial ports found.");
        }
        return Ok(());
    }
    for port in &ports {
        println!("{:<20} {}", port.name, port.description);
    }
    Ok(())
}

fn open_link(config: &AppConfig) -> anyhow::Result<(Link, MessageReceiver)> {
    let port = transport::open(&config.serial)?;
    let (link, messages) = Link::spawn(port, &config.link)?;
    Ok((link, messages))
}

fn with_timeout(mut config: AppConfig, timeout_ms: Option<u64>) -> (AppConfig, Duration) {
    let timeout_ms = timeout_ms.or(config.link.ack_timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS);
    config.link.ack_timeout_ms = Some(timeout_ms);
    (config, Duration::from_millis(timeout_ms))
}

async fn monitor(cli: &Cli, config: &AppConfig, count: Option<usize>) -> anyhow::Result<()> {
    let (link, mut messages) = open_link(config)?;
    if !cli.quiet {
        eprintln!("Monitoring {}. Press Ctrl+C to exit.", config.serial.connection_info());
    }

    let mut seen = 0usize;
    loop {
        tokio::select! {
            message = messages.recv() => match message {
                Some(message) => {
                    print_message(cli, &message)?;
                    seen += 1;
                    if count.is_some_and(|count| seen >= count) {
                        break;
                    }
                }
                None => {
                    tracing::warn!("Receiver stream ended");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    let stats = link.stats();
    tracing::info!(
        delivered = stats.delivered,
        checksum_errors = stats.checksum_errors,
        unknown_types = stats.unknown_types,
        dropped = stats.dropped,
        "Monitor finished"
    );
    Ok(())
}

async fn query(cli: &Cli, config: AppConfig, what: QueryKind, timeout_ms: Option<u64>) -> anyhow::Result<()> {
    let (config, timeout) = with_timeout(config, timeout_ms);
    let (link, mut messages) = open_link(&config)?;
    let (command, expected) = what.command();

    send_acknowledged(&link, &command).await?;
    let reply = wait_for(&mut messages, expected, timeout).await?;
    print_message(cli, &reply)
}

async fn set_update_rate(
    cli: &Cli,
    config: AppConfig,
    update_rate: UpdateRate,
    persist: bool,
    timeout_ms: Option<u64>,
) -> anyhow::Result<()> {
    let (config, _) = with_timeout(config, timeout_ms);
    let (link, _messages) = open_link(&config)?;
    let command: Message = ConfigurePositionUpdateRate {
        update_rate,
        persist: if persist {
            PersistSetting::SramAndFlash
        } else {
            PersistSetting::Sram
        },
    }
    .into();

    send_acknowledged(&link, &command).await?;
    if !cli.quiet {
        println!("Update rate set to {} Hz", update_rate.hz());
    }
    Ok(())
}

async fn send_acknowledged(link: &Link, command: &Message) -> anyhow::Result<()> {
    let ack = link
        .send_command(command)
        .await
        .with_context(|| format!("sending {}", command.name()))?;
    if !ack.is_ack() {
        return Err(CliError::Rejected {
            command: command.name(),
            ack,
        }
        .into());
    }
    tracing::debug!(command = command.name(), %ack, "Command accepted");
    Ok(())
}

async fn wait_for(messages: &mut MessageReceiver, expected: &'static str, timeout: Duration) -> anyhow::Result<Message> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        match tokio::time::timeout_at(deadline, messages.recv()).await {
            Ok(Some(message)) if message.name() == expected => return Ok(message),
            Ok(Some(message)) => tracing::trace!(message = message.name(), "Skipping unrelated message"),
            Ok(None) => return Err(LinkError::Closed.into()),
            Err(_) => return Err(CliError::NoReply { expected, timeout }.into()),
        }
    }
}

fn decode(cli: &Cli, input: &str) -> anyhow::Result<()> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = hex::decode(compact).map_err(CliError::from)?;

    let registry = Registry::global()?;
    let capacity = bytes.len() / MIN_FRAME_LEN + 1;
    let (mut reassembler, mut messages, acks) =
        Reassembler::channel(registry, capacity, DEFAULT_MAX_BUFFER.max(bytes.len()));
    reassembler.feed(&bytes);

    while let Ok(message) = messages.try_recv() {
        print_message(cli, &message)?;
    }
    if let Some(ack) = *acks.borrow() {
        if !cli.quiet {
            println!("{}", ack);
        }
    }

    let stats = reassembler.stats();
    if !cli.quiet && cli.format == OutputFormat::Text {
        eprintln!(
            "{} frame(s), {} message(s), {} checksum error(s), {} unknown, {} undecodable, {} byte(s) left over",
            stats.frames,
            stats.delivered,
            stats.checksum_errors,
            stats.unknown_types,
            stats.decode_errors,
            reassembler.buffered(),
        );
    }
    Ok(())
}

fn catalog(cli: &Cli) -> anyhow::Result<()> {
    let registry = Registry::global()?;

    if cli.format == OutputFormat::Json {
        let entries: Vec<serde_json::Value> = registry
            .descriptors()
            .iter()
            .map(|d| {
                serde_json::json!({
                    "name": d.name,
                    "outbound_id": d.outbound_id,
                    "outbound_len": d.id(Direction::Outbound).map(|_| d.len(Direction::Outbound)),
                    "inbound_id": d.inbound_id,
                    "inbound_len": d.id(Direction::Inbound).map(|_| d.len(Direction::Inbound)),
                    "item_len": d.array.as_ref().map(|a| a.item_len),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{:<36} {:>9} {:>9} {:>6}", "Message", "Out", "In", "Item");
    println!("{:-<63}", "");
    for descriptor in registry.descriptors() {
        let column = |direction| {
            descriptor
                .id(direction)
                .map_or_else(|| "-".to_string(), |id| format!("{:02X}/{}", id, descriptor.len(direction)))
        };
        let item = descriptor
            .array
            .as_ref()
            .map_or_else(|| "-".to_string(), |array| array.item_len.to_string());
        println!(
            "{:<36} {:>9} {:>9} {:>6}",
            descriptor.name,
            column(Direction::Outbound),
            column(Direction::Inbound),
            item
        );
    }
    Ok(())
}

fn print_message(cli: &Cli, message: &Message) -> anyhow::Result<()> {
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string(message)?),
        OutputFormat::Text => println!("{:?}", message),
    }
    Ok(())
}
