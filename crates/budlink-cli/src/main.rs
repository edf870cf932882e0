//! budlink - query and configure wireless earbuds from the command line.

mod error;
mod report;
mod transport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use budlink_protocol::{encode_frame, Command, Namespace, ProtocolError, Registry, Session};

use crate::error::CliError;
use crate::transport::SerialTransport;

#[derive(Parser)]
#[command(name = "budlink", version, about = "Status and configuration tool for wireless earbuds")]
struct Cli {
    /// Serial device bound to the case's RFCOMM channel.
    #[arg(short, long, default_value = "/dev/rfcomm0")]
    device: String,

    /// Baud rate for the serial device.
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Overall read deadline, in milliseconds.
    #[arg(long, default_value_t = 2_000)]
    timeout_ms: u64,

    /// Stop reading once the channel has been idle this long, in
    /// milliseconds.
    #[arg(long, default_value_t = 350)]
    quiet_ms: u64,

    /// Print reports as JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Query the current device status (the default).
    Status,

    /// Change a setting, then report the device's updated status.
    Set {
        #[command(subcommand)]
        setting: Setting,
    },

    /// Encode and send a raw message by symbolic name, arguments as hex.
    Send {
        /// Message name, e.g. LOCK_TOUCHPAD.
        name: String,
        /// Argument bytes as hex, e.g. "01" or "01 03".
        args: Option<String>,
    },

    /// Keep reading and reporting status updates until interrupted.
    Watch,
}

#[derive(Subcommand)]
enum Setting {
    /// Equalizer preset by name (off, bass-boost, soft, dynamic, clear,
    /// treble-boost).
    Equalizer {
        /// Preset name.
        mode: String,
    },
    /// Ambient sound passthrough (on/off).
    Ambient {
        /// on or off.
        state: String,
    },
    /// Ambient sound volume (0-3).
    AmbientVolume {
        /// Volume step.
        level: u8,
    },
    /// Touchpad lock (on/off).
    TouchpadLock {
        /// on or off.
        state: String,
    },
    /// Touch-and-hold action per earbud, by name (none, voice-command,
    /// ambient-sound, volume, spotify).
    TouchpadOption {
        /// Action for the left earbud.
        left: String,
        /// Action for the right earbud.
        right: String,
    },
    /// Sidetone during calls (on/off).
    Sidetone {
        /// on or off.
        state: String,
    },
    /// Find-my-earbuds chirp (start/stop).
    Find {
        /// start or stop.
        state: String,
    },
}

impl Setting {
    fn into_command(self, registry: &Registry) -> Result<Command, CliError> {
        Ok(match self {
            Setting::Equalizer { mode } => Command::SetEqualizer {
                mode: resolve_code(registry, Namespace::EqualizerMode, &mode)?,
            },
            Setting::Ambient { state } => Command::SetAmbientMode {
                enabled: parse_switch(&state)?,
            },
            Setting::AmbientVolume { level } => {
                if level > 3 {
                    return Err(CliError::InvalidArgument(format!(
                        "ambient volume must be 0-3, got {level}"
                    )));
                }
                Command::SetAmbientVolume { level }
            }
            Setting::TouchpadLock { state } => Command::LockTouchpad {
                enabled: parse_switch(&state)?,
            },
            Setting::TouchpadOption { left, right } => Command::SetTouchpadOption {
                left: resolve_code(registry, Namespace::TouchpadOption, &left)?,
                right: resolve_code(registry, Namespace::TouchpadOption, &right)?,
            },
            Setting::Sidetone { state } => Command::SetSideTone {
                enabled: parse_switch(&state)?,
            },
            Setting::Find { state } => match state.as_str() {
                "start" => Command::FindMyEarbudsStart,
                "stop" => Command::FindMyEarbudsStop,
                other => {
                    return Err(CliError::InvalidArgument(format!(
                        "expected start or stop, got {other}"
                    )))
                }
            },
        })
    }
}

fn resolve_code(registry: &Registry, namespace: Namespace, name: &str) -> Result<u8, CliError> {
    registry
        .resolve_code(namespace, name)
        .map(|code| code as u8)
        .ok_or_else(|| CliError::InvalidArgument(format!("unknown name: {name}")))
}

fn parse_switch(state: &str) -> Result<bool, CliError> {
    match state {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(CliError::InvalidArgument(format!(
            "expected on or off, got {other}"
        ))),
    }
}

fn parse_hex_args(args: Option<&str>) -> Result<Vec<u8>, CliError> {
    let Some(args) = args else {
        return Ok(Vec::new());
    };
    let cleaned: String = args.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(&cleaned).map_err(|e| CliError::InvalidArgument(format!("bad hex arguments: {e}")))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let registry = Registry::new();
    let mut transport = SerialTransport::open(&cli.device, cli.baud)?;
    let quiet = Duration::from_millis(cli.quiet_ms);
    let deadline = Duration::from_millis(cli.timeout_ms);

    match cli.command.unwrap_or(Cmd::Status) {
        Cmd::Status => {
            transport.send(&Command::ManagerInfo.encode(&registry)?)?;
            transport.send(&Command::VersionInfo.encode(&registry)?)?;
            let session = drain(&mut transport, registry, quiet, deadline)?;
            report::print(session.status(), session.stats(), cli.json);
        }

        Cmd::Set { setting } => {
            let command = setting.into_command(&registry)?;
            tracing::info!("sending {}", command.name());
            transport.send(&command.encode(&registry)?)?;
            let session = drain(&mut transport, registry, quiet, deadline)?;
            report::print(session.status(), session.stats(), cli.json);
        }

        Cmd::Send { name, args } => {
            let args = parse_hex_args(args.as_deref())?;
            transport.send(&encode_frame(&registry, &name, &args)?)?;
            let session = drain(&mut transport, registry, quiet, deadline)?;
            report::print(session.status(), session.stats(), cli.json);
        }

        Cmd::Watch => {
            let running = Arc::new(AtomicBool::new(true));
            let flag = running.clone();
            ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

            transport.send(&Command::ManagerInfo.encode(&registry)?)?;
            let mut session = Session::new(registry);

            while running.load(Ordering::SeqCst) {
                let data = transport.receive_all(quiet, deadline)?;
                if data.is_empty() {
                    continue;
                }
                log_feed_errors(&session.feed(&data));
                report::print(session.status(), session.stats(), cli.json);
            }
        }
    }

    Ok(())
}

/// Read until the channel goes quiet and decode everything received.
fn drain(
    transport: &mut SerialTransport,
    registry: Registry,
    quiet: Duration,
    deadline: Duration,
) -> Result<Session, CliError> {
    let data = transport.receive_all(quiet, deadline)?;
    let mut session = Session::new(registry);
    log_feed_errors(&session.feed(&data));
    Ok(session)
}

fn log_feed_errors(errors: &[ProtocolError]) {
    for error in errors {
        tracing::warn!("{error}");
    }
}
