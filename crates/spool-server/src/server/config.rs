use crate::server::board::min_segment_capacity;
use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use spool::{DEFAULT_SEGMENT_CAPACITY, Position, TurnConflict, TurnFlags};
use std::{path::PathBuf, time::Duration};

/// Upper bound for `MAX_IDENTIFIER_LEN`.
pub const IDENTIFIER_LEN_LIMIT: usize = 4096;

/// Runtime configuration for the `spool-server` binary.
///
/// Every value can be given on the command line or through the environment
/// (a `.env` file in the working directory is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "spool-server",
    version,
    about = "Streams spool scripts to TCP clients one acknowledged segment at a time"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Size in bytes of the shared send buffer, and so the largest segment a
    /// single round may produce. Must hold the largest round the built-in
    /// scripts can produce for `MAX_CONNECTIONS` slots.
    ///
    /// Environment variable: `SEGMENT_CAPACITY`
    #[arg(long, env = "SEGMENT_CAPACITY", default_value_t = DEFAULT_SEGMENT_CAPACITY)]
    pub segment_capacity: usize,

    /// Longest request identifier accepted, excluding the line terminator.
    /// At most 4096.
    ///
    /// Environment variable: `MAX_IDENTIFIER_LEN`
    #[arg(long, env = "MAX_IDENTIFIER_LEN", default_value_t = 128)]
    pub max_identifier_len: usize,

    /// Number of connection-table slots. Clients arriving while every slot
    /// is taken are refused.
    ///
    /// Environment variable: `MAX_CONNECTIONS`
    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 8)]
    pub max_connections: usize,

    /// Directory that `file-stats` resolves names against.
    ///
    /// Environment variable: `FILE_ROOT`
    #[arg(long, env = "FILE_ROOT", default_value = ".")]
    pub file_root: PathBuf,

    /// Initial state of the simulated user LED.
    ///
    /// Environment variable: `LED_ON`
    #[arg(long, env = "LED_ON", default_value_t = false)]
    pub led_on: bool,

    /// Comma-separated cycle of line-follower readings fed to `stop-io`.
    ///
    /// Each reading is `-` (no flag) or any combination of `S`, `L` and `R`.
    ///
    /// Environment variable: `TURNS`
    #[arg(long, env = "TURNS", default_value = "S,L,S,L,S,L,S,L")]
    pub turns: String,

    /// What `stop-io` does when more than one turn flag is raised.
    ///
    /// Environment variable: `TURN_CONFLICT`
    #[arg(long, env = "TURN_CONFLICT", value_enum, default_value_t = ConflictArg::Reject)]
    pub turn_conflict: ConflictArg,

    /// Horizontal start of the traced path.
    ///
    /// Environment variable: `ORIGIN_X`
    #[arg(long, env = "ORIGIN_X", default_value_t = 10, allow_negative_numbers = true)]
    pub origin_x: i32,

    /// Vertical start of the traced path.
    ///
    /// Environment variable: `ORIGIN_Y`
    #[arg(long, env = "ORIGIN_Y", default_value_t = 350, allow_negative_numbers = true)]
    pub origin_y: i32,

    /// Seconds to wait for in-flight responses after a shutdown signal.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 5)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConflictArg {
    /// Several raised flags count as no command.
    Reject,
    /// Straight beats left beats right.
    Ordered,
}

impl From<ConflictArg> for TurnConflict {
    fn from(arg: ConflictArg) -> Self {
        match arg {
            ConflictArg::Reject => Self::Reject,
            ConflictArg::Ordered => Self::Ordered,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub segment_capacity: usize,
    pub max_identifier_len: usize,
    pub max_connections: usize,
    pub file_root: PathBuf,
    pub led_on: bool,
    pub turns: Vec<TurnFlags>,
    pub turn_conflict: TurnConflict,
    pub origin: Position,
    pub shutdown_timeout: Duration,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if !(1..=usize::from(u16::MAX)).contains(&args.segment_capacity) {
            bail!(
                "SEGMENT_CAPACITY ({}) must be between 1 and {}",
                args.segment_capacity,
                u16::MAX
            );
        }

        if !(1..=IDENTIFIER_LEN_LIMIT).contains(&args.max_identifier_len) {
            bail!(
                "MAX_IDENTIFIER_LEN ({}) must be between 1 and {IDENTIFIER_LEN_LIMIT}",
                args.max_identifier_len
            );
        }

        if args.max_connections == 0 {
            bail!("MAX_CONNECTIONS must be greater than 0");
        }

        let required = min_segment_capacity(args.max_connections);
        if args.segment_capacity < required {
            bail!(
                "SEGMENT_CAPACITY ({}) is too small for {} connection slots (need at least {required})",
                args.segment_capacity,
                args.max_connections
            );
        }

        let turns = parse_turns(&args.turns).context("invalid TURNS")?;

        Ok(Self {
            server_addr: args.server_addr,
            segment_capacity: args.segment_capacity,
            max_identifier_len: args.max_identifier_len,
            max_connections: args.max_connections,
            file_root: args.file_root,
            led_on: args.led_on,
            turns,
            turn_conflict: args.turn_conflict.into(),
            origin: Position::new(args.origin_x, args.origin_y),
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
        })
    }
}

/// Parses a `TURNS` cycle such as `S,L,-,SR`.
///
/// An empty string yields an empty cycle, which reads as no flag forever.
pub fn parse_turns(raw: &str) -> anyhow::Result<Vec<TurnFlags>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    raw.split(',').map(|token| parse_reading(token.trim())).collect()
}

fn parse_reading(token: &str) -> anyhow::Result<TurnFlags> {
    if token == "-" {
        return Ok(TurnFlags::NONE);
    }
    if token.is_empty() {
        bail!("empty reading");
    }

    let mut flags = TurnFlags::NONE;
    for c in token.chars() {
        match c.to_ascii_uppercase() {
            'S' => flags.straight = true,
            'L' => flags.left = true,
            'R' => flags.right = true,
            other => bail!("unknown flag `{other}` in reading `{token}`"),
        }
    }
    Ok(flags)
}
