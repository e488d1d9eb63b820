use core::fmt;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[cfg(feature = "statistics")]
use crate::generator::NetStatLine;
#[cfg(feature = "statistics")]
use crate::source::NetStats;
use crate::{
    driver::ConnectionContext,
    error::Result,
    generator::{
        FileStats, LedIo, RefreshCounter, RtosStats, RunTimeStats, StopIo, TcpRow, TestIo,
        file_argument,
    },
    path::PathTracker,
    source::{Connection, Environment},
    transport::Transport,
};

/// A request handler that can be registered in a [`DispatchTable`].
///
/// Each variant drives one or more rounds of a content generator through a
/// [`ConnectionContext`] until its output is complete.
///
/// [`DispatchTable`]: crate::DispatchTable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    /// Completes the response without sending anything.
    Null,
    FileStats,
    TcpConnections,
    /// Streams nothing unless the `statistics` feature is enabled.
    NetStats,
    RtosStats,
    RunTime,
    LedIo,
    TestIo,
    StopIo,
}

impl Script {
    /// Every registered script, in registration order.
    pub const REGISTERED: [Self; 8] = [
        Self::FileStats,
        Self::TcpConnections,
        Self::NetStats,
        Self::RtosStats,
        Self::RunTime,
        Self::LedIo,
        Self::TestIo,
        Self::StopIo,
    ];

    /// The name the script is registered under.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "",
            Self::FileStats => "file-stats",
            Self::TcpConnections => "tcp-connections",
            Self::NetStats => "net-stats",
            Self::RtosStats => "rtos-stats",
            Self::RunTime => "run-time",
            Self::LedIo => "led-io",
            Self::TestIo => "test-io",
            Self::StopIo => "stop-io",
        }
    }

    /// Streams the script's response for `identifier` into `ctx`.
    ///
    /// Single-round scripts run their generator once. `tcp-connections` and
    /// `net-stats` own their loop and run one round per element, using
    /// `ctx.cursor` as the index they resume from after each
    /// acknowledgment.
    ///
    /// # Errors
    ///
    /// Propagates the first round error; the remaining rounds are abandoned.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(ctx, env, state), fields(script = self.name()))
    )]
    pub async fn run<T, E>(
        self,
        ctx: &mut ConnectionContext<'_, T>,
        env: &E,
        state: &ScriptState,
        identifier: &str,
    ) -> Result<()>
    where
        T: Transport,
        E: Environment + ?Sized,
    {
        match self {
            Self::Null => {}
            Self::FileStats => {
                ctx.generator_send(&FileStats::new(env), file_argument(identifier))
                    .await?;
            }
            Self::TcpConnections => {
                ctx.cursor = 0;
                while ctx.cursor < env.slot_count() {
                    if let Some(conn) = env.connection(ctx.cursor).filter(Connection::is_active) {
                        ctx.generator_send(&TcpRow, &conn).await?;
                    }
                    ctx.cursor += 1;
                }
            }
            Self::NetStats => {
                #[cfg(feature = "statistics")]
                {
                    ctx.cursor = 0;
                    while ctx.cursor < NetStats::COUNTERS {
                        if let Some(value) = env.net_stats().counter(ctx.cursor) {
                            ctx.generator_send(&NetStatLine, &value).await?;
                        }
                        ctx.cursor += 1;
                    }
                }
            }
            Self::RtosStats => {
                ctx.generator_send(&RtosStats::new(env, &state.refresh), &())
                    .await?;
            }
            Self::RunTime => {
                ctx.generator_send(&RunTimeStats::new(env, &state.refresh), &())
                    .await?;
            }
            Self::LedIo => {
                ctx.generator_send(&LedIo::new(env), &()).await?;
            }
            Self::TestIo => {
                ctx.generator_send(&TestIo::new(env), &()).await?;
            }
            Self::StopIo => {
                ctx.generator_send(&StopIo::new(env, &state.path), &())
                    .await?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("(null)"),
            other => f.write_str(other.name()),
        }
    }
}

/// State the scripts keep for the lifetime of the process.
///
/// One instance is shared by every connection: the refresh counter behind
/// the task pages and the path traced by `stop-io`.
#[derive(Debug, Default)]
pub struct ScriptState {
    refresh: RefreshCounter,
    path: PathTracker,
}

impl ScriptState {
    pub const fn new(path: PathTracker) -> Self {
        Self {
            refresh: RefreshCounter::new(),
            path,
        }
    }

    pub const fn refresh(&self) -> &RefreshCounter {
        &self.refresh
    }

    pub const fn path(&self) -> &PathTracker {
        &self.path
    }
}
