use core::{fmt, net::Ipv4Addr};

/// TCP protocol state of one connection-table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TcpState {
    #[default]
    Closed,
    SynReceived,
    SynSent,
    Established,
    FinWait1,
    FinWait2,
    Closing,
    TimeWait,
    LastAck,
}

impl TcpState {
    /// The conventional upper-case name, e.g. `FIN-WAIT-1`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::SynReceived => "SYN-RCVD",
            Self::SynSent => "SYN-SENT",
            Self::Established => "ESTABLISHED",
            Self::FinWait1 => "FIN-WAIT-1",
            Self::FinWait2 => "FIN-WAIT-2",
            Self::Closing => "CLOSING",
            Self::TimeWait => "TIME-WAIT",
            Self::LastAck => "LAST-ACK",
        }
    }

    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for TcpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of one connection-table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub local_port: u16,
    pub remote_addr: Ipv4Addr,
    pub remote_port: u16,
    pub state: TcpState,
    /// Retransmissions of the current segment.
    pub retransmits: u8,
    /// Retransmission timer, in stack ticks.
    pub timer: u8,
    /// Unacknowledged data is in flight.
    pub outstanding: bool,
    /// The application has paused incoming data.
    pub stopped: bool,
}

impl Connection {
    /// A slot in the `Closed` state.
    pub const CLOSED: Self = Self {
        local_port: 0,
        remote_addr: Ipv4Addr::UNSPECIFIED,
        remote_port: 0,
        state: TcpState::Closed,
        retransmits: 0,
        timer: 0,
        outstanding: false,
        stopped: false,
    };

    pub const fn is_active(&self) -> bool {
        !self.state.is_closed()
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::CLOSED
    }
}

/// The transport's fixed-size connection table.
///
/// Slots are addressed by index so a multi-round script can keep only an
/// integer cursor between rounds and re-read the slot each time it resumes.
pub trait ConnectionSource {
    /// Total number of slots, active or not.
    fn slot_count(&self) -> usize;

    /// The slot at `index`, or `None` past the end of the table.
    fn connection(&self, index: usize) -> Option<Connection>;
}

impl ConnectionSource for [Connection] {
    fn slot_count(&self) -> usize {
        self.len()
    }

    fn connection(&self, index: usize) -> Option<Connection> {
        self.get(index).copied()
    }
}

impl<const N: usize> ConnectionSource for [Connection; N] {
    fn slot_count(&self) -> usize {
        N
    }

    fn connection(&self, index: usize) -> Option<Connection> {
        self.get(index).copied()
    }
}
