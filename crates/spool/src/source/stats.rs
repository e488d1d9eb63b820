/// Protocol counters kept by the network stack.
///
/// Field order is the order in which `net-stats` prints them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetStats {
    pub ip: IpStats,
    pub icmp: IcmpStats,
    pub tcp: TcpStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IpStats {
    pub drop: u16,
    pub recv: u16,
    pub sent: u16,
    /// Wrong IP version or header length.
    pub vhlerr: u16,
    /// Wrong IP length, high byte.
    pub hblenerr: u16,
    /// Wrong IP length, low byte.
    pub lblenerr: u16,
    pub fragerr: u16,
    pub chkerr: u16,
    /// Neither TCP, UDP nor ICMP.
    pub protoerr: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IcmpStats {
    pub drop: u16,
    pub recv: u16,
    pub sent: u16,
    pub typeerr: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TcpStats {
    pub drop: u16,
    pub recv: u16,
    pub sent: u16,
    pub chkerr: u16,
    pub ackerr: u16,
    pub rst: u16,
    pub rexmit: u16,
    /// SYNs dropped for lack of a free connection slot.
    pub syndrop: u16,
    /// SYNs for closed ports, answered with RST.
    pub synrst: u16,
}

impl NetStats {
    /// Number of counters, and therefore of `net-stats` rounds.
    pub const COUNTERS: usize = 22;

    /// The counter at `index` in print order.
    pub const fn counter(&self, index: usize) -> Option<u16> {
        let value = match index {
            0 => self.ip.drop,
            1 => self.ip.recv,
            2 => self.ip.sent,
            3 => self.ip.vhlerr,
            4 => self.ip.hblenerr,
            5 => self.ip.lblenerr,
            6 => self.ip.fragerr,
            7 => self.ip.chkerr,
            8 => self.ip.protoerr,
            9 => self.icmp.drop,
            10 => self.icmp.recv,
            11 => self.icmp.sent,
            12 => self.icmp.typeerr,
            13 => self.tcp.drop,
            14 => self.tcp.recv,
            15 => self.tcp.sent,
            16 => self.tcp.chkerr,
            17 => self.tcp.ackerr,
            18 => self.tcp.rst,
            19 => self.tcp.rexmit,
            20 => self.tcp.syndrop,
            21 => self.tcp.synrst,
            _ => return None,
        };
        Some(value)
    }
}

/// Source of the stack's protocol counters.
pub trait StatsSource {
    /// A fresh snapshot of every counter.
    fn net_stats(&self) -> NetStats;
}
