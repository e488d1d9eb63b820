//! The simulated board behind the built-in scripts.
//!
//! [`Board`] plays every collaborator the scripts read from: the
//! connection table is the server's own registry of live clients, file sizes
//! come from an index of `FILE_ROOT` taken at startup, the task pages
//! describe the connection handlers, and the LED and turn flags are
//! configured values.
//!
//! The server runs on a single thread, so the board is shared through `Rc`
//! and uses `Cell`/`RefCell` for its mutable parts. Nothing here blocks once
//! the board is built.

use crate::server::config::ServerConfig;
use core::{
    cell::{Cell, RefCell},
    net::{IpAddr, Ipv4Addr, SocketAddr},
};
use portable_atomic::{AtomicU16, Ordering};
use spool::{
    Connection, ConnectionSource, ContentGenerator, FileSource, IoSource, LineTo, NetStats,
    Position, RUN_CONTROLS, Result, Segment, StatsSource, TaskSource, TcpRow, TcpState,
    TurnFlags,
};
use std::{
    collections::HashMap,
    path::Path,
    rc::Rc,
    time::Instant,
};

const NO_ERRORS: &str = "No errors";

/// Longest status message kept, in bytes.
pub const STATUS_MAX: usize = 96;

/// Most files indexed under `FILE_ROOT`; the rest report as unknown.
pub const MAX_INDEXED_FILES: usize = 4096;

const REFRESH_TAIL_MAX: usize = "<p><br>Refresh count = 4294967295<p><br>".len();

/// Smallest segment that holds every round the built-in scripts can produce
/// against a board with `slots` connection slots.
///
/// `led-io`, `file-stats` and `net-stats` rounds are all shorter than the
/// run controls and are not listed.
pub fn min_segment_capacity(slots: usize) -> usize {
    let digits = slots.max(1).ilog10() as usize + 1;

    let task_row = "conn\tR\t\r\n".len() + 2 * digits;
    let rtos_page = slots
        .saturating_mul(task_row)
        .saturating_add("accept\tB\t0\r\n".len() + REFRESH_TAIL_MAX + STATUS_MAX);

    // name, u64 milliseconds, percentage
    let run_time_row = "accept".len().max("conn".len() + digits) + 1 + 20 + 1 + 3 + "%\r\n".len();
    let run_time_page = slots
        .saturating_add(1)
        .saturating_mul(run_time_row)
        .saturating_add(REFRESH_TAIL_MAX);

    [
        RUN_CONTROLS.len(),
        widest_tcp_row(),
        LineTo(Position::new(i32::MIN, i32::MIN)).to_string().len(),
        rtos_page,
        run_time_page,
    ]
    .into_iter()
    .max()
    .unwrap_or(RUN_CONTROLS.len())
}

fn widest_tcp_row() -> usize {
    const SCRATCH: usize = 256;
    let widest = Connection {
        local_port: u16::MAX,
        remote_addr: Ipv4Addr::BROADCAST,
        remote_port: u16::MAX,
        state: TcpState::Established,
        retransmits: u8::MAX,
        timer: u8::MAX,
        outstanding: true,
        stopped: true,
    };
    let mut scratch = [0_u8; SCRATCH];
    let mut out = Segment::new(&mut scratch);
    match TcpRow.generate(&widest, &mut out) {
        Ok(()) => out.len(),
        Err(_) => SCRATCH,
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    connection: Connection,
    accepted: Option<Instant>,
}

impl Slot {
    const FREE: Self = Self {
        connection: Connection::CLOSED,
        accepted: None,
    };
}

/// Protocol counters maintained by the accept loop and connection handlers.
#[derive(Debug, Default)]
struct NetCounters {
    ip_recv: AtomicU16,
    ip_sent: AtomicU16,
    tcp_recv: AtomicU16,
    tcp_sent: AtomicU16,
    tcp_rst: AtomicU16,
    tcp_syndrop: AtomicU16,
}

impl NetCounters {
    fn bump(counter: &AtomicU16, by: u16) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    fn snapshot(&self) -> NetStats {
        let mut stats = NetStats::default();
        stats.ip.recv = self.ip_recv.load(Ordering::Relaxed);
        stats.ip.sent = self.ip_sent.load(Ordering::Relaxed);
        stats.tcp.recv = self.tcp_recv.load(Ordering::Relaxed);
        stats.tcp.sent = self.tcp_sent.load(Ordering::Relaxed);
        stats.tcp.rst = self.tcp_rst.load(Ordering::Relaxed);
        stats.tcp.syndrop = self.tcp_syndrop.load(Ordering::Relaxed);
        stats
    }
}

#[derive(Debug)]
pub struct Board {
    slots: RefCell<Vec<Slot>>,
    /// Sizes keyed by path relative to the root, `/`-separated.
    files: HashMap<String, u32>,
    led: Cell<bool>,
    turns: Vec<TurnFlags>,
    next_turn: Cell<usize>,
    status: RefCell<String>,
    started: Instant,
    counters: NetCounters,
}

impl Board {
    /// A board with `slots` free connection slots, the LED off and no turn
    /// readings. Regular files below `file_root` are indexed here, once.
    pub fn new(slots: usize, file_root: impl AsRef<Path>) -> Self {
        Self {
            slots: RefCell::new(vec![Slot::FREE; slots]),
            files: index_files(file_root.as_ref()),
            led: Cell::new(false),
            turns: Vec::new(),
            next_turn: Cell::new(0),
            status: RefCell::new(String::from(NO_ERRORS)),
            started: Instant::now(),
            counters: NetCounters::default(),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.max_connections, &config.file_root)
            .with_led(config.led_on)
            .with_turns(config.turns.clone())
    }

    #[must_use]
    pub fn with_led(self, on: bool) -> Self {
        self.led.set(on);
        self
    }

    /// Readings handed out in order, one per `stop-io` request, wrapping
    /// around at the end.
    #[must_use]
    pub fn with_turns(mut self, turns: Vec<TurnFlags>) -> Self {
        self.turns = turns;
        self
    }

    pub fn indexed_files(&self) -> usize {
        self.files.len()
    }

    /// Replaces the status message, cut to [`STATUS_MAX`] bytes.
    pub fn set_status(&self, message: impl Into<String>) {
        let mut message = message.into();
        if message.len() > STATUS_MAX {
            let mut end = STATUS_MAX;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        *self.status.borrow_mut() = message;
    }

    /// Takes the first free slot for a client connected from `peer`.
    ///
    /// Returns `None` when the table is full; the refusal is counted as a
    /// dropped SYN.
    pub fn register(self: &Rc<Self>, peer: SocketAddr, local_port: u16) -> Option<SlotGuard> {
        let mut slots = self.slots.borrow_mut();
        let Some(index) = slots.iter().position(|s| !s.connection.is_active()) else {
            NetCounters::bump(&self.counters.tcp_syndrop, 1);
            return None;
        };

        slots[index] = Slot {
            connection: Connection {
                local_port,
                remote_addr: ipv4_of(peer.ip()),
                remote_port: peer.port(),
                state: TcpState::Established,
                ..Connection::CLOSED
            },
            accepted: Some(Instant::now()),
        };
        NetCounters::bump(&self.counters.tcp_recv, 1);

        Some(SlotGuard {
            board: Rc::clone(self),
            index,
        })
    }

    /// Number of slots currently held by a client.
    pub fn active_connections(&self) -> usize {
        self.slots
            .borrow()
            .iter()
            .filter(|s| s.connection.is_active())
            .count()
    }

    pub fn record_request(&self) {
        NetCounters::bump(&self.counters.ip_recv, 1);
    }

    /// Counts the non-empty segments of one response.
    pub fn record_sent(&self, segments: usize) {
        let segments = u16::try_from(segments).unwrap_or(u16::MAX);
        NetCounters::bump(&self.counters.ip_sent, segments);
        NetCounters::bump(&self.counters.tcp_sent, segments);
    }

    pub fn record_reset(&self) {
        NetCounters::bump(&self.counters.tcp_rst, 1);
    }

    fn release(&self, index: usize) {
        if let Some(slot) = self.slots.borrow_mut().get_mut(index) {
            *slot = Slot::FREE;
        }
    }

    fn active_slots(&self) -> Vec<(usize, Slot)> {
        self.slots
            .borrow()
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, s)| s.connection.is_active())
            .collect()
    }
}

/// A client's hold on one connection-table slot. Dropping it frees the slot.
#[derive(Debug)]
pub struct SlotGuard {
    board: Rc<Board>,
    index: usize,
}

impl SlotGuard {
    pub const fn index(&self) -> usize {
        self.index
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.board.release(self.index);
    }
}

fn ipv4_of(ip: IpAddr) -> Ipv4Addr {
    match ip {
        IpAddr::V4(v4) => v4,
        IpAddr::V6(v6) => v6.to_ipv4_mapped().unwrap_or(Ipv4Addr::UNSPECIFIED),
    }
}

/// Walks `root` and records the size of every regular file below it.
///
/// Symbolic links are not followed, so nothing outside the root is indexed.
fn index_files(root: &Path) -> HashMap<String, u32> {
    let mut files = HashMap::new();
    let mut pending = vec![(root.to_path_buf(), String::new())];

    while let Some((dir, prefix)) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("cannot index {}: {e}", dir.display());
                continue;
            }
        };

        for entry in entries.flatten() {
            let Ok(kind) = entry.file_type() else {
                continue;
            };
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            let key = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };

            if kind.is_dir() {
                pending.push((entry.path(), key));
            } else if kind.is_file() {
                if files.len() == MAX_INDEXED_FILES {
                    tracing::warn!(
                        "stopped indexing {} after {MAX_INDEXED_FILES} files",
                        root.display()
                    );
                    return files;
                }
                let size = entry
                    .metadata()
                    .map_or(0, |meta| u32::try_from(meta.len()).unwrap_or(u32::MAX));
                files.insert(key, size);
            }
        }
    }

    tracing::debug!("indexed {} file(s) under {}", files.len(), root.display());
    files
}

impl ConnectionSource for Board {
    fn slot_count(&self) -> usize {
        self.slots.borrow().len()
    }

    fn connection(&self, index: usize) -> Option<Connection> {
        self.slots.borrow().get(index).map(|s| s.connection)
    }
}

impl FileSource for Board {
    fn file_size(&self, name: &str) -> Option<u32> {
        let name = name.strip_prefix('/').unwrap_or(name);
        self.files.get(name).copied()
    }
}

// Snapshots are written a line at a time and stop at the first line that no
// longer fits, so a full table truncates instead of failing the round.
impl TaskSource for Board {
    fn write_task_list(&self, out: &mut Segment<'_>) -> Result<()> {
        if out.push_str("accept\tB\t0\r\n").is_err() {
            return Ok(());
        }
        for (index, _) in self.active_slots() {
            if out
                .format(format_args!("conn{index}\tR\t{}\r\n", index + 1))
                .is_err()
            {
                break;
            }
        }
        Ok(())
    }

    fn write_status_message(&self, out: &mut Segment<'_>) -> Result<()> {
        out.push_str(&self.status.borrow())
    }

    fn write_run_time_stats(&self, out: &mut Segment<'_>) -> Result<()> {
        let uptime = self.started.elapsed().as_millis().max(1);
        let millis = |ms: u128| u64::try_from(ms).unwrap_or(u64::MAX);

        if out
            .format(format_args!("accept\t{}\t100%\r\n", millis(uptime)))
            .is_err()
        {
            return Ok(());
        }
        for (index, slot) in self.active_slots() {
            let busy = slot.accepted.map_or(0, |at| at.elapsed().as_millis());
            let share = (busy * 100 / uptime).min(100);
            if out
                .format(format_args!("conn{index}\t{}\t{share}%\r\n", millis(busy)))
                .is_err()
            {
                break;
            }
        }
        Ok(())
    }
}

impl IoSource for Board {
    fn led_state(&self) -> bool {
        self.led.get()
    }

    fn turn_flags(&self) -> TurnFlags {
        if self.turns.is_empty() {
            return TurnFlags::NONE;
        }
        let next = self.next_turn.get();
        self.next_turn.set((next + 1) % self.turns.len());
        self.turns[next]
    }
}

impl StatsSource for Board {
    fn net_stats(&self) -> NetStats {
        self.counters.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(last: u8, port: u16) -> SocketAddr {
        SocketAddr::from(([192, 168, 0, last], port))
    }

    #[test]
    fn registry_fills_first_free_slot() {
        let board = Rc::new(Board::new(2, "."));

        let a = board.register(peer(1, 4000), 8080).unwrap();
        let b = board.register(peer(2, 4001), 8080).unwrap();
        assert_eq!((a.index(), b.index()), (0, 1));
        assert!(board.register(peer(3, 4002), 8080).is_none());
        assert_eq!(board.net_stats().tcp.syndrop, 1);

        drop(a);
        assert_eq!(board.connection(0), Some(Connection::CLOSED));
        assert_eq!(board.active_connections(), 1);

        let c = board.register(peer(3, 4002), 8080).unwrap();
        assert_eq!(c.index(), 0);
        let conn = board.connection(0).unwrap();
        assert_eq!(conn.remote_addr, Ipv4Addr::new(192, 168, 0, 3));
        assert_eq!(conn.remote_port, 4002);
        assert_eq!(conn.local_port, 8080);
        assert_eq!(conn.state, TcpState::Established);
    }

    #[test]
    fn turn_readings_cycle() {
        let board = Board::new(1, ".").with_turns(vec![TurnFlags::left(), TurnFlags::NONE]);
        assert_eq!(board.turn_flags(), TurnFlags::left());
        assert_eq!(board.turn_flags(), TurnFlags::NONE);
        assert_eq!(board.turn_flags(), TurnFlags::left());

        assert_eq!(Board::new(1, ".").turn_flags(), TurnFlags::NONE);
    }

    #[test]
    fn file_sizes_stay_under_root() {
        let root = std::env::temp_dir().join(format!("spool-board-{}", std::process::id()));
        std::fs::create_dir_all(root.join("img")).unwrap();
        std::fs::write(root.join("index.html"), b"<html></html>").unwrap();
        std::fs::write(root.join("img/logo.png"), [0_u8; 300]).unwrap();

        let board = Board::new(1, &root);
        assert_eq!(board.file_size("/index.html"), Some(13));
        assert_eq!(board.file_size("img/logo.png"), Some(300));
        assert_eq!(board.file_size("/missing.html"), None);
        assert_eq!(board.file_size("/img"), None);
        assert_eq!(board.file_size("/../index.html"), None);
        assert_eq!(board.file_size(""), None);
        assert_eq!(board.indexed_files(), 2);

        // The index is taken once; later files are unknown.
        std::fs::write(root.join("late.html"), b"late").unwrap();
        assert_eq!(board.file_size("/late.html"), None);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn task_list_describes_live_handlers() {
        let board = Rc::new(Board::new(3, "."));
        let _guard = board.register(peer(9, 5000), 80).unwrap();

        let mut scratch = [0_u8; 256];
        let mut out = Segment::new(&mut scratch);
        board.write_task_list(&mut out).unwrap();
        assert_eq!(out.as_bytes(), b"accept\tB\t0\r\nconn0\tR\t1\r\n");

        let mut scratch = [0_u8; 4];
        let mut out = Segment::new(&mut scratch);
        board.write_task_list(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn task_rows_stop_at_segment_end() {
        let board = Rc::new(Board::new(3, "."));
        let _guards: Vec<_> = (1..=3)
            .map(|i| board.register(peer(i, 5000), 80).unwrap())
            .collect();

        // Room for the accept line and one row, not two.
        let mut scratch = [0_u8; 30];
        let mut out = Segment::new(&mut scratch);
        board.write_task_list(&mut out).unwrap();
        assert_eq!(out.as_bytes(), b"accept\tB\t0\r\nconn0\tR\t1\r\n");

        let mut scratch = [0_u8; 40];
        let mut out = Segment::new(&mut scratch);
        board.write_run_time_stats(&mut out).unwrap();
        let text = core::str::from_utf8(out.as_bytes()).unwrap();
        assert!(text.starts_with("accept\t"));
        assert!(text.ends_with("\r\n"));
    }

    #[test]
    fn minimum_capacity_covers_fixed_markup() {
        assert!(min_segment_capacity(1) >= RUN_CONTROLS.len());
        assert!(min_segment_capacity(8) <= spool::DEFAULT_SEGMENT_CAPACITY);
        assert!(min_segment_capacity(200) > spool::DEFAULT_SEGMENT_CAPACITY);
        assert!(min_segment_capacity(200) > min_segment_capacity(8));
    }

    #[test]
    fn full_table_task_pages_fit_minimum_capacity() {
        use spool::{RefreshCounter, RtosStats, RunTimeStats};

        const SLOTS: usize = 130;
        let board = Rc::new(Board::new(SLOTS, "."));
        let _guards: Vec<_> = (0..SLOTS)
            .map(|i| board.register(peer(1, 1000 + i as u16), 80).unwrap())
            .collect();
        board.set_status("x".repeat(STATUS_MAX * 2));

        let refresh = RefreshCounter::new();
        let mut scratch = vec![0_u8; min_segment_capacity(SLOTS)];

        let mut out = Segment::new(&mut scratch);
        RtosStats::new(&*board, &refresh)
            .generate(&(), &mut out)
            .unwrap();
        let page = core::str::from_utf8(out.as_bytes()).unwrap();
        assert!(page.contains(&format!("conn{}\tR\t{SLOTS}\r\n", SLOTS - 1)));

        let mut out = Segment::new(&mut scratch);
        RunTimeStats::new(&*board, &refresh)
            .generate(&(), &mut out)
            .unwrap();
        let page = core::str::from_utf8(out.as_bytes()).unwrap();
        assert!(page.contains(&format!("conn{}\t", SLOTS - 1)));
    }

    #[test]
    fn status_message_is_capped() {
        let board = Board::new(1, ".");
        board.set_status("é".repeat(STATUS_MAX));

        let mut scratch = [0_u8; 2 * STATUS_MAX];
        let mut out = Segment::new(&mut scratch);
        board.write_status_message(&mut out).unwrap();
        assert!(out.len() <= STATUS_MAX);
        assert!(core::str::from_utf8(out.as_bytes()).is_ok());
    }

    #[test]
    fn status_message_defaults_to_no_errors() {
        let board = Board::new(1, ".");
        let mut scratch = [0_u8; 64];
        let mut out = Segment::new(&mut scratch);
        board.write_status_message(&mut out).unwrap();
        assert_eq!(out.as_bytes(), b"No errors");

        board.set_status("last request: stream error");
        let mut out = Segment::new(&mut scratch);
        board.write_status_message(&mut out).unwrap();
        assert_eq!(out.as_bytes(), b"last request: stream error");
    }

    #[test]
    fn counters_feed_net_stats() {
        let board = Board::new(1, ".");
        board.record_request();
        board.record_sent(3);
        board.record_reset();

        let stats = board.net_stats();
        assert_eq!(stats.ip.recv, 1);
        assert_eq!(stats.ip.sent, 3);
        assert_eq!(stats.tcp.sent, 3);
        assert_eq!(stats.tcp.rst, 1);
        assert_eq!(stats.ip.drop, 0);
    }
}
