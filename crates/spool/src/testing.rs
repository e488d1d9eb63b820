//! In-memory collaborators shared by the unit tests.

use core::{
    cell::{Cell, RefCell},
    future::{Future, poll_fn},
    pin::pin,
    task::{Context, Poll},
};

use futures::task::noop_waker_ref;

use crate::{
    Connection, ConnectionSource, Error, FileSource, IoSource, NetStats, Result, Segment,
    StatsSource, TaskSource, Transport, TurnFlags,
};

/// The far side of a [`MockTransport`].
///
/// Records every segment handed to it. With `auto_ack` set, segments are
/// acknowledged immediately; otherwise each one stays pending until
/// [`Wire::ack`] is called.
pub struct Wire {
    sent: RefCell<Vec<Vec<u8>>>,
    acked: Cell<usize>,
    auto_ack: bool,
    alive: Cell<bool>,
}

impl Wire {
    pub fn auto_ack() -> Self {
        Self::new(true)
    }

    pub fn gated() -> Self {
        Self::new(false)
    }

    fn new(auto_ack: bool) -> Self {
        Self {
            sent: RefCell::new(Vec::new()),
            acked: Cell::new(0),
            auto_ack,
            alive: Cell::new(true),
        }
    }

    pub fn transport(&self) -> MockTransport<'_> {
        MockTransport { wire: self }
    }

    /// Acknowledges the oldest outstanding segment.
    pub fn ack(&self) {
        self.acked.set(self.acked.get() + 1);
    }

    pub fn drop_connection(&self) {
        self.alive.set(false);
    }

    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.sent.borrow().clone()
    }

    pub fn chunk_count(&self) -> usize {
        self.sent.borrow().len()
    }

    pub fn text(&self) -> String {
        let bytes: Vec<u8> = self.sent.borrow().concat();
        String::from_utf8(bytes).unwrap()
    }

    pub fn chunk_text(&self, index: usize) -> String {
        String::from_utf8(self.sent.borrow()[index].clone()).unwrap()
    }
}

pub struct MockTransport<'w> {
    wire: &'w Wire,
}

impl Transport for MockTransport<'_> {
    fn send(&mut self, bytes: &[u8]) -> impl Future<Output = Result<()>> {
        let wire = self.wire;
        let index = {
            let mut sent = wire.sent.borrow_mut();
            sent.push(bytes.to_vec());
            sent.len() - 1
        };

        poll_fn(move |_cx| {
            if !wire.alive.get() {
                Poll::Ready(Err(Error::ConnectionLost))
            } else if wire.auto_ack || wire.acked.get() > index {
                Poll::Ready(Ok(()))
            } else {
                Poll::Pending
            }
        })
    }

    fn is_alive(&self) -> bool {
        self.wire.alive.get()
    }
}

/// Polls `fut` once with a waker that does nothing.
pub fn poll_once<F: Future>(fut: core::pin::Pin<&mut F>) -> Poll<F::Output> {
    let mut cx = Context::from_waker(noop_waker_ref());
    fut.poll(&mut cx)
}

/// Runs `fut` to completion against an auto-acknowledging wire.
pub fn run_ready<F: Future>(fut: F) -> F::Output {
    let mut fut = pin!(fut);
    match poll_once(fut.as_mut()) {
        Poll::Ready(out) => out,
        Poll::Pending => panic!("future suspended on an auto-acknowledging wire"),
    }
}

/// A board with every external source backed by plain fields.
pub struct MockBoard {
    pub connections: RefCell<Vec<Connection>>,
    pub led: Cell<bool>,
    pub flags: Cell<TurnFlags>,
    pub stats: Cell<NetStats>,
    pub task_list: &'static str,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            connections: RefCell::new(vec![Connection::CLOSED; 4]),
            led: Cell::new(false),
            flags: Cell::new(TurnFlags::NONE),
            stats: Cell::new(NetStats::default()),
            task_list: "Tmr Svc\tB\t2\r\nIDLE\tR\t0\r\n",
        }
    }

    pub fn set_connection(&self, slot: usize, conn: Connection) {
        self.connections.borrow_mut()[slot] = conn;
    }
}

impl ConnectionSource for MockBoard {
    fn slot_count(&self) -> usize {
        self.connections.borrow().len()
    }

    fn connection(&self, index: usize) -> Option<Connection> {
        self.connections.borrow().get(index).copied()
    }
}

impl FileSource for MockBoard {
    fn file_size(&self, name: &str) -> Option<u32> {
        match name {
            "/index.html" => Some(1_834),
            "/tcp.shtml" => Some(211),
            _ => None,
        }
    }
}

impl TaskSource for MockBoard {
    fn write_task_list(&self, out: &mut Segment<'_>) -> Result<()> {
        out.push_str(self.task_list)
    }

    fn write_status_message(&self, out: &mut Segment<'_>) -> Result<()> {
        out.push_str("No errors")
    }

    fn write_run_time_stats(&self, out: &mut Segment<'_>) -> Result<()> {
        out.push_str("IDLE\t1200\t97%\r\n")
    }
}

impl IoSource for MockBoard {
    fn led_state(&self) -> bool {
        self.led.get()
    }

    fn turn_flags(&self) -> TurnFlags {
        self.flags.get()
    }
}

impl StatsSource for MockBoard {
    fn net_stats(&self) -> NetStats {
        self.stats.get()
    }
}
