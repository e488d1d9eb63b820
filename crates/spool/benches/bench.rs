use core::{hint::black_box, net::Ipv4Addr};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::executor::block_on;
use spool::{
    Connection, ConnectionContext, ConnectionSource, ContentGenerator, DEFAULT_SEGMENT_CAPACITY,
    DispatchTable, FileSource, IoSource, NetStats, Result, Script, ScriptState, Segment,
    StatsSource, TaskSource, TcpRow, TcpState, Transport, TurnFlags,
};

/// A transport that acknowledges everything immediately.
struct Sink {
    bytes: usize,
}

impl Transport for Sink {
    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.bytes += black_box(bytes).len();
        Ok(())
    }

    fn is_alive(&self) -> bool {
        true
    }
}

struct Board {
    connections: [Connection; 16],
}

impl Board {
    fn busy() -> Self {
        let mut connections = [Connection::CLOSED; 16];
        for (i, conn) in connections.iter_mut().enumerate() {
            *conn = Connection {
                local_port: 80,
                remote_addr: Ipv4Addr::new(192, 168, 1, i as u8),
                remote_port: 50_000 + i as u16,
                state: TcpState::Established,
                retransmits: 0,
                timer: 3,
                outstanding: i % 2 == 0,
                stopped: false,
            };
        }
        Self { connections }
    }
}

impl ConnectionSource for Board {
    fn slot_count(&self) -> usize {
        self.connections.len()
    }

    fn connection(&self, index: usize) -> Option<Connection> {
        self.connections.get(index).copied()
    }
}

impl FileSource for Board {
    fn file_size(&self, _name: &str) -> Option<u32> {
        Some(4096)
    }
}

impl TaskSource for Board {
    fn write_task_list(&self, out: &mut Segment<'_>) -> Result<()> {
        out.push_str("IDLE\tR\t0\r\n")
    }

    fn write_status_message(&self, out: &mut Segment<'_>) -> Result<()> {
        out.push_str("OK")
    }

    fn write_run_time_stats(&self, out: &mut Segment<'_>) -> Result<()> {
        out.push_str("IDLE\t100%\r\n")
    }
}

impl IoSource for Board {
    fn led_state(&self) -> bool {
        true
    }

    fn turn_flags(&self) -> TurnFlags {
        TurnFlags::straight()
    }
}

impl StatsSource for Board {
    fn net_stats(&self) -> NetStats {
        NetStats::default()
    }
}

fn bench_lookup(c: &mut Criterion) {
    let table = DispatchTable::builtin();
    let identifiers = [
        "file-stats /index.html",
        "stop-io",
        "no-such-script",
    ];

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(identifiers.len() as u64));
    group.bench_function("lookup", |b| {
        b.iter(|| {
            for identifier in identifiers {
                black_box(table.lookup(black_box(identifier)));
            }
        });
    });
    group.finish();
}

fn bench_tcp_row(c: &mut Criterion) {
    let board = Board::busy();
    let conn = board.connections[0];
    let mut scratch = [0_u8; DEFAULT_SEGMENT_CAPACITY];

    c.bench_function("generator/tcp_row", |b| {
        b.iter(|| {
            let mut out = Segment::new(&mut scratch);
            TcpRow.generate(black_box(&conn), &mut out).unwrap();
            black_box(out.finish());
        });
    });
}

fn bench_scripts(c: &mut Criterion) {
    let board = Board::busy();
    let state = ScriptState::default();
    let mut scratch = [0_u8; DEFAULT_SEGMENT_CAPACITY];

    let mut group = c.benchmark_group("script");
    for script in [Script::TcpConnections, Script::RtosStats, Script::StopIo] {
        group.bench_function(script.name(), |b| {
            b.iter(|| {
                let mut ctx = ConnectionContext::new(Sink { bytes: 0 }, &mut scratch);
                block_on(script.run(&mut ctx, &board, &state, script.name())).unwrap();
                black_box(ctx.into_transport().bytes);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_lookup, bench_tcp_row, bench_scripts);
criterion_main!(benches);
