use crate::{error::Result, generator::ContentGenerator, segment::Segment, source::Connection};

/// `tcp-connections`: one HTML table row describing a connection.
///
/// Columns are local port, remote `address:port`, state name, retransmit
/// count, timer, and two activity markers: `*` when data is outstanding and
/// `!` when the connection is stopped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpRow;

impl ContentGenerator<Connection> for TcpRow {
    fn generate(&self, conn: &Connection, out: &mut Segment<'_>) -> Result<()> {
        out.format(format_args!(
            "<tr><td>{}</td><td>{}:{}</td><td>{}</td><td>{}</td><td>{}</td><td>{} {}</td></tr>\r\n",
            conn.local_port,
            conn.remote_addr,
            conn.remote_port,
            conn.state,
            conn.retransmits,
            conn.timer,
            if conn.outstanding { '*' } else { ' ' },
            if conn.stopped { '!' } else { ' ' },
        ))
    }
}

#[cfg(test)]
mod tests {
    use core::net::Ipv4Addr;

    use super::*;
    use crate::source::TcpState;

    #[test]
    fn formats_row() {
        let conn = Connection {
            local_port: 80,
            remote_addr: Ipv4Addr::new(192, 168, 0, 7),
            remote_port: 51_234,
            state: TcpState::FinWait1,
            retransmits: 2,
            timer: 3,
            outstanding: true,
            stopped: false,
        };
        let mut scratch = [0_u8; 128];
        let mut out = Segment::new(&mut scratch);
        TcpRow.generate(&conn, &mut out).unwrap();

        assert_eq!(
            core::str::from_utf8(out.as_bytes()).unwrap(),
            "<tr><td>80</td><td>192.168.0.7:51234</td><td>FIN-WAIT-1</td>\
             <td>2</td><td>3</td><td>*  </td></tr>\r\n"
        );
    }

    #[test]
    fn stopped_marker() {
        let conn = Connection {
            stopped: true,
            state: TcpState::Established,
            ..Connection::CLOSED
        };
        let mut scratch = [0_u8; 128];
        let mut out = Segment::new(&mut scratch);
        TcpRow.generate(&conn, &mut out).unwrap();
        let row = core::str::from_utf8(out.as_bytes()).unwrap();
        assert!(row.contains("<td>  !</td>"), "{row}");
        assert!(row.contains("0.0.0.0:0"), "{row}");
    }
}
