//! Windows: `netstat -ano`.

use super::{port_of, run_utility, ListeningSocket};
use crate::{port::Protocol, Result};

pub(super) async fn find_sockets(port: u16, protocol: Protocol) -> Result<Vec<ListeningSocket>> {
    let sockets = list_sockets(protocol).await?;
    Ok(sockets.into_iter().filter(|s| s.port == port).collect())
}

/// `-p TCP` would drop the IPv6 rows, so the protocol is filtered while parsing.
pub(super) async fn list_sockets(protocol: Protocol) -> Result<Vec<ListeningSocket>> {
    let output = run_utility("netstat", &["-ano"]).await?;
    Ok(parse_netstat_output(&output, protocol))
}

/// Parses `netstat -ano` output.
///
/// ```text
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1044
///   UDP    0.0.0.0:500            *:*                                    4321
/// ```
///
/// TCP rows are kept only in the `LISTENING` state; UDP rows carry no state.
/// The PID is always the last column.
pub fn parse_netstat_output(output: &str, protocol: Protocol) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || !fields[0].eq_ignore_ascii_case(protocol.name()) {
            continue;
        }

        if protocol == Protocol::Tcp && (fields.len() < 5 || fields[3] != "LISTENING") {
            continue;
        }

        let Some(port) = port_of(fields[1]) else {
            continue;
        };
        let pid = fields
            .last()
            .and_then(|pid| pid.parse::<u32>().ok())
            .filter(|pid| *pid != 0);

        sockets.push(ListeningSocket { port, pid });
    }

    sockets
}
