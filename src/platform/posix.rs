//! Linux, macOS and BSD: `lsof`, falling back to `ss` and then `netstat`.

use super::{port_of, run_utility, ListeningSocket};
use crate::{port::Protocol, Result};
use tracing::debug;

pub(super) async fn find_sockets(port: u16, protocol: Protocol) -> Result<Vec<ListeningSocket>> {
    let filter = format!("-i{}:{port}", protocol.name());
    match run_lsof(&filter, protocol).await {
        Ok(sockets) => return Ok(sockets),
        Err(e) => debug!(error = %e, "lsof unavailable, falling back to ss/netstat"),
    }

    let sockets = list_with_socket_tools(protocol).await?;
    Ok(sockets.into_iter().filter(|s| s.port == port).collect())
}

pub(super) async fn list_sockets(protocol: Protocol) -> Result<Vec<ListeningSocket>> {
    let filter = format!("-i{}", protocol.name());
    match run_lsof(&filter, protocol).await {
        Ok(sockets) => return Ok(sockets),
        Err(e) => debug!(error = %e, "lsof unavailable, falling back to ss/netstat"),
    }

    list_with_socket_tools(protocol).await
}

async fn run_lsof(filter: &str, protocol: Protocol) -> Result<Vec<ListeningSocket>> {
    let mut args = vec!["-n", "-P", filter];
    if protocol == Protocol::Tcp {
        args.push("-sTCP:LISTEN");
    }

    let output = run_utility("lsof", &args).await?;
    Ok(parse_lsof_output(&output, protocol))
}

async fn list_with_socket_tools(protocol: Protocol) -> Result<Vec<ListeningSocket>> {
    let flags = match protocol {
        Protocol::Tcp => "-lt",
        Protocol::Udp => "-lu",
    };

    match run_utility("ss", &["-H", "-n", "-p", flags]).await {
        Ok(output) => return Ok(parse_ss_output(&output)),
        Err(e) => debug!(error = %e, "ss unavailable, falling back to netstat"),
    }

    let output = run_utility("netstat", &["-n", "-p", flags]).await?;
    Ok(parse_netstat_output(&output, protocol))
}

/// Parses `lsof -n -P -i...` output.
///
/// ```text
/// COMMAND   PID USER   FD   TYPE DEVICE SIZE/OFF NODE NAME
/// node    41312  dev   23u  IPv4 0x1a2b      0t0  TCP *:3000 (LISTEN)
/// ```
pub fn parse_lsof_output(output: &str, protocol: Protocol) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();

    for line in output.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 9 {
            continue;
        }

        // COMMAND may contain spaces, so locate NODE by value rather than index
        let Some(node_index) = fields
            .iter()
            .skip(7)
            .position(|field| *field == protocol.name())
            .map(|offset| offset + 7)
        else {
            continue;
        };
        let Some(name) = fields.get(node_index + 1) else {
            continue;
        };

        // established connections look like `a:1->b:2`
        if name.contains("->") {
            continue;
        }
        if protocol == Protocol::Tcp {
            if let Some(state) = fields.get(node_index + 2) {
                if *state != "(LISTEN)" {
                    continue;
                }
            }
        }

        let Some(port) = port_of(name) else {
            continue;
        };
        // PID sits six columns left of NODE however many words COMMAND has
        let pid = fields[node_index - 6]
            .parse::<u32>()
            .ok()
            .or_else(|| fields[1].parse::<u32>().ok());

        sockets.push(ListeningSocket { port, pid });
    }

    sockets
}

/// Parses `ss -H -n -p -l{t|u}` output.
///
/// ```text
/// LISTEN 0 4096 127.0.0.53%lo:53 0.0.0.0:* users:(("systemd-resolve",pid=640,fd=14))
/// ```
pub fn parse_ss_output(output: &str) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = fields.first() else {
            continue;
        };
        if *first == "State" || *first == "Netid" {
            continue;
        }

        // a leading Netid column appears when several protocols are listed
        let offset = usize::from(matches!(*first, "tcp" | "udp"));
        let Some(local) = fields.get(3 + offset) else {
            continue;
        };
        let Some(port) = port_of(local) else {
            continue;
        };

        let pid = fields.iter().find_map(|field| pid_from_users(field));
        sockets.push(ListeningSocket { port, pid });
    }

    sockets
}

fn pid_from_users(field: &str) -> Option<u32> {
    let start = field.find("pid=")? + 4;
    let digits: String = field[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Parses Linux `netstat -n -p -l{t|u}` output.
///
/// ```text
/// Proto Recv-Q Send-Q Local Address   Foreign Address  State   PID/Program name
/// tcp        0      0 0.0.0.0:22      0.0.0.0:*        LISTEN  1021/sshd
/// ```
pub fn parse_netstat_output(output: &str, protocol: Protocol) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            continue;
        }

        // tcp, tcp4, tcp6, udp, udp6
        if !fields[0].to_lowercase().starts_with(protocol.as_str()) {
            continue;
        }
        if protocol == Protocol::Tcp && !fields[5..].iter().any(|f| f.contains("LISTEN")) {
            continue;
        }

        let Some(port) = port_of(fields[3]) else {
            continue;
        };

        // "-" in the PID column means the socket belongs to another user
        let pid = fields[5..].iter().find_map(|field| {
            field
                .split_once('/')
                .and_then(|(pid, _)| pid.parse::<u32>().ok())
        });

        sockets.push(ListeningSocket { port, pid });
    }

    sockets
}
