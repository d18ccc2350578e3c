use crate::{
    platform::Platform,
    process::{ProcessLookup, ProcessTable},
    PortReport, Result,
};
use std::fmt;
use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{debug, warn};

// EAFNOSUPPORT on Linux, macOS/BSD and Windows
const ADDRESS_FAMILY_UNSUPPORTED: [i32; 3] = [97, 47, 10047];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    /// Upper-case name as printed by `lsof` and Windows `netstat`.
    pub fn name(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            _ => Err(crate::Error::Other(format!(
                "Invalid protocol '{s}'. Must be tcp or udp"
            ))),
        }
    }
}

/// Checks a single, already validated port.
///
/// Implementations never fail: every outcome is expressed as a
/// [`PortReport`]. Actions take a `Probe` so they can be driven by a fake
/// in tests.
pub trait Probe {
    fn check(&self, port: u16) -> impl Future<Output = PortReport> + Send;
}

/// Probes ports by binding to them, resolving owners through the platform's
/// listing utility when the bind is refused.
#[derive(Debug, Clone)]
pub struct PortProber {
    platform: Platform,
    protocol: Protocol,
}

impl PortProber {
    pub fn new(platform: Platform, protocol: Protocol) -> Self {
        Self { platform, protocol }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Probes the IPv4 wildcard address, then the IPv6 loopback.
    pub async fn probe(&self, port: u16) -> PortReport {
        let ipv4 = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        if let Err(e) = self.try_bind(ipv4).await {
            return self.on_bind_error(port, e).await;
        }

        let ipv6 = SocketAddr::from((Ipv6Addr::LOCALHOST, port));
        match self.try_bind(ipv6).await {
            Ok(()) => PortReport::free(port),
            Err(e) if ipv6_unavailable(&e) => {
                debug!(port, error = %e, "IPv6 loopback unavailable, using IPv4 result");
                PortReport::free(port)
            }
            Err(e) => self.on_bind_error(port, e).await,
        }
    }

    async fn try_bind(&self, addr: SocketAddr) -> io::Result<()> {
        // the socket is dropped, and the port released, before returning
        match self.protocol {
            Protocol::Tcp => {
                TcpListener::bind(addr).await?;
            }
            Protocol::Udp => {
                UdpSocket::bind(addr).await?;
            }
        }
        Ok(())
    }

    async fn on_bind_error(&self, port: u16, error: io::Error) -> PortReport {
        debug!(port, error = %error, "bind refused");
        match error.kind() {
            io::ErrorKind::AddrInUse => self.resolve_owner(port).await,
            io::ErrorKind::PermissionDenied => self.check_with_utility(port).await,
            _ => PortReport::error(Some(port), error.to_string()),
        }
    }

    async fn resolve_owner(&self, port: u16) -> PortReport {
        let owner = self.platform.find_owning_pid(port, self.protocol).await;
        let name = owner_name(&owner).await;
        in_use_report(port, owner, name)
    }

    /// The OS refused even the probe (privileged port), so only the listing
    /// utility can tell whether someone is listening.
    async fn check_with_utility(&self, port: u16) -> PortReport {
        let owner = self.platform.find_owning_pid(port, self.protocol).await;
        let name = owner_name(&owner).await;
        restricted_report(port, owner, name)
    }
}

/// Report for a port whose bind failed with `AddrInUse`.
fn in_use_report(port: u16, owner: Result<Option<u32>>, name: Option<String>) -> PortReport {
    match owner {
        Ok(Some(pid)) => PortReport::in_use(port).with_process(pid, name_or_unknown(name)),
        Ok(None) => PortReport::in_use(port).with_message("Unable to find PID"),
        Err(e) => {
            warn!("Error finding PID for port {port}: {e}");
            PortReport::in_use(port).with_message("Unable to find process info")
        }
    }
}

/// Report for a port the OS would not let us bind at all.
fn restricted_report(port: u16, owner: Result<Option<u32>>, name: Option<String>) -> PortReport {
    match owner {
        Ok(Some(pid)) => PortReport::in_use(port).with_process(pid, name_or_unknown(name)),
        Ok(None) => PortReport::free(port),
        Err(e) => {
            warn!("Error checking port {port} with listing utility: {e}");
            PortReport::error(Some(port), format!("Failed to check port: {e}"))
        }
    }
}

async fn owner_name(owner: &Result<Option<u32>>) -> Option<String> {
    match owner {
        Ok(Some(pid)) => process_name(*pid).await,
        _ => None,
    }
}

fn name_or_unknown(name: Option<String>) -> String {
    name.unwrap_or_else(|| "unknown".to_string())
}

impl Probe for PortProber {
    fn check(&self, port: u16) -> impl Future<Output = PortReport> + Send {
        self.probe(port)
    }
}

async fn process_name(pid: u32) -> Option<String> {
    match ProcessTable::load().await {
        Ok(table) => table.name_of(pid),
        Err(e) => {
            warn!("Error getting process info for PID {pid}: {e}");
            None
        }
    }
}

fn ipv6_unavailable(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::AddrNotAvailable
        || error
            .raw_os_error()
            .is_some_and(|code| ADDRESS_FAMILY_UNSUPPORTED.contains(&code))
}
