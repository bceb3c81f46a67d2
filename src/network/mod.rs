//! Host network interfaces and registration address resolution
//!
//! This module reads the host's interfaces and decides which of their
//! addresses the service advertises to the naming registry.
//!
//! - [`host_interfaces`] takes a snapshot of the host interfaces
//! - [`resolve_host`] applies the ignore/allow filters and returns the
//!   advertised addresses

mod resolver;

use if_addrs::IfAddr;
use std::net::IpAddr;
use tracing::{debug, warn};

pub use resolver::resolve_host;

/// One address bound to a network interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub ip: IpAddr,
    pub prefix_len: u8,
    pub loopback: bool,
}

impl InterfaceAddress {
    pub fn new(ip: IpAddr, prefix_len: u8) -> Self {
        Self {
            ip,
            prefix_len,
            loopback: is_loopback(&ip),
        }
    }
}

/// A host network interface and its addresses, in enumeration order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkInterface {
    pub name: String,
    pub addresses: Vec<InterfaceAddress>,
}

impl NetworkInterface {
    pub fn new(name: impl Into<String>, addresses: Vec<InterfaceAddress>) -> Self {
        Self {
            name: name.into(),
            addresses,
        }
    }
}

/// Loopback check that also covers IPv4-mapped IPv6 loopback addresses
pub fn is_loopback(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback(),
        IpAddr::V6(v6) => {
            v6.is_loopback() || v6.to_ipv4_mapped().is_some_and(|v4| v4.is_loopback())
        }
    }
}

/// Snapshot the host network interfaces.
///
/// Addresses are grouped by interface name in first-seen order. An
/// enumeration failure yields an empty list.
pub fn host_interfaces() -> Vec<NetworkInterface> {
    let raw = match if_addrs::get_if_addrs() {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Failed to enumerate network interfaces");
            return Vec::new();
        }
    };

    let interfaces = group_addresses(raw.into_iter().map(|iface| match iface.addr {
        IfAddr::V4(v4) => (iface.name, IpAddr::V4(v4.ip), IpAddr::V4(v4.netmask)),
        IfAddr::V6(v6) => (iface.name, IpAddr::V6(v6.ip), IpAddr::V6(v6.netmask)),
    }));

    debug!(count = interfaces.len(), "Enumerated host network interfaces");
    interfaces
}

/// Group `(interface name, ip, netmask)` triples by name in first-seen order.
///
/// A non-contiguous netmask is treated as a host route.
fn group_addresses<I>(raw: I) -> Vec<NetworkInterface>
where
    I: IntoIterator<Item = (String, IpAddr, IpAddr)>,
{
    let mut interfaces: Vec<NetworkInterface> = Vec::new();
    for (name, ip, netmask) in raw {
        let prefix_len = ipnet::ip_mask_to_prefix(netmask).unwrap_or(match ip {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        });
        let address = InterfaceAddress::new(ip, prefix_len);

        match interfaces.iter_mut().find(|i| i.name == name) {
            Some(existing) => existing.addresses.push(address),
            None => interfaces.push(NetworkInterface::new(name, vec![address])),
        }
    }
    interfaces
}
