use ipnet::IpNet;
use std::net::IpAddr;
use tracing::{debug, info, warn};

use super::{host_interfaces, NetworkInterface};
use crate::config::NetworkConfig;

/// Ordered list of CIDR blocks used for membership tests
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubnetList {
    networks: Vec<IpNet>,
}

impl SubnetList {
    /// Parse CIDR strings, dropping entries that do not parse.
    ///
    /// Host bits are allowed (`fe80::1/24` is the `fe80::/24` network).
    pub fn parse_lenient(entries: &[String], list_name: &str) -> Self {
        let mut networks = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry.trim().parse::<IpNet>() {
                Ok(network) => networks.push(network.trunc()),
                Err(e) => {
                    warn!(
                        list = list_name,
                        entry = %entry,
                        error = %e,
                        "Ignoring malformed CIDR entry"
                    );
                }
            }
        }
        Self { networks }
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    #[cfg(test)]
    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.networks.iter().any(|network| network.contains(ip))
    }
}

/// Select the addresses to advertise.
///
/// Loopback addresses are skipped, then anything inside `ignore`; when
/// `allow` is non-empty an address must also fall inside one of its
/// networks. Output keeps interface order, then address order, and is not
/// de-duplicated.
pub fn resolve(
    interfaces: &[NetworkInterface],
    ignore: &SubnetList,
    allow: &SubnetList,
) -> Vec<String> {
    let mut resolved = Vec::new();

    for iface in interfaces {
        for address in &iface.addresses {
            if address.loopback {
                continue;
            }
            if ignore.contains(&address.ip) {
                debug!(interface = %iface.name, ip = %address.ip, "Address matches ignore list");
                continue;
            }
            if !allow.is_empty() && !allow.contains(&address.ip) {
                debug!(interface = %iface.name, ip = %address.ip, "Address not in allow list");
                continue;
            }
            resolved.push(address.ip.to_string());
        }
    }

    resolved
}

/// Resolve the advertised addresses from the live host interfaces
pub fn resolve_host(config: &NetworkConfig) -> Vec<String> {
    resolve_configured(config, &host_interfaces())
}

/// Apply the configured filters; malformed entries are dropped, never fatal
fn resolve_configured(config: &NetworkConfig, interfaces: &[NetworkInterface]) -> Vec<String> {
    let ignore = SubnetList::parse_lenient(&config.ignore_nets, "network.ignore_nets");
    let allow = SubnetList::parse_lenient(&config.allow_nets, "network.allow_nets");

    let resolved = resolve(interfaces, &ignore, &allow);
    info!(
        interfaces = interfaces.len(),
        ignore_nets = ignore.len(),
        allow_nets = allow.len(),
        addresses = ?resolved,
        "Resolved registration addresses"
    );
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::InterfaceAddress;

    fn iface(name: &str, cidrs: &[&str]) -> NetworkInterface {
        let addresses = cidrs
            .iter()
            .map(|cidr| {
                let (ip, prefix) = cidr.split_once('/').unwrap();
                InterfaceAddress::new(ip.parse().unwrap(), prefix.parse().unwrap())
            })
            .collect();
        NetworkInterface::new(name, addresses)
    }

    fn subnets(entries: &[&str]) -> SubnetList {
        let entries: Vec<String> = entries.iter().map(|s| s.to_string()).collect();
        SubnetList::parse_lenient(&entries, "test")
    }

    #[test]
    fn test_resolve_skips_loopback_and_ignored() {
        let interfaces = vec![iface("eth0", &["10.0.0.5/24"]), iface("lo", &["127.0.0.1/8"])];
        let result = resolve(&interfaces, &subnets(&["30.39.179.16/30"]), &subnets(&[]));
        assert_eq!(result, vec!["10.0.0.5"]);
    }

    #[test]
    fn test_resolve_address_inside_ignored_subnet() {
        let interfaces = vec![iface("eth0", &["30.39.179.17/30"])];
        let result = resolve(&interfaces, &subnets(&["30.39.179.16/30"]), &subnets(&[]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_resolve_allow_list_match() {
        let interfaces = vec![iface("eth0", &["192.168.1.10/24"])];
        let result = resolve(&interfaces, &subnets(&[]), &subnets(&["192.168.0.0/16"]));
        assert_eq!(result, vec!["192.168.1.10"]);
    }

    #[test]
    fn test_resolve_allow_list_no_match() {
        let interfaces = vec![iface("eth0", &["172.16.0.1/24"])];
        let result = resolve(&interfaces, &subnets(&[]), &subnets(&["192.168.0.0/16"]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_resolve_empty_lists_accept_everything_but_loopback() {
        let interfaces = vec![
            iface("eth0", &["10.0.0.5/24", "fe80::1c2a:3bff:fe4d:5e6f/64"]),
            iface("eth1", &["172.16.0.1/16"]),
            iface("lo", &["127.0.0.1/8", "::1/128"]),
        ];
        let result = resolve(&interfaces, &subnets(&[]), &subnets(&[]));
        assert_eq!(
            result,
            vec!["10.0.0.5", "fe80::1c2a:3bff:fe4d:5e6f", "172.16.0.1"]
        );
    }

    #[test]
    fn test_resolve_ignore_wins_over_allow() {
        let interfaces = vec![iface("eth0", &["10.1.2.3/8", "10.2.0.1/8"])];
        let result = resolve(
            &interfaces,
            &subnets(&["10.1.0.0/16"]),
            &subnets(&["10.0.0.0/8"]),
        );
        assert_eq!(result, vec!["10.2.0.1"]);
    }

    #[test]
    fn test_resolve_loopback_excluded_even_when_allowed() {
        let interfaces = vec![iface("lo", &["127.0.0.1/8", "::1/128"])];
        let result = resolve(
            &interfaces,
            &subnets(&[]),
            &subnets(&["127.0.0.0/8", "::1/128"]),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_resolve_keeps_order_and_duplicates() {
        let interfaces = vec![
            iface("eth0", &["10.0.0.7/24", "10.0.0.5/24"]),
            iface("eth1", &["10.0.0.5/24"]),
        ];
        let result = resolve(&interfaces, &subnets(&[]), &subnets(&[]));
        assert_eq!(result, vec!["10.0.0.7", "10.0.0.5", "10.0.0.5"]);
    }

    #[test]
    fn test_resolve_no_interfaces() {
        let result = resolve(&[], &subnets(&["10.0.0.0/8"]), &subnets(&["10.0.0.0/8"]));
        assert!(result.is_empty());
    }

    #[test]
    fn test_resolve_interface_without_addresses() {
        let interfaces = vec![iface("tun0", &[]), iface("eth0", &["10.0.0.5/24"])];
        let result = resolve(&interfaces, &subnets(&[]), &subnets(&[]));
        assert_eq!(result, vec!["10.0.0.5"]);
    }

    #[test]
    fn test_default_ignore_list_covers_link_local_v6() {
        let ignore = subnets(&["30.39.179.16/30", "fe80::1/24"]);
        let interfaces = vec![iface("eth0", &["fe80::abcd/64", "2001:db8::10/64"])];
        let result = resolve(&interfaces, &ignore, &subnets(&[]));
        assert_eq!(result, vec!["2001:db8::10"]);
    }

    #[test]
    fn test_parse_lenient_drops_malformed_entries() {
        let list = subnets(&["not-a-cidr", "10.0.0.0/8", "192.168.1.1", "10.0.0.0/33", ""]);
        assert_eq!(list.len(), 1);
        assert!(list.contains(&"10.20.30.40".parse().unwrap()));
    }

    #[test]
    fn test_malformed_allow_entries_only_means_allow_all() {
        // Every allow entry dropped leaves an empty allow list
        let interfaces = vec![iface("eth0", &["172.16.0.1/24"])];
        let result = resolve(&interfaces, &subnets(&[]), &subnets(&["bogus", "1.2.3/8"]));
        assert_eq!(result, vec!["172.16.0.1"]);
    }

    #[test]
    fn test_parse_lenient_normalises_host_bits() {
        let list = subnets(&["fe80::1/24"]);
        assert_eq!(list.networks()[0].to_string(), "fe80::/24");
        assert!(list.contains(&"fe80::dead:beef".parse().unwrap()));
    }

    #[test]
    fn test_subnet_list_mixed_families() {
        let list = subnets(&["192.168.1.0/24", "2001:db8::/32"]);
        assert!(list.contains(&"192.168.1.1".parse().unwrap()));
        assert!(!list.contains(&"192.168.2.1".parse().unwrap()));
        assert!(list.contains(&"2001:db8::1".parse().unwrap()));
        assert!(!list.contains(&"2001:db9::1".parse().unwrap()));
    }

    #[test]
    fn test_resolve_configured_skips_malformed_entries() {
        let config = NetworkConfig {
            ignore_nets: vec![
                "30.39.179.16/30".to_string(),
                "10.0.0.0/33".to_string(),
                "garbage".to_string(),
            ],
            allow_nets: vec!["not-a-cidr".to_string(), "10.0.0.0/8".to_string()],
        };
        let interfaces = vec![
            iface("lo", &["127.0.0.1/8"]),
            iface("eth0", &["10.0.0.5/24", "30.39.179.17/30", "172.16.0.1/24"]),
        ];

        assert_eq!(resolve_configured(&config, &interfaces), vec!["10.0.0.5"]);
    }

    #[test]
    fn test_resolve_configured_all_allow_entries_malformed_allows_all() {
        let config = NetworkConfig {
            ignore_nets: Vec::new(),
            allow_nets: vec!["bogus/99".to_string()],
        };
        let interfaces = vec![iface("eth0", &["10.0.0.5/24", "172.16.0.1/24"])];

        assert_eq!(
            resolve_configured(&config, &interfaces),
            vec!["10.0.0.5", "172.16.0.1"]
        );
    }
}
