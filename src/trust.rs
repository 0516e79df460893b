use crate::config::TrustProxyConfig;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::warn;

/// A single address or CIDR block.
///
/// IPv4 networks are stored in the low 32 bits; the family flag keeps the two
/// address spaces apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CidrRange {
    network: u128,
    prefix_len: u8,
    is_ipv6: bool,
}

impl CidrRange {
    /// Parses `10.0.0.0/8`, `10.0.0.1`, `fd00::/8` or `::1`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let (addr, prefix) = match value.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix.parse::<u8>().ok()?)),
            None => (value, None),
        };

        match addr.parse::<IpAddr>().ok()? {
            IpAddr::V4(ip) => {
                let prefix_len = prefix.unwrap_or(32);
                if prefix_len > 32 {
                    return None;
                }
                Some(Self {
                    network: u128::from(u32::from(ip)) & mask_v4(prefix_len),
                    prefix_len,
                    is_ipv6: false,
                })
            }
            IpAddr::V6(ip) => {
                let prefix_len = prefix.unwrap_or(128);
                if prefix_len > 128 {
                    return None;
                }
                Some(Self {
                    network: u128::from(ip) & mask_v6(prefix_len),
                    prefix_len,
                    is_ipv6: true,
                })
            }
        }
    }

    pub fn contains(&self, ip: IpAddr) -> bool {
        match (canonical(ip), self.is_ipv6) {
            (IpAddr::V4(ip), false) => {
                u128::from(u32::from(ip)) & mask_v4(self.prefix_len) == self.network
            }
            (IpAddr::V6(ip), true) => u128::from(ip) & mask_v6(self.prefix_len) == self.network,
            _ => false,
        }
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

fn mask_v4(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        u128::from(u32::MAX << (32 - u32::from(prefix_len)))
    }
}

fn mask_v6(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix_len))
    }
}

/// Folds IPv4-mapped IPv6 peers (`::ffff:a.b.c.d`) into their IPv4 form.
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        v4 => v4,
    }
}

/// Compiled, immutable proxy-trust decision shared by every request of an app.
#[derive(Debug, Clone, Default)]
pub struct TrustPolicy {
    enabled: bool,
    ranges: Vec<CidrRange>,
    loopback: bool,
    link_local: bool,
    private: bool,
}

impl TrustPolicy {
    /// Policy under which forwarded headers are never honored.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn compile(enabled: bool, config: &TrustProxyConfig) -> Self {
        let mut ranges = Vec::with_capacity(config.proxies.len());
        for entry in &config.proxies {
            match CidrRange::parse(entry) {
                Some(range) => ranges.push(range),
                None => warn!(entry = %entry, "ignoring malformed trusted proxy entry"),
            }
        }

        Self {
            enabled,
            ranges,
            loopback: config.loopback,
            link_local: config.link_local,
            private: config.private,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether `peer` may speak for the client. Always false when disabled.
    pub fn is_trusted(&self, peer: IpAddr) -> bool {
        if !self.enabled {
            return false;
        }

        let peer = canonical(peer);
        if self.loopback && is_loopback(peer) {
            return true;
        }
        if self.link_local && is_link_local(peer) {
            return true;
        }
        if self.private && is_private(peer) {
            return true;
        }

        self.ranges.iter().any(|range| range.contains(peer))
    }
}

fn is_loopback(ip: IpAddr) -> bool {
    ip.is_loopback()
}

fn is_link_local(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => v6.segments()[0] & 0xffc0 == 0xfe80,
    }
}

fn is_private(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private(),
        IpAddr::V6(v6) => is_unique_local(&v6),
    }
}

fn is_unique_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xfe00 == 0xfc00
}

/// Address reported when the transport supplies no peer.
pub(crate) const UNSPECIFIED_PEER: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[cfg(test)]
#[path = "trust_test.rs"]
mod trust_test;
