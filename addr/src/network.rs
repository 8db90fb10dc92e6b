// SPDX-License-Identifier: Apache-2.0
// Copyright fwctl project authors

//! Address and subnet-mask pairs.

#[cfg(any(test, feature = "bolero"))]
#[allow(unused_imports)] // re-export
pub use contract::*;
use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use std::fmt::{Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;
use tracing::debug;

/// An IP address qualified by a subnet mask.
///
/// Unlike a strict CIDR prefix, the address may carry host bits: the written
/// address is preserved, and the network range is derived from the mask.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkAddress {
    addr: IpAddr,
    net: IpNet,
}

/// An error indicating that an invalid address/mask combination was provided.
#[derive(Debug, thiserror::Error)]
pub enum InvalidNetworkAddress {
    /// The address and the mask belong to different address families.
    #[error("address {0} and mask {1} belong to different address families")]
    AddressFamilyMismatch(IpAddr, IpAddr),
    /// The mask bits are not contiguous.
    #[error("mask {0} is not a contiguous subnet mask")]
    NonContiguousMask(IpAddr),
    /// The prefix length is too long for the address family.
    #[error("prefix length {0} is too long for the address family")]
    InvalidPrefixLength(u8),
}

/// An error which may occur when parsing a [`NetworkAddress`] from a string.
#[derive(Debug, thiserror::Error)]
pub enum NetworkAddressParseError {
    /// The address and mask parsed but do not form a valid network address.
    #[error(transparent)]
    InvalidNetwork(#[from] InvalidNetworkAddress),
    /// Failed to interpret the input as an address/mask or address/length pair.
    #[error("failed to parse input '{0}' as a network address")]
    ParseFailure(String),
}

impl NetworkAddress {
    /// Constructor which validates the address/mask combination provided.
    ///
    /// # Errors
    ///
    /// * Returns [`InvalidNetworkAddress::AddressFamilyMismatch`] if `addr` and `mask` belong
    ///   to different address families.
    /// * Returns [`InvalidNetworkAddress::NonContiguousMask`] if the mask bits are not
    ///   contiguous.
    #[tracing::instrument(level = "trace")]
    pub fn new(addr: IpAddr, mask: IpAddr) -> Result<NetworkAddress, InvalidNetworkAddress> {
        let net = match (addr, mask) {
            (IpAddr::V4(addr), IpAddr::V4(mask)) => Ipv4Net::with_netmask(addr, mask)
                .map(IpNet::V4)
                .map_err(|_| InvalidNetworkAddress::NonContiguousMask(IpAddr::V4(mask)))?,
            (IpAddr::V6(addr), IpAddr::V6(mask)) => Ipv6Net::with_netmask(addr, mask)
                .map(IpNet::V6)
                .map_err(|_| InvalidNetworkAddress::NonContiguousMask(IpAddr::V6(mask)))?,
            (addr, mask) => {
                return Err(InvalidNetworkAddress::AddressFamilyMismatch(addr, mask));
            }
        };
        if addr != net.network() {
            debug!(%addr, %mask, "address contains host bits; range derived from mask");
        }
        Ok(NetworkAddress { addr, net })
    }

    /// Constructor taking a prefix length instead of a mask.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidNetworkAddress::InvalidPrefixLength`] if `prefix_len` is greater than
    /// 32 (v4) or 128 (v6).
    pub fn with_prefix_len(
        addr: IpAddr,
        prefix_len: u8,
    ) -> Result<NetworkAddress, InvalidNetworkAddress> {
        let net = IpNet::new(addr, prefix_len)
            .map_err(|_| InvalidNetworkAddress::InvalidPrefixLength(prefix_len))?;
        Ok(NetworkAddress { addr, net })
    }

    /// The written address, host bits included.
    #[must_use]
    pub const fn address(&self) -> IpAddr {
        self.addr
    }

    /// The subnet mask.
    #[must_use]
    pub fn mask(&self) -> IpAddr {
        self.net.netmask()
    }

    /// The mask expressed as a prefix length.
    #[must_use]
    pub const fn prefix_len(&self) -> u8 {
        match self.net {
            IpNet::V4(net) => net.prefix_len(),
            IpNet::V6(net) => net.prefix_len(),
        }
    }

    /// The first address of the masked range (address AND mask).
    #[must_use]
    pub fn range_start(&self) -> IpAddr {
        self.net.network()
    }

    /// The last address of the masked range (address OR NOT mask).
    #[must_use]
    pub fn range_end(&self) -> IpAddr {
        self.net.broadcast()
    }

    /// Returns true iff the masked range covers exactly one address.
    #[must_use]
    pub fn is_single_address(&self) -> bool {
        self.prefix_len() == self.net.max_prefix_len()
    }

    /// The single address covered by this network, if the mask leaves exactly one.
    #[must_use]
    pub fn single_address(&self) -> Option<IpAddr> {
        self.is_single_address().then_some(self.addr)
    }

    /// Returns true iff `addr` falls within the masked range.
    #[must_use]
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.net, addr) {
            (IpNet::V4(net), IpAddr::V4(addr)) => net.contains(&addr),
            (IpNet::V6(net), IpAddr::V6(addr)) => net.contains(&addr),
            _ => false,
        }
    }
}

impl From<IpNet> for NetworkAddress {
    fn from(value: IpNet) -> Self {
        NetworkAddress {
            addr: value.addr(),
            net: value,
        }
    }
}

impl From<NetworkAddress> for IpNet {
    fn from(value: NetworkAddress) -> Self {
        value.net
    }
}

impl Display for NetworkAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len())
    }
}

impl FromStr for NetworkAddress {
    type Err = NetworkAddressParseError;

    /// Attempt to parse a [`NetworkAddress`] from `addr/prefix-length` or
    /// `addr/dotted-mask` notation.
    ///
    /// # Errors
    ///
    /// * Returns [`NetworkAddressParseError::ParseFailure`] if the input does not split into
    ///   an address and a mask, or if either half fails to parse.
    /// * Returns [`NetworkAddressParseError::InvalidNetwork`] if both halves parse but do not
    ///   form a valid network address.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let Some((addr, mask)) = trimmed.split_once('/') else {
            return Err(NetworkAddressParseError::ParseFailure(s.to_string()));
        };
        let addr = IpAddr::from_str(addr.trim())
            .map_err(|_| NetworkAddressParseError::ParseFailure(s.to_string()))?;
        let mask = mask.trim();
        if let Ok(prefix_len) = mask.parse::<u8>() {
            return Ok(NetworkAddress::with_prefix_len(addr, prefix_len)?);
        }
        let mask = IpAddr::from_str(mask)
            .map_err(|_| NetworkAddressParseError::ParseFailure(s.to_string()))?;
        Ok(NetworkAddress::new(addr, mask)?)
    }
}

#[cfg(any(test, feature = "bolero"))]
mod contract {
    use crate::network::NetworkAddress;
    use bolero::{Driver, TypeGenerator};
    use ipnet::{IpNet, Ipv4Net, Ipv6Net};
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    use std::ops::Bound;

    impl TypeGenerator for NetworkAddress {
        fn generate<D: Driver>(driver: &mut D) -> Option<Self> {
            Some(if driver.gen_bool(Some(0.5))? {
                let addr = Ipv4Addr::from(driver.produce::<u32>()?);
                let prefix_len = driver.gen_u8(Bound::Included(&0), Bound::Included(&32))?;
                NetworkAddress {
                    addr: IpAddr::V4(addr),
                    net: IpNet::V4(
                        Ipv4Net::new(addr, prefix_len).unwrap_or_else(|_| unreachable!()),
                    ),
                }
            } else {
                let addr = Ipv6Addr::from(driver.produce::<u128>()?);
                let prefix_len = driver.gen_u8(Bound::Included(&0), Bound::Included(&128))?;
                NetworkAddress {
                    addr: IpAddr::V6(addr),
                    net: IpNet::V6(
                        Ipv6Net::new(addr, prefix_len).unwrap_or_else(|_| unreachable!()),
                    ),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::network::{InvalidNetworkAddress, NetworkAddress, NetworkAddressParseError};
    use std::net::IpAddr;
    use std::str::FromStr;

    #[test]
    fn prefix_length_literal_parses() {
        let network = NetworkAddress::from_str("10.0.0.0/24").unwrap();
        assert_eq!(network.address(), "10.0.0.0".parse::<IpAddr>().unwrap());
        assert_eq!(network.mask(), "255.255.255.0".parse::<IpAddr>().unwrap());
        assert_eq!(network.range_start(), "10.0.0.0".parse::<IpAddr>().unwrap());
        assert_eq!(network.range_end(), "10.0.0.255".parse::<IpAddr>().unwrap());
        assert!(!network.is_single_address());
    }

    #[test]
    fn dotted_mask_literal_parses() {
        let network = NetworkAddress::from_str("10.0.0.1/255.255.255.255").unwrap();
        assert_eq!(
            network.single_address(),
            Some("10.0.0.1".parse::<IpAddr>().unwrap())
        );
        let network = NetworkAddress::from_str("172.16.0.0/255.255.0.0").unwrap();
        assert_eq!(network.prefix_len(), 16);
        assert_eq!(
            network.range_end(),
            "172.16.255.255".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn host_bits_are_preserved() {
        let network = NetworkAddress::from_str("10.0.0.77/24").unwrap();
        assert_eq!(network.address(), "10.0.0.77".parse::<IpAddr>().unwrap());
        assert_eq!(network.range_start(), "10.0.0.0".parse::<IpAddr>().unwrap());
        assert_eq!(network.range_end(), "10.0.0.255".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn v6_prefix_parses() {
        let network = NetworkAddress::from_str("::1/128").unwrap();
        assert_eq!(network.single_address(), Some("::1".parse().unwrap()));
        let network = NetworkAddress::from_str("2001:db8::/32").unwrap();
        assert!(network.contains("2001:db8::77".parse().unwrap()));
        assert!(!network.contains("2001:db9::".parse().unwrap()));
    }

    #[test]
    fn non_contiguous_mask_returns_error() {
        match NetworkAddress::from_str("10.0.0.1/255.0.255.0") {
            Err(NetworkAddressParseError::InvalidNetwork(
                InvalidNetworkAddress::NonContiguousMask(mask),
            )) => {
                assert_eq!(mask, "255.0.255.0".parse::<IpAddr>().unwrap());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn overlong_prefix_returns_error() {
        match NetworkAddress::from_str("10.0.0.1/33") {
            Err(NetworkAddressParseError::InvalidNetwork(
                InvalidNetworkAddress::InvalidPrefixLength(33),
            )) => {}
            _ => unreachable!(),
        }
    }

    #[test]
    fn mixed_families_return_error() {
        match NetworkAddress::from_str("10.0.0.1/ffff::") {
            Err(NetworkAddressParseError::InvalidNetwork(
                InvalidNetworkAddress::AddressFamilyMismatch(_, _),
            )) => {}
            _ => unreachable!(),
        }
    }

    #[test]
    fn garbage_fails_to_parse() {
        for input in ["10.0.0.1", "sandwich/24", "10.0.0.1/sandwich", ""] {
            match NetworkAddress::from_str(input) {
                Err(NetworkAddressParseError::ParseFailure(reported)) => {
                    assert_eq!(reported, input);
                }
                _ => unreachable!(),
            }
        }
    }

    #[test]
    fn basic_fuzz() {
        bolero::check!()
            .with_type()
            .cloned()
            .for_each(|network: NetworkAddress| {
                assert!(network.range_start() <= network.range_end());
                assert!(network.contains(network.address()));
                assert!(network.contains(network.range_start()));
                assert!(network.contains(network.range_end()));
                assert_eq!(
                    network.is_single_address(),
                    network.range_start() == network.range_end()
                );
            });
    }

    #[test]
    fn display_round_trip_fuzz() {
        bolero::check!()
            .with_type()
            .cloned()
            .for_each(|network: NetworkAddress| {
                let reparsed = NetworkAddress::from_str(&network.to_string()).unwrap();
                assert_eq!(network, reparsed);
            });
    }
}
