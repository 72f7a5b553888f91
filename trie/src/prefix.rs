// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Type to represent IP-version neutral network prefixes.

use ipnet::{Ipv4Net, Ipv6Net};
use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrefixError {
    #[error("Invalid Prefix: {0}")]
    Invalid(String),
    #[error("Mask length {0} is invalid")]
    InvalidLength(u8),
}

/// Type to represent both IPv4 and IPv6 prefixes to expose an IP
/// version-independent API. Host bits beyond the mask length are zeroed on
/// construction, so the network address of a prefix is always canonical.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd)]
pub enum Prefix {
    IPV4(Ipv4Net),
    IPV6(Ipv6Net),
}

impl Prefix {
    pub const MAX_LEN_IPV4: u8 = 32;
    pub const MAX_LEN_IPV6: u8 = 128;

    const ROOT_V4: Ipv4Net = match Ipv4Net::new(Ipv4Addr::new(0, 0, 0, 0), 0) {
        Ok(root) => root,
        Err(_) => {
            panic!("unreachable")
        }
    };

    const ROOT_V6: Ipv6Net = match Ipv6Net::new(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0), 0) {
        Ok(root) => root,
        Err(_) => {
            panic!("unreachable")
        }
    };

    /// Build 0.0.0.0/0. "Default" is a very overloaded term. Calling this `root_v4`.
    #[must_use]
    pub fn root_v4() -> Prefix {
        Prefix::IPV4(Self::ROOT_V4)
    }

    /// Build `::/0`.
    #[must_use]
    pub fn root_v6() -> Prefix {
        Prefix::IPV6(Self::ROOT_V6)
    }

    /// Check whether the prefix is IPv4
    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        matches!(self, Prefix::IPV4(_))
    }

    /// Check whether the prefix is IPv6
    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        matches!(self, Prefix::IPV6(_))
    }

    /// Build an `IpAddr` from a prefix
    #[must_use]
    pub fn as_address(&self) -> IpAddr {
        match *self {
            Prefix::IPV4(p) => p.network().into(),
            Prefix::IPV6(p) => p.network().into(),
        }
    }

    /// Get prefix length
    #[must_use]
    pub fn length(&self) -> u8 {
        match *self {
            Prefix::IPV4(p) => p.prefix_len(),
            Prefix::IPV6(p) => p.prefix_len(),
        }
    }

    /// Get the maximum prefix length of the address family (32 or 128)
    #[must_use]
    pub fn max_length(&self) -> u8 {
        match self {
            Prefix::IPV4(_) => Prefix::MAX_LEN_IPV4,
            Prefix::IPV6(_) => Prefix::MAX_LEN_IPV6,
        }
    }

    /// Tell if prefix is a host
    #[must_use]
    pub fn is_host(&self) -> bool {
        self.length() == self.max_length()
    }

    #[cfg(test)]
    pub fn expect_from<T>(val: T) -> Self
    where
        T: TryInto<Prefix>,
        T::Error: std::fmt::Debug,
    {
        val.try_into().expect("Invalid prefix")
    }
}

impl TryFrom<(IpAddr, u8)> for Prefix {
    type Error = PrefixError;

    fn try_from(tuple: (IpAddr, u8)) -> Result<Self, Self::Error> {
        match tuple.0 {
            IpAddr::V4(a) => Ok(Prefix::IPV4(
                Ipv4Net::new(a, tuple.1)
                    .map_err(|_| PrefixError::InvalidLength(tuple.1))?
                    .trunc(),
            )),
            IpAddr::V6(a) => Ok(Prefix::IPV6(
                Ipv6Net::new(a, tuple.1)
                    .map_err(|_| PrefixError::InvalidLength(tuple.1))?
                    .trunc(),
            )),
        }
    }
}

impl From<Ipv4Net> for Prefix {
    fn from(value: Ipv4Net) -> Self {
        Prefix::IPV4(value.trunc())
    }
}

impl From<Ipv6Net> for Prefix {
    fn from(value: Ipv6Net) -> Self {
        Prefix::IPV6(value.trunc())
    }
}

impl FromStr for Prefix {
    type Err = PrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(p) = Ipv4Net::from_str(s) {
            Ok(Prefix::from(p))
        } else if let Ok(p) = Ipv6Net::from_str(s) {
            Ok(Prefix::from(p))
        } else {
            Err(PrefixError::Invalid(s.to_string()))
        }
    }
}

/// Only for testing. Will panic with badly formatted prefix strings
#[cfg(test)]
impl From<&str> for Prefix {
    fn from(s: &str) -> Self {
        s.parse().expect("Invalid prefix")
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prefix::IPV4(p) => write!(f, "{p}"),
            Prefix::IPV6(p) => write!(f, "{p}"),
        }
    }
}
