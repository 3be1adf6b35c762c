// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    address::{address_from_bytes, parse_address, AddressExt, IpFam},
    boundary::{max_address_bytes, min_address_bytes, parse_prefix, prefix_mask},
    compare::AddressRange,
    pattern::Pattern,
    strings::*,
    ParseOptions, RangeError,
};
use ipnet::{IpNet, PrefixLenError};
use lazy_static::lazy_static;
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    net::{IpAddr, Ipv4Addr},
    str::FromStr,
};
use tracing::debug;

lazy_static! {
    static ref SIX_TO_FOUR: Subnet = "2002::/16"
        .parse()
        .expect("6to4 literal is a valid subnet");
}

/**
Address range in CIDR notation, e.g. `192.168.1.0/24`.

`start` and `end` share the top `prefix` bits; below the prefix `start` is
all zeros and `end` all ones. Ordering is by `start`, then `end`.
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Subnet {
    start: IpAddr,
    end: IpAddr,
    /// **v4**: `0..=32`, **v6**: `0..=128`
    prefix: u8,
}

impl Subnet {
    /// The subnet of `prefix` bits containing `addr`. `addr` does not need to be the network address.
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, RangeError> {
        let bytes: Vec<u8> = addr.to_bytes();
        let out_of_range = || RangeError::PrefixOutOfRange {
            prefix: prefix as u32,
            max: addr.family().bits(),
        };

        let start: IpAddr = min_address_bytes(&bytes, prefix as u32)
            .and_then(|b| address_from_bytes(&b))
            .ok_or_else(out_of_range)?;
        let end: IpAddr = max_address_bytes(&bytes, prefix as u32)
            .and_then(|b| address_from_bytes(&b))
            .ok_or_else(out_of_range)?;

        Ok(Self { start, end, prefix })
    }

    /// Caller guarantees the block invariant holds.
    pub(crate) fn from_parts(start: IpAddr, end: IpAddr, prefix: u8) -> Self {
        debug_assert!(start <= end && start.family() == end.family());
        Self { start, end, prefix }
    }

    /// Host subnet (/32 or /128) for a single address.
    pub fn host(addr: IpAddr) -> Self {
        Self {
            start: addr,
            end: addr,
            prefix: addr.family().bits(),
        }
    }

    /**
    Parse `address/prefix`.

    With [ParseOptions::allow_non_decimal_ipv4], abbreviated IPv4 network
    addresses are padded with `.0` octets (`10/8` is `10.0.0.0/8`) and the
    prefix may then only cover the octets actually written.
    */
    pub fn parse(text: &str, opts: ParseOptions) -> Result<Self, RangeError> {
        let parts: Vec<&str> = text.split(SLASH).collect();
        if parts.len() != 2 {
            debug!(subnet = text, "{ERR_CIDR_FMT}");
            return Err(RangeError::InvalidFormat(text.to_string()));
        }

        let mut addr_str: String = parts[0].to_string();
        let mut missing_dots: usize = 0;
        if opts.allow_non_decimal_ipv4 && !addr_str.contains(':') {
            missing_dots = 3usize.saturating_sub(addr_str.matches('.').count());
            addr_str.push_str(&".0".repeat(missing_dots));
        }

        let addr: IpAddr = parse_address(&addr_str, opts)?;
        let width: u8 = match missing_dots {
            0 => addr.family().bits(),
            n => ((4 - n) * 8) as u8,
        };
        let prefix: u8 = parse_prefix(parts[1], width)?;

        Self::new(addr, prefix)
    }

    /// Network prefix length.
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Returns true if the subnet is a single address.
    pub fn is_host(&self) -> bool {
        self.prefix == self.family().bits()
    }

    /// Dotted subnet mask, IPv4 only.
    pub fn subnet_mask(&self) -> Option<Ipv4Addr> {
        if self.family() != IpFam::V4 {
            return None;
        }
        let mask: [u8; 4] = prefix_mask(4, self.prefix as u32)?.try_into().ok()?;
        Some(Ipv4Addr::from(mask))
    }

    /// Wildcard form, only when the prefix ends on an octet (v4) or hextet (v6) boundary.
    pub fn as_pattern(&self) -> Option<Pattern> {
        Pattern::from_subnet(self)
    }

    /// `start/prefix` with the start address zero-padded.
    pub fn to_string_long(&self) -> String {
        format!("{}{SLASH}{}", self.start.to_long_string(), self.prefix)
    }

    /// The 6to4 range `2002::/16`.
    pub fn six_to_four() -> &'static Subnet {
        &SIX_TO_FOUR
    }

    /**
    Reverse-DNS zone names covering this subnet.

    Units are octets for IPv4 and nibbles for IPv6. A prefix that splits a
    unit yields one name per possible value of that unit, e.g. a `/28` gives
    16 names.
    */
    pub fn reverse_dns_names(&self) -> Vec<String> {
        let fam: IpFam = self.family();
        let unit_bits: u32 = match fam {
            IpFam::V4 => 8,
            IpFam::V6 => 4,
        };
        let total_bits: u32 = fam.bits() as u32;
        let prefix: u32 = self.prefix as u32;

        let extra_bits: u32 = (total_bits - prefix) % unit_bits;
        let mut prefix_units: u32 = prefix / unit_bits;
        if extra_bits != 0 {
            prefix_units += 1;
        }

        let labels: Vec<String> = self.start.reverse_dns_labels();
        let skip: usize = (total_bits / unit_bits - prefix_units) as usize;
        let mut kept: Vec<String> = labels[skip..].to_vec();
        kept.push(fam.arpa().to_string());

        if extra_bits == 0 {
            return vec![kept.join(".")];
        }

        // value of the unit split by the prefix, its free low bits are zero in `start`
        let shift: u32 = total_bits - prefix_units * unit_bits;
        let first: u32 = ((self.start.to_u128() >> shift) & ((1u128 << unit_bits) - 1)) as u32;
        let rest: String = kept[1..].join(".");

        (0..1u32 << extra_bits)
            .map(|i| match fam {
                IpFam::V4 => format!("{}.{rest}", first + i),
                IpFam::V6 => format!("{:x}.{rest}", first + i),
            })
            .collect()
    }
}

impl AddressRange for Subnet {
    fn start(&self) -> IpAddr {
        self.start
    }

    fn end(&self) -> IpAddr {
        self.end
    }

    /// `2^(width - prefix)`
    fn size(&self) -> BigUint {
        BigUint::from(1u8) << (self.family().bits() - self.prefix) as usize
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SLASH}{}", self.start.to_short_string(), self.prefix)
    }
}

impl FromStr for Subnet {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subnet::parse(s, ParseOptions::STRICT)
    }
}

impl From<IpNet> for Subnet {
    fn from(net: IpNet) -> Self {
        Self::from_parts(net.network(), net.broadcast(), net.prefix_len())
    }
}

impl TryFrom<Subnet> for IpNet {
    type Error = PrefixLenError;

    fn try_from(s: Subnet) -> Result<Self, Self::Error> {
        IpNet::new(s.start, s.prefix)
    }
}

impl Serialize for Subnet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Subnet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    const SUB_24: &str = "192.168.1.0/24";
    const SUB_30: &str = "192.168.1.5/30";
    const SUB_8: &str = "10.0.0.0/8";
    const SUB_ALL_V6: &str = "::/0";
    const SUB_6TO4: &str = "2002::/16";

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_v4() {
        let s: Subnet = SUB_24.parse().unwrap();
        assert_eq!(s.start(), ip("192.168.1.0"));
        assert_eq!(s.end(), ip("192.168.1.255"));
        assert_eq!(s.prefix(), 24);
        assert_eq!(s.size(), BigUint::from(256u32));
        assert_eq!(s.subnet_mask(), Some(Ipv4Addr::new(255, 255, 255, 0)));
        assert_eq!(s.to_string(), SUB_24);
        assert_eq!(s.to_string_long(), "192.168.001.000/24");
    }

    #[test]
    fn test_parse_host_bits_set() {
        let s: Subnet = SUB_30.parse().unwrap();
        assert_eq!(s.start(), ip("192.168.1.4"));
        assert_eq!(s.end(), ip("192.168.1.7"));
        assert_eq!(s.to_string(), "192.168.1.4/30");
        assert_eq!(s.subnet_mask(), Some(Ipv4Addr::new(255, 255, 255, 252)));
    }

    #[test]
    fn test_size() {
        let s: Subnet = SUB_8.parse().unwrap();
        assert_eq!(s.size(), BigUint::from(16777216u32));

        let all: Subnet = SUB_ALL_V6.parse().unwrap();
        assert_eq!(all.start(), ip("::"));
        assert_eq!(all.end(), ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff"));
        assert_eq!(all.size(), BigUint::from(1u8) << 128usize);
        assert_eq!(all.subnet_mask(), None);

        let host: Subnet = "1.2.3.4/32".parse().unwrap();
        assert!(host.is_host());
        assert_eq!(host.size(), BigUint::from(1u8));
    }

    #[test]
    fn test_six_to_four() {
        let s: Subnet = SUB_6TO4.parse().unwrap();
        assert_eq!(&s, Subnet::six_to_four());
        assert!(Subnet::six_to_four().contains_address(&ip("2002:c000:0204::1")));
        assert!(!Subnet::six_to_four().contains_address(&ip("2001::1")));
    }

    #[test]
    fn test_parse_rejects() {
        assert!(matches!("1.2.3.0".parse::<Subnet>(), Err(RangeError::InvalidFormat(_))));
        assert!(matches!("1.2.3.0/24/1".parse::<Subnet>(), Err(RangeError::InvalidFormat(_))));
        assert!(matches!("1.2.3.0/".parse::<Subnet>(), Err(RangeError::InvalidFormat(_))));
        assert!(matches!("1.2.3.0/x".parse::<Subnet>(), Err(RangeError::InvalidFormat(_))));
        assert!(matches!("1.2.3.0/0024000000".parse::<Subnet>(), Err(RangeError::InvalidFormat(_))));
        assert!(matches!("1.2.3/24".parse::<Subnet>(), Err(RangeError::InvalidAddress(_))));
        assert_eq!(
            "1.2.3.0/33".parse::<Subnet>(),
            Err(RangeError::PrefixOutOfRange { prefix: 33, max: 32 })
        );
        assert!("::/129".parse::<Subnet>().is_err());
        assert!("::/128".parse::<Subnet>().is_ok());
    }

    #[test]
    fn test_legacy_missing_dots() {
        let s: Subnet = Subnet::parse("10/8", ParseOptions::LEGACY).unwrap();
        assert_eq!(s.to_string(), "10.0.0.0/8");

        let s: Subnet = Subnet::parse("172.16/12", ParseOptions::LEGACY).unwrap();
        assert_eq!(s.to_string(), "172.16.0.0/12");

        // only the written octets may be covered by the prefix
        assert!(Subnet::parse("10/9", ParseOptions::LEGACY).is_err());
        assert!(Subnet::parse("0x0a.0.0.0/9", ParseOptions::LEGACY).is_ok());
        assert!(Subnet::parse("10/8", ParseOptions::STRICT).is_err());
    }

    #[test]
    fn test_reverse_dns_aligned() {
        let s: Subnet = "1.2.3.0/24".parse().unwrap();
        assert_eq!(s.reverse_dns_names(), vec!["3.2.1.in-addr.arpa"]);

        let s: Subnet = "0.0.0.0/0".parse().unwrap();
        assert_eq!(s.reverse_dns_names(), vec!["in-addr.arpa"]);

        let s: Subnet = "1.2.3.4/32".parse().unwrap();
        assert_eq!(s.reverse_dns_names(), vec!["4.3.2.1.in-addr.arpa"]);

        assert_eq!(Subnet::six_to_four().reverse_dns_names(), vec!["2.0.0.2.ip6.arpa"]);
    }

    #[test]
    fn test_reverse_dns_split_unit() {
        let s: Subnet = "1.2.3.0/28".parse().unwrap();
        let names: Vec<String> = s.reverse_dns_names();
        assert_eq!(names.len(), 16);
        assert_eq!(names[0], "0.3.2.1.in-addr.arpa");
        assert_eq!(names[15], "15.3.2.1.in-addr.arpa");

        let s: Subnet = "1.2.3.128/25".parse().unwrap();
        let names: Vec<String> = s.reverse_dns_names();
        assert_eq!(names.len(), 128);
        assert_eq!(names[0], "128.3.2.1.in-addr.arpa");
        assert_eq!(names[127], "255.3.2.1.in-addr.arpa");

        let s: Subnet = "2001:db8::/30".parse().unwrap();
        assert_eq!(
            s.reverse_dns_names(),
            vec![
                "8.b.d.0.1.0.0.2.ip6.arpa",
                "9.b.d.0.1.0.0.2.ip6.arpa",
                "a.b.d.0.1.0.0.2.ip6.arpa",
                "b.b.d.0.1.0.0.2.ip6.arpa",
            ]
        );
    }

    #[test]
    fn test_as_pattern() {
        let s: Subnet = "10.1.0.0/16".parse().unwrap();
        let p: Pattern = s.as_pattern().unwrap();
        assert_eq!(p.to_string(), "10.1.*.*");
        assert_eq!(p.to_subnet(), s);
        assert!("10.0.0.0/12".parse::<Subnet>().unwrap().as_pattern().is_none());
        assert!("2001:db8::/32".parse::<Subnet>().unwrap().as_pattern().is_some());
        assert!("2001:db8::/36".parse::<Subnet>().unwrap().as_pattern().is_none());
    }

    #[test]
    fn test_ipnet_interop() {
        let net: IpNet = "10.1.2.3/16".parse().unwrap();
        let s: Subnet = Subnet::from(net);
        assert_eq!(s.to_string(), "10.1.0.0/16");
        let back: IpNet = IpNet::try_from(s).unwrap();
        assert_eq!(back.to_string(), "10.1.0.0/16");
    }

    #[test]
    fn test_serde() {
        let s: Subnet = SUB_24.parse().unwrap();
        let json: String = serde_json::to_string(&s).unwrap();
        assert_eq!(json, format!("\"{SUB_24}\""));
        let back: Subnet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert!(serde_json::from_str::<Subnet>("\"1.2.3.4/99\"").is_err());
    }
}
