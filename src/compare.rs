// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    address::{AddressExt, IpFam},
    collapsing::parse_range,
    pattern::Pattern,
    range::PlainRange,
    subnet::Subnet,
    ParseOptions, RangeError,
};
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    net::IpAddr,
    str::FromStr,
};

/**
Operations shared by every range encoding, defined purely on the
materialized `start..=end` span. Metadata such as the prefix length or
the wildcard count never takes part in a comparison.

Ranges of different families never contain or overlap each other.
*/
pub trait AddressRange {
    /// First address of the range.
    fn start(&self) -> IpAddr;
    /// Last address of the range (inclusive).
    fn end(&self) -> IpAddr;

    fn family(&self) -> IpFam {
        self.start().family()
    }

    fn contains_address(&self, addr: &IpAddr) -> bool {
        addr.family() == self.family() && self.start() <= *addr && *addr <= self.end()
    }

    fn contains_range(&self, other: &dyn AddressRange) -> bool {
        other.family() == self.family()
            && self.start() <= other.start()
            && other.end() <= self.end()
    }

    /// True if both cover exactly the same addresses.
    fn same_span(&self, other: &dyn AddressRange) -> bool {
        self.start() == other.start() && self.end() == other.end()
    }

    fn overlaps(&self, other: &dyn AddressRange) -> bool {
        other.family() == self.family()
            && self.start() <= other.end()
            && other.start() <= self.end()
    }

    /// Sort order: start address first, end address breaks ties.
    fn cmp_span(&self, other: &dyn AddressRange) -> Ordering {
        (self.start(), self.end()).cmp(&(other.start(), other.end()))
    }

    /// Number of addresses in the range. Arbitrary precision: `::/0` holds 2^128.
    fn size(&self) -> BigUint {
        BigUint::from(self.end().to_u128() - self.start().to_u128()) + 1u32
    }

    /// The same span without any encoding metadata.
    fn to_plain(&self) -> PlainRange {
        PlainRange::from_parts(self.start(), self.end())
    }

    /**
    Returns an iterator over all [IpAddr]s in the range.

    NOTE: For large ranges (e.g., /0), this can produce a very large number of
    addresses, especially for IPv6. Use with caution. You have been warned.
    */
    fn iter(&self) -> AddressIter {
        AddressIter {
            current: Some(self.start()),
            end: self.end(),
        }
    }
}

/* ---------------------------------- */

/// Iterator over the addresses of a range, in ascending order.
pub struct AddressIter {
    current: Option<IpAddr>,
    end: IpAddr,
}

impl Iterator for AddressIter {
    type Item = IpAddr;

    fn next(&mut self) -> Option<Self::Item> {
        let ip: IpAddr = self.current?;
        self.current = match ip == self.end {
            true => None,
            false => ip.successor(),
        };
        Some(ip)
    }
}

/* -------------------------------------------------------------------------- */

/**
Any of the three range encodings.

Equality, hashing and ordering look at the span only, so a [Subnet] and a
[PlainRange] covering the same addresses compare equal.
*/
#[derive(Clone, Copy, Debug)]
pub enum IpRangeKind {
    Subnet(Subnet),
    Pattern(Pattern),
    Plain(PlainRange),
}

impl IpRangeKind {
    /// Prefix length, only for the [Subnet] variant.
    pub fn network_prefix(&self) -> Option<u8> {
        match self {
            IpRangeKind::Subnet(s) => Some(s.prefix()),
            _ => None,
        }
    }

    /// Wildcard count, only for the [Pattern] variant.
    pub fn wildcards(&self) -> Option<u8> {
        match self {
            IpRangeKind::Pattern(p) => Some(p.wildcards()),
            _ => None,
        }
    }

    pub fn as_subnet(&self) -> Option<Subnet> {
        match self {
            IpRangeKind::Subnet(s) => Some(*s),
            IpRangeKind::Pattern(p) => Some(p.to_subnet()),
            IpRangeKind::Plain(r) => r.as_subnet(),
        }
    }

    pub fn as_pattern(&self) -> Option<Pattern> {
        match self {
            IpRangeKind::Subnet(s) => s.as_pattern(),
            IpRangeKind::Pattern(p) => Some(*p),
            IpRangeKind::Plain(r) => r.as_pattern(),
        }
    }

    /// Minimal list of subnets covering the range.
    pub fn to_subnets(&self) -> Vec<Subnet> {
        match self.as_subnet() {
            Some(s) => vec![s],
            None => self.to_plain().to_subnets(),
        }
    }

    /// Zero-padded form of whichever encoding this is.
    pub fn to_string_long(&self) -> String {
        match self {
            IpRangeKind::Subnet(s) => s.to_string_long(),
            IpRangeKind::Pattern(p) => p.to_string_long(),
            IpRangeKind::Plain(r) => r.to_string_long(),
        }
    }
}

impl AddressRange for IpRangeKind {
    fn start(&self) -> IpAddr {
        match self {
            IpRangeKind::Subnet(s) => s.start(),
            IpRangeKind::Pattern(p) => p.start(),
            IpRangeKind::Plain(r) => r.start(),
        }
    }

    fn end(&self) -> IpAddr {
        match self {
            IpRangeKind::Subnet(s) => s.end(),
            IpRangeKind::Pattern(p) => p.end(),
            IpRangeKind::Plain(r) => r.end(),
        }
    }

    fn size(&self) -> BigUint {
        match self {
            IpRangeKind::Subnet(s) => s.size(),
            IpRangeKind::Pattern(p) => p.size(),
            IpRangeKind::Plain(r) => r.size(),
        }
    }
}

impl PartialEq for IpRangeKind {
    fn eq(&self, other: &Self) -> bool {
        self.same_span(other)
    }
}

impl Eq for IpRangeKind {}

impl Hash for IpRangeKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start().hash(state);
        self.end().hash(state);
    }
}

impl PartialOrd for IpRangeKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IpRangeKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_span(other)
    }
}

impl From<Subnet> for IpRangeKind {
    fn from(s: Subnet) -> Self {
        IpRangeKind::Subnet(s)
    }
}

impl From<Pattern> for IpRangeKind {
    fn from(p: Pattern) -> Self {
        IpRangeKind::Pattern(p)
    }
}

impl From<PlainRange> for IpRangeKind {
    fn from(r: PlainRange) -> Self {
        IpRangeKind::Plain(r)
    }
}

impl fmt::Display for IpRangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpRangeKind::Subnet(s) => fmt::Display::fmt(s, f),
            IpRangeKind::Pattern(p) => fmt::Display::fmt(p, f),
            IpRangeKind::Plain(r) => fmt::Display::fmt(r, f),
        }
    }
}

impl FromStr for IpRangeKind {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_range(s, ParseOptions::STRICT)
    }
}

impl Serialize for IpRangeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IpRangeKind {
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
    const PAT_24: &str = "192.168.1.*";
    const RNG_24: &str = "192.168.1.0-192.168.1.255";
    const SUB_V6: &str = "2001:db8::/126";

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_equal_across_encodings() {
        let s: IpRangeKind = SUB_24.parse().unwrap();
        let p: IpRangeKind = PAT_24.parse().unwrap();
        let r: IpRangeKind = RNG_24.parse().unwrap();
        assert!(matches!(s, IpRangeKind::Subnet(_)));
        assert!(matches!(p, IpRangeKind::Pattern(_)));
        assert!(matches!(r, IpRangeKind::Plain(_)));
        assert_eq!(s, p);
        assert_eq!(p, r);
        assert_eq!(s.network_prefix(), Some(24));
        assert_eq!(r.network_prefix(), None);
        assert_eq!(p.wildcards(), Some(1));
        assert_eq!(s.to_string(), SUB_24);
        assert_eq!(p.to_string(), PAT_24);
        assert_eq!(r.to_string(), RNG_24);
    }

    #[test]
    fn test_contains_address() {
        let s: Subnet = SUB_24.parse().unwrap();
        assert!(s.contains_address(&ip("192.168.1.0")));
        assert!(s.contains_address(&ip("192.168.1.255")));
        assert!(!s.contains_address(&ip("192.168.2.0")));
        assert!(!s.contains_address(&ip("192.168.0.255")));
        assert!(!s.contains_address(&ip("::ffff:192.168.1.1")));
    }

    #[test]
    fn test_contains_range() {
        let outer: Subnet = "10.0.0.0/8".parse().unwrap();
        let inner: PlainRange = "10.1.1.1-10.2.0.0".parse().unwrap();
        let across: PlainRange = "9.255.255.255-10.0.0.1".parse().unwrap();
        assert!(outer.contains_range(&inner));
        assert!(!inner.contains_range(&outer));
        assert!(!outer.contains_range(&across));
        assert!(outer.contains_range(&outer));

        let v6: Subnet = "::/0".parse().unwrap();
        assert!(!v6.contains_range(&outer));
    }

    #[test]
    fn test_overlaps() {
        let a: PlainRange = "10.0.0.0-10.0.0.10".parse().unwrap();
        let b: PlainRange = "10.0.0.10-10.0.0.20".parse().unwrap();
        let c: PlainRange = "10.0.0.11-10.0.0.20".parse().unwrap();
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));

        let all_v6: Subnet = "::/0".parse().unwrap();
        let all_v4: Subnet = "0.0.0.0/0".parse().unwrap();
        assert!(!all_v6.overlaps(&all_v4));
    }

    #[test]
    fn test_ordering() {
        let mut ranges: Vec<IpRangeKind> = ["10.0.0.0/8", "10.0.0.0-10.0.0.5", "::/0", "9.*.*.*"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        ranges.sort();
        let sorted: Vec<String> = ranges.iter().map(|r| r.to_string()).collect();
        assert_eq!(sorted, vec!["9.*.*.*", "10.0.0.0-10.0.0.5", "10.0.0.0/8", "::/0"]);
    }

    #[test]
    fn test_size() {
        let r: PlainRange = "10.0.0.1-10.0.0.5".parse().unwrap();
        assert_eq!(r.size(), BigUint::from(5u32));
        let all: IpRangeKind = "::/0".parse().unwrap();
        assert_eq!(all.size(), BigUint::from(1u8) << 128usize);
        let all: IpRangeKind = "::-ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff".parse().unwrap();
        assert_eq!(all.size(), BigUint::from(1u8) << 128usize);
    }

    #[test]
    fn test_iter() {
        let s: Subnet = SUB_V6.parse().unwrap();
        let ips: Vec<IpAddr> = s.iter().collect();
        assert_eq!(
            ips,
            vec![ip("2001:db8::"), ip("2001:db8::1"), ip("2001:db8::2"), ip("2001:db8::3")]
        );

        let top: PlainRange = "255.255.255.254-255.255.255.255".parse().unwrap();
        assert_eq!(top.iter().count(), 2);
    }

    #[test]
    fn test_to_subnets() {
        let r: IpRangeKind = "10.0.0.1-10.0.0.5".parse().unwrap();
        assert_eq!(r.to_subnets().len(), 3);
        let r: IpRangeKind = "10.0.0.0-10.0.0.3".parse().unwrap();
        assert_eq!(r.to_subnets(), vec!["10.0.0.0/30".parse::<Subnet>().unwrap()]);
    }

    #[test]
    fn test_serde() {
        let kinds: Vec<IpRangeKind> = serde_json::from_str(r#"["10.0.0.0/8","10.*.*.*","1.1.1.1-1.1.1.9"]"#).unwrap();
        assert_eq!(kinds[0], kinds[1]);
        assert!(matches!(kinds[2], IpRangeKind::Plain(_)));
        assert_eq!(
            serde_json::to_string(&kinds).unwrap(),
            r#"["10.0.0.0/8","10.*.*.*","1.1.1.1-1.1.1.9"]"#
        );
    }
}
