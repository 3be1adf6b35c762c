// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    address::{int_to_ip, parse_address, AddressExt, IpFam},
    boundary::exact_prefix,
    compare::AddressRange,
    pattern::Pattern,
    strings::*,
    subnet::Subnet,
    ParseOptions, RangeError,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};
use tracing::{debug, trace};

static IP_DELIMS: &[char] = &['.', ':'];

/// Inclusive range of IP addresses (endpoints are included), no alignment required.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PlainRange {
    start: IpAddr,
    end: IpAddr,
}

impl PlainRange {
    /// Create a new [PlainRange]. Ensures that IP families match and order is correct.
    pub fn new(start: IpAddr, end: IpAddr) -> Result<Self, RangeError> {
        if start.family() != end.family() {
            return Err(RangeError::Mismatch(start, end));
        }
        if start > end {
            return Err(RangeError::RangeOrder(start, end));
        }
        Ok(Self { start, end })
    }

    /// Caller guarantees `start <= end` within one family.
    pub(crate) fn from_parts(start: IpAddr, end: IpAddr) -> Self {
        debug_assert!(start <= end && start.family() == end.family());
        Self { start, end }
    }

    /**
    Parse an IP range in the format:
    - `10.10.10.1-10.10.10.10` (full form)
    - `10.10.10.1-10` (short form, last octet; for IPv6 the last hextet in hex)

    Whitespace around either address is ignored.
    */
    pub fn parse(text: &str, opts: ParseOptions) -> Result<Self, RangeError> {
        let parts: Vec<&str> = text.split(DASH).collect();
        if parts.len() != 2 {
            debug!(range = text, "{ERR_RNG_FMT}");
            return Err(RangeError::InvalidFormat(text.to_string()));
        }

        let beg_str: &str = parts[0].trim();
        let end_str: &str = parts[1].trim();

        let start: IpAddr = parse_address(beg_str, opts)?;
        let end: IpAddr = if end_str.contains(IP_DELIMS) {
            parse_address(end_str, opts)?
        } else {
            parse_short_range_end(&start, end_str)?
        };

        Self::new(start, end)
    }

    /// The same span as a single [Subnet], if it is exactly one prefix block.
    pub fn as_subnet(&self) -> Option<Subnet> {
        let prefix: u8 = exact_prefix(&self.start.to_bytes(), &self.end.to_bytes())?;
        Some(Subnet::from_parts(self.start, self.end, prefix))
    }

    /// The same span as a [Pattern], if it is exactly one unit-aligned block.
    pub fn as_pattern(&self) -> Option<Pattern> {
        self.as_subnet()?.as_pattern()
    }

    /**
    Decompose into the minimal ordered list of aligned subnets covering
    exactly this range: no gaps, no overlaps, nothing outside it.
    */
    pub fn to_subnets(&self) -> Vec<Subnet> {
        span_to_subnets(self.family(), self.start.to_u128(), self.end.to_u128())
    }

    /// `start-end` with both addresses zero-padded.
    pub fn to_string_long(&self) -> String {
        format!("{}{DASH}{}", self.start.to_long_string(), self.end.to_long_string())
    }
}

/// Parse short-form range end (e.g., "10" in "192.168.1.1-10")
fn parse_short_range_end(start: &IpAddr, end_str: &str) -> Result<IpAddr, RangeError> {
    let invalid = || RangeError::InvalidAddress(end_str.to_string());

    match start {
        IpAddr::V4(start_v4) => {
            if end_str.is_empty() || !end_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            let last: u8 = end_str.parse().map_err(|_| invalid())?;
            let octets: [u8; 4] = start_v4.octets();
            Ok(IpAddr::V4(Ipv4Addr::new(octets[0], octets[1], octets[2], last)))
        }
        IpAddr::V6(start_v6) => {
            if end_str.is_empty() || !end_str.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let last: u16 = u16::from_str_radix(end_str, 16).map_err(|_| invalid())?;
            let mut segments: [u16; 8] = start_v6.segments();
            segments[7] = last;
            Ok(IpAddr::V6(Ipv6Addr::from(segments)))
        }
    }
}

/// All-ones in the low `host_bits` bits.
#[inline]
fn low_mask(host_bits: u32) -> u128 {
    match host_bits {
        0 => 0,
        n if n >= 128 => u128::MAX,
        n => (1u128 << n) - 1,
    }
}

/**
Decompose the inclusive integer span `beg..=end` of family `fam` into
maximal aligned blocks. Each block is the largest one that starts at the
current position and does not run past `end`.
*/
pub(crate) fn span_to_subnets(fam: IpFam, beg: u128, end: u128) -> Vec<Subnet> {
    let bits: u32 = fam.bits() as u32;
    let mut out: Vec<Subnet> = Vec::new();
    let mut cur: u128 = beg;

    loop {
        // largest block aligned at 'cur' (cur == 0 is aligned to anything)
        let align: u32 = cur.trailing_zeros().min(bits);

        // largest power-of-two block that fits in what is left
        let fit: u32 = match (end - cur).checked_add(1) {
            Some(remaining) => 127 - remaining.leading_zeros(),
            None => 128,
        };

        let host_bits: u32 = align.min(fit);
        let last: u128 = cur | low_mask(host_bits);
        let prefix: u8 = (bits - host_bits) as u8;

        trace!(block = %int_to_ip(fam, cur), prefix, "emitting block");
        out.push(Subnet::from_parts(int_to_ip(fam, cur), int_to_ip(fam, last), prefix));

        if last >= end {
            break;
        }
        cur = last + 1;
    }
    out
}

impl AddressRange for PlainRange {
    fn start(&self) -> IpAddr {
        self.start
    }

    fn end(&self) -> IpAddr {
        self.end
    }
}

impl From<Subnet> for PlainRange {
    fn from(s: Subnet) -> Self {
        s.to_plain()
    }
}

impl From<Pattern> for PlainRange {
    fn from(p: Pattern) -> Self {
        p.to_plain()
    }
}

impl fmt::Display for PlainRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{DASH}{}",
            self.start.to_short_string(),
            self.end.to_short_string()
        )
    }
}

impl FromStr for PlainRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlainRange::parse(s, ParseOptions::STRICT)
    }
}

impl Serialize for PlainRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlainRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/* -------------------------------------------------------------------------- */
