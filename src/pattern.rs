// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{
    address::{parse_address, v6_compressed, AddressExt, IpFam},
    compare::AddressRange,
    strings::*,
    subnet::Subnet,
    ParseOptions, RangeError,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, net::IpAddr, str::FromStr};
use tracing::debug;

/**
Address range in wildcard notation: `10.1.*.*`, `2001:db8::*`.

The last `wildcards` units (octets for IPv4, 16-bit groups for IPv6) take
any value. Every pattern is a prefix-aligned block, so it always converts
to a [Subnet].
*/
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Pattern {
    start: IpAddr,
    end: IpAddr,
    wildcards: u8,
}

impl Pattern {
    /// Pattern of `addr` with its last `wildcards` units replaced by `*`.
    pub fn new(addr: IpAddr, wildcards: u8) -> Result<Self, RangeError> {
        let fam: IpFam = addr.family();
        if wildcards > fam.unit_count() {
            return Err(RangeError::InvalidFormat(format!("{addr} ({wildcards} wildcards)")));
        }
        let subnet: Subnet = Subnet::new(addr, fam.bits() - wildcards * fam.unit_bits())?;
        Ok(Self {
            start: subnet.start(),
            end: subnet.end(),
            wildcards,
        })
    }

    /// `None` unless the prefix ends on a unit boundary.
    pub fn from_subnet(subnet: &Subnet) -> Option<Self> {
        let fam: IpFam = subnet.family();
        if subnet.prefix() % fam.unit_bits() != 0 {
            return None;
        }
        Some(Self {
            start: subnet.start(),
            end: subnet.end(),
            wildcards: fam.unit_count() - subnet.prefix() / fam.unit_bits(),
        })
    }

    /**
    Parse a wildcard pattern.

    IPv4 needs all four octets (`10.*.*.*`); IPv6 may use `::` compression
    (`2001:db8::*`). Only whole trailing units may be `*`.
    */
    pub fn parse(text: &str, opts: ParseOptions) -> Result<Self, RangeError> {
        let sep: char = if text.contains(':') { ':' } else { '.' };
        let mut parts: Vec<&str> = text.split(sep).collect();

        if sep == '.' && parts.len() != 4 {
            debug!(pattern = text, "{ERR_PAT_FMT}");
            return Err(RangeError::InvalidFormat(text.to_string()));
        }

        let wildcards: usize = parts.iter().rev().take_while(|p| **p == STAR).count();
        let split: usize = parts.len() - wildcards;
        let (fixed, wild) = parts.split_at_mut(split);
        if fixed.iter().any(|p| p.contains(STAR)) {
            debug!(pattern = text, "{ERR_PAT_FMT}");
            return Err(RangeError::InvalidFormat(text.to_string()));
        }
        for p in wild.iter_mut() {
            *p = "0";
        }

        let addr: IpAddr = parse_address(&parts.join(&sep.to_string()), opts)?;
        let wildcards: u8 = u8::try_from(wildcards)
            .map_err(|_| RangeError::InvalidFormat(text.to_string()))?;
        Self::new(addr, wildcards)
    }

    /// Number of trailing wildcard units.
    pub fn wildcards(&self) -> u8 {
        self.wildcards
    }

    /// Always defined: a pattern is a prefix-aligned block.
    pub fn to_subnet(&self) -> Subnet {
        let fam: IpFam = self.family();
        Subnet::from_parts(
            self.start,
            self.end,
            fam.bits() - self.wildcards * fam.unit_bits(),
        )
    }

    /// Pattern with the fixed units zero-padded.
    pub fn to_string_long(&self) -> String {
        let sep: &str = match self.family() {
            IpFam::V4 => ".",
            IpFam::V6 => ":",
        };
        let long: String = self.start.to_long_string();
        let units: Vec<&str> = long.split(sep).collect();
        let fixed: usize = units.len() - self.wildcards as usize;

        units
            .iter()
            .enumerate()
            .map(|(i, u)| if i < fixed { *u } else { STAR })
            .collect::<Vec<&str>>()
            .join(sep)
    }
}

impl AddressRange for Pattern {
    fn start(&self) -> IpAddr {
        self.start
    }

    fn end(&self) -> IpAddr {
        self.end
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            IpAddr::V4(a) => {
                let fixed: usize = 4 - self.wildcards as usize;
                let units: Vec<String> = a
                    .octets()
                    .iter()
                    .enumerate()
                    .map(|(i, o)| if i < fixed { o.to_string() } else { STAR.to_string() })
                    .collect();
                write!(f, "{}", units.join("."))
            }
            IpAddr::V6(a) => {
                write!(f, "{}", v6_compressed(&a.segments(), self.wildcards as usize))
            }
        }
    }
}

impl FromStr for Pattern {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s, ParseOptions::STRICT)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s: String = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/* -------------------------------------------------------------------------- */
