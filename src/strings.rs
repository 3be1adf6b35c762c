// Copyright (c) 2026 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

pub(crate) static DASH: &str = "-";
pub(crate) static SLASH: &str = "/";
pub(crate) static STAR: &str = "*";

pub(crate) static V4_ARPA: &str = "in-addr.arpa";
pub(crate) static V6_ARPA: &str = "ip6.arpa";

// lib.rs
pub(crate) static ERR_INVALID_FMT: &str = "invalid range format";
pub(crate) static ERR_INVALID_ADDR: &str = "invalid IP address";
pub(crate) static ERR_PREFIX_RANGE: &str = "network prefix out of range";
pub(crate) static ERR_RNG_ORDER: &str = "start IP is greater than end IP";
pub(crate) static ERR_MISMATCH: &str = "cannot mix IPv4 and IPv6 in range";

// subnet.rs
pub(crate) static ERR_CIDR_FMT: &str = "invalid CIDR format (expected exactly one slash)";
pub(crate) static ERR_CIDR_INV_PRE: &str = "invalid prefix in CIDR";

// pattern.rs
pub(crate) static ERR_PAT_FMT: &str = "wildcards must be trailing whole units";

// range.rs
pub(crate) static ERR_RNG_FMT: &str = "invalid range format (expected exactly one dash)";
