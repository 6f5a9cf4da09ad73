// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local address validation.

use std::str::FromStr;

use alloy::primitives::Address;

use super::error::WalletError;

/// `0x` + 40 hex characters.
pub const ADDRESS_LEN: usize = 42;

/// Validate and parse an address without touching the network.
///
/// Accepts all-lowercase and all-uppercase hex. Mixed-case input must carry
/// a valid EIP-55 checksum.
pub fn parse_address(raw: &str) -> Result<Address, WalletError> {
    let hex = raw
        .strip_prefix("0x")
        .ok_or_else(|| WalletError::InvalidAddress("Address must start with 0x".to_string()))?;

    if raw.len() != ADDRESS_LEN {
        return Err(WalletError::InvalidAddress(format!(
            "Address must be {ADDRESS_LEN} characters (0x + 40 hex), got {}",
            raw.len()
        )));
    }

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WalletError::InvalidAddress(
            "Address must contain only hex characters".to_string(),
        ));
    }

    let has_lower = hex.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = hex.chars().any(|c| c.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(raw, None)
            .map_err(|_| WalletError::InvalidAddress("Address checksum mismatch".to_string()))
    } else {
        Address::from_str(raw).map_err(|e| WalletError::InvalidAddress(e.to_string()))
    }
}
