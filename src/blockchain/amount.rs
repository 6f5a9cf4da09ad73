// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between display amounts and smallest units.
//!
//! Display amounts are decimal strings (`"30"`, `"1.5"`, `"2.5e-3"`).
//! Smallest units are `display × 10^decimals` as an unsigned 256-bit
//! integer. Parsing never rounds: digits below the smallest unit are an
//! error, and formatting always prints the exact value, so a parsed amount
//! formats back to the same number.

use alloy::primitives::U256;

use super::error::WalletError;

/// Largest power of ten that fits in a U256.
const MAX_POW10: i64 = 77;

/// Parse a human-readable amount to smallest units.
///
/// # Errors
/// * `InvalidAmount` - malformed, negative, zero, or too large
/// * `PrecisionLoss` - non-zero digits below the smallest unit
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, WalletError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(WalletError::InvalidAmount("Amount is empty".to_string()));
    }
    if amount.starts_with('-') {
        return Err(WalletError::InvalidAmount(
            "Amount must be greater than zero".to_string(),
        ));
    }
    let amount = amount.strip_prefix('+').unwrap_or(amount);

    let (mantissa, exponent) = match amount.split_once(['e', 'E']) {
        Some((m, e)) => {
            let exp = e
                .parse::<i32>()
                .map_err(|_| WalletError::InvalidAmount(format!("Invalid exponent: {e}")))?;
            (m, i64::from(exp))
        }
        None => (amount, 0),
    };

    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(WalletError::InvalidAmount(format!(
            "Invalid amount format: {amount}"
        )));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(WalletError::InvalidAmount(format!(
            "Invalid amount format: {amount}"
        )));
    }

    // value = digits × 10^scale
    let mut digits = format!("{whole}{fraction}");
    let mut scale = i64::from(decimals) + exponent - fraction.len() as i64;

    if scale < 0 {
        let drop = usize::try_from(-scale).unwrap_or(usize::MAX).min(digits.len());
        let dropped = digits.split_off(digits.len() - drop);
        if dropped.bytes().any(|b| b != b'0') {
            return Err(WalletError::PrecisionLoss(format!(
                "{amount} has more than {decimals} decimal places"
            )));
        }
        scale = 0;
    }

    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Err(WalletError::InvalidAmount(
            "Amount must be greater than zero".to_string(),
        ));
    }

    let overflow = || WalletError::InvalidAmount("Amount overflow".to_string());
    if scale > MAX_POW10 {
        return Err(overflow());
    }

    let base = U256::from_str_radix(significant, 10).map_err(|_| overflow())?;
    let multiplier = U256::from(10u64)
        .checked_pow(U256::from(scale as u64))
        .ok_or_else(overflow)?;

    base.checked_mul(multiplier).ok_or_else(overflow)
}

/// Format smallest units to a human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_SPX: u64 = 1_000_000_000_000_000_000;

    #[test]
    fn test_parse_amount_whole() {
        let result = parse_amount("1", 18).unwrap();
        assert_eq!(result, U256::from(ONE_SPX));
    }

    #[test]
    fn test_parse_amount_decimal() {
        let result = parse_amount("1.5", 18).unwrap();
        assert_eq!(result, U256::from(1_500_000_000_000_000_000u64));

        assert_eq!(parse_amount(".5", 18).unwrap(), U256::from(ONE_SPX / 2));
        assert_eq!(parse_amount("5.", 18).unwrap(), U256::from(5 * ONE_SPX));
    }

    #[test]
    fn test_parse_amount_six_decimals() {
        let result = parse_amount("1.5", 6).unwrap();
        assert_eq!(result, U256::from(1_500_000u64));
    }

    #[test]
    fn test_parse_amount_exponent() {
        assert_eq!(
            parse_amount("3e1", 18).unwrap(),
            U256::from(30u64) * U256::from(ONE_SPX)
        );
        assert_eq!(
            parse_amount("2.5E-3", 18).unwrap(),
            U256::from(2_500_000_000_000_000u64)
        );
        assert_eq!(parse_amount("1e-18", 18).unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_parse_amount_smallest_unit() {
        assert_eq!(
            parse_amount("0.000000000000000001", 18).unwrap(),
            U256::from(1u64)
        );
    }

    #[test]
    fn test_parse_amount_trailing_zeros_below_unit_are_exact() {
        assert_eq!(
            parse_amount("1.0000000000000000000000", 18).unwrap(),
            U256::from(ONE_SPX)
        );
    }

    #[test]
    fn test_parse_amount_precision_loss() {
        assert!(matches!(
            parse_amount("0.0000000000000000001", 18),
            Err(WalletError::PrecisionLoss(_))
        ));
        assert!(matches!(
            parse_amount("1.2345678", 6),
            Err(WalletError::PrecisionLoss(_))
        ));
        assert!(matches!(
            parse_amount("1e-19", 18),
            Err(WalletError::PrecisionLoss(_))
        ));
    }

    #[test]
    fn test_parse_amount_rejects_non_positive() {
        for raw in ["0", "0.0", "-1", "-0.5", "0e5", "0.000000000000000000000"] {
            assert!(
                matches!(parse_amount(raw, 18), Err(WalletError::InvalidAmount(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_amount_rejects_malformed() {
        for raw in ["", " ", ".", "abc", "1.2.3", "1,5", "0x10", "1e", "1e1.5", "--1"] {
            assert!(
                matches!(parse_amount(raw, 18), Err(WalletError::InvalidAmount(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_amount_overflow() {
        assert!(matches!(
            parse_amount("1e80", 18),
            Err(WalletError::InvalidAmount(_))
        ));
        let huge = "9".repeat(80);
        assert!(matches!(
            parse_amount(&huge, 0),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_format_amount() {
        let one = U256::from(ONE_SPX);
        assert_eq!(format_amount(one, 18), "1");

        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_amount(one_and_half, 18), "1.5");

        assert_eq!(format_amount(U256::from(1u64), 18), "0.000000000000000001");
        assert_eq!(format_amount(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_format_amount_six_decimals() {
        let one = U256::from(1_000_000u64);
        assert_eq!(format_amount(one, 6), "1");

        let one_and_half = U256::from(1_500_000u64);
        assert_eq!(format_amount(one_and_half, 6), "1.5");
    }

    #[test]
    fn display_amounts_survive_conversion() {
        for raw in ["30", "70", "0.01", "1.5", "123456.789012345678901234", "0.000000000000000001"] {
            let decimals = 24;
            let units = parse_amount(raw, decimals).unwrap();
            assert_eq!(format_amount(units, decimals), raw);
        }
    }
}
