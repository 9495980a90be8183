//! Conversion between the chain's smallest integer unit and its display unit

use alloy_primitives::utils::format_units as format_fixed;
use alloy_primitives::U256;

use crate::application::errors::UnitsError;

/// Decimal places between wei and ether
pub const ETHER_DECIMALS: u8 = 18;

/// 10^18
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// Format an integer amount of the smallest unit as a decimal string.
///
/// Exact for the full uint256 range; trailing zeros of the fraction are
/// dropped, so `1_000_000_000_000_000_000` wei renders as `"1"` and
/// `20_000_000_000` wei as `"0.00000002"`.
pub fn format_units(value: U256, decimals: u8) -> Result<String, UnitsError> {
    if decimals == 0 {
        return Ok(value.to_string());
    }

    let fixed = format_fixed(value, decimals)
        .map_err(|e| UnitsError::Invalid(e.to_string()))?;

    Ok(fixed.trim_end_matches('0').trim_end_matches('.').to_string())
}

/// Shorthand for [`format_units`] with 18 decimals
pub fn format_ether(wei: U256) -> Result<String, UnitsError> {
    format_units(wei, ETHER_DECIMALS)
}

/// Parse a decimal display amount back into the smallest unit
pub fn parse_units(text: &str, decimals: u8) -> Result<U256, UnitsError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitsError::Invalid(text.to_string()));
    }
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(UnitsError::Invalid(text.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooPrecise {
            decimals,
            value: text.to_string(),
        });
    }

    let decimal = |digits: &str| -> Result<U256, UnitsError> {
        if digits.is_empty() {
            return Ok(U256::ZERO);
        }
        U256::from_str_radix(digits, 10).map_err(|_| UnitsError::Overflow(text.to_string()))
    };

    let padded = format!("{:0<width$}", fraction, width = decimals as usize);
    let scale = U256::from(10u64).pow(U256::from(decimals));

    decimal(whole)?
        .checked_mul(scale)
        .and_then(|w| w.checked_add(decimal(&padded).ok()?))
        .ok_or_else(|| UnitsError::Overflow(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(value: u128) -> U256 {
        U256::from(value)
    }

    #[test]
    fn test_format_whole_ether() {
        assert_eq!(format_ether(wei(WEI_PER_ETHER)).unwrap(), "1");
        assert_eq!(format_ether(U256::ZERO).unwrap(), "0");
        assert_eq!(format_ether(wei(42 * WEI_PER_ETHER)).unwrap(), "42");
        assert_eq!(format_ether(wei(100 * WEI_PER_ETHER)).unwrap(), "100");
    }

    #[test]
    fn test_format_fractional_amounts() {
        assert_eq!(format_ether(wei(20_000_000_000)).unwrap(), "0.00000002");
        assert_eq!(format_ether(wei(1)).unwrap(), "0.000000000000000001");
        assert_eq!(format_ether(wei(10)).unwrap(), "0.00000000000000001");
        assert_eq!(format_ether(wei(1_500_000_000_000_000_000)).unwrap(), "1.5");
        assert_eq!(
            format_ether(wei(123_456_789_000_000_000_001)).unwrap(),
            "123.456789000000000001"
        );
    }

    #[test]
    fn test_format_beyond_u128() {
        let value = U256::from(1u8) << 128usize;
        let formatted = format_ether(value).unwrap();
        assert_eq!(formatted, "340282366920938463463.374607431768211456");
        assert_eq!(parse_units(&formatted, ETHER_DECIMALS).unwrap(), value);
    }

    #[test]
    fn test_format_uint256_max_round_trips() {
        let formatted = format_ether(U256::MAX).unwrap();
        assert!(formatted.contains('.'));
        assert_eq!(parse_units(&formatted, ETHER_DECIMALS).unwrap(), U256::MAX);
    }

    #[test]
    fn test_round_trip_recovers_original() {
        for value in [0u128, 1, 999, 20_000_000_000, WEI_PER_ETHER, 7 * WEI_PER_ETHER + 3] {
            let text = format_ether(wei(value)).unwrap();
            assert_eq!(parse_units(&text, ETHER_DECIMALS).unwrap(), wei(value), "{}", text);
        }
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_units("", 18), Err(UnitsError::Empty)));
        assert!(matches!(parse_units(".", 18), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_units("-1", 18), Err(UnitsError::Invalid(_))));
        assert!(matches!(parse_units("1.2.3", 18), Err(UnitsError::Invalid(_))));
        assert!(matches!(
            parse_units("0.0000000000000000001", 18),
            Err(UnitsError::TooPrecise { .. })
        ));
        assert!(matches!(
            parse_units(&"9".repeat(80), 18),
            Err(UnitsError::Overflow(_))
        ));
        assert!(matches!(
            parse_units(&"9".repeat(70), 18),
            Err(UnitsError::Overflow(_))
        ));
    }

    #[test]
    fn test_format_without_decimals() {
        assert_eq!(format_units(wei(12345), 0).unwrap(), "12345");
        assert_eq!(parse_units("12345", 0).unwrap(), wei(12345));
    }
}
