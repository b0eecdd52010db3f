use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::error::FetchError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scale of the published rates: "68000" means 680.00 per 100 units.
const RATE_SCALE: Decimal = Decimal::ONE_HUNDRED;

/// Digits after the decimal point when a rate is written out.
const OUTPUT_DP: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRateRecord {
    pub currency_code: String,
    pub buying_rate: Decimal,
    pub cash_buying_rate: Decimal,
    pub selling_rate: Decimal,
    pub cash_selling_rate: Decimal,
    pub middle_rate: Decimal,
    /// Publication time exactly as the source printed it.
    pub published_at: String,
    pub captured_at: NaiveDateTime,
}

impl ExchangeRateRecord {
    pub fn rates(&self) -> [Decimal; 5] {
        [
            self.buying_rate,
            self.cash_buying_rate,
            self.selling_rate,
            self.cash_selling_rate,
            self.middle_rate,
        ]
    }

    pub fn captured_at_text(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Parses a raw rate cell and removes the x100 scaling.
///
/// Empty text counts as zero. The value is not range checked. `column` only feeds the error message.
pub fn parse_scaled_rate(raw: &str, column: usize) -> Result<Decimal, FetchError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let invalid = || FetchError::InvalidRate {
        column,
        value: text.to_string(),
    };

    let value = Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| invalid())?;

    Ok(value / RATE_SCALE)
}

/// Fixed-point text with exactly four fractional digits.
pub fn format_rate(rate: Decimal) -> String {
    let mut rounded = rate.round_dp(OUTPUT_DP);
    rounded.rescale(OUTPUT_DP);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_scaling() {
        assert_eq!(parse_scaled_rate("68000", 1).unwrap(), Decimal::new(680, 0));
        assert_eq!(parse_scaled_rate("680", 1).unwrap(), Decimal::new(680, 2));
        assert_eq!(parse_scaled_rate(" 68150 ", 5).unwrap(), Decimal::new(68150, 2));
        assert_eq!(parse_scaled_rate("712.35", 3).unwrap(), Decimal::new(71235, 4));
    }

    #[test]
    fn empty_cell_is_zero() {
        assert_eq!(parse_scaled_rate("", 2).unwrap(), Decimal::ZERO);
        assert_eq!(parse_scaled_rate("   ", 2).unwrap(), Decimal::ZERO);
        assert_eq!(format_rate(parse_scaled_rate("", 2).unwrap()), "0.0000");
    }

    #[test]
    fn accepts_scientific_notation() {
        assert_eq!(parse_scaled_rate("6.8e4", 1).unwrap(), Decimal::new(680, 0));
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_scaled_rate("n/a", 4).unwrap_err();
        assert!(matches!(err, FetchError::InvalidRate { column: 4, ref value } if value == "n/a"));
    }

    #[test]
    fn negative_cell_is_not_range_checked() {
        assert_eq!(parse_scaled_rate("-100", 1).unwrap(), Decimal::new(-1, 0));
        assert_eq!(format_rate(parse_scaled_rate("-100", 1).unwrap()), "-1.0000");
    }

    #[test]
    fn formats_with_four_digits() {
        assert_eq!(format_rate(Decimal::new(680, 0)), "680.0000");
        assert_eq!(format_rate(Decimal::new(68150, 2)), "681.5000");
        assert_eq!(format_rate(Decimal::new(1234567, 6)), "1.2346");
        assert_eq!(format_rate(Decimal::ZERO), "0.0000");
    }

    #[test]
    fn formatting_is_stable() {
        let once = format_rate(Decimal::new(7123456789, 7));
        let twice = format_rate(Decimal::from_str(&once).unwrap());
        assert_eq!(once, twice);
    }
}
