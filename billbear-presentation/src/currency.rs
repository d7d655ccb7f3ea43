use billbear_domain::Money;
use std::fmt::Write;

/// Renders minor units as a human amount, e.g. `₹1,149.50`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: String,
    pub scale: u32,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::new("₹", 2)
    }
}

impl CurrencyFormat {
    pub fn new(symbol: impl Into<String>, scale: u32) -> Self {
        Self {
            symbol: symbol.into(),
            scale,
        }
    }

    pub fn format(&self, amount: Money) -> String {
        let units = amount.minor_units().unsigned_abs();
        let divisor = 10_u64.checked_pow(self.scale);
        let (whole, fraction) = match divisor {
            Some(divisor) => (units / divisor, units % divisor),
            // Scales this large never come out of configuration; show raw units.
            None => (units, 0),
        };

        let mut out = String::with_capacity(self.symbol.len() + 24);
        if amount.is_negative() {
            out.push('-');
        }
        out.push_str(&self.symbol);
        out.push_str(&group_thousands(whole));
        if self.scale > 0 && divisor.is_some() {
            let width = self.scale as usize;
            let _ = write!(out, ".{fraction:0width$}");
        }
        out
    }
}

/// Formats basis points as a percentage with two decimals.
pub fn format_basis_points(bps: u32) -> String {
    format!("{}.{:02}%", bps / 100, bps % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rupees("₹", 2, 114_950, "₹1,149.50")]
    #[case::small("₹", 2, 5, "₹0.05")]
    #[case::zero("$", 2, 0, "$0.00")]
    #[case::negative("₹", 2, -3000, "-₹30.00")]
    #[case::millions("€", 2, 123_456_789, "€1,234,567.89")]
    #[case::yen("¥", 0, 1_200, "¥1,200")]
    #[case::three_places("", 3, 1_500, "1.500")]
    fn formats_amounts(
        #[case] symbol: &str,
        #[case] scale: u32,
        #[case] units: i64,
        #[case] expected: &str,
    ) {
        let format = CurrencyFormat::new(symbol, scale);
        assert_eq!(format.format(Money::from_minor(units)), expected);
    }

    #[rstest]
    #[case(10_000, "100.00%")]
    #[case(7_500, "75.00%")]
    #[case(3_333, "33.33%")]
    #[case(5, "0.05%")]
    fn formats_basis_points(#[case] bps: u32, #[case] expected: &str) {
        assert_eq!(format_basis_points(bps), expected);
    }
}
