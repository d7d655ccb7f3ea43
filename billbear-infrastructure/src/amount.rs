use billbear_domain::Money;
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

const CURRENCY_MARKERS: [char; 6] = ['₹', '$', '€', '£', '¥', '￥'];
const MISSING_MARKERS: [&str; 4] = ["n/a", "na", "-", "nil"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("not a number")]
    NotANumber,
    #[error("more than {scale} fractional digits")]
    TooPrecise { scale: u32 },
}

/// Parses a printed amount such as `"₹1,429.00"` into minor units at `scale`.
///
/// Blank text and the usual "not applicable" markers read as zero. A leading
/// minus sign or surrounding parentheses make the amount negative.
pub fn parse_amount(text: &str, scale: u32) -> Result<Money, AmountError> {
    let normalized = normalize_amount_text(text);
    let trimmed = normalized.trim();
    if is_missing_marker(trimmed) {
        return Ok(Money::ZERO);
    }

    let (negative, body) = match trimmed
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => (true, inner.trim()),
        None => match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim()),
            None => (false, trimmed),
        },
    };

    let digits: String = body
        .chars()
        .filter(|c| !CURRENCY_MARKERS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || digits.starts_with('-') {
        return Err(AmountError::NotANumber);
    }

    let value = Decimal::from_str(&digits)
        .or_else(|_| Decimal::from_scientific(&digits))
        .map_err(|_| AmountError::NotANumber)?;
    let value = if negative { -value } else { value };

    Money::from_decimal(value, scale).ok_or(AmountError::TooPrecise { scale })
}

/// Whether `text` is blank or one of the markers receipts print in place of a
/// figure, such as `N/A` or `-`.
pub fn is_missing_marker(text: &str) -> bool {
    let normalized = normalize_amount_text(text);
    let trimmed = normalized.trim();
    trimmed.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|marker| trimmed.eq_ignore_ascii_case(marker))
}

/// Converts a JSON number into minor units at `scale`.
pub fn amount_from_number(value: &serde_json::Number, scale: u32) -> Result<Money, AmountError> {
    parse_amount(&value.to_string(), scale)
}

fn normalize_amount_text(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32((c as u32) - ('０' as u32) + ('0' as u32)).unwrap_or(c),
            '，' => ',',
            '．' => '.',
            '－' | '−' => '-',
            '（' => '(',
            '）' => ')',
            '\u{00a0}' | '\u{202f}' => ' ',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::rupee_with_grouping("₹1,429.00", 142_900)]
    #[case::dollar("$11.5", 1150)]
    #[case::plain_integer("200", 20_000)]
    #[case::spaces(" ₹ 35.00 ", 3500)]
    #[case::not_applicable("N/A", 0)]
    #[case::empty("", 0)]
    #[case::dash("-", 0)]
    #[case::negative("-₹50.00", -5000)]
    #[case::parenthesized("(₹50.00)", -5000)]
    #[case::fullwidth("￥１，２００", 120_000)]
    #[case::scientific("1.5e2", 15_000)]
    fn parses_printed_amounts(#[case] text: &str, #[case] expected: i64) {
        assert_eq!(parse_amount(text, 2), Ok(Money::from_minor(expected)));
    }

    #[rstest]
    #[case::words("twelve", AmountError::NotANumber)]
    #[case::symbol_only("₹", AmountError::NotANumber)]
    #[case::double_minus("--5", AmountError::NotANumber)]
    #[case::too_precise("₹1.005", AmountError::TooPrecise { scale: 2 })]
    fn rejects_unreadable_amounts(#[case] text: &str, #[case] expected: AmountError) {
        assert_eq!(parse_amount(text, 2), Err(expected));
    }

    #[test]
    fn honours_scale() {
        assert_eq!(parse_amount("¥1200", 0), Ok(Money::from_minor(1200)));
        assert_eq!(
            parse_amount("1.2", 0),
            Err(AmountError::TooPrecise { scale: 0 })
        );
    }

    #[rstest]
    #[case::blank("  ", true)]
    #[case::not_applicable("n/a", true)]
    #[case::na("NA", true)]
    #[case::dash("-", true)]
    #[case::fullwidth_dash("－", true)]
    #[case::nil("Nil", true)]
    #[case::zero("0.00", false)]
    #[case::amount("₹35.00", false)]
    fn recognizes_missing_markers(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(is_missing_marker(text), expected);
    }

    #[test]
    fn accepts_json_numbers() {
        let number = serde_json::Number::from_f64(19.5).expect("finite");
        assert_eq!(amount_from_number(&number, 2), Ok(Money::from_minor(1950)));
    }
}
