use std::fmt;

/// Money is represented as whole currency units (UGX has no minor unit in use).
pub type Amount = i64;

/// Display label used in confirmations and listings.
pub const CURRENCY: &str = "UGX";

/// Format an amount with thousands separators.
/// Example: 250000 -> "250,000", -1234 -> "-1,234"
pub fn format_amount(amount: Amount) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let digits = amount.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}

/// Format an amount with the currency label.
/// Example: 50000 -> "UGX 50,000"
pub fn format_currency(amount: Amount) -> String {
    format!("{} {}", CURRENCY, format_amount(amount))
}

/// Parse a spoken/typed amount token into whole units.
/// Digits may be grouped in threes with commas; misgrouped tokens are rejected.
/// Example: "50,000" -> 50000, "250000" -> 250000, "1,5000" -> error
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim();
    if input.chars().all(|c| c == ',') {
        return Err(ParseAmountError::Empty);
    }
    if !is_grouped(input) {
        return Err(ParseAmountError::InvalidFormat);
    }

    let digits: String = input.chars().filter(|c| *c != ',').collect();
    digits.parse().map_err(|_| ParseAmountError::OutOfRange)
}

/// `\d+(,\d{3})*`
fn is_grouped(input: &str) -> bool {
    let all_digits = |group: &str| group.chars().all(|c| c.is_ascii_digit());
    let mut groups = input.split(',');

    let leading = groups.next().unwrap_or_default();
    !leading.is_empty()
        && all_digits(leading)
        && groups.all(|group| group.len() == 3 && all_digits(group))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount has no digits"),
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::OutOfRange => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(1000), "1,000");
        assert_eq!(format_amount(50000), "50,000");
        assert_eq!(format_amount(250000), "250,000");
        assert_eq!(format_amount(1234567), "1,234,567");
        assert_eq!(format_amount(-1234), "-1,234");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(50000), "UGX 50,000");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50000"), Ok(50000));
        assert_eq!(parse_amount("50,000"), Ok(50000));
        assert_eq!(parse_amount("1,250,000"), Ok(1250000));
        assert_eq!(parse_amount(" 75 "), Ok(75));
        assert_eq!(parse_amount("0"), Ok(0));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert_eq!(parse_amount(","), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount(""), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount("12a"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("-5"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(
            parse_amount("99999999999999999999999"),
            Err(ParseAmountError::OutOfRange)
        );
    }

    #[test]
    fn test_parse_amount_rejects_misgrouped_separators() {
        assert_eq!(parse_amount("1,5000"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("1,50"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("12,34,56"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount(",500"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("500,"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("12,345,678"), Ok(12345678));
    }
}
