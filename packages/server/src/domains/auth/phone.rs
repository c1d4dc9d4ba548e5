//! Phone identity handling.
//!
//! Rows are keyed by the identity exactly as entered (surrounding whitespace
//! removed). The E.164 form produced here is used for message delivery only.

/// Storage key for OTP and user rows.
pub fn storage_identity(raw: &str) -> &str {
    raw.trim()
}

/// Convert a raw phone string into a delivery address.
///
/// - already `+`-prefixed: unchanged
/// - 10 digits: domestic, gets `+<country_code>`
/// - country code followed by 10 digits: gets `+`
/// - 11 digits with trunk prefix `0`: trunk digit replaced by `+<country_code>`
/// - anything else: digits prefixed with `+`
pub fn normalize_for_delivery(raw: &str, country_code: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        return trimmed.to_string();
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();

    if digits.len() == 10 {
        format!("+{}{}", country_code, digits)
    } else if digits.len() == 10 + country_code.len() && digits.starts_with(country_code) {
        format!("+{}", digits)
    } else if digits.len() == 11 && digits.starts_with('0') {
        format!("+{}{}", country_code, &digits[1..])
    } else {
        format!("+{}", digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domestic_number_gets_country_code() {
        assert_eq!(normalize_for_delivery("9876543210", "91"), "+919876543210");
        assert_eq!(normalize_for_delivery("98765 43210", "91"), "+919876543210");
        assert_eq!(normalize_for_delivery("(987) 654-3210", "91"), "+919876543210");
    }

    #[test]
    fn test_number_with_country_code_gets_plus() {
        assert_eq!(normalize_for_delivery("919876543210", "91"), "+919876543210");
    }

    #[test]
    fn test_trunk_prefix_replaced() {
        assert_eq!(normalize_for_delivery("09876543210", "91"), "+919876543210");
    }

    #[test]
    fn test_plus_prefixed_passes_through() {
        assert_eq!(normalize_for_delivery("+1 555 123 4567", "91"), "+1 555 123 4567");
        assert_eq!(normalize_for_delivery("  +447700900123 ", "91"), "+447700900123");
    }

    #[test]
    fn test_other_lengths_prefixed_verbatim() {
        assert_eq!(normalize_for_delivery("15551234567", "91"), "+15551234567");
        assert_eq!(normalize_for_delivery("12345", "91"), "+12345");
    }

    #[test]
    fn test_twelve_digits_with_foreign_prefix_not_treated_as_domestic() {
        assert_eq!(normalize_for_delivery("441234567890", "91"), "+441234567890");
    }

    #[test]
    fn test_storage_identity_only_trims() {
        assert_eq!(storage_identity("  98765 43210 \n"), "98765 43210");
    }
}
