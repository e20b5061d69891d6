use serde::{Deserialize, Serialize};

use crate::error::RateError;

/// A validated request to convert an amount between two currencies.
///
/// Construction enforces the invariants (finite positive amount, 3-letter
/// alphabetic codes), so an instance that exists is always safe to send
/// upstream. Codes are normalized to uppercase.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    amount: f64,
    from_currency: String,
    to_currency: String,
}

impl ConversionRequest {
    pub fn new(
        amount: f64,
        from_currency: impl AsRef<str>,
        to_currency: impl AsRef<str>,
    ) -> Result<Self, RateError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(RateError::InvalidArgument(format!(
                "Invalid amount: must be a positive number (got {})",
                amount
            )));
        }

        Ok(Self {
            amount,
            from_currency: normalize_code(from_currency.as_ref())?,
            to_currency: normalize_code(to_currency.as_ref())?,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Source currency code, uppercase.
    pub fn from_currency(&self) -> &str {
        &self.from_currency
    }

    /// Target currency code, uppercase.
    pub fn to_currency(&self) -> &str {
        &self.to_currency
    }
}

/// The outcome of a successful rate lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub amount: f64,
    pub converted_amount: f64,
    pub rate: f64,
    pub from_currency: String,
    pub to_currency: String,
}

impl ConversionResult {
    pub fn new(request: &ConversionRequest, converted_amount: f64, rate: f64) -> Self {
        Self {
            amount: request.amount(),
            converted_amount,
            rate,
            from_currency: request.from_currency().to_string(),
            to_currency: request.to_currency().to_string(),
        }
    }
}

impl std::fmt::Display for ConversionResult {
    /// Renders the canonical result sentence, e.g.
    /// `100 USD = 92.35 EUR (Exchange Rate: 0.9235)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} = {:.2} {} (Exchange Rate: {:.4})",
            format_amount(self.amount),
            self.from_currency,
            self.converted_amount,
            self.to_currency,
            self.rate
        )
    }
}

/// Formats an amount for display and URL paths: whole numbers drop the
/// fractional part, everything else keeps its natural representation.
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{:.0}", amount)
    } else {
        format!("{}", amount)
    }
}

/// Uppercases a currency code, rejecting anything that is not exactly
/// three ASCII letters. The upstream provider remains the source of truth
/// for whether the code actually exists.
fn normalize_code(code: &str) -> Result<String, RateError> {
    let trimmed = code.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RateError::InvalidArgument(format!(
            "Invalid currency code: expected a 3-letter code (got {:?})",
            code
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: f64, from: &str, to: &str) -> ConversionRequest {
        ConversionRequest::new(amount, from, to).unwrap()
    }

    #[test]
    fn codes_are_normalized_to_uppercase() {
        let req = request(10.0, "usd", "eUr");
        assert_eq!(req.from_currency(), "USD");
        assert_eq!(req.to_currency(), "EUR");
    }

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(ConversionRequest::new(0.0, "USD", "EUR").is_err());
        assert!(ConversionRequest::new(-5.0, "USD", "EUR").is_err());
        assert!(ConversionRequest::new(f64::NAN, "USD", "EUR").is_err());
        assert!(ConversionRequest::new(f64::INFINITY, "USD", "EUR").is_err());
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(ConversionRequest::new(1.0, "", "EUR").is_err());
        assert!(ConversionRequest::new(1.0, "US", "EUR").is_err());
        assert!(ConversionRequest::new(1.0, "USDX", "EUR").is_err());
        assert!(ConversionRequest::new(1.0, "U5D", "EUR").is_err());
        assert!(ConversionRequest::new(1.0, "USD", "E U").is_err());
    }

    #[test]
    fn result_sentence_rounds_for_display() {
        let req = request(100.0, "USD", "EUR");
        let result = ConversionResult::new(&req, 92.35, 0.9235);
        assert_eq!(
            result.to_string(),
            "100 USD = 92.35 EUR (Exchange Rate: 0.9235)"
        );
    }

    #[test]
    fn result_sentence_pads_fractional_digits() {
        let req = request(2.0, "GBP", "JPY");
        let result = ConversionResult::new(&req, 380.0, 190.0);
        assert_eq!(
            result.to_string(),
            "2 GBP = 380.00 JPY (Exchange Rate: 190.0000)"
        );
    }

    #[test]
    fn fractional_amounts_keep_their_representation() {
        assert_eq!(format_amount(100.0), "100");
        assert_eq!(format_amount(250.75), "250.75");
        assert_eq!(format_amount(0.5), "0.5");
    }
}
