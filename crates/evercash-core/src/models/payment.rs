use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A CSV/OFX statement uploaded to `POST /import-transactions`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        if self.file_name.to_ascii_lowercase().ends_with(".csv") {
            "text/csv"
        } else {
            "application/octet-stream"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    #[serde(default)]
    pub imported: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCredits {
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub import_credits_total: u32,
    #[serde(default)]
    pub import_credits_used: u32,
}

impl ImportCredits {
    pub fn remaining(&self) -> u32 {
        self.import_credits_total.saturating_sub(self.import_credits_used)
    }
}

/// Body of `POST /payments/razorpay/order`. `amount` is in minor units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    pub amount: i64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,
}

impl OrderRequest {
    pub fn new(amount: i64) -> Self {
        Self {
            amount,
            currency: "INR".to_string(),
            notes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// Locale signals used to pick the `x-country-code` header for orders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleHint {
    pub timezone: Option<String>,
    pub language: Option<String>,
}

impl LocaleHint {
    /// Read `TZ` and `LANG`/`LC_ALL` from the environment.
    pub fn from_env() -> Self {
        let language = std::env::var("LC_ALL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var("LANG").ok());
        Self {
            timezone: std::env::var("TZ").ok(),
            language,
        }
    }

    /// `Some("IN")` for an Indian timezone or a language tag ending in
    /// `-IN`/`_IN` (encoding suffixes such as `.UTF-8` ignored).
    pub fn country_code(&self) -> Option<&'static str> {
        let tz_match = self
            .timezone
            .as_deref()
            .is_some_and(|tz| tz.to_lowercase().contains("kolkata"));
        let lang_match = self.language.as_deref().is_some_and(|lang| {
            let tag = lang.split('.').next().unwrap_or(lang).to_lowercase();
            tag.ends_with("-in") || tag.ends_with("_in")
        });
        (tz_match || lang_match).then_some("IN")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hint(timezone: Option<&str>, language: Option<&str>) -> LocaleHint {
        LocaleHint {
            timezone: timezone.map(String::from),
            language: language.map(String::from),
        }
    }

    #[test]
    fn test_country_code_from_timezone() {
        assert_eq!(hint(Some("Asia/Kolkata"), None).country_code(), Some("IN"));
        assert_eq!(hint(Some("Europe/Berlin"), None).country_code(), None);
    }

    #[test]
    fn test_country_code_from_language() {
        assert_eq!(hint(None, Some("en-IN")).country_code(), Some("IN"));
        assert_eq!(hint(None, Some("hi_IN.UTF-8")).country_code(), Some("IN"));
        assert_eq!(hint(None, Some("en_US.UTF-8")).country_code(), None);
        assert_eq!(hint(None, Some("in")).country_code(), None);
        assert_eq!(hint(None, None).country_code(), None);
    }

    #[test]
    fn test_remaining_credits_never_underflow() {
        let credits = ImportCredits {
            is_premium: false,
            import_credits_total: 3,
            import_credits_used: 5,
        };
        assert_eq!(credits.remaining(), 0);
    }
}
