use once_cell::sync::Lazy;
use regex::Regex;

pub const PAN_ERROR: &str = "Invalid PAN format. Should be ABCDE1234F.";
pub const AADHAAR_ERROR: &str = "Invalid Aadhaar. Must be 12 digits (e.g. 1234 5678 9012).";

static PAN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]{1}$").expect("PAN regex"));

static AADHAAR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[2-9][0-9]{3}\s?[0-9]{4}\s?[0-9]{4}$").expect("Aadhaar regex"));

/// Which pair of fields a confirmation check compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    BankAccount,
    Ifsc,
}

impl Confirmation {
    pub fn mismatch_message(self) -> &'static str {
        match self {
            Confirmation::BankAccount => "Bank account numbers do not match.",
            Confirmation::Ifsc => "IFSC codes do not match.",
        }
    }
}

/// Checks a PAN, returning it uppercased on success.
pub fn validate_pan(value: &str) -> Result<String, &'static str> {
    let normalized = value.to_uppercase();
    if PAN_REGEX.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(PAN_ERROR)
    }
}

/// Checks an Aadhaar number, returning the bare 12 digits on success.
pub fn validate_aadhaar(value: &str) -> Result<String, &'static str> {
    let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if AADHAAR_REGEX.is_match(value) && digits.len() == 12 {
        Ok(digits)
    } else {
        Err(AADHAAR_ERROR)
    }
}

pub fn validate_confirmation(
    kind: Confirmation,
    original: &str,
    confirmation: &str,
) -> Result<(), &'static str> {
    let equal = match kind {
        Confirmation::BankAccount => original == confirmation,
        Confirmation::Ifsc => original.to_uppercase() == confirmation.to_uppercase(),
    };

    if equal {
        Ok(())
    } else {
        Err(kind.mismatch_message())
    }
}
