/// IFSC bank prefix → bank name.
const BANK_CODES: &[(&str, &str)] = &[
    ("HDFC", "HDFC Bank"),
    ("SBIN", "State Bank of India"),
    ("PUNB", "Punjab National Bank"),
    ("ICIC", "ICICI Bank"),
    ("AXIS", "Axis Bank"),
    ("CANA", "Canara Bank"),
    ("BARB", "Bank of Baroda"),
    ("KKBK", "Kotak Mahindra Bank"),
    ("IDIB", "Indian Bank"),
    ("UBIN", "Union Bank of India"),
    ("YESB", "Yes Bank"),
];

/// Prefixes that earn the IFSC confidence bonus.
pub const SCORED_BANK_CODES: &[&str] = &["HDFC", "SBIN", "PUNB", "ICIC", "AXIS", "CANA", "BARB"];

pub fn bank_name_for_ifsc(ifsc: &str) -> Option<&'static str> {
    let prefix = ifsc.get(..4)?.to_ascii_uppercase();
    BANK_CODES
        .iter()
        .find(|(code, _)| *code == prefix)
        .map(|(_, name)| *name)
}
