use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use super::banks::SCORED_BANK_CODES;

const CONTEXT_BEFORE: usize = 20;
const CONTEXT_AFTER: usize = 50;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("extraction pattern"))
        .collect()
}

/// Ordered account-number patterns; group 1 is the candidate.
static ACCOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        // labelled
        r"(?i)(?:account\s*(?:no|number|num|#)?\s*:?\s*)([0-9]{9,18})",
        r"(?i)(?:a/c\s*(?:no|number|num|#)?\s*:?\s*)([0-9]{9,18})",
        r"(?i)(?:acc\s*(?:no|number|num|#)?\s*:?\s*)([0-9]{9,18})",
        r"(?i)(?:acct\s*(?:no|number|num|#)?\s*:?\s*)([0-9]{9,18})",
        // bank specific
        r"(?i)(?:sbi|state\s*bank)\s*.*?([0-9]{11,17})",
        r"(?i)(?:hdfc)\s*.*?([0-9]{12,16})",
        r"(?i)(?:icici)\s*.*?([0-9]{12,16})",
        r"(?i)(?:axis)\s*.*?([0-9]{12,16})",
        r"(?i)(?:pnb|punjab\s*national)\s*.*?([0-9]{10,16})",
        r"(?i)(?:bob|bank\s*of\s*baroda)\s*.*?([0-9]{12,16})",
        r"(?i)(?:canara)\s*.*?([0-9]{12,16})",
        // generic digit runs
        r"\b([0-9]{10,18})\b",
        r"([0-9]{4}[-\s]?[0-9]{4}[-\s]?[0-9]{4,10})",
        r"([0-9]{3,4}[-\s]?[0-9]{3,4}[-\s]?[0-9]{4,8})",
        // customer id / CIF
        r"(?i)(?:customer\s*(?:id|no|number)\s*:?\s*)([0-9]{8,18})",
        r"(?i)(?:cif\s*(?:no|number)?\s*:?\s*)([0-9]{8,18})",
    ])
});

static IFSC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?i)(?:ifsc\s*(?:code|no|number)?\s*:?\s*)([A-Z]{4}[A-Z0-9]{7})",
        r"(?i)(?:ifsc\s*)([A-Z]{4}[A-Z0-9]{7})",
        r"(?i)(?:code\s*:?\s*)([A-Z]{4}[A-Z0-9]{7})",
        r"(?i)(?:hdfc|sbi|pnb|icici)\s*.*?([A-Z]{4}[A-Z0-9]{7})",
        r"\b([A-Z]{4}[A-Z0-9]{7})\b",
        r"([A-Z]{4}\s*[A-Z0-9]{7})",
    ])
});

static IFSC_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{4}[A-Z0-9]{7}$").expect("IFSC format"));

static ACCOUNT_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s\-/]").expect("account noise"));
static IFSC_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("ifsc noise"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub value: String,
    /// Index of the pattern that produced the match.
    pub pattern: usize,
    /// 0..=100
    pub confidence: u8,
    pub context: String,
}

fn clean(text: &str, noise: &Regex) -> String {
    let replaced = noise.replace_all(text, " ");
    WHITESPACE.replace_all(&replaced, " ").trim().to_string()
}

/// Text from 20 chars before to 50 chars after `start`.
fn context_at(text: &str, start: usize) -> String {
    let from = floor_boundary(text, start.saturating_sub(CONTEXT_BEFORE));
    let to = floor_boundary(text, (start + CONTEXT_AFTER).min(text.len()));
    text[from..to].to_string()
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn collect<F, S>(text: &str, patterns: &[Regex], normalize: F, score: S) -> Vec<Candidate>
where
    F: Fn(&str) -> Option<String>,
    S: Fn(&str) -> u8,
{
    let mut found = Vec::new();
    for (index, pattern) in patterns.iter().enumerate() {
        for caps in pattern.captures_iter(text) {
            let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if let Some(value) = normalize(group.as_str()) {
                found.push(Candidate {
                    confidence: score(&value),
                    value,
                    pattern: index,
                    context: context_at(text, whole.start()),
                });
            }
        }
    }
    found
}

pub fn account_candidates(raw: &str) -> Vec<Candidate> {
    let text = clean(raw, &ACCOUNT_NOISE);
    let lower = text.to_lowercase();
    let keywords = KeywordHits {
        account: lower.contains("account"),
        a_c: lower.contains("a/c"),
        acc: lower.contains("acc"),
    };

    collect(
        &text,
        &ACCOUNT_PATTERNS,
        |matched| {
            let digits: String = matched
                .chars()
                .filter(|c| *c != '-' && !c.is_whitespace())
                .collect();
            let valid =
                (9..=18).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());
            valid.then_some(digits)
        },
        |value| account_score(value, &keywords),
    )
}

pub fn ifsc_candidates(raw: &str) -> Vec<Candidate> {
    let text = clean(raw, &IFSC_NOISE);
    let lower = text.to_lowercase();
    let (has_ifsc, has_code) = (lower.contains("ifsc"), lower.contains("code"));

    collect(
        &text,
        &IFSC_PATTERNS,
        |matched| {
            let code: String = matched
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_uppercase();
            IFSC_FORMAT.is_match(&code).then_some(code)
        },
        |value| ifsc_score(value, has_ifsc, has_code),
    )
}

struct KeywordHits {
    account: bool,
    a_c: bool,
    acc: bool,
}

fn account_score(digits: &str, keywords: &KeywordHits) -> u8 {
    let mut score: u32 = 50;

    let len = digits.len();
    if (10..=16).contains(&len) {
        score += 20;
    }
    if (12..=14).contains(&len) {
        score += 10;
    }

    if keywords.account {
        score += 15;
    }
    if keywords.a_c {
        score += 15;
    }
    if keywords.acc {
        score += 10;
    }

    if !digits.bytes().all(|b| b == b'0') {
        score += 10;
    }
    if !digits.bytes().all(|b| b == b'1') {
        score += 10;
    }
    if longest_run(digits) < 5 {
        score += 10;
    }

    score.min(100) as u8
}

fn ifsc_score(code: &str, has_ifsc: bool, has_code: bool) -> u8 {
    let mut score: u32 = 50;
    if IFSC_FORMAT.is_match(code) {
        score += 30;
    }
    if has_ifsc {
        score += 20;
    }
    if has_code {
        score += 10;
    }
    if code.get(..4).is_some_and(|prefix| SCORED_BANK_CODES.contains(&prefix)) {
        score += 15;
    }
    score.min(100) as u8
}

fn longest_run(value: &str) -> usize {
    let bytes = value.as_bytes();
    let mut longest = 0;
    let mut current = 0;
    for (i, b) in bytes.iter().enumerate() {
        current = if i > 0 && bytes[i - 1] == *b { current + 1 } else { 1 };
        longest = longest.max(current);
    }
    longest
}

/// Highest confidence wins; the earliest candidate keeps a tie.
pub fn best(candidates: Vec<Candidate>) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for candidate in candidates {
        match &best {
            Some(current) if candidate.confidence <= current.confidence => {}
            _ => best = Some(candidate),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labelled_account_number_is_found_first() {
        let found = account_candidates("Account No: 123456789012\nIFSC: HDFC0001234");
        let first = &found[0];
        assert_eq!(first.value, "123456789012");
        assert_eq!(first.pattern, 0);
        assert_eq!(first.confidence, 100);
        assert!(first.context.starts_with("Account No 1234"));
    }

    #[test]
    fn grouped_digits_are_joined() {
        let found = account_candidates("Savings 1234-5678-9012");
        assert!(found.iter().any(|c| c.value == "123456789012"));
        assert!(found.iter().all(|c| c.value.len() >= 9));
    }

    #[test]
    fn short_numbers_are_ignored() {
        assert!(account_candidates("Branch 4521 Phone 22334").is_empty());
    }

    #[test]
    fn account_score_components() {
        let none = KeywordHits { account: false, a_c: false, acc: false };
        // 9 digits: base + three sanity bonuses
        assert_eq!(account_score("123456789", &none), 80);
        // 12 digits earns both length bonuses
        assert_eq!(account_score("123456789012", &none), 100);
        // a long run of one digit loses the run bonus
        assert_eq!(account_score("99999123", &none), 70);
        assert_eq!(account_score("000000000", &none), 60);

        let a_c = KeywordHits { account: false, a_c: true, acc: false };
        assert_eq!(account_score("123456789", &a_c), 95);
    }

    #[test]
    fn ifsc_is_uppercased_and_scored() {
        let found = ifsc_candidates("ifsc code: hdfc0001234");
        let top = best(found).unwrap();
        assert_eq!(top.value, "HDFC0001234");
        assert_eq!(top.confidence, 100);

        assert_eq!(ifsc_score("UTIB0000123", false, false), 80);
        assert_eq!(ifsc_score("SBIN0000123", false, false), 95);
    }

    #[test]
    fn spaced_ifsc_is_joined() {
        let found = ifsc_candidates("Branch UTIB 0000123 Pune");
        assert!(found.iter().any(|c| c.value == "UTIB0000123"));
    }

    #[test]
    fn tie_keeps_the_first_candidate() {
        let make = |value: &str, confidence| Candidate {
            value: value.into(),
            pattern: 0,
            confidence,
            context: String::new(),
        };
        let picked = best(vec![make("first", 90), make("second", 90), make("low", 10)]).unwrap();
        assert_eq!(picked.value, "first");
        assert_eq!(best(vec![make("a", 10), make("b", 20)]).unwrap().value, "b");
        assert!(best(Vec::new()).is_none());
    }

    #[test]
    fn runs_are_counted() {
        assert_eq!(longest_run("1122233334"), 4);
        assert_eq!(longest_run("5"), 1);
        assert_eq!(longest_run(""), 0);
    }

    #[test]
    fn context_respects_char_boundaries() {
        let text = "é".repeat(40);
        let ctx = context_at(&text, 41);
        assert!(!ctx.is_empty());
    }
}
