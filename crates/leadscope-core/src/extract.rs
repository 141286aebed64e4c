//! Field extractors: pure functions over page text and markup.
//!
//! None of these truncate; the caller decides how many results to keep.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::UNKNOWN_INDUSTRY;

/// Technologies recognised in page text, in reporting order.
pub const TECH_VOCABULARY: &[&str] = &[
    "React",
    "Vue",
    "Angular",
    "Node.js",
    "Python",
    "Java",
    "PHP",
    "Ruby",
    "AWS",
    "Azure",
    "Google Cloud",
    "Docker",
    "Kubernetes",
    "MongoDB",
    "PostgreSQL",
    "MySQL",
    "Redis",
    "Elasticsearch",
    "Jenkins",
    "GitHub",
    "GitLab",
];

/// Industry labels, checked in order; the first hit wins.
pub const INDUSTRY_VOCABULARY: &[&str] = &[
    "fintech",
    "healthcare",
    "education",
    "e-commerce",
    "saas",
    "manufacturing",
    "consulting",
    "marketing",
    "real estate",
    "automotive",
    "retail",
    "logistics",
];

/// Words that usually introduce a list of what the company sells.
pub const SERVICE_MARKERS: &[&str] = &["services", "solutions", "products", "offerings"];

const SERVICE_SNIPPET_CHARS: usize = 200;

const EMAIL_BLOCKLIST: &[&str] = &["example.com", "yourname", "placeholder"];

// Retina assets like `logo@2x.png` look exactly like addresses.
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b([a-z0-9._%+-]+)(?:\s*@\s*|\s*\[at\]\s*|\s*\(at\)\s*|\s+at\s+)([a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,})\b",
    )
    .expect("email regex is valid")
});

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?[0-9]{1,4}[\s.-]?)?\(?[0-9]{3}\)?[\s.-]?[0-9]{3}[\s.-]?[0-9]{4}")
        .expect("phone regex is valid")
});

static EMPLOYEES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)[\s-]*employees?").expect("employee regex is valid")
});

static FOUNDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)founded\s*[:\-]?\s*([0-9]{4})").expect("founded regex is valid")
});

static SINCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)since\s*[:\-]?\s*([0-9]{4})").expect("since regex is valid")
});

static SERVICE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SERVICE_MARKERS
        .iter()
        .map(|marker| {
            Regex::new(&format!(
                "(?is){}.{{0,{SERVICE_SNIPPET_CHARS}}}",
                regex::escape(marker)
            ))
            .expect("service regex is valid")
        })
        .collect()
});

/// Email addresses, including `name at domain` and `name [at] domain`
/// spellings, normalised to lowercase `name@domain`.
///
/// Placeholder addresses are dropped and the result is deduplicated in
/// first-seen order.
pub fn extract_emails(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    EMAIL_RE
        .captures_iter(content)
        .map(|caps| format!("{}@{}", &caps[1], &caps[2]).to_lowercase())
        .filter(|email| !is_placeholder_email(email))
        .filter(|email| seen.insert(email.clone()))
        .collect()
}

fn is_placeholder_email(email: &str) -> bool {
    EMAIL_BLOCKLIST.iter().any(|b| email.contains(b))
        || ASSET_SUFFIXES.iter().any(|s| email.ends_with(s))
}

/// Phone-number-looking strings with at least ten digits, deduplicated.
pub fn extract_phones(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    PHONE_RE
        .find_iter(content)
        .map(|m| m.as_str().trim().to_string())
        .filter(|phone| digit_count(phone) >= 10)
        .filter(|phone| seen.insert(phone.clone()))
        .collect()
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

/// Vocabulary technologies mentioned anywhere in `text`.
pub fn extract_tech_stack(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TECH_VOCABULARY
        .iter()
        .filter(|tech| lower.contains(&tech.to_lowercase()))
        .map(|tech| tech.to_string())
        .collect()
}

/// First vocabulary industry mentioned in `text`, or `"Unknown"`.
pub fn extract_industry(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    INDUSTRY_VOCABULARY
        .iter()
        .copied()
        .find(|industry| lower.contains(industry))
        .unwrap_or(UNKNOWN_INDUSTRY)
}

/// The number in the first `N employees` phrase.
pub fn extract_employee_count(text: &str) -> Option<String> {
    first_capture(&EMPLOYEES_RE, text)
}

/// The year after `founded`, falling back to the year after `since`.
///
/// No range check: any four digits after the marker are taken.
pub fn extract_founded_year(text: &str) -> Option<String> {
    first_capture(&FOUNDED_RE, text).or_else(|| first_capture(&SINCE_RE, text))
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Every service marker occurrence plus up to 200 following characters,
/// grouped by marker in [`SERVICE_MARKERS`] order.
pub fn extract_services(text: &str) -> Vec<String> {
    SERVICE_RES
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| m.as_str().to_string()))
        .collect()
}
