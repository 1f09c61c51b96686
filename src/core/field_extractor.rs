use once_cell::sync::Lazy;
use regex::Regex;

use super::models::ContactInfo;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+?1[-.\s]?)?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})").unwrap()
});
static LINKEDIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)linkedin\.com/(?:in|pub)/([a-zA-Z0-9-]+)").unwrap());
static GITHUB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)github\.com/([a-zA-Z0-9-]+)").unwrap());
static WEBSITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(https?://)?(www\.)?((?:[a-z0-9-]+\.)+[a-z]{2,})\b").unwrap()
});

const COMMON_TLDS: &[&str] = &[
    "com", "org", "net", "io", "dev", "me", "co", "ai", "app", "info", "tech", "site", "xyz",
    "edu", "us", "uk", "ca", "de", "in",
];
const PROFILE_HOSTS: &[&str] = &["linkedin.com", "github.com"];

pub fn extract_email(text: &str) -> String {
    EMAIL_RE
        .find(text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

pub fn extract_phone(text: &str) -> String {
    PHONE_RE
        .find(text)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

pub fn extract_linkedin(text: &str) -> String {
    LINKEDIN_RE
        .captures(text)
        .map(|captures| format!("linkedin.com/in/{}", &captures[1]))
        .unwrap_or_default()
}

pub fn extract_github(text: &str) -> String {
    GITHUB_RE
        .captures(text)
        .map(|captures| format!("github.com/{}", &captures[1]))
        .unwrap_or_default()
}

/// First personal-looking domain. Email hosts and profile hosts never count, and a bare
/// `name.ext` token (say "node.js") needs a common TLD to qualify.
pub fn extract_website(text: &str) -> String {
    let masked = EMAIL_RE.replace_all(text, " ");

    for captures in WEBSITE_RE.captures_iter(&masked) {
        let host = captures[3].to_ascii_lowercase();
        if PROFILE_HOSTS
            .iter()
            .any(|profile| host == *profile || host.ends_with(&format!(".{profile}")))
        {
            continue;
        }

        let prefixed = captures.get(1).is_some() || captures.get(2).is_some();
        let tld = host.rsplit('.').next().unwrap_or_default();
        if prefixed || COMMON_TLDS.contains(&tld) {
            return captures[3].to_string();
        }
    }

    String::new()
}

pub fn extract_contact(text: &str) -> ContactInfo {
    ContactInfo {
        email: extract_email(text),
        phone: extract_phone(text),
        linkedin: extract_linkedin(text),
        github: extract_github(text),
        website: extract_website(text),
    }
}
