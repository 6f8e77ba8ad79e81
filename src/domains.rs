/// Parsing and validation of the auto-translate domain list
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Accepts either a dotted top-level suffix (".kr") or a hostname with at
/// least two labels ("example.com"). Labels are letters, digits and inner
/// hyphens; matching is case-insensitive.
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(\.[a-z]{2,}|[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)+)$",
    )
    .expect("domain pattern compiles")
});

pub fn is_valid_domain(domain: &str) -> bool {
    DOMAIN_PATTERN.is_match(domain)
}

/// Split the comma separated field into trimmed, non-empty entries
fn split_entries(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|d| !d.is_empty())
}

/// Entries of `input` that fail validation, in input order
pub fn invalid_domains(input: &str) -> Vec<String> {
    split_entries(input)
        .filter(|domain| !is_valid_domain(domain))
        .map(str::to_string)
        .collect()
}

/// Parse the field into the list that gets persisted (keep first occurrence)
pub fn parse_domains(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    split_entries(input)
        .filter(|domain| seen.insert(*domain))
        .map(str::to_string)
        .collect()
}

/// Inline error text for the popup, `None` when the field is acceptable
pub fn validation_message(input: &str) -> Option<String> {
    let invalid = invalid_domains(input);
    if invalid.is_empty() {
        None
    } else {
        Some(format!("Invalid: {}", invalid.join(", ")))
    }
}

/// Render a stored list back into the editable field
pub fn format_domains(domains: &[String]) -> String {
    domains.join(", ")
}
