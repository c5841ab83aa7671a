use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9-]+").unwrap());
static REPEATED_HYPHENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Lowercase, hyphen-separated ASCII form of `input`.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase().replace([' ', '_'], "-");
    let stripped = NON_SLUG_CHARS.replace_all(&lowered, "");
    let collapsed = REPEATED_HYPHENS.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}
