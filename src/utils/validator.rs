use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").unwrap());
static NICKNAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]{2,20}$").unwrap());

pub const PASSWORD_REQUIREMENTS: &str =
    "Password does not meet requirements (min 8 chars, letters+numbers+special chars)";

pub fn is_valid_email(email: &str) -> bool {
    email.len() <= 255 && EMAIL.is_match(email)
}

/// At least 8 characters with a letter, a digit and a special character.
pub fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace())
}

/// 2 to 20 characters drawn from letters, digits, `_` and `-`.
pub fn is_valid_nickname(nickname: &str) -> bool {
    NICKNAME.is_match(nickname)
}

/// Absolute http(s) URL with a host.
pub fn is_valid_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}
