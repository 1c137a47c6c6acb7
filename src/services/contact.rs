//! Contact form validation, sanitization and spam screening.

use crate::models::{ContactMessage, ContactRequest};

pub const NAME_LENGTH: (usize, usize) = (2, 100);
pub const MESSAGE_LENGTH: (usize, usize) = (10, 1000);

const SPAM_KEYWORDS: &[&str] = &["viagra", "cialis", "lottery", "winner", "click here"];

/// Trims the input and strips angle brackets
pub fn sanitize(input: &str) -> String {
    input.trim().replace(['<', '>'], "")
}

/// Accepts `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Needs a dot with at least one character on each side
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

fn length_within(value: &str, (min, max): (usize, usize)) -> bool {
    let len = value.chars().count();
    len >= min && len <= max
}

/// Validates a raw request, returning the sanitized message or the
/// user-facing reason for rejection
pub fn validate(request: &ContactRequest) -> Result<ContactMessage, &'static str> {
    let (Some(name), Some(email), Some(message)) = (
        present(&request.name),
        present(&request.email),
        present(&request.message),
    ) else {
        return Err("All fields are required");
    };

    let name = sanitize(name);
    let email = sanitize(email);
    let message = sanitize(message);

    if !is_valid_email(&email) {
        return Err("Invalid email address");
    }
    if !length_within(&name, NAME_LENGTH) {
        return Err("Name must be 2-100 characters");
    }
    if !length_within(&message, MESSAGE_LENGTH) {
        return Err("Message must be 10-1000 characters");
    }

    Ok(ContactMessage {
        name,
        email,
        message,
    })
}

fn contains_spam(text: &str) -> bool {
    let lower = text.to_lowercase();
    SPAM_KEYWORDS.iter().any(|kw| lower.contains(kw)) || text.contains("$$$")
}

/// True if the name or message matches a known spam pattern
pub fn looks_like_spam(message: &ContactMessage) -> bool {
    contains_spam(&message.name) || contains_spam(&message.message)
}
