//! Validation Utilities

use validator::ValidationErrors;

use super::error::FieldError;

/// Maximum accepted email length, matching the registration form rules.
pub const MAX_EMAIL_LENGTH: usize = 50;

/// Lightweight email format check used before hitting the API.
///
/// Intentionally forgiving: one `@` with a non-empty local part and a
/// domain containing a dot. The server remains the authority.
pub fn is_valid_email_format(email: &str) -> bool {
    let s = email.trim();
    if s.is_empty() || s.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    let Some(at) = s.find('@') else {
        return false;
    };
    let (local, domain) = (&s[..at], &s[at + 1..]);
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if local.contains(char::is_whitespace) || domain.contains(char::is_whitespace) {
        return false;
    }
    match domain.find('.') {
        Some(dot) => dot > 0 && dot < domain.len() - 1 && !domain.contains('@'),
        None => false,
    }
}

/// Mask an email for display: two leading characters of the local part,
/// a fixed number of stars (never reflecting the real length), and the
/// untouched domain. Returns `None` when the input is not `local@domain`.
pub fn mask_email_fixed(email: &str) -> Option<String> {
    const STAR_COUNT: usize = 6;

    let mut parts = email.split('@');
    let local = parts.next()?;
    let domain = parts.next()?;
    if local.is_empty() || domain.is_empty() || parts.next().is_some() {
        return None;
    }

    // Pad short local parts so the prefix is always two characters.
    let padded: String = format!("{local}**");
    let prefix: String = padded.chars().take(2).collect();
    Some(format!("{}{}@{}", prefix, "*".repeat(STAR_COUNT), domain))
}

/// Flatten `validator` derive output into field errors.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "invalid value".into()),
            })
        })
        .collect()
}
