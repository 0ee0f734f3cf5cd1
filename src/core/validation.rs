//! Field-level checks shared by entity `validate()` implementations

use url::Url;

use crate::core::error::StoreError;

/// Maximum length of most name fields
pub const NAME_MAX: usize = 100;

/// Reject blank values for a required field
pub fn required(entity: &'static str, field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::validation(entity, field, "this field is required"));
    }
    Ok(())
}

/// Reject values longer than `max` characters
pub fn max_len(
    entity: &'static str,
    field: &str,
    value: &str,
    max: usize,
) -> Result<(), StoreError> {
    let len = value.chars().count();
    if len > max {
        return Err(StoreError::validation(
            entity,
            field,
            format!("ensure this value has at most {} characters (it has {})", max, len),
        ));
    }
    Ok(())
}

/// Required name of bounded length
pub fn name(entity: &'static str, field: &str, value: &str, max: usize) -> Result<(), StoreError> {
    required(entity, field, value)?;
    max_len(entity, field, value, max)
}

/// Blank is allowed; anything else must be an absolute http(s) URL
pub fn optional_url(entity: &'static str, field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    match Url::parse(value.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(StoreError::validation(entity, field, "enter a valid URL")),
    }
}

/// Blank is allowed; anything else must look like `local@domain`
pub fn optional_email(entity: &'static str, field: &str, value: &str) -> Result<(), StoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::validation(entity, field, "enter a valid email address"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank() {
        let err = required("software", "name", "   ").unwrap_err();
        assert_eq!(err.field(), Some("name"));
    }

    #[test]
    fn test_max_len_counts_chars() {
        assert!(max_len("software", "name", &"é".repeat(100), 100).is_ok());
        assert!(max_len("software", "name", &"a".repeat(101), 100).is_err());
    }

    #[test]
    fn test_optional_url() {
        assert!(optional_url("component", "repo_url", "").is_ok());
        assert!(optional_url("component", "repo_url", "https://github.com/org/repo").is_ok());
        assert!(optional_url("component", "repo_url", "not a url").is_err());
        assert!(optional_url("component", "repo_url", "ftp://files.example.com").is_err());
    }

    #[test]
    fn test_optional_email() {
        assert!(optional_email("contact", "email", "").is_ok());
        assert!(optional_email("contact", "email", "eng@example.com").is_ok());
        assert!(optional_email("contact", "email", "eng.example.com").is_err());
        assert!(optional_email("contact", "email", "a@b@c").is_err());
        assert!(optional_email("contact", "email", "@example.com").is_err());
    }
}
