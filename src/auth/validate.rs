/// Validate a username: required, at most 100 chars, no whitespace.
pub fn validate_username(username: &str) -> Option<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Some("Username is required".to_string());
    }
    if trimmed.len() > 100 {
        return Some("Username must be at most 100 characters".to_string());
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Some("Username may not contain spaces".to_string());
    }
    None
}

/// Validate a password: min 8 chars.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.len() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

pub fn validate_password_confirmation(password: &str, confirm: &str) -> Option<String> {
    if password != confirm {
        return Some("Passwords do not match".to_string());
    }
    None
}

/// Semester labels are `FA YYYY` or `SP YYYY`; empty means "not set".
pub fn validate_semester(value: &str, field_name: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let valid = match trimmed.split_once(' ') {
        Some((term, year)) => {
            matches!(term, "FA" | "SP") && year.len() == 4 && year.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    };
    if !valid {
        return Some(format!("{field_name} must look like \"FA 2024\" or \"SP 2025\""));
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}

/// Validate an optional text field with a max length (empty is OK).
pub fn validate_optional(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    if value.trim().len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}
