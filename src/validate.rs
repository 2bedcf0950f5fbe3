use crate::{
    error::{ApiError, FieldErrors},
    models::{CreateContentRequest, RegisterRequest, UpdateContentRequest},
    upload,
};

// Field length limits for content records, matching the column definitions.
pub const TITLE_MAX: usize = 30;
pub const BODY_MAX: usize = 300;
pub const SUMMARY_MAX: usize = 60;
pub const CATEGORIES_MAX: usize = 100;

/// The fixed punctuation set a password must draw at least one symbol from.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:'\",.<>/?\\|`~";

/// normalize_email
///
/// Emails are the unique natural key, so every lookup and every store goes
/// through the same normalization: trim and lowercase.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// push_error
///
/// Appends one message to a field's error list, creating the list on first use.
fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

/// password_errors
///
/// Checks the password policy: at least 8 characters with at least one
/// uppercase letter, one lowercase letter, one digit, and one symbol from
/// [`PASSWORD_SYMBOLS`]. Returns every violated rule, not just the first,
/// so clients can show the full checklist at once.
pub fn password_errors(password: &str) -> Vec<String> {
    let mut messages = Vec::new();

    if password.chars().count() < 8 {
        messages.push("Password must be at least 8 characters long.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        messages.push("Password must contain at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        messages.push("Password must contain at least one lowercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        messages.push("Password must contain at least one digit.".to_string());
    }
    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        messages.push("Password must contain at least one special character.".to_string());
    }

    messages
}

/// exact_digits
///
/// True when `value` is exactly `len` ASCII digits. Used for phone (10) and
/// pincode (6).
fn exact_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

/// plausible_email
///
/// A light structural check: one '@' with a non-empty local part and a domain
/// containing a dot. Real verification belongs to a mail round-trip, not here.
fn plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

/// validate_registration
///
/// Applies every field rule of the registration contract and collects all
/// violations into one per-field error map, so a single response reports
/// everything wrong with the submission.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();

    let email = normalize_email(&req.email);
    if email.is_empty() {
        push_error(&mut errors, "email", "This field is required.");
    } else if !plausible_email(&email) {
        push_error(&mut errors, "email", "Enter a valid email address.");
    }

    // Full name must contain at least two whitespace-separated tokens.
    if req.full_name.split_whitespace().count() < 2 {
        push_error(
            &mut errors,
            "full_name",
            "Full name must contain at least a first and last name.",
        );
    }

    if !exact_digits(&req.phone, 10) {
        push_error(&mut errors, "phone", "Phone number must be exactly 10 digits.");
    }

    if !exact_digits(&req.pincode, 6) {
        push_error(&mut errors, "pincode", "Pincode must be exactly 6 digits.");
    }

    for message in password_errors(&req.password) {
        push_error(&mut errors, "password", &message);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// check_length
///
/// Records an error when `value` is empty (for required fields) or longer
/// than `max` characters.
fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max: usize, required: bool) {
    if required && value.trim().is_empty() {
        push_error(errors, field, "This field is required.");
        return;
    }
    if value.chars().count() > max {
        push_error(
            errors,
            field,
            &format!("Ensure this field has no more than {max} characters."),
        );
    }
}

/// check_document
///
/// Runs the attached document key through the upload gate. The gate is the
/// single place that knows what an acceptable attachment looks like; this
/// merely translates a rejection into a field error.
fn check_document(errors: &mut FieldErrors, document: Option<&str>) {
    if let Some(name) = document {
        if upload::accept(name).is_err() {
            push_error(errors, "document", "Only PDF files are allowed.");
        }
    }
}

/// validate_new_content
///
/// Full validation for content creation: all four text fields required and
/// length-bounded, optional document gated to PDF.
pub fn validate_new_content(req: &CreateContentRequest) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();

    check_length(&mut errors, "title", &req.title, TITLE_MAX, true);
    check_length(&mut errors, "body", &req.body, BODY_MAX, true);
    check_length(&mut errors, "summary", &req.summary, SUMMARY_MAX, true);
    check_length(&mut errors, "categories", &req.categories, CATEGORIES_MAX, true);
    check_document(&mut errors, req.document.as_deref());

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// validate_content_update
///
/// Partial-update validation: only supplied fields are checked, and none is
/// required (absent means "keep the prior value").
pub fn validate_content_update(req: &UpdateContentRequest) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();

    if let Some(title) = &req.title {
        check_length(&mut errors, "title", title, TITLE_MAX, true);
    }
    if let Some(body) = &req.body {
        check_length(&mut errors, "body", body, BODY_MAX, true);
    }
    if let Some(summary) = &req.summary {
        check_length(&mut errors, "summary", summary, SUMMARY_MAX, true);
    }
    if let Some(categories) = &req.categories {
        check_length(&mut errors, "categories", categories, CATEGORIES_MAX, true);
    }
    check_document(&mut errors, req.document.as_deref());

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}
