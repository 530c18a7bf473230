//! Client-side form checks. Everything here runs before a request is built;
//! a failed check means no network call is made.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;
use url::Url;

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MIN_NEW_BLOG_DESCRIPTION_CHARS: usize = 50;
pub const MAX_EXCERPT_CHARS: usize = 160;
pub const MAX_TAGS: usize = 5;
pub const EDIT_TITLE_CHARS: std::ops::RangeInclusive<usize> = 5..=100;
pub const EDIT_DESCRIPTION_CHARS: std::ops::RangeInclusive<usize> = 20..=5000;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg", "bmp", "avif"];

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

/// Field name to message, in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Keeps the first message recorded for a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, message)| (*field, message.as_str()))
    }

    /// One message for a notification: the field message when only one field
    /// failed, a generic prompt otherwise.
    pub fn summary(&self) -> String {
        match self.fields.values().next() {
            Some(message) if self.fields.len() == 1 => message.clone(),
            _ => "Please fix the errors before submitting".to_string(),
        }
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// An `http(s)` URL whose path, if it carries an extension, names an image
/// format. Inline `data:image/` URLs are accepted separately.
pub fn is_valid_image_url(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.starts_with("data:image/") {
        return true;
    }
    let Ok(url) = Url::parse(raw) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return false;
    }
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    match last_segment.rsplit_once('.') {
        Some((_, extension)) => IMAGE_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(extension)),
        None => true,
    }
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    if email.is_empty() {
        errors.add("email", "Email is required");
    }
    if password.is_empty() {
        errors.add("password", "Password is required");
    }
    errors.into_result()
}

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if username.trim().is_empty() {
        errors.add("name", "Name is required");
    } else if char_len(username) < MIN_USERNAME_CHARS {
        errors.add("name", "Name must be at least 3 characters");
    }

    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !is_valid_email(email) {
        errors.add("email", "Email is invalid");
    }

    if password.is_empty() {
        errors.add("password", "Password is required");
    } else if char_len(password) < MIN_PASSWORD_CHARS {
        errors.add("password", "Password must be at least 6 characters");
    }

    errors.into_result()
}

/// Returns the trimmed comment text.
pub fn validate_comment(text: &str) -> Result<&str, ValidationErrors> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationErrors::single("comment", "Comment cannot be empty"));
    }
    Ok(trimmed)
}

pub fn validate_profile(full_name: &str) -> Result<(), ValidationErrors> {
    if full_name.trim().is_empty() {
        return Err(ValidationErrors::single("fullName", "Full name is required"));
    }
    Ok(())
}

fn check_image(errors: &mut ValidationErrors, image: &str) {
    if image.trim().is_empty() {
        errors.add("image", "Image URL is required");
    } else if !is_valid_image_url(image) {
        errors.add("image", "Please enter a valid image URL or upload an image");
    }
}

pub fn validate_new_blog(
    title: &str,
    description: &str,
    image: &str,
    excerpt: Option<&str>,
    tags: &[String],
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if title.trim().is_empty() {
        errors.add("title", "Title is required");
    }

    if description.trim().is_empty() {
        errors.add("description", "Content is required");
    } else if char_len(description) < MIN_NEW_BLOG_DESCRIPTION_CHARS {
        errors.add("description", "Content must be at least 50 characters");
    }

    if excerpt.is_some_and(|excerpt| char_len(excerpt) > MAX_EXCERPT_CHARS) {
        errors.add("excerpt", "Excerpt must be less than 160 characters");
    }

    check_image(&mut errors, image);

    if tags.is_empty() {
        errors.add("tags", "Add at least one tag");
    } else if tags.len() > MAX_TAGS {
        errors.add("tags", "Maximum 5 tags allowed");
    }

    errors.into_result()
}

pub fn validate_blog_edit(
    title: &str,
    description: &str,
    image: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title_len = char_len(title);
    if title.trim().is_empty() {
        errors.add("title", "Title is required");
    } else if title_len < *EDIT_TITLE_CHARS.start() {
        errors.add("title", "Title must be at least 5 characters");
    } else if title_len > *EDIT_TITLE_CHARS.end() {
        errors.add("title", "Title must be less than 100 characters");
    }

    let description_len = char_len(description);
    if description.trim().is_empty() {
        errors.add("description", "Description is required");
    } else if description_len < *EDIT_DESCRIPTION_CHARS.start() {
        errors.add("description", "Description must be at least 20 characters");
    } else if description_len > *EDIT_DESCRIPTION_CHARS.end() {
        errors.add("description", "Description must be less than 5000 characters");
    }

    check_image(&mut errors, image);

    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_comment_is_rejected() {
        let err = validate_comment(" \n\t ").expect_err("blank");
        assert_eq!(err.get("comment"), Some("Comment cannot be empty"));
        assert_eq!(validate_comment("  nice post ").expect("valid"), "nice post");
    }

    #[test]
    fn registration_reports_every_field() {
        let err = validate_registration("ab", "not-an-email", "123").expect_err("invalid");
        assert_eq!(err.len(), 3);
        assert_eq!(err.get("name"), Some("Name must be at least 3 characters"));
        assert_eq!(err.get("email"), Some("Email is invalid"));
        assert_eq!(
            err.get("password"),
            Some("Password must be at least 6 characters")
        );
        assert_eq!(err.summary(), "Please fix the errors before submitting");

        validate_registration("alice", "alice@example.com", "secret1").expect("valid");
    }

    #[test]
    fn login_requires_both_fields() {
        let err = validate_login("", "pw").expect_err("missing email");
        assert_eq!(err.summary(), "Email is required");
        validate_login("a@b.c", "pw").expect("valid");
    }

    #[test]
    fn image_urls() {
        assert!(is_valid_image_url("https://cdn.example.com/a/b.PNG"));
        assert!(is_valid_image_url("https://images.example.com/photo-123?w=800"));
        assert!(is_valid_image_url("data:image/png;base64,AAAA"));
        assert!(!is_valid_image_url("https://example.com/file.pdf"));
        assert!(!is_valid_image_url("ftp://example.com/a.png"));
        assert!(!is_valid_image_url("not a url"));
    }

    #[test]
    fn new_blog_rules() {
        let short = "too short";
        let err = validate_new_blog("", short, "", Some(&"x".repeat(161)), &[]).expect_err("invalid");
        assert_eq!(err.get("title"), Some("Title is required"));
        assert_eq!(
            err.get("description"),
            Some("Content must be at least 50 characters")
        );
        assert_eq!(
            err.get("excerpt"),
            Some("Excerpt must be less than 160 characters")
        );
        assert_eq!(err.get("image"), Some("Image URL is required"));
        assert_eq!(err.get("tags"), Some("Add at least one tag"));

        let tags: Vec<String> = (0..6).map(|i| format!("t{i}")).collect();
        let err = validate_new_blog(
            "Title",
            &"d".repeat(50),
            "https://example.com/a.jpg",
            None,
            &tags,
        )
        .expect_err("too many tags");
        assert_eq!(err.len(), 1);
        assert_eq!(err.get("tags"), Some("Maximum 5 tags allowed"));
    }

    #[test]
    fn blog_edit_length_bounds() {
        let err = validate_blog_edit("abcd", &"d".repeat(19), "https://example.com/a.jpg")
            .expect_err("too short");
        assert_eq!(err.get("title"), Some("Title must be at least 5 characters"));
        assert_eq!(
            err.get("description"),
            Some("Description must be at least 20 characters")
        );

        let err = validate_blog_edit(&"t".repeat(101), &"d".repeat(5001), "https://example.com/a.jpg")
            .expect_err("too long");
        assert_eq!(err.get("title"), Some("Title must be less than 100 characters"));

        validate_blog_edit(&"t".repeat(100), &"d".repeat(5000), "data:image/png;base64,AA")
            .expect("bounds inclusive");
    }
}
