//! Submitted form data and its validation.
//!
//! Forms are validated before anything touches the store. A failed
//! validation yields [`FieldErrors`] that the caller renders next to the
//! submitted values instead of failing the request.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str = "Upload a valid image. Supported formats: gif, png, jpg, jpeg, webp.";

const IMAGE_EXTENSIONS: [&str; 5] = ["gif", "png", "jpg", "jpeg", "webp"];

/// Directory that post images are stored under.
pub const IMAGE_UPLOAD_DIR: &str = "posts";

/// Field name to error messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.0
    }

    /// `Ok(value)` when no error was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Raw post form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub text: String,
    pub group: Option<String>,
    pub image: Option<String>,
}

/// Post form that passed field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<String>,
}

impl PostDraft {
    /// Validate every field. Group existence is checked by the caller,
    /// which owns the store.
    pub fn clean(&self) -> Result<CleanPost, FieldErrors> {
        let mut errors = FieldErrors::new();

        let text = self.text.trim();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }

        let group_id = match non_blank(self.group.as_deref()) {
            None => None,
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        let image = match non_blank(self.image.as_deref()) {
            None => None,
            Some(raw) => match image_path(raw) {
                Some(path) => Some(path),
                None => {
                    errors.add("image", INVALID_IMAGE);
                    None
                }
            },
        };

        errors.into_result(CleanPost {
            text: text.to_string(),
            group_id,
            image,
        })
    }
}

/// Raw comment form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDraft {
    pub text: String,
}

impl CommentDraft {
    pub fn clean(&self) -> Result<String, FieldErrors> {
        let text = self.text.trim();
        let mut errors = FieldErrors::new();
        if text.is_empty() {
            errors.add("text", REQUIRED);
        }
        errors.into_result(text.to_string())
    }
}

/// Longest accepted username.
pub const USERNAME_MAX_CHARS: usize = 150;

/// Shortest accepted password.
pub const PASSWORD_MIN_CHARS: usize = 8;

/// Account registration form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SignupDraft {
    /// Usernames are letters, digits and `@.+-_` only.
    pub fn clean(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = self.username.as_str();
        if username.is_empty() {
            errors.add("username", REQUIRED);
        } else if username.chars().count() > USERNAME_MAX_CHARS
            || !username
                .chars()
                .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
            _ => errors.add("email", "Enter a valid email address."),
        }

        check_password_length(&mut errors, "password", &self.password);

        errors.into_result(())
    }
}

/// Password change form. Whether `current_password` matches the stored
/// hash is checked by the caller, which owns the password service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordChangeDraft {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

impl PasswordChangeDraft {
    pub fn clean(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.current_password.is_empty() {
            errors.add("current_password", REQUIRED);
        }
        check_password_length(&mut errors, "new_password", &self.new_password);
        if self.new_password != self.new_password_confirmation {
            errors.add(
                "new_password_confirmation",
                "The two password fields didn't match.",
            );
        }

        errors.into_result(())
    }
}

fn check_password_length(errors: &mut FieldErrors, field: &str, password: &str) {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            field,
            format!(
                "This password is too short. It must contain at least {} characters.",
                PASSWORD_MIN_CHARS
            ),
        );
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Normalize an uploaded file name into its media path under
/// [`IMAGE_UPLOAD_DIR`]. Only the final path component is kept.
fn image_path(raw: &str) -> Option<String> {
    let name = raw.rsplit(['/', '\\']).next()?.trim();
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || !IMAGE_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str()) {
        return None;
    }
    Some(format!("{}/{}", IMAGE_UPLOAD_DIR, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(text: &str) -> PostDraft {
        PostDraft {
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn blank_text_is_required() {
        let errors = draft("   ").clean().unwrap_err();
        assert_eq!(errors.get("text"), [REQUIRED.to_string()]);
    }

    #[test]
    fn text_is_trimmed() {
        let clean = draft("  hello  ").clean().unwrap();
        assert_eq!(clean.text, "hello");
        assert_eq!(clean.group_id, None);
        assert_eq!(clean.image, None);
    }

    #[test]
    fn empty_group_means_no_group() {
        let mut form = draft("text");
        form.group = Some(String::new());
        assert_eq!(form.clean().unwrap().group_id, None);
    }

    #[test]
    fn malformed_group_is_an_invalid_choice() {
        let mut form = draft("text");
        form.group = Some("not-a-uuid".into());
        let errors = form.clean().unwrap_err();
        assert!(errors.has("group"));
        assert!(!errors.has("text"));
    }

    #[test]
    fn image_keeps_only_the_file_name() {
        let mut form = draft("text");
        form.image = Some("../../etc/small.GIF".into());
        assert_eq!(form.clean().unwrap().image.as_deref(), Some("posts/small.GIF"));
    }

    #[test]
    fn non_image_upload_is_rejected() {
        for name in ["notes.txt", ".gif", "noextension"] {
            let mut form = draft("text");
            form.image = Some(name.into());
            assert!(form.clean().unwrap_err().has("image"), "{name} accepted");
        }
    }

    #[test]
    fn every_invalid_field_is_reported() {
        let form = PostDraft {
            text: String::new(),
            group: Some("x".into()),
            image: Some("x.exe".into()),
        };
        let errors = form.clean().unwrap_err().into_inner();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn signup_checks_every_field() {
        let valid = SignupDraft {
            username: "leo.tolstoy+1".into(),
            email: "leo@example.com".into(),
            password: "anna-karenina".into(),
        };
        assert!(valid.clean().is_ok());

        let invalid = SignupDraft {
            username: "leo tolstoy".into(),
            email: "leo".into(),
            password: "short".into(),
        };
        let errors = invalid.clean().unwrap_err();
        assert!(errors.has("username"));
        assert!(errors.has("email"));
        assert!(errors.has("password"));
    }

    #[test]
    fn comment_requires_text() {
        assert!(CommentDraft { text: "\n".into() }.clean().is_err());
        assert_eq!(
            CommentDraft { text: " nice ".into() }.clean().unwrap(),
            "nice"
        );
    }

    #[test]
    fn password_change_needs_matching_long_password() {
        let form = PasswordChangeDraft {
            current_password: "old-secret".into(),
            new_password: "new-secret".into(),
            new_password_confirmation: "new-secret".into(),
        };
        assert!(form.clean().is_ok());

        let errors = PasswordChangeDraft {
            current_password: String::new(),
            new_password: "short".into(),
            new_password_confirmation: "shorter".into(),
        }
        .clean()
        .unwrap_err();
        assert!(errors.has("current_password"));
        assert!(errors.has("new_password"));
        assert!(errors.has("new_password_confirmation"));
    }
}
