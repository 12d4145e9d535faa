//! Form validation - maps submitted fields to clean values.
//!
//! Only presence, type and length are checked here. Checks that need the
//! store (group existence, slug/username uniqueness) live in the services.

use serde::Deserialize;
use uuid::Uuid;

use crate::domain::Group;
use crate::error::ValidationErrors;
use crate::ports::{ImageFormat, ImageUpload};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Route words that would shadow fixed paths if used as usernames.
pub const RESERVED_USERNAMES: &[&str] = &["new", "follow", "group", "about", "auth", "admin", "health"];

const USERNAME_MAX_CHARS: usize = 150;
const PASSWORD_MIN_CHARS: usize = 8;

fn required(errors: &mut ValidationErrors, field: &str, value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        None
    } else {
        Some(value.to_string())
    }
}

fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Submitted post fields. `group` carries the group id, empty for none.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
}

/// A validated post submission.
#[derive(Debug, Clone)]
pub struct CleanPost {
    pub text: String,
    pub group_id: Option<Uuid>,
    pub image: Option<(ImageFormat, Vec<u8>)>,
}

impl PostForm {
    pub fn clean(&self, upload: Option<ImageUpload>) -> Result<CleanPost, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let text = required(&mut errors, "text", &self.text);

        let group_id = match optional(self.group.as_deref()) {
            None => None,
            Some(raw) => match Uuid::parse_str(raw) {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        let image = match upload {
            None => None,
            Some(upload) if upload.bytes.len() > MAX_IMAGE_BYTES => {
                errors.add("image", format!("Image must be at most {MAX_IMAGE_BYTES} bytes."));
                None
            }
            Some(upload) => match ImageFormat::decode(&upload.bytes) {
                Some(format) => Some((format, upload.bytes)),
                None => {
                    errors.add("image", INVALID_IMAGE);
                    None
                }
            },
        };

        errors.into_result(())?;
        Ok(CleanPost {
            text: text.unwrap_or_default(),
            group_id,
            image,
        })
    }
}

/// Submitted comment fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn clean(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let text = required(&mut errors, "text", &self.text);
        errors.into_result(text.unwrap_or_default())
    }
}

/// Submitted group fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rules: Option<String>,
}

/// A validated group submission.
#[derive(Debug, Clone)]
pub struct CleanGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub rules: Option<String>,
}

/// Slugs are ASCII letters, digits, hyphens and underscores.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl GroupForm {
    pub fn clean(&self) -> Result<CleanGroup, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = required(&mut errors, "title", &self.title);
        if let Some(title) = &title {
            if title.chars().count() > Group::TITLE_MAX_CHARS {
                errors.add(
                    "title",
                    format!(
                        "Ensure this value has at most {} characters.",
                        Group::TITLE_MAX_CHARS
                    ),
                );
            }
        }

        let slug = required(&mut errors, "slug", &self.slug);
        if let Some(slug) = &slug {
            if !is_valid_slug(slug) {
                errors.add(
                    "slug",
                    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
                );
            }
        }

        let description = required(&mut errors, "description", &self.description);

        errors.into_result(())?;
        Ok(CleanGroup {
            title: title.unwrap_or_default(),
            slug: slug.unwrap_or_default(),
            description: description.unwrap_or_default(),
            rules: optional(self.rules.as_deref()).map(str::to_string),
        })
    }
}

/// Account credentials submitted on signup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Usernames: up to 150 letters, digits and `@.+-_`, not a reserved route word.
pub fn validate_username(errors: &mut ValidationErrors, username: &str) {
    if username.is_empty() {
        errors.add("username", REQUIRED);
        return;
    }
    if username.chars().count() > USERNAME_MAX_CHARS {
        errors.add(
            "username",
            format!("Ensure this value has at most {USERNAME_MAX_CHARS} characters."),
        );
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    if RESERVED_USERNAMES.contains(&username.to_lowercase().as_str()) {
        errors.add("username", "This username is reserved.");
    }
}

impl SignupForm {
    /// Returns the trimmed username; the password is checked for length only.
    pub fn clean(&self) -> Result<String, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = self.username.trim();
        validate_username(&mut errors, username);
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            errors.add(
                "password",
                format!("Password must be at least {PASSWORD_MIN_CHARS} characters."),
            );
        }
        errors.into_result(username.to_string())
    }
}
