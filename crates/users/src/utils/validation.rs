//! Profile update validation.

use nexa_database::{ProfileChanges, ValidationErrors};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::types::ProfileUpdate;

pub const BIO_MAX: usize = 500;
pub const LOCATION_MAX: usize = 255;

static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(https?://)?([a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}(:\d{1,5})?([/?#]\S*)?$")
        .expect("url pattern compiles")
});

/// Scheme optional, host must carry a top-level domain.
///
/// ```
/// use nexa_users::utils::is_valid_website;
///
/// assert!(is_valid_website("https://nexa.dev/about"));
/// assert!(is_valid_website("example.com"));
/// assert!(!is_valid_website("not a url"));
/// ```
pub fn is_valid_website(url: &str) -> bool {
    URL_REGEX.is_match(url)
}

/// Check an update and turn it into the changes to persist.
///
/// Text fields are trimmed, an empty website clears the column.
pub fn validate_update(update: ProfileUpdate) -> Result<ProfileChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let bio = update.bio.map(|value| value.map(|text| text.trim().to_string()));
    if let Some(Some(text)) = &bio {
        if text.chars().count() > BIO_MAX {
            errors.push("bio", "Bio must be less than 500 characters");
        }
    }

    let location = update
        .location
        .map(|value| value.map(|text| text.trim().to_string()));
    if let Some(Some(text)) = &location {
        if text.chars().count() > LOCATION_MAX {
            errors.push("location", "Location must be less than 255 characters");
        }
    }

    let website = update.website.map(|value| {
        value
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    });
    if let Some(Some(url)) = &website {
        if !is_valid_website(url) {
            errors.push("website", "Website must be a valid URL");
        }
    }

    check_object(&update.social_links, "social_links", "Social links must be an object", &mut errors);
    check_object(&update.preferences, "preferences", "Preferences must be an object", &mut errors);

    errors.into_result()?;

    Ok(ProfileChanges {
        bio,
        location,
        website,
        social_links: update.social_links,
        preferences: update.preferences,
    })
}

fn check_object(
    value: &Option<Option<Value>>,
    field: &str,
    message: &str,
    errors: &mut ValidationErrors,
) {
    if let Some(Some(value)) = value {
        if !value.is_object() {
            errors.push(field, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn website_shapes() {
        assert!(is_valid_website("http://sub.example.co.uk:8080/path?q=1"));
        assert!(is_valid_website("www.example.org"));
        assert!(!is_valid_website("ftp://example.com"));
        assert!(!is_valid_website("localhost"));
        assert!(!is_valid_website("https://"));
    }

    #[test]
    fn omitted_fields_stay_omitted() {
        let changes = validate_update(ProfileUpdate {
            bio: Some(Some("  Designer  ".into())),
            ..ProfileUpdate::default()
        })
        .unwrap();

        assert_eq!(changes.bio, Some(Some("Designer".into())));
        assert_eq!(changes.location, None);
        assert_eq!(changes.social_links, None);
    }

    #[test]
    fn empty_website_clears_the_field() {
        let changes = validate_update(ProfileUpdate {
            website: Some(Some("   ".into())),
            ..ProfileUpdate::default()
        })
        .unwrap();

        assert_eq!(changes.website, Some(None));
    }

    #[test]
    fn every_violation_is_reported() {
        let errors = validate_update(ProfileUpdate {
            bio: Some(Some("b".repeat(501))),
            location: Some(Some("l".repeat(256))),
            website: Some(Some("nope".into())),
            social_links: Some(Some(json!(["twitter"]))),
            preferences: Some(Some(json!("dark"))),
        })
        .unwrap_err();

        for field in ["bio", "location", "website", "social_links", "preferences"] {
            assert!(errors.has_field(field), "missing error for {field}");
        }
    }

    #[test]
    fn limits_are_inclusive() {
        assert!(validate_update(ProfileUpdate {
            bio: Some(Some("b".repeat(BIO_MAX))),
            location: Some(Some("l".repeat(LOCATION_MAX))),
            ..ProfileUpdate::default()
        })
        .is_ok());
    }

    #[test]
    fn null_json_fields_clear_without_error() {
        let changes = validate_update(ProfileUpdate {
            social_links: Some(None),
            preferences: Some(Some(json!({ "theme": "dark" }))),
            ..ProfileUpdate::default()
        })
        .unwrap();

        assert_eq!(changes.social_links, Some(None));
        assert_eq!(changes.preferences, Some(Some(json!({ "theme": "dark" }))));
    }
}
