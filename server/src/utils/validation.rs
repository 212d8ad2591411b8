use regex::Regex;
use std::sync::OnceLock;

use crate::models::user::FavoriteLocation;

/// Maximum number of favorite locations per user.
pub const MAX_FAVORITE_LOCATIONS: usize = 10;

fn email_regex() -> &'static Regex {
    // Compiling regexes is expensive, so this one is built once.
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").unwrap()
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

fn username_errors(username: &str, errors: &mut Vec<String>) {
    let trimmed = username.trim();
    let length = trimmed.chars().count();
    if !(3..=30).contains(&length) {
        errors.push("Username must be between 3 to 30 characters".to_string());
    }
    if !trimmed.is_empty() && !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        errors.push("Username must be alphanumeric".to_string());
    }
}

fn password_errors(password: &str, errors: &mut Vec<String>) {
    if password.chars().count() < 6 {
        errors.push("Password must be at least 6 characters long".to_string());
    }
    let strong = password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric());
    if !password.is_empty() && !strong {
        errors.push("Password must include uppercase, lowercase, number and symbol".to_string());
    }
}

pub fn validate_registration(email: &str, username: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_valid_email(email.trim()) {
        errors.push("Valid email is required".to_string());
    }
    username_errors(username, &mut errors);
    password_errors(password, &mut errors);
    errors
}

pub fn validate_login(email: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();
    if !is_valid_email(email.trim()) {
        errors.push("Valid email is required".to_string());
    }
    if password.chars().count() < 6 {
        errors.push("Password must be at least 6 characters long".to_string());
    }
    errors
}

pub fn validate_username(username: &str) -> Vec<String> {
    let mut errors = Vec::new();
    username_errors(username, &mut errors);
    errors
}

/// Per-entry checks for a favorite-location list. Error messages carry the
/// 1-based index so the client can point at the offending entry.
pub fn validate_locations(locations: &[FavoriteLocation]) -> Vec<String> {
    let mut errors = Vec::new();
    for (index, location) in locations.iter().enumerate() {
        let position = index + 1;
        if location.name.trim().is_empty() {
            errors.push(format!("Location {position}: Name is required"));
        }
        if !(-90.0..=90.0).contains(&location.latitude) {
            errors.push(format!(
                "Location {position}: Valid latitude (-90 to 90) is required"
            ));
        }
        if !(-180.0..=180.0).contains(&location.longitude) {
            errors.push(format!(
                "Location {position}: Valid longitude (-180 to 180) is required"
            ));
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str, latitude: f64, longitude: f64) -> FavoriteLocation {
        FavoriteLocation {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn accepts_plain_and_dotted_emails() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@example.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@example.com"));
    }

    #[test]
    fn valid_registration_has_no_errors() {
        assert!(validate_registration("a@b.com", "abcuser", "Abcd1234!").is_empty());
    }

    #[test]
    fn registration_collects_every_problem() {
        let errors = validate_registration("bad", "x!", "short");
        assert!(errors.iter().any(|e| e.contains("Valid email")));
        assert!(errors.iter().any(|e| e.contains("between 3 to 30")));
        assert!(errors.iter().any(|e| e.contains("alphanumeric")));
        assert!(errors.iter().any(|e| e.contains("at least 6 characters")));
    }

    #[test]
    fn password_strength_requires_all_character_classes() {
        let errors = validate_registration("a@b.com", "abcuser", "abcdefgh");
        assert!(
            errors
                .iter()
                .any(|e| e.contains("uppercase, lowercase, number and symbol"))
        );
    }

    #[test]
    fn username_of_thirty_characters_is_accepted() {
        let username = "a".repeat(30);
        assert!(validate_username(&username).is_empty());
        let too_long = "a".repeat(31);
        assert!(!validate_username(&too_long).is_empty());
    }

    #[test]
    fn locations_within_bounds_pass() {
        let list = vec![location("Pune", 18.5196, 73.8554)];
        assert!(validate_locations(&list).is_empty());
    }

    #[test]
    fn location_errors_carry_their_position() {
        let list = vec![
            location("Pune", 18.5196, 73.8554),
            location("", 120.0, -200.0),
        ];
        let errors = validate_locations(&list);
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.starts_with("Location 2:")));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let list = vec![location("Nowhere", f64::NAN, 0.0)];
        assert_eq!(validate_locations(&list).len(), 1);
    }
}
