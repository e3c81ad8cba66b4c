//! User-facing message catalogue.
//!
//! Repository errors surface in banners and toasts, so the wording lives in
//! one place instead of being scattered through operations. Messages take
//! the entity label ("client", "hotel", ...) so the seven repositories share
//! a single catalogue.

/// Message shown when a record id does not exist remotely.
pub fn not_found(label: &str) -> String {
    format!("No {label} was found for this id")
}

/// Message shown when a remote read or write fails.
pub fn operation_failed(label: &str) -> String {
    format!("The {label} could not be loaded or saved, please try again")
}

/// Message shown when a credential exchange is rejected.
pub fn login_failed() -> String {
    "Incorrect email address or password".to_owned()
}

/// Message shown when the authentication provider is unreachable.
pub fn auth_unavailable() -> String {
    "The sign-in service is unavailable, please try again later".to_owned()
}

/// Message shown when a profile image cannot be stored or removed.
pub fn profile_image_failed() -> String {
    "The profile image could not be updated, please try again".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_interpolated() {
        assert_eq!(not_found("client"), "No client was found for this id");
        assert!(operation_failed("flight").contains("flight"));
    }
}
