//! Password strength validation for the registration form.
//!
//! The backend stores the credentials, but checking strength here means the
//! user gets feedback without a round-trip.

use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that has been checked for strength.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create a validated password from a raw password string.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with the strength checker's feedback if the
    /// password is too easy to guess.
    pub fn new(raw_password_string: &str) -> Result<Self, Error> {
        let analysis = zxcvbn(raw_password_string, &[]);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password_string.to_owned())),
            _ => Err(Error::TooWeak(
                analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// The underlying password string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod validated_password_tests {
    use crate::Error;

    use super::ValidatedPassword;

    #[test]
    fn accepts_strong_password() {
        let result = ValidatedPassword::new("iamtestingwhethericancreateanewuser");

        assert!(result.is_ok());
    }

    #[test]
    fn rejects_weak_password() {
        let result = ValidatedPassword::new("foo");

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn rejects_empty_password() {
        let result = ValidatedPassword::new("");

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }
}
