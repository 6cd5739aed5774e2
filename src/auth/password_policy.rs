/*!
 * # Password Policy Module
 *
 * Length bounds plus a short list of passwords that are rejected outright.
 */

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password too short: minimum {min_length} characters required")]
    TooShort { min_length: usize },

    #[error("Password too long: maximum {max_length} characters allowed")]
    TooLong { max_length: usize },

    #[error("Password is in the list of commonly used passwords")]
    CommonPassword,

    #[error("Password must not equal the username")]
    SameAsUsername,
}

const COMMON_PASSWORDS: &[&str] = &[
    "password", "12345678", "123456789", "password1", "qwertyui", "iloveyou", "admin123",
    "welcome1", "letmein1", "sunshine",
];

#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub prevent_common_passwords: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            prevent_common_passwords: true,
        }
    }
}

impl PasswordPolicy {
    /// Validate a password against the policy
    pub fn validate(&self, password: &str, username: Option<&str>) -> Result<(), PasswordPolicyError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min_length: self.min_length,
            });
        }

        if length > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max_length: self.max_length,
            });
        }

        if self.prevent_common_passwords
            && COMMON_PASSWORDS.contains(&password.to_lowercase().as_str())
        {
            return Err(PasswordPolicyError::CommonPassword);
        }

        if let Some(username) = username {
            if password.eq_ignore_ascii_case(username) {
                return Err(PasswordPolicyError::SameAsUsername);
            }
        }

        Ok(())
    }
}
