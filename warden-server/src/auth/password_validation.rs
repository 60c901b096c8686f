//! Password validation and requirements

use crate::core::{WardenError, WardenResult};

/// Password requirements configuration
#[derive(Debug, Clone)]
pub struct PasswordRequirements {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Require at least one letter
    pub require_letters: bool,
    /// Require at least one digit
    pub require_digits: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 20,
            require_letters: true,
            require_digits: true,
        }
    }
}

impl PasswordRequirements {
    /// Relaxed requirements for development setups
    pub fn relaxed() -> Self {
        Self {
            min_length: 6,
            max_length: 128,
            require_letters: false,
            require_digits: false,
        }
    }

    /// Validate a password against requirements
    pub fn validate(&self, password: &str) -> WardenResult<()> {
        if password.len() < self.min_length || password.len() > self.max_length {
            return Err(WardenError::validation_field(
                "password",
                format!(
                    "password must be between {} and {} characters",
                    self.min_length, self.max_length
                ),
            ));
        }

        if self.require_letters && !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(WardenError::validation_field(
                "password",
                "password must contain at least one letter",
            ));
        }

        if self.require_digits && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(WardenError::validation_field(
                "password",
                "password must contain at least one digit",
            ));
        }

        Ok(())
    }
}
