use crate::error::{AppError, CliError};
use rpassword::read_password;
use std::io::{self, Write};

/// Session token input handler
pub struct TokenInput {
    pub token: String,
}

impl TokenInput {
    /// Resolve the token to authenticate with.
    /// A token passed on the command line wins; otherwise prompt for one
    /// without echoing.
    pub fn collect(flag_token: Option<&str>) -> Result<Self, AppError> {
        let token = if let Some(token) = flag_token {
            token.to_string()
        } else {
            print!("Session token: ");
            io::stdout().flush().map_err(|e| {
                AppError::Cli(CliError::InvalidArguments(format!(
                    "Failed to flush stdout: {}",
                    e
                )))
            })?;

            let token = read_password().map_err(|e| {
                AppError::Cli(CliError::InvalidArguments(format!(
                    "Failed to read token: {}",
                    e
                )))
            })?;
            token.trim().to_string()
        };

        Ok(Self { token })
    }

    /// Validate that the token is not empty
    pub fn validate(&self) -> Result<(), AppError> {
        if self.token.is_empty() {
            return Err(AppError::Cli(CliError::InvalidArguments(
                "Token cannot be empty".to_string(),
            )));
        }
        Ok(())
    }
}
