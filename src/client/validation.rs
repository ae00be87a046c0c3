//! Request validation: fail-fast guards that run before any network I/O.

use crate::types::GenerationOptions;
use crate::{Error, ErrorContext, Result};

pub(crate) fn validate_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(Error::validation_with_context(
            "prompt must not be empty",
            ErrorContext::new()
                .with_field_path("request.prompt")
                .with_source("request_validator"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_request(prompt: &str, options: &GenerationOptions) -> Result<()> {
    validate_prompt(prompt)?;
    options.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_is_rejected() {
        assert!(matches!(
            validate_prompt(""),
            Err(Error::Validation { .. })
        ));
        assert!(matches!(
            validate_prompt("  \n\t"),
            Err(Error::Validation { .. })
        ));
        assert!(validate_prompt("write a parser").is_ok());
    }

    #[test]
    fn option_violations_surface_through_request_validation() {
        let options = GenerationOptions::new().temperature(5.0);
        assert!(matches!(
            validate_request("write a parser", &options),
            Err(Error::Validation { .. })
        ));
    }
}
