//! Configuration validation utilities.

use tessera_framework::DispatchMessages;

use super::error::{ConfigError, ConfigResult};
use super::schema::{ComponentsConfig, LogOutput, LoggingConfig, TesseraConfig};

/// Length of the shortest possible component id, `1|a||a#0000`.
pub const MIN_ID_LENGTH: usize = 11;

/// Validates the entire configuration.
pub fn validate_config(config: &TesseraConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_components_config(&config.components)?;
    validate_messages(&config.messages)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }
    Ok(())
}

fn validate_components_config(components: &ComponentsConfig) -> ConfigResult<()> {
    if components.max_id_length < MIN_ID_LENGTH {
        return Err(ConfigError::validation(format!(
            "components.max_id_length must be at least {MIN_ID_LENGTH}, got {}",
            components.max_id_length
        )));
    }
    Ok(())
}

fn validate_messages(messages: &DispatchMessages) -> ConfigResult<()> {
    let texts = [
        ("unknown_command", &messages.unknown_command),
        ("invalid_interaction", &messages.invalid_interaction),
        ("not_your_component", &messages.not_your_component),
        ("check_failed_title", &messages.check_failed_title),
        ("validation_failed_title", &messages.validation_failed_title),
    ];
    for (key, text) in texts {
        if text.trim().is_empty() {
            return Err(ConfigError::validation(format!(
                "messages.{key} cannot be empty"
            )));
        }
    }
    if messages.failure_color > 0xFF_FFFF {
        return Err(ConfigError::validation(format!(
            "messages.failure_color {:#x} is not a 24-bit color",
            messages.failure_color
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&TesseraConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_id_length_lower_bound() {
        let mut config = TesseraConfig::default();
        config.components.max_id_length = MIN_ID_LENGTH;
        assert!(validate_config(&config).is_ok());

        config.components.max_id_length = MIN_ID_LENGTH - 1;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_empty_message() {
        let mut config = TesseraConfig::default();
        config.messages.not_your_component = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("not_your_component"));
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = TesseraConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("tessera.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_failure_color() {
        let mut config = TesseraConfig::default();
        config.messages.failure_color = 0x1_000_000;
        assert!(validate_config(&config).is_err());
    }
}
