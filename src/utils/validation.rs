use crate::utils::error::{ApiError, Result};
use std::time::Duration;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_positive_duration(field_name: &str, value: Duration) -> Result<()> {
    if value.is_zero() {
        return Err(ApiError::ConfigError {
            field: field_name.to_string(),
            reason: "Duration must be greater than zero".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_positive_duration() {
        assert!(validate_positive_duration("read_timeout", Duration::from_secs(1)).is_ok());
        assert!(validate_positive_duration("read_timeout", Duration::ZERO).is_err());
    }
}
