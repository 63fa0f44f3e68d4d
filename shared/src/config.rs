use std::env;

use crate::errors::{Result, ServiceError};

#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub max_users: usize,
    pub guest_name_attempts: u32,
}

impl ProfileConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            max_users: env::var("MAX_USERS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .map_err(|e| ServiceError::Internal(format!("Invalid MAX_USERS: {}", e)))?,
            guest_name_attempts: env::var("GUEST_NAME_ATTEMPTS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|e| {
                    ServiceError::Internal(format!("Invalid GUEST_NAME_ATTEMPTS: {}", e))
                })?,
        })
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            max_users: 7,
            guest_name_attempts: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = ProfileConfig::default();
        assert_eq!(config.max_users, 7);
        assert_eq!(config.guest_name_attempts, 30);
    }
}
