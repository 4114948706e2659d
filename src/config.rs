//! Environment configuration for the Lambda binary.

use anyhow::{Result, bail};
use std::env::{self, VarError};

/// Environment variable naming the base path stripped from inbound paths.
pub const BASE_PATH_VARIABLE: &str = "ALB_BASE_PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Raw base path; normalized when the adapter is built.
    pub base_path: String,
}

impl AdapterConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but is not valid unicode.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key))
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let base_path = match lookup(BASE_PATH_VARIABLE) {
            Ok(value) => value,
            Err(VarError::NotPresent) => String::new(),
            Err(VarError::NotUnicode(_)) => bail!("{BASE_PATH_VARIABLE} is not valid unicode"),
        };

        Ok(Self { base_path })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_from_lookup_reads_base_path() {
        let config = AdapterConfig::from_lookup(|_| Ok("/api/v1".to_string())).unwrap();
        assert_eq!(config.base_path, "/api/v1");
    }

    #[test]
    fn test_from_lookup_missing_is_empty() {
        let config = AdapterConfig::from_lookup(|_| Err(VarError::NotPresent)).unwrap();
        assert_eq!(config, AdapterConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_non_unicode() {
        let result =
            AdapterConfig::from_lookup(|_| Err(VarError::NotUnicode(OsString::from("x"))));
        assert!(result.unwrap_err().to_string().contains(BASE_PATH_VARIABLE));
    }
}
