//! VestingLedger v1: Token Configuration
//!
//! Construction-time parameters. Loaded from JSON by hosts; tests use
//! `TokenConfig::default()` or struct update syntax.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arithmetic::{tokens, DECIMALS};
use crate::domain::{AccountId, Amount, TokenInfo};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("malformed config: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    /// Receives the initial supply and every role.
    pub owner: AccountId,
    /// Whole tokens minted to the owner at construction.
    pub initial_supply: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: "CPUcoin".to_string(),
            symbol: "CPU".to_string(),
            owner: "owner".to_string(),
            initial_supply: 5_000_000_000,
        }
    }
}

impl TokenConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TokenConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.owner.is_empty() {
            return Err(ConfigError::Invalid("owner must not be empty"));
        }
        if self.symbol.is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty"));
        }
        Ok(())
    }

    pub fn initial_supply_units(&self) -> Amount {
        tokens(self.initial_supply)
    }

    pub fn token_info(&self) -> TokenInfo {
        TokenInfo {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: DECIMALS,
        }
    }
}
