// src/config.rs
//! Settlement configuration
//!
//! Loaded from JSON. Addresses and balances use the usual `0x`-prefixed hex
//! strings; every field has a default, so `{}` is a valid configuration.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use ethereum_types::{Address, H256, U256};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::DEFAULT_PENDING_PERIOD;
use crate::fraud_proof_system::{block_root, state_root, Account, MerkleError, Transaction};
use crate::rollup::{FinalizedState, DEFAULT_FINALIZATION_PERIOD};

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is not valid JSON for this schema
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configuration parsed but is unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Initial L2 balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    /// Account address
    pub address: Address,

    /// Balance in wei
    pub balance: U256,
}

/// Initial L2 account table, in leaf order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    #[serde(default)]
    pub accounts: Vec<GenesisAccount>,
}

impl GenesisConfig {
    /// Genesis accounts with nonce zero
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts
            .iter()
            .map(|entry| Account::new(entry.address, entry.balance))
            .collect()
    }

    /// Mint transactions that produce the genesis balances
    pub fn transactions(&self) -> Vec<Transaction> {
        self.accounts
            .iter()
            .map(|entry| Transaction::mint(entry.address, entry.balance))
            .collect()
    }

    /// Genesis block root (over the mints) and state root (over the accounts)
    pub fn genesis_roots(&self) -> Result<FinalizedState, MerkleError> {
        Ok(FinalizedState {
            block_merkle_root: block_root(&self.transactions())?,
            state_merkle_root: state_root(&self.accounts())?,
        })
    }

    /// Genesis state root alone
    pub fn state_root(&self) -> Result<H256, MerkleError> {
        state_root(&self.accounts())
    }
}

/// Settlement core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementConfig {
    /// Seconds a proposal waits before it can be finalized
    pub finalization_period: u64,

    /// Seconds a withdrawal request waits before ETH is released
    pub pending_period: u64,

    /// Log level passed to `env_logger` (`error` .. `trace`)
    pub log_level: String,

    /// Initial L2 state
    pub genesis: GenesisConfig,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            finalization_period: DEFAULT_FINALIZATION_PERIOD,
            pending_period: DEFAULT_PENDING_PERIOD,
            log_level: "info".to_string(),
            genesis: GenesisConfig::default(),
        }
    }
}

impl SettlementConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Reject configurations the core cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.finalization_period == 0 {
            return Err(ConfigError::Invalid("finalization_period must be non-zero".to_string()));
        }
        self.level_filter()?;

        let mut seen = HashSet::new();
        for entry in &self.genesis.accounts {
            if entry.address.is_zero() {
                return Err(ConfigError::Invalid("genesis account uses the zero address".to_string()));
            }
            if !seen.insert(entry.address) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate genesis account {:?}",
                    entry.address
                )));
            }
        }
        Ok(())
    }

    fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)))
    }

    /// Install `env_logger` at the configured level; `RUST_LOG` takes precedence.
    ///
    /// Returns `false` if a logger was already installed.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let level = self.level_filter()?;
        let mut builder = env_logger::Builder::new();
        builder.filter_level(level);
        if let Ok(spec) = std::env::var("RUST_LOG") {
            builder.parse_filters(&spec);
        }
        Ok(builder.try_init().is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = SettlementConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SettlementConfig::default());
        assert_eq!(config.finalization_period, 86_400);
        assert_eq!(config.pending_period, 86_400);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_parse_genesis() {
        let config = SettlementConfig::from_json_str(
            r#"{
                "finalization_period": 60,
                "genesis": {
                    "accounts": [
                        { "address": "0x1111111111111111111111111111111111111111", "balance": "0xde0b6b3a7640000" },
                        { "address": "0x2222222222222222222222222222222222222222", "balance": "0x1bc16d674ec80000" }
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.finalization_period, 60);
        assert_eq!(config.genesis.accounts.len(), 2);
        assert_eq!(config.genesis.accounts[0].address, Address::repeat_byte(0x11));
        assert_eq!(
            config.genesis.accounts[1].balance,
            U256::from(2_000_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_validation() {
        let zero_period = r#"{ "finalization_period": 0 }"#;
        assert!(matches!(SettlementConfig::from_json_str(zero_period), Err(ConfigError::Invalid(_))));

        let bad_level = r#"{ "log_level": "loud" }"#;
        assert!(matches!(SettlementConfig::from_json_str(bad_level), Err(ConfigError::Invalid(_))));

        let mut config = SettlementConfig::default();
        let entry = GenesisAccount {
            address: Address::repeat_byte(1),
            balance: U256::one(),
        };
        config.genesis.accounts = vec![entry, entry];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(SettlementConfig::from_json_str("[1, 2]"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_genesis_roots() {
        let genesis = GenesisConfig {
            accounts: vec![GenesisAccount {
                address: Address::repeat_byte(1),
                balance: U256::from(5u64),
            }],
        };
        let roots = genesis.genesis_roots().unwrap();

        let account = Account::new(Address::repeat_byte(1), U256::from(5u64));
        assert_eq!(roots.state_merkle_root, account.hash());
        assert_eq!(
            roots.block_merkle_root,
            Transaction::mint(Address::repeat_byte(1), U256::from(5u64)).hash()
        );
        assert_eq!(
            GenesisConfig::default().genesis_roots(),
            Err(MerkleError::EmptyLeafSet)
        );
    }
}
