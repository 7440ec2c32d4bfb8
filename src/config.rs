use anyhow::{anyhow, Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ledger::{AccountId, PrivateKey};

/// Main configuration structure for Mintline
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MintlineConfig {
    /// Operator credentials used to pay for submitted transactions
    pub operator: OperatorConfig,
    /// Target network environment
    pub network: NetworkConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OperatorConfig {
    /// Operator account id, `shard.realm.num` form (can be set via env var)
    pub account_id: Option<String>,
    /// Operator private key, hex or DER-wrapped hex (can be set via env var)
    pub private_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Named network environment the client binds to
    pub name: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "testnet".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Log output format: "plain" or "json"
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: "plain".to_string(),
        }
    }
}

/// Environment variables consulted for the operator credentials, in order.
/// The `MY_*` pair keeps existing `.env` files working unchanged.
const OPERATOR_ID_VARS: [&str; 2] = ["MINTLINE_OPERATOR_ID", "MY_ACCOUNT_ID"];
const OPERATOR_KEY_VARS: [&str; 2] = ["MINTLINE_OPERATOR_KEY", "MY_PRIVATE_KEY"];

impl MintlineConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (mintline.toml)
    /// 3. Environment variables (prefixed with MINTLINE_)
    pub fn load() -> Result<Self> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&MintlineConfig::default())?);

        if Path::new("mintline.toml").exists() {
            builder = builder.add_source(File::with_name("mintline"));
        }

        builder = builder.add_source(
            Environment::with_prefix("MINTLINE")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut mintline_config: MintlineConfig = config.try_deserialize()?;

        // Operator credentials get special handling so both naming
        // conventions for the `.env` variables keep working.
        if mintline_config.operator.account_id.is_none() {
            mintline_config.operator.account_id = first_env_var(&OPERATOR_ID_VARS);
        }
        if mintline_config.operator.private_key.is_none() {
            mintline_config.operator.private_key = first_env_var(&OPERATOR_KEY_VARS);
        }

        Ok(mintline_config)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    /// Parse the operator credentials, failing with a descriptive error
    /// before any ledger interaction if either is missing or malformed.
    pub fn operator_credentials(&self) -> Result<(AccountId, PrivateKey)> {
        let raw_id = self.operator.account_id.as_deref().ok_or_else(|| {
            anyhow!(
                "operator account id is not set; export MINTLINE_OPERATOR_ID \
                 (or MY_ACCOUNT_ID) or add [operator] to mintline.toml"
            )
        })?;
        let raw_key = self.operator.private_key.as_deref().ok_or_else(|| {
            anyhow!(
                "operator private key is not set; export MINTLINE_OPERATOR_KEY \
                 (or MY_PRIVATE_KEY) or add [operator] to mintline.toml"
            )
        })?;
        let account_id = raw_id
            .parse::<AccountId>()
            .with_context(|| format!("operator account id `{raw_id}` is malformed"))?;
        let private_key = raw_key
            .parse::<PrivateKey>()
            .context("operator private key is malformed")?;
        Ok((account_id, private_key))
    }
}

fn first_env_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<MintlineConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = MintlineConfig::load_env_file();
        MintlineConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static MintlineConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow!("Failed to load configuration: {}", e))
}
