//! Configuration for the protocol command line client.
//!
//! Configuration comes from two sources:
//! - Environment variables (via .env file or shell): connection details, keys,
//!   address overrides
//! - CLI arguments: the command to run

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use fastnum::{UD256, decimal::Context};
use ucore_sdk::{
    AddressLike, Amount,
    network::{Contract, Deployment, Network},
};

/// Environment configuration (connection details, credentials).
#[derive(Debug, Default, serde::Deserialize)]
pub struct EnvConfig {
    /// RPC URL for the node
    pub node_rpc_url: String,

    /// Network name (`mainnet` or `testnet`), resolved from the node chain
    /// ID when omitted
    pub network: Option<String>,

    /// Private key for signing transactions, required by write commands
    pub private_key: Option<String>,

    /// Optional contract address overrides
    pub comptroller_address: Option<String>,
    pub ucore_address: Option<String>,
    pub governor_address: Option<String>,
    pub oracle_address: Option<String>,
    pub uai_address: Option<String>,
    pub uai_controller_address: Option<String>,

    /// Optional timeout for waiting on transaction receipts (default: 60s)
    pub timeout_seconds: Option<u64>,
}

impl EnvConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Parse the configured network.
    pub fn network(&self) -> Result<Option<Network>, ConfigError> {
        self.network
            .as_deref()
            .map(|name| {
                name.parse()
                    .map_err(|_| ConfigError::InvalidNetwork(name.to_string()))
            })
            .transpose()
    }

    /// Parse the contract address overrides.
    pub fn overrides(&self) -> Result<Vec<(Contract, Address)>, ConfigError> {
        [
            (Contract::Comptroller, "comptroller_address", &self.comptroller_address),
            (Contract::UcoreToken, "ucore_address", &self.ucore_address),
            (Contract::Governor, "governor_address", &self.governor_address),
            (Contract::PriceOracle, "oracle_address", &self.oracle_address),
            (Contract::Uai, "uai_address", &self.uai_address),
            (
                Contract::UaiController,
                "uai_controller_address",
                &self.uai_controller_address,
            ),
        ]
        .into_iter()
        .filter_map(|(contract, name, value)| value.as_deref().map(|v| (contract, name, v)))
        .map(|(contract, name, value)| {
            value
                .to_address(name)
                .map(|address| (contract, address))
                .map_err(|e| ConfigError::InvalidAddress(name, e.to_string()))
        })
        .collect()
    }

    /// Applies the address overrides to the deployment.
    pub fn apply_overrides(&self, deployment: Deployment) -> Result<Deployment, ConfigError> {
        Ok(self
            .overrides()?
            .into_iter()
            .fold(deployment, |deployment, (contract, address)| {
                deployment.with_address(contract, address)
            }))
    }
}

/// CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "ucore")]
#[command(about = "Command line client for the UCORE lending protocol")]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List markets of the deployment
    Markets,

    /// Oracle price of an asset in USD, or in another asset
    Price {
        /// Underlying or vToken symbol (e.g., "WBTC" or "vWBTC")
        asset: String,

        /// Asset to quote the price in
        #[arg(long)]
        quote: Option<String>,
    },

    /// Native, UCORE, UAI and vToken balances of an account
    Balance {
        /// Account address, defaults to the wallet address
        account: Option<String>,
    },

    /// UCORE rewards accrued by an account
    Accrued {
        account: Option<String>,
    },

    /// Account liquidity and markets entered
    Liquidity {
        account: Option<String>,
    },

    /// Enter markets (comma-separated, e.g., "vUSDT,CORE")
    EnterMarkets {
        #[arg(required = true, value_delimiter = ',')]
        markets: Vec<String>,
    },

    /// Exit a market
    ExitMarket {
        market: String,
    },

    /// Delegate UCORE votes
    Delegate {
        delegatee: String,
    },

    /// Mint UAI against supplied collateral
    MintUai {
        /// Amount of UAI (e.g., "100.5")
        amount: String,
    },

    /// Repay minted UAI
    RepayUai {
        /// Amount of UAI, or "max" to repay everything
        amount: String,

        /// Approve the UAI controller before repaying
        #[arg(long)]
        approve: bool,
    },

    /// UAI mint rate
    MintRate,
}

/// Parses a decimal amount, `max` selects the whole outstanding balance.
pub fn parse_amount(value: &str) -> Result<Amount, ConfigError> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("max") {
        return Ok(Amount::Max);
    }
    match UD256::from_str(value, Context::default()) {
        Ok(units) if units.is_finite() => Ok(Amount::Units(units)),
        _ => Err(ConfigError::InvalidAmount(value.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("Invalid address for {0}: {1}")]
    InvalidAddress(&'static str, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("PRIVATE_KEY is required for this command")]
    MissingPrivateKey,

    #[error("Account is required when PRIVATE_KEY is not set")]
    MissingAccount,
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use fastnum::udec256;

    use super::*;

    #[test]
    fn test_env_config_network() {
        let config = EnvConfig {
            network: Some("Testnet".to_string()),
            ..Default::default()
        };
        assert_eq!(config.network().unwrap(), Some(Network::Testnet));

        assert_eq!(EnvConfig::default().network().unwrap(), None);

        let config = EnvConfig {
            network: Some("goerli".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.network(),
            Err(ConfigError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_env_config_overrides() {
        let config = EnvConfig {
            oracle_address: Some("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".to_string()),
            ..Default::default()
        };
        let deployment = config.apply_overrides(Deployment::mainnet()).unwrap();
        assert_eq!(
            deployment.address(Contract::PriceOracle).unwrap(),
            address!("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
        );
        assert_eq!(
            deployment.address(Contract::Comptroller).unwrap(),
            Deployment::mainnet().address(Contract::Comptroller).unwrap()
        );

        let config = EnvConfig {
            comptroller_address: Some("0x1234".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.overrides(),
            Err(ConfigError::InvalidAddress("comptroller_address", _))
        ));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.5").unwrap(), Amount::Units(udec256!(12.5)));
        assert_eq!(parse_amount("MAX").unwrap(), Amount::Max);
        assert!(matches!(
            parse_amount("-1"),
            Err(ConfigError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount("ten"),
            Err(ConfigError::InvalidAmount(_))
        ));
        for value in ["inf", "Infinity", "NaN"] {
            assert!(
                matches!(parse_amount(value), Err(ConfigError::InvalidAmount(_))),
                "{value}"
            );
        }
    }

    #[test]
    fn test_cli_parses_commands() {
        let cli = CliConfig::try_parse_from(["ucore", "enter-markets", "vUSDT,CORE"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::EnterMarkets { markets } if markets == ["vUSDT", "CORE"]
        ));

        let cli = CliConfig::try_parse_from(["ucore", "repay-uai", "max", "--approve"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::RepayUai { approve: true, .. }
        ));

        assert!(CliConfig::try_parse_from(["ucore", "enter-markets"]).is_err());
    }
}
