//! Error types for the protocol command line client.

use alloy::primitives::B256;
use ucore_sdk::error::SdkError;

use crate::config::ConfigError;

/// Main error type for the command line client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment configuration error: {0}")]
    EnvConfig(#[from] envy::Error),

    #[error("Alloy signer error: {0}")]
    AlloySigner(#[from] alloy::signers::local::LocalSignerError),

    #[error("Alloy pending transaction error: {0}")]
    AlloyPendingTransaction(#[from] alloy::providers::PendingTransactionError),

    #[error("SDK error: {0}")]
    Sdk(#[from] SdkError),

    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(#[from] url::ParseError),

    #[error("Transaction {0} reverted")]
    TransactionReverted(B256),
}

pub type Result<T> = std::result::Result<T, Error>;
