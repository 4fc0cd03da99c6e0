//! Command line client for the UCORE lending protocol.
//!
//! Reads connection details from the environment and runs a single
//! command, see `ucore --help`.

mod client;
mod config;
mod error;

use std::{process::exit, time::Duration};

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::RpcClient,
    signers::local::PrivateKeySigner,
};
use clap::Parser;
use tracing::error;
use ucore_sdk::{Sdk, error::SdkError, network::Deployment};
use url::Url;

use client::Client;
use config::{CliConfig, EnvConfig};
use error::Result;

#[tokio::main]
async fn main() {
    // Load .env file
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Warning: Failed to load .env file: {}", e);
    }

    // Parse environment configuration
    let env_config = match EnvConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to parse environment configuration: {}", e);
            exit(1);
        }
    };

    // Parse CLI arguments
    let cli_config = CliConfig::parse();

    // Set up logging
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = match connect(&env_config).await {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to connect: {}", e);
            exit(1);
        }
    };

    if let Err(e) = client.run(cli_config.command).await {
        error!(%e, "Command failed");
        exit(1);
    }
}

/// Build the provider and the SDK from the environment configuration.
async fn connect(env_config: &EnvConfig) -> Result<Client> {
    let node_url = Url::parse(&env_config.node_rpc_url)?;
    let rpc_client = RpcClient::new_http(node_url);

    let signer = env_config
        .private_key
        .as_deref()
        .map(str::parse::<PrivateKeySigner>)
        .transpose()?;
    let wallet_address = signer.as_ref().map(|s| s.address());

    let provider = match signer {
        Some(signer) => DynProvider::new(
            ProviderBuilder::new()
                .wallet(EthereumWallet::new(signer))
                .connect_client(rpc_client),
        ),
        None => DynProvider::new(ProviderBuilder::new().connect_client(rpc_client)),
    };

    let network = env_config.network()?;
    let overrides = env_config.overrides()?;
    let sdk = if network.is_none() && overrides.is_empty() {
        Sdk::new(provider)
    } else {
        let deployment = match network {
            Some(network) => Deployment::for_network(network),
            None => {
                let chain_id = provider.get_chain_id().await.map_err(SdkError::from)?;
                Deployment::for_chain_id(chain_id)?
            }
        };
        Sdk::with_deployment(provider, env_config.apply_overrides(deployment)?)
    };

    let timeout = Duration::from_secs(env_config.timeout_seconds.unwrap_or(60));
    Ok(Client::new(sdk, wallet_address, timeout))
}
