//! UCORE lending protocol SDK.
//!
//! # Overview
//!
//! Thin client over the deployed protocol contracts: the Comptroller, the
//! UCORE governance token and governor, the price oracle, vToken markets
//! and the UAI stablecoin controller.
//!
//! The SDK only knows which address and ABI to call on which chain.
//! Transport, gas estimation, nonce management and signing are done by
//! the [`alloy`] provider passed to [`Sdk`], all protocol logic lives
//! on-chain.
//!
//! ```ignore
//! use alloy::providers::ProviderBuilder;
//! use ucore_sdk::{Sdk, eth::TxOptions};
//!
//! let provider = ProviderBuilder::new().wallet(wallet).connect_http(rpc_url);
//! let sdk = Sdk::new(provider);
//! let pending = sdk.enter_markets(["vUSDT", "CORE"], &TxOptions::default()).await?;
//! let price = sdk.price("WBTC").await?;
//! ```
//!
//! # Networks
//!
//! Built-in [`network::Deployment`] tables cover [`network::Network::Mainnet`]
//! and [`network::Network::Testnet`]; the network is identified from the
//! provider chain ID once, before the first contract call.
//! Use [`Sdk::with_deployment`] for forks and local deployments.
//!
//! # Testing
//!
//! [`testing`] module provides a mocked provider for exercising the SDK
//! without a node.

pub mod abi;
pub mod controller;
pub mod error;
pub mod eth;
pub mod gov;
pub mod network;
pub mod num;
pub mod price_feed;
pub mod testing;
pub mod uai;
pub mod ucore;
pub mod util;
pub mod vtoken;

use alloy::{primitives::Address, providers::Provider};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::{
    error::SdkError,
    network::{Contract, Deployment, Network},
};

pub use eth::TxOptions;
pub use num::Amount;
pub use util::{AddressLike, Markets};

/// Protocol client bound to a provider.
///
/// Cheap to share by reference; all operations take `&self`.
#[derive(Debug)]
pub struct Sdk<P> {
    provider: P,
    deployment: OnceCell<Deployment>,
}

impl<P: Provider + Clone> Sdk<P> {
    /// Creates SDK which identifies the network by the provider chain ID
    /// before the first contract call.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            deployment: OnceCell::new(),
        }
    }

    /// Creates SDK bound to the built-in deployment of the network.
    pub fn with_network(provider: P, network: Network) -> Self {
        Self::with_deployment(provider, Deployment::for_network(network))
    }

    /// Creates SDK bound to a custom deployment.
    pub fn with_deployment(provider: P, deployment: Deployment) -> Self {
        Self {
            provider,
            deployment: OnceCell::new_with(Some(deployment)),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Deployment the SDK operates on.
    ///
    /// Resolved once; concurrent callers wait for the same resolution
    /// and a failed resolution is retried by the next caller.
    pub async fn deployment(&self) -> Result<&Deployment, SdkError> {
        self.deployment
            .get_or_try_init(|| async {
                let chain_id = self
                    .provider
                    .get_chain_id()
                    .await
                    .map_err(SdkError::from)?;
                debug!(chain_id, "identified network");
                Deployment::for_chain_id(chain_id)
            })
            .await
    }

    /// Built-in network the SDK operates on, `None` for custom deployments
    /// on other chains.
    pub async fn network(&self) -> Result<Option<Network>, SdkError> {
        Ok(self.deployment().await?.network())
    }

    pub(crate) async fn address_of(&self, contract: Contract) -> Result<Address, SdkError> {
        self.deployment().await?.address(contract)
    }
}
