//! Call and transaction dispatch.
//!
//! Every contract interaction of the SDK ends up in [`read`] or
//! [`dispatch`], which delegate encoding, gas estimation, signing and
//! transport to the [`Provider`] the SDK was created with.

use alloy::{
    contract::{CallBuilder, CallDecoder, RawCallBuilder, SolCallBuilder},
    network::Ethereum,
    primitives::{Address, U256},
    providers::{PendingTransactionBuilder, Provider},
    sol_types::SolCall,
};
use tracing::debug;

use crate::error::SdkError;

/// Optional transaction overrides, anything left unset is filled by
/// the provider.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxOptions {
    pub from: Option<Address>,
    pub value: Option<U256>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub nonce: Option<u64>,
}

impl TxOptions {
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn max_fee_per_gas(mut self, max_fee_per_gas: u128) -> Self {
        self.max_fee_per_gas = Some(max_fee_per_gas);
        self
    }

    pub fn max_priority_fee_per_gas(mut self, max_priority_fee_per_gas: u128) -> Self {
        self.max_priority_fee_per_gas = Some(max_priority_fee_per_gas);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// Applies the overrides to the call.
    pub fn apply<P, D>(&self, mut call: CallBuilder<P, D>) -> CallBuilder<P, D>
    where
        P: Provider,
        D: CallDecoder,
    {
        if let Some(from) = self.from {
            call = call.from(from);
        }
        if let Some(value) = self.value {
            call = call.value(value);
        }
        if let Some(gas) = self.gas_limit {
            call = call.gas(gas);
        }
        if let Some(gas_price) = self.gas_price {
            call = call.gas_price(gas_price);
        }
        if let Some(max_fee) = self.max_fee_per_gas {
            call = call.max_fee_per_gas(max_fee);
        }
        if let Some(max_priority_fee) = self.max_priority_fee_per_gas {
            call = call.max_priority_fee_per_gas(max_priority_fee);
        }
        if let Some(nonce) = self.nonce {
            call = call.nonce(nonce);
        }
        call
    }
}

/// Prepares call of `C` on the contract at `to`.
pub fn prepare<P, C>(provider: P, to: Address, call: &C) -> SolCallBuilder<P, C>
where
    P: Provider + Clone,
    C: SolCall,
{
    SolCallBuilder::new_sol(&provider, &to, call).with_cloned_provider()
}

/// Prepares transaction calling `C` on the contract at `to`, with the
/// overrides applied.
pub fn transaction<P, C>(
    provider: P,
    to: Address,
    call: &C,
    options: &TxOptions,
) -> RawCallBuilder<P>
where
    P: Provider + Clone,
    C: SolCall,
{
    debug!(%to, method = C::SIGNATURE, ?options, "preparing transaction");
    options.apply(prepare(provider, to, call)).clear_decoder()
}

/// Executes `eth_call` and decodes the returned data.
pub async fn read<P, C>(provider: P, to: Address, call: C) -> Result<C::Return, SdkError>
where
    P: Provider + Clone,
    C: SolCall,
{
    debug!(%to, method = C::SIGNATURE, "eth_call");
    prepare(provider, to, &call)
        .call()
        .await
        .map_err(SdkError::from)
}

/// Sends the prepared call as a transaction.
pub async fn send<P, C>(
    call: SolCallBuilder<P, C>,
    options: &TxOptions,
) -> Result<PendingTransactionBuilder<Ethereum>, SdkError>
where
    P: Provider + Clone,
    C: SolCall,
{
    debug!(method = C::SIGNATURE, ?options, "sending transaction");
    dispatch(options.apply(call)).await
}

/// Sends the call as is, overrides must be applied already.
pub async fn dispatch<P, D>(
    call: CallBuilder<P, D>,
) -> Result<PendingTransactionBuilder<Ethereum>, SdkError>
where
    P: Provider,
    D: CallDecoder,
{
    let pending = call.send().await.map_err(SdkError::from)?;
    debug!(tx_hash = %pending.tx_hash(), "transaction sent");
    Ok(pending)
}

/// Native coin balance of the account.
pub async fn balance<P: Provider>(provider: &P, account: Address) -> Result<U256, SdkError> {
    provider
        .get_balance(account)
        .await
        .map_err(SdkError::from)
}
