//! UCORE governance token: balances, rewards and vote delegation.
//!
//! Delegation can be done directly with [`Sdk::delegate`], or off-chain:
//! the delegator signs an EIP-712 `Delegation` message with
//! [`Sdk::create_delegate_signature`] and anyone relays it with
//! [`Sdk::delegate_by_sig`].

use alloy::{
    network::Ethereum,
    primitives::{Address, B256, Signature, U256},
    providers::{PendingTransactionBuilder, Provider},
    signers::Signer,
    sol_types::{Eip712Domain, SolStruct},
};
use fastnum::UD256;
use tracing::debug;

use crate::{
    Sdk,
    abi::{comptroller::Comptroller, typed::Delegation, ucore::UcoreToken},
    error::SdkError,
    eth::{self, TxOptions},
    network::{Contract, UCORE_DECIMALS},
    num::Converter,
    util::AddressLike,
};

/// ECDSA signature split into the `v, r, s` components expected by
/// the `*BySig` contract methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypedSignature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl From<Signature> for TypedSignature {
    fn from(sig: Signature) -> Self {
        Self {
            v: 27 + sig.v() as u8,
            r: sig.r().into(),
            s: sig.s().into(),
        }
    }
}

/// EIP-712 domain without version, as used by the protocol contracts.
pub(crate) fn eip712_domain(name: &str, chain_id: u64, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some(name.to_string().into()),
        None,
        Some(U256::from(chain_id)),
        Some(verifying_contract),
        None,
    )
}

/// Signs EIP-712 digest of `message` with the signer.
pub(crate) async fn sign_typed<S, T>(
    signer: &S,
    message: &T,
    domain: &Eip712Domain,
) -> Result<TypedSignature, SdkError>
where
    S: Signer + Sync,
    T: SolStruct,
{
    let digest = message.eip712_signing_hash(domain);
    let signature = signer.sign_hash(&digest).await?;
    Ok(signature.into())
}

impl<P: Provider + Clone> Sdk<P> {
    /// UCORE balance of the account.
    pub async fn ucore_balance(&self, account: impl AddressLike) -> Result<UD256, SdkError> {
        let account = account.to_address("ucore_balance")?;
        let balance = eth::read(
            self.provider.clone(),
            self.address_of(Contract::UcoreToken).await?,
            UcoreToken::balanceOfCall { account },
        )
        .await?;
        Ok(Converter::new(UCORE_DECIMALS).from_unsigned(balance))
    }

    /// UCORE rewards accrued by the account and not yet claimed.
    pub async fn ucore_accrued(&self, account: impl AddressLike) -> Result<UD256, SdkError> {
        let holder = account.to_address("ucore_accrued")?;
        let accrued = eth::read(
            self.provider.clone(),
            self.address_of(Contract::Comptroller).await?,
            Comptroller::ucoreAccruedCall { holder },
        )
        .await?;
        Ok(Converter::new(UCORE_DECIMALS).from_unsigned(accrued))
    }

    /// Claims all UCORE rewards accrued by the holder across markets.
    pub async fn claim_ucore(
        &self,
        holder: impl AddressLike,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let holder = holder.to_address("claim_ucore")?;
        eth::send(
            eth::prepare(
                self.provider.clone(),
                self.address_of(Contract::Comptroller).await?,
                &Comptroller::claimUcoreCall { holder },
            ),
            options,
        )
        .await
    }

    /// Delegates votes of the sender to `delegatee`.
    pub async fn delegate(
        &self,
        delegatee: impl AddressLike,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let delegatee = delegatee.to_address("delegate")?;
        eth::send(
            eth::prepare(
                self.provider.clone(),
                self.address_of(Contract::UcoreToken).await?,
                &UcoreToken::delegateCall { delegatee },
            ),
            options,
        )
        .await
    }

    /// Relays delegation signed off-chain by the delegator.
    pub async fn delegate_by_sig(
        &self,
        delegatee: impl AddressLike,
        nonce: U256,
        expiry: U256,
        signature: TypedSignature,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let delegatee = delegatee.to_address("delegate_by_sig")?;
        eth::send(
            eth::prepare(
                self.provider.clone(),
                self.address_of(Contract::UcoreToken).await?,
                &UcoreToken::delegateBySigCall {
                    delegatee,
                    nonce,
                    expiry,
                    v: signature.v,
                    r: signature.r,
                    s: signature.s,
                },
            ),
            options,
        )
        .await
    }

    /// Signs delegation of the signer votes to `delegatee`, valid
    /// until `expiry` (unix timestamp).
    ///
    /// The signer's current nonce is read from the token contract.
    pub async fn create_delegate_signature<S: Signer + Sync>(
        &self,
        signer: &S,
        delegatee: impl AddressLike,
        expiry: U256,
    ) -> Result<TypedSignature, SdkError> {
        let delegatee = delegatee.to_address("create_delegate_signature")?;
        let deployment = self.deployment().await?;
        let token = deployment.address(Contract::UcoreToken)?;
        let nonce = eth::read(
            self.provider.clone(),
            token,
            UcoreToken::noncesCall {
                account: signer.address(),
            },
        )
        .await?;
        debug!(delegator = %signer.address(), %delegatee, %nonce, "signing delegation");
        let domain = eip712_domain(
            deployment.ucore_domain_name(),
            deployment.chain_id(),
            token,
        );
        sign_typed(
            signer,
            &Delegation {
                delegatee,
                nonce,
                expiry,
            },
            &domain,
        )
        .await
    }

    /// Votes currently delegated to the account.
    pub async fn current_votes(&self, account: impl AddressLike) -> Result<UD256, SdkError> {
        let account = account.to_address("current_votes")?;
        let votes = eth::read(
            self.provider.clone(),
            self.address_of(Contract::UcoreToken).await?,
            UcoreToken::getCurrentVotesCall { account },
        )
        .await?;
        Ok(Converter::new(UCORE_DECIMALS).from_unsigned(U256::from(votes)))
    }

    /// Delegatee of the account, zero address if none.
    pub async fn delegates(&self, account: impl AddressLike) -> Result<Address, SdkError> {
        let delegator = account.to_address("delegates")?;
        eth::read(
            self.provider.clone(),
            self.address_of(Contract::UcoreToken).await?,
            UcoreToken::delegatesCall { delegator },
        )
        .await
    }
}
