//! UAI stablecoin minted against supplied collateral.

use alloy::{
    network::Ethereum,
    primitives::U256,
    providers::{PendingTransactionBuilder, Provider},
};
use fastnum::UD256;

use crate::{
    Sdk,
    abi::{comptroller::Comptroller, erc20::IERC20, uai::UaiController},
    error::SdkError,
    eth::{self, TxOptions},
    network::{Contract, UAI_DECIMALS},
    num::{Amount, Converter},
    util::AddressLike,
    vtoken::mantissa,
};

/// Mint rate is expressed in basis points of the collateral value.
pub const MINT_RATE_BASIS: u32 = 10_000;

/// Result of [`Sdk::mintable_uai`].
#[derive(Clone, Copy, derive_more::Debug, PartialEq)]
pub struct MintableUai {
    /// Controller error code, `0` on success.
    pub error: U256,
    #[debug("{amount}")]
    pub amount: UD256,
}

fn mint_uai_call(amount: Amount) -> Result<UaiController::mintUAICall, SdkError> {
    Ok(UaiController::mintUAICall {
        mintUAIAmount: mantissa("mint_uai", amount, UAI_DECIMALS, false)?,
    })
}

/// [`Amount::Max`] repays the whole minted balance.
fn repay_uai_call(amount: Amount) -> Result<UaiController::repayUAICall, SdkError> {
    Ok(UaiController::repayUAICall {
        repayUAIAmount: mantissa("repay_uai", amount, UAI_DECIMALS, true)?,
    })
}

impl<P: Provider + Clone> Sdk<P> {
    /// Mints UAI against the account collateral.
    pub async fn mint_uai(
        &self,
        amount: impl Into<Amount>,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let call = mint_uai_call(amount.into())?;
        eth::send(
            eth::prepare(
                self.provider.clone(),
                self.address_of(Contract::UaiController).await?,
                &call,
            ),
            options,
        )
        .await
    }

    /// Repays minted UAI, approving the controller first when `approve` is set.
    pub async fn repay_uai(
        &self,
        amount: impl Into<Amount>,
        approve: bool,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let call = repay_uai_call(amount.into())?;
        let deployment = self.deployment().await?;
        let controller = deployment.address(Contract::UaiController)?;
        if approve {
            let uai = deployment.address(Contract::Uai)?;
            self.approve_and_wait(uai, controller, call.repayUAIAmount, options)
                .await?;
        }
        eth::send(
            eth::prepare(self.provider.clone(), controller, &call),
            options,
        )
        .await
    }

    /// UAI mint rate in basis points, see [`MINT_RATE_BASIS`].
    pub async fn uai_mint_rate(&self) -> Result<U256, SdkError> {
        eth::read(
            self.provider.clone(),
            self.address_of(Contract::Comptroller).await?,
            Comptroller::getUAIMintRateCall {},
        )
        .await
    }

    /// UAI the account can still mint.
    pub async fn mintable_uai(&self, account: impl AddressLike) -> Result<MintableUai, SdkError> {
        let minter = account.to_address("mintable_uai")?;
        let ret = eth::read(
            self.provider.clone(),
            self.address_of(Contract::UaiController).await?,
            UaiController::getMintableUAICall { minter },
        )
        .await?;
        Ok(MintableUai {
            error: ret.err,
            amount: Converter::new(UAI_DECIMALS).from_unsigned(ret.amount),
        })
    }

    /// UAI minted by the account, as tracked by the Comptroller.
    pub async fn minted_uai(&self, account: impl AddressLike) -> Result<UD256, SdkError> {
        let owner = account.to_address("minted_uai")?;
        let minted = eth::read(
            self.provider.clone(),
            self.address_of(Contract::Comptroller).await?,
            Comptroller::mintedUAIsCall { owner },
        )
        .await?;
        Ok(Converter::new(UAI_DECIMALS).from_unsigned(minted))
    }

    pub async fn uai_balance(&self, account: impl AddressLike) -> Result<UD256, SdkError> {
        let owner = account.to_address("uai_balance")?;
        let balance = eth::read(
            self.provider.clone(),
            self.address_of(Contract::Uai).await?,
            IERC20::balanceOfCall { owner },
        )
        .await?;
        Ok(Converter::new(UAI_DECIMALS).from_unsigned(balance))
    }
}
