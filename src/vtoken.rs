//! vToken markets: supply, redeem, borrow and repay.
//!
//! Assets are named by underlying symbol (`USDT`, `CORE`) or by vToken
//! symbol (`vUSDT`). Amounts are in the underlying asset, except for
//! [`Sdk::redeem`] named by vToken symbol, which redeems vTokens.
//!
//! Native coin markets take the amount as transaction value, token markets
//! move the underlying via allowance. Operations with `approve` set send the
//! `approve` transaction first and wait for its receipt.

use alloy::{
    contract::RawCallBuilder,
    network::{Ethereum, ReceiptResponse},
    primitives::{Address, U256},
    providers::{PendingTransactionBuilder, Provider},
};
use fastnum::UD256;
use tracing::{debug, warn};

use crate::{
    Sdk,
    abi::{
        erc20::IERC20,
        vtoken::{VCore, VToken},
    },
    error::{RevertReason, SdkError},
    eth::{self, TxOptions},
    network::{AssetRef, Market, VTOKEN_DECIMALS},
    num::{Amount, Converter},
    util::AddressLike,
};

/// Rates and exchange rate mantissas carry 18 decimals.
const MANTISSA_DECIMALS: u8 = 18;

/// Validates the amount and converts it into the on-chain mantissa.
pub(crate) fn mantissa(
    func: &'static str,
    amount: Amount,
    decimals: u8,
    allow_max: bool,
) -> Result<U256, SdkError> {
    if amount == Amount::Max && !allow_max {
        return Err(SdkError::invalid_argument(
            func,
            "maximum amount is not supported",
        ));
    }
    let mantissa = amount
        .to_mantissa(decimals)
        .map_err(|e| SdkError::invalid_argument(func, e.to_string()))?;
    if mantissa.is_zero() {
        return Err(SdkError::invalid_argument(func, "amount must be positive"));
    }
    Ok(mantissa)
}

/// Overrides of the `approve` transaction. Nonce and value belong to the
/// main transaction.
fn approve_options(options: &TxOptions) -> TxOptions {
    TxOptions {
        nonce: None,
        value: None,
        ..options.clone()
    }
}

/// Decimals of the exchange rate mantissa of the market.
fn exchange_rate_decimals(market: &Market) -> u8 {
    (MANTISSA_DECIMALS + market.underlying_decimals()).saturating_sub(VTOKEN_DECIMALS)
}

impl<P: Provider + Clone> Sdk<P> {
    /// Supplies the underlying asset and mints vTokens.
    pub async fn supply(
        &self,
        asset: &str,
        amount: impl Into<Amount>,
        approve: bool,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset("supply", asset)?;
        let amount = mantissa("supply", amount.into(), market.underlying_decimals(), false)?;
        if approve {
            self.approve_underlying(market, amount, options).await?;
        }
        eth::dispatch(self.mint_tx(market, amount, options)).await
    }

    /// Redeems vTokens for the underlying asset.
    ///
    /// Named by vToken symbol the amount is in vTokens, named by underlying
    /// symbol it is the amount of underlying to receive.
    pub async fn redeem(
        &self,
        asset: &str,
        amount: impl Into<Amount>,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let deployment = self.deployment().await?;
        let (market, asset_ref) = deployment.resolve_asset("redeem", asset)?;
        eth::dispatch(self.redeem_tx(market, asset_ref, amount.into(), options)?).await
    }

    /// Borrows the underlying asset against entered collateral.
    pub async fn borrow(
        &self,
        asset: &str,
        amount: impl Into<Amount>,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset("borrow", asset)?;
        let amount = mantissa("borrow", amount.into(), market.underlying_decimals(), false)?;
        eth::send(
            eth::prepare(
                self.provider.clone(),
                market.address(),
                &VToken::borrowCall {
                    borrowAmount: amount,
                },
            ),
            options,
        )
        .await
    }

    /// Repays borrowed underlying, on behalf of `borrower` when given.
    ///
    /// [`Amount::Max`] repays the whole outstanding debt of token markets.
    pub async fn repay_borrow(
        &self,
        asset: &str,
        amount: impl Into<Amount>,
        borrower: Option<Address>,
        approve: bool,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset("repay_borrow", asset)?;
        let amount = mantissa(
            "repay_borrow",
            amount.into(),
            market.underlying_decimals(),
            !market.is_native(),
        )?;
        if approve {
            self.approve_underlying(market, amount, options).await?;
        }
        eth::dispatch(self.repay_borrow_tx(market, amount, borrower, options)).await
    }

    /// Mint transaction, native markets take the amount as value.
    fn mint_tx(&self, market: &Market, amount: U256, options: &TxOptions) -> RawCallBuilder<P> {
        if market.is_native() {
            eth::transaction(
                self.provider.clone(),
                market.address(),
                &VCore::mintCall {},
                &options.clone().value(amount),
            )
        } else {
            eth::transaction(
                self.provider.clone(),
                market.address(),
                &VToken::mintCall { mintAmount: amount },
                options,
            )
        }
    }

    fn redeem_tx(
        &self,
        market: &Market,
        asset_ref: AssetRef,
        amount: Amount,
        options: &TxOptions,
    ) -> Result<RawCallBuilder<P>, SdkError> {
        match asset_ref {
            AssetRef::VToken => {
                let tokens = mantissa("redeem", amount, VTOKEN_DECIMALS, false)?;
                Ok(eth::transaction(
                    self.provider.clone(),
                    market.address(),
                    &VToken::redeemCall {
                        redeemTokens: tokens,
                    },
                    options,
                ))
            }
            AssetRef::Underlying => {
                let underlying = mantissa("redeem", amount, market.underlying_decimals(), false)?;
                Ok(eth::transaction(
                    self.provider.clone(),
                    market.address(),
                    &VToken::redeemUnderlyingCall {
                        redeemAmount: underlying,
                    },
                    options,
                ))
            }
        }
    }

    /// Repay transaction, native markets take the amount as value.
    fn repay_borrow_tx(
        &self,
        market: &Market,
        amount: U256,
        borrower: Option<Address>,
        options: &TxOptions,
    ) -> RawCallBuilder<P> {
        let vtoken = market.address();
        let provider = self.provider.clone();
        match (market.is_native(), borrower) {
            (true, Some(borrower)) => eth::transaction(
                provider,
                vtoken,
                &VCore::repayBorrowBehalfCall { borrower },
                &options.clone().value(amount),
            ),
            (true, None) => eth::transaction(
                provider,
                vtoken,
                &VCore::repayBorrowCall {},
                &options.clone().value(amount),
            ),
            (false, Some(borrower)) => eth::transaction(
                provider,
                vtoken,
                &VToken::repayBorrowBehalfCall {
                    borrower,
                    repayAmount: amount,
                },
                options,
            ),
            (false, None) => eth::transaction(
                provider,
                vtoken,
                &VToken::repayBorrowCall {
                    repayAmount: amount,
                },
                options,
            ),
        }
    }

    async fn approve_underlying(
        &self,
        market: &Market,
        amount: U256,
        options: &TxOptions,
    ) -> Result<(), SdkError> {
        match market.underlying_address() {
            Some(underlying) => {
                self.approve_and_wait(underlying, market.address(), amount, options)
                    .await
            }
            None => {
                warn!(market = market.symbol(), "native market, approval skipped");
                Ok(())
            }
        }
    }

    /// vToken balance of the account.
    pub async fn vtoken_balance(
        &self,
        asset: &str,
        account: impl AddressLike,
    ) -> Result<UD256, SdkError> {
        let owner = account.to_address("vtoken_balance")?;
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset("vtoken_balance", asset)?;
        let balance = eth::read(
            self.provider.clone(),
            market.address(),
            VToken::balanceOfCall { owner },
        )
        .await?;
        Ok(Converter::new(VTOKEN_DECIMALS).from_unsigned(balance))
    }

    /// Outstanding borrow of the account in the underlying asset, as of
    /// the last interest accrual.
    pub async fn borrow_balance(
        &self,
        asset: &str,
        account: impl AddressLike,
    ) -> Result<UD256, SdkError> {
        let account = account.to_address("borrow_balance")?;
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset("borrow_balance", asset)?;
        let balance = eth::read(
            self.provider.clone(),
            market.address(),
            VToken::borrowBalanceStoredCall { account },
        )
        .await?;
        Ok(Converter::new(market.underlying_decimals()).from_unsigned(balance))
    }

    /// Underlying units per vToken.
    pub async fn exchange_rate(&self, asset: &str) -> Result<UD256, SdkError> {
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset("exchange_rate", asset)?;
        let rate = eth::read(
            self.provider.clone(),
            market.address(),
            VToken::exchangeRateStoredCall {},
        )
        .await?;
        Ok(Converter::new(exchange_rate_decimals(market)).from_unsigned(rate))
    }

    pub async fn supply_rate_per_block(&self, asset: &str) -> Result<UD256, SdkError> {
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset("supply_rate_per_block", asset)?;
        let rate = eth::read(
            self.provider.clone(),
            market.address(),
            VToken::supplyRatePerBlockCall {},
        )
        .await?;
        Ok(Converter::new(MANTISSA_DECIMALS).from_unsigned(rate))
    }

    pub async fn borrow_rate_per_block(&self, asset: &str) -> Result<UD256, SdkError> {
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset("borrow_rate_per_block", asset)?;
        let rate = eth::read(
            self.provider.clone(),
            market.address(),
            VToken::borrowRatePerBlockCall {},
        )
        .await?;
        Ok(Converter::new(MANTISSA_DECIMALS).from_unsigned(rate))
    }

    /// Approves `spender` to pull `amount` of `token` and waits until the
    /// approval is mined.
    pub(crate) async fn approve_and_wait(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
        options: &TxOptions,
    ) -> Result<(), SdkError> {
        if options.nonce.is_some() {
            warn!(%token, "nonce override ignored for approve transaction");
        }
        let pending = eth::send(
            eth::prepare(
                self.provider.clone(),
                token,
                &IERC20::approveCall { spender, amount },
            ),
            &approve_options(options),
        )
        .await?;
        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(SdkError::Reverted(Box::new(RevertReason::Generic(
                format!("approve transaction {} reverted", receipt.transaction_hash()),
            ))));
        }
        debug!(%token, %spender, tx_hash = %receipt.transaction_hash(), "approve mined");
        Ok(())
    }
}
