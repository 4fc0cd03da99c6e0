//! Command execution against the protocol.

use std::time::Duration;

use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::Address,
    providers::{DynProvider, PendingTransactionBuilder},
};
use fastnum::UD256;
use itertools::Itertools;
use tracing::{debug, error, info};
use ucore_sdk::{
    AddressLike, Sdk, TxOptions,
    network::{NATIVE_DECIMALS, NATIVE_SYMBOL},
    num::Converter,
    uai::MINT_RATE_BASIS,
};

use crate::{
    config::{Command, ConfigError, parse_amount},
    error::{Error, Result},
};

/// Protocol client bound to an optional wallet.
#[derive(Debug)]
pub struct Client {
    sdk: Sdk<DynProvider>,
    wallet_address: Option<Address>,
    timeout: Duration,
}

impl Client {
    pub fn new(sdk: Sdk<DynProvider>, wallet_address: Option<Address>, timeout: Duration) -> Self {
        Self {
            sdk,
            wallet_address,
            timeout,
        }
    }

    /// Run a single command and print its result.
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Markets => {
                let deployment = self.sdk.deployment().await?;
                info!(chain_id = deployment.chain_id(), network = ?deployment.network(), "Deployment");
                for market in deployment.markets() {
                    println!(
                        "{}\t{}\t{} ({} decimals)",
                        market.symbol(),
                        market.address(),
                        market.underlying_symbol(),
                        market.underlying_decimals()
                    );
                }
            }
            Command::Price { asset, quote } => match quote {
                Some(quote) => {
                    let price = self.sdk.price_in(&asset, &quote).await?;
                    println!("{asset}: {price} {quote}");
                }
                None => {
                    let price = self.sdk.price(&asset).await?;
                    println!("{asset}: {price} USD");
                }
            },
            Command::Balance { account } => {
                let account = self.account(account)?;
                self.print_balances(account).await?;
            }
            Command::Accrued { account } => {
                let account = self.account(account)?;
                let accrued = self.sdk.ucore_accrued(account).await?;
                println!("{accrued} UCORE");
            }
            Command::Liquidity { account } => {
                let account = self.account(account)?;
                let (liquidity, assets) = futures::try_join!(
                    self.sdk.account_liquidity(account),
                    self.sdk.assets_in(account)
                )?;
                println!("liquidity: {} USD", liquidity.liquidity);
                println!("shortfall: {} USD", liquidity.shortfall);
                println!(
                    "entered: {}",
                    assets
                        .iter()
                        .map(|a| a.symbol.clone().unwrap_or_else(|| a.address.to_string()))
                        .join(", ")
                );
            }
            Command::EnterMarkets { markets } => {
                let options = self.tx_options()?;
                let pending = self.sdk.enter_markets(markets, &options).await?;
                self.confirm("enterMarkets", pending).await?;
            }
            Command::ExitMarket { market } => {
                let options = self.tx_options()?;
                let pending = self.sdk.exit_market(&market, &options).await?;
                self.confirm("exitMarket", pending).await?;
            }
            Command::Delegate { delegatee } => {
                let options = self.tx_options()?;
                let pending = self.sdk.delegate(delegatee, &options).await?;
                self.confirm("delegate", pending).await?;
            }
            Command::MintUai { amount } => {
                let options = self.tx_options()?;
                let pending = self.sdk.mint_uai(parse_amount(&amount)?, &options).await?;
                self.confirm("mintUAI", pending).await?;
            }
            Command::RepayUai { amount, approve } => {
                let options = self.tx_options()?;
                let pending = self
                    .sdk
                    .repay_uai(parse_amount(&amount)?, approve, &options)
                    .await?;
                self.confirm("repayUAI", pending).await?;
            }
            Command::MintRate => {
                let rate = self.sdk.uai_mint_rate().await?;
                println!("{rate} / {MINT_RATE_BASIS}");
            }
        }
        Ok(())
    }

    async fn print_balances(&self, account: Address) -> Result<()> {
        let native = ucore_sdk::eth::balance(self.sdk.provider(), account).await?;
        let native: UD256 = Converter::new(NATIVE_DECIMALS).from_unsigned(native);
        let (ucore, uai) = futures::try_join!(
            self.sdk.ucore_balance(account),
            self.sdk.uai_balance(account)
        )?;
        println!("{NATIVE_SYMBOL}: {native}");
        println!("UCORE: {ucore}");
        println!("UAI: {uai}");

        let deployment = self.sdk.deployment().await?;
        let balances = futures::future::try_join_all(
            deployment
                .markets()
                .iter()
                .map(|market| self.sdk.vtoken_balance(market.symbol(), account)),
        )
        .await?;
        for (market, balance) in deployment.markets().iter().zip(balances) {
            if !balance.is_zero() {
                println!("{}: {balance}", market.symbol());
            }
        }
        Ok(())
    }

    /// Account from the arguments, falling back to the wallet address.
    fn account(&self, account: Option<String>) -> Result<Address> {
        match account {
            Some(account) => Ok(account.to_address("account")?),
            None => self
                .wallet_address
                .ok_or(Error::Config(ConfigError::MissingAccount)),
        }
    }

    fn tx_options(&self) -> Result<TxOptions> {
        let from = self
            .wallet_address
            .ok_or(Error::Config(ConfigError::MissingPrivateKey))?;
        Ok(TxOptions::default().from(from))
    }

    /// Waits for the transaction receipt and reports the outcome.
    async fn confirm(&self, method: &str, pending: PendingTransactionBuilder<Ethereum>) -> Result<()> {
        let tx_hash = *pending.tx_hash();
        info!(method, %tx_hash, "Transaction submitted, waiting for receipt");
        let receipt = pending.with_timeout(Some(self.timeout)).get_receipt().await?;
        debug!(?receipt, "Transaction receipt");
        if !receipt.status() {
            error!(method, %tx_hash, "Transaction failed (reverted)");
            return Err(Error::TransactionReverted(tx_hash));
        }
        info!(
            method,
            %tx_hash,
            block = ?receipt.block_number(),
            gas_used = receipt.gas_used(),
            "Transaction confirmed"
        );
        Ok(())
    }
}
