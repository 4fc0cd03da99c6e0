//! Market membership and account liquidity via the Comptroller.

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{PendingTransactionBuilder, Provider},
};
use fastnum::UD256;

use crate::{
    Sdk,
    abi::comptroller::Comptroller,
    error::SdkError,
    eth::{self, TxOptions},
    network::{Contract, Deployment},
    num::Converter,
    util::{AddressLike, Markets},
};

/// Liquidity and shortfall are USD values with 18 decimals.
const LIQUIDITY_DECIMALS: u8 = 18;

/// Account liquidity as reported by the Comptroller.
///
/// At most one of `liquidity` and `shortfall` is non-zero, an account with
/// shortfall is subject to liquidation.
#[derive(Clone, Copy, derive_more::Debug, PartialEq)]
pub struct AccountLiquidity {
    /// Comptroller error code, `0` on success.
    pub error: U256,
    #[debug("{liquidity}")]
    pub liquidity: UD256,
    #[debug("{shortfall}")]
    pub shortfall: UD256,
}

/// Entry of [`Sdk::assets_in`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetIn {
    pub address: Address,
    /// vToken symbol, if the market is known to the deployment.
    pub symbol: Option<String>,
}

impl<P: Provider + Clone> Sdk<P> {
    /// Enters the markets so supplied assets count as collateral.
    ///
    /// Accepts a single symbol or a list; `v` prefix may be omitted.
    pub async fn enter_markets(
        &self,
        markets: impl Into<Markets>,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let deployment = self.deployment().await?;
        let call = self.enter_markets_call(deployment, markets.into())?;
        eth::send(
            eth::prepare(
                self.provider.clone(),
                deployment.address(Contract::Comptroller)?,
                &call,
            ),
            options,
        )
        .await
    }

    /// Exits the market, removing the supplied asset from collateral.
    pub async fn exit_market(
        &self,
        market: &str,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        let deployment = self.deployment().await?;
        let vtoken = deployment.resolve_market("exit_market", market)?.address();
        eth::send(
            eth::prepare(
                self.provider.clone(),
                deployment.address(Contract::Comptroller)?,
                &Comptroller::exitMarketCall { vToken: vtoken },
            ),
            options,
        )
        .await
    }

    /// Markets the account has entered.
    pub async fn assets_in(&self, account: impl AddressLike) -> Result<Vec<AssetIn>, SdkError> {
        let account = account.to_address("assets_in")?;
        let deployment = self.deployment().await?;
        let assets = eth::read(
            self.provider.clone(),
            deployment.address(Contract::Comptroller)?,
            Comptroller::getAssetsInCall { account },
        )
        .await?;
        Ok(assets
            .into_iter()
            .map(|address| AssetIn {
                address,
                symbol: deployment
                    .market_by_address(address)
                    .map(|m| m.symbol().to_string()),
            })
            .collect())
    }

    /// Hypothetical account liquidity in USD.
    pub async fn account_liquidity(
        &self,
        account: impl AddressLike,
    ) -> Result<AccountLiquidity, SdkError> {
        let account = account.to_address("account_liquidity")?;
        let ret = eth::read(
            self.provider.clone(),
            self.address_of(Contract::Comptroller).await?,
            Comptroller::getAccountLiquidityCall { account },
        )
        .await?;
        let converter = Converter::new(LIQUIDITY_DECIMALS);
        Ok(AccountLiquidity {
            error: ret.err,
            liquidity: converter.from_unsigned(ret.liquidity),
            shortfall: converter.from_unsigned(ret.shortfall),
        })
    }

    fn enter_markets_call(
        &self,
        deployment: &Deployment,
        markets: Markets,
    ) -> Result<Comptroller::enterMarketsCall, SdkError> {
        let vtokens = markets
            .symbols()
            .iter()
            .map(|symbol| {
                deployment
                    .resolve_market("enter_markets", symbol)
                    .map(|m| m.address())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Comptroller::enterMarketsCall { vTokens: vtokens })
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use fastnum::udec256;

    use super::*;
    use crate::{network::Network, testing::MockChain};

    #[test]
    fn test_enter_markets_resolves_symbols() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Mainnet);
        let deployment = Deployment::mainnet();

        let call = sdk
            .enter_markets_call(&deployment, Markets::from(["vUSDT", "CORE"]))
            .unwrap();
        assert_eq!(
            call.vTokens,
            vec![
                address!("0xb630413d2f942e706b310d42b8d8132c78dcc5ee"),
                address!("0xcc61952315b2684478fe475d6250bcad017f4061"),
            ]
        );

        // Single symbol is wrapped into a list
        let call = sdk
            .enter_markets_call(&deployment, Markets::from("WETH"))
            .unwrap();
        assert_eq!(
            call.vTokens,
            vec![address!("0xba09ca8c7bd86e1108348e54b72443a77df95473")]
        );

        let call = sdk
            .enter_markets_call(&deployment, Markets::default())
            .unwrap();
        assert!(call.vTokens.is_empty());
    }

    #[tokio::test]
    async fn test_enter_markets_rejects_unknown_market() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Testnet);
        let err = sdk
            .enter_markets(vec!["vUSDT", "vDOGE"], &TxOptions::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[enter_markets] market `vDOGE` is not a recognized vToken"
        );
    }

    #[tokio::test]
    async fn test_enter_and_exit_markets_send_transactions() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Mainnet);
        let from = TxOptions::default().from(Address::repeat_byte(0x01));

        let tx_hash = mock.push_tx_hash();
        let pending = sdk.enter_markets("USDC", &from).await.unwrap();
        assert_eq!(*pending.tx_hash(), tx_hash);

        let tx_hash = mock.push_tx_hash();
        let pending = sdk.exit_market("vUSDC", &from).await.unwrap();
        assert_eq!(*pending.tx_hash(), tx_hash);

        assert!(matches!(
            sdk.exit_market("", &from).await,
            Err(SdkError::InvalidArgument {
                func: "exit_market",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_assets_in_maps_known_markets() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Mainnet);
        let unknown = Address::repeat_byte(0x99);
        mock.push_return::<Comptroller::getAssetsInCall>(&vec![
            address!("0x4f9905f330a5b8c7bfab68eb281914cfe0fa300a"),
            unknown,
        ]);

        let assets = sdk.assets_in(Address::repeat_byte(0x01)).await.unwrap();
        assert_eq!(
            assets,
            vec![
                AssetIn {
                    address: address!("0x4f9905f330a5b8c7bfab68eb281914cfe0fa300a"),
                    symbol: Some("vWBTC".to_string()),
                },
                AssetIn {
                    address: unknown,
                    symbol: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_account_liquidity() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Mainnet);
        mock.push_return::<Comptroller::getAccountLiquidityCall>(
            &Comptroller::getAccountLiquidityReturn {
                err: U256::ZERO,
                liquidity: U256::from(1_250_000_000_000_000_000u128),
                shortfall: U256::ZERO,
            },
        );

        let liquidity = sdk
            .account_liquidity("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
            .await
            .unwrap();
        assert_eq!(liquidity.error, U256::ZERO);
        assert_eq!(liquidity.liquidity, udec256!(1.25));
        assert_eq!(liquidity.shortfall, UD256::ZERO);

        assert!(matches!(
            sdk.account_liquidity("0x1234").await,
            Err(SdkError::InvalidAddress {
                func: "account_liquidity",
                ..
            })
        ));
    }
}
