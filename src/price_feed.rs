//! Asset prices from the protocol oracle.

use alloy::{primitives::U256, providers::Provider};
use fastnum::UD256;

use crate::{
    Sdk,
    abi::oracle::PriceOracle,
    error::SdkError,
    eth,
    network::{Contract, Market},
    num::Converter,
};

/// Oracle prices are USD mantissas scaled by `1e(36 - underlying decimals)`.
const ORACLE_PRICE_SCALE: u8 = 36;

/// Converts raw oracle price of the market underlying into USD per
/// whole unit of the underlying.
pub fn underlying_price_usd(market: &Market, mantissa: U256) -> UD256 {
    Converter::new(ORACLE_PRICE_SCALE.saturating_sub(market.underlying_decimals()))
        .from_unsigned(mantissa)
}

impl<P: Provider + Clone> Sdk<P> {
    /// USD price of the asset, named by either underlying or vToken symbol.
    pub async fn price(&self, asset: &str) -> Result<UD256, SdkError> {
        self.price_of("price", asset).await
    }

    /// Price of `asset` denominated in `quote`.
    pub async fn price_in(&self, asset: &str, quote: &str) -> Result<UD256, SdkError> {
        let asset_price = self.price_of("price_in", asset).await?;
        let quote_price = self.price_of("price_in", quote).await?;
        if quote_price.is_zero() {
            return Err(SdkError::invalid_argument(
                "price_in",
                format!("price of `{quote}` is zero"),
            ));
        }
        Ok(asset_price / quote_price)
    }

    async fn price_of(&self, func: &'static str, asset: &str) -> Result<UD256, SdkError> {
        let deployment = self.deployment().await?;
        let (market, _) = deployment.resolve_asset(func, asset)?;
        let mantissa = eth::read(
            self.provider.clone(),
            deployment.address(Contract::PriceOracle)?,
            PriceOracle::getUnderlyingPriceCall {
                vToken: market.address(),
            },
        )
        .await?;
        Ok(underlying_price_usd(market, mantissa))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use fastnum::udec256;

    use super::*;
    use crate::{network::Network, num::scale, testing::MockChain};

    #[test]
    fn test_underlying_price_scaling() {
        let usdt = Market::token(Address::ZERO, "USDT", Address::ZERO, 6);
        assert_eq!(underlying_price_usd(&usdt, scale(1, 30)), udec256!(1));

        let wbtc = Market::token(Address::ZERO, "WBTC", Address::ZERO, 8);
        assert_eq!(
            underlying_price_usd(&wbtc, scale(65_000, 28)),
            udec256!(65000)
        );

        let core = Market::native(Address::ZERO);
        assert_eq!(
            underlying_price_usd(&core, U256::from(750_000_000_000_000_000u128)),
            udec256!(0.75)
        );
    }

    #[tokio::test]
    async fn test_price() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Mainnet);
        mock.push_return::<PriceOracle::getUnderlyingPriceCall>(&scale(3_000, 18));
        assert_eq!(sdk.price("WETH").await.unwrap(), udec256!(3000));

        assert!(matches!(
            sdk.price("DOGE").await,
            Err(SdkError::InvalidArgument { func: "price", .. })
        ));
    }

    #[tokio::test]
    async fn test_price_in() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Testnet);
        mock.push_return::<PriceOracle::getUnderlyingPriceCall>(&scale(60_000, 28));
        mock.push_return::<PriceOracle::getUnderlyingPriceCall>(&scale(3_000, 18));
        assert_eq!(sdk.price_in("WBTC", "WETH").await.unwrap(), udec256!(20));
    }

    #[tokio::test]
    async fn test_price_in_zero_quote() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Testnet);
        mock.push_return::<PriceOracle::getUnderlyingPriceCall>(&scale(1, 30));
        mock.push_return::<PriceOracle::getUnderlyingPriceCall>(&U256::ZERO);
        assert!(matches!(
            sdk.price_in("USDT", "USDC").await,
            Err(SdkError::InvalidArgument { func: "price_in", .. })
        ));
    }
}
