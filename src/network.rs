//! Per-network deployment tables.
//!
//! [`Deployment`] maps protocol contracts and vToken markets to their
//! addresses on a given chain. Built-in tables cover every [`Network`] the
//! protocol is deployed to, [`Deployment::custom`] together with
//! [`Deployment::with_address`] and [`Deployment::with_market`] cover forks
//! and local deployments.

use std::{collections::HashMap, fmt, str::FromStr};

use alloy::primitives::{Address, address};

use crate::error::SdkError;

/// Decimals of every vToken.
pub const VTOKEN_DECIMALS: u8 = 8;

/// Symbol of the chain native coin.
pub const NATIVE_SYMBOL: &str = "CORE";

pub const NATIVE_DECIMALS: u8 = 18;

/// Decimals of the UCORE governance token and the UAI stablecoin.
pub const UCORE_DECIMALS: u8 = 18;
pub const UAI_DECIMALS: u8 = 18;

/// EIP-712 domain name of the UCORE token.
pub const UCORE_DOMAIN_NAME: &str = "Ucore";

/// EIP-712 domain name of the governor.
pub const GOVERNOR_DOMAIN_NAME: &str = "Ucore Governor Bravo";

/// Networks with built-in deployment tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub const ALL: [Network; 2] = [Network::Mainnet, Network::Testnet];

    pub const fn chain_id(self) -> u64 {
        match self {
            Network::Mainnet => 1116,
            Network::Testnet => 1115,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u64> for Network {
    type Error = SdkError;

    fn try_from(chain_id: u64) -> Result<Self, Self::Error> {
        Network::ALL
            .into_iter()
            .find(|n| n.chain_id() == chain_id)
            .ok_or(SdkError::UnsupportedNetwork(chain_id))
    }
}

impl FromStr for Network {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|n| n.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SdkError::invalid_argument("network", format!("unknown network `{s}`")))
    }
}

/// Protocol contracts with a single address per network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Contract {
    Comptroller,
    UcoreToken,
    Governor,
    PriceOracle,
    Uai,
    UaiController,
}

impl Contract {
    pub const ALL: [Contract; 6] = [
        Contract::Comptroller,
        Contract::UcoreToken,
        Contract::Governor,
        Contract::PriceOracle,
        Contract::Uai,
        Contract::UaiController,
    ];
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Contract::Comptroller => "Comptroller",
            Contract::UcoreToken => "UCORE",
            Contract::Governor => "Governor",
            Contract::PriceOracle => "PriceOracle",
            Contract::Uai => "UAI",
            Contract::UaiController => "UaiController",
        })
    }
}

/// Asset supplied to a vToken market.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Underlying {
    /// Chain native coin, moved as transaction value.
    Native,
    /// ERC-20 token, moved via allowance.
    Token {
        symbol: String,
        address: Address,
        decimals: u8,
    },
}

/// vToken market.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Market {
    symbol: String,
    address: Address,
    underlying: Underlying,
}

impl Market {
    pub fn new(symbol: impl Into<String>, address: Address, underlying: Underlying) -> Self {
        Self {
            symbol: symbol.into(),
            address,
            underlying,
        }
    }

    /// Market for an ERC-20 underlying, vToken symbol is derived from the
    /// underlying one.
    pub fn token(
        address: Address,
        underlying_symbol: &str,
        underlying_address: Address,
        decimals: u8,
    ) -> Self {
        Self::new(
            format!("v{underlying_symbol}"),
            address,
            Underlying::Token {
                symbol: underlying_symbol.to_string(),
                address: underlying_address,
                decimals,
            },
        )
    }

    pub fn native(address: Address) -> Self {
        Self::new(format!("v{NATIVE_SYMBOL}"), address, Underlying::Native)
    }

    /// vToken symbol, e.g. `vUSDT`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// vToken address.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn underlying(&self) -> &Underlying {
        &self.underlying
    }

    pub fn is_native(&self) -> bool {
        matches!(self.underlying, Underlying::Native)
    }

    pub fn underlying_symbol(&self) -> &str {
        match &self.underlying {
            Underlying::Native => NATIVE_SYMBOL,
            Underlying::Token { symbol, .. } => symbol,
        }
    }

    pub fn underlying_address(&self) -> Option<Address> {
        match &self.underlying {
            Underlying::Native => None,
            Underlying::Token { address, .. } => Some(*address),
        }
    }

    pub fn underlying_decimals(&self) -> u8 {
        match &self.underlying {
            Underlying::Native => NATIVE_DECIMALS,
            Underlying::Token { decimals, .. } => *decimals,
        }
    }
}

/// How an asset was named by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetRef {
    /// By vToken symbol, amounts are in vTokens.
    VToken,
    /// By underlying symbol, amounts are in the underlying asset.
    Underlying,
}

/// Protocol deployment on a specific chain.
#[derive(Clone, Debug)]
pub struct Deployment {
    chain_id: u64,
    contracts: HashMap<Contract, Address>,
    markets: Vec<Market>,
    ucore_domain_name: String,
    governor_domain_name: String,
}

impl Deployment {
    pub fn mainnet() -> Self {
        Self::custom(Network::Mainnet.chain_id())
            .with_address(
                Contract::Comptroller,
                address!("0x371df3cdef92464e9968477f5b254e042c3ab585"),
            )
            .with_address(
                Contract::UcoreToken,
                address!("0x8aa82e5de899bc94458efa64fd41d3bf601ccfcc"),
            )
            .with_address(
                Contract::Governor,
                address!("0xe63e9783f23e0fad4fd1353df87fcdecaeabc3c1"),
            )
            .with_address(
                Contract::PriceOracle,
                address!("0xd0ee5aeec0e477b271dccfcd0e174394e138a95c"),
            )
            .with_address(
                Contract::Uai,
                address!("0xc11afa212f182e4d2a2ccf27ca42e7f26f51926c"),
            )
            .with_address(
                Contract::UaiController,
                address!("0xd4c43153c08515ae2842f0d6e8caef75bf0aad73"),
            )
            .with_market(Market::native(address!(
                "0xcc61952315b2684478fe475d6250bcad017f4061"
            )))
            .with_market(Market::token(
                address!("0xb630413d2f942e706b310d42b8d8132c78dcc5ee"),
                "USDT",
                address!("0x2bfb8a01b85f0560dc495dcefe6f954aca2e54bc"),
                6,
            ))
            .with_market(Market::token(
                address!("0x78a6083ae79355477c399ae853196d5851e5fef6"),
                "USDC",
                address!("0x01fb07d13c9ccccf678b5ccd89810b0e14793968"),
                6,
            ))
            .with_market(Market::token(
                address!("0x4f9905f330a5b8c7bfab68eb281914cfe0fa300a"),
                "WBTC",
                address!("0xb04dec6acde5942c1ee65181720703a48cd65e9b"),
                8,
            ))
            .with_market(Market::token(
                address!("0xba09ca8c7bd86e1108348e54b72443a77df95473"),
                "WETH",
                address!("0x1949c7985f58db487e71eb094744c0bc71458217"),
                18,
            ))
    }

    pub fn testnet() -> Self {
        Self::custom(Network::Testnet.chain_id())
            .with_address(
                Contract::Comptroller,
                address!("0xba3ddddffe691e65eb5d3ad5d83b1d8099d37c63"),
            )
            .with_address(
                Contract::UcoreToken,
                address!("0x1c898ab3f53803b56f81000e18ea73c7f84109c4"),
            )
            .with_address(
                Contract::Governor,
                address!("0xfc3a3fa643791875cdc77fae019ddc99c4d433d3"),
            )
            .with_address(
                Contract::PriceOracle,
                address!("0x141a77ad8ed1f0da40e630288a2d93dd65a3bc36"),
            )
            .with_address(
                Contract::Uai,
                address!("0x653b49cd085611f43b79fb0b67f202aa9b0aa31a"),
            )
            .with_address(
                Contract::UaiController,
                address!("0x7b3bbcba85dea3e5513de9edac39c145d4a6c737"),
            )
            .with_market(Market::native(address!(
                "0xdbdfcb034aded1a40945b49a948349dd2c69e79f"
            )))
            .with_market(Market::token(
                address!("0x236e99f14cde017fe3c56dd15ff8365941e41698"),
                "USDT",
                address!("0xe3f47a0a0adbc7e3dfe770128ea81ffad26ed071"),
                6,
            ))
            .with_market(Market::token(
                address!("0x9e506c1dc1b9a82ff4a7f30acafc1ca34e31aef6"),
                "USDC",
                address!("0x510b733ddd04c30f2be7a8f3ac9d096c7f1983bc"),
                6,
            ))
            .with_market(Market::token(
                address!("0xb8b9c33e4af260930d3cc8f47314e645c9610b67"),
                "WBTC",
                address!("0xf553ca388e5552e7664aaab48197f611138c6904"),
                8,
            ))
            .with_market(Market::token(
                address!("0xf70db284c91c369e3ae65d6480b66d9464b0ffaf"),
                "WETH",
                address!("0xdcc67cd8c11aa341a46c173610cbd5dba06373c5"),
                18,
            ))
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
        }
    }

    /// Built-in deployment for the chain, fails for chains without one.
    pub fn for_chain_id(chain_id: u64) -> Result<Self, SdkError> {
        Network::try_from(chain_id).map(Self::for_network)
    }

    /// Empty deployment, contracts and markets have to be added explicitly.
    pub fn custom(chain_id: u64) -> Self {
        Self {
            chain_id,
            contracts: HashMap::new(),
            markets: vec![],
            ucore_domain_name: UCORE_DOMAIN_NAME.to_string(),
            governor_domain_name: GOVERNOR_DOMAIN_NAME.to_string(),
        }
    }

    /// Sets or overrides the address of a protocol contract.
    pub fn with_address(mut self, contract: Contract, address: Address) -> Self {
        self.contracts.insert(contract, address);
        self
    }

    /// Adds a market, replacing a market with the same vToken symbol if any.
    pub fn with_market(mut self, market: Market) -> Self {
        match self.markets.iter_mut().find(|m| m.symbol == market.symbol) {
            Some(existing) => *existing = market,
            None => self.markets.push(market),
        }
        self
    }

    pub fn with_ucore_domain_name(mut self, name: impl Into<String>) -> Self {
        self.ucore_domain_name = name.into();
        self
    }

    pub fn with_governor_domain_name(mut self, name: impl Into<String>) -> Self {
        self.governor_domain_name = name.into();
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Network of the built-in table matching the chain, if any.
    pub fn network(&self) -> Option<Network> {
        Network::try_from(self.chain_id).ok()
    }

    pub fn address(&self, contract: Contract) -> Result<Address, SdkError> {
        self.contracts
            .get(&contract)
            .copied()
            .ok_or(SdkError::UnknownContract(contract, self.chain_id))
    }

    pub fn markets(&self) -> &[Market] {
        &self.markets
    }

    /// Market by exact vToken symbol.
    pub fn market(&self, symbol: &str) -> Option<&Market> {
        self.markets.iter().find(|m| m.symbol == symbol)
    }

    pub fn market_by_address(&self, address: Address) -> Option<&Market> {
        self.markets.iter().find(|m| m.address == address)
    }

    pub fn ucore_domain_name(&self) -> &str {
        &self.ucore_domain_name
    }

    pub fn governor_domain_name(&self) -> &str {
        &self.governor_domain_name
    }

    /// Resolves market by vToken symbol, `v` prefix may be omitted.
    pub(crate) fn resolve_market(&self, func: &'static str, symbol: &str) -> Result<&Market, SdkError> {
        if symbol.is_empty() {
            return Err(SdkError::invalid_argument(func, "market symbol must not be empty"));
        }
        self.market(symbol)
            .or_else(|| self.market(&format!("v{symbol}")))
            .ok_or_else(|| {
                SdkError::invalid_argument(
                    func,
                    format!("market `{symbol}` is not a recognized vToken"),
                )
            })
    }

    /// Resolves market by either vToken or underlying symbol.
    pub(crate) fn resolve_asset(
        &self,
        func: &'static str,
        asset: &str,
    ) -> Result<(&Market, AssetRef), SdkError> {
        if asset.is_empty() {
            return Err(SdkError::invalid_argument(func, "asset symbol must not be empty"));
        }
        if let Some(market) = self.market(asset) {
            return Ok((market, AssetRef::VToken));
        }
        self.markets
            .iter()
            .find(|m| m.underlying_symbol() == asset)
            .map(|m| (m, AssetRef::Underlying))
            .ok_or_else(|| {
                SdkError::invalid_argument(func, format!("asset `{asset}` is not supported"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_chain_id() {
        assert_eq!(Network::try_from(1116).unwrap(), Network::Mainnet);
        assert_eq!(Network::try_from(1115).unwrap(), Network::Testnet);
        assert!(matches!(
            Network::try_from(1),
            Err(SdkError::UnsupportedNetwork(1))
        ));
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(" Testnet ".parse::<Network>().unwrap(), Network::Testnet);
        assert!("ropsten".parse::<Network>().is_err());
    }

    #[test]
    fn test_builtin_tables_are_complete() {
        for network in Network::ALL {
            let deployment = Deployment::for_network(network);
            assert_eq!(deployment.chain_id(), network.chain_id());
            assert_eq!(deployment.network(), Some(network));
            for contract in Contract::ALL {
                let address = deployment.address(contract).unwrap();
                assert!(!address.is_zero(), "{network}: {contract}");
            }
            for symbol in ["vCORE", "vUSDT", "vUSDC", "vWBTC", "vWETH"] {
                assert!(deployment.market(symbol).is_some(), "{network}: {symbol}");
            }
        }
    }

    #[test]
    fn test_resolve_address_table() {
        let cases = [
            (
                Network::Mainnet,
                "vUSDT",
                address!("0xb630413d2f942e706b310d42b8d8132c78dcc5ee"),
            ),
            (
                Network::Mainnet,
                "CORE",
                address!("0xcc61952315b2684478fe475d6250bcad017f4061"),
            ),
            (
                Network::Testnet,
                "WBTC",
                address!("0xb8b9c33e4af260930d3cc8f47314e645c9610b67"),
            ),
            (
                Network::Testnet,
                "vWETH",
                address!("0xf70db284c91c369e3ae65d6480b66d9464b0ffaf"),
            ),
        ];
        for (network, symbol, expected) in cases {
            let deployment = Deployment::for_network(network);
            let market = deployment.resolve_market("test", symbol).unwrap();
            assert_eq!(market.address(), expected, "{network}: {symbol}");
        }
    }

    #[test]
    fn test_resolve_market_errors() {
        let deployment = Deployment::mainnet();
        let err = deployment.resolve_market("exit_market", "vFOO").unwrap_err();
        assert_eq!(
            err.to_string(),
            "[exit_market] market `vFOO` is not a recognized vToken"
        );
        assert!(matches!(
            deployment.resolve_market("exit_market", ""),
            Err(SdkError::InvalidArgument { func: "exit_market", .. })
        ));
    }

    #[test]
    fn test_resolve_asset() {
        let deployment = Deployment::mainnet();

        let (market, kind) = deployment.resolve_asset("redeem", "vUSDC").unwrap();
        assert_eq!(market.symbol(), "vUSDC");
        assert_eq!(kind, AssetRef::VToken);

        let (market, kind) = deployment.resolve_asset("redeem", "USDC").unwrap();
        assert_eq!(market.symbol(), "vUSDC");
        assert_eq!(kind, AssetRef::Underlying);
        assert_eq!(market.underlying_decimals(), 6);

        let (market, _) = deployment.resolve_asset("supply", "CORE").unwrap();
        assert!(market.is_native());
        assert_eq!(market.underlying_address(), None);
        assert_eq!(market.underlying_decimals(), NATIVE_DECIMALS);

        assert!(deployment.resolve_asset("supply", "DOGE").is_err());
    }

    #[test]
    fn test_custom_deployment_overrides() {
        let oracle = Address::repeat_byte(0x42);
        let deployment = Deployment::testnet()
            .with_address(Contract::PriceOracle, oracle)
            .with_market(Market::token(
                Address::repeat_byte(0x01),
                "USDT",
                Address::repeat_byte(0x02),
                18,
            ));
        assert_eq!(deployment.address(Contract::PriceOracle).unwrap(), oracle);
        assert_eq!(deployment.markets().len(), 5);
        assert_eq!(
            deployment.market("vUSDT").unwrap().underlying_decimals(),
            18
        );

        let empty = Deployment::custom(31337);
        assert_eq!(empty.network(), None);
        assert!(matches!(
            empty.address(Contract::Comptroller),
            Err(SdkError::UnknownContract(Contract::Comptroller, 31337))
        ));
    }
}
