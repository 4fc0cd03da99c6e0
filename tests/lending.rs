use alloy::primitives::{Address, U256, address};
use fastnum::{UD256, udec256};
use tokio_test::{assert_err, assert_ok};
use ucore_sdk::{
    Amount, TxOptions,
    abi::{
        comptroller::Comptroller, erc20::IERC20, oracle::PriceOracle, uai::UaiController,
        vtoken::VToken,
    },
    error::SdkError,
    network::{Contract, Deployment, Market, Network},
    num::scale,
    testing::MockChain,
};

/// Tests a full borrowing session on an SDK resolving the network lazily.
#[tokio::test]
async fn test_lending_session() {
    let mock = MockChain::new();
    let sdk = mock.lazy_sdk();
    let account = MockChain::signer(0).address();
    let options = TxOptions::default().from(account);

    // Network is identified once, before the first call
    mock.push_chain_id(Network::Mainnet.chain_id());
    let tx_hash = mock.push_tx_hash();
    let pending = assert_ok!(sdk.enter_markets(["CORE", "vUSDT"], &options).await);
    assert_eq!(*pending.tx_hash(), tx_hash);
    assert_eq!(assert_ok!(sdk.network().await), Some(Network::Mainnet));

    let tx_hash = mock.push_tx_hash();
    let pending = assert_ok!(sdk.supply("CORE", udec256!(100), false, &options).await);
    assert_eq!(*pending.tx_hash(), tx_hash);

    mock.push_return::<Comptroller::getAccountLiquidityCall>(
        &Comptroller::getAccountLiquidityReturn {
            err: U256::ZERO,
            liquidity: scale(60, 18),
            shortfall: U256::ZERO,
        },
    );
    let liquidity = assert_ok!(sdk.account_liquidity(account).await);
    assert_eq!(liquidity.liquidity, udec256!(60));

    let tx_hash = mock.push_tx_hash();
    let pending = assert_ok!(sdk.borrow("USDT", udec256!(40), &options).await);
    assert_eq!(*pending.tx_hash(), tx_hash);

    mock.push_return::<VToken::borrowBalanceStoredCall>(&scale(40, 6));
    assert_eq!(
        assert_ok!(sdk.borrow_balance("vUSDT", account).await),
        udec256!(40)
    );

    let tx_hash = mock.push_tx_hash();
    let pending = assert_ok!(
        sdk.repay_borrow("USDT", Amount::Max, None, false, &options)
            .await
    );
    assert_eq!(*pending.tx_hash(), tx_hash);

    let tx_hash = mock.push_tx_hash();
    let pending = assert_ok!(sdk.redeem("vCORE", udec256!(5000), &options).await);
    assert_eq!(*pending.tx_hash(), tx_hash);

    let tx_hash = mock.push_tx_hash();
    let pending = assert_ok!(sdk.exit_market("CORE", &options).await);
    assert_eq!(*pending.tx_hash(), tx_hash);
}

#[tokio::test]
async fn test_prices_and_rates() {
    let mock = MockChain::new();
    let sdk = mock.sdk(Network::Testnet);

    mock.push_return::<PriceOracle::getUnderlyingPriceCall>(&scale(1, 30));
    assert_eq!(assert_ok!(sdk.price("vUSDC").await), udec256!(1));

    mock.push_return::<PriceOracle::getUnderlyingPriceCall>(&scale(2, 18));
    mock.push_return::<PriceOracle::getUnderlyingPriceCall>(&scale(1, 30));
    assert_eq!(
        assert_ok!(sdk.price_in("CORE", "USDT").await),
        udec256!(2)
    );

    mock.push_return::<Comptroller::getUAIMintRateCall>(&U256::from(5_000));
    assert_eq!(assert_ok!(sdk.uai_mint_rate().await), U256::from(5_000));
}

#[tokio::test]
async fn test_uai_position() {
    let mock = MockChain::new();
    let sdk = mock.sdk(Network::Mainnet);
    let account = MockChain::signer(1).address();
    let options = TxOptions::default().from(account);

    mock.push_return::<UaiController::getMintableUAICall>(
        &UaiController::getMintableUAIReturn {
            err: U256::ZERO,
            amount: scale(300, 18),
        },
    );
    let mintable = assert_ok!(sdk.mintable_uai(account).await);
    assert_eq!(mintable.amount, udec256!(300));

    let tx_hash = mock.push_tx_hash();
    let pending = assert_ok!(sdk.mint_uai(mintable.amount, &options).await);
    assert_eq!(*pending.tx_hash(), tx_hash);

    mock.push_return::<IERC20::balanceOfCall>(&scale(300, 18));
    assert_eq!(assert_ok!(sdk.uai_balance(account).await), udec256!(300));

    let tx_hash = mock.push_tx_hash();
    let pending = assert_ok!(sdk.repay_uai(udec256!(300), false, &options).await);
    assert_eq!(*pending.tx_hash(), tx_hash);
}

#[tokio::test]
async fn test_invalid_arguments_do_not_reach_the_node() {
    let mock = MockChain::new();
    let sdk = mock.sdk(Network::Mainnet);
    let options = TxOptions::default();

    // No responses are queued, every call below fails before dispatch
    let cases: Vec<(&str, Result<_, SdkError>)> = vec![
        (
            "enter_markets",
            sdk.enter_markets(["vUSDT", "vSHIB"], &options).await.map(|_| ()),
        ),
        ("exit_market", sdk.exit_market("", &options).await.map(|_| ())),
        (
            "supply",
            sdk.supply("USDT", UD256::ZERO, false, &options)
                .await
                .map(|_| ()),
        ),
        (
            "borrow",
            sdk.borrow("CORE", Amount::Max, &options).await.map(|_| ()),
        ),
        ("price", sdk.price("SHIB").await.map(|_| ())),
    ];
    for (func, result) in cases {
        match assert_err!(result) {
            SdkError::InvalidArgument { func: f, .. } => assert_eq!(f, func),
            other => panic!("{func}: unexpected error {other:?}"),
        }
    }

    assert!(matches!(
        sdk.delegate("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD", &options)
            .await,
        Err(SdkError::InvalidAddress {
            func: "delegate",
            ..
        })
    ));
}

#[tokio::test]
async fn test_custom_deployment() {
    let mock = MockChain::new();
    let comptroller = Address::repeat_byte(0xc0);
    let deployment = Deployment::custom(31337)
        .with_address(Contract::Comptroller, comptroller)
        .with_market(Market::token(
            Address::repeat_byte(0x01),
            "DAI",
            Address::repeat_byte(0x02),
            18,
        ));
    let sdk = mock.sdk_with(deployment);

    mock.push_return::<Comptroller::getAssetsInCall>(&vec![Address::repeat_byte(0x01)]);
    let assets = assert_ok!(sdk.assets_in(address!("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")).await);
    assert_eq!(assets[0].symbol.as_deref(), Some("vDAI"));

    assert!(matches!(
        sdk.price("DAI").await,
        Err(SdkError::UnknownContract(Contract::PriceOracle, 31337))
    ));
}
