//! Mocked chain environment and test utilities.
//!
//! [`MockChain`] wires an [`Asserter`] backed transport into a provider, so
//! SDK operations can be exercised without a node. Responses are consumed
//! in the order they were queued, one per RPC request.

use std::sync::atomic::{AtomicU8, Ordering};

use alloy::{
    consensus::{Eip658Value, Receipt, ReceiptEnvelope, ReceiptWithBloom},
    primitives::{Address, B256, Bloom, Bytes, U64},
    providers::{DynProvider, ProviderBuilder},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
    transports::mock::Asserter,
};

use crate::{
    Sdk,
    network::{Deployment, Network},
};

/// Well-known development keys, never use them outside of tests.
pub const TEST_PRIVATE_KEYS: [&str; 2] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
];

#[derive(Debug)]
pub struct MockChain {
    pub asserter: Asserter,
    pub provider: DynProvider,
    tx_counter: AtomicU8,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        let asserter = Asserter::new();
        let provider = DynProvider::new(
            ProviderBuilder::new()
                .disable_recommended_fillers()
                .connect_mocked_client(asserter.clone()),
        );
        Self {
            asserter,
            provider,
            tx_counter: AtomicU8::new(0),
        }
    }

    /// Local signer with one of [`TEST_PRIVATE_KEYS`].
    pub fn signer(index: usize) -> PrivateKeySigner {
        TEST_PRIVATE_KEYS[index].parse().unwrap()
    }

    /// SDK bound to the built-in deployment of the network.
    pub fn sdk(&self, network: Network) -> Sdk<DynProvider> {
        Sdk::with_network(self.provider.clone(), network)
    }

    /// SDK bound to a custom deployment.
    pub fn sdk_with(&self, deployment: Deployment) -> Sdk<DynProvider> {
        Sdk::with_deployment(self.provider.clone(), deployment)
    }

    /// SDK resolving the network from `eth_chainId` on first use,
    /// see [`Self::push_chain_id`].
    pub fn lazy_sdk(&self) -> Sdk<DynProvider> {
        Sdk::new(self.provider.clone())
    }

    /// Queues `eth_chainId` response.
    pub fn push_chain_id(&self, chain_id: u64) {
        self.asserter.push_success(&U64::from(chain_id));
    }

    /// Queues `eth_call` response returning `ret` from method `C`.
    pub fn push_return<C: SolCall>(&self, ret: &C::Return) {
        self.asserter
            .push_success(&Bytes::from(C::abi_encode_returns(ret)));
    }

    /// Queues `eth_sendTransaction` response and returns the hash
    /// the pending transaction will report.
    pub fn push_tx_hash(&self) -> B256 {
        let n = self.tx_counter.fetch_add(1, Ordering::Relaxed);
        let tx_hash = B256::with_last_byte(n.wrapping_add(1));
        self.asserter.push_success(&tx_hash);
        tx_hash
    }

    /// Queues `eth_getTransactionReceipt` response for the transaction.
    ///
    /// The receipt is queued twice, the block poller started by
    /// `get_receipt` may consume one of them.
    pub fn push_receipt(&self, tx_hash: B256, success: bool) {
        let receipt: TransactionReceipt = TransactionReceipt {
            inner: ReceiptEnvelope::Eip1559(ReceiptWithBloom {
                receipt: Receipt {
                    status: Eip658Value::Eip658(success),
                    cumulative_gas_used: 46_000,
                    logs: vec![],
                },
                logs_bloom: Bloom::ZERO,
            }),
            transaction_hash: tx_hash,
            transaction_index: Some(0),
            block_hash: Some(B256::repeat_byte(0xbb)),
            block_number: Some(1),
            gas_used: 46_000,
            effective_gas_price: 1_000_000_000,
            blob_gas_used: None,
            blob_gas_price: None,
            from: Address::ZERO,
            to: None,
            contract_address: None,
        };
        self.asserter.push_success(&receipt);
        self.asserter.push_success(&receipt);
    }
}
