//! Governance: voting on proposals, directly or by signature.

use std::fmt;

use alloy::{
    network::Ethereum,
    primitives::U256,
    providers::{PendingTransactionBuilder, Provider},
    signers::Signer,
};
use tracing::debug;

use crate::{
    Sdk,
    abi::{governor::Governor, typed::Ballot},
    error::SdkError,
    eth::{self, TxOptions},
    network::Contract,
    ucore::{TypedSignature, eip712_domain, sign_typed},
};

/// Vote cast on a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum VoteSupport {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl From<VoteSupport> for u8 {
    fn from(value: VoteSupport) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for VoteSupport {
    type Error = SdkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoteSupport::Against),
            1 => Ok(VoteSupport::For),
            2 => Ok(VoteSupport::Abstain),
            _ => Err(SdkError::invalid_argument(
                "vote_support",
                format!("unknown vote type {value}"),
            )),
        }
    }
}

/// Lifecycle state of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
}

impl TryFrom<u8> for ProposalState {
    type Error = SdkError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => ProposalState::Pending,
            1 => ProposalState::Active,
            2 => ProposalState::Canceled,
            3 => ProposalState::Defeated,
            4 => ProposalState::Succeeded,
            5 => ProposalState::Queued,
            6 => ProposalState::Expired,
            7 => ProposalState::Executed,
            _ => {
                return Err(SdkError::InvalidRequest(format!(
                    "unknown proposal state {value}"
                )));
            }
        })
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl<P: Provider + Clone> Sdk<P> {
    pub async fn cast_vote(
        &self,
        proposal_id: U256,
        support: VoteSupport,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        eth::send(
            eth::prepare(
                self.provider.clone(),
                self.address_of(Contract::Governor).await?,
                &Governor::castVoteCall {
                    proposalId: proposal_id,
                    support: support.into(),
                },
            ),
            options,
        )
        .await
    }

    pub async fn cast_vote_with_reason(
        &self,
        proposal_id: U256,
        support: VoteSupport,
        reason: impl Into<String>,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        eth::send(
            eth::prepare(
                self.provider.clone(),
                self.address_of(Contract::Governor).await?,
                &Governor::castVoteWithReasonCall {
                    proposalId: proposal_id,
                    support: support.into(),
                    reason: reason.into(),
                },
            ),
            options,
        )
        .await
    }

    /// Relays a ballot signed off-chain by the voter.
    pub async fn cast_vote_by_sig(
        &self,
        proposal_id: U256,
        support: VoteSupport,
        signature: TypedSignature,
        options: &TxOptions,
    ) -> Result<PendingTransactionBuilder<Ethereum>, SdkError> {
        eth::send(
            eth::prepare(
                self.provider.clone(),
                self.address_of(Contract::Governor).await?,
                &Governor::castVoteBySigCall {
                    proposalId: proposal_id,
                    support: support.into(),
                    v: signature.v,
                    r: signature.r,
                    s: signature.s,
                },
            ),
            options,
        )
        .await
    }

    /// Signs a ballot for [`Sdk::cast_vote_by_sig`].
    pub async fn create_vote_signature<S: Signer + Sync>(
        &self,
        signer: &S,
        proposal_id: U256,
        support: VoteSupport,
    ) -> Result<TypedSignature, SdkError> {
        let deployment = self.deployment().await?;
        let domain = eip712_domain(
            deployment.governor_domain_name(),
            deployment.chain_id(),
            deployment.address(Contract::Governor)?,
        );
        debug!(voter = %signer.address(), %proposal_id, ?support, "signing ballot");
        sign_typed(
            signer,
            &Ballot {
                proposalId: proposal_id,
                support: support.into(),
            },
            &domain,
        )
        .await
    }

    pub async fn proposal_state(&self, proposal_id: U256) -> Result<ProposalState, SdkError> {
        let state = eth::read(
            self.provider.clone(),
            self.address_of(Contract::Governor).await?,
            Governor::stateCall {
                proposalId: proposal_id,
            },
        )
        .await?;
        ProposalState::try_from(state)
    }
}

#[cfg(test)]
mod tests {
    use alloy::{
        primitives::{Address, Signature, keccak256},
        sol_types::{SolStruct, SolValue},
    };

    use super::*;
    use crate::{
        network::{Deployment, Network},
        testing::MockChain,
    };

    #[test]
    fn test_vote_support_conversions() {
        assert_eq!(u8::from(VoteSupport::Against), 0);
        assert_eq!(u8::from(VoteSupport::Abstain), 2);
        assert_eq!(VoteSupport::try_from(1).unwrap(), VoteSupport::For);
        assert!(VoteSupport::try_from(3).is_err());
    }

    #[test]
    fn test_ballot_struct_hash() {
        let ballot = Ballot {
            proposalId: U256::from(42),
            support: 1,
        };
        let type_hash = keccak256("Ballot(uint256 proposalId,uint8 support)");
        let expected = keccak256((type_hash, U256::from(42), U256::from(1)).abi_encode());
        assert_eq!(ballot.eip712_hash_struct(), expected);
    }

    #[tokio::test]
    async fn test_create_vote_signature_recovers_signer() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Testnet);
        let signer = MockChain::signer(0);

        let typed = sdk
            .create_vote_signature(&signer, U256::from(12), VoteSupport::For)
            .await
            .unwrap();

        let deployment = Deployment::testnet();
        let digest = Ballot {
            proposalId: U256::from(12),
            support: 1,
        }
        .eip712_signing_hash(&eip712_domain(
            deployment.governor_domain_name(),
            deployment.chain_id(),
            deployment.address(Contract::Governor).unwrap(),
        ));
        let sig = Signature::new(typed.r.into(), typed.s.into(), typed.v == 28);
        assert_eq!(
            sig.recover_address_from_prehash(&digest).unwrap(),
            signer.address()
        );
    }

    #[tokio::test]
    async fn test_cast_votes() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Mainnet);
        let options = TxOptions::default().from(Address::repeat_byte(0x01));

        let tx_hash = mock.push_tx_hash();
        let pending = sdk
            .cast_vote(U256::from(5), VoteSupport::Against, &options)
            .await
            .unwrap();
        assert_eq!(*pending.tx_hash(), tx_hash);

        let tx_hash = mock.push_tx_hash();
        let pending = sdk
            .cast_vote_with_reason(U256::from(5), VoteSupport::For, "lgtm", &options)
            .await
            .unwrap();
        assert_eq!(*pending.tx_hash(), tx_hash);

        let signer = MockChain::signer(0);
        let signature = sdk
            .create_vote_signature(&signer, U256::from(5), VoteSupport::Abstain)
            .await
            .unwrap();
        let tx_hash = mock.push_tx_hash();
        let pending = sdk
            .cast_vote_by_sig(U256::from(5), VoteSupport::Abstain, signature, &options)
            .await
            .unwrap();
        assert_eq!(*pending.tx_hash(), tx_hash);
    }

    #[tokio::test]
    async fn test_proposal_state() {
        let mock = MockChain::new();
        let sdk = mock.sdk(Network::Mainnet);

        mock.push_return::<Governor::stateCall>(&4);
        assert_eq!(
            sdk.proposal_state(U256::from(1)).await.unwrap(),
            ProposalState::Succeeded
        );

        mock.push_return::<Governor::stateCall>(&9);
        assert!(matches!(
            sdk.proposal_state(U256::from(1)).await,
            Err(SdkError::InvalidRequest(_))
        ));
    }
}
