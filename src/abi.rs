//! ABI fragments of the protocol contracts the SDK talks to.
//!
//! Only the methods the SDK forwards to are declared; signatures must match
//! the deployed contracts byte-for-byte.

#[allow(clippy::too_many_arguments)]
pub mod comptroller {
    alloy::sol!(
        /// Lending protocol controller (risk model, market membership, rewards).
        #[derive(Debug)]
        #[sol(rpc)]
        interface Comptroller {
            function enterMarkets(address[] calldata vTokens) external returns (uint256[] memory);
            function exitMarket(address vToken) external returns (uint256);
            function getAssetsIn(address account) external view returns (address[] memory);
            function getAccountLiquidity(address account) external view returns (uint256 err, uint256 liquidity, uint256 shortfall);
            function ucoreAccrued(address holder) external view returns (uint256);
            function claimUcore(address holder) external;
            function getUAIMintRate() external view returns (uint256);
            function mintedUAIs(address owner) external view returns (uint256);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod ucore {
    alloy::sol!(
        /// UCORE governance token with vote delegation.
        #[derive(Debug)]
        #[sol(rpc)]
        interface UcoreToken {
            function balanceOf(address account) external view returns (uint256);
            function delegate(address delegatee) external;
            function delegateBySig(address delegatee, uint256 nonce, uint256 expiry, uint8 v, bytes32 r, bytes32 s) external;
            function nonces(address account) external view returns (uint256);
            function getCurrentVotes(address account) external view returns (uint96);
            function delegates(address delegator) external view returns (address);
        }
    );
}

#[allow(clippy::too_many_arguments)]
pub mod governor {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface Governor {
            function castVote(uint256 proposalId, uint8 support) external;
            function castVoteWithReason(uint256 proposalId, uint8 support, string calldata reason) external;
            function castVoteBySig(uint256 proposalId, uint8 support, uint8 v, bytes32 r, bytes32 s) external;
            function state(uint256 proposalId) external view returns (uint8);
        }
    );
}

pub mod oracle {
    alloy::sol!(
        /// Price feed used by the controller, prices are scaled by `1e(36 - decimals)`.
        #[derive(Debug)]
        #[sol(rpc)]
        interface PriceOracle {
            function getUnderlyingPrice(address vToken) external view returns (uint256);
        }
    );
}

pub mod vtoken {
    alloy::sol!(
        /// Market for an ERC-20 underlying.
        #[derive(Debug)]
        #[sol(rpc)]
        interface VToken {
            function mint(uint256 mintAmount) external returns (uint256);
            function redeem(uint256 redeemTokens) external returns (uint256);
            function redeemUnderlying(uint256 redeemAmount) external returns (uint256);
            function borrow(uint256 borrowAmount) external returns (uint256);
            function repayBorrow(uint256 repayAmount) external returns (uint256);
            function repayBorrowBehalf(address borrower, uint256 repayAmount) external returns (uint256);
            function balanceOf(address owner) external view returns (uint256);
            function borrowBalanceStored(address account) external view returns (uint256);
            function exchangeRateStored() external view returns (uint256);
            function supplyRatePerBlock() external view returns (uint256);
            function borrowRatePerBlock() external view returns (uint256);
        }
    );

    alloy::sol!(
        /// Market for the native coin, supply and repay are payable.
        #[derive(Debug)]
        #[sol(rpc)]
        interface VCore {
            function mint() external payable;
            function repayBorrow() external payable;
            function repayBorrowBehalf(address borrower) external payable;
        }
    );
}

pub mod uai {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface UaiController {
            function mintUAI(uint256 mintUAIAmount) external returns (uint256);
            function repayUAI(uint256 repayUAIAmount) external returns (uint256, uint256);
            function getMintableUAI(address minter) external view returns (uint256 err, uint256 amount);
        }
    );
}

pub mod erc20 {
    alloy::sol!(
        #[derive(Debug)]
        #[sol(rpc)]
        interface IERC20 {
            function balanceOf(address owner) external view returns (uint256);
            function approve(address spender, uint256 amount) external returns (bool);
            function allowance(address owner, address spender) external view returns (uint256);
        }
    );
}

/// EIP-712 typed messages signed off-chain and relayed by `*BySig` methods.
pub mod typed {
    alloy::sol!(
        #[derive(Debug, PartialEq, Eq)]
        struct Delegation {
            address delegatee;
            uint256 nonce;
            uint256 expiry;
        }

        #[derive(Debug, PartialEq, Eq)]
        struct Ballot {
            uint256 proposalId;
            uint8 support;
        }
    );
}
