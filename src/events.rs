//! Event records emitted by the pool.
//!
//! Every successful operation emits exactly one operation record, preceded
//! by the claim-ledger records for the balances it moved. The embedding
//! host drains the sink and indexes the records however it likes.

use crate::state::{AccountId, AssetId, ClaimId};
use borsh::{BorshDeserialize, BorshSerialize};

/// Record of a successful state transition
#[derive(BorshDeserialize, BorshSerialize, Clone, Debug, Eq, PartialEq)]
pub enum LendingEvent {
    /// Underlying supplied into a reserve
    Deposit {
        /// Account credited with the supply claim
        user: AccountId,
        /// Reserve asset
        asset: AssetId,
        /// Underlying amount moved into pool custody
        amount: u128,
        /// Scaled supply-claim units minted
        claim_minted: u128,
    },
    /// Underlying redeemed from a reserve
    Withdraw {
        /// Account whose claim was burned
        user: AccountId,
        /// Reserve asset
        asset: AssetId,
        /// Underlying amount pushed out of pool custody
        amount: u128,
    },
    /// Underlying lent out against collateral
    Borrow {
        /// Account charged with the debt
        user: AccountId,
        /// Reserve asset
        asset: AssetId,
        /// Underlying amount delivered
        amount: u128,
    },
    /// Debt settled
    Repay {
        /// Account whose debt was reduced
        user: AccountId,
        /// Reserve asset
        asset: AssetId,
        /// Underlying amount settled
        amount: u128,
    },
    /// Partial liquidation of an unhealthy position
    Liquidation {
        /// Account that covered the debt
        liquidator: AccountId,
        /// Account that was liquidated
        borrower: AccountId,
        /// Asset seized
        collateral_asset: AssetId,
        /// Asset repaid
        debt_asset: AssetId,
        /// Underlying debt covered
        debt_covered: u128,
        /// Underlying collateral seized
        collateral_seized: u128,
    },
    /// New reserve brought online
    ReserveInitialized {
        /// Reserve asset
        asset: AssetId,
        /// Handle of the paired supply-claim ledger
        supply_claim: ClaimId,
        /// Handle of the paired debt-claim ledger
        debt_claim: ClaimId,
    },
    /// Reserve frozen: no new deposits or borrows
    ReserveFrozen {
        /// Reserve asset
        asset: AssetId,
    },
    /// Reserve unfrozen
    ReserveUnfrozen {
        /// Reserve asset
        asset: AssetId,
    },
    /// Pool paused: deposits, borrows, and liquidations refused
    Paused,
    /// Pool unpaused
    Unpaused,
    /// Scaled claim units created
    ClaimMint {
        /// Ledger the units were created in
        claim: ClaimId,
        /// Receiving account
        user: AccountId,
        /// Scaled units minted
        amount: u128,
    },
    /// Scaled claim units destroyed
    ClaimBurn {
        /// Ledger the units were destroyed in
        claim: ClaimId,
        /// Debited account
        user: AccountId,
        /// Scaled units burned
        amount: u128,
    },
    /// Supply claim moved from a liquidated borrower to the liquidator
    TransferOnLiquidation {
        /// Supply-claim ledger
        claim: ClaimId,
        /// Liquidated borrower
        from: AccountId,
        /// Liquidator
        to: AccountId,
        /// Scaled units moved
        amount: u128,
    },
}
