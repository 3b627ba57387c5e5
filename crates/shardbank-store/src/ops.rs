//! Shard-local atomic operations.

use rust_decimal::Decimal;
use shardbank_core::AccountId;

/// A write executed as one unit on a single shard.
///
/// The balance procedures update balances and append the transaction record
/// together; a failure leaves neither visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicOp {
    /// `deposit_money`.
    Deposit {
        /// Credited account.
        to: AccountId,
        /// Amount.
        amount: Decimal,
        /// Description.
        description: String,
    },
    /// `withdraw_money`.
    Withdraw {
        /// Debited account.
        from: AccountId,
        /// Amount.
        amount: Decimal,
        /// Description.
        description: String,
    },
    /// `transfer_money` between two accounts on the same shard.
    Transfer {
        /// Debited account.
        from: AccountId,
        /// Credited account.
        to: AccountId,
        /// Amount.
        amount: Decimal,
        /// Description.
        description: String,
    },
    /// Plain transaction row with no balance change.
    Record {
        /// Transaction code.
        kind: String,
        /// Referenced source account.
        from: Option<AccountId>,
        /// Referenced target account.
        to: Option<AccountId>,
        /// Amount.
        amount: Decimal,
        /// Stored status.
        status: String,
        /// Description.
        description: String,
    },
}

impl AtomicOp {
    /// Name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::Transfer { .. } => "transfer",
            Self::Record { .. } => "record",
        }
    }
}
