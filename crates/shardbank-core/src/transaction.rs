//! Money-movement requests and their validation.
//!
//! A `MoneyRequest` is the raw payload posted by the dashboard. Validating it
//! yields a `MoneyMovement`: the transaction kind, the account endpoints it
//! touches and a strictly positive amount. Validation never touches a
//! database, so every rejection here happens before any shard is contacted.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::lenient::{optional_amount, optional_id, optional_text};
use crate::region::Region;
use crate::{AccountId, AccountNumber};

/// Status recorded for plain transaction rows when the request gives none.
pub const DEFAULT_STATUS: &str = "COMPLETED";

/// Kind of money movement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    /// Credit one account.
    Deposit,
    /// Debit one account.
    Withdrawal,
    /// Debit one account and credit another.
    Transfer,
    /// Any other kind; recorded without touching balances.
    Other(String),
}

impl TransactionType {
    /// The upper-case code stored in the `transactions` table.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Transfer => "TRANSFER",
            Self::Other(code) => code,
        }
    }
}

impl FromStr for TransactionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Ok(match code.as_str() {
            "DEPOSIT" => Self::Deposit,
            "WITHDRAWAL" => Self::Withdrawal,
            "TRANSFER" => Self::Transfer,
            _ => Self::Other(code),
        })
    }
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}

impl From<TransactionType> for String {
    fn from(kind: TransactionType) -> Self {
        kind.code().to_string()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw money-movement payload.
///
/// Each account endpoint may be named by its global account number, by a
/// shard-local id plus a region, or by a bare shard-local id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoneyRequest {
    /// DEPOSIT, WITHDRAWAL, TRANSFER or any other code.
    #[serde(default, deserialize_with = "optional_text")]
    pub transaction_type: Option<String>,
    /// Shard-local id of the debited account.
    #[serde(default, deserialize_with = "optional_id")]
    pub from_account_id: Option<AccountId>,
    /// Shard-local id of the credited account.
    #[serde(default, deserialize_with = "optional_id")]
    pub to_account_id: Option<AccountId>,
    /// Global number of the debited account.
    #[serde(default, deserialize_with = "optional_text")]
    pub from_account_number: Option<String>,
    /// Global number of the credited account.
    #[serde(default, deserialize_with = "optional_text")]
    pub to_account_number: Option<String>,
    /// Region applying to both endpoints.
    #[serde(default, deserialize_with = "optional_text")]
    pub region: Option<String>,
    /// Region of the debited account; overrides `region`.
    #[serde(default, deserialize_with = "optional_text")]
    pub from_region: Option<String>,
    /// Region of the credited account; overrides `region`.
    #[serde(default, deserialize_with = "optional_text")]
    pub to_region: Option<String>,
    /// Amount to move.
    #[serde(default, deserialize_with = "optional_amount")]
    pub amount: Option<Decimal>,
    /// Free-text description stored with the transaction.
    #[serde(default, deserialize_with = "optional_text")]
    pub description: Option<String>,
    /// Status for plain transaction rows.
    #[serde(default, deserialize_with = "optional_text")]
    pub status: Option<String>,
}

/// How a request names one account endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountRef {
    /// Global account number; resolved through the catalog.
    Number(AccountNumber),
    /// Shard-local id on an explicitly named region's shard.
    Placed {
        /// Shard-local id.
        account_id: AccountId,
        /// Shard that issued the id.
        region: Region,
    },
    /// Shard-local id with no region. Only a best-effort catalog lookup can place it.
    Unplaced(AccountId),
}

impl AccountRef {
    /// Whether the two references could denote the same account, judged
    /// without consulting any database.
    #[must_use]
    pub fn may_be_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (
                Self::Placed {
                    account_id: a,
                    region: ra,
                },
                Self::Placed {
                    account_id: b,
                    region: rb,
                },
            ) => a == b && ra == rb,
            (Self::Unplaced(a), Self::Unplaced(b) | Self::Placed { account_id: b, .. })
            | (Self::Placed { account_id: a, .. }, Self::Unplaced(b)) => a == b,
            _ => false,
        }
    }

    fn from_fields(
        number: Option<String>,
        id: Option<AccountId>,
        region: Option<Region>,
    ) -> Result<Option<Self>> {
        if let Some(number) = number {
            return Ok(Some(Self::Number(number.parse()?)));
        }
        Ok(id.map(|account_id| match region {
            Some(region) => Self::Placed { account_id, region },
            None => Self::Unplaced(account_id),
        }))
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "account number {number}"),
            Self::Placed { account_id, region } => write!(f, "account {account_id} in {region}"),
            Self::Unplaced(account_id) => write!(f, "account {account_id}"),
        }
    }
}

/// The endpoints touched by a validated money movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyOp {
    /// Credit `to`.
    Deposit {
        /// Credited account.
        to: AccountRef,
    },
    /// Debit `from`.
    Withdrawal {
        /// Debited account.
        from: AccountRef,
    },
    /// Debit `from` and credit `to`.
    Transfer {
        /// Debited account.
        from: AccountRef,
        /// Credited account.
        to: AccountRef,
    },
    /// Record a row of another kind without touching balances.
    Other {
        /// Transaction code.
        kind: String,
        /// Referenced source account.
        from: Option<AccountRef>,
        /// Referenced target account.
        to: Option<AccountRef>,
        /// Stored status.
        status: String,
    },
}

/// A validated money movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyMovement {
    /// Endpoints and kind.
    pub op: MoneyOp,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// Description stored with the transaction row.
    pub description: String,
}

impl MoneyMovement {
    /// The transaction kind.
    #[must_use]
    pub fn transaction_type(&self) -> TransactionType {
        match &self.op {
            MoneyOp::Deposit { .. } => TransactionType::Deposit,
            MoneyOp::Withdrawal { .. } => TransactionType::Withdrawal,
            MoneyOp::Transfer { .. } => TransactionType::Transfer,
            MoneyOp::Other { kind, .. } => TransactionType::Other(kind.clone()),
        }
    }
}

impl MoneyRequest {
    /// Apply the type-specific field rules.
    ///
    /// - TRANSFER needs both endpoints and they must not denote the same account.
    /// - DEPOSIT needs a target; any source is dropped.
    /// - WITHDRAWAL needs a source; any target is dropped.
    /// - Other kinds need at least one endpoint.
    ///
    /// The amount must be present and greater than zero.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidRequest` naming the violated rule, or
    /// `CoreError::InvalidRegion` for an unknown region code.
    pub fn validate(self) -> Result<MoneyMovement> {
        let kind: TransactionType = self
            .transaction_type
            .ok_or_else(|| CoreError::invalid("transaction_type is required"))?
            .into();

        let shared = Region::parse_optional(self.region.as_deref())?;
        let from_region = Region::parse_optional(self.from_region.as_deref())?.or(shared);
        let to_region = Region::parse_optional(self.to_region.as_deref())?.or(shared);
        let from =
            AccountRef::from_fields(self.from_account_number, self.from_account_id, from_region)?;
        let to = AccountRef::from_fields(self.to_account_number, self.to_account_id, to_region)?;

        let op = match kind {
            TransactionType::Transfer => {
                let (Some(from), Some(to)) = (from, to) else {
                    return Err(CoreError::invalid(
                        "Transfer requires both from_account_id and to_account_id",
                    ));
                };
                if from.may_be_same(&to) {
                    return Err(CoreError::invalid("Cannot transfer to the same account"));
                }
                MoneyOp::Transfer { from, to }
            }
            TransactionType::Deposit => MoneyOp::Deposit {
                to: to.ok_or_else(|| CoreError::invalid("Deposit requires to_account_id"))?,
            },
            TransactionType::Withdrawal => MoneyOp::Withdrawal {
                from: from
                    .ok_or_else(|| CoreError::invalid("Withdrawal requires from_account_id"))?,
            },
            TransactionType::Other(kind) => {
                if from.is_none() && to.is_none() {
                    return Err(CoreError::invalid(
                        "Transaction requires from_account_id or to_account_id",
                    ));
                }
                MoneyOp::Other {
                    kind,
                    from,
                    to,
                    status: self
                        .status
                        .map(|s| s.trim().to_ascii_uppercase())
                        .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
                }
            }
        };

        let amount = self
            .amount
            .ok_or_else(|| CoreError::invalid("amount is required"))?;
        if amount <= Decimal::ZERO {
            return Err(CoreError::invalid("amount must be greater than zero"));
        }

        Ok(MoneyMovement {
            op,
            amount,
            description: self.description.unwrap_or_default(),
        })
    }
}
