//! Funds floor policy for transfers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::error::{LedgerError, Result};
use crate::transfer::Transfer;

/// How much of a transfer the source balance must cover.
///
/// The sender is always debited `amount + fee`. `AmountOnly` checks just the
/// amount, so a transfer can leave the sender below zero by up to the fee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundsPolicy {
    /// Require `balance - (amount + fee) >= 0`.
    #[default]
    AmountWithFee,
    /// Require `balance - amount >= 0`.
    AmountOnly,
}

impl FundsPolicy {
    /// Funds the source must hold for `transfer`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` if `amount + fee` overflows.
    pub fn required(self, transfer: &Transfer) -> Result<i64> {
        match self {
            Self::AmountWithFee => transfer.total_debit(),
            Self::AmountOnly => Ok(transfer.amount),
        }
    }

    /// Check `source` can fund `transfer`.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` when the floor would be crossed.
    pub fn check(self, source: &Account, transfer: &Transfer) -> Result<()> {
        let required = self.required(transfer)?;
        if source.balance < required {
            return Err(LedgerError::InsufficientFunds {
                account_id: source.account_id.clone(),
                balance: source.balance,
                required,
            });
        }
        Ok(())
    }
}

impl FromStr for FundsPolicy {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amount_with_fee" => Ok(Self::AmountWithFee),
            "amount_only" => Ok(Self::AmountOnly),
            other => Err(LedgerError::validation(format!(
                "unknown funds policy: {other}"
            ))),
        }
    }
}

impl fmt::Display for FundsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AmountWithFee => "amount_with_fee",
            Self::AmountOnly => "amount_only",
        })
    }
}
