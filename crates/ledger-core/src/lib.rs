//! Core types and rules for the account ledger.
//!
//! This crate provides the foundational types shared by the store, the
//! chaincode and the HTTP service:
//!
//! - **Identifiers**: `TransactionId`, `TransferId`
//! - **Accounts**: `Account`, `AccountList`
//! - **Transfers**: `Transfer`, `TransferRecord`, `TransferStage`
//! - **Transactions**: `Transaction`, `TransactionList`, `TxStatus`, `FailureCode`
//! - **Policy**: `FundsPolicy`
//!
//! # Amounts
//!
//! All amounts are a single integer-denominated unit (minor currency units)
//! stored as `i64`. There is no currency conversion.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod error;
pub mod ids;
pub mod policy;
pub mod transaction;
pub mod transfer;

pub use account::{Account, AccountList, ACCOUNT_OBJECT_TYPE};
pub use error::{ErrorKind, LedgerError, Result};
pub use ids::{IdError, Leg, TransactionId, TransferId};
pub use policy::FundsPolicy;
pub use transaction::{
    FailureCode, Transaction, TransactionList, TxStatus, CLOCK_OBJECT_TYPE,
    TRANSACTION_OBJECT_TYPE,
};
pub use transfer::{Transfer, TransferRecord, TransferStage, TRANSFER_OBJECT_TYPE};
