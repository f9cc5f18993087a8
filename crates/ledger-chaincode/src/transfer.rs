//! Transfer engine.
//!
//! Moves funds between two accounts as a sequence of individually durable
//! writes. Rejections are recorded as a single `Failed` transaction. An
//! accepted transfer is tracked by a [`TransferRecord`] journal entry so that
//! [`TransferEngine::reconcile`] can finish a transfer interrupted between
//! its debit and credit legs.
//!
//! Whether a leg landed is never inferred from account versions. Each leg
//! adds its transaction ID to the account's `applied_legs` in the same write
//! that changes the balance, and the leg's transaction record is written
//! right after. A leg landed iff either of the two exists.

use serde::{Deserialize, Serialize};

use ledger_core::{
    Account, FailureCode, FundsPolicy, Leg, LedgerError, Result, TransactionId, Transfer,
    TransferId, TransferRecord, TransferStage, TxStatus, TRANSFER_OBJECT_TYPE,
};
use ledger_store::{keys, StateStore, StoreError};

use crate::accounts::AccountLedger;
use crate::codec::{decode, encode};
use crate::transactions::TransactionLedger;

/// Attempts at the credit leg when the destination keeps changing under it.
const CREDIT_ATTEMPTS: usize = 3;

/// Outcome of a reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Transfers rolled forward to `Committed`.
    pub committed: Vec<TransferId>,
    /// Transfers whose debit never landed.
    pub aborted: Vec<TransferId>,
    /// Transfers left untouched because finishing them failed.
    pub unresolved: Vec<TransferId>,
}

/// Transfer operations over a state store.
pub struct TransferEngine<'a, S: ?Sized> {
    store: &'a S,
    policy: FundsPolicy,
}

fn journal_key(id: &TransferId) -> Result<String> {
    keys::build_key(TRANSFER_OBJECT_TYPE, &[&id.to_string()]).map_err(|e| StoreError::from(e).into())
}

impl<'a, S: StateStore + ?Sized> TransferEngine<'a, S> {
    /// Wrap a state store, checking source funds with `policy`.
    pub fn new(store: &'a S, policy: FundsPolicy) -> Self {
        Self { store, policy }
    }

    fn accounts(&self) -> AccountLedger<'a, S> {
        AccountLedger::new(self.store)
    }

    fn transactions(&self) -> TransactionLedger<'a, S> {
        TransactionLedger::new(self.store)
    }

    /// Carry out `transfer`.
    ///
    /// - invalid request: no writes
    /// - unknown account: no writes
    /// - closed account or insufficient funds: one `Failed` transaction
    /// - otherwise: journal entry, debit + `Debited`, credit + `Credited`
    ///
    /// The destination is re-read before the credit leg. A debit that fails
    /// without landing leaves the journal entry `Aborted`.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `AccountNotFound`, `AccountClosed`,
    /// `InsufficientFunds`, `Conflict`, or a store error.
    pub fn execute(&self, transfer: &Transfer) -> Result<TransferRecord> {
        transfer.validate()?;

        let accounts = self.accounts();
        let mut source = accounts.get(&transfer.from_customer_id, &transfer.from_account_id)?;
        let destination = accounts.get(&transfer.to_customer_id, &transfer.to_account_id)?;

        if source.closed {
            return Err(self.reject(&source, transfer, closed_error(&source))?);
        }
        if destination.closed {
            return Err(self.reject(&destination, transfer, closed_error(&destination))?);
        }
        if let Err(e) = self.policy.check(&source, transfer) {
            return Err(self.reject(&source, transfer, e)?);
        }

        let mut record = TransferRecord::pending(transfer.clone());
        self.put_record(&record)?;

        let debit_id = record.debit_transaction_id.clone();
        if let Err(e) = self.apply_leg(&mut source, &debit_id, Leg::Debit, transfer.total_debit()?) {
            self.abort_if_not_debited(&mut record);
            return Err(e);
        }
        self.transactions().record_leg(
            debit_id,
            record.id,
            &source.customer_id,
            &source.account_id,
            transfer,
            TxStatus::Debited,
        )?;
        record.advance(TransferStage::Debited);
        self.put_record(&record)?;

        self.credit_destination(&record)?;
        self.transactions().record_leg(
            record.credit_transaction_id.clone(),
            record.id,
            &transfer.to_customer_id,
            &transfer.to_account_id,
            transfer,
            TxStatus::Credited,
        )?;
        record.advance(TransferStage::Committed);
        self.put_record(&record)?;

        tracing::info!(
            transfer_id = %record.id,
            from = %format_args!("{}/{}", transfer.from_customer_id, transfer.from_account_id),
            to = %format_args!("{}/{}", transfer.to_customer_id, transfer.to_account_id),
            amount = transfer.amount,
            fee = transfer.fee,
            "Transfer committed"
        );
        Ok(record)
    }

    /// Record a `Failed` transaction on `account` and hand back `reason` for
    /// the caller to return. A failing write replaces `reason`.
    fn reject(&self, account: &Account, transfer: &Transfer, reason: LedgerError) -> Result<LedgerError> {
        let code: Option<FailureCode> = reason.failure_code();
        self.transactions().record(
            &account.customer_id,
            &account.account_id,
            transfer,
            code,
            TxStatus::Failed,
        )?;
        tracing::warn!(
            customer_id = %account.customer_id,
            account_id = %account.account_id,
            reason = %reason,
            "Transfer rejected"
        );
        Ok(reason)
    }

    /// Apply one leg to `account` and mark it in the same write.
    ///
    /// Marks whose transaction record now exists are dropped first, so the
    /// list only grows with legs interrupted before their record.
    fn apply_leg(&self, account: &mut Account, leg: &TransactionId, side: Leg, amount: i64) -> Result<()> {
        let transactions = self.transactions();
        let mut updated = account.clone();

        let mut applied = Vec::with_capacity(updated.applied_legs.len() + 1);
        for id in &updated.applied_legs {
            if !transactions.exists(&updated.customer_id, &updated.account_id, id)? {
                applied.push(id.clone());
            }
        }
        applied.push(leg.clone());
        updated.applied_legs = applied;

        let accounts = self.accounts();
        match side {
            Leg::Debit => accounts.apply_debit(&mut updated, amount)?,
            Leg::Credit => accounts.apply_credit(&mut updated, amount)?,
        }
        *account = updated;
        Ok(())
    }

    /// Credit the destination from a fresh read. Credits commute, so a
    /// version conflict is retried against the newer record.
    fn credit_destination(&self, record: &TransferRecord) -> Result<()> {
        let transfer = &record.transfer;
        let mut attempt = 1;
        loop {
            let mut destination = self
                .accounts()
                .get(&transfer.to_customer_id, &transfer.to_account_id)?;
            match self.apply_leg(
                &mut destination,
                &record.credit_transaction_id,
                Leg::Credit,
                transfer.amount,
            ) {
                Err(LedgerError::Conflict { found, .. }) if attempt < CREDIT_ATTEMPTS => {
                    tracing::debug!(
                        transfer_id = %record.id,
                        attempt,
                        found,
                        "Destination changed before credit, retrying"
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Whether `leg` landed on `customer_id`/`account_id`.
    fn leg_landed(&self, customer_id: &str, account_id: &str, leg: &TransactionId) -> Result<bool> {
        if self.transactions().exists(customer_id, account_id, leg)? {
            return Ok(true);
        }
        let account = self.accounts().get(customer_id, account_id)?;
        Ok(account.has_applied_leg(leg))
    }

    fn debit_landed(&self, record: &TransferRecord) -> Result<bool> {
        self.leg_landed(
            &record.transfer.from_customer_id,
            &record.transfer.from_account_id,
            &record.debit_transaction_id,
        )
    }

    /// After a failed debit, close the journal entry unless the debit landed
    /// anyway. Anything left open is for [`reconcile`](Self::reconcile).
    fn abort_if_not_debited(&self, record: &mut TransferRecord) {
        match self.debit_landed(record) {
            Ok(false) => {
                record.advance(TransferStage::Aborted);
                if let Err(e) = self.put_record(record) {
                    tracing::warn!(transfer_id = %record.id, error = %e, "Could not mark transfer aborted");
                }
            }
            Ok(true) => {
                tracing::warn!(transfer_id = %record.id, "Debit landed despite error, left for reconciliation");
            }
            Err(e) => {
                tracing::warn!(transfer_id = %record.id, error = %e, "Could not check debit leg");
            }
        }
    }

    fn put_record(&self, record: &TransferRecord) -> Result<()> {
        self.store.put(&journal_key(&record.id)?, encode(record)?)?;
        Ok(())
    }

    /// Look up a transfer journal entry.
    ///
    /// # Errors
    ///
    /// Returns `TransferNotFound` if absent.
    pub fn get(&self, id: &TransferId) -> Result<TransferRecord> {
        self.store
            .get(&journal_key(id)?)?
            .map(|data| decode(&data))
            .transpose()?
            .ok_or_else(|| LedgerError::TransferNotFound {
                transfer_id: id.to_string(),
            })
    }

    /// Finish or abort every journal entry that is not final.
    ///
    /// A `Pending` entry whose debit never landed is aborted; any other open
    /// entry has its missing legs and transaction records written. An entry
    /// still being carried out by a concurrent `execute` may be aborted
    /// under it, so this is meant to run while no transfer is in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be scanned. Failures on
    /// individual entries are reported as `unresolved`.
    pub fn reconcile(&self) -> Result<ReconcileReport> {
        let mut open = Vec::new();
        for item in self.store.scan_prefix(TRANSFER_OBJECT_TYPE, &[])? {
            match item
                .map_err(LedgerError::from)
                .and_then(|(_, data)| decode::<TransferRecord>(&data))
            {
                Ok(record) if !record.stage.is_final() => open.push(record),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable transfer record"),
            }
        }

        let mut report = ReconcileReport::default();
        for record in open {
            let id = record.id;
            match self.roll_forward(record) {
                Ok(TransferStage::Aborted) => report.aborted.push(id),
                Ok(_) => report.committed.push(id),
                Err(e) => {
                    tracing::error!(transfer_id = %id, error = %e, "Failed to reconcile transfer");
                    report.unresolved.push(id);
                }
            }
        }

        tracing::info!(
            committed = report.committed.len(),
            aborted = report.aborted.len(),
            unresolved = report.unresolved.len(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    fn roll_forward(&self, mut record: TransferRecord) -> Result<TransferStage> {
        let transactions = self.transactions();
        let transfer = record.transfer.clone();

        if record.stage == TransferStage::Pending {
            if !self.debit_landed(&record)? {
                record.advance(TransferStage::Aborted);
                self.put_record(&record)?;
                tracing::info!(transfer_id = %record.id, "Transfer aborted, debit never landed");
                return Ok(TransferStage::Aborted);
            }
            if !transactions.exists(
                &transfer.from_customer_id,
                &transfer.from_account_id,
                &record.debit_transaction_id,
            )? {
                transactions.record_leg(
                    record.debit_transaction_id.clone(),
                    record.id,
                    &transfer.from_customer_id,
                    &transfer.from_account_id,
                    &transfer,
                    TxStatus::Debited,
                )?;
            }
            record.advance(TransferStage::Debited);
            self.put_record(&record)?;
        }

        if !self.leg_landed(
            &transfer.to_customer_id,
            &transfer.to_account_id,
            &record.credit_transaction_id,
        )? {
            self.credit_destination(&record)?;
        }
        if !transactions.exists(
            &transfer.to_customer_id,
            &transfer.to_account_id,
            &record.credit_transaction_id,
        )? {
            transactions.record_leg(
                record.credit_transaction_id.clone(),
                record.id,
                &transfer.to_customer_id,
                &transfer.to_account_id,
                &transfer,
                TxStatus::Credited,
            )?;
        }
        record.advance(TransferStage::Committed);
        self.put_record(&record)?;

        tracing::info!(transfer_id = %record.id, "Transfer rolled forward");
        Ok(TransferStage::Committed)
    }
}

fn closed_error(account: &Account) -> LedgerError {
    LedgerError::AccountClosed {
        customer_id: account.customer_id.clone(),
        account_id: account.account_id.clone(),
    }
}
