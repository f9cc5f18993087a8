//! Transfers racing a concurrent write to one of their accounts.

mod common;

use common::{balance, history, open_on, transfer_json, Hook, HookStore};
use ledger_chaincode::{Chaincode, LedgerConfig, ReconcileReport};
use ledger_core::{
    ErrorKind, LedgerError, TransferRecord, TransferStage, TxStatus, ACCOUNT_OBJECT_TYPE,
    TRANSFER_OBJECT_TYPE,
};
use ledger_store::StateStore;

fn setup() -> Chaincode<HookStore> {
    let cc = Chaincode::new(HookStore::new(), LedgerConfig::default());
    open_on(&cc, "c1", "a1", 1000);
    open_on(&cc, "c2", "a2", 0);
    cc
}

fn transfer(
    cc: &Chaincode<HookStore>,
    from: (&str, &str),
    to: (&str, &str),
    amount: i64,
    fee: i64,
) -> Result<Vec<u8>, LedgerError> {
    cc.handle("TransferMoney", &[transfer_json(from, to, amount, fee)])
}

fn journal(cc: &Chaincode<HookStore>) -> Vec<TransferRecord> {
    cc.store()
        .scan_prefix(TRANSFER_OBJECT_TYPE, &[])
        .unwrap()
        .map(|item| serde_json::from_slice(&item.unwrap().1).unwrap())
        .collect()
}

#[test]
fn destination_topped_up_between_legs_is_still_credited() {
    let cc = setup();
    // First account write of the transfer is the source debit.
    cc.store()
        .arm(Hook::topup_after(ACCOUNT_OBJECT_TYPE, 0, "c2", "a2", 1));

    transfer(&cc, ("c1", "a1"), ("c2", "a2"), 200, 10).unwrap();
    assert!(!cc.store().armed());

    assert_eq!(balance(&cc, "c1", "a1"), 790);
    assert_eq!(balance(&cc, "c2", "a2"), 201);

    let credits = history(&cc, "c2", "a2");
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].status, TxStatus::Credited);

    let records = journal(&cc);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].stage, TransferStage::Committed);

    assert_eq!(cc.transfers().reconcile().unwrap(), ReconcileReport::default());
    assert_eq!(balance(&cc, "c2", "a2"), 201);
}

#[test]
fn source_topped_up_before_debit_aborts_the_transfer() {
    let cc = setup();
    // First journal write happens before the debit leg.
    cc.store()
        .arm(Hook::topup_after(TRANSFER_OBJECT_TYPE, 0, "c1", "a1", 1));

    let err = transfer(&cc, ("c1", "a1"), ("c2", "a2"), 200, 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(!cc.store().armed());

    assert_eq!(balance(&cc, "c1", "a1"), 1001);
    assert_eq!(balance(&cc, "c2", "a2"), 0);
    assert!(history(&cc, "c1", "a1").is_empty());

    let records = journal(&cc);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].stage, TransferStage::Aborted);

    assert_eq!(cc.transfers().reconcile().unwrap(), ReconcileReport::default());
    assert_eq!(balance(&cc, "c1", "a1"), 1001);
    assert_eq!(balance(&cc, "c2", "a2"), 0);
}

#[test]
fn money_is_conserved_across_racing_writes_and_reconcile() {
    let cc = setup();
    let a1 = ("c1", "a1");
    let a2 = ("c2", "a2");

    let rounds = [
        (Hook::topup_after(ACCOUNT_OBJECT_TYPE, 0, "c2", "a2", 1), a1, a2, 100, 5),
        (Hook::topup_after(TRANSFER_OBJECT_TYPE, 0, "c2", "a2", 1), a2, a1, 50, 0),
        (Hook::topup_after(ACCOUNT_OBJECT_TYPE, 1, "c1", "a1", 1), a1, a2, 30, 2),
        (Hook::topup_after(TRANSFER_OBJECT_TYPE, 0, "c1", "a1", 1), a1, a2, 10, 1),
    ];

    let mut topups = 0;
    let mut fees = 0;
    let mut committed = 0;
    for (hook, from, to, amount, fee) in rounds {
        cc.store().arm(hook);
        match transfer(&cc, from, to, amount, fee) {
            Ok(_) => {
                fees += fee;
                committed += 1;
            }
            Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
        }
        assert!(!cc.store().armed());
        topups += 1;
    }

    let report = cc.transfers().reconcile().unwrap();
    assert_eq!(report, ReconcileReport::default());

    let records = journal(&cc);
    let done = records
        .iter()
        .filter(|r| r.stage == TransferStage::Committed)
        .count();
    assert_eq!(done, committed);
    assert!(records.iter().all(|r| r.stage.is_final()));

    let total = balance(&cc, "c1", "a1") + balance(&cc, "c2", "a2");
    assert_eq!(total, 1000 + topups - fees);
}
