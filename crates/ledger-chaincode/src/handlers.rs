//! Handler functions and the name-to-handler mapping.
//!
//! Each handler checks its own argument list and returns the JSON bytes of
//! its result. An empty result means "nothing to return".

use std::collections::HashMap;

use ledger_core::{Account, LedgerError, Result, Transfer, TransferId};
use ledger_store::StateStore;

use crate::codec::encode;
use crate::Chaincode;

/// A handler invoked with the chaincode and the caller's arguments.
pub type Handler<S> = fn(&Chaincode<S>, &[String]) -> Result<Vec<u8>>;

/// Mapping from external function name to handler.
pub struct HandlerMap<S> {
    handlers: HashMap<&'static str, Handler<S>>,
}

impl<S: StateStore> HandlerMap<S> {
    /// An empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// The mapping with every ledger function registered.
    #[must_use]
    pub fn standard() -> Self {
        let mut map = Self::new();
        map.add("OpenAccount", open_account);
        map.add("CloseAccount", close_account);
        map.add("GetAccount", get_account);
        map.add("GetAccountList", get_account_list);
        map.add("TopupAccount", topup_account);
        map.add("TransferMoney", transfer_money);
        map.add("GetTransaction", get_transaction);
        map.add("GetTransactionList", get_transaction_list);
        map.add("GetTransfer", get_transfer);
        map.add("ReconcileTransfers", reconcile_transfers);
        map
    }

    /// Register `handler` under `name`, replacing any previous one.
    pub fn add(&mut self, name: &'static str, handler: Handler<S>) {
        self.handlers.insert(name, handler);
    }

    /// Look up a handler.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Handler<S>> {
        self.handlers.get(name).copied()
    }

    /// Registered function names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl<S: StateStore> Default for HandlerMap<S> {
    fn default() -> Self {
        Self::standard()
    }
}

fn require_exact(args: &[String], count: usize, what: &str) -> Result<()> {
    if args.len() != count {
        return Err(LedgerError::validation(format!("missing required {what}")));
    }
    Ok(())
}

fn first_arg<'a>(args: &'a [String], what: &str) -> Result<&'a str> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| LedgerError::validation(format!("missing required {what}")))
}

fn open_account<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    let payload = first_arg(args, "account data JSON")?;
    let account = Account::from_payload(payload.as_bytes())?;
    let account = cc.accounts().open(account)?;
    encode(&account)
}

fn get_account<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    require_exact(args, 2, "customer ID and / or account ID")?;
    match cc.accounts().find(&args[0], &args[1])? {
        Some(account) => encode(&account),
        None => Ok(Vec::new()),
    }
}

fn get_account_list<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    let customer_id = first_arg(args, "customer ID")?;
    let list = cc.accounts().list(customer_id)?;
    tracing::debug!(customer_id, count = list.accounts.len(), "Returning account list");
    encode(&list)
}

fn topup_account<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    require_exact(args, 3, "customer ID, account ID and amount")?;
    let amount: i64 = args[2]
        .trim()
        .parse()
        .map_err(|_| LedgerError::validation(format!("error parsing amount value {}", args[2])))?;
    let account = cc.accounts().topup(&args[0], &args[1], amount)?;
    encode(&account)
}

fn close_account<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    require_exact(args, 2, "customer ID and / or account ID")?;
    let account = cc.accounts().close(&args[0], &args[1])?;
    encode(&account)
}

fn transfer_money<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    let payload = first_arg(args, "transfer details JSON")?;
    let transfer = Transfer::from_payload(payload.as_bytes())?;
    cc.transfers().execute(&transfer)?;
    Ok(Vec::new())
}

fn get_transaction<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    require_exact(args, 3, "customer ID, account ID and / or transaction ID")?;
    let tx = cc.transactions().get(&args[0], &args[1], &args[2])?;
    encode(&tx)
}

fn get_transaction_list<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    require_exact(args, 2, "customer ID and / or account ID")?;
    let list = cc.transactions().list(&args[0], &args[1])?;
    tracing::debug!(
        customer_id = %args[0],
        account_id = %args[1],
        count = list.transactions.len(),
        "Returning transaction list"
    );
    encode(&list)
}

fn get_transfer<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    let id: TransferId = first_arg(args, "transfer ID")?.parse()?;
    let record = cc.transfers().get(&id)?;
    encode(&record)
}

fn reconcile_transfers<S: StateStore>(cc: &Chaincode<S>, args: &[String]) -> Result<Vec<u8>> {
    if !args.is_empty() {
        return Err(LedgerError::validation("ReconcileTransfers takes no arguments"));
    }
    let report = cc.transfers().reconcile()?;
    encode(&report)
}
