//
// Copyright (c) The Xmldb Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::Path;

use chrono::{DateTime, Utc};
use derive_new::new;
use pickledb::{PickleDb, PickleDbDumpPolicy, SerializationMethod};
use serde::{Deserialize, Serialize};
use tracing::error;

// Committed configuration, as recorded in the rollback log.
#[derive(Clone, Debug, new)]
#[derive(Deserialize, Serialize)]
pub struct Transaction {
    // Unique identifier for the transaction.
    #[new(default)]
    pub id: u32,

    // Date and time for when the transaction occurred.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,

    // Optional comment for the transaction.
    pub comment: String,

    // Running configuration after the commit, as an XML document.
    pub configuration: String,
}

// Loads a rollback log from a file, or initialize a new rollback log if one
// doesn't exist.
pub fn init<P: AsRef<Path>>(
    path: P,
) -> Result<PickleDb, pickledb::error::Error> {
    let dump_policy = PickleDbDumpPolicy::AutoDump;
    let serialization_method = SerializationMethod::Bin;
    match path.as_ref().exists() {
        true => PickleDb::load(path, dump_policy, serialization_method),
        false => Ok(PickleDb::new(path, dump_policy, serialization_method)),
    }
}

// Records a transaction in the rollback log.
pub fn transaction_record(db: &mut PickleDb, transaction: &mut Transaction) {
    transaction.id = transaction_next_key(db);
    let key = format!("transaction{}", transaction.id);
    if let Err(error) = db.set(&key, transaction) {
        error!(%error, "failed to record transaction in the rollback log");
    }
}

// Retrieves a transaction from the rollback log, identified by its ID.
pub fn transaction_get(
    db: &PickleDb,
    transaction_id: u32,
) -> Option<Transaction> {
    let key = format!("transaction{}", transaction_id);
    db.get(&key)
}

// Retrieves all transactions from the rollback log, oldest first.
pub fn transaction_get_all(db: &PickleDb) -> Vec<Transaction> {
    let mut transactions = db
        .iter()
        .filter(|entry| entry.get_key().starts_with("transaction"))
        .filter_map(|entry| entry.get_value::<Transaction>())
        .collect::<Vec<_>>();
    transactions.sort_by_key(|transaction| transaction.id);
    transactions
}

// Retrieves the next available transaction ID and updates it.
fn transaction_next_key(db: &mut PickleDb) -> u32 {
    let mut next_id = db.get("next_id").unwrap_or(0);
    next_id += 1;
    if let Err(error) = db.set("next_id", &next_id) {
        error!(%error, "failed to update the next transaction ID in the rollback log");
    }
    next_id
}
