//! Boundary with the external balance ledger.
//!
//! Tables only track in-table stacks. Chips enter a table through
//! [`Ledger::debit`] and leave it through [`Ledger::credit`].

use std::collections::HashMap;
use std::sync::RwLock;

use fairdeal_engine::player::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One account as the ledger sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub user_id: UserId,
    /// Spendable balance
    pub balance: u64,
    /// Chips currently bought in at tables
    pub in_play: u64,
}

impl BalanceRecord {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            balance: 0,
            in_play: 0,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("User {user_id} needs {needed} but has {available}")]
    InsufficientFunds {
        user_id: UserId,
        needed: u64,
        available: u64,
    },
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

pub trait Ledger: Send + Sync {
    fn balance(&self, user_id: UserId) -> Result<BalanceRecord, LedgerError>;

    /// Moves `amount` from the spendable balance into play.
    fn debit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, LedgerError>;

    /// Returns `amount` from play to the spendable balance. Winnings can
    /// exceed what was bought in, so `in_play` saturates at zero.
    fn credit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, LedgerError>;
}

/// Process-local ledger for tests and the CLI.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    accounts: RwLock<HashMap<UserId, BalanceRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(balances: impl IntoIterator<Item = (UserId, u64)>) -> Self {
        let ledger = Self::new();
        if let Ok(mut guard) = ledger.accounts.write() {
            for (user_id, balance) in balances {
                guard.insert(
                    user_id,
                    BalanceRecord {
                        user_id,
                        balance,
                        in_play: 0,
                    },
                );
            }
        }
        ledger
    }

    pub fn deposit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, LedgerError> {
        self.update(user_id, |rec| {
            rec.balance += amount;
            Ok(())
        })
    }

    fn update(
        &self,
        user_id: UserId,
        f: impl FnOnce(&mut BalanceRecord) -> Result<(), LedgerError>,
    ) -> Result<BalanceRecord, LedgerError> {
        let mut guard = self
            .accounts
            .write()
            .map_err(|_| LedgerError::Unavailable("account lock poisoned".into()))?;
        let mut record = guard
            .get(&user_id)
            .copied()
            .unwrap_or_else(|| BalanceRecord::empty(user_id));
        f(&mut record)?;
        guard.insert(user_id, record);
        Ok(record)
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, user_id: UserId) -> Result<BalanceRecord, LedgerError> {
        let guard = self
            .accounts
            .read()
            .map_err(|_| LedgerError::Unavailable("account lock poisoned".into()))?;
        Ok(guard
            .get(&user_id)
            .copied()
            .unwrap_or_else(|| BalanceRecord::empty(user_id)))
    }

    fn debit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, LedgerError> {
        self.update(user_id, |rec| {
            if rec.balance < amount {
                return Err(LedgerError::InsufficientFunds {
                    user_id,
                    needed: amount,
                    available: rec.balance,
                });
            }
            rec.balance -= amount;
            rec.in_play += amount;
            Ok(())
        })
    }

    fn credit(&self, user_id: UserId, amount: u64) -> Result<BalanceRecord, LedgerError> {
        self.update(user_id, |rec| {
            rec.balance += amount;
            rec.in_play = rec.in_play.saturating_sub(amount);
            Ok(())
        })
    }
}
