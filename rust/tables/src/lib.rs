//! Multi-table host for the fairdeal engine.
//!
//! A [`TableManager`] owns any number of independent tables, moves chips
//! between them and a [`Ledger`], fans public [`TableEvent`]s out through an
//! [`EventBus`], and lets a [`TimeoutWatcher`] fold players who run out of
//! time.

pub mod errors;
pub mod events;
pub mod ledger;
pub mod logging;
pub mod manager;
pub mod settings;
pub mod watcher;

pub type TableId = String;

pub use errors::{ErrorResponse, ErrorSeverity, TableError};
pub use events::{EventBus, EventSubscription, TableEvent};
pub use ledger::{BalanceRecord, InMemoryLedger, Ledger, LedgerError};
pub use logging::{init_logging, init_test_logging, CapturedEvent, LogFormat, TestLogSubscriber};
pub use manager::{Table, TableManager};
pub use settings::{ResolvedSettings, SettingsError, TableSettings, ValueSource};
pub use watcher::{TimeoutWatcher, WatcherHandle};
