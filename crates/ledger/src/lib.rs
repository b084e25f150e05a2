//! QuantFi Ledger
//!
//! In-memory token ledger with staged, atomically committed transactions.

pub mod memory_ledger;
pub mod traits;
pub mod transaction;

pub use memory_ledger::MemoryLedger;
pub use traits::{Ledger, LedgerError, LedgerResult};
pub use transaction::LedgerTransaction;
