//! Ledger traits for pluggable balance books

// Re-export the ledger trait from the types crate
pub use quantfi_types::ledger::{Ledger, LedgerError, LedgerResult};
