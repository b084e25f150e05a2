//! Token ledger abstraction
//!
//! Balances and allowances keyed by (token, account). The native asset is
//! tracked under [`Token::NATIVE`](crate::Token::NATIVE).

pub mod errors;
pub mod traits;

pub use errors::{LedgerError, LedgerResult};
pub use traits::Ledger;
