//! Ledger trait for pluggable balance books

use async_trait::async_trait;

use super::LedgerResult;
use crate::models::{Address, Amount, Token};

/// Balance and allowance book shared by the executor, adapters and venues
#[async_trait]
pub trait Ledger: Send + Sync {
	/// Current balance of `token` held by `account`
	async fn balance_of(&self, token: &Token, account: &Address) -> LedgerResult<Amount>;

	/// Amount `spender` may still move out of `owner`'s balance
	async fn allowance(
		&self,
		token: &Token,
		owner: &Address,
		spender: &Address,
	) -> LedgerResult<Amount>;

	/// Set (not add to) the allowance of `spender` over `owner`'s tokens
	async fn approve(
		&self,
		token: &Token,
		owner: &Address,
		spender: &Address,
		amount: Amount,
	) -> LedgerResult<()>;

	async fn transfer(
		&self,
		token: &Token,
		from: &Address,
		to: &Address,
		amount: Amount,
	) -> LedgerResult<()>;

	/// Move `amount` from `from` to `to`, consuming `spender`'s allowance
	async fn transfer_from(
		&self,
		token: &Token,
		spender: &Address,
		from: &Address,
		to: &Address,
		amount: Amount,
	) -> LedgerResult<()>;

	/// Credit new tokens to `to`
	async fn mint(&self, token: &Token, to: &Address, amount: Amount) -> LedgerResult<()>;

	/// Convert native balance into `wrapped` tokens one-to-one
	async fn wrap_native(
		&self,
		wrapped: &Token,
		account: &Address,
		amount: Amount,
	) -> LedgerResult<()>;

	/// Convert `wrapped` tokens back into native balance one-to-one
	async fn unwrap_native(
		&self,
		wrapped: &Token,
		account: &Address,
		amount: Amount,
	) -> LedgerResult<()>;
}
