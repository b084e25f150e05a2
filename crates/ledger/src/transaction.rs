//! Staged ledger transactions
//!
//! A [`LedgerTransaction`] records balance deltas and allowance updates on
//! top of a [`MemoryLedger`] without touching it. Reads see the base state
//! plus the staged changes, and every base value a transaction reads is
//! remembered. `commit` re-checks those values and applies everything under
//! one write lock; dropping the transaction discards it.

use async_trait::async_trait;
use quantfi_types::{Address, Amount, Ledger, LedgerError, LedgerResult, Token};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::memory_ledger::{AllowanceKey, BalanceKey, LedgerState, MemoryLedger};

/// Net change staged for one (token, account) balance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Delta {
	pub(crate) credit: Amount,
	pub(crate) debit: Amount,
}

impl Delta {
	/// Balance after applying this delta to `current`, if it stays non-negative
	pub(crate) fn apply_to(&self, current: Amount) -> Option<Amount> {
		current.checked_add(self.credit)?.checked_sub(self.debit)
	}
}

#[derive(Debug, Default)]
pub(crate) struct ChangeSet {
	pub(crate) balances: HashMap<BalanceKey, Delta>,
	pub(crate) allowances: HashMap<AllowanceKey, Amount>,
	/// Base balances observed by reads and debits, as first seen
	pub(crate) balance_reads: HashMap<BalanceKey, Amount>,
	/// Base allowances observed before any staged approval replaced them
	pub(crate) allowance_reads: HashMap<AllowanceKey, Amount>,
}

impl ChangeSet {
	fn is_empty(&self) -> bool {
		self.balances.is_empty() && self.allowances.is_empty()
	}

	/// Staged balance, remembering the base value it was derived from
	fn read_balance(
		&mut self,
		base: &LedgerState,
		token: &Token,
		account: &Address,
	) -> LedgerResult<Amount> {
		self.balance_reads
			.entry((*token, *account))
			.or_insert_with(|| base.balance(token, account));
		self.balance(base, token, account)
	}

	fn balance(&self, base: &LedgerState, token: &Token, account: &Address) -> LedgerResult<Amount> {
		let current = base.balance(token, account);
		match self.balances.get(&(*token, *account)) {
			None => Ok(current),
			Some(delta) => delta.apply_to(current).ok_or_else(|| LedgerError::Conflict {
				reason: format!(
					"balance of {} for {} dropped below staged debits",
					token, account
				),
			}),
		}
	}

	fn allowance(
		&mut self,
		base: &LedgerState,
		token: &Token,
		owner: &Address,
		spender: &Address,
	) -> Amount {
		let key = (*token, *owner, *spender);
		if let Some(staged) = self.allowances.get(&key) {
			return *staged;
		}
		*self
			.allowance_reads
			.entry(key)
			.or_insert_with(|| base.allowance(token, owner, spender))
	}

	fn credit(
		&mut self,
		base: &LedgerState,
		token: &Token,
		account: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let overflow = || LedgerError::Overflow {
			token: *token,
			account: *account,
		};
		self.balance(base, token, account)?
			.checked_add(amount)
			.ok_or_else(overflow)?;

		let delta = self.balances.entry((*token, *account)).or_default();
		delta.credit = delta.credit.checked_add(amount).ok_or_else(overflow)?;
		Ok(())
	}

	fn debit(
		&mut self,
		base: &LedgerState,
		token: &Token,
		account: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let available = self.read_balance(base, token, account)?;
		if available < amount {
			return Err(LedgerError::InsufficientBalance {
				token: *token,
				account: *account,
				required: amount,
				available,
			});
		}

		let delta = self.balances.entry((*token, *account)).or_default();
		delta.debit = delta.debit.checked_add(amount).ok_or(LedgerError::Overflow {
			token: *token,
			account: *account,
		})?;
		Ok(())
	}

	fn move_balance(
		&mut self,
		base: &LedgerState,
		token: &Token,
		from: &Address,
		to: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		if from != to {
			self.balance(base, token, to)?
				.checked_add(amount)
				.ok_or(LedgerError::Overflow {
					token: *token,
					account: *to,
				})?;
		}
		self.debit(base, token, from, amount)?;
		self.credit(base, token, to, amount)
	}
}

/// Uncommitted view over a [`MemoryLedger`]
#[derive(Debug)]
pub struct LedgerTransaction {
	base: MemoryLedger,
	pending: Mutex<ChangeSet>,
}

impl LedgerTransaction {
	pub(crate) fn new(base: MemoryLedger) -> Self {
		Self {
			base,
			pending: Mutex::new(ChangeSet::default()),
		}
	}

	/// True when nothing has been staged yet
	pub async fn is_clean(&self) -> bool {
		self.pending.lock().await.is_empty()
	}

	/// Apply every staged change to the base ledger at once
	///
	/// Fails with [`LedgerError::Conflict`] if a concurrent commit changed a
	/// balance or allowance this transaction read; nothing is applied in
	/// that case.
	pub async fn commit(self) -> LedgerResult<()> {
		let changes = self.pending.into_inner();
		if changes.is_empty() {
			return Ok(());
		}
		self.base.apply(changes).await
	}

	/// Discard every staged change
	pub fn rollback(self) {
		debug!("Rolling back ledger transaction");
	}
}

#[async_trait]
impl Ledger for LedgerTransaction {
	async fn balance_of(&self, token: &Token, account: &Address) -> LedgerResult<Amount> {
		let mut pending = self.pending.lock().await;
		let base = self.base.read_state().await;
		pending.read_balance(&base, token, account)
	}

	async fn allowance(
		&self,
		token: &Token,
		owner: &Address,
		spender: &Address,
	) -> LedgerResult<Amount> {
		let mut pending = self.pending.lock().await;
		let base = self.base.read_state().await;
		Ok(pending.allowance(&base, token, owner, spender))
	}

	async fn approve(
		&self,
		token: &Token,
		owner: &Address,
		spender: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		self.pending
			.lock()
			.await
			.allowances
			.insert((*token, *owner, *spender), amount);
		Ok(())
	}

	async fn transfer(
		&self,
		token: &Token,
		from: &Address,
		to: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let mut pending = self.pending.lock().await;
		let base = self.base.read_state().await;
		pending.move_balance(&base, token, from, to, amount)
	}

	async fn transfer_from(
		&self,
		token: &Token,
		spender: &Address,
		from: &Address,
		to: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let mut pending = self.pending.lock().await;
		let base = self.base.read_state().await;

		let allowed = pending.allowance(&base, token, from, spender);
		if allowed < amount {
			return Err(LedgerError::InsufficientAllowance {
				token: *token,
				owner: *from,
				spender: *spender,
				required: amount,
				available: allowed,
			});
		}

		pending.move_balance(&base, token, from, to, amount)?;
		pending
			.allowances
			.insert((*token, *from, *spender), allowed - amount);
		Ok(())
	}

	async fn mint(&self, token: &Token, to: &Address, amount: Amount) -> LedgerResult<()> {
		let mut pending = self.pending.lock().await;
		let base = self.base.read_state().await;
		pending.credit(&base, token, to, amount)
	}

	async fn wrap_native(
		&self,
		wrapped: &Token,
		account: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let mut pending = self.pending.lock().await;
		let base = self.base.read_state().await;
		pending
			.balance(&base, wrapped, account)?
			.checked_add(amount)
			.ok_or(LedgerError::Overflow {
				token: *wrapped,
				account: *account,
			})?;
		pending.debit(&base, &Token::NATIVE, account, amount)?;
		pending.credit(&base, wrapped, account, amount)
	}

	async fn unwrap_native(
		&self,
		wrapped: &Token,
		account: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let mut pending = self.pending.lock().await;
		let base = self.base.read_state().await;
		pending
			.balance(&base, &Token::NATIVE, account)?
			.checked_add(amount)
			.ok_or(LedgerError::Overflow {
				token: Token::NATIVE,
				account: *account,
			})?;
		pending.debit(&base, wrapped, account, amount)?;
		pending.credit(&base, &Token::NATIVE, account, amount)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn token() -> Token {
		Token::from_low_u64(0x10)
	}

	fn alice() -> Address {
		Address::from_low_u64(0xa11ce)
	}

	fn bob() -> Address {
		Address::from_low_u64(0xb0b)
	}

	#[tokio::test]
	async fn test_reads_see_staged_changes_only_inside_transaction() {
		let ledger = MemoryLedger::new();
		ledger.mint(&token(), &alice(), 100).await.unwrap();

		let tx = ledger.begin();
		tx.transfer(&token(), &alice(), &bob(), 25).await.unwrap();

		assert_eq!(tx.balance_of(&token(), &alice()).await.unwrap(), 75);
		assert_eq!(tx.balance_of(&token(), &bob()).await.unwrap(), 25);
		assert_eq!(ledger.balance_of(&token(), &alice()).await.unwrap(), 100);
		assert_eq!(ledger.balance_of(&token(), &bob()).await.unwrap(), 0);

		tx.commit().await.unwrap();
		assert_eq!(ledger.balance_of(&token(), &alice()).await.unwrap(), 75);
		assert_eq!(ledger.balance_of(&token(), &bob()).await.unwrap(), 25);
	}

	#[tokio::test]
	async fn test_drop_discards_changes() {
		let ledger = MemoryLedger::new();
		ledger.mint(&token(), &alice(), 100).await.unwrap();
		ledger.approve(&token(), &alice(), &bob(), 100).await.unwrap();

		{
			let tx = ledger.begin();
			tx.transfer_from(&token(), &bob(), &alice(), &bob(), 60)
				.await
				.unwrap();
			tx.mint(&token(), &bob(), 5).await.unwrap();
			assert!(!tx.is_clean().await);
		}

		assert_eq!(ledger.balance_of(&token(), &alice()).await.unwrap(), 100);
		assert_eq!(ledger.balance_of(&token(), &bob()).await.unwrap(), 0);
		assert_eq!(ledger.allowance(&token(), &alice(), &bob()).await.unwrap(), 100);
	}

	#[tokio::test]
	async fn test_transaction_enforces_staged_balances() {
		let ledger = MemoryLedger::new();
		ledger.mint(&token(), &alice(), 10).await.unwrap();

		let tx = ledger.begin();
		tx.transfer(&token(), &alice(), &bob(), 8).await.unwrap();
		let second = tx.transfer(&token(), &alice(), &bob(), 8).await;
		assert!(matches!(
			second,
			Err(LedgerError::InsufficientBalance { available: 2, .. })
		));
	}

	#[tokio::test]
	async fn test_commit_conflict_applies_nothing() {
		let ledger = MemoryLedger::new();
		let carol = Address::from_low_u64(0xca401);
		ledger.mint(&token(), &alice(), 10).await.unwrap();

		let tx = ledger.begin();
		tx.mint(&token(), &carol, 1).await.unwrap();
		tx.transfer(&token(), &alice(), &bob(), 10).await.unwrap();

		// Drain alice outside the transaction before it commits
		ledger.transfer(&token(), &alice(), &carol, 5).await.unwrap();

		let result = tx.commit().await;
		assert!(matches!(result, Err(LedgerError::Conflict { .. })));
		assert_eq!(ledger.balance_of(&token(), &alice()).await.unwrap(), 5);
		assert_eq!(ledger.balance_of(&token(), &bob()).await.unwrap(), 0);
		assert_eq!(ledger.balance_of(&token(), &carol).await.unwrap(), 5);
	}

	#[tokio::test]
	async fn test_competing_allowance_spends_conflict() {
		let ledger = MemoryLedger::new();
		ledger.mint(&token(), &alice(), 10).await.unwrap();
		ledger.approve(&token(), &alice(), &bob(), 5).await.unwrap();

		let first = ledger.begin();
		let second = ledger.begin();
		first
			.transfer_from(&token(), &bob(), &alice(), &bob(), 5)
			.await
			.unwrap();
		second
			.transfer_from(&token(), &bob(), &alice(), &bob(), 5)
			.await
			.unwrap();

		first.commit().await.unwrap();
		let result = second.commit().await;
		assert!(matches!(result, Err(LedgerError::Conflict { .. })));

		assert_eq!(ledger.balance_of(&token(), &alice()).await.unwrap(), 5);
		assert_eq!(ledger.balance_of(&token(), &bob()).await.unwrap(), 5);
		assert_eq!(ledger.allowance(&token(), &alice(), &bob()).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_stale_balance_read_conflicts() {
		let ledger = MemoryLedger::new();
		let carol = Address::from_low_u64(0xca401);
		ledger.mint(&token(), &alice(), 100).await.unwrap();

		let tx = ledger.begin();
		assert_eq!(tx.balance_of(&token(), &alice()).await.unwrap(), 100);
		tx.mint(&token(), &bob(), 1).await.unwrap();

		// A credit is enough to invalidate what the transaction priced against
		ledger.mint(&token(), &alice(), 1).await.unwrap();

		assert!(matches!(tx.commit().await, Err(LedgerError::Conflict { .. })));
		assert_eq!(ledger.balance_of(&token(), &bob()).await.unwrap(), 0);

		// Reads of staged-only approvals never conflict
		let tx = ledger.begin();
		tx.approve(&token(), &alice(), &carol, 3).await.unwrap();
		tx.transfer_from(&token(), &carol, &alice(), &carol, 3)
			.await
			.unwrap();
		ledger.approve(&token(), &alice(), &carol, 50).await.unwrap();
		tx.commit().await.unwrap();
		assert_eq!(ledger.balance_of(&token(), &carol).await.unwrap(), 3);
		assert_eq!(ledger.allowance(&token(), &alice(), &carol).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_wrap_inside_transaction() {
		let ledger = MemoryLedger::new();
		let weth = Token::from_low_u64(0xee);
		ledger.mint(&Token::NATIVE, &alice(), 7).await.unwrap();

		let tx = ledger.begin();
		tx.wrap_native(&weth, &alice(), 7).await.unwrap();
		assert_eq!(tx.balance_of(&weth, &alice()).await.unwrap(), 7);
		assert_eq!(tx.balance_of(&Token::NATIVE, &alice()).await.unwrap(), 0);
		tx.commit().await.unwrap();

		assert_eq!(ledger.balance_of(&weth, &alice()).await.unwrap(), 7);
	}

	#[test]
	fn test_delta_apply() {
		let delta = Delta {
			credit: 5,
			debit: 8,
		};
		assert_eq!(delta.apply_to(3), Some(0));
		assert_eq!(delta.apply_to(2), None);
	}
}
