//! In-memory ledger backed by a single lock-protected balance book

use async_trait::async_trait;
use quantfi_types::{Address, Amount, Ledger, LedgerError, LedgerResult, Token};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::transaction::{ChangeSet, LedgerTransaction};

pub(crate) type BalanceKey = (Token, Address);
pub(crate) type AllowanceKey = (Token, Address, Address);

#[derive(Debug, Default)]
pub(crate) struct LedgerState {
	pub(crate) balances: HashMap<BalanceKey, Amount>,
	pub(crate) allowances: HashMap<AllowanceKey, Amount>,
}

impl LedgerState {
	pub(crate) fn balance(&self, token: &Token, account: &Address) -> Amount {
		self.balances.get(&(*token, *account)).copied().unwrap_or(0)
	}

	pub(crate) fn allowance(&self, token: &Token, owner: &Address, spender: &Address) -> Amount {
		self.allowances
			.get(&(*token, *owner, *spender))
			.copied()
			.unwrap_or(0)
	}

	fn set_balance(&mut self, token: &Token, account: &Address, amount: Amount) {
		if amount == 0 {
			self.balances.remove(&(*token, *account));
		} else {
			self.balances.insert((*token, *account), amount);
		}
	}

	fn credit(&mut self, token: &Token, account: &Address, amount: Amount) -> LedgerResult<()> {
		let next = self
			.balance(token, account)
			.checked_add(amount)
			.ok_or(LedgerError::Overflow {
				token: *token,
				account: *account,
			})?;
		self.set_balance(token, account, next);
		Ok(())
	}

	fn debit(&mut self, token: &Token, account: &Address, amount: Amount) -> LedgerResult<()> {
		let available = self.balance(token, account);
		if available < amount {
			return Err(LedgerError::InsufficientBalance {
				token: *token,
				account: *account,
				required: amount,
				available,
			});
		}
		self.set_balance(token, account, available - amount);
		Ok(())
	}

	fn move_balance(
		&mut self,
		token: &Token,
		from: &Address,
		to: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		// Validate the credit side before mutating anything
		if from != to {
			self.balance(token, to)
				.checked_add(amount)
				.ok_or(LedgerError::Overflow {
					token: *token,
					account: *to,
				})?;
		}
		self.debit(token, from, amount)?;
		self.credit(token, to, amount)
	}
}

/// Thread-safe in-memory ledger
///
/// Cloning shares the underlying state. Direct calls apply immediately;
/// [`MemoryLedger::begin`] opens a [`LedgerTransaction`] whose changes are
/// applied all at once on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
	state: Arc<RwLock<LedgerState>>,
}

impl MemoryLedger {
	pub fn new() -> Self {
		Self::default()
	}

	/// Open a transaction layered on this ledger
	pub fn begin(&self) -> LedgerTransaction {
		LedgerTransaction::new(self.clone())
	}

	/// Snapshot of every non-zero balance, for diagnostics and tests
	pub async fn balances(&self) -> HashMap<BalanceKey, Amount> {
		self.state.read().await.balances.clone()
	}

	pub(crate) async fn read_state(&self) -> tokio::sync::RwLockReadGuard<'_, LedgerState> {
		self.state.read().await
	}

	/// Apply a change set atomically
	///
	/// Every value the transaction read and every delta are checked against
	/// the current state under one write lock before anything is written; a
	/// failing check leaves the ledger untouched.
	pub(crate) async fn apply(&self, changes: ChangeSet) -> LedgerResult<()> {
		let mut state = self.state.write().await;

		for ((token, account), seen) in &changes.balance_reads {
			let current = state.balance(token, account);
			if current != *seen {
				return Err(LedgerError::Conflict {
					reason: format!(
						"balance of {} for {} changed from {} to {} during the transaction",
						token, account, seen, current
					),
				});
			}
		}
		for ((token, owner, spender), seen) in &changes.allowance_reads {
			let current = state.allowance(token, owner, spender);
			if current != *seen {
				return Err(LedgerError::Conflict {
					reason: format!(
						"allowance of {} from {} to {} changed from {} to {} during the transaction",
						token, owner, spender, seen, current
					),
				});
			}
		}

		let mut next_balances = Vec::with_capacity(changes.balances.len());
		for ((token, account), delta) in &changes.balances {
			let current = state.balance(token, account);
			let next = delta.apply_to(current).ok_or_else(|| LedgerError::Conflict {
				reason: format!(
					"balance of {} for {} changed underneath the transaction (now {}, needs {})",
					token, account, current, delta.debit
				),
			})?;
			next_balances.push(((*token, *account), next));
		}

		for ((token, account), next) in next_balances {
			state.set_balance(&token, &account, next);
		}
		for ((token, owner, spender), amount) in changes.allowances {
			if amount == 0 {
				state.allowances.remove(&(token, owner, spender));
			} else {
				state.allowances.insert((token, owner, spender), amount);
			}
		}

		debug!("Committed ledger change set");
		Ok(())
	}
}

#[async_trait]
impl Ledger for MemoryLedger {
	async fn balance_of(&self, token: &Token, account: &Address) -> LedgerResult<Amount> {
		Ok(self.state.read().await.balance(token, account))
	}

	async fn allowance(
		&self,
		token: &Token,
		owner: &Address,
		spender: &Address,
	) -> LedgerResult<Amount> {
		Ok(self.state.read().await.allowance(token, owner, spender))
	}

	async fn approve(
		&self,
		token: &Token,
		owner: &Address,
		spender: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let mut state = self.state.write().await;
		if amount == 0 {
			state.allowances.remove(&(*token, *owner, *spender));
		} else {
			state.allowances.insert((*token, *owner, *spender), amount);
		}
		Ok(())
	}

	async fn transfer(
		&self,
		token: &Token,
		from: &Address,
		to: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		self.state
			.write()
			.await
			.move_balance(token, from, to, amount)
	}

	async fn transfer_from(
		&self,
		token: &Token,
		spender: &Address,
		from: &Address,
		to: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let mut state = self.state.write().await;
		let allowed = state.allowance(token, from, spender);
		if allowed < amount {
			return Err(LedgerError::InsufficientAllowance {
				token: *token,
				owner: *from,
				spender: *spender,
				required: amount,
				available: allowed,
			});
		}

		state.move_balance(token, from, to, amount)?;

		let remaining = allowed - amount;
		if remaining == 0 {
			state.allowances.remove(&(*token, *from, *spender));
		} else {
			state.allowances.insert((*token, *from, *spender), remaining);
		}
		Ok(())
	}

	async fn mint(&self, token: &Token, to: &Address, amount: Amount) -> LedgerResult<()> {
		self.state.write().await.credit(token, to, amount)
	}

	async fn wrap_native(
		&self,
		wrapped: &Token,
		account: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let mut state = self.state.write().await;
		state
			.balance(wrapped, account)
			.checked_add(amount)
			.ok_or(LedgerError::Overflow {
				token: *wrapped,
				account: *account,
			})?;
		state.debit(&Token::NATIVE, account, amount)?;
		state.credit(wrapped, account, amount)
	}

	async fn unwrap_native(
		&self,
		wrapped: &Token,
		account: &Address,
		amount: Amount,
	) -> LedgerResult<()> {
		let mut state = self.state.write().await;
		state
			.balance(&Token::NATIVE, account)
			.checked_add(amount)
			.ok_or(LedgerError::Overflow {
				token: Token::NATIVE,
				account: *account,
			})?;
		state.debit(wrapped, account, amount)?;
		state.credit(&Token::NATIVE, account, amount)
	}
}
