//! Front door for quoting and executing swaps
//!
//! The executor reaches the adapter registry only through its path finder,
//! so both always report the same adapters. Every swap runs inside one
//! ledger transaction that is committed only after the adapter delivered,
//! and swaps through one executor run one at a time.

use quantfi_ledger::{LedgerTransaction, MemoryLedger};
use quantfi_types::{
	Address, Amount, Clock, DexAdapter, ExecuteRequest, Ledger, Quote, RegisteredAdapter,
	RouterError, RouterResult, SwapReceipt, SwapRequest, Token,
};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::authority::RoutingAuthority;
use crate::path_finder::PathFinder;

pub struct SwapExecutor {
	path_finder: Arc<PathFinder>,
	authority: RoutingAuthority,
	owner: RwLock<Address>,
	account: Address,
	ledger: MemoryLedger,
	clock: Arc<dyn Clock>,
	/// Held from input collection until commit
	swap_lock: Mutex<()>,
}

impl std::fmt::Debug for SwapExecutor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SwapExecutor")
			.field("path_finder", &self.path_finder.id())
			.field("owner", &self.owner())
			.field("account", &self.account)
			.finish()
	}
}

impl SwapExecutor {
	/// Take over `path_finder` using the authority it issued
	///
	/// `account` is the ledger account the executor holds funds in while a
	/// swap is in flight.
	pub fn new(
		path_finder: Arc<PathFinder>,
		authority: RoutingAuthority,
		owner: Address,
		account: Address,
		ledger: MemoryLedger,
		clock: Arc<dyn Clock>,
	) -> RouterResult<Self> {
		if !path_finder.is_authorized(&authority) {
			return Err(RouterError::unauthorized(
				owner,
				format!(
					"take over path finder {} with an authority issued by path finder {}",
					path_finder.id(),
					authority.path_finder_id()
				),
			));
		}
		if owner.is_zero() {
			return Err(RouterError::invalid_configuration(
				"executor owner cannot be the zero address",
			));
		}
		if account.is_zero() {
			return Err(RouterError::invalid_configuration(
				"executor account cannot be the zero address",
			));
		}

		info!(
			"Swap executor {} owns path finder {} (owner {})",
			account,
			path_finder.id(),
			owner
		);

		Ok(Self {
			path_finder,
			authority,
			owner: RwLock::new(owner),
			account,
			ledger,
			clock,
			swap_lock: Mutex::new(()),
		})
	}

	pub fn owner(&self) -> Address {
		*self.owner.read().unwrap_or_else(PoisonError::into_inner)
	}

	pub fn account(&self) -> Address {
		self.account
	}

	pub fn path_finder(&self) -> &Arc<PathFinder> {
		&self.path_finder
	}

	pub fn ledger(&self) -> &MemoryLedger {
		&self.ledger
	}

	fn ensure_owner(&self, caller: &Address, operation: &str) -> RouterResult<()> {
		if *caller != self.owner() {
			warn!("Rejected {} from non-owner {}", operation, caller);
			return Err(RouterError::unauthorized(*caller, operation));
		}
		Ok(())
	}

	pub fn transfer_ownership(&self, caller: &Address, new_owner: Address) -> RouterResult<()> {
		self.ensure_owner(caller, "transfer ownership")?;
		if new_owner.is_zero() {
			return Err(RouterError::invalid_configuration(
				"new owner cannot be the zero address",
			));
		}
		*self.owner.write().unwrap_or_else(PoisonError::into_inner) = new_owner;
		info!("Executor ownership transferred from {} to {}", caller, new_owner);
		Ok(())
	}

	pub fn add_adapter(
		&self,
		caller: &Address,
		name: &str,
		adapter: Arc<dyn DexAdapter>,
	) -> RouterResult<()> {
		self.ensure_owner(caller, "add adapter")?;
		self.path_finder.add_adapter(&self.authority, name, adapter)
	}

	pub fn remove_adapter(&self, caller: &Address, name: &str) -> RouterResult<bool> {
		self.ensure_owner(caller, "remove adapter")?;
		self.path_finder.remove_adapter(&self.authority, name)
	}

	pub fn adapter(&self, name: &str) -> Option<RegisteredAdapter> {
		self.path_finder.adapter(name)
	}

	pub fn adapter_names(&self) -> Vec<String> {
		self.path_finder.adapter_names()
	}

	pub fn set_max_hops(&self, caller: &Address, max_hops: usize) -> RouterResult<()> {
		self.ensure_owner(caller, "set max hops")?;
		self.path_finder.set_max_hops(&self.authority, max_hops)
	}

	pub fn set_target_token(&self, caller: &Address, target: Token) -> RouterResult<()> {
		self.ensure_owner(caller, "set target token")?;
		self.path_finder.set_target_token(&self.authority, target)
	}

	pub fn max_hops(&self) -> usize {
		self.path_finder.max_hops()
	}

	pub fn target_token(&self) -> Token {
		self.path_finder.target_token()
	}

	/// Best route for `amount_in` of `token_in`; read-only
	pub async fn quote(&self, token_in: Token, amount_in: Amount) -> RouterResult<Quote> {
		if amount_in == 0 {
			return Err(RouterError::InvalidAmount {
				reason: "amount in must be positive".to_string(),
			});
		}
		self.path_finder.find_best(token_in, amount_in).await
	}

	/// Convert the caller's input into the target along the best route
	///
	/// All-or-nothing: on any failure every balance is left as it was.
	pub async fn swap(&self, request: SwapRequest) -> RouterResult<SwapReceipt> {
		let swap_id = Uuid::new_v4().to_string();
		let span = info_span!(
			"swap",
			swap_id = %swap_id,
			caller = %request.caller,
			token_in = %request.token_in,
		);

		async {
			let _guard = self.swap_lock.lock().await;
			let result = self.execute_swap(&swap_id, &request).await;
			match &result {
				Ok(receipt) => info!(
					"Swapped {} {} for {} along {}",
					receipt.amount_in, request.token_in, receipt.amount_out, receipt.path
				),
				Err(e) => warn!("Swap failed: {}", e),
			}
			result
		}
		.instrument(span)
		.await
	}

	async fn execute_swap(&self, swap_id: &str, request: &SwapRequest) -> RouterResult<SwapReceipt> {
		if request.amount_in == 0 {
			return Err(RouterError::InvalidAmount {
				reason: "amount in must be positive".to_string(),
			});
		}
		self.ensure_live(request.deadline)?;

		let tx = self.ledger.begin();
		self.collect_input(&tx, request).await?;

		// Never trust a caller-supplied route
		let quote = self
			.path_finder
			.find_best(request.token_in, request.amount_in)
			.await?;

		let amount_out = match &quote.adapter {
			Some(entry) => self.delegate(&tx, entry, &quote, request).await?,
			None => self.return_identity(&tx, request).await?,
		};

		tx.commit().await?;

		Ok(SwapReceipt {
			swap_id: swap_id.to_string(),
			path: quote.path,
			adapter: quote.adapter.map(|entry| entry.name),
			amount_in: request.amount_in,
			amount_out,
			recipient: request.caller,
		})
	}

	fn ensure_live(&self, deadline: u64) -> RouterResult<()> {
		let now = self.clock.now();
		if now > deadline {
			return Err(RouterError::Expired { deadline, now });
		}
		Ok(())
	}

	/// Move the caller's input into the executor account
	async fn collect_input(&self, tx: &LedgerTransaction, request: &SwapRequest) -> RouterResult<()> {
		if request.token_in.is_native() {
			if request.value != request.amount_in {
				return Err(RouterError::InvalidValue {
					value: request.value,
					expected: request.amount_in,
				});
			}
			tx.transfer(&Token::NATIVE, &request.caller, &self.account, request.value)
				.await
				.map_err(RouterError::TransferFailed)
		} else {
			if request.value != 0 {
				return Err(RouterError::InvalidValue {
					value: request.value,
					expected: 0,
				});
			}
			tx.transfer_from(
				&request.token_in,
				&self.account,
				&request.caller,
				&self.account,
				request.amount_in,
			)
			.await
			.map_err(RouterError::TransferFailed)
		}
	}

	async fn delegate(
		&self,
		tx: &LedgerTransaction,
		entry: &RegisteredAdapter,
		quote: &Quote,
		request: &SwapRequest,
	) -> RouterResult<Amount> {
		let adapter_account = entry.adapter.account();
		if request.token_in.is_native() {
			tx.transfer(&Token::NATIVE, &self.account, &adapter_account, request.amount_in)
				.await?;
		} else {
			tx.approve(
				&request.token_in,
				&self.account,
				&adapter_account,
				request.amount_in,
			)
			.await?;
		}

		let execute = ExecuteRequest {
			caller: self.account,
			path: quote.path.clone(),
			token_in: request.token_in,
			amount_in: request.amount_in,
			amount_out_min: request.amount_out_min,
			recipient: request.caller,
			deadline: request.deadline,
		};
		Ok(entry.adapter.execute(tx, &execute).await?)
	}

	/// Input already is the target: hand it back after the usual checks
	async fn return_identity(&self, tx: &LedgerTransaction, request: &SwapRequest) -> RouterResult<Amount> {
		if request.amount_in < request.amount_out_min {
			return Err(RouterError::InsufficientOutput {
				required: request.amount_out_min,
				actual: request.amount_in,
			});
		}
		tx.transfer(&request.token_in, &self.account, &request.caller, request.amount_in)
			.await?;
		Ok(request.amount_in)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{token, RateAdapter};
	use quantfi_types::{LedgerError, ManualClock, MockClock};

	const USDT: u64 = 0x05d7;
	const BNB: u64 = 0xb4b;
	const WETH: u64 = 0xe7;

	fn owner() -> Address {
		Address::from_low_u64(0x0a)
	}
	fn account() -> Address {
		Address::from_low_u64(0xe4ec)
	}
	fn user() -> Address {
		Address::from_low_u64(0x05e4)
	}

	fn executor_with_clock(clock: Arc<dyn Clock>) -> SwapExecutor {
		let (path_finder, authority) = PathFinder::new(token(USDT), 4).unwrap();
		let executor = SwapExecutor::new(
			Arc::new(path_finder),
			authority,
			owner(),
			account(),
			MemoryLedger::new(),
			clock,
		)
		.unwrap();
		executor
			.add_adapter(
				&owner(),
				"uniswapV3",
				Arc::new(
					RateAdapter::new("uniswap-v3")
						.with_wrapped_native(token(WETH))
						.with_rate(token(BNB), token(USDT), 400, 1)
						.with_rate(token(WETH), token(USDT), 2_000, 1),
				),
			)
			.unwrap();
		executor
	}

	fn executor() -> SwapExecutor {
		executor_with_clock(Arc::new(ManualClock::new(1_000)))
	}

	#[test]
	fn test_rejects_foreign_authority() {
		let (path_finder, _authority) = PathFinder::new(token(USDT), 4).unwrap();
		let (_other, foreign) = PathFinder::new(token(USDT), 4).unwrap();
		let result = SwapExecutor::new(
			Arc::new(path_finder),
			foreign,
			owner(),
			account(),
			MemoryLedger::new(),
			Arc::new(ManualClock::new(0)),
		);
		assert!(matches!(result, Err(RouterError::Unauthorized { .. })));
	}

	#[test]
	fn test_owner_gated_operations() {
		let executor = executor();
		let stranger = user();

		let results = vec![
			executor
				.add_adapter(&stranger, "x", Arc::new(RateAdapter::new("x")))
				.map(|_| ()),
			executor.remove_adapter(&stranger, "uniswapV3").map(|_| ()),
			executor.set_max_hops(&stranger, 2),
			executor.set_target_token(&stranger, token(BNB)),
			executor.transfer_ownership(&stranger, stranger),
		];
		for result in results {
			assert!(matches!(result, Err(RouterError::Unauthorized { .. })));
		}
		assert_eq!(executor.max_hops(), 4);
		assert!(executor.adapter("uniswapV3").is_some());
	}

	#[test]
	fn test_registry_views_agree() {
		let executor = executor();
		assert!(executor.path_finder().adapter("uniswapV3").is_some());

		assert!(executor.remove_adapter(&owner(), "uniswapV3").unwrap());
		assert!(executor.adapter("uniswapV3").is_none());
		assert!(executor.path_finder().adapter("uniswapV3").is_none());
		assert_eq!(executor.adapter_names(), executor.path_finder().adapter_names());
	}

	#[test]
	fn test_transfer_ownership() {
		let executor = executor();
		assert!(executor.transfer_ownership(&owner(), Address::ZERO).is_err());

		executor.transfer_ownership(&owner(), user()).unwrap();
		assert_eq!(executor.owner(), user());
		assert!(executor.set_max_hops(&owner(), 2).is_err());
		executor.set_max_hops(&user(), 2).unwrap();
		assert_eq!(executor.max_hops(), 2);
	}

	#[tokio::test]
	async fn test_quote_rejects_zero_amount() {
		let executor = executor();
		assert!(matches!(
			executor.quote(token(BNB), 0).await,
			Err(RouterError::InvalidAmount { .. })
		));
	}

	#[tokio::test]
	async fn test_swap_moves_funds() {
		let executor = executor();
		let ledger = executor.ledger().clone();
		ledger.mint(&token(BNB), &user(), 5).await.unwrap();
		ledger
			.approve(&token(BNB), &user(), &account(), 5)
			.await
			.unwrap();

		let receipt = executor
			.swap(SwapRequest::new(user(), token(BNB), 5, 2_000, 2_000))
			.await
			.unwrap();

		assert_eq!(receipt.amount_out, 2_000);
		assert_eq!(receipt.adapter.as_deref(), Some("uniswapV3"));
		assert_eq!(ledger.balance_of(&token(USDT), &user()).await.unwrap(), 2_000);
		assert_eq!(ledger.balance_of(&token(BNB), &user()).await.unwrap(), 0);
		assert_eq!(ledger.balance_of(&token(BNB), &account()).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_swap_without_allowance_is_transfer_failed() {
		let executor = executor();
		executor
			.ledger()
			.mint(&token(BNB), &user(), 5)
			.await
			.unwrap();

		let result = executor
			.swap(SwapRequest::new(user(), token(BNB), 5, 0, 2_000))
			.await;
		assert!(matches!(
			result,
			Err(RouterError::TransferFailed(
				LedgerError::InsufficientAllowance { .. }
			))
		));
	}

	#[tokio::test]
	async fn test_slippage_rolls_back() {
		let executor = executor();
		let ledger = executor.ledger().clone();
		ledger.mint(&token(BNB), &user(), 5).await.unwrap();
		ledger
			.approve(&token(BNB), &user(), &account(), 5)
			.await
			.unwrap();
		let before = ledger.balances().await;

		let result = executor
			.swap(SwapRequest::new(user(), token(BNB), 5, 2_001, 2_000))
			.await;
		assert!(matches!(result, Err(RouterError::InsufficientOutput { .. })));
		assert_eq!(ledger.balances().await, before);
		assert_eq!(
			ledger.allowance(&token(BNB), &user(), &account()).await.unwrap(),
			5
		);
	}

	#[tokio::test]
	async fn test_native_value_must_match() {
		let executor = executor();
		executor
			.ledger()
			.mint(&Token::NATIVE, &user(), 10)
			.await
			.unwrap();

		let result = executor
			.swap(SwapRequest::native(user(), 2, 0, 2_000).with_value(1))
			.await;
		assert_eq!(
			result,
			Err(RouterError::InvalidValue {
				value: 1,
				expected: 2
			})
		);

		let result = executor
			.swap(SwapRequest::new(user(), token(BNB), 2, 0, 2_000).with_value(2))
			.await;
		assert!(matches!(result, Err(RouterError::InvalidValue { .. })));
	}

	#[tokio::test]
	async fn test_native_swap() {
		let executor = executor();
		let ledger = executor.ledger().clone();
		ledger.mint(&Token::NATIVE, &user(), 10).await.unwrap();

		let receipt = executor
			.swap(SwapRequest::native(user(), 3, 0, 2_000))
			.await
			.unwrap();

		assert_eq!(receipt.amount_out, 6_000);
		assert_eq!(ledger.balance_of(&Token::NATIVE, &user()).await.unwrap(), 7);
		assert_eq!(ledger.balance_of(&token(USDT), &user()).await.unwrap(), 6_000);
	}

	#[tokio::test]
	async fn test_identity_swap_checks_deadline() {
		let mut clock = MockClock::new();
		clock.expect_now().times(1).return_const(3_000u64);
		let executor = executor_with_clock(Arc::new(clock));
		let ledger = executor.ledger().clone();
		ledger.mint(&token(USDT), &user(), 50).await.unwrap();
		ledger
			.approve(&token(USDT), &user(), &account(), 50)
			.await
			.unwrap();

		let result = executor
			.swap(SwapRequest::new(user(), token(USDT), 50, 0, 2_000))
			.await;
		assert_eq!(
			result,
			Err(RouterError::Expired {
				deadline: 2_000,
				now: 3_000
			})
		);
		assert_eq!(ledger.balance_of(&token(USDT), &user()).await.unwrap(), 50);
	}

	#[tokio::test]
	async fn test_expired_swap_skips_search() {
		let mut clock = MockClock::new();
		clock.expect_now().times(1).return_const(3_000u64);
		let executor = executor_with_clock(Arc::new(clock));
		executor
			.remove_adapter(&owner(), "uniswapV3")
			.unwrap();

		// No adapter could route this, but the deadline is checked first
		let result = executor
			.swap(SwapRequest::new(user(), token(BNB), 5, 0, 2_000))
			.await;
		assert_eq!(
			result,
			Err(RouterError::Expired {
				deadline: 2_000,
				now: 3_000
			})
		);
	}

	#[tokio::test]
	async fn test_concurrent_swaps_share_one_allowance() {
		let executor = Arc::new(executor());
		let ledger = executor.ledger().clone();
		ledger.mint(&token(BNB), &user(), 10).await.unwrap();
		ledger
			.approve(&token(BNB), &user(), &account(), 5)
			.await
			.unwrap();

		let request = SwapRequest::new(user(), token(BNB), 5, 0, 2_000);
		let (a, b) = tokio::join!(
			executor.swap(request.clone()),
			executor.swap(request.clone())
		);

		let (ok, failed): (Vec<_>, Vec<_>) = [a, b].into_iter().partition(|r| r.is_ok());
		assert_eq!(ok.len(), 1);
		assert!(matches!(
			failed[0],
			Err(RouterError::TransferFailed(
				LedgerError::InsufficientAllowance { .. }
			))
		));
		assert_eq!(ledger.balance_of(&token(BNB), &user()).await.unwrap(), 5);
		assert_eq!(ledger.balance_of(&token(USDT), &user()).await.unwrap(), 2_000);
	}

	#[tokio::test]
	async fn test_identity_swap_returns_funds() {
		let executor = executor();
		let ledger = executor.ledger().clone();
		ledger.mint(&token(USDT), &user(), 50).await.unwrap();
		ledger
			.approve(&token(USDT), &user(), &account(), 50)
			.await
			.unwrap();

		let receipt = executor
			.swap(SwapRequest::new(user(), token(USDT), 50, 50, 2_000))
			.await
			.unwrap();
		assert!(receipt.adapter.is_none());
		assert_eq!(receipt.amount_out, 50);
		assert_eq!(ledger.balance_of(&token(USDT), &user()).await.unwrap(), 50);
	}
}
