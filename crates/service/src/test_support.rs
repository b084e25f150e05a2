//! Rate-table adapter double used by the service unit tests

use async_trait::async_trait;
use quantfi_types::{
	Address, AdapterError, AdapterInfo, AdapterResult, Amount, DexAdapter, EncodedPath,
	ExecuteRequest, FeeTier, Ledger, Path, Token, VenueError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn token(n: u64) -> Token {
	Token::from_low_u64(n)
}

/// Adapter pricing each directed leg at a fixed `numerator / denominator`
#[derive(Debug)]
pub struct RateAdapter {
	info: AdapterInfo,
	account: Address,
	wrapped_native: Token,
	exchange_tokens: Vec<Token>,
	rates: HashMap<(Token, Token), (Amount, Amount)>,
	delay_ms: u64,
	failing: bool,
	quote_calls: AtomicUsize,
}

impl RateAdapter {
	pub fn new(id: &str) -> Self {
		Self {
			info: AdapterInfo::new(id, id),
			account: Address::from_low_u64(0xada0),
			wrapped_native: token(0xe7),
			exchange_tokens: Vec::new(),
			rates: HashMap::new(),
			delay_ms: 0,
			failing: false,
			quote_calls: AtomicUsize::new(0),
		}
	}

	pub fn with_account(mut self, account: Address) -> Self {
		self.account = account;
		self
	}

	pub fn with_wrapped_native(mut self, wrapped: Token) -> Self {
		self.wrapped_native = wrapped;
		self
	}

	pub fn with_exchange_tokens(mut self, tokens: Vec<Token>) -> Self {
		self.exchange_tokens = tokens;
		self
	}

	pub fn with_rate(mut self, from: Token, to: Token, numerator: Amount, denominator: Amount) -> Self {
		self.rates.insert((from, to), (numerator, denominator));
		self
	}

	pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
		self.delay_ms = delay_ms;
		self
	}

	pub fn failing(mut self) -> Self {
		self.failing = true;
		self
	}

	pub fn quote_calls(&self) -> usize {
		self.quote_calls.load(Ordering::SeqCst)
	}

	fn price(&self, path: &Path, amount_in: Amount) -> AdapterResult<Amount> {
		let mut amount = amount_in;
		for (from, to) in path.legs() {
			let (numerator, denominator) =
				self.rates
					.get(&(*from, *to))
					.ok_or_else(|| AdapterError::UnknownPair {
						adapter_id: self.info.adapter_id.clone(),
						token_a: *from,
						token_b: *to,
					})?;
			amount = amount * numerator / denominator;
		}
		Ok(amount)
	}
}

#[async_trait]
impl DexAdapter for RateAdapter {
	fn info(&self) -> &AdapterInfo {
		&self.info
	}

	fn account(&self) -> Address {
		self.account
	}

	fn wrapped_native(&self) -> Token {
		self.wrapped_native
	}

	fn exchange_tokens(&self) -> &[Token] {
		&self.exchange_tokens
	}

	fn fee_tier(&self, token_a: &Token, token_b: &Token) -> Option<FeeTier> {
		let known = self.rates.contains_key(&(*token_a, *token_b))
			|| self.rates.contains_key(&(*token_b, *token_a));
		known.then_some(FeeTier::MEDIUM)
	}

	fn encode_path(&self, path: &Path) -> AdapterResult<EncodedPath> {
		Ok(EncodedPath::encode(path, &vec![FeeTier::MEDIUM; path.hops()])?)
	}

	async fn quote(&self, path: &Path, amount_in: Amount) -> AdapterResult<Amount> {
		self.quote_calls.fetch_add(1, Ordering::SeqCst);
		if self.delay_ms > 0 {
			tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
		}
		if self.failing {
			return Err(AdapterError::Venue(VenueError::InsufficientLiquidity {
				token_in: *path.token_in(),
				token_out: *path.token_out(),
			}));
		}
		self.price(path, amount_in)
	}

	async fn execute(&self, ledger: &dyn Ledger, request: &ExecuteRequest) -> AdapterResult<Amount> {
		if request.token_in.is_native() {
			ledger
				.wrap_native(&self.wrapped_native, &self.account, request.amount_in)
				.await
				.map_err(AdapterError::TransferFailed)?;
		} else {
			ledger
				.transfer_from(
					&request.token_in,
					&self.account,
					&request.caller,
					&self.account,
					request.amount_in,
				)
				.await
				.map_err(AdapterError::TransferFailed)?;
		}

		let amount_out = self.price(&request.path, request.amount_in)?;
		ledger
			.mint(request.path.token_out(), &request.recipient, amount_out)
			.await?;

		if amount_out < request.amount_out_min {
			return Err(AdapterError::InsufficientOutput {
				required: request.amount_out_min,
				actual: amount_out,
			});
		}
		Ok(amount_out)
	}
}
