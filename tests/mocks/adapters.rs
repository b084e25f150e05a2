//! Adapter doubles for integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use quantfi_types::{
	Address, AdapterError, AdapterInfo, AdapterResult, Amount, DexAdapter, EncodedPath,
	ExecuteRequest, FeeTier, Ledger, Path, Token, VenueError,
};

/// Adapter that knows a single direct edge into the target and pays
/// `amount_in * numerator / denominator` for it
#[allow(dead_code)]
#[derive(Debug)]
pub struct FixedRateAdapter {
	info: AdapterInfo,
	account: Address,
	wrapped_native: Token,
	token_in: Token,
	target: Token,
	numerator: Amount,
	denominator: Amount,
	delay_ms: u64,
	failing: bool,
	quote_calls: AtomicUsize,
}

#[allow(dead_code)]
impl FixedRateAdapter {
	pub fn new(id: &str, token_in: Token, target: Token, numerator: Amount, denominator: Amount) -> Self {
		Self {
			info: AdapterInfo::new(id, id).with_description("fixed-rate test adapter"),
			account: Address::from_low_u64(0xf1ed),
			wrapped_native: Token::from_low_u64(0xe7),
			token_in,
			target,
			numerator,
			denominator,
			delay_ms: 0,
			failing: false,
			quote_calls: AtomicUsize::new(0),
		}
	}

	pub fn with_account(mut self, account: Address) -> Self {
		self.account = account;
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
		if path.tokens() != [self.token_in, self.target] {
			return Err(AdapterError::UnknownPair {
				adapter_id: self.info.adapter_id.clone(),
				token_a: *path.token_in(),
				token_b: *path.token_out(),
			});
		}
		Ok(amount_in * self.numerator / self.denominator)
	}
}

#[async_trait]
impl DexAdapter for FixedRateAdapter {
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
		&[]
	}

	fn fee_tier(&self, token_a: &Token, token_b: &Token) -> Option<FeeTier> {
		let pair = (*token_a == self.token_in && *token_b == self.target)
			|| (*token_a == self.target && *token_b == self.token_in);
		pair.then_some(FeeTier::LOW)
	}

	fn encode_path(&self, path: &Path) -> AdapterResult<EncodedPath> {
		Ok(EncodedPath::encode(path, &vec![FeeTier::LOW; path.hops()])?)
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

		let amount_out = self.price(&request.path, request.amount_in)?;
		if amount_out < request.amount_out_min {
			return Err(AdapterError::InsufficientOutput {
				required: request.amount_out_min,
				actual: amount_out,
			});
		}
		ledger
			.mint(request.path.token_out(), &request.recipient, amount_out)
			.await?;
		Ok(amount_out)
	}
}
