//! Uniswap-V3-style multi-hop adapter
//!
//! Holds a fee-tier table keyed by unordered token pair. A pair is only
//! traversable once its tier has been registered by the adapter owner; the
//! venue is never contacted for an unregistered pair.

use async_trait::async_trait;
use quantfi_types::{
	Address, AdapterConfig, AdapterError, AdapterInfo, AdapterResult, Amount, Clock, DexAdapter,
	EncodedPath, ExecuteRequest, FeeTier, Ledger, PairKey, Path, Token, Venue,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

pub struct UniswapV3Adapter {
	info: AdapterInfo,
	account: Address,
	owner: Address,
	wrapped_native: Token,
	exchange_tokens: Vec<Token>,
	fee_tiers: RwLock<Arc<HashMap<PairKey, FeeTier>>>,
	venue: Arc<dyn Venue>,
	clock: Arc<dyn Clock>,
}

impl fmt::Debug for UniswapV3Adapter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UniswapV3Adapter")
			.field("adapter_id", &self.info.adapter_id)
			.field("account", &self.account)
			.field("owner", &self.owner)
			.field("exchange_tokens", &self.exchange_tokens.len())
			.field("venue", &self.venue.name())
			.finish()
	}
}

impl UniswapV3Adapter {
	/// Build an adapter with an empty fee-tier table
	pub fn new(
		config: &AdapterConfig,
		venue: Arc<dyn Venue>,
		clock: Arc<dyn Clock>,
	) -> AdapterResult<Self> {
		config.validate()?;

		let info = AdapterInfo::new(config.adapter_id.clone(), config.name.clone())
			.with_description(format!("Uniswap V3 multi-hop adapter over {}", venue.name()));

		Ok(Self {
			info,
			account: config.account,
			owner: config.owner,
			wrapped_native: config.wrapped_native,
			exchange_tokens: config.exchange_tokens.clone(),
			fee_tiers: RwLock::new(Arc::new(HashMap::new())),
			venue,
			clock,
		})
	}

	pub fn owner(&self) -> Address {
		self.owner
	}

	/// Current fee-tier table
	pub fn fee_tiers(&self) -> Arc<HashMap<PairKey, FeeTier>> {
		Arc::clone(&self.fee_tiers.read().unwrap_or_else(PoisonError::into_inner))
	}

	/// Register the tier for an unordered pair, making it traversable
	pub fn set_fee_tier(
		&self,
		caller: &Address,
		token_a: Token,
		token_b: Token,
		fee: FeeTier,
	) -> AdapterResult<()> {
		if *caller != self.owner {
			return Err(AdapterError::Unauthorized {
				caller: *caller,
				adapter_id: self.info.adapter_id.clone(),
			});
		}
		if token_a == token_b {
			return Err(AdapterError::InvalidConfiguration {
				reason: format!("cannot set a fee tier from {} to itself", token_a),
			});
		}
		if token_a.is_zero() || token_b.is_zero() {
			return Err(AdapterError::InvalidConfiguration {
				reason: "fee tier pairs cannot include the zero token".to_string(),
			});
		}

		let pair = PairKey::new(token_a, token_b);
		let mut guard = self.fee_tiers.write().unwrap_or_else(PoisonError::into_inner);
		let mut table = HashMap::clone(&guard);
		table.insert(pair, fee);
		*guard = Arc::new(table);

		info!(
			"Adapter {} set fee tier {} for {}",
			self.info.adapter_id, fee, pair
		);
		Ok(())
	}

	/// Register `fee` for every exchange-token pair and for each exchange
	/// token to `target`; returns the number of edges written
	pub fn configure_full_mesh(
		&self,
		caller: &Address,
		target: Token,
		fee: FeeTier,
	) -> AdapterResult<usize> {
		let tokens: Vec<Token> = self
			.exchange_tokens
			.iter()
			.copied()
			.filter(|token| *token != target)
			.collect();

		let mut written = 0;
		for (i, token_a) in tokens.iter().enumerate() {
			for token_b in &tokens[i + 1..] {
				self.set_fee_tier(caller, *token_a, *token_b, fee)?;
				written += 1;
			}
			self.set_fee_tier(caller, *token_a, target, fee)?;
			written += 1;
		}

		info!(
			"Adapter {} configured {} edges toward {}",
			self.info.adapter_id, written, target
		);
		Ok(written)
	}

	fn require_fee_tier(
		&self,
		table: &HashMap<PairKey, FeeTier>,
		a: &Token,
		b: &Token,
	) -> AdapterResult<FeeTier> {
		table
			.get(&PairKey::new(*a, *b))
			.copied()
			.ok_or_else(|| AdapterError::UnknownPair {
				adapter_id: self.info.adapter_id.clone(),
				token_a: *a,
				token_b: *b,
			})
	}

	async fn pull_input(&self, ledger: &dyn Ledger, request: &ExecuteRequest) -> AdapterResult<()> {
		let pulled = if request.token_in.is_native() {
			// Native value was forwarded to our account by the caller
			ledger
				.wrap_native(&self.wrapped_native, &self.account, request.amount_in)
				.await
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
		};
		pulled.map_err(AdapterError::TransferFailed)
	}
}

#[async_trait]
impl DexAdapter for UniswapV3Adapter {
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
		self.fee_tiers().get(&PairKey::new(*token_a, *token_b)).copied()
	}

	fn encode_path(&self, path: &Path) -> AdapterResult<EncodedPath> {
		let table = self.fee_tiers();
		let fees = path
			.legs()
			.map(|(a, b)| self.require_fee_tier(&table, a, b))
			.collect::<AdapterResult<Vec<_>>>()?;
		Ok(EncodedPath::encode(path, &fees)?)
	}

	async fn quote(&self, path: &Path, amount_in: Amount) -> AdapterResult<Amount> {
		if path.is_identity() {
			return Ok(amount_in);
		}

		let encoded = self.encode_path(path)?;
		let amount_out = self.venue.quote_exact_input(&encoded, amount_in).await?;
		debug!(
			"Adapter {} quoted {} -> {} along {}",
			self.info.adapter_id, amount_in, amount_out, path
		);
		Ok(amount_out)
	}

	async fn execute(&self, ledger: &dyn Ledger, request: &ExecuteRequest) -> AdapterResult<Amount> {
		let now = self.clock.now();
		if now > request.deadline {
			return Err(AdapterError::Expired {
				deadline: request.deadline,
				now,
			});
		}

		let resolved = self.resolve_token_in(&request.token_in);
		if *request.path.token_in() != resolved {
			return Err(AdapterError::InvalidPath {
				reason: format!(
					"path starts at {} but input resolves to {}",
					request.path.token_in(),
					resolved
				),
			});
		}
		let encoded = if request.path.is_identity() {
			None
		} else {
			Some(self.encode_path(&request.path)?)
		};

		self.pull_input(ledger, request).await?;

		let amount_out = match encoded {
			Some(encoded) => {
				self.venue
					.exact_input(
						ledger,
						&self.account,
						&encoded,
						request.amount_in,
						&request.recipient,
					)
					.await?
			},
			None => {
				ledger
					.transfer(&resolved, &self.account, &request.recipient, request.amount_in)
					.await?;
				request.amount_in
			},
		};

		if amount_out < request.amount_out_min {
			return Err(AdapterError::InsufficientOutput {
				required: request.amount_out_min,
				actual: amount_out,
			});
		}

		debug!(
			"Adapter {} executed {} {} -> {} along {}",
			self.info.adapter_id,
			request.amount_in,
			request.token_in,
			amount_out,
			request.path
		);
		Ok(amount_out)
	}
}
