//! In-memory constant-product venue
//!
//! Pools are keyed by unordered pair and fee tier. A pool's reserves are
//! simply the balances its account holds in the ledger, so trades executed
//! against a ledger transaction roll back together with it.

use alloy_primitives::U256;
use async_trait::async_trait;
use dashmap::DashMap;
use quantfi_types::{
	Address, Amount, EncodedPath, FeeTier, Ledger, PairKey, PathError, Token, Venue, VenueError,
	VenueResult, FEE_DENOMINATOR,
};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// One constant-product pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
	pub pair: PairKey,
	pub fee: FeeTier,
	pub account: Address,
}

impl Pool {
	fn new(pair: PairKey, fee: FeeTier) -> Self {
		Self {
			pair,
			fee,
			account: PoolVenue::pool_address(&pair, fee),
		}
	}
}

pub struct PoolVenue {
	name: String,
	ledger: Arc<dyn Ledger>,
	pools: DashMap<(PairKey, FeeTier), Pool>,
}

impl fmt::Debug for PoolVenue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PoolVenue")
			.field("name", &self.name)
			.field("pools", &self.pools.len())
			.finish()
	}
}

impl PoolVenue {
	/// Venue reading reserves from `ledger` when quoting
	pub fn new(name: impl Into<String>, ledger: Arc<dyn Ledger>) -> Self {
		Self {
			name: name.into(),
			ledger,
			pools: DashMap::new(),
		}
	}

	/// Deterministic pool account: last 20 bytes of sha256(token0 | token1 | fee)
	pub fn pool_address(pair: &PairKey, fee: FeeTier) -> Address {
		let (token0, token1) = pair.tokens();
		let mut hasher = Sha256::new();
		hasher.update(token0.as_bytes());
		hasher.update(token1.as_bytes());
		hasher.update(fee.to_be_bytes());
		let digest = hasher.finalize();

		let mut bytes = [0u8; 20];
		bytes.copy_from_slice(&digest[digest.len() - 20..]);
		Address::from_bytes(bytes)
	}

	/// Create an empty pool; returns the existing one if already present
	pub fn create_pool(&self, token_a: Token, token_b: Token, fee: FeeTier) -> VenueResult<Pool> {
		if token_a == token_b {
			return Err(VenueError::MalformedPath(PathError::RepeatedToken {
				token: token_a,
			}));
		}

		let pair = PairKey::new(token_a, token_b);
		let pool = self
			.pools
			.entry((pair, fee))
			.or_insert_with(|| {
				info!("Created pool {} at fee tier {}", pair, fee);
				Pool::new(pair, fee)
			})
			.clone();
		Ok(pool)
	}

	pub fn pool(&self, token_a: &Token, token_b: &Token, fee: FeeTier) -> Option<Pool> {
		self.pools
			.get(&(PairKey::new(*token_a, *token_b), fee))
			.map(|entry| entry.value().clone())
	}

	pub fn pools(&self) -> Vec<Pool> {
		self.pools.iter().map(|entry| entry.value().clone()).collect()
	}

	fn require_pool(&self, token_a: &Token, token_b: &Token, fee: FeeTier) -> VenueResult<Pool> {
		self.pool(token_a, token_b, fee)
			.ok_or(VenueError::PoolNotFound {
				token_a: *token_a,
				token_b: *token_b,
				fee,
			})
	}

	/// Reserves of the pool in (token_a, token_b) order
	pub async fn reserves(
		&self,
		token_a: &Token,
		token_b: &Token,
		fee: FeeTier,
	) -> VenueResult<(Amount, Amount)> {
		let pool = self.require_pool(token_a, token_b, fee)?;
		Self::pool_reserves(self.ledger.as_ref(), &pool, token_a, token_b).await
	}

	/// Deposit liquidity from `provider`
	pub async fn add_liquidity(
		&self,
		provider: &Address,
		token_a: Token,
		token_b: Token,
		fee: FeeTier,
		amount_a: Amount,
		amount_b: Amount,
	) -> VenueResult<()> {
		let pool = self.require_pool(&token_a, &token_b, fee)?;
		self.ledger
			.transfer(&token_a, provider, &pool.account, amount_a)
			.await?;
		self.ledger
			.transfer(&token_b, provider, &pool.account, amount_b)
			.await?;
		debug!(
			"Added liquidity {}/{} to pool {} at {}",
			amount_a, amount_b, pool.pair, fee
		);
		Ok(())
	}

	/// Create a pool and mint its reserves directly
	pub async fn seed_pool(
		&self,
		token_a: Token,
		token_b: Token,
		fee: FeeTier,
		reserve_a: Amount,
		reserve_b: Amount,
	) -> VenueResult<Pool> {
		let pool = self.create_pool(token_a, token_b, fee)?;
		self.ledger.mint(&token_a, &pool.account, reserve_a).await?;
		self.ledger.mint(&token_b, &pool.account, reserve_b).await?;
		info!(
			"Seeded pool {} at {} with reserves {}/{}",
			pool.pair, fee, reserve_a, reserve_b
		);
		Ok(pool)
	}

	async fn pool_reserves(
		ledger: &dyn Ledger,
		pool: &Pool,
		token_in: &Token,
		token_out: &Token,
	) -> VenueResult<(Amount, Amount)> {
		let reserve_in = ledger.balance_of(token_in, &pool.account).await?;
		let reserve_out = ledger.balance_of(token_out, &pool.account).await?;
		Ok((reserve_in, reserve_out))
	}

	/// Constant-product output for one hop after the pool fee
	pub fn amount_out(
		amount_in: Amount,
		reserve_in: Amount,
		reserve_out: Amount,
		fee: FeeTier,
		token_in: &Token,
		token_out: &Token,
	) -> VenueResult<Amount> {
		let illiquid = || VenueError::InsufficientLiquidity {
			token_in: *token_in,
			token_out: *token_out,
		};
		if reserve_in == 0 || reserve_out == 0 {
			return Err(illiquid());
		}

		let denominator = U256::from(FEE_DENOMINATOR);
		let in_after_fee =
			U256::from(amount_in) * U256::from(FEE_DENOMINATOR - fee.raw()) / denominator;
		let numerator = U256::from(reserve_out) * in_after_fee;
		let out = numerator / (U256::from(reserve_in) + in_after_fee);

		let out = Amount::try_from(out).map_err(|_| VenueError::Overflow {
			token_in: *token_in,
			token_out: *token_out,
		})?;
		if out == 0 {
			return Err(illiquid());
		}
		Ok(out)
	}

	fn decode_hops(path: &EncodedPath) -> VenueResult<Vec<(Token, Token, FeeTier)>> {
		let (tokens, fees) = path.decode()?;
		if fees.is_empty() {
			return Err(VenueError::MalformedPath(PathError::Malformed {
				len: path.len(),
			}));
		}
		Ok(tokens
			.windows(2)
			.zip(fees)
			.map(|(pair, fee)| (pair[0], pair[1], fee))
			.collect())
	}
}

#[async_trait]
impl Venue for PoolVenue {
	fn name(&self) -> &str {
		&self.name
	}

	async fn quote_exact_input(&self, path: &EncodedPath, amount_in: Amount) -> VenueResult<Amount> {
		let mut amount = amount_in;
		for (token_in, token_out, fee) in Self::decode_hops(path)? {
			let pool = self.require_pool(&token_in, &token_out, fee)?;
			let (reserve_in, reserve_out) =
				Self::pool_reserves(self.ledger.as_ref(), &pool, &token_in, &token_out).await?;
			amount = Self::amount_out(amount, reserve_in, reserve_out, fee, &token_in, &token_out)?;
		}
		Ok(amount)
	}

	async fn exact_input(
		&self,
		ledger: &dyn Ledger,
		payer: &Address,
		path: &EncodedPath,
		amount_in: Amount,
		recipient: &Address,
	) -> VenueResult<Amount> {
		let hops = Self::decode_hops(path)?;
		let last = hops.len() - 1;
		let mut amount = amount_in;

		// Intermediate proceeds come back to the payer and fund the next hop
		for (index, (token_in, token_out, fee)) in hops.into_iter().enumerate() {
			let pool = self.require_pool(&token_in, &token_out, fee)?;
			let (reserve_in, reserve_out) =
				Self::pool_reserves(ledger, &pool, &token_in, &token_out).await?;
			let out = Self::amount_out(amount, reserve_in, reserve_out, fee, &token_in, &token_out)?;

			let destination = if index == last { recipient } else { payer };
			ledger
				.transfer(&token_in, payer, &pool.account, amount)
				.await?;
			ledger
				.transfer(&token_out, &pool.account, destination, out)
				.await?;

			debug!(
				"Swapped {} {} for {} {} in pool {}",
				amount, token_in, out, token_out, pool.account
			);
			amount = out;
		}

		Ok(amount)
	}
}
