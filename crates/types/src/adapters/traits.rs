//! Core adapter trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::{AdapterInfo, AdapterResult, ExecuteRequest};
use crate::ledger::Ledger;
use crate::models::{Address, Amount, EncodedPath, FeeTier, Path, Token};

/// Uniform quote/execute capability of one trading venue
///
/// Implementations own a fixed set of exchange tokens (eligible intermediate
/// hops) and a fee-tier table; a pair without a fee tier is not traversable.
#[async_trait]
pub trait DexAdapter: Send + Sync + Debug {
	fn info(&self) -> &AdapterInfo;

	fn id(&self) -> &str {
		&self.info().adapter_id
	}

	fn name(&self) -> &str {
		&self.info().name
	}

	fn version(&self) -> &str {
		&self.info().version
	}

	/// Ledger account the adapter trades from
	fn account(&self) -> Address;

	/// Tradable form of the native asset on this venue
	fn wrapped_native(&self) -> Token;

	/// Tokens eligible as intermediate hops
	fn exchange_tokens(&self) -> &[Token];

	/// Fee tier registered for the unordered pair, if any
	fn fee_tier(&self, token_a: &Token, token_b: &Token) -> Option<FeeTier>;

	/// Token actually routed for `token_in`: the native sentinel becomes the
	/// wrapped-native token
	fn resolve_token_in(&self, token_in: &Token) -> Token {
		if token_in.is_native() {
			self.wrapped_native()
		} else {
			*token_in
		}
	}

	/// Venue encoding of `path` with each hop's fee tier
	fn encode_path(&self, path: &Path) -> AdapterResult<EncodedPath>;

	/// Output for trading `amount_in` along `path`; read-only
	async fn quote(&self, path: &Path, amount_in: Amount) -> AdapterResult<Amount>;

	/// Trade along `request.path`, delivering output to `request.recipient`
	///
	/// Returns the output amount. Movements go through `ledger`, so a caller
	/// holding a transaction can discard them on failure.
	async fn execute(&self, ledger: &dyn Ledger, request: &ExecuteRequest)
		-> AdapterResult<Amount>;
}
