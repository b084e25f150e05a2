//! Minimal adapter double for registry tests

use async_trait::async_trait;
use quantfi_types::{
	Address, AdapterInfo, AdapterResult, Amount, DexAdapter, EncodedPath, ExecuteRequest,
	FeeTier, Ledger, Path, Token,
};

#[derive(Debug)]
pub struct StaticAdapter {
	info: AdapterInfo,
}

impl StaticAdapter {
	pub fn new(id: &str) -> Self {
		Self {
			info: AdapterInfo::new(id, id),
		}
	}
}

#[async_trait]
impl DexAdapter for StaticAdapter {
	fn info(&self) -> &AdapterInfo {
		&self.info
	}

	fn account(&self) -> Address {
		Address::from_low_u64(0xad)
	}

	fn wrapped_native(&self) -> Token {
		Token::from_low_u64(0xe7)
	}

	fn exchange_tokens(&self) -> &[Token] {
		&[]
	}

	fn fee_tier(&self, _token_a: &Token, _token_b: &Token) -> Option<FeeTier> {
		None
	}

	fn encode_path(&self, path: &Path) -> AdapterResult<EncodedPath> {
		Ok(EncodedPath::from_bytes(path.token_in().as_bytes().to_vec()))
	}

	async fn quote(&self, _path: &Path, amount_in: Amount) -> AdapterResult<Amount> {
		Ok(amount_in)
	}

	async fn execute(
		&self,
		_ledger: &dyn Ledger,
		request: &ExecuteRequest,
	) -> AdapterResult<Amount> {
		Ok(request.amount_in)
	}
}
