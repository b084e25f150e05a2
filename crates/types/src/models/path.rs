//! Swap paths and their venue encoding

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::{FeeTier, Token, ADDRESS_LEN};

const FEE_LEN: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
	#[error("Path must contain at least one token")]
	Empty,

	#[error("Path revisits token {token}")]
	RepeatedToken { token: Token },

	#[error("Path with {hops} hops needs {hops} fee tiers, got {actual}")]
	FeeCountMismatch { hops: usize, actual: usize },

	#[error("Encoded path of {len} bytes is malformed")]
	Malformed { len: usize },
}

/// Ordered token sequence from the input token to the output token
///
/// Never empty and never revisits a token. A single-token path is the
/// identity route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Token>", into = "Vec<Token>")]
pub struct Path(Vec<Token>);

impl Path {
	pub fn new(tokens: Vec<Token>) -> Result<Self, PathError> {
		if tokens.is_empty() {
			return Err(PathError::Empty);
		}

		let mut seen = HashSet::with_capacity(tokens.len());
		for token in &tokens {
			if !seen.insert(*token) {
				return Err(PathError::RepeatedToken { token: *token });
			}
		}

		Ok(Self(tokens))
	}

	pub fn identity(token: Token) -> Self {
		Self(vec![token])
	}

	pub fn tokens(&self) -> &[Token] {
		&self.0
	}

	/// Number of trade legs
	pub fn hops(&self) -> usize {
		self.0.len() - 1
	}

	pub fn is_identity(&self) -> bool {
		self.0.len() == 1
	}

	pub fn token_in(&self) -> &Token {
		&self.0[0]
	}

	pub fn token_out(&self) -> &Token {
		&self.0[self.0.len() - 1]
	}

	pub fn contains(&self, token: &Token) -> bool {
		self.0.contains(token)
	}

	/// Adjacent (from, to) pairs in trade order
	pub fn legs(&self) -> impl Iterator<Item = (&Token, &Token)> {
		self.0.windows(2).map(|pair| (&pair[0], &pair[1]))
	}

	/// Extend by one token; fails if the token is already on the path
	pub fn extended(&self, next: Token) -> Result<Self, PathError> {
		if self.contains(&next) {
			return Err(PathError::RepeatedToken { token: next });
		}
		let mut tokens = self.0.clone();
		tokens.push(next);
		Ok(Self(tokens))
	}
}

impl TryFrom<Vec<Token>> for Path {
	type Error = PathError;

	fn try_from(tokens: Vec<Token>) -> Result<Self, Self::Error> {
		Self::new(tokens)
	}
}

impl From<Path> for Vec<Token> {
	fn from(path: Path) -> Self {
		path.0
	}
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let rendered: Vec<String> = self.0.iter().map(|t| t.to_string()).collect();
		write!(f, "{}", rendered.join(" -> "))
	}
}

/// Packed multi-hop path: `token0 (20) | fee (3) | token1 (20) | ...`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EncodedPath(Vec<u8>);

impl EncodedPath {
	pub fn encode(path: &Path, fees: &[FeeTier]) -> Result<Self, PathError> {
		if fees.len() != path.hops() {
			return Err(PathError::FeeCountMismatch {
				hops: path.hops(),
				actual: fees.len(),
			});
		}

		let mut encoded = Vec::with_capacity(path.tokens().len() * ADDRESS_LEN + fees.len() * FEE_LEN);
		for (i, token) in path.tokens().iter().enumerate() {
			encoded.extend_from_slice(token.as_bytes());
			if let Some(fee) = fees.get(i) {
				encoded.extend_from_slice(&fee.to_be_bytes());
			}
		}

		Ok(Self(encoded))
	}

	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}

	/// Split back into tokens and per-hop fee tiers
	pub fn decode(&self) -> Result<(Vec<Token>, Vec<FeeTier>), PathError> {
		let len = self.0.len();
		if len < ADDRESS_LEN || (len - ADDRESS_LEN) % (ADDRESS_LEN + FEE_LEN) != 0 {
			return Err(PathError::Malformed { len });
		}

		let hops = (len - ADDRESS_LEN) / (ADDRESS_LEN + FEE_LEN);
		let mut tokens = Vec::with_capacity(hops + 1);
		let mut fees = Vec::with_capacity(hops);
		let mut offset = 0;

		loop {
			let mut token = [0u8; ADDRESS_LEN];
			token.copy_from_slice(&self.0[offset..offset + ADDRESS_LEN]);
			tokens.push(Token::from_bytes(token));
			offset += ADDRESS_LEN;

			if offset == len {
				break;
			}

			let mut fee = [0u8; FEE_LEN];
			fee.copy_from_slice(&self.0[offset..offset + FEE_LEN]);
			fees.push(FeeTier::from_be_bytes(fee).map_err(|_| PathError::Malformed { len })?);
			offset += FEE_LEN;
		}

		Ok((tokens, fees))
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn to_hex(&self) -> String {
		format!("0x{}", hex::encode(&self.0))
	}
}

impl fmt::Display for EncodedPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}
