//! Shared domain models

pub mod amount;
pub mod fee_tier;
pub mod path;
pub mod token;

pub use amount::Amount;
pub use fee_tier::{FeeTier, FeeTierError, PairKey, FEE_DENOMINATOR};
pub use path::{EncodedPath, Path, PathError};
pub use token::{Address, IdentifierError, Token, ADDRESS_LEN};
