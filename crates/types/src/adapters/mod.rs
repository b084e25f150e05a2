//! Adapter capability, models and errors

pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::{AdapterConfig, AdapterKind, FeeTierConfig};
pub use errors::{AdapterError, AdapterResult};
pub use models::{AdapterInfo, ExecuteRequest, RegisteredAdapter};
pub use traits::DexAdapter;
