//! QuantFi Configuration
//!
//! Settings loading, validation and startup logging for the QuantFi router.

pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use loader::{load_config, load_config_from, ConfigLoadError};
pub use settings::{
	AccountSettings, AdapterSettings, ConfigValidationError, FeeTierSettings, LogFormat,
	LoggingSettings, PoolSettings, RoutingSettings, Settings,
};
pub use startup_logger::{log_router_ready, log_service_info, log_service_shutdown};
