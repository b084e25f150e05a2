//! Service startup logging for the QuantFi router

use std::env;
use tracing::info;

use crate::Settings;

/// Logs service information at startup
pub fn log_service_info() {
	// Use the root package name and version, not the current crate
	let service_name = "quantfi-router";
	let service_version = env!("CARGO_PKG_VERSION");

	info!("=== QuantFi Router Starting ===");
	info!("🚀 Service: {} v{}", service_name, service_version);
	info!("💻 Platform: {} ({})", env::consts::OS, env::consts::ARCH);

	if let Ok(cwd) = env::current_dir() {
		info!("📁 Working Directory: {}", cwd.display());
	}
	if let Ok(rust_log) = env::var("RUST_LOG") {
		info!("🔧 Log Level: {}", rust_log);
	}
	if let Ok(config_path) = env::var("CONFIG_PATH") {
		info!("📋 Config Path: {}", config_path);
	}

	info!(
		"🕒 Started at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}

/// Logs the routing setup once adapters are registered
pub fn log_router_ready(settings: &Settings, adapters: &[String]) {
	info!("✅ Router ready");
	info!("🎯 Target token: {}", settings.routing.target_token);
	info!(
		"🧭 Search: {} (max hops {}, timeout {}ms)",
		settings.routing.strategy, settings.routing.max_hops, settings.routing.search_timeout_ms
	);
	info!("🔌 Adapters: [{}]", adapters.join(", "));
	info!("💧 Seeded pools: {}", settings.pools.len());
}

/// Logs service shutdown information
pub fn log_service_shutdown() {
	info!("🛑 QuantFi Router Shutting Down");
	info!(
		"🕒 Shutdown at: {}",
		chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
	);
}
