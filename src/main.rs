//! QuantFi Router
//!
//! Builds the router from configuration and logs a best-route quote for
//! every configured probe token.

use quantfi_router::mocks::UNIT;
use quantfi_router::{
	init_tracing_from_settings, load_config, log_router_ready, log_service_info,
	log_service_shutdown, QuoteResponse, RouterBuilder,
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	// Load .env file if it exists
	dotenvy::dotenv().ok();

	let settings = load_config()?;
	init_tracing_from_settings(&settings)?;
	log_service_info();

	let router = RouterBuilder::from_settings(settings.clone()).build().await?;
	log_router_ready(&settings, &router.executor().adapter_names());

	for token in &settings.probe_tokens {
		match router.quote(*token, UNIT).await {
			Ok(quote) => {
				let response = QuoteResponse::from(&quote);
				info!(
					"Probe {} -> {}: {}",
					token,
					settings.routing.target_token,
					quantfi_router::serde_json::to_string(&response)?
				);
			},
			Err(e) => warn!("Probe {} has no route: {}", token, e),
		}
	}

	log_service_shutdown();
	Ok(())
}
