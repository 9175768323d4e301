use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{config_from_env, router, AppState, ContextProvider};
use clinic_print_core::HttpContextSource;

/// Main entry point for the clinic print service
///
/// Resolves the print configuration once, then serves the REST API. Print context (current user
/// and organization letterhead) is fetched from the clinic API per request, forwarding the
/// caller's bearer token when present.
///
/// # Environment Variables
/// - `CLINIC_PRINT_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CLINIC_PRINT_API_TOKEN`: bearer token used when a request carries none
/// - see [`api_rest::config_from_env`] for the print configuration
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_print_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(config_from_env()?);
    let rest_addr =
        std::env::var("CLINIC_PRINT_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let mut source = HttpContextSource::from_config(&cfg);
    if let Ok(token) = std::env::var("CLINIC_PRINT_API_TOKEN") {
        if !token.trim().is_empty() {
            source = source.with_bearer_token(token.trim());
        }
    }

    tracing::info!("++ Clinic API at {}", cfg.api_base_url());
    tracing::info!("++ Starting clinic print REST on {}", rest_addr);

    let app = router(AppState::new(cfg, ContextProvider::Http(source)));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
