use clap::Parser;
use clients::aftership::DEFAULT_API_URL;
use color_eyre::{Result, eyre::Context};
use parcel_web::AppState;
use tracing::level_filters::LevelFilter;
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Parser, Debug)]
#[command(author, version, about = "Web form for tracking parcels with AfterShip", long_about = None)]
struct Config {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value = "8080")]
    port: u16,

    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Root URL of the AfterShip API
    #[arg(long, env = "AFTERSHIP_API_URL", default_value = DEFAULT_API_URL)]
    api_url: Url,
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new(config.api_url).context("build HTTP client")?;
    let app = parcel_web::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
