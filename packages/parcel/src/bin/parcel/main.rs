use std::process::ExitCode;

use clap::Parser;
use clients::{
    AfterShip, ApiKey,
    aftership::{ApiError, DEFAULT_API_URL},
};
use color_eyre::{Result, eyre::Context};
use colored::Colorize as _;
use inquire::{Password, PasswordDisplayMode, Text};
use parcel::{Normalizer, Outcome, track};
use tracing::{instrument, level_filters::LevelFilter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{Layer as _, layer::SubscriberExt as _, util::SubscriberInitExt as _};
use url::Url;

mod report;

const BANNER: &str = r"
 ____   _    ____   ____ _____ _
|  _ \ / \  |  _ \ / ___| ____| |
| |_) / _ \ | |_) | |   |  _| | |
|  __/ ___ \|  _ <| |___| |___| |___
|_| /_/   \_\_| \_\\____|_____|_____|
      Delivery Tracker
";

#[derive(Parser, Debug)]
#[command(
    name = "parcel",
    about = "Track a parcel with AfterShip, with courier code validation",
    version
)]
struct Cli {
    /// AfterShip API key; prompted for when not provided.
    #[arg(long, env = "AFTERSHIP_API_KEY", hide_env_values = true)]
    api_key: Option<ApiKey>,

    /// Tracking number; prompted for when not provided.
    #[arg(long)]
    tracking_number: Option<String>,

    /// Courier code or a common name for the courier, e.g. `auspost`;
    /// prompted for when not provided.
    #[arg(long)]
    courier: Option<String>,

    /// Root URL of the AfterShip API.
    #[arg(long, env = "AFTERSHIP_API_URL", default_value = DEFAULT_API_URL)]
    api_url: Url,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    color_eyre::install()?;

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(ErrorLayer::default())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    run(cli).await
}

#[instrument]
async fn run(cli: Cli) -> Result<ExitCode> {
    println!("{BANNER}");
    println!("Track parcel with courier validation (Cainiao, iMile, Australia Post ready).\n");

    let api_key = match cli.api_key.filter(|key| !key.is_empty()) {
        Some(key) => key,
        None => Password::new("Enter your AfterShip API key:")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .map(ApiKey::new)
            .context("read API key")?,
    };
    if api_key.is_empty() {
        println!("API key is required.");
        return Ok(ExitCode::FAILURE);
    }

    let tracking_number = match cli.tracking_number {
        Some(tracking_number) => tracking_number,
        None => Text::new("Enter tracking number:")
            .prompt()
            .context("read tracking number")?,
    };
    let tracking_number = tracking_number.trim();
    if tracking_number.is_empty() {
        println!("Tracking number is required.");
        return Ok(ExitCode::FAILURE);
    }

    let courier = match cli.courier {
        Some(courier) => courier,
        None => Text::new("Enter courier code:")
            .with_placeholder("cainiao, imile, australia-post")
            .prompt()
            .context("read courier code")?,
    };
    if courier.trim().is_empty() {
        println!("Courier code is required.");
        return Ok(ExitCode::FAILURE);
    }

    let client = AfterShip::new(cli.api_url, api_key).context("build AfterShip client")?;
    let normalizer = Normalizer::default();
    match track::submit(&client, &normalizer, tracking_number, &courier).await {
        Ok(Outcome::Tracked(tracked)) => {
            println!("\n{}", "Tracking created/fetched successfully.".green());
            print!("{}", report::tracked(&tracked));
            Ok(ExitCode::SUCCESS)
        }
        Ok(Outcome::Rejected { suggestions }) => {
            println!("\n{} {}", "Error:".red(), track::INVALID_COURIER);
            print!("{}", report::suggestions(&suggestions));
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            print_api_error(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_api_error(err: &ApiError) {
    println!("{}", "Could not complete tracking request.".red());
    println!("\nAPI request failed.");
    print!("{}", report::api_error(err));
}
