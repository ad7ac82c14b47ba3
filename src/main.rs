//! gatefold - gated event photo album server.
//!
//! This binary validates configuration, constructs every client once, and
//! wires the components together before serving.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatefold::{
    album::AlbumResolver,
    config::Config,
    gate::AccessGate,
    notify::{Notifier, NotifierConfig},
    server::{create_router, AppState, RouterConfig, SessionConfig},
    storage::{create_s3_client, S3ObjectStore},
    visitor::{PgVisitorStore, RegistrationService},
    watermark::{load_font, OverlaySpec, Watermarker},
};

/// Timeout applied to every outbound HTTP call (email API, photo fetch).
const OUTBOUND_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for acquiring a database connection.
const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    // Initialize logging
    init_logging(config.verbose);

    // Validate configuration before touching any remote service
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let bucket = config.bucket();

    info!("Configuration:");
    info!("  S3 bucket: {}", bucket);
    if let Some(ref endpoint) = config.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", config.s3_region);
    info!("  Signed URL TTL: {}s", config.signed_url_ttl);
    info!("  Session max-age: {}s", config.session_max_age);
    if !config.secure_cookies {
        info!("  Cookies: not marked Secure (development mode)");
    }

    // Load the overlay font before serving; an unusable font is a
    // configuration error, not a per-request one
    let font = match load_font(Path::new(config.watermark_font.as_deref().unwrap_or_default())) {
        Ok(font) => font,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Create S3 client and test connectivity
    let s3_client = create_s3_client(config.s3_endpoint.as_deref(), &config.s3_region).await;

    info!("Connecting to S3...");
    match test_s3_connection(&s3_client, &bucket).await {
        Ok(()) => info!("  Connected successfully"),
        Err(e) => {
            error!("  Failed to connect to S3: {}", e);
            error!("");
            error!("  Please check:");
            error!("    - Your AWS credentials are configured correctly");
            error!("    - The bucket '{}' exists and is accessible", bucket);
            error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
            return ExitCode::FAILURE;
        }
    }

    // Connect the visitor store
    info!("Connecting to the visitor store...");
    let pool = match PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(config.database_url.as_deref().unwrap_or_default())
        .await
    {
        Ok(pool) => {
            info!("  Connected successfully");
            pool
        }
        Err(e) => {
            error!("  Failed to connect to the database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // One outbound HTTP client shared by email dispatch and photo fetch
    let http = match reqwest::Client::builder()
        .timeout(OUTBOUND_HTTP_TIMEOUT)
        .build()
    {
        Ok(http) => http,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Wire components
    let store = Arc::new(S3ObjectStore::new(s3_client, bucket));
    let visitors = Arc::new(PgVisitorStore::new(pool));

    let resolver = Arc::new(AlbumResolver::new(
        Arc::clone(&store),
        Duration::from_secs(config.signed_url_ttl),
    ));
    let gate = Arc::new(AccessGate::new(Arc::clone(&store), Arc::clone(&visitors)));
    let registration = Arc::new(RegistrationService::new(visitors));

    let notifier = Arc::new(Notifier::new(
        http.clone(),
        NotifierConfig {
            endpoint: config.email_endpoint.clone(),
            api_key: config.email_api_key.clone().unwrap_or_default(),
            from: config.email_from.clone(),
            to: config.email_to.clone().unwrap_or_default(),
        },
    ));

    let overlay = OverlaySpec {
        text: config.watermark_text.clone(),
        font_size: config.watermark_font_size,
        opacity: config.watermark_opacity,
        ..OverlaySpec::default()
    };
    let watermarker = match Watermarker::new(http, &font, &overlay) {
        Ok(watermarker) => Arc::new(watermarker),
        Err(e) => {
            error!("Failed to render the watermark overlay: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = AppState {
        resolver,
        gate,
        registration,
        notifier,
        watermarker,
        session: SessionConfig {
            max_age: config.session_max_age,
            secure: config.secure_cookies,
        },
    };

    // Build router configuration
    let mut router_config = RouterConfig::new().with_tracing(!config.no_tracing);
    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    let router = create_router(state, router_config);

    // Bind and serve
    let addr = config.bind_address();
    info!("Server listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Test S3 connectivity with a one-key listing.
async fn test_s3_connection(client: &aws_sdk_s3::Client, bucket: &str) -> Result<(), String> {
    client
        .list_objects_v2()
        .bucket(bucket)
        .max_keys(1)
        .send()
        .await
        .map_err(|e| format!("{}", e))?;

    Ok(())
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "gatefold=debug,tower_http=debug"
    } else {
        "gatefold=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
