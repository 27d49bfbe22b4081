// # dyndnsd - DynDNS Update Daemon
//
// This daemon is a THIN integration layer: all update logic lives in
// dyndns-core. It is responsible for:
// 1. Reading daemon settings from environment variables
// 2. Initializing logging and the runtime
// 3. Registering authorization providers
// 4. Serving the update endpoint until SIGTERM/SIGINT
//
// ## Configuration
//
// Daemon settings come from environment variables:
//
// - `DYNDNS_CONFIG`: Path to the service configuration (default `data/config.json`)
// - `DYNDNS_LISTEN`: Listen address (default `0.0.0.0:8245`)
// - `DYNDNS_LOG_LEVEL`: trace, debug, info, warn or error (default `info`)
//
// The service configuration itself (provider, transport, TTL) is JSON, see
// `dyndns_core::config`. A missing or broken configuration does not stop the
// daemon: every request is answered with a 500 until it is fixed and the
// daemon restarted.
//
// ## Example
//
// ```bash
// export DYNDNS_CONFIG=/etc/dyndns/config.json
// export DYNDNS_LISTEN=127.0.0.1:8245
// dyndnsd
// curl -u alice:secret 'http://127.0.0.1:8245/nic/update?hostname=home.example.com'
// ```

use anyhow::Result;
use dyndns_core::AuthProviderRegistry;
use dyndnsd::{AppState, router};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DyndnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DyndnsExitCode> for ExitCode {
    fn from(code: DyndnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Daemon settings
struct Config {
    config_path: PathBuf,
    listen: String,
    log_level: String,
}

impl Config {
    /// Load settings from environment variables
    fn from_env() -> Self {
        Self {
            config_path: env::var("DYNDNS_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/config.json")),
            listen: env::var("DYNDNS_LISTEN").unwrap_or_else(|_| "0.0.0.0:8245".to_string()),
            log_level: env::var("DYNDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Validate the settings and return the parsed listen address
    fn validate(&self) -> Result<SocketAddr> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DYNDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.listen.parse().map_err(|e| {
            anyhow::anyhow!(
                "DYNDNS_LISTEN '{}' is not a socket address ({}). \
                Example: export DYNDNS_LISTEN=0.0.0.0:8245",
                self.listen,
                e
            )
        })
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    let listen = match config.validate() {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return DyndnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DyndnsExitCode::ConfigError.into();
    }

    info!("Starting dyndnsd");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DyndnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config, listen).await {
            error!("Daemon error: {}", e);
            DyndnsExitCode::RuntimeError
        } else {
            DyndnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: Config, listen: SocketAddr) -> Result<()> {
    let mut registry = AuthProviderRegistry::new();

    #[cfg(feature = "static")]
    {
        info!("Registering static user provider");
        dyndns_auth_static::register(&mut registry);
    }

    let state = AppState::from_config_path(&config.config_path, &registry);
    if state.is_ready() {
        info!("Loaded configuration from {}", config.config_path.display());
    } else {
        warn!(
            "Serving in misconfigured mode: every request will get a 500 until {} is fixed",
            config.config_path.display()
        );
    }

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", listen, e))?;
    info!("Listening on {}", listen);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => error!("Shutdown signal error: {}", e),
        }
    })
    .await?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
