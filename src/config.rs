//! Server Configuration
//!
//! Every option can be given as a command-line flag or through the environment,
//! so the server runs unchanged from a shell, a container, or a `.env`-driven
//! process manager. Flags win over environment variables.
//!
//! | Flag                        | Environment                  | Default                      |
//! |-----------------------------|------------------------------|------------------------------|
//! | `--host`                    | `BIND_HOST`                  | `127.0.0.1`                  |
//! | `--port`                    | `PORT`                       | `8080`                       |
//! | `--base-url`                | `BASE_URL`                   | `http://127.0.0.1:8080/v1/`  |
//! | `--graceful-shutdown-sec`   | `GRACEFUL_SHUTDOWN_SEC`      | `5`                          |
//! | `--request-timeout-sec`     | `SERVER_REQUEST_TIMEOUT_SEC` | `30`                         |
//! | `--file-clean-interval-ms`  | `FILE_CLEAN_INTERVAL_MIL`    | `1000`                       |
//! | `--default-ttl-min`         | `DEFAULT_TTL_MIN`            | `1`                          |
//! | `--inbox-capacity`          | `STORE_INBOX_CAPACITY`       | `1024`                       |
//! | `--store-timeout-ms`        | `STORE_TIMEOUT_MIL`          | `5000` (`0` waits forever)   |

use crate::api::ApiConfig;
use crate::storage::StoreConfig;
use clap::Parser;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flashfs",
    version,
    about = "FlashFS - An ephemeral in-memory file store with per-file TTL"
)]
pub struct Config {
    /// Host to bind to
    #[arg(long, env = "BIND_HOST", default_value = crate::DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = crate::DEFAULT_PORT)]
    pub port: u16,

    /// Prefix for download URLs returned by uploads
    #[arg(long, env = "BASE_URL", default_value = "http://127.0.0.1:8080/v1/")]
    pub base_url: String,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, env = "GRACEFUL_SHUTDOWN_SEC", default_value_t = 5)]
    pub graceful_shutdown_sec: u64,

    /// Seconds before an HTTP request is abandoned
    #[arg(long, env = "SERVER_REQUEST_TIMEOUT_SEC", default_value_t = 30)]
    pub request_timeout_sec: u64,

    /// Milliseconds between expiry sweeps
    #[arg(
        long,
        env = "FILE_CLEAN_INTERVAL_MIL",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub file_clean_interval_ms: u64,

    /// TTL in minutes for uploads without a valid File-TTL header
    #[arg(long, env = "DEFAULT_TTL_MIN", default_value_t = 1)]
    pub default_ttl_min: u64,

    /// Number of requests the store buffers before writers wait
    #[arg(
        long,
        env = "STORE_INBOX_CAPACITY",
        default_value_t = 1024,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub inbox_capacity: u64,

    /// Milliseconds a request may wait on the store (0 waits forever)
    #[arg(long, env = "STORE_TIMEOUT_MIL", default_value_t = 5000)]
    pub store_timeout_ms: u64,
}

impl Config {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn graceful_shutdown(&self) -> Duration {
        Duration::from_secs(self.graceful_shutdown_sec)
    }

    /// Store engine settings derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            sweep_interval: Duration::from_millis(self.file_clean_interval_ms),
            inbox_capacity: usize::try_from(self.inbox_capacity).unwrap_or(usize::MAX),
            request_timeout: match self.store_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }

    /// HTTP transport settings derived from this configuration.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            default_ttl: Duration::from_secs(self.default_ttl_min.saturating_mul(60)),
            request_timeout: Duration::from_secs(self.request_timeout_sec),
        }
    }
}
