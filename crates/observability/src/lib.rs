//! TeleSync Observability - logging and tracing setup shared by the telesync binaries
//!
//! Console logging is always available; OTLP span export is switched on only
//! when an endpoint is configured.
//!
//! # Quick Start
//!
//! ```no_run
//! use telesync_observability::{ObservabilityConfig, init};
//!
//! let config = ObservabilityConfig::new("telesync")
//!     .with_otlp_endpoint("http://localhost:4317")
//!     .with_log_level("telesync=debug,info");
//!
//! init(config)?;
//! tracing::info!("Service started");
//! # Ok::<(), telesync_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_SERVICE_NAME` - Service name (defaults to `telesync`)
//! - `OTEL_SERVICE_VERSION` - Service version (defaults to the crate version)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint; unset means console only
//! - `TELESYNC_LOG` or `RUST_LOG` - Log level filter

pub mod config;
pub mod error;
pub mod telemetry;
pub mod tracing;

pub use config::ObservabilityConfig;
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use tracing::{record_duration, record_error};

// Span macros are exported via #[macro_export]:
// telesync_observability::refresh_span!(), bridge_span!(), platform_span!()
