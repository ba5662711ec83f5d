//! # am-silence-ctl
//!
//! Create or delete [Prometheus Alertmanager](https://prometheus.io/docs/alerting/latest/alertmanager/)
//! silences through the v2 HTTP API.
//!
//! ## Features
//!
//! - Create a time-bounded silence from label matchers
//! - Delete every active silence whose matchers include the requested ones
//! - `role` / `group` defaults from a YAML config file
//! - Host FQDN matcher when nothing else is requested
//! - Dry-run mode that never sends a mutating request
//!
//! ## Example
//!
//! ```rust,no_run
//! use am_silence_ctl::{app, Config, Endpoints, HostIdentity, Invocation, SilenceClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None);
//!     let client = SilenceClient::new(
//!         Endpoints::from_base_url(&config.alertmanager_url),
//!         Duration::from_secs(10),
//!     )?;
//!
//!     let invocation = Invocation {
//!         dry_run: true,
//!         ..Invocation::default()
//!     };
//!
//!     let outcome = app::run(&invocation, &config, &HostIdentity::detect(), &client).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
mod client;
pub mod config;
mod endpoints;
mod errors;
pub mod matchers;
mod types;

pub use app::{HostIdentity, Invocation, Mode, Outcome};
pub use client::{SilenceClient, DEFAULT_TIMEOUT};
pub use config::Config;
pub use endpoints::Endpoints;
pub use errors::{ErrorClass, Result, SilenceCtlError};
pub use matchers::{build_matchers, FlagValue, MatcherRequest};
pub use types::{
    CreatedSilence, Matcher, PostableSilence, Silence, SilenceState, SilenceStatus,
    DEFAULT_SILENCE_HOURS,
};
