//! Logging initialization for lockstep.
//!
//! Diagnostics go to stderr so stdout stays free for the branch name or JSON
//! report that wrapping tools consume.
//!
//! The subscriber is installed before the repository and its config are
//! resolved, so resolution itself can be traced with `--verbose`. Once the
//! config is loaded its `log_level` is applied through a reload handle.

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Level used until the config has been read.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Pick the filter directive for this run.
///
/// `--verbose` wins, then `RUST_LOG`, then the configured level.
pub fn filter_directive(level: &str, verbose: bool, rust_log: Option<&str>) -> String {
    if verbose {
        return "debug".to_string();
    }
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(level)
        .to_string()
}

/// Swaps the active filter once the configured level is known.
pub struct LoggingHandle {
    reload: reload::Handle<EnvFilter, Registry>,
    verbose: bool,
    rust_log: Option<String>,
}

impl LoggingHandle {
    /// Apply `log_level` from `.lockstep.yaml`.
    ///
    /// Has no visible effect when `--verbose` or `RUST_LOG` is set.
    pub fn apply_config_level(&self, level: &str) -> Result<()> {
        let filter = build_filter(&filter_directive(
            level,
            self.verbose,
            self.rust_log.as_deref(),
        ))?;
        self.reload
            .reload(filter)
            .context("failed to update log filter")?;
        Ok(())
    }
}

fn build_filter(directive: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directive).with_context(|| format!("invalid log filter '{}'", directive))
}

fn build_subscriber(
    verbose: bool,
    rust_log: Option<String>,
) -> Result<(impl Subscriber + Send + Sync, LoggingHandle)> {
    let directive = filter_directive(DEFAULT_LOG_LEVEL, verbose, rust_log.as_deref());
    let (filter, reload) = reload::Layer::new(build_filter(&directive)?);

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr),
    );

    Ok((
        subscriber,
        LoggingHandle {
            reload,
            verbose,
            rust_log,
        },
    ))
}

/// Install the stderr subscriber.
///
/// # Arguments
/// * `verbose` - Force `debug` (from `--verbose`)
///
/// # Returns
/// A `LoggingHandle` for applying the configured level later.
pub fn init_logging(verbose: bool) -> Result<LoggingHandle> {
    let (subscriber, handle) = build_subscriber(verbose, std::env::var("RUST_LOG").ok())?;
    subscriber
        .try_init()
        .context("failed to install log subscriber")?;
    Ok(handle)
}
