//! Logging setup for applications embedding the enricher.
//!
//! The library itself only emits `tracing` events. Binaries and tests that want
//! to see them install a subscriber through [`setup_logging`] or
//! [`setup_logging_with_writer`]. The verbosity is read from `RUST_LOG` and
//! falls back to [`DEFAULT_LOG_FILTER`], so `RUST_LOG=evm_event_enricher=debug`
//! shows per-log decoding decisions.

use tracing::Subscriber;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Builds the level filter from `RUST_LOG`, falling back to `default`
pub fn env_filter(default: &str) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Builds a compact fmt subscriber writing to `writer` without installing it
///
/// Useful for scoping log capture with `tracing::subscriber::with_default`.
pub fn build_subscriber<W>(writer: W, filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static
where
	W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	tracing_subscriber::registry().with(filter).with(
		fmt::layer()
			.with_writer(writer)
			.event_format(
				fmt::format()
					.with_level(true)
					.with_target(true)
					.with_thread_ids(false)
					.with_thread_names(false)
					.with_ansi(false)
					.compact(),
			)
			.fmt_fields(fmt::format::PrettyFields::new()),
	)
}

/// Installs the global subscriber, logging to stdout
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	setup_logging_with_writer(std::io::stdout)
}

/// Installs the global subscriber, logging to `writer`
///
/// Fails if a global subscriber is already set.
pub fn setup_logging_with_writer<W>(
	writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	build_subscriber(writer, env_filter(DEFAULT_LOG_FILTER)).try_init()?;
	Ok(())
}
