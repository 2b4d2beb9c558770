//! Logging setup
//!
//! Lines carry the level and message only (no timestamp or target). The
//! subscriber is installed for the caller's scope through a [`DefaultGuard`]
//! rather than as a process-wide global.

use tracing::subscriber::DefaultGuard;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;

/// Map a `-v` count onto a level: warnings by default, debug once any `-v` is given
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        _ => LevelFilter::DEBUG,
    }
}

/// Build a subscriber for the given verbosity writing to `writer`
pub fn subscriber<W>(verbosity: u8, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_writer(writer)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .finish()
}

/// Install a stderr logger for the current scope
///
/// Logging stays active until the returned guard is dropped.
pub fn init_logging(verbosity: u8) -> DefaultGuard {
    subscriber(verbosity, std::io::stderr).set_default()
}
