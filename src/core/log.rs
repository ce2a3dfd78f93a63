use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Level applied to this crate's own spans and events.
fn app_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    }
}

/// `RUST_LOG` wins when set; otherwise everything follows `--verbose`.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(app_level(verbose).into()))
}

/// Installs the global subscriber.
///
/// Events are written to stderr one per line: `browse` redraws the page on
/// stdout, and multi-line records would scroll it out of view.
pub fn init_logging(verbose: bool) {
    let app_filter = Targets::new().with_target("yafx", app_level(verbose));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(app_filter)
        .with(env_filter(verbose))
        .init();
}
