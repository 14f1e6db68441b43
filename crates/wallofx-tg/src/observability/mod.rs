pub(crate) mod logging;
pub(crate) mod metrics;

pub use self::logging::{init_logging, tracing_err, LoggingTask};
pub use self::metrics::init_metrics;

const GLOBAL_LABELS: &[(&str, &str)] = &[
    ("app_version", env!("CARGO_PKG_VERSION")),
    ("app_git_commit", git_sha()),
];

const fn git_sha() -> &'static str {
    match option_env!("VERGEN_GIT_SHA") {
        Some(sha) => sha,
        None => "unknown",
    }
}
