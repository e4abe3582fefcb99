//! Tracing setup for development builds.

/// Development helper: initialize tracing subscriber when `RUST_LOG` is set.
///
/// Tests, examples and benches can call `socketry::dev_tracing::init_tracing()`
/// to see socket and worker lifecycle events. This is a no-op when `RUST_LOG`
/// is not set or when a global subscriber is already installed.
pub fn init_tracing() {
    use std::env;

    if env::var("RUST_LOG").is_ok() {
        // Best-effort: a second call finds the subscriber installed.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_thread_names(true)
            .try_init();
    }
}
