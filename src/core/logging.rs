//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g.
/// `RUST_LOG=fractal_sag=trace` to see per-level frame timings.
///
/// # Example
/// ```no_run
/// fractal_sag::core::logging::init();
/// log::info!("Fractal started");
/// ```
pub fn init() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();
}
